//! Material Definition Compiler
//!
//! Compiles a material definition document into a [`MaterialDefinition`]:
//!
//! ```text
//! text ──► scanner ──► block tree ──► interpreter ──► MaterialDefinition
//!                                       │
//!                                       ├─ tables       (Params / Vars)
//!                                       └─ synthesizer  (stage Main blocks, context registry)
//! ```
//!
//! # Document notation
//!
//! ```text
//! Def Basic {
//!     Params {
//!         vec4 Color;
//!     }
//!     SubTechnology Forward {
//!         Vars {
//!             vec4 wColor;
//!         }
//!         Vs_Shader {
//!             void main(){
//!                 wColor = Params.Color;
//!                 Context.OutPosition = Context.ProjectViewMatrix * Context.ModelMatrix * vec4(Context.InPosition, 1.0);
//!             }
//!         }
//!         Fs_Shader {
//!             void main(){
//!                 Context.OutColor = wColor;
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! Only the first top-level block is compiled. Anything after it is reported
//! through [`MaterialDefinition::ignored_trailing_lines`] and a warning.
//!
//! Compilation is a pure function of the text and settings: no I/O, no
//! shared mutable state, safe to run for many documents in parallel.

pub mod context;
pub mod interpreter;
pub mod scanner;
pub mod synthesizer;
pub mod tables;

use crate::errors::{MatDefError, Result};
use crate::resources::MaterialDefinition;
use crate::settings::CompilerSettings;

use interpreter::DefContext;

/// Compiles a document with default settings.
pub fn compile(text: &str) -> Result<MaterialDefinition> {
    compile_with_settings(text, &CompilerSettings::default())
}

/// Compiles a document.
///
/// Fails with [`MatDefError::Structural`] when the document contains no
/// top-level block; never returns a partially built definition.
pub fn compile_with_settings(text: &str, settings: &CompilerSettings) -> Result<MaterialDefinition> {
    let lines: Vec<&str> = text.lines().collect();

    let Some(doc) = scanner::scan_document(&lines, settings)? else {
        return Err(MatDefError::structural(None, "no top-level block found"));
    };
    log::debug!(
        "Root block '{}' spans lines {}..={}",
        doc.root.kind(),
        doc.root.start_line() + 1,
        doc.root.end_line() + 1
    );

    let mut material = MaterialDefinition::new();
    interpreter::visit(&doc.root, &mut DefContext::new(&mut material, settings))?;

    if doc.trailing_lines > 0 {
        log::warn!(
            "Material '{}': {} line(s) after line {} are outside the first top-level block and were not compiled",
            material.name(),
            doc.trailing_lines,
            doc.root.end_line() + 1
        );
        material.set_ignored_trailing_lines(doc.trailing_lines);
    }

    Ok(material)
}
