#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Material definition compiler.
//!
//! Turns a hand-authored, block-structured material document into GLSL
//! vertex/fragment sources per sub-technology, together with the parameter
//! and engine-context usage a program builder needs to bind them.
//!
//! ```rust,ignore
//! let def = matdef::compile(&std::fs::read_to_string("basic.mdef")?)?;
//! for tech in def.sub_technologies() {
//!     for stage in tech.stages() {
//!         let defines = stage.parameter_defines(def.parameters());
//!         upload(stage.kind(), &stage.with_defines(&defines));
//!     }
//! }
//! ```

pub mod compiler;
pub mod errors;
pub mod resources;
pub mod settings;
pub mod utils;

pub use compiler::context::ContextBinding;
pub use compiler::{compile, compile_with_settings};
pub use errors::{MatDefError, Result};
pub use resources::{
    MaterialDefinition, Parameter, ParameterTable, ShaderDefines, StageKind, StageSource,
    StageUsage, SubTechnology, Variable,
};
pub use settings::CompilerSettings;
