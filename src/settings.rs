//! Compiler Settings
//!
//! Controls the fixed text the compiler reads and emits: comment and
//! terminator characters of the document notation, and the header lines,
//! qualifiers and macro naming of the generated GLSL.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use matdef::CompilerSettings;
//!
//! // Default: GLSL ES 3.00 output, `uniform` parameters guarded by `PARAM_<name>`
//! let settings = CompilerSettings::default();
//!
//! // Desktop GLSL output, parameters declared without a qualifier
//! let settings = CompilerSettings {
//!     version_header: "#version 330 core".into(),
//!     fragment_precision: None,
//!     parameter_qualifier: None,
//!     ..Default::default()
//! };
//!
//! let def = matdef::compile_with_settings(text, &settings)?;
//! ```

use serde::Serialize;

/// Configuration for one compilation.
///
/// Settings are read-only during compilation; one value may be shared by any
/// number of concurrent compilations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerSettings {
    /// First line of every generated stage.
    pub version_header: String,

    /// Default precision declaration emitted on the fragment stage only.
    /// `None` skips the line.
    pub fragment_precision: Option<String>,

    /// Prefix marking a line comment in the document notation.
    pub comment_marker: String,

    /// Statement terminator ending every `Params` / `Vars` line.
    pub terminator: char,

    /// Storage qualifier placed in front of guarded parameter declarations.
    pub parameter_qualifier: Option<String>,

    /// Prefix of the `#ifdef` guard wrapping each parameter declaration.
    /// The guard name is this prefix followed by the parameter name.
    pub guard_prefix: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            version_header: "#version 300 es".to_string(),
            fragment_precision: Some("precision mediump float;".to_string()),
            comment_marker: "//".to_string(),
            terminator: ';',
            parameter_qualifier: Some("uniform".to_string()),
            guard_prefix: "PARAM_".to_string(),
        }
    }
}

impl CompilerSettings {
    /// Returns `true` when the trimmed line is a comment in the document notation.
    #[inline]
    #[must_use]
    pub fn is_comment(&self, trimmed: &str) -> bool {
        !self.comment_marker.is_empty() && trimmed.starts_with(self.comment_marker.as_str())
    }

    /// Guard macro name for a parameter.
    #[inline]
    #[must_use]
    pub fn guard_name(&self, param_name: &str) -> String {
        format!("{}{param_name}", self.guard_prefix)
    }
}
