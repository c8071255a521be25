//! Generated shader stages.

use std::fmt;

use serde::Serialize;

use super::params::ParameterTable;
use super::shader_defines::ShaderDefines;

/// The two programmable stages a sub-technology generates.
///
/// Vertex and fragment synthesis share one code path; this enum carries the
/// few details that differ between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    /// Block kind of the container block (`Vs_Shader` / `Fs_Shader`).
    #[must_use]
    pub fn shader_block(self) -> &'static str {
        match self {
            Self::Vertex => "Vs_Shader",
            Self::Fragment => "Fs_Shader",
        }
    }

    /// Block kind of the stage body block (`Vs_Shader_Main` / `Fs_Shader_Main`).
    #[must_use]
    pub fn main_block(self) -> &'static str {
        match self {
            Self::Vertex => "Vs_Shader_Main",
            Self::Fragment => "Fs_Shader_Main",
        }
    }

    /// Qualifier of pass-through variable declarations on this stage.
    #[must_use]
    pub fn variable_qualifier(self) -> &'static str {
        match self {
            Self::Vertex => "out",
            Self::Fragment => "in",
        }
    }

    /// Whether the default precision line is emitted.
    #[inline]
    #[must_use]
    pub fn needs_precision(self) -> bool {
        matches!(self, Self::Fragment)
    }

    /// Whether context inputs use `layout (location=N)` attribute declarations.
    #[inline]
    #[must_use]
    pub fn uses_attribute_locations(self) -> bool {
        matches!(self, Self::Vertex)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// What a stage body referenced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageUsage {
    /// Parameter names, in parameter declaration order.
    pub parameters: Vec<String>,
    /// Context binding names (e.g. `ModelMatrix`), in registry order.
    pub contexts: Vec<&'static str>,
    /// Pass-through variable names, in declaration order.
    pub variables: Vec<String>,
}

/// One generated stage: final source text plus usage metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSource {
    kind: StageKind,
    source: String,
    usage: StageUsage,
}

impl StageSource {
    #[must_use]
    pub fn new(kind: StageKind, source: String, usage: StageUsage) -> Self {
        Self { kind, source, usage }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    #[must_use]
    pub fn usage(&self) -> &StageUsage {
        &self.usage
    }

    #[must_use]
    pub fn uses_parameter(&self, name: &str) -> bool {
        self.usage.parameters.iter().any(|p| p == name)
    }

    #[must_use]
    pub fn uses_context(&self, name: &str) -> bool {
        self.usage.contexts.iter().any(|&c| c == name)
    }

    /// Guard macros for the parameters this stage references.
    #[must_use]
    pub fn parameter_defines(&self, params: &ParameterTable) -> ShaderDefines {
        let mut defines = ShaderDefines::new();
        for name in &self.usage.parameters {
            if let Some(param) = params.get(name) {
                defines.set(param.guard_name(), "1");
            }
        }
        defines
    }

    /// Stage text with `#define` lines inserted right after the `#version`
    /// line (or at the top when the source has no version line).
    #[must_use]
    pub fn with_defines(&self, defines: &ShaderDefines) -> String {
        let preamble = defines.to_preamble();
        if preamble.is_empty() {
            return self.source.clone();
        }

        let split = if self.source.starts_with("#version") {
            self.source.find('\n').map_or(self.source.len(), |i| i + 1)
        } else {
            0
        };
        let (head, tail) = self.source.split_at(split);

        let mut out = String::with_capacity(self.source.len() + preamble.len() + 1);
        out.push_str(head);
        if !head.is_empty() && !head.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&preamble);
        out.push_str(tail);
        out
    }
}
