//! Pass-through variables threaded from the vertex to the fragment stage.

use regex::Regex;
use serde::Serialize;

/// A variable declared in a `Vars` block.
///
/// Detected by whole-word name match in stage bodies; detection never
/// rewrites the line.
#[derive(Debug, Clone, Serialize)]
pub struct Variable {
    declared_type: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    array_suffix: Option<String>,
    #[serde(skip)]
    pattern: Regex,
}

impl Variable {
    pub fn new(declared_type: impl Into<String>, name: impl Into<String>) -> Result<Self, regex::Error> {
        let name = name.into();
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&name)))?;
        Ok(Self {
            declared_type: declared_type.into(),
            name,
            array_suffix: None,
            pattern,
        })
    }

    #[must_use]
    pub fn with_array_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.array_suffix = Some(suffix.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn array_suffix(&self) -> Option<&str> {
        self.array_suffix.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    #[inline]
    #[must_use]
    pub fn is_referenced_by(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}
