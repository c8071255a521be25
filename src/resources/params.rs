//! Material parameters.
//!
//! A [`Parameter`] is an author-declared material input. Stage bodies refer
//! to it as `Params.<name>`; the compiler rewrites those references to the
//! bare name and declares the parameter behind an `#ifdef` guard.

use std::borrow::Cow;

use regex::{NoExpand, Regex};
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

/// One declared material parameter.
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    name: String,
    declared_type: String,
    default_value: Option<String>,
    guard_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    array_suffix: Option<String>,
    #[serde(skip)]
    pattern: Regex,
}

impl Parameter {
    /// Creates a parameter and compiles its `Params.<name>` match pattern.
    pub fn new(
        declared_type: impl Into<String>,
        name: impl Into<String>,
        default_value: Option<String>,
        guard_name: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let name = name.into();
        let pattern = Regex::new(&format!(r"\bParams\.{}\b", regex::escape(&name)))?;
        Ok(Self {
            name,
            declared_type: declared_type.into(),
            default_value,
            guard_name: guard_name.into(),
            array_suffix: None,
            pattern,
        })
    }

    /// Marks the parameter as an array, e.g. `[4]` for `float Weights[4];`.
    #[must_use]
    pub fn with_array_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.array_suffix = Some(suffix.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form type token, passed through to the generated declaration.
    #[inline]
    #[must_use]
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Macro that must be defined for a stage to materialize this parameter.
    #[inline]
    #[must_use]
    pub fn guard_name(&self) -> &str {
        &self.guard_name
    }

    /// Bracketed array size written after the name, if any.
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

    /// Returns `true` if the line mentions `Params.<name>` as a whole token.
    #[inline]
    #[must_use]
    pub fn is_referenced_by(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    /// Rewrites every `Params.<name>` occurrence in the line to `<name>`.
    #[must_use]
    pub fn substitute<'l>(&self, line: &'l str) -> Cow<'l, str> {
        self.pattern.replace_all(line, NoExpand(&self.name))
    }

    /// Declaration line placed between `#ifdef` / `#endif`.
    #[must_use]
    pub fn declaration(&self, qualifier: Option<&str>, terminator: char) -> String {
        let suffix = self.array_suffix.as_deref().unwrap_or_default();
        match qualifier {
            Some(q) => format!("{q} {} {}{suffix}{terminator}", self.declared_type, self.name),
            None => format!("{} {}{suffix}{terminator}", self.declared_type, self.name),
        }
    }
}

/// Ordered, name-unique parameter table of one material definition.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    params: Vec<Parameter>,
    index: FxHashMap<String, usize>,
}

impl ParameterTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter. Hands it back when the name is already taken.
    pub fn insert(&mut self, param: Parameter) -> Result<(), Parameter> {
        if self.index.contains_key(param.name()) {
            return Err(param);
        }
        self.index.insert(param.name.clone(), self.params.len());
        self.params.push(param);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.index.get(name).map(|&i| &self.params[i])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterTable {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for ParameterTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.params)
    }
}
