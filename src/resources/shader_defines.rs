//! Shader Macro Definitions
//!
//! Generated stages wrap every parameter declaration in
//! `#ifdef <guard> ... #endif`. Which declarations a compiled program
//! actually contains is decided by the macro set handed to the program
//! builder: [`ShaderDefines`].
//!
//! Keys and values are interned [`Symbol`]s kept in sorted order, so two sets
//! with the same content always compare and hash equal, which makes them
//! usable as program cache keys.
//!
//! ```rust,ignore
//! let def = matdef::compile(text)?;
//! let tech = def.sub_technology("Forward").unwrap();
//! let vs = tech.vertex().unwrap();
//!
//! // Materialize exactly the parameters this stage references.
//! let defines = vs.parameter_defines(def.parameters());
//! let source = vs.with_defines(&defines);
//! ```

use std::hash::{Hash, Hasher};

use crate::utils::interner::{self, Symbol};

/// A set of preprocessor macro definitions.
#[derive(Debug, Clone, Default)]
pub struct ShaderDefines {
    defines: Vec<(Symbol, Symbol)>,
}

impl ShaderDefines {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a define, replacing the value if the key already exists.
    pub fn set(&mut self, key: &str, value: &str) {
        let key = interner::intern(key);
        let value = interner::intern(value);
        match self.defines.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(idx) => self.defines[idx].1 = value,
            Err(idx) => self.defines.insert(idx, (key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let Some(key) = interner::get(key) else {
            return false;
        };
        match self.defines.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(idx) => {
                self.defines.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        interner::get(key).is_some_and(|key| {
            self.defines
                .binary_search_by_key(&key, |&(k, _)| k)
                .is_ok()
        })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'static str> {
        let key = interner::get(key)?;
        self.defines
            .binary_search_by_key(&key, |&(k, _)| k)
            .ok()
            .map(|idx| interner::resolve(self.defines[idx].1))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Iterates as `(key, value)` strings, in internal (symbol) order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.defines
            .iter()
            .map(|&(k, v)| (interner::resolve(k), interner::resolve(v)))
    }

    /// Values from `other` win on conflicts.
    pub fn merge(&mut self, other: &ShaderDefines) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Content hash, suitable as a program cache key.
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        use std::hash::BuildHasher;

        rustc_hash::FxBuildHasher.hash_one(self)
    }

    /// Renders one `#define` line per entry, sorted by key text.
    #[must_use]
    pub fn to_preamble(&self) -> String {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|&(k, _)| k);

        let mut out = String::new();
        for (key, value) in entries {
            out.push_str("#define ");
            out.push_str(key);
            if !value.is_empty() {
                out.push(' ');
                out.push_str(value);
            }
            out.push('\n');
        }
        out
    }
}

impl Hash for ShaderDefines {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defines.hash(state);
    }
}

impl PartialEq for ShaderDefines {
    fn eq(&self, other: &Self) -> bool {
        self.defines == other.defines
    }
}

impl Eq for ShaderDefines {}

impl From<&[(&str, &str)]> for ShaderDefines {
    fn from(defines: &[(&str, &str)]) -> Self {
        let mut result = Self::new();
        for (k, v) in defines {
            result.set(k, v);
        }
        result
    }
}
