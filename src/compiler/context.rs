//! Context Registry
//!
//! Engine-supplied values a stage body can reference as `Context.<Name>`.
//! During synthesis each reference is rewritten to the binding's engine-side
//! identifier and, when the binding has a declared type, a declaration is
//! added to the stage preamble.
//!
//! | Name                | Replacement            | Declaration                     |
//! |---------------------|------------------------|---------------------------------|
//! | `InPosition`        | `_context_InPosition`  | `vec3`, attribute location 0    |
//! | `InNormal`          | `_context_InNormal`    | `vec3`, attribute location 1    |
//! | `InUv0`             | `_context_InUv0`       | `vec2`, attribute location 2    |
//! | `InTangent`         | `_context_InTangent`   | `vec4`, attribute location 3    |
//! | `InColor`           | `_context_InColor`     | `vec4`, attribute location 4    |
//! | `ModelMatrix`       | `modelMatrix`          | `uniform mat4`                  |
//! | `NormalMatrix`      | `normalMatrix`         | `uniform mat3`                  |
//! | `ViewMatrix`        | `viewMatrix`           | none (engine uniform block)     |
//! | `ProjectMatrix`     | `projectMatrix`        | none (engine uniform block)     |
//! | `ProjectViewMatrix` | `projectViewMatrix`    | none (engine uniform block)     |
//! | `CameraPosition`    | `cameraPosition`       | none (engine uniform block)     |
//! | `OutPosition`       | `gl_Position`          | none (built-in)                 |
//! | `OutColor`          | `_context_OutColor`    | `out vec4`                      |
//!
//! The registry is built once on first use and never mutated, so any number
//! of compilations may read it concurrently.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use crate::resources::StageKind;

/// One engine-supplied symbol recognizable in stage bodies.
#[derive(Debug, Clone)]
pub struct ContextBinding {
    name: &'static str,
    replacement: &'static str,
    declared_type: Option<&'static str>,
    qualifier: Option<&'static str>,
    location: Option<u32>,
    pattern: Regex,
}

impl ContextBinding {
    /// Name used in `Context.<Name>` and reported in stage usage.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub fn replacement(&self) -> &'static str {
        self.replacement
    }

    /// `None` means referenced only; the engine provides the declaration.
    #[inline]
    #[must_use]
    pub fn declared_type(&self) -> Option<&'static str> {
        self.declared_type
    }

    #[inline]
    #[must_use]
    pub fn qualifier(&self) -> Option<&'static str> {
        self.qualifier
    }

    /// Vertex attribute location, for attribute inputs only.
    #[inline]
    #[must_use]
    pub fn location(&self) -> Option<u32> {
        self.location
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

    #[must_use]
    pub fn substitute<'l>(&self, line: &'l str) -> Cow<'l, str> {
        self.pattern.replace_all(line, NoExpand(self.replacement))
    }

    /// Preamble line declaring this binding on the given stage.
    #[must_use]
    pub fn declaration(&self, stage: StageKind) -> Option<String> {
        let ty = self.declared_type?;
        let decl = match (self.location, self.qualifier) {
            (Some(loc), _) if stage.uses_attribute_locations() => {
                format!("layout (location={loc}) in {ty} {};", self.replacement)
            }
            (_, Some(q)) => format!("{q} {ty} {};", self.replacement),
            (_, None) => format!("{ty} {};", self.replacement),
        };
        Some(decl)
    }
}

struct Entry {
    name: &'static str,
    replacement: &'static str,
    declared_type: Option<&'static str>,
    qualifier: Option<&'static str>,
    location: Option<u32>,
}

const fn attribute(name: &'static str, replacement: &'static str, ty: &'static str, loc: u32) -> Entry {
    Entry {
        name,
        replacement,
        declared_type: Some(ty),
        qualifier: Some("in"),
        location: Some(loc),
    }
}

const fn declared(name: &'static str, replacement: &'static str, q: &'static str, ty: &'static str) -> Entry {
    Entry {
        name,
        replacement,
        declared_type: Some(ty),
        qualifier: Some(q),
        location: None,
    }
}

const fn provided(name: &'static str, replacement: &'static str) -> Entry {
    Entry {
        name,
        replacement,
        declared_type: None,
        qualifier: None,
        location: None,
    }
}

const ENTRIES: &[Entry] = &[
    // Vertex attributes
    attribute("InPosition", "_context_InPosition", "vec3", 0),
    attribute("InNormal", "_context_InNormal", "vec3", 1),
    attribute("InUv0", "_context_InUv0", "vec2", 2),
    attribute("InTangent", "_context_InTangent", "vec4", 3),
    attribute("InColor", "_context_InColor", "vec4", 4),
    // Per-object uniforms
    declared("ModelMatrix", "modelMatrix", "uniform", "mat4"),
    declared("NormalMatrix", "normalMatrix", "uniform", "mat3"),
    // Shared view block
    provided("ViewMatrix", "viewMatrix"),
    provided("ProjectMatrix", "projectMatrix"),
    provided("ProjectViewMatrix", "projectViewMatrix"),
    provided("CameraPosition", "cameraPosition"),
    // Stage outputs
    provided("OutPosition", "gl_Position"),
    declared("OutColor", "_context_OutColor", "out", "vec4"),
];

static REGISTRY: Lazy<Vec<ContextBinding>> = Lazy::new(|| {
    ENTRIES
        .iter()
        .map(|e| ContextBinding {
            name: e.name,
            replacement: e.replacement,
            declared_type: e.declared_type,
            qualifier: e.qualifier,
            location: e.location,
            pattern: Regex::new(&format!(r"\bContext\.{}\b", e.name))
                .expect("context registry patterns are static identifiers"),
        })
        .collect()
});

/// All bindings, in registry declaration order.
#[must_use]
pub fn registry() -> &'static [ContextBinding] {
    &REGISTRY
}

#[must_use]
pub fn lookup(name: &str) -> Option<&'static ContextBinding> {
    registry().iter().find(|b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let reg = registry();
        for (i, a) in reg.iter().enumerate() {
            assert!(
                reg[i + 1..].iter().all(|b| b.name() != a.name()),
                "duplicate context {}",
                a.name()
            );
        }
    }

    #[test]
    fn overlapping_names_do_not_cross_match() {
        let view = lookup("ViewMatrix").unwrap();
        let pv = lookup("ProjectViewMatrix").unwrap();

        assert!(!view.is_referenced_by("m = Context.ProjectViewMatrix;"));
        assert!(pv.is_referenced_by("m = Context.ProjectViewMatrix;"));
        assert!(!pv.is_referenced_by("m = Context.ProjectViewMatrixInverse;"));
    }

    #[test]
    fn substitute_uses_replacement() {
        let pos = lookup("OutPosition").unwrap();
        assert_eq!(
            pos.substitute("Context.OutPosition = vec4(0.0);"),
            "gl_Position = vec4(0.0);"
        );
    }

    #[test]
    fn declarations_per_stage() {
        let position = lookup("InPosition").unwrap();
        assert_eq!(
            position.declaration(StageKind::Vertex).as_deref(),
            Some("layout (location=0) in vec3 _context_InPosition;")
        );
        assert_eq!(
            position.declaration(StageKind::Fragment).as_deref(),
            Some("in vec3 _context_InPosition;")
        );

        let model = lookup("ModelMatrix").unwrap();
        assert_eq!(
            model.declaration(StageKind::Vertex).as_deref(),
            Some("uniform mat4 modelMatrix;")
        );

        assert_eq!(lookup("ProjectViewMatrix").unwrap().declaration(StageKind::Vertex), None);
        assert!(lookup("Missing").is_none());
    }
}
