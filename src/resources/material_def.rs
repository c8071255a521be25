//! Compiled material definitions.
//!
//! A [`MaterialDefinition`] is the artifact handed to the program builder:
//! the material name, its parameter table, and one [`SubTechnology`] per
//! shading variant, each holding generated vertex/fragment sources.

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::params::{Parameter, ParameterTable};
use super::shader_defines::ShaderDefines;
use super::stage::{StageKind, StageSource};
use super::vars::Variable;

// ============================================================================
// SubTechnology
// ============================================================================

/// One independently generated shading variant.
#[derive(Debug, Clone, Serialize)]
pub struct SubTechnology {
    name: String,
    variables: Vec<Variable>,
    stages: Vec<StageSource>,
}

impl SubTechnology {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            stages: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pass-through variables in declaration order. Duplicates are kept.
    #[inline]
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub(crate) fn push_variable(&mut self, var: Variable) {
        self.variables.push(var);
    }

    /// Stores a generated stage, returning the one it replaces.
    pub(crate) fn set_stage(&mut self, stage: StageSource) -> Option<StageSource> {
        match self.stages.iter_mut().find(|s| s.kind() == stage.kind()) {
            Some(slot) => Some(std::mem::replace(slot, stage)),
            None => {
                self.stages.push(stage);
                None
            }
        }
    }

    #[must_use]
    pub fn stage(&self, kind: StageKind) -> Option<&StageSource> {
        self.stages.iter().find(|s| s.kind() == kind)
    }

    #[inline]
    #[must_use]
    pub fn vertex(&self) -> Option<&StageSource> {
        self.stage(StageKind::Vertex)
    }

    #[inline]
    #[must_use]
    pub fn fragment(&self) -> Option<&StageSource> {
        self.stage(StageKind::Fragment)
    }

    /// Generated stages in the order their blocks appeared.
    #[inline]
    #[must_use]
    pub fn stages(&self) -> &[StageSource] {
        &self.stages
    }

    /// Union of referenced parameters over all stages, first-seen order.
    #[must_use]
    pub fn used_parameters(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for name in self.stages.iter().flat_map(|s| &s.usage().parameters) {
            if !out.contains(&name.as_str()) {
                out.push(name);
            }
        }
        out
    }

    /// Union of referenced context bindings over all stages, first-seen order.
    #[must_use]
    pub fn used_contexts(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for &name in self.stages.iter().flat_map(|s| &s.usage().contexts) {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}

// ============================================================================
// MaterialDefinition
// ============================================================================

/// Root of a compiled material document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterialDefinition {
    name: String,
    parameters: ParameterTable,
    sub_technologies: Vec<SubTechnology>,
    #[serde(skip)]
    sub_index: FxHashMap<String, usize>,
    #[serde(skip)]
    ignored_trailing_lines: usize,
}

impl MaterialDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut ParameterTable {
        &mut self.parameters
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Sub-technologies in document order.
    #[inline]
    #[must_use]
    pub fn sub_technologies(&self) -> &[SubTechnology] {
        &self.sub_technologies
    }

    #[must_use]
    pub fn sub_technology(&self, name: &str) -> Option<&SubTechnology> {
        self.sub_index.get(name).map(|&i| &self.sub_technologies[i])
    }

    #[must_use]
    pub fn has_sub_technology(&self, name: &str) -> bool {
        self.sub_index.contains_key(name)
    }

    /// Registers a finished sub-technology. Hands it back on a name collision.
    pub(crate) fn insert_sub_technology(&mut self, tech: SubTechnology) -> Result<(), SubTechnology> {
        if self.sub_index.contains_key(tech.name()) {
            return Err(tech);
        }
        self.sub_index.insert(tech.name.clone(), self.sub_technologies.len());
        self.sub_technologies.push(tech);
        Ok(())
    }

    /// Count of non-comment lines after the root block that were not compiled.
    #[inline]
    #[must_use]
    pub fn ignored_trailing_lines(&self) -> usize {
        self.ignored_trailing_lines
    }

    pub(crate) fn set_ignored_trailing_lines(&mut self, count: usize) {
        self.ignored_trailing_lines = count;
    }

    /// Guard macros that materialize the named parameters.
    ///
    /// Unknown names are skipped with a warning.
    pub fn defines_for<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> ShaderDefines {
        let mut defines = ShaderDefines::new();
        for name in names {
            match self.parameters.get(name) {
                Some(param) => defines.set(param.guard_name(), "1"),
                None => log::warn!("Material '{}' has no parameter '{}'", self.name, name),
            }
        }
        defines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::stage::StageUsage;

    fn stage(kind: StageKind, params: &[&str], contexts: &[&'static str]) -> StageSource {
        let usage = StageUsage {
            parameters: params.iter().map(ToString::to_string).collect(),
            contexts: contexts.to_vec(),
            variables: Vec::new(),
        };
        StageSource::new(kind, String::new(), usage)
    }

    #[test]
    fn set_stage_replaces_same_kind() {
        let mut tech = SubTechnology::new("T");
        assert!(tech.set_stage(stage(StageKind::Vertex, &[], &[])).is_none());
        assert!(tech.set_stage(stage(StageKind::Fragment, &[], &[])).is_none());
        assert!(tech.set_stage(stage(StageKind::Vertex, &["A"], &[])).is_some());

        assert_eq!(tech.stages().len(), 2);
        assert!(tech.vertex().unwrap().uses_parameter("A"));
    }

    #[test]
    fn usage_unions_keep_first_seen_order() {
        let mut tech = SubTechnology::new("T");
        tech.set_stage(stage(StageKind::Vertex, &["B", "A"], &["ModelMatrix"]));
        tech.set_stage(stage(StageKind::Fragment, &["A", "C"], &["OutColor", "ModelMatrix"]));

        assert_eq!(tech.used_parameters(), ["B", "A", "C"]);
        assert_eq!(tech.used_contexts(), ["ModelMatrix", "OutColor"]);
    }

    #[test]
    fn sub_technology_names_are_unique() {
        let mut def = MaterialDefinition::new();
        def.insert_sub_technology(SubTechnology::new("Forward")).unwrap();
        let rejected = def.insert_sub_technology(SubTechnology::new("Forward")).unwrap_err();

        assert_eq!(rejected.name(), "Forward");
        assert_eq!(def.sub_technologies().len(), 1);
        assert!(def.has_sub_technology("Forward"));
    }

    #[test]
    fn defines_for_skips_unknown_names() {
        let mut def = MaterialDefinition::new();
        def.parameters_mut()
            .insert(Parameter::new("vec3", "Color", None, "PARAM_Color").unwrap())
            .unwrap();

        let defines = def.defines_for(["Color", "Missing"]);
        assert_eq!(defines.len(), 1);
        assert_eq!(defines.get("PARAM_Color"), Some("1"));
    }
}
