//! Shader Stage Synthesizer
//!
//! Generates one stage from a `Vs_Shader_Main` / `Fs_Shader_Main` block.
//!
//! Every interior line goes through three passes, in this order:
//!
//! 1. **Variables**: each declared pass-through variable found in the line
//!    is marked used. The line is not changed.
//! 2. **Parameters**: each `Params.<name>` reference is rewritten to
//!    `<name>` and the parameter is marked used. Parameters are tried in
//!    declaration order.
//! 3. **Context**: each `Context.<Name>` reference is rewritten to the
//!    binding's replacement identifier and the binding is marked used.
//!    Bindings are tried in registry order.
//!
//! The rewritten line is trimmed and appended to the body. The stage is then
//! assembled as:
//!
//! ```text
//! <version header>
//! <precision line>                      fragment only
//! <context declarations>                used bindings with a declared type
//! #ifdef <guard> / <decl> / #endif      every parameter, if any was used
//! <out|in> <type> <name>;               used variables, once per name
//! void main(){
//! <body>
//! }
//! ```

use std::borrow::Cow;

use super::context::{self, ContextBinding};
use super::scanner::Block;
use crate::resources::{ParameterTable, StageKind, StageSource, StageUsage, Variable};
use crate::settings::CompilerSettings;

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Synthesizes one stage. Uses the global context registry.
#[must_use]
pub fn synthesize(
    block: &Block<'_>,
    stage: StageKind,
    params: &ParameterTable,
    vars: &[Variable],
    settings: &CompilerSettings,
) -> StageSource {
    synthesize_with_registry(block, stage, params, vars, context::registry(), settings)
}

/// Synthesizes one stage against an explicit set of context bindings.
#[must_use]
pub fn synthesize_with_registry(
    block: &Block<'_>,
    stage: StageKind,
    params: &ParameterTable,
    vars: &[Variable],
    registry: &[ContextBinding],
    settings: &CompilerSettings,
) -> StageSource {
    let mut used_vars = vec![false; vars.len()];
    let mut used_params = vec![false; params.len()];
    let mut used_contexts = vec![false; registry.len()];

    let mut body = String::new();
    for (index, raw) in block.interior() {
        for (used, var) in used_vars.iter_mut().zip(vars) {
            if var.is_referenced_by(raw) {
                *used = true;
            }
        }

        let mut line = Cow::Borrowed(raw);
        for (used, param) in used_params.iter_mut().zip(params) {
            if param.is_referenced_by(&line) {
                line = Cow::Owned(param.substitute(&line).into_owned());
                *used = true;
                log::trace!("Line {}: Params.{} substituted", index + 1, param.name());
            }
        }
        for (used, binding) in used_contexts.iter_mut().zip(registry) {
            if binding.is_referenced_by(&line) {
                line = Cow::Owned(binding.substitute(&line).into_owned());
                *used = true;
                log::trace!("Line {}: Context.{} substituted", index + 1, binding.name());
            }
        }

        push_line(&mut body, line.trim());
    }

    let mut source = String::new();
    push_line(&mut source, &settings.version_header);
    if stage.needs_precision()
        && let Some(precision) = &settings.fragment_precision
    {
        push_line(&mut source, precision);
    }

    for (binding, _) in registry.iter().zip(&used_contexts).filter(|(_, used)| **used) {
        if let Some(decl) = binding.declaration(stage) {
            push_line(&mut source, &decl);
        }
    }

    if used_params.contains(&true) {
        for param in params {
            push_line(&mut source, &format!("#ifdef {}", param.guard_name()));
            push_line(
                &mut source,
                &param.declaration(settings.parameter_qualifier.as_deref(), settings.terminator),
            );
            push_line(&mut source, "#endif");
        }
    }

    let declared_vars = first_declarations(vars, &used_vars);
    for var in &declared_vars {
        push_line(
            &mut source,
            &format!(
                "{} {} {}{}{}",
                stage.variable_qualifier(),
                var.declared_type(),
                var.name(),
                var.array_suffix().unwrap_or_default(),
                settings.terminator
            ),
        );
    }

    source.push_str("void main(){\n");
    source.push_str(&body);
    source.push_str("}\n");

    let usage = StageUsage {
        parameters: params
            .iter()
            .zip(&used_params)
            .filter(|(_, used)| **used)
            .map(|(p, _)| p.name().to_string())
            .collect(),
        contexts: registry
            .iter()
            .zip(&used_contexts)
            .filter(|(_, used)| **used)
            .map(|(b, _)| b.name())
            .collect(),
        variables: declared_vars.iter().map(|v| v.name().to_string()).collect(),
    };

    log::debug!(
        "Generated {stage} stage: {} body lines, {} parameters, {} contexts, {} variables used",
        block.interior().count(),
        usage.parameters.len(),
        usage.contexts.len(),
        usage.variables.len()
    );

    StageSource::new(stage, source, usage)
}

/// Used variables, one per name; a repeated name keeps its first declaration.
fn first_declarations<'v>(vars: &'v [Variable], used: &[bool]) -> Vec<&'v Variable> {
    let mut out: Vec<&Variable> = Vec::new();
    for (var, _) in vars.iter().zip(used).filter(|(_, used)| **used) {
        if !out.iter().any(|v| v.name() == var.name()) {
            out.push(var);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::scanner::{BlockKind, scan_block};
    use crate::resources::Parameter;

    fn table(names: &[&str]) -> ParameterTable {
        let mut t = ParameterTable::new();
        for name in names {
            t.insert(Parameter::new("vec3", *name, None, format!("PARAM_{name}")).unwrap())
                .unwrap();
        }
        t
    }

    fn run(body: &str, stage: StageKind, params: &ParameterTable, vars: &[Variable]) -> StageSource {
        let text = format!("void main(){{\n{body}\n}}");
        let lines: Vec<&str> = text.lines().collect();
        let block = scan_block(&lines, 0, BlockKind::ShaderMain(stage), None, &CompilerSettings::default())
            .unwrap();
        synthesize(&block, stage, params, vars, &CompilerSettings::default())
    }

    #[test]
    fn vertex_stage_layout() {
        let params = table(&["Color"]);
        let vars = [Variable::new("vec3", "outColor").unwrap()];
        let stage = run(
            "    outColor = Params.Color;\n    Context.OutPosition = Context.ProjectViewMatrix * Context.ModelMatrix * vec4(Context.InPosition, 1.0);",
            StageKind::Vertex,
            &params,
            &vars,
        );

        assert_eq!(
            stage.source(),
            "#version 300 es\n\
             layout (location=0) in vec3 _context_InPosition;\n\
             uniform mat4 modelMatrix;\n\
             #ifdef PARAM_Color\n\
             uniform vec3 Color;\n\
             #endif\n\
             out vec3 outColor;\n\
             void main(){\n\
             outColor = Color;\n\
             gl_Position = projectViewMatrix * modelMatrix * vec4(_context_InPosition, 1.0);\n\
             }\n"
        );
        assert_eq!(stage.usage().parameters, ["Color"]);
        assert_eq!(
            stage.usage().contexts,
            ["InPosition", "ModelMatrix", "ProjectViewMatrix", "OutPosition"]
        );
        assert_eq!(stage.usage().variables, ["outColor"]);
    }

    #[test]
    fn fragment_stage_has_precision_and_in_variables() {
        let vars = [Variable::new("vec3", "outColor").unwrap()];
        let stage = run(
            "Context.OutColor = vec4(outColor, 1.0);",
            StageKind::Fragment,
            &ParameterTable::new(),
            &vars,
        );

        assert_eq!(
            stage.source(),
            "#version 300 es\n\
             precision mediump float;\n\
             out vec4 _context_OutColor;\n\
             in vec3 outColor;\n\
             void main(){\n\
             _context_OutColor = vec4(outColor, 1.0);\n\
             }\n"
        );
    }

    #[test]
    fn every_parameter_is_guarded_when_any_is_used() {
        let params = table(&["A", "B", "C"]);
        let stage = run("x = Params.B;", StageKind::Vertex, &params, &[]);

        assert_eq!(stage.source().matches("#ifdef PARAM_").count(), 3);
        assert_eq!(stage.source().matches("#endif").count(), 3);
        assert_eq!(stage.usage().parameters, ["B"]);
    }

    #[test]
    fn no_parameter_preamble_when_none_used() {
        let params = table(&["A", "B"]);
        let stage = run("x = 1.0;", StageKind::Vertex, &params, &[]);

        assert!(!stage.source().contains("#ifdef"));
        assert!(stage.usage().parameters.is_empty());
    }

    #[test]
    fn multiple_parameters_on_one_line() {
        let params = table(&["A", "B"]);
        let stage = run("x = Params.A + Params.B * Params.A;", StageKind::Vertex, &params, &[]);

        assert!(stage.source().contains("\nx = A + B * A;\n"));
        assert_eq!(stage.usage().parameters, ["A", "B"]);
    }

    #[test]
    fn parameter_names_never_match_context_patterns() {
        // A parameter whose bare name equals a context name stays untouched
        // by the context pass once rewritten.
        let params = table(&["ModelMatrix"]);
        let stage = run("m = Params.ModelMatrix;", StageKind::Vertex, &params, &[]);

        assert!(stage.source().contains("\nm = ModelMatrix;\n"));
        assert!(stage.usage().contexts.is_empty());
    }

    #[test]
    fn repeated_references_declare_once() {
        let vars = [Variable::new("vec2", "uv").unwrap()];
        let stage = run(
            "uv = Context.InUv0;\nuv = uv * Context.InUv0;",
            StageKind::Vertex,
            &ParameterTable::new(),
            &vars,
        );

        assert_eq!(stage.source().matches("in vec2 _context_InUv0;").count(), 1);
        assert_eq!(stage.source().matches("out vec2 uv;").count(), 1);
        assert_eq!(stage.usage().contexts, ["InUv0"]);
    }

    #[test]
    fn repeated_variable_name_is_declared_once() {
        let vars = [
            Variable::new("vec3", "c").unwrap(),
            Variable::new("vec4", "c").unwrap(),
        ];
        let stage = run("c = vec3(1.0);", StageKind::Vertex, &ParameterTable::new(), &vars);

        assert_eq!(stage.source().matches(" c;").count(), 1);
        assert!(stage.source().contains("\nout vec3 c;\n"));
        assert_eq!(stage.usage().variables, ["c"]);
    }

    #[test]
    fn array_variable_keeps_its_size() {
        let vars = [Variable::new("vec2", "uvs").unwrap().with_array_suffix("[2]")];
        let stage = run("uvs[0] = Context.InUv0;", StageKind::Vertex, &ParameterTable::new(), &vars);

        assert!(stage.source().contains("\nout vec2 uvs[2];\n"));
    }

    #[test]
    fn untyped_context_is_substituted_without_declaration() {
        let stage = run(
            "Context.OutPosition = vec4(0.0);",
            StageKind::Vertex,
            &ParameterTable::new(),
            &[],
        );

        assert_eq!(
            stage.source(),
            "#version 300 es\nvoid main(){\ngl_Position = vec4(0.0);\n}\n"
        );
        assert_eq!(stage.usage().contexts, ["OutPosition"]);
    }
}
