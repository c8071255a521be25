//! Parameter and Variable Table Builders
//!
//! Both block types hold one declaration per line, ending with the statement
//! terminator:
//!
//! ```text
//! Params {
//!     vec4 Color;
//!     float Roughness = 0.5;
//!     vec3 Tint = vec3(1.0, 1.0, 1.0);
//! }
//! Vars {
//!     vec2 uv;
//! }
//! ```
//!
//! Blank lines and comment lines are skipped. A `Params` line may carry a
//! default value either as `type name = value` (everything after `=`) or as
//! a bare third token `type name value`. Array declarations such as
//! `float Weights[4];` keep their size on the generated declaration while
//! stage bodies refer to the bare name.

use once_cell::sync::Lazy;
use regex::Regex;

use super::scanner::Block;
use crate::errors::{MatDefError, Result};
use crate::resources::{Parameter, ParameterTable, SubTechnology, Variable};
use crate::settings::CompilerSettings;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Trimmed, terminator-stripped declaration tokens of one interior line.
///
/// `name` is the identifier part of the second token; an array size such as
/// `[4]` is split off into `array_suffix`.
struct Declaration<'a> {
    line: usize,
    text: &'a str,
    name: &'a str,
    array_suffix: Option<&'a str>,
    tokens: Vec<&'a str>,
}

fn malformed(block: &Block<'_>, line: usize, text: &str, reason: &'static str) -> MatDefError {
    MatDefError::MalformedLine {
        block: block.kind().to_string(),
        line: line + 1,
        text: text.to_string(),
        reason,
    }
}

fn declarations<'a>(
    block: &Block<'a>,
    settings: &CompilerSettings,
) -> Result<Vec<Declaration<'a>>> {
    let mut out = Vec::new();
    for (line, raw) in block.interior() {
        let text = raw.trim();
        if text.is_empty() || settings.is_comment(text) {
            continue;
        }
        let Some(body) = text.strip_suffix(settings.terminator) else {
            return Err(malformed(block, line, text, "missing statement terminator"));
        };
        let tokens: Vec<&str> = body.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(malformed(block, line, text, "expected `<type> <name>`"));
        }
        let declarator = tokens[1];
        let (name, array_suffix) = match declarator.find('[') {
            Some(i) => (&declarator[..i], Some(&declarator[i..])),
            None => (declarator, None),
        };
        if !IDENTIFIER.is_match(name) {
            return Err(malformed(block, line, text, "name is not an identifier"));
        }
        if array_suffix.is_some_and(|s| !s.ends_with(']')) {
            return Err(malformed(block, line, text, "unterminated array size"));
        }
        out.push(Declaration {
            line,
            text,
            name,
            array_suffix,
            tokens,
        });
    }
    Ok(out)
}

fn default_value(decl: &Declaration<'_>) -> Option<String> {
    let rest = &decl.tokens[2..];
    let first = rest.first()?;

    if let Some(after_eq) = first.strip_prefix('=') {
        let mut parts: Vec<&str> = Vec::with_capacity(rest.len());
        if !after_eq.is_empty() {
            parts.push(after_eq);
        }
        parts.extend_from_slice(&rest[1..]);
        if parts.is_empty() {
            log::warn!(
                "Line {}: '=' without a default value, ignoring: '{}'",
                decl.line + 1,
                decl.text
            );
            return None;
        }
        return Some(parts.join(" "));
    }

    if rest.len() > 1 {
        log::warn!(
            "Line {}: extra tokens after default value '{}' ignored: '{}'",
            decl.line + 1,
            first,
            decl.text
        );
    }
    Some((*first).to_string())
}

/// Interprets a `Params` block into the material's parameter table.
pub fn build_parameters(
    block: &Block<'_>,
    table: &mut ParameterTable,
    settings: &CompilerSettings,
) -> Result<()> {
    for decl in declarations(block, settings)? {
        let (ty, name) = (decl.tokens[0], decl.name);
        let mut param = Parameter::new(ty, name, default_value(&decl), settings.guard_name(name))
            .map_err(|_| malformed(block, decl.line, decl.text, "cannot build match pattern"))?;
        if let Some(suffix) = decl.array_suffix {
            param = param.with_array_suffix(suffix);
        }

        if table.insert(param).is_err() {
            return Err(MatDefError::DuplicateName {
                kind: "parameter",
                name: name.to_string(),
                line: decl.line + 1,
            });
        }
        log::trace!("Parameter '{name}' ({ty}) declared at line {}", decl.line + 1);
    }
    Ok(())
}

/// Interprets a `Vars` block, appending to the sub-technology's variables.
pub fn build_variables(
    block: &Block<'_>,
    tech: &mut SubTechnology,
    settings: &CompilerSettings,
) -> Result<()> {
    for decl in declarations(block, settings)? {
        if decl.tokens.len() > 2 {
            log::warn!(
                "Line {}: extra tokens in Vars declaration ignored: '{}'",
                decl.line + 1,
                decl.text
            );
        }
        let mut var = Variable::new(decl.tokens[0], decl.name)
            .map_err(|_| malformed(block, decl.line, decl.text, "cannot build match pattern"))?;
        if let Some(suffix) = decl.array_suffix {
            var = var.with_array_suffix(suffix);
        }
        tech.push_variable(var);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::scanner::{BlockKind, scan_block};

    fn with_block<R>(text: &str, kind: BlockKind, f: impl FnOnce(&Block<'_>) -> R) -> R {
        let lines: Vec<&str> = text.lines().collect();
        let block = scan_block(&lines, 0, kind, None, &CompilerSettings::default()).unwrap();
        f(&block)
    }

    fn params(text: &str) -> Result<ParameterTable> {
        with_block(text, BlockKind::Params, |block| {
            let mut table = ParameterTable::new();
            build_parameters(block, &mut table, &CompilerSettings::default()).map(|()| table)
        })
    }

    #[test]
    fn parses_types_names_and_defaults() {
        let table = params(
            "Params {\n\
             vec3 Color;\n\
             float Roughness = 0.5;\n\
             vec3 Tint = vec3(1.0, 0.5, 0.25);\n\
             int Mode 2;\n\
             // float Hidden;\n\
             \n\
             }",
        )
        .unwrap();

        let got: Vec<_> = table
            .iter()
            .map(|p| (p.declared_type(), p.name(), p.default_value()))
            .collect();
        assert_eq!(
            got,
            [
                ("vec3", "Color", None),
                ("float", "Roughness", Some("0.5")),
                ("vec3", "Tint", Some("vec3(1.0, 0.5, 0.25)")),
                ("int", "Mode", Some("2")),
            ]
        );
        assert_eq!(table.get("Color").unwrap().guard_name(), "PARAM_Color");
    }

    #[test]
    fn attached_equals_sign_is_accepted() {
        let table = params("Params {\nfloat Gloss =0.25;\n}").unwrap();
        assert_eq!(table.get("Gloss").unwrap().default_value(), Some("0.25"));
    }

    #[test]
    fn duplicate_parameter_is_rejected() {
        let err = params("Params {\nvec3 Color;\nvec4 Color;\n}").unwrap_err();
        assert_eq!(
            err,
            MatDefError::DuplicateName {
                kind: "parameter",
                name: "Color".into(),
                line: 3,
            }
        );
    }

    #[test]
    fn malformed_parameter_lines() {
        let err = params("Params {\nvec3;\n}").unwrap_err();
        assert!(matches!(err, MatDefError::MalformedLine { line: 2, .. }));

        let err = params("Params {\nvec3 Color\n}").unwrap_err();
        assert!(matches!(
            err,
            MatDefError::MalformedLine { reason: "missing statement terminator", .. }
        ));

        let err = params("Params {\nvec3 Params.Color;\n}").unwrap_err();
        assert!(matches!(
            err,
            MatDefError::MalformedLine { reason: "name is not an identifier", .. }
        ));
    }

    #[test]
    fn array_declarations_split_name_and_size() {
        let table = params("Params {\nfloat Weights[4];\nvec3 Lights[MAX_LIGHTS] = vec3(0.0);\n}").unwrap();

        let weights = table.get("Weights").unwrap();
        assert_eq!(weights.declared_type(), "float");
        assert_eq!(weights.array_suffix(), Some("[4]"));
        assert_eq!(weights.default_value(), None);

        let lights = table.get("Lights").unwrap();
        assert_eq!(lights.array_suffix(), Some("[MAX_LIGHTS]"));
        assert_eq!(lights.default_value(), Some("vec3(0.0)"));

        let err = params("Params {\nfloat Weights[4;\n}").unwrap_err();
        assert!(matches!(
            err,
            MatDefError::MalformedLine { reason: "unterminated array size", .. }
        ));

        with_block("Vars {\nvec2 uvs[2];\n}", BlockKind::Vars, |block| {
            let mut tech = SubTechnology::new("T");
            build_variables(block, &mut tech, &CompilerSettings::default()).unwrap();
            assert_eq!(tech.variables()[0].name(), "uvs");
            assert_eq!(tech.variables()[0].array_suffix(), Some("[2]"));
        });
    }

    #[test]
    fn variables_keep_order_and_duplicates() {
        with_block("Vars {\nvec3 outColor;\n\nvec2 uv;\nvec3 outColor;\n}", BlockKind::Vars, |block| {
            let mut tech = SubTechnology::new("T");
            build_variables(block, &mut tech, &CompilerSettings::default()).unwrap();

            let got: Vec<_> = tech
                .variables()
                .iter()
                .map(|v| (v.declared_type(), v.name()))
                .collect();
            assert_eq!(got, [("vec3", "outColor"), ("vec2", "uv"), ("vec3", "outColor")]);
        });
    }

    #[test]
    fn malformed_variable_line() {
        with_block("Vars {\nvec3\n;\n}", BlockKind::Vars, |block| {
            let mut tech = SubTechnology::new("T");
            let err = build_variables(block, &mut tech, &CompilerSettings::default()).unwrap_err();
            assert!(matches!(err, MatDefError::MalformedLine { line: 2, .. }));
        });
    }
}
