//! Block-Tree Interpreter
//!
//! Walks the block tree in document order and routes each block by kind:
//!
//! | Kind                               | Action                                        |
//! |------------------------------------|-----------------------------------------------|
//! | `Def`                              | set the material name                         |
//! | `Params`                           | build parameters into the material            |
//! | `SubTechnology`                    | open a new sub-technology for all descendants |
//! | `Vars`                             | build variables into the open sub-technology  |
//! | `Vs_Shader` / `Fs_Shader`          | container only                                |
//! | `Vs_Shader_Main` / `Fs_Shader_Main`| synthesize the stage into the sub-technology  |
//! | anything else                      | ignored                                       |
//!
//! After a block is handled its children are visited with the same scope,
//! except below a `SubTechnology`, whose children see the new
//! sub-technology as the active one.

use super::scanner::{Block, BlockKind};
use super::{synthesizer, tables};
use crate::errors::{MatDefError, Result};
use crate::resources::{MaterialDefinition, SubTechnology};
use crate::settings::CompilerSettings;

/// The definition objects in scope while visiting a block.
pub struct DefContext<'a> {
    pub material: &'a mut MaterialDefinition,
    pub sub_technology: Option<&'a mut SubTechnology>,
    pub settings: &'a CompilerSettings,
}

impl<'a> DefContext<'a> {
    #[must_use]
    pub fn new(material: &'a mut MaterialDefinition, settings: &'a CompilerSettings) -> Self {
        Self {
            material,
            sub_technology: None,
            settings,
        }
    }
}

fn outside_sub_technology(block: &Block<'_>) -> MatDefError {
    MatDefError::structural(
        Some(block.start_line() + 1),
        format!("'{}' block must be inside a SubTechnology", block.kind()),
    )
}

/// Interprets `block` and, recursively, all of its children.
pub fn visit(block: &Block<'_>, cx: &mut DefContext<'_>) -> Result<()> {
    log::debug!(
        "Visiting '{}' block{} at line {}",
        block.kind(),
        block.name().map(|n| format!(" '{n}'")).unwrap_or_default(),
        block.start_line() + 1
    );

    match block.kind() {
        BlockKind::Def => {
            cx.material.set_name(block.name().unwrap_or_default());
        }
        BlockKind::Params => {
            tables::build_parameters(block, cx.material.parameters_mut(), cx.settings)?;
        }
        BlockKind::SubTechnology => {
            return visit_sub_technology(block, cx);
        }
        BlockKind::Vars => {
            let Some(tech) = cx.sub_technology.as_deref_mut() else {
                return Err(outside_sub_technology(block));
            };
            tables::build_variables(block, tech, cx.settings)?;
        }
        BlockKind::Shader(_) | BlockKind::Other(_) => {}
        BlockKind::ShaderMain(stage) => {
            let Some(tech) = cx.sub_technology.as_deref_mut() else {
                return Err(outside_sub_technology(block));
            };
            let source = synthesizer::synthesize(
                block,
                *stage,
                cx.material.parameters(),
                tech.variables(),
                cx.settings,
            );
            if tech.set_stage(source).is_some() {
                log::warn!(
                    "SubTechnology '{}': {} stage redefined at line {}, replacing the earlier one",
                    tech.name(),
                    stage,
                    block.start_line() + 1
                );
            }
        }
    }

    for child in block.children() {
        visit(child, cx)?;
    }
    Ok(())
}

fn visit_sub_technology(block: &Block<'_>, cx: &mut DefContext<'_>) -> Result<()> {
    let name = block.name().unwrap_or_default();
    if cx.material.has_sub_technology(name) {
        return Err(MatDefError::DuplicateName {
            kind: "sub-technology",
            name: name.to_string(),
            line: block.start_line() + 1,
        });
    }

    let mut tech = SubTechnology::new(name);
    {
        let mut inner = DefContext {
            material: &mut *cx.material,
            sub_technology: Some(&mut tech),
            settings: cx.settings,
        };
        for child in block.children() {
            visit(child, &mut inner)?;
        }
    }

    cx.material.insert_sub_technology(tech).map_err(|tech| MatDefError::DuplicateName {
        kind: "sub-technology",
        name: tech.name().to_string(),
        line: block.start_line() + 1,
    })
}
