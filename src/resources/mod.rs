//! Compiled artifact types
//!
//! Plain data produced by the compiler and consumed by the program builder:
//! - MaterialDefinition: the compiled document root
//! - SubTechnology: one shading variant and its generated stages
//! - Parameter / ParameterTable: material inputs
//! - Variable: vertex-to-fragment pass-through values
//! - StageSource / StageUsage: generated stage text and what it references
//! - ShaderDefines: macro sets selecting guarded parameter declarations

pub mod material_def;
pub mod params;
pub mod shader_defines;
pub mod stage;
pub mod vars;

pub use material_def::{MaterialDefinition, SubTechnology};
pub use params::{Parameter, ParameterTable};
pub use shader_defines::ShaderDefines;
pub use stage::{StageKind, StageSource, StageUsage};
pub use vars::Variable;
