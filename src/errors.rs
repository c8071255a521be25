//! Error Types
//!
//! This module defines the error types reported by the material definition
//! compiler.
//!
//! # Overview
//!
//! The main error type [`MatDefError`] covers the three ways a document can
//! be rejected:
//! - Structural problems (unbalanced braces, no top-level block, blocks in
//!   the wrong place)
//! - Name collisions (parameters, sub-technologies)
//! - Malformed declaration lines inside `Params` / `Vars` blocks
//!
//! Compilation has no partial-success mode: the first error aborts the whole
//! document and no partially built [`MaterialDefinition`] is returned.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, MatDefError>`.
//!
//! ```rust,ignore
//! use matdef::errors::{MatDefError, Result};
//!
//! match matdef::compile(text) {
//!     Ok(def) => println!("compiled {}", def.name()),
//!     Err(MatDefError::Structural { message, .. }) => eprintln!("{message}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! [`MaterialDefinition`]: crate::resources::MaterialDefinition

use thiserror::Error;

/// The main error type for the material definition compiler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatDefError {
    // ========================================================================
    // Structure
    // ========================================================================
    /// Block nesting is broken, no top-level block exists, or a block appears
    /// somewhere it cannot be interpreted.
    #[error("Structural error{}: {message}", fmt_line(.line))]
    Structural {
        /// 1-based document line the problem was detected at, if any
        line: Option<usize>,
        /// Human readable description
        message: String,
    },

    // ========================================================================
    // Declarations
    // ========================================================================
    /// Two declarations share a name that must be unique.
    #[error("Duplicate {kind} name '{name}' at line {line}")]
    DuplicateName {
        /// What kind of declaration collided ("parameter", "sub-technology")
        kind: &'static str,
        /// The colliding name
        name: String,
        /// 1-based line of the second declaration
        line: usize,
    },

    /// A `Params` / `Vars` line could not be split into a declaration.
    #[error("Malformed line {line} in {block} block ({reason}): '{text}'")]
    MalformedLine {
        /// Kind of the block the line belongs to
        block: String,
        /// 1-based document line
        line: usize,
        /// The trimmed line text
        text: String,
        /// Why the line was rejected
        reason: &'static str,
    },
}

fn fmt_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}

impl MatDefError {
    pub(crate) fn structural(line: Option<usize>, message: impl Into<String>) -> Self {
        MatDefError::Structural {
            line,
            message: message.into(),
        }
    }
}

/// Alias for `Result<T, MatDefError>`.
pub type Result<T> = std::result::Result<T, MatDefError>;
