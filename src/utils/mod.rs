//! Utility Module
//!
//! - [`interner`]: String interning for shader macro names
//!
//! ```rust,ignore
//! use matdef::utils::interner;
//!
//! let sym1 = interner::intern("PARAM_Color");
//! let sym2 = interner::intern("PARAM_Color");
//! assert_eq!(sym1, sym2); // O(1) comparison
//! ```

pub mod interner;

pub use interner::Symbol;
