#![forbid(unsafe_code)]
#![allow(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![deny(unused_must_use)]

//! Tern syntax tree
//!
//! This crate provides:
//! - Closed-enum node definitions with stable node ids and spans
//! - Element and scope identifiers shared with the program model
//! - A read-only visitor with default walkers
//! - A builder for assembling trees outside the parser
//!
//! Declarations arrive already annotated with the elements produced by the
//! element-building pass; the resolver binds everything else.

pub mod builder;
pub mod ids;
pub mod nodes;
pub mod visitors;

// Re-export main types
pub use builder::AstBuilder;
pub use ids::*;
pub use nodes::*;
pub use visitors::*;

/// AST version for compatibility checking
pub const AST_VERSION: u32 = 1;
