//! Tern
//!
//! Name resolution for a class-based language with libraries, interfaces
//! with default classes, and library-private names. The work happens in
//! `tern_resolve`; this crate drives it over many units at once and renders
//! what it reports.

pub use tern_ast as ast;
pub use tern_diagnostics as diagnostics;
pub use tern_resolve as resolve;

pub mod driver;
pub mod tracing_config;
