#![forbid(unsafe_code)]
#![allow(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![deny(unused_must_use)]

//! Tern Name Resolution
//!
//! This crate provides:
//! - The element model: classes, members, parameters, locals, labels,
//!   type variables, function type aliases and library prefixes
//! - Scope chains rooted at frozen library scopes, with privacy filtering
//! - A tree-walking resolver binding every name in a unit to its element
//! - Constructor checks: implicit defaults, super calls, redirect cycles,
//!   const classes and interface default classes
//! - Diagnostics with stable codes, reported through a `DiagnosticSink`
//!
//! The resolver reads a `Program` built upstream and never mutates it.
//! Elements it has to invent (implicit constructors, locals, labels, the
//! `super` pseudo-element) are returned in the `Resolution` together with
//! the per-node bindings, so independent units can be resolved in parallel.

pub mod bindings;
pub mod class_graph;
pub mod config;
pub mod constructors;
pub mod context;
pub mod element;
pub mod errors;
pub mod frame;
pub mod program;
pub mod resolver;
pub mod scope;
pub mod store;
pub mod types;

// Re-export main types
pub use bindings::{Binding, Bindings, Resolution};
pub use class_graph::ElementGraph;
pub use config::ResolverConfig;
pub use constructors::SuperInvocation;
pub use context::ResolutionContext;
pub use element::{Element, ElementKind, LabelKind, Modifiers};
pub use errors::{DiagnosticSink, ErrorCode, InternalError, ResolveError, ResolveResult};
pub use program::{Program, ProgramBuilder};
pub use resolver::Resolver;
pub use scope::{Scope, ScopeChain, ScopeKind};
pub use store::ElementStore;
pub use types::{CoreTypes, Type, TypeProvider};

/// Resolver version for compatibility checking
pub const RESOLVER_VERSION: u32 = 1;
