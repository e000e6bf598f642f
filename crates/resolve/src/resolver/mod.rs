//! Tree-walking resolver
//!
//! `Resolver` is the entry point: it resolves a whole unit, or a single
//! class member for incremental use, against a frozen `Program`. The work is
//! done by `ResolveVisitor`, one instance per pass, split by node family
//! across the submodules.

mod declarations;
mod expressions;
mod statements;

use codespan::FileId;
use indexmap::{IndexMap, IndexSet};
use tern_ast::{ClassDecl, ClassMember, DirectiveKind, ElementId, Unit};

use crate::bindings::Resolution;
use crate::config::ResolverConfig;
use crate::context::ResolutionContext;
use crate::element::ElementKind;
use crate::errors::{DiagnosticSink, InternalError, ResolveError, ResolveResult};
use crate::frame::Frame;
use crate::program::Program;
use crate::scope::ScopeKind;
use crate::store::ElementStore;
use crate::types::{Type, TypeProvider};

/// Name resolution over a frozen program model
///
/// A `Resolver` holds no per-pass state, so one instance may resolve any
/// number of units, from any number of threads.
pub struct Resolver<'a> {
    program: &'a Program,
    types: &'a dyn TypeProvider,
    config: ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(program: &'a Program, types: &'a dyn TypeProvider) -> Self {
        Self::with_config(program, types, ResolverConfig::default())
    }

    pub fn with_config(program: &'a Program, types: &'a dyn TypeProvider, config: ResolverConfig) -> Self {
        Self { program, types, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    /// Resolve every declaration of `unit`. Rule violations go to `sink`;
    /// only a broken resolver invariant returns `Err`, after the diagnostics
    /// gathered so far have been forwarded.
    #[tracing::instrument(level = "debug", skip_all, fields(library = %unit.library))]
    pub fn resolve_unit(&self, unit: &Unit, sink: &mut dyn DiagnosticSink) -> ResolveResult<Resolution> {
        let library = self.owning_library(unit);
        let mut visitor = self.visitor(library, unit.file_id)?;
        let result = visitor.resolve_unit(unit, library);
        let (resolution, diagnostics) = visitor.finish();
        forward(diagnostics, sink);
        result.map(|()| resolution)
    }

    /// Resolve one method, constructor or field of `class`, as after an edit
    /// to that member alone
    #[tracing::instrument(level = "debug", skip_all, fields(class = %class.name.name, member = %member.element()))]
    pub fn resolve_member(
        &self,
        class: &ClassDecl,
        member: &ClassMember,
        sink: &mut dyn DiagnosticSink,
    ) -> ResolveResult<Resolution> {
        let library = ElementStore::new(self.program)
            .library_of(class.element)
            .ok_or_else(|| {
                InternalError::new(format!("class '{}' belongs to no library", class.name.name)).with_span(class.span)
            })?;
        let mut visitor = self.visitor(library, None)?;
        let result = visitor.resolve_member(class, member);
        let (resolution, diagnostics) = visitor.finish();
        forward(diagnostics, sink);
        result.map(|()| resolution)
    }

    /// The library a `part of` directive names, else the unit's own
    fn owning_library(&self, unit: &Unit) -> ElementId {
        unit.directives
            .iter()
            .find_map(|directive| match &directive.kind {
                DirectiveKind::PartOf(name) => self.program.find_library(&name.name),
                _ => None,
            })
            .unwrap_or(unit.library)
    }

    fn visitor(&self, library: ElementId, file_id: Option<FileId>) -> ResolveResult<ResolveVisitor<'_>> {
        let root = self
            .program
            .library_scope(library)
            .ok_or_else(|| InternalError::new(format!("library {} has no scope", library)))?;
        let cx = ResolutionContext::new(self.program, root, self.types, &self.config).with_file(file_id);
        Ok(ResolveVisitor::new(cx))
    }
}

fn forward(diagnostics: Vec<ResolveError>, sink: &mut dyn DiagnosticSink) {
    for error in diagnostics {
        sink.report(error);
    }
}

/// State of one resolution pass
pub(crate) struct ResolveVisitor<'a> {
    pub(crate) cx: ResolutionContext<'a>,
    inferred_field_types: IndexMap<ElementId, Type>,
    referenced_labels: IndexSet<ElementId>,
}

impl<'a> ResolveVisitor<'a> {
    pub(crate) fn new(cx: ResolutionContext<'a>) -> Self {
        Self {
            cx,
            inferred_field_types: IndexMap::new(),
            referenced_labels: IndexSet::new(),
        }
    }

    /// Run `f` inside a fresh frame; the frame is popped even when `f` fails
    pub(crate) fn with_scope<T>(
        &mut self,
        kind: ScopeKind,
        f: impl FnOnce(&mut Self) -> ResolveResult<T>,
    ) -> ResolveResult<T> {
        self.cx.push_scope(kind);
        let result = f(self);
        self.cx.pop_scope();
        result
    }

    fn resolve_member(&mut self, class: &ClassDecl, member: &ClassMember) -> ResolveResult<()> {
        let frame = Frame::class(class.element);
        self.with_scope(ScopeKind::Class(class.element), |this| {
            let kind = this.cx.element(member.element())?.kind.clone();
            match (member, kind) {
                (ClassMember::Method(method), ElementKind::Method(_) | ElementKind::Constructor(_)) => {
                    this.resolve_method(method, frame)
                }
                (ClassMember::Field(field), ElementKind::Field(_)) => this.resolve_field(field, frame),
                (_, kind) => Err(InternalError::new(format!(
                    "cannot resolve a {} as a class member",
                    kind.description()
                ))),
            }
        })
    }

    pub(crate) fn finish(self) -> (Resolution, Vec<ResolveError>) {
        self.cx.finish(self.inferred_field_types, self.referenced_labels)
    }
}
