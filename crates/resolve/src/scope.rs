//! Scope frames and the lexical scope chain
//!
//! Library and import scopes are built upstream and live frozen inside the
//! `Program`. Every other frame is pushed and popped by a resolution pass on
//! top of a library root. Class frames bind nothing themselves and answer
//! lookups from the class's members, inherited members and type variables.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tern_ast::{ElementId, ScopeId};

use crate::config::ResolverConfig;
use crate::program::Program;
use crate::store::ElementStore;

/// A single scope frame
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// Parent scope; only frozen program scopes link to one
    pub parent: Option<ScopeId>,
    /// Library whose code this scope belongs to
    pub library: Option<ElementId>,
    elements: IndexMap<String, ElementId>,
    declared_not_reached: FxHashSet<String>,
    labels: IndexMap<String, ElementId>,
}

impl Scope {
    pub fn new(id: ScopeId, kind: ScopeKind) -> Self {
        Self {
            id,
            kind,
            parent: None,
            library: None,
            elements: IndexMap::new(),
            declared_not_reached: FxHashSet::default(),
            labels: IndexMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: ScopeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_library(mut self, library: ElementId) -> Self {
        self.library = Some(library);
        self
    }

    /// Bind `name` unless this frame already has it; returns the existing
    /// binding on conflict and keeps it.
    pub fn declare(&mut self, name: &str, element: ElementId) -> Result<(), ElementId> {
        match self.elements.get(name) {
            Some(&existing) => Err(existing),
            None => {
                self.elements.insert(name.to_string(), element);
                Ok(())
            }
        }
    }

    /// Look up an element in this frame (not recursive)
    pub fn lookup_local(&self, name: &str) -> Option<ElementId> {
        self.elements.get(name).copied()
    }

    pub fn local_elements(&self) -> impl Iterator<Item = (&String, &ElementId)> {
        self.elements.iter()
    }

    pub fn add_label(&mut self, name: &str, label: ElementId) -> Result<(), ElementId> {
        match self.labels.get(name) {
            Some(&existing) => Err(existing),
            None => {
                self.labels.insert(name.to_string(), label);
                Ok(())
            }
        }
    }

    pub fn lookup_label(&self, name: &str) -> Option<ElementId> {
        self.labels.get(name).copied()
    }

    pub fn mark_declared_not_reached(&mut self, name: &str) {
        self.declared_not_reached.insert(name.to_string());
    }

    pub fn remove_declared_not_reached(&mut self, name: &str) {
        self.declared_not_reached.remove(name);
    }

    pub fn is_declared_not_reached(&self, name: &str) -> bool {
        self.declared_not_reached.contains(name)
    }
}

/// Different kinds of scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Library,
    Import,
    /// Synthetic frame holding declarations local to one unit
    Unit,
    Class(ElementId),
    FunctionAlias(ElementId),
    Method(ElementId),
    Function(ElementId),
    Block,
    While,
    DoWhile,
    If,
    For,
    ForIn,
    Try,
    Switch,
    SwitchMember,
    /// `L: break L;`
    Break,
}

impl ScopeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScopeKind::Library => "<library>",
            ScopeKind::Import => "<import>",
            ScopeKind::Unit => "<unit>",
            ScopeKind::Class(_) => "<class>",
            ScopeKind::FunctionAlias(_) => "<function alias>",
            ScopeKind::Method(_) => "<method>",
            ScopeKind::Function(_) => "<function>",
            ScopeKind::Block => "<block>",
            ScopeKind::While => "<while>",
            ScopeKind::DoWhile => "<do>",
            ScopeKind::If => "<if>",
            ScopeKind::For => "<for>",
            ScopeKind::ForIn => "<for in>",
            ScopeKind::Try => "<try>",
            ScopeKind::Switch => "<switch>",
            ScopeKind::SwitchMember => "<switch member>",
            ScopeKind::Break => "<break>",
        }
    }
}

/// Frames pushed by one pass, rooted at a frozen library scope
#[derive(Debug)]
pub struct ScopeChain<'p> {
    program: &'p Program,
    root: ScopeId,
    frames: Vec<Scope>,
    next_id: u32,
}

impl<'p> ScopeChain<'p> {
    pub fn new(program: &'p Program, root: ScopeId) -> Self {
        Self {
            program,
            root,
            frames: Vec::new(),
            next_id: program.scope_count() as u32,
        }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Library of the innermost frame, falling back to the root's
    pub fn library(&self) -> Option<ElementId> {
        self.frames
            .iter()
            .rev()
            .find_map(|scope| scope.library)
            .or_else(|| self.program.scope(self.root).and_then(|scope| scope.library))
    }

    pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.next_id);
        self.next_id += 1;
        let mut scope = Scope::new(id, kind);
        scope.library = self.library();
        tracing::trace!(scope = %id, kind = kind.label(), "push scope");
        self.frames.push(scope);
        id
    }

    pub fn pop(&mut self) -> Option<Scope> {
        let scope = self.frames.pop();
        if let Some(scope) = &scope {
            tracing::trace!(scope = %scope.id, kind = scope.kind.label(), "pop scope");
        }
        scope
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current(&self) -> Option<&Scope> {
        self.frames.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Scope> {
        self.frames.last_mut()
    }

    /// Innermost pushed frame of the given kind
    pub fn find_frame(&self, predicate: impl Fn(&ScopeKind) -> bool) -> Option<&Scope> {
        self.frames.iter().rev().find(|scope| predicate(&scope.kind))
    }

    pub fn find_frame_mut(&mut self, predicate: impl Fn(&ScopeKind) -> bool) -> Option<&mut Scope> {
        self.frames.iter_mut().rev().find(|scope| predicate(&scope.kind))
    }

    /// Walk from the innermost frame outward to the library root and return
    /// the first element bound to `name` that `from_library` may see.
    /// A private name bound in another library is skipped, not returned.
    pub fn find_element(
        &self,
        store: &ElementStore<'_>,
        config: &ResolverConfig,
        from_library: Option<ElementId>,
        name: &str,
    ) -> Option<ElementId> {
        let visible = |element: ElementId| match from_library {
            Some(library) if config.is_private(name) => store.library_of(element) == Some(library),
            _ => true,
        };

        for scope in self.frames.iter().rev() {
            let candidate = match scope.kind {
                ScopeKind::Class(class) => store.class_scope_lookup(class, name),
                _ => scope.lookup_local(name),
            };
            if let Some(element) = candidate.filter(|&element| visible(element)) {
                return Some(element);
            }
        }

        self.find_in_program_scope(store, config, self.root, from_library, name)
    }

    /// Look `name` up in a frozen program scope and its parents, such as the
    /// export scope behind a library prefix
    pub fn find_in_program_scope(
        &self,
        store: &ElementStore<'_>,
        config: &ResolverConfig,
        start: ScopeId,
        from_library: Option<ElementId>,
        name: &str,
    ) -> Option<ElementId> {
        let private = config.is_private(name);
        let mut cursor = Some(start);
        let mut steps = 0;
        while let Some(id) = cursor {
            let scope = self.program.scope(id)?;
            let found = scope.lookup_local(name).filter(|&element| match from_library {
                Some(library) if private => store.library_of(element) == Some(library),
                _ => true,
            });
            if found.is_some() {
                return found;
            }
            steps += 1;
            if steps > self.program.scope_count() {
                return None;
            }
            cursor = scope.parent;
        }
        None
    }

    /// Nearest label named `name` among the pushed frames
    pub fn find_label(&self, name: &str) -> Option<ElementId> {
        self.frames.iter().rev().find_map(|scope| scope.lookup_label(name))
    }

    /// True when `name` is pre-registered in an enclosing block whose
    /// declaration has not been reached, and no nearer frame binds it.
    pub fn is_declared_but_not_reached(&self, name: &str) -> bool {
        for scope in self.frames.iter().rev() {
            if scope.lookup_local(name).is_some() {
                return false;
            }
            if scope.is_declared_not_reached(name) {
                return true;
            }
        }
        false
    }
}
