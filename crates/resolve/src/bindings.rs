//! Side tables produced by a resolution pass

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use tern_ast::{ElementId, NodeId};

use crate::element::Element;
use crate::types::Type;

/// What a node was bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Element(ElementId),
    /// Visited, but nothing could be bound
    Unresolved,
}

impl Binding {
    pub fn element(self) -> Option<ElementId> {
        match self {
            Binding::Element(id) => Some(id),
            Binding::Unresolved => None,
        }
    }
}

impl From<Option<ElementId>> for Binding {
    fn from(element: Option<ElementId>) -> Self {
        element.map_or(Binding::Unresolved, Binding::Element)
    }
}

/// Node bindings and provisional types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    elements: FxHashMap<NodeId, Binding>,
    types: FxHashMap<NodeId, Type>,
    reported_unresolved: FxHashSet<NodeId>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `node`, replacing an earlier binding
    pub fn bind(&mut self, node: NodeId, element: Option<ElementId>) {
        self.elements.insert(node, element.into());
    }

    pub fn binding(&self, node: NodeId) -> Option<Binding> {
        self.elements.get(&node).copied()
    }

    /// Element bound to `node`; `None` when unresolved or never visited
    pub fn element(&self, node: NodeId) -> Option<ElementId> {
        self.binding(node).and_then(Binding::element)
    }

    pub fn is_unresolved(&self, node: NodeId) -> bool {
        self.binding(node) == Some(Binding::Unresolved)
    }

    pub fn set_type(&mut self, node: NodeId, ty: Type) {
        self.types.insert(node, ty);
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.get(&node)
    }

    /// Remember that a "cannot resolve" diagnostic was already issued here
    pub fn mark_reported(&mut self, node: NodeId) {
        self.reported_unresolved.insert(node);
    }

    pub fn was_reported(&self, node: NodeId) -> bool {
        self.reported_unresolved.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Everything one pass hands to later phases
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub bindings: Bindings,
    /// Elements created by the pass; ids continue after the program's
    pub synthesized: Vec<Element>,
    /// Interface constructor to the default-class constructor it maps to
    pub default_constructors: IndexMap<ElementId, ElementId>,
    /// Types of final fields declared without one, read off their initializer
    pub inferred_field_types: IndexMap<ElementId, Type>,
    /// Labels targeted by a `break` or `continue`
    pub referenced_labels: IndexSet<ElementId>,
}

impl Resolution {
    pub fn element(&self, node: NodeId) -> Option<ElementId> {
        self.bindings.element(node)
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.bindings.type_of(node)
    }

    /// A synthesized element by id
    pub fn synthesized_element(&self, id: ElementId, declared_count: usize) -> Option<&Element> {
        id.index()
            .checked_sub(declared_count)
            .and_then(|offset| self.synthesized.get(offset))
    }
}
