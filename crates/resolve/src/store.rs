//! Read view over the frozen program plus a pass-local overlay
//!
//! Ids below `Program::element_count()` address declared elements; ids at
//! or above it address elements synthesized during the current pass. Both
//! halves share one read interface, so later phases only tell them apart
//! through `Element::synthetic`.

use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tern_ast::ElementId;

use crate::element::{Element, ElementKind};
use crate::program::Program;

#[derive(Debug, Clone)]
pub struct ElementStore<'p> {
    program: &'p Program,
    synthesized: Vec<Element>,
}

impl<'p> ElementStore<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            synthesized: Vec::new(),
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        let declared = self.program.element_count();
        match id.index().checked_sub(declared) {
            None => self.program.element(id),
            Some(offset) => self.synthesized.get(offset),
        }
    }

    /// Add a synthetic element and return its id
    pub fn alloc(&mut self, mut element: Element) -> ElementId {
        let id = ElementId((self.program.element_count() + self.synthesized.len()) as u32);
        element.id = id;
        element.synthetic = true;
        self.synthesized.push(element);
        id
    }

    /// Mutable access to an element this pass synthesized. Declared
    /// elements are frozen and yield `None`.
    pub fn synthesized_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let offset = id.index().checked_sub(self.program.element_count())?;
        self.synthesized.get_mut(offset)
    }

    pub fn synthesized(&self) -> &[Element] {
        &self.synthesized
    }

    pub fn into_synthesized(self) -> Vec<Element> {
        self.synthesized
    }

    pub fn name(&self, id: ElementId) -> &str {
        self.get(id).map_or("", |element| element.name.as_str())
    }

    pub fn kind(&self, id: ElementId) -> Option<&ElementKind> {
        self.get(id).map(|element| &element.kind)
    }

    /// Library that declares `id`
    pub fn library_of(&self, id: ElementId) -> Option<ElementId> {
        let mut cursor = Some(id);
        let mut steps = 0;
        while let Some(current) = cursor {
            let element = self.get(current)?;
            if matches!(element.kind, ElementKind::Library(_)) {
                return Some(current);
            }
            steps += 1;
            if steps > 64 {
                return None;
            }
            cursor = element.enclosing;
        }
        None
    }

    /// Nearest enclosing class of `id`, including `id` itself
    pub fn enclosing_class(&self, id: ElementId) -> Option<ElementId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let element = self.get(current)?;
            match element.kind {
                ElementKind::Class(_) => return Some(current),
                ElementKind::Library(_) => return None,
                _ => cursor = element.enclosing,
            }
        }
        None
    }

    pub fn is_top_level(&self, id: ElementId) -> bool {
        self.get(id)
            .and_then(|element| element.enclosing)
            .and_then(|enclosing| self.kind(enclosing))
            .is_some_and(|kind| matches!(kind, ElementKind::Library(_)))
    }

    /// Non-static field or method declared in a class
    pub fn is_instance_member(&self, id: ElementId) -> bool {
        let Some(element) = self.get(id) else {
            return false;
        };
        let in_class = element
            .enclosing
            .and_then(|enclosing| self.get(enclosing))
            .is_some_and(Element::is_class);
        in_class
            && !element.is_static()
            && matches!(element.kind, ElementKind::Field(_) | ElementKind::Method(_))
    }

    /// Superclass chain above `class`, nearest first; stops at a repeat
    pub fn superclass_chain(&self, class: ElementId) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut cursor = self.supertype(class);
        while let Some(current) = cursor {
            if current == class || chain.contains(&current) {
                break;
            }
            chain.push(current);
            cursor = self.supertype(current);
        }
        chain
    }

    /// Root of the hierarchy: a class without superclass
    pub fn is_object(&self, class: ElementId) -> bool {
        self.get(class).is_some_and(Element::is_class) && self.supertype(class).is_none()
    }

    /// Direct subclass of the hierarchy root
    pub fn is_object_child(&self, class: ElementId) -> bool {
        self.supertype(class).is_some_and(|parent| self.is_object(parent))
    }

    /// `Class.name` for members, the bare name otherwise
    pub fn qualified_name(&self, id: ElementId) -> String {
        let Some(element) = self.get(id) else {
            return String::new();
        };
        match element.enclosing.and_then(|enclosing| self.get(enclosing)) {
            Some(owner) if owner.is_class() => format!("{}.{}", owner.name, element.name),
            _ => element.name.clone(),
        }
    }

    pub fn supertype(&self, class: ElementId) -> Option<ElementId> {
        self.get(class)?.class_data()?.supertype
    }

    /// Direct supertypes: superclass first, then interfaces
    pub fn direct_supertypes(&self, class: ElementId) -> Vec<ElementId> {
        match self.get(class).and_then(Element::class_data) {
            Some(data) => data.supertype.into_iter().chain(data.interfaces.iter().copied()).collect(),
            None => Vec::new(),
        }
    }

    /// Field or method declared directly in `class`
    pub fn lookup_local_member(&self, class: ElementId, name: &str) -> Option<ElementId> {
        let data = self.get(class)?.class_data()?;
        data.members.iter().copied().find(|&member| self.name(member) == name)
    }

    pub fn lookup_constructor(&self, class: ElementId, name: &str) -> Option<ElementId> {
        let data = self.get(class)?.class_data()?;
        data.constructors.iter().copied().find(|&ctor| self.name(ctor) == name)
    }

    pub fn lookup_type_parameter(&self, class: ElementId, name: &str) -> Option<ElementId> {
        let data = self.get(class)?.class_data()?;
        data.type_params.iter().copied().find(|&param| self.name(param) == name)
    }

    /// Member of `class` or of any of its supertypes, nearest first.
    /// Cyclic hierarchies terminate.
    pub fn lookup_member(&self, class: ElementId, name: &str) -> Option<ElementId> {
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([class]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(member) = self.lookup_local_member(current, name) {
                return Some(member);
            }
            queue.extend(self.direct_supertypes(current));
        }
        None
    }

    /// Lookup answered by a class body frame
    pub fn class_scope_lookup(&self, class: ElementId, name: &str) -> Option<ElementId> {
        self.lookup_member(class, name)
            .or_else(|| self.lookup_type_parameter(class, name))
    }

    /// Local member, named constructor or type variable of `class`
    pub fn find_in_class(&self, class: ElementId, name: &str) -> Option<ElementId> {
        self.lookup_local_member(class, name)
            .or_else(|| {
                if name.is_empty() {
                    None
                } else {
                    self.lookup_constructor(class, name)
                }
            })
            .or_else(|| self.lookup_type_parameter(class, name))
    }

    /// True when `target` is `class` or one of its transitive supertypes
    pub fn implements(&self, class: ElementId, target: ElementId) -> bool {
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([class]);
        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            if visited.insert(current) {
                queue.extend(self.direct_supertypes(current));
            }
        }
        false
    }

    /// A class without any declared constructor. Interfaces only qualify
    /// when creation is redirected to a default class.
    pub fn needs_implicit_default_constructor(&self, class: ElementId) -> bool {
        self.get(class)
            .and_then(Element::class_data)
            .is_some_and(|data| {
                data.constructors.is_empty() && (!data.is_interface || data.default_class.is_some())
            })
    }

    /// Whether `new C()` / an implicit `super()` can reach a constructor of
    /// `class` without arguments
    pub fn has_default_constructor(&self, class: ElementId) -> bool {
        if self.needs_implicit_default_constructor(class) {
            return true;
        }
        self.lookup_constructor(class, "")
            .is_some_and(|ctor| self.required_parameter_count(ctor) == 0)
    }

    pub fn parameters(&self, method: ElementId) -> &[ElementId] {
        self.get(method)
            .and_then(Element::method_data)
            .map_or(&[][..], |data| data.params.as_slice())
    }

    pub fn required_parameter_count(&self, method: ElementId) -> usize {
        self.parameters(method)
            .iter()
            .filter(|&&param| self.get(param).is_some_and(Element::is_required_parameter))
            .count()
    }

    pub fn named_parameter_names(&self, method: ElementId) -> Vec<String> {
        self.parameters(method)
            .iter()
            .filter_map(|&param| self.get(param))
            .filter(|param| param.is_named_parameter())
            .map(|param| param.name.clone())
            .collect()
    }

    /// Class a constructor was declared for
    pub fn constructor_type(&self, ctor: ElementId) -> Option<ElementId> {
        let element = self.get(ctor)?;
        match &element.kind {
            ElementKind::Constructor(data) => data.constructor_type.or(element.enclosing),
            _ => None,
        }
    }

    /// `C` for a default constructor of `C`, `C.name` for a named one
    pub fn raw_constructor_name(&self, ctor: ElementId) -> String {
        let class_name = self
            .constructor_type(ctor)
            .map_or("", |class| self.name(class));
        let name = self.name(ctor);
        if name.is_empty() {
            class_name.to_string()
        } else {
            format!("{}.{}", class_name, name)
        }
    }
}
