//! Per-call resolution frame
//!
//! A `Frame` describes where the resolver currently is: which declaration
//! holds the code, which method and function enclose it, and which context
//! flags apply. It is a small `Copy` value passed down the recursion; callees
//! derive a modified copy with struct update syntax and the caller's frame
//! is untouched when they return.

use tern_ast::ElementId;

/// Declaration whose members are being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holder {
    Library(ElementId),
    Class(ElementId),
}

impl Holder {
    pub fn element(self) -> ElementId {
        match self {
            Holder::Library(id) | Holder::Class(id) => id,
        }
    }

    pub fn class(self) -> Option<ElementId> {
        match self {
            Holder::Class(id) => Some(id),
            Holder::Library(_) => None,
        }
    }

    pub fn is_library(self) -> bool {
        matches!(self, Holder::Library(_))
    }
}

/// How the expression being resolved is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Get,
    /// Left-hand side of a plain assignment
    Set,
    /// Compound assignment or `++`/`--`
    GetSet,
}

impl Access {
    pub fn reads(self) -> bool {
        matches!(self, Access::Get | Access::GetSet)
    }

    pub fn writes(self) -> bool {
        matches!(self, Access::Set | Access::GetSet)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub holder: Holder,
    /// Innermost element owning declarations made here
    pub enclosing: ElementId,
    pub current_method: Option<ElementId>,
    /// Method or function literal that `break`/`continue` cannot leave
    pub innermost_function: Option<ElementId>,
    /// Nearest member is static or top-level
    pub static_member: bool,
    pub factory: bool,
    /// Inside a constructor initializer list
    pub in_initializer: bool,
    pub in_instance_field_initializer: bool,
    /// Inside the arguments of a `this(...)` redirect
    pub in_redirect: bool,
    pub access: Access,
}

impl Frame {
    /// Frame for the top level of a library
    pub fn library(library: ElementId) -> Self {
        Self {
            holder: Holder::Library(library),
            enclosing: library,
            current_method: None,
            innermost_function: None,
            static_member: true,
            factory: false,
            in_initializer: false,
            in_instance_field_initializer: false,
            in_redirect: false,
            access: Access::Get,
        }
    }

    /// Frame for the body of a class, outside of any member
    pub fn class(class: ElementId) -> Self {
        Self {
            holder: Holder::Class(class),
            enclosing: class,
            static_member: false,
            ..Self::library(class)
        }
    }

    /// Enter a method or constructor
    pub fn method(self, method: ElementId, is_static: bool, is_factory: bool) -> Self {
        Self {
            enclosing: method,
            current_method: Some(method),
            innermost_function: Some(method),
            static_member: is_static || self.holder.is_library(),
            factory: is_factory,
            access: Access::Get,
            ..self
        }
    }

    /// Enter a function literal or local function
    pub fn function(self, function: ElementId) -> Self {
        Self {
            enclosing: function,
            innermost_function: Some(function),
            access: Access::Get,
            ..self
        }
    }

    pub fn reading(self) -> Self {
        Self {
            access: Access::Get,
            ..self
        }
    }

    pub fn with_access(self, access: Access) -> Self {
        Self { access, ..self }
    }

    /// Outside of any method, or inside a static, top-level or factory one
    pub fn is_static_context(&self) -> bool {
        self.current_method.is_none() || self.static_member || self.factory
    }

    pub fn is_static_context_or_initializer(&self) -> bool {
        self.is_static_context() || self.in_initializer
    }

    /// Type variables are unavailable here. Factories may use them.
    pub fn forbids_type_variables(&self) -> bool {
        self.static_member && !self.factory
    }

    /// Directly inside a static method (not a field initializer)
    pub fn in_static_method(&self) -> bool {
        self.current_method.is_some() && self.static_member && !self.holder.is_library()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_frame_leaves_caller_untouched() {
        let class = Frame::class(ElementId(1));
        let method = class.method(ElementId(2), false, false);
        assert_eq!(class.current_method, None);
        assert_eq!(method.current_method, Some(ElementId(2)));
        assert!(class.is_static_context());
        assert!(!method.is_static_context());
    }

    #[test]
    fn test_factory_may_use_type_variables() {
        let factory = Frame::class(ElementId(1)).method(ElementId(2), true, true);
        assert!(factory.is_static_context());
        assert!(!factory.forbids_type_variables());
        let stat = Frame::class(ElementId(1)).method(ElementId(3), true, false);
        assert!(stat.forbids_type_variables());
        assert!(stat.in_static_method());
    }

    #[test]
    fn test_top_level_function_is_static() {
        let function = Frame::library(ElementId(0)).method(ElementId(4), false, false);
        assert!(function.is_static_context());
        assert!(!function.in_static_method());
    }

    #[test]
    fn test_function_keeps_current_method() {
        let method = Frame::class(ElementId(1)).method(ElementId(2), false, false);
        let inner = method.with_access(Access::Set).function(ElementId(9));
        assert_eq!(inner.current_method, Some(ElementId(2)));
        assert_eq!(inner.innermost_function, Some(ElementId(9)));
        assert_eq!(inner.access, Access::Get);
    }
}
