//! Shared fixture for resolver integration tests
//!
//! Builds a `core` library (Object, int, double, bool, String, Array<E>,
//! Map<K, V>) and an `app` library that imports it. Tests declare their own
//! elements on the builder, freeze it, and resolve hand-built units.

#![allow(dead_code)]

use tern_ast::{AstBuilder, ElementId, Item, ScopeId, Stmt, Unit};
use tern_resolve::{
    CoreTypes, ErrorCode, Modifiers, Program, ProgramBuilder, Resolution, ResolveError, Resolver,
    ResolverConfig,
};

pub struct World {
    pub builder: ProgramBuilder,
    pub core: CoreTypes,
    pub core_library: ElementId,
    pub app: ElementId,
    pub app_scope: ScopeId,
    pub imports: ScopeId,
}

impl World {
    pub fn new() -> Self {
        let mut builder = ProgramBuilder::new();
        let (core_library, _) = builder.library("core");
        let object = builder.class(core_library, "Object");
        builder.constructor(object, "", Modifiers::CONST);

        let core_class = |builder: &mut ProgramBuilder, name: &str| {
            let class = builder.class(core_library, name);
            builder.set_supertype(class, object);
            class
        };
        let int = core_class(&mut builder, "int");
        let double = core_class(&mut builder, "double");
        let bool = core_class(&mut builder, "bool");
        let string = core_class(&mut builder, "String");
        let array = core_class(&mut builder, "Array");
        builder.type_variable(array, "E", None);
        let map = core_class(&mut builder, "Map");
        builder.type_variable(map, "K", None);
        builder.type_variable(map, "V", None);

        let (app, app_scope) = builder.library("app");
        let imports = builder.import_scope(app_scope).expect("app library scope");
        for class in [object, int, double, bool, string, array, map] {
            builder.declare(imports, class).expect("core names are unique");
        }

        let core = CoreTypes {
            object,
            int,
            double,
            bool,
            string,
            array,
            map,
        };
        Self {
            builder,
            core,
            core_library,
            app,
            app_scope,
            imports,
        }
    }

    /// Class of the app library extending Object
    pub fn class(&mut self, name: &str) -> ElementId {
        let class = self.builder.class(self.app, name);
        self.builder.set_supertype(class, self.core.object);
        class
    }

    pub fn subclass(&mut self, name: &str, superclass: ElementId) -> ElementId {
        let class = self.builder.class(self.app, name);
        self.builder.set_supertype(class, superclass);
        class
    }

    /// Field that carries an initializer at its declaration
    pub fn initialized_field(&mut self, owner: ElementId, name: &str, modifiers: Modifiers) -> ElementId {
        self.builder.field(owner, name, modifiers | Modifiers::INITIALIZED)
    }

    /// Top-level function of the app library with the given body
    pub fn function(&mut self, b: &mut AstBuilder, name: &str, stmts: Vec<Stmt>) -> Item {
        let element = self.builder.method(self.app, name, Modifiers::empty());
        let body = b.body(stmts);
        Item::Function(b.method(element, name, vec![], body))
    }

    pub fn freeze(self) -> Frozen {
        Frozen {
            program: self.builder.freeze(),
            core: self.core,
            app: self.app,
            config: ResolverConfig::default(),
        }
    }
}

pub struct Frozen {
    pub program: Program,
    pub core: CoreTypes,
    pub app: ElementId,
    pub config: ResolverConfig,
}

impl Frozen {
    pub fn resolve(&self, unit: &Unit) -> (Resolution, Vec<ResolveError>) {
        let resolver = Resolver::with_config(&self.program, &self.core, self.config.clone());
        let mut diagnostics = Vec::new();
        let resolution = resolver
            .resolve_unit(unit, &mut diagnostics)
            .expect("resolution should not hit an internal error");
        (resolution, diagnostics)
    }
}

pub fn codes(diagnostics: &[ResolveError]) -> Vec<ErrorCode> {
    diagnostics.iter().map(|diagnostic| diagnostic.code).collect()
}

pub fn count(diagnostics: &[ResolveError], code: ErrorCode) -> usize {
    diagnostics.iter().filter(|diagnostic| diagnostic.code == code).count()
}
