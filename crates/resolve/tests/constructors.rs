//! Constructor bodies, initializer lists and interface default classes

mod common;

use common::{codes, count, World};
use tern_ast::{AstBuilder, ClassMember, FunctionBody, Item};
use tern_resolve::{ErrorCode, Modifiers, Type};

#[test]
fn test_super_call_in_root_class() {
    let mut world = World::new();
    let root = world.builder.class(world.app, "Root");
    let ctor = world.builder.constructor(root, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let super_init = b.super_init(None, vec![]);
    let ctor_decl = b.constructor(ctor, "Root", vec![], vec![super_init], FunctionBody::Absent);
    let decl = b.class(root, "Root", vec![ClassMember::Method(ctor_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::SuperWithoutSuperclass]);
    assert_eq!(diagnostics[0].args, vec!["Root".to_string()]);
}

#[test]
fn test_unknown_named_super_constructor() {
    let mut world = World::new();
    let a = world.class("A");
    world.builder.constructor(a, "", Modifiers::empty());
    let b_class = world.subclass("B", a);
    let ctor = world.builder.constructor(b_class, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let super_init = b.super_init(Some("missing"), vec![]);
    let ctor_decl = b.constructor(ctor, "B", vec![], vec![super_init], FunctionBody::Absent);
    let decl = b.class(b_class, "B", vec![ClassMember::Method(ctor_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::CannotResolveSuperConstructor]);
    assert_eq!(diagnostics[0].args, vec!["A.missing".to_string()]);
}

#[test]
fn test_initializer_targets_by_kind() {
    let mut world = World::new();
    let a = world.class("A");
    world.builder.field(a, "inherited", Modifiers::empty());
    let b_class = world.subclass("B", a);
    world.builder.field(b_class, "shared", Modifiers::STATIC);
    world.builder.method(b_class, "compute", Modifiers::empty());
    let ctor = world.builder.constructor(b_class, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let mut inits = Vec::new();
    for (index, name) in ["inherited", "shared", "compute", "missing"].into_iter().enumerate() {
        let value = b.int_lit(index as i64);
        inits.push(b.field_init(name, value));
    }
    let ctor_decl = b.constructor(ctor, "B", vec![], inits, FunctionBody::Absent);
    let decl = b.class(b_class, "B", vec![ClassMember::Method(ctor_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(
        codes(&diagnostics),
        vec![
            ErrorCode::InitFieldOnlyImmediatelySurroundingClass,
            ErrorCode::CannotInitStaticFieldInInitializer,
            ErrorCode::ExpectedFieldNotMethod,
            ErrorCode::CannotResolveField,
        ]
    );
}

#[test]
fn test_field_initialized_twice() {
    let mut world = World::new();
    let a = world.class("A");
    let x = world.builder.field(a, "x", Modifiers::empty());
    let ctor = world.builder.constructor(a, "", Modifiers::empty());
    let x_param = world.builder.field_parameter(ctor, x, Modifiers::empty());

    let mut b = AstBuilder::new();
    let this_x = b.this_param("x", Some(x_param));
    let one = b.int_lit(1);
    let init = b.field_init("x", one);
    let ctor_decl = b.constructor(ctor, "A", vec![this_x], vec![init], FunctionBody::Absent);
    let x_decl = b.field(x, "x", None);
    let decl = b.class(a, "A", vec![ClassMember::Field(x_decl), ClassMember::Method(ctor_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::DuplicateInitialization]);
}

#[test]
fn test_field_parameter_outside_constructor() {
    let mut world = World::new();
    let a = world.class("A");
    world.builder.field(a, "x", Modifiers::empty());
    let m = world.builder.method(a, "m", Modifiers::empty());

    let mut b = AstBuilder::new();
    let this_x = b.this_param("x", None);
    let body = b.body(vec![]);
    let m_decl = b.method(m, "m", vec![this_x], body);
    let decl = b.class(a, "A", vec![ClassMember::Method(m_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::ParameterInitOutsideConstructor]);
}

#[test]
fn test_super_method_call_in_initializer() {
    let mut world = World::new();
    let a = world.class("A");
    world.builder.method(a, "m", Modifiers::empty());
    let b_class = world.subclass("B", a);
    let x = world.builder.field(b_class, "x", Modifiers::empty());
    let ctor = world.builder.constructor(b_class, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let target = b.super_expr();
    let call = b.invoke(target, "m", vec![]);
    let init = b.field_init("x", call);
    let ctor_decl = b.constructor(ctor, "B", vec![], vec![init], FunctionBody::Absent);
    let x_decl = b.field(x, "x", None);
    let decl = b.class(b_class, "B", vec![ClassMember::Field(x_decl), ClassMember::Method(ctor_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::SuperMethodInvocationInInitializer]);
    assert_eq!(diagnostics[0].args, vec!["m".to_string()]);
}

#[test]
fn test_return_value_from_constructor() {
    let mut world = World::new();
    let a = world.class("A");
    let ctor = world.builder.constructor(a, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let one = b.int_lit(1);
    let ret = b.return_stmt(Some(one));
    let body = b.body(vec![ret]);
    let ctor_decl = b.constructor(ctor, "A", vec![], vec![], body);
    let decl = b.class(a, "A", vec![ClassMember::Method(ctor_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::InvalidReturnInConstructor]);
}

#[test]
fn test_return_value_from_closure_in_constructor() {
    let mut world = World::new();
    let a = world.class("A");
    let ctor = world.builder.constructor(a, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let one = b.int_lit(1);
    let ret = b.return_stmt(Some(one));
    let inner = b.block(vec![ret]);
    let closure = b.function_expr(Some("helper"), vec![], inner);
    let closure = b.function_stmt(closure);
    let bare_return = b.return_stmt(None);
    let body = b.body(vec![closure, bare_return]);
    let ctor_decl = b.constructor(ctor, "A", vec![], vec![], body);
    let decl = b.class(a, "A", vec![ClassMember::Method(ctor_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
}

#[test]
fn test_new_interface_maps_to_default_class() {
    let mut world = World::new();
    let interface = world.builder.interface(world.app, "Shape");
    let interface_ctor = world.builder.constructor(interface, "", Modifiers::empty());
    let default_class = world.class("ShapeImpl");
    world.builder.add_interface(default_class, interface);
    world.builder.set_default_class(interface, default_class);
    let default_ctor = world.builder.constructor(default_class, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let interface_ctor_decl = b.constructor(interface_ctor, "Shape", vec![], vec![], FunctionBody::Absent);
    let mut interface_decl = b.class(interface, "Shape", vec![ClassMember::Method(interface_ctor_decl)]);
    interface_decl.is_interface = true;
    interface_decl.default_clause = Some(b.default_clause("ShapeImpl", vec![]));
    let default_body = b.body(vec![]);
    let default_ctor_decl = b.constructor(default_ctor, "ShapeImpl", vec![], vec![], default_body);
    let default_decl = b.class(default_class, "ShapeImpl", vec![ClassMember::Method(default_ctor_decl)]);

    let shape_type = b.type_node("Shape", vec![]);
    let creation = b.new_expr(false, shape_type, None, vec![]);
    let creation_id = creation.id;
    let stmt = b.expr_stmt(creation);
    let main = world.function(&mut b, "main", vec![stmt]);
    let unit = b.unit(
        world.app,
        vec![Item::Class(interface_decl), Item::Class(default_decl), main],
    );

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    assert_eq!(resolution.element(creation_id), Some(default_ctor));
    assert_eq!(resolution.default_constructors.get(&interface_ctor), Some(&default_ctor));
}

#[test]
fn test_interface_constructor_needs_default_class() {
    let mut world = World::new();
    let interface = world.builder.interface(world.app, "Shape");
    let ctor = world.builder.constructor(interface, "unit", Modifiers::empty());

    let mut b = AstBuilder::new();
    let ctor_decl = b.constructor(ctor, "Shape.unit", vec![], vec![], FunctionBody::Absent);
    let mut decl = b.class(interface, "Shape", vec![ClassMember::Method(ctor_decl)]);
    decl.is_interface = true;
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(count(&diagnostics, ErrorCode::IllegalConstructorNoDefaultInInterface), 1);
    assert_eq!(
        diagnostics[0].args,
        vec!["Shape".to_string(), "Shape.unit".to_string()]
    );
}

#[test]
fn test_abstract_method_without_body_is_accepted() {
    let mut world = World::new();
    let a = world.class("A");
    let m = world.builder.method(a, "m", Modifiers::ABSTRACT);
    let n = world.builder.method(a, "n", Modifiers::empty());

    let mut b = AstBuilder::new();
    let m_decl = b.method(m, "m", vec![], FunctionBody::Absent);
    let n_decl = b.method(n, "n", vec![], FunctionBody::Absent);
    let decl = b.class(a, "A", vec![ClassMember::Method(m_decl), ClassMember::Method(n_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::MethodMustHaveBody]);
    assert_eq!(diagnostics[0].args, vec!["n".to_string()]);
}

#[test]
fn test_const_constructor_over_implicit_super() {
    let mut world = World::new();
    let a = world.class("A");
    let b_class = world.subclass("B", a);
    let ctor = world.builder.constructor(b_class, "", Modifiers::CONST);

    let mut b = AstBuilder::new();
    let a_decl = b.class(a, "A", vec![]);
    let ctor_decl = b.constructor(ctor, "B", vec![], vec![], FunctionBody::Absent);
    let ctor_name = ctor_decl.name.id;
    let b_decl = b.class(b_class, "B", vec![ClassMember::Method(ctor_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(a_decl), Item::Class(b_decl)]);

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    assert_eq!(resolution.element(ctor_name), Some(ctor));
    assert!(resolution.synthesized.is_empty());
}

#[test]
fn test_const_class_with_inherited_mutable_field() {
    let mut world = World::new();
    let a = world.class("A");
    world.builder.field(a, "x", Modifiers::empty());
    world.builder.field(a, "y", Modifiers::FINAL | Modifiers::INITIALIZED);
    let b_class = world.subclass("B", a);
    let ctor = world.builder.constructor(b_class, "", Modifiers::CONST);

    let mut b = AstBuilder::new();
    let ctor_decl = b.constructor(ctor, "B", vec![], vec![], FunctionBody::Absent);
    let decl = b.class(b_class, "B", vec![ClassMember::Method(ctor_decl)]);
    let decl_id = decl.id;
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::ConstClassWithInheritedNonFinalFields]);
    assert_eq!(
        diagnostics[0].args,
        vec!["B".to_string(), "x".to_string(), "A".to_string()]
    );
    assert_eq!(resolution.element(decl_id), Some(b_class));
}

#[test]
fn test_default_clause_naming_an_interface() {
    let mut world = World::new();
    let shape = world.builder.interface(world.app, "Shape");
    let other = world.builder.interface(world.app, "Other");

    let mut b = AstBuilder::new();
    let clause = b.default_clause("Other", vec![]);
    let clause_name = clause.name.id;
    let mut decl = b.class(shape, "Shape", vec![]);
    decl.is_interface = true;
    decl.default_clause = Some(clause);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::DefaultMustSpecifyClass]);
    assert_eq!(diagnostics[0].args, vec!["Other".to_string()]);
    assert_eq!(resolution.element(clause_name), Some(other));
}

#[test]
fn test_default_clause_type_parameters_must_match() {
    let mut world = World::new();
    let list = world.builder.interface(world.app, "List");
    let list_t = world.builder.type_variable(list, "T", None);
    let default_class = world.class("ListImpl");
    world.builder.type_variable(default_class, "T", None);
    world.builder.set_default_class(list, default_class);

    let mut b = AstBuilder::new();
    let clause_param = b.type_param("U", None);
    let clause_param_id = clause_param.id;
    let clause_param_name = clause_param.name.id;
    let clause = b.default_clause("ListImpl", vec![clause_param]);
    let clause_name = clause.name.id;
    let mut decl = b.class(list, "List", vec![]);
    decl.is_interface = true;
    decl.type_params = vec![b.type_param("T", Some(list_t))];
    decl.default_clause = Some(clause);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::TypeParametersMustMatchExactly]);
    assert_eq!(diagnostics[0].args, vec!["ListImpl".to_string()]);
    assert_eq!(resolution.element(clause_name), Some(default_class));
    assert!(resolution.bindings.is_unresolved(clause_param_name));
    assert_eq!(resolution.type_of(clause_param_id), Some(&Type::Dynamic));
}

#[test]
fn test_default_class_needs_same_type_parameter_count() {
    let mut world = World::new();
    let list = world.builder.interface(world.app, "List");
    let list_t = world.builder.type_variable(list, "T", None);
    let default_class = world.class("ListImpl");
    world.builder.set_default_class(list, default_class);

    let mut b = AstBuilder::new();
    let clause = b.default_clause("ListImpl", vec![]);
    let clause_name = clause.name.id;
    let mut decl = b.class(list, "List", vec![]);
    decl.is_interface = true;
    decl.type_params = vec![b.type_param("T", Some(list_t))];
    decl.default_clause = Some(clause);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::DefaultClassMustHaveSameTypeParameters]);
    assert_eq!(diagnostics[0].args, vec!["List".to_string(), "ListImpl".to_string()]);
    assert_eq!(resolution.element(clause_name), Some(default_class));
}

#[test]
fn test_default_class_type_variable_names_must_match() {
    let mut world = World::new();
    let list = world.builder.interface(world.app, "List");
    let list_t = world.builder.type_variable(list, "T", None);
    let default_class = world.class("ListImpl");
    world.builder.type_variable(default_class, "E", None);
    world.builder.set_default_class(list, default_class);

    let mut b = AstBuilder::new();
    let clause = b.default_clause("ListImpl", vec![]);
    let clause_name = clause.name.id;
    let mut decl = b.class(list, "List", vec![]);
    decl.is_interface = true;
    let param = b.type_param("T", Some(list_t));
    let param_id = param.id;
    decl.type_params = vec![param];
    decl.default_clause = Some(clause);
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::TypeVariableDoesNotMatch]);
    assert_eq!(
        diagnostics[0].args,
        vec!["T".to_string(), "E".to_string(), "ListImpl".to_string()]
    );
    assert_eq!(resolution.element(clause_name), Some(default_class));
    assert_eq!(resolution.element(param_id), Some(list_t));
}

#[test]
fn test_default_constructor_required_parameter_count() {
    let mut world = World::new();
    let interface = world.builder.interface(world.app, "Shape");
    let interface_ctor = world.builder.constructor(interface, "", Modifiers::empty());
    let size = world.builder.parameter(interface_ctor, "size", Modifiers::empty());
    let default_class = world.class("ShapeImpl");
    world.builder.add_interface(default_class, interface);
    world.builder.set_default_class(interface, default_class);
    let default_ctor = world.builder.constructor(default_class, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let size_param = b.param("size", Some(size));
    let ctor_decl = b.constructor(interface_ctor, "Shape", vec![size_param], vec![], FunctionBody::Absent);
    let mut decl = b.class(interface, "Shape", vec![ClassMember::Method(ctor_decl)]);
    decl.is_interface = true;
    decl.default_clause = Some(b.default_clause("ShapeImpl", vec![]));
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::DefaultConstructorNumberOfRequiredParameters]);
    assert_eq!(diagnostics[0].args[2], "1");
    assert_eq!(diagnostics[0].args[5], "0");
    assert_eq!(resolution.default_constructors.get(&interface_ctor), Some(&default_ctor));
}

#[test]
fn test_instance_method_in_redirect_arguments() {
    let mut world = World::new();
    let a = world.class("A");
    let m = world.builder.method(a, "m", Modifiers::empty());
    let named = world.builder.constructor(a, "named", Modifiers::empty());
    world.builder.parameter(named, "value", Modifiers::empty());
    let unnamed = world.builder.constructor(a, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let value = b.param("value", None);
    let named_decl = b.constructor(named, "A.named", vec![value], vec![], FunctionBody::Absent);
    let call = b.call("m", vec![]);
    let call_id = call.id;
    let redirect = b.redirect_init(Some("named"), vec![call]);
    let unnamed_decl = b.constructor(unnamed, "A", vec![], vec![redirect], FunctionBody::Absent);
    let m_body = b.body(vec![]);
    let m_decl = b.method(m, "m", vec![], m_body);
    let decl = b.class(
        a,
        "A",
        vec![
            ClassMember::Method(m_decl),
            ClassMember::Method(named_decl),
            ClassMember::Method(unnamed_decl),
        ],
    );
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::InstanceMethodFromRedirect]);
    assert_eq!(diagnostics[0].args, vec!["m".to_string()]);
    assert_eq!(resolution.element(call_id), Some(m));
}

#[test]
fn test_instance_field_read_in_initializer_list() {
    let mut world = World::new();
    let a = world.class("A");
    let x = world.builder.field(a, "x", Modifiers::empty());
    let y = world.builder.field(a, "y", Modifiers::empty());
    let ctor = world.builder.constructor(a, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let read = b.ident_expr("x");
    let read_id = read.id;
    let init = b.field_init("y", read);
    let ctor_decl = b.constructor(ctor, "A", vec![], vec![init], FunctionBody::Absent);
    let x_decl = b.field(x, "x", None);
    let y_decl = b.field(y, "y", None);
    let decl = b.class(
        a,
        "A",
        vec![
            ClassMember::Field(x_decl),
            ClassMember::Field(y_decl),
            ClassMember::Method(ctor_decl),
        ],
    );
    let unit = b.unit(world.app, vec![Item::Class(decl)]);

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::CannotAccessFieldInInit]);
    assert_eq!(diagnostics[0].args, vec!["x".to_string()]);
    assert_eq!(resolution.element(read_id), Some(x));
}
