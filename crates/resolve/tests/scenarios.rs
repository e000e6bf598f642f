//! End-to-end resolution scenarios
//!
//! Each test builds a small program model plus the matching tree and checks
//! the bindings and diagnostics of one pass.

mod common;

use common::{codes, count, World};
use tern_ast::{AstBuilder, ClassMember, FunctionBody, InitializerKind, Item};
use tern_resolve::{ErrorCode, Modifiers};

#[test]
fn test_super_call_resolves_to_declared_default_constructor() {
    let mut world = World::new();
    let a = world.class("A");
    let a_ctor = world.builder.constructor(a, "", Modifiers::empty());
    let b_class = world.subclass("B", a);
    let b_ctor = world.builder.constructor(b_class, "", Modifiers::empty());

    let mut b = AstBuilder::new();
    let a_body = b.body(vec![]);
    let a_ctor_decl = b.constructor(a_ctor, "A", vec![], vec![], a_body);
    let a_decl = b.class(a, "A", vec![ClassMember::Method(a_ctor_decl)]);

    let super_init = b.super_init(None, vec![]);
    let call_id = match &super_init.kind {
        InitializerKind::Super(call) => call.id,
        _ => unreachable!(),
    };
    let b_body = b.body(vec![]);
    let b_ctor_decl = b.constructor(b_ctor, "B", vec![], vec![super_init], b_body);
    let b_decl = b.class(b_class, "B", vec![ClassMember::Method(b_ctor_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(a_decl), Item::Class(b_decl)]);

    let frozen = world.freeze();
    let (resolution, diagnostics) = frozen.resolve(&unit);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    assert_eq!(resolution.element(call_id), Some(a_ctor));
}

#[test]
fn test_implicit_super_call_needs_callable_default_constructor() {
    let mut world = World::new();
    let a = world.class("A");
    let a_ctor = world.builder.constructor(a, "", Modifiers::empty());
    let x = world.builder.parameter(a_ctor, "x", Modifiers::empty());
    let c = world.subclass("C", a);

    let mut b = AstBuilder::new();
    let x_param = b.param("x", Some(x));
    let a_body = b.body(vec![]);
    let a_ctor_decl = b.constructor(a_ctor, "A", vec![x_param], vec![], a_body);
    let a_decl = b.class(a, "A", vec![ClassMember::Method(a_ctor_decl)]);
    let c_decl = b.class(c, "C", vec![]);
    let unit = b.unit(world.app, vec![Item::Class(a_decl), Item::Class(c_decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::CannotResolveImplicitCallToSuperConstructor]);
    assert_eq!(
        diagnostics[0].message(),
        "cannot resolve implicit call to the default constructor of super class 'A'"
    );
}

#[test]
fn test_redirect_cycle_reported_once_per_constructor() {
    let mut world = World::new();
    let a = world.class("A");
    let first = world.builder.constructor(a, "a", Modifiers::empty());
    let second = world.builder.constructor(a, "b", Modifiers::empty());

    let mut b = AstBuilder::new();
    let to_second = b.redirect_init(Some("b"), vec![]);
    let first_decl = b.constructor(first, "A.a", vec![], vec![to_second], FunctionBody::Absent);
    let to_first = b.redirect_init(Some("a"), vec![]);
    let second_decl = b.constructor(second, "A.b", vec![], vec![to_first], FunctionBody::Absent);
    let a_decl = b.class(
        a,
        "A",
        vec![ClassMember::Method(first_decl), ClassMember::Method(second_decl)],
    );
    let unit = b.unit(world.app, vec![Item::Class(a_decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(count(&diagnostics, ErrorCode::RedirectedConstructorCycle), 2);
    assert_eq!(diagnostics.len(), 2);
    let mut names: Vec<_> = diagnostics.iter().map(|d| d.args[0].clone()).collect();
    names.sort();
    assert_eq!(names, vec!["A.a".to_string(), "A.b".to_string()]);
}

#[test]
fn test_uncovered_final_fields_reported_per_constructor() {
    let mut world = World::new();
    let a = world.class("A");
    let x = world.builder.field(a, "x", Modifiers::FINAL);
    let y = world.builder.field(a, "y", Modifiers::FINAL);
    let unnamed = world.builder.constructor(a, "", Modifiers::empty());
    let named = world.builder.constructor(a, "named", Modifiers::empty());

    let mut b = AstBuilder::new();
    let x_decl = b.field(x, "x", None);
    let y_decl = b.field(y, "y", None);
    let one = b.int_lit(1);
    let init_x = b.field_init("x", one);
    let unnamed_decl = b.constructor(unnamed, "A", vec![], vec![init_x], FunctionBody::Absent);
    let named_decl = b.constructor(named, "A.named", vec![], vec![], FunctionBody::Absent);
    let a_decl = b.class(
        a,
        "A",
        vec![
            ClassMember::Field(x_decl),
            ClassMember::Field(y_decl),
            ClassMember::Method(unnamed_decl),
            ClassMember::Method(named_decl),
        ],
    );
    let unit = b.unit(world.app, vec![Item::Class(a_decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(count(&diagnostics, ErrorCode::FinalFieldMustBeInitialized), 3);
    let mut fields: Vec<_> = diagnostics.iter().map(|d| d.args[0].as_str()).collect();
    fields.sort_unstable();
    assert_eq!(fields, vec!["x", "y", "y"]);
}

#[test]
fn test_break_to_case_label_is_rejected() {
    let mut world = World::new();
    let mut b = AstBuilder::new();

    let brk = b.break_stmt(Some("L"));
    let loop_body = b.block(vec![brk]);
    let loop_body = b.block_stmt(loop_body);
    let for_loop = b.for_stmt(None, None, vec![], loop_body);
    let case = b.int_lit(1);
    let member = b.switch_member(&["L"], Some(case), vec![for_loop]);
    let subject = b.int_lit(1);
    let switch = b.switch_stmt(subject, vec![member]);
    let main = world.function(&mut b, "main", vec![switch]);
    let unit = b.unit(world.app, vec![main]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::BreakLabelResolvesToCaseOrDefault]);
}

#[test]
fn test_const_class_reports_only_mutable_field() {
    let mut world = World::new();
    let c = world.class("C");
    let x = world.builder.field(c, "x", Modifiers::FINAL);
    let y = world.builder.field(c, "y", Modifiers::empty());
    let ctor = world.builder.constructor(c, "", Modifiers::CONST);
    let x_param = world.builder.field_parameter(ctor, x, Modifiers::empty());

    let mut b = AstBuilder::new();
    let x_decl = b.field(x, "x", None);
    let y_decl = b.field(y, "y", None);
    let this_x = b.this_param("x", Some(x_param));
    let ctor_decl = b.constructor(ctor, "C", vec![this_x], vec![], FunctionBody::Absent);
    let c_decl = b.class(
        c,
        "C",
        vec![
            ClassMember::Field(x_decl),
            ClassMember::Field(y_decl),
            ClassMember::Method(ctor_decl),
        ],
    );
    let unit = b.unit(world.app, vec![Item::Class(c_decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::ConstClassWithNonFinalFields]);
    assert_eq!(diagnostics[0].args, vec!["C".to_string(), "y".to_string()]);
}

#[test]
fn test_cyclic_class_still_resolves_members() {
    let mut world = World::new();
    let a = world.builder.class(world.app, "A");
    let b_class = world.builder.class(world.app, "B");
    world.builder.set_supertype(a, b_class);
    world.builder.set_supertype(b_class, a);
    let m = world.builder.method(a, "m", Modifiers::STATIC);

    let mut b = AstBuilder::new();
    let this = b.this_expr();
    let stmt = b.expr_stmt(this);
    let body = b.body(vec![stmt]);
    let m_decl = b.method(m, "m", vec![], body);
    let a_decl = b.class(a, "A", vec![ClassMember::Method(m_decl)]);
    let unit = b.unit(world.app, vec![Item::Class(a_decl)]);

    let (_, diagnostics) = world.freeze().resolve(&unit);
    assert_eq!(count(&diagnostics, ErrorCode::CyclicClass), 1);
    assert_eq!(count(&diagnostics, ErrorCode::ThisInStaticMethod), 1);
}

#[test]
fn test_part_of_unit_resolves_in_owning_library() {
    let mut world = World::new();
    let helper = world.builder.method(world.app, "helper", Modifiers::empty());

    let mut b = AstBuilder::new();
    let call = b.call("helper", vec![]);
    let call_id = call.id;
    let stmt = b.expr_stmt(call);
    let main = world.function(&mut b, "main", vec![stmt]);
    let mut unit = b.unit(world.core_library, vec![main]);
    let directive = b.part_of("app");
    unit.directives.push(directive);

    let (resolution, diagnostics) = world.freeze().resolve(&unit);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    assert_eq!(resolution.element(call_id), Some(helper));
}

#[test]
fn test_resolution_is_deterministic() {
    let mut world = World::new();
    let a = world.class("A");
    let size = world.builder.field(a, "size", Modifiers::empty());
    let grow = world.builder.method(a, "grow", Modifiers::empty());

    let mut b = AstBuilder::new();
    let one = b.int_lit(1);
    let local = b.var_stmt("n", Some(one));
    let read = b.ident_expr("size");
    let read = b.expr_stmt(read);
    let missing = b.ident_expr("nowhere");
    let missing = b.expr_stmt(missing);
    let brk = b.break_stmt(Some("gone"));
    let body = b.body(vec![local, read, missing, brk]);
    let grow_decl = b.method(grow, "grow", vec![], body);
    let size_decl = b.field(size, "size", None);
    let a_decl = b.class(
        a,
        "A",
        vec![ClassMember::Field(size_decl), ClassMember::Method(grow_decl)],
    );
    let unit = b.unit(world.app, vec![Item::Class(a_decl)]);

    let frozen = world.freeze();
    let (first, first_diagnostics) = frozen.resolve(&unit);
    let (second, second_diagnostics) = frozen.resolve(&unit);
    assert_eq!(first, second);
    assert_eq!(codes(&first_diagnostics), codes(&second_diagnostics));
    assert_eq!(codes(&first_diagnostics), vec![ErrorCode::CannotResolveLabel]);
}

#[test]
fn test_single_member_resolution() {
    let mut world = World::new();
    let a = world.class("A");
    let size = world.builder.field(a, "size", Modifiers::empty());
    let grow = world.builder.method(a, "grow", Modifiers::empty());

    let mut b = AstBuilder::new();
    let read = b.ident_expr("size");
    let read_id = read.id;
    let read = b.expr_stmt(read);
    let body = b.body(vec![read]);
    let grow_decl = b.method(grow, "grow", vec![], body);
    let size_decl = b.field(size, "size", None);
    let a_decl = b.class(
        a,
        "A",
        vec![ClassMember::Field(size_decl), ClassMember::Method(grow_decl)],
    );

    let frozen = world.freeze();
    let resolver = tern_resolve::Resolver::new(&frozen.program, &frozen.core);
    let mut diagnostics = Vec::new();
    let resolution = resolver
        .resolve_member(&a_decl, &a_decl.members[1], &mut diagnostics)
        .expect("member resolves");
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    assert_eq!(resolution.element(read_id), Some(size));
}
