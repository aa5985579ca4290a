mod common;

use common::Tree;
use pretty_assertions::assert_eq;
use weasel_codegen::compiler::{ast::VType, tokens::Punctuation};

#[test]
fn test_diagnostic_undeclared_variable_renders_token_and_location() {
    let mut t = Tree::new();
    let y = t.var("y");
    let ret = t.ret(Some(y));
    let f = t.func("f", &[], VType::I32, vec![ret]);

    let out = t.compile(&[f]);
    assert_eq!(out.diagnostics.messages(), vec!["Variable y not declared"]);
    assert_eq!(
        out.diagnostics.render(&t.interner),
        vec!["error: Variable y not declared but found `y` kind of 5 at (1:1)".to_string()]
    );
}

#[test]
fn test_diagnostic_incompatible_declaration() {
    let mut t = Tree::new();
    let five = t.num(5);
    let p = t.decl("p", Some(VType::byte_ptr()), Some(five));
    let f = t.func("f", &[], VType::UNIT, vec![p]);

    let out = t.compile(&[f]);
    assert_eq!(out.diagnostics.messages(), vec!["Cannot assign, expression type is different"]);
    assert!(!out.succeeded());
    assert!(!out.codegen.listing("f").unwrap().defined);
}

#[test]
fn test_diagnostic_void_initializer() {
    let mut t = Tree::new();
    let noop = t.func("noop", &[], VType::UNIT, vec![]);
    let call = t.call("noop", vec![]);
    let x = t.decl("x", None, Some(call));
    let f = t.func("f", &[], VType::UNIT, vec![x]);

    let out = t.compile(&[noop, f]);
    assert_eq!(out.diagnostics.messages(), vec!["Cannot assign void to a variable"]);
    assert!(out.codegen.listing("noop").unwrap().defined);
}

#[test]
fn test_diagnostic_return_type_mismatch_is_reported_once() {
    let mut t = Tree::new();
    let s = t.string("nope");
    let ret = t.ret(Some(s));
    let f = t.func("f", &[], VType::I32, vec![ret]);

    let out = t.compile(&[f]);
    assert_eq!(out.diagnostics.messages(), vec!["Return type with value type is different"]);
}

#[test]
fn test_diagnostic_missing_return_value() {
    let mut t = Tree::new();
    let one = t.num(1);
    let x = t.decl("x", None, Some(one));
    let f = t.func("count", &[], VType::I32, vec![x]);

    let out = t.compile(&[f]);
    assert_eq!(out.diagnostics.messages(), vec!["Function count must return a value"]);
}

#[test]
fn test_diagnostic_assignment_to_non_slot() {
    let mut t = Tree::new();
    let one = t.num(1);
    let two = t.num(2);
    let assign = t.binop(Punctuation::Eq, one, two);
    let f = t.func("f", &[], VType::UNIT, vec![assign]);

    let out = t.compile(&[f]);
    assert_eq!(out.diagnostics.messages(), vec!["LHS not valid"]);

    let listing = out.codegen.listing("f").unwrap();
    assert!(!listing.defined);
    assert_eq!(listing.clif.matches("stack_store").count(), 0);
}

#[test]
fn test_diagnostic_incompatible_operands() {
    let mut t = Tree::new();
    let s = t.string("a");
    let one = t.num(1);
    let sum = t.binop(Punctuation::Plus, s, one);
    let x = t.decl("x", None, Some(sum));
    let f = t.func("f", &[], VType::UNIT, vec![x]);

    let out = t.compile(&[f]);
    assert_eq!(out.diagnostics.messages(), vec!["type LHS != type RHS"]);
}

#[test]
fn test_diagnostic_void_operand() {
    let mut t = Tree::new();
    let noop = t.func("noop", &[], VType::UNIT, vec![]);
    let call = t.call("noop", vec![]);
    let one = t.num(1);
    let sum = t.binop(Punctuation::Plus, call, one);
    let x = t.decl("x", None, Some(sum));
    let f = t.func("f", &[], VType::UNIT, vec![x]);

    let out = t.compile(&[noop, f]);
    assert_eq!(out.diagnostics.messages(), vec!["Cannot use void as an operand"]);
}

#[test]
fn test_diagnostic_undeclared_function() {
    let mut t = Tree::new();
    let call = t.call("missing", vec![]);
    let f = t.func("f", &[], VType::UNIT, vec![call]);

    let out = t.compile(&[f]);
    assert_eq!(out.diagnostics.messages(), vec!["Function missing not declared"]);
}

#[test]
fn test_diagnostic_function_used_as_variable() {
    let mut t = Tree::new();
    let helper = t.func("helper", &[], VType::UNIT, vec![]);
    let r = t.var("helper");
    let x = t.decl("x", None, Some(r));
    let f = t.func("f", &[], VType::UNIT, vec![x]);

    let out = t.compile(&[helper, f]);
    assert_eq!(out.diagnostics.messages(), vec!["helper is not a variable"]);
}

#[test]
fn test_diagnostic_failed_argument_adds_its_own_record() {
    let mut t = Tree::new();
    let id = t.func("id", &[("v", VType::I32)], VType::UNIT, vec![]);
    let q = t.var("q");
    let call = t.call("id", vec![q]);
    let f = t.func("f", &[], VType::UNIT, vec![call]);

    let out = t.compile(&[id, f]);
    assert_eq!(
        out.diagnostics.messages(),
        vec!["Variable q not declared", "Expected argument list index 0"]
    );
}

#[test]
fn test_diagnostic_call_arity_and_argument_types() {
    let mut t = Tree::new();
    let pair = t.func("pair", &[("a", VType::I32), ("b", VType::I32)], VType::UNIT, vec![]);
    let one = t.num(1);
    let short = t.call("pair", vec![one]);
    let s = t.string("x");
    let two = t.num(2);
    let wrong = t.call("pair", vec![s, two]);
    let f = t.func("f", &[], VType::UNIT, vec![short, wrong]);

    let out = t.compile(&[pair, f]);
    assert_eq!(
        out.diagnostics.messages(),
        vec!["Expected 2 arguments but found 1", "Argument type at index 0 is different"]
    );
}

#[test]
fn test_diagnostic_does_not_stop_later_functions() {
    let mut t = Tree::new();
    let z = t.var("z");
    let bad_ret = t.ret(Some(z));
    let bad = t.func("bad", &[], VType::I32, vec![bad_ret]);
    let one = t.num(1);
    let good_ret = t.ret(Some(one));
    let good = t.func("good", &[], VType::I32, vec![good_ret]);

    let out = t.compile(&[bad, good]);
    assert_eq!(out.diagnostics.len(), 1);
    assert!(!out.codegen.listing("bad").unwrap().defined);
    assert!(out.codegen.listing("good").unwrap().defined);
    // declared even though its body was rejected
    assert!(out.codegen.get_function("bad").is_some());
}

#[test]
fn test_diagnostic_block_keeps_checking_after_error() {
    let mut t = Tree::new();
    let a = t.var("a");
    let first = t.decl("x", None, Some(a));
    let b = t.var("b");
    let second = t.decl("y", None, Some(b));
    let f = t.func("f", &[], VType::UNIT, vec![first, second]);

    let out = t.compile(&[f]);
    assert_eq!(
        out.diagnostics.messages(),
        vec!["Variable a not declared", "Variable b not declared"]
    );
}
