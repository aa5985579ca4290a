use cranelift::prelude::{FunctionBuilder, InstBuilder};
use generational_arena::Index;

use crate::compiler::{
    analysis::{Compatibility, SymbolTable, compare_types},
    ast::Node,
    codegen::{
        GenValue, Info,
        cast::{LoadSource, cast_to, load_source, unify},
        error::GenError,
        expr::expr_to_val,
        name_value,
    },
    tokens::{Punctuation, Token, TokenKind},
};

/// Arithmetic and assignment. The right operand is generated before the left one.
pub fn expr_binop(
    node: &Node,
    lhs_idx: Index,
    rhs_idx: Index,
    fn_builder: &mut FunctionBuilder,
    scopes: &mut SymbolTable,
    info: &mut Info,
) -> Result<GenValue, GenError> {
    let lhs_token = info.node(lhs_idx)?.token;

    let rhs = expr_to_val(rhs_idx, fn_builder, scopes, info);
    let lhs = expr_to_val(lhs_idx, fn_builder, scopes, info);
    let (lhs, rhs) = (lhs?, rhs?);

    if lhs.value.is_none() || rhs.value.is_none() {
        return Err(info.diagnostics.add_error(node.token, "Cannot use void as an operand"));
    }

    let compat = compare_types(&lhs.type_, &rhs.type_);
    if compat == Compatibility::Incompatible {
        return Err(info.diagnostics.add_error(node.token, "type LHS != type RHS"));
    }

    let TokenKind::Punctuation(op) = node.token.kind else {
        tracing::error!(op = ?node.token.kind, "binary operator token is not punctuation");
        return Err(GenError::UnsupportedOperator { op: node.token.kind });
    };

    if op == Punctuation::Eq {
        let rhs = if compat == Compatibility::Castable {
            cast_to(rhs, &lhs.type_, fn_builder)?
        } else {
            rhs
        };
        return expr_assign(lhs_token, lhs, rhs, fn_builder, info);
    }

    let (lhs, rhs) = if compat == Compatibility::Castable {
        unify(lhs, rhs, fn_builder)?
    } else {
        (lhs, rhs)
    };
    let (Some(l), Some(r)) = (lhs.value, rhs.value) else {
        return Err(GenError::InvalidNode {
            what: "operand lost its value while casting".to_string(),
        });
    };

    let val = match op {
        Punctuation::Star => fn_builder.ins().imul(l, r),
        Punctuation::Slash => fn_builder.ins().sdiv(l, r),
        Punctuation::Plus => fn_builder.ins().iadd(l, r),
        Punctuation::Minus => fn_builder.ins().isub(l, r),
        _ => {
            tracing::error!(?op, "unsupported binary operator");
            return Err(GenError::UnsupportedOperator { op: node.token.kind });
        }
    };

    if let Some(name) = lhs.name {
        name_value(fn_builder, val, name);
    }
    Ok(GenValue::new(val, lhs.type_).with_name(lhs.name))
}

/// Stores into the slot the left side was loaded from and reloads it.
fn expr_assign(
    lhs_token: Token,
    lhs: GenValue,
    rhs: GenValue,
    fn_builder: &mut FunctionBuilder,
    info: &mut Info,
) -> Result<GenValue, GenError> {
    let (Some(l), Some(r)) = (lhs.value, rhs.value) else {
        return Err(info.diagnostics.add_error(lhs_token, "LHS not valid"));
    };

    let slot = match load_source(l, &*fn_builder.func) {
        LoadSource::Slot(slot) => slot,
        LoadSource::Address => return Err(info.diagnostics.add_error(lhs_token, "LHS is not a valid address pointer")),
        LoadSource::NotALoad => return Err(info.diagnostics.add_error(lhs_token, "LHS not valid")),
    };

    let ty = fn_builder.func.dfg.value_type(l);
    fn_builder.ins().stack_store(r, slot, 0);
    let reloaded = fn_builder.ins().stack_load(ty, slot, 0);
    if let Some(name) = lhs.name {
        name_value(fn_builder, reloaded, name);
    }
    Ok(GenValue::new(reloaded, lhs.type_).with_name(lhs.name))
}
