use cranelift::prelude::FunctionBuilder;
use generational_arena::Index;

use crate::compiler::{
    analysis::SymbolTable,
    ast::NodeKind,
    codegen::{GenValue, Info, error::GenError},
};

use super::{
    binary_ops::expr_binop,
    block::expr_block,
    control_flow::{ensure_open_block, expr_return},
    function_call::expr_call,
    literal::{nil_literal, number_literal, string_literal},
    variable::{expr_declaration, expr_variable},
};

/// Generates any node reachable inside a function body.
pub fn expr_to_val(
    node_idx: Index,
    fn_builder: &mut FunctionBuilder,
    scopes: &mut SymbolTable,
    info: &mut Info,
) -> Result<GenValue, GenError> {
    let node = info.node(node_idx)?;
    ensure_open_block(fn_builder, info);

    match &node.kind {
        NodeKind::Function(_) => Err(GenError::InvalidNode {
            what: "function definitions are only allowed at the top level".to_string(),
        }),
        NodeKind::Block { stmts } => expr_block(stmts, fn_builder, scopes, info),
        NodeKind::Call { callee, args } => expr_call(node, *callee, args, fn_builder, scopes, info),
        NodeKind::NumberLiteral(v) => Ok(number_literal(*v, fn_builder)),
        NodeKind::StringLiteral(sym) => string_literal(*sym, fn_builder, info),
        NodeKind::NilLiteral { type_ } => Ok(nil_literal(type_.as_ref(), fn_builder, info)),
        NodeKind::Declaration { name, type_, value } => {
            expr_declaration(node, *name, type_.as_ref(), *value, fn_builder, scopes, info)
        }
        NodeKind::BinaryOperator { lhs, rhs } => expr_binop(node, *lhs, *rhs, fn_builder, scopes, info),
        NodeKind::Return { value } => expr_return(node, *value, fn_builder, scopes, info),
        NodeKind::VariableReference { name, address_of } => expr_variable(node, *name, *address_of, fn_builder, scopes, info),
    }
}
