use cranelift::prelude::{FunctionBuilder, InstBuilder, Value};
use generational_arena::Index;

use crate::compiler::{
    analysis::{SymbolTable, SymbolValue},
    ast::{Node, VType},
    codegen::{
        GenValue, Info,
        error::GenError,
        expr::expr_to_val,
        variable::{coerce, retype_null, zero_value},
    },
};

/// Nothing may follow a terminator in a block, so code after a `return`
/// goes into a fresh block without predecessors.
pub fn ensure_open_block(fn_builder: &mut FunctionBuilder, info: &mut Info) {
    if !info.frame.terminated {
        return;
    }

    let block = fn_builder.create_block();
    fn_builder.switch_to_block(block);
    fn_builder.seal_block(block);
    info.frame.terminated = false;
}

pub fn expr_return(
    node: &Node,
    value: Option<Index>,
    fn_builder: &mut FunctionBuilder,
    scopes: &mut SymbolTable,
    info: &mut Info,
) -> Result<GenValue, GenError> {
    info.frame.returned = true;

    // bare return is not checked against the declared return type
    let Some(value_idx) = value else {
        fn_builder.ins().return_(&[]);
        info.frame.terminated = true;
        return Ok(GenValue::unit());
    };

    let val = expr_to_val(value_idx, fn_builder, scopes, info)?;

    let return_type = match scopes.last_function().map(|s| &s.value) {
        Some(SymbolValue::Function(callee)) => callee.ty.ret.clone(),
        _ => {
            return Err(info
                .diagnostics
                .add_error(node.token, "Return statement cannot find last function from symbol table"));
        }
    };

    let val = retype_null(val, &return_type, fn_builder, info);
    let Some(val) = coerce(val, &return_type, fn_builder)? else {
        return Err(info.diagnostics.add_error(node.token, "Return type with value type is different"));
    };

    let values: Vec<Value> = val.value.into_iter().collect();
    fn_builder.ins().return_(&values);
    info.frame.terminated = true;
    Ok(GenValue::unit())
}

/// Terminates whatever block the body ended in.
///
/// Unit functions get the implicit `return`. A value-returning function
/// without any `return` is diagnosed; the block is still closed with a zero
/// return so the function stays well formed.
pub fn close_function(node: &Node, return_type: &VType, fn_builder: &mut FunctionBuilder, info: &mut Info) {
    if info.frame.terminated {
        return;
    }

    if return_type.is_unit() {
        fn_builder.ins().return_(&[]);
    } else {
        if !info.frame.returned {
            let name = info.name(info.frame.function);
            info.diagnostics
                .add_error(node.token, format!("Function {name} must return a value"));
        }
        let zero: Vec<Value> = zero_value(return_type, fn_builder, info)
            .and_then(|z| z.value)
            .into_iter()
            .collect();
        fn_builder.ins().return_(&zero);
    }
    info.frame.terminated = true;
}
