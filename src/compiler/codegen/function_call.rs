use cranelift::{
    module::Module,
    prelude::{AbiParam, FunctionBuilder, InstBuilder, Value},
};
use generational_arena::Index;
use string_interner::symbol::SymbolUsize;

use crate::compiler::{
    analysis::SymbolTable,
    ast::Node,
    codegen::{
        GenValue, Info,
        error::GenError,
        expr::expr_to_val,
        name_value,
        variable::{coerce, retype_null},
    },
};

pub fn expr_call(
    node: &Node,
    callee_sym: SymbolUsize,
    args: &[Index],
    fn_builder: &mut FunctionBuilder,
    scopes: &mut SymbolTable,
    info: &mut Info,
) -> Result<GenValue, GenError> {
    // functions live in the module, not in the scoped symbol table
    let callee_name = info.name(callee_sym);
    let Some(callee) = info.unit.get_function(callee_name).cloned() else {
        return Err(info
            .diagnostics
            .add_error(node.token, format!("Function {callee_name} not declared")));
    };

    let mut arg_values = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        match expr_to_val(*arg, fn_builder, scopes, info) {
            Ok(v) if v.value.is_some() => arg_values.push(v),
            Ok(_) => return Err(info.diagnostics.add_error(node.token, format!("Expected argument list index {i}"))),
            Err(e) if e.is_reported() => {
                return Err(info.diagnostics.add_error(node.token, format!("Expected argument list index {i}")));
            }
            Err(e) => return Err(e),
        }
    }

    let formal = callee.ty.params.len();
    let arity_ok = if callee.ty.variadic {
        arg_values.len() >= formal
    } else {
        arg_values.len() == formal
    };
    if !arity_ok {
        return Err(info.diagnostics.add_error(
            node.token,
            format!("Expected {formal} arguments but found {}", arg_values.len()),
        ));
    }

    let mut values: Vec<Value> = Vec::with_capacity(arg_values.len());
    for (i, arg) in arg_values.into_iter().enumerate() {
        let arg = match callee.ty.params.get(i) {
            Some(param_ty) => {
                let arg = retype_null(arg, param_ty, fn_builder, info);
                match coerce(arg, param_ty, fn_builder)? {
                    Some(arg) => arg,
                    None => {
                        return Err(info
                            .diagnostics
                            .add_error(node.token, format!("Argument type at index {i} is different")));
                    }
                }
            }
            // variadic extras are passed as they are
            None => arg,
        };
        values.extend(arg.value);
    }

    let func_ref = info.unit.module.declare_func_in_func(callee.id, fn_builder.func);
    let call = if values.len() > formal {
        let mut sig = callee.ty.signature(info.target);
        for extra in &values[formal..] {
            let ty = fn_builder.func.dfg.value_type(*extra);
            sig.params.push(AbiParam::new(ty));
        }
        let sig_ref = fn_builder.import_signature(sig);
        let addr = fn_builder.ins().func_addr(info.target.pointer_type, func_ref);
        fn_builder.ins().call_indirect(sig_ref, addr, &values)
    } else {
        fn_builder.ins().call(func_ref, &values)
    };

    if callee.ty.ret.is_unit() {
        return Ok(GenValue::unit());
    }

    let Some(result) = fn_builder.inst_results(call).first().copied() else {
        return Err(GenError::InvalidNode {
            what: format!("call to {callee_name} produced no result"),
        });
    };
    name_value(fn_builder, result, callee_sym);
    Ok(GenValue::new(result, callee.ty.ret).with_name(Some(callee_sym)))
}
