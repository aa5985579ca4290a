use cranelift::{
    codegen::ir::{Function, UserFuncName},
    module::Linkage,
    prelude::{FunctionBuilder, FunctionBuilderContext, InstBuilder, Value},
};
use generational_arena::Index;

use crate::compiler::{
    analysis::{Symbol, SymbolTable},
    ast::{FunctionDef, Node},
    codegen::{
        Callee, FnType, Frame, Info,
        control_flow::close_function,
        error::GenError,
        expr::expr_to_val,
        variable::create_slot,
    },
};

pub fn lower_fn(
    node: &Node,
    def: &FunctionDef,
    fn_builder_ctx: &mut FunctionBuilderContext,
    scopes: &mut SymbolTable,
    info: &mut Info,
) -> Result<Callee, GenError> {
    let fn_name = info.name(def.name);
    if info.unit.get_function(fn_name).is_some() {
        return Err(GenError::AlreadyDefined {
            name: fn_name.to_string(),
        });
    }

    let ty = FnType {
        params: def.formal_params().iter().map(|p| p.type_.clone()).collect(),
        ret: def.return_type.clone(),
        variadic: def.variadic,
    };
    let linkage = if def.body.is_some() { Linkage::Export } else { Linkage::Import };
    let callee = info.unit.declare_function(fn_name, def.name, ty, linkage, info.target)?;

    // registered before the body so recursive calls and returns resolve
    scopes.insert(Symbol::function(def.name, callee.clone()));

    let Some(body) = def.body else {
        tracing::debug!(function = fn_name, "declared external function");
        return Ok(callee);
    };

    tracing::debug!(function = fn_name, params = callee.ty.params.len(), "lowering function");

    let sig = callee.ty.signature(info.target);
    let mut func = Function::with_name_signature(UserFuncName::user(0, callee.id.as_u32()), sig);
    let errors_before = info.diagnostics.len();
    info.frame = Frame::new(def.name);

    let lowered = {
        let mut fn_builder = FunctionBuilder::new(&mut func, fn_builder_ctx);
        fn_builder.func.dfg.collect_debug_info();

        let entry = fn_builder.create_block();
        fn_builder.append_block_params_for_function_params(entry);
        fn_builder.switch_to_block(entry);
        fn_builder.seal_block(entry);

        scopes.enter_scope();
        let lowered = lower_body(node, def, body, entry, &mut fn_builder, scopes, info);
        close_function(node, &callee.ty.ret, &mut fn_builder, info);
        let exited = scopes.exit_scope();

        fn_builder.seal_all_blocks();
        fn_builder.finalize();
        lowered.and(exited.map_err(GenError::from))
    };
    lowered?;

    if info.diagnostics.len() > errors_before {
        tracing::debug!(function = fn_name, "not defining function with diagnostics");
        info.unit.discard(fn_name, &func);
        return Ok(callee);
    }

    match info.unit.define(&callee, fn_name, func) {
        Ok(()) => Ok(callee),
        Err(e) if e.is_verifier_rejection() => {
            tracing::warn!(function = fn_name, error = %e, "backend rejected function, not defined");
            Ok(callee)
        }
        Err(e) => Err(e),
    }
}

/// Spills every parameter into its own stack slot, then generates the body.
fn lower_body(
    node: &Node,
    def: &FunctionDef,
    body: Index,
    entry: cranelift::prelude::Block,
    fn_builder: &mut FunctionBuilder,
    scopes: &mut SymbolTable,
    info: &mut Info,
) -> Result<(), GenError> {
    let args: Vec<Value> = fn_builder.block_params(entry).to_vec();
    let mut args = args.into_iter();

    for param in def.formal_params() {
        // unit parameters have no entry in the signature, so no argument is consumed
        let Some(slot) = create_slot(&param.type_, fn_builder, info) else {
            let name = info.name(param.name);
            info.diagnostics
                .add_error(node.token, format!("Parameter {name} cannot have void type"));
            continue;
        };
        let Some(arg) = args.next() else {
            return Err(GenError::InvalidNode {
                what: "parameter count does not match the signature".to_string(),
            });
        };
        fn_builder.ins().stack_store(arg, slot, 0);
        scopes.insert(Symbol::parameter(param.name, slot, param.type_.clone()));
    }

    match expr_to_val(body, fn_builder, scopes, info) {
        Ok(_) => Ok(()),
        Err(e) if e.is_reported() => Ok(()),
        Err(e) => Err(e),
    }
}
