use cranelift::{
    codegen::ir::StackSlot,
    prelude::{FunctionBuilder, InstBuilder, StackSlotData, StackSlotKind},
};
use generational_arena::Index;
use string_interner::symbol::SymbolUsize;

use crate::compiler::{
    analysis::{Compatibility, Symbol, SymbolTable, SymbolValue, compare_types},
    ast::{Node, VType},
    codegen::{
        GenValue, Info,
        cast::{cast_to, is_null_constant},
        error::GenError,
        expr::expr_to_val,
        name_value,
    },
};

/// Stack slot sized and aligned for `ty`. Unit has no storage.
pub fn create_slot(ty: &VType, fn_builder: &mut FunctionBuilder, info: &Info) -> Option<StackSlot> {
    let clif = ty.to_clif(info.target.pointer_type)?;
    let size = clif.bytes();
    let align_shift = size.trailing_zeros() as u8;
    Some(fn_builder.create_sized_stack_slot(StackSlotData::new(StackSlotKind::ExplicitSlot, size, align_shift)))
}

/// Zero of `ty`; a null pointer for pointer types.
pub fn zero_value(ty: &VType, fn_builder: &mut FunctionBuilder, info: &Info) -> Option<GenValue> {
    let clif = ty.to_clif(info.target.pointer_type)?;
    let v = fn_builder.ins().iconst(clif, 0);
    Some(GenValue::new(v, ty.clone()))
}

/// Null constants adopt the type they are assigned to.
pub fn retype_null(value: GenValue, target: &VType, fn_builder: &mut FunctionBuilder, info: &Info) -> GenValue {
    if is_null_constant(&value, &*fn_builder.func) {
        if let Some(zero) = zero_value(target, fn_builder, info) {
            return zero.with_name(value.name);
        }
    }
    value
}

/// Brings `value` to `target` for declarations, returns and call arguments.
/// `None` when the two types are incompatible.
pub fn coerce(value: GenValue, target: &VType, fn_builder: &mut FunctionBuilder) -> Result<Option<GenValue>, GenError> {
    match compare_types(target, &value.type_) {
        Compatibility::Identical => Ok(Some(value)),
        Compatibility::Castable => Ok(Some(cast_to(value, target, fn_builder)?)),
        Compatibility::Incompatible => Ok(None),
    }
}

pub fn expr_declaration(
    node: &Node,
    name: SymbolUsize,
    decl_type: Option<&VType>,
    value: Option<Index>,
    fn_builder: &mut FunctionBuilder,
    scopes: &mut SymbolTable,
    info: &mut Info,
) -> Result<GenValue, GenError> {
    let init = match value {
        Some(init_idx) => {
            let init_node = info.node(init_idx)?;
            let init = expr_to_val(init_idx, fn_builder, scopes, info)?;

            if init.type_.is_unit() {
                return Err(info.diagnostics.add_error(init_node.token, "Cannot assign void to a variable"));
            }

            match decl_type {
                Some(decl) => {
                    let init = retype_null(init, decl, fn_builder, info);
                    match coerce(init, decl, fn_builder)? {
                        Some(v) => v,
                        None => {
                            return Err(info
                                .diagnostics
                                .add_error(init_node.token, "Cannot assign, expression type is different"));
                        }
                    }
                }
                None => init,
            }
        }
        None => {
            let Some(decl) = decl_type else {
                return Err(GenError::MissingDeclType {
                    name: info.name(name).to_string(),
                });
            };
            match zero_value(decl, fn_builder, info) {
                Some(zero) => zero,
                None => return Err(info.diagnostics.add_error(node.token, "Cannot assign void to a variable")),
            }
        }
    };

    let (Some(v), Some(slot)) = (init.value, create_slot(&init.type_, fn_builder, info)) else {
        return Err(info.diagnostics.add_error(node.token, "Cannot assign void to a variable"));
    };

    tracing::trace!(variable = info.name(name), ty = %init.type_, "declare");
    scopes.insert(Symbol::variable(name, slot, init.type_));
    fn_builder.ins().stack_store(v, slot, 0);

    Ok(GenValue::unit())
}

pub fn expr_variable(
    node: &Node,
    name: SymbolUsize,
    address_of: bool,
    fn_builder: &mut FunctionBuilder,
    scopes: &mut SymbolTable,
    info: &mut Info,
) -> Result<GenValue, GenError> {
    let var_name = info.name(name);
    let Some(symbol) = scopes.get(name) else {
        return Err(info.diagnostics.add_error(node.token, format!("Variable {var_name} not declared")));
    };

    let SymbolValue::Slot { slot, type_ } = &symbol.value else {
        return Err(info.diagnostics.add_error(node.token, format!("{var_name} is not a variable")));
    };
    let (slot, type_) = (*slot, type_.clone());

    if address_of {
        let addr = fn_builder.ins().stack_addr(info.target.pointer_type, slot, 0);
        return Ok(GenValue::new(addr, VType::pointer_to(type_)).with_name(Some(name)));
    }

    let Some(clif) = type_.to_clif(info.target.pointer_type) else {
        return Err(GenError::InvalidNode {
            what: format!("variable {var_name} has no storage"),
        });
    };
    let loaded = fn_builder.ins().stack_load(clif, slot, 0);
    name_value(fn_builder, loaded, name);
    Ok(GenValue::new(loaded, type_).with_name(Some(name)))
}
