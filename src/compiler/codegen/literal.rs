use cranelift::{
    module::Module,
    prelude::{FunctionBuilder, InstBuilder, types},
};
use string_interner::symbol::SymbolUsize;

use crate::compiler::{
    ast::VType,
    codegen::{GenValue, Info, error::GenError},
};

/// Integer literals are always 32-bit signed.
pub fn number_literal(value: i64, fn_builder: &mut FunctionBuilder) -> GenValue {
    let v = fn_builder.ins().iconst(types::I32, i64::from(value as i32));
    GenValue::new(v, VType::I32)
}

/// Pointer to the first byte of a global, NUL-terminated copy of the string.
pub fn string_literal(sym: SymbolUsize, fn_builder: &mut FunctionBuilder, info: &mut Info) -> Result<GenValue, GenError> {
    let text = info.name(sym);
    let data_id = info.unit.string_data(sym, text)?;
    let global = info.unit.module.declare_data_in_func(data_id, fn_builder.func);
    let ptr = fn_builder.ins().global_value(info.target.pointer_type, global);
    Ok(GenValue::new(ptr, VType::byte_ptr()))
}

/// Null pointer, `*i8` unless the tree already carries a pointer type.
pub fn nil_literal(type_: Option<&VType>, fn_builder: &mut FunctionBuilder, info: &Info) -> GenValue {
    let ty = type_.cloned().unwrap_or_else(VType::byte_ptr);
    let v = fn_builder.ins().iconst(info.target.pointer_type, 0);
    GenValue::new(v, ty)
}
