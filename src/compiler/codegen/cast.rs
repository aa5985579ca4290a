use std::cmp::Ordering;

use cranelift::{
    codegen::ir::{Function, InstructionData, Opcode, StackSlot, Value, ValueDef},
    prelude::{FunctionBuilder, InstBuilder},
};

use crate::compiler::{
    ast::VType,
    codegen::{GenValue, error::GenError},
    tokens::PrimitiveTypes,
};

/// Converts an integer value to another integer type, extending by the source signedness.
pub fn cast_to(value: GenValue, target: &VType, fn_builder: &mut FunctionBuilder) -> Result<GenValue, GenError> {
    let (VType::Primitive(from), VType::Primitive(to)) = (&value.type_, target) else {
        return Err(GenError::InvalidCast {
            from: value.type_.clone(),
            to: target.clone(),
        });
    };

    let (Some(v), Some(target_clif)) = (value.value, to.to_clif()) else {
        return Err(GenError::InvalidCast {
            from: value.type_.clone(),
            to: target.clone(),
        });
    };

    let cast = match to.bits().cmp(&from.bits()) {
        Ordering::Less => fn_builder.ins().ireduce(target_clif, v),
        Ordering::Greater => {
            if from.is_signed() {
                fn_builder.ins().sextend(target_clif, v)
            } else {
                fn_builder.ins().uextend(target_clif, v)
            }
        }
        Ordering::Equal => v,
    };

    Ok(GenValue::new(cast, target.clone()).with_name(value.name))
}

/// Brings two integer operands to one type by widening the narrower one.
/// Both operands are returned; either may have changed.
pub fn unify(lhs: GenValue, rhs: GenValue, fn_builder: &mut FunctionBuilder) -> Result<(GenValue, GenValue), GenError> {
    let lhs_bits = int_bits(&lhs.type_);
    let rhs_bits = int_bits(&rhs.type_);

    if lhs_bits < rhs_bits {
        let target = rhs.type_.clone();
        Ok((cast_to(lhs, &target, fn_builder)?, rhs))
    } else {
        let target = lhs.type_.clone();
        Ok((lhs, cast_to(rhs, &target, fn_builder)?))
    }
}

fn int_bits(ty: &VType) -> u32 {
    match ty {
        VType::Primitive(p) => p.bits(),
        VType::Pointer(_) => PrimitiveTypes::U64.bits(),
    }
}

/// Where a loaded value came from.
///
/// Variables are always read with `stack_load`, so only `Slot` and
/// `NotALoad` come out of the current node set. `Address` is what a
/// dereference node would produce, a plain `load` through a pointer value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadSource {
    Slot(StackSlot),
    Address,
    NotALoad,
}

pub fn load_source(value: Value, func: &Function) -> LoadSource {
    let ValueDef::Result(inst, _) = func.dfg.value_def(value) else {
        return LoadSource::NotALoad;
    };

    match &func.dfg.insts[inst] {
        InstructionData::StackLoad {
            opcode: Opcode::StackLoad,
            stack_slot,
            ..
        } => LoadSource::Slot(*stack_slot),
        InstructionData::Load { .. } => LoadSource::Address,
        _ => LoadSource::NotALoad,
    }
}

/// A pointer-typed `iconst 0`.
pub fn is_null_constant(value: &GenValue, func: &Function) -> bool {
    let Some(v) = value.value else {
        return false;
    };
    if !value.type_.is_pointer() {
        return false;
    }

    match func.dfg.value_def(v) {
        ValueDef::Result(inst, _) => matches!(
            &func.dfg.insts[inst],
            InstructionData::UnaryImm { opcode: Opcode::Iconst, imm } if imm.bits() == 0
        ),
        _ => false,
    }
}
