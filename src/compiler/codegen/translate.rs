use cranelift::prelude::{AbiParam, Signature, types};

use crate::compiler::{
    ast::VType,
    codegen::{FnType, Target},
    tokens::PrimitiveTypes,
};

impl PrimitiveTypes {
    pub fn to_clif(&self) -> Option<types::Type> {
        use PrimitiveTypes::*;
        match self {
            I8 | U8 => Some(types::I8),
            I16 | U16 => Some(types::I16),
            I32 | U32 => Some(types::I32),
            I64 | U64 => Some(types::I64),
            Unit => None,
        }
    }

    pub fn bits(&self) -> u32 {
        self.to_clif().map_or(0, |t| t.bits())
    }
}

impl VType {
    /// `None` for the unit type, which has no runtime representation.
    pub fn to_clif(&self, pointer_type: types::Type) -> Option<types::Type> {
        match self {
            VType::Primitive(p) => p.to_clif(),
            VType::Pointer(_) => Some(pointer_type),
        }
    }
}

impl FnType {
    /// Signature over the formal parameters only; variadic extras are added per call site.
    pub fn signature(&self, target: Target) -> Signature {
        let mut sig = Signature::new(target.call_conv);
        for param in &self.params {
            if let Some(ty) = param.to_clif(target.pointer_type) {
                sig.params.push(AbiParam::new(ty));
            }
        }
        if let Some(ret) = self.ret.to_clif(target.pointer_type) {
            sig.returns.push(AbiParam::new(ret));
        }
        sig
    }
}
