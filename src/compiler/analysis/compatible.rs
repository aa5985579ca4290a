use crate::compiler::ast::VType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Identical,
    Castable,
    Incompatible,
}

/// Classifies a pair of types for implicit conversion.
///
/// Integers of any width or signedness convert into each other. Pointers
/// only match when their pointees are identical; a null constant gets
/// re-materialised at the declared type before this is consulted.
pub fn compare_types(a: &VType, b: &VType) -> Compatibility {
    if a == b {
        return Compatibility::Identical;
    }

    match (a, b) {
        (VType::Primitive(from), VType::Primitive(to)) if from.is_int() && to.is_int() => Compatibility::Castable,
        _ => Compatibility::Incompatible,
    }
}
