use std::fmt;

use generational_arena::{Arena, Index};
use string_interner::symbol::SymbolUsize;

use crate::compiler::tokens::{PrimitiveTypes, Token};

/// Language-level type attached to declarations, parameters and generated values.
#[derive(Debug, Clone, PartialEq)]
pub enum VType {
    Primitive(PrimitiveTypes),
    Pointer(Box<VType>),
}

impl VType {
    pub const UNIT: VType = VType::Primitive(PrimitiveTypes::Unit);
    pub const I32: VType = VType::Primitive(PrimitiveTypes::I32);

    pub fn pointer_to(pointee: VType) -> Self {
        VType::Pointer(Box::new(pointee))
    }

    /// `*i8`, the type of untyped null and of string literals.
    pub fn byte_ptr() -> Self {
        VType::pointer_to(VType::Primitive(PrimitiveTypes::I8))
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, VType::Primitive(PrimitiveTypes::Unit))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, VType::Pointer(_))
    }
}

impl fmt::Display for VType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VType::Primitive(p) => write!(f, "{p}"),
            VType::Pointer(inner) => write!(f, "*{inner}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: SymbolUsize,
    pub type_: VType,
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: SymbolUsize,
    /// When `variadic` is set the last entry is the `...` marker and is not a formal parameter.
    pub params: Vec<Param>,
    pub return_type: VType,
    pub variadic: bool,

    /// Block node; `None` for a bare declaration
    pub body: Option<Index>,
}

impl FunctionDef {
    pub fn formal_params(&self) -> &[Param] {
        if self.variadic {
            &self.params[..self.params.len().saturating_sub(1)]
        } else {
            &self.params
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Function(FunctionDef),
    Block {
        stmts: Vec<Index>,
    },
    Call {
        callee: SymbolUsize,
        args: Vec<Index>,
    },
    NumberLiteral(i64),
    StringLiteral(SymbolUsize),
    /// `type_` is set when the parser already knows the pointer type
    NilLiteral {
        type_: Option<VType>,
    },
    Declaration {
        name: SymbolUsize,
        type_: Option<VType>,
        value: Option<Index>,
    },
    /// The node's token is the operator.
    BinaryOperator {
        lhs: Index,
        rhs: Index,
    },
    Return {
        value: Option<Index>,
    },
    VariableReference {
        name: SymbolUsize,
        address_of: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub token: Token,
    pub kind: NodeKind,
}

/// Arena-backed tree handed over by the parser.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Arena<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self { nodes: Arena::new() }
    }

    pub fn add(&mut self, token: Token, kind: NodeKind) -> Index {
        self.nodes.insert(Node { token, kind })
    }

    pub fn get(&self, idx: Index) -> Option<&Node> {
        self.nodes.get(idx)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
