use cranelift::codegen::{CodegenError, isa::LookupError, settings::SetError};
use cranelift::module::ModuleError;
use thiserror::Error;

use crate::compiler::{analysis::ScopeError, ast::VType, tokens::TokenKind};

/// Failure of a generation call.
///
/// `Reported` means a diagnostic was already recorded and the walk may go on
/// with the next sibling. Every other variant is a broken upstream invariant
/// or a backend failure and is propagated as is.
#[derive(Error, Debug)]
pub enum GenError {
    #[error("generation failed, see diagnostics")]
    Reported,

    #[error("function `{name}` is already defined")]
    AlreadyDefined { name: String },

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("declaration of `{name}` has neither a type nor an initializer")]
    MissingDeclType { name: String },

    #[error("unsupported binary operator {op:?}")]
    UnsupportedOperator { op: TokenKind },

    #[error("cannot cast {from} to {to}")]
    InvalidCast { from: VType, to: VType },

    #[error("invalid node: {what}")]
    InvalidNode { what: String },

    #[error("node index not found in the tree")]
    DanglingNode,

    #[error("Cranelift Codegen Error: {0}")]
    Codegen(#[from] CodegenError),

    #[error("Cranelift Module Error: {0}")]
    Module(#[from] Box<ModuleError>),

    #[error("unsupported target: {0}")]
    Lookup(#[from] LookupError),

    #[error("invalid setting: {0}")]
    Setting(#[from] SetError),

    #[error("object emission failed: {0}")]
    Emit(String),
}

impl GenError {
    pub fn is_reported(&self) -> bool {
        matches!(self, GenError::Reported)
    }

    /// The backend verifier refused one function. Only that function is
    /// affected; the rest of the unit can still be generated.
    pub fn is_verifier_rejection(&self) -> bool {
        match self {
            GenError::Codegen(CodegenError::Verifier(_)) => true,
            GenError::Module(err) => matches!(**err, ModuleError::Compilation(CodegenError::Verifier(_))),
            _ => false,
        }
    }
}

impl From<ModuleError> for GenError {
    fn from(err: ModuleError) -> Self {
        GenError::Module(Box::new(err))
    }
}
