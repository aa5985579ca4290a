use generational_arena::Index;
use string_interner::{StringInterner, backend::BucketBackend, symbol::SymbolUsize};

pub mod analysis;
pub mod ast;
pub mod codegen;
pub mod error;
pub mod tokens;

use analysis::SymbolTable;
use ast::Ast;
use codegen::{BuildConfig, Codegen, error::GenError};
use error::Diagnostics;

pub type Interner = StringInterner<BucketBackend<SymbolUsize>>;

/// Outcome of one compilation pass.
pub struct Compilation {
    pub codegen: Codegen,
    pub diagnostics: Diagnostics,
}

impl Compilation {
    /// The pass succeeded when nothing was diagnosed.
    pub fn succeeded(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Generates every top-level definition of one unit with fresh scope and diagnostic state.
pub fn compile_unit(
    unit_name: &str,
    defs: &[Index],
    ast: &Ast,
    interner: &Interner,
    config: &BuildConfig,
) -> Result<Compilation, GenError> {
    let mut codegen = Codegen::new(unit_name, config)?;
    let mut symbols = SymbolTable::new();
    let mut diagnostics = Diagnostics::new();

    codegen.generate_all(defs, ast, interner, &mut symbols, &mut diagnostics)?;
    tracing::debug!(unit = unit_name, diagnostics = diagnostics.len(), "unit generated");

    Ok(Compilation { codegen, diagnostics })
}
