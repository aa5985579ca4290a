pub mod compatible;
pub mod symbol_table;

pub use compatible::{Compatibility, compare_types};
pub use symbol_table::{ScopeError, Symbol, SymbolKind, SymbolScope, SymbolTable, SymbolValue};
