use cranelift::codegen::ir::StackSlot;
use string_interner::symbol::SymbolUsize;
use thiserror::Error;

use crate::compiler::{ast::VType, codegen::Callee};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    Global,
    Parameter,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Parameter,
    Variable,
}

/// Backend object realising a symbol.
#[derive(Debug, Clone)]
pub enum SymbolValue {
    Function(Callee),
    Slot { slot: StackSlot, type_: VType },
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: SymbolUsize,
    pub scope: SymbolScope,
    pub kind: SymbolKind,
    pub value: SymbolValue,
}

impl Symbol {
    pub fn function(name: SymbolUsize, callee: Callee) -> Self {
        Self {
            name,
            scope: SymbolScope::Global,
            kind: SymbolKind::Function,
            value: SymbolValue::Function(callee),
        }
    }

    pub fn parameter(name: SymbolUsize, slot: StackSlot, type_: VType) -> Self {
        Self {
            name,
            scope: SymbolScope::Parameter,
            kind: SymbolKind::Parameter,
            value: SymbolValue::Slot { slot, type_ },
        }
    }

    pub fn variable(name: SymbolUsize, slot: StackSlot, type_: VType) -> Self {
        Self {
            name,
            scope: SymbolScope::Local,
            kind: SymbolKind::Variable,
            value: SymbolValue::Slot { slot, type_ },
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScopeError {
    #[error("cannot exit the global scope")]
    GlobalScope,
}

/// Lexical scopes as a stack of insertion counts over one flat symbol list.
///
/// Lookups walk the list from the newest entry backwards, so an inner binding
/// shadows an outer one and a redeclaration shadows the earlier one in the
/// same scope. The first counter is the global scope and is never popped.
#[derive(Debug)]
pub struct SymbolTable {
    table: Vec<Symbol>,
    lookup: Vec<usize>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut symbols = Self {
            table: Vec::new(),
            lookup: Vec::new(),
        };
        symbols.enter_scope();
        symbols
    }

    pub fn enter_scope(&mut self) {
        self.lookup.push(0);
        tracing::trace!(depth = self.lookup.len(), "enter scope");
    }

    pub fn exit_scope(&mut self) -> Result<(), ScopeError> {
        if self.lookup.len() == 1 {
            return Err(ScopeError::GlobalScope);
        }

        if let Some(n) = self.lookup.pop() {
            let keep = self.table.len() - n;
            self.table.truncate(keep);
        }
        tracing::trace!(depth = self.lookup.len(), "exit scope");
        Ok(())
    }

    pub fn insert(&mut self, symbol: Symbol) {
        self.table.push(symbol);
        if let Some(count) = self.lookup.last_mut() {
            *count += 1;
        }
    }

    pub fn get(&self, name: SymbolUsize) -> Option<&Symbol> {
        self.table.iter().rev().find(|s| s.name == name)
    }

    /// Innermost function symbol. Works because a function is inserted
    /// before its body scope is entered.
    pub fn last_function(&self) -> Option<&Symbol> {
        self.table.iter().rev().find(|s| s.kind == SymbolKind::Function)
    }

    pub fn reset(&mut self) {
        self.table.clear();
        self.lookup.clear();
        self.enter_scope();
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.lookup.len()
    }

    pub fn scope_counts(&self) -> &[usize] {
        &self.lookup
    }
}

#[cfg(test)]
mod tests {
    use cranelift::module::FuncId;
    use cranelift::prelude::EntityRef;

    use super::*;
    use crate::compiler::{Interner, codegen::FnType};

    fn slot(n: usize) -> StackSlot {
        StackSlot::new(n)
    }

    fn assert_counts_match(symbols: &SymbolTable) {
        assert_eq!(symbols.scope_counts().iter().sum::<usize>(), symbols.len());
    }

    #[test]
    fn global_scope_cannot_be_exited() {
        let mut interner = Interner::new();
        let g = interner.get_or_intern("g");
        let mut symbols = SymbolTable::new();
        symbols.insert(Symbol::variable(g, slot(0), VType::I32));

        assert_eq!(symbols.exit_scope(), Err(ScopeError::GlobalScope));
        assert_eq!(symbols.depth(), 1);
        assert_eq!(symbols.len(), 1);
        assert_counts_match(&symbols);
    }

    #[test]
    fn counts_track_entries_through_nesting() {
        let mut interner = Interner::new();
        let names: Vec<_> = ["a", "b", "c", "d"].iter().map(|n| interner.get_or_intern(n)).collect();
        let mut symbols = SymbolTable::new();

        symbols.insert(Symbol::variable(names[0], slot(0), VType::I32));
        assert_counts_match(&symbols);
        symbols.enter_scope();
        symbols.insert(Symbol::variable(names[1], slot(1), VType::I32));
        symbols.insert(Symbol::variable(names[2], slot(2), VType::I32));
        assert_counts_match(&symbols);
        symbols.enter_scope();
        assert_counts_match(&symbols);
        symbols.insert(Symbol::variable(names[3], slot(3), VType::I32));
        assert_eq!(symbols.scope_counts(), &[1, 2, 1]);

        symbols.exit_scope().unwrap();
        assert_counts_match(&symbols);
        assert!(symbols.get(names[3]).is_none());
        symbols.exit_scope().unwrap();
        assert_counts_match(&symbols);
        assert_eq!(symbols.len(), 1);
        assert!(symbols.get(names[0]).is_some());
        assert!(symbols.exit_scope().is_err());
    }

    #[test]
    fn nested_binding_shadows_then_restores() {
        let mut interner = Interner::new();
        let x = interner.get_or_intern("x");
        let mut symbols = SymbolTable::new();

        symbols.insert(Symbol::variable(x, slot(0), VType::I32));
        symbols.enter_scope();
        symbols.insert(Symbol::variable(x, slot(1), VType::Primitive(crate::compiler::tokens::PrimitiveTypes::I64)));

        match &symbols.get(x).unwrap().value {
            SymbolValue::Slot { slot: s, .. } => assert_eq!(*s, slot(1)),
            other => panic!("unexpected symbol value {other:?}"),
        }

        symbols.exit_scope().unwrap();
        match &symbols.get(x).unwrap().value {
            SymbolValue::Slot { slot: s, type_ } => {
                assert_eq!(*s, slot(0));
                assert_eq!(*type_, VType::I32);
            }
            other => panic!("unexpected symbol value {other:?}"),
        }
    }

    #[test]
    fn redeclaration_in_same_scope_shadows() {
        let mut interner = Interner::new();
        let x = interner.get_or_intern("x");
        let mut symbols = SymbolTable::new();
        symbols.enter_scope();
        symbols.insert(Symbol::variable(x, slot(0), VType::I32));
        symbols.insert(Symbol::variable(x, slot(1), VType::I32));

        match &symbols.get(x).unwrap().value {
            SymbolValue::Slot { slot: s, .. } => assert_eq!(*s, slot(1)),
            other => panic!("unexpected symbol value {other:?}"),
        }
    }

    #[test]
    fn last_function_skips_locals() {
        let mut interner = Interner::new();
        let main = interner.get_or_intern("main");
        let x = interner.get_or_intern("x");
        let mut symbols = SymbolTable::new();

        assert!(symbols.last_function().is_none());

        let callee = Callee {
            id: FuncId::new(0),
            name: main,
            ty: FnType {
                params: vec![],
                ret: VType::I32,
                variadic: false,
            },
        };
        symbols.insert(Symbol::function(main, callee));
        symbols.enter_scope();
        symbols.insert(Symbol::parameter(x, slot(0), VType::I32));
        symbols.enter_scope();
        symbols.insert(Symbol::variable(x, slot(1), VType::I32));

        let found = symbols.last_function().unwrap();
        assert_eq!(found.name, main);
        assert_eq!(found.scope, SymbolScope::Global);
    }

    #[test]
    fn reset_restores_single_global_scope() {
        let mut interner = Interner::new();
        let x = interner.get_or_intern("x");
        let mut symbols = SymbolTable::new();
        symbols.enter_scope();
        symbols.enter_scope();
        symbols.insert(Symbol::variable(x, slot(0), VType::I32));

        symbols.reset();
        assert_eq!(symbols.depth(), 1);
        assert!(symbols.is_empty());
        assert!(symbols.get(x).is_none());
        assert!(symbols.exit_scope().is_err());
    }
}
