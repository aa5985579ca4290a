use cranelift::prelude::FunctionBuilder;
use generational_arena::Index;

use crate::compiler::{
    analysis::SymbolTable,
    codegen::{GenValue, Info, error::GenError, expr::expr_to_val},
};

/// Statement list in its own scope. Diagnosed statements are skipped so the
/// rest of the list still gets checked.
pub fn expr_block(
    stmts: &[Index],
    fn_builder: &mut FunctionBuilder,
    scopes: &mut SymbolTable,
    info: &mut Info,
) -> Result<GenValue, GenError> {
    scopes.enter_scope();

    let mut outcome = Ok(());
    for stmt in stmts {
        match expr_to_val(*stmt, fn_builder, scopes, info) {
            Ok(_) => {}
            Err(e) if e.is_reported() => {}
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }

    scopes.exit_scope()?;
    outcome.map(|()| GenValue::unit())
}
