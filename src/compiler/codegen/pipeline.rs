use std::fmt;

use cranelift::codegen::{Context, control::ControlPlane, isa::TargetIsa};

use crate::compiler::codegen::error::GenError;

/// Function-level optimization passes, in the order they are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Peephole and bit-twiddling rewrites
    InstCombine,
    Reassociate,
    /// Common subexpression elimination
    Gvn,
    /// Drops unreachable blocks and folds constant block params
    CfgSimplify,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::InstCombine => "instcombine",
            Pass::Reassociate => "reassociate",
            Pass::Gvn => "gvn",
            Pass::CfgSimplify => "simplifycfg",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    passes: Vec<Pass>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    pub fn standard() -> Self {
        Self {
            passes: vec![Pass::InstCombine, Pass::Reassociate, Pass::Gvn, Pass::CfgSimplify],
        }
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Runs every registered pass over `ctx.func`.
    ///
    /// Instruction combining and reassociation are both carried by the
    /// e-graph rewrite rules, so each of them triggers an e-graph run.
    pub fn run(&self, ctx: &mut Context, isa: &dyn TargetIsa) -> Result<(), GenError> {
        let mut ctrl_plane = ControlPlane::default();
        for pass in &self.passes {
            tracing::trace!(%pass, "running pass");
            ctx.compute_cfg();
            ctx.compute_domtree();
            match pass {
                Pass::InstCombine | Pass::Reassociate => ctx.egraph_pass(isa, &mut ctrl_plane)?,
                Pass::Gvn => ctx.replace_redundant_loads()?,
                Pass::CfgSimplify => {
                    ctx.eliminate_unreachable_code(isa)?;
                    ctx.remove_constant_phis(isa)?;
                }
            }
        }
        Ok(())
    }
}
