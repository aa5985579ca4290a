use std::collections::HashMap;

use cranelift::{
    codegen::{
        CodegenError, Context,
        ir::{Function, ValueLabel},
    },
    module::{DataDescription, DataId, FuncId, FuncOrDataId, Linkage, Module, default_libcall_names},
    object::{ObjectBuilder, ObjectModule},
    prelude::{
        EntityRef, FunctionBuilder, FunctionBuilderContext, Value,
        isa::{self, CallConv, OwnedTargetIsa},
        settings::{self, Configurable, Flags},
        types,
    },
};
use generational_arena::Index;
use string_interner::{Symbol as _, symbol::SymbolUsize};
use target_lexicon::Triple;

use crate::compiler::{
    Interner,
    analysis::SymbolTable,
    ast::{Ast, Node, NodeKind, VType},
    codegen::{error::GenError, function::lower_fn, pipeline::Pipeline},
    error::Diagnostics,
};

mod binary_ops;
mod block;
mod cast;
mod control_flow;
pub mod error;
mod expr;
mod function;
mod function_call;
mod literal;
pub mod pipeline;
mod translate;
mod variable;

/// What the driver picks before a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub triple: Triple,
    /// Run the registered pipeline on every defined function
    pub optimize: bool,
}

impl BuildConfig {
    pub fn host() -> Self {
        Self::for_triple(Triple::host())
    }

    pub fn for_triple(triple: Triple) -> Self {
        Self { triple, optimize: false }
    }

    pub fn optimized(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }
}

/// ABI facts derived from the ISA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub call_conv: CallConv,
    pub pointer_type: types::Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnType {
    pub params: Vec<VType>,
    pub ret: VType,
    pub variadic: bool,
}

/// A function known to the module.
#[derive(Debug, Clone)]
pub struct Callee {
    pub id: FuncId,
    pub name: SymbolUsize,
    pub ty: FnType,
}

/// Result of generating one node. `value` is `None` for unit-typed results.
#[derive(Debug, Clone)]
pub struct GenValue {
    pub value: Option<Value>,
    pub type_: VType,
    pub name: Option<SymbolUsize>,
}

impl GenValue {
    pub fn unit() -> Self {
        Self {
            value: None,
            type_: VType::UNIT,
            name: None,
        }
    }

    pub fn new(value: Value, type_: VType) -> Self {
        Self {
            value: Some(value),
            type_,
            name: None,
        }
    }

    pub fn with_name(mut self, name: Option<SymbolUsize>) -> Self {
        self.name = name;
        self
    }
}

/// Textual CLIF of a generated function.
#[derive(Debug, Clone)]
pub struct Listing {
    pub name: String,
    pub clif: String,
    /// Set when the pipeline ran
    pub optimized: Option<String>,
    /// False when diagnostics kept the function out of the module
    pub defined: bool,
}

/// Per-function emission state.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub function: SymbolUsize,
    /// Current block ends in a terminator
    pub terminated: bool,
    /// A `return` was generated somewhere in the body
    pub returned: bool,
}

impl Frame {
    pub fn new(function: SymbolUsize) -> Self {
        Self {
            function,
            terminated: false,
            returned: false,
        }
    }
}

/// The module and everything needed to define functions into it.
pub struct Unit {
    pub module: ObjectModule,
    ctx: Context,
    pipeline: Pipeline,
    optimize: bool,
    functions: HashMap<FuncId, Callee>,
    strings: HashMap<SymbolUsize, DataId>,
    listings: Vec<Listing>,
}

impl Unit {
    /// Looks a function up by its symbol name in the module.
    pub fn get_function(&self, name: &str) -> Option<&Callee> {
        match self.module.get_name(name) {
            Some(FuncOrDataId::Func(id)) => self.functions.get(&id),
            _ => None,
        }
    }

    pub fn declare_function(
        &mut self,
        name: &str,
        sym: SymbolUsize,
        ty: FnType,
        linkage: Linkage,
        target: Target,
    ) -> Result<Callee, GenError> {
        let id = self.module.declare_function(name, linkage, &ty.signature(target))?;
        let callee = Callee { id, name: sym, ty };
        self.functions.insert(id, callee.clone());
        Ok(callee)
    }

    /// NUL-terminated read-only data object for a string literal; one per distinct string.
    pub fn string_data(&mut self, sym: SymbolUsize, text: &str) -> Result<DataId, GenError> {
        if let Some(id) = self.strings.get(&sym) {
            return Ok(*id);
        }

        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let mut desc = DataDescription::new();
        desc.define(bytes.into_boxed_slice());

        let id = self.module.declare_anonymous_data(false, false)?;
        self.module.define_data(id, &desc)?;
        self.strings.insert(sym, id);
        Ok(id)
    }

    /// Runs the pipeline if enabled and defines `func` into the module. The
    /// listing is recorded either way; `defined` tells whether the backend
    /// accepted the function.
    pub fn define(&mut self, callee: &Callee, name: &str, func: Function) -> Result<(), GenError> {
        let clif = func.display().to_string();
        tracing::debug!(function = name, "defining function\n{clif}");

        self.ctx.func = func;
        let mut optimized = None;
        let mut result = Ok(());
        if self.optimize {
            // passes expect well formed input
            result = self
                .ctx
                .verify(self.module.isa())
                .map_err(|e| GenError::Codegen(CodegenError::Verifier(e)));
            if result.is_ok() {
                result = self.pipeline.run(&mut self.ctx, self.module.isa());
            }
            if result.is_ok() {
                optimized = Some(self.ctx.func.display().to_string());
            }
        }
        if result.is_ok() {
            result = self
                .module
                .define_function(callee.id, &mut self.ctx)
                .map_err(GenError::from);
        }
        self.ctx.clear();

        self.listings.push(Listing {
            name: name.to_string(),
            clif,
            optimized,
            defined: result.is_ok(),
        });
        result
    }

    /// Keeps the CLIF of a function that is not defined into the module.
    pub fn discard(&mut self, name: &str, func: &Function) {
        self.listings.push(Listing {
            name: name.to_string(),
            clif: func.display().to_string(),
            optimized: None,
            defined: false,
        });
    }
}

/// State shared by every generation call inside one top-level definition.
pub struct Info<'a> {
    pub unit: &'a mut Unit,
    pub ast: &'a Ast,
    pub interner: &'a Interner,
    pub diagnostics: &'a mut Diagnostics,
    pub target: Target,
    pub frame: Frame,
}

impl<'a> Info<'a> {
    pub fn node(&self, idx: Index) -> Result<&'a Node, GenError> {
        self.ast.get(idx).ok_or(GenError::DanglingNode)
    }

    pub fn name(&self, sym: SymbolUsize) -> &'a str {
        self.interner.resolve(sym).unwrap_or("<unknown>")
    }
}

/// Attaches a source name to a value so it shows up in debug info.
pub(crate) fn name_value(fn_builder: &mut FunctionBuilder, value: Value, name: SymbolUsize) {
    fn_builder.set_val_label(value, ValueLabel::new(name.to_usize()));
}

/// Code generation context for one compilation unit.
pub struct Codegen {
    unit: Unit,
    fn_builder_ctx: FunctionBuilderContext,
    target: Target,
}

impl Codegen {
    pub fn new(unit_name: &str, config: &BuildConfig) -> Result<Self, GenError> {
        let isa = isa(config)?;
        let target = Target {
            call_conv: isa.default_call_conv(),
            pointer_type: isa.pointer_type(),
        };

        let builder = ObjectBuilder::new(isa, unit_name, default_libcall_names())?;
        let module = ObjectModule::new(builder);

        Ok(Self {
            unit: Unit {
                module,
                ctx: Context::new(),
                pipeline: Pipeline::standard(),
                optimize: config.optimize,
                functions: HashMap::new(),
                strings: HashMap::new(),
                listings: Vec::new(),
            },
            fn_builder_ctx: FunctionBuilderContext::new(),
            target,
        })
    }

    /// Generates one top-level function declaration or definition.
    pub fn generate(
        &mut self,
        def: Index,
        ast: &Ast,
        interner: &Interner,
        symbols: &mut SymbolTable,
        diagnostics: &mut Diagnostics,
    ) -> Result<Callee, GenError> {
        let node = ast.get(def).ok_or(GenError::DanglingNode)?;
        let NodeKind::Function(fn_def) = &node.kind else {
            return Err(GenError::InvalidNode {
                what: "only function declarations are allowed at the top level".to_string(),
            });
        };

        let mut info = Info {
            unit: &mut self.unit,
            ast,
            interner,
            diagnostics,
            target: self.target,
            frame: Frame::new(fn_def.name),
        };
        lower_fn(node, fn_def, &mut self.fn_builder_ctx, symbols, &mut info)
    }

    /// Generates every top-level definition in order. Redefinitions and
    /// diagnosed failures do not stop the walk.
    pub fn generate_all(
        &mut self,
        defs: &[Index],
        ast: &Ast,
        interner: &Interner,
        symbols: &mut SymbolTable,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), GenError> {
        for def in defs {
            match self.generate(*def, ast, interner, symbols, diagnostics) {
                Ok(_) => {}
                Err(GenError::AlreadyDefined { name }) => {
                    tracing::debug!(function = %name, "skipping redefinition");
                }
                Err(GenError::Reported) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.unit.pipeline
    }

    pub fn get_function(&self, name: &str) -> Option<&Callee> {
        self.unit.get_function(name)
    }

    pub fn listings(&self) -> &[Listing] {
        &self.unit.listings
    }

    pub fn listing(&self, name: &str) -> Option<&Listing> {
        self.unit.listings.iter().find(|l| l.name == name)
    }

    /// Finishes the module and returns the object file bytes.
    pub fn finish(self) -> Result<Vec<u8>, GenError> {
        let product = self.unit.module.finish();
        product.emit().map_err(|e| GenError::Emit(e.to_string()))
    }
}

fn isa(config: &BuildConfig) -> Result<OwnedTargetIsa, GenError> {
    let mut flag_builder = settings::builder();
    flag_builder.set("is_pic", "true")?;
    let flags = Flags::new(flag_builder);

    let isa = isa::lookup(config.triple.clone())?.finish(flags)?;
    Ok(isa)
}
