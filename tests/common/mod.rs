#![allow(dead_code)]

use generational_arena::Index;
use string_interner::symbol::SymbolUsize;
use weasel_codegen::compiler::{
    Compilation, Interner,
    ast::{Ast, FunctionDef, NodeKind, Param, VType},
    codegen::BuildConfig,
    compile_unit,
    tokens::{Keyword, Punctuation, Span, Token, TokenKind},
};

/// Hand-built tree; every node gets its own source line.
pub struct Tree {
    pub interner: Interner,
    pub ast: Ast,
    file: SymbolUsize,
    line: usize,
}

impl Tree {
    pub fn new() -> Self {
        let mut interner = Interner::new();
        let file = interner.get_or_intern("test.ws");
        Self {
            interner,
            ast: Ast::new(),
            file,
            line: 0,
        }
    }

    pub fn sym(&mut self, s: &str) -> SymbolUsize {
        self.interner.get_or_intern(s)
    }

    fn tok(&mut self, kind: TokenKind) -> Token {
        self.line += 1;
        Token::new(kind, Span::new(self.file, self.line, 1, self.line, 1))
    }

    fn add(&mut self, kind: TokenKind, node: NodeKind) -> Index {
        let token = self.tok(kind);
        self.ast.add(token, node)
    }

    pub fn num(&mut self, v: i64) -> Index {
        self.add(TokenKind::IntLiteral(v), NodeKind::NumberLiteral(v))
    }

    pub fn string(&mut self, s: &str) -> Index {
        let sym = self.sym(s);
        self.add(TokenKind::StringLiteral(sym), NodeKind::StringLiteral(sym))
    }

    pub fn nil(&mut self) -> Index {
        self.add(TokenKind::Keyword(Keyword::Nil), NodeKind::NilLiteral { type_: None })
    }

    pub fn var(&mut self, name: &str) -> Index {
        let sym = self.sym(name);
        self.add(
            TokenKind::Identifier(sym),
            NodeKind::VariableReference {
                name: sym,
                address_of: false,
            },
        )
    }

    pub fn addr_of(&mut self, name: &str) -> Index {
        let sym = self.sym(name);
        self.add(
            TokenKind::Punctuation(Punctuation::Amp),
            NodeKind::VariableReference {
                name: sym,
                address_of: true,
            },
        )
    }

    pub fn decl(&mut self, name: &str, type_: Option<VType>, value: Option<Index>) -> Index {
        let sym = self.sym(name);
        self.add(
            TokenKind::Identifier(sym),
            NodeKind::Declaration {
                name: sym,
                type_,
                value,
            },
        )
    }

    pub fn binop(&mut self, op: Punctuation, lhs: Index, rhs: Index) -> Index {
        self.add(TokenKind::Punctuation(op), NodeKind::BinaryOperator { lhs, rhs })
    }

    pub fn ret(&mut self, value: Option<Index>) -> Index {
        self.add(TokenKind::Keyword(Keyword::Return), NodeKind::Return { value })
    }

    pub fn call(&mut self, name: &str, args: Vec<Index>) -> Index {
        let sym = self.sym(name);
        self.add(TokenKind::Identifier(sym), NodeKind::Call { callee: sym, args })
    }

    pub fn block(&mut self, stmts: Vec<Index>) -> Index {
        self.add(TokenKind::Punctuation(Punctuation::OpenBrace), NodeKind::Block { stmts })
    }

    fn params(&mut self, params: &[(&str, VType)]) -> Vec<Param> {
        params
            .iter()
            .map(|(name, ty)| Param {
                name: self.sym(name),
                type_: ty.clone(),
            })
            .collect()
    }

    pub fn func(&mut self, name: &str, params: &[(&str, VType)], ret: VType, body: Vec<Index>) -> Index {
        let body = self.block(body);
        let def = FunctionDef {
            name: self.sym(name),
            params: self.params(params),
            return_type: ret,
            variadic: false,
            body: Some(body),
        };
        self.add(TokenKind::Keyword(Keyword::Fn), NodeKind::Function(def))
    }

    /// Bodiless declaration; `variadic` appends the `...` marker parameter.
    pub fn extern_fn(&mut self, name: &str, params: &[(&str, VType)], ret: VType, variadic: bool) -> Index {
        let mut params = self.params(params);
        if variadic {
            params.push(Param {
                name: self.sym("..."),
                type_: VType::UNIT,
            });
        }
        let def = FunctionDef {
            name: self.sym(name),
            params,
            return_type: ret,
            variadic,
            body: None,
        };
        self.add(TokenKind::Keyword(Keyword::Extern), NodeKind::Function(def))
    }

    pub fn compile(&self, defs: &[Index]) -> Compilation {
        self.compile_with(defs, BuildConfig::host())
    }

    pub fn compile_with(&self, defs: &[Index], config: BuildConfig) -> Compilation {
        compile_unit("test", defs, &self.ast, &self.interner, &config).expect("unit should generate")
    }
}

pub fn i64_ty() -> VType {
    VType::Primitive(weasel_codegen::compiler::tokens::PrimitiveTypes::I64)
}

pub fn i8_ty() -> VType {
    VType::Primitive(weasel_codegen::compiler::tokens::PrimitiveTypes::I8)
}
