use std::fmt;

use string_interner::symbol::SymbolUsize;

use crate::compiler::Interner;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Keyword {
    Fn,
    Return,
    Nil,
    Extern,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Punctuation {
    OpenBrace,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Amp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveTypes {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Unit,
}

impl PrimitiveTypes {
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn is_int(&self) -> bool {
        !matches!(self, Self::Unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    IntLiteral(i64),
    StringLiteral(SymbolUsize),
    Keyword(Keyword),
    TypeLiteral(PrimitiveTypes),
    Punctuation(Punctuation),
    Identifier(SymbolUsize),
    Eof,
}

impl TokenKind {
    /// Stable small integer for the kind, shown next to diagnostics.
    pub fn ordinal(&self) -> usize {
        match self {
            TokenKind::IntLiteral(_) => 0,
            TokenKind::StringLiteral(_) => 1,
            TokenKind::Keyword(_) => 2,
            TokenKind::TypeLiteral(_) => 3,
            TokenKind::Punctuation(_) => 4,
            TokenKind::Identifier(_) => 5,
            TokenKind::Eof => 6,
        }
    }
}

/// A span of text in a file. Start and end are inclusive (line, column) pairs.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct Span {
    pub file: SymbolUsize,
    pub start: (usize, usize),
    pub end: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Copy)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn row(&self) -> usize {
        self.span.start.0
    }

    pub fn col(&self) -> usize {
        self.span.start.1
    }

    /// Source-like text of the token, resolving interned names.
    pub fn text(&self, interner: &Interner) -> String {
        match self.kind {
            TokenKind::IntLiteral(v) => v.to_string(),
            TokenKind::StringLiteral(sym) => format!("\"{}\"", interner.resolve(sym).unwrap_or("<unknown>")),
            TokenKind::Identifier(sym) => interner.resolve(sym).unwrap_or("<unknown>").to_string(),
            TokenKind::Keyword(kw) => kw.to_string(),
            TokenKind::TypeLiteral(ty) => ty.to_string(),
            TokenKind::Punctuation(p) => p.to_string(),
            TokenKind::Eof => "<eof>".to_string(),
        }
    }
}

impl Span {
    pub fn new(file: SymbolUsize, start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            file,
            start: (start_line, start_col),
            end: (end_line, end_col),
        }
    }

    pub fn to_display(&self, interner: &Interner) -> DisplaySpan {
        DisplaySpan {
            file: interner.resolve(self.file).unwrap_or("<unknown>").to_string(),
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplaySpan {
    pub file: String,
    pub start: (usize, usize),
    pub end: (usize, usize),
}

impl fmt::Display for DisplaySpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.start.0, self.start.1)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Keyword::Fn => "fn",
            Keyword::Return => "return",
            Keyword::Nil => "nil",
            Keyword::Extern => "extern",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Punctuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Punctuation::*;
        let s = match self {
            OpenBrace => "{",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Eq => "=",
            Amp => "&",
        };
        f.write_str(s)
    }
}

impl fmt::Display for PrimitiveTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use PrimitiveTypes::*;
        let s = match self {
            U8 => "u8",
            U16 => "u16",
            U32 => "u32",
            U64 => "u64",
            I8 => "i8",
            I16 => "i16",
            I32 => "i32",
            I64 => "i64",
            Unit => "unit",
        };
        f.write_str(s)
    }
}
