use colored::Colorize;

use crate::compiler::{Interner, codegen::error::GenError, tokens::Token};

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub token: Token,
    pub message: String,
}

impl Diagnostic {
    pub fn error(token: Token, message: impl Into<String>) -> Self {
        Self {
            token,
            message: message.into(),
        }
    }

    /// Uncolored single-line form: message, offending token, kind and location.
    pub fn render(&self, interner: &Interner) -> String {
        format!(
            "error: {} but found `{}` kind of {} at ({}:{})",
            self.message,
            self.token.text(interner),
            self.token.kind.ordinal(),
            self.token.row(),
            self.token.col(),
        )
    }
}

/// Append-only record of everything that went wrong during one pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error and hands back the failure value, so call sites can
    /// write `return Err(info.diagnostics.add_error(..))`.
    pub fn add_error(&mut self, token: Token, message: impl Into<String>) -> GenError {
        let diagnostic = Diagnostic::error(token, message);
        tracing::debug!(message = %diagnostic.message, row = token.row(), col = token.col(), "diagnostic recorded");
        self.records.push(diagnostic);
        GenError::Reported
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.records.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn render(&self, interner: &Interner) -> Vec<String> {
        self.records.iter().map(|d| d.render(interner)).collect()
    }

    /// Prints every record in encounter order. Called once by the driver after the pass.
    pub fn show_errors(&self, interner: &Interner) {
        if self.records.is_empty() {
            eprintln!("{}", "No errors found".green());
            return;
        }

        for d in &self.records {
            let span = d.token.span.to_display(interner);
            eprintln!(
                "{}: {} but found `{}` kind of {}",
                "error".red(),
                d.message.bright_white().bold(),
                d.token.text(interner),
                d.token.kind.ordinal()
            );
            eprintln!("  {} {}", "-->".blue(), span);
        }
    }
}
