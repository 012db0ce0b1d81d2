//! Embedded boolean-expression evaluation for directive conditions
//!
//! Conditions reach this module as plain strings with every placeholder
//! already substituted, e.g. `"3 > 2 and 'a' != 'b'"`. The grammar covers
//! numeric and string comparisons, `and`/`or`/`not` (also spelled
//! `&&`/`||`/`!`), literal `true`/`false`, and parentheses — nothing else.
//! Everything is evaluated in-process on the already-resolved operands.

mod lexer;
mod parser;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in condition text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, PartialEq)]
pub enum ExprError {
    #[error("invalid token at offset {}", .span.start)]
    InvalidToken { span: Span },

    #[error("unexpected token at offset {}", .span.start)]
    UnexpectedToken { span: Span },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("{detail}")]
    TypeMismatch { detail: String },

    #[error("expression evaluates to a {kind}, not a boolean")]
    NotBoolean { kind: &'static str },
}

impl ExprError {
    /// Format the error with the condition text using ariadne
    pub fn format(&self, source: &str) -> String {
        let span = self.span().unwrap_or(0..source.len());
        let mut buf = Vec::new();
        Report::build(ReportKind::Error, "condition", span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new(("condition", span))
                    .with_message(self.to_string())
                    .with_color(Color::Red),
            )
            .finish()
            .write(("condition", Source::from(source)), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn span(&self) -> Option<Span> {
        match self {
            ExprError::InvalidToken { span } | ExprError::UnexpectedToken { span } => {
                Some(span.clone())
            }
            _ => None,
        }
    }
}

/// Evaluate a boolean condition expression.
pub fn eval(condition: &str) -> Result<bool, ExprError> {
    parser::evaluate(condition)
}
