//! Recursive-descent evaluation of condition expressions
//!
//! The grammar is small enough to evaluate while parsing:
//!
//! ```text
//! expr       := and_expr (("or" | "||") and_expr)*
//! and_expr   := unary (("and" | "&&") unary)*
//! unary      := ("not" | "!") unary | comparison
//! comparison := operand (("==" | "!=" | "<" | "<=" | ">" | ">=") operand)?
//! operand    := number | string | "true" | "false" | "(" expr ")"
//! ```

use logos::Logos;

use super::lexer::Token;
use super::{ExprError, Span};

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Operand {
    fn kind(&self) -> &'static str {
        match self {
            Operand::Number(_) => "number",
            Operand::Text(_) => "string",
            Operand::Bool(_) => "boolean",
        }
    }
}

pub fn evaluate(source: &str) -> Result<bool, ExprError> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(source).spanned() {
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(ExprError::InvalidToken { span }),
        }
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.or_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(ExprError::UnexpectedToken {
            span: parser.tokens[parser.pos].1.clone(),
        });
    }
    match value {
        Operand::Bool(flag) => Ok(flag),
        other => Err(ExprError::NotBoolean { kind: other.kind() }),
    }
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn bump(&mut self) -> Option<(Token, Span)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self) -> Result<Operand, ExprError> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            left = Operand::Bool(bool_of(left)? || bool_of(right)?);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Operand, ExprError> {
        let mut left = self.unary()?;
        while self.eat(&Token::And) {
            let right = self.unary()?;
            left = Operand::Bool(bool_of(left)? && bool_of(right)?);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Operand, ExprError> {
        if self.eat(&Token::Not) {
            let value = self.unary()?;
            return Ok(Operand::Bool(!bool_of(value)?));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Operand, ExprError> {
        let left = self.operand()?;
        let op = match self.peek() {
            Some(token) if is_comparison(token) => token.clone(),
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.operand()?;
        compare(&op, &left, &right)
    }

    fn operand(&mut self) -> Result<Operand, ExprError> {
        match self.bump() {
            Some((Token::Number(value), _)) => Ok(Operand::Number(value)),
            Some((Token::Str(value), _)) => Ok(Operand::Text(value)),
            Some((Token::True, _)) => Ok(Operand::Bool(true)),
            Some((Token::False, _)) => Ok(Operand::Bool(false)),
            Some((Token::LParen, _)) => {
                let value = self.or_expr()?;
                match self.bump() {
                    Some((Token::RParen, _)) => Ok(value),
                    Some((_, span)) => Err(ExprError::UnexpectedToken { span }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some((_, span)) => Err(ExprError::UnexpectedToken { span }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

fn is_comparison(token: &Token) -> bool {
    matches!(
        token,
        Token::Eq | Token::Ne | Token::Lt | Token::Le | Token::Gt | Token::Ge
    )
}

fn bool_of(value: Operand) -> Result<bool, ExprError> {
    match value {
        Operand::Bool(flag) => Ok(flag),
        other => Err(ExprError::TypeMismatch {
            detail: format!("expected a boolean, found a {}", other.kind()),
        }),
    }
}

fn compare(op: &Token, left: &Operand, right: &Operand) -> Result<Operand, ExprError> {
    let result = match op {
        Token::Eq => equals(left, right),
        Token::Ne => !equals(left, right),
        _ => {
            let ordering = match (left, right) {
                (Operand::Number(a), Operand::Number(b)) => {
                    a.partial_cmp(b).ok_or_else(|| ExprError::TypeMismatch {
                        detail: "cannot order non-finite numbers".to_string(),
                    })?
                }
                (Operand::Text(a), Operand::Text(b)) => a.cmp(b),
                _ => {
                    return Err(ExprError::TypeMismatch {
                        detail: format!("cannot order {} and {}", left.kind(), right.kind()),
                    })
                }
            };
            match op {
                Token::Lt => ordering.is_lt(),
                Token::Le => ordering.is_le(),
                Token::Gt => ordering.is_gt(),
                Token::Ge => ordering.is_ge(),
                _ => unreachable!(),
            }
        }
    };
    Ok(Operand::Bool(result))
}

fn equals(left: &Operand, right: &Operand) -> bool {
    match (left, right) {
        (Operand::Number(a), Operand::Number(b)) => a == b,
        (Operand::Text(a), Operand::Text(b)) => a == b,
        (Operand::Bool(a), Operand::Bool(b)) => a == b,
        _ => false,
    }
}
