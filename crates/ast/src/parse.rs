//! Parsing of the textual type expression form produced by `Display`,
//! e.g. `Vector<sys.types.Pair<String,examples.Person>>`.
//!
//! Dotted names are references (the last segment is the declaration name),
//! known primitive names are primitives, and any other bare identifier is a
//! type parameter.

use std::str::FromStr;

use crate::deserialize::AstError;
use crate::types::{is_primitive, ScopedName, TypeExpr, TypeRef};

impl FromStr for TypeExpr {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser {
            text: s,
            chars: s.char_indices().peekable(),
        };
        let expr = parser.type_expr()?;
        parser.skip_ws();
        if let Some(&(pos, c)) = parser.chars.peek() {
            return Err(parser.error(format!("unexpected '{}' at offset {}", c, pos)));
        }
        Ok(expr)
    }
}

struct Parser<'a> {
    text: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> AstError {
        AstError::TypeExprSyntax {
            text: self.text.to_string(),
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn name(&mut self) -> Result<String, AstError> {
        self.skip_ws();
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }
        if name.starts_with('.') || name.ends_with('.') {
            return Err(self.error(format!("malformed name '{}'", name)));
        }
        Ok(name)
    }

    fn type_expr(&mut self) -> Result<TypeExpr, AstError> {
        let name = self.name()?;
        let type_ref = match name.rsplit_once('.') {
            Some((module, decl)) => TypeRef::Reference(ScopedName::new(module, decl)),
            None if is_primitive(&name) => TypeRef::Primitive(name.clone()),
            None => TypeRef::TypeParam(name.clone()),
        };
        let mut parameters = Vec::new();
        if self.eat('<') {
            loop {
                parameters.push(self.type_expr()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }
        Ok(TypeExpr {
            type_ref,
            parameters,
        })
    }
}
