//! Reader for the canonical term grammar.
//!
//! Parsing is tolerant of whitespace between tokens; the printer never
//! emits any, so `print . parse . print` is the identity on canonical
//! text.

use super::{Derive, Expression, Slice, SliceElem};
use crate::error::{Error, Result};
use crate::hash::Id;
use crate::system::System;

pub(super) fn expression(text: &str) -> Result<Expression> {
    let mut p = Parser { text, pos: 0 };
    let expr = p.expression()?;
    p.skip_ws();
    if !p.at_end() {
        return Err(p.error("trailing characters after expression"));
    }
    Ok(expr)
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> Error {
        Error::bad_term(reason, self.text)
    }

    fn at_end(&self) -> bool {
        self.pos == self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        self.skip_ws();
        if self.bump() == Some(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{c}'")))
        }
    }

    fn head(&mut self) -> Result<&str> {
        self.skip_ws();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected a constructor"));
        }
        Ok(&self.text[start..self.pos])
    }

    fn string(&mut self) -> Result<String> {
        self.skip_ws();
        if self.bump() != Some('"') {
            return Err(self.error("expected a string"));
        }
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    _ => return Err(self.error("unknown escape in string")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn id(&mut self) -> Result<Id> {
        let s = self.string()?;
        Id::try_from(s.as_str()).map_err(|_| self.error("not an id"))
    }

    fn list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(items);
        }
        loop {
            items.push(item(self)?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(items),
                _ => return Err(self.error("expected `,' or `]' in list")),
            }
        }
    }

    fn output(&mut self) -> Result<(String, Id)> {
        self.expect('(')?;
        let path = self.string()?;
        self.expect(',')?;
        let id = self.id()?;
        self.expect(')')?;
        Ok((path, id))
    }

    fn binding(&mut self) -> Result<(String, String)> {
        self.expect('(')?;
        let name = self.string()?;
        self.expect(',')?;
        let value = self.string()?;
        self.expect(')')?;
        Ok((name, value))
    }

    fn elem(&mut self) -> Result<SliceElem> {
        self.expect('(')?;
        let path = self.string()?;
        self.expect(',')?;
        let id = self.id()?;
        self.expect(',')?;
        let refs = self.list(Self::id)?;
        self.expect(')')?;
        Ok(SliceElem { path, id, refs })
    }

    fn expression(&mut self) -> Result<Expression> {
        let head = self.head()?.to_string();
        self.expect('(')?;
        let expr = match head.as_str() {
            "Include" => Expression::Include(self.id()?),
            "Derive" => {
                let outputs = self.list(Self::output)?;
                self.expect(',')?;
                let inputs = self.list(Self::id)?;
                self.expect(',')?;
                let builder = self.string()?;
                self.expect(',')?;
                let platform = System::from(self.string()?);
                self.expect(',')?;
                let bindings = self.list(Self::binding)?;
                Expression::Derive(Derive {
                    outputs,
                    inputs,
                    builder,
                    platform,
                    bindings,
                })
            }
            "Slice" => {
                let roots = self.list(Self::id)?;
                self.expect(',')?;
                let elems = self.list(Self::elem)?;
                Expression::Slice(Slice { roots, elems })
            }
            _ => return Err(self.error("bad expression head")),
        };
        self.expect(')')?;
        Ok(expr)
    }
}
