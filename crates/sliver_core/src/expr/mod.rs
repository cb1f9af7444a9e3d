mod parse;

use crate::error::{Error, Result};
use crate::hash::{Id, hash_bytes};
use crate::system::System;
use std::fmt::{self, Display, Write as _};

/// Extension of stored term files.
pub const EXPR_EXT: &str = ".expr";

/// A build expression: the three shapes the engine rewrites between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    /// Indirection: the logical value is the expression stored under the id.
    Include(Id),
    /// A build recipe.
    Derive(Derive),
    /// The normal form.
    Slice(Slice),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Derive {
    /// Declared output paths and the content id each must have after build.
    pub outputs: Vec<(String, Id)>,
    /// Expressions whose normal forms must be installed before the build.
    pub inputs: Vec<Id>,
    /// Absolute path of the program to run.
    pub builder: String,
    pub platform: System,
    /// Builder environment, applied left to right; later wins on a
    /// duplicate name.
    pub bindings: Vec<(String, String)>,
}

/// Normal form of an expression: an installable closure description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slice {
    pub roots: Vec<Id>,
    pub elems: Vec<SliceElem>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceElem {
    pub path: String,
    pub id: Id,
    /// Content ids of other elements of the same slice this one references.
    pub refs: Vec<Id>,
}

impl Expression {
    pub fn include(id: Id) -> Self {
        Expression::Include(id)
    }

    /// Content hash of the canonical printed form. Structurally equal
    /// expressions get equal ids, whatever their in-memory provenance.
    pub fn id(&self) -> Id {
        hash_bytes(self.to_string().as_bytes())
    }

    /// Parse the canonical printed form back into an expression.
    pub fn parse(text: &str) -> Result<Expression> {
        parse::expression(text)
    }

    pub fn into_slice(self) -> Result<Slice> {
        match self {
            Expression::Slice(slice) => Ok(slice),
            other => Err(Error::bad_term("not a slice", other.to_string())),
        }
    }
}

fn quote(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

// Ids print as bare hex, so they never need escaping.
fn quote_id(id: &Id, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "\"{id}\"")
}

fn comma(i: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if i > 0 { f.write_char(',') } else { Ok(()) }
}

/// Canonical serialisation: no whitespace, fields in declaration order.
/// [`Expression::id`] hashes exactly this text.
impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Include(id) => {
                f.write_str("Include(")?;
                quote_id(id, f)?;
                f.write_char(')')
            }
            Expression::Derive(d) => {
                f.write_str("Derive([")?;
                for (i, (path, id)) in d.outputs.iter().enumerate() {
                    comma(i, f)?;
                    f.write_char('(')?;
                    quote(path, f)?;
                    f.write_char(',')?;
                    quote_id(id, f)?;
                    f.write_char(')')?;
                }
                f.write_str("],[")?;
                for (i, id) in d.inputs.iter().enumerate() {
                    comma(i, f)?;
                    quote_id(id, f)?;
                }
                f.write_str("],")?;
                quote(&d.builder, f)?;
                f.write_char(',')?;
                quote(d.platform.as_str(), f)?;
                f.write_str(",[")?;
                for (i, (name, value)) in d.bindings.iter().enumerate() {
                    comma(i, f)?;
                    f.write_char('(')?;
                    quote(name, f)?;
                    f.write_char(',')?;
                    quote(value, f)?;
                    f.write_char(')')?;
                }
                f.write_str("])")
            }
            Expression::Slice(s) => {
                f.write_str("Slice([")?;
                for (i, id) in s.roots.iter().enumerate() {
                    comma(i, f)?;
                    quote_id(id, f)?;
                }
                f.write_str("],[")?;
                for (i, elem) in s.elems.iter().enumerate() {
                    comma(i, f)?;
                    f.write_char('(')?;
                    quote(&elem.path, f)?;
                    f.write_char(',')?;
                    quote_id(&elem.id, f)?;
                    f.write_str(",[")?;
                    for (j, r) in elem.refs.iter().enumerate() {
                        comma(j, f)?;
                        quote_id(r, f)?;
                    }
                    f.write_str("])")?;
                }
                f.write_str("])")
            }
        }
    }
}
