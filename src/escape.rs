//! Escaping of fields before they are written.
//!
//! Every field kind has two escape sets. The interior set applies to every
//! byte of the field; the boundary set applies only to the first and the last
//! byte. The decoder trims unescaped whitespace at field boundaries, so the
//! boundary set is what lets leading and trailing whitespace survive a round
//! trip.
//!
//! ```rust
//! use keyval::escape::{escape, Escapes};
//! use keyval::Syntax;
//!
//! let escapes = Escapes::new(&Syntax::default());
//! assert_eq!(escape(b" a=b ", &escapes.value, b'\\'), b"\\ a\\=b\\ ".to_vec());
//! ```

use crate::Syntax;

/// The bytes to escape in one kind of field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscapeSet {
    pub interior: Vec<u8>,
    pub boundary: Vec<u8>,
}

impl EscapeSet {
    fn needs_escape(&self, c: u8, at_boundary: bool) -> bool {
        self.interior.contains(&c) || (at_boundary && self.boundary.contains(&c))
    }
}

/// Escape sets for every field kind of a [`Syntax`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Escapes {
    /// One line of a comment.
    pub comment: EscapeSet,
    /// One segment of a section declaration.
    pub section: EscapeSet,
    /// One segment of a key.
    pub key: EscapeSet,
    pub value: EscapeSet,
}

impl Escapes {
    pub fn new(syntax: &Syntax) -> Self {
        let comments = syntax.comment_markers();
        let values = syntax.value_markers();
        let blank = vec![syntax.space, syntax.tab];

        let mut comment_boundary = blank.clone();
        comment_boundary.extend(&comments);

        let mut key = vec![syntax.escape, syntax.separator, syntax.open_section, syntax.newline];
        key.extend(&values);
        key.extend(&comments);

        let mut value = vec![syntax.escape, syntax.open_section, syntax.newline];
        value.extend(&values);
        value.extend(&comments);

        Escapes {
            comment: EscapeSet {
                interior: vec![syntax.escape],
                boundary: comment_boundary,
            },
            section: EscapeSet {
                interior: vec![syntax.escape, syntax.close_section, syntax.separator],
                boundary: vec![syntax.space, syntax.tab, syntax.newline],
            },
            key: EscapeSet {
                interior: key,
                boundary: blank.clone(),
            },
            value: EscapeSet {
                interior: value,
                boundary: blank,
            },
        }
    }
}

/// Appends `field` to `out`, escaped according to `set`.
pub fn escape_into(out: &mut Vec<u8>, field: &[u8], set: &EscapeSet, escape: u8) {
    let last = field.len().saturating_sub(1);
    for (i, &c) in field.iter().enumerate() {
        if set.needs_escape(c, i == 0 || i == last) {
            out.push(escape);
        }

        out.push(c);
    }
}

/// Returns `field` escaped according to `set`.
#[must_use]
pub fn escape(field: &[u8], set: &EscapeSet, escape: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(field.len() + 2);
    escape_into(&mut out, field, set, escape);
    out
}
