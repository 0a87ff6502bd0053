//! Structural characters and byte classification.
//!
//! Both the decoder and the encoder consult the same [`Syntax`], so the set of
//! bytes that terminate a token while reading is exactly the set of bytes that
//! get escaped while writing.
//!
//! All structural characters are single ASCII bytes. ASCII never collides with
//! a UTF-8 continuation byte, which is what makes byte-wise scanning safe for
//! arbitrary Unicode content.
//!
//! ## Examples
//!
//! ```rust
//! use keyval::{Class, Separator, Syntax};
//!
//! let syntax = Syntax::new().with_separator(Separator::Slash);
//! assert_eq!(syntax.classify(b'/'), Class::Separator);
//! assert_eq!(syntax.classify(b'.'), Class::Other);
//! ```

use crate::{Error, Result};

/// Separator between the segments of a key or a section path.
///
/// # Examples
///
/// ```rust
/// use keyval::Separator;
///
/// assert_eq!(Separator::Dot.as_byte(), b'.');
/// assert_eq!(Separator::Slash.as_byte(), b'/');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Separator {
    #[default]
    Dot,
    Slash,
}

impl Separator {
    /// Returns the byte this separator is written as.
    #[must_use]
    pub const fn as_byte(&self) -> u8 {
        match self {
            Separator::Dot => b'.',
            Separator::Slash => b'/',
        }
    }
}

/// The role a byte plays in the format.
///
/// Whether a role is actually structural depends on the context: a
/// [`Class::CloseSection`] only matters inside a section declaration, a
/// [`Class::Comment`] means nothing there, and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Class {
    /// The escape marker. [`Decoder`](crate::Decoder) consumes it before
    /// classification reaches the state machine and passes the byte after it
    /// as escaped content, so [`transition`](crate::state::transition) never
    /// sees this class.
    Escape,
    Separator,
    Value,
    OpenSection,
    CloseSection,
    Comment,
    Newline,
    Whitespace,
    Other,
}

/// The structural characters of one deployment of the format.
///
/// Defaults: escape `\`, separator `.`, value `=`, sections `[` `]`, comment
/// `#`, newline `\n`, whitespace space and tab. The alternate comment (`;`)
/// and alternate value (`:`) markers are off unless configured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Syntax {
    pub escape: u8,
    pub separator: u8,
    pub value: u8,
    pub alt_value: Option<u8>,
    pub open_section: u8,
    pub close_section: u8,
    pub comment: u8,
    pub alt_comment: Option<u8>,
    pub newline: u8,
    pub space: u8,
    pub tab: u8,
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax {
            escape: b'\\',
            separator: Separator::default().as_byte(),
            value: b'=',
            alt_value: None,
            open_section: b'[',
            close_section: b']',
            comment: b'#',
            alt_comment: None,
            newline: b'\n',
            space: b' ',
            tab: b'\t',
        }
    }
}

impl Syntax {
    /// Creates the default syntax.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the segment separator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyval::{Separator, Syntax};
    ///
    /// let syntax = Syntax::new().with_separator(Separator::Slash);
    /// assert_eq!(syntax.separator, b'/');
    /// ```
    #[must_use]
    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator.as_byte();
        self
    }

    /// Accepts a second comment marker, conventionally `;`.
    #[must_use]
    pub fn with_alt_comment(mut self, marker: u8) -> Self {
        self.alt_comment = Some(marker);
        self
    }

    /// Accepts a second value marker, conventionally `:`.
    #[must_use]
    pub fn with_alt_value(mut self, marker: u8) -> Self {
        self.alt_value = Some(marker);
        self
    }

    /// Maps a byte to its role.
    #[inline]
    #[must_use]
    pub fn classify(&self, c: u8) -> Class {
        if c == self.escape {
            Class::Escape
        } else if c == self.newline {
            Class::Newline
        } else if self.is_whitespace(c) {
            Class::Whitespace
        } else if self.is_comment(c) {
            Class::Comment
        } else if c == self.open_section {
            Class::OpenSection
        } else if c == self.close_section {
            Class::CloseSection
        } else if self.is_value(c) {
            Class::Value
        } else if c == self.separator {
            Class::Separator
        } else {
            Class::Other
        }
    }

    #[inline]
    pub fn is_comment(&self, c: u8) -> bool {
        c == self.comment || self.alt_comment == Some(c)
    }

    #[inline]
    pub fn is_value(&self, c: u8) -> bool {
        c == self.value || self.alt_value == Some(c)
    }

    #[inline]
    pub fn is_whitespace(&self, c: u8) -> bool {
        c == self.space || c == self.tab
    }

    /// The comment markers in use, primary first.
    pub(crate) fn comment_markers(&self) -> Vec<u8> {
        std::iter::once(self.comment).chain(self.alt_comment).collect()
    }

    /// The value markers in use, primary first.
    pub(crate) fn value_markers(&self) -> Vec<u8> {
        std::iter::once(self.value).chain(self.alt_value).collect()
    }

    /// Checks that every structural character is ASCII and that no two roles
    /// share a byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSyntax`] naming the offending character.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyval::Syntax;
    ///
    /// assert!(Syntax::new().validate().is_ok());
    /// assert!(Syntax::new().with_alt_comment(b'=').validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let mut named = vec![
            ("escape", self.escape),
            ("separator", self.separator),
            ("value", self.value),
            ("open section", self.open_section),
            ("close section", self.close_section),
            ("comment", self.comment),
            ("newline", self.newline),
            ("space", self.space),
            ("tab", self.tab),
        ];
        if let Some(c) = self.alt_value {
            named.push(("alternate value", c));
        }
        if let Some(c) = self.alt_comment {
            named.push(("alternate comment", c));
        }

        for (i, (name, c)) in named.iter().enumerate() {
            if !c.is_ascii() {
                return Err(Error::invalid_syntax(format!(
                    "{name} character 0x{c:02x} is not ASCII"
                )));
            }

            if let Some((other, _)) = named[..i].iter().find(|(_, o)| o == c) {
                return Err(Error::invalid_syntax(format!(
                    "{name} and {other} share the character {:?}",
                    *c as char
                )));
            }
        }

        Ok(())
    }
}
