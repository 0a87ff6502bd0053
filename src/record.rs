//! The record model shared by the decoder and the encoder.
//!
//! A [`Record`] is one unit of (comment, key, value). The key is a sequence of
//! segments; its leading segments are the section path that was active when
//! the record was read, the rest are the record's own key parts. Every field
//! is plain text: the format assigns no types to values.
//!
//! ```rust
//! use keyval::{from_str, Record};
//!
//! let records = from_str("# owner\n[server.tls]\ncert = /etc/cert.pem\n").unwrap();
//! assert_eq!(
//!     records,
//!     vec![Record::new(["server", "tls", "cert"], "/etc/cert.pem").with_comment("owner")]
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded or to-be-encoded unit of the format.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub key: Vec<String>,
    pub value: String,
    pub comment: String,
}

impl Record {
    /// Creates a record from key segments and a value, without a comment.
    pub fn new<I, S>(key: I, value: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Record {
            key: key.into_iter().map(Into::into).collect(),
            value: value.into(),
            comment: String::new(),
        }
    }

    /// Creates a record that carries only a comment.
    pub fn comment_only(comment: impl Into<String>) -> Self {
        Record {
            comment: comment.into(),
            ..Default::default()
        }
    }

    /// Creates a record that carries only a value.
    pub fn value_only(value: impl Into<String>) -> Self {
        Record {
            value: value.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// True when the record has no comment, no key and no value.
    ///
    /// The decoder never produces such a record and the encoder writes nothing
    /// for it.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_empty() && self.comment.is_empty()
    }

    /// Splits the key into the section path and the local key the way a
    /// writer lays them out.
    ///
    /// The section is the longest prefix that still leaves a local key, so
    /// normally the local key is the last segment. A section of one empty
    /// segment cannot be declared and a local key of one empty segment cannot
    /// be written, so the split moves forward past either of them:
    ///
    /// ```rust
    /// use keyval::Record;
    ///
    /// let record = Record::new(["a", "b", "c"], "v");
    /// let (section, local) = record.split_key().unwrap();
    /// assert_eq!((section.len(), local.len()), (2, 1));
    ///
    /// let record = Record::new(["a", ""], "v");
    /// let (section, local) = record.split_key().unwrap();
    /// assert_eq!((section.len(), local.len()), (0, 2));
    /// ```
    ///
    /// Returns `None` for the key `[""]`, which has no written form. An empty
    /// key splits into two empty parts.
    pub fn split_key(&self) -> Option<(&[String], &[String])> {
        let key = self.key.as_slice();
        (0..key.len().max(1))
            .rev()
            .map(|at| key.split_at(at))
            .find(|(section, local)| !is_lone_empty(section) && !is_lone_empty(local))
    }

    /// Joins the key segments with `separator`, without escaping.
    ///
    /// ```rust
    /// use keyval::Record;
    ///
    /// let record = Record::new(["a", "b"], "v");
    /// assert_eq!(record.joined_key('.'), "a.b");
    /// ```
    pub fn joined_key(&self, separator: char) -> String {
        let mut buf = [0; 4];
        self.key.join(&*separator.encode_utf8(&mut buf))
    }
}

fn is_lone_empty(segments: &[String]) -> bool {
    matches!(segments, [only] if only.is_empty())
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.comment.is_empty() {
            writeln!(f, "# {}", self.comment)?;
        }

        write!(f, "{} = {}", self.joined_key('.'), self.value)
    }
}
