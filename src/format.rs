//! The keyval format.
//!
//! This module documents the text format read by [`Reader`](crate::Reader)
//! and written by [`Writer`](crate::Writer). It contains no code.
//!
//! # Overview
//!
//! A keyval document is a UTF-8 stream of entries. An entry has a key, a
//! value and a comment, any of which may be empty. Keys are hierarchical:
//! a section declaration sets a prefix for every following key.
//!
//! ```text
//! # connection settings
//! [server.tls]
//! cert = /etc/ssl/cert.pem
//! key  = /etc/ssl/key.pem
//!
//! []
//! debug = true
//! ```
//!
//! yields `server.tls.cert`, `server.tls.key` (both commented
//! `connection settings`) and `debug`.
//!
//! The format assigns no types. Every value is text.
//!
//! # Characters
//!
//! | Role | Default | Notes |
//! |------|---------|-------|
//! | Escape | `\` | Makes the next byte literal |
//! | Separator | `.` | `/` with [`Separator::Slash`](crate::Separator::Slash) |
//! | Value | `=` | `:` can be enabled as an alternate |
//! | Section | `[` `]` | |
//! | Comment | `#` | `;` can be enabled as an alternate |
//! | Newline | `\n` | |
//! | Whitespace | space, tab | Nothing else is whitespace; `\r` is content |
//!
//! # Comments
//!
//! - A comment runs from a comment marker to the end of the line. It does not
//!   need to start a line.
//! - Leading markers and whitespace are skipped: `## note` and `# # note` are
//!   both `note`. Trailing whitespace is trimmed.
//! - Consecutive comment lines form one comment, joined by newlines. A marker
//!   line with nothing on it between two non-empty lines is kept as an empty
//!   line. Blank lines without a marker are skipped.
//! - A comment applies to every following entry until the next comment block.
//! - An empty block (`##` alone, or `#` right before a newline) discards the
//!   comment for the entries that follow.
//! - A comment closed only by the end of the stream becomes an entry of its own.
//! - Inside a comment only the escape marker, newline and whitespace need
//!   escaping. Every other structural character is literal.
//!
//! ```text
//! # first line
//! #
//! # third line
//! ```
//!
//! # Sections
//!
//! - A declaration runs from `[` to `]` and may span lines. It is trimmed
//!   like a comment; each segment is trimmed around the separators.
//! - `[]` clears the section.
//! - A declaration that no entry uses becomes an entry of its own, with the
//!   section as its key.
//! - A declaration left open at the end of the stream makes the end
//!   incomplete.
//! - There are no comments inside a declaration. Escapable: the escape
//!   marker, `]`, the separator, newline and whitespace.
//!
//! # Keys
//!
//! - Anything that is not a comment, a section or a value is a key. A key
//!   ends at a newline, a value marker, `[` or a comment marker.
//! - Keys are split at the separator and each segment is trimmed. A
//!   separator with nothing beside it yields an empty segment: `a.` is
//!   `["a", ""]` and `.` alone is `["", ""]`.
//! - Escapable: the escape marker, the separator, the value marker, `[`, the
//!   comment marker, newline and whitespace.
//!
//! # Values
//!
//! - A value starts after a value marker and ends at a newline, the end of
//!   the stream, another value marker, `[` or a comment marker.
//! - It is trimmed at both ends. An escaped newline continues it on the next
//!   line.
//! - Escapable: as for keys, without the separator.
//!
//! ```text
//! motd = first line\
//!        second line
//! ```
//!
//! # Boundary escaping
//!
//! Unescaped whitespace at the edges of a field is trimmed. To keep it, the
//! writer escapes the first and the last byte of a field when they are
//! whitespace:
//!
//! ```text
//! \  padded key\  = \ padded value\
//! ```
//!
//! # End of stream
//!
//! A stream that ends inside a section declaration or right after an escape
//! marker ends *incomplete*. Readers report this apart from a clean end so
//! that truncated transfers can be detected.
//!
//! # Limitations
//!
//! Records written by [`Writer`](crate::Writer) read back identically, with
//! these exceptions:
//!
//! - Two comment blocks with nothing but blank lines between them read as one
//!   comment, so a comment-only record followed by another commented record
//!   merges into it.
//! - Empty lines at the end of a multi-line comment are lost.
//! - A comment-only record written while a section is active reads back with
//!   the section path as its key.
//! - A comment-only record whose comment equals the previous record's comment
//!   writes nothing.
//! - A record with an empty comment written right after a comment-only record
//!   inherits that comment: its `##` line continues the open comment block
//!   instead of discarding it.
//! - An empty record writes nothing.
//! - A key of exactly one empty segment has no written form. Without a value
//!   it is written as a bare line, which reads back as nothing; with a value
//!   the writer rejects it.

// This module contains only documentation; no implementation code
