//! The decoder's state machine.
//!
//! Parsing is a pure function of the current [`State`], the class of the
//! next byte and whether that byte was escaped. The only side effects go to
//! the [`Accumulator`] passed in by reference, which owns every fragment
//! collected so far and the queue of finished records. Nothing here is
//! global, so any number of decoders can run side by side.
//!
//! The `*Boundary` states hold whitespace back: it is only appended to the
//! field when more content follows, which is how fields get trimmed at the
//! end without lookahead.

use crate::{Class, Record, Result};
use std::collections::VecDeque;
use std::mem;

/// Position of the decoder within the grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum State {
    /// Between entries.
    #[default]
    Idle,
    /// After a comment marker, skipping markers and whitespace.
    CommentLead,
    CommentBody,
    /// Whitespace inside a comment line, held back.
    CommentBoundary,
    /// After a comment line; another comment marker continues the block.
    CommentContinuation,
    /// After `[` or a separator inside a section declaration.
    SectionLead,
    SectionBody,
    SectionBoundary,
    KeyBody,
    KeyBoundary,
    /// After a value marker, skipping whitespace.
    ValueLead,
    ValueBody,
    ValueBoundary,
}

impl State {
    /// True while a section declaration is open.
    pub fn in_section(self) -> bool {
        matches!(
            self,
            State::SectionLead | State::SectionBody | State::SectionBoundary
        )
    }

    fn in_key(self) -> bool {
        matches!(self, State::KeyBody | State::KeyBoundary)
    }
}

/// A finished entry, still in raw bytes.
#[derive(Debug, Default)]
struct Pending {
    comment: Vec<u8>,
    section: Vec<Vec<u8>>,
    key: Vec<Vec<u8>>,
    value: Vec<u8>,
}

impl Pending {
    /// Merges the section path and the local key into the record's key.
    fn into_record(self) -> Result<Record> {
        let key = self
            .section
            .into_iter()
            .chain(self.key)
            .map(String::from_utf8)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Record {
            key,
            value: String::from_utf8(self.value)?,
            comment: String::from_utf8(self.comment)?,
        })
    }
}

/// Fragments collected by the state machine.
#[derive(Debug, Default)]
pub struct Accumulator {
    comment: Vec<u8>,
    section: Vec<Vec<u8>>,
    current_section: Vec<u8>,
    key: Vec<Vec<u8>>,
    current_key: Vec<u8>,
    value: Vec<u8>,
    whitespace: Vec<u8>,
    comment_applied: bool,
    section_applied: bool,
    ready: VecDeque<Pending>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of finished records waiting to be taken.
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Takes the oldest finished record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUtf8`](crate::Error::InvalidUtf8) when a field of
    /// the record is not valid UTF-8. The record is consumed either way.
    pub fn pop_record(&mut self) -> Option<Result<Record>> {
        self.ready.pop_front().map(Pending::into_record)
    }

    /// Closes whatever the stream was in the middle of when it ended.
    ///
    /// A key still being read is completed, and if any content was collected
    /// but not yet emitted, it becomes the final record.
    pub fn finish(&mut self, state: State) {
        if state.in_key() {
            self.complete_key();
        }

        if self.has_incomplete_entry() {
            self.complete_entry();
        }
    }

    fn has_incomplete_entry(&self) -> bool {
        !self.current_key.is_empty()
            || !self.key.is_empty()
            || !self.value.is_empty()
            || (!self.comment_applied && !self.comment.is_empty())
            || (!self.section_applied && !self.section.is_empty())
    }

    fn append_whitespace(&mut self, c: u8) {
        self.whitespace.push(c);
    }

    fn clear_whitespace(&mut self) {
        self.whitespace.clear();
    }

    fn clear_comment(&mut self) {
        self.comment.clear();
    }

    fn comment_whitespace(&mut self) {
        self.comment.extend_from_slice(&self.whitespace);
    }

    fn append_comment(&mut self, c: u8) {
        self.comment.push(c);
        self.comment_applied = false;
    }

    /// Drops the active section, emitting it first if no record used it.
    fn clear_section(&mut self) {
        if !self.section_applied && !self.section.is_empty() {
            self.complete_entry();
        }

        self.section.clear();
    }

    fn append_section(&mut self, c: u8) {
        self.current_section.push(c);
    }

    fn section_whitespace(&mut self) {
        self.current_section.extend_from_slice(&self.whitespace);
    }

    fn complete_section_segment(&mut self) {
        self.section.push(mem::take(&mut self.current_section));
    }

    /// Handles the closing bracket. A declaration without any content or
    /// separator leaves the section empty.
    fn close_section(&mut self) {
        if !self.section.is_empty() || !self.current_section.is_empty() {
            self.complete_section_segment();
        }

        self.section_applied = false;
    }

    fn append_key(&mut self, c: u8) {
        self.current_key.push(c);
    }

    fn complete_key(&mut self) {
        self.key.push(mem::take(&mut self.current_key));
    }

    fn key_whitespace(&mut self) {
        if !self.current_key.is_empty() {
            self.current_key.extend_from_slice(&self.whitespace);
        }
    }

    fn append_value(&mut self, c: u8) {
        self.value.push(c);
    }

    fn value_whitespace(&mut self) {
        self.value.extend_from_slice(&self.whitespace);
    }

    fn complete_entry(&mut self) {
        let pending = Pending {
            comment: self.comment.clone(),
            section: self.section.clone(),
            key: mem::take(&mut self.key),
            value: mem::take(&mut self.value),
        };

        if !(pending.comment.is_empty()
            && pending.section.is_empty()
            && pending.key.is_empty()
            && pending.value.is_empty())
        {
            self.ready.push_back(pending);
        }

        self.comment_applied = true;
        self.section_applied = true;
    }

    /// Ends the current entry and starts a comment block.
    fn entry_then_comment(&mut self) -> State {
        self.complete_entry();
        self.clear_whitespace();
        self.clear_comment();
        State::CommentLead
    }

    /// Ends the current entry and starts a section declaration.
    fn entry_then_section(&mut self) -> State {
        self.complete_entry();
        self.clear_section();
        State::SectionLead
    }
}

/// Advances the state machine by one byte.
///
/// `escaped` is set when the byte followed an escape marker; it is then
/// content of whatever field is open, regardless of its class.
pub fn transition(state: State, class: Class, c: u8, escaped: bool, acc: &mut Accumulator) -> State {
    if escaped {
        return transition_escaped(state, c, acc);
    }

    match state {
        State::Idle | State::CommentContinuation => match class {
            Class::Whitespace | Class::Newline => state,
            Class::Comment if state == State::Idle => {
                acc.clear_whitespace();
                acc.clear_comment();
                State::CommentLead
            }
            Class::Comment => State::CommentLead,
            Class::OpenSection => {
                acc.clear_section();
                State::SectionLead
            }
            Class::Separator => {
                acc.complete_key();
                State::KeyBody
            }
            Class::Value => State::ValueLead,
            _ => {
                acc.append_key(c);
                State::KeyBody
            }
        },

        State::CommentLead => match class {
            Class::Whitespace | Class::Comment => state,
            Class::Newline => {
                acc.append_whitespace(c);
                State::CommentContinuation
            }
            _ => {
                acc.comment_whitespace();
                acc.append_comment(c);
                State::CommentBody
            }
        },

        State::CommentBody | State::CommentBoundary => match class {
            Class::Whitespace => {
                if state == State::CommentBody {
                    acc.clear_whitespace();
                }
                acc.append_whitespace(c);
                State::CommentBoundary
            }
            Class::Newline => {
                acc.clear_whitespace();
                acc.append_whitespace(c);
                State::CommentContinuation
            }
            _ => {
                if state == State::CommentBoundary {
                    acc.comment_whitespace();
                }
                acc.append_comment(c);
                State::CommentBody
            }
        },

        State::SectionLead => match class {
            Class::Whitespace | Class::Newline => state,
            Class::CloseSection => {
                acc.close_section();
                State::Idle
            }
            Class::Separator => {
                acc.complete_section_segment();
                state
            }
            _ => {
                acc.append_section(c);
                State::SectionBody
            }
        },

        State::SectionBody | State::SectionBoundary => match class {
            Class::Whitespace | Class::Newline => {
                if state == State::SectionBody {
                    acc.clear_whitespace();
                }
                acc.append_whitespace(c);
                State::SectionBoundary
            }
            Class::CloseSection => {
                acc.close_section();
                State::Idle
            }
            Class::Separator => {
                acc.complete_section_segment();
                State::SectionLead
            }
            _ => {
                if state == State::SectionBoundary {
                    acc.section_whitespace();
                }
                acc.append_section(c);
                State::SectionBody
            }
        },

        State::KeyBody | State::KeyBoundary => match class {
            Class::Whitespace => {
                if state == State::KeyBody {
                    acc.clear_whitespace();
                }
                acc.append_whitespace(c);
                State::KeyBoundary
            }
            Class::Newline => {
                acc.complete_key();
                acc.complete_entry();
                State::Idle
            }
            Class::Comment => {
                acc.complete_key();
                acc.entry_then_comment()
            }
            Class::OpenSection => {
                acc.complete_key();
                acc.entry_then_section()
            }
            Class::Separator => {
                acc.complete_key();
                State::KeyBoundary
            }
            Class::Value => {
                acc.complete_key();
                State::ValueLead
            }
            _ => {
                if state == State::KeyBoundary {
                    acc.key_whitespace();
                }
                acc.append_key(c);
                State::KeyBody
            }
        },

        State::ValueLead | State::ValueBody | State::ValueBoundary => match class {
            Class::Whitespace => match state {
                State::ValueLead => state,
                State::ValueBody => {
                    acc.clear_whitespace();
                    acc.append_whitespace(c);
                    State::ValueBoundary
                }
                _ => {
                    acc.append_whitespace(c);
                    state
                }
            },
            Class::Newline => {
                acc.complete_entry();
                State::Idle
            }
            Class::Comment => acc.entry_then_comment(),
            Class::OpenSection => acc.entry_then_section(),
            Class::Value => {
                acc.complete_entry();
                State::ValueLead
            }
            _ => {
                if state == State::ValueBoundary {
                    acc.value_whitespace();
                }
                acc.append_value(c);
                State::ValueBody
            }
        },
    }
}

fn transition_escaped(state: State, c: u8, acc: &mut Accumulator) -> State {
    match state {
        State::Idle | State::CommentContinuation | State::KeyBody => {
            acc.append_key(c);
            State::KeyBody
        }
        State::KeyBoundary => {
            acc.key_whitespace();
            acc.append_key(c);
            State::KeyBody
        }
        State::CommentLead | State::CommentBoundary => {
            acc.comment_whitespace();
            acc.append_comment(c);
            State::CommentBody
        }
        State::CommentBody => {
            acc.append_comment(c);
            state
        }
        State::SectionLead | State::SectionBody => {
            acc.append_section(c);
            State::SectionBody
        }
        State::SectionBoundary => {
            acc.section_whitespace();
            acc.append_section(c);
            State::SectionBody
        }
        State::ValueLead | State::ValueBody => {
            acc.append_value(c);
            State::ValueBody
        }
        State::ValueBoundary => {
            acc.value_whitespace();
            acc.append_value(c);
            State::ValueBody
        }
    }
}
