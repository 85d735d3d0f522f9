//! Structured decode errors.
//!
//! A closed enum of behavioural categories, each carrying a byte position
//! and an ordered diagnostic chain, so callers can match on the kind
//! instead of parsing a message.

use core::fmt;

/// Behavioural category of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fewer bytes were available than a fixed-width or length-prefixed
    /// read required.
    EndOfStream,
    /// An MBI-31 integer exceeded five bytes, or a length-prefixed read's
    /// declared length could not be satisfied by the remaining stream.
    MalformedLength,
    /// An opcode fell outside the expected class at the current position
    /// (attribute dispatch at attribute position, element dispatch at
    /// element position, text dispatch at text position).
    UnknownOpcode,
    /// A dictionary key had no entry in the supplied [`crate::Dictionary`].
    UnknownDictionaryKey,
    /// A value could not be interpreted: non-UTF-8 where UTF-8 was
    /// expected, an invalid UTF-16 surrogate pair, or ticks outside the
    /// representable `DateTime` range.
    DecodeValue,
    /// Element nesting exceeded [`crate::DecoderConfig::max_depth`].
    NestingLimit,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EndOfStream => "end of stream",
            Self::MalformedLength => "malformed length",
            Self::UnknownOpcode => "unknown opcode",
            Self::UnknownDictionaryKey => "unknown dictionary key",
            Self::DecodeValue => "could not decode value",
            Self::NestingLimit => "maximum nesting exceeded",
        };
        f.write_str(s)
    }
}

/// A decode failure: its category, the byte offset of the innermost
/// failing read, and an ordered trace of parser frames from innermost to
/// outermost, kept as discrete frames instead of a single concatenated
/// string so each one stays addressable.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} at byte {position}: {}", self.trace_summary())]
pub struct DecodeError {
    pub kind: ErrorKind,
    pub position: usize,
    pub trace: Vec<String>,
}

impl DecodeError {
    fn trace_summary(&self) -> String {
        self.trace.join(" -> ")
    }

    pub fn new(kind: ErrorKind, position: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            trace: vec![message.into()],
        }
    }

    pub fn end_of_stream(position: usize) -> Self {
        Self::new(ErrorKind::EndOfStream, position, "end of stream")
    }

    pub fn unknown_opcode(position: usize, opcode: u8) -> Self {
        Self::new(
            ErrorKind::UnknownOpcode,
            position,
            format!("unknown type byte: 0x{opcode:02X}"),
        )
    }

    pub fn unknown_dictionary_key(position: usize, key: u32) -> Self {
        Self::new(
            ErrorKind::UnknownDictionaryKey,
            position,
            format!("unknown dictionary key 0x{key:X}"),
        )
    }

    /// Pushes an outer context frame onto the diagnostic chain, innermost
    /// frame first. Used by combinators to annotate a failure with the
    /// name of the parser that was running when it propagated, without
    /// losing the original position.
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.trace.push(frame.into());
        self
    }
}
