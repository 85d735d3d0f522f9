//! Decoder for the .NET Binary XML (NBFX) wire format.
//!
//! Given a byte buffer encoding a single XML document per `[MC-NBFX]`, this
//! crate reconstructs the equivalent in-memory XML tree: elements,
//! attributes, text and namespace prefixes. Only decoding is implemented;
//! encoding back to NBFX is out of scope.
//!
//! The entry point is [`decode`]. A well-known-string [`Dictionary`] and a
//! [`DecoderConfig`] are supplied by the caller; both are cheap to
//! construct and have sensible defaults for the common case.

pub mod cursor;
pub mod dictionary;
pub mod error;
pub mod outcome;
pub mod records;
pub mod trace;
pub mod xml;

use cursor::Cursor;
pub use dictionary::{Dictionary, StaticDictionary};
pub use error::{DecodeError, ErrorKind};
pub use outcome::ParseResult;
pub use trace::{LogTracer, NullTracer, TraceEvent, Tracer};
pub use xml::Element;

/// Tunable limits for a decode run.
///
/// There is deliberately no mechanism to load this from a file or
/// environment variable: the core decoder has no persisted state, per
/// `[MC-NBFX]` decoding being a pure function of (bytes, dictionary,
/// config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum element nesting depth tolerated before
    /// [`ErrorKind::NestingLimit`] is raised instead of recursing further.
    pub max_depth: usize,
}

impl DecoderConfig {
    /// The minimum nesting depth a conforming decoder is expected to tolerate.
    pub const DEFAULT_MAX_DEPTH: usize = 512;
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Decodes a single NBFX-encoded XML document from `bytes`.
///
/// Trailing bytes after the first complete element are not an error: the
/// stream may carry outer framing the caller already stripped, or may not
/// have, and either way this decoder only promises to return the first
/// complete element starting at position 0.
pub fn decode(
    bytes: &[u8],
    dictionary: &dyn Dictionary,
    config: DecoderConfig,
    tracer: &dyn Tracer,
) -> Result<Element, DecodeError> {
    let mut cursor = Cursor::new(bytes);
    records::element::parse_root(&mut cursor, dictionary, config, tracer)
}

/// Decodes with a [`NullTracer`] and [`DecoderConfig::default`].
pub fn decode_default(bytes: &[u8], dictionary: &dyn Dictionary) -> Result<Element, DecodeError> {
    decode(bytes, dictionary, DecoderConfig::default(), &NullTracer)
}
