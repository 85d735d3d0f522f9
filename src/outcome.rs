//! Parse outcome and combinators.
//!
//! These are small generic functions over `&mut Cursor` rather than a
//! chain of closures threading an immutable buffer through `bind`/`map`/
//! `choice` — the idiomatic shape once the cursor itself is mutable.
//! Only the underlying semantics matter: soft failure is recoverable and
//! eligible for backtracking, committed failure (one that already
//! consumed input) surfaces, `repeat` swallows its terminating failure,
//! and peek-based dispatch never re-reads a tag byte once consumed.

use crate::cursor::Cursor;
use crate::error::DecodeError;

/// The result of running one sub-parser: success carries the decoded
/// value (the cursor already reflects the new position as a side
/// effect), failure carries a [`DecodeError`] with its position and
/// diagnostic chain.
pub type ParseResult<T> = Result<T, DecodeError>;

/// Runs `f`; on failure, unconditionally restores the cursor to the
/// position it held before `f` ran and returns the error unchanged.
///
/// This is the building block for *soft* failure: a caller that wraps a
/// sub-parser in `backtrack` promises that, whatever `f` does internally,
/// a failure leaves the cursor exactly where it found it — safe for an
/// enclosing `alt` or `repeat_while` to treat as "try something else" or
/// "stop repeating" rather than a committed error.
pub fn backtrack<T>(
    cursor: &mut Cursor,
    f: impl FnOnce(&mut Cursor) -> ParseResult<T>,
) -> ParseResult<T> {
    let start = cursor.tell();
    let result = f(cursor);
    if result.is_err() {
        cursor.seek(start);
    }
    result
}

/// Tries `first`; if it fails without having consumed any input, restores
/// the cursor and tries `second`. If `first` consumed input before
/// failing, that failure is committed and `second` is never attempted —
/// standard PEG backtracking, needed to keep failure cost bounded on
/// large inputs.
pub fn alt<T>(
    cursor: &mut Cursor,
    first: impl FnOnce(&mut Cursor) -> ParseResult<T>,
    second: impl FnOnce(&mut Cursor) -> ParseResult<T>,
) -> ParseResult<T> {
    let start = cursor.tell();
    match first(cursor) {
        Ok(value) => Ok(value),
        Err(_) if cursor.tell() == start => second(cursor),
        Err(err) => Err(err),
    }
}

/// Repeats `item` for as long as a non-consuming peek of the next byte
/// satisfies `predicate`; stops (without error) at EOF or the first byte
/// that does not satisfy it. Avoids allocating and rolling back a whole
/// record just to discover the tag byte alone should end the loop.
///
/// A failure from `item` itself — as opposed to the predicate rejecting
/// the next tag — is a committed error and propagates with an added
/// frame, since `predicate` already established the record was supposed
/// to be of this kind.
pub fn repeat_while_peek<T>(
    cursor: &mut Cursor,
    frame: &str,
    predicate: impl Fn(u8) -> bool,
    mut item: impl FnMut(&mut Cursor) -> ParseResult<T>,
) -> ParseResult<Vec<T>> {
    let mut results = Vec::new();
    loop {
        match cursor.peek_byte_opt() {
            Some(tag) if predicate(tag) => {
                let value = item(cursor).map_err(|e| e.with_frame(frame.to_string()))?;
                results.push(value);
            }
            _ => break,
        }
    }
    Ok(results)
}

/// Runs a fixed sequence of sub-parsers, short-circuiting on the first
/// failure and attaching a "position N in sequence" frame.
pub fn seq2<A, B>(
    cursor: &mut Cursor,
    frame: &str,
    first: impl FnOnce(&mut Cursor) -> ParseResult<A>,
    second: impl FnOnce(&mut Cursor) -> ParseResult<B>,
) -> ParseResult<(A, B)> {
    let a = first(cursor).map_err(|e| e.with_frame(format!("{frame}: first")))?;
    let b = second(cursor).map_err(|e| e.with_frame(format!("{frame}: second")))?;
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn alt_tries_second_only_on_soft_failure() {
        let mut c = Cursor::new(&[0x01]);
        let result: ParseResult<&'static str> = alt(
            &mut c,
            |c| {
                // Soft: peeks but does not consume before failing.
                let _ = c.peek_byte()?;
                Err(DecodeError::unknown_opcode(c.tell(), 0x01))
            },
            |c| {
                c.read_byte()?;
                Ok("second")
            },
        );
        assert_eq!(result.unwrap(), "second");
    }

    #[test]
    fn alt_commits_after_consuming_input() {
        let mut c = Cursor::new(&[0x01]);
        let result: ParseResult<&'static str> = alt(
            &mut c,
            |c| {
                c.read_byte()?; // consumes, then fails: committed
                Err(DecodeError::end_of_stream(c.tell()))
            },
            |_c| Ok("second"),
        );
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind, ErrorKind::EndOfStream);
    }

    #[test]
    fn repeat_while_peek_stops_cleanly_at_eof() {
        let mut c = Cursor::new(&[0x10, 0x10, 0x20]);
        let items = repeat_while_peek(&mut c, "item", |b| b == 0x10, |c| c.read_byte()).unwrap();
        assert_eq!(items, vec![0x10, 0x10]);
        assert_eq!(c.peek_byte().unwrap(), 0x20);
    }
}
