//! Attribute decoder, opcodes `0x04..=0x3F`.
//!
//! An attribute record decodes to a single `(qualified_name, value)` pair;
//! the element parser is responsible for merging the sequence of pairs
//! into its attribute map in read order.

use crate::cursor::Cursor;
use crate::dictionary::Dictionary;
use crate::error::DecodeError;
use crate::outcome::ParseResult;

use super::opcode as op;
use super::text::decode_text;

/// Reads one attribute record, including its opcode byte.
///
/// Fails softly (cursor restored) if the next byte is not in
/// `0x04..=0x3F` — the shape `repeat_while_peek` needs to end the
/// attribute loop without misreporting a clean stop as an error.
pub fn parse_attribute(
    cursor: &mut Cursor,
    dictionary: &dyn Dictionary,
) -> ParseResult<(String, String)> {
    let start = cursor.tell();
    let opcode = cursor.peek_byte()?;
    if !op::is_attribute(opcode) {
        return Err(DecodeError::unknown_opcode(start, opcode));
    }
    cursor.read_byte()?;

    let prefix = read_prefix(cursor, opcode)?;
    let local = read_local_name(cursor, dictionary, opcode)?;
    let value = read_value(cursor, dictionary, opcode)?;

    // `xmlns`-family opcodes already produce their full fixed prefix text
    // (with no local name, or with the colon baked in); every other
    // opcode joins a bare prefix and local name with `:` itself.
    let qualified = match opcode {
        op::SHORT_XMLNS_ATTRIBUTE | op::SHORT_DICTIONARY_XMLNS_ATTRIBUTE => prefix,
        op::XMLNS_ATTRIBUTE | op::DICTIONARY_XMLNS_ATTRIBUTE => format!("{prefix}{local}"),
        _ if prefix.is_empty() => local,
        _ => format!("{prefix}:{local}"),
    };
    Ok((qualified, value))
}

fn read_prefix(cursor: &mut Cursor, opcode: u8) -> ParseResult<String> {
    match opcode {
        op::SHORT_XMLNS_ATTRIBUTE | op::SHORT_DICTIONARY_XMLNS_ATTRIBUTE => {
            Ok("xmlns".to_string())
        }
        op::XMLNS_ATTRIBUTE | op::DICTIONARY_XMLNS_ATTRIBUTE => Ok("xmlns:".to_string()),
        op::PREFIX_DICTIONARY_ATTRIBUTE_START..=op::PREFIX_DICTIONARY_ATTRIBUTE_END => {
            Ok(op::embedded_prefix_letter(opcode, op::PREFIX_DICTIONARY_ATTRIBUTE_START).to_string())
        }
        op::PREFIX_ATTRIBUTE_START..=op::PREFIX_ATTRIBUTE_END => {
            Ok(op::embedded_prefix_letter(opcode, op::PREFIX_ATTRIBUTE_START).to_string())
        }
        op::ATTRIBUTE | op::DICTIONARY_ATTRIBUTE => {
            let len = cursor.read_mbi31()? as usize;
            let bytes = cursor.read_exact(len)?;
            decode_utf8(cursor, bytes)
        }
        op::SHORT_ATTRIBUTE | op::SHORT_DICTIONARY_ATTRIBUTE => Ok(String::new()),
        _ => Ok(String::new()),
    }
}

fn read_local_name(cursor: &mut Cursor, dictionary: &dyn Dictionary, opcode: u8) -> ParseResult<String> {
    match opcode {
        op::SHORT_XMLNS_ATTRIBUTE | op::SHORT_DICTIONARY_XMLNS_ATTRIBUTE => Ok(String::new()),
        op::SHORT_DICTIONARY_ATTRIBUTE | op::DICTIONARY_ATTRIBUTE => {
            read_dictionary_string(cursor, dictionary)
        }
        op::PREFIX_DICTIONARY_ATTRIBUTE_START..=op::PREFIX_DICTIONARY_ATTRIBUTE_END => {
            read_dictionary_string(cursor, dictionary)
        }
        _ => {
            let len = cursor.read_mbi31()? as usize;
            let bytes = cursor.read_exact(len)?;
            decode_utf8(cursor, bytes)
        }
    }
}

fn read_value(cursor: &mut Cursor, dictionary: &dyn Dictionary, opcode: u8) -> ParseResult<String> {
    match opcode {
        op::SHORT_XMLNS_ATTRIBUTE | op::XMLNS_ATTRIBUTE => {
            let len = cursor.read_mbi31()? as usize;
            let bytes = cursor.read_exact(len)?;
            decode_utf8(cursor, bytes)
        }
        op::SHORT_DICTIONARY_XMLNS_ATTRIBUTE | op::DICTIONARY_XMLNS_ATTRIBUTE => {
            read_dictionary_string(cursor, dictionary)
        }
        _ => {
            let text_opcode = cursor.peek_byte()?;
            cursor.read_byte()?;
            decode_text(cursor, dictionary, text_opcode)
        }
    }
}

fn read_dictionary_string(cursor: &mut Cursor, dictionary: &dyn Dictionary) -> ParseResult<String> {
    let pos = cursor.tell();
    let key = cursor.read_mbi31()?;
    dictionary
        .lookup(key)
        .map(str::to_string)
        .ok_or_else(|| DecodeError::unknown_dictionary_key(pos, key))
}

fn decode_utf8(cursor: &Cursor, bytes: &[u8]) -> ParseResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        DecodeError::new(
            crate::ErrorKind::DecodeValue,
            cursor.tell(),
            format!("invalid utf-8: {e}"),
        )
    })
}
