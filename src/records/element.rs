//! Element decoder, opcodes `0x40..=0x77`, and the structural state
//! machine built around it.
//!
//! `ReadOpcode -> ReadPrefix -> ReadName -> ReadAttributes -> MaybeText ->
//! ReadChildren -> ReadEnd`. The child and attribute loops are both
//! `repeat_while_peek` over the element's own opcode class, so a bare
//! `EndElement` byte simply fails to match either predicate and the loop
//! stops on its own — there is no separate sentinel type threaded through
//! the call chain; only the soft/committed-failure semantics need to be
//! preserved, not any particular combinator shape.

use crate::cursor::Cursor;
use crate::dictionary::Dictionary;
use crate::error::DecodeError;
use crate::outcome::{repeat_while_peek, ParseResult};
use crate::trace::{TraceEvent, TraceOutcome, Tracer};
use crate::xml::{Element, QName};
use crate::DecoderConfig;

use super::attribute::parse_attribute;
use super::opcode as op;
use super::text::decode_text;

const END_ELEMENT: u8 = op::END_ELEMENT;

/// Decodes exactly one element starting at the cursor's current
/// position, including its matching end marker. Used both as the
/// top-level entry point (`depth == 0`) and recursively for children.
fn parse_element(
    cursor: &mut Cursor,
    dictionary: &dyn Dictionary,
    config: DecoderConfig,
    tracer: &dyn Tracer,
    depth: usize,
) -> ParseResult<Element> {
    let start = cursor.tell();
    let result = parse_element_inner(cursor, dictionary, config, tracer, depth);
    match &result {
        Ok(_) => tracer.record(TraceEvent {
            parser: "element",
            position: start,
            outcome: TraceOutcome::Ok,
        }),
        Err(e) => {
            let kind = e.kind.to_string();
            tracer.record(TraceEvent {
                parser: "element",
                position: start,
                outcome: TraceOutcome::Err(&kind),
            });
        }
    }
    result
}

fn parse_element_inner(
    cursor: &mut Cursor,
    dictionary: &dyn Dictionary,
    config: DecoderConfig,
    tracer: &dyn Tracer,
    depth: usize,
) -> ParseResult<Element> {
    if depth >= config.max_depth {
        return Err(DecodeError::new(
            crate::ErrorKind::NestingLimit,
            cursor.tell(),
            format!("nesting exceeded {} levels", config.max_depth),
        ));
    }

    let start = cursor.tell();
    let opcode = cursor.peek_byte()?;
    if !op::is_element(opcode) {
        return Err(DecodeError::unknown_opcode(start, opcode));
    }
    cursor.read_byte()?;

    let prefix = read_prefix(cursor, opcode)?;
    let local = read_local_name(cursor, dictionary, opcode)?;
    let tag = if prefix.is_empty() {
        QName::unprefixed(local)
    } else {
        QName::new(prefix, local)
    };
    let mut element = Element::new(tag);

    let attributes = repeat_while_peek(cursor, "attribute", op::is_attribute, |c| {
        parse_attribute(c, dictionary)
    })?;
    for (name, value) in attributes {
        element.set_attribute(name, value);
    }

    match cursor.peek_byte_opt() {
        Some(END_ELEMENT) => {
            cursor.read_byte()?;
            return Ok(element);
        }
        Some(b) if op::is_text(b) => {
            cursor.read_byte()?;
            let text = decode_text(cursor, dictionary, b)?;
            element.set_text(text);
            if op::is_text_with_end_element(b) {
                return Ok(element);
            }
        }
        Some(_) | None => {}
    }

    let children = repeat_while_peek(cursor, "child element", op::is_element, |c| {
        parse_element(c, dictionary, config, tracer, depth + 1)
    })?;
    for child in children {
        element.push_child(child);
    }

    match cursor.peek_byte_opt() {
        Some(END_ELEMENT) => {
            cursor.read_byte()?;
        }
        Some(_) => {}
        None if depth == 0 => {}
        None => return Err(DecodeError::end_of_stream(cursor.tell())),
    }

    Ok(element)
}

fn read_prefix(cursor: &mut Cursor, opcode: u8) -> ParseResult<String> {
    match opcode {
        op::SHORT_ELEMENT | op::SHORT_DICTIONARY_ELEMENT => Ok(String::new()),
        op::ELEMENT | op::DICTIONARY_ELEMENT => read_inline_string(cursor),
        op::PREFIX_DICTIONARY_ELEMENT_START..=op::PREFIX_DICTIONARY_ELEMENT_END => {
            Ok(op::embedded_prefix_letter(opcode, op::PREFIX_DICTIONARY_ELEMENT_START).to_string())
        }
        op::PREFIX_ELEMENT_START..=op::PREFIX_ELEMENT_END => {
            Ok(op::embedded_prefix_letter(opcode, op::PREFIX_ELEMENT_START).to_string())
        }
        _ => Ok(String::new()),
    }
}

fn read_local_name(cursor: &mut Cursor, dictionary: &dyn Dictionary, opcode: u8) -> ParseResult<String> {
    match opcode {
        op::SHORT_DICTIONARY_ELEMENT
        | op::DICTIONARY_ELEMENT
        | op::PREFIX_DICTIONARY_ELEMENT_START..=op::PREFIX_DICTIONARY_ELEMENT_END => {
            read_dictionary_string(cursor, dictionary)
        }
        _ => read_inline_string(cursor),
    }
}

fn read_inline_string(cursor: &mut Cursor) -> ParseResult<String> {
    let len = cursor.read_mbi31()? as usize;
    let bytes = cursor.read_exact(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        DecodeError::new(
            crate::ErrorKind::DecodeValue,
            cursor.tell(),
            format!("invalid utf-8: {e}"),
        )
    })
}

fn read_dictionary_string(cursor: &mut Cursor, dictionary: &dyn Dictionary) -> ParseResult<String> {
    let pos = cursor.tell();
    let key = cursor.read_mbi31()?;
    dictionary
        .lookup(key)
        .map(str::to_string)
        .ok_or_else(|| DecodeError::unknown_dictionary_key(pos, key))
}

/// Decodes the single top-level element at position 0. Trailing bytes
/// are not an error; any failure is wrapped with a "top level" frame
/// before being returned to the caller.
pub fn parse_root(
    cursor: &mut Cursor,
    dictionary: &dyn Dictionary,
    config: DecoderConfig,
    tracer: &dyn Tracer,
) -> ParseResult<Element> {
    parse_element(cursor, dictionary, config, tracer, 0).map_err(|e| e.with_frame("top level"))
}
