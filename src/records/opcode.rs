//! Opcode range classification.
//!
//! The wire format groups its roughly 120 opcodes into a handful of
//! contiguous ranges (end-element, attribute, element, text). Rust's
//! `match` over inclusive ranges compiles those checks to a jump table
//! without needing to materialize the ranges as data.

pub const END_ELEMENT: u8 = 0x01;

pub const SHORT_ATTRIBUTE: u8 = 0x04;
pub const ATTRIBUTE: u8 = 0x05;
pub const SHORT_DICTIONARY_ATTRIBUTE: u8 = 0x06;
pub const DICTIONARY_ATTRIBUTE: u8 = 0x07;
pub const SHORT_XMLNS_ATTRIBUTE: u8 = 0x08;
pub const XMLNS_ATTRIBUTE: u8 = 0x09;
pub const SHORT_DICTIONARY_XMLNS_ATTRIBUTE: u8 = 0x0A;
pub const DICTIONARY_XMLNS_ATTRIBUTE: u8 = 0x0B;

pub const PREFIX_DICTIONARY_ATTRIBUTE_START: u8 = 0x0C;
pub const PREFIX_DICTIONARY_ATTRIBUTE_END: u8 = 0x25;
pub const PREFIX_ATTRIBUTE_START: u8 = 0x26;
pub const PREFIX_ATTRIBUTE_END: u8 = 0x3F;

pub const SHORT_ELEMENT: u8 = 0x40;
pub const ELEMENT: u8 = 0x41;
pub const SHORT_DICTIONARY_ELEMENT: u8 = 0x42;
pub const DICTIONARY_ELEMENT: u8 = 0x43;

pub const PREFIX_DICTIONARY_ELEMENT_START: u8 = 0x44;
pub const PREFIX_DICTIONARY_ELEMENT_END: u8 = 0x5D;
pub const PREFIX_ELEMENT_START: u8 = 0x5E;
pub const PREFIX_ELEMENT_END: u8 = 0x77;

pub const TEXT_START: u8 = 0x80;
pub const TEXT_END: u8 = 0xBD;

#[inline]
pub fn is_attribute(opcode: u8) -> bool {
    (SHORT_ATTRIBUTE..=PREFIX_ATTRIBUTE_END).contains(&opcode)
}

#[inline]
pub fn is_element(opcode: u8) -> bool {
    (SHORT_ELEMENT..=PREFIX_ELEMENT_END).contains(&opcode)
}

#[inline]
pub fn is_text(opcode: u8) -> bool {
    (TEXT_START..=TEXT_END).contains(&opcode)
}

/// True for the odd member of a text-record pair: the "with end element"
/// twin that additionally closes the enclosing element.
#[inline]
pub fn is_text_with_end_element(opcode: u8) -> bool {
    is_text(opcode) && opcode % 2 == 1
}

/// "Prefix letter embedded in opcode": `'a' + (opcode - range_start)`.
/// Panics if `opcode` is outside `start..=start+25`, which would mean a
/// caller misclassified the opcode before calling this — a contract
/// violation, not a malformed-input condition.
#[inline]
pub fn embedded_prefix_letter(opcode: u8, range_start: u8) -> char {
    let offset = opcode
        .checked_sub(range_start)
        .expect("opcode must be >= range_start");
    assert!(offset < 26, "opcode out of embedded-letter range");
    (b'a' + offset) as char
}
