//! Text-record decoders, opcodes `0x80..=0xBD`.
//!
//! Every record exists in an even/odd pair that decodes identically; the
//! odd form additionally signals that the enclosing element closes
//! immediately after it (handled by the caller in
//! [`crate::records::element`], not here). Dispatch is done on the
//! *even* form via `opcode & !1`, so adding a new family only ever means
//! adding one match arm.

use crate::cursor::Cursor;
use crate::dictionary::Dictionary;
use crate::error::{DecodeError, ErrorKind};
use crate::outcome::ParseResult;
use base64::Engine;

use super::opcode as op;

/// Decodes the value of the text record whose opcode (either member of
/// its even/odd pair) was just consumed from `cursor`.
pub fn decode_text(
    cursor: &mut Cursor,
    dictionary: &dyn Dictionary,
    opcode: u8,
) -> ParseResult<String> {
    debug_assert!(op::is_text(opcode));
    match opcode & !1 {
        0x80 => Ok("0".to_string()),
        0x82 => Ok("1".to_string()),
        0x84 => Ok("false".to_string()),
        0x86 => Ok("true".to_string()),
        0x88 => Ok(cursor.read_signed_be(1)?.to_string()),
        0x8A => Ok(cursor.read_signed_be(2)?.to_string()),
        0x8C => Ok(cursor.read_signed_be(4)?.to_string()),
        0x8E => Ok(cursor.read_signed_be(8)?.to_string()),
        0x90 => decode_float(cursor),
        0x92 => decode_double(cursor),
        0x94 => decode_decimal(cursor),
        0x96 => decode_date_time(cursor),
        0x98 => decode_chars(cursor, read_len_u8(cursor)?),
        0x9A => decode_chars(cursor, read_len_u16le(cursor)? as usize),
        0x9C => decode_chars(cursor, cursor.read_mbi31()? as usize),
        0x9E => decode_bytes(cursor, read_len_u8(cursor)?),
        0xA0 => decode_bytes(cursor, read_len_u16le(cursor)? as usize),
        0xA2 => decode_bytes(cursor, cursor.read_mbi31()? as usize),
        0xA4 | 0xA6 | 0xA8 => Ok(String::new()),
        0xAA => decode_dictionary(cursor, dictionary),
        0xAC => decode_unique_id(cursor),
        0xAE => decode_time_span(cursor),
        0xB0 => decode_uuid(cursor),
        0xB2 => decode_uint64(cursor),
        0xB4 => decode_bool(cursor),
        0xB6 => decode_unicode_chars(cursor, read_len_u8(cursor)?),
        0xB8 => decode_unicode_chars(cursor, read_len_u16le(cursor)? as usize),
        0xBA => decode_unicode_chars(cursor, cursor.read_mbi31()? as usize),
        0xBC => decode_qname_dictionary(cursor, dictionary),
        _ => Err(DecodeError::unknown_opcode(cursor.tell(), opcode)),
    }
}

fn read_len_u8(cursor: &mut Cursor) -> ParseResult<usize> {
    Ok(cursor.read_byte()? as usize)
}

fn read_len_u16le(cursor: &mut Cursor) -> ParseResult<u16> {
    Ok(u16::from_le_bytes(cursor.read_le_bytes()?))
}

fn decode_chars(cursor: &mut Cursor, len: usize) -> ParseResult<String> {
    let bytes = cursor.read_exact(len)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| DecodeError::new(ErrorKind::DecodeValue, cursor.tell(), format!("invalid utf-8: {e}")))
}

fn decode_bytes(cursor: &mut Cursor, len: usize) -> ParseResult<String> {
    let bytes = cursor.read_exact(len)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

fn decode_unicode_chars(cursor: &mut Cursor, byte_len: usize) -> ParseResult<String> {
    if byte_len % 2 != 0 {
        return Err(DecodeError::new(
            ErrorKind::MalformedLength,
            cursor.tell(),
            "UTF-16LE payload length must be even",
        ));
    }
    let bytes = cursor.read_exact(byte_len)?;
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| DecodeError::new(ErrorKind::DecodeValue, cursor.tell(), format!("invalid utf-16: {e}")))
}

fn decode_dictionary(cursor: &mut Cursor, dictionary: &dyn Dictionary) -> ParseResult<String> {
    let pos = cursor.tell();
    let key = cursor.read_mbi31()?;
    dictionary
        .lookup(key)
        .map(str::to_string)
        .ok_or_else(|| DecodeError::unknown_dictionary_key(pos, key))
}

fn decode_qname_dictionary(cursor: &mut Cursor, dictionary: &dyn Dictionary) -> ParseResult<String> {
    let prefix_index = cursor.read_byte()?;
    let letter = (b'a' + prefix_index) as char;
    let name = decode_dictionary(cursor, dictionary)?;
    Ok(format!("{letter}:{name}"))
}

fn decode_bool(cursor: &mut Cursor) -> ParseResult<String> {
    let byte = cursor.read_byte()?;
    Ok(if byte != 0 { "true" } else { "false" }.to_string())
}

fn decode_uint64(cursor: &mut Cursor) -> ParseResult<String> {
    let bytes: [u8; 8] = cursor.read_le_bytes()?;
    Ok(u64::from_le_bytes(bytes).to_string())
}

/// Shared INF/-INF/NaN/-0 special casing for the IEEE float families.
/// Rust's `Display` for `f32`/`f64` already produces the shortest decimal
/// that round-trips, so the non-special path is just `value.to_string()`.
fn format_float(value: f64, is_negative_zero: bool) -> String {
    if value.is_infinite() {
        if value > 0.0 { "INF".to_string() } else { "-INF".to_string() }
    } else if value.is_nan() {
        "NaN".to_string()
    } else if value == 0.0 && is_negative_zero {
        "-0".to_string()
    } else {
        value.to_string()
    }
}

fn decode_float(cursor: &mut Cursor) -> ParseResult<String> {
    let bytes: [u8; 4] = cursor.read_le_bytes()?;
    let value = f32::from_le_bytes(bytes);
    Ok(format_float(value as f64, value == 0.0 && value.is_sign_negative()))
}

fn decode_double(cursor: &mut Cursor) -> ParseResult<String> {
    let bytes: [u8; 8] = cursor.read_le_bytes()?;
    let value = f64::from_le_bytes(bytes);
    Ok(format_float(value, value == 0.0 && value.is_sign_negative()))
}

/// Decodes a `System.Decimal`'s real 16-byte wire layout: four
/// little-endian `u32` words `[lo, mid, hi, flags]`, with scale and sign
/// carried in `flags` rather than folded into the mantissa.
fn decode_decimal(cursor: &mut Cursor) -> ParseResult<String> {
    let lo = u32::from_le_bytes(cursor.read_le_bytes()?);
    let mid = u32::from_le_bytes(cursor.read_le_bytes()?);
    let hi = u32::from_le_bytes(cursor.read_le_bytes()?);
    let flags = u32::from_le_bytes(cursor.read_le_bytes()?);

    let mantissa: u128 = ((hi as u128) << 64) | ((mid as u128) << 32) | lo as u128;
    let scale = ((flags >> 16) & 0xFF) as usize;
    let negative = (flags >> 31) & 1 == 1;

    let digits = mantissa.to_string();
    let mut body = if scale == 0 {
        digits
    } else {
        let padded = if digits.len() <= scale {
            format!("{:0>width$}", digits, width = scale + 1)
        } else {
            digits
        };
        let point = padded.len() - scale;
        let (int_part, frac_part) = padded.split_at(point);
        let mut frac = frac_part.to_string();
        while frac.ends_with('0') {
            frac.pop();
        }
        if frac.is_empty() {
            int_part.to_string()
        } else {
            format!("{int_part}.{frac}")
        }
    };

    if negative && mantissa != 0 {
        body = format!("-{body}");
    }
    Ok(body)
}

/// `DateTime`: 64-bit little-endian. Low 2 bits select the timezone kind
/// (`0` unspecified, `1` UTC, `2` local); the upper 62 bits are 100-ns
/// ticks since `0001-01-01`. Kind `2` is rendered the same as kind `0`
/// (no zone suffix): the wire value carries no actual UTC offset to
/// render, so inventing one would fabricate data.
fn decode_date_time(cursor: &mut Cursor) -> ParseResult<String> {
    let raw = u64::from_le_bytes(cursor.read_le_bytes()?);
    let tz = raw & 0b11;
    let ticks = (raw >> 2) as i64;

    let base = chrono::NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("year 1 is representable");

    const TICKS_PER_SECOND: i64 = 10_000_000;
    let seconds = ticks / TICKS_PER_SECOND;
    let remainder_ticks = ticks % TICKS_PER_SECOND;
    let nanos = remainder_ticks * 100;

    let dt = base + chrono::Duration::seconds(seconds) + chrono::Duration::nanoseconds(nanos);

    let rendered = dt.format("%Y-%m-%dT%H:%M:%S%.7f").to_string();
    Ok(match tz {
        1 => format!("{rendered}Z"),
        _ => rendered,
    })
}

/// `TimeSpan`: signed 64-bit little-endian 100-ns ticks, rendered as
/// `[-]d.hh:mm:ss[.fffffff]`. Computed from the magnitude with the sign
/// applied separately at the end, rather than decomposing the signed
/// value directly, which misplaces the sign across the `d.hh:mm:ss`
/// fields for negative ticks.
fn decode_time_span(cursor: &mut Cursor) -> ParseResult<String> {
    let raw = cursor.read_le_bytes::<8>()?;
    let ticks = i64::from_le_bytes(raw);
    let negative = ticks < 0;
    let magnitude = ticks.unsigned_abs();

    const TICKS_PER_SECOND: u64 = 10_000_000;
    let total_seconds = magnitude / TICKS_PER_SECOND;
    let fractional_ticks = magnitude % TICKS_PER_SECOND;

    let days = total_seconds / 86_400;
    let remainder = total_seconds % 86_400;
    let hours = remainder / 3600;
    let minutes = (remainder % 3600) / 60;
    let seconds = remainder % 60;

    let mut out = if days != 0 {
        format!("{days}.{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    };

    if fractional_ticks != 0 {
        let mut frac = format!("{fractional_ticks:07}");
        while frac.ends_with('0') {
            frac.pop();
        }
        out.push('.');
        out.push_str(&frac);
    }

    if negative {
        out = format!("-{out}");
    }
    Ok(out)
}

/// Formats the 16 raw GUID/UniqueId bytes: groups 1-3 are stored
/// little-endian (and so are reversed for canonical display), groups 4-5
/// are stored big-endian (displayed as-is).
fn format_guid_bytes(bytes: &[u8; 16]) -> String {
    fn hex_rev(b: &[u8]) -> String {
        b.iter().rev().map(|byte| format!("{byte:02x}")).collect()
    }
    fn hex(b: &[u8]) -> String {
        b.iter().map(|byte| format!("{byte:02x}")).collect()
    }
    format!(
        "{}-{}-{}-{}-{}",
        hex_rev(&bytes[0..4]),
        hex_rev(&bytes[4..6]),
        hex_rev(&bytes[6..8]),
        hex(&bytes[8..10]),
        hex(&bytes[10..16]),
    )
}

fn decode_unique_id(cursor: &mut Cursor) -> ParseResult<String> {
    let bytes: [u8; 16] = cursor.read_le_bytes()?;
    Ok(format!("urn:uuid:{}", format_guid_bytes(&bytes)))
}

fn decode_uuid(cursor: &mut Cursor) -> ParseResult<String> {
    let bytes: [u8; 16] = cursor.read_le_bytes()?;
    Ok(format_guid_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::StaticDictionary;

    fn dict() -> StaticDictionary {
        StaticDictionary(&[(0x02, "Envelope")])
    }

    #[test]
    fn literal_texts_ignore_payload() {
        let mut c = Cursor::new(&[]);
        assert_eq!(decode_text(&mut c, &dict(), 0x80).unwrap(), "0");
        assert_eq!(decode_text(&mut c, &dict(), 0x87).unwrap(), "true");
    }

    #[test]
    fn signed_ints_render_as_decimal() {
        let mut c = Cursor::new(&[0xFF]);
        assert_eq!(decode_text(&mut c, &dict(), 0x88).unwrap(), "-1");
    }

    #[test]
    fn chars32_reads_mbi31_length() {
        let mut c = Cursor::new(&[0x03, b'A', b'B', b'C']);
        assert_eq!(decode_text(&mut c, &dict(), 0x9C).unwrap(), "ABC");
    }

    #[test]
    fn bytes8_renders_base64() {
        let mut c = Cursor::new(&[0x02, 0xFF, 0x00]);
        assert_eq!(decode_text(&mut c, &dict(), 0x9E).unwrap(), "/wA=");
    }

    #[test]
    fn dictionary_lookup_success_and_failure() {
        let mut c = Cursor::new(&[0x02]);
        assert_eq!(decode_text(&mut c, &dict(), 0xAA).unwrap(), "Envelope");

        let mut c = Cursor::new(&[0x09]);
        let err = decode_text(&mut c, &dict(), 0xAA).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownDictionaryKey);
    }

    #[test]
    fn float_special_values() {
        let mut c = Cursor::new(&f32::INFINITY.to_le_bytes());
        assert_eq!(decode_text(&mut c, &dict(), 0x90).unwrap(), "INF");

        let mut c = Cursor::new(&f32::NAN.to_le_bytes());
        assert_eq!(decode_text(&mut c, &dict(), 0x90).unwrap(), "NaN");

        let mut c = Cursor::new(&(-0.0f32).to_le_bytes());
        assert_eq!(decode_text(&mut c, &dict(), 0x90).unwrap(), "-0");
    }

    #[test]
    fn float_shortest_round_trip() {
        let mut c = Cursor::new(&(0.1f32).to_le_bytes());
        let rendered = decode_text(&mut c, &dict(), 0x90).unwrap();
        assert_eq!(rendered.parse::<f32>().unwrap(), 0.1f32);
    }

    #[test]
    fn decimal_trims_trailing_zeros_and_dot() {
        // 123000 with scale 3 -> "123.000" -> trimmed to "123"
        let lo = 123_000u32.to_le_bytes();
        let mid = 0u32.to_le_bytes();
        let hi = 0u32.to_le_bytes();
        let flags = (3u32 << 16).to_le_bytes();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&lo);
        bytes.extend_from_slice(&mid);
        bytes.extend_from_slice(&hi);
        bytes.extend_from_slice(&flags);
        let mut c = Cursor::new(&bytes);
        assert_eq!(decode_text(&mut c, &dict(), 0x94).unwrap(), "123");
    }

    #[test]
    fn decimal_negative_with_fraction() {
        let lo = 12345u32.to_le_bytes();
        let mid = 0u32.to_le_bytes();
        let hi = 0u32.to_le_bytes();
        let flags = ((2u32 << 16) | (1u32 << 31)).to_le_bytes();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&lo);
        bytes.extend_from_slice(&mid);
        bytes.extend_from_slice(&hi);
        bytes.extend_from_slice(&flags);
        let mut c = Cursor::new(&bytes);
        assert_eq!(decode_text(&mut c, &dict(), 0x94).unwrap(), "-123.45");
    }

    #[test]
    fn time_span_negative_renders_with_leading_minus() {
        let ticks: i64 = -1;
        let mut c = Cursor::new(&ticks.to_le_bytes());
        assert_eq!(decode_text(&mut c, &dict(), 0xAE).unwrap(), "-00:00:00.0000001");
    }

    #[test]
    fn time_span_positive_with_days() {
        let ticks: i64 = 90_061 * 10_000_000; // 1 day, 1:01:01
        let mut c = Cursor::new(&ticks.to_le_bytes());
        assert_eq!(decode_text(&mut c, &dict(), 0xAE).unwrap(), "1.01:01:01");
    }

    #[test]
    fn unique_id_reverses_first_three_groups() {
        let bytes: [u8; 16] = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
            0x0F, 0x10,
        ];
        let mut c = Cursor::new(&bytes);
        let rendered = decode_text(&mut c, &dict(), 0xAC).unwrap();
        assert_eq!(rendered, "urn:uuid:04030201-0605-0807-090a-0b0c0d0e0f10");
    }

    #[test]
    fn unicode_chars_round_trip_utf16() {
        let text = "hi";
        let utf16: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let mut bytes = vec![utf16.len() as u8];
        bytes.extend_from_slice(&utf16);
        let mut c = Cursor::new(&bytes);
        assert_eq!(decode_text(&mut c, &dict(), 0xB6).unwrap(), "hi");
    }

    #[test]
    fn qname_dictionary_combines_letter_and_name() {
        let mut c = Cursor::new(&[0x02, 0x02]); // prefix 'c', key 0x02
        assert_eq!(decode_text(&mut c, &dict(), 0xBC).unwrap(), "c:Envelope");
    }
}
