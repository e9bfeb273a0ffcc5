//! Base64 codec for opaque `ID` scalars.
//!
//! Binary data and opaque strings like IDs travel on the wire as Base64
//! text using the standard alphabet (`A-Z a-z 0-9 + /`, pad `=`).

use crate::error::{FieldResult, SchemaError};

const PADDING: u8 = b'=';

/// Maps a single Base64-encoded character to its 6-bit integer value.
///
/// Returns `0xFF` for characters outside the alphabet.
const fn from_base64_digit(ch: u8) -> u8 {
    match ch {
        b'A'..=b'Z' => ch - b'A',
        b'a'..=b'z' => ch - b'a' + 26,
        b'0'..=b'9' => ch - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => 0xFF,
    }
}

/// Maps a single 6-bit integer value to its Base64-encoded character.
const fn to_base64_digit(i: u8) -> u8 {
    match i {
        0..=25 => i + b'A',
        26..=51 => i - 26 + b'a',
        52..=61 => i - 52 + b'0',
        62 => b'+',
        _ => b'/',
    }
}

fn verify_from_base64(ch: u8) -> FieldResult<u8> {
    let result = from_base64_digit(ch);

    if result > 63 {
        return Err(SchemaError::new("invalid character in base64 encoded string"));
    }

    Ok(result)
}

fn invalid_padding() -> SchemaError {
    SchemaError::new("invalid padding at the end of a base64 encoded string")
}

/// Converts a Base64-encoded string to a vector of bytes.
///
/// Accepts 0, 1 or 2 trailing pad characters. Fails on any byte outside the
/// alphabet, on an under-padded tail with non-zero low bits and on stray
/// bytes beyond two pads.
pub fn from_base64(encoded: &str) -> FieldResult<Vec<u8>> {
    let mut encoded = encoded.as_bytes();

    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    let mut result = Vec::with_capacity((encoded.len() + encoded.len() % 4) * 3 / 4);

    // First decode all of the full unpadded segments 24 bits at a time.
    while encoded.len() >= 4 && encoded[3] != PADDING {
        let segment = (u32::from(verify_from_base64(encoded[0])?) << 18)
            | (u32::from(verify_from_base64(encoded[1])?) << 12)
            | (u32::from(verify_from_base64(encoded[2])?) << 6)
            | u32::from(verify_from_base64(encoded[3])?);

        result.push(((segment & 0xFF0000) >> 16) as u8);
        result.push(((segment & 0xFF00) >> 8) as u8);
        result.push((segment & 0xFF) as u8);

        encoded = &encoded[4..];
    }

    // Get any leftover partial segment with 2 or 3 non-padding characters.
    if encoded.len() > 1 {
        let triplet = encoded.len() > 2 && encoded[2] != PADDING;
        let tail = if triplet {
            verify_from_base64(encoded[2])?
        } else {
            0
        };
        let segment = (u16::from(verify_from_base64(encoded[0])?) << 10)
            | (u16::from(verify_from_base64(encoded[1])?) << 4)
            | (u16::from(tail) >> 2);

        if triplet {
            if tail & 0x3 != 0 {
                return Err(invalid_padding());
            }

            result.push(((segment & 0xFF00) >> 8) as u8);
            result.push((segment & 0xFF) as u8);

            encoded = &encoded[3..];
        } else {
            if segment & 0xFF != 0 {
                return Err(invalid_padding());
            }

            result.push(((segment & 0xFF00) >> 8) as u8);

            encoded = &encoded[2..];
        }
    }

    // Make sure anything that's left is 0 - 2 characters of padding.
    if (!encoded.is_empty() && encoded[0] != PADDING)
        || (encoded.len() > 1 && encoded[1] != PADDING)
        || encoded.len() > 2
    {
        return Err(invalid_padding());
    }

    Ok(result)
}

/// Converts a set of bytes to Base64.
#[must_use]
pub fn to_base64(bytes: &[u8]) -> String {
    let mut bytes = bytes;

    if bytes.is_empty() {
        return String::new();
    }

    let mut result = Vec::with_capacity((bytes.len() + bytes.len() % 3) * 4 / 3);

    // First encode all of the full unpadded segments 24 bits at a time.
    while bytes.len() >= 3 {
        let segment =
            (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2]);

        result.extend([
            to_base64_digit(((segment & 0xFC0000) >> 18) as u8),
            to_base64_digit(((segment & 0x3F000) >> 12) as u8),
            to_base64_digit(((segment & 0xFC0) >> 6) as u8),
            to_base64_digit((segment & 0x3F) as u8),
        ]);

        bytes = &bytes[3..];
    }

    // Get any leftover partial segment with 1 or 2 bytes.
    if !bytes.is_empty() {
        let pair = bytes.len() > 1;
        let segment = (u16::from(bytes[0]) << 8) | if pair { u16::from(bytes[1]) } else { 0 };

        result.extend([
            to_base64_digit(((segment & 0xFC00) >> 10) as u8),
            to_base64_digit(((segment & 0x3F0) >> 4) as u8),
            if pair {
                to_base64_digit(((segment & 0xF) << 2) as u8)
            } else {
                PADDING
            },
            PADDING,
        ]);
    }

    // Every emitted digit is ASCII.
    result.into_iter().map(char::from).collect()
}
