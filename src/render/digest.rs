// src/render/digest.rs

//! Order-independent schedule fingerprint.
//!
//! The hashed text is single-line JSON with `", "` and `": "` separators,
//! keys sorted at every level and non-ASCII characters written as lowercase
//! `\uXXXX` escapes, the format previously recorded digests were taken over.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::Schedule;

/// Lowercase hex SHA-256 of the schedule's sorted-key JSON.
pub fn digest(schedule: &Schedule) -> Result<String> {
    // `serde_json::Map` is ordered by key, so converting sorts every level.
    let value = serde_json::to_value(schedule)?;

    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
    value.serialize(&mut serializer)?;
    Ok(hex::encode(Sha256::digest(&buf)))
}

/// Single-line JSON with spaced separators and ASCII-only strings.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        for c in fragment.chars() {
            if c.is_ascii() && c != '\x7f' {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}
