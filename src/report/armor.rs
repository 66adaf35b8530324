//! Reversible text-safe armor for the report payload.
//!
//! The structured report is serialized to JSON and wrapped in base64
//! between fixed marker lines, so the payload can sit verbatim inside a
//! larger text document (Markdown, email, ticket) without any escaping
//! hazards. Decoding reproduces the pre-armor bytes exactly.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const HEADER: &str = "-----BEGIN ADAUDIT REPORT-----";
const FOOTER: &str = "-----END ADAUDIT REPORT-----";

/// Line width of the base64 body.
const WRAP_COLUMNS: usize = 76;

/// Wrap a payload in armored form.
pub fn armor(payload: &[u8]) -> String {
    let encoded = STANDARD.encode(payload);

    let mut out = String::with_capacity(encoded.len() + encoded.len() / WRAP_COLUMNS + 64);
    out.push_str(HEADER);
    out.push('\n');
    // base64 output is ASCII, so byte chunking is safe
    for chunk in encoded.as_bytes().chunks(WRAP_COLUMNS) {
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    out.push_str(FOOTER);
    out.push('\n');

    out
}

/// Recover the original payload from armored text.
///
/// The text may be a whole document; everything outside the first
/// header/footer pair is ignored.
pub fn unarmor(text: &str) -> Result<Vec<u8>> {
    let mut body = String::new();
    let mut inside = false;
    let mut complete = false;

    for line in text.lines() {
        let line = line.trim();
        if !inside {
            if line == HEADER {
                inside = true;
            }
        } else if line == FOOTER {
            complete = true;
            break;
        } else {
            body.push_str(line);
        }
    }

    if !inside {
        bail!("no armored report header found");
    }
    if !complete {
        bail!("armored report footer missing");
    }

    STANDARD
        .decode(body.as_bytes())
        .context("armored report body is not valid base64")
}
