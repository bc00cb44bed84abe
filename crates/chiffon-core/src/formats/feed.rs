//! Agent feed format.
//!
//! The browser driver reads `search_results` as a concatenation of product
//! blocks, each built from three primitive encodings:
//!
//! - sized string: a decimal byte-length line, then the content followed
//!   by `\n`;
//! - small strings array: a decimal count line, then one element per
//!   line;
//! - number: a bare decimal line.
//!
//! Each product block is the sized name, sized version, sized install
//! path, a strings array of feature names, and a number of trailing
//! sub-records. The demo registers plain products, so the feature array
//! is empty and the sub-record count is zero.
//!
//! Field validation guarantees no element contains a line break, so the
//! line-oriented encodings need no escaping.

use crate::ProductRecord;

/// Append a sized string: byte length line, content, terminator.
fn encode_sized_string(out: &mut String, value: &str) {
    out.push_str(&value.len().to_string());
    out.push('\n');
    out.push_str(value);
    out.push('\n');
}

/// Append a bare decimal number line.
fn encode_number(out: &mut String, value: usize) {
    out.push_str(&value.to_string());
    out.push('\n');
}

/// Encode a string array in the count-prefixed line format.
#[must_use]
pub fn encode_strings_array(items: &[&str]) -> String {
    let mut out = String::new();
    encode_number(&mut out, items.len());
    for item in items {
        out.push_str(item);
        out.push('\n');
    }
    out
}

/// Encode registered products as a feed of product blocks.
pub fn encode_product_feed<'a>(products: impl Iterator<Item = &'a ProductRecord>) -> String {
    let mut out = String::new();
    for record in products {
        encode_sized_string(&mut out, record.name.as_str());
        encode_sized_string(&mut out, record.version.as_str());
        encode_sized_string(&mut out, record.install_path_str());
        // No feature names and no sub-records for a plain registration
        out.push_str(&encode_strings_array(&[]));
        encode_number(&mut out, 0);
    }
    out
}

/// Decode a sized string, returning the remaining input and the value.
///
/// Returns `None` when the length line is malformed or the input is
/// shorter than announced.
#[must_use]
pub fn decode_sized_string(input: &str) -> Option<(&str, &str)> {
    let (length_line, rest) = input.split_once('\n')?;
    let length: usize = length_line.trim().parse().ok()?;
    let value = rest.get(..length)?;
    let rest = rest.get(length + 1..)?;
    Some((rest, value))
}

/// Decode a count-prefixed string array, returning the remaining input
/// and the elements.
///
/// Returns `None` when the count line is missing or malformed, or when
/// the input holds fewer elements than announced.
#[must_use]
pub fn decode_strings_array(input: &str) -> Option<(&str, Vec<String>)> {
    let (count_line, mut rest) = input.split_once('\n')?;
    let count: usize = count_line.trim().parse().ok()?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let (line, tail) = rest.split_once('\n')?;
        items.push(line.to_string());
        rest = tail;
    }
    Some((rest, items))
}

/// Decode a bare decimal number line, returning the remaining input and
/// the value.
#[must_use]
pub fn decode_number(input: &str) -> Option<(&str, usize)> {
    let (line, rest) = input.split_once('\n')?;
    let value: usize = line.trim().parse().ok()?;
    Some((rest, value))
}

/// A decoded product block from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub name: String,
    pub version: String,
    pub install_path: String,
    pub features: Vec<String>,
}

/// Decode a full product feed into entries.
///
/// Returns `None` on any malformed block.
#[must_use]
pub fn decode_product_feed(mut input: &str) -> Option<Vec<FeedEntry>> {
    let mut entries = Vec::new();
    while !input.trim().is_empty() {
        let (rest, name) = decode_sized_string(input)?;
        let (rest, version) = decode_sized_string(rest)?;
        let (rest, install_path) = decode_sized_string(rest)?;
        let (rest, features) = decode_strings_array(rest)?;
        let (rest, sub_records) = decode_number(rest)?;
        if sub_records != 0 {
            return None;
        }
        entries.push(FeedEntry {
            name: name.to_string(),
            version: version.to_string(),
            install_path: install_path.to_string(),
            features,
        });
        input = rest;
    }
    Some(entries)
}

// =============================================================================
// TESTS
// =============================================================================
