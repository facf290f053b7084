//! Canonical string form of keys.
//!
//! A key is written as its path elements from the root down to the leaf,
//! separated by `/`. Each element is `<kind>:<id>`:
//!
//! - numeric ids are written in decimal without leading zeros
//! - names are written as `'` followed by the name
//! - the leaf of an incomplete key has nothing after the `:`
//!
//! Inside kinds and names the characters `%`, `/`, `:`, `'` and ASCII control
//! characters are escaped as `%XX` with upper-case hex digits. Every other
//! character is written as is.
//!
//! [`decode_key`] accepts exactly the strings [`encode_key`] produces, so the
//! two functions are inverse bijections.
//!
//! ```
//! use jabcom_codec::{decode_key, encode_key, Key, KeyId};
//!
//! let key = Key::from_id("Parent", 1)
//!     .unwrap()
//!     .child("Custody", KeyId::from("a/b"))
//!     .unwrap();
//! let encoded = encode_key(&key);
//! assert_eq!(encoded, "Parent:1/Custody:'a%2Fb");
//! assert_eq!(decode_key(&encoded).unwrap(), key);
//! ```

use crate::error::{KeyError, KeyResult};
use crate::key::{Key, KeyId, PathElement};

const PATH_SEPARATOR: char = '/';
const ID_SEPARATOR: char = ':';
const NAME_MARKER: char = '\'';
const ESCAPE: char = '%';
const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Encodes a key to its canonical string form.
#[must_use]
pub fn encode_key(key: &Key) -> String {
    let mut out = String::new();
    for element in key.ancestors() {
        push_escaped(&mut out, element.kind());
        out.push(ID_SEPARATOR);
        push_id(&mut out, element.id());
        out.push(PATH_SEPARATOR);
    }
    push_escaped(&mut out, key.kind());
    out.push(ID_SEPARATOR);
    if let Some(id) = key.id() {
        push_id(&mut out, id);
    }
    out
}

/// Decodes a key from its canonical string form.
///
/// # Errors
///
/// Returns [`KeyError::Malformed`] if `input` is not a string that
/// [`encode_key`] could have produced.
pub fn decode_key(input: &str) -> KeyResult<Key> {
    if input.is_empty() {
        return Err(KeyError::malformed(input, "empty key string"));
    }

    let segments: Vec<&str> = input.split(PATH_SEPARATOR).collect();
    let Some((leaf, ancestors)) = segments.split_last() else {
        return Err(KeyError::malformed(input, "empty key string"));
    };

    let mut path = Vec::with_capacity(ancestors.len());
    for segment in ancestors {
        let (kind, id) = parse_segment(input, segment)?;
        let id = id.ok_or_else(|| {
            KeyError::malformed(input, "only the last path element may omit its id")
        })?;
        let element = PathElement::new(kind, id)
            .map_err(|e| KeyError::malformed(input, e.to_string()))?;
        path.push(element);
    }

    let (kind, id) = parse_segment(input, leaf)?;
    Ok(Key::from_parts(path, kind, id))
}

fn parse_segment(input: &str, segment: &str) -> KeyResult<(String, Option<KeyId>)> {
    let (raw_kind, raw_id) = segment
        .split_once(ID_SEPARATOR)
        .ok_or_else(|| KeyError::malformed(input, format!("missing ':' in {segment:?}")))?;

    let kind = unescape(raw_kind).map_err(|reason| KeyError::malformed(input, reason))?;
    if kind.is_empty() {
        return Err(KeyError::malformed(input, "empty kind"));
    }

    if raw_id.is_empty() {
        return Ok((kind, None));
    }

    if let Some(raw_name) = raw_id.strip_prefix(NAME_MARKER) {
        let name = unescape(raw_name).map_err(|reason| KeyError::malformed(input, reason))?;
        if name.is_empty() {
            return Err(KeyError::malformed(input, "empty name"));
        }
        return Ok((kind, Some(KeyId::Name(name))));
    }

    if !raw_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(KeyError::malformed(
            input,
            format!("id {raw_id:?} is neither a number nor a name"),
        ));
    }
    if raw_id.starts_with('0') {
        return Err(KeyError::malformed(
            input,
            "numeric ids must be positive and have no leading zeros",
        ));
    }
    let id: u64 = raw_id
        .parse()
        .map_err(|_| KeyError::malformed(input, format!("id {raw_id} overflows 64 bits")))?;
    Ok((kind, Some(KeyId::Id(id))))
}

fn push_id(out: &mut String, id: &KeyId) {
    match id {
        KeyId::Id(id) => out.push_str(&id.to_string()),
        KeyId::Name(name) => {
            out.push(NAME_MARKER);
            push_escaped(out, name);
        }
    }
}

fn push_escaped(out: &mut String, component: &str) {
    for c in component.chars() {
        if needs_escape(c) {
            // Only ASCII characters are ever escaped.
            let byte = c as u8;
            out.push(ESCAPE);
            out.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
            out.push(char::from(HEX_DIGITS[usize::from(byte & 0x0f)]));
        } else {
            out.push(c);
        }
    }
}

fn unescape(raw: &str) -> Result<String, &'static str> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c == ESCAPE {
            let hi = chars.next().and_then(hex_value);
            let lo = chars.next().and_then(hex_value);
            let (Some(hi), Some(lo)) = (hi, lo) else {
                return Err("invalid escape sequence");
            };
            let decoded = char::from((hi << 4) | lo);
            if !needs_escape(decoded) {
                return Err("unnecessary escape sequence");
            }
            out.push(decoded);
        } else if needs_escape(c) {
            return Err("unescaped reserved character");
        } else {
            out.push(c);
        }
    }

    Ok(out)
}

fn needs_escape(c: char) -> bool {
    matches!(c, ESCAPE | PATH_SEPARATOR | ID_SEPARATOR | NAME_MARKER) || c.is_ascii_control()
}

fn hex_value(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'A'..='F' => Some(c as u8 - b'A' + 10),
        _ => None,
    }
}
