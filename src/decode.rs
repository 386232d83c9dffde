// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! §6: "when the source is bytes, UTF-8 decoding is assumed". `parse`
//! itself only takes `&str`, so this is a small convenience for callers
//! who start from raw bytes — the `demos` binary and the integration
//! tests, not the core parsing path.

/// Decode `bytes` as UTF-8, stripping a leading BOM (U+FEFF) if present.
/// Invalid UTF-8 is replaced with U+FFFD per `String::from_utf8_lossy`,
/// matching the tokenizer's own "never fail, substitute and report"
/// posture for invalid input.
pub fn decode_utf8(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_leading_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"<a/>");
        assert_eq!(decode_utf8(&bytes), "<a/>");
    }

    #[test]
    fn invalid_utf8_becomes_replacement_characters() {
        let decoded = decode_utf8(&[b'a', 0xFF, b'b']);
        assert_eq!(decoded, "a\u{FFFD}b");
    }

    #[test]
    fn plain_ascii_is_unchanged() {
        assert_eq!(decode_utf8(b"<a>hi</a>"), "<a>hi</a>");
    }
}
