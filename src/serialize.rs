// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! §6 names a serializer as "required for round-trip testing", not as a
//! core module — §8's round-trip and canonicalization-idempotence
//! properties need *something* to turn a tree back into text. This is
//! that something: escaping, the `<n/>` empty-element form, and a
//! `canonical` flag that sorts attributes by name so two trees that
//! differ only in attribute order serialize identically.

use crate::tree::Element;

/// Serialize `root` to text. With `canonical: true`, attributes are
/// written in name order rather than source/insertion order.
pub fn serialize(root: &Element, canonical: bool) -> String {
    let mut out = String::new();
    write_element(root, canonical, &mut out);
    out
}

fn write_element(el: &Element, canonical: bool, out: &mut String) {
    out.push('<');
    out.push_str(el.name());

    if canonical {
        let mut attrs: Vec<(&str, &str)> = el.attributes().iter().collect();
        attrs.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in attrs {
            write_attribute(name, value, out);
        }
    } else {
        for (name, value) in el.attributes().iter() {
            write_attribute(name, value, out);
        }
    }

    let is_empty = el.children().is_empty() && el.text(0).is_empty();
    if is_empty {
        out.push_str("/>");
        return;
    }
    out.push('>');

    out.push_str(&escape_text(el.text(0)));
    for (i, child) in el.children().iter().enumerate() {
        write_element(child, canonical, out);
        out.push_str(&escape_text(el.text(i + 1)));
    }

    out.push_str("</");
    out.push_str(el.name());
    out.push('>');
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attribute_value(value));
    out.push('"');
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
