// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! §4.2 "Character reference expansion": the five named references and
//! the `&#x...;`/`&#...;` numeric forms.

use crate::char_class::is_forbidden;

/// The five named references this grammar recognizes — a fixed, closed
/// set (unlike HTML's few thousand), so a `phf` map costs nothing at
/// runtime to build and nothing to maintain.
static NAMED_REFS: phf::Map<&'static str, char> = phf::phf_map! {
    "lt" => '<',
    "amp" => '&',
    "gt" => '>',
    "quot" => '"',
    "apos" => '\'',
};

pub fn lookup_named(name: &str) -> Option<char> {
    NAMED_REFS.get(name).copied()
}

/// Result of resolving a character reference's digits/name to a code
/// point, before the `giveUp`/terminating-`;` check the tokenizer does
/// around this.
pub enum RefResolution {
    Ok(char),
    /// Numeric reference exceeded U+10FFFF.
    TooBig,
    /// Resolved to a forbidden code point (control or non-character).
    Forbidden,
    /// Named reference outside the five recognized names.
    UnknownName,
}

/// Resolve `&#xHEX;` / `&#DEC;` digits (already extracted, no `#`/`x`/`;`)
/// to a code point.
pub fn resolve_numeric(digits: &str, hex: bool) -> RefResolution {
    let radix = if hex { 16 } else { 10 };
    let value = match u32::from_str_radix(digits, radix) {
        Ok(v) => v,
        Err(_) => return RefResolution::TooBig,
    };
    if value > 0x10FFFF {
        return RefResolution::TooBig;
    }
    if is_forbidden(value) || (0xD800..=0xDFFF).contains(&value) {
        return RefResolution::Forbidden;
    }
    match char::from_u32(value) {
        Some(c) => RefResolution::Ok(c),
        None => RefResolution::Forbidden,
    }
}

/// Resolve a named reference.
pub fn resolve_named(name: &str) -> RefResolution {
    match lookup_named(name) {
        Some(c) => RefResolution::Ok(c),
        None => RefResolution::UnknownName,
    }
}
