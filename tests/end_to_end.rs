// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! §8's six numbered end-to-end scenarios, plus the boundary laws and
//! quantified properties, driven entirely through the public `parse`
//! entry point rather than the tokenizer/builder directly.

use microxml::error::ErrorKind;
use microxml::serialize::serialize;
use microxml::{parse, ParserOptions};
use pretty_assertions::assert_eq;

fn kinds(errors: &[microxml::error::ParseError]) -> Vec<ErrorKind> {
    errors.iter().map(|e| e.kind).collect()
}

#[test]
fn scenario_1_happy_path() {
    let outcome = parse(r#"<a x="1"><b/>hi</a>"#, ParserOptions::default()).unwrap();
    let root = outcome.root.unwrap();
    assert_eq!(root.name(), "a");
    assert_eq!(root.attributes().get("x"), Some("1"));
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.children()[0].name(), "b");
    assert!(root.children()[0].children().is_empty());
    assert_eq!(root.text(1), "hi");
    assert!(outcome.errors.is_empty());
}

#[test]
fn scenario_2_implicit_close() {
    let outcome = parse("<a><b><c></a>", ParserOptions::default()).unwrap();
    let root = outcome.root.unwrap();
    assert_eq!(root.name(), "a");
    let b = &root.children()[0];
    assert_eq!(b.name(), "b");
    let c = &b.children()[0];
    assert_eq!(c.name(), "c");
    assert!(c.children().is_empty());
    assert_eq!(
        kinds(&outcome.errors),
        vec![ErrorKind::MissingEndTag, ErrorKind::MissingEndTag]
    );
}

#[test]
fn scenario_3_stray_end_tag() {
    let outcome = parse("<a></b></a>", ParserOptions::default()).unwrap();
    let root = outcome.root.unwrap();
    assert_eq!(root.name(), "a");
    assert!(root.children().is_empty());
    assert_eq!(root.text(0), "");
    assert_eq!(kinds(&outcome.errors), vec![ErrorKind::MismatchedEndTag]);
}

#[test]
fn scenario_4_bare_lt_as_text() {
    let outcome = parse("<a>1<2</a>", ParserOptions::default()).unwrap();
    let root = outcome.root.unwrap();
    assert_eq!(root.text(0), "1<2");
    assert_eq!(kinds(&outcome.errors), vec![ErrorKind::UnescapedLt]);
}

#[test]
fn scenario_5_duplicate_attribute() {
    let outcome = parse(r#"<a x="1" x="2"/>"#, ParserOptions::default()).unwrap();
    let root = outcome.root.unwrap();
    assert_eq!(root.attributes().get("x"), Some("1"));
    assert_eq!(kinds(&outcome.errors), vec![ErrorKind::DuplicateAttribute]);
}

#[test]
fn scenario_6_numeric_reference() {
    let outcome = parse("<a>&#x41;&#x110000;</a>", ParserOptions::default()).unwrap();
    let root = outcome.root.unwrap();
    assert_eq!(root.text(0), "A\u{FFFD}");
    assert_eq!(kinds(&outcome.errors), vec![ErrorKind::RefCodePointTooBig]);
}

#[test]
fn empty_string_yields_no_root_and_empty_document() {
    let outcome = parse("", ParserOptions::default()).unwrap();
    assert!(outcome.root.is_none());
    assert_eq!(kinds(&outcome.errors), vec![ErrorKind::EmptyDocument]);
}

#[test]
fn single_complete_empty_element_has_no_diagnostics() {
    let outcome = parse("<a></a>", ParserOptions::default()).unwrap();
    assert!(outcome.root.is_some());
    assert!(outcome.errors.is_empty());
}

#[test]
fn isolated_lt_followed_by_non_name_start_is_one_diagnostic() {
    let outcome = parse("a < b", ParserOptions::default()).unwrap();
    // The '<' is reparsed as data; this also makes the whole thing text
    // before any root element opens, so TEXT_BEFORE_ROOT also fires — the
    // boundary law only promises UNESCAPED_LT appears exactly once.
    assert_eq!(
        outcome.errors.iter().filter(|e| e.kind == ErrorKind::UnescapedLt).count(),
        1
    );
}

#[test]
fn plain_data_with_no_markup_is_a_single_text_chunk() {
    let outcome = parse("<a>just plain text, nothing special</a>", ParserOptions::default()).unwrap();
    let root = outcome.root.unwrap();
    assert_eq!(root.text(0), "just plain text, nothing special");
    assert!(outcome.errors.is_empty());
}

#[test]
fn well_formed_input_round_trips_through_serialize() {
    let input = r#"<a x="1"><b/>hi</a>"#;
    let outcome = parse(input, ParserOptions::default()).unwrap();
    assert!(outcome.errors.is_empty());
    let root = outcome.root.unwrap();
    assert_eq!(serialize(&root, false), input);
}

#[test]
fn canonicalization_is_idempotent() {
    let outcome = parse(r#"<a z="1" m="2" a="3"/>"#, ParserOptions::default()).unwrap();
    let root = outcome.root.unwrap();
    let once = serialize(&root, true);

    let reparsed = parse(&once, ParserOptions::default()).unwrap();
    let twice = serialize(&reparsed.root.unwrap(), true);

    assert_eq!(once, twice);
}

#[test]
fn attribute_names_are_pairwise_distinct_in_every_parsed_element() {
    let outcome = parse(r#"<a x="1" x="2" y="3" y="4"/>"#, ParserOptions::default()).unwrap();
    let root = outcome.root.unwrap();
    let names: Vec<&str> = root.attributes().iter().map(|(n, _)| n).collect();
    let mut sorted = names.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(names.len(), sorted.len());
}

#[test]
fn position_ranges_are_non_decreasing_across_errors() {
    let outcome = parse("<a>1<2<3&bad(</a>", ParserOptions::default()).unwrap();
    let mut last = 0;
    for error in &outcome.errors {
        assert!(error.range.start >= last);
        last = error.range.start;
    }
}
