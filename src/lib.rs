// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A recovering parser for a restricted, XML-like markup language: it
//! always produces a well-formed element tree, reporting diagnostics
//! along the way rather than failing structurally (§8 "totality").
//!
//! ```
//! let outcome = microxml::parse("<a x=\"1\">hi</a>", microxml::ParserOptions::default());
//! let outcome = outcome.expect("default options never escalate to fatal");
//! let root = outcome.root.expect("non-empty input always produces a root");
//! assert_eq!(root.name(), "a");
//! assert!(outcome.errors.is_empty());
//! ```

pub mod char_class;
pub mod decode;
pub mod error;
pub mod position;
pub mod serialize;
pub mod tokenizer;
pub mod tree;
pub mod tree_builder;

use std::collections::HashSet;

use log::debug;

use error::{CollectingSink, ErrorKind, ErrorSink, Fatal, ParseError};
use position::PositionMap;
use tokenizer::Tokenizer;
use tree::Element;
use tree_builder::TreeBuilder;

/// Knobs for a single `parse` call (§D of SPEC_FULL.md). Merges the
/// teacher's separate tokenizer/tree-builder option structs into one,
/// since this grammar has no fragment-parsing or scripting modes that
/// would need to configure them independently.
pub struct ParserOptions {
    /// Consulted, after suppression, for every diagnostic's escalation
    /// decision. `ParseOutcome::errors` is always populated from the full,
    /// non-suppressed diagnostic stream regardless of what this sink does
    /// with it — it exists to let a caller say "stop early", not to gate
    /// whether diagnostics are visible afterward. Defaults to a
    /// `CollectingSink`, which never escalates — the default parse never
    /// returns `Err`.
    pub error_sink: Box<dyn ErrorSink>,
    /// Attached to nothing inside the parser itself; callers that track
    /// multiple sources (batch tooling, error reporters) can stash it
    /// here instead of threading it through separately.
    pub source_url: Option<String>,
    /// Diagnostic kinds that are dropped before reaching `error_sink`.
    pub suppressed_errors: HashSet<ErrorKind>,
    /// Strip a leading U+FEFF before tokenizing. Ambient input-handling,
    /// not a named grammar feature — the teacher does this unconditionally
    /// and correctly, so the default here is `true`.
    pub discard_bom: bool,
    /// Track the §4.4 text-map back-channel. Disabling this saves the
    /// bookkeeping for callers who only want `Element::text`, not
    /// `Element::text_location`.
    pub track_text_map: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            error_sink: Box::new(CollectingSink::default()),
            source_url: None,
            suppressed_errors: HashSet::new(),
            discard_bom: true,
            track_text_map: true,
        }
    }
}

impl ParserOptions {
    pub fn with_error_sink(mut self, sink: Box<dyn ErrorSink>) -> Self {
        self.error_sink = sink;
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_suppressed_errors(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.suppressed_errors = kinds.into_iter().collect();
        self
    }

    pub fn with_discard_bom(mut self, discard: bool) -> Self {
        self.discard_bom = discard;
        self
    }
}

/// The result of a successful parse: the tree (`None` only for
/// `EMPTY_DOCUMENT`), every non-suppressed diagnostic collected along the
/// way, and the position map needed to turn any `Range` in the tree or in
/// `errors` into a `LineCol`.
pub struct ParseOutcome {
    pub root: Option<Element>,
    pub errors: Vec<ParseError>,
    pub positions: PositionMap,
}

/// Parse `input` to completion. Recovery never fails on its own (§8); the
/// only way this returns `Err` is `options.error_sink` escalating a
/// diagnostic to fatal, in which case tokenization and tree building stop
/// at that point and whatever tree had been built so far is discarded —
/// the spec makes no promise about a partially built tree's shape.
pub fn parse(input: &str, options: ParserOptions) -> Result<ParseOutcome, Fatal> {
    let ParserOptions {
        error_sink,
        source_url,
        suppressed_errors,
        discard_bom,
        track_text_map,
    } = options;

    debug!(
        "starting parse of {} code points{}",
        input.chars().count(),
        source_url
            .as_deref()
            .map(|u| format!(" ({u})"))
            .unwrap_or_default()
    );

    let (root, positions, errors, fatal_report) = {
        let mut gate = EscalateThrough {
            collected: CollectingSink::default(),
            upstream: error_sink,
            suppressed: suppressed_errors,
            fatal: None,
        };
        let mut builder = TreeBuilder::with_text_map_tracking(&mut gate, track_text_map);
        let code_points: Vec<u32> = input.chars().map(|c| c as u32).collect();
        let tokenizer = Tokenizer::new(&mut builder, code_points, discard_bom);
        let positions = tokenizer.run();
        let root = builder.into_root();
        (root, positions, gate.collected.errors, gate.fatal)
    };

    if let Some(error) = fatal_report {
        debug!("parse aborted: {}", error);
        return Err(Fatal(error));
    }

    debug!(
        "parse finished: root = {}, {} diagnostics",
        root.is_some(),
        errors.len()
    );
    Ok(ParseOutcome {
        root,
        errors,
        positions,
    })
}

/// Applies `suppressed_errors`, always collects the surviving diagnostics
/// for `ParseOutcome::errors`, and separately consults the caller's
/// `error_sink` purely for the escalate/continue decision.
struct EscalateThrough {
    collected: CollectingSink,
    upstream: Box<dyn ErrorSink>,
    suppressed: HashSet<ErrorKind>,
    fatal: Option<ParseError>,
}

impl ErrorSink for EscalateThrough {
    fn report(&mut self, error: ParseError) -> bool {
        if self.suppressed.contains(&error.kind) {
            return false;
        }
        self.collected.errors.push(error.clone());
        if self.upstream.report(error.clone()) {
            if self.fatal.is_none() {
                self.fatal = Some(error);
            }
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FirstErrorFatal;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_options_never_fail() {
        let outcome = parse("<a>hi</a>", ParserOptions::default()).unwrap();
        assert_eq!(outcome.root.unwrap().name(), "a");
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn empty_document_reports_but_does_not_fail() {
        let outcome = parse("", ParserOptions::default()).unwrap();
        assert!(outcome.root.is_none());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, ErrorKind::EmptyDocument);
    }

    #[test]
    fn suppressed_errors_are_dropped() {
        let opts = ParserOptions::default().with_suppressed_errors([ErrorKind::UnescapedLt]);
        let outcome = parse("<a>1<2</a>", opts).unwrap();
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn escalating_sink_turns_first_error_into_fatal() {
        let opts =
            ParserOptions::default().with_error_sink(Box::new(FirstErrorFatal::default()));
        let result = parse("<a>1<2</a>", opts);
        assert!(result.is_err());
    }
}
