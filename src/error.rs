// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The diagnostic taxonomy (§7) and the two error surfaces (§C of SPEC_FULL.md):
//! `ParseError`, which the parser always reports and always recovers from, and
//! `Fatal`, which only exists because a caller's `ErrorSink` asked to stop early.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::position::Range;

/// The complete, enumerated error taxonomy (§7). Every diagnostic the
/// tokenizer or tree builder can raise is one of these.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IsolatedSurrogate,
    InvalidCodePoint,
    UnescapedLt,
    UnescapedGt,
    UnescapedAmp,
    RefCodePointTooBig,
    ForbiddenCodePointRef,
    UnknownCharName,
    MissingQuote,
    UnterminatedComment,
    DoubleMinusInComment,
    TextBeforeRoot,
    ContentAfterRoot,
    MissingEndTag,
    MismatchedEndTag,
    DuplicateAttribute,
    XmlnsAttribute,
    SpaceRequiredBeforeAttributeName,
    EofInStartTag,
    EmptyDocument,
}

impl ErrorKind {
    /// Short machine-readable name, matching the `§7` table's `Kind` column.
    pub fn name(&self) -> &'static str {
        use ErrorKind::*;
        match *self {
            IsolatedSurrogate => "ISOLATED_SURROGATE",
            InvalidCodePoint => "INVALID_CODE_POINT",
            UnescapedLt => "UNESCAPED_LT",
            UnescapedGt => "UNESCAPED_GT",
            UnescapedAmp => "UNESCAPED_AMP",
            RefCodePointTooBig => "REF_CODE_POINT_TOO_BIG",
            ForbiddenCodePointRef => "FORBIDDEN_CODE_POINT_REF",
            UnknownCharName => "UNKNOWN_CHAR_NAME",
            MissingQuote => "MISSING_QUOTE",
            UnterminatedComment => "UNTERMINATED_COMMENT",
            DoubleMinusInComment => "DOUBLE_MINUS_IN_COMMENT",
            TextBeforeRoot => "TEXT_BEFORE_ROOT",
            ContentAfterRoot => "CONTENT_AFTER_ROOT",
            MissingEndTag => "MISSING_END_TAG",
            MismatchedEndTag => "MISMATCHED_END_TAG",
            DuplicateAttribute => "DUPLICATE_ATTRIBUTE",
            XmlnsAttribute => "XMLNS_ATTRIBUTE",
            SpaceRequiredBeforeAttributeName => "SPACE_REQUIRED_BEFORE_ATTRIBUTE_NAME",
            EofInStartTag => "EOF_IN_START_TAG",
            EmptyDocument => "EMPTY_DOCUMENT",
        }
    }

    /// The human-readable message a default sink renders. `args` are
    /// plugged in positionally (name, code point, etc.) the way the
    /// teacher's `format_if!`-guarded messages do.
    fn describe(&self, args: &[String]) -> String {
        use ErrorKind::*;
        match *self {
            IsolatedSurrogate => "isolated surrogate code unit, replaced with U+FFFD".into(),
            InvalidCodePoint => "forbidden code point in input, replaced with U+FFFD".into(),
            UnescapedLt => "unescaped \"<\"".into(),
            UnescapedGt => "unescaped \">\"".into(),
            UnescapedAmp => "unescaped \"&\"".into(),
            RefCodePointTooBig => "character reference resolves to a code point above U+10FFFF"
                .into(),
            ForbiddenCodePointRef => {
                "character reference resolves to a forbidden code point".into()
            }
            UnknownCharName => format!(
                "unknown character reference name {:?}",
                args.first().map(String::as_str).unwrap_or("")
            ),
            MissingQuote => "attribute value is missing its closing quote".into(),
            UnterminatedComment => "comment was never terminated with \"-->\"".into(),
            DoubleMinusInComment => "\"--\" is not allowed inside a comment".into(),
            TextBeforeRoot => "non-whitespace text before the root element".into(),
            ContentAfterRoot => "content after the root element has closed".into(),
            MissingEndTag => format!(
                "missing end tag for <{}>",
                args.first().map(String::as_str).unwrap_or("")
            ),
            MismatchedEndTag => format!(
                "end tag </{}> does not match any open element",
                args.first().map(String::as_str).unwrap_or("")
            ),
            DuplicateAttribute => format!(
                "duplicate attribute {:?}",
                args.first().map(String::as_str).unwrap_or("")
            ),
            XmlnsAttribute => "\"xmlns\" is not a permitted attribute name".into(),
            SpaceRequiredBeforeAttributeName => {
                "whitespace is required before an attribute name".into()
            }
            EofInStartTag => "end of input inside an unclosed start tag".into(),
            EmptyDocument => "input produced no root element".into(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One diagnostic: a range in the source, a kind, and whatever positional
/// arguments `describe` needs to render a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub range: Range,
    pub kind: ErrorKind,
    args: Vec<String>,
}

impl ParseError {
    pub fn new(range: Range, kind: ErrorKind) -> Self {
        ParseError {
            range,
            kind,
            args: Vec::new(),
        }
    }

    pub fn with_arg(range: Range, kind: ErrorKind, arg: impl Into<String>) -> Self {
        ParseError {
            range,
            kind,
            args: vec![arg.into()],
        }
    }

    pub fn message(&self) -> String {
        self.kind.describe(&self.args)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.range, self.message())
    }
}

impl std::error::Error for ParseError {}

/// Returned from `parse` only when an `ErrorSink` escalates a diagnostic.
/// Recovery never fails on its own; this exists solely to let a caller's
/// sink cut a parse short.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse aborted: {0}")]
pub struct Fatal(pub ParseError);

/// Receives diagnostics as the parser produces them, in source order, one
/// call per error (§5: "Error reports for a token are delivered before the
/// next token"). Returning `true` escalates the diagnostic to fatal and
/// aborts the parse; the parser guarantees no further tokens are processed
/// afterward, but makes no promise about the state of the tree already built.
pub trait ErrorSink {
    fn report(&mut self, error: ParseError) -> bool;
}

/// Default sink: collects every diagnostic, never escalates. This is the
/// sink that makes "totality" (§8) observable — every input produces a
/// tree and a (possibly empty) diagnostic list, never an abort.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub errors: Vec<ParseError>,
}

impl ErrorSink for CollectingSink {
    fn report(&mut self, error: ParseError) -> bool {
        self.errors.push(error);
        false
    }
}

/// A sink that escalates the first diagnostic it sees to fatal, after
/// recording it. Useful for callers who want strict "fail on first error"
/// behavior instead of best-effort recovery.
#[derive(Debug, Default)]
pub struct FirstErrorFatal {
    pub error: Option<ParseError>,
}

impl ErrorSink for FirstErrorFatal {
    fn report(&mut self, error: ParseError) -> bool {
        if self.error.is_none() {
            self.error = Some(error);
        }
        true
    }
}

/// A sink that silently drops every diagnostic it sees except the ones
/// listed in `suppressed`; wraps an inner sink. Used by `ParserOptions`
/// to implement `suppressed_errors` without touching the tokenizer or
/// builder's recovery logic.
pub struct SuppressingSink<'a> {
    pub inner: &'a mut dyn ErrorSink,
    pub suppressed: HashSet<ErrorKind>,
}

impl<'a> ErrorSink for SuppressingSink<'a> {
    fn report(&mut self, error: ParseError) -> bool {
        if self.suppressed.contains(&error.kind) {
            return false;
        }
        self.inner.report(error)
    }
}
