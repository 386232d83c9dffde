// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! §4.3: the open-element stack and the abstract-token → tree transition
//! table, plus the "most recent matching" end-tag recovery algorithm.

use string_cache::DefaultAtom as Atom;

use crate::char_class::is_whitespace;
use crate::error::{ErrorKind, ErrorSink, ParseError};
use crate::position::{Offset, Range};
use crate::tokenizer::TokenSink;
use crate::tree::{AttributeSet, Element};

struct PendingTag {
    start_pos: Offset,
    name: Atom,
    attrs: AttributeSet,
}

struct PendingAttr {
    pos: Offset,
    name: Atom,
    value: String,
}

/// Builds the element tree from an abstract-token stream, reporting
/// through an `ErrorSink` rather than collecting errors itself — unlike
/// the tokenizer's `Recorder`-style test sink, the real sink lives for as
/// long as the caller's `parse` call, not just this builder.
pub struct TreeBuilder<'sink> {
    error_sink: &'sink mut dyn ErrorSink,
    /// Elements that have been opened but not yet closed, outermost first.
    stack: Vec<Element>,
    root: Option<Element>,
    pending_tag: Option<PendingTag>,
    pending_attr: Option<PendingAttr>,
    fatal: bool,
    track_text_map: bool,
}

impl<'sink> TreeBuilder<'sink> {
    pub fn new(error_sink: &'sink mut dyn ErrorSink) -> Self {
        Self::with_text_map_tracking(error_sink, true)
    }

    /// `track_text_map: false` skips §4.4's text-map bookkeeping (every
    /// text chunk still builds; `Element::text_location` just always
    /// reports a 1:1 mapping from `chunk`'s base offset).
    pub fn with_text_map_tracking(error_sink: &'sink mut dyn ErrorSink, track_text_map: bool) -> Self {
        TreeBuilder {
            error_sink,
            stack: Vec::new(),
            root: None,
            pending_tag: None,
            pending_attr: None,
            fatal: false,
            track_text_map,
        }
    }

    /// Consume the builder and hand back the finished tree, if any
    /// (`None` only for `EMPTY_DOCUMENT`, per §8).
    pub fn into_root(self) -> Option<Element> {
        self.root
    }

    fn report_error(&mut self, err: ParseError) {
        if self.error_sink.report(err) {
            self.fatal = true;
        }
    }

    fn emit(&mut self, range: Range, kind: ErrorKind) {
        self.report_error(ParseError::new(range, kind));
    }

    fn emit_with_arg(&mut self, range: Range, kind: ErrorKind, arg: impl Into<String>) {
        self.report_error(ParseError::with_arg(range, kind, arg));
    }

    /// Finish a pending attribute (if any): check for `xmlns` and
    /// duplicates, then fold it into the tag currently being opened.
    fn commit_pending_attr(&mut self) {
        let attr = match self.pending_attr.take() {
            Some(a) => a,
            None => return,
        };
        if &*attr.name == "xmlns" {
            self.emit(Range::point(attr.pos), ErrorKind::XmlnsAttribute);
            return;
        }
        let tag = self
            .pending_tag
            .as_mut()
            .expect("attribute_name seen outside an open start tag");
        let inserted = tag.attrs.insert(attr.name.clone(), attr.value);
        if !inserted {
            self.emit_with_arg(
                Range::point(attr.pos),
                ErrorKind::DuplicateAttribute,
                attr.name.to_string(),
            );
        }
    }

    /// Append `element` to whatever is currently open, or settle it as
    /// the document root. A second root-level element (after the first
    /// has already closed) is silently dropped here — its `CONTENT_AFTER_ROOT`
    /// diagnostic was already reported when its start tag opened, and
    /// §9's single-owner tree has no second slot to hold it.
    fn attach(&mut self, element: Element, next_chunk_base: Offset) {
        match self.stack.last_mut() {
            Some(parent) => parent.push_child(element, next_chunk_base),
            None => {
                if self.root.is_none() {
                    self.root = Some(element);
                }
            }
        }
    }
}

impl<'sink> TokenSink for TreeBuilder<'sink> {
    fn start_tag_open(&mut self, pos: Offset, name: Atom) {
        if self.stack.is_empty() && self.root.is_some() {
            self.emit(Range::point(pos), ErrorKind::ContentAfterRoot);
        }
        self.pending_attr = None;
        self.pending_tag = Some(PendingTag {
            start_pos: pos,
            name,
            attrs: AttributeSet::new(),
        });
    }

    fn attribute_name(&mut self, pos: Offset, name: Atom) {
        self.commit_pending_attr();
        self.pending_attr = Some(PendingAttr {
            pos,
            name,
            value: String::new(),
        });
    }

    fn data_char(&mut self, pos: Offset, src_len: usize, c: char) {
        if let Some(attr) = self.pending_attr.as_mut() {
            attr.value.push(c);
            return;
        }
        match self.stack.last_mut() {
            Some(top) => {
                top.current_text_mut().push(c);
                if !self.track_text_map {
                    return;
                }
                if src_len == 1 {
                    top.current_text_map_mut().push_direct(1);
                } else {
                    top.current_text_map_mut().push_reference(src_len);
                }
            }
            None if self.root.is_none() => {
                if is_whitespace(c) {
                    return;
                }
                self.emit(Range::point(pos), ErrorKind::TextBeforeRoot);
            }
            None => {
                self.emit(Range::point(pos), ErrorKind::ContentAfterRoot);
            }
        }
    }

    fn start_tag_close(&mut self, pos: Offset) {
        self.commit_pending_attr();
        let tag = self
            .pending_tag
            .take()
            .expect("start_tag_close without a matching start_tag_open");
        let mut element = Element::new(tag.name, pos + 1);
        *element.attributes_mut() = tag.attrs;
        element.set_start_tag_range(Range::new(tag.start_pos, pos + 1));
        self.stack.push(element);
    }

    fn empty_element_tag_close(&mut self, pos: Offset) {
        self.commit_pending_attr();
        let tag = self
            .pending_tag
            .take()
            .expect("empty_element_tag_close without a matching start_tag_open");
        let mut element = Element::new(tag.name, pos + 2);
        *element.attributes_mut() = tag.attrs;
        let range = Range::new(tag.start_pos, pos + 2);
        element.set_start_tag_range(range);
        element.set_end_tag_range(range);
        self.attach(element, pos + 2);
    }

    fn end_tag(&mut self, start_pos: Offset, end_pos: Offset, name: Atom) {
        let depth = self.stack.iter().rposition(|e| e.name() == &*name);
        let idx = match depth {
            Some(idx) => idx,
            None => {
                self.emit_with_arg(
                    Range::point(start_pos),
                    ErrorKind::MismatchedEndTag,
                    name.to_string(),
                );
                return;
            }
        };
        while self.stack.len() > idx + 1 {
            let unclosed = self.stack.pop().expect("loop guard ensures an element exists");
            let unclosed_name = unclosed.name().to_string();
            self.emit_with_arg(Range::point(start_pos), ErrorKind::MissingEndTag, unclosed_name);
            self.attach(unclosed, start_pos);
        }
        let mut matched = self.stack.pop().expect("idx was found in the stack above");
        matched.set_end_tag_range(Range::new(start_pos, end_pos));
        self.attach(matched, end_pos);
    }

    fn end(&mut self, pos: Offset) {
        while let Some(unclosed) = self.stack.pop() {
            let name = unclosed.name().to_string();
            self.emit_with_arg(Range::point(pos), ErrorKind::MissingEndTag, name);
            self.attach(unclosed, pos);
        }
        if self.root.is_none() {
            self.emit(Range::point(pos), ErrorKind::EmptyDocument);
        }
    }

    fn error(&mut self, error: ParseError) {
        self.report_error(error);
    }

    fn comment_skipped(&mut self, _pos: Offset, len: usize) {
        if !self.track_text_map {
            return;
        }
        if let Some(top) = self.stack.last_mut() {
            top.current_text_map_mut().push_markup_skip(len);
        }
    }

    fn should_stop(&self) -> bool {
        self.fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectingSink;
    use crate::tokenizer::Tokenizer;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> (Option<Element>, Vec<ParseError>) {
        let mut sink = CollectingSink::default();
        let cps: Vec<u32> = input.chars().map(|c| c as u32).collect();
        let root = {
            let mut builder = TreeBuilder::new(&mut sink);
            let tok = Tokenizer::new(&mut builder, cps, true);
            tok.run();
            builder.into_root()
        };
        (root, sink.errors)
    }

    #[test]
    fn simple_tree_with_no_errors() {
        let (root, errors) = parse("<a x=\"1\"><b/>hi</a>");
        assert!(errors.is_empty());
        let root = root.unwrap();
        assert_eq!(root.name(), "a");
        assert_eq!(root.attributes().get("x"), Some("1"));
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].name(), "b");
        assert_eq!(root.text(0), "");
        assert_eq!(root.text(1), "hi");
    }

    #[test]
    fn missing_end_tag_auto_closes_ancestors() {
        let (root, errors) = parse("<a><b><c>x</a>");
        let root = root.unwrap();
        assert_eq!(root.name(), "a");
        assert_eq!(root.children()[0].name(), "b");
        assert_eq!(root.children()[0].children()[0].name(), "c");
        assert_eq!(
            errors.iter().map(|e| e.kind).collect::<Vec<_>>(),
            vec![ErrorKind::MissingEndTag, ErrorKind::MissingEndTag]
        );
    }

    #[test]
    fn mismatched_end_tag_is_reported_and_ignored() {
        let (root, errors) = parse("<a>x</b>y</a>");
        let root = root.unwrap();
        assert_eq!(root.text(0), "xy");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MismatchedEndTag);
    }

    #[test]
    fn duplicate_attribute_keeps_first_value() {
        let (root, errors) = parse("<a x=\"1\" x=\"2\"></a>");
        let root = root.unwrap();
        assert_eq!(root.attributes().get("x"), Some("1"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::DuplicateAttribute);
    }

    #[test]
    fn xmlns_attribute_is_rejected() {
        let (root, errors) = parse("<a xmlns=\"urn:x\"></a>");
        let root = root.unwrap();
        assert!(root.attributes().get("xmlns").is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::XmlnsAttribute);
    }

    #[test]
    fn empty_input_is_empty_document() {
        let (root, errors) = parse("");
        assert!(root.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::EmptyDocument);
    }

    #[test]
    fn nonwhitespace_text_before_root_is_reported() {
        let (root, errors) = parse("  hi <a/>");
        assert!(root.is_some());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::TextBeforeRoot);
    }

    #[test]
    fn content_after_root_is_reported() {
        let (root, errors) = parse("<a/>tail");
        assert!(root.is_some());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::ContentAfterRoot);
    }

    #[test]
    fn whitespace_only_content_after_root_is_still_reported() {
        let (root, errors) = parse("<a/>\n");
        assert!(root.is_some());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::ContentAfterRoot);
    }

    #[test]
    fn comment_extends_text_map_with_a_markup_skip() {
        let (root, _) = parse("<a>x<!--c-->y</a>");
        let root = root.unwrap();
        assert_eq!(root.text(0), "xy");
        // 'y' sits right after the 8-code-unit "<!--c-->" comment.
        assert_eq!(root.text_location(0, 1, 2), Range::new(12, 13));
    }
}
