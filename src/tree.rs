// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! §3 / §4.4: the element tree and its position back-channel.
//!
//! This is a strictly owned tree (`Element` owns its `children` directly,
//! the way the teacher's final `owned_dom::Node` does once parsing
//! completes) rather than an arena of handles. Ownership alone rules out
//! cycles (§9's "cyclic graph concern" getRoot check), so there is no
//! runtime check to write: the type system is the check. For the same
//! reason a parsed `Element` carries no parent back-pointer ("exclusive
//! ownership by parent" already implies there is exactly one path back to
//! the root, and the teacher's own `Node` reaches the same conclusion with
//! its `_parent_not_accessible` field). `index_in_parent` is likewise not
//! stored — it is just the element's position in its parent's `children`.

use std::fmt;

use string_cache::DefaultAtom as Atom;

use crate::position::{Offset, Range};

/// An ordered, duplicate-free set of attributes. Small-vector-backed per
/// §9's design note: elements rarely carry more than a handful of
/// attributes, so a linear scan on insert is cheaper in practice than a
/// hash table, and insertion order falls out for free.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeSet {
    items: Vec<(Atom, String)>,
}

impl AttributeSet {
    pub fn new() -> Self {
        AttributeSet { items: Vec::new() }
    }

    /// Insert `(name, value)`. Returns `false` without modifying the set
    /// if `name` is already present (§3 invariant 4; the tree builder is
    /// responsible for reporting `DUPLICATE_ATTRIBUTE` when this happens).
    pub fn insert(&mut self, name: Atom, value: String) -> bool {
        if self.items.iter().any(|(n, _)| *n == name) {
            return false;
        }
        self.items.push((name, value));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|(n, _)| &**n == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(n, v)| (&**n, v.as_str()))
    }
}

/// One segment of a `TextMap`: how a run of the text buffer corresponds
/// to the source. Segments appear in buffer order and their `Direct`
/// lengths plus one-output-character-each `Reference`s sum to the
/// buffer's length; `MarkupSkip` segments consume no buffer output.
///
/// The original taxonomy (§4.4) also names a "surrogate-pair" flag for
/// references whose expansion spans two UTF-16 code units. Rust's `char`
/// is a full Unicode scalar value, so every expansion — astral plane or
/// not — is exactly one output `char` here; that flag collapses into
/// `Reference` and is not represented separately (see DESIGN.md).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextMapSegment {
    /// `len` consecutive output characters, each occupying exactly one
    /// source code unit (the common case; no bookkeeping needed).
    Direct { len: usize },
    /// One output character produced by expanding a character reference
    /// spanning `src_len` source code units.
    Reference { src_len: usize },
    /// `src_len` source code units of skipped markup (a comment) with no
    /// corresponding output character, sitting between the previous and
    /// next output character.
    MarkupSkip { src_len: usize },
}

/// Auxiliary data recording how a text chunk's buffer offsets correspond
/// to source offsets, so that `Element::text_location` gives an accurate
/// answer even through character-reference expansion and skipped
/// comments. An empty `TextMap` means 1:1 correspondence starting at
/// `base`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextMap {
    base: Offset,
    segments: Vec<TextMapSegment>,
}

impl TextMap {
    pub fn new(base: Offset) -> Self {
        TextMap {
            base,
            segments: Vec::new(),
        }
    }

    pub fn push_direct(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        if let Some(TextMapSegment::Direct { len: l }) = self.segments.last_mut() {
            *l += len;
            return;
        }
        self.segments.push(TextMapSegment::Direct { len });
    }

    pub fn push_reference(&mut self, src_len: usize) {
        self.segments.push(TextMapSegment::Reference { src_len });
    }

    pub fn push_markup_skip(&mut self, src_len: usize) {
        if src_len == 0 {
            return;
        }
        if let Some(TextMapSegment::MarkupSkip { src_len: l }) = self.segments.last_mut() {
            *l += src_len;
            return;
        }
        self.segments.push(TextMapSegment::MarkupSkip { src_len });
    }

    /// Resolve output character range `[start, end)` of this chunk back
    /// to a source `Range`.
    pub fn locate(&self, start: usize, end: usize) -> Range {
        debug_assert!(start <= end);
        let mut out_pos = 0usize;
        let mut src_pos = self.base;
        let mut range_start: Option<Offset> = None;
        let mut range_end = self.base;

        if start == end {
            // Still walk to `start` to find the right source offset for
            // an empty range (e.g. the caret position before a reference).
        }

        'segs: for seg in &self.segments {
            match *seg {
                TextMapSegment::MarkupSkip { src_len } => {
                    src_pos += src_len;
                }
                TextMapSegment::Direct { len } => {
                    for _ in 0..len {
                        if out_pos == start {
                            range_start = Some(src_pos);
                        }
                        src_pos += 1;
                        out_pos += 1;
                        if out_pos == end {
                            range_end = src_pos;
                            if range_start.is_some() {
                                break 'segs;
                            }
                        }
                    }
                }
                TextMapSegment::Reference { src_len } => {
                    if out_pos == start {
                        range_start = Some(src_pos);
                    }
                    src_pos += src_len;
                    out_pos += 1;
                    if out_pos == end {
                        range_end = src_pos;
                        if range_start.is_some() {
                            break 'segs;
                        }
                    }
                }
            }
        }

        Range::new(range_start.unwrap_or(src_pos), range_end.max(range_start.unwrap_or(src_pos)))
    }
}

/// A node in the markup tree (§3). `children` and `texts` are parallel to
/// the invariant `texts.len() == children.len() + 1`: `texts[i]` precedes
/// `children[i]`, and `texts[children.len()]` follows the last child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: Atom,
    attributes: AttributeSet,
    children: Vec<Element>,
    texts: Vec<String>,
    text_maps: Vec<TextMap>,
    start_tag_range: Option<Range>,
    end_tag_range: Option<Range>,
}

impl Element {
    /// `leading_text_base` is the source offset right after the start tag
    /// closes — the base of `text_maps[0]`, the same way `push_child`'s
    /// `next_chunk_base` bases every later chunk.
    pub(crate) fn new(name: Atom, leading_text_base: Offset) -> Self {
        Element {
            name,
            attributes: AttributeSet::new(),
            children: Vec::new(),
            texts: vec![String::new()],
            text_maps: vec![TextMap::new(leading_text_base)],
            start_tag_range: None,
            end_tag_range: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Text chunk `i`: the run of characters before child `i` (or, for
    /// `i == children().len()`, the run after the last child).
    pub fn text(&self, i: usize) -> &str {
        &self.texts[i]
    }

    pub fn text_chunks(&self) -> &[String] {
        &self.texts
    }

    pub fn start_tag_range(&self) -> Option<Range> {
        self.start_tag_range
    }

    pub fn end_tag_range(&self) -> Option<Range> {
        self.end_tag_range
    }

    /// What source range produced characters `[start, end)` of text
    /// chunk `chunk` of this element (§4.4's back-channel).
    pub fn text_location(&self, chunk: usize, start: usize, end: usize) -> Range {
        self.text_maps[chunk].locate(start, end)
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut AttributeSet {
        &mut self.attributes
    }

    pub(crate) fn set_start_tag_range(&mut self, range: Range) {
        self.start_tag_range = Some(range);
    }

    pub(crate) fn set_end_tag_range(&mut self, range: Range) {
        self.end_tag_range = Some(range);
    }

    pub(crate) fn current_text_mut(&mut self) -> &mut String {
        self.texts.last_mut().expect("texts is never empty")
    }

    pub(crate) fn current_text_map_mut(&mut self) -> &mut TextMap {
        self.text_maps.last_mut().expect("text_maps is never empty")
    }

    /// Append `child`, opening a new trailing text chunk after it so the
    /// `texts.len() == children.len() + 1` invariant holds.
    pub(crate) fn push_child(&mut self, child: Element, next_chunk_base: Offset) {
        self.children.push(child);
        self.texts.push(String::new());
        self.text_maps.push(TextMap::new(next_chunk_base));
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name)
    }
}
