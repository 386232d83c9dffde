// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! §3 "Abstract token" and §6's Tokenizer → TreeBuilder boundary.

use string_cache::DefaultAtom as Atom;

use crate::error::ParseError;
use crate::position::Offset;

/// The stream the tokenizer emits. Matches the regular expression in §3:
/// `( StartTagOpen (AttributeName DataChar*)* (StartTagClose |
/// EmptyElementTagClose) | DataChar | EndTag )* End`. Never surfaced is
/// the tokenizer's internal lexical-token vocabulary (§3) — only this
/// type crosses the Tokenizer/TreeBuilder boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum AbstractToken {
    DataChar(char),
    StartTagOpen(Atom),
    AttributeName(Atom),
    StartTagClose,
    EmptyElementTagClose,
    EndTag(Atom),
    /// Synthetic end-of-stream sentinel; always the last token.
    End,
}

/// Receives the abstract-token stream and diagnostics as the tokenizer
/// produces them, synchronously and in source order (§5). This is the
/// interface the tree builder implements; it mirrors the method list in
/// §6, except positions travel attached to each token/diagnostic rather
/// than as separate leading arguments, which reads more naturally in
/// Rust than the positional-argument form the spec describes.
pub trait TokenSink {
    /// `pos` is the offset of `<`; `name` has already been lowercase-
    /// folded the way the rest of this grammar folds nothing else (names
    /// are case-sensitive here — `pos` is kept purely for diagnostics).
    fn start_tag_open(&mut self, pos: Offset, name: Atom);
    fn attribute_name(&mut self, pos: Offset, name: Atom);
    /// `src_len` is the number of source code units consumed to produce
    /// this one output character — 1 for plain data, more for a
    /// character reference (§4.2 "Position preservation through
    /// expansion").
    fn data_char(&mut self, pos: Offset, src_len: usize, c: char);
    fn start_tag_close(&mut self, pos: Offset);
    fn empty_element_tag_close(&mut self, pos: Offset);
    fn end_tag(&mut self, start_pos: Offset, end_pos: Offset, name: Atom);
    fn end(&mut self, pos: Offset);
    fn error(&mut self, error: ParseError);
    /// Out-of-band notice that `len` source code units of comment markup
    /// were discarded starting at `pos`, with no corresponding abstract
    /// token (§9 "noteComment and text maps"). The tree builder uses this
    /// to extend the current text chunk's `TextMap` with a `MarkupSkip`
    /// segment so positions on either side of the comment still resolve
    /// correctly.
    fn comment_skipped(&mut self, pos: Offset, len: usize);

    /// Polled between top-level steps so a sink that escalated a
    /// diagnostic to fatal (`ErrorSink::report` returning `true`, §C) can
    /// cut the tokenizer's run short. Default `false`: a sink that never
    /// escalates never needs to override this.
    fn should_stop(&self) -> bool {
        false
    }
}
