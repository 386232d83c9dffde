// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! §4.2: the lookahead-driven lexical state machine.
//!
//! The teacher's own tokenizer is an explicit, resumable state machine
//! because HTML5 requires chunked feeding. This grammar's tokenizer does
//! not (§5: "implementations MAY expose a chunked entry point"; §9 notes
//! the teacher's own `markupFillBuf` is permanently stubbed out anyway),
//! so this one runs over the whole code-point buffer in one pass. `mode`
//! is still tracked as real state — it drives `log::trace!` and is
//! inspectable by tests — but control flow is ordinary recursive-descent
//! rather than a `step()`-per-call resumable table.

pub mod char_ref;
pub mod interface;

pub use interface::{AbstractToken, TokenSink};

use log::trace;
use string_cache::DefaultAtom as Atom;

use crate::char_class::Delimiter;
use crate::char_class::{classify_code_point, CharClass};
use crate::error::{ErrorKind, ParseError};
use crate::position::{Offset, PositionMap, Range};

use self::char_ref::{resolve_named, resolve_numeric, RefResolution};

/// The tokenization mode (§4.2). Tracked for diagnostics and tests;
/// actual dispatch happens through direct calls between the `scan_*`
/// methods below rather than a `match self.mode` step loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Main,
    Tag,
    Comment,
    StartAttributeValue,
    UnquotedAttributeValue,
    SingleQuoteAttributeValue,
    DoubleQuoteAttributeValue,
}

const BOM: u32 = 0xFEFF;

/// The lookahead-driven tokenizer. Consumes a full code-point buffer
/// (isolated surrogates included, per §3) and drives a `TokenSink`.
pub struct Tokenizer<'sink, S: TokenSink> {
    sink: &'sink mut S,
    input: Vec<u32>,
    pos: usize,
    mode: Mode,
    positions: PositionMap,
    discard_bom: bool,
}

impl<'sink, S: TokenSink> Tokenizer<'sink, S> {
    pub fn new(sink: &'sink mut S, input: Vec<u32>, discard_bom: bool) -> Self {
        Tokenizer {
            sink,
            input,
            pos: 0,
            mode: Mode::Main,
            positions: PositionMap::new(),
            discard_bom,
        }
    }

    /// Run the tokenizer to completion, emitting `End` as the final
    /// token, and hand back the position map it built along the way.
    pub fn run(mut self) -> PositionMap {
        if self.discard_bom && self.input.first() == Some(&BOM) {
            self.pos = 1;
        }
        self.mode = Mode::Main;
        while self.pos < self.input.len() {
            if self.sink.should_stop() {
                trace!("tokenizer stopped early at {} (sink escalated)", self.pos);
                return self.positions;
            }
            self.step_main();
        }
        trace!("tokenizer reached end of input at {}", self.pos);
        self.sink.end(self.pos);
        self.positions
    }

    // ---- small helpers -------------------------------------------------

    fn report(&mut self, range: Range, kind: ErrorKind) {
        self.sink.error(ParseError::new(range, kind));
    }

    fn report_with_arg(&mut self, range: Range, kind: ErrorKind, arg: impl Into<String>) {
        self.sink.error(ParseError::with_arg(range, kind, arg));
    }

    fn peek(&self, i: usize) -> Option<u32> {
        self.input.get(i).copied()
    }

    fn peek_is(&self, i: usize, c: char) -> bool {
        self.peek(i) == Some(c as u32)
    }

    fn class_at(&self, i: usize) -> Option<CharClass> {
        self.peek(i).map(classify_code_point)
    }

    fn is_name_start_at(&self, i: usize) -> bool {
        matches!(self.class_at(i), Some(CharClass::NameStart))
    }

    fn is_name_continue_at(&self, i: usize) -> bool {
        matches!(
            self.class_at(i),
            Some(CharClass::NameStart) | Some(CharClass::NameContinue)
        )
    }

    fn is_whitespace_at(&self, i: usize) -> bool {
        matches!(self.class_at(i), Some(CharClass::Whitespace))
    }

    fn slice_to_string(&self, start: usize, end: usize) -> String {
        (start..end)
            .map(|k| char::from_u32(self.input[k]).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }

    /// Read a name (`NameStart NameContinue*`) at `self.pos`, advancing
    /// past it. Caller must already know `self.pos` is a name-start.
    fn read_name(&mut self) -> String {
        let start = self.pos;
        self.pos += 1;
        while self.is_name_continue_at(self.pos) {
            self.pos += 1;
        }
        self.slice_to_string(start, self.pos)
    }

    fn skip_whitespace(&mut self) {
        while self.is_whitespace_at(self.pos) {
            self.pos += 1;
        }
    }

    fn note_newline(&mut self, cp: u32, pos: usize) -> usize {
        if cp == '\n' as u32 {
            self.positions.note_line_start(pos + 1);
            1
        } else if cp == '\r' as u32 {
            let crlf = self.peek(pos + 1) == Some('\n' as u32);
            let step = if crlf { 2 } else { 1 };
            self.positions.note_line_start(pos + step);
            step
        } else {
            1
        }
    }

    /// Read one ordinary data character at `self.pos` (the caller has
    /// already ruled out `<`/`&`), applying line-ending normalization
    /// (§4.2) and forbidden/surrogate replacement (§4.2 "Recovery
    /// principle"). Advances `self.pos` past whatever source span it
    /// consumed and returns `(output_char, source_len)`.
    fn read_data_char(&mut self) -> (char, usize) {
        let pos = self.pos;
        let cp = self.input[pos];

        if cp == '\n' as u32 || cp == '\r' as u32 {
            let step = self.note_newline(cp, pos);
            self.pos += step;
            return ('\n', step);
        }

        match classify_code_point(cp) {
            CharClass::Surrogate => {
                self.report(Range::point(pos), ErrorKind::IsolatedSurrogate);
                self.pos += 1;
                (char::REPLACEMENT_CHARACTER, 1)
            }
            CharClass::Forbidden => {
                self.report(Range::point(pos), ErrorKind::InvalidCodePoint);
                self.pos += 1;
                (char::REPLACEMENT_CHARACTER, 1)
            }
            _ => {
                self.pos += 1;
                (char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER), 1)
            }
        }
    }

    // ---- Main mode -------------------------------------------------

    fn step_main(&mut self) {
        self.mode = Mode::Main;
        let cp = self.input[self.pos];
        match classify_code_point(cp) {
            CharClass::Delimiter(Delimiter::Lt) => self.main_lt(),
            CharClass::Delimiter(Delimiter::Amp) => self.main_amp(),
            CharClass::Delimiter(Delimiter::Gt) => {
                let pos = self.pos;
                self.report(Range::point(pos), ErrorKind::UnescapedGt);
                self.sink.data_char(pos, 1, '>');
                self.pos += 1;
            }
            _ => {
                let pos = self.pos;
                let (c, src_len) = self.read_data_char();
                self.sink.data_char(pos, src_len, c);
            }
        }
    }

    fn main_lt(&mut self) {
        let start = self.pos;
        if self.peek_is(start + 1, '!') && self.peek_is(start + 2, '-') && self.peek_is(start + 3, '-')
        {
            self.scan_comment(start);
            return;
        }
        if self.peek_is(start + 1, '/') {
            if self.try_scan_end_tag(start) {
                return;
            }
            self.give_up_lt(start);
            return;
        }
        if self.is_name_start_at(start + 1) {
            self.scan_start_tag(start);
            return;
        }
        self.give_up_lt(start);
    }

    fn give_up_lt(&mut self, start: usize) {
        trace!("giving up on markup at {}, reparsing '<' as data", start);
        self.report(Range::point(start), ErrorKind::UnescapedLt);
        self.sink.data_char(start, 1, '<');
        self.pos = start + 1;
    }

    fn main_amp(&mut self) {
        let start = self.pos;
        match self.try_char_ref(start) {
            Some((c, consumed)) => {
                self.sink.data_char(start, consumed, c);
                self.pos = start + consumed;
            }
            None => {
                self.report(Range::point(start), ErrorKind::UnescapedAmp);
                self.sink.data_char(start, 1, '&');
                self.pos = start + 1;
            }
        }
    }

    /// Try to resolve a character reference starting at `self.input[start]
    /// == '&'`. Returns `None` (a "give up") when there's no terminating
    /// `;`. Does not mutate `self.pos` — the caller commits the position
    /// change based on the returned `src_len`.
    fn try_char_ref(&mut self, start: usize) -> Option<(char, usize)> {
        let mut i = start + 1;
        if self.peek_is(i, '#') {
            i += 1;
            let hex = self.peek_is(i, 'x') || self.peek_is(i, 'X');
            if hex {
                i += 1;
            }
            let digits_start = i;
            while self.peek(i).map_or(false, |cp| {
                let c = char::from_u32(cp).unwrap_or('\0');
                if hex {
                    c.is_ascii_hexdigit()
                } else {
                    c.is_ascii_digit()
                }
            }) {
                i += 1;
            }
            if i == digits_start || !self.peek_is(i, ';') {
                return None;
            }
            let digits = self.slice_to_string(digits_start, i);
            let total = i + 1 - start;
            let range = Range::new(start, start + total);
            return Some(match resolve_numeric(&digits, hex) {
                RefResolution::Ok(c) => (c, total),
                RefResolution::TooBig => {
                    self.report(range, ErrorKind::RefCodePointTooBig);
                    (char::REPLACEMENT_CHARACTER, total)
                }
                RefResolution::Forbidden => {
                    self.report(range, ErrorKind::ForbiddenCodePointRef);
                    (char::REPLACEMENT_CHARACTER, total)
                }
                RefResolution::UnknownName => unreachable!("numeric refs never hit this arm"),
            });
        }

        let name_start = i;
        while self.peek(i).map_or(false, |cp| {
            char::from_u32(cp).map_or(false, |c| c.is_ascii_alphabetic())
        }) {
            i += 1;
        }
        if i == name_start || !self.peek_is(i, ';') {
            return None;
        }
        let name = self.slice_to_string(name_start, i);
        let total = i + 1 - start;
        let range = Range::new(start, start + total);
        Some(match resolve_named(&name) {
            RefResolution::Ok(c) => (c, total),
            RefResolution::UnknownName => {
                self.report_with_arg(range, ErrorKind::UnknownCharName, name);
                (char::REPLACEMENT_CHARACTER, total)
            }
            _ => unreachable!("named refs never hit the numeric arms"),
        })
    }

    // ---- Comments ----------------------------------------------------

    /// §4.2's "Comment" mode: discards everything between `<!--` and
    /// `-->`. No abstract token crosses to the tree builder for this —
    /// instead `comment_skipped` notifies it out-of-band so the current
    /// text chunk's text map can record the markup-skip gap (§4.4,
    /// §9 "noteComment and text maps").
    fn scan_comment(&mut self, start: usize) {
        self.mode = Mode::Comment;
        let mut i = start + 4;
        let mut dash_run = 0u8;
        loop {
            if self.peek_is(i, '-') && self.peek_is(i + 1, '-') && self.peek_is(i + 2, '>') {
                let end = i + 3;
                self.sink.comment_skipped(start, end - start);
                self.pos = end;
                return;
            }
            let cp = match self.peek(i) {
                Some(cp) => cp,
                None => {
                    self.report(Range::new(start, i), ErrorKind::UnterminatedComment);
                    self.sink.comment_skipped(start, i - start);
                    self.pos = i;
                    return;
                }
            };
            if cp == '-' as u32 {
                dash_run += 1;
                if dash_run == 2 {
                    self.report(Range::new(i - 1, i + 1), ErrorKind::DoubleMinusInComment);
                    dash_run = 0;
                }
                i += 1;
            } else {
                dash_run = 0;
                i += self.note_newline(cp, i);
            }
        }
    }

    // ---- Start tags and attributes ------------------------------------

    fn scan_start_tag(&mut self, start: usize) {
        self.mode = Mode::Tag;
        self.pos = start + 1;
        let name = self.read_name();
        self.sink.start_tag_open(start, Atom::from(name));
        self.tag_attrs_loop();
    }

    fn tag_attrs_loop(&mut self) {
        let mut need_space = false;
        loop {
            if self.pos >= self.input.len() {
                self.report(Range::point(self.pos), ErrorKind::EofInStartTag);
                self.sink.start_tag_close(self.pos);
                return;
            }
            let cp = self.input[self.pos];
            match classify_code_point(cp) {
                CharClass::Whitespace => {
                    self.skip_whitespace();
                    need_space = false;
                }
                CharClass::Delimiter(Delimiter::Gt) => {
                    self.sink.start_tag_close(self.pos);
                    self.pos += 1;
                    return;
                }
                CharClass::Delimiter(Delimiter::Slash) => {
                    if self.peek_is(self.pos + 1, '>') {
                        self.sink.empty_element_tag_close(self.pos);
                        self.pos += 2;
                        return;
                    }
                    self.pos += 1;
                }
                CharClass::NameStart => {
                    if need_space {
                        self.report(
                            Range::point(self.pos),
                            ErrorKind::SpaceRequiredBeforeAttributeName,
                        );
                    }
                    self.scan_attribute();
                    need_space = true;
                }
                _ => {
                    // No taxonomy entry covers stray delimiters inside a
                    // tag (e.g. a bare `"` between attributes); skip one
                    // code point and keep looking for the tag's close.
                    self.pos += 1;
                }
            }
        }
    }

    fn scan_attribute(&mut self) {
        let name_pos = self.pos;
        let name = self.read_name();
        self.sink.attribute_name(name_pos, Atom::from(name));
        self.skip_whitespace();
        if self.peek_is(self.pos, '=') {
            self.pos += 1;
            self.skip_whitespace();
            self.scan_attribute_value();
        }
        // No `=` at all: the attribute's value is empty, matching
        // "there is no separate attribute close token" (§4.3) — zero
        // `DataChar`s between this `AttributeName` and whatever comes
        // next is itself a valid, empty value.
    }

    fn scan_attribute_value(&mut self) {
        match self.peek(self.pos).map(classify_code_point) {
            Some(CharClass::Delimiter(Delimiter::Quote)) => {
                self.mode = Mode::DoubleQuoteAttributeValue;
                self.scan_quoted_value('"');
            }
            Some(CharClass::Delimiter(Delimiter::Apostrophe)) => {
                self.mode = Mode::SingleQuoteAttributeValue;
                self.scan_quoted_value('\'');
            }
            Some(_) => {
                self.mode = Mode::UnquotedAttributeValue;
                self.scan_unquoted_value();
            }
            None => {} // EOF; `tag_attrs_loop` reports `EOF_IN_START_TAG`.
        }
    }

    fn scan_quoted_value(&mut self, quote: char) {
        let quote_start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(self.pos) {
                None => {
                    self.report(Range::new(quote_start, self.pos), ErrorKind::MissingQuote);
                    return;
                }
                Some(cp) if char::from_u32(cp) == Some(quote) => {
                    self.pos += 1;
                    return;
                }
                Some(cp) if classify_code_point(cp) == CharClass::Delimiter(Delimiter::Gt) => {
                    self.report(Range::new(quote_start, self.pos), ErrorKind::MissingQuote);
                    return; // leave '>' for `tag_attrs_loop` to close the tag
                }
                _ => self.consume_value_char(),
            }
        }
    }

    fn scan_unquoted_value(&mut self) {
        loop {
            match self.peek(self.pos).map(classify_code_point) {
                None | Some(CharClass::Whitespace) | Some(CharClass::Delimiter(Delimiter::Gt)) => {
                    return
                }
                Some(CharClass::Delimiter(Delimiter::Slash)) if self.peek_is(self.pos + 1, '>') => {
                    return
                }
                _ => self.consume_value_char(),
            }
        }
    }

    fn consume_value_char(&mut self) {
        if classify_code_point(self.input[self.pos]) == CharClass::Delimiter(Delimiter::Amp) {
            self.main_amp();
        } else {
            let pos = self.pos;
            let (c, src_len) = self.read_data_char();
            self.sink.data_char(pos, src_len, c);
        }
    }

    // ---- End tags ------------------------------------------------------

    /// `self.input[start] == '<'`, `self.input[start + 1] == '/'`. Tries
    /// to recognize a complete `</name>`; returns `false` without
    /// mutating `self.pos` if it can't, so the caller can give up on just
    /// the leading `<` (§3 "give up").
    fn try_scan_end_tag(&mut self, start: usize) -> bool {
        let name_start = start + 2;
        if !self.is_name_start_at(name_start) {
            return false;
        }
        let mut i = name_start + 1;
        while self.is_name_continue_at(i) {
            i += 1;
        }
        let name_end = i;
        let mut j = name_end;
        while self.is_whitespace_at(j) {
            j += 1;
        }
        if !self.peek_is(j, '>') {
            return false;
        }
        let name = self.slice_to_string(name_start, name_end);
        self.sink.end_tag(start, j + 1, Atom::from(name));
        self.pos = j + 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        tokens: Vec<AbstractToken>,
        errors: Vec<ErrorKind>,
    }

    impl TokenSink for Recorder {
        fn start_tag_open(&mut self, _pos: Offset, name: Atom) {
            self.tokens.push(AbstractToken::StartTagOpen(name));
        }
        fn attribute_name(&mut self, _pos: Offset, name: Atom) {
            self.tokens.push(AbstractToken::AttributeName(name));
        }
        fn data_char(&mut self, _pos: Offset, _src_len: usize, c: char) {
            self.tokens.push(AbstractToken::DataChar(c));
        }
        fn start_tag_close(&mut self, _pos: Offset) {
            self.tokens.push(AbstractToken::StartTagClose);
        }
        fn empty_element_tag_close(&mut self, _pos: Offset) {
            self.tokens.push(AbstractToken::EmptyElementTagClose);
        }
        fn end_tag(&mut self, _start_pos: Offset, _end_pos: Offset, name: Atom) {
            self.tokens.push(AbstractToken::EndTag(name));
        }
        fn end(&mut self, _pos: Offset) {
            self.tokens.push(AbstractToken::End);
        }
        fn error(&mut self, error: ParseError) {
            self.errors.push(error.kind);
        }
        fn comment_skipped(&mut self, _pos: Offset, _len: usize) {}
    }

    fn tokenize(input: &str) -> Recorder {
        let cps: Vec<u32> = input.chars().map(|c| c as u32).collect();
        let mut rec = Recorder::default();
        let tok = Tokenizer::new(&mut rec, cps, true);
        tok.run();
        rec
    }

    #[test]
    fn simple_element_with_attribute_and_child() {
        let rec = tokenize("<a x=\"1\"><b/>hi</a>");
        use AbstractToken::*;
        assert_eq!(
            rec.tokens,
            vec![
                StartTagOpen(Atom::from("a")),
                AttributeName(Atom::from("x")),
                DataChar('1'),
                StartTagClose,
                StartTagOpen(Atom::from("b")),
                EmptyElementTagClose,
                DataChar('h'),
                DataChar('i'),
                EndTag(Atom::from("a")),
                End,
            ]
        );
        assert!(rec.errors.is_empty());
    }

    #[test]
    fn bare_lt_becomes_text() {
        let rec = tokenize("<a>1<2</a>");
        use AbstractToken::*;
        assert_eq!(
            rec.tokens,
            vec![
                StartTagOpen(Atom::from("a")),
                DataChar('1'),
                DataChar('<'),
                DataChar('2'),
                EndTag(Atom::from("a")),
                End,
            ]
        );
        assert_eq!(rec.errors, vec![ErrorKind::UnescapedLt]);
    }

    #[test]
    fn numeric_reference_too_big() {
        let rec = tokenize("<a>&#x41;&#x110000;</a>");
        use AbstractToken::*;
        assert_eq!(
            rec.tokens,
            vec![
                StartTagOpen(Atom::from("a")),
                DataChar('A'),
                DataChar('\u{FFFD}'),
                EndTag(Atom::from("a")),
                End,
            ]
        );
        assert_eq!(rec.errors, vec![ErrorKind::RefCodePointTooBig]);
    }

    #[test]
    fn missing_terminating_semicolon_gives_up() {
        let rec = tokenize("a&ampb");
        use AbstractToken::*;
        assert_eq!(
            rec.tokens,
            vec![
                DataChar('a'),
                DataChar('&'),
                DataChar('a'),
                DataChar('m'),
                DataChar('p'),
                DataChar('b'),
                End,
            ]
        );
        assert_eq!(rec.errors, vec![ErrorKind::UnescapedAmp]);
    }

    #[test]
    fn crlf_collapses_to_single_lf() {
        let rec = tokenize("a\r\nb\rc");
        use AbstractToken::*;
        assert_eq!(
            rec.tokens,
            vec![
                DataChar('a'),
                DataChar('\n'),
                DataChar('b'),
                DataChar('\n'),
                DataChar('c'),
                End,
            ]
        );
    }

    #[test]
    fn unterminated_comment_at_eof() {
        let rec = tokenize("<a><!--oops</a>");
        assert_eq!(rec.errors, vec![ErrorKind::UnterminatedComment]);
    }

    #[test]
    fn double_minus_in_comment_is_reported() {
        let rec = tokenize("<a><!--x--y--></a>");
        assert_eq!(rec.errors, vec![ErrorKind::DoubleMinusInComment]);
    }
}
