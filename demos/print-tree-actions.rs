// Copyright 2014 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reads a document from stdin, parses it, and prints the resulting tree
//! plus every diagnostic. Run with `RUST_LOG=microxml=trace` to also see
//! the tokenizer's and tree builder's step-by-step log output.

use std::io::Read;

use microxml::tree::Element;
use microxml::{parse, ParserOptions};

fn print_tree(el: &Element, depth: usize) {
    let indent = "  ".repeat(depth);
    println!(
        "{}<{}> {:?}",
        indent,
        el.name(),
        el.attributes().iter().collect::<Vec<_>>()
    );
    if !el.text(0).is_empty() {
        println!("{}  {:?}", indent, el.text(0));
    }
    for (i, child) in el.children().iter().enumerate() {
        print_tree(child, depth + 1);
        let text = el.text(i + 1);
        if !text.is_empty() {
            println!("{}  {:?}", indent, text);
        }
    }
}

fn main() {
    env_logger::init();

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .expect("failed to read stdin");

    let outcome = match parse(&input, ParserOptions::default()) {
        Ok(outcome) => outcome,
        Err(fatal) => {
            eprintln!("parse aborted: {}", fatal);
            std::process::exit(1);
        }
    };

    match &outcome.root {
        Some(root) => print_tree(root, 0),
        None => println!("(no root element)"),
    }

    for error in &outcome.errors {
        let pos = outcome.positions.locate(error.range.start);
        println!("{}: {}", pos, error.message());
    }
}
