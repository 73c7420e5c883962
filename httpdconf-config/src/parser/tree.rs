//! Tree builder
//!
//! Recursive descent over classified lines. The top-level scan isolates
//! blocks of one requested type; once inside a block, nesting is recovered
//! with generic open/close tags because inner blocks can be of any type.

use crate::parser::ast::{Directive, Enclosure};
use crate::parser::lexer::tokenize;
use crate::parser::patterns::{self, TypeMatcher};
use httpdconf_core::{Error, ParsableLine, Result};

/// Every active directive of the given type (case-insensitive)
pub fn directives_of(lines: &[ParsableLine], directive_type: &str) -> Vec<Directive> {
    let matcher = TypeMatcher::new(directive_type);
    lines
        .iter()
        .filter(|line| line.is_effective() && matcher.is_directive(line.processed()))
        .map(|line| {
            let tokens = tokenize(line.processed());
            Directive::new(matcher.name(), tokens.values, line.line.clone())
        })
        .collect()
}

/// Every active enclosure of the given type, outermost first.
///
/// Blocks of the same type nested in a match are part of that match, not
/// separate results.
pub fn enclosures_of(lines: &[ParsableLine], enclosure_type: &str) -> Result<Vec<Enclosure>> {
    let matcher = TypeMatcher::new(enclosure_type);
    let mut enclosures = Vec::new();
    let mut buffer: Vec<ParsableLine> = Vec::new();
    let mut depth = 0usize;

    for line in lines.iter().filter(|line| line.is_effective()) {
        let text = line.processed();

        if matcher.is_open(text) {
            depth += 1;
        }
        if depth == 0 {
            continue;
        }

        if !line.line.is_blank() {
            buffer.push(line.clone());
        }
        if matcher.is_close(text) {
            depth -= 1;
            if depth == 0 {
                enclosures.push(parse_enclosure(&buffer)?);
                buffer.clear();
            }
        }
    }

    if let Some(open) = buffer.first() {
        return Err(Error::UnterminatedBlock {
            kind: matcher.name().to_string(),
            file: open.line.file.clone(),
            line: open.line.line_start,
        });
    }

    Ok(enclosures)
}

/// Build one enclosure from its lines, open tag first and close tag last
pub fn parse_enclosure(lines: &[ParsableLine]) -> Result<Enclosure> {
    let mut lines = lines
        .iter()
        .filter(|line| !line.line.is_comment && !line.line.is_blank());

    let Some(open) = lines.next() else {
        return Err(Error::UnterminatedBlock {
            kind: String::new(),
            file: Default::default(),
            line: 0,
        });
    };

    let tag = tokenize(open.processed());
    let mut enclosure = Enclosure {
        name: tag.head.clone(),
        value: tag.joined_values(),
        directives: Vec::new(),
        children: Vec::new(),
        file: open.line.file.clone(),
        line_start: open.line.line_start,
        line_end: open.line.line_end,
        lines: vec![open.line.clone()],
    };

    let mut nested: Vec<ParsableLine> = Vec::new();
    let mut depth = 0usize;

    for line in lines {
        let text = line.processed();
        enclosure.line_end = line.line.line_end;

        if patterns::is_enclosure_open(text) {
            depth += 1;
        }

        if depth > 0 {
            nested.push(line.clone());
            if patterns::is_enclosure_close(text) {
                depth -= 1;
                if depth == 0 {
                    enclosure.children.push(parse_enclosure(&nested)?);
                    nested.clear();
                }
            }
            continue;
        }

        enclosure.lines.push(line.line.clone());
        if !patterns::is_enclosure_close(text) {
            let tokens = tokenize(text);
            enclosure
                .directives
                .push(Directive::new(tokens.head, tokens.values, line.line.clone()));
        }
    }

    if let Some(first) = nested.first() {
        return Err(Error::UnterminatedBlock {
            kind: tokenize(first.processed()).head,
            file: first.line.file.clone(),
            line: first.line.line_start,
        });
    }

    Ok(enclosure)
}
