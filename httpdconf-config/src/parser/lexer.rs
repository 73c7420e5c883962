//! Tokenizer for configuration lines
//!
//! Splits one processed line into a head token and its values.
//!
//! Key rules:
//! - Whitespace separates tokens, except inside double quotes
//! - An unbalanced quote swallows the rest of the line
//! - `a , b` is normalized to `a,b` and stays a single token
//! - Quote characters never reach the output
//! - Enclosure tags lose their surrounding `<` and `>`

use logos::Logos;

/// Fragments of a configuration line
#[derive(Logos, Debug, Clone, PartialEq)]
enum Fragment {
    /// Comma with any surrounding whitespace
    #[regex(r"[ \t\r\n\f]*,[ \t\r\n\f]*")]
    Comma,

    #[regex(r"[ \t\r\n\f]+")]
    Space,

    /// Balanced quoted string, quotes removed
    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    Quoted(String),

    /// Quote that is never closed, runs to end of line
    #[regex(r#""[^"]*"#, |lex| lex.slice()[1..].to_string())]
    OpenQuote(String),

    /// Anything else
    #[regex(r#"[^ \t\r\n\f,"]+"#, |lex| lex.slice().to_string())]
    Bare(String),
}

/// A tokenized line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub head: String,
    pub values: Vec<String>,
}

impl Tokens {
    /// Values joined by single spaces
    pub fn joined_values(&self) -> String {
        self.values.join(" ")
    }
}

/// Tokenize a processed configuration line
pub fn tokenize(line: &str) -> Tokens {
    let mut tokens = split(strip_tag(line)).into_iter();
    Tokens {
        head: tokens.next().unwrap_or_default(),
        values: tokens.collect(),
    }
}

/// Remove the angle brackets of an enclosure tag
fn strip_tag(line: &str) -> &str {
    let line = line.trim();
    match line.strip_prefix('<') {
        Some(inner) => inner.strip_suffix('>').unwrap_or(inner).trim(),
        None => line,
    }
}

fn split(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current: Option<String> = None;

    let mut lexer = Fragment::lexer(line);
    while let Some(result) = lexer.next() {
        match result {
            Ok(Fragment::Space) => {
                if let Some(token) = current.take() {
                    tokens.push(token);
                }
            }
            Ok(Fragment::Comma) => current.get_or_insert_with(String::new).push(','),
            Ok(Fragment::Quoted(s)) | Ok(Fragment::OpenQuote(s)) | Ok(Fragment::Bare(s)) => {
                current.get_or_insert_with(String::new).push_str(&s);
            }
            Err(()) => {
                // Every byte is covered by some fragment, keep the text regardless.
                current
                    .get_or_insert_with(String::new)
                    .push_str(&lexer.slice().replace('"', ""));
            }
        }
    }

    if let Some(token) = current {
        tokens.push(token);
    }
    tokens
}
