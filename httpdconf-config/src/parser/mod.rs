//! Parser module for Apache httpd configuration trees
//!
//! This module provides the include resolver, the Define table, the
//! active-line classifier, the line tokenizer, and the tree builder.

pub mod ast;
pub mod classifier;
pub mod defines;
pub mod lexer;
pub mod patterns;
pub mod resolver;
pub mod source;
pub mod tree;

pub use ast::{Directive, Enclosure};
pub use classifier::{ExclusionState, classify};
pub use defines::{DEFINE_DIRECTIVE, Define, DefineTable, collect_defines};
pub use lexer::{Tokens, tokenize};
pub use patterns::TypeMatcher;
pub use resolver::{LineResolver, MAX_INCLUDE_DEPTH, Resolution, read_file_lines};
pub use source::{Segment, SourceFile};
pub use tree::{directives_of, enclosures_of, parse_enclosure};
