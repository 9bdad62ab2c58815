//! Front end for the Djinni interface definition language.

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// Loads a source file (or an in-memory override) and parses it.
pub mod source;

pub mod ast;
pub mod token;
pub mod util;

pub use parser::{parse_file, parse_file_with, ParseOptions};
