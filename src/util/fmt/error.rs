use std::fmt;

use crate::{parser, token::Spanned};

/// One-based line and column (in chars) of a byte offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

impl LineCol {
    pub fn of_offset(src: &str, offset: usize) -> LineCol {
        let mut offset = offset.min(src.len());
        while !src.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &src[..offset];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        LineCol {
            line: before.matches('\n').count() + 1,
            col: before[line_start..].chars().count() + 1,
        }
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Renders a parse error as `path:line:col: error[code]: message`.
pub fn render(path: &str, src: &str, error: &Spanned<parser::Error>) -> String {
    let at = LineCol::of_offset(src, error.span.lo);
    let code = error.inner.code();
    format!("{path}:{at}: error[{code}]: {}", error.inner)
}

/// Formats errors with their byte spans (`lo..hi: message`).
pub fn format_errors(errors: &[Spanned<parser::Error>]) -> Vec<String> {
    errors.iter().map(|e| format!("{e:#}")).collect()
}
