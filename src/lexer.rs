use std::{iter::Peekable, str::CharIndices};

use crate::{
    token::{Span, Token, TokenKind, KEYWORDS},
    util::BreakableIteratorExt,
};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 1_024;

/// Lexes the provided string, producing the tokens (up to and including EOF)
/// into the provided buffer.
pub fn lex(src: &str, tokens: &mut Vec<Token>) {
    assert_eq!(tokens.len(), 0, "must pass clean tokens buffer");
    tokens.extend(Lexer::new(src).up_to(Token::is_eof));
}

/// A convenience function that allocates a new buffer per lexed input and
/// returns it.
pub fn lex_in_new(src: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    lex(src, &mut tokens);
    tokens
}

/// The Djinni lexer.
///
/// Tokens are produced on demand. Once the input is exhausted, every further
/// call yields an EOF token, so the [`Iterator`] implementation never ends;
/// use [`BreakableIteratorExt::up_to`] to stop at the first EOF.
pub struct Lexer<'src> {
    src: &'src str,
    iter: Peekable<CharIndices<'src>>,
    cursor: usize,
    current_lo: usize,
}

impl<'src> Lexer<'src> {
    /// Constructs a new lexer positioned at the start of `src`.
    pub fn new(src: &'src str) -> Lexer<'src> {
        Lexer {
            src,
            iter: src.char_indices().peekable(),
            cursor: 0,
            current_lo: 0,
        }
    }

    /// Scans the next token, skipping any whitespace before it.
    pub fn next_token(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
        let kind = self.scan_token_kind();
        Token::new(kind, self.span())
    }

    fn scan_token_kind(&mut self) -> TokenKind {
        use TokenKind::*;
        let Some(c) = self.mark_advance() else {
            return Eof;
        };
        match c {
            ':' => Colon,
            ';' => Semicolon,
            ',' => Comma,
            '<' => LAngle,
            '>' => RAngle,
            '{' => LBrace,
            '}' => RBrace,
            '=' => Assign,
            '+' => self.lang_ext(),
            '@' => self.directive(),
            '#' => self.line_comment(),
            '/' => match self.peek() {
                Some('/') => self.line_comment(),
                Some('*') => self.block_comment(),
                _ => ErrorUnexpectedChar,
            },
            '"' => self.string(),
            '-' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.number(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
            _ => ErrorUnexpectedChar,
        }
    }

    /// `+c`, `+o` or `+j`. The marker letter must not run into an identifier.
    fn lang_ext(&mut self) -> TokenKind {
        let kind = match self.peek() {
            Some('c') => TokenKind::Cpp,
            Some('o') => TokenKind::Objc,
            Some('j') => TokenKind::Java,
            _ => return TokenKind::ErrorUnexpectedChar,
        };
        self.advance();
        if self.peek().is_some_and(is_identifier_suffix) {
            self.eat_while(is_identifier_suffix);
            return TokenKind::ErrorUnexpectedChar;
        }
        kind
    }

    /// `@import` is the only directive.
    fn directive(&mut self) -> TokenKind {
        self.eat_while(is_identifier_suffix);
        match self.substr() {
            "@import" => TokenKind::Import,
            _ => TokenKind::ErrorUnexpectedChar,
        }
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        self.eat_while(is_identifier_suffix);
        KEYWORDS
            .get(self.substr())
            .copied()
            .unwrap_or(TokenKind::Identifier)
    }

    /// Scans a string literal. Escapes are only tracked so that `\"` does not
    /// close the literal; the content is kept verbatim.
    fn string(&mut self) -> TokenKind {
        let mut is_escaping = false;
        loop {
            match (is_escaping, self.peek()) {
                (_, None) | (false, Some('\n')) => return TokenKind::ErrorUnclosedString,
                (false, Some('"')) => {
                    self.advance();
                    return TokenKind::String;
                }
                (false, Some('\\')) => is_escaping = true,
                (_, Some(_)) => is_escaping = false,
            }
            self.advance();
        }
    }

    fn number(&mut self) -> TokenKind {
        let mut kind = TokenKind::Int;
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.eat_while(|c| c.is_ascii_digit());
            kind = TokenKind::Float;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_digit = match self.peek_second() {
                Some('+' | '-') => self.peek_nth(2),
                other => other,
            };
            if exponent_digit.is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.eat_while(|c| c.is_ascii_digit());
                kind = TokenKind::Float;
            }
        }
        if self.peek().is_some_and(is_identifier_suffix) {
            // Something like `12ab`, which is neither a number nor a name.
            self.eat_while(is_identifier_suffix);
            return TokenKind::ErrorUnexpectedChar;
        }
        kind
    }

    fn line_comment(&mut self) -> TokenKind {
        self.eat_while(|c| c != '\n');
        TokenKind::Comment
    }

    fn block_comment(&mut self) -> TokenKind {
        assert_eq!(self.advance(), Some('*'));
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return TokenKind::Comment;
                }
                Some(_) => continue,
                None => return TokenKind::ErrorUnclosedComment,
            }
        }
    }
}

impl Lexer<'_> {
    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> Option<char> {
        self.current_lo = self.cursor;
        self.advance()
    }

    /// Returns the next char and advances the iterator.
    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.iter.next()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while self.peek().is_some_and(&mut pred) {
            self.advance();
        }
    }

    /// Returns the next char without advancing the iterator.
    fn peek(&mut self) -> Option<char> {
        self.iter.peek().map(|&(_, c)| c)
    }

    fn peek_second(&self) -> Option<char> {
        self.peek_nth(1)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.cursor..].chars().nth(n)
    }

    /// Returns the current span.
    fn span(&self) -> Span {
        Span::new_of_bounds(self.current_lo..self.cursor)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        self.span().substr(self.src)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        Some(self.next_token())
    }
}

fn is_identifier_suffix(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub mod extract {
    use super::*;

    pub fn ident(token: Token, src: &str) -> String {
        debug_assert_eq!(token.kind, TokenKind::Identifier);
        token.literal(src).to_owned()
    }

    /// Strips the surrounding quotes of a string literal.
    pub fn string(token: Token, src: &str) -> String {
        debug_assert_eq!(token.kind, TokenKind::String);
        token.span().offset(1, -1).substr(src).to_owned()
    }

    /// Numeric literals are kept as source text.
    pub fn number(token: Token, src: &str) -> String {
        debug_assert!(matches!(token.kind, TokenKind::Int | TokenKind::Float));
        token.literal(src).to_owned()
    }
}
