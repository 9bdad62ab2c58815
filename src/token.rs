use std::{fmt, ops::Range};

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    lo: usize,
    len: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            len: span.len,
            lo: span.lo,
        }
    }

    /// The end-of-file token for the given source.
    pub fn eof_for(src: &str) -> Token {
        Token::new(TokenKind::Eof, Span::new_of_length(src.len(), 0))
    }

    pub fn span(&self) -> Span {
        Span {
            len: self.len,
            lo: self.lo,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// The literal text of this token. String literals keep their quotes.
    pub fn literal<'src>(&self, src: &'src str) -> &'src str {
        self.span().substr(src)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.span())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>) -> Span {
        debug_assert!(hi >= lo);
        // Sources over 4 GiB are clamped; spans are diagnostic only.
        let len = u32::try_from(hi - lo).unwrap_or(u32::MAX);
        Self::new_of_length(lo, len)
    }

    pub fn new_of_length(lo: usize, len: u32) -> Span {
        Span { len, lo }
    }

    pub fn hi(&self) -> usize {
        self.lo + self.len as usize
    }

    /// Returns a span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let lo = self.lo.min(other.lo);
        let hi = self.hi().max(other.hi());
        Span::new_of_bounds(lo..hi)
    }

    /// Shrinks (or grows) the span by the given deltas.
    pub fn offset(self, lo_delta: isize, hi_delta: isize) -> Span {
        let lo = self.lo.saturating_add_signed(lo_delta);
        let hi = self.hi().saturating_add_signed(hi_delta).max(lo);
        Span::new_of_bounds(lo..hi)
    }

    pub fn substr(self, src: &str) -> &str {
        src.get(self.lo..self.hi()).unwrap_or_default()
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = self.hi();
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

/// With the alternate flag (`{:#}`), the span is printed before the value.
impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}: ", self.span)?;
        }
        write!(f, "{}", self.inner)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Record,
    Interface,
    Enum,
    Flags,
    Const,
    Map,
    Set,
    List,
    /// `@import`
    Import,

    /// `+c`
    Cpp,
    /// `+o`
    Objc,
    /// `+j`
    Java,

    Colon,
    Semicolon,
    Comma,
    /// `<`
    LAngle,
    /// `>`
    RAngle,
    LBrace,
    RBrace,
    /// `=`
    Assign,

    Identifier,
    String,
    Int,
    Float,

    Comment,
    Eof,

    ErrorUnexpectedChar,
    ErrorUnclosedString,
    ErrorUnclosedComment,
}

/// Kinds which may introduce a type definition, in diagnostic order.
pub const TYPE_DEF_KINDS: &[TokenKind] = &[
    TokenKind::Record,
    TokenKind::Interface,
    TokenKind::Enum,
    TokenKind::Flags,
];

impl TokenKind {
    pub fn is_lang_ext(self) -> bool {
        matches!(self, TokenKind::Cpp | TokenKind::Objc | TokenKind::Java)
    }

    pub fn is_type_def(self) -> bool {
        TYPE_DEF_KINDS.contains(&self)
    }

    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Comment)
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            TokenKind::ErrorUnexpectedChar
                | TokenKind::ErrorUnclosedString
                | TokenKind::ErrorUnclosedComment
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let s = match self {
            Record => "`record`",
            Interface => "`interface`",
            Enum => "`enum`",
            Flags => "`flags`",
            Const => "`const`",
            Map => "`map`",
            Set => "`set`",
            List => "`list`",
            Import => "`@import`",
            Cpp => "`+c`",
            Objc => "`+o`",
            Java => "`+j`",
            Colon => "`:`",
            Semicolon => "`;`",
            Comma => "`,`",
            LAngle => "`<`",
            RAngle => "`>`",
            LBrace => "`{`",
            RBrace => "`}`",
            Assign => "`=`",
            Identifier => "identifier",
            String => "string literal",
            Int => "integer literal",
            Float => "float literal",
            Comment => "comment",
            Eof => "end of file",
            ErrorUnexpectedChar => "invalid character",
            ErrorUnclosedString => "unterminated string",
            ErrorUnclosedComment => "unterminated comment",
        };
        f.write_str(s)
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "record" => TokenKind::Record,
    "interface" => TokenKind::Interface,
    "enum" => TokenKind::Enum,
    "flags" => TokenKind::Flags,
    "const" => TokenKind::Const,
    "map" => TokenKind::Map,
    "set" => TokenKind::Set,
    "list" => TokenKind::List,
};
