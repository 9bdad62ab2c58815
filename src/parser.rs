use std::fmt;

use tracing::{debug, trace, warn};

use crate::{
    ast::{
        Const, ConstValue, Enum, EnumOption, Ext, Field, IdlFile, Ident, Interface, Record,
        TypeDecl, TypeDef, TypeExpr,
    },
    lexer::{extract, Lexer},
    token::{Span, Spanned, Token, TokenKind, TYPE_DEF_KINDS},
};

type Result<T, E = ()> = std::result::Result<T, E>;

/// `Ok` if the input parsed without errors. Otherwise, the best-effort tree
/// along with every recorded error, in source order.
pub type ParseResult<T> = Result<T, (T, Vec<Spanned<Error>>)>;

pub const DEFAULT_MAX_ERRORS: usize = 10;

/// How many type arguments deep a type expression may nest.
pub const MAX_TYPE_DEPTH: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Once more errors than this have been recorded, parsing stops and the
    /// partial tree is returned. `None` never stops.
    pub max_errors: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_errors: Some(DEFAULT_MAX_ERRORS),
        }
    }
}

pub fn parse_file(src: &str) -> ParseResult<IdlFile> {
    parse_file_with(src, ParseOptions::default())
}

pub fn parse_file_with(src: &str, options: ParseOptions) -> ParseResult<IdlFile> {
    let mut p = Parser::new(src, options);
    let file = p.parse_file();
    if p.errors.is_empty() {
        Ok(file)
    } else {
        Err((file, p.errors))
    }
}

struct Parser<'src> {
    src: &'src str,
    lexer: Lexer<'src>,
    /// The lookahead token. Never trivia.
    token: Token,
    errors: Vec<Spanned<Error>>,
    options: ParseOptions,
    /// Span of the last consumed token.
    prev_span: Span,
    /// Set once the error limit is exceeded. From then on the lookahead is
    /// pinned to EOF.
    halted: bool,
}

impl Parser<'_> {
    fn parse_file(&mut self) -> IdlFile {
        let mut imports = Vec::new();
        while self.is(TokenKind::Import) {
            if let Ok(path) = self.parse_import() {
                imports.push(path);
            }
        }

        let mut type_decls = Vec::new();
        while !self.is(TokenKind::Eof) {
            if let Ok(decl) = self.parse_decl() {
                debug!(ident = %decl.ident, "parsed declaration");
                type_decls.push(decl);
            }
        }

        IdlFile {
            imports,
            type_decls,
        }
    }

    fn parse_import(&mut self) -> Result<String> {
        self.advance(); // @import
        let path = self.expect(TokenKind::String)?;
        self.take(TokenKind::Semicolon);
        Ok(extract::string(path, self.src))
    }

    // All declarations are of the form `IDENT = KEYWORD [EXT] { ... }`.
    fn parse_decl(&mut self) -> Result<TypeDecl> {
        let c = self.peek();
        if c.kind != TokenKind::Identifier {
            self.error(c.span().wrap(Error::ExpectedDecl { actual: c.kind }));
            while self.except([TokenKind::Identifier]) {
                self.advance();
            }
            return Err(());
        }

        let ident = self.parse_ident()?;
        let assign = self.expect(TokenKind::Assign);
        let body = self.parse_type_def();
        assign?;
        Ok(TypeDecl { ident, body: body? })
    }

    fn parse_type_def(&mut self) -> Result<TypeDef> {
        let c = self.peek();
        match c.kind {
            TokenKind::Record => Ok(TypeDef::Record(self.parse_record())),
            TokenKind::Interface => Ok(TypeDef::Interface(self.parse_interface())),
            TokenKind::Enum => Ok(TypeDef::Enum(self.parse_enum(false))),
            TokenKind::Flags => Ok(TypeDef::Enum(self.parse_enum(true))),
            actual => {
                self.error(c.span().wrap(Error::ExpectedTypeDef { actual }));
                // Drop the whole body as well, if there is one, instead of
                // reading its members as declarations.
                match actual {
                    TokenKind::RBrace | TokenKind::Eof => {}
                    TokenKind::LBrace => self.skip_block(),
                    _ => {
                        self.advance();
                        if self.is(TokenKind::LBrace) {
                            self.skip_block();
                        }
                    }
                }
                Err(())
            }
        }
    }

    fn parse_record(&mut self) -> Record {
        self.advance(); // record
        let ext = self.parse_lang_ext();
        let _ = self.expect(TokenKind::LBrace);

        let mut fields = Vec::new();
        let mut consts = Vec::new();
        self.parse_body(
            "record",
            |kind| matches!(kind, TokenKind::Const | TokenKind::Identifier),
            |p| {
                if p.is(TokenKind::Const) {
                    if let Ok(constant) = p.parse_const() {
                        consts.push(constant);
                    }
                } else if let Ok(field) = p.parse_field() {
                    fields.push(field);
                }
            },
        );
        let _ = self.expect(TokenKind::RBrace);

        Record {
            ext,
            fields,
            consts,
        }
    }

    /// Parses record fields, e.g. `id: i32;`.
    fn parse_field(&mut self) -> Result<Field> {
        let ident = self.parse_ident()?;
        let colon = self.expect(TokenKind::Colon);
        let ty = self.parse_type_expr(0);
        let semicolon = self.expect(TokenKind::Semicolon);
        colon.and(semicolon)?;
        Ok(Field {
            doc: None,
            ident,
            ty: ty?,
        })
    }

    /// Parses record constants, e.g. `const max: i32 = 8;`.
    fn parse_const(&mut self) -> Result<Const> {
        self.advance(); // const
        let ident = self.parse_ident();
        let colon = self.expect(TokenKind::Colon);
        let ty = self.parse_plain_type(0, |found| Error::GenericConstType { found });
        let assign = self.expect(TokenKind::Assign);
        let value = self.parse_const_value();
        let semicolon = self.expect(TokenKind::Semicolon);
        colon.and(assign).and(semicolon)?;
        Ok(Const {
            doc: None,
            ident: ident?,
            ty: ty?,
            value: value?,
        })
    }

    fn parse_const_value(&mut self) -> Result<ConstValue> {
        let c = self.peek();
        let value = match c.kind {
            TokenKind::Int => ConstValue::Int(extract::number(c, self.src)),
            TokenKind::Float => ConstValue::Float(extract::number(c, self.src)),
            TokenKind::String => ConstValue::String(extract::string(c, self.src)),
            TokenKind::LBrace => {
                // Record literals are consumed so the rest of the record stays
                // intact, but no value is built.
                self.advance();
                self.skip_body();
                let end = self.peek().span();
                self.take(TokenKind::RBrace);
                self.error(c.span().to(end).wrap(Error::UnsupportedRecordConst));
                return Err(());
            }
            actual => {
                self.error(c.span().wrap(Error::ExpectedConstValue { actual }));
                if !matches!(
                    actual,
                    TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
                ) {
                    self.advance();
                }
                return Err(());
            }
        };
        self.advance();
        Ok(value)
    }

    /// `depth` is the number of enclosing type argument lists.
    fn parse_type_expr(&mut self, depth: usize) -> Result<TypeExpr> {
        let c = self.peek();
        if depth > MAX_TYPE_DEPTH {
            self.error(c.span().wrap(Error::NestingTooDeep {
                limit: MAX_TYPE_DEPTH,
            }));
            self.skip_type_args();
            return Err(());
        }
        match c.kind {
            TokenKind::Map => self.parse_map(depth),
            TokenKind::Set | TokenKind::List => self.parse_decorated(depth),
            // `optional` is not a keyword, so it's matched by its text.
            TokenKind::Identifier if c.literal(self.src) == "optional" => {
                self.parse_decorated(depth)
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(TypeExpr::simple(c.literal(self.src)))
            }
            actual => {
                self.error(c.span().wrap(Error::ExpectedType { actual }));
                if !matches!(
                    actual,
                    TokenKind::Semicolon
                        | TokenKind::Comma
                        | TokenKind::RAngle
                        | TokenKind::RBrace
                        | TokenKind::Eof
                ) {
                    self.advance();
                }
                Err(())
            }
        }
    }

    /// `map<K, V>`. Only plain identifiers are accepted as `K` and `V`.
    fn parse_map(&mut self, depth: usize) -> Result<TypeExpr> {
        self.advance(); // map
        let open = self.expect(TokenKind::LAngle);
        let key = self.parse_plain_type(depth + 1, |found| Error::MapArgument { found });
        let comma = self.expect(TokenKind::Comma);
        let value = self.parse_plain_type(depth + 1, |found| Error::MapArgument { found });
        let close = self.expect(TokenKind::RAngle);
        open.and(comma).and(close)?;
        Ok(TypeExpr::generic("map", vec![key?, value?]))
    }

    /// `optional<T>`, `list<T>` or `set<T>`, where `T` may be any type.
    fn parse_decorated(&mut self, depth: usize) -> Result<TypeExpr> {
        let name = self.advance().literal(self.src);
        let open = self.expect(TokenKind::LAngle);
        let inner = self.parse_type_expr(depth + 1);
        let close = self.expect(TokenKind::RAngle);
        open.and(close)?;
        Ok(TypeExpr::generic(name, vec![inner?]))
    }

    /// A type which must not be generic. Generic types are still parsed in
    /// full so that the parser stays aligned, then rejected.
    fn parse_plain_type(&mut self, depth: usize, reject: fn(String) -> Error) -> Result<TypeExpr> {
        let lo = self.peek().span();
        let ty = self.parse_type_expr(depth)?;
        if ty.is_generic() {
            let span = lo.to(self.prev_span);
            self.error(span.wrap(reject(ty.to_string())));
            return Err(());
        }
        Ok(ty)
    }

    fn parse_interface(&mut self) -> Interface {
        self.advance(); // interface
        let ext = self.parse_lang_ext();
        let _ = self.expect(TokenKind::LBrace);

        let lo = self.peek().span();
        let skipped = self.skip_body();
        if skipped > 0 {
            let span = lo.to(self.prev_span);
            warn!(%span, skipped, "interface members are not parsed, skipping");
        }

        let _ = self.expect(TokenKind::RBrace);
        Interface { ext }
    }

    fn parse_enum(&mut self, flags: bool) -> Enum {
        self.advance(); // enum | flags
        let _ = self.expect(TokenKind::LBrace);

        let mut options = Vec::new();
        self.parse_body(
            if flags { "flags" } else { "enum" },
            |kind| kind == TokenKind::Identifier,
            |p| {
                if let Ok(option) = p.parse_enum_option() {
                    options.push(option);
                }
            },
        );
        let _ = self.expect(TokenKind::RBrace);

        Enum { options, flags }
    }

    fn parse_enum_option(&mut self) -> Result<EnumOption> {
        let ident = self.parse_ident()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(EnumOption { doc: None, ident })
    }

    fn parse_lang_ext(&mut self) -> Ext {
        let mut ext = Ext::default();
        while self.peek().kind.is_lang_ext() {
            match self.advance().kind {
                TokenKind::Cpp => ext.cpp = true,
                TokenKind::Objc => ext.objc = true,
                TokenKind::Java => ext.java = true,
                _ => unreachable!(),
            }
        }
        ext
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Ident::new(extract::ident(token, self.src)))
    }

    /// Parses members until the `}` closing the body, which is not consumed.
    ///
    /// A run of tokens which can't start a member is reported once and
    /// skipped.
    fn parse_body(
        &mut self,
        context: &'static str,
        is_member_start: fn(TokenKind) -> bool,
        mut parse_member: impl FnMut(&mut Self),
    ) {
        while self.except([TokenKind::RBrace]) {
            let c = self.peek();
            if is_member_start(c.kind) {
                parse_member(self);
                continue;
            }
            self.error(c.span().wrap(Error::UnexpectedInBody {
                actual: c.kind,
                context,
            }));
            while self.except([TokenKind::RBrace]) && !is_member_start(self.peek().kind) {
                self.advance();
            }
        }
    }
}

impl<'src> Parser<'src> {
    fn new(src: &'src str, options: ParseOptions) -> Parser<'src> {
        let mut p = Parser {
            src,
            lexer: Lexer::new(src),
            token: Token::eof_for(src),
            errors: Vec::with_capacity(8),
            options,
            prev_span: Span::new_of_length(0, 0),
            halted: false,
        };
        p.advance();
        p
    }
}

impl Parser<'_> {
    /// Records an error. Once the configured limit is exceeded, a final
    /// [`Error::TooManyErrors`] is recorded and the parser halts.
    fn error(&mut self, error: Spanned<Error>) {
        if self.halted {
            return;
        }
        debug!(span = %error.span, %error, "syntax error");
        self.errors.push(error);

        if let Some(max) = self.options.max_errors {
            if self.errors.len() > max {
                let span = self.peek().span();
                self.errors.push(span.wrap(Error::TooManyErrors));
                self.halted = true;
                self.token = Token::eof_for(self.src);
            }
        }
    }

    /// Returns the current token.
    #[inline]
    fn peek(&self) -> Token {
        self.token
    }

    /// Returns the current token and advances. Skips any trivia.
    fn advance(&mut self) -> Token {
        let c = self.token;
        if self.halted {
            return c;
        }
        self.prev_span = c.span();
        loop {
            self.token = self.lexer.next_token();
            trace!(token = ?self.token, "scanned");
            if !self.token.kind.is_trivia() {
                break;
            }
        }
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances past the current token, recording an error if it isn't the
    /// expected one. The mismatched token is assumed to be a typo for the
    /// expected one, which keeps the rest of the structure aligned.
    ///
    /// `}` and EOF are never consumed on mismatch, as they close an enclosing
    /// body.
    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        let c = self.peek();
        if c.kind == expected {
            self.advance();
            return Ok(c);
        }
        self.error(c.span().wrap(Error::Unexpected {
            expected,
            actual: c.kind,
        }));
        if !matches!(c.kind, TokenKind::RBrace | TokenKind::Eof) {
            self.advance();
        }
        Err(())
    }

    /// Returns true while the current token does *not* match one of the
    /// provided ones. [`TokenKind::Eof`] is implicitly included in the list.
    ///
    /// This won't advance the cursor.
    fn except(&self, except: impl IntoIterator<Item = TokenKind>) -> bool {
        let c = self.peek().kind;
        c != TokenKind::Eof && except.into_iter().all(|e| c != e)
    }

    /// Skips tokens up to the `}` which closes the current body, stepping over
    /// nested blocks. The closing brace is not consumed. Returns the number of
    /// skipped tokens.
    fn skip_body(&mut self) -> usize {
        let mut depth = 0_usize;
        let mut skipped = 0;
        loop {
            match self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::RBrace if depth == 0 => break,
                TokenKind::RBrace => depth -= 1,
                TokenKind::LBrace => depth += 1,
                _ => {}
            }
            self.advance();
            skipped += 1;
        }
        skipped
    }

    /// Skips the rest of a type argument, up to the `>` closing the enclosing
    /// argument list, which is not consumed. Stops early at `;`, `}` or EOF.
    fn skip_type_args(&mut self) {
        let mut depth = 0_usize;
        loop {
            match self.peek().kind {
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::RAngle if depth == 0 => break,
                TokenKind::RAngle => depth -= 1,
                TokenKind::LAngle => depth += 1,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips a whole `{ ... }` block, including both braces.
    fn skip_block(&mut self) {
        debug_assert!(self.is(TokenKind::LBrace));
        self.advance();
        self.skip_body();
        self.take(TokenKind::RBrace);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("expected {expected}, but got {actual}")]
    Unexpected {
        expected: TokenKind,
        actual: TokenKind,
    },
    #[error("unexpected {actual} in {context} body")]
    UnexpectedInBody {
        actual: TokenKind,
        context: &'static str,
    },
    #[error("expected a declaration name, but got {actual}")]
    ExpectedDecl { actual: TokenKind },
    #[error("expected one of {}, but got {}", KindList(TYPE_DEF_KINDS), .actual)]
    ExpectedTypeDef { actual: TokenKind },
    #[error("expected a type, but got {actual}")]
    ExpectedType { actual: TokenKind },
    #[error("map key and value types must be plain identifiers, but got `{found}`")]
    MapArgument { found: String },
    #[error("constant types must be plain identifiers, but got `{found}`")]
    GenericConstType { found: String },
    #[error("expected a constant value, but got {actual}")]
    ExpectedConstValue { actual: TokenKind },
    #[error("record constant values are not supported")]
    UnsupportedRecordConst,
    #[error("type arguments are nested more than {limit} levels deep")]
    NestingTooDeep { limit: usize },
    #[error("too many errors, stopped parsing")]
    TooManyErrors,
}

impl Error {
    /// A stable, machine-readable name for this kind of error.
    pub fn code(&self) -> &'static str {
        use Error::*;
        match self {
            Unexpected { actual, .. }
            | UnexpectedInBody { actual, .. }
            | ExpectedDecl { actual }
            | ExpectedTypeDef { actual }
            | ExpectedType { actual }
            | ExpectedConstValue { actual }
                if actual.is_error() =>
            {
                "lexical"
            }
            Unexpected { .. } => "unexpected-token",
            UnexpectedInBody { .. } => "unexpected-in-body",
            ExpectedDecl { .. } => "expected-decl",
            ExpectedTypeDef { .. } => "expected-type-def",
            ExpectedType { .. } => "expected-type",
            MapArgument { .. } => "map-argument",
            GenericConstType { .. } => "generic-const-type",
            ExpectedConstValue { .. } => "expected-const-value",
            UnsupportedRecordConst => "unsupported-record-const",
            NestingTooDeep { .. } => "nesting-too-deep",
            TooManyErrors => "too-many-errors",
        }
    }
}

struct KindList(&'static [TokenKind]);

impl fmt::Display for KindList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind}")?;
        }
        Ok(())
    }
}
