use std::fmt;

use logos::{Lexer as LogosLexer, Logos};

use crate::error::{LexError, LexErrorKind, Span};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
pub(crate) enum RawTok {
    // --- Trivia ---
    #[regex(r"[\t\x0C ]+", logos::skip)]
    _Ws,

    // Kept as tokens: the formatter preserves line structure.
    #[regex(r"\r\n|\n|\r")]
    Newline,

    // Line comment (newline excluded).
    #[regex(r"//[^\n\r]*")]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    // --- Ident & keywords (keywords are mapped in adapter) ---
    #[regex(r"[_\p{XID_Start}][_\p{XID_Continue}]*")]
    Ident,

    // --- Literals ---
    #[regex(r"`[^`]*`")]
    RawString,

    #[regex(r#""([^"\\\n\r]|\\.)*""#)]
    String,

    #[regex(r"'([^'\\\n\r]|\\.)+'")]
    Rune,

    // Numeric literals are only ever echoed back, so the shape is approximate.
    #[regex(r"[0-9][0-9a-zA-Z_]*(\.[0-9a-zA-Z_]*)?([eEpP][+-][0-9_]+i?)?")]
    Number,

    // --- Operators the formatter tells apart (unary forms, tight pairs) ---
    #[token("...")]
    Ellipsis,
    #[token("*")]
    Star,
    #[token("&")]
    Amp,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("<-")]
    Arrow,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,

    // Every other operator is spaced like a binary one.
    #[token("=")]
    #[token(":=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("&^=")]
    #[token("==")]
    #[token("!=")]
    #[token("<")]
    #[token("<=")]
    #[token(">")]
    #[token(">=")]
    #[token("&&")]
    #[token("||")]
    #[token("<<")]
    #[token(">>")]
    #[token("&^")]
    #[token("/")]
    #[token("%")]
    #[token("|")]
    Operator,

    // --- Delimiters ---
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
}

fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    use memchr::memchr;

    let rem = lex.remainder().as_bytes();
    let mut search_start = 0;

    while let Some(star_pos) = memchr(b'*', &rem[search_start..]) {
        let abs_pos = search_start + star_pos;
        if rem.get(abs_pos + 1) == Some(&b'/') {
            lex.bump(abs_pos + 2);
            return Ok(());
        }
        search_start = abs_pos + 1;
    }

    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedComment)
}

const KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

pub(crate) fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

/// Tokens consumed by the signature parser.
///
/// Only the categories the signature grammar cares about get their own
/// variant. Everything else the scanner recognizes (other keywords, literals,
/// operators) and any character it cannot scan surfaces as `Unexpected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
    KwFunc,
    Ident(String),
    LParen,
    RParen,
    LBrack,
    RBrack,
    Star,
    Dot,
    Comma,
    Ellipsis,
    LBrace,
    Eof,
    Unexpected(String),
}

pub type SpannedTok = (usize, Tok, usize);

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::KwFunc => f.write_str("`func`"),
            Tok::Ident(name) => write!(f, "identifier `{name}`"),
            Tok::LParen => f.write_str("`(`"),
            Tok::RParen => f.write_str("`)`"),
            Tok::LBrack => f.write_str("`[`"),
            Tok::RBrack => f.write_str("`]`"),
            Tok::Star => f.write_str("`*`"),
            Tok::Dot => f.write_str("`.`"),
            Tok::Comma => f.write_str("`,`"),
            Tok::Ellipsis => f.write_str("`...`"),
            Tok::LBrace => f.write_str("`{`"),
            Tok::Eof => f.write_str("end of input"),
            Tok::Unexpected(lit) => write!(f, "`{lit}`"),
        }
    }
}

/// Pull-based scanner over a single signature.
///
/// Whitespace, newlines and comments are dropped. Once the input is exhausted
/// `next_token` keeps returning `Tok::Eof` positioned at the end of input.
pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            src_len: input.len(),
            eof_done: false,
        }
    }

    pub fn next_token(&mut self) -> SpannedTok {
        if self.eof_done {
            return (self.src_len, Tok::Eof, self.src_len);
        }

        loop {
            match self.logos.next() {
                None => {
                    self.eof_done = true;
                    return (self.src_len, Tok::Eof, self.src_len);
                }
                Some(Err(_)) => {
                    let span = self.logos.span();
                    let lit = self.logos.slice().to_string();
                    return (span.start, Tok::Unexpected(lit), span.end);
                }
                Some(Ok(RawTok::Newline | RawTok::LineComment | RawTok::BlockComment)) => continue,
                Some(Ok(raw)) => {
                    let span = self.logos.span();
                    let tok = Self::classify(raw, self.logos.slice());
                    return (span.start, tok, span.end);
                }
            }
        }
    }

    fn classify(raw: RawTok, slice: &str) -> Tok {
        match raw {
            RawTok::Ident if slice == "func" => Tok::KwFunc,
            RawTok::Ident if is_keyword(slice) => Tok::Unexpected(slice.to_string()),
            RawTok::Ident => Tok::Ident(slice.to_string()),
            RawTok::LParen => Tok::LParen,
            RawTok::RParen => Tok::RParen,
            RawTok::LBrack => Tok::LBrack,
            RawTok::RBrack => Tok::RBrack,
            RawTok::Star => Tok::Star,
            RawTok::Dot => Tok::Dot,
            RawTok::Comma => Tok::Comma,
            RawTok::Ellipsis => Tok::Ellipsis,
            RawTok::LBrace => Tok::LBrace,
            _ => Tok::Unexpected(slice.to_string()),
        }
    }
}

/// Yields every token before end of input; `Eof` itself is not yielded.
impl Iterator for Lexer<'_> {
    type Item = SpannedTok;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            (_, Tok::Eof, _) => None,
            sp => Some(sp),
        }
    }
}

/// Materializes the full token stream of `input`, terminated by exactly one
/// `Tok::Eof`.
pub fn tokenize(input: &str) -> Vec<SpannedTok> {
    let mut lx = Lexer::new(input);
    let mut toks = Vec::new();
    loop {
        let sp = lx.next_token();
        let done = sp.1 == Tok::Eof;
        toks.push(sp);
        if done {
            return toks;
        }
    }
}

/// A token of the full Go surface syntax, with its exact source text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawToken<'src> {
    pub kind: RawTok,
    pub text: &'src str,
    pub span: Span,
}

/// Scans `input` keeping newlines and comments. Fails on the first character
/// that is not part of a Go token.
pub(crate) fn raw_tokens(input: &str) -> Result<Vec<RawToken<'_>>, LexError> {
    let mut logos = RawTok::lexer(input);
    let mut out = Vec::new();
    while let Some(res) = logos.next() {
        let span = logos.span();
        match res {
            Ok(kind) => out.push(RawToken {
                kind,
                text: logos.slice(),
                span,
            }),
            Err(kind) => return Err(LexError { kind, span }),
        }
    }
    Ok(out)
}
