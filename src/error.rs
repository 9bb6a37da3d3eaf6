use std::ops::Range;
use std::path::PathBuf;

use thiserror::Error;

pub type Span = Range<usize>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("invalid token")]
    InvalidToken,
    #[error("unterminated comment")]
    UnterminatedComment,
}

impl Default for LexErrorKind {
    fn default() -> Self {
        LexErrorKind::InvalidToken
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {span:?}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// What went wrong while recognizing a signature.
///
/// `found` fields hold a human-readable rendering of the offending token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected `func`, found {found}")]
    MissingFunc { found: String },
    #[error("unable to find receiver: found {found}")]
    ReceiverNotFound { found: String },
    #[error("receiver clause not closed: expected `)`, found {found}")]
    ReceiverNotClosed { found: String },
    #[error("unable to find method name: found {found}")]
    MissingMethodName { found: String },
    #[error("expected `(` to open the parameter list, found {found}")]
    ParamsNotOpened { found: String },
    #[error("unexpected token while parsing arguments: {found}")]
    UnexpectedInParams { found: String },
    #[error("expected `(` to open the result list, found {found}")]
    ReturnsNotOpened { found: String },
    #[error("unexpected token in {context}: {found}")]
    UnexpectedToken {
        context: &'static str,
        found: String,
    },
    #[error("incomplete type expression `{text}` in {context}")]
    IncompleteType { context: &'static str, text: String },
    #[error("unterminated {context}")]
    Unterminated { context: &'static str },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} (at {span:?})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    Parse(String),
    #[error("template render error: {0}")]
    Render(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    #[error("{0}")]
    Lex(LexErrorKind),
    #[error("unexpected closing `{0}`")]
    UnexpectedClose(char),
    #[error("mismatched delimiter: `{open}` closed by `{close}`")]
    Mismatched { open: char, close: char },
    #[error("unclosed `{0}`")]
    Unclosed(char),
    #[error("empty list element before `,`")]
    EmptyElement,
    #[error("generated source is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("format error: {kind} (at {span:?})")]
pub struct FormatError {
    pub kind: FormatErrorKind,
    pub span: Span,
}

impl From<LexError> for FormatError {
    fn from(e: LexError) -> Self {
        Self {
            kind: FormatErrorKind::Lex(e.kind),
            span: e.span,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unable to find template: {name}")]
    NotFound { name: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to read template `{name}` from {}: {source}", path.display())]
    TemplateFile {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Any failure of the generate pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
