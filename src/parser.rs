//! Recognizer for a single method signature.
//!
//! Two signature shapes are tried in order, each over its own freshly scanned
//! token stream:
//!
//! 1. bare single result: `func (d *db) Save(x int) error {`
//! 2. parenthesized results: `func (d *db) Get(x int) (int, error) {`
//!
//! The first shape that accepts the input wins. When both reject it, the
//! error of the parenthesized attempt is reported.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::ast::{Method, Parameter};
use crate::error::{ParseError, ParseErrorKind, Span};
use crate::lexer::{tokenize, SpannedTok, Tok};

type PResult<T> = Result<T, ParseError>;

/// A signature shape: a pure function over a complete token stream.
pub type Grammar = fn(&[SpannedTok]) -> PResult<Method>;

/// Candidate shapes in priority order.
const GRAMMARS: [(&str, Grammar); 2] = [
    ("bare result", parse_bare_result),
    ("parenthesized results", parse_paren_results),
];

/// Parses `src` into a [`Method`].
pub fn parse(src: &str) -> PResult<Method> {
    let [first, rest @ ..] = GRAMMARS;
    rest.into_iter()
        .fold(attempt(first, src), |res, next| res.or_else(|_| attempt(next, src)))
}

fn attempt((label, grammar): (&str, Grammar), src: &str) -> PResult<Method> {
    let toks = tokenize(src);
    trace!(grammar = label, tokens = toks.len(), "trying grammar");
    grammar(&toks).inspect_err(|err| debug!(grammar = label, error = %err, "grammar rejected signature"))
}

/// Grammar A: header followed by one unparenthesized result type that runs up
/// to `{` or the end of input.
pub fn parse_bare_result(toks: &[SpannedTok]) -> PResult<Method> {
    let mut cur = Cursor::new(toks);
    let header = parse_header(&mut cur)?;
    let slot = parse_type_expr(&mut cur, TypeContext::BareResult)?;
    Ok(header.finish(slot.text.into_iter().collect()))
}

/// Grammar B: header followed by a parenthesized, comma separated result list.
pub fn parse_paren_results(toks: &[SpannedTok]) -> PResult<Method> {
    let mut cur = Cursor::new(toks);
    let header = parse_header(&mut cur)?;
    let returns = parse_result_list(&mut cur)?;
    Ok(header.finish(returns))
}

static EOF: Tok = Tok::Eof;

struct Cursor<'t> {
    toks: &'t [SpannedTok],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn new(toks: &'t [SpannedTok]) -> Self {
        Self { toks, pos: 0 }
    }

    /// Next token; keeps yielding `Eof` once the stream is exhausted.
    fn bump(&mut self) -> (&'t Tok, Span) {
        match self.toks.get(self.pos) {
            Some((start, tok, end)) => {
                self.pos += 1;
                (tok, *start..*end)
            }
            None => {
                let end = self.toks.last().map_or(0, |(_, _, end)| *end);
                (&EOF, end..end)
            }
        }
    }
}

fn fail<T>(kind: ParseErrorKind, span: Span) -> PResult<T> {
    Err(ParseError::new(kind, span))
}

/// Everything before the results.
struct Header {
    receiver_type: String,
    name: String,
    parameters: Vec<Parameter>,
}

impl Header {
    fn finish(self, returns: Vec<String>) -> Method {
        Method::new(self.receiver_type, self.name, self.parameters, returns)
    }
}

fn parse_header(cur: &mut Cursor<'_>) -> PResult<Header> {
    let receiver_type = parse_receiver(cur)?;
    let name = parse_method_name(cur)?;
    let parameters = parse_params(cur)?;
    Ok(Header {
        receiver_type,
        name,
        parameters,
    })
}

// func (d *db)
fn parse_receiver(cur: &mut Cursor<'_>) -> PResult<String> {
    let not_found = |tok: &Tok, span: Span| {
        fail(
            ParseErrorKind::ReceiverNotFound {
                found: tok.to_string(),
            },
            span,
        )
    };

    let (tok, span) = cur.bump();
    if *tok != Tok::KwFunc {
        return fail(
            ParseErrorKind::MissingFunc {
                found: tok.to_string(),
            },
            span,
        );
    }

    let (tok, span) = cur.bump();
    if *tok != Tok::LParen {
        return not_found(tok, span);
    }

    // Receiver variable name; not kept.
    let (tok, span) = cur.bump();
    if !matches!(tok, Tok::Ident(_)) {
        return not_found(tok, span);
    }

    let receiver_type = match cur.bump() {
        (Tok::Ident(name), _) => name.clone(),
        (Tok::Star, _) => match cur.bump() {
            (Tok::Ident(name), _) => name.clone(),
            (tok, span) => return not_found(tok, span),
        },
        (tok, span) => return not_found(tok, span),
    };

    let (tok, span) = cur.bump();
    if *tok != Tok::RParen {
        return fail(
            ParseErrorKind::ReceiverNotClosed {
                found: tok.to_string(),
            },
            span,
        );
    }

    Ok(receiver_type)
}

// Update
fn parse_method_name(cur: &mut Cursor<'_>) -> PResult<String> {
    match cur.bump() {
        (Tok::Ident(name), _) => Ok(name.clone()),
        (tok, span) => fail(
            ParseErrorKind::MissingMethodName {
                found: tok.to_string(),
            },
            span,
        ),
    }
}

/// A parameter slot as written, before grouped names are resolved.
enum ParamDecl {
    /// `x int`
    Named { name: String, typ: String },
    /// `a` in `a, b int`, or a bare type in an unnamed list.
    NameOnly(String),
    /// `context.Context` in an unnamed list.
    Unnamed(String),
}

// (ctx context.Context, userID data.UserID, value data.UserDTO)
fn parse_params(cur: &mut Cursor<'_>) -> PResult<Vec<Parameter>> {
    let (tok, span) = cur.bump();
    if *tok != Tok::LParen {
        return fail(
            ParseErrorKind::ParamsNotOpened {
                found: tok.to_string(),
            },
            span,
        );
    }

    let mut decls = Vec::new();
    loop {
        match cur.bump() {
            (Tok::RParen, _) => break,
            (Tok::Ident(name), _) => {
                let slot = parse_type_expr(cur, TypeContext::Param)?;
                let decl = match slot.text {
                    None => ParamDecl::NameOnly(name.clone()),
                    // The identifier was a package qualifier, not a name.
                    Some(typ) if slot.qualified => ParamDecl::Unnamed(format!("{name}{typ}")),
                    Some(typ) => ParamDecl::Named {
                        name: name.clone(),
                        typ,
                    },
                };
                decls.push(decl);
                if slot.flow == Flow::Stop {
                    break;
                }
            }
            (Tok::Eof, span) => {
                return fail(
                    ParseErrorKind::Unterminated {
                        context: TypeContext::Param.label(),
                    },
                    span,
                )
            }
            (tok, span) => {
                return fail(
                    ParseErrorKind::UnexpectedInParams {
                        found: tok.to_string(),
                    },
                    span,
                )
            }
        }
    }

    Ok(resolve_params(decls))
}

/// Gives grouped names (`a, b int`) the type that follows them. A list where
/// no slot has both a name and a type is a list of unnamed parameters.
fn resolve_params(decls: Vec<ParamDecl>) -> Vec<Parameter> {
    let unnamed = !decls.iter().any(|d| matches!(d, ParamDecl::Named { .. }));
    let mut out = Vec::with_capacity(decls.len());

    if unnamed {
        for decl in decls {
            let typ = match decl {
                ParamDecl::NameOnly(typ) | ParamDecl::Unnamed(typ) => typ,
                ParamDecl::Named { typ, .. } => typ,
            };
            out.push(Parameter::new("", typ));
        }
        return out;
    }

    let mut pending: SmallVec<[String; 4]> = SmallVec::new();
    for decl in decls {
        match decl {
            ParamDecl::NameOnly(name) => pending.push(name),
            ParamDecl::Named { name, typ } => {
                for grouped in pending.drain(..) {
                    out.push(Parameter::new(grouped, typ.clone()));
                }
                out.push(Parameter::new(name, typ));
            }
            ParamDecl::Unnamed(typ) => out.push(Parameter::new("", typ)),
        }
    }
    // Names with no type after them.
    out.extend(pending.into_iter().map(|name| Parameter::new(name, "")));
    out
}

// (string, error)
fn parse_result_list(cur: &mut Cursor<'_>) -> PResult<Vec<String>> {
    let (tok, span) = cur.bump();
    if *tok != Tok::LParen {
        return fail(
            ParseErrorKind::ReturnsNotOpened {
                found: tok.to_string(),
            },
            span,
        );
    }

    let mut returns = Vec::new();
    loop {
        let slot = parse_type_expr(cur, TypeContext::ParenResult)?;
        returns.extend(slot.text);
        if slot.flow == Flow::Stop {
            return Ok(returns);
        }
    }
}

/// Whether a type expression was followed by more list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeContext {
    Param,
    ParenResult,
    BareResult,
}

impl TypeContext {
    fn label(self) -> &'static str {
        match self {
            TypeContext::Param => "parameter list",
            TypeContext::ParenResult => "result list",
            TypeContext::BareResult => "result type",
        }
    }

    fn terminator(self, tok: &Tok) -> Option<Flow> {
        match (self, tok) {
            (TypeContext::Param | TypeContext::ParenResult, Tok::Comma) => Some(Flow::Continue),
            (TypeContext::Param | TypeContext::ParenResult, Tok::RParen) => Some(Flow::Stop),
            (TypeContext::BareResult, Tok::LBrace | Tok::Eof) => Some(Flow::Stop),
            _ => None,
        }
    }
}

/// One list slot as read by [`parse_type_expr`].
#[derive(Debug)]
struct Slot {
    /// `None` for an empty slot (`a` in `a, b int`).
    text: Option<String>,
    flow: Flow,
    /// The slot began with `.`: the identifier before it was a package name.
    qualified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeState {
    /// Expecting a prefix marker or an identifier.
    Prefix,
    /// Just read an identifier; only `.` or a terminator may follow.
    Ident,
}

// *[]a.B
// []*a.B
// a.B
// ...a
fn parse_type_expr(cur: &mut Cursor<'_>, ctx: TypeContext) -> PResult<Slot> {
    let mut text = String::new();
    let mut state = TypeState::Prefix;
    let mut qualified = false;

    loop {
        let (tok, span) = cur.bump();

        if let Some(flow) = ctx.terminator(tok) {
            return match state {
                TypeState::Ident => Ok(Slot {
                    text: Some(text),
                    flow,
                    qualified,
                }),
                TypeState::Prefix if !text.is_empty() => fail(
                    ParseErrorKind::IncompleteType {
                        context: ctx.label(),
                        text,
                    },
                    span,
                ),
                // `(int, , error)` has an empty slot; `a, b int` does not.
                TypeState::Prefix if ctx == TypeContext::ParenResult && flow == Flow::Continue => {
                    fail(
                        ParseErrorKind::UnexpectedToken {
                            context: ctx.label(),
                            found: tok.to_string(),
                        },
                        span,
                    )
                }
                TypeState::Prefix => Ok(Slot {
                    text: None,
                    flow,
                    qualified,
                }),
            };
        }

        state = match (state, tok) {
            (TypeState::Prefix, Tok::Star) => {
                text.push('*');
                TypeState::Prefix
            }
            (TypeState::Prefix, Tok::LBrack) => {
                text.push('[');
                TypeState::Prefix
            }
            (TypeState::Prefix, Tok::RBrack) => {
                text.push(']');
                TypeState::Prefix
            }
            (TypeState::Prefix, Tok::Ellipsis) if ctx == TypeContext::Param => {
                text.push_str("...");
                TypeState::Prefix
            }
            // Leading `.Context` after a package name read as a parameter name.
            (TypeState::Prefix, Tok::Dot) if ctx == TypeContext::Param && text.is_empty() => {
                text.push('.');
                qualified = true;
                TypeState::Prefix
            }
            (TypeState::Prefix, Tok::Ident(name)) => {
                text.push_str(name);
                TypeState::Ident
            }
            (TypeState::Ident, Tok::Dot) => {
                text.push('.');
                TypeState::Prefix
            }
            (_, Tok::Eof) => {
                return fail(
                    ParseErrorKind::Unterminated {
                        context: ctx.label(),
                    },
                    span,
                )
            }
            (_, tok) => {
                return fail(
                    ParseErrorKind::UnexpectedToken {
                        context: ctx.label(),
                        found: tok.to_string(),
                    },
                    span,
                )
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(src: &str) -> Vec<(String, String)> {
        let toks = tokenize(src);
        let mut cur = Cursor::new(&toks);
        parse_params(&mut cur)
            .unwrap()
            .into_iter()
            .map(|p| (p.name().to_string(), p.type_expr().to_string()))
            .collect()
    }

    fn pair(name: &str, typ: &str) -> (String, String) {
        (name.to_string(), typ.to_string())
    }

    #[test]
    fn cursor_repeats_eof() {
        let toks = tokenize("x");
        let mut cur = Cursor::new(&toks);
        assert_eq!(cur.bump().0, &Tok::Ident("x".into()));
        assert_eq!(cur.bump(), (&Tok::Eof, 1..1));
        assert_eq!(cur.bump(), (&Tok::Eof, 1..1));
    }

    #[test]
    fn grouped_names_share_type() {
        assert_eq!(
            params("(a, b int, c *x.Y)"),
            vec![pair("a", "int"), pair("b", "int"), pair("c", "*x.Y")]
        );
    }

    #[test]
    fn unnamed_parameters_keep_types() {
        assert_eq!(
            params("(int, context.Context, string)"),
            vec![pair("", "int"), pair("", "context.Context"), pair("", "string")]
        );
    }

    #[test]
    fn variadic_keeps_its_name() {
        assert_eq!(
            params("(x int, y ...string)"),
            vec![pair("x", "int"), pair("y", "...string")]
        );
        assert_eq!(params("(opts ...a.Opt)"), vec![pair("opts", "...a.Opt")]);
    }

    #[test]
    fn package_qualifier_is_not_a_name() {
        assert_eq!(params("(context.Context)"), vec![pair("", "context.Context")]);
        assert_eq!(params("(ctx context.Context)"), vec![pair("ctx", "context.Context")]);
    }

    #[test]
    fn trailing_comma_closes_list() {
        assert_eq!(params("(x int,)"), vec![pair("x", "int")]);
    }

    #[test]
    fn ellipsis_only_in_parameters() {
        let toks = tokenize("func (d db) F() (...int) {");
        let err = parse_paren_results(&toks).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }), "{err}");
    }

    #[test]
    fn bare_grammar_rejects_comma() {
        let toks = tokenize("func (d db) F() int, error {");
        let err = parse_bare_result(&toks).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnexpectedToken {
                context: "result type",
                found: "`,`".into(),
            }
        );
    }

    #[test]
    fn bare_grammar_rejects_parenthesized_results() {
        let toks = tokenize("func (d db) F() (int, error) {");
        assert!(parse_bare_result(&toks).is_err());
        assert!(parse_paren_results(&toks).is_ok());
    }

    #[test]
    fn dangling_prefix_is_incomplete() {
        let toks = tokenize("func (d db) F(x *) error {");
        let err = parse_bare_result(&toks).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::IncompleteType {
                context: "parameter list",
                text: "*".into(),
            }
        );
    }
}
