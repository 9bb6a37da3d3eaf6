//! Canonical layout for generated Go source.
//!
//! This is not gofmt: it never reorders or rewraps anything. It re-spaces the
//! tokens of each line, re-indents lines with tabs, collapses runs of blank
//! lines, and refuses input whose delimiters do not balance. Where spacing is
//! ambiguous without a full parse (`x *T` versus `x * y`, `f() (T)` versus
//! `f()(x)`) the presence of whitespace in the input decides.

use smallvec::SmallVec;
use tracing::debug;

use crate::error::{FormatError, FormatErrorKind, Span};
use crate::lexer::{is_keyword, raw_tokens, RawTok, RawToken};

/// Reformats `src`, or fails without returning partially formatted text.
pub fn format_source(src: &[u8]) -> Result<Vec<u8>, FormatError> {
    let text = std::str::from_utf8(src).map_err(|e| FormatError {
        kind: FormatErrorKind::InvalidUtf8,
        span: e.valid_up_to()..src.len(),
    })?;
    let out = Formatter::new(text).run()?;
    debug!(input = src.len(), output = out.len(), "formatted source");
    Ok(out.into_bytes())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenKind {
    Paren,
    /// `a[i]`
    Index,
    /// `[]T`, `[N]T`, `map[K]V`
    TypeBrack,
    /// `{` of a block or a multi-line body.
    Block,
    /// `T{...}`
    Composite,
}

#[derive(Debug, Clone)]
struct Open {
    ch: char,
    kind: OpenKind,
    span: Span,
    line: usize,
    /// Whether this delimiter raised the indent level.
    indents: bool,
}

/// A token already written on the current line.
struct Emitted<'src> {
    kind: RawTok,
    text: &'src str,
    index: usize,
    unary: bool,
    type_close: bool,
    block_open: bool,
}

impl Emitted<'_> {
    fn is_keyword(&self) -> bool {
        self.kind == RawTok::Ident && is_keyword(self.text)
    }

    /// Whether an expression or type can end with this token.
    fn is_operand(&self) -> bool {
        match self.kind {
            RawTok::Ident => !is_keyword(self.text),
            RawTok::Number | RawTok::String | RawTok::RawString | RawTok::Rune => true,
            RawTok::RParen | RawTok::RBrace => true,
            RawTok::RBrack => !self.type_close,
            _ => false,
        }
    }
}

struct LineInfo {
    no: usize,
    /// Line mentions a keyword whose clause ends in a block.
    control: bool,
    starts_with_func: bool,
}

struct Formatter<'src> {
    src: &'src str,
    stack: SmallVec<[Open; 16]>,
    level: usize,
    /// Last non-comment token, across lines.
    last: Option<RawTok>,
}

impl<'src> Formatter<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            src,
            stack: SmallVec::new(),
            level: 0,
            last: None,
        }
    }

    fn run(mut self) -> Result<String, FormatError> {
        let toks = raw_tokens(self.src)?;
        let multiline = toks.iter().any(|t| t.kind == RawTok::Newline);

        let mut lines: Vec<String> = Vec::new();
        for (no, line) in toks.split(|t| t.kind == RawTok::Newline).enumerate() {
            if line.is_empty() {
                // Collapse blank runs; drop leading blanks.
                if lines.last().is_some_and(|l| !l.is_empty()) {
                    lines.push(String::new());
                }
                continue;
            }
            lines.push(self.format_line(no, line)?);
        }

        if let Some(open) = self.stack.last() {
            return Err(FormatError {
                kind: FormatErrorKind::Unclosed(open.ch),
                span: open.span.clone(),
            });
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        let mut out = lines.join("\n");
        if multiline && !out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }

    fn format_line(&mut self, no: usize, line: &[RawToken<'src>]) -> Result<String, FormatError> {
        let info = LineInfo {
            no,
            control: line.iter().any(|t| {
                t.kind == RawTok::Ident && matches!(t.text, "if" | "for" | "switch" | "select" | "else")
            }),
            starts_with_func: line[0].kind == RawTok::Ident && line[0].text == "func",
        };

        let mut indent = self.level;
        let mut leading = true;
        let mut low = self.stack.len();
        let mut body = String::new();
        let mut emitted: Vec<Emitted<'src>> = Vec::with_capacity(line.len());

        for (i, tok) in line.iter().enumerate() {
            // `f(,)`, `a,, b`: a comma needs an element before it.
            if tok.kind == RawTok::Comma
                && matches!(
                    self.last,
                    None | Some(RawTok::LParen | RawTok::LBrack | RawTok::LBrace | RawTok::Comma)
                )
            {
                return Err(FormatError {
                    kind: FormatErrorKind::EmptyElement,
                    span: tok.span.clone(),
                });
            }
            if !matches!(tok.kind, RawTok::LineComment | RawTok::BlockComment) {
                self.last = Some(tok.kind);
            }

            let ws_before = self.ws_before(&tok.span);
            let prev = emitted.last();
            let unary = Self::is_unary(prev, tok, ws_before, self.ws_after(&tok.span));

            let space = match prev {
                Some(p) => self.space_between(&info, p, tok, ws_before, line.get(i + 1)),
                None => false,
            };
            if space {
                body.push(' ');
            }
            body.push_str(tok.text);

            let mut type_close = false;
            let mut block_open = false;
            match tok.kind {
                RawTok::LParen => self.push('(', OpenKind::Paren, tok, no),
                RawTok::LBrack => {
                    let kind = if Self::is_type_brack(prev, ws_before, line.get(i + 1)) {
                        OpenKind::TypeBrack
                    } else {
                        OpenKind::Index
                    };
                    self.push('[', kind, tok, no);
                }
                RawTok::LBrace => {
                    block_open = prev.is_none() || space;
                    let kind = if block_open {
                        OpenKind::Block
                    } else {
                        OpenKind::Composite
                    };
                    self.push('{', kind, tok, no);
                }
                RawTok::RParen | RawTok::RBrack | RawTok::RBrace => {
                    let open = self.pop(tok)?;
                    type_close = open.kind == OpenKind::TypeBrack;
                    if open.indents {
                        self.level = self.level.saturating_sub(1);
                    }
                    low = low.min(self.stack.len());
                    if leading {
                        indent = self.level;
                    }
                }
                _ => {}
            }
            if !matches!(tok.kind, RawTok::RParen | RawTok::RBrack | RawTok::RBrace) {
                leading = false;
            }

            emitted.push(Emitted {
                kind: tok.kind,
                text: tok.text,
                index: i,
                unary,
                type_close,
                block_open,
            });
        }

        // Only the innermost delimiter left open on a line indents what follows.
        if self.stack.len() > low {
            if let Some(open) = self.stack.last_mut() {
                open.indents = true;
                self.level += 1;
            }
        }

        if line[0].kind == RawTok::Ident && matches!(line[0].text, "case" | "default") {
            indent = indent.saturating_sub(1);
        }

        let mut out = "\t".repeat(indent);
        out.push_str(&body);
        Ok(out)
    }

    fn push(&mut self, ch: char, kind: OpenKind, tok: &RawToken<'_>, line: usize) {
        self.stack.push(Open {
            ch,
            kind,
            span: tok.span.clone(),
            line,
            indents: false,
        });
    }

    fn pop(&mut self, tok: &RawToken<'_>) -> Result<Open, FormatError> {
        let close = match tok.kind {
            RawTok::RParen => ')',
            RawTok::RBrack => ']',
            _ => '}',
        };
        let open = self.stack.pop().ok_or_else(|| FormatError {
            kind: FormatErrorKind::UnexpectedClose(close),
            span: tok.span.clone(),
        })?;
        let expected = match open.ch {
            '(' => ')',
            '[' => ']',
            _ => '}',
        };
        if expected != close {
            return Err(FormatError {
                kind: FormatErrorKind::Mismatched {
                    open: open.ch,
                    close,
                },
                span: tok.span.clone(),
            });
        }
        Ok(open)
    }

    fn ws_before(&self, span: &Span) -> bool {
        matches!(self.src.as_bytes()[..span.start].last(), Some(b' ' | b'\t'))
    }

    fn ws_after(&self, span: &Span) -> bool {
        self.src
            .as_bytes()
            .get(span.end)
            .map_or(true, |b| b.is_ascii_whitespace())
    }

    fn is_unary(prev: Option<&Emitted<'_>>, tok: &RawToken<'_>, ws_before: bool, ws_after: bool) -> bool {
        match tok.kind {
            RawTok::Bang => true,
            RawTok::Star
            | RawTok::Amp
            | RawTok::Minus
            | RawTok::Plus
            | RawTok::Caret
            | RawTok::Arrow
            | RawTok::Tilde => match prev {
                Some(p) if p.is_operand() => ws_before && !ws_after,
                _ => true,
            },
            _ => false,
        }
    }

    fn is_type_brack(prev: Option<&Emitted<'_>>, ws_before: bool, next: Option<&RawToken<'_>>) -> bool {
        match prev {
            Some(p) if p.is_operand() => ws_before || next.is_some_and(|n| n.kind == RawTok::RBrack),
            _ => true,
        }
    }

    fn space_between(
        &self,
        line: &LineInfo,
        prev: &Emitted<'_>,
        tok: &RawToken<'_>,
        ws_before: bool,
        next: Option<&RawToken<'_>>,
    ) -> bool {
        use RawTok::*;

        let next_is = |kind: RawTok| next.is_some_and(|n| n.kind == kind);

        match (prev.kind, tok.kind) {
            (_, LineComment | BlockComment) | (BlockComment, _) => true,
            (_, Comma | Semi | RParen | RBrack | Dot | Colon | Inc | Dec) => false,
            (LParen | LBrack | Dot | Ellipsis, _) => false,
            (Comma | Semi, _) => true,
            // `a[lo:hi]` stays tight; `key: value` and `case x:` do not.
            (Colon, _) => !matches!(self.stack.last(), Some(open) if open.kind == OpenKind::Index),
            _ if prev.unary || prev.type_close => false,
            (_, Ellipsis) => ws_before,

            // Method declarations keep `func (recv)`; literals are `func(...)`.
            (Ident, LParen) if prev.text == "func" => line.starts_with_func && prev.index == 0,
            (Ident, LParen) if prev.is_keyword() => true,
            (Ident, LParen) => false,
            (RParen | RBrack | RBrace, LParen) => ws_before,
            (_, LParen) => true,

            (Ident, LBrack) if prev.text == "map" => false,
            (_, LBrack) if prev.is_operand() => ws_before || next_is(RBrack),
            (_, LBrack) => true,

            (Ident, LBrace) if matches!(prev.text, "struct" | "interface") && next_is(RBrace) => false,
            (Ident, LBrace) if prev.is_keyword() => true,
            (RParen, LBrace) => true,
            // `f() T {` opens a body; `T{` is a composite literal.
            (_, LBrace) if prev.is_operand() => (line.control || line.starts_with_func) && ws_before,
            (_, LBrace) => true,

            (LBrace, RBrace) => false,
            (LBrace, _) => prev.block_open,
            (_, RBrace) => match self.stack.last() {
                Some(open) if open.line == line.no => open.kind == OpenKind::Block,
                Some(_) => ws_before,
                None => false,
            },

            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(src: &str) -> String {
        String::from_utf8(format_source(src.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn respaces_signature() {
        assert_eq!(
            fmt("func (d *db) Update(x *a.D,y []a) (*a.DTO,error) {}"),
            "func (d *db) Update(x *a.D, y []a) (*a.DTO, error) {}"
        );
    }

    #[test]
    fn bare_result_keeps_body_brace() {
        assert_eq!(fmt("func (d db) Save()  error   {}"), "func (d db) Save() error {}");
        assert_eq!(fmt("x := T{}"), "x := T{}");
    }

    #[test]
    fn binary_operators_get_spaces() {
        assert_eq!(fmt("x:=a*b+c"), "x := a * b + c");
    }

    #[test]
    fn compound_operators_are_spaced() {
        assert_eq!(fmt("a<<=b&&c!=d"), "a <<= b && c != d");
        assert_eq!(fmt("ok:=x&^y>=1"), "ok := x &^ y >= 1");
    }

    #[test]
    fn unary_operators_stay_tight() {
        assert_eq!(fmt("if !ok { return &T{}, -1 }"), "if !ok { return &T{}, -1 }");
    }

    #[test]
    fn slices_and_maps() {
        assert_eq!(fmt("m := map[string][]*a.B{}"), "m := map[string][]*a.B{}");
        assert_eq!(fmt("y := xs[1 : 2]"), "y := xs[1:2]");
    }

    #[test]
    fn reindents_nested_blocks() {
        let src = "func f() {\nfor _, x := range xs {\n    if x {\n  g(x)\n}\n}\n}\n";
        let want = "func f() {\n\tfor _, x := range xs {\n\t\tif x {\n\t\t\tg(x)\n\t\t}\n\t}\n}\n";
        assert_eq!(fmt(src), want);
    }

    #[test]
    fn one_indent_per_line_of_openers() {
        let src = "t.Run(name, func(t *testing.T) {\nrun(t)\n})\n";
        assert_eq!(fmt(src), "t.Run(name, func(t *testing.T) {\n\trun(t)\n})\n");
    }

    #[test]
    fn collapses_blank_lines() {
        assert_eq!(fmt("\n\na()\n\n\n\nb()\n\n"), "a()\n\nb()\n");
    }

    #[test]
    fn case_labels_align_with_switch() {
        let src = "switch x {\ncase 1:\nf()\ndefault:\ng()\n}\n";
        assert_eq!(fmt(src), "switch x {\ncase 1:\n\tf()\ndefault:\n\tg()\n}\n");
    }

    #[test]
    fn keeps_comments_and_strings() {
        assert_eq!(fmt("f(\"a,b\")   // note"), "f(\"a,b\") // note");
    }

    #[test]
    fn rejects_unbalanced() {
        let err = format_source(b"func f() {").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::Unclosed('{'));

        let err = format_source(b"f())").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::UnexpectedClose(')'));

        let err = format_source(b"f(]").unwrap_err();
        assert_eq!(
            err.kind,
            FormatErrorKind::Mismatched {
                open: '(',
                close: ']'
            }
        );
    }

    #[test]
    fn rejects_empty_list_elements() {
        for src in ["m.F(,)", "f(a,, b)", "xs := []int{, 1}", "f(\n\t// c\n\t,\n)"] {
            let err = format_source(src.as_bytes()).unwrap_err();
            assert_eq!(err.kind, FormatErrorKind::EmptyElement, "{src}");
        }
    }

    #[test]
    fn trailing_comma_is_kept() {
        assert_eq!(fmt("f(a, b,)"), "f(a, b,)");
        assert_eq!(fmt("f(\na,\n)\n"), "f(\n\ta,\n)\n");
    }

    #[test]
    fn rejects_non_go_characters() {
        let err = format_source(b"func f() { $ }").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::Lex(crate::error::LexErrorKind::InvalidToken));
    }
}
