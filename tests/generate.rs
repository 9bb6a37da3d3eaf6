use pretty_assertions::assert_eq;
use skelgen::error::{FormatErrorKind, ParseErrorKind};
use skelgen::registry::{MOCK, STUB, TEST};
use skelgen::{format_source, generate, Error};

const ECHO: &str = "func (d *{{ ReceiverType }}) {{ Name }}({% for p in Parameters %}{% unless forloop.first %},{% endunless %}{{ p.Name }} {{ p.TypeExpr }}{% endfor %}) ({% for r in Returns %}{% unless forloop.first %},{% endunless %}{{ r }}{% endfor %}) {}";

fn gen(src: &str, template: &str, format: bool) -> String {
    match generate(src, template, format) {
        Ok(out) => String::from_utf8(out).unwrap(),
        Err(e) => panic!("generate failed for {src:?}: {e}"),
    }
}

#[test]
fn echo_template_formatted() {
    assert_eq!(
        gen("func (d *db) Update(x *a.D, y []a) (*a.DTO, error) {", ECHO, true),
        "func (d *db) Update(x *a.D, y []a) (*a.DTO, error) {}"
    );
}

#[test]
fn echo_template_unformatted_is_raw_render() {
    assert_eq!(
        gen("func (d *db) Update(x *a.D, y []a) (*a.DTO, error) {", ECHO, false),
        "func (d *db) Update(x *a.D,y []a) (*a.DTO,error) {}"
    );
}

#[test]
fn stub_template() {
    assert_eq!(
        gen("func (d *db) Save(x int, y ...string) error {", STUB, true),
        "func (r *db) Save(x int, y ...string) error {\n\tpanic(\"not implemented\")\n}\n"
    );
    assert_eq!(
        gen("func (d db) Close() {", STUB, true),
        "func (r *db) Close() {\n\tpanic(\"not implemented\")\n}\n"
    );
}

#[test]
fn mock_template_forwards_arguments() {
    assert_eq!(
        gen("func (d *db) Save(x int, y ...string) (int, error) {", MOCK, true),
        "func (m *dbMock) Save(x int, y ...string) (int, error) {\n\treturn m.SaveFunc(x, y...)\n}\n"
    );
    assert_eq!(
        gen("func (d db) Close() {", MOCK, true),
        "func (m *dbMock) Close() {\n\tm.CloseFunc()\n}\n"
    );
}

#[test]
fn test_template_formats_stably() {
    let out = gen("func (d *db) Get(id int, opts ...a.Opt) (*a.Row, error) {", TEST, true);

    assert!(out.starts_with("func Testdb_Get(t *testing.T) {\n"), "{out}");
    assert!(out.contains("\t\topts []a.Opt\n"), "{out}");
    assert!(out.contains("\t\twant1 error\n"), "{out}");
    assert!(out.contains("\t\t\tgot0, got1 := r.Get(tt.args.id, tt.args.opts...)\n"), "{out}");
    assert!(out.ends_with("\t}\n}\n"), "{out}");

    let again = String::from_utf8(format_source(out.as_bytes()).unwrap()).unwrap();
    assert_eq!(again, out);
}

#[test]
fn unnamed_parameters_get_synthesized_names() {
    let src = "func (d db) Handle(context.Context, string) error {";

    assert_eq!(
        gen(src, STUB, true),
        "func (r *db) Handle(arg0 context.Context, arg1 string) error {\n\tpanic(\"not implemented\")\n}\n"
    );
    assert_eq!(
        gen(src, MOCK, true),
        "func (m *dbMock) Handle(arg0 context.Context, arg1 string) error {\n\treturn m.HandleFunc(arg0, arg1)\n}\n"
    );

    let out = gen(src, TEST, true);
    assert!(out.contains("\t\targ0 context.Context\n\t\targ1 string\n"), "{out}");
    assert!(out.contains("\t\t\tgot0 := r.Handle(tt.args.arg0, tt.args.arg1)\n"), "{out}");
}

#[test]
fn mixed_named_and_grouped_parameters_keep_names() {
    assert_eq!(
        gen("func (d db) Move(x, y int) {", MOCK, true),
        "func (m *dbMock) Move(x int, y int) {\n\tm.MoveFunc(x, y)\n}\n"
    );
}

#[test]
fn parse_error_aborts() {
    let err = generate("(d db) Save() error {", STUB, true).unwrap_err();
    match err {
        Error::Parse(e) => assert!(matches!(e.kind, ParseErrorKind::MissingFunc { .. })),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn template_error_aborts() {
    let err = generate("func (d db) Save() error {", "{{ Nope }}", false).unwrap_err();
    assert!(matches!(err, Error::Template(_)), "{err}");
}

#[test]
fn format_error_aborts() {
    let err = generate("func (d db) Save() error {", "func {{ Name }}() {", true).unwrap_err();
    match err {
        Error::Format(e) => assert_eq!(e.kind, FormatErrorKind::Unclosed('{')),
        other => panic!("unexpected error: {other}"),
    }
    // The same template is fine when formatting is off.
    assert_eq!(
        gen("func (d db) Save() error {", "func {{ Name }}() {", false),
        "func Save() {"
    );
}
