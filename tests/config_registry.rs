use std::fs;

use pretty_assertions::assert_eq;
use skelgen::config::TemplateSource;
use skelgen::error::{ConfigError, RegistryError};
use skelgen::{generate, Config, TemplateRegistry};

#[test]
fn inline_and_file_templates() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("name.tmpl"), "{{ Name }}").unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
format = true

[templates]
recv = "{{ ReceiverType }}"
stub = "overridden"

[templates.name]
path = "name.tmpl"
"#,
    )
    .unwrap();

    let config = Config::discover(Some(path.as_path())).unwrap();
    assert!(config.format);
    assert_eq!(
        config.templates.get("name"),
        Some(&TemplateSource::File {
            path: "name.tmpl".into()
        })
    );

    let registry = TemplateRegistry::from_config(&config).unwrap();
    assert_eq!(
        registry.names().collect::<Vec<_>>(),
        vec!["mock", "name", "recv", "stub", "test"]
    );
    assert_eq!(registry.get("stub").unwrap(), "overridden");

    let src = "func (d *db) Save() error {";
    assert_eq!(generate(src, registry.get("recv").unwrap(), false).unwrap(), b"db");
    assert_eq!(generate(src, registry.get("name").unwrap(), false).unwrap(), b"Save");
}

#[test]
fn empty_config_is_default() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config, Config::default());
    assert!(!config.format);

    let registry = TemplateRegistry::from_config(&config).unwrap();
    assert_eq!(registry.len(), 3);
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::discover(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "{err}");
}

#[test]
fn unknown_keys_are_rejected() {
    let err = Config::from_toml_str("fromat = true").unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }), "{err}");
}

#[test]
fn missing_template_file_names_the_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[templates.gone]\npath = \"gone.tmpl\"\n").unwrap();

    let config = Config::load(&path).unwrap();
    match TemplateRegistry::from_config(&config).unwrap_err() {
        ConfigError::TemplateFile { name, path, .. } => {
            assert_eq!(name, "gone");
            assert_eq!(path, dir.path().join("gone.tmpl"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn lookup_of_unknown_template() {
    let registry = TemplateRegistry::with_builtins();
    assert_eq!(
        registry.get("Bench").unwrap_err(),
        RegistryError::NotFound {
            name: "Bench".into()
        }
    );
}
