//! Named templates available to the generator.
//!
//! The registry is an ordinary value built by the application at startup:
//! built-in templates first, then whatever the user's config adds or
//! overrides.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::Config;
use crate::error::{ConfigError, RegistryError};

// Template fragments shared by the built-ins. Unnamed parameters get `argN`.
macro_rules! param_name {
    () => {
        r#"{% if p.Name == "" %}arg{{ forloop.index0 }}{% else %}{{ p.Name }}{% endif %}"#
    };
}

macro_rules! param_list {
    () => {
        concat!(
            r#"{% for p in Parameters %}{% unless forloop.first %}, {% endunless %}"#,
            param_name!(),
            r#" {{ p.TypeExpr }}{% endfor %}"#
        )
    };
}

// Passes every parameter on, spreading variadics.
macro_rules! call_args {
    ($prefix:literal) => {
        concat!(
            r#"{% for p in Parameters %}{% unless forloop.first %}, {% endunless %}"#,
            $prefix,
            param_name!(),
            r#"{% if p.TypeExpr contains "..." %}...{% endif %}{% endfor %}"#
        )
    };
}

// ` T`, ` (T1, T2)` or nothing, matching how Go writes result lists.
macro_rules! result_list {
    () => {
        concat!(
            r#"{% if Returns.size == 1 %} {{ Returns[0] }}"#,
            r#"{% elsif Returns.size > 1 %} ({% for r in Returns %}{% unless forloop.first %}, {% endunless %}{{ r }}{% endfor %}){% endif %}"#
        )
    };
}

/// Method stub echoing the signature, with a panicking body.
pub const STUB: &str = concat!(
    "func (r *{{ ReceiverType }}) {{ Name }}(",
    param_list!(),
    ")",
    result_list!(),
    " {\n\tpanic(\"not implemented\")\n}\n"
);

/// Mock method delegating to a function field on `<Receiver>Mock`.
pub const MOCK: &str = concat!(
    "func (m *{{ ReceiverType }}Mock) {{ Name }}(",
    param_list!(),
    ")",
    result_list!(),
    " {\n\t{% if Returns.size > 0 %}return {% endif %}m.{{ Name }}Func(",
    call_args!(""),
    ")\n}\n"
);

/// Table-driven test skeleton.
pub const TEST: &str = concat!(
    "func Test{{ ReceiverType }}_{{ Name }}(t *testing.T) {\n",
    "\ttype args struct {\n",
    "{% for p in Parameters %}\t\t",
    param_name!(),
    r#" {{ p.TypeExpr | replace: "...", "[]" }}"#,
    "\n{% endfor %}\t}\n",
    "\ttests := []struct {\n",
    "\t\tname string\n",
    "\t\targs args\n",
    "{% for r in Returns %}\t\twant{{ forloop.index0 }} {{ r }}\n{% endfor %}",
    "\t}{\n",
    "\t\t// add test cases here\n",
    "\t}\n",
    "\tfor _, tt := range tests {\n",
    "\t\tt.Run(tt.name, func(t *testing.T) {\n",
    "\t\t\tvar r {{ ReceiverType }}\n",
    "\t\t\t{% for r in Returns %}{% unless forloop.first %}, {% endunless %}got{{ forloop.index0 }}{% endfor %}",
    "{% if Returns.size > 0 %} := {% endif %}r.{{ Name }}(",
    call_args!("tt.args."),
    ")\n",
    "{% for r in Returns %}\t\t\tif !reflect.DeepEqual(got{{ forloop.index0 }}, tt.want{{ forloop.index0 }}) {\n",
    "\t\t\t\tt.Errorf(\"{{ Name }}() got{{ forloop.index0 }} = %v, want %v\", got{{ forloop.index0 }}, tt.want{{ forloop.index0 }})\n",
    "\t\t\t}\n",
    "{% endfor %}\t\t})\n",
    "\t}\n",
    "}\n"
);

#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, String>,
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the `stub`, `mock` and `test` templates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert("stub", STUB);
        registry.insert("mock", MOCK);
        registry.insert("test", TEST);
        registry
    }

    /// Built-ins plus every template declared in `config`; config entries
    /// replace built-ins of the same name.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut registry = Self::with_builtins();
        for (name, template) in config.load_templates()? {
            debug!(template = %name, "registering template from config");
            registry.insert(name, template);
        }
        Ok(registry)
    }

    /// Adds or replaces a template, returning the previous text.
    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<String>) -> Option<String> {
        self.templates.insert(name.into(), template.into())
    }

    pub fn get(&self, name: &str) -> Result<&str, RegistryError> {
        self.templates
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Template names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
