//! Liquid rendering of a parsed [`Method`].
//!
//! Templates see the method through its serialized field names:
//!
//! ```text
//! func (x *{{ ReceiverType }}) {{ Name }}({% for p in Parameters %}{% unless forloop.first %}, {% endunless %}{{ p.Name }} {{ p.TypeExpr }}{% endfor %})
//! ```
//!
//! Referencing a field the method does not expose is a render error.

use tracing::debug;

use crate::ast::Method;
use crate::error::TemplateError;

/// Template renderer with Liquid configuration
pub struct TemplateRenderer {
    parser: liquid::Parser,
}

impl TemplateRenderer {
    /// Creates a renderer with the Liquid standard tags and filters.
    pub fn new() -> Result<Self, TemplateError> {
        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| TemplateError::Parse(format!("failed to build Liquid parser: {e}")))?;
        Ok(Self { parser })
    }

    pub fn render(&self, method: &Method, template: &str) -> Result<Vec<u8>, TemplateError> {
        let template = self
            .parser
            .parse(template)
            .map_err(|e| TemplateError::Parse(e.to_string()))?;
        let globals = liquid::to_object(method).map_err(|e| TemplateError::Render(e.to_string()))?;

        let mut buf = Vec::new();
        template
            .render_to(&mut buf, &globals)
            .map_err(|e| TemplateError::Render(e.to_string()))?;
        debug!(method = method.name(), bytes = buf.len(), "rendered template");
        Ok(buf)
    }
}

/// Renders `template` against `method` with a one-off renderer.
pub fn render(method: &Method, template: &str) -> Result<Vec<u8>, TemplateError> {
    TemplateRenderer::new()?.render(method, template)
}
