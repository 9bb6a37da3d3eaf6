use tracing::debug;

use crate::error::Result;
use crate::format::format_source;
use crate::parser::parse;
use crate::render::render;

/// Generates source from a method signature and a Liquid template.
///
/// Parses `src`, renders `template` against the result and, when
/// `should_format` is set, runs the output through [`format_source`]. Any
/// failure aborts the whole pipeline; no partial output is returned.
pub fn generate(src: &str, template: &str, should_format: bool) -> Result<Vec<u8>> {
    let method = parse(src)?;
    debug!(
        receiver = method.receiver_type(),
        method = method.name(),
        params = method.parameters().len(),
        returns = method.returns().len(),
        "parsed signature"
    );

    let rendered = render(&method, template)?;
    if !should_format {
        return Ok(rendered);
    }
    Ok(format_source(&rendered)?)
}
