//! Go method signature parsing and template-driven code generation.
//!
//! - The lexer uses Logos and classifies tokens for the signature grammar.
//! - The parser tries a bare-result grammar, then a parenthesized-results one.
//! - Rendering uses Liquid; the optional formatter normalizes Go layout.

pub mod ast;
pub mod config;
pub mod error;
pub mod format;
pub mod generate;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod render;

// Re-exports for convenience
pub use ast::{Method, Parameter};
pub use config::Config;
pub use error::{Error, ParseError, Result};
pub use format::format_source;
pub use generate::generate;
pub use lexer::Lexer;
pub use parser::parse;
pub use registry::TemplateRegistry;
pub use render::{render, TemplateRenderer};
