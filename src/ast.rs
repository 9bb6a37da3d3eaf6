//! Structured description of a parsed method signature.
//!
//! Values are built once by the parser and only read afterwards; fields are
//! private and exposed through accessors. Serialization uses the field names
//! templates refer to (`ReceiverType`, `Name`, `Parameters`, `Returns`, and
//! `Name` / `TypeExpr` per parameter).

use serde::Serialize;

/// One declared parameter.
///
/// `type_expr` is the flattened type text (`*[]a.B`, `...string`). It is
/// empty only for parameters whose name was never followed by a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    name: String,
    type_expr: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_expr: type_expr.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_expr(&self) -> &str {
        &self.type_expr
    }
}

/// A single method signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Method {
    /// Receiver base type; a pointer marker is never included.
    receiver_type: String,
    name: String,
    /// Declaration order.
    parameters: Vec<Parameter>,
    /// Result types in declaration order.
    returns: Vec<String>,
}

impl Method {
    pub fn new(
        receiver_type: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        returns: Vec<String>,
    ) -> Self {
        Self {
            receiver_type: receiver_type.into(),
            name: name.into(),
            parameters,
            returns,
        }
    }

    pub fn receiver_type(&self) -> &str {
        &self.receiver_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn returns(&self) -> &[String] {
        &self.returns
    }
}
