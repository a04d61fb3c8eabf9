//! Field templates for event exporters.
//!
//! An exporter describes its output as an ordered list of template fields.
//! Each field names a target path and a value rule; a field typed
//! `*template` pulls in a named list of fields from the registry.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐    ┌──────────────┐    ┌────────────────┐
//! │ JSON fields   │───▶│  compile     │───▶│ TemplateField  │
//! │ (FcTemplate.. │    │  + inflate   │    │ (rules, path)  │
//! └───────────────┘    └──────┬───────┘    └────────────────┘
//!                             │
//!                      ┌──────┴───────┐
//!                      │  Template    │
//!                      │  Registry    │
//!                      └──────────────┘
//! ```
//!
//! # Example
//!
//! ```json
//! {"tag": "Usage", "path": "*exp.Usage", "type": "*variable",
//!  "value": "~*req.Usage{*duration_seconds&*round:2}"}
//! ```

mod converter;
mod model;
mod parser;
mod registry;

pub use converter::{DataConverter, RoundingMethod};
pub use model::{FcTemplateJsonCfg, FieldType, TemplateField};
pub use parser::{DataProvider, RsrParser, RsrParsers};
pub use registry::{TemplateRegistry, compile, compile_fields, inflate};

/// Errors from evaluating a compiled rule against data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("field not found: <{0}>")]
    NotFound(String),

    #[error("converter {converter} failed on <{input}>: {reason}")]
    Conversion {
        converter: String,
        input: String,
        reason: String,
    },
}
