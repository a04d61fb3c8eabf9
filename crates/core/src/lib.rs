//! # eventex core
//!
//! Shared building blocks for the event-export configuration model:
//! the error taxonomy every loader reports through, the Go-compatible
//! duration codec used on the wire, flag lists with parameters, and the
//! decomposition of template target paths.
//!
//! Nothing in here knows about exporters or connectors. The template and
//! config crates depend inward on this one.

pub mod consts;
pub mod duration;
pub mod error;
pub mod flags;
pub mod path;

// Re-export key types at crate root for ergonomics
pub use duration::{format_duration, parse_duration, parse_duration_with_nanos, DurationError};
pub use error::{ConfigError, Result};
pub use flags::FlagsWithParams;
pub use path::{FieldPath, PathItem, TargetRoot};
