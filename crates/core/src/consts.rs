//! Well-known tokens shared by the template and config crates.

/// Id of the built-in exporter every service config is seeded with.
pub const META_DEFAULT: &str = "*default";
/// Exporter type meaning "no transport".
pub const META_NONE: &str = "*none";
pub const META_FILE_CSV: &str = "*file_csv";
pub const META_INTERNAL: &str = "*internal";
pub const META_ATTRIBUTES: &str = "*attributes";
pub const META_UNLIMITED: &str = "*unlimited";

// Template target roots
pub const META_EXP: &str = "*exp";
pub const META_HDR: &str = "*hdr";
pub const META_TRL: &str = "*trl";
pub const META_UCH: &str = "*uch";

/// Separator between the parts of a concatenated key (`*internal:*attributes`).
pub const CONCATENATED_KEY_SEP: &str = ":";
/// Separator between a flag name and its parameters.
pub const FLAG_PARAM_SEP: char = ':';
/// Default separator between the rules of one value expression.
pub const IN_FIELD_SEP: &str = ";";

/// Go's `time.RFC3339` layout, the default template layout.
pub const RFC3339_LAYOUT: &str = "2006-01-02T15:04:05Z07:00";

/// Join the parts with [`CONCATENATED_KEY_SEP`].
pub fn concatenated_key(parts: &[&str]) -> String {
    parts.join(CONCATENATED_KEY_SEP)
}
