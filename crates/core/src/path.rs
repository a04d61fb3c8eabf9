//! Decomposition of template target paths.
//!
//! A target path such as `*hdr.Account` or `*exp.Items[0].Cost` names where
//! an exporter writes a field. The leading token selects the output section
//! (`*exp` content, `*hdr` header, `*trl` trailer, `*uch` unit cache); a
//! path without one of those tokens addresses the request context.
//!
//! ```text
//! *exp.Items[0].Cost  ->  root: Exp, items: [Items[0], Cost]
//! *req.Account        ->  root: Context, items: [*req, Account]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{META_EXP, META_HDR, META_TRL, META_UCH};

/// The output section a path writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRoot {
    Exp,
    Hdr,
    Trl,
    Uch,
    /// No recognised root token: the whole path is relative to the request.
    Context,
}

impl TargetRoot {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            META_EXP => Some(TargetRoot::Exp),
            META_HDR => Some(TargetRoot::Hdr),
            META_TRL => Some(TargetRoot::Trl),
            META_UCH => Some(TargetRoot::Uch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetRoot::Exp => META_EXP,
            TargetRoot::Hdr => META_HDR,
            TargetRoot::Trl => META_TRL,
            TargetRoot::Uch => META_UCH,
            TargetRoot::Context => "",
        }
    }
}

/// One path segment: a field name plus any `[index]` selectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathItem {
    pub field: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index: Vec<String>,
}

impl PathItem {
    fn parse(segment: &str) -> Self {
        let Some(open) = segment.find('[') else {
            return Self {
                field: segment.to_string(),
                index: Vec::new(),
            };
        };
        let field = segment[..open].to_string();
        let index = segment[open..]
            .split(']')
            .filter_map(|sel| sel.strip_prefix('['))
            .map(str::to_string)
            .collect();
        Self { field, index }
    }
}

impl fmt::Display for PathItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.field)?;
        for idx in &self.index {
            write!(f, "[{idx}]")?;
        }
        Ok(())
    }
}

/// A target path split once into its root and remaining items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    pub root: TargetRoot,
    pub items: Vec<PathItem>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        let segments = split_path(path);
        match segments.first().and_then(|first| TargetRoot::from_token(first)) {
            Some(root) => Self {
                root,
                items: segments[1..].iter().map(|s| PathItem::parse(s)).collect(),
            },
            None => Self {
                root: TargetRoot::Context,
                items: segments.iter().map(|s| PathItem::parse(s)).collect(),
            },
        }
    }

    /// Item field names, the shape exporters use to address nested output.
    pub fn field_names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.field.as_str()).collect()
    }
}

/// Split on `.` except inside `[...]` selectors.
fn split_path(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '.' if depth == 0 => out.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    out.push(current);
    out
}
