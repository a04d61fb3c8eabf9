//! Flags with optional parameters, written on the wire as `name:p1:p2`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::FLAG_PARAM_SEP;

/// A set of flags, each carrying an ordered list of parameters.
///
/// Backed by a `BTreeMap` so projection back to strings is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagsWithParams(BTreeMap<String, Vec<String>>);

impl FlagsWithParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from wire strings. A repeated flag accumulates parameters.
    pub fn from_slice<S: AsRef<str>>(flags: &[S]) -> Self {
        let mut out = Self::new();
        for raw in flags {
            let raw = raw.as_ref();
            if raw.is_empty() {
                continue;
            }
            let mut parts = raw.split(FLAG_PARAM_SEP);
            // split always yields at least one item
            let name = parts.next().unwrap_or_default().to_string();
            out.0.entry(name).or_default().extend(parts.map(str::to_string));
        }
        out
    }

    pub fn has(&self, flag: &str) -> bool {
        self.0.contains_key(flag)
    }

    /// Parameters of a flag; `None` when the flag is not set.
    pub fn params(&self, flag: &str) -> Option<&[String]> {
        self.0.get(flag).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render back to wire strings, sorted by flag name.
    pub fn to_slice(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|(name, params)| {
                if params.is_empty() {
                    name.clone()
                } else {
                    let sep = FLAG_PARAM_SEP.to_string();
                    format!("{name}{sep}{}", params.join(&sep))
                }
            })
            .collect()
    }
}
