//! Per-exporter-type cache policy.

use chrono::TimeDelta;
use eventex_core::{ConfigError, Result, format_duration, parse_duration_with_nanos};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CacheParamJsonCfg {
    pub limit: Option<i64>,
    pub ttl: Option<String>,
    pub static_ttl: Option<bool>,
    pub precache: Option<bool>,
    pub replicate: Option<bool>,
    pub remote: Option<bool>,
}

/// Cache policy for one exporter type. A negative `limit` means unbounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheParamCfg {
    pub limit: i64,
    pub ttl: TimeDelta,
    pub static_ttl: bool,
    pub precache: bool,
    pub replicate: bool,
    pub remote: bool,
}

impl CacheParamCfg {
    pub fn load_from_json(&mut self, json: &CacheParamJsonCfg) -> Result<()> {
        if let Some(raw) = &json.ttl {
            self.ttl =
                parse_duration_with_nanos(raw).map_err(|e| ConfigError::invalid_duration(raw, e))?;
        }
        if let Some(limit) = json.limit {
            self.limit = limit;
        }
        if let Some(v) = json.static_ttl {
            self.static_ttl = v;
        }
        if let Some(v) = json.precache {
            self.precache = v;
        }
        if let Some(v) = json.replicate {
            self.replicate = v;
        }
        if let Some(v) = json.remote {
            self.remote = v;
        }
        Ok(())
    }

    pub fn as_map_interface(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("limit".into(), Value::from(self.limit));
        m.insert("ttl".into(), Value::from(self.ttl_string()));
        m.insert("static_ttl".into(), Value::Bool(self.static_ttl));
        m.insert("precache".into(), Value::Bool(self.precache));
        m.insert("replicate".into(), Value::Bool(self.replicate));
        m.insert("remote".into(), Value::Bool(self.remote));
        m
    }

    /// A zero TTL renders as the empty string, meaning "no expiry".
    fn ttl_string(&self) -> String {
        if self.ttl.is_zero() {
            String::new()
        } else {
            format_duration(self.ttl)
        }
    }
}
