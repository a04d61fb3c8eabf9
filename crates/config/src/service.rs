//! The exporter service: enable flag, attribute connections, cache policy
//! and the ordered exporter list.

use std::collections::BTreeMap;

use eventex_core::Result;
use eventex_core::consts::{META_ATTRIBUTES, META_FILE_CSV, META_INTERNAL, concatenated_key};
use eventex_templates::TemplateRegistry;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::cache::{CacheParamCfg, CacheParamJsonCfg};
use crate::exporter::{EventExporterCfg, EventExporterJsonCfg};

/// The service section as it appears in JSON.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EesJsonCfg {
    pub enabled: Option<bool>,
    pub attributes_conns: Option<Vec<String>>,
    pub cache: Option<BTreeMap<String, CacheParamJsonCfg>>,
    pub exporters: Option<Vec<EventExporterJsonCfg>>,
}

impl EesJsonCfg {
    /// The compiled-in defaults [`EesCfg::with_defaults`] loads.
    pub fn defaults() -> Self {
        let mut cache = BTreeMap::new();
        cache.insert(
            META_FILE_CSV.to_string(),
            CacheParamJsonCfg {
                limit: Some(-1),
                ttl: Some("5s".into()),
                static_ttl: Some(false),
                precache: Some(false),
                replicate: Some(false),
                remote: Some(false),
            },
        );
        Self {
            enabled: Some(false),
            attributes_conns: Some(Vec::new()),
            cache: Some(cache),
            exporters: None,
        }
    }
}

/// Resolved exporter-service configuration.
///
/// Exporter ids are unique: loading a fragment whose id is already present
/// replaces that exporter in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EesCfg {
    pub enabled: bool,
    pub attribute_conns: Vec<String>,
    pub cache: BTreeMap<String, CacheParamCfg>,
    pub exporters: Vec<EventExporterCfg>,
}

impl EesCfg {
    /// A fresh config with the compiled-in defaults loaded.
    pub fn with_defaults(
        registry: &TemplateRegistry,
        sep: &str,
        default_exporter: &EventExporterCfg,
    ) -> Result<Self> {
        let mut cfg = Self::default();
        cfg.load_from_json(&EesJsonCfg::defaults(), registry, sep, default_exporter)?;
        Ok(cfg)
    }

    /// Overlay a JSON section. Either the whole section applies or, on
    /// error, `self` is left as it was.
    pub fn load_from_json(
        &mut self,
        json: &EesJsonCfg,
        registry: &TemplateRegistry,
        sep: &str,
        default_exporter: &EventExporterCfg,
    ) -> Result<()> {
        let mut next = self.clone();
        next.apply(json, registry, sep, default_exporter)?;
        info!(
            enabled = next.enabled,
            exporters = next.exporters.len(),
            cache_entries = next.cache.len(),
            "exporter service config loaded"
        );
        *self = next;
        Ok(())
    }

    fn apply(
        &mut self,
        json: &EesJsonCfg,
        registry: &TemplateRegistry,
        sep: &str,
        default_exporter: &EventExporterCfg,
    ) -> Result<()> {
        if let Some(v) = json.enabled {
            self.enabled = v;
        }
        if let Some(conns) = &json.attributes_conns {
            self.attribute_conns = conns.iter().map(|c| internal_conn(c)).collect();
        }
        if let Some(cache) = &json.cache {
            for (kind, cj) in cache {
                self.cache.entry(kind.clone()).or_default().load_from_json(cj)?;
            }
        }
        if self.exporters.is_empty() {
            self.exporters.push(default_exporter.clone());
        }
        for fragment in json.exporters.iter().flatten() {
            let id = fragment
                .id
                .clone()
                .unwrap_or_else(|| default_exporter.id.clone());
            match self.exporters.iter().position(|e| e.id == id) {
                Some(idx) => {
                    self.exporters[idx] =
                        self.exporters[idx].load_from_json(fragment, registry, sep)?;
                    debug!(exporter = %id, position = idx, "exporter replaced");
                }
                None => {
                    let loaded = default_exporter.load_from_json(fragment, registry, sep)?;
                    self.exporters.push(loaded);
                    debug!(exporter = %id, "exporter appended");
                }
            }
        }
        Ok(())
    }

    pub fn exporter(&self, id: &str) -> Option<&EventExporterCfg> {
        self.exporters.iter().find(|e| e.id == id)
    }

    pub fn as_map_interface(&self, sep: &str) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("enabled".into(), Value::Bool(self.enabled));
        let conns: Vec<Value> = self
            .attribute_conns
            .iter()
            .map(|c| Value::from(external_conn(c)))
            .collect();
        m.insert("attributes_conns".into(), Value::Array(conns));
        let cache: Map<String, Value> = self
            .cache
            .iter()
            .map(|(k, c)| (k.clone(), Value::Object(c.as_map_interface())))
            .collect();
        m.insert("cache".into(), Value::Object(cache));
        let exporters: Vec<Value> = self
            .exporters
            .iter()
            .map(|e| Value::Object(e.as_map_interface(sep)))
            .collect();
        m.insert("exporters".into(), Value::Array(exporters));
        m
    }
}

/// `*internal` addresses the in-process attribute service.
fn internal_conn(conn: &str) -> String {
    if conn == META_INTERNAL {
        concatenated_key(&[META_INTERNAL, META_ATTRIBUTES])
    } else {
        conn.to_string()
    }
}

fn external_conn(conn: &str) -> String {
    if conn == concatenated_key(&[META_INTERNAL, META_ATTRIBUTES]) {
        META_INTERNAL.to_string()
    } else {
        conn.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;

    fn section(v: Value) -> EesJsonCfg {
        serde_json::from_value(v).unwrap()
    }

    fn defaults() -> EesCfg {
        EesCfg::with_defaults(
            &TemplateRegistry::new(),
            ";",
            &EventExporterCfg::default_template(),
        )
        .unwrap()
    }

    #[test]
    fn defaults_seed_cache_and_default_exporter() {
        let cfg = defaults();
        assert!(!cfg.enabled);
        assert_eq!(cfg.cache["*file_csv"].limit, -1);
        assert_eq!(cfg.cache["*file_csv"].ttl, TimeDelta::seconds(5));
        assert_eq!(cfg.exporters.len(), 1);
        assert_eq!(cfg.exporters[0], EventExporterCfg::default_template());
    }

    #[test]
    fn internal_attribute_conn_is_qualified() {
        let mut cfg = defaults();
        cfg.load_from_json(
            &section(json!({"attributes_conns": ["*internal", "*conn1"]})),
            &TemplateRegistry::new(),
            ";",
            &EventExporterCfg::default_template(),
        )
        .unwrap();
        assert_eq!(cfg.attribute_conns, vec!["*internal:*attributes", "*conn1"]);
        assert_eq!(
            cfg.as_map_interface(";")["attributes_conns"],
            json!(["*internal", "*conn1"])
        );
    }

    #[test]
    fn cache_entries_overlay_or_insert() {
        let mut cfg = defaults();
        cfg.load_from_json(
            &section(json!({"cache": {
                "*file_csv": {"precache": true},
                "*amqp_json_map": {"limit": 100}
            }})),
            &TemplateRegistry::new(),
            ";",
            &EventExporterCfg::default_template(),
        )
        .unwrap();
        assert_eq!(cfg.cache["*file_csv"].limit, -1);
        assert!(cfg.cache["*file_csv"].precache);
        assert_eq!(cfg.cache["*amqp_json_map"].limit, 100);
        assert_eq!(cfg.cache["*amqp_json_map"].ttl, TimeDelta::zero());
    }

    #[test]
    fn absent_id_targets_the_default_exporter() {
        let mut cfg = defaults();
        cfg.load_from_json(
            &section(json!({"exporters": [{"type": "*file_csv"}]})),
            &TemplateRegistry::new(),
            ";",
            &EventExporterCfg::default_template(),
        )
        .unwrap();
        assert_eq!(cfg.exporters.len(), 1);
        assert_eq!(cfg.exporters[0].id, "*default");
        assert_eq!(cfg.exporters[0].exporter_type, "*file_csv");
    }

    #[test]
    fn lookup_by_id() {
        let mut cfg = defaults();
        cfg.load_from_json(
            &section(json!({"exporters": [{"id": "sql1", "type": "*sql"}]})),
            &TemplateRegistry::new(),
            ";",
            &EventExporterCfg::default_template(),
        )
        .unwrap();
        assert_eq!(cfg.exporter("sql1").unwrap().exporter_type, "*sql");
        assert!(cfg.exporter("missing").is_none());
    }
}
