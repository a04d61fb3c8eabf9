//! One event exporter: destination, retry policy, fields and connector options.

use eventex_core::consts::{META_DEFAULT, META_NONE};
use eventex_core::{ConfigError, FlagsWithParams, Result, TargetRoot};
use eventex_templates::{FcTemplateJsonCfg, TemplateField, TemplateRegistry, compile_fields};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::opts::{EventExporterOpts, EventExporterOptsJson};

/// Default directory exported files are written to.
pub const DEFAULT_EXPORT_PATH: &str = "/var/spool/eventex/ees";
/// Default directory failed exports are parked in.
pub const DEFAULT_FAILED_POSTS_DIR: &str = "/var/spool/eventex/failed_posts";

/// An exporter fragment as it appears in JSON.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventExporterJsonCfg {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub exporter_type: Option<String>,
    pub export_path: Option<String>,
    pub failed_posts_dir: Option<String>,
    pub timezone: Option<String>,
    pub synchronous: Option<bool>,
    pub attempts: Option<i64>,
    pub concurrent_requests: Option<i64>,
    pub filters: Option<Vec<String>>,
    pub attribute_ids: Option<Vec<String>>,
    pub attribute_context: Option<String>,
    pub flags: Option<Vec<String>>,
    /// Superseded by `opts.csvFieldSeparator`.
    pub field_separator: Option<String>,
    pub fields: Option<Vec<FcTemplateJsonCfg>>,
    pub opts: Option<EventExporterOptsJson>,
}

/// A resolved exporter.
///
/// `fields` and its header/content/trailer partitions are kept private so
/// they are always derived together; replace them with
/// [`EventExporterCfg::set_fields`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventExporterCfg {
    pub id: String,
    pub exporter_type: String,
    pub export_path: String,
    pub failed_posts_dir: String,
    /// Empty means the system local zone.
    pub timezone: String,
    pub synchronous: bool,
    pub attempts: i64,
    pub concurrent_requests: i64,
    pub filters: Vec<String>,
    pub attribute_ids: Vec<String>,
    pub attribute_context: String,
    pub flags: FlagsWithParams,
    fields: Vec<TemplateField>,
    content_fields: Vec<TemplateField>,
    header_fields: Vec<TemplateField>,
    trailer_fields: Vec<TemplateField>,
    pub opts: EventExporterOpts,
}

impl EventExporterCfg {
    pub fn new(
        id: &str,
        exporter_type: &str,
        export_path: &str,
        failed_posts_dir: &str,
        attempts: i64,
        opts: EventExporterOpts,
    ) -> Self {
        Self {
            id: id.to_string(),
            exporter_type: exporter_type.to_string(),
            export_path: export_path.to_string(),
            failed_posts_dir: failed_posts_dir.to_string(),
            timezone: String::new(),
            synchronous: false,
            attempts,
            concurrent_requests: 0,
            filters: Vec::new(),
            attribute_ids: Vec::new(),
            attribute_context: String::new(),
            flags: FlagsWithParams::new(),
            fields: Vec::new(),
            content_fields: Vec::new(),
            header_fields: Vec::new(),
            trailer_fields: Vec::new(),
            opts,
        }
    }

    /// The built-in exporter every fragment is overlaid on.
    pub fn default_template() -> Self {
        Self::new(
            META_DEFAULT,
            META_NONE,
            DEFAULT_EXPORT_PATH,
            DEFAULT_FAILED_POSTS_DIR,
            1,
            EventExporterOpts::default(),
        )
    }

    /// Overlay `json` on a copy of `self`. `self` is never modified; any
    /// error discards the copy.
    pub fn load_from_json(
        &self,
        json: &EventExporterJsonCfg,
        registry: &TemplateRegistry,
        sep: &str,
    ) -> Result<Self> {
        let mut cfg = self.clone();
        cfg.apply(json, registry, sep)?;
        debug!(
            exporter = %cfg.id,
            exporter_type = %cfg.exporter_type,
            fields = cfg.fields.len(),
            "exporter loaded"
        );
        Ok(cfg)
    }

    fn apply(
        &mut self,
        json: &EventExporterJsonCfg,
        registry: &TemplateRegistry,
        sep: &str,
    ) -> Result<()> {
        if let Some(v) = &json.id {
            self.id = v.clone();
        }
        if let Some(v) = &json.exporter_type {
            self.exporter_type = v.clone();
        }
        if let Some(v) = &json.export_path {
            self.export_path = v.clone();
        }
        if let Some(v) = &json.failed_posts_dir {
            self.failed_posts_dir = v.clone();
        }
        if let Some(v) = &json.timezone {
            self.timezone = v.clone();
        }
        if let Some(v) = json.synchronous {
            self.synchronous = v;
        }
        if let Some(v) = json.attempts {
            self.attempts = v;
        }
        if let Some(v) = json.concurrent_requests {
            self.concurrent_requests = v;
        }
        if let Some(v) = &json.filters {
            self.filters = v.clone();
        }
        if let Some(v) = &json.attribute_ids {
            self.attribute_ids = v.clone();
        }
        if let Some(v) = &json.attribute_context {
            self.attribute_context = v.clone();
        }
        if let Some(v) = &json.flags {
            self.flags = FlagsWithParams::from_slice(v);
        }
        if let Some(v) = &json.field_separator {
            warn!(
                exporter = %self.id,
                "field_separator is deprecated, use opts.csvFieldSeparator"
            );
            // opts.csvFieldSeparator, merged below, takes precedence
            self.opts.csv_field_separator = Some(v.clone());
        }
        if let Some(v) = &json.fields {
            self.set_fields(compile_fields(v, sep, registry)?);
        }
        if let Some(v) = &json.opts {
            self.opts.merge(v)?;
        }
        if self.attempts < 1 {
            return Err(ConfigError::InvalidValue {
                field: "attempts".into(),
                reason: format!("must be at least 1, got {}", self.attempts),
            });
        }
        Ok(())
    }

    /// Replace the field list and re-derive the partitions.
    pub fn set_fields(&mut self, fields: Vec<TemplateField>) {
        let mut content = Vec::new();
        let mut header = Vec::new();
        let mut trailer = Vec::new();
        for f in &fields {
            match f.field_path().root {
                TargetRoot::Hdr => header.push(f.clone()),
                TargetRoot::Trl => trailer.push(f.clone()),
                _ => content.push(f.clone()),
            }
        }
        self.fields = fields;
        self.content_fields = content;
        self.header_fields = header;
        self.trailer_fields = trailer;
    }

    pub fn fields(&self) -> &[TemplateField] {
        &self.fields
    }

    pub fn content_fields(&self) -> &[TemplateField] {
        &self.content_fields
    }

    pub fn header_fields(&self) -> &[TemplateField] {
        &self.header_fields
    }

    pub fn trailer_fields(&self) -> &[TemplateField] {
        &self.trailer_fields
    }

    pub fn as_map_interface(&self, sep: &str) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("id".into(), Value::from(self.id.clone()));
        m.insert("type".into(), Value::from(self.exporter_type.clone()));
        m.insert("export_path".into(), Value::from(self.export_path.clone()));
        m.insert(
            "failed_posts_dir".into(),
            Value::from(self.failed_posts_dir.clone()),
        );
        m.insert("timezone".into(), Value::from(self.timezone.clone()));
        m.insert("synchronous".into(), Value::Bool(self.synchronous));
        m.insert("attempts".into(), Value::from(self.attempts));
        m.insert(
            "concurrent_requests".into(),
            Value::from(self.concurrent_requests),
        );
        m.insert("filters".into(), Value::from(self.filters.clone()));
        m.insert(
            "attribute_ids".into(),
            Value::from(self.attribute_ids.clone()),
        );
        m.insert(
            "attribute_context".into(),
            Value::from(self.attribute_context.clone()),
        );
        m.insert("flags".into(), Value::from(self.flags.to_slice()));
        let fields: Vec<Value> = self
            .fields
            .iter()
            .map(|f| Value::Object(f.as_map_interface(sep)))
            .collect();
        m.insert("fields".into(), Value::Array(fields));
        m.insert("opts".into(), Value::Object(self.opts.as_map_interface()));
        m
    }
}

impl Default for EventExporterCfg {
    fn default() -> Self {
        Self::default_template()
    }
}
