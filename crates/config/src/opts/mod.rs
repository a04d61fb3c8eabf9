//! Connector option groups.
//!
//! Each connector family owns a JSON shape (every key optional) and a
//! resolved bag (every field `Option<T>`, absent meaning "inherit"). Merging
//! copies present keys only, so loading the same fragment twice is a no-op.

mod amqp;
mod aws;
mod els;
mod kafka;
mod nats;
mod rpc;
mod sql;

pub use amqp::{AmqpOpts, AmqpOptsJson};
pub use aws::{AwsOpts, AwsOptsJson};
pub use els::{ElsOpts, ElsOptsJson};
pub use kafka::{KafkaOpts, KafkaOptsJson};
pub use nats::{NatsOpts, NatsOptsJson};
pub use rpc::{RpcOpts, RpcOptsJson};
pub use sql::{SqlOpts, SqlOptsJson};

use chrono::TimeDelta;
use eventex_core::{ConfigError, Result, format_duration, parse_duration_with_nanos};
use serde::Deserialize;
use serde_json::{Map, Value};

/// The `opts` object of an exporter fragment: all families side by side.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventExporterOptsJson {
    #[serde(rename = "csvFieldSeparator")]
    pub csv_field_separator: Option<String>,
    #[serde(flatten)]
    pub els: ElsOptsJson,
    #[serde(flatten)]
    pub sql: SqlOptsJson,
    #[serde(flatten)]
    pub kafka: KafkaOptsJson,
    #[serde(flatten)]
    pub amqp: AmqpOptsJson,
    #[serde(flatten)]
    pub aws: AwsOptsJson,
    #[serde(flatten)]
    pub nats: NatsOptsJson,
    #[serde(flatten)]
    pub rpc: RpcOptsJson,
}

/// Resolved connector options of one exporter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventExporterOpts {
    pub csv_field_separator: Option<String>,
    pub els: ElsOpts,
    pub sql: SqlOpts,
    pub kafka: KafkaOpts,
    pub amqp: AmqpOpts,
    pub aws: AwsOpts,
    pub nats: NatsOpts,
    pub rpc: RpcOpts,
}

impl EventExporterOpts {
    pub fn merge(&mut self, json: &EventExporterOptsJson) -> Result<()> {
        overlay(&mut self.csv_field_separator, &json.csv_field_separator);
        self.els.merge(&json.els)?;
        self.sql.merge(&json.sql)?;
        self.kafka.merge(&json.kafka);
        self.amqp.merge(&json.amqp);
        self.aws.merge(&json.aws);
        self.nats.merge(&json.nats)?;
        self.rpc.merge(&json.rpc)?;
        Ok(())
    }

    /// Flat projection; unset fields are omitted.
    pub fn as_map_interface(&self) -> Map<String, Value> {
        let mut m = Map::new();
        project(&mut m, "csvFieldSeparator", &self.csv_field_separator);
        self.els.project(&mut m);
        self.sql.project(&mut m);
        self.kafka.project(&mut m);
        self.amqp.project(&mut m);
        self.aws.project(&mut m);
        self.nats.project(&mut m);
        self.rpc.project(&mut m);
        m
    }
}

// ─── Merge/projection helpers ────────────────────────────────────────

pub(crate) fn overlay<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if let Some(v) = src {
        *dst = Some(v.clone());
    }
}

/// Parse and overlay a duration; on error `dst` keeps its value.
pub(crate) fn overlay_duration(dst: &mut Option<TimeDelta>, src: &Option<String>) -> Result<()> {
    if let Some(raw) = src {
        let d = parse_duration_with_nanos(raw).map_err(|e| ConfigError::invalid_duration(raw, e))?;
        *dst = Some(d);
    }
    Ok(())
}

pub(crate) fn project<T>(m: &mut Map<String, Value>, key: &str, v: &Option<T>)
where
    T: Clone + Into<Value>,
{
    if let Some(v) = v {
        m.insert(key.to_string(), v.clone().into());
    }
}

pub(crate) fn project_duration(m: &mut Map<String, Value>, key: &str, v: &Option<TimeDelta>) {
    if let Some(d) = v {
        m.insert(key.to_string(), Value::from(format_duration(*d)));
    }
}

pub(crate) fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts_json(v: Value) -> EventExporterOptsJson {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn families_decode_side_by_side() {
        let json = opts_json(json!({
            "csvFieldSeparator": "|",
            "elsIndex": "cdrs",
            "sqlTableName": "cdrs",
            "kafkaTopic": "events",
            "amqpQueueID": "q1",
            "awsRegion": "eu-west-1",
            "natsSubject": "cgr.events",
            "rpcCodec": "*json",
            "unknownKey": 1
        }));
        assert_eq!(json.csv_field_separator.as_deref(), Some("|"));
        assert_eq!(json.els.index.as_deref(), Some("cdrs"));
        assert_eq!(json.sql.table_name.as_deref(), Some("cdrs"));
        assert_eq!(json.kafka.topic.as_deref(), Some("events"));
        assert_eq!(json.amqp.queue_id.as_deref(), Some("q1"));
        assert_eq!(json.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(json.nats.subject.as_deref(), Some("cgr.events"));
        assert_eq!(json.rpc.codec.as_deref(), Some("*json"));
    }

    #[test]
    fn merge_then_project() {
        let mut opts = EventExporterOpts::default();
        opts.merge(&opts_json(json!({
            "csvFieldSeparator": ";",
            "elsTimeout": "1m",
            "natsJetStream": true
        })))
        .unwrap();
        assert_eq!(
            Value::Object(opts.as_map_interface()),
            json!({"csvFieldSeparator": ";", "elsTimeout": "1m0s", "natsJetStream": true})
        );
    }

    #[test]
    fn empty_fragment_changes_nothing() {
        let mut opts = EventExporterOpts::default();
        opts.merge(&opts_json(json!({"kafkaTopic": "t"}))).unwrap();
        let before = opts.clone();
        opts.merge(&EventExporterOptsJson::default()).unwrap();
        assert_eq!(opts, before);
    }

    #[test]
    fn bad_duration_leaves_field_untouched() {
        let mut d = Some(TimeDelta::seconds(1));
        let err = overlay_duration(&mut d, &Some("1ss".into())).unwrap_err();
        assert_eq!(err.to_string(), r#"time: unknown unit "ss" in duration "1ss""#);
        assert_eq!(d, Some(TimeDelta::seconds(1)));
    }

    #[test]
    fn nanosecond_aware_durations() {
        let mut d = None;
        overlay_duration(&mut d, &Some("-1".into())).unwrap();
        assert_eq!(d, Some(TimeDelta::nanoseconds(-1)));
        overlay_duration(&mut d, &Some("5000".into())).unwrap();
        assert_eq!(d, Some(TimeDelta::nanoseconds(5000)));
    }
}
