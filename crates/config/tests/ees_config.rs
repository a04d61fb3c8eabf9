//! Whole-service integration tests for the exporter configuration.
//!
//! These load realistic service sections through the public API and check
//! overlay semantics, template inlining, projection and publishing.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::TimeDelta;
use eventex_config::{EesCfg, EesCfgHandle, EesJsonCfg, EventExporterCfg};
use eventex_core::ConfigError;
use eventex_templates::{FcTemplateJsonCfg, TemplateRegistry};
use serde_json::{Value, json};

// ── Helpers ──────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_test_writer()
        .try_init();
}

fn section(v: Value) -> EesJsonCfg {
    serde_json::from_value(v).unwrap()
}

fn registry() -> TemplateRegistry {
    let templates: BTreeMap<String, Vec<FcTemplateJsonCfg>> = serde_json::from_value(json!({
        "cdr_fields": [
            {"tag": "CGRID", "path": "*exp.CGRID", "type": "*variable", "value": "~*req.CGRID"},
            {"tag": "Usage", "path": "*exp.Usage", "type": "*variable",
             "value": "~*req.Usage{*duration_seconds}"}
        ]
    }))
    .unwrap();
    TemplateRegistry::from_json(&templates, ";").unwrap()
}

fn load(cfg: &mut EesCfg, v: Value) -> Result<(), ConfigError> {
    cfg.load_from_json(
        &section(v),
        &registry(),
        ";",
        &EventExporterCfg::default_template(),
    )
}

fn defaults() -> EesCfg {
    EesCfg::with_defaults(&registry(), ";", &EventExporterCfg::default_template()).unwrap()
}

fn full_section() -> Value {
    json!({
        "enabled": true,
        "attributes_conns": ["*internal", "*conn1"],
        "cache": {"*file_csv": {"limit": -2, "ttl": "1m", "precache": true}},
        "exporters": [{
            "id": "cgrates",
            "type": "*file_csv",
            "export_path": "/tmp/cdre",
            "timezone": "UTC",
            "synchronous": true,
            "attempts": 2,
            "concurrent_requests": 4,
            "filters": ["*string:~*req.Tenant:cgrates.org"],
            "attribute_ids": ["ATTR_EXP"],
            "attribute_context": "*ees",
            "flags": ["*log", "*attributes:ATTR_EXP"],
            "fields": [
                {"tag": "Start", "path": "*hdr.Start", "type": "*constant", "value": "S"},
                {"tag": "Cdrs", "type": "*template", "value": "cdr_fields"},
                {"tag": "Cost", "path": "*exp.Cost", "type": "*variable",
                 "value": "~*req.Cost", "rounding_decimals": 4},
                {"tag": "Count", "path": "*trl.Count", "type": "*constant", "value": "1"}
            ],
            "opts": {
                "csvFieldSeparator": ";",
                "elsIndex": "cdrs",
                "elsTimeout": "30s",
                "sqlConnMaxLifetime": "1m",
                "mysqlDSNParams": {"charset": "utf8"},
                "kafkaTopic": "events",
                "amqpQueueID": "q1",
                "awsRegion": "eu-west-1",
                "natsJetStream": true,
                "natsJetStreamMaxWait": "2s",
                "rpcCodec": "*json",
                "rpcConnTimeout": "1s",
                "rpcAPIOpts": {"*dispatchers": false}
            }
        }]
    })
}

// ── Overlay semantics ────────────────────────────────────────────────────

#[test]
fn defaults_seed_the_default_exporter() {
    init_tracing();
    let cfg = defaults();
    assert_eq!(cfg.exporters.len(), 1);
    assert_eq!(cfg.exporters[0].id, "*default");
    assert_eq!(cfg.exporters[0].exporter_type, "*none");
    assert_eq!(cfg.cache["*file_csv"].limit, -1);
    assert_eq!(cfg.cache["*file_csv"].ttl, TimeDelta::seconds(5));
}

#[test]
fn full_section_resolves() {
    init_tracing();
    let mut cfg = defaults();
    load(&mut cfg, full_section()).unwrap();

    assert!(cfg.enabled);
    assert_eq!(cfg.attribute_conns, vec!["*internal:*attributes", "*conn1"]);
    assert_eq!(cfg.cache["*file_csv"].limit, -2);
    assert_eq!(cfg.cache["*file_csv"].ttl, TimeDelta::minutes(1));
    assert_eq!(cfg.exporters.len(), 2);

    let exp = cfg.exporter("cgrates").unwrap();
    assert_eq!(exp.failed_posts_dir, "/var/spool/eventex/failed_posts");
    assert_eq!(exp.attempts, 2);
    assert!(exp.flags.has("*log"));
    assert_eq!(exp.opts.els.timeout, Some(TimeDelta::seconds(30)));
    assert_eq!(exp.opts.nats.jet_stream_max_wait, Some(TimeDelta::seconds(2)));
    assert_eq!(exp.opts.kafka.topic.as_deref(), Some("events"));
    assert!(exp.opts.sql.table_name.is_none());
}

#[test]
fn clone_is_deep_and_equal() {
    init_tracing();
    let mut cfg = defaults();
    load(&mut cfg, full_section()).unwrap();

    let mut copy = cfg.clone();
    assert_eq!(copy, cfg);

    copy.exporters[1].attempts = 9;
    copy.exporters[1].opts.kafka.topic = Some("other".into());
    copy.cache.clear();
    assert_eq!(cfg.exporters[1].attempts, 2);
    assert_eq!(cfg.exporters[1].opts.kafka.topic.as_deref(), Some("events"));
    assert_eq!(cfg.cache.len(), 1);
}

#[test]
fn loading_twice_is_idempotent() {
    init_tracing();
    let mut once = defaults();
    load(&mut once, full_section()).unwrap();
    let mut twice = once.clone();
    load(&mut twice, full_section()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn absent_keys_inherit_present_keys_replace() {
    init_tracing();
    let mut cfg = defaults();
    load(&mut cfg, full_section()).unwrap();
    load(
        &mut cfg,
        json!({"exporters": [{"id": "cgrates", "opts": {"kafkaBatchSize": 10}, "filters": []}]}),
    )
    .unwrap();

    let exp = cfg.exporter("cgrates").unwrap();
    assert_eq!(exp.opts.kafka.topic.as_deref(), Some("events"));
    assert_eq!(exp.opts.kafka.batch_size, Some(10));
    assert!(exp.filters.is_empty());
    assert_eq!(exp.export_path, "/tmp/cdre");
    assert_eq!(exp.fields().len(), 5);
}

#[test]
fn duplicate_id_replaces_in_place() {
    init_tracing();
    let mut cfg = defaults();
    load(
        &mut cfg,
        json!({"exporters": [
            {"id": "a", "type": "*file_csv"},
            {"id": "b", "type": "*amqp_json_map"}
        ]}),
    )
    .unwrap();
    load(&mut cfg, json!({"exporters": [{"id": "a", "type": "*sql"}]})).unwrap();

    let ids: Vec<&str> = cfg.exporters.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["*default", "a", "b"]);
    assert_eq!(cfg.exporters[1].exporter_type, "*sql");
}

#[test]
fn duplicate_id_within_one_section() {
    init_tracing();
    let mut cfg = defaults();
    load(
        &mut cfg,
        json!({"exporters": [
            {"id": "a", "attempts": 2},
            {"id": "a", "synchronous": true}
        ]}),
    )
    .unwrap();
    let a = cfg.exporter("a").unwrap();
    assert_eq!(cfg.exporters.len(), 2);
    assert_eq!(a.attempts, 2);
    assert!(a.synchronous);
}

#[test]
fn fields_partition_with_inlined_template() {
    init_tracing();
    let mut cfg = defaults();
    load(&mut cfg, full_section()).unwrap();
    let exp = cfg.exporter("cgrates").unwrap();

    let paths = |fs: &[eventex_templates::TemplateField]| {
        fs.iter().map(|f| f.path().to_string()).collect::<Vec<_>>()
    };
    assert_eq!(paths(exp.header_fields()), vec!["*hdr.Start"]);
    assert_eq!(
        paths(exp.content_fields()),
        vec!["*exp.CGRID", "*exp.Usage", "*exp.Cost"]
    );
    assert_eq!(paths(exp.trailer_fields()), vec!["*trl.Count"]);
}

// ── Projection ───────────────────────────────────────────────────────────

#[test]
fn projection_of_defaults() {
    init_tracing();
    let m = defaults().as_map_interface(";");
    assert_eq!(
        Value::Object(m),
        json!({
            "enabled": false,
            "attributes_conns": [],
            "cache": {"*file_csv": {
                "limit": -1, "ttl": "5s", "static_ttl": false,
                "precache": false, "replicate": false, "remote": false
            }},
            "exporters": [{
                "id": "*default",
                "type": "*none",
                "export_path": "/var/spool/eventex/ees",
                "failed_posts_dir": "/var/spool/eventex/failed_posts",
                "timezone": "",
                "synchronous": false,
                "attempts": 1,
                "concurrent_requests": 0,
                "filters": [],
                "attribute_ids": [],
                "attribute_context": "",
                "flags": [],
                "fields": [],
                "opts": {}
            }]
        })
    );
}

#[test]
fn projection_renders_canonical_values() {
    init_tracing();
    let mut cfg = defaults();
    load(&mut cfg, full_section()).unwrap();
    let m = cfg.as_map_interface(";");

    assert_eq!(m["attributes_conns"], json!(["*internal", "*conn1"]));
    assert_eq!(m["cache"]["*file_csv"]["ttl"], json!("1m0s"));
    let exp = &m["exporters"][1];
    assert_eq!(exp["opts"]["elsTimeout"], json!("30s"));
    assert_eq!(exp["opts"]["sqlConnMaxLifetime"], json!("1m0s"));
    assert_eq!(exp["flags"], json!(["*attributes:ATTR_EXP", "*log"]));
    assert_eq!(
        exp["fields"][2],
        json!({"tag": "Usage", "path": "*exp.Usage", "type": "*variable",
               "value": "~*req.Usage{*duration_seconds}"})
    );
    assert_eq!(exp["fields"][3]["rounding_decimals"], json!(4));
    assert!(exp["opts"].get("sqlTableName").is_none());
}

#[test]
fn projection_round_trips() {
    init_tracing();
    let mut cfg = defaults();
    load(&mut cfg, full_section()).unwrap();

    let projected = Value::Object(cfg.as_map_interface(";"));
    let mut reloaded = EesCfg::default();
    load(&mut reloaded, projected).unwrap();
    assert_eq!(reloaded, cfg);
}

// ── Errors ───────────────────────────────────────────────────────────────

#[test]
fn unterminated_converter_is_rejected() {
    init_tracing();
    let mut cfg = defaults();
    let err = load(
        &mut cfg,
        json!({"exporters": [{"id": "x", "fields": [{"path": "*exp.A", "value": "a{*"}]}]}),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "invalid converter terminator in rule: <a{*>");
}

#[test]
fn template_without_id_is_rejected() {
    init_tracing();
    let mut cfg = defaults();
    let err = load(
        &mut cfg,
        json!({"exporters": [{"id": "x", "fields": [{"tag": "T", "type": "*template"}]}]}),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "no template with id: <>");
}

#[test]
fn bad_cache_ttl_names_the_unit() {
    init_tracing();
    let mut cfg = defaults();
    let err = load(&mut cfg, json!({"cache": {"*file_csv": {"ttl": "1ss"}}})).unwrap_err();
    assert_eq!(err.to_string(), r#"time: unknown unit "ss" in duration "1ss""#);
}

#[test]
fn bad_option_duration_is_rejected() {
    init_tracing();
    let mut cfg = defaults();
    let err = load(
        &mut cfg,
        json!({"exporters": [{"id": "x", "opts": {"elsTimeout": "test"}}]}),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), r#"time: invalid duration "test""#);
}

#[test]
fn failed_load_leaves_config_untouched() {
    init_tracing();
    let mut cfg = defaults();
    let before = cfg.clone();
    let err = load(
        &mut cfg,
        json!({
            "enabled": true,
            "exporters": [
                {"id": "good", "type": "*file_csv"},
                {"id": "bad", "attempts": 0}
            ]
        }),
    );
    assert!(err.is_err());
    assert_eq!(cfg, before);
}

// ── Templates and publishing ─────────────────────────────────────────────

#[test]
fn registry_changes_do_not_reach_loaded_exporters() {
    init_tracing();
    let mut reg = registry();
    let mut cfg = EesCfg::default();
    cfg.load_from_json(
        &section(json!({"exporters": [{"id": "x", "fields": [
            {"tag": "Cdrs", "type": "*template", "value": "cdr_fields"}
        ]}]})),
        &reg,
        ";",
        &EventExporterCfg::default_template(),
    )
    .unwrap();
    reg.remove("cdr_fields");
    assert_eq!(cfg.exporter("x").unwrap().fields().len(), 2);
}

#[test]
fn handle_publishes_only_successful_reloads() {
    init_tracing();
    let handle = EesCfgHandle::new(defaults());
    let first = handle.snapshot();

    let next = handle
        .reload(
            &section(full_section()),
            &registry(),
            ";",
            &EventExporterCfg::default_template(),
        )
        .unwrap();
    assert_eq!(next.exporters.len(), 2);
    assert!(Arc::ptr_eq(&next, &handle.snapshot()));
    assert_eq!(first.exporters.len(), 1);

    let err = handle.reload(
        &section(json!({"cache": {"*file_csv": {"ttl": "1ss"}}})),
        &registry(),
        ";",
        &EventExporterCfg::default_template(),
    );
    assert!(err.is_err());
    assert!(Arc::ptr_eq(&next, &handle.snapshot()));
}
