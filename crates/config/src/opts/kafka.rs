//! Stream-log (Kafka) connector options.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{overlay, project};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KafkaOptsJson {
    #[serde(rename = "kafkaTopic")]
    pub topic: Option<String>,
    #[serde(rename = "kafkaBatchSize")]
    pub batch_size: Option<i64>,
    #[serde(rename = "kafkaTLS")]
    pub tls: Option<bool>,
    #[serde(rename = "kafkaCAPath")]
    pub ca_path: Option<String>,
    #[serde(rename = "kafkaSkipTLSVerify")]
    pub skip_tls_verify: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KafkaOpts {
    pub topic: Option<String>,
    pub batch_size: Option<i64>,
    pub tls: Option<bool>,
    pub ca_path: Option<String>,
    pub skip_tls_verify: Option<bool>,
}

impl KafkaOpts {
    pub fn merge(&mut self, json: &KafkaOptsJson) {
        overlay(&mut self.topic, &json.topic);
        overlay(&mut self.batch_size, &json.batch_size);
        overlay(&mut self.tls, &json.tls);
        overlay(&mut self.ca_path, &json.ca_path);
        overlay(&mut self.skip_tls_verify, &json.skip_tls_verify);
    }

    pub(crate) fn project(&self, m: &mut Map<String, Value>) {
        project(m, "kafkaTopic", &self.topic);
        project(m, "kafkaBatchSize", &self.batch_size);
        project(m, "kafkaTLS", &self.tls);
        project(m, "kafkaCAPath", &self.ca_path);
        project(m, "kafkaSkipTLSVerify", &self.skip_tls_verify);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_keys_inherit() {
        let mut opts = KafkaOpts {
            topic: Some("cdrs".into()),
            tls: Some(true),
            ..KafkaOpts::default()
        };
        let json: KafkaOptsJson =
            serde_json::from_value(json!({"kafkaBatchSize": 100})).unwrap();
        opts.merge(&json);
        assert_eq!(opts.topic.as_deref(), Some("cdrs"));
        assert_eq!(opts.tls, Some(true));
        assert_eq!(opts.batch_size, Some(100));
    }

    #[test]
    fn null_is_treated_as_absent() {
        let mut opts = KafkaOpts {
            topic: Some("cdrs".into()),
            ..KafkaOpts::default()
        };
        let json: KafkaOptsJson = serde_json::from_value(json!({"kafkaTopic": null})).unwrap();
        opts.merge(&json);
        assert_eq!(opts.topic.as_deref(), Some("cdrs"));
    }
}
