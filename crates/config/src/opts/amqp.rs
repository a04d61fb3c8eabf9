//! Message-queue (AMQP) connector options.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{overlay, project, redact};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AmqpOptsJson {
    #[serde(rename = "amqpQueueID")]
    pub queue_id: Option<String>,
    #[serde(rename = "amqpRoutingKey")]
    pub routing_key: Option<String>,
    #[serde(rename = "amqpExchange")]
    pub exchange: Option<String>,
    #[serde(rename = "amqpExchangeType")]
    pub exchange_type: Option<String>,
    #[serde(rename = "amqpUsername")]
    pub username: Option<String>,
    #[serde(rename = "amqpPassword")]
    pub password: Option<String>,
}

#[derive(Clone, Default, PartialEq)]
pub struct AmqpOpts {
    pub queue_id: Option<String>,
    pub routing_key: Option<String>,
    pub exchange: Option<String>,
    pub exchange_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AmqpOpts {
    pub fn merge(&mut self, json: &AmqpOptsJson) {
        overlay(&mut self.queue_id, &json.queue_id);
        overlay(&mut self.routing_key, &json.routing_key);
        overlay(&mut self.exchange, &json.exchange);
        overlay(&mut self.exchange_type, &json.exchange_type);
        overlay(&mut self.username, &json.username);
        overlay(&mut self.password, &json.password);
    }

    pub(crate) fn project(&self, m: &mut Map<String, Value>) {
        project(m, "amqpQueueID", &self.queue_id);
        project(m, "amqpRoutingKey", &self.routing_key);
        project(m, "amqpExchange", &self.exchange);
        project(m, "amqpExchangeType", &self.exchange_type);
        project(m, "amqpUsername", &self.username);
        project(m, "amqpPassword", &self.password);
    }
}

impl std::fmt::Debug for AmqpOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmqpOpts")
            .field("queue_id", &self.queue_id)
            .field("routing_key", &self.routing_key)
            .field("exchange", &self.exchange)
            .field("exchange_type", &self.exchange_type)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_and_project() {
        let mut opts = AmqpOpts::default();
        let json: AmqpOptsJson = serde_json::from_value(json!({
            "amqpQueueID": "cdrs",
            "amqpExchangeType": "fanout"
        }))
        .unwrap();
        opts.merge(&json);
        let mut m = Map::new();
        opts.project(&mut m);
        assert_eq!(
            Value::Object(m),
            json!({"amqpQueueID": "cdrs", "amqpExchangeType": "fanout"})
        );
    }
}
