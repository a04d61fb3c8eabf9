//! Remote-procedure-call connector options.

use chrono::TimeDelta;
use eventex_core::Result;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{overlay, overlay_duration, project, project_duration};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RpcOptsJson {
    #[serde(rename = "rpcCodec")]
    pub codec: Option<String>,
    #[serde(rename = "serviceMethod")]
    pub service_method: Option<String>,
    #[serde(rename = "keyPath")]
    pub key_path: Option<String>,
    #[serde(rename = "certPath")]
    pub cert_path: Option<String>,
    #[serde(rename = "caPath")]
    pub ca_path: Option<String>,
    pub tls: Option<bool>,
    #[serde(rename = "connIDs")]
    pub conn_ids: Option<Vec<String>>,
    #[serde(rename = "rpcConnTimeout")]
    pub conn_timeout: Option<String>,
    #[serde(rename = "rpcReplyTimeout")]
    pub reply_timeout: Option<String>,
    #[serde(rename = "rpcAPIOpts")]
    pub api_opts: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RpcOpts {
    pub codec: Option<String>,
    pub service_method: Option<String>,
    pub key_path: Option<String>,
    pub cert_path: Option<String>,
    pub ca_path: Option<String>,
    pub tls: Option<bool>,
    pub conn_ids: Option<Vec<String>>,
    pub conn_timeout: Option<TimeDelta>,
    pub reply_timeout: Option<TimeDelta>,
    /// Replaced as a whole when present.
    pub api_opts: Option<Map<String, Value>>,
}

impl RpcOpts {
    pub fn merge(&mut self, json: &RpcOptsJson) -> Result<()> {
        overlay(&mut self.codec, &json.codec);
        overlay(&mut self.service_method, &json.service_method);
        overlay(&mut self.key_path, &json.key_path);
        overlay(&mut self.cert_path, &json.cert_path);
        overlay(&mut self.ca_path, &json.ca_path);
        overlay(&mut self.tls, &json.tls);
        overlay(&mut self.conn_ids, &json.conn_ids);
        overlay_duration(&mut self.conn_timeout, &json.conn_timeout)?;
        overlay_duration(&mut self.reply_timeout, &json.reply_timeout)?;
        overlay(&mut self.api_opts, &json.api_opts);
        Ok(())
    }

    pub(crate) fn project(&self, m: &mut Map<String, Value>) {
        project(m, "rpcCodec", &self.codec);
        project(m, "serviceMethod", &self.service_method);
        project(m, "keyPath", &self.key_path);
        project(m, "certPath", &self.cert_path);
        project(m, "caPath", &self.ca_path);
        project(m, "tls", &self.tls);
        project(m, "connIDs", &self.conn_ids);
        project_duration(m, "rpcConnTimeout", &self.conn_timeout);
        project_duration(m, "rpcReplyTimeout", &self.reply_timeout);
        project(m, "rpcAPIOpts", &self.api_opts);
    }
}
