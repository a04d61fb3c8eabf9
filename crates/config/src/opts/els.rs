//! Search-index (Elasticsearch) connector options.

use chrono::TimeDelta;
use eventex_core::Result;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{overlay, overlay_duration, project, project_duration, redact};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ElsOptsJson {
    #[serde(rename = "elsCloud")]
    pub cloud: Option<bool>,
    #[serde(rename = "elsApiKey")]
    pub api_key: Option<String>,
    #[serde(rename = "elsServiceToken")]
    pub service_token: Option<String>,
    #[serde(rename = "elsCertificateFingerprint")]
    pub certificate_fingerprint: Option<String>,
    #[serde(rename = "elsUsername")]
    pub username: Option<String>,
    #[serde(rename = "elsPassword")]
    pub password: Option<String>,
    #[serde(rename = "elsDiscoverNodesOnStart")]
    pub discover_nodes_on_start: Option<bool>,
    #[serde(rename = "elsDiscoverNodesInterval")]
    pub discover_nodes_interval: Option<String>,
    #[serde(rename = "elsEnableDebugLogger")]
    pub enable_debug_logger: Option<bool>,
    #[serde(rename = "elsLogger")]
    pub logger: Option<String>,
    #[serde(rename = "elsCompressRequestBody")]
    pub compress_request_body: Option<bool>,
    #[serde(rename = "elsCompressRequestBodyLevel")]
    pub compress_request_body_level: Option<i64>,
    #[serde(rename = "elsRetryOnStatus")]
    pub retry_on_status: Option<Vec<i64>>,
    #[serde(rename = "elsMaxRetries")]
    pub max_retries: Option<i64>,
    #[serde(rename = "elsDisableRetry")]
    pub disable_retry: Option<bool>,
    #[serde(rename = "elsIndex")]
    pub index: Option<String>,
    #[serde(rename = "elsIfPrimaryTerm")]
    pub if_primary_term: Option<i64>,
    #[serde(rename = "elsIfSeqNo")]
    pub if_seq_no: Option<i64>,
    #[serde(rename = "elsOpType")]
    pub op_type: Option<String>,
    #[serde(rename = "elsPipeline")]
    pub pipeline: Option<String>,
    #[serde(rename = "elsRouting")]
    pub routing: Option<String>,
    #[serde(rename = "elsTimeout")]
    pub timeout: Option<String>,
    #[serde(rename = "elsVersion")]
    pub version: Option<i64>,
    #[serde(rename = "elsVersionType")]
    pub version_type: Option<String>,
    #[serde(rename = "elsWaitForActiveShards")]
    pub wait_for_active_shards: Option<String>,
}

#[derive(Clone, Default, PartialEq)]
pub struct ElsOpts {
    pub cloud: Option<bool>,
    pub api_key: Option<String>,
    pub service_token: Option<String>,
    pub certificate_fingerprint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub discover_nodes_on_start: Option<bool>,
    pub discover_nodes_interval: Option<TimeDelta>,
    pub enable_debug_logger: Option<bool>,
    pub logger: Option<String>,
    pub compress_request_body: Option<bool>,
    pub compress_request_body_level: Option<i64>,
    pub retry_on_status: Option<Vec<i64>>,
    pub max_retries: Option<i64>,
    pub disable_retry: Option<bool>,
    pub index: Option<String>,
    pub if_primary_term: Option<i64>,
    pub if_seq_no: Option<i64>,
    pub op_type: Option<String>,
    pub pipeline: Option<String>,
    pub routing: Option<String>,
    pub timeout: Option<TimeDelta>,
    pub version: Option<i64>,
    pub version_type: Option<String>,
    pub wait_for_active_shards: Option<String>,
}

impl ElsOpts {
    pub fn merge(&mut self, json: &ElsOptsJson) -> Result<()> {
        overlay(&mut self.cloud, &json.cloud);
        overlay(&mut self.api_key, &json.api_key);
        overlay(&mut self.service_token, &json.service_token);
        overlay(
            &mut self.certificate_fingerprint,
            &json.certificate_fingerprint,
        );
        overlay(&mut self.username, &json.username);
        overlay(&mut self.password, &json.password);
        overlay(
            &mut self.discover_nodes_on_start,
            &json.discover_nodes_on_start,
        );
        overlay_duration(
            &mut self.discover_nodes_interval,
            &json.discover_nodes_interval,
        )?;
        overlay(&mut self.enable_debug_logger, &json.enable_debug_logger);
        overlay(&mut self.logger, &json.logger);
        overlay(&mut self.compress_request_body, &json.compress_request_body);
        overlay(
            &mut self.compress_request_body_level,
            &json.compress_request_body_level,
        );
        overlay(&mut self.retry_on_status, &json.retry_on_status);
        overlay(&mut self.max_retries, &json.max_retries);
        overlay(&mut self.disable_retry, &json.disable_retry);
        overlay(&mut self.index, &json.index);
        overlay(&mut self.if_primary_term, &json.if_primary_term);
        overlay(&mut self.if_seq_no, &json.if_seq_no);
        overlay(&mut self.op_type, &json.op_type);
        overlay(&mut self.pipeline, &json.pipeline);
        overlay(&mut self.routing, &json.routing);
        overlay_duration(&mut self.timeout, &json.timeout)?;
        overlay(&mut self.version, &json.version);
        overlay(&mut self.version_type, &json.version_type);
        overlay(
            &mut self.wait_for_active_shards,
            &json.wait_for_active_shards,
        );
        Ok(())
    }

    pub(crate) fn project(&self, m: &mut Map<String, Value>) {
        project(m, "elsCloud", &self.cloud);
        project(m, "elsApiKey", &self.api_key);
        project(m, "elsServiceToken", &self.service_token);
        project(
            m,
            "elsCertificateFingerprint",
            &self.certificate_fingerprint,
        );
        project(m, "elsUsername", &self.username);
        project(m, "elsPassword", &self.password);
        project(m, "elsDiscoverNodesOnStart", &self.discover_nodes_on_start);
        project_duration(
            m,
            "elsDiscoverNodesInterval",
            &self.discover_nodes_interval,
        );
        project(m, "elsEnableDebugLogger", &self.enable_debug_logger);
        project(m, "elsLogger", &self.logger);
        project(m, "elsCompressRequestBody", &self.compress_request_body);
        project(
            m,
            "elsCompressRequestBodyLevel",
            &self.compress_request_body_level,
        );
        project(m, "elsRetryOnStatus", &self.retry_on_status);
        project(m, "elsMaxRetries", &self.max_retries);
        project(m, "elsDisableRetry", &self.disable_retry);
        project(m, "elsIndex", &self.index);
        project(m, "elsIfPrimaryTerm", &self.if_primary_term);
        project(m, "elsIfSeqNo", &self.if_seq_no);
        project(m, "elsOpType", &self.op_type);
        project(m, "elsPipeline", &self.pipeline);
        project(m, "elsRouting", &self.routing);
        project_duration(m, "elsTimeout", &self.timeout);
        project(m, "elsVersion", &self.version);
        project(m, "elsVersionType", &self.version_type);
        project(m, "elsWaitForActiveShards", &self.wait_for_active_shards);
    }
}

impl std::fmt::Debug for ElsOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElsOpts")
            .field("cloud", &self.cloud)
            .field("api_key", &redact(&self.api_key))
            .field("service_token", &redact(&self.service_token))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("index", &self.index)
            .field("op_type", &self.op_type)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
