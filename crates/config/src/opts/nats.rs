//! Messaging-fabric (NATS) connector options.

use chrono::TimeDelta;
use eventex_core::Result;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{overlay, overlay_duration, project, project_duration};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NatsOptsJson {
    #[serde(rename = "natsJetStream")]
    pub jet_stream: Option<bool>,
    #[serde(rename = "natsSubject")]
    pub subject: Option<String>,
    #[serde(rename = "natsJWTFile")]
    pub jwt_file: Option<String>,
    #[serde(rename = "natsSeedFile")]
    pub seed_file: Option<String>,
    #[serde(rename = "natsCertificateAuthority")]
    pub certificate_authority: Option<String>,
    #[serde(rename = "natsClientCertificate")]
    pub client_certificate: Option<String>,
    #[serde(rename = "natsClientKey")]
    pub client_key: Option<String>,
    #[serde(rename = "natsJetStreamMaxWait")]
    pub jet_stream_max_wait: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NatsOpts {
    pub jet_stream: Option<bool>,
    pub subject: Option<String>,
    pub jwt_file: Option<String>,
    pub seed_file: Option<String>,
    pub certificate_authority: Option<String>,
    pub client_certificate: Option<String>,
    pub client_key: Option<String>,
    pub jet_stream_max_wait: Option<TimeDelta>,
}

impl NatsOpts {
    pub fn merge(&mut self, json: &NatsOptsJson) -> Result<()> {
        overlay(&mut self.jet_stream, &json.jet_stream);
        overlay(&mut self.subject, &json.subject);
        overlay(&mut self.jwt_file, &json.jwt_file);
        overlay(&mut self.seed_file, &json.seed_file);
        overlay(&mut self.certificate_authority, &json.certificate_authority);
        overlay(&mut self.client_certificate, &json.client_certificate);
        overlay(&mut self.client_key, &json.client_key);
        overlay_duration(&mut self.jet_stream_max_wait, &json.jet_stream_max_wait)
    }

    pub(crate) fn project(&self, m: &mut Map<String, Value>) {
        project(m, "natsJetStream", &self.jet_stream);
        project(m, "natsSubject", &self.subject);
        project(m, "natsJWTFile", &self.jwt_file);
        project(m, "natsSeedFile", &self.seed_file);
        project(m, "natsCertificateAuthority", &self.certificate_authority);
        project(m, "natsClientCertificate", &self.client_certificate);
        project(m, "natsClientKey", &self.client_key);
        project_duration(m, "natsJetStreamMaxWait", &self.jet_stream_max_wait);
    }
}
