//! Relational-database connector options.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use eventex_core::Result;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{overlay, overlay_duration, project, project_duration};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SqlOptsJson {
    #[serde(rename = "sqlMaxIdleConns")]
    pub max_idle_conns: Option<i64>,
    #[serde(rename = "sqlMaxOpenConns")]
    pub max_open_conns: Option<i64>,
    #[serde(rename = "sqlConnMaxLifetime")]
    pub conn_max_lifetime: Option<String>,
    #[serde(rename = "mysqlDSNParams")]
    pub mysql_dsn_params: Option<BTreeMap<String, String>>,
    #[serde(rename = "sqlTableName")]
    pub table_name: Option<String>,
    #[serde(rename = "sqlDBName")]
    pub db_name: Option<String>,
    #[serde(rename = "pgSSLMode")]
    pub pg_ssl_mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlOpts {
    pub max_idle_conns: Option<i64>,
    pub max_open_conns: Option<i64>,
    pub conn_max_lifetime: Option<TimeDelta>,
    pub mysql_dsn_params: Option<BTreeMap<String, String>>,
    pub table_name: Option<String>,
    pub db_name: Option<String>,
    pub pg_ssl_mode: Option<String>,
}

impl SqlOpts {
    /// DSN parameters merge key by key: present keys are added or
    /// overwritten, none are removed.
    pub fn merge(&mut self, json: &SqlOptsJson) -> Result<()> {
        overlay(&mut self.max_idle_conns, &json.max_idle_conns);
        overlay(&mut self.max_open_conns, &json.max_open_conns);
        overlay_duration(&mut self.conn_max_lifetime, &json.conn_max_lifetime)?;
        if let Some(params) = &json.mysql_dsn_params {
            let dst = self.mysql_dsn_params.get_or_insert_with(BTreeMap::new);
            for (k, v) in params {
                dst.insert(k.clone(), v.clone());
            }
        }
        overlay(&mut self.table_name, &json.table_name);
        overlay(&mut self.db_name, &json.db_name);
        overlay(&mut self.pg_ssl_mode, &json.pg_ssl_mode);
        Ok(())
    }

    pub(crate) fn project(&self, m: &mut Map<String, Value>) {
        project(m, "sqlMaxIdleConns", &self.max_idle_conns);
        project(m, "sqlMaxOpenConns", &self.max_open_conns);
        project_duration(m, "sqlConnMaxLifetime", &self.conn_max_lifetime);
        if let Some(params) = &self.mysql_dsn_params {
            let params: Map<String, Value> = params
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect();
            m.insert("mysqlDSNParams".into(), Value::Object(params));
        }
        project(m, "sqlTableName", &self.table_name);
        project(m, "sqlDBName", &self.db_name);
        project(m, "pgSSLMode", &self.pg_ssl_mode);
    }
}
