//! Cloud object store (S3/SQS) connector options.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{overlay, project, redact};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AwsOptsJson {
    #[serde(rename = "awsRegion")]
    pub region: Option<String>,
    #[serde(rename = "awsKey")]
    pub key: Option<String>,
    #[serde(rename = "awsSecret")]
    pub secret: Option<String>,
    #[serde(rename = "awsToken")]
    pub token: Option<String>,
    #[serde(rename = "sqsQueueID")]
    pub sqs_queue_id: Option<String>,
    #[serde(rename = "s3BucketID")]
    pub s3_bucket_id: Option<String>,
    #[serde(rename = "s3FolderPath")]
    pub s3_folder_path: Option<String>,
}

#[derive(Clone, Default, PartialEq)]
pub struct AwsOpts {
    pub region: Option<String>,
    pub key: Option<String>,
    pub secret: Option<String>,
    pub token: Option<String>,
    pub sqs_queue_id: Option<String>,
    pub s3_bucket_id: Option<String>,
    pub s3_folder_path: Option<String>,
}

impl AwsOpts {
    pub fn merge(&mut self, json: &AwsOptsJson) {
        overlay(&mut self.region, &json.region);
        overlay(&mut self.key, &json.key);
        overlay(&mut self.secret, &json.secret);
        overlay(&mut self.token, &json.token);
        overlay(&mut self.sqs_queue_id, &json.sqs_queue_id);
        overlay(&mut self.s3_bucket_id, &json.s3_bucket_id);
        overlay(&mut self.s3_folder_path, &json.s3_folder_path);
    }

    pub(crate) fn project(&self, m: &mut Map<String, Value>) {
        project(m, "awsRegion", &self.region);
        project(m, "awsKey", &self.key);
        project(m, "awsSecret", &self.secret);
        project(m, "awsToken", &self.token);
        project(m, "sqsQueueID", &self.sqs_queue_id);
        project(m, "s3BucketID", &self.s3_bucket_id);
        project(m, "s3FolderPath", &self.s3_folder_path);
    }
}

impl std::fmt::Debug for AwsOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsOpts")
            .field("region", &self.region)
            .field("key", &redact(&self.key))
            .field("secret", &redact(&self.secret))
            .field("token", &redact(&self.token))
            .field("sqs_queue_id", &self.sqs_queue_id)
            .field("s3_bucket_id", &self.s3_bucket_id)
            .field("s3_folder_path", &self.s3_folder_path)
            .finish()
    }
}
