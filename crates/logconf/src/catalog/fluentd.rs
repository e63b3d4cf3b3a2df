//! Fluentd output records (directive grammar).

use serde::Deserialize;

use crate::secret::Secret;
use crate::Record;

/// `<match **>` section of the Amazon Kinesis Data Streams output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Record)]
#[serde(default)]
#[conf(name = "match", plugin = "kinesis_streams", argument = "**")]
pub struct KinesisStreamOutputConfig {
    /// Name of the stream to put data.
    #[conf(tag = "required")]
    pub stream_name: String,
    /// Key to extract the partition key from the JSON record; random when unset.
    #[conf(tag = "omitempty")]
    pub partition_key: String,
    pub aws_key_id: Option<Secret>,
    pub aws_sec_key: Option<Secret>,
    pub aws_ses_token: Option<Secret>,
    #[conf(tag = "omitempty")]
    pub aws_iam_retries: u32,
    pub assume_role_credentials: Option<KinesisStreamAssumeRoleCredentials>,
    /// Region of the stream, e.g. `us-east-1`. Taken from `AWS_REGION` when unset.
    #[conf(tag = "omitempty")]
    pub region: String,
    #[conf(tag = "omitempty")]
    pub retries_on_batch_request: u32,
    pub reset_backoff_if_success: Option<bool>,
    /// Capped at 500 by the PutRecords API.
    #[conf(tag = "omitempty")]
    pub batch_request_max_count: u32,
    #[conf(tag = "omitempty")]
    pub batch_request_max_size: u64,
    pub format: Option<Format>,
    pub buffer: Option<Buffer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Record)]
#[serde(default)]
#[conf(name = "assume_role_credentials", anonymous)]
pub struct KinesisStreamAssumeRoleCredentials {
    #[conf(tag = "required")]
    pub role_arn: String,
    #[conf(tag = "required")]
    pub role_session_name: String,
    /// IAM policy in JSON format.
    #[conf(tag = "omitempty")]
    pub policy: String,
    /// 900 to 3600.
    #[conf(tag = "omitempty")]
    pub duration_seconds: String,
    #[conf(tag = "omitempty")]
    pub external_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Record)]
#[serde(default)]
#[conf(name = "format", anonymous)]
pub struct Format {
    /// Formatter plugin: `out_file`, `json`, `ltsv`, `csv`, `msgpack`, `hash`, `single_value`.
    #[serde(rename = "type")]
    #[conf(tag = "type,default=json")]
    pub kind: String,
    pub add_newline: Option<bool>,
    /// Only used by `single_value`.
    #[conf(tag = "omitempty")]
    pub message_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Record)]
#[serde(default)]
#[conf(name = "buffer", anonymous)]
pub struct Buffer {
    #[serde(rename = "type")]
    #[conf(tag = "type,default=file")]
    pub kind: String,
    /// Chunk keys, rendered into the section header.
    #[conf(tag = "arg,omitempty")]
    pub tags: String,
    #[conf(tag = "omitempty")]
    pub path: String,
    #[conf(tag = "omitempty")]
    pub chunk_limit_size: String,
    #[conf(tag = "omitempty")]
    pub total_limit_size: String,
    #[conf(tag = "omitempty")]
    pub flush_mode: String,
    #[conf(tag = "omitempty")]
    pub flush_interval: String,
    #[conf(tag = "omitempty")]
    pub flush_thread_count: u32,
    pub retry_forever: Option<bool>,
    #[conf(tag = "omitempty")]
    pub retry_max_times: u32,
    #[conf(tag = "default=10m")]
    pub timekey: String,
    #[conf(tag = "default=1m")]
    pub timekey_wait: String,
    #[conf(tag = "default=true")]
    pub timekey_use_utc: Option<bool>,
}

impl Default for Buffer {
    fn default() -> Self {
        Self {
            kind: String::new(),
            tags: "tag,time".to_string(),
            path: String::new(),
            chunk_limit_size: String::new(),
            total_limit_size: String::new(),
            flush_mode: String::new(),
            flush_interval: String::new(),
            flush_thread_count: 0,
            retry_forever: None,
            retry_max_times: 0,
            timekey: String::new(),
            timekey_wait: String::new(),
            timekey_use_utc: None,
        }
    }
}

/// `<match **> @type null </match>`: discards everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Record)]
#[serde(default)]
#[conf(name = "match", plugin = "null", argument = "**")]
pub struct NullOutputConfig {
    pub never_flush: Option<bool>,
}

/// One configured output; exactly one plugin per output.
#[derive(Debug, Clone, PartialEq, Deserialize, Record)]
#[serde(rename_all = "snake_case")]
pub enum OutputPlugin {
    KinesisStream(KinesisStreamOutputConfig),
    Null(NullOutputConfig),
}

/// Output resource body: the plugin plus fields that never reach the agent.
#[derive(Debug, Clone, PartialEq, Deserialize, Record)]
pub struct OutputSpec {
    #[serde(flatten)]
    pub plugin: OutputPlugin,
    #[serde(default)]
    #[conf(tag = "skip")]
    pub logging_ref: String,
}
