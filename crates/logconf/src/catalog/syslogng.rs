//! syslog-ng parser and destination records (brace grammar).

use serde::Deserialize;

use crate::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Record)]
#[serde(default, rename_all = "kebab-case")]
#[conf(name = "json-parser")]
pub struct JsonParser {
    #[conf(tag = "optional")]
    pub extract_prefix: String,
    #[conf(tag = "optional")]
    pub marker: String,
    #[conf(tag = "optional")]
    pub prefix: String,
    #[conf(tag = "optional")]
    pub template: String,
}

/// `parser <name> { <driver>(...); };`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Record)]
#[serde(default, rename_all = "kebab-case")]
pub struct Parser {
    #[conf(tag = "name=json-parser,driver")]
    pub json_parser: Option<JsonParser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Record)]
#[serde(default, rename_all = "kebab-case")]
#[conf(name = "file")]
pub struct FileDestination {
    #[conf(tag = "arg,required")]
    pub path: String,
    pub create_dirs: Option<bool>,
    #[conf(tag = "optional")]
    pub template: String,
    #[conf(tag = "optional")]
    pub persist_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Record)]
#[serde(default, rename_all = "kebab-case")]
#[conf(name = "syslog")]
pub struct SyslogDestination {
    #[conf(tag = "arg,required")]
    pub host: String,
    pub port: Option<u16>,
    /// `tcp`, `udp` or `tls`.
    #[conf(tag = "optional")]
    pub transport: String,
    #[conf(tag = "optional")]
    pub persist_name: String,
}

/// `destination <name> { <driver>(...); };`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Record)]
#[serde(default)]
pub struct Destination {
    #[conf(tag = "driver")]
    pub file: Option<FileDestination>,
    #[conf(tag = "driver")]
    pub syslog: Option<SyslogDestination>,
}
