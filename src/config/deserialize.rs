// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Accepts SSH targets as either an address string or a detailed map.

use serde::Deserialize;

use super::SshConfig;

pub fn deserialize_ssh<'de, D>(deserializer: D) -> Result<SshConfig, D::Error>
where
    D: serde::Deserializer<'de>,
{
    SshEntry::deserialize(deserializer)?
        .into_ssh_config()
        .map_err(serde::de::Error::custom)
}

pub fn deserialize_ssh_option<'de, D>(deserializer: D) -> Result<Option<SshConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<SshEntry> = Option::deserialize(deserializer)?;
    opt.map(SshEntry::into_ssh_config)
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SshEntry {
    Simple(String),
    Detailed(SshConfig),
}

impl SshEntry {
    fn into_ssh_config(self) -> Result<SshConfig, String> {
        match self {
            SshEntry::Simple(s) => SshConfig::parse(&s),
            SshEntry::Detailed(c) => Ok(c),
        }
    }
}
