// Wire types returned by the metrics source.
// Zabbix encodes numbers as JSON strings; the numeric fields accept both forms.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::SourceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroup {
    #[serde(rename = "groupid")]
    pub group_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    #[serde(rename = "hostid")]
    pub host_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<HostGroup>,
}

impl Host {
    /// Name of the first group the host belongs to, if any.
    pub fn primary_group(&self) -> Option<&str> {
        self.groups.first().map(|g| g.name.as_str())
    }
}

/// One monitoring item as listed by `item.get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredItem {
    #[serde(rename = "itemid")]
    pub item_id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "key_")]
    pub key: String,
    #[serde(deserialize_with = "from_str_or_num")]
    pub value_type: u8,
}

/// One history row as returned by `history.get`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HistoryRecord {
    #[serde(deserialize_with = "from_str_or_num")]
    pub clock: i64,
    #[serde(default, deserialize_with = "from_str_or_num")]
    pub ns: u32,
    #[serde(deserialize_with = "from_str_or_num")]
    pub value: f64,
}

/// Numeric history tables, keyed by item value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum HistoryChannel {
    Float,
    Unsigned,
}

impl HistoryChannel {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Float => 0,
            Self::Unsigned => 3,
        }
    }
}

impl From<HistoryChannel> for u8 {
    fn from(channel: HistoryChannel) -> Self {
        channel.as_u8()
    }
}

impl TryFrom<u8> for HistoryChannel {
    type Error = SourceError;

    /// Only float (0) and unsigned (3) carry rates; string, log and text (1, 2, 4) are rejected.
    fn try_from(value_type: u8) -> Result<Self, Self::Error> {
        match value_type {
            0 => Ok(Self::Float),
            3 => Ok(Self::Unsigned),
            other => Err(SourceError::UnsupportedValueType(other)),
        }
    }
}

/// Time-bounded history request for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub item_id: String,
    pub channel: HistoryChannel,
    /// Unix seconds, inclusive.
    pub time_from: i64,
    /// Unix seconds, inclusive.
    pub time_till: i64,
    pub limit: u32,
}

fn from_str_or_num<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Num(T),
        Str(String),
    }

    match Raw::<T>::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
