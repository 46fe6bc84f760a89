// Network interfaces discovered on a host

use serde::Serialize;

use crate::source::HistoryChannel;

/// Traffic direction of a counter item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Direction {
    Download,
    Upload,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Download, Direction::Upload];

    pub fn label(self) -> &'static str {
        match self {
            Self::Download => "Download",
            Self::Upload => "Upload",
        }
    }
}

/// The item backing one direction of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRef {
    #[serde(rename = "itemid")]
    pub item_id: String,
    pub name: String,
    pub key: String,
    #[serde(skip)]
    pub channel: HistoryChannel,
}

/// One interface on a host; either direction may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "Download", skip_serializing_if = "Option::is_none")]
    pub download: Option<ItemRef>,
    #[serde(rename = "Upload", skip_serializing_if = "Option::is_none")]
    pub upload: Option<ItemRef>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download: None,
            upload: None,
        }
    }

    pub fn item(&self, direction: Direction) -> Option<&ItemRef> {
        match direction {
            Direction::Download => self.download.as_ref(),
            Direction::Upload => self.upload.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, direction: Direction) -> &mut Option<ItemRef> {
        match direction {
            Direction::Download => &mut self.download,
            Direction::Upload => &mut self.upload,
        }
    }
}
