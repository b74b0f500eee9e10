//! Data models for Microsoft Graph responses and listing results.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Whether a drive item is a folder or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File,
}

/// A child of a folder, with the drive item fields passed through as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub name: String,
    pub kind: EntryKind,
    pub metadata: Map<String, Value>,
}

/// Why a drive item was left out of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither a `folder` nor a `file` facet (e.g. OneNote packages).
    NoFacet,
    /// Missing or non-string `name`.
    NoName,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoFacet => write!(f, "neither a folder nor a file"),
            SkipReason::NoName => write!(f, "item has no name"),
        }
    }
}

impl ListingEntry {
    /// Build an entry from a raw drive item.
    pub fn from_item(item: Map<String, Value>) -> Result<Self, SkipReason> {
        let kind = if item.contains_key("folder") {
            EntryKind::Folder
        } else if item.contains_key("file") {
            EntryKind::File
        } else {
            return Err(SkipReason::NoFacet);
        };
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .ok_or(SkipReason::NoName)?
            .to_string();
        Ok(Self {
            name,
            kind,
            metadata: item,
        })
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    pub fn id(&self) -> Option<&str> {
        self.metadata.get("id").and_then(Value::as_str)
    }

    pub fn size(&self) -> Option<u64> {
        self.metadata.get("size").and_then(Value::as_u64)
    }

    pub fn web_url(&self) -> Option<&str> {
        self.metadata.get("webUrl").and_then(Value::as_str)
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.metadata
            .get("lastModifiedDateTime")
            .and_then(Value::as_str)
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.metadata
            .get("file")
            .and_then(|f| f.get("mimeType"))
            .and_then(Value::as_str)
    }

    pub fn child_count(&self) -> Option<u64> {
        self.metadata
            .get("folder")
            .and_then(|f| f.get("childCount"))
            .and_then(Value::as_u64)
    }
}

impl std::fmt::Display for ListingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_str = match self.kind {
            EntryKind::Folder => self
                .child_count()
                .map(|c| format!("{} items", c))
                .unwrap_or_else(|| "-".to_string()),
            EntryKind::File => self
                .size()
                .map(format_size)
                .unwrap_or_else(|| "-".to_string()),
        };
        let modified = self.last_modified().unwrap_or("-");
        let kind = match self.kind {
            EntryKind::Folder => "DIR",
            EntryKind::File => "FILE",
        };
        write!(f, "{:<4}\t{:>10}\t{:<20}\t{}", kind, size_str, modified, self.name)
    }
}

/// Children of a folder, split by kind in the order received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub folders: Vec<ListingEntry>,
    pub files: Vec<ListingEntry>,
}

impl Listing {
    pub fn push(&mut self, entry: ListingEntry) {
        match entry.kind {
            EntryKind::Folder => self.folders.push(entry),
            EntryKind::File => self.files.push(entry),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// Raw file bytes, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub data: Vec<u8>,
    /// Length announced by the server, when known.
    pub content_length: Option<u64>,
}

impl FileContent {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// One page of a Graph collection response.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// SharePoint site metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// Document library metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub drive_type: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl std::fmt::Display for Drive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = self.drive_type.as_deref().unwrap_or("-");
        write!(f, "{}\t{}\t{}", self.id, kind, self.name)
    }
}

/// Graph API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: u64,
}

/// OAuth2 token endpoint error.
#[derive(Debug, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}
