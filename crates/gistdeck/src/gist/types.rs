//! Gist API data types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::pagination::PageCursor;

/// Default page size used by list operations.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Largest page size the API accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// The account that owns a gist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistOwner {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
}

/// One file inside a gist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub filename: String,
    /// MIME type reported by the API (`type` on the wire).
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub size: u64,
    /// Only present on single-gist responses, and only for small files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A gist as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Files in the order the server listed them.
    #[serde(default, with = "files_in_order")]
    pub files: Vec<GistFile>,
    /// `None` for anonymous gists.
    #[serde(default)]
    pub owner: Option<GistOwner>,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub git_pull_url: String,
    #[serde(default)]
    pub git_push_url: String,
}

impl Gist {
    /// The first file, which search and listings treat as the gist's name.
    #[must_use]
    pub fn primary_file(&self) -> Option<&GistFile> {
        self.files.first()
    }

    /// Owner login, if the gist has an owner.
    #[must_use]
    pub fn owner_login(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.login.as_str())
    }

    /// Whether `login` owns this gist. Logins compare case-insensitively.
    #[must_use]
    pub fn is_owned_by(&self, login: &str) -> bool {
        self.owner_login()
            .is_some_and(|owner| owner.eq_ignore_ascii_case(login))
    }

    /// Description if present and non-blank, otherwise the primary filename.
    #[must_use]
    pub fn title(&self) -> &str {
        match self.description.as_deref().map(str::trim) {
            Some(desc) if !desc.is_empty() => desc,
            _ => self
                .primary_file()
                .map(|f| f.filename.as_str())
                .unwrap_or("untitled"),
        }
    }
}

/// The authenticated user's profile, cached alongside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One page of a gist listing.
#[derive(Debug, Clone, PartialEq)]
pub struct GistPage {
    pub gists: Vec<Gist>,
    pub cursor: PageCursor,
}

/// File content for create and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    pub content: String,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGist {
    pub description: String,
    pub public: bool,
    pub files: BTreeMap<String, FileContent>,
}

impl NewGist {
    pub fn new(description: impl Into<String>, public: bool) -> Self {
        Self {
            description: description.into(),
            public,
            files: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_file(mut self, filename: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(
            filename.into(),
            FileContent {
                content: content.into(),
            },
        );
        self
    }
}

/// Body of an update request. Unset fields are left untouched remotely; a
/// file mapped to `None` is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GistUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, Option<FileContent>>,
}

impl GistUpdate {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_file(mut self, filename: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(
            filename.into(),
            Some(FileContent {
                content: content.into(),
            }),
        );
        self
    }

    #[must_use]
    pub fn remove_file(mut self, filename: impl Into<String>) -> Self {
        self.files.insert(filename.into(), None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.files.is_empty()
    }
}

/// `GET /search/code` response, reduced to what maps hits back to gists.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CodeSearchResponse {
    #[serde(default)]
    pub items: Vec<CodeSearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CodeSearchItem {
    #[serde(default)]
    pub repository: Option<CodeSearchRepository>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CodeSearchRepository {
    #[serde(default)]
    pub name: String,
}

/// The API returns files as a JSON object keyed by filename. Keep the
/// server's ordering, since the first file names the gist.
mod files_in_order {
    use super::*;

    pub fn serialize<S: Serializer>(files: &[GistFile], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(files.len()))?;
        for file in files {
            map.serialize_entry(&file.filename, file)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<GistFile>, D::Error> {
        deserializer.deserialize_map(FilesVisitor)
    }

    struct FilesVisitor;

    impl<'de> Visitor<'de> for FilesVisitor {
        type Value = Vec<GistFile>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of filename to gist file")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut files = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, mut file)) = access.next_entry::<String, GistFile>()? {
                if file.filename.is_empty() {
                    file.filename = key;
                }
                files.push(file);
            }
            Ok(files)
        }
    }
}
