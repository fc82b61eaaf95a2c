//! Snippet records and load candidates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{Result, SnippetError};

/// Process-unique snippet identifier, assigned by the store on insertion
pub type SnippetId = u64;

/// Where a snippet came from
///
/// `User` and `Gist` are no longer produced, but records carrying them still
/// take part in load precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetSource {
    Directory,
    User,
    Gist,
}

impl SnippetSource {
    /// Whether a record with this source may be replaced by a candidate from `incoming`
    pub fn yields_to(self, incoming: SnippetSource) -> bool {
        match self {
            Self::Directory => true,
            Self::User => incoming == Self::User,
            Self::Gist => matches!(incoming, Self::User | Self::Gist),
        }
    }
}

impl fmt::Display for SnippetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Directory => "directory",
            Self::User => "user",
            Self::Gist => "gist",
        };
        write!(f, "{}", s)
    }
}

/// A snippet held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: SnippetId,
    pub name: String,
    pub template: String,
    pub source: SnippetSource,
    /// Backing file, present for directory snippets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
}

impl Snippet {
    pub fn is_directory_snippet(&self) -> bool {
        self.source == SnippetSource::Directory
    }

    /// The editable fields of this snippet
    pub fn draft(&self) -> SnippetDraft {
        SnippetDraft {
            name: self.name.clone(),
            template: self.template.clone(),
        }
    }
}

/// A candidate for `SnippetStore::load`; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnippet {
    pub name: String,
    pub template: String,
    pub source: SnippetSource,
    pub file_path: Option<PathBuf>,
}

impl NewSnippet {
    /// A snippet backed by a file in a snippet directory
    pub fn from_file(name: impl Into<String>, template: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            source: SnippetSource::Directory,
            file_path: Some(file_path.into()),
        }
    }

    pub(crate) fn into_snippet(self, id: SnippetId) -> Snippet {
        Snippet {
            id,
            name: self.name,
            template: self.template,
            source: self.source,
            file_path: self.file_path,
        }
    }
}

/// The fields a dialog lets the user edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetDraft {
    pub name: String,
    pub template: String,
}

impl SnippetDraft {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }

    /// Check that the name can be used as a file name inside a snippet directory
    pub fn validate(&self) -> Result<()> {
        debug!(name = %self.name, "SnippetDraft::validate: called");
        let reason = if self.name.trim().is_empty() {
            Some("name is empty")
        } else if self.name == "." || self.name == ".." {
            Some("name is a relative directory reference")
        } else if self.name.contains(['/', '\\']) {
            Some("name contains a path separator")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SnippetError::InvalidName {
                name: self.name.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}
