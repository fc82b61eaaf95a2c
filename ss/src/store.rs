//! In-memory snippet collection

use tracing::{debug, info};

use crate::error::{Result, SnippetError};
use crate::pattern::literal_matcher;
use crate::snippet::{NewSnippet, Snippet, SnippetId, SnippetSource};

/// What `SnippetStore::load` did with a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No snippet had this name
    Inserted { id: SnippetId },
    /// A same-named snippet was removed and the candidate appended
    Replaced { old_id: SnippetId, id: SnippetId },
    /// A same-named snippet outranks the candidate; the store is unchanged
    Ignored { existing: SnippetSource },
}

impl LoadOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }

    /// Id assigned to the candidate, if it was accepted
    pub fn id(&self) -> Option<SnippetId> {
        match self {
            Self::Inserted { id } | Self::Replaced { id, .. } => Some(*id),
            Self::Ignored { .. } => None,
        }
    }
}

/// Snippets sorted by name, at most one per name
#[derive(Debug, Default)]
pub struct SnippetStore {
    snippets: Vec<Snippet>,
    last_id: SnippetId,
}

impl SnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate, replacing a same-named snippet when precedence allows
    pub fn load(&mut self, candidate: NewSnippet) -> LoadOutcome {
        debug!(name = %candidate.name, source = %candidate.source, "load: called");
        let existing = self.snippets.iter().position(|s| s.name == candidate.name);

        let old_id = match existing {
            Some(idx) => {
                let current = &self.snippets[idx];
                if !current.source.yields_to(candidate.source) {
                    debug!(
                        name = %candidate.name,
                        existing = %current.source,
                        "load: ignoring snippet, a snippet with the same name and higher precedence is present"
                    );
                    return LoadOutcome::Ignored {
                        existing: current.source,
                    };
                }
                Some(self.snippets.remove(idx).id)
            }
            None => None,
        };

        self.last_id += 1;
        let id = self.last_id;
        self.snippets.push(candidate.into_snippet(id));
        self.sort();

        match old_id {
            Some(old_id) => {
                debug!(old_id, id, "load: replaced existing snippet");
                LoadOutcome::Replaced { old_id, id }
            }
            None => {
                debug!(id, "load: inserted snippet");
                LoadOutcome::Inserted { id }
            }
        }
    }

    /// Overwrite the snippet with `record.id` with every other field of `record`
    ///
    /// Fails with `NameTaken` when a different snippet already has the new name.
    pub fn update(&mut self, record: Snippet) -> Result<()> {
        debug!(id = record.id, name = %record.name, "update: called");
        if self.find_other_named(&record.name, record.id).is_some() {
            return Err(SnippetError::NameTaken { name: record.name });
        }
        let slot = self
            .snippets
            .iter_mut()
            .find(|s| s.id == record.id)
            .ok_or(SnippetError::UnknownSnippet(record.id))?;
        *slot = record;
        self.sort();
        Ok(())
    }

    /// Remove every snippet carrying `id`, returning how many were removed
    pub fn delete(&mut self, id: SnippetId) -> usize {
        let before = self.snippets.len();
        self.snippets.retain(|s| s.id != id);
        let removed = before - self.snippets.len();
        debug!(id, removed, "delete: done");
        removed
    }

    /// Remove all snippets; ids keep counting from where they were
    pub fn clear(&mut self) -> usize {
        let removed = self.snippets.len();
        self.snippets.clear();
        info!(removed, "Cleared snippet store");
        removed
    }

    /// The live collection, sorted by name
    pub fn get_all(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn get(&self, id: SnippetId) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.name == name)
    }

    /// A snippet called `name` other than the one with `id`
    pub fn find_other_named(&self, name: &str, id: SnippetId) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.name == name && s.id != id)
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// Snippets whose name contains `query`, ignoring case; everything when the query is empty
    pub fn search(&self, query: Option<&str>) -> Result<Vec<&Snippet>> {
        let query = match query {
            Some(q) if !q.is_empty() => q,
            _ => {
                debug!("search: empty query, returning all");
                return Ok(self.snippets.iter().collect());
            }
        };

        let matcher = literal_matcher(query)?;
        let matches: Vec<&Snippet> = self.snippets.iter().filter(|s| matcher.is_match(&s.name)).collect();
        debug!(%query, count = matches.len(), "search: done");
        Ok(matches)
    }

    fn sort(&mut self) {
        self.snippets.sort_by(|a, b| a.name.cmp(&b.name));
    }
}
