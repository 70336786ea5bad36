//! Visible-list derivation and its memo cache.
//!
//! `filter_entries` is the pure derivation: (all entries × selected folder
//! × search text) → visible entries, preserving input order. `FilterCache`
//! memoizes it per (folder, query) so rapid folder/search switching in a UI
//! never recomputes an unchanged view. The cache is stamped with the vault
//! revision; any mutation (or a principal switch, which reloads) moves the
//! revision and drops every cached result at once.

use std::collections::HashMap;

use tracing::debug;

use super::entry::PasswordEntry;
use super::folders::ALL_FOLDER;

/// Derive the visible entries for a folder selection and search query.
///
/// Selecting [`ALL_FOLDER`] skips the folder restriction. A non-empty query
/// matches case-insensitively against title, username, website, and notes.
/// Relative order of `entries` is preserved.
pub fn filter_entries(entries: &[PasswordEntry], folder: &str, query: &str) -> Vec<PasswordEntry> {
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| folder == ALL_FOLDER || entry.folder == folder)
        .filter(|entry| needle.is_empty() || matches_query(entry, &needle))
        .cloned()
        .collect()
}

fn matches_query(entry: &PasswordEntry, needle: &str) -> bool {
    entry.title.to_lowercase().contains(needle)
        || entry.username.to_lowercase().contains(needle)
        || entry.website.to_lowercase().contains(needle)
        || entry
            .notes
            .as_deref()
            .is_some_and(|notes| notes.to_lowercase().contains(needle))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FilterKey {
    folder: String,
    /// Lowercased; queries differing only in case share a slot.
    query: String,
}

/// Generation-stamped memo of [`filter_entries`] results.
///
/// Purely a performance layer: cached and uncached calls return identical
/// sequences for identical inputs.
#[derive(Debug, Default)]
pub struct FilterCache {
    generation: u64,
    results: HashMap<FilterKey, Vec<PasswordEntry>>,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible entries for (folder, query), computed at most once per
    /// generation. Pass the vault revision as `generation`; a moved
    /// revision invalidates the whole cache before the lookup.
    pub fn visible(
        &mut self,
        entries: &[PasswordEntry],
        generation: u64,
        folder: &str,
        query: &str,
    ) -> Vec<PasswordEntry> {
        if generation != self.generation {
            debug!(
                "Dropping {} cached views (generation {} -> {})",
                self.results.len(),
                self.generation,
                generation
            );
            self.results.clear();
            self.generation = generation;
        }

        let key = FilterKey {
            folder: folder.to_string(),
            query: query.to_lowercase(),
        };
        self.results
            .entry(key)
            .or_insert_with(|| filter_entries(entries, folder, query))
            .clone()
    }

    /// Number of memoized views, for inspection in tests.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::entry::SecretString;
    use crate::vault::strength::Strength;
    use chrono::Utc;

    fn entry(id: &str, website: &str, folder: &str, notes: Option<&str>) -> PasswordEntry {
        PasswordEntry {
            id: id.into(),
            title: website.into(),
            username: format!("user@{website}"),
            secret: SecretString::new("secret"),
            website: website.into(),
            folder: folder.into(),
            date_added: Utc::now(),
            last_modified: Utc::now(),
            notes: notes.map(Into::into),
            strength: Strength::Weak,
        }
    }

    fn sample() -> Vec<PasswordEntry> {
        vec![
            entry("1", "github.com", "Work", None),
            entry("2", "gmail.com", "Personal", Some("recovery codes printed")),
        ]
    }

    #[test]
    fn test_folder_restriction() {
        let entries = sample();
        let visible = filter_entries(&entries, "Work", "");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "1");
    }

    #[test]
    fn test_all_folder_skips_restriction() {
        let entries = sample();
        assert_eq!(filter_entries(&entries, ALL_FOLDER, "").len(), 2);
    }

    #[test]
    fn test_query_is_case_insensitive_and_spans_fields() {
        let entries = sample();

        let by_site = filter_entries(&entries, ALL_FOLDER, "GIT");
        assert_eq!(by_site.len(), 1);
        assert_eq!(by_site[0].id, "1");

        let by_notes = filter_entries(&entries, ALL_FOLDER, "recovery");
        assert_eq!(by_notes.len(), 1);
        assert_eq!(by_notes[0].id, "2");

        assert!(filter_entries(&entries, ALL_FOLDER, "zzz").is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let entries = vec![
            entry("1", "a.com", "Work", None),
            entry("2", "aa.com", "Work", None),
            entry("3", "aaa.com", "Work", None),
        ];
        let visible = filter_entries(&entries, "Work", "a");
        let ids: Vec<_> = visible.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn test_cache_returns_same_sequence_as_uncached() {
        let entries = sample();
        let mut cache = FilterCache::new();

        let cached = cache.visible(&entries, 1, "Work", "git");
        assert_eq!(cached, filter_entries(&entries, "Work", "git"));
        // Second hit comes from the memo and is still identical.
        assert_eq!(cache.visible(&entries, 1, "Work", "git"), cached);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_invalidates_wholesale_on_new_generation() {
        let mut entries = sample();
        let mut cache = FilterCache::new();

        assert_eq!(cache.visible(&entries, 1, ALL_FOLDER, "").len(), 2);
        cache.visible(&entries, 1, "Work", "");
        assert_eq!(cache.len(), 2);

        // A mutation bumps the generation; stale views must not survive.
        entries.pop();
        let visible = cache.visible(&entries, 2, ALL_FOLDER, "");
        assert_eq!(visible.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_queries_differing_only_in_case_share_a_slot() {
        let entries = sample();
        let mut cache = FilterCache::new();
        cache.visible(&entries, 1, ALL_FOLDER, "Git");
        cache.visible(&entries, 1, ALL_FOLDER, "gIt");
        assert_eq!(cache.len(), 1);
    }
}
