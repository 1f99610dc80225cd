use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

const FIRST_ID: u8 = b'A';
const LAST_ID: u8 = b'Z';

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("All single-letter chain identifiers are in use ({used} identifiers registered)")]
pub struct IdentifierSpaceExhausted {
    pub used: usize,
}

/// Chain and fragment identifiers seen during one conversion.
///
/// Tracks every identifier in first-seen order, hands out fresh single-letter
/// identifiers for synthesized ligand fragments, and records which fragments
/// were split off each ligand root.
#[derive(Debug, Clone)]
pub struct IdentifierRegistry {
    used: Vec<String>,
    lookup: HashSet<String>,
    links: BTreeMap<String, Vec<String>>,
    cursor: u8,
}

impl Default for IdentifierRegistry {
    fn default() -> Self {
        Self {
            used: Vec::new(),
            lookup: HashSet::new(),
            links: BTreeMap::new(),
            cursor: FIRST_ID,
        }
    }
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id` as used. Returns `false` if it was already known.
    pub fn register(&mut self, id: &str) -> bool {
        if self.lookup.contains(id) {
            return false;
        }
        self.lookup.insert(id.to_string());
        self.used.push(id.to_string());
        true
    }

    pub fn register_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.register(id.as_ref());
        }
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.lookup.contains(id)
    }

    pub fn used(&self) -> &[String] {
        &self.used
    }

    /// Returns the smallest single-letter identifier not yet registered.
    ///
    /// The identifier is not registered by this call; the cursor only moves
    /// past identifiers that are already in use, so calling this twice without
    /// registering returns the same letter.
    pub fn next_unused(&mut self) -> Result<String, IdentifierSpaceExhausted> {
        while self.cursor <= LAST_ID {
            let candidate = (self.cursor as char).to_string();
            if !self.lookup.contains(&candidate) {
                return Ok(candidate);
            }
            self.cursor += 1;
        }
        Err(IdentifierSpaceExhausted {
            used: self.used.len(),
        })
    }

    /// Attaches `fragment` to the chain of fragments that `parent` belongs to.
    ///
    /// If `parent` is itself a fragment of some root, `fragment` is appended to
    /// that root's list; otherwise it is appended to `parent`'s own list.
    pub fn link(&mut self, parent: &str, fragment: &str) {
        if let Some(fragments) = self
            .links
            .values_mut()
            .find(|fragments| fragments.iter().any(|f| f == parent))
        {
            fragments.push(fragment.to_string());
            return;
        }
        self.links
            .entry(parent.to_string())
            .or_default()
            .push(fragment.to_string());
    }

    pub fn fragments_of(&self, root: &str) -> &[String] {
        self.links.get(root).map_or(&[], Vec::as_slice)
    }

    pub fn is_split_root(&self, id: &str) -> bool {
        self.links.contains_key(id)
    }

    pub fn links(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.links.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent_and_preserves_first_seen_order() {
        let mut registry = IdentifierRegistry::new();
        assert!(registry.register("B"));
        assert!(registry.register("A"));
        assert!(!registry.register("B"));
        registry.register_all(["C", "A"]);
        assert_eq!(registry.used(), ["B", "A", "C"]);
    }

    #[test]
    fn next_unused_starts_at_a_on_empty_registry() {
        let mut registry = IdentifierRegistry::new();
        assert_eq!(registry.next_unused().unwrap(), "A");
        assert_eq!(registry.next_unused().unwrap(), "A");
    }

    #[test]
    fn next_unused_skips_registered_identifiers() {
        let mut registry = IdentifierRegistry::new();
        registry.register_all(["A", "B", "D"]);
        let first = registry.next_unused().unwrap();
        assert_eq!(first, "C");
        registry.register(&first);
        assert_eq!(registry.next_unused().unwrap(), "E");
    }

    #[test]
    fn next_unused_fails_when_alphabet_is_exhausted() {
        let mut registry = IdentifierRegistry::new();
        for c in b'A'..=b'Z' {
            registry.register(&(c as char).to_string());
        }
        let err = registry.next_unused().unwrap_err();
        assert_eq!(err.used, 26);
    }

    #[test]
    fn multi_letter_identifiers_do_not_block_single_letters() {
        let mut registry = IdentifierRegistry::new();
        registry.register_all(["AA", "AB"]);
        assert_eq!(registry.next_unused().unwrap(), "A");
    }

    #[test]
    fn link_accumulates_chained_fragments_under_the_root() {
        let mut registry = IdentifierRegistry::new();
        registry.link("L", "M");
        registry.link("M", "N");
        registry.link("N", "O");
        assert_eq!(registry.fragments_of("L"), ["M", "N", "O"]);
        assert!(registry.fragments_of("M").is_empty());
        assert!(registry.is_split_root("L"));
        assert!(!registry.is_split_root("M"));
    }

    #[test]
    fn independent_roots_get_independent_lists() {
        let mut registry = IdentifierRegistry::new();
        registry.link("L", "A");
        registry.link("K", "B");
        registry.link("A", "C");
        assert_eq!(registry.fragments_of("L"), ["A", "C"]);
        assert_eq!(registry.fragments_of("K"), ["B"]);
    }

    #[test]
    fn fragment_lists_never_contain_their_root() {
        let mut registry = IdentifierRegistry::new();
        registry.link("L", "A");
        registry.link("A", "B");
        for (root, fragments) in registry.links() {
            assert!(!fragments.iter().any(|f| f == root));
        }
    }

    #[test]
    fn fragments_of_unknown_root_is_empty() {
        let registry = IdentifierRegistry::new();
        assert!(registry.fragments_of("Z").is_empty());
    }
}
