#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthMode {
    Residues,
    Atoms,
}

/// Selects how a structure's chains are counted.
///
/// In [`LengthMode::Residues`] every residue is one unit, except that ligand
/// residues and modified residues may be expanded to one unit per atom. This
/// mirrors how the prediction tools tokenize such residues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountOptions {
    pub mode: LengthMode,
    pub include_ligand_atoms: bool,
    pub include_modified_atoms: bool,
}

impl CountOptions {
    /// Token counting: residues, with ligands and modified residues per atom.
    pub fn tokens() -> Self {
        Self {
            mode: LengthMode::Residues,
            include_ligand_atoms: true,
            include_modified_atoms: true,
        }
    }

    pub fn atoms() -> Self {
        Self {
            mode: LengthMode::Atoms,
            include_ligand_atoms: true,
            include_modified_atoms: true,
        }
    }

    pub fn residues() -> Self {
        Self {
            mode: LengthMode::Residues,
            include_ligand_atoms: false,
            include_modified_atoms: false,
        }
    }
}

/// An ordered mapping from chain identifier to unit count.
///
/// Order is significant: repeating each identifier by its count, in map order,
/// yields the flat label sequence that defines a token ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainLengthMap {
    entries: Vec<(String, usize)>,
}

impl ChainLengthMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the count for `chain_id`, keeping its original position if already present.
    pub fn insert(&mut self, chain_id: impl Into<String>, length: usize) {
        let chain_id = chain_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == chain_id) {
            Some((_, existing)) => *existing = length,
            None => self.entries.push((chain_id, length)),
        }
    }

    pub fn get(&self, chain_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(id, _)| id == chain_id)
            .map(|(_, len)| *len)
    }

    pub fn contains(&self, chain_id: &str) -> bool {
        self.entries.iter().any(|(id, _)| id == chain_id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(id, len)| (id.as_str(), *len))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, i.e. the length of the flat label sequence.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, len)| len).sum()
    }

    pub fn same_order_as(&self, other: &ChainLengthMap) -> bool {
        self.keys().eq(other.keys())
    }

    pub fn flat_labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .flat_map(|(id, len)| std::iter::repeat_n(id.as_str(), *len))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ChainLengthMap {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        let mut map = ChainLengthMap::new();
        for (id, len) in iter {
            map.insert(id, len);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_first_seen_order() {
        let mut map = ChainLengthMap::new();
        map.insert("B", 2);
        map.insert("A", 3);
        map.insert("B", 5);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(map.get("B"), Some(5));
        assert_eq!(map.total(), 8);
    }

    #[test]
    fn flat_labels_repeat_each_chain_by_its_length() {
        let map: ChainLengthMap = [("A", 2), ("L", 1), ("B", 3)].into_iter().collect();
        assert_eq!(map.flat_labels(), vec!["A", "A", "L", "B", "B", "B"]);
    }

    #[test]
    fn same_order_ignores_lengths_but_not_order() {
        let a: ChainLengthMap = [("A", 2), ("B", 1)].into_iter().collect();
        let b: ChainLengthMap = [("A", 7), ("B", 9)].into_iter().collect();
        let c: ChainLengthMap = [("B", 1), ("A", 2)].into_iter().collect();
        assert!(a.same_order_as(&b));
        assert!(!a.same_order_as(&c));
    }

    #[test]
    fn empty_map_has_no_labels() {
        let map = ChainLengthMap::new();
        assert!(map.is_empty());
        assert!(map.flat_labels().is_empty());
        assert_eq!(map.total(), 0);
    }
}
