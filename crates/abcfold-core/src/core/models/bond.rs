use std::fmt;

/// One atom of a covalent bond: the chain (or ligand fragment) it lives in,
/// its position within that chain and its atom name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BondEndpoint {
    pub chain_id: String,
    pub position: i64,
    pub atom_name: String,
}

impl BondEndpoint {
    pub fn new(chain_id: impl Into<String>, position: i64, atom_name: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            position,
            atom_name: atom_name.into(),
        }
    }
}

impl fmt::Display for BondEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.chain_id, self.position, self.atom_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BondPair {
    pub first: BondEndpoint,
    pub second: BondEndpoint,
}

impl BondPair {
    pub fn new(first: BondEndpoint, second: BondEndpoint) -> Self {
        Self { first, second }
    }

    pub fn is_intra_chain(&self) -> bool {
        self.first.chain_id == self.second.chain_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_displays_as_flow_triple() {
        let endpoint = BondEndpoint::new("A", 12, "SG");
        assert_eq!(endpoint.to_string(), "[A, 12, SG]");
    }

    #[test]
    fn intra_chain_compares_chain_identifiers_only() {
        let same = BondPair::new(BondEndpoint::new("L", 1, "C1"), BondEndpoint::new("L", 2, "O4"));
        let cross = BondPair::new(BondEndpoint::new("A", 1, "SG"), BondEndpoint::new("L", 1, "C1"));
        assert!(same.is_intra_chain());
        assert!(!cross.is_intra_chain());
    }
}
