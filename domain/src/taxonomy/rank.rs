//! Taxonomic rank value object

use serde::{Deserialize, Serialize};

/// One of the seven Linnaean ranks the hierarchy is keyed by.
///
/// The declaration order is the descent order: the classification engine
/// walks `Kingdom` first and `Species` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    /// All ranks, shallowest first.
    pub const ALL: [Rank; 7] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// Field name used in species taxonomy records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Kingdom => "Kingdom",
            Rank::Phylum => "Phylum",
            Rank::Class => "Class",
            Rank::Order => "Order",
            Rank::Family => "Family",
            Rank::Genus => "Genus",
            Rank::Species => "Species",
        }
    }

    /// Zero-based depth below the tree root.
    pub fn depth(&self) -> usize {
        *self as usize
    }

    /// Rank for a depth below the root.
    ///
    /// Records with missing intermediate ranks produce shallower paths, so
    /// depth is the best available estimate. Depths past `Species` clamp to
    /// `Species`.
    pub fn from_depth(depth: usize) -> Rank {
        Self::ALL[depth.min(Self::ALL.len() - 1)]
    }

    /// Next deeper rank, `None` at `Species`.
    pub fn next(&self) -> Option<Rank> {
        Self::ALL.get(self.depth() + 1).copied()
    }

    /// Whether this is the leaf rank.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Rank::Species)
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|rank| rank.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown taxonomic rank: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_roundtrip() {
        for rank in Rank::ALL {
            assert_eq!(Rank::from_depth(rank.depth()), rank);
        }
    }

    #[test]
    fn test_from_depth_clamps() {
        assert_eq!(Rank::from_depth(42), Rank::Species);
    }

    #[test]
    fn test_next() {
        assert_eq!(Rank::Kingdom.next(), Some(Rank::Phylum));
        assert_eq!(Rank::Species.next(), None);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("genus".parse::<Rank>().unwrap(), Rank::Genus);
        assert_eq!(" ORDER ".parse::<Rank>().unwrap(), Rank::Order);
        assert!("tribe".parse::<Rank>().is_err());
    }
}
