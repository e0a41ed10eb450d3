use std::fmt;
use std::str::FromStr;

use polars::prelude::*;

// Column names
pub const RESIDUE1: &str = "Residue1";
pub const RESIDUE2: &str = "Residue2";
pub const SPECTRAL_COUNT: &str = "Spectral Count";
pub const CA_DISTANCE: &str = "CA Distance";
pub const SEQUENCE_DISTANCE: &str = "Sequence Distance";
pub const DOMAIN_ASSOCIATION: &str = "Domain Association";

/// Separator between the two sides of a domain-association label.
pub const ASSOCIATION_SEPARATOR: &str = " to ";

pub fn polars_err(e: Box<dyn std::error::Error>) -> PolarsError {
    PolarsError::ComputeError(e.to_string().into())
}

/// Anything that can be read into a crosslink table.
pub trait Dataset {
    fn load(&self) -> PolarsResult<DataFrame>;

    /// Load and make sure the columns every downstream step relies on exist.
    fn load_validated(&self, required: &[&str]) -> PolarsResult<DataFrame> {
        let df = self.load()?;
        crate::helper_functions::require_columns(&df, required)?;
        Ok(df)
    }
}

/// Unordered residue pair, stored ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPair(pub i64, pub i64);

impl CanonicalPair {
    pub fn new(a: i64, b: i64) -> Self {
        if a <= b {
            CanonicalPair(a, b)
        } else {
            CanonicalPair(b, a)
        }
    }

    pub fn contains(&self, residue: i64) -> bool {
        self.0 == residue || self.1 == residue
    }

    pub fn residues(&self) -> [i64; 2] {
        [self.0, self.1]
    }
}

/// Direction of the CA-distance cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaComparison {
    /// keep `CA Distance <= cutoff`
    Less,
    /// keep `CA Distance >= cutoff`
    Greater,
}

impl FromStr for CaComparison {
    type Err = PolarsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "less" => Ok(CaComparison::Less),
            "greater" => Ok(CaComparison::Greater),
            other => Err(PolarsError::InvalidOperation(
                format!("comparison_type must be 'less' or 'greater', got '{other}'").into(),
            )),
        }
    }
}

impl fmt::Display for CaComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaComparison::Less => "less",
            CaComparison::Greater => "greater",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_ignores_order() {
        assert_eq!(CanonicalPair::new(20, 10), CanonicalPair::new(10, 20));
        assert_eq!(CanonicalPair::new(2, 2), CanonicalPair(2, 2));
        assert!(CanonicalPair::new(30, 7).contains(7));
    }

    #[test]
    fn comparison_parses_known_modes_only() {
        assert_eq!("less".parse::<CaComparison>().unwrap(), CaComparison::Less);
        assert_eq!("greater".parse::<CaComparison>().unwrap(), CaComparison::Greater);
        let err = "between".parse::<CaComparison>().unwrap_err();
        assert!(matches!(err, PolarsError::InvalidOperation(_)));
    }
}
