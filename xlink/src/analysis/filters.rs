use std::collections::HashSet;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::helper_functions::{canonical_pairs, require_columns, str_values};
use crate::models::{
    CaComparison, ASSOCIATION_SEPARATOR, CA_DISTANCE, DOMAIN_ASSOCIATION, RESIDUE1, RESIDUE2,
    SPECTRAL_COUNT,
};

/// Rows with `Spectral Count >= threshold`.
pub fn filter_by_spectral_count(df: &DataFrame, threshold: f64) -> PolarsResult<DataFrame> {
    require_columns(df, &[SPECTRAL_COUNT])?;

    let filtered = df
        .clone()
        .lazy()
        .filter(col(SPECTRAL_COUNT).gt_eq(lit(threshold)))
        .collect()?;
    debug!("Spectral count >= {}: {} of {} rows", threshold, filtered.height(), df.height());
    Ok(filtered)
}

/// Rows whose CA distance is on the `comparison` side of `cutoff`, boundary included.
pub fn filter_by_ca_distance(
    df: &DataFrame,
    cutoff: f64,
    comparison: CaComparison,
) -> PolarsResult<DataFrame> {
    require_columns(df, &[CA_DISTANCE])?;

    let predicate = match comparison {
        CaComparison::Less => col(CA_DISTANCE).lt_eq(lit(cutoff)),
        CaComparison::Greater => col(CA_DISTANCE).gt_eq(lit(cutoff)),
    };
    df.clone().lazy().filter(predicate).collect()
}

/// Keep the first row of every canonical residue pair.
pub fn deduplicate_by_canonical_pair(df: &DataFrame) -> PolarsResult<DataFrame> {
    require_columns(df, &[RESIDUE1, RESIDUE2])?;

    let mut seen = HashSet::new();
    let mask: BooleanChunked = canonical_pairs(df)?
        .into_iter()
        .map(|pair| seen.insert(pair))
        .collect();
    df.filter(&mask)
}

/// Unique crosslinks that involve `residue`, with every original column.
pub fn filter_by_residue(df: &DataFrame, residue: i64) -> PolarsResult<DataFrame> {
    let unique = deduplicate_by_canonical_pair(df)?;

    let mask: BooleanChunked = canonical_pairs(&unique)?
        .into_iter()
        .map(|pair| pair.contains(residue))
        .collect();
    unique.filter(&mask)
}

/// Selection on the `Domain Association` label ("A to B").
///
/// Conditions are checked in this order and must all pass:
/// 1. `exclude_intra_domain` rejects labels whose sides are all the same domain
/// 2. `exclude` rejects labels touching any of `domains_to_exclude`
/// 3. a two-part `selection` ("X to Y") matches that label or "Y to X";
///    any other non-empty `selection` must equal one of the label's sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainFilter {
    pub selection: Option<String>,
    pub exclude_intra_domain: bool,
    pub exclude: bool,
    pub domains_to_exclude: Vec<String>,
}

impl Default for DomainFilter {
    fn default() -> Self {
        Self {
            selection: None,
            exclude_intra_domain: true,
            exclude: false,
            domains_to_exclude: Vec::new(),
        }
    }
}

impl DomainFilter {
    pub fn accepts(&self, label: &str) -> bool {
        let sides: Vec<&str> = label.split(ASSOCIATION_SEPARATOR).collect();

        if self.exclude_intra_domain {
            let distinct: HashSet<&str> = sides.iter().copied().collect();
            if distinct.len() == 1 {
                return false;
            }
        }

        if self.exclude
            && !self.domains_to_exclude.is_empty()
            && sides.iter().any(|side| self.domains_to_exclude.iter().any(|d| d == side))
        {
            return false;
        }

        match self.selection.as_deref() {
            Some(selection) if !selection.is_empty() => {
                let parts: Vec<&str> = selection.split(ASSOCIATION_SEPARATOR).collect();
                if parts.len() == 2 {
                    let reversed = format!("{}{}{}", parts[1], ASSOCIATION_SEPARATOR, parts[0]);
                    label == selection || label == reversed
                } else {
                    sides.iter().any(|side| side.trim() == selection)
                }
            }
            _ => true,
        }
    }
}

pub fn filter_by_domain(df: &DataFrame, filter: &DomainFilter) -> PolarsResult<DataFrame> {
    require_columns(df, &[DOMAIN_ASSOCIATION])?;

    let mask: BooleanChunked = str_values(df, DOMAIN_ASSOCIATION)?
        .iter()
        .map(|label| label.as_deref().map_or(false, |l| filter.accepts(l)))
        .collect();
    df.filter(&mask)
}
