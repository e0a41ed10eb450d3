//! Per-domain residue, lysine and crosslink counts.

use std::collections::BTreeSet;

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::DomainDefinition;
use crate::helper_functions::{canonical_pairs, require_columns};
use crate::models::{CanonicalPair, RESIDUE1, RESIDUE2};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStats {
    pub domain: String,
    pub total_residues: u32,
    pub total_lysines: u32,
    pub lysines_in_crosslinks: u32,
    pub unique_crosslinks: u32,
}

/// 1-based positions of every `K` in `sequence`.
pub fn lysine_positions(sequence: &str) -> BTreeSet<i64> {
    sequence
        .chars()
        .enumerate()
        .filter(|&(_, residue)| residue == 'K')
        .map(|(index, _)| index as i64 + 1)
        .collect()
}

/// Union of the inclusive ranges of a domain.
pub fn domain_residues(domain: &DomainDefinition) -> BTreeSet<i64> {
    domain
        .ranges
        .iter()
        .flat_map(|&(start, end)| start..=end)
        .collect()
}

/// One row per domain, in the order the domains are declared.
///
/// A crosslink counts for a domain when either endpoint falls inside it, so a
/// link between two domains is counted in both.
pub fn domain_crosslink_stats(
    df: &DataFrame,
    sequence: &str,
    domains: &[DomainDefinition],
) -> PolarsResult<Vec<DomainStats>> {
    require_columns(df, &[RESIDUE1, RESIDUE2])?;

    let lysines = lysine_positions(sequence);
    let pairs = canonical_pairs(df)?;
    debug!("{} lysines in a {}-residue sequence", lysines.len(), sequence.len());

    let stats = domains
        .iter()
        .map(|domain| {
            let residues = domain_residues(domain);
            let lysines_in_domain: BTreeSet<i64> =
                residues.intersection(&lysines).copied().collect();

            let unique: BTreeSet<CanonicalPair> = pairs
                .iter()
                .filter(|pair| residues.contains(&pair.0) || residues.contains(&pair.1))
                .copied()
                .collect();

            let crosslinked_lysines: BTreeSet<i64> = unique
                .iter()
                .flat_map(|pair| pair.residues())
                .filter(|residue| lysines_in_domain.contains(residue))
                .collect();

            DomainStats {
                domain: domain.name.clone(),
                total_residues: residues.len() as u32,
                total_lysines: lysines_in_domain.len() as u32,
                lysines_in_crosslinks: crosslinked_lysines.len() as u32,
                unique_crosslinks: unique.len() as u32,
            }
        })
        .collect::<Vec<_>>();

    info!("Computed crosslink statistics for {} domains", stats.len());
    Ok(stats)
}

pub fn domain_stats_frame(stats: &[DomainStats]) -> PolarsResult<DataFrame> {
    let domain: Vec<&str> = stats.iter().map(|s| s.domain.as_str()).collect();
    let residues: Vec<u32> = stats.iter().map(|s| s.total_residues).collect();
    let lysines: Vec<u32> = stats.iter().map(|s| s.total_lysines).collect();
    let in_crosslinks: Vec<u32> = stats.iter().map(|s| s.lysines_in_crosslinks).collect();
    let unique: Vec<u32> = stats.iter().map(|s| s.unique_crosslinks).collect();

    DataFrame::new(vec![
        Column::from(Series::new("Domain".into(), domain)),
        Column::from(Series::new("Total Residues".into(), residues)),
        Column::from(Series::new("Total Lysine Residues".into(), lysines)),
        Column::from(Series::new("Lysine Residues in Crosslinks".into(), in_crosslinks)),
        Column::from(Series::new("Total Unique Crosslinks".into(), unique)),
    ])
}
