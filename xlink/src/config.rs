//! Run configuration.
//!
//! Everything the original analysis hard-coded (input file, thresholds, the
//! ApoB-100 sequence and its domain table) lives in [`AnalysisConfig`] so the
//! domain mapper can be pointed at any sequence. Values missing from the JSON
//! file fall back to the publication defaults.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::filters::DomainFilter;

/// ApoB-100, 4563 residues.
pub const APOB100_SEQUENCE: &str = include_str!("../data/apob100.seq");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainDefinition {
    pub name: String,
    /// Inclusive `[start, end]` residue ranges.
    pub ranges: Vec<(i64, i64)>,
}

impl DomainDefinition {
    pub fn new(name: &str, ranges: &[(i64, i64)]) -> Self {
        Self {
            name: name.to_string(),
            ranges: ranges.to_vec(),
        }
    }
}

/// Domain boundaries used for the ApoB-100 figures.
pub fn apob100_domains() -> Vec<DomainDefinition> {
    vec![
        DomainDefinition::new("NTD", &[(1, 1011)]),
        DomainDefinition::new(
            "beta-belt",
            &[
                (1011, 1186),
                (1276, 1289),
                (1355, 2016),
                (2050, 2062),
                (2757, 3123),
                (3166, 3179),
                (3336, 3668),
                (3700, 3713),
                (3880, 4058),
                (4551, 4563),
            ],
        ),
        DomainDefinition::new("insert 1", &[(1186, 1276)]),
        DomainDefinition::new("insert 2", &[(1289, 1355)]),
        DomainDefinition::new("insert 3", &[(2016, 2050)]),
        DomainDefinition::new("insert 4", &[(2062, 2757)]),
        DomainDefinition::new("insert 5", &[(3123, 3166)]),
        DomainDefinition::new("insert 6", &[(3179, 3336)]),
        DomainDefinition::new("insert 7", &[(3668, 3700)]),
        DomainDefinition::new("insert 8", &[(3713, 3880)]),
        DomainDefinition::new("insert 9", &[(4058, 4551)]),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input_csv: String,
    pub output_dir: String,
    pub sequence: String,
    pub domains: Vec<DomainDefinition>,

    /// Subsets drawn in the plots; the last one feeds the summaries.
    pub spectral_count_thresholds: Vec<f64>,
    /// Dashed reference line on the CA-distance plots (Å).
    pub ca_distance_reference: f64,

    pub domain_filter: DomainFilter,
    pub chimera_model: u32,
    pub residue_of_interest: i64,
    pub ca_distance_cutoff: f64,
    /// `"less"` or `"greater"`; parsed when the filter runs.
    pub ca_comparison: String,

    pub domain_summary_csv: String,
    pub association_summary_csv: String,
    pub chimera_commands_file: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_csv: "all_common_xlinks_small_and_large.csv".to_string(),
            output_dir: "./results".to_string(),
            sequence: APOB100_SEQUENCE.trim().to_string(),
            domains: apob100_domains(),
            spectral_count_thresholds: vec![10.0, 20.0],
            ca_distance_reference: 26.0,
            domain_filter: DomainFilter {
                selection: Some("insert 9 to insert 9".to_string()),
                exclude_intra_domain: false,
                exclude: false,
                domains_to_exclude: vec!["insert 6".to_string()],
            },
            chimera_model: 1,
            residue_of_interest: 4207,
            ca_distance_cutoff: 100.0,
            ca_comparison: "less".to_string(),
            domain_summary_csv: "all_common_summary_by_domain_sc20.csv".to_string(),
            association_summary_csv: "all_common_summary_by_domain_association_sc20.csv".to_string(),
            chimera_commands_file: "selected_crosslinks.cxc".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        info!("Reading configuration from {}", path.display());
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Every domain boundary must lie within `[1, sequence length]`.
    pub fn validate(&self) -> anyhow::Result<()> {
        let len = self.sequence.chars().count() as i64;
        if len == 0 {
            bail!("protein sequence is empty");
        }
        for domain in &self.domains {
            if domain.ranges.is_empty() {
                bail!("domain '{}' has no residue ranges", domain.name);
            }
            for &(start, end) in &domain.ranges {
                if start < 1 || end < 1 || start > len || end > len {
                    bail!(
                        "domain '{}' range ({start}, {end}) lies outside residues 1..={len}",
                        domain.name
                    );
                }
            }
        }
        if self.spectral_count_thresholds.is_empty() {
            bail!("at least one spectral count threshold is required");
        }
        Ok(())
    }

    /// Threshold whose subset is summarised (the strictest one listed last).
    pub fn summary_threshold(&self) -> f64 {
        self.spectral_count_thresholds.last().copied().unwrap_or(20.0)
    }

    pub fn output_path(&self, file_name: &str) -> String {
        Path::new(&self.output_dir)
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }
}
