use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use tracing::info;

use crate::helper_functions::{canonical_pairs, f64_values, i64_values, require_columns, str_values};
use crate::models::{
    CanonicalPair, CA_DISTANCE, DOMAIN_ASSOCIATION, RESIDUE1, RESIDUE2, SEQUENCE_DISTANCE,
    SPECTRAL_COUNT,
};

/// Aggregates for one `Domain Association` label.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationSummary {
    pub association: String,
    pub unique_crosslinks: u32,
    pub ca_distances: Vec<f64>,
    pub pct_ca_le_20: f64,
    pub pct_ca_le_50: f64,
    /// Missing counts stay in place as `None`.
    pub spectral_counts: Vec<Option<i64>>,
    pub pct_sc_ge_10: f64,
    pub pct_sc_ge_20: f64,
    pub sequence_distances: Vec<Option<i64>>,
}

#[derive(Default)]
struct Group {
    pairs: HashSet<CanonicalPair>,
    ca: Vec<f64>,
    sc: Vec<Option<i64>>,
    seq: Vec<Option<i64>>,
}

/// Share of `values` satisfying `keep`, 0 to 100.
fn percentage<T>(values: &[T], keep: impl Fn(&T) -> bool) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let hits = values.iter().filter(|v| keep(v)).count();
    100.0 * hits as f64 / values.len() as f64
}

/// One summary per distinct label, sorted by label. Rows without a label are skipped.
pub fn summarize_by_domain_association(df: &DataFrame) -> PolarsResult<Vec<AssociationSummary>> {
    require_columns(
        df,
        &[DOMAIN_ASSOCIATION, RESIDUE1, RESIDUE2, CA_DISTANCE, SPECTRAL_COUNT, SEQUENCE_DISTANCE],
    )?;

    let labels = str_values(df, DOMAIN_ASSOCIATION)?;
    let pairs = canonical_pairs(df)?;
    let ca = f64_values(df, CA_DISTANCE)?;
    let sc = i64_values(df, SPECTRAL_COUNT)?;
    let seq = i64_values(df, SEQUENCE_DISTANCE)?;

    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    for (row, label) in labels.into_iter().enumerate() {
        let Some(label) = label else { continue };
        let group = groups.entry(label).or_default();
        group.pairs.insert(pairs[row]);
        group.ca.push(ca[row]);
        group.sc.push(sc[row]);
        group.seq.push(seq[row]);
    }

    let summaries: Vec<AssociationSummary> = groups
        .into_iter()
        .map(|(association, group)| AssociationSummary {
            association,
            unique_crosslinks: group.pairs.len() as u32,
            pct_ca_le_20: percentage(&group.ca, |&v| v <= 20.0),
            pct_ca_le_50: percentage(&group.ca, |&v| v <= 50.0),
            pct_sc_ge_10: percentage(&group.sc, |v| v.is_some_and(|v| v >= 10)),
            pct_sc_ge_20: percentage(&group.sc, |v| v.is_some_and(|v| v >= 20)),
            ca_distances: group.ca,
            spectral_counts: group.sc,
            sequence_distances: group.seq,
        })
        .collect();

    info!("Summarised {} domain associations", summaries.len());
    Ok(summaries)
}

fn render_float(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else {
        format!("{v:?}")
    }
}

fn render_count(v: Option<i64>) -> String {
    v.map_or_else(|| "nan".to_string(), |v| v.to_string())
}

fn render_list<T: Copy>(values: &[T], render: impl Fn(T) -> String) -> String {
    let items: Vec<String> = values.iter().map(|&v| render(v)).collect();
    format!("[{}]", items.join(", "))
}

/// Materialise the summaries; list columns are written as `[a, b, ...]` text.
pub fn association_summary_frame(summaries: &[AssociationSummary]) -> PolarsResult<DataFrame> {
    let association: Vec<&str> = summaries.iter().map(|s| s.association.as_str()).collect();
    let unique: Vec<u32> = summaries.iter().map(|s| s.unique_crosslinks).collect();
    let ca: Vec<String> = summaries.iter().map(|s| render_list(&s.ca_distances, render_float)).collect();
    let ca20: Vec<f64> = summaries.iter().map(|s| s.pct_ca_le_20).collect();
    let ca50: Vec<f64> = summaries.iter().map(|s| s.pct_ca_le_50).collect();
    let sc: Vec<String> = summaries.iter().map(|s| render_list(&s.spectral_counts, render_count)).collect();
    let sc10: Vec<f64> = summaries.iter().map(|s| s.pct_sc_ge_10).collect();
    let sc20: Vec<f64> = summaries.iter().map(|s| s.pct_sc_ge_20).collect();
    let seq: Vec<String> = summaries.iter().map(|s| render_list(&s.sequence_distances, render_count)).collect();

    DataFrame::new(vec![
        Column::from(Series::new(DOMAIN_ASSOCIATION.into(), association)),
        Column::from(Series::new("Unique Crosslinks".into(), unique)),
        Column::from(Series::new("All CA Distances".into(), ca)),
        Column::from(Series::new("Percentage with CA Distance <= 20".into(), ca20)),
        Column::from(Series::new("Percentage with CA Distance <= 50".into(), ca50)),
        Column::from(Series::new("All Spectral Counts".into(), sc)),
        Column::from(Series::new("Percentage with Spectral Count >= 10".into(), sc10)),
        Column::from(Series::new("Percentage with Spectral Count >= 20".into(), sc20)),
        Column::from(Series::new("All Sequence Distances".into(), seq)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn crosslinks() -> DataFrame {
        df![
            "Residue1" => &[10i64, 20, 300, 400, 310],
            "Residue2" => &[20i64, 10, 900, 950, 305],
            "Spectral Count" => &[12i64, 25, 8, 40, 20],
            "CA Distance" => &[15.0, 15.0, 22.5, 60.0, 9.5],
            "Sequence Distance" => &[10i64, 10, 600, 550, 5],
            "Domain Association" => &["NTD to NTD", "NTD to NTD", "insert 1 to insert 9", "insert 1 to insert 9", "insert 1 to insert 1"]
        ]
        .unwrap()
    }

    #[test]
    fn mirrored_pair_is_one_unique_crosslink() {
        let summaries = summarize_by_domain_association(&crosslinks()).unwrap();
        let ntd = summaries.iter().find(|s| s.association == "NTD to NTD").unwrap();

        assert_eq!(ntd.unique_crosslinks, 1);
        assert_eq!(ntd.ca_distances, vec![15.0, 15.0]);
        assert_eq!(ntd.spectral_counts, vec![Some(12), Some(25)]);
        assert_eq!(ntd.pct_ca_le_20, 100.0);
        assert_eq!(ntd.pct_sc_ge_10, 100.0);
        assert_eq!(ntd.pct_sc_ge_20, 50.0);
    }

    #[test]
    fn groups_are_sorted_and_thresholds_inclusive() {
        let summaries = summarize_by_domain_association(&crosslinks()).unwrap();
        let labels: Vec<&str> = summaries.iter().map(|s| s.association.as_str()).collect();
        assert_eq!(labels, vec!["NTD to NTD", "insert 1 to insert 1", "insert 1 to insert 9"]);

        let intra = &summaries[1];
        assert_eq!(intra.unique_crosslinks, 1);
        assert_eq!(intra.pct_sc_ge_20, 100.0);

        let inter = &summaries[2];
        assert_eq!(inter.unique_crosslinks, 2);
        assert_eq!(inter.pct_ca_le_20, 0.0);
        assert_eq!(inter.pct_ca_le_50, 50.0);
        assert_eq!(inter.pct_sc_ge_10, 50.0);
        assert_eq!(inter.sequence_distances, vec![Some(600), Some(550)]);
    }

    #[test]
    fn frame_renders_lists_as_text() {
        let summaries = summarize_by_domain_association(&crosslinks()).unwrap();
        let frame = association_summary_frame(&summaries).unwrap();

        assert_eq!(frame.shape(), (3, 9));
        assert_eq!(frame.get_column_names()[0].as_str(), DOMAIN_ASSOCIATION);
        let ca = frame.column("All CA Distances").unwrap().str().unwrap();
        assert_eq!(ca.get(2), Some("[22.5, 60.0]"));
        let sc = frame.column("All Spectral Counts").unwrap().str().unwrap();
        assert_eq!(sc.get(0), Some("[12, 25]"));
    }

    #[test]
    fn unlabelled_rows_form_no_group() {
        let df = df![
            "Residue1" => &[10i64, 30, 50],
            "Residue2" => &[20i64, 40, 60],
            "Spectral Count" => &[12i64, 30, 15],
            "CA Distance" => &[15.0, 18.0, 25.0],
            "Sequence Distance" => &[10i64, 10, 10],
            "Domain Association" => &[Some("NTD to insert 1"), None, Some("NTD to insert 1")]
        ]
        .unwrap();

        let summaries = summarize_by_domain_association(&df).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].unique_crosslinks, 2);
        assert_eq!(summaries[0].spectral_counts, vec![Some(12), Some(15)]);
    }

    #[test]
    fn missing_values_stay_listed_and_miss_thresholds() {
        let df = df![
            "Residue1" => &[10i64, 30],
            "Residue2" => &[20i64, 40],
            "Spectral Count" => &[Some(12i64), None],
            "CA Distance" => &[Some(15.0), None],
            "Sequence Distance" => &[Some(10i64), None],
            "Domain Association" => &["NTD to insert 1", "NTD to insert 1"]
        ]
        .unwrap();

        let summaries = summarize_by_domain_association(&df).unwrap();
        let group = &summaries[0];
        assert_eq!(group.spectral_counts, vec![Some(12), None]);
        assert_eq!(group.pct_sc_ge_10, 50.0);
        assert_eq!(group.ca_distances.len(), 2);
        assert!(group.ca_distances[1].is_nan());
        assert_eq!(group.pct_ca_le_20, 50.0);

        let frame = association_summary_frame(&summaries).unwrap();
        let ca = frame.column("All CA Distances").unwrap().str().unwrap();
        assert_eq!(ca.get(0), Some("[15.0, nan]"));
        let sc = frame.column("All Spectral Counts").unwrap().str().unwrap();
        assert_eq!(sc.get(0), Some("[12, nan]"));
    }

    #[test]
    fn association_column_is_required() {
        let df = crosslinks().drop(DOMAIN_ASSOCIATION).unwrap();
        let err = summarize_by_domain_association(&df).unwrap_err();
        assert!(matches!(err, PolarsError::ColumnNotFound(_)));
    }
}
