use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use polars::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::analysis::chimera::{format_chimera_dist_selection, CHIMERA_DISTANCE_STYLE};
use crate::analysis::column_stats::calculate_average_and_stdev_of_column;
use crate::analysis::domain_association::{association_summary_frame, summarize_by_domain_association};
use crate::analysis::domain_stats::{domain_crosslink_stats, domain_stats_frame};
use crate::analysis::filters::{
    filter_by_ca_distance, filter_by_domain, filter_by_residue, filter_by_spectral_count,
};
use crate::analysis::plots;
use crate::config::AnalysisConfig;
use crate::data_handling::crosslinks::CrosslinkDataset;
use crate::helper_functions::{project_root, save_dataframe_to_csv};
use crate::models::{CaComparison, Dataset, CA_DISTANCE, RESIDUE1, RESIDUE2};

mod analysis;
mod config;
mod data_handling;
mod helper_functions;
mod models;

const CONFIG_FILE: &str = "xlink_config.json";

/// First CLI argument, else `<project root>/xlink_config.json`, else built-in defaults.
fn load_config() -> anyhow::Result<AnalysisConfig> {
    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => project_root().join(CONFIG_FILE),
    };

    if path.exists() {
        AnalysisConfig::from_json_file(&path)
    } else {
        info!("No config at {}, using ApoB-100 defaults", path.display());
        Ok(AnalysisConfig::default())
    }
}

/// Plots are written like the CSVs: a failure is reported and the run goes on.
fn report_plot(result: PolarsResult<()>, name: &str) {
    if let Err(e) = result {
        warn!("Could not draw {}: {}", name, e);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting the crosslink analysis");

    let config = load_config()?;
    config.validate().context("invalid analysis configuration")?;
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir))?;

    let df = CrosslinkDataset {
        path: config.input_csv.clone(),
    }
    .load_validated(&[RESIDUE1, RESIDUE2])?;

    // Spectral count subsets
    let subsets = config
        .spectral_count_thresholds
        .iter()
        .map(|&threshold| {
            let subset = filter_by_spectral_count(&df, threshold)?;
            info!("Spectral Count >= {}: {} crosslinks", threshold, subset.height());
            Ok((format!("Spectral Count >= {threshold}"), subset))
        })
        .collect::<PolarsResult<Vec<(String, DataFrame)>>>()?;
    let summary_threshold = config.summary_threshold();
    let summary_label = format!("Spectral Count >= {summary_threshold}");
    let summary_df = filter_by_spectral_count(&df, summary_threshold)?;

    // Summary plots
    report_plot(
        plots::plot_ca_distance_vs_spectral_count(&df, &config.output_path("ca_distance_vs_spectral_count.png")),
        "CA distance vs spectral count",
    );
    report_plot(
        plots::plot_sequence_distance_vs_ca_distance(
            &df,
            &summary_df,
            &summary_label,
            config.ca_distance_reference,
            &config.output_path("sequence_distance_vs_ca_distance.png"),
        ),
        "sequence distance vs CA distance",
    );
    report_plot(
        plots::plot_sequence_distance_vs_spectral_count(&df, &config.output_path("sequence_distance_vs_spectral_count.png")),
        "sequence distance vs spectral count",
    );

    let mut curves: Vec<(&str, &DataFrame)> = vec![("All Data", &df)];
    curves.extend(subsets.iter().map(|(label, subset)| (label.as_str(), subset)));
    report_plot(
        plots::plot_ca_distance_cumulative_percentage(
            &curves,
            config.ca_distance_reference,
            &config.output_path("ca_distance_cumulative_percentage.png"),
        ),
        "cumulative CA distance",
    );

    // Summarise by domain
    let domain_stats = domain_crosslink_stats(&summary_df, &config.sequence, &config.domains)?;
    let domain_summary = domain_stats_frame(&domain_stats)?;
    println!("{domain_summary}");
    save_dataframe_to_csv(&domain_summary, config.output_path(&config.domain_summary_csv));

    // Summarise by domain association
    let associations = summarize_by_domain_association(&summary_df)?;
    let association_summary = association_summary_frame(&associations)?;
    println!("{association_summary}");
    save_dataframe_to_csv(&association_summary, config.output_path(&config.association_summary_csv));

    // Domain selection and ChimeraX markers
    let selected = filter_by_domain(&summary_df, &config.domain_filter)?;
    info!("{} crosslinks match the domain selection {:?}", selected.height(), config.domain_filter.selection);
    println!("{selected}");

    let commands = format_chimera_dist_selection(&selected, config.chimera_model)?;
    println!("{commands}");
    let commands_path = config.output_path(&config.chimera_commands_file);
    match fs::write(&commands_path, format!("{CHIMERA_DISTANCE_STYLE}\n{commands}\n")) {
        Ok(()) => info!("ChimeraX commands written to {}", commands_path),
        Err(e) => error!("Failed to write ChimeraX commands to {}: {}", commands_path, e),
    }

    // Residue and CA distance filters
    let residue_hits = filter_by_residue(&summary_df, config.residue_of_interest)?;
    info!("{} unique crosslinks involve residue {}", residue_hits.height(), config.residue_of_interest);
    println!("{residue_hits}");

    let comparison: CaComparison = config.ca_comparison.parse()?;
    let by_distance = filter_by_ca_distance(&summary_df, config.ca_distance_cutoff, comparison)?;
    info!("{} crosslinks with CA Distance {} {}", by_distance.height(), comparison, config.ca_distance_cutoff);
    println!("{by_distance}");

    // Column statistics
    if let Some(summary) = calculate_average_and_stdev_of_column(&by_distance, CA_DISTANCE) {
        println!(
            "Average CA Distance: {}, Standard Deviation: {}",
            summary.mean, summary.stdev
        );
    }

    info!("Crosslink analysis complete");
    Ok(())
}
