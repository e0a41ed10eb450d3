use polars::prelude::*;

use crate::helper_functions::{require_columns, residue_values};
use crate::models::{RESIDUE1, RESIDUE2};

/// Display settings to paste before the distance commands.
pub const CHIMERA_DISTANCE_STYLE: &str = "distance style color green radius 0.5 dashes 0";

/// ChimeraX `distance` commands, one per row, newline separated.
pub fn format_chimera_dist_selection(df: &DataFrame, mod_number: u32) -> PolarsResult<String> {
    require_columns(df, &[RESIDUE1, RESIDUE2])?;

    let r1 = residue_values(df, RESIDUE1)?;
    let r2 = residue_values(df, RESIDUE2)?;
    let commands: Vec<String> = r1
        .iter()
        .zip(&r2)
        .map(|(a, b)| format!("distance #{mod_number}:{a}@CA #{mod_number}:{b}@CA"))
        .collect();

    Ok(commands.join("\n"))
}
