use polars::prelude::*;
use tracing::{debug, error, info, warn};

use crate::helper_functions::read_csv;
use crate::models::{
    Dataset, CA_DISTANCE, DOMAIN_ASSOCIATION, RESIDUE1, RESIDUE2, SEQUENCE_DISTANCE,
    SPECTRAL_COUNT,
};

/// Columns the analysis steps read; each step checks its own subset.
pub const CROSSLINK_COLUMNS: [&str; 6] = [
    RESIDUE1,
    RESIDUE2,
    SPECTRAL_COUNT,
    CA_DISTANCE,
    SEQUENCE_DISTANCE,
    DOMAIN_ASSOCIATION,
];

/// Annotated crosslink table (one row per detected residue pair).
pub struct CrosslinkDataset {
    pub path: String,
}

impl Dataset for CrosslinkDataset {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading crosslinks from {}", &self.path);

        let df = match read_csv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read crosslink CSV: {}", e);
                return Err(e);
            }
        };
        debug!("Loaded {} rows, {} columns", df.height(), df.width());

        let missing: Vec<&str> = CROSSLINK_COLUMNS
            .iter()
            .copied()
            .filter(|name| df.column(name).is_err())
            .collect();
        if !missing.is_empty() {
            warn!("Crosslink table has no {:?} column(s); steps needing them will fail", missing);
        }

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_annotated_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xlinks.csv");
        fs::write(
            &path,
            "Residue1,Residue2,Spectral Count,CA Distance,Sequence Distance,Domain Association\n\
             4207,4310,25,18.4,103,insert 9 to insert 9\n\
             12,88,4,35.0,76,NTD to NTD\n",
        )
        .unwrap();

        let dataset = CrosslinkDataset {
            path: path.to_string_lossy().into_owned(),
        };
        let df = dataset.load_validated(&CROSSLINK_COLUMNS).unwrap();
        assert_eq!(df.shape(), (2, 6));
        assert_eq!(
            df.column(DOMAIN_ASSOCIATION).unwrap().str().unwrap().get(0),
            Some("insert 9 to insert 9")
        );
    }

    #[test]
    fn validation_names_the_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        fs::write(&path, "Residue1,Residue2\n1,2\n").unwrap();

        let dataset = CrosslinkDataset {
            path: path.to_string_lossy().into_owned(),
        };
        assert_eq!(dataset.load().unwrap().height(), 1);
        let err = dataset.load_validated(&[RESIDUE1, SPECTRAL_COUNT]).unwrap_err();
        assert!(err.to_string().contains(SPECTRAL_COUNT));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dataset = CrosslinkDataset {
            path: "/definitely/not/here.csv".to_string(),
        };
        assert!(dataset.load().is_err());
    }
}
