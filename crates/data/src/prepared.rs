use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// One row of the prepared text-to-CAD table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedRecord {
    pub uid: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub beginner: Option<String>,
    #[serde(default)]
    pub intermediate: Option<String>,
    #[serde(default)]
    pub expert: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub all_level_data: Option<String>,
    #[serde(default)]
    pub nli_data: Option<String>,
}

impl PreparedRecord {
    fn optional_columns(&self) -> [(&'static str, &Option<String>); 8] {
        [
            ("abstract", &self.abstract_text),
            ("beginner", &self.beginner),
            ("intermediate", &self.intermediate),
            ("expert", &self.expert),
            ("description", &self.description),
            ("keywords", &self.keywords),
            ("all_level_data", &self.all_level_data),
            ("nli_data", &self.nli_data),
        ]
    }
}

/// Rows of the prepared table that carry both a beginner prompt and a description.
#[derive(Debug, Clone, Default)]
pub struct PreparedDataset {
    records: Vec<PreparedRecord>,
}

/// Row count plus missing values per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub missing: BTreeMap<&'static str, usize>,
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rows: {}", self.rows)?;
        for (column, missing) in &self.missing {
            writeln!(f, "  {column:<16} {missing} missing")?;
        }
        Ok(())
    }
}

/// Loads the prepared table, dropping rows without a `beginner` or `description` value.
pub fn load_prepared<P: AsRef<Path>>(path: P) -> Result<PreparedDataset> {
    let path = path.as_ref();
    let csv_err = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let records = csv::Reader::from_path(path)
        .map_err(csv_err)?
        .deserialize::<PreparedRecord>()
        .filter(|row| {
            row.as_ref()
                .map_or(true, |r| r.beginner.is_some() && r.description.is_some())
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(csv_err)?;
    log::info!("loaded {} prepared rows from {}", records.len(), path.display());
    Ok(PreparedDataset { records })
}

impl PreparedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PreparedRecord] {
        &self.records
    }

    pub fn summary(&self) -> DatasetSummary {
        let mut missing = BTreeMap::new();
        for record in &self.records {
            for (column, value) in record.optional_columns() {
                *missing.entry(column).or_insert(0) += usize::from(value.is_none());
            }
        }
        DatasetSummary {
            rows: self.records.len(),
            missing,
        }
    }

    /// Up to `n` uids drawn with `seed`, without repeats.
    pub fn sample_uids(&self, n: usize, seed: u64) -> Vec<String> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut seen = HashSet::new();
        self.records
            .choose_multiple(&mut rng, n)
            .filter(|r| seen.insert(r.uid.as_str()))
            .map(|r| r.uid.clone())
            .collect()
    }
}
