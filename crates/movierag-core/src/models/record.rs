use serde::{Deserialize, Serialize};

/// A movie row from the plot dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Movie title
    pub title: String,

    /// Full plot summary
    pub plot: String,

    /// Release year, if the dataset provided a parseable one
    pub release_year: Option<u16>,
}

impl Record {
    pub fn new(
        title: impl Into<String>,
        plot: impl Into<String>,
        release_year: Option<u16>,
    ) -> Self {
        Self { title: title.into(), plot: plot.into(), release_year }
    }
}

/// Outcome of loading a dataset
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Records kept, in file order
    pub records: Vec<Record>,

    /// Rows dropped for missing fields or malformed CSV
    pub skipped: usize,

    /// Data rows seen before truncation
    pub total_rows: usize,
}
