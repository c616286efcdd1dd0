use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Mode loaded when nothing else is requested.
pub const DEFAULT_MODE: &str = "region_region";

/// Square flow matrix for one period: rows are sources, columns destinations.
pub type FlowMatrix = Vec<Vec<f64>>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("mode {mode}: node {node:?} appears more than once")]
    DuplicateNode { mode: String, node: String },

    #[error("mode {mode}, period {period}: expected {expected} rows, found {found}")]
    RowCount {
        mode: String,
        period: String,
        expected: usize,
        found: usize,
    },

    #[error("mode {mode}, period {period}: row {row} has {found} columns, expected {expected}")]
    ColumnCount {
        mode: String,
        period: String,
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Failure to obtain a usable dataset. Always fatal to rendering.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch dataset: {0}")]
    Fetch(String),

    #[error("malformed dataset document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid dataset: {0}")]
    Invalid(#[from] DatasetError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
    #[serde(default)]
    pub units: Option<String>,
    /// What the amounts measure, e.g. claims from reporter to counterparty.
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeData {
    pub nodes: Vec<String>,
    pub dates: Vec<String>,
    pub matrices: HashMap<String, FlowMatrix>,
}

impl ModeData {
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node == name)
    }

    pub fn matrix(&self, period: &str) -> Option<&FlowMatrix> {
        self.matrices.get(period)
    }

    /// Period key at `index`, or the first period when the index is out of range.
    pub fn resolve_period(&self, index: usize) -> Option<&str> {
        self.dates
            .get(index)
            .or_else(|| self.dates.first())
            .map(String::as_str)
    }

    pub fn last_period_index(&self) -> usize {
        self.dates.len().saturating_sub(1)
    }

    fn validate(&self, mode: &str) -> Result<(), DatasetError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node.as_str()) {
                return Err(DatasetError::DuplicateNode {
                    mode: mode.to_string(),
                    node: node.clone(),
                });
            }
        }

        let expected = self.nodes.len();
        for (period, matrix) in &self.matrices {
            if matrix.len() != expected {
                return Err(DatasetError::RowCount {
                    mode: mode.to_string(),
                    period: period.clone(),
                    expected,
                    found: matrix.len(),
                });
            }
            if let Some((row, cells)) = matrix
                .iter()
                .enumerate()
                .find(|(_, cells)| cells.len() != expected)
            {
                return Err(DatasetError::ColumnCount {
                    mode: mode.to_string(),
                    period: period.clone(),
                    row,
                    expected,
                    found: cells.len(),
                });
            }
        }

        Ok(())
    }
}

/// The whole precomputed document: every mode with its nodes, periods and matrices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub meta: Option<DatasetMeta>,
    pub modes: BTreeMap<String, ModeData>,
}

impl Dataset {
    /// Parses and validates a dataset document.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let dataset: Self = serde_json::from_str(text)?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        self.modes
            .iter()
            .try_for_each(|(name, mode)| mode.validate(name))
    }

    pub fn mode(&self, name: &str) -> Option<&ModeData> {
        self.modes.get(name)
    }

    pub fn mode_names(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    pub fn units(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|meta| meta.units.as_deref())
    }

    pub fn position(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|meta| meta.position.as_deref())
    }

    /// Units and position joined for headers, e.g. `"USD trillions, Claims"`.
    pub fn measure_caption(&self) -> Option<String> {
        match (self.units(), self.position()) {
            (Some(units), Some(position)) => Some(format!("{units}, {position}")),
            (Some(text), None) | (None, Some(text)) => Some(text.to_string()),
            (None, None) => None,
        }
    }
}
