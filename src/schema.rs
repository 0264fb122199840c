use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Ordered model input columns captured at training time.
///
/// Every input vector handed to a classifier goes through [`FeatureSchema::project`]:
/// columns the schema knows but the input lacks become 0.0, input columns the
/// schema does not know are dropped, and the result follows the schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// When a column name repeats in `values`, the last occurrence wins.
    pub fn project(&self, values: &[(String, f64)]) -> Vec<f64> {
        let by_name: HashMap<&str, f64> = values.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        self.columns
            .iter()
            .map(|c| by_name.get(c.as_str()).copied().unwrap_or(0.0))
            .collect()
    }
}
