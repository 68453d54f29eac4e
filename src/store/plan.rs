//! Query execution plans
//!
//! The shape mirrors a document store's `queryPlanner` explain output closely
//! enough for forensic tooling to tell index scans from collection scans.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Document;

/// Access path chosen for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStage {
    /// Served from a single-field index
    #[serde(rename = "IXSCAN")]
    IndexScan,
    /// Every document is examined
    #[serde(rename = "COLLSCAN")]
    CollectionScan,
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStage::IndexScan => write!(f, "IXSCAN"),
            ScanStage::CollectionScan => write!(f, "COLLSCAN"),
        }
    }
}

/// The plan the store would execute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningPlan {
    pub stage: ScanStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
}

/// Planner output for one filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPlan {
    /// `database.collection` the plan applies to
    pub namespace: String,
    pub parsed_query: Document,
    pub winning_plan: WinningPlan,
}

impl QueryPlan {
    pub fn uses_index(&self) -> bool {
        self.winning_plan.stage == ScanStage::IndexScan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_plan_serialization_shape() {
        let plan = QueryPlan {
            namespace: "aac.animals".into(),
            parsed_query: doc! { "species" => "Dog" },
            winning_plan: WinningPlan {
                stage: ScanStage::IndexScan,
                index_name: Some("species_1".into()),
            },
        };

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["namespace"], "aac.animals");
        assert_eq!(json["parsedQuery"]["species"], "Dog");
        assert_eq!(json["winningPlan"]["stage"], "IXSCAN");
        assert_eq!(json["winningPlan"]["indexName"], "species_1");
        assert!(plan.uses_index());
    }
}
