//! Audit entry data structures
//!
//! An [`AuditEntry`] is an immutable record of one attempted operation:
//! who, when, what filter and payload, how many documents, and what went
//! wrong if anything did. Timestamps never go backwards within a process.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::models::{Document, Identity};
use crate::store::QueryPlan;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// Document insert (successful or not)
    Create,
    /// Intent to read, written before the query runs
    ReadRequest,
    /// Read completed
    ReadResult,
    /// Read failed
    ReadError,
    Update,
    UpdateError,
    Delete,
    DeleteError,
    /// Administrative index creation
    CreateIndex,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::ReadRequest => "READ_REQUEST",
            Operation::ReadResult => "READ_RESULT",
            Operation::ReadError => "READ_ERROR",
            Operation::Update => "UPDATE",
            Operation::UpdateError => "UPDATE_ERROR",
            Operation::Delete => "DELETE",
            Operation::DeleteError => "DELETE_ERROR",
            Operation::CreateIndex => "CREATE_INDEX",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Plan metadata attached to a read, or why it could not be obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExplainInfo {
    Plan {
        #[serde(rename = "queryPlanner")]
        query_planner: QueryPlan,
    },
    Failed {
        explain_error: String,
    },
}

impl ExplainInfo {
    pub fn failed(message: impl Into<String>) -> Self {
        ExplainInfo::Failed {
            explain_error: message.into(),
        }
    }

    pub fn plan(&self) -> Option<&QueryPlan> {
        match self {
            ExplainInfo::Plan { query_planner } => Some(query_planner),
            ExplainInfo::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExplainInfo::Failed { .. })
    }
}

impl From<QueryPlan> for ExplainInfo {
    fn from(plan: QueryPlan) -> Self {
        ExplainInfo::Plan {
            query_planner: plan,
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Caller the operation is attributed to
    pub user: String,

    /// When the entry was created (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    /// Primary collection acted on
    pub collection: String,

    /// Filter used, empty when not applicable
    #[serde(default)]
    pub query: Document,

    /// Payload inserted or merged, empty when not applicable
    #[serde(default)]
    pub data: Document,

    /// Documents returned or affected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_count: Option<u64>,

    /// Present iff the underlying operation failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Query plan metadata, reads only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<ExplainInfo>,
}

impl AuditEntry {
    /// Start an entry stamped with the next process timestamp
    pub fn new(user: &Identity, operation: Operation, collection: impl Into<String>) -> Self {
        Self {
            user: user.name().to_string(),
            timestamp: next_timestamp(),
            operation,
            collection: collection.into(),
            query: Document::new(),
            data: Document::new(),
            result_count: None,
            error: None,
            explain: None,
        }
    }

    pub fn with_query(mut self, query: Document) -> Self {
        self.query = query;
        self
    }

    pub fn with_data(mut self, data: Document) -> Self {
        self.data = data;
        self
    }

    pub fn with_result_count(mut self, count: u64) -> Self {
        self.result_count = Some(count);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_explain(mut self, explain: ExplainInfo) -> Self {
        self.explain = Some(explain);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The persisted shape: a mapping with an RFC 3339 timestamp
    pub fn to_document(&self) -> StoreResult<Document> {
        let json = serde_json::to_value(self)?;
        Document::from_json(json)
    }

    /// Rebuild an entry from its persisted shape, ignoring store-added fields
    pub fn from_document(document: &Document) -> StoreResult<Self> {
        Ok(serde_json::from_value(document.to_json())?)
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} by {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            self.operation,
            self.collection,
            self.user
        );

        if !self.query.is_empty() {
            output.push_str(&format!(" query={}", self.query));
        }
        if let Some(count) = self.result_count {
            output.push_str(&format!(" count={}", count));
        }
        if let Some(plan) = self.explain.as_ref().and_then(ExplainInfo::plan) {
            output.push_str(&format!(" plan={}", plan.winning_plan.stage));
        }
        if let Some(error) = &self.error {
            output.push_str(&format!("\n  Error: {}", error));
        }

        output
    }
}

static LAST_TIMESTAMP: Mutex<Option<DateTime<Utc>>> = Mutex::new(None);

/// Wall-clock time, clamped so it never precedes an earlier entry
fn next_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    let mut last = LAST_TIMESTAMP
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let stamped = match *last {
        Some(previous) if previous > now => previous,
        _ => now,
    };
    *last = Some(stamped);
    stamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::store::{ScanStage, WinningPlan};

    fn alice() -> Identity {
        Identity::user("alice").unwrap()
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::ReadRequest.to_string(), "READ_REQUEST");
        assert_eq!(Operation::DeleteError.to_string(), "DELETE_ERROR");
        assert_eq!(
            serde_json::to_string(&Operation::CreateIndex).unwrap(),
            "\"CREATE_INDEX\""
        );
    }

    #[test]
    fn test_builder() {
        let entry = AuditEntry::new(&alice(), Operation::Update, "animals")
            .with_query(doc! { "name" => "Fido" })
            .with_data(doc! { "age" => 5 })
            .with_result_count(1);

        assert_eq!(entry.user, "alice");
        assert_eq!(entry.collection, "animals");
        assert_eq!(entry.result_count, Some(1));
        assert!(!entry.is_error());
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let entries: Vec<_> = (0..100)
            .map(|_| AuditEntry::new(&alice(), Operation::Create, "animals"))
            .collect();
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_persisted_shape() {
        let entry = AuditEntry::new(&alice(), Operation::Create, "animals")
            .with_data(doc! { "name" => "Fido" })
            .with_error("duplicate key");

        let document = entry.to_document().unwrap();
        assert_eq!(document.get("operation").unwrap().as_str(), Some("CREATE"));
        assert_eq!(document.get("error").unwrap().as_str(), Some("duplicate key"));
        assert!(document.get("result_count").is_none());
        assert!(document.get("explain").is_none());

        let timestamp = document.get("timestamp").unwrap().as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_from_document_ignores_store_id() {
        let entry = AuditEntry::new(&alice(), Operation::Delete, "animals")
            .with_query(doc! { "name" => "Fido" })
            .with_result_count(1);

        let mut document = entry.to_document().unwrap();
        document.insert("_id", "0b7c9d2e-5f0a-4c4e-9a53-3f1d2a7c6e10");

        assert_eq!(AuditEntry::from_document(&document).unwrap(), entry);
    }

    #[test]
    fn test_explain_shapes() {
        let failed = serde_json::to_value(ExplainInfo::failed("timed out")).unwrap();
        assert_eq!(failed["explain_error"], "timed out");

        let plan = ExplainInfo::from(QueryPlan {
            namespace: "aac.animals".into(),
            parsed_query: doc! { "species" => "Dog" },
            winning_plan: WinningPlan {
                stage: ScanStage::CollectionScan,
                index_name: None,
            },
        });
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["queryPlanner"]["winningPlan"]["stage"], "COLLSCAN");

        let back: ExplainInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::new(&alice(), Operation::ReadResult, "animals")
            .with_query(doc! { "species" => "Dog" })
            .with_result_count(2);

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("READ_RESULT"));
        assert!(formatted.contains("alice"));
        assert!(formatted.contains("count=2"));
    }
}
