//! CRUD and index commands

use clap::Subcommand;

use crate::error::{StoreError, StoreResult};
use crate::models::{Document, Filter};
use crate::repository::AuditedRepository;

/// Document commands, each attributed to `--user`
#[derive(Subcommand, Debug)]
pub enum StoreCommands {
    /// Insert a document
    Create {
        /// Caller identity recorded in the audit trail
        #[arg(short, long, env = "AUDIT_USER")]
        user: String,
        /// Document as a JSON object
        document: String,
    },

    /// Find documents
    Read {
        #[arg(short, long, env = "AUDIT_USER")]
        user: String,
        /// Filter as a JSON object
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        filter: Option<String>,
        /// Match every document
        #[arg(long)]
        all: bool,
        /// Maximum number of documents (0 = no limit)
        #[arg(short, long, default_value = "0")]
        limit: usize,
    },

    /// Merge fields into matching documents
    Update {
        #[arg(short, long, env = "AUDIT_USER")]
        user: String,
        /// Filter as a JSON object
        filter: String,
        /// Fields to set, as a JSON object
        values: String,
        /// Update every match instead of the first
        #[arg(long)]
        many: bool,
    },

    /// Remove matching documents
    Delete {
        #[arg(short, long, env = "AUDIT_USER")]
        user: String,
        /// Filter as a JSON object
        filter: String,
        /// Delete every match instead of the first
        #[arg(long)]
        many: bool,
    },

    /// Create ascending single-field indexes
    Index {
        /// Field names
        #[arg(required = true)]
        fields: Vec<String>,
    },
}

/// Handle a document command
pub fn handle_store_command(repo: &AuditedRepository, cmd: StoreCommands) -> StoreResult<()> {
    match cmd {
        StoreCommands::Create { user, document } => {
            let document = Document::from_json_str(&document)?;
            if repo.create(&user, document)? {
                println!("Created document in '{}'", repo.collection_name());
                Ok(())
            } else {
                Err(StoreError::operation(
                    "the store rejected the document; see the audit trail",
                ))
            }
        }
        StoreCommands::Read {
            user,
            filter,
            limit,
            ..
        } => {
            let filter = match filter {
                Some(text) => Filter::from_json_str(&text)?,
                None => Filter::all(),
            };
            let documents = repo.read(&user, &filter, limit)?;
            for document in &documents {
                println!("{}", document);
            }
            println!("{} document(s)", documents.len());
            Ok(())
        }
        StoreCommands::Update {
            user,
            filter,
            values,
            many,
        } => {
            let filter = Filter::from_json_str(&filter)?;
            let values = Document::from_json_str(&values)?;
            let modified = repo.update(&user, &filter, &values, many)?;
            println!("Modified {} document(s)", modified);
            Ok(())
        }
        StoreCommands::Delete { user, filter, many } => {
            let filter = Filter::from_json_str(&filter)?;
            let deleted = repo.delete(&user, &filter, many)?;
            println!("Deleted {} document(s)", deleted);
            Ok(())
        }
        StoreCommands::Index { fields } => {
            let outcomes = repo.create_indexes(&fields);
            for (field, outcome) in &outcomes {
                match outcome.index_name() {
                    Some(name) => println!("  {} -> {}", field, name),
                    None => println!("  {} -> failed", field),
                }
            }
            if outcomes.values().all(|o| o.is_created()) {
                Ok(())
            } else {
                Err(StoreError::operation("one or more indexes could not be created"))
            }
        }
    }
}
