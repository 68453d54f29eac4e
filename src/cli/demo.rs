//! Walk-through of every audited operation

use crate::doc;
use crate::error::StoreResult;
use crate::models::Filter;
use crate::repository::AuditedRepository;

/// Create, read, update and delete a sample document, then index two fields
pub fn run_demo(repo: &AuditedRepository) -> StoreResult<()> {
    println!("Audited store demo on '{}'", repo.collection_name());
    println!("==========================");

    let created = repo.create("alice", doc! { "name" => "Fido", "species" => "Dog" })?;
    println!("alice created Fido: {}", created);

    let dogs = Filter::new(doc! { "species" => "Dog" });
    let found = repo.read("bob", &dogs, 10)?;
    println!("bob read {} dog(s)", found.len());
    for document in &found {
        println!("  {}", document);
    }

    let fido = Filter::new(doc! { "name" => "Fido" });
    let modified = repo.update("alice", &fido, &doc! { "age" => 5 }, false)?;
    println!("alice updated {} document(s)", modified);

    let deleted = repo.delete("alice", &fido, false)?;
    println!("alice deleted {} document(s)", deleted);

    let remaining = repo.read("bob", &dogs, 10)?;
    println!("bob read {} dog(s) after delete", remaining.len());

    let outcomes = repo.create_indexes(["name", "species"]);
    for (field, outcome) in &outcomes {
        println!(
            "{} indexed {} -> {}",
            repo.admin_identity(),
            field,
            outcome.index_name().unwrap_or("failed")
        );
    }

    Ok(())
}
