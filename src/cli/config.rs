//! Resolved configuration display

use crate::config::{ConnectionSettings, Settings, StorePaths};
use crate::error::StoreResult;

/// Print paths, settings and the connection descriptor with secrets redacted
pub fn handle_config_command(paths: &StorePaths, settings: &Settings) -> StoreResult<()> {
    println!("audited-store Configuration");
    println!("===========================");
    println!("Base directory:    {}", paths.base_dir().display());
    println!("Data directory:    {}", paths.data_dir().display());
    println!("Settings file:     {}", paths.settings_file().display());
    println!();
    println!("Settings:");
    println!("  Database:          {}", settings.database);
    println!("  Collection:        {}", settings.collection);
    println!("  Audit collection:  {}", settings.audit_collection);
    println!("  Admin identity:    {}", settings.admin_identity);
    println!("  Explain timeout:   {} ms", settings.explain_timeout_ms);
    println!("  Local audit log:   {}", settings.write_local_audit);
    if settings.write_local_audit {
        println!("  Local audit file:  {}", settings.local_audit_file(paths).display());
    }
    println!();

    match ConnectionSettings::from_env().and_then(|c| c.resolve()) {
        Ok(descriptor) => println!("Connection:        {}", descriptor),
        Err(e) => println!("Connection:        not configured ({})", e),
    }
    Ok(())
}
