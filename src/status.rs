// System status display — database size, profile counts, dictionary in use.

use anyhow::Result;
use std::path::Path;

use crate::engine::AttributionEngine;

/// Profiles untouched for this many days are reported as stale.
pub const STALE_AFTER_DAYS: i64 = 90;

/// Display system status to the terminal.
pub fn show(engine: &AttributionEngine, db_display_path: &str) -> Result<()> {
    // Database file size
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let dictionary = engine.dictionary();
    println!(
        "Pattern dictionary: {} ({} patterns)",
        dictionary.version(),
        dictionary.len()
    );
    println!("Minimum words per sample: {}", engine.config().min_words);

    let total = engine.profile_count()?;
    if total == 0 {
        println!("Profiles: none yet");
        println!("  Run `inkprint enroll` to add one");
        return Ok(());
    }

    let stale = engine.stale_profiles(STALE_AFTER_DAYS)?;
    println!(
        "Profiles: {} total, {} not updated in {}+ days",
        total,
        stale.len(),
        STALE_AFTER_DAYS
    );

    Ok(())
}

/// Whether the database file has been created yet.
pub fn database_exists(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
