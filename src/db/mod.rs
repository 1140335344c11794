// Database layer — persistent storage for author profiles.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever INKPRINT_DB_PATH points
// (defaults to the platform data directory). The SQLite backend sits behind
// the default `sqlite` feature; the in-memory repository is always built.

pub mod memory;
pub mod models;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod queries;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryProfileRepository;
pub use traits::ProfileRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteProfileRepository;

#[cfg(feature = "sqlite")]
use crate::error::{InkprintError, PersistenceContext, Result};
#[cfg(feature = "sqlite")]
use rusqlite::Connection;
#[cfg(feature = "sqlite")]
use std::path::Path;
#[cfg(feature = "sqlite")]
use std::time::Duration;

/// How long a write waits for another connection's transaction to finish.
#[cfg(feature = "sqlite")]
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the database and create its tables.
///
/// This is the main entry point — called by `inkprint init` and by any
/// command that writes profiles.
#[cfg(feature = "sqlite")]
pub fn initialize(db_path: &str) -> Result<Connection> {
    // Create parent directories if needed
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).persistence(&format!(
                "creating directory for database {db_path}"
            ))?;
        }
    }

    let conn = Connection::open(db_path)
        .persistence(&format!("opening database at {db_path}"))?;

    configure(&conn)?;
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database (fails if it doesn't exist yet).
///
/// Table creation still runs, so a file left behind without tables is
/// usable.
#[cfg(feature = "sqlite")]
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        return Err(InkprintError::Config(format!(
            "database not found at {db_path}. Run `inkprint init` first."
        )));
    }

    let conn = Connection::open(db_path)
        .persistence(&format!("opening database at {db_path}"))?;

    configure(&conn)?;
    schema::create_tables(&conn)?;

    Ok(conn)
}

#[cfg(feature = "sqlite")]
fn configure(conn: &Connection) -> Result<()> {
    // Other processes enrolling into the same file wait instead of failing
    conn.busy_timeout(BUSY_TIMEOUT)
        .persistence("setting busy timeout")?;
    // Enable WAL mode for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")
        .persistence("enabling WAL mode")?;
    Ok(())
}
