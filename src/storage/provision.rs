//! First-run provisioning for the store: file creation, schema application
//! and reference data seeding.
//!
//! `ensure_store_file` only answers "does initialization content need to be
//! injected"; the connection opener succeeds either way because SQLite
//! creates files lazily. Schema application runs once per store lifetime
//! (only when the file was just created) and returns an explicit `Result` so
//! the call site can decide to continue on failure. Seeding runs on every
//! start and is idempotent by row count, which keeps the unlocked
//! check-then-create race across concurrent first starts bounded to "one
//! winner's insert survives".

use std::fs;

use tracing::warn;

use super::{Store, StorePath, StoreResult};

/// Static schema payload, applied verbatim on first creation.
pub const SCHEMA_SQL: &str = include_str!("../../schema.sql");

/// Number of reference products inserted by `seed_if_empty`.
pub const SEED_PRODUCT_COUNT: usize = 4;

/// Determine whether the store file had to be created.
///
/// Returns `false` without side effects when the file already exists (the
/// warm-start path). When absent, creates parent directories and an empty
/// file and returns `true`. Creation failures degrade to `false` rather than
/// crashing: provisioning is advisory for the schema step, not a hard
/// precondition for opening a connection.
pub fn ensure_store_file(target: &StorePath) -> bool {
    let path = &target.path;
    if path.exists() {
        return false;
    }
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("store directory create failed for {}: {e}", dir.display());
                return false;
            }
        }
    }
    match fs::File::create(path) {
        Ok(_) => true,
        Err(e) => {
            warn!("store file create failed for {}: {e}", path.display());
            false
        }
    }
}

/// Apply the schema payload as a single batch.
pub async fn apply_schema(store: &Store, sql: &'static str) -> StoreResult<()> {
    store
        .call(move |conn| {
            conn.execute_batch(sql)?;
            Ok(())
        })
        .await
}

/// Insert the fixed reference product set if the catalog is empty.
///
/// Reads the authoritative row count rather than trusting any "just created"
/// flag, so repeated or concurrent startups never duplicate reference rows
/// and operator-added rows are never touched. Returns the number of rows
/// inserted (0 on the no-op path).
pub async fn seed_if_empty(store: &Store) -> StoreResult<usize> {
    store
        .call(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
            if count > 0 {
                return Ok(0);
            }
            let inserted = conn.execute(
                "INSERT INTO products (title, specs, price, image) VALUES
                 ('Nitro X gaming PC', 'Ryzen 5 5600, 16GB RAM, RTX 3060, 512GB SSD', 89990, '/public/img/pc1.jpg'),
                 ('Nitro 2X gaming PC', 'Intel i7, 32GB RAM, RTX 3060, 1024GB SSD', 134990, '/public/img/pc2.jpg'),
                 ('Creator ultra PC', 'Ryzen 7 7800X, 32GB RAM, RTX 4070, 1TB SSD', 169990, '/public/img/pc3.jpg'),
                 ('Mini compact PC', 'Intel N100, 8GB RAM, 256GB SSD', 25990, '/public/img/pc4.jpg')",
                [],
            )?;
            Ok(inserted)
        })
        .await
}
