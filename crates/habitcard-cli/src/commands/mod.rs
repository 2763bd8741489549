pub mod carousel;
pub mod config;
pub mod habit;

use habitcard_core::{Database, HabitStore, StoreHandle};

/// Store over the on-disk database in the data directory.
pub fn open_store() -> Result<StoreHandle, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    tracing::debug!(?db, "store opened");
    Ok(StoreHandle::new(HabitStore::load(db)?))
}
