pub mod clock;
pub mod config;
pub mod locale;
pub mod timer;

use flipclock_core::{KvStore, SettingsStore, SharedSettings};

/// Settings from the on-disk store under the data directory.
pub fn open_settings() -> Result<SharedSettings, Box<dyn std::error::Error>> {
    let store = KvStore::open()?;
    Ok(SettingsStore::load(store).into_shared())
}
