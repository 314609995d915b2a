use clap::Subcommand;
use flipclock_core::SettingKey;

use super::open_settings;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a setting (e.g. "workTime", "timeFormat")
    Get {
        /// Setting key
        key: String,
    },
    /// Set a setting
    Set {
        /// Setting key
        key: String,
        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let settings = open_settings()?;
    match action {
        ConfigAction::Get { key } => {
            let key: SettingKey = key.parse()?;
            let value = settings.borrow().get(key);
            match value.as_str() {
                Some(text) => println!("{text}"),
                None => println!("{value}"),
            }
        }
        ConfigAction::Set { key, value } => {
            let change = settings.borrow_mut().update_from_str(&key, &value)?;
            println!("{} = {}", change.key, change.value);
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(settings.borrow().settings())?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let changes = settings.borrow_mut().reset();
            tracing::debug!(changed = changes.len(), "settings reset");
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
