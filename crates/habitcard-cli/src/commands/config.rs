use clap::Subcommand;
use habitcard_core::Config;
use serde_json::json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the value at a dot-path key as JSON
    Get {
        /// Dot-path key or section (e.g. "hold.complete_ms", "tilt")
        key: String,
    },
    /// Store a value and print what was stored
    Set {
        key: String,
        /// Parsed to the key's type (number, bool, or string)
        value: String,
    },
    /// Print the whole configuration as JSON
    List,
    /// Write the defaults back to disk
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?.value(&key)?;
            let out = json!({ "key": key, "value": value });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            let previous = config.value(&key)?;
            config.set(&key, &value)?;
            let stored = config.value(&key)?;
            tracing::debug!(%key, %stored, "config updated");
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "key": key,
                    "previous": previous,
                    "value": stored,
                }))?
            );
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&Config::load()?)?);
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
