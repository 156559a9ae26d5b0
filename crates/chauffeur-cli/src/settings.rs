//! `settings` command handlers.

use chauffeur_core::{is_probably_api_key, resolve_api_key, AppConfig, SettingsStore};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub(crate) enum SettingsCommands {
    /// Show persisted settings and the effective API key source
    Show,
    /// Persist a maps API key
    SetKey {
        /// The API key to store
        key: String,
    },
    /// Remove the persisted API key
    ClearKey,
    /// Turn maps and route pricing on
    EnableMaps,
    /// Turn maps and route pricing off
    DisableMaps,
}

/// Where the effective API key comes from.
pub(crate) fn key_source(persisted: Option<&str>, env: Option<&str>) -> &'static str {
    let persisted_set = persisted.is_some_and(|k| !k.trim().is_empty());
    match (persisted_set, resolve_api_key(persisted, env)) {
        (true, _) => "settings file",
        (false, Some(_)) => "environment",
        (false, None) => "none",
    }
}

/// Runs a settings sub-command against the configured store.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written, or if a key
/// being stored is obviously malformed.
pub(crate) fn run_settings(config: &AppConfig, command: &SettingsCommands) -> anyhow::Result<()> {
    let store = SettingsStore::new(&config.settings_path);
    let mut settings = store.load()?;

    match command {
        SettingsCommands::Show => {
            let source = key_source(
                settings.google_maps_api_key.as_deref(),
                config.google_maps_api_key.as_deref(),
            );
            let effective = resolve_api_key(
                settings.google_maps_api_key.as_deref(),
                config.google_maps_api_key.as_deref(),
            );
            println!("settings file: {}", store.path().display());
            println!("maps enabled: {}", settings.enable_maps);
            println!("api key source: {source}");
            if let Some(key) = effective {
                let shape = if is_probably_api_key(&key) {
                    "looks valid"
                } else {
                    "too short"
                };
                println!("api key: set ({shape})");
            }
            return Ok(());
        }
        SettingsCommands::SetKey { key } => {
            if !is_probably_api_key(key) {
                anyhow::bail!("Missing/invalid API key format.");
            }
            settings.google_maps_api_key = Some(key.trim().to_string());
            println!("api key saved");
        }
        SettingsCommands::ClearKey => {
            settings.google_maps_api_key = None;
            println!("api key cleared");
        }
        SettingsCommands::EnableMaps => {
            settings.enable_maps = true;
            println!("maps enabled");
        }
        SettingsCommands::DisableMaps => {
            settings.enable_maps = false;
            println!("maps disabled");
        }
    }

    store.save(&settings)?;
    tracing::info!(path = %store.path().display(), "settings saved");
    Ok(())
}
