// Saved connection profile: server base URL plus an optional API token.

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::info;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone)]
pub struct Profile {
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Profile {
    pub fn new(server: &str, token: Option<&str>) -> Self {
        Profile {
            server: server.to_string(),
            token: token.map(|t| BASE64.encode(t)),
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.token.as_ref().map(|encoded| {
            String::from_utf8(BASE64.decode(encoded).unwrap_or_default()).unwrap_or_default()
        })
    }
}

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join("chatsync");

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

static PROFILE_PATH_OVERRIDE: OnceCell<PathBuf> = OnceCell::new();

/// Redirect profile storage, mainly so tests stay out of the real config dir.
/// Only the first call takes effect.
pub fn set_profile_path_override(path: PathBuf) {
    let _ = PROFILE_PATH_OVERRIDE.set(path);
}

fn get_profile_path() -> Result<PathBuf> {
    if let Some(path) = PROFILE_PATH_OVERRIDE.get() {
        return Ok(path.clone());
    }
    Ok(get_config_dir()?.join("profile.json"))
}

pub fn save_profile(profile: &Profile) -> Result<()> {
    let path = get_profile_path()?;
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, profile)?;

    info!("Profile saved for {}", profile.server);
    Ok(())
}

pub fn load_profile() -> Result<Option<Profile>> {
    let path = get_profile_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)?;
    let profile: Profile = serde_json::from_str(&contents)?;
    info!("Loaded profile for {} from {}", profile.server, path.display());

    Ok(Some(profile))
}

pub fn delete_profile() -> Result<()> {
    let path = get_profile_path()?;
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
