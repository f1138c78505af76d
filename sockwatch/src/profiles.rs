//! Connection profiles: a JSON map of profile name -> { url, tls_ca }.
//! Stored under $XDG_CONFIG_HOME/sockwatch/profiles.json (fallback: the platform config dir).

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("sockwatch")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sockwatch")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

/// A missing or unreadable file yields an empty set of profiles.
pub fn load_profiles() -> ProfilesFile {
    match fs::read_to_string(profiles_path()) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> io::Result<()> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p).map_err(io::Error::other)?;
    fs::write(path, data)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveProfile {
    /// Runtime inputs win; the caller may persist them. (url, tls_ca)
    Direct(String, Option<String>),
    /// Taken from an existing profile entry. (url, tls_ca)
    Loaded(String, Option<String>),
    /// Ask the user to pick one of these profile names.
    PromptSelect(Vec<String>),
    /// Named profile doesn't exist yet; ask for its details.
    PromptCreate(String),
    /// Nothing to connect to.
    None,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub url: Option<String>,
    pub tls_ca: Option<String>,
}

impl ProfileRequest {
    pub fn resolve(self, pf: &ProfilesFile) -> ResolveProfile {
        match (self.url, self.profile_name) {
            (Some(url), _) => ResolveProfile::Direct(url, self.tls_ca),
            (None, Some(name)) => match pf.profiles.get(&name) {
                Some(entry) => ResolveProfile::Loaded(
                    entry.url.clone(),
                    self.tls_ca.or_else(|| entry.tls_ca.clone()),
                ),
                None => ResolveProfile::PromptCreate(name),
            },
            (None, None) if pf.profiles.is_empty() => ResolveProfile::None,
            (None, None) => ResolveProfile::PromptSelect(pf.profiles.keys().cloned().collect()),
        }
    }
}

/// How storing `entry` under `name` relates to what's on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileChange {
    New,
    Unchanged,
    Changed,
}

pub fn classify_change(pf: &ProfilesFile, name: &str, entry: &ProfileEntry) -> ProfileChange {
    match pf.profiles.get(name) {
        None => ProfileChange::New,
        Some(existing) if existing == entry => ProfileChange::Unchanged,
        Some(_) => ProfileChange::Changed,
    }
}
