use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SEARCH_MATCH_RATIO: u8 = 70;

const CONFIG_PATH_ENV: &str = "WALKER_CONFIG";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FolderStructureType {
    /// Base path contains parent folders, each holding repo folders.
    #[default]
    ProjectParents,
    /// Base path contains repo folders directly.
    StandaloneRepos,
}

/// Discriminates what executing an option does. Unknown strings in the
/// config file land on `Unsupported`, which dispatch ignores rather than
/// rejecting the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Process,
    Browser,
    Clipboard,
    #[default]
    Unsupported,
}

impl<'de> Deserialize<'de> for OptionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "process" => Self::Process,
            "browser" => Self::Browser,
            "clipboard" => Self::Clipboard,
            _ => Self::Unsupported,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenOption {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub name: String,
    pub index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
}

/// Per-repo/per-project adjustment of the option list, applied right before
/// dispatch when the scoping fields match the resolved folder names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverrideConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub exclude_options: Vec<String>,
    pub options: Vec<OpenOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginConfig {
    pub base_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_editor_executable_path: Option<String>,
    pub folder_structure_type: FolderStructureType,
    pub search_match_ratio: u8,
    pub ignored_folders: BTreeSet<String>,
    pub options: Vec<OpenOption>,
    pub overrides: Vec<OverrideConfig>,
    pub try_extract_process_icons: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            custom_editor_executable_path: None,
            folder_structure_type: FolderStructureType::default(),
            search_match_ratio: DEFAULT_SEARCH_MATCH_RATIO,
            ignored_folders: BTreeSet::new(),
            options: Vec::new(),
            overrides: Vec::new(),
            try_extract_process_icons: false,
        }
    }
}

impl PluginConfig {
    /// Base path with `$HOME`/`~` tokens expanded against the given home dir.
    pub fn expanded_base_path(&self, home: &str) -> PathBuf {
        PathBuf::from(expand_home_tokens(&self.base_path, home))
    }
}

/// The configuration written out when none exists yet: a file explorer, a
/// code editor, the git remote in a browser, and copy-path.
pub fn default_config() -> PluginConfig {
    PluginConfig {
        options: vec![
            OpenOption {
                kind: OptionKind::Process,
                name: "Explorer".to_string(),
                index: 0,
                process_name: Some("explorer".to_string()),
                parameters: Some("{{PATH}}".to_string()),
                icon_path: None,
            },
            OpenOption {
                kind: OptionKind::Process,
                name: "VS Code".to_string(),
                index: 1,
                process_name: Some("code".to_string()),
                parameters: Some("{{PATH}}".to_string()),
                icon_path: None,
            },
            OpenOption {
                kind: OptionKind::Browser,
                name: "Open in Browser".to_string(),
                index: 2,
                process_name: None,
                parameters: Some("{{GIT:REMOTE_URL}}".to_string()),
                icon_path: None,
            },
            OpenOption {
                kind: OptionKind::Clipboard,
                name: "Copy path".to_string(),
                index: 3,
                process_name: None,
                parameters: Some("{{PATH}}".to_string()),
                icon_path: None,
            },
        ],
        ..PluginConfig::default()
    }
}

/// Owns the loaded configuration and its on-disk location. The value is
/// replaced wholesale on `reload`; queries only ever borrow it.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: PluginConfig,
}

impl ConfigStore {
    /// Load the config file, writing out the default configuration first if
    /// the file does not exist yet.
    pub fn open(path: PathBuf) -> Result<Self, ConfigError> {
        let config = read_or_init(&path)?;
        Ok(Self { path, config })
    }

    /// Re-read the file from disk, replacing the whole in-memory value. On
    /// failure the previous configuration stays in place.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        self.config = read_or_init(&self.path)?;
        Ok(())
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Folder for user-provided custom icons, next to the config file.
    pub fn icon_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) => parent.join("icons"),
            None => PathBuf::from("icons"),
        }
    }
}

fn read_or_init(path: &Path) -> Result<PluginConfig, ConfigError> {
    if !path.exists() {
        let config = default_config();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let body = serde_json::to_string_pretty(&config).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, body).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(config);
    }

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Config file location: `$WALKER_CONFIG` when set, otherwise
/// `$HOME/.config/walker/config.json`.
pub fn default_config_path() -> PathBuf {
    if let Ok(explicit) = env::var(CONFIG_PATH_ENV) {
        let trimmed = explicit.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    let home = env::var("HOME").unwrap_or_default();
    [home.as_str(), ".config", "walker", CONFIG_FILE]
        .iter()
        .collect()
}

pub fn expand_home_tokens(raw: &str, home: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut expanded = trimmed.replace("$HOME", home);

    if expanded == "~" {
        expanded = home.to_string();
    } else if let Some(rest) = expanded.strip_prefix("~/") {
        expanded = format!("{home}/{rest}");
    }

    expanded
}

/// The option list for one resolved project: base options with every
/// in-scope override applied (`exclude_options` removes by name, override
/// options replace same-named entries or append), re-sorted by index.
pub fn effective_options(
    config: &PluginConfig,
    parent: Option<&str>,
    repo: Option<&str>,
) -> Vec<OpenOption> {
    let mut options = config.options.clone();

    for scope in &config.overrides {
        if !override_matches(scope, parent, repo) {
            continue;
        }

        options.retain(|option| !scope.exclude_options.contains(&option.name));

        for replacement in &scope.options {
            match options
                .iter_mut()
                .find(|option| option.name == replacement.name)
            {
                Some(slot) => *slot = replacement.clone(),
                None => options.push(replacement.clone()),
            }
        }
    }

    options.sort_by_key(|option| option.index);
    options
}

fn override_matches(scope: &OverrideConfig, parent: Option<&str>, repo: Option<&str>) -> bool {
    // An override naming neither a repo nor a project matches nothing.
    if scope.repo.is_none() && scope.project.is_none() {
        return false;
    }

    if let Some(wanted) = scope.repo.as_deref() {
        if repo != Some(wanted) {
            return false;
        }
    }

    if let Some(wanted) = scope.project.as_deref() {
        if parent != Some(wanted) {
            return false;
        }
    }

    true
}
