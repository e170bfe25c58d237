//! Shared project-walker domain modules.
//!
//! - `config`: config file model, defaults, store with reload, overrides.
//! - `matcher`: partial-ratio fuzzy scoring and acceptance.
//! - `scan`: base-path enumeration for both folder layouts.
//! - `template`: placeholder token scanning and substitution.
//! - `filesearch`: glob-based first-match lookup, flat and recursive.
//! - `yamlpath`: structured-data path queries over YAML documents.
//! - `gitmeta`: read-only repository metadata.
//! - `dispatch`: open-option to result-item conversion.
//! - `icons`: themed built-in and user-provided icon references.
//! - `query`: the `-o`/`-c` query mini-language.
//! - `feedback`: host-facing result-list assembly.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod feedback;
pub mod filesearch;
pub mod gitmeta;
pub mod icons;
pub mod matcher;
pub mod query;
pub mod scan;
pub mod template;
pub mod yamlpath;

pub use config::{
    ConfigStore, FolderStructureType, OpenOption, OptionKind, OverrideConfig, PluginConfig,
    default_config, default_config_path, effective_options, expand_home_tokens,
};
pub use dispatch::Dispatcher;
pub use error::{ConfigError, OptionSkip, ResolveError};
pub use feedback::{DOCS_URL, QueryEnv, load_context_menus, platform_opener, run_query};
pub use icons::{IconSet, IconTheme, NoProcessIcons, ProcessIconSource};
pub use launcher_core::{Action, ItemIcon, ResultItem, ResultList};
pub use matcher::{accepts, partial_ratio};
pub use query::{QueryIntent, parse_query};
pub use scan::{Folder, enumerate_projects, search_projects};
pub use template::{Placeholder, Token, resolve, scan_tokens};
