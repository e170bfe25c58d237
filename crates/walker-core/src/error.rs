use std::path::PathBuf;

use thiserror::Error;

/// Configuration file failures. Fatal to startup; never recovered from.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write default config at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a placeholder template could not be fully substituted. Any variant
/// aborts resolution of the whole template; the owning option is dropped
/// from the result list without surfacing an error to the host.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no files match pattern '{pattern}' under {dir}")]
    NoFileMatch { pattern: String, dir: PathBuf },
    #[error("invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("matched file {file} is not a YAML document")]
    NotYamlFile { file: PathBuf },
    #[error("failed to read {file}: {source}")]
    FileRead {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML document {file}: {source}")]
    YamlParse {
        file: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid structured query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },
    #[error("structured query '{query}' produced no result in {file}")]
    EmptyQueryResult { query: String, file: PathBuf },
    #[error("{dir} is not a git working copy")]
    NotARepository { dir: PathBuf },
    #[error("failed to read git metadata in {dir}: {source}")]
    GitAccess {
        dir: PathBuf,
        #[source]
        source: git2::Error,
    },
}

/// Why one open option produced no result. Kept for diagnostics; dispatch
/// treats every variant as "skip this option".
#[derive(Debug, Error)]
pub enum OptionSkip {
    #[error("process option has no process name")]
    MissingProcessName,
    #[error("option parameters are empty")]
    EmptyParameters,
    #[error("template resolution failed: {0}")]
    Unresolved(#[from] ResolveError),
    #[error("resolved parameters are not an absolute URL: {0}")]
    InvalidUrl(String),
    #[error("unsupported option type")]
    UnsupportedKind,
}
