//! Placeholder-template resolution: scan `{{...}}` tokens into a typed list
//! and substitute them in fixed passes against a resolved project path.
//!
//! Pass order: `{{PATH}}` and `{{FOLDER}}` first (always substitutable),
//! then file-search tokens (each occurrence independently, left to right),
//! then git tokens (distinct keys resolved once, applied uniformly). Any
//! required substitution that cannot be completed fails the whole template.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::ResolveError;
use crate::{filesearch, gitmeta, yamlpath};

pub const TOKEN_PATH: &str = "{{PATH}}";
pub const TOKEN_FOLDER: &str = "{{FOLDER}}";
pub const GIT_KEY_REMOTE_URL: &str = "REMOTE_URL";

const FILE_PREFIX: &str = "FILE:";
const RECURSIVE_FILE_PREFIX: &str = "RECURSIVE_FILE:";
const GIT_PREFIX: &str = "GIT:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Path,
    Folder,
    FileSearch {
        pattern: String,
        recursive: bool,
        query: Option<String>,
    },
    Git {
        key: String,
    },
}

/// One recognized `{{...}}` occurrence: the literal source text plus its
/// parsed form. Unrecognized keyword text between braces is not a token and
/// passes through the resolver untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub source: String,
    pub placeholder: Placeholder,
}

/// Every recognized token occurrence in the template, in text order.
/// Duplicate occurrences produce duplicate entries.
pub fn scan_tokens(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };

        let inner = &after[..close];
        if let Some(placeholder) = parse_inner(inner) {
            tokens.push(Token {
                source: rest[open..open + close + 4].to_string(),
                placeholder,
            });
        }
        rest = &after[close + 2..];
    }

    tokens
}

fn parse_inner(inner: &str) -> Option<Placeholder> {
    match inner {
        "PATH" => Some(Placeholder::Path),
        "FOLDER" => Some(Placeholder::Folder),
        _ => {
            if let Some(spec) = inner.strip_prefix(FILE_PREFIX) {
                Some(parse_file_spec(spec, false))
            } else if let Some(spec) = inner.strip_prefix(RECURSIVE_FILE_PREFIX) {
                Some(parse_file_spec(spec, true))
            } else {
                inner.strip_prefix(GIT_PREFIX).map(|key| Placeholder::Git {
                    key: key.to_string(),
                })
            }
        }
    }
}

fn parse_file_spec(spec: &str, recursive: bool) -> Placeholder {
    let (pattern, query) = match spec.split_once('>') {
        Some((pattern, query)) => (pattern.to_string(), Some(query.to_string())),
        None => (spec.to_string(), None),
    };
    Placeholder::FileSearch {
        pattern,
        recursive,
        query,
    }
}

/// Substitute every token in `template` against `project_path`. Returns the
/// fully-substituted string, or the first failure encountered, in which
/// case the caller drops the owning option.
pub fn resolve(template: &str, project_path: &Path) -> Result<String, ResolveError> {
    let path_text = project_path.to_string_lossy();
    let folder_name = project_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path_text.to_string());

    let mut output = template.replace(TOKEN_PATH, path_text.as_ref());
    output = output.replace(TOKEN_FOLDER, &folder_name);

    output = resolve_file_tokens(output, project_path)?;
    resolve_git_tokens(output, project_path)
}

fn resolve_file_tokens(mut output: String, project_path: &Path) -> Result<String, ResolveError> {
    // Left to right, one occurrence at a time; each occurrence runs its own
    // search even when the pattern repeats.
    loop {
        let next = scan_tokens(&output).into_iter().find_map(|token| {
            match token.placeholder {
                Placeholder::FileSearch {
                    pattern,
                    recursive,
                    query,
                } => Some((token.source, pattern, recursive, query)),
                _ => None,
            }
        });
        let Some((source, pattern, recursive, query)) = next else {
            return Ok(output);
        };

        let matched = filesearch::find_first(project_path, &pattern, recursive)?;
        let replacement = match query.as_deref() {
            Some(query) => yamlpath::query_file(&matched, query)?,
            None => matched.to_string_lossy().to_string(),
        };
        output = output.replacen(&source, &replacement, 1);
    }
}

fn resolve_git_tokens(mut output: String, project_path: &Path) -> Result<String, ResolveError> {
    let git_tokens: Vec<Token> = scan_tokens(&output)
        .into_iter()
        .filter(|token| matches!(token.placeholder, Placeholder::Git { .. }))
        .collect();
    if git_tokens.is_empty() {
        return Ok(output);
    }

    // Opening the repository is required for any git token; the handle is
    // dropped inside this call and never cached.
    let remote_url = gitmeta::first_remote_url(project_path)?;

    let mut seen = BTreeSet::new();
    for token in git_tokens {
        let Placeholder::Git { key } = &token.placeholder else {
            continue;
        };
        if !seen.insert(key.clone()) {
            continue;
        }

        if key == GIT_KEY_REMOTE_URL {
            if let Some(url) = &remote_url {
                output = output.replace(&token.source, url);
            }
            // No remotes: the token stays in place.
        }
        // Unrecognized keys stay in place as well.
    }

    Ok(output)
}
