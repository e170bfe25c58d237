use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{FolderStructureType, PluginConfig};
use crate::matcher;

/// One candidate project produced by enumeration. `parent` is set under the
/// ProjectParents layout and absent for standalone repos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub parent: Option<String>,
    pub repo: String,
}

impl Folder {
    /// The label the fuzzy matcher scores: `parent/repo` or the bare repo.
    pub fn label(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{parent}/{}", self.repo),
            None => self.repo.clone(),
        }
    }

    /// Path of this project relative to the base path.
    pub fn relative_path(&self) -> PathBuf {
        match &self.parent {
            Some(parent) => Path::new(parent).join(&self.repo),
            None => PathBuf::from(&self.repo),
        }
    }
}

/// All candidate projects under the base path for the configured layout.
/// Entries are sorted by name at every level so the output is deterministic
/// across platforms; unreadable directories are skipped.
pub fn enumerate_projects(base_path: &Path, config: &PluginConfig) -> Vec<Folder> {
    match config.folder_structure_type {
        FolderStructureType::StandaloneRepos => child_dirs(base_path, &config.ignored_folders)
            .into_iter()
            .map(|(repo, _)| Folder { parent: None, repo })
            .collect(),
        FolderStructureType::ProjectParents => {
            let mut folders = Vec::new();
            for (parent, parent_path) in child_dirs(base_path, &config.ignored_folders) {
                for (repo, _) in child_dirs(&parent_path, &config.ignored_folders) {
                    folders.push(Folder {
                        parent: Some(parent.clone()),
                        repo,
                    });
                }
            }
            folders
        }
    }
}

/// Candidates surviving the fuzzy filter for the given query text.
pub fn search_projects(base_path: &Path, config: &PluginConfig, query: &str) -> Vec<Folder> {
    enumerate_projects(base_path, config)
        .into_iter()
        .filter(|folder| matcher::accepts(&folder.label(), query, config.search_match_ratio))
        .collect()
}

fn child_dirs(dir: &Path, ignored: &BTreeSet<String>) -> Vec<(String, PathBuf)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut children: Vec<(String, PathBuf)> = entries
        .flatten()
        .filter(|entry| {
            entry
                .file_type()
                .map(|file_type| file_type.is_dir())
                .unwrap_or(false)
        })
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.is_empty() || ignored.contains(&name) {
                return None;
            }
            Some((name, entry.path()))
        })
        .collect();

    children.sort_by(|left, right| left.0.cmp(&right.0));
    children
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use crate::config::FolderStructureType;

    use super::*;

    fn layout(base: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(base.join(dir)).expect("create project dir");
        }
    }

    fn parents_config(ignored: &[&str]) -> PluginConfig {
        PluginConfig {
            folder_structure_type: FolderStructureType::ProjectParents,
            ignored_folders: ignored.iter().map(ToString::to_string).collect(),
            ..PluginConfig::default()
        }
    }

    #[test]
    fn project_parents_layout_produces_parent_repo_pairs() {
        let temp = tempdir().expect("create temp dir");
        layout(temp.path(), &["teamA/app1", "teamA/app2", "teamB/tool"]);
        fs::write(temp.path().join("teamA/readme.txt"), "not a dir").expect("write file");

        let folders = enumerate_projects(temp.path(), &parents_config(&[]));
        let labels: Vec<String> = folders.iter().map(Folder::label).collect();
        assert_eq!(labels, vec!["teamA/app1", "teamA/app2", "teamB/tool"]);
    }

    #[test]
    fn standalone_layout_produces_repo_names_only() {
        let temp = tempdir().expect("create temp dir");
        layout(temp.path(), &["zeta", "alpha"]);

        let config = PluginConfig {
            folder_structure_type: FolderStructureType::StandaloneRepos,
            ..PluginConfig::default()
        };
        let folders = enumerate_projects(temp.path(), &config);
        let labels: Vec<String> = folders.iter().map(Folder::label).collect();

        assert_eq!(labels, vec!["alpha", "zeta"], "entries should sort by name");
        assert!(folders.iter().all(|folder| folder.parent.is_none()));
    }

    #[test]
    fn ignored_folders_are_skipped_at_both_levels() {
        let temp = tempdir().expect("create temp dir");
        layout(
            temp.path(),
            &["archive/old", "teamA/app1", "teamA/node_modules"],
        );

        let folders = enumerate_projects(temp.path(), &parents_config(&["archive", "node_modules"]));
        let labels: Vec<String> = folders.iter().map(Folder::label).collect();
        assert_eq!(labels, vec!["teamA/app1"]);
    }

    #[test]
    fn missing_base_path_yields_no_candidates() {
        let temp = tempdir().expect("create temp dir");
        let folders = enumerate_projects(&temp.path().join("does-not-exist"), &parents_config(&[]));
        assert!(folders.is_empty());
    }

    #[test]
    fn search_filters_by_partial_ratio_with_strict_threshold() {
        let temp = tempdir().expect("create temp dir");
        layout(temp.path(), &["teamA/app1", "teamB/unrelated"]);

        let config = parents_config(&[]);
        let matched = search_projects(temp.path(), &config, "app1");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].repo, "app1");
        assert_eq!(matched[0].parent.as_deref(), Some("teamA"));

        let all = search_projects(temp.path(), &config, "  ");
        assert_eq!(all.len(), 2, "whitespace query should keep every candidate");
    }

    #[test]
    fn relative_path_joins_parent_and_repo() {
        let nested = Folder {
            parent: Some("teamA".to_string()),
            repo: "app1".to_string(),
        };
        assert_eq!(nested.relative_path(), PathBuf::from("teamA/app1"));

        let flat = Folder {
            parent: None,
            repo: "app1".to_string(),
        };
        assert_eq!(flat.relative_path(), PathBuf::from("app1"));
    }
}
