//! Result-list assembly: the host-facing query entry point and the
//! secondary context-menu actions.

use std::path::Path;

use launcher_core::{Action, ItemIcon, ResultItem, ResultList};

use crate::config::{self, PluginConfig};
use crate::dispatch::Dispatcher;
use crate::icons::{IconSet, ProcessIconSource};
use crate::query::{self, QueryIntent};
use crate::scan;

pub const DOCS_URL: &str = "https://github.com/walker-launcher/walker";

const NO_BASE_PATH_TITLE: &str = "Please set base path in config.json";
const PATH_NOT_FOUND_TITLE: &str = "Could not find path to folder";
const NO_OPTIONS_TITLE: &str = "No open options have been set";

const SCORE_MISSING_BASE_PATH: i32 = 9999;
const SCORE_EDIT_CONFIG: i32 = 900;
const SCORE_EDIT_CONFIG_CUSTOM: i32 = 800;
const SCORE_RELOAD_CONFIG: i32 = 700;
const SCORE_OPEN_ICON_FOLDER: i32 = 600;
const SCORE_VIEW_DOCS: i32 = 500;

/// Everything a query needs besides the raw search text. The configuration
/// is borrowed, never owned: the store replaces it wholesale on reload and
/// queries see whichever value is current when they start.
pub struct QueryEnv<'a> {
    pub config: &'a PluginConfig,
    pub config_path: &'a Path,
    pub icons: &'a IconSet,
    pub process_icons: &'a dyn ProcessIconSource,
    pub home: &'a str,
}

/// The host query entry point: a fully materialized, ordered result list
/// for one raw query string.
pub fn run_query(env: &QueryEnv<'_>, raw: &str) -> ResultList {
    if env.config.base_path.trim().is_empty() {
        let mut items = config_management_items(env);
        items.push(
            ResultItem::new(NO_BASE_PATH_TITLE)
                .with_subtitle(env.config_path.to_string_lossy())
                .with_icon(ItemIcon::new(env.icons.builtin("error")))
                .with_score(SCORE_MISSING_BASE_PATH),
        );
        return ResultList::new(items);
    }

    match query::parse_query(raw) {
        QueryIntent::Open(rest) => open_results(env, &rest, raw),
        QueryIntent::Config => ResultList::new(config_management_items(env)),
        QueryIntent::Search(text) => search_results(env, &text),
    }
}

/// Secondary actions for a selected result: items that carry the raw search
/// text offer to copy it; everything else has no context menu.
pub fn load_context_menus(selected: &ResultItem, icons: &IconSet) -> Vec<ResultItem> {
    match selected.context_data.as_deref() {
        Some(search) if !search.trim().is_empty() => vec![
            ResultItem::new("Copy search text")
                .with_subtitle(search)
                .with_icon(ItemIcon::new(icons.builtin("copy")))
                .with_action(Action::CopyText {
                    text: search.to_string(),
                }),
        ],
        _ => Vec::new(),
    }
}

fn search_results(env: &QueryEnv<'_>, text: &str) -> ResultList {
    let base = env.config.expanded_base_path(env.home);
    let folders = scan::search_projects(&base, env.config, text);

    let items = folders
        .into_iter()
        .map(|folder| {
            let subtitle = match &folder.parent {
                Some(parent) => parent.clone(),
                None => base.join(&folder.repo).to_string_lossy().to_string(),
            };

            ResultItem::new(&folder.repo)
                .with_subtitle(subtitle)
                .with_icon(ItemIcon::new(env.icons.builtin("folder")))
                .with_autocomplete(format!("-o \"{}\"", folder.label()))
                .with_context_data(text)
        })
        .collect();

    ResultList::new(items)
}

fn open_results(env: &QueryEnv<'_>, rest: &str, raw_search: &str) -> ResultList {
    let base = env.config.expanded_base_path(env.home);
    let path = base.join(rest);

    if !path.exists() {
        let path_text = path.to_string_lossy().to_string();
        return ResultList::new(vec![
            ResultItem::new(PATH_NOT_FOUND_TITLE)
                .with_subtitle(&path_text)
                .with_icon(ItemIcon::new(env.icons.builtin("error")))
                .with_action(Action::CopyText { text: path_text }),
        ]);
    }

    if env.config.options.is_empty() {
        return ResultList::new(vec![
            ResultItem::new(NO_OPTIONS_TITLE)
                .with_icon(ItemIcon::new(env.icons.builtin("error"))),
        ]);
    }

    let repo = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string());
    let parent = path
        .parent()
        .filter(|parent| *parent != base.as_path())
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_string());

    let options = config::effective_options(env.config, parent.as_deref(), repo.as_deref());
    let dispatcher = Dispatcher {
        icons: env.icons,
        process_icons: env.process_icons,
        try_extract_process_icons: env.config.try_extract_process_icons,
    };

    ResultList::new(dispatcher.dispatch(&options, &path, raw_search))
}

fn config_management_items(env: &QueryEnv<'_>) -> Vec<ResultItem> {
    let config_path = env.config_path.to_string_lossy().to_string();
    let opener = platform_opener();

    let mut items = vec![
        ResultItem::new("Edit config")
            .with_subtitle(&config_path)
            .with_icon(ItemIcon::new(env.icons.builtin("open")))
            .with_score(SCORE_EDIT_CONFIG)
            .with_action(Action::Launch {
                program: opener.to_string(),
                arguments: Some(config_path.clone()),
            }),
        ResultItem::new("Reload config")
            .with_subtitle("Reload the configuration file from disk")
            .with_icon(ItemIcon::new(env.icons.builtin("reload")))
            .with_score(SCORE_RELOAD_CONFIG)
            .with_action(Action::ReloadConfig),
        ResultItem::new("Open icon folder")
            .with_subtitle("Store custom icons")
            .with_icon(ItemIcon::new(env.icons.builtin("icons")))
            .with_score(SCORE_OPEN_ICON_FOLDER)
            .with_action(Action::Launch {
                program: opener.to_string(),
                arguments: Some(env.icons.icon_dir().to_string_lossy().to_string()),
            }),
        ResultItem::new("View documentation")
            .with_subtitle(DOCS_URL)
            .with_icon(ItemIcon::new(env.icons.builtin("docs")))
            .with_score(SCORE_VIEW_DOCS)
            .with_action(Action::OpenUrl {
                url: DOCS_URL.to_string(),
            }),
    ];

    if let Some(editor) = env
        .config
        .custom_editor_executable_path
        .as_deref()
        .filter(|editor| !editor.trim().is_empty())
    {
        items.push(
            ResultItem::new("Edit config in custom editor")
                .with_subtitle(format!("{editor} {config_path}"))
                .with_icon(ItemIcon::new(env.icons.builtin("open")))
                .with_score(SCORE_EDIT_CONFIG_CUSTOM)
                .with_action(Action::Launch {
                    program: editor.to_string(),
                    arguments: Some(config_path.clone()),
                }),
        );
    }

    items
}

/// Platform primitive for "open this path with whatever handles it".
pub fn platform_opener() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "open"
    }

    #[cfg(target_os = "windows")]
    {
        "explorer"
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        "xdg-open"
    }
}
