use std::path::Path;

use launcher_core::{Action, ItemIcon, ResultItem};
use url::Url;

use crate::config::{OpenOption, OptionKind};
use crate::error::OptionSkip;
use crate::icons::{IconSet, ProcessIconSource};
use crate::template;

/// Turns configured open options into actionable result items for one
/// resolved project path. Options that fail to resolve are dropped
/// silently; their skip reasons stay available through `build_option`.
pub struct Dispatcher<'a> {
    pub icons: &'a IconSet,
    pub process_icons: &'a dyn ProcessIconSource,
    pub try_extract_process_icons: bool,
}

impl Dispatcher<'_> {
    /// Build items for every option, ascending index order. The score of
    /// each produced item is `max_index - index`, so index 0 ranks first.
    pub fn dispatch(&self, options: &[OpenOption], path: &Path, search: &str) -> Vec<ResultItem> {
        let max_index = options.iter().map(|option| option.index).max().unwrap_or(0);

        let mut ordered: Vec<&OpenOption> = options.iter().collect();
        ordered.sort_by_key(|option| option.index);

        ordered
            .into_iter()
            .filter_map(|option| self.build_option(option, max_index, path, search).ok())
            .collect()
    }

    pub fn build_option(
        &self,
        option: &OpenOption,
        max_index: i32,
        path: &Path,
        search: &str,
    ) -> Result<ResultItem, OptionSkip> {
        match option.kind {
            OptionKind::Process => self.build_process(option, max_index, path, search),
            OptionKind::Browser => self.build_browser(option, max_index, path, search),
            OptionKind::Clipboard => self.build_clipboard(option, max_index, path, search),
            OptionKind::Unsupported => Err(OptionSkip::UnsupportedKind),
        }
    }

    fn build_process(
        &self,
        option: &OpenOption,
        max_index: i32,
        path: &Path,
        search: &str,
    ) -> Result<ResultItem, OptionSkip> {
        let program = option
            .process_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(OptionSkip::MissingProcessName)?;

        let arguments = match trimmed_parameters(option) {
            Some(parameters) => {
                let resolved = template::resolve(parameters, path)?;
                if resolved.trim().is_empty() {
                    return Err(OptionSkip::EmptyParameters);
                }
                Some(resolved)
            }
            None => None,
        };

        let subtitle = match &arguments {
            Some(arguments) => format!("{program} {arguments}"),
            None => program.to_string(),
        };

        Ok(ResultItem::new(&option.name)
            .with_subtitle(subtitle)
            .with_icon(self.process_icon(option, program))
            .with_score(max_index - option.index)
            .with_context_data(search)
            .with_action(Action::Launch {
                program: program.to_string(),
                arguments,
            }))
    }

    fn build_browser(
        &self,
        option: &OpenOption,
        max_index: i32,
        path: &Path,
        search: &str,
    ) -> Result<ResultItem, OptionSkip> {
        let parameters = trimmed_parameters(option).ok_or(OptionSkip::EmptyParameters)?;

        let resolved = template::resolve(parameters, path)?;
        let destination = resolved.trim();
        if destination.is_empty() {
            return Err(OptionSkip::EmptyParameters);
        }
        Url::parse(destination).map_err(|err| OptionSkip::InvalidUrl(err.to_string()))?;

        Ok(ResultItem::new(&option.name)
            .with_subtitle(destination)
            .with_icon(self.static_icon(option, "globe"))
            .with_score(max_index - option.index)
            .with_context_data(search)
            .with_action(Action::OpenUrl {
                url: destination.to_string(),
            }))
    }

    fn build_clipboard(
        &self,
        option: &OpenOption,
        max_index: i32,
        path: &Path,
        search: &str,
    ) -> Result<ResultItem, OptionSkip> {
        let parameters = trimmed_parameters(option).ok_or(OptionSkip::EmptyParameters)?;

        let resolved = template::resolve(parameters, path)?;
        let text = resolved.trim();
        if text.is_empty() {
            return Err(OptionSkip::EmptyParameters);
        }

        Ok(ResultItem::new(&option.name)
            .with_subtitle(text)
            .with_icon(self.static_icon(option, "copy"))
            .with_score(max_index - option.index)
            .with_context_data(search)
            .with_action(Action::CopyText {
                text: text.to_string(),
            }))
    }

    fn process_icon(&self, option: &OpenOption, program: &str) -> ItemIcon {
        if let Some(custom) = self.custom_icon(option) {
            return custom;
        }

        if self.try_extract_process_icons {
            if let Some(extracted) = self.process_icons.icon_for_process(program) {
                return ItemIcon::new(extracted.to_string_lossy());
            }
        }

        ItemIcon::new(self.icons.builtin("open"))
    }

    fn static_icon(&self, option: &OpenOption, fallback: &str) -> ItemIcon {
        self.custom_icon(option)
            .unwrap_or_else(|| ItemIcon::new(self.icons.builtin(fallback)))
    }

    fn custom_icon(&self, option: &OpenOption) -> Option<ItemIcon> {
        option
            .icon_path
            .as_deref()
            .filter(|reference| !reference.trim().is_empty())
            .and_then(|reference| self.icons.custom(reference))
            .map(ItemIcon::new)
    }
}

fn trimmed_parameters(option: &OpenOption) -> Option<&str> {
    option
        .parameters
        .as_deref()
        .map(str::trim)
        .filter(|parameters| !parameters.is_empty())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::tempdir;

    use crate::icons::{IconTheme, NoProcessIcons};

    use super::*;

    fn icon_set() -> IconSet {
        IconSet::new(PathBuf::from("/tmp/walker-icons"), IconTheme::Dark)
    }

    fn dispatcher<'a>(icons: &'a IconSet, process_icons: &'a dyn ProcessIconSource) -> Dispatcher<'a> {
        Dispatcher {
            icons,
            process_icons,
            try_extract_process_icons: false,
        }
    }

    fn option(kind: OptionKind, name: &str, index: i32) -> OpenOption {
        OpenOption {
            kind,
            name: name.to_string(),
            index,
            ..OpenOption::default()
        }
    }

    #[test]
    fn process_option_without_name_is_skipped() {
        let icons = icon_set();
        let dispatcher = dispatcher(&icons, &NoProcessIcons);
        let bare = option(OptionKind::Process, "Broken", 0);

        let err = dispatcher
            .build_option(&bare, 0, Path::new("/tmp"), "")
            .expect_err("missing process name must skip");
        assert!(matches!(err, OptionSkip::MissingProcessName));
    }

    #[test]
    fn process_option_without_parameters_still_launches() {
        let icons = icon_set();
        let dispatcher = dispatcher(&icons, &NoProcessIcons);
        let mut open = option(OptionKind::Process, "Terminal", 0);
        open.process_name = Some("alacritty".to_string());

        let item = dispatcher
            .build_option(&open, 0, Path::new("/tmp/project"), "query")
            .expect("parameterless process option should build");
        assert_eq!(
            item.action,
            Some(Action::Launch {
                program: "alacritty".to_string(),
                arguments: None,
            })
        );
        assert_eq!(item.subtitle.as_deref(), Some("alacritty"));
    }

    #[test]
    fn process_option_resolves_parameters_against_path() {
        let temp = tempdir().expect("create temp dir");
        let icons = icon_set();
        let dispatcher = dispatcher(&icons, &NoProcessIcons);

        let mut open = option(OptionKind::Process, "VS Code", 1);
        open.process_name = Some("code".to_string());
        open.parameters = Some("{{PATH}}".to_string());

        let item = dispatcher
            .build_option(&open, 3, temp.path(), "query")
            .expect("process option should build");
        let path_text = temp.path().to_string_lossy().to_string();
        assert_eq!(
            item.action,
            Some(Action::Launch {
                program: "code".to_string(),
                arguments: Some(path_text.clone()),
            })
        );
        assert_eq!(item.subtitle.as_deref(), Some(format!("code {path_text}").as_str()));
        assert_eq!(item.score, Some(2), "score is max index minus option index");
    }

    #[test]
    fn browser_option_requires_absolute_url() {
        let temp = tempdir().expect("create temp dir");
        let icons = icon_set();
        let dispatcher = dispatcher(&icons, &NoProcessIcons);

        let mut relative = option(OptionKind::Browser, "Open", 0);
        relative.parameters = Some("{{FOLDER}}/docs".to_string());
        let err = dispatcher
            .build_option(&relative, 0, temp.path(), "")
            .expect_err("relative destination must skip");
        assert!(matches!(err, OptionSkip::InvalidUrl(_)));

        let mut absolute = option(OptionKind::Browser, "Open", 0);
        absolute.parameters = Some("https://example.com/{{FOLDER}}".to_string());
        let item = dispatcher
            .build_option(&absolute, 0, temp.path(), "")
            .expect("absolute destination should build");
        assert!(matches!(item.action, Some(Action::OpenUrl { .. })));
    }

    #[test]
    fn clipboard_option_copies_resolved_text() {
        let icons = icon_set();
        let dispatcher = dispatcher(&icons, &NoProcessIcons);

        let mut copy = option(OptionKind::Clipboard, "Copy path", 3);
        copy.parameters = Some("{{PATH}}".to_string());

        let item = dispatcher
            .build_option(&copy, 3, Path::new("/root/teamA/app1"), "app1")
            .expect("clipboard option should build");
        assert_eq!(
            item.action,
            Some(Action::CopyText {
                text: "/root/teamA/app1".to_string(),
            })
        );
        assert_eq!(item.score, Some(0));
        assert_eq!(item.context_data.as_deref(), Some("app1"));
    }

    #[test]
    fn clipboard_option_without_parameters_is_skipped() {
        let icons = icon_set();
        let dispatcher = dispatcher(&icons, &NoProcessIcons);
        let bare = option(OptionKind::Clipboard, "Copy", 0);

        let err = dispatcher
            .build_option(&bare, 0, Path::new("/tmp"), "")
            .expect_err("empty parameters must skip");
        assert!(matches!(err, OptionSkip::EmptyParameters));
    }

    #[test]
    fn unsupported_kind_is_skipped() {
        let icons = icon_set();
        let dispatcher = dispatcher(&icons, &NoProcessIcons);
        let unknown = option(OptionKind::Unsupported, "Mystery", 0);

        let err = dispatcher
            .build_option(&unknown, 0, Path::new("/tmp"), "")
            .expect_err("unsupported kind must skip");
        assert!(matches!(err, OptionSkip::UnsupportedKind));
    }

    #[test]
    fn dispatch_orders_by_index_and_drops_failures() {
        let temp = tempdir().expect("create temp dir");
        let icons = icon_set();
        let dispatcher = dispatcher(&icons, &NoProcessIcons);

        let mut copy = option(OptionKind::Clipboard, "Copy path", 2);
        copy.parameters = Some("{{PATH}}".to_string());
        let mut editor = option(OptionKind::Process, "Editor", 0);
        editor.process_name = Some("code".to_string());
        editor.parameters = Some("{{PATH}}".to_string());
        let mut broken = option(OptionKind::Browser, "Broken", 1);
        broken.parameters = Some("{{FILE:*.does-not-exist}}".to_string());

        let items = dispatcher.dispatch(&[copy, editor, broken], temp.path(), "query");
        let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["Editor", "Copy path"]);
        assert_eq!(items[0].score, Some(2));
        assert_eq!(items[1].score, Some(0));
    }

    #[test]
    fn missing_file_template_drops_only_that_option() {
        let temp = tempdir().expect("create temp dir");
        let icons = icon_set();
        let dispatcher = dispatcher(&icons, &NoProcessIcons);

        let mut solution = option(OptionKind::Process, "Open solution", 0);
        solution.process_name = Some("devenv".to_string());
        solution.parameters = Some("{{FILE:*.sln}}".to_string());

        let err = dispatcher
            .build_option(&solution, 0, temp.path(), "")
            .expect_err("unresolved template must skip");
        assert!(matches!(
            err,
            OptionSkip::Unresolved(crate::error::ResolveError::NoFileMatch { .. })
        ));

        fs::write(temp.path().join("app.sln"), "").expect("write solution file");
        dispatcher
            .build_option(&solution, 0, temp.path(), "")
            .expect("option should build once the file exists");
    }

    struct FixedIcon(PathBuf);

    impl ProcessIconSource for FixedIcon {
        fn icon_for_process(&self, _process_name: &str) -> Option<PathBuf> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn process_icon_falls_back_from_custom_to_extracted_to_builtin() {
        let icons = icon_set();
        let extracted = FixedIcon(PathBuf::from("/cache/code.png"));

        let mut open = option(OptionKind::Process, "VS Code", 0);
        open.process_name = Some("code".to_string());

        // Extraction disabled: built-in icon.
        let plain = dispatcher(&icons, &NoProcessIcons)
            .build_option(&open, 0, Path::new("/tmp"), "")
            .expect("option should build");
        assert_eq!(
            plain.icon.as_ref().map(|icon| icon.path.as_str()),
            Some("images/walker.open.dark.png")
        );

        // Extraction enabled: extracted icon wins over the built-in.
        let with_extraction = Dispatcher {
            icons: &icons,
            process_icons: &extracted,
            try_extract_process_icons: true,
        };
        let item = with_extraction
            .build_option(&open, 0, Path::new("/tmp"), "")
            .expect("option should build");
        assert_eq!(
            item.icon.as_ref().map(|icon| icon.path.as_str()),
            Some("/cache/code.png")
        );

        // A resolvable custom icon wins over extraction.
        let temp = tempdir().expect("create temp dir");
        let custom_path = temp.path().join("custom.png");
        fs::write(&custom_path, "").expect("write icon file");
        let mut with_custom = open.clone();
        with_custom.icon_path = Some(custom_path.to_string_lossy().to_string());

        let item = with_extraction
            .build_option(&with_custom, 0, Path::new("/tmp"), "")
            .expect("option should build");
        assert_eq!(
            item.icon.as_ref().map(|icon| icon.path.as_str()),
            Some(custom_path.to_string_lossy().as_ref())
        );
    }
}
