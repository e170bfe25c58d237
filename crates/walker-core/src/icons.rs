use std::path::{Path, PathBuf};

/// Host theme, used only to pick the light or dark variant of the built-in
/// icons. Defaults to dark, matching the host default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconTheme {
    Light,
    #[default]
    Dark,
}

impl IconTheme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Best-effort source of icons extracted from executables. Extraction is
/// host glue; the default source extracts nothing and every caller falls
/// through to the built-in icon.
pub trait ProcessIconSource {
    fn icon_for_process(&self, process_name: &str) -> Option<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoProcessIcons;

impl ProcessIconSource for NoProcessIcons {
    fn icon_for_process(&self, _process_name: &str) -> Option<PathBuf> {
        None
    }
}

/// Resolves icon references for result items: user-provided custom icons
/// from the icon folder, or themed built-ins shipped with the plugin.
#[derive(Debug, Clone)]
pub struct IconSet {
    icon_dir: PathBuf,
    theme: IconTheme,
}

impl IconSet {
    pub fn new(icon_dir: PathBuf, theme: IconTheme) -> Self {
        Self { icon_dir, theme }
    }

    pub fn set_theme(&mut self, theme: IconTheme) {
        self.theme = theme;
    }

    pub fn icon_dir(&self) -> &Path {
        &self.icon_dir
    }

    /// Reference to a built-in icon in the current theme variant.
    pub fn builtin(&self, name: &str) -> String {
        format!("images/walker.{name}.{}.png", self.theme.suffix())
    }

    /// Resolve a user-configured icon reference: an absolute path is used
    /// as-is when it exists; otherwise the reference is tried inside the
    /// icon folder, bare and with a `.png` suffix. `None` means the caller
    /// falls back to a built-in; lookup failures never propagate.
    pub fn custom(&self, reference: &str) -> Option<String> {
        let raw = Path::new(reference);
        if raw.is_absolute() {
            return raw.exists().then(|| reference.to_string());
        }

        let joined = self.icon_dir.join(raw);
        if joined.exists() {
            return Some(joined.to_string_lossy().to_string());
        }

        let with_suffix = self.icon_dir.join(format!("{reference}.png"));
        with_suffix
            .exists()
            .then(|| with_suffix.to_string_lossy().to_string())
    }
}
