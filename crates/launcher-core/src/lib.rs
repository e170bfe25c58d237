use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultList {
    pub items: Vec<ResultItem>,
}

impl ResultList {
    pub fn new(items: Vec<ResultItem>) -> Self {
        Self { items }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One entry in the list handed back to the launcher host. `score` drives the
/// host's ranking (higher first); `autocomplete` is the replacement query the
/// host applies when the entry is picked without executing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<ItemIcon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl ResultItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            icon: None,
            score: None,
            valid: None,
            autocomplete: None,
            context_data: None,
            action: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_icon(mut self, icon: ItemIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_score(mut self, score: i32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_valid(mut self, valid: bool) -> Self {
        self.valid = Some(valid);
        self
    }

    pub fn with_autocomplete(mut self, autocomplete: impl Into<String>) -> Self {
        self.autocomplete = Some(autocomplete.into());
        self
    }

    pub fn with_context_data(mut self, context_data: impl Into<String>) -> Self {
        self.context_data = Some(context_data.into());
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }
}

/// What the host does when the entry is executed. The variants are the full
/// closed set of primitives the host exposes: spawn a process, open a URL,
/// write the clipboard, or re-read the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Launch {
        program: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments: Option<String>,
    },
    OpenUrl {
        url: String,
    },
    CopyText {
        text: String,
    },
    ReloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemIcon {
    pub path: String,
}

impl ItemIcon {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}
