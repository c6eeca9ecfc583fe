use serde::{Deserialize, Serialize};
use std::fmt;

/// One news item as served by `/api/news`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_to_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Article {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            url: None,
            url_to_image: None,
            category: None,
        }
    }

    /// Identity used for favorite/read-later membership.
    ///
    /// Older payloads carry no `id`, so the url stands in for it, and the
    /// title as a last resort.
    pub fn key(&self) -> &str {
        non_empty(self.id.as_deref())
            .or_else(|| non_empty(self.url.as_deref()))
            .unwrap_or(&self.title)
    }

    /// External link, if it points anywhere.
    pub fn link(&self) -> Option<&str> {
        non_empty(self.url.as_deref()).filter(|u| *u != "#")
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&query))
                .unwrap_or(false)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Reduced record appended to `history` when a card is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<&Article> for HistoryEntry {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            description: article.description.clone(),
            category: article.category.clone(),
        }
    }
}

/// Named storage slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Favorites,
    ReadLater,
    History,
}

impl Collection {
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Favorites => "favorites",
            Collection::ReadLater => "readLaters",
            Collection::History => "history",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Logical page, selected the way the `body` id did in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Favorites,
    ReadLater,
}

impl Page {
    pub fn body_id(&self) -> &'static str {
        match self {
            Page::Home => "page-home",
            Page::Favorites => "page-favorites",
            Page::ReadLater => "page-read-later",
        }
    }

    /// Collection rendered by a saved-items page.
    pub fn collection(&self) -> Option<Collection> {
        match self {
            Page::Home => None,
            Page::Favorites => Some(Collection::Favorites),
            Page::ReadLater => Some(Collection::ReadLater),
        }
    }
}

/// Rendering strategy: paginated desktop or incrementally loaded mobile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Pc,
    Sp,
}

impl Mode {
    pub fn for_width(width: u32, breakpoint: u32) -> Self {
        if width >= breakpoint {
            Mode::Pc
        } else {
            Mode::Sp
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Label of the toggle control while this theme is active.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Theme::Light => "ダークテーマ",
            Theme::Dark => "ライトテーマ",
        }
    }
}
