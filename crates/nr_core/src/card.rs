use crate::types::{Article, Collection};

pub const DESCRIPTION_FALLBACK: &str = "説明はありません。";
pub const SUMMARY_UNAVAILABLE: &str = "要約できません";
const SUMMARY_CHARS: usize = 50;
const SHARE_ENDPOINT: &str = "https://twitter.com/intent/tweet";

/// Action controls attached to a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Controls {
    /// Feed cards: favorite and read-later toggles with their saved state
    Toggles { favorite: bool, read_later: bool },
    /// Saved-items cards: a single removal control for that collection
    Remove(Collection),
}

/// Render-ready view of one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub key: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub controls: Controls,
}

impl Card {
    pub fn build(article: &Article, controls: Controls) -> Self {
        Self {
            key: article.key().to_string(),
            title: article.title.clone(),
            description: article
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(DESCRIPTION_FALLBACK)
                .to_string(),
            image: article.url_to_image.clone().filter(|u| !u.is_empty()),
            link: article.link().map(str::to_string),
            controls,
        }
    }
}

/// Short teaser built from the first characters of the description.
pub fn summarize(article: &Article) -> String {
    match article.description.as_deref().filter(|d| !d.is_empty()) {
        Some(description) => {
            let head: String = description.chars().take(SUMMARY_CHARS).collect();
            format!("{}...", head)
        }
        None => SUMMARY_UNAVAILABLE.to_string(),
    }
}

/// Tweet intent link for `article`; `fallback` is used when it has no url.
pub fn share_url(article: &Article, fallback: &str) -> String {
    let target = article.link().unwrap_or(fallback);
    format!(
        "{}?text={}&url={}",
        SHARE_ENDPOINT,
        urlencoding::encode(&article.title),
        urlencoding::encode(target)
    )
}
