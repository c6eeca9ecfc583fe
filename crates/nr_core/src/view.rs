//! View state and its transitions.
//!
//! Every user action, timer and fetch completion arrives as an [`Event`].
//! [`ViewState::handle`] applies it and returns the [`Effect`]s the caller has
//! to carry out: display mutations, timers, persistence and link opening.
//! Nothing here touches storage, the network or the clock, so each transition
//! can be tested by feeding events in order.
//!
//! Timers carry the epoch they were scheduled in. Entering a mode bumps the
//! epoch, so a fade or load delay started under the previous mode is ignored
//! when it fires.

use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use crate::card::{self, Card, Controls};
use crate::paging::{self, PagerState};
use crate::surface::SurfaceOp;
use crate::types::{Article, Collection, Mode, Page, Theme};

pub const NO_ARTICLES_MESSAGE: &str = "記事がありません。";
pub const NO_FAVORITES_MESSAGE: &str = "お気に入りはまだありません。";
pub const NO_READ_LATER_MESSAGE: &str = "後で見る記事はまだありません。";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// Viewport width at and above which the paginated mode is used
    pub breakpoint: u32,
    pub page_size: usize,
    pub load_size: usize,
    /// Distance from the bottom that triggers the next incremental load
    pub scroll_threshold: u32,
    pub fade_delay: Duration,
    pub load_delay: Duration,
    pub badge_duration: Duration,
    /// Shared in place of articles without a url
    pub home_url: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            breakpoint: 768,
            page_size: paging::PAGE_SIZE,
            load_size: paging::LOAD_SIZE,
            scroll_threshold: 200,
            fade_delay: Duration::from_millis(300),
            load_delay: Duration::from_millis(500),
            badge_duration: Duration::from_secs(4),
            home_url: "http://localhost:5000/".to_string(),
        }
    }
}

/// Keys saved in the favorite and read-later collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Membership {
    pub favorites: HashSet<String>,
    pub read_later: HashSet<String>,
}

impl Membership {
    pub fn contains(&self, collection: Collection, key: &str) -> bool {
        match collection {
            Collection::Favorites => self.favorites.contains(key),
            Collection::ReadLater => self.read_later.contains(key),
            Collection::History => false,
        }
    }

    pub fn set(&mut self, collection: Collection, key: &str, saved: bool) {
        let set = match collection {
            Collection::Favorites => &mut self.favorites,
            Collection::ReadLater => &mut self.read_later,
            Collection::History => return,
        };
        if saved {
            set.insert(key.to_string());
        } else {
            set.remove(key);
        }
    }
}

/// Scroll position in the same units as the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub offset: u32,
    pub viewport: u32,
    pub content: u32,
}

impl ScrollMetrics {
    pub fn near_bottom(&self, threshold: u32) -> bool {
        self.offset.saturating_add(self.viewport) >= self.content.saturating_sub(threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The article list for the current page is available
    Loaded(Vec<Article>),
    /// Loading failed; carries the text to show instead of the list
    LoadFailed(String),
    Resized { width: u32 },
    NextPage,
    PrevPage,
    TransitionElapsed { epoch: u64 },
    Scrolled(ScrollMetrics),
    LoadDelayElapsed { epoch: u64 },
    /// The card body (not one of its controls) was activated
    Activate(String),
    ToggleSaved(Collection, String),
    /// Persistence finished a toggle
    Saved {
        collection: Collection,
        key: String,
        saved: bool,
    },
    /// Removal control on a saved-items card
    Remove(String),
    ImageFailed(String),
    Search(String),
    ToggleTheme,
    Share(String),
    Summarize(String),
    BadgeExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Surface(SurfaceOp),
    /// Deliver `event` back after `after` has elapsed
    Schedule { after: Duration, event: Event },
    /// Open a link in a new browsing context
    Open(String),
    Toggle {
        collection: Collection,
        article: Article,
    },
    Remove {
        collection: Collection,
        article: Article,
    },
    RecordHistory(Article),
}

impl From<SurfaceOp> for Effect {
    fn from(op: SurfaceOp) -> Self {
        Effect::Surface(op)
    }
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub page: Page,
    pub mode: Option<Mode>,
    pub width: u32,
    pub articles: Vec<Article>,
    /// `articles` narrowed by the search query
    pub visible: Vec<Article>,
    pub loaded: bool,
    pub current_page: usize,
    pub loaded_count: usize,
    pub is_fetching: bool,
    /// Target page of a fade in progress
    pub transition: Option<usize>,
    pub epoch: u64,
    pub query: String,
    pub theme: Theme,
    pub badge: bool,
    pub membership: Membership,
    config: ViewConfig,
}

impl ViewState {
    pub fn new(page: Page, membership: Membership, config: ViewConfig) -> Self {
        Self {
            page,
            mode: None,
            width: 0,
            articles: Vec::new(),
            visible: Vec::new(),
            loaded: false,
            current_page: 1,
            loaded_count: 0,
            is_fetching: false,
            transition: None,
            epoch: 0,
            query: String::new(),
            theme: Theme::default(),
            badge: false,
            membership,
            config,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn article(&self, key: &str) -> Option<&Article> {
        self.visible
            .iter()
            .chain(self.articles.iter())
            .find(|a| a.key() == key)
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Loaded(articles) => self.on_loaded(articles),
            Event::LoadFailed(message) => {
                self.loaded = false;
                vec![
                    SurfaceOp::Clear.into(),
                    SurfaceOp::HidePager.into(),
                    SurfaceOp::ShowMessage(message).into(),
                ]
            }
            Event::Resized { width } => self.on_resized(width),
            Event::NextPage => self.request_page(self.current_page + 1),
            Event::PrevPage => self.request_page(self.current_page.saturating_sub(1)),
            Event::TransitionElapsed { epoch } => self.finish_transition(epoch),
            Event::Scrolled(metrics) => self.on_scrolled(metrics),
            Event::LoadDelayElapsed { epoch } => self.finish_load(epoch),
            Event::Activate(key) => self.on_activate(&key),
            // saved pages only offer removal
            Event::ToggleSaved(..) if self.page.collection().is_some() => Vec::new(),
            Event::ToggleSaved(collection, key) => match self.article(&key) {
                Some(article) if collection != Collection::History => vec![Effect::Toggle {
                    collection,
                    article: article.clone(),
                }],
                _ => Vec::new(),
            },
            Event::Saved {
                collection,
                key,
                saved,
            } => {
                self.membership.set(collection, &key, saved);
                vec![SurfaceOp::SetSaved {
                    key,
                    collection,
                    saved,
                }
                .into()]
            }
            Event::Remove(key) => self.on_remove(&key),
            Event::ImageFailed(key) => vec![SurfaceOp::HideImage(key).into()],
            Event::Search(query) => self.on_search(query),
            Event::ToggleTheme => {
                self.theme = self.theme.toggled();
                vec![SurfaceOp::SetTheme(self.theme).into()]
            }
            Event::Share(key) => match self.article(&key) {
                Some(article) => vec![Effect::Open(card::share_url(
                    article,
                    &self.config.home_url,
                ))],
                None => Vec::new(),
            },
            Event::Summarize(key) => match self.article(&key) {
                Some(article) => vec![SurfaceOp::ShowSummary {
                    text: card::summarize(article),
                    key,
                }
                .into()],
                None => Vec::new(),
            },
            Event::BadgeExpired => {
                self.badge = false;
                vec![SurfaceOp::SetBadge(false).into()]
            }
        }
    }

    fn on_loaded(&mut self, articles: Vec<Article>) -> Vec<Effect> {
        self.articles = articles;
        self.visible = self.filtered();
        self.loaded = true;

        let mut effects = Vec::new();
        if self.page == Page::Home {
            self.badge = true;
            effects.push(SurfaceOp::SetBadge(true).into());
            effects.push(Effect::Schedule {
                after: self.config.badge_duration,
                event: Event::BadgeExpired,
            });
            let mode = self
                .mode
                .unwrap_or_else(|| Mode::for_width(self.width, self.config.breakpoint));
            effects.extend(self.enter_mode(mode));
        } else {
            effects.extend(self.render_saved());
        }
        effects
    }

    fn on_resized(&mut self, width: u32) -> Vec<Effect> {
        self.width = width;
        if self.page != Page::Home {
            return Vec::new();
        }
        let desired = Mode::for_width(width, self.config.breakpoint);
        if !self.loaded {
            // rendered once the articles arrive
            self.mode = Some(desired);
            return Vec::new();
        }
        if self.mode == Some(desired) {
            return Vec::new();
        }
        self.enter_mode(desired)
    }

    fn enter_mode(&mut self, mode: Mode) -> Vec<Effect> {
        self.mode = Some(mode);
        self.epoch += 1;
        self.transition = None;
        self.is_fetching = false;
        self.current_page = 1;
        self.loaded_count = 0;

        let mut effects: Vec<Effect> = vec![SurfaceOp::Clear.into(), SurfaceOp::DetachScroll.into()];
        if self.visible.is_empty() {
            // a fade or load may still be showing from the previous render
            effects.push(SurfaceOp::SetLoader(false).into());
            effects.push(SurfaceOp::SetHidden(false).into());
            effects.push(SurfaceOp::ShowMessage(NO_ARTICLES_MESSAGE.to_string()).into());
            return effects;
        }

        match mode {
            Mode::Pc => {
                effects.push(SurfaceOp::SetLoader(false).into());
                effects.push(SurfaceOp::SetHidden(false).into());
                effects.extend(self.render_page(1));
            }
            Mode::Sp => {
                effects.push(SurfaceOp::HidePager.into());
                effects.push(SurfaceOp::SetHidden(false).into());
                effects.push(SurfaceOp::AttachScroll.into());
                effects.extend(self.append_batch());
                effects.push(SurfaceOp::SetLoader(false).into());
            }
        }
        effects
    }

    fn feed_cards(&self, range: std::ops::Range<usize>) -> Vec<Card> {
        self.visible[range]
            .iter()
            .map(|article| {
                let key = article.key();
                Card::build(
                    article,
                    Controls::Toggles {
                        favorite: self.membership.contains(Collection::Favorites, key),
                        read_later: self.membership.contains(Collection::ReadLater, key),
                    },
                )
            })
            .collect()
    }

    fn pages(&self) -> usize {
        paging::page_count(self.visible.len(), self.config.page_size)
    }

    fn render_page(&mut self, page: usize) -> Vec<Effect> {
        self.current_page = page;
        let range = paging::page_range(page, self.config.page_size, self.visible.len());
        vec![
            SurfaceOp::Clear.into(),
            SurfaceOp::Append(self.feed_cards(range)).into(),
            SurfaceOp::SetPager(PagerState::new(page, self.pages())).into(),
        ]
    }

    fn request_page(&mut self, target: usize) -> Vec<Effect> {
        if self.page != Page::Home || self.mode != Some(Mode::Pc) || !self.loaded {
            return Vec::new();
        }
        if let Some(pending) = self.transition {
            debug!(pending, target, "Page change rejected while a transition is running");
            return Vec::new();
        }
        if target < 1 || target > self.pages() || target == self.current_page {
            return Vec::new();
        }
        self.transition = Some(target);
        vec![
            SurfaceOp::SetHidden(true).into(),
            Effect::Schedule {
                after: self.config.fade_delay,
                event: Event::TransitionElapsed { epoch: self.epoch },
            },
        ]
    }

    fn finish_transition(&mut self, epoch: u64) -> Vec<Effect> {
        if epoch != self.epoch {
            return Vec::new();
        }
        let Some(target) = self.transition.take() else {
            return Vec::new();
        };
        let mut effects = self.render_page(target);
        effects.push(SurfaceOp::SetHidden(false).into());
        effects
    }

    fn append_batch(&mut self) -> Vec<Effect> {
        let range = paging::next_batch(self.loaded_count, self.config.load_size, self.visible.len());
        if range.is_empty() {
            return Vec::new();
        }
        self.loaded_count = range.end;
        vec![SurfaceOp::Append(self.feed_cards(range)).into()]
    }

    fn on_scrolled(&mut self, metrics: ScrollMetrics) -> Vec<Effect> {
        if self.page != Page::Home || self.mode != Some(Mode::Sp) || !self.loaded {
            return Vec::new();
        }
        if !metrics.near_bottom(self.config.scroll_threshold) || self.is_fetching {
            return Vec::new();
        }
        if self.loaded_count >= self.visible.len() {
            return vec![SurfaceOp::SetLoader(false).into()];
        }
        self.is_fetching = true;
        vec![
            SurfaceOp::SetLoader(true).into(),
            Effect::Schedule {
                after: self.config.load_delay,
                event: Event::LoadDelayElapsed { epoch: self.epoch },
            },
        ]
    }

    fn finish_load(&mut self, epoch: u64) -> Vec<Effect> {
        if epoch != self.epoch || !self.is_fetching {
            return Vec::new();
        }
        let mut effects = self.append_batch();
        self.is_fetching = false;
        effects.push(SurfaceOp::SetLoader(false).into());
        effects
    }

    fn on_activate(&self, key: &str) -> Vec<Effect> {
        let Some(article) = self.article(key) else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        if let Some(link) = article.link() {
            effects.push(Effect::Open(link.to_string()));
        }
        if article.category.as_deref().is_some_and(|c| !c.is_empty()) {
            effects.push(Effect::RecordHistory(article.clone()));
        }
        effects
    }

    fn render_saved(&mut self) -> Vec<Effect> {
        let Some(collection) = self.page.collection() else {
            return Vec::new();
        };
        if self.visible.is_empty() {
            return vec![SurfaceOp::ShowMessage(self.empty_message().to_string()).into()];
        }
        let cards = self
            .visible
            .iter()
            .map(|a| Card::build(a, Controls::Remove(collection)))
            .collect();
        vec![SurfaceOp::Clear.into(), SurfaceOp::Append(cards).into()]
    }

    fn on_remove(&mut self, key: &str) -> Vec<Effect> {
        let Some(collection) = self.page.collection() else {
            return Vec::new();
        };
        let Some(article) = self.article(key).cloned() else {
            return Vec::new();
        };
        self.articles.retain(|a| a.key() != key);
        self.visible.retain(|a| a.key() != key);
        self.membership.set(collection, key, false);

        let mut effects = vec![
            Effect::Remove {
                collection,
                article,
            },
            SurfaceOp::RemoveCard(key.to_string()).into(),
        ];
        if self.visible.is_empty() {
            effects.push(SurfaceOp::ShowMessage(self.empty_message().to_string()).into());
        }
        effects
    }

    fn on_search(&mut self, query: String) -> Vec<Effect> {
        self.query = query;
        self.visible = self.filtered();
        if !self.loaded {
            return Vec::new();
        }
        match self.page {
            Page::Home => {
                let mode = self
                    .mode
                    .unwrap_or_else(|| Mode::for_width(self.width, self.config.breakpoint));
                self.enter_mode(mode)
            }
            _ => self.render_saved(),
        }
    }

    fn filtered(&self) -> Vec<Article> {
        self.articles
            .iter()
            .filter(|a| a.matches(&self.query))
            .cloned()
            .collect()
    }

    fn empty_message(&self) -> &'static str {
        match self.page {
            Page::Home => NO_ARTICLES_MESSAGE,
            Page::Favorites => NO_FAVORITES_MESSAGE,
            Page::ReadLater => NO_READ_LATER_MESSAGE,
        }
    }
}

/// Functional form of [`ViewState::handle`].
pub fn update(mut state: ViewState, event: Event) -> (ViewState, Vec<Effect>) {
    let effects = state.handle(event);
    (state, effects)
}
