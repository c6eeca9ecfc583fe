use async_trait::async_trait;
use nr_app::{preferred_category, ManualScheduler, RecordingOpener, Session};
use nr_core::view::{NO_ARTICLES_MESSAGE, NO_FAVORITES_MESSAGE};
use nr_core::{
    Article, ArticleSource, Collection, CollectionRepository, Controls, Error, Event,
    KeyValueStore, Page, RecordingSurface, Result, SurfaceOp, ViewConfig,
};
use nr_storage::InMemoryStorage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct FakeSource {
    articles: Vec<Article>,
    failure: Option<(String, u16)>,
    requested: Mutex<Vec<Option<String>>>,
}

impl FakeSource {
    fn with(articles: Vec<Article>) -> Arc<Self> {
        Arc::new(Self {
            articles,
            failure: None,
            requested: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str, status: u16) -> Arc<Self> {
        Arc::new(Self {
            articles: Vec::new(),
            failure: Some((message.to_string(), status)),
            requested: Mutex::new(Vec::new()),
        })
    }

    fn requested(&self) -> Vec<Option<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch_articles(&self, category: Option<&str>) -> Result<Vec<Article>> {
        self.requested
            .lock()
            .unwrap()
            .push(category.map(str::to_string));
        match &self.failure {
            Some((message, status)) => Err(Error::fetch(message.clone(), Some(*status))),
            None => Ok(self.articles.clone()),
        }
    }
}

/// Memory store whose writes can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryStorage,
    fail_writes: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage("disk full".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key).await
    }
}

struct Harness {
    store: InMemoryStorage,
    scheduler: Arc<ManualScheduler>,
    opener: Arc<RecordingOpener>,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: InMemoryStorage::new(),
            scheduler: Arc::new(ManualScheduler::new()),
            opener: Arc::new(RecordingOpener::new()),
        }
    }

    fn repo(&self) -> CollectionRepository {
        CollectionRepository::new(Arc::new(self.store.clone()))
    }

    async fn session(&self, page: Page, source: Arc<FakeSource>) -> Session<RecordingSurface> {
        Session::new(
            page,
            self.repo(),
            source,
            self.scheduler.clone(),
            self.opener.clone(),
            RecordingSurface::new(),
            ViewConfig::default(),
        )
        .await
        .unwrap()
    }

    /// Fire every pending timer, including ones scheduled while firing.
    async fn settle(&self, session: &mut Session<RecordingSurface>) {
        loop {
            let pending = self.scheduler.take();
            if pending.is_empty() {
                break;
            }
            for (_, event) in pending {
                session.dispatch(event).await.unwrap();
            }
        }
    }
}

fn article(id: usize, category: Option<&str>) -> Article {
    let mut a = Article::new(format!("Article {}", id));
    a.id = Some(format!("https://news.example/{}", id));
    a.url = a.id.clone();
    a.description = Some(format!("Description {}", id));
    a.category = category.map(str::to_string);
    a
}

fn articles(n: usize) -> Vec<Article> {
    (0..n).map(|i| article(i, Some("tech"))).collect()
}

#[tokio::test]
async fn recommendation_from_history_drives_fetch() {
    let harness = Harness::new();
    let repo = harness.repo();
    repo.record_history(&article(1, Some("tech"))).await.unwrap();
    repo.record_history(&article(2, Some("tech"))).await.unwrap();
    repo.record_history(&article(3, Some("sports"))).await.unwrap();

    let source = FakeSource::with(articles(3));
    let mut session = harness.session(Page::Home, source.clone()).await;
    session.start(1024).await.unwrap();

    assert_eq!(source.requested(), vec![Some("tech".to_string())]);
}

#[tokio::test]
async fn empty_history_uses_default_category_or_none() {
    let harness = Harness::new();
    let source = FakeSource::with(articles(1));
    let mut session = harness.session(Page::Home, source.clone()).await;
    session.start(1024).await.unwrap();

    let mut with_default = harness
        .session(Page::Home, source.clone())
        .await
        .with_default_category(Some("automotive".to_string()));
    with_default.start(1024).await.unwrap();

    assert_eq!(
        source.requested(),
        vec![None, Some("automotive".to_string())]
    );
}

#[tokio::test]
async fn server_error_is_rendered_as_message() {
    let harness = Harness::new();
    let mut session = harness
        .session(Page::Home, FakeSource::failing("server down", 500))
        .await;
    session.start(1024).await.unwrap();

    let model = &session.surface().model;
    assert!(model.cards.is_empty());
    assert_eq!(model.message.as_deref(), Some("エラー: server down"));
}

#[tokio::test]
async fn empty_result_shows_no_articles() {
    let harness = Harness::new();
    let mut session = harness.session(Page::Home, FakeSource::with(Vec::new())).await;
    session.start(1024).await.unwrap();

    let surface = session.surface();
    assert_eq!(surface.model.message.as_deref(), Some(NO_ARTICLES_MESSAGE));
    assert!(!surface
        .ops
        .iter()
        .any(|op| matches!(op, SurfaceOp::SetPager(_) | SurfaceOp::HidePager)));
}

#[tokio::test]
async fn desktop_paging_walks_every_page() {
    let harness = Harness::new();
    let mut session = harness.session(Page::Home, FakeSource::with(articles(7))).await;
    session.start(1024).await.unwrap();
    assert_eq!(session.surface().titles(), vec!["Article 0", "Article 1", "Article 2"]);

    let mut seen: Vec<String> = session
        .surface()
        .titles()
        .iter()
        .map(|t| t.to_string())
        .collect();
    for _ in 0..2 {
        session.dispatch(Event::NextPage).await.unwrap();
        // a second click during the fade is dropped
        session.dispatch(Event::NextPage).await.unwrap();
        assert!(session.surface().model.hidden);
        harness.settle(&mut session).await;
        assert!(!session.surface().model.hidden);
        seen.extend(session.surface().titles().iter().map(|t| t.to_string()));
    }

    let expected: Vec<String> = (0..7).map(|i| format!("Article {}", i)).collect();
    assert_eq!(seen, expected);
    let pager = session.surface().model.pager.unwrap();
    assert_eq!((pager.page, pager.pages), (3, 3));
    assert!(pager.prev_enabled);
    assert!(!pager.next_enabled);

    session.dispatch(Event::NextPage).await.unwrap();
    assert!(harness.scheduler.take().is_empty());
}

#[tokio::test]
async fn mobile_scroll_loads_in_batches() {
    let harness = Harness::new();
    let mut session = harness.session(Page::Home, FakeSource::with(articles(12))).await;
    session.start(400).await.unwrap();
    assert_eq!(session.surface().model.cards.len(), 5);
    assert!(session.surface().model.scroll_attached);
    assert_eq!(session.surface().model.pager, None);

    let bottom = nr_core::ScrollMetrics {
        offset: 1000,
        viewport: 600,
        content: 1700,
    };
    session.dispatch(Event::Scrolled(bottom)).await.unwrap();
    assert!(session.surface().model.loader);
    harness.settle(&mut session).await;
    assert!(!session.surface().model.loader);
    assert_eq!(session.surface().model.cards.len(), 10);

    session.dispatch(Event::Scrolled(bottom)).await.unwrap();
    harness.settle(&mut session).await;
    assert_eq!(session.surface().model.cards.len(), 12);

    session.dispatch(Event::Scrolled(bottom)).await.unwrap();
    assert!(harness.scheduler.take().is_empty());
    assert!(session.surface().model.scroll_attached);
}

#[tokio::test]
async fn resize_without_crossing_breakpoint_touches_nothing() {
    let harness = Harness::new();
    let mut session = harness.session(Page::Home, FakeSource::with(articles(4))).await;
    session.start(1024).await.unwrap();
    session.surface_mut().take_ops();

    session.dispatch(Event::Resized { width: 1920 }).await.unwrap();
    assert!(session.surface().ops.is_empty());

    session.dispatch(Event::Resized { width: 320 }).await.unwrap();
    assert_eq!(session.surface().ops[0], SurfaceOp::Clear);
    assert_eq!(session.surface().model.cards.len(), 4);
}

#[tokio::test]
async fn favorite_toggle_round_trips_through_storage() {
    let harness = Harness::new();
    let mut session = harness.session(Page::Home, FakeSource::with(articles(3))).await;
    session.start(1024).await.unwrap();
    let key = "https://news.example/1".to_string();

    session
        .dispatch(Event::ToggleSaved(Collection::Favorites, key.clone()))
        .await
        .unwrap();
    assert_eq!(
        session.surface().model.card(&key).unwrap().controls,
        Controls::Toggles {
            favorite: true,
            read_later: false
        }
    );
    let raw = harness.store.get("favorites").await.unwrap().unwrap();
    assert!(raw.contains("Article 1"));

    session
        .dispatch(Event::ToggleSaved(Collection::Favorites, key.clone()))
        .await
        .unwrap();
    assert_eq!(harness.store.get("favorites").await.unwrap().as_deref(), Some("[]"));
    assert!(!session.state().membership.contains(Collection::Favorites, &key));
}

#[tokio::test]
async fn activating_a_card_opens_it_and_records_history() {
    let harness = Harness::new();
    let mut list = articles(2);
    list[1].category = None;
    let mut session = harness.session(Page::Home, FakeSource::with(list)).await;
    session.start(1024).await.unwrap();

    session
        .dispatch(Event::Activate("https://news.example/0".to_string()))
        .await
        .unwrap();
    session
        .dispatch(Event::Activate("https://news.example/1".to_string()))
        .await
        .unwrap();

    assert_eq!(
        harness.opener.opened(),
        vec!["https://news.example/0", "https://news.example/1"]
    );
    let history = harness.repo().history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title, "Article 0");
}

#[tokio::test]
async fn favorites_page_lists_and_removes_saved_items() {
    let harness = Harness::new();
    let repo = harness.repo();
    repo.toggle(Collection::Favorites, &article(1, None)).await.unwrap();
    repo.toggle(Collection::Favorites, &article(2, None)).await.unwrap();

    let source = FakeSource::with(articles(5));
    let mut session = harness.session(Page::Favorites, source.clone()).await;
    session.start(1024).await.unwrap();
    assert!(source.requested().is_empty());
    assert_eq!(session.surface().titles(), vec!["Article 2", "Article 1"]);

    session
        .dispatch(Event::Remove("https://news.example/2".to_string()))
        .await
        .unwrap();
    assert_eq!(session.surface().titles(), vec!["Article 1"]);
    assert_eq!(repo.articles(Collection::Favorites).await.unwrap().len(), 1);

    session
        .dispatch(Event::Remove("https://news.example/1".to_string()))
        .await
        .unwrap();
    assert_eq!(session.surface().model.message.as_deref(), Some(NO_FAVORITES_MESSAGE));
    assert!(repo.articles(Collection::Favorites).await.unwrap().is_empty());
}

#[tokio::test]
async fn badge_expires_after_its_timer() {
    let harness = Harness::new();
    let mut session = harness.session(Page::Home, FakeSource::with(articles(1))).await;
    session.start(1024).await.unwrap();
    assert!(session.surface().model.badge);

    harness.settle(&mut session).await;
    assert!(!session.surface().model.badge);
}

#[tokio::test]
async fn saved_page_ignores_toggle_keys() {
    let harness = Harness::new();
    let repo = harness.repo();
    repo.toggle(Collection::Favorites, &article(1, None)).await.unwrap();

    let mut session = harness.session(Page::Favorites, FakeSource::with(Vec::new())).await;
    session.start(1024).await.unwrap();
    session
        .dispatch(Event::ToggleSaved(
            Collection::Favorites,
            "https://news.example/1".to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(repo.articles(Collection::Favorites).await.unwrap().len(), 1);
    assert_eq!(session.surface().titles(), vec!["Article 1"]);
}

#[tokio::test]
async fn storage_write_failures_keep_session_consistent() {
    let harness = Harness::new();
    let store = Arc::new(FlakyStore::default());
    let repo = CollectionRepository::new(store.clone());
    repo.toggle(Collection::Favorites, &article(1, None)).await.unwrap();
    repo.toggle(Collection::Favorites, &article(2, None)).await.unwrap();

    let mut session = Session::new(
        Page::Favorites,
        repo.clone(),
        FakeSource::with(Vec::new()),
        harness.scheduler.clone(),
        harness.opener.clone(),
        RecordingSurface::new(),
        ViewConfig::default(),
    )
    .await
    .unwrap();
    session.start(1024).await.unwrap();

    store.fail_writes.store(true, Ordering::SeqCst);
    session
        .dispatch(Event::Remove("https://news.example/2".to_string()))
        .await
        .unwrap();
    assert_eq!(session.surface().titles(), vec!["Article 1"]);
    assert_eq!(session.state().visible.len(), 1);

    // the session keeps handling events after the failed write
    session
        .dispatch(Event::Remove("https://news.example/1".to_string()))
        .await
        .unwrap();
    assert_eq!(session.surface().model.message.as_deref(), Some(NO_FAVORITES_MESSAGE));
    assert_eq!(repo.articles(Collection::Favorites).await.unwrap().len(), 2);
}

#[tokio::test]
async fn failed_toggle_leaves_card_unsaved() {
    let harness = Harness::new();
    let store = Arc::new(FlakyStore::default());
    store.fail_writes.store(true, Ordering::SeqCst);

    let mut session = Session::new(
        Page::Home,
        CollectionRepository::new(store),
        FakeSource::with(articles(1)),
        harness.scheduler.clone(),
        harness.opener.clone(),
        RecordingSurface::new(),
        ViewConfig::default(),
    )
    .await
    .unwrap();
    session.start(1024).await.unwrap();

    let key = "https://news.example/0".to_string();
    session
        .dispatch(Event::ToggleSaved(Collection::Favorites, key.clone()))
        .await
        .unwrap();
    assert_eq!(
        session.surface().model.card(&key).unwrap().controls,
        Controls::Toggles {
            favorite: false,
            read_later: false
        }
    );
    assert!(!session.state().membership.contains(Collection::Favorites, &key));
}

#[tokio::test]
async fn preferred_category_falls_back_to_default() {
    let harness = Harness::new();
    let repo = harness.repo();
    assert_eq!(preferred_category(&repo, None).await.unwrap(), None);
    assert_eq!(preferred_category(&repo, Some("")).await.unwrap(), None);
    assert_eq!(
        preferred_category(&repo, Some("automotive")).await.unwrap().as_deref(),
        Some("automotive")
    );

    repo.record_history(&article(1, Some("sports"))).await.unwrap();
    assert_eq!(
        preferred_category(&repo, Some("automotive")).await.unwrap().as_deref(),
        Some("sports")
    );
}
