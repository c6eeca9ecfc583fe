use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use nr_core::{
    recommend_category, ArticleSource, Collection, CollectionRepository, Effect, Event,
    Membership, Page, Result, Surface, ViewConfig, ViewState,
};
use nr_fetch::NewsClient;
use nr_storage::create_storage;

use crate::config::AppConfig;
use crate::opener::Opener;
use crate::scheduler::Scheduler;

/// Category for a home fetch: the most viewed category in the reading
/// history, else `default`, else none.
pub async fn preferred_category(
    repo: &CollectionRepository,
    default: Option<&str>,
) -> Result<Option<String>> {
    let history = repo.history().await?;
    Ok(match recommend_category(&history) {
        Some(category) => {
            debug!(%category, entries = history.len(), "Recommended category from history");
            Some(category)
        }
        None => default.filter(|c| !c.is_empty()).map(str::to_string),
    })
}

/// One open page of the reader: view state plus the adapters its effects run on.
///
/// Events are processed one at a time to completion. Follow-up events raised
/// while running effects (a finished toggle, for instance) are queued and
/// handled before `dispatch` returns. Storage write failures are logged and
/// the remaining effects still run, so the surface keeps matching the view.
pub struct Session<S: Surface> {
    state: ViewState,
    repo: CollectionRepository,
    source: Arc<dyn ArticleSource>,
    scheduler: Arc<dyn Scheduler>,
    opener: Arc<dyn Opener>,
    surface: S,
    default_category: Option<String>,
}

impl<S: Surface> Session<S> {
    /// Build a session from already constructed adapters.
    pub async fn new(
        page: Page,
        repo: CollectionRepository,
        source: Arc<dyn ArticleSource>,
        scheduler: Arc<dyn Scheduler>,
        opener: Arc<dyn Opener>,
        surface: S,
        view: ViewConfig,
    ) -> Result<Self> {
        let membership = Membership {
            favorites: repo.membership(Collection::Favorites).await?,
            read_later: repo.membership(Collection::ReadLater).await?,
        };
        Ok(Self {
            state: ViewState::new(page, membership, view),
            repo,
            source,
            scheduler,
            opener,
            surface,
            default_category: None,
        })
    }

    /// Open storage and the news endpoint described by `config`.
    pub async fn connect(
        config: &AppConfig,
        page: Page,
        scheduler: Arc<dyn Scheduler>,
        opener: Arc<dyn Opener>,
        surface: S,
    ) -> Result<Self> {
        let store = create_storage(&config.storage).await?;
        let source = Arc::new(NewsClient::new(&config.endpoint)?);
        let session = Self::new(
            page,
            CollectionRepository::new(store),
            source,
            scheduler,
            opener,
            surface,
            config.view.clone(),
        )
        .await?;
        Ok(session.with_default_category(config.default_category.clone()))
    }

    pub fn with_default_category(mut self, category: Option<String>) -> Self {
        self.default_category = category.filter(|c| !c.is_empty());
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Size the view and load the page contents.
    pub async fn start(&mut self, width: u32) -> Result<()> {
        info!(page = self.state.page.body_id(), width, "Starting session");
        self.dispatch(Event::Resized { width }).await?;
        self.load().await
    }

    /// Category to request: the history recommendation, else the default.
    pub async fn category(&self) -> Result<Option<String>> {
        preferred_category(&self.repo, self.default_category.as_deref()).await
    }

    #[instrument(level = "info", skip_all)]
    pub async fn load(&mut self) -> Result<()> {
        let event = match self.state.page.collection() {
            Some(collection) => Event::Loaded(self.repo.articles(collection).await?),
            None => {
                let category = self.category().await?;
                match self.source.fetch_articles(category.as_deref()).await {
                    Ok(articles) => Event::Loaded(articles),
                    Err(e) => {
                        error!(source = self.source.name(), error = %e, "Failed to load articles");
                        Event::LoadFailed(e.display_message())
                    }
                }
            }
        };
        self.dispatch(event).await
    }

    pub async fn dispatch(&mut self, event: Event) -> Result<()> {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            for effect in self.state.handle(event) {
                if let Some(follow_up) = self.run(effect).await? {
                    queue.push_back(follow_up);
                }
            }
        }
        Ok(())
    }

    async fn run(&mut self, effect: Effect) -> Result<Option<Event>> {
        match effect {
            Effect::Surface(op) => self.surface.apply(op)?,
            Effect::Schedule { after, event } => self.scheduler.schedule(after, event),
            Effect::Open(url) => {
                if let Err(e) = self.opener.open(&url) {
                    warn!(%url, error = %e, "Failed to open link");
                }
            }
            Effect::Toggle {
                collection,
                article,
            } => match self.repo.toggle(collection, &article).await {
                Ok(saved) => {
                    return Ok(Some(Event::Saved {
                        collection,
                        key: article.key().to_string(),
                        saved,
                    }))
                }
                Err(e) => warn!(%collection, key = article.key(), error = %e, "Failed to save toggle"),
            },
            Effect::Remove {
                collection,
                article,
            } => {
                if let Err(e) = self.repo.remove(collection, &article).await {
                    warn!(%collection, key = article.key(), error = %e, "Failed to remove saved article");
                }
            }
            Effect::RecordHistory(article) => {
                if let Err(e) = self.repo.record_history(&article).await {
                    warn!(title = %article.title, error = %e, "Failed to record history");
                }
            }
        }
        Ok(None)
    }
}
