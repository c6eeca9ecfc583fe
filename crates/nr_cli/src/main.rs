use clap::Parser;
use crossterm::event::{Event as TermEvent, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use nr_app::{preferred_category, AppConfig, Session, TokioScheduler};
use nr_core::card::summarize;
use nr_core::{ArticleSource, CollectionRepository, Event, Page, ViewConfig};
use nr_fetch::{NewsClient, DEFAULT_ENDPOINT};
use nr_storage::{create_storage, BackendConfig, StorageKind};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};
use tui::backend::CrosstermBackend;
use tui::Terminal;

mod keys;
mod logging;
mod opener;
mod ui;

use keys::{normal_key, search_key, Action, Geometry, SearchInput};
use logging::{init_logging, LogTarget};
use opener::SystemOpener;
use ui::{TuiSurface, CARD_ROWS};

type Term = Terminal<CrosstermBackend<Stdout>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal news reader", long_about = None)]
pub struct Cli {
    /// News endpoint returning a JSON array of articles
    #[arg(long, env = "NR_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    #[arg(
        long,
        env = "NR_STORAGE",
        default_value = "file",
        help = "Storage backend. Available: memory, file (default), sqlite"
    )]
    storage: StorageKind,
    #[arg(long, env = "NR_STORAGE_PATH")]
    storage_path: Option<PathBuf>,
    /// Category requested when the reading history has no recommendation
    #[arg(long)]
    category: Option<String>,
    #[arg(long, env = "NR_LOG_FILE")]
    log_file: Option<PathBuf>,
    /// Width in pixels at which the paginated layout takes over
    #[arg(long, default_value_t = 768)]
    breakpoint: u32,
    #[arg(long, default_value_t = 8)]
    cell_width: u32,
    #[arg(long, default_value_t = 16)]
    cell_height: u32,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug, Clone, Copy)]
enum Commands {
    /// Recommended news (default)
    Feed,
    Favorites,
    ReadLater,
    /// Print a page without taking over the terminal
    List {
        #[arg(long, value_enum, default_value_t = PageArg::Home)]
        page: PageArg,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum PageArg {
    Home,
    Favorites,
    ReadLater,
}

impl From<PageArg> for Page {
    fn from(arg: PageArg) -> Self {
        match arg {
            PageArg::Home => Page::Home,
            PageArg::Favorites => Page::Favorites,
            PageArg::ReadLater => Page::ReadLater,
        }
    }
}

impl Cli {
    fn config(&self) -> AppConfig {
        let mut storage = BackendConfig::new(self.storage);
        if let Some(path) = &self.storage_path {
            storage = storage.with_path(path);
        }
        AppConfig {
            endpoint: self.endpoint.clone(),
            default_category: self.category.clone(),
            storage,
            view: ViewConfig {
                breakpoint: self.breakpoint,
                ..ViewConfig::default()
            },
        }
    }

    fn geometry(&self) -> Geometry {
        Geometry {
            cell_width: self.cell_width.max(1),
            cell_height: self.cell_height.max(1),
        }
    }
}

/// Interactive page state that lives outside the session.
struct App {
    session: Session<TuiSurface>,
    geometry: Geometry,
    rows: u16,
    search: Option<String>,
}

impl App {
    async fn scrolled(&mut self) -> nr_core::Result<()> {
        let surface = self.session.surface();
        if !surface.model.scroll_attached {
            return Ok(());
        }
        let metrics = self.geometry.scroll_metrics(
            surface.selected(),
            surface.model.cards.len(),
            CARD_ROWS,
            TuiSurface::list_rows(self.rows),
        );
        self.session.dispatch(Event::Scrolled(metrics)).await
    }

    /// Returns false once the user asked to quit.
    async fn on_terminal(&mut self, event: TermEvent) -> nr_core::Result<bool> {
        match event {
            TermEvent::Resize(columns, rows) => {
                self.rows = rows;
                let width = self.geometry.width_px(columns);
                self.session.dispatch(Event::Resized { width }).await?;
            }
            TermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                if let Some(query) = self.search.as_mut() {
                    match search_key(key, query) {
                        SearchInput::Changed => {
                            let query = query.clone();
                            self.session.dispatch(Event::Search(query)).await?;
                        }
                        SearchInput::Done => self.search = None,
                        SearchInput::Unchanged => {}
                    }
                    return Ok(true);
                }

                let selected = self.session.surface().selected_key();
                match normal_key(key, selected) {
                    Some(Action::Quit) => return Ok(false),
                    Some(Action::Dispatch(event)) => self.session.dispatch(event).await?,
                    Some(Action::Move(delta)) => {
                        if self.session.surface_mut().move_selection(delta) {
                            self.scrolled().await?;
                        }
                    }
                    Some(Action::StartSearch) => {
                        self.search = Some(self.session.state().query.clone());
                    }
                    None => {}
                }
            }
            _ => {}
        }
        Ok(true)
    }
}

fn setup_terminal() -> anyhow::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop(
    terminal: &mut Term,
    app: &mut App,
    timers: &mut UnboundedReceiver<Event>,
    columns: u16,
) -> anyhow::Result<()> {
    terminal.draw(|f| ui::draw(f, app.session.surface(), None))?;
    app.session.start(app.geometry.width_px(columns)).await?;

    let mut input = EventStream::new();
    loop {
        let search = app.search.clone();
        terminal.draw(|f| ui::draw(f, app.session.surface(), search.as_deref()))?;

        tokio::select! {
            Some(event) = timers.recv() => app.session.dispatch(event).await?,
            next = input.next() => match next {
                Some(Ok(event)) => {
                    if !app.on_terminal(event).await? {
                        break;
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }
    Ok(())
}

async fn run_interactive(cli: &Cli, page: Page) -> anyhow::Result<()> {
    let config = cli.config();
    let (tx, mut timers) = mpsc::unbounded_channel();
    let session = Session::connect(
        &config,
        page,
        Arc::new(TokioScheduler::new(tx)),
        Arc::new(SystemOpener),
        TuiSurface::new(page),
    )
    .await?;

    let (columns, rows) = crossterm::terminal::size()?;
    let mut app = App {
        session,
        geometry: cli.geometry(),
        rows,
        search: None,
    };

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app, &mut timers, columns).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn run_list(cli: &Cli, page: Page) -> anyhow::Result<()> {
    let config = cli.config();
    let repo = CollectionRepository::new(create_storage(&config.storage).await?);

    let articles = match page.collection() {
        Some(collection) => repo.articles(collection).await?,
        None => {
            let category = preferred_category(&repo, config.default_category.as_deref()).await?;
            info!(category = category.as_deref().unwrap_or(""), "Listing news");
            let client = NewsClient::new(&config.endpoint)?;
            match client.fetch_articles(category.as_deref()).await {
                Ok(articles) => articles,
                Err(e) => {
                    warn!(error = %e, "Fetch failed");
                    println!("{}", e.display_message());
                    return Ok(());
                }
            }
        }
    };

    for article in &articles {
        println!("{}", article.title);
        println!("  {}", article.link().unwrap_or("-"));
        println!("  {}", summarize(article));
    }
    info!(count = articles.len(), "Listed articles");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Feed);
    let interactive = !matches!(command, Commands::List { .. });
    init_logging(&LogTarget::for_run(cli.log_file.clone(), interactive))?;

    match command {
        Commands::Feed => run_interactive(&cli, Page::Home).await,
        Commands::Favorites => run_interactive(&cli, Page::Favorites).await,
        Commands::ReadLater => run_interactive(&cli, Page::ReadLater).await,
        Commands::List { page } => run_list(&cli, page.into()).await,
    }
}
