use nr_core::{Card, Collection, Controls, Page, Result, Surface, SurfaceModel, SurfaceOp, Theme};
use tui::backend::Backend;
use tui::layout::{Constraint, Direction, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Span, Spans};
use tui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tui::Frame;

/// Rows one card occupies in the list.
pub const CARD_ROWS: u16 = 4;
const HEADER_ROWS: u16 = 3;
const FOOTER_ROWS: u16 = 3;

const HELP: &str =
    "←/→ ページ  ↑/↓ 選択  Enter 開く  f お気に入り  r 後で見る  d 削除  s 共有  u 要約  t テーマ  / 検索  q 終了";

/// Terminal rendition of a reader page: the replayed surface model plus a
/// selection cursor over its cards.
#[derive(Debug, Clone)]
pub struct TuiSurface {
    pub model: SurfaceModel,
    page: Page,
    selected: usize,
}

impl TuiSurface {
    pub fn new(page: Page) -> Self {
        Self {
            model: SurfaceModel::default(),
            page,
            selected: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_key(&self) -> Option<&str> {
        if self.model.hidden {
            return None;
        }
        self.model.cards.get(self.selected).map(|c| c.key.as_str())
    }

    /// Returns false when the cursor was already at the edge.
    pub fn move_selection(&mut self, delta: isize) -> bool {
        let last = self.model.cards.len().saturating_sub(1) as isize;
        let next = (self.selected as isize + delta).clamp(0, last.max(0)) as usize;
        let moved = next != self.selected;
        self.selected = next;
        moved
    }

    /// Rows available to the card list on a terminal this tall.
    pub fn list_rows(terminal_rows: u16) -> u16 {
        terminal_rows
            .saturating_sub(HEADER_ROWS + FOOTER_ROWS)
            .saturating_sub(2)
    }
}

impl Surface for TuiSurface {
    fn apply(&mut self, op: SurfaceOp) -> Result<()> {
        if matches!(op, SurfaceOp::Clear | SurfaceOp::ShowMessage(_)) {
            self.selected = 0;
        }
        self.model.apply(op);
        self.move_selection(0);
        Ok(())
    }
}

fn page_title(page: Page) -> &'static str {
    match page {
        Page::Home => "ニュース",
        Page::Favorites => "お気に入り",
        Page::ReadLater => "後で見る",
    }
}

fn base_style(theme: Theme) -> Style {
    match theme {
        Theme::Dark => Style::default().fg(Color::White).bg(Color::Black),
        Theme::Light => Style::default().fg(Color::Black).bg(Color::White),
    }
}

fn accent(theme: Theme) -> Color {
    match theme {
        Theme::Dark => Color::Cyan,
        Theme::Light => Color::Blue,
    }
}

fn markers(controls: &Controls) -> String {
    match controls {
        Controls::Toggles {
            favorite,
            read_later,
        } => format!(
            "{}{} ",
            if *favorite { "★" } else { "☆" },
            if *read_later { "◆" } else { "◇" }
        ),
        Controls::Remove(Collection::Favorites) => "✕★ ".to_string(),
        Controls::Remove(_) => "✕◆ ".to_string(),
    }
}

/// Images are shown as a marker only; nothing is fetched, so image load
/// failures never arise here.
fn card_item<'a>(card: &'a Card, summary: Option<&'a String>, theme: Theme) -> ListItem<'a> {
    let link = match (&card.link, &card.image) {
        (Some(link), Some(_)) => format!("{}  [画像]", link),
        (Some(link), None) => link.clone(),
        (None, _) => "-".to_string(),
    };
    let summary = summary.map(String::as_str).unwrap_or("");
    ListItem::new(vec![
        Spans::from(vec![
            Span::raw(markers(&card.controls)),
            Span::styled(
                card.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Spans::from(Span::raw(card.description.as_str())),
        Spans::from(Span::styled(link, Style::default().fg(accent(theme)))),
        Spans::from(Span::styled(
            summary,
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
}

fn draw_header<B: Backend>(f: &mut Frame<B>, area: Rect, surface: &TuiSurface) {
    let theme = surface.model.theme;
    let mut spans = vec![Span::styled(
        page_title(surface.page),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if surface.model.badge {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "新着!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::raw(format!("    [t] {}", theme.toggle_label())));
    let header = Paragraph::new(Spans::from(spans))
        .style(base_style(theme))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_body<B: Backend>(f: &mut Frame<B>, area: Rect, surface: &TuiSurface) {
    let theme = surface.model.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .style(base_style(theme));

    if surface.model.hidden {
        f.render_widget(block, area);
        return;
    }
    if let Some(message) = &surface.model.message {
        let paragraph = Paragraph::new(message.as_str())
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = surface
        .model
        .cards
        .iter()
        .map(|card| card_item(card, surface.model.summaries.get(&card.key), theme))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    if !surface.model.cards.is_empty() {
        state.select(Some(surface.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn pager_line(surface: &TuiSurface) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if let Some(pager) = &surface.model.pager {
        let enabled = Style::default().add_modifier(Modifier::BOLD);
        let disabled = Style::default().add_modifier(Modifier::DIM);
        spans.push(Span::styled(
            "◀ ",
            if pager.prev_enabled { enabled } else { disabled },
        ));
        spans.push(Span::raw(format!("{} / {}", pager.page, pager.pages)));
        spans.push(Span::styled(
            " ▶",
            if pager.next_enabled { enabled } else { disabled },
        ));
        spans.push(Span::raw("   "));
    }
    if surface.model.loader {
        spans.push(Span::raw("読み込み中...   "));
    }
    spans
}

fn draw_footer<B: Backend>(f: &mut Frame<B>, area: Rect, surface: &TuiSurface, search: Option<&str>) {
    let line = match search {
        Some(query) => Spans::from(vec![
            Span::styled("検索: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{}_", query)),
        ]),
        None => {
            let mut spans = pager_line(surface);
            spans.push(Span::styled(HELP, Style::default().add_modifier(Modifier::DIM)));
            Spans::from(spans)
        }
    };
    let footer = Paragraph::new(line)
        .style(base_style(surface.model.theme))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

/// Draw the whole page. `search` holds the query while the search line is focused.
pub fn draw<B: Backend>(f: &mut Frame<B>, surface: &TuiSurface, search: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_ROWS),
            Constraint::Min(0),
            Constraint::Length(FOOTER_ROWS),
        ])
        .split(f.size());

    draw_header(f, chunks[0], surface);
    draw_body(f, chunks[1], surface);
    draw_footer(f, chunks[2], surface, search);
}
