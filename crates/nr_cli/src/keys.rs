//! Terminal input translated into reader events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use nr_core::{Collection, Event, ScrollMetrics};

/// What a key press asks the event loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Dispatch(Event),
    /// Move the selection by this many cards
    Move(isize),
    StartSearch,
    Quit,
}

/// Outcome of a key press while the search line is focused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchInput {
    Changed,
    Unchanged,
    Done,
}

/// Key bindings outside the search line. Card actions need a selected card.
pub fn normal_key(key: KeyEvent, selected: Option<&str>) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => Action::Dispatch(Event::PrevPage),
        KeyCode::Right | KeyCode::Char('l') => Action::Dispatch(Event::NextPage),
        KeyCode::Down | KeyCode::Char('j') => Action::Move(1),
        KeyCode::Up | KeyCode::Char('k') => Action::Move(-1),
        KeyCode::PageDown => Action::Move(5),
        KeyCode::PageUp => Action::Move(-5),
        KeyCode::Char('t') => Action::Dispatch(Event::ToggleTheme),
        KeyCode::Char('/') => Action::StartSearch,
        code => {
            let key = selected?.to_string();
            match code {
                KeyCode::Enter | KeyCode::Char('o') => Action::Dispatch(Event::Activate(key)),
                KeyCode::Char('f') => {
                    Action::Dispatch(Event::ToggleSaved(Collection::Favorites, key))
                }
                KeyCode::Char('r') => {
                    Action::Dispatch(Event::ToggleSaved(Collection::ReadLater, key))
                }
                KeyCode::Char('d') | KeyCode::Delete => Action::Dispatch(Event::Remove(key)),
                KeyCode::Char('s') => Action::Dispatch(Event::Share(key)),
                KeyCode::Char('u') => Action::Dispatch(Event::Summarize(key)),
                _ => return None,
            }
        }
    };
    Some(action)
}

pub fn search_key(key: KeyEvent, query: &mut String) -> SearchInput {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => SearchInput::Done,
        KeyCode::Backspace => match query.pop() {
            Some(_) => SearchInput::Changed,
            None => SearchInput::Unchanged,
        },
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            query.push(c);
            SearchInput::Changed
        }
        _ => SearchInput::Unchanged,
    }
}

/// Pixel size of one terminal cell, used to feed the width breakpoint and
/// the scroll threshold with browser-like numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub cell_width: u32,
    pub cell_height: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            cell_width: 8,
            cell_height: 16,
        }
    }
}

impl Geometry {
    pub fn width_px(&self, columns: u16) -> u32 {
        u32::from(columns) * self.cell_width
    }

    /// Scroll position of a list whose selected card is kept in view.
    pub fn scroll_metrics(
        &self,
        selected: usize,
        cards: usize,
        card_rows: u16,
        viewport_rows: u16,
    ) -> ScrollMetrics {
        let card_rows = u32::from(card_rows);
        let viewport = u32::from(viewport_rows);
        let content = cards as u32 * card_rows;
        let selection_end = (selected as u32 + 1).min(cards as u32) * card_rows;
        let offset = selection_end.saturating_sub(viewport);
        ScrollMetrics {
            offset: offset * self.cell_height,
            viewport: viewport * self.cell_height,
            content: content * self.cell_height,
        }
    }
}
