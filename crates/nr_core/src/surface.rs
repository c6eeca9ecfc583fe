//! The display contract: what the view logic asks of whatever draws it.

use std::collections::HashMap;

use crate::card::{Card, Controls};
use crate::paging::PagerState;
use crate::types::{Collection, Theme};
use crate::Result;

/// One mutation of the rendered container and its controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    /// Drop every card and message from the container
    Clear,
    /// Append cards after the existing ones
    Append(Vec<Card>),
    RemoveCard(String),
    /// Hide or reveal the container (page fade)
    SetHidden(bool),
    SetPager(PagerState),
    HidePager,
    SetLoader(bool),
    /// Replace the container contents with a text message
    ShowMessage(String),
    SetSaved {
        key: String,
        collection: Collection,
        saved: bool,
    },
    HideImage(String),
    ShowSummary {
        key: String,
        text: String,
    },
    SetTheme(Theme),
    SetBadge(bool),
    AttachScroll,
    DetachScroll,
}

pub trait Surface: Send {
    fn apply(&mut self, op: SurfaceOp) -> Result<()>;
}

/// Retained state of a rendered page, built by replaying [`SurfaceOp`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceModel {
    pub cards: Vec<Card>,
    pub message: Option<String>,
    pub hidden: bool,
    pub pager: Option<PagerState>,
    pub loader: bool,
    pub theme: Theme,
    pub badge: bool,
    pub scroll_attached: bool,
    pub summaries: HashMap<String, String>,
}

impl SurfaceModel {
    pub fn apply(&mut self, op: SurfaceOp) {
        match op {
            SurfaceOp::Clear => {
                self.cards.clear();
                self.summaries.clear();
                self.message = None;
            }
            SurfaceOp::Append(cards) => {
                self.message = None;
                self.cards.extend(cards);
            }
            SurfaceOp::RemoveCard(key) => {
                self.cards.retain(|c| c.key != key);
                self.summaries.remove(&key);
            }
            SurfaceOp::SetHidden(hidden) => self.hidden = hidden,
            SurfaceOp::SetPager(pager) => self.pager = Some(pager),
            SurfaceOp::HidePager => self.pager = None,
            SurfaceOp::SetLoader(visible) => self.loader = visible,
            SurfaceOp::ShowMessage(text) => {
                self.cards.clear();
                self.summaries.clear();
                self.message = Some(text);
            }
            SurfaceOp::SetSaved {
                key,
                collection,
                saved,
            } => {
                for card in self.cards.iter_mut().filter(|c| c.key == key) {
                    if let Controls::Toggles {
                        favorite,
                        read_later,
                    } = &mut card.controls
                    {
                        match collection {
                            Collection::Favorites => *favorite = saved,
                            Collection::ReadLater => *read_later = saved,
                            Collection::History => {}
                        }
                    }
                }
            }
            SurfaceOp::HideImage(key) => {
                for card in self.cards.iter_mut().filter(|c| c.key == key) {
                    card.image = None;
                }
            }
            SurfaceOp::ShowSummary { key, text } => {
                if self.cards.iter().any(|c| c.key == key) {
                    self.summaries.insert(key, text);
                }
            }
            SurfaceOp::SetTheme(theme) => self.theme = theme,
            SurfaceOp::SetBadge(visible) => self.badge = visible,
            SurfaceOp::AttachScroll => self.scroll_attached = true,
            SurfaceOp::DetachScroll => self.scroll_attached = false,
        }
    }

    pub fn card(&self, key: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.key == key)
    }
}

/// Surface that keeps the model plus a log of every op it received.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub model: SurfaceModel,
    pub ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn titles(&self) -> Vec<&str> {
        self.model.cards.iter().map(|c| c.title.as_str()).collect()
    }
}

impl Surface for RecordingSurface {
    fn apply(&mut self, op: SurfaceOp) -> Result<()> {
        self.ops.push(op.clone());
        self.model.apply(op);
        Ok(())
    }
}
