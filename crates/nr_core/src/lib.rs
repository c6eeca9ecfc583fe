pub mod card;
pub mod error;
pub mod paging;
pub mod recommend;
pub mod source;
pub mod storage;
pub mod surface;
pub mod types;
pub mod view;

pub use card::{Card, Controls};
pub use error::{Error, Result};
pub use paging::PagerState;
pub use recommend::recommend_category;
pub use source::ArticleSource;
pub use storage::{CollectionRepository, KeyValueStore};
pub use surface::{RecordingSurface, Surface, SurfaceModel, SurfaceOp};
pub use types::{Article, Collection, HistoryEntry, Mode, Page, Theme};
pub use view::{Effect, Event, Membership, ScrollMetrics, ViewConfig, ViewState};
