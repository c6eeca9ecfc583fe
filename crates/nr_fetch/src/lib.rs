pub mod client;

pub use client::{NewsClient, DEFAULT_ENDPOINT};

pub mod prelude {
    pub use super::client::NewsClient;
    pub use nr_core::{Article, ArticleSource, Error, Result};
}
