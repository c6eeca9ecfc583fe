use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch the article list, optionally narrowed to one category
    async fn fetch_articles(&self, category: Option<&str>) -> Result<Vec<Article>>;

    /// Human readable name of the endpoint, for logs
    fn name(&self) -> &str;
}
