use std::cmp::Ordering;
use std::str::FromStr;
use tracing::debug;

use crate::db::Store;
use crate::topic::Topic;
use crate::types::ApiError;
use crate::user::User;

use super::ArticleSummary;

/// Columns an article listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    ArticleId,
    Title,
    Topic,
    Author,
    CreatedAt,
    Votes,
    ArticleImgUrl,
    CommentCount,
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::CreatedAt
    }
}

impl SortBy {
    pub const ALL: [SortBy; 8] = [
        SortBy::ArticleId,
        SortBy::Title,
        SortBy::Topic,
        SortBy::Author,
        SortBy::CreatedAt,
        SortBy::Votes,
        SortBy::ArticleImgUrl,
        SortBy::CommentCount,
    ];

    pub fn name(&self) -> &'static str {
        match *self {
            SortBy::ArticleId => "article_id",
            SortBy::Title => "title",
            SortBy::Topic => "topic",
            SortBy::Author => "author",
            SortBy::CreatedAt => "created_at",
            SortBy::Votes => "votes",
            SortBy::ArticleImgUrl => "article_img_url",
            SortBy::CommentCount => "comment_count",
        }
    }

    /// The SQL expression this column sorts on in the listing query.
    pub fn column(&self) -> &'static str {
        match *self {
            SortBy::ArticleId => "articles.article_id",
            SortBy::Title => "articles.title",
            SortBy::Topic => "articles.topic",
            SortBy::Author => "articles.author",
            SortBy::CreatedAt => "articles.created_at",
            SortBy::Votes => "articles.votes",
            SortBy::ArticleImgUrl => "articles.article_img_url",
            SortBy::CommentCount => "comment_count",
        }
    }

    pub fn compare(&self, a: &ArticleSummary, b: &ArticleSummary) -> Ordering {
        match *self {
            SortBy::ArticleId => a.article_id.cmp(&b.article_id),
            SortBy::Title => a.title.cmp(&b.title),
            SortBy::Topic => a.topic.cmp(&b.topic),
            SortBy::Author => a.author.cmp(&b.author),
            SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            SortBy::Votes => a.votes.cmp(&b.votes),
            SortBy::ArticleImgUrl => a.article_img_url.cmp(&b.article_img_url),
            SortBy::CommentCount => a.comment_count.cmp(&b.comment_count),
        }
    }
}

impl FromStr for SortBy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .iter()
            .find(|column| column.name() == s)
            .cloned()
            .ok_or_else(|| ApiError::InvalidFilter(format!("cannot sort by '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Default for Order {
    fn default() -> Self {
        Order::Desc
    }
}

impl Order {
    pub fn keyword(&self) -> &'static str {
        match *self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match *self {
            Order::Asc => ordering,
            Order::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for Order {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            other => Err(ApiError::InvalidFilter(format!("unknown order '{}'", other))),
        }
    }
}

/// Offset pagination: page `p` of size `l` covers rows `[(p - 1) * l, p * l)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: u32,
    page: u32,
}

impl Pagination {
    pub fn new(limit: u32, page: u32) -> Result<Self, ApiError> {
        if limit == 0 || page == 0 {
            return Err(ApiError::InvalidFilter(format!(
                "limit and page must be positive, got limit={} page={}",
                limit, page
            )));
        }
        Ok(Pagination { limit, page })
    }

    pub fn parse(limit: Option<&str>, page: Option<&str>, default_limit: u32) -> Result<Self, ApiError> {
        let limit = positive(limit, "limit")?.unwrap_or(default_limit);
        let page = positive(page, "p")?.unwrap_or(1);
        Pagination::new(limit, page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1).saturating_mul(i64::from(self.limit))
    }

    /// Applies the page to an already ordered sequence.
    pub fn slice<T>(&self, rows: Vec<T>) -> Vec<T> {
        let offset = self.offset() as usize;
        rows.into_iter().skip(offset).take(self.limit as usize).collect()
    }
}

fn positive(raw: Option<&str>, name: &str) -> Result<Option<u32>, ApiError> {
    match raw {
        None => Ok(None),
        Some(raw) => match raw.parse::<u32>() {
            Ok(value) if value > 0 => Ok(Some(value)),
            _ => Err(ApiError::InvalidFilter(format!(
                "{} must be a positive integer, got '{}'",
                name, raw
            ))),
        },
    }
}

/// At most one value per query key. A repeated key is rejected rather than
/// letting one of its values win.
pub fn single(values: Vec<String>, name: &str) -> Result<Option<String>, ApiError> {
    if values.len() > 1 {
        return Err(ApiError::InvalidFilter(format!(
            "'{}' given {} times",
            name,
            values.len()
        )));
    }
    Ok(values.into_iter().next())
}

/// Raw listing parameters as they arrive on the query string. Every key
/// collects all of its values so repeats can be refused.
#[derive(Debug, Default, FromForm)]
pub struct ArticleParams {
    pub sort_by: Vec<String>,
    pub order: Vec<String>,
    pub topic: Vec<String>,
    pub author: Vec<String>,
    pub limit: Vec<String>,
    pub p: Vec<String>,
}

/// A listing request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQuery {
    pub sort_by: SortBy,
    pub order: Order,
    pub topic: Option<String>,
    pub author: Option<String>,
    pub page: Pagination,
}

impl ArticleQuery {
    pub fn new(page: Pagination) -> Self {
        ArticleQuery {
            sort_by: SortBy::default(),
            order: Order::default(),
            topic: None,
            author: None,
            page,
        }
    }

    /// Whether an article passes the topic and author filters.
    pub fn matches(&self, topic: &str, author: &str) -> bool {
        self.topic.as_ref().map_or(true, |t| t == topic)
            && self.author.as_ref().map_or(true, |a| a == author)
    }

    /// Total order used for listings: the requested column, then generation
    /// order for ties.
    pub fn compare(&self, a: &ArticleSummary, b: &ArticleSummary) -> Ordering {
        self.order
            .apply(self.sort_by.compare(a, b))
            .then(a.article_id.cmp(&b.article_id))
    }
}

impl ArticleParams {
    /// Checks every parameter against its allow-list. Topic and author filters
    /// must name existing rows; they are rejected before any article is read.
    pub fn resolve(self, default_limit: u32, store: &dyn Store) -> Result<ArticleQuery, ApiError> {
        let sort_by = match single(self.sort_by, "sort_by")? {
            Some(raw) => raw.parse()?,
            None => SortBy::default(),
        };
        let order = match single(self.order, "order")? {
            Some(raw) => raw.parse()?,
            None => Order::default(),
        };
        let limit = single(self.limit, "limit")?;
        let p = single(self.p, "p")?;
        let page = Pagination::parse(limit.as_deref(), p.as_deref(), default_limit)?;
        let topic = single(self.topic, "topic")?;
        let author = single(self.author, "author")?;

        if let Some(ref topic) = topic {
            if !Topic::exists(topic, store)? {
                debug!(topic = %topic, "rejecting unknown topic filter");
                return Err(ApiError::InvalidFilter(format!("unknown topic '{}'", topic)));
            }
        }

        if let Some(ref author) = author {
            if !User::exists(author, store)? {
                debug!(author = %author, "rejecting unknown author filter");
                return Err(ApiError::InvalidFilter(format!("unknown author '{}'", author)));
            }
        }

        Ok(ArticleQuery {
            sort_by,
            order,
            topic,
            author,
            page,
        })
    }
}

/// One page of an article listing plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticlePage {
    pub articles: Vec<ArticleSummary>,
    pub total_count: i64,
}
