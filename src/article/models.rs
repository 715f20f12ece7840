use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text, Timestamptz};

use crate::db::schema::articles;
use crate::types::{ApiError, Validate};
use crate::utils::required;

pub const DEFAULT_ARTICLE_IMG_URL: &str =
    "https://images.pexels.com/photos/97050/pexels-photo-97050.jpeg?w=700&h=700";

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = articles)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(serialize_with = "crate::utils::serialize_date")]
    pub created_at: DateTime<Utc>,
    pub votes: i32,
    pub article_img_url: String,
}

/// The single-article view: the full row plus its comment count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    pub comment_count: i64,
}

/// A listing row: no body, with the derived comment count.
#[derive(Debug, Clone, PartialEq, QueryableByName, Serialize)]
pub struct ArticleSummary {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Timestamptz)]
    #[serde(serialize_with = "crate::utils::serialize_date")]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Text)]
    pub article_img_url: String,
    #[diesel(sql_type = BigInt)]
    pub comment_count: i64,
}

impl ArticleSummary {
    pub fn from(article: &Article, comment_count: i64) -> Self {
        ArticleSummary {
            article_id: article.article_id,
            title: article.title.clone(),
            topic: article.topic.clone(),
            author: article.author.clone(),
            created_at: article.created_at,
            votes: article.votes,
            article_img_url: article.article_img_url.clone(),
            comment_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = articles)]
pub struct NewArticle {
    pub author: String,
    pub title: String,
    pub body: String,
    pub topic: String,
    pub article_img_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArticleDetails {
    pub author: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub topic: Option<String>,
    pub article_img_url: Option<String>,
}

impl Validate for ArticleDetails {
    type Validated = NewArticle;

    fn validate(self) -> Result<NewArticle, ApiError> {
        let article_img_url = match self.article_img_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => DEFAULT_ARTICLE_IMG_URL.to_string(),
        };
        Ok(NewArticle {
            author: required(self.author, "author")?,
            title: required(self.title, "title")?,
            body: required(self.body, "body")?,
            topic: required(self.topic, "topic")?,
            article_img_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteUpdate {
    pub inc_votes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse<T> {
    pub article: T,
}

