//! A store that keeps the dataset in process memory.
//!
//! It enforces the same referential rules the Postgres schema does, so the
//! request handlers see identical failures from either backend.

use chrono::Utc;
use parking_lot::Mutex;
use tracing::trace;

use crate::article::query::{ArticlePage, ArticleQuery, Pagination};
use crate::article::{Article, ArticleSummary, NewArticle};
use crate::comment::{Comment, NewComment};
use crate::topic::Topic;
use crate::user::User;

use super::{seed, Store, StoreError, StoreErrorKind, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    topics: Vec<Topic>,
    users: Vec<User>,
    articles: Vec<Article>,
    comments: Vec<Comment>,
    last_article_id: i32,
    last_comment_id: i32,
}

impl Tables {
    fn comment_count(&self, article_id: i32) -> i64 {
        self.comments
            .iter()
            .filter(|comment| comment.article_id == article_id)
            .count() as i64
    }

    fn has_user(&self, username: &str) -> bool {
        self.users.iter().any(|user| user.username == username)
    }
}

fn foreign_key_violation(table: &str, constraint: &str) -> StoreError {
    StoreError::new(
        StoreErrorKind::ForeignKeyViolation,
        format!(
            "insert or update on table \"{}\" violates foreign key constraint \"{}\"",
            table, constraint
        ),
    )
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store holding the fixed development dataset.
    pub fn seeded() -> Self {
        let articles = seed::articles();
        let comments = seed::comments();
        let tables = Tables {
            topics: seed::topics(),
            users: seed::users(),
            last_article_id: articles.iter().map(|a| a.article_id).max().unwrap_or(0),
            last_comment_id: comments.iter().map(|c| c.comment_id).max().unwrap_or(0),
            articles,
            comments,
        };
        MemoryStore {
            tables: Mutex::new(tables),
        }
    }

    pub fn add_topic(&self, topic: Topic) {
        self.tables.lock().topics.push(topic);
    }

    pub fn add_user(&self, user: User) {
        self.tables.lock().users.push(user);
    }
}

impl Store for MemoryStore {
    fn topics(&self) -> StoreResult<Vec<Topic>> {
        Ok(self.tables.lock().topics.clone())
    }

    fn users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.lock().users.clone())
    }

    fn article(&self, article_id: i32) -> StoreResult<Option<Article>> {
        let tables = self.tables.lock();
        Ok(tables
            .articles
            .iter()
            .find(|article| article.article_id == article_id)
            .cloned())
    }

    fn articles(&self, query: &ArticleQuery) -> StoreResult<ArticlePage> {
        let tables = self.tables.lock();
        let mut rows: Vec<ArticleSummary> = tables
            .articles
            .iter()
            .filter(|article| query.matches(&article.topic, &article.author))
            .map(|article| ArticleSummary::from(article, tables.comment_count(article.article_id)))
            .collect();
        rows.sort_by(|a, b| query.compare(a, b));
        let total_count = rows.len() as i64;
        trace!(?query, total_count, "listed articles");
        Ok(ArticlePage {
            articles: query.page.slice(rows),
            total_count,
        })
    }

    fn comment_count(&self, article_id: i32) -> StoreResult<i64> {
        Ok(self.tables.lock().comment_count(article_id))
    }

    fn comments(&self, article_id: i32, page: Pagination) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.lock();
        let mut rows: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|comment| comment.article_id == article_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.comment_id.cmp(&a.comment_id))
        });
        Ok(page.slice(rows))
    }

    fn increment_votes(&self, article_id: i32, delta: i32) -> StoreResult<Option<Article>> {
        let mut tables = self.tables.lock();
        let article = match tables
            .articles
            .iter_mut()
            .find(|article| article.article_id == article_id)
        {
            Some(article) => article,
            None => return Ok(None),
        };
        let votes = article.votes.checked_add(delta).ok_or_else(|| {
            StoreError::new(StoreErrorKind::Other, "integer out of range")
        })?;
        if votes < 0 {
            return Ok(None);
        }
        article.votes = votes;
        Ok(Some(article.clone()))
    }

    fn insert_article(&self, new: &NewArticle) -> StoreResult<Article> {
        let mut tables = self.tables.lock();
        if !tables.has_user(&new.author) {
            return Err(foreign_key_violation("articles", "articles_author_fkey"));
        }
        if !tables.topics.iter().any(|topic| topic.slug == new.topic) {
            return Err(foreign_key_violation("articles", "articles_topic_fkey"));
        }
        tables.last_article_id += 1;
        let article = Article {
            article_id: tables.last_article_id,
            title: new.title.clone(),
            topic: new.topic.clone(),
            author: new.author.clone(),
            body: new.body.clone(),
            created_at: Utc::now(),
            votes: 0,
            article_img_url: new.article_img_url.clone(),
        };
        tables.articles.push(article.clone());
        Ok(article)
    }

    fn insert_comment(&self, article_id: i32, new: &NewComment) -> StoreResult<Comment> {
        let mut tables = self.tables.lock();
        if !tables.articles.iter().any(|article| article.article_id == article_id) {
            return Err(foreign_key_violation("comments", "comments_article_id_fkey"));
        }
        if !tables.has_user(&new.author) {
            return Err(foreign_key_violation("comments", "comments_author_fkey"));
        }
        tables.last_comment_id += 1;
        let comment = Comment {
            comment_id: tables.last_comment_id,
            body: new.body.clone(),
            article_id,
            author: new.author.clone(),
            votes: 0,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    fn delete_article(&self, article_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.lock();
        let before = tables.articles.len();
        tables.articles.retain(|article| article.article_id != article_id);
        if tables.articles.len() == before {
            return Ok(false);
        }
        tables.comments.retain(|comment| comment.article_id != article_id);
        Ok(true)
    }
}
