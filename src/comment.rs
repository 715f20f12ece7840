use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::article::query::{single, Pagination};
use crate::article::Article;
use crate::config::Config;
use crate::db::schema::comments;
use crate::db::{Db, Store};
use crate::types::{ApiError, ApiResult, Created, Resource, Validate};
use crate::utils::{parse_id, required};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
    #[serde(serialize_with = "crate::utils::serialize_date")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Newest first. An article without comments yields an empty page; a
    /// missing article is reported as missing comments.
    pub fn list_for(article_id: i32, page: Pagination, store: &dyn Store) -> Result<Vec<Comment>, ApiError> {
        if store.article(article_id)?.is_none() {
            return Err(ApiError::NotFound(Resource::Comments));
        }
        store.comments(article_id, page).map_err(|e| e.into())
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub author: String,
    pub body: String,
}

impl NewComment {
    /// The article is checked up front; an unknown author only shows up as a
    /// foreign key violation from the store.
    pub fn insert(&self, article_id: i32, store: &dyn Store) -> Result<Comment, ApiError> {
        Article::load(article_id, store)?;
        let comment = store.insert_comment(article_id, self)?;
        info!(
            comment_id = comment.comment_id,
            article_id,
            author = %comment.author,
            "created comment"
        );
        Ok(comment)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentDetails {
    pub username: Option<String>,
    pub body: Option<String>,
}

impl Validate for CommentDetails {
    type Validated = NewComment;

    fn validate(self) -> Result<NewComment, ApiError> {
        Ok(NewComment {
            author: required(self.username, "username")?,
            body: required(self.body, "body")?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    comments: Vec<Comment>,
}

#[derive(Debug, Default, FromForm)]
pub struct PageParams {
    pub limit: Vec<String>,
    pub p: Vec<String>,
}

#[get("/api/articles/<article_id>/comments?<page..>")]
pub fn list(
    db: Db<'_>,
    config: &State<Config>,
    article_id: &str,
    page: PageParams,
) -> ApiResult<CommentsResponse> {
    let article_id = parse_id(article_id)?;
    let limit = single(page.limit, "limit")?;
    let p = single(page.p, "p")?;
    let page = Pagination::parse(limit.as_deref(), p.as_deref(), config.default_limit)?;
    let comments = Comment::list_for(article_id, page, &*db)?;
    Ok(Json(CommentsResponse { comments }))
}

#[post("/api/articles/<article_id>/comments", data = "<details>")]
pub fn add(db: Db<'_>, article_id: &str, details: Json<CommentDetails>) -> Created<CommentResponse> {
    let article_id = parse_id(article_id)?;
    let new_comment = details.into_inner().validate()?;
    let comment = new_comment.insert(article_id, &*db)?;
    Ok(Custom(Status::Created, Json(CommentResponse { comment })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::StoreErrorKind;

    fn everything() -> Pagination {
        Pagination::new(100, 1).unwrap()
    }

    fn details(username: &str, body: &str) -> CommentDetails {
        CommentDetails {
            username: Some(username.to_string()),
            body: Some(body.to_string()),
        }
    }

    #[test]
    fn comments_are_newest_first() {
        let store = MemoryStore::seeded();
        let comments = Comment::list_for(1, everything(), &store).unwrap();
        assert_eq!(comments.len(), 11);
        assert!(comments.iter().all(|c| c.article_id == 1));
        for pair in comments.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn article_without_comments_is_empty() {
        let store = MemoryStore::seeded();
        assert!(Comment::list_for(7, everything(), &store).unwrap().is_empty());
    }

    #[test]
    fn comments_paginate() {
        let store = MemoryStore::seeded();
        let all = Comment::list_for(1, everything(), &store).unwrap();
        let second = Comment::list_for(1, Pagination::new(5, 2).unwrap(), &store).unwrap();
        assert_eq!(second, all[5..10].to_vec());
        let last = Comment::list_for(1, Pagination::new(5, 3).unwrap(), &store).unwrap();
        assert_eq!(last.len(), 1);
    }

    #[test]
    fn new_comment_lands_on_top() {
        let store = MemoryStore::seeded();
        let new_comment = details("butter_bridge", "Just posted my first comment !")
            .validate()
            .unwrap();
        let comment = new_comment.insert(1, &store).unwrap();
        assert_eq!(comment.comment_id, 19);
        assert_eq!(comment.votes, 0);
        assert_eq!(comment.article_id, 1);

        let comments = Comment::list_for(1, everything(), &store).unwrap();
        assert_eq!(comments[0], comment);
    }

    #[test]
    fn missing_fields_are_rejected_before_lookup() {
        match CommentDetails::default().validate() {
            Err(ApiError::MissingField("username")) => {}
            other => panic!("expected missing username, got {:?}", other),
        }
        match details("butter_bridge", "  ").validate() {
            Err(ApiError::MissingField("body")) => {}
            other => panic!("expected missing body, got {:?}", other),
        }
    }

    #[test]
    fn unknown_article_is_not_found() {
        let store = MemoryStore::seeded();
        let new_comment = details("butter_bridge", "hello").validate().unwrap();
        match new_comment.insert(61, &store) {
            Err(ApiError::NotFound(Resource::Article)) => {}
            other => panic!("expected article not found, got {:?}", other),
        }
    }

    #[test]
    fn unknown_author_is_a_foreign_key_violation() {
        let store = MemoryStore::seeded();
        let new_comment = details("sathice", "are you throwing up furballs ?")
            .validate()
            .unwrap();
        match new_comment.insert(7, &store) {
            Err(ApiError::Store(e)) => assert_eq!(e.kind(), StoreErrorKind::ForeignKeyViolation),
            other => panic!("expected foreign key violation, got {:?}", other),
        }
        assert!(Comment::list_for(7, everything(), &store).unwrap().is_empty());
    }
}
