use diesel::prelude::*;
use rocket::serde::json::Json;

use crate::db::schema::topics;
use crate::db::{Db, Store};
use crate::types::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = topics)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

impl Topic {
    pub fn all(store: &dyn Store) -> Result<Vec<Topic>, ApiError> {
        store.topics().map_err(|e| e.into())
    }

    pub fn exists(slug: &str, store: &dyn Store) -> Result<bool, ApiError> {
        Ok(Topic::all(store)?.iter().any(|topic| topic.slug == slug))
    }
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    topics: Vec<Topic>,
}

#[get("/api/topics")]
pub fn all(db: Db<'_>) -> ApiResult<TopicsResponse> {
    let topics = Topic::all(&*db)?;
    Ok(Json(TopicsResponse { topics }))
}
