use diesel::prelude::*;
use rocket::serde::json::Json;

use crate::db::schema::users;
use crate::db::{Db, Store};
use crate::types::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
}

impl User {
    pub fn all(store: &dyn Store) -> Result<Vec<User>, ApiError> {
        store.users().map_err(|e| e.into())
    }

    pub fn exists(username: &str, store: &dyn Store) -> Result<bool, ApiError> {
        Ok(User::all(store)?.iter().any(|user| user.username == username))
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    users: Vec<User>,
}

#[get("/api/users")]
pub fn all(db: Db<'_>) -> ApiResult<UsersResponse> {
    let users = User::all(&*db)?;
    Ok(Json(UsersResponse { users }))
}
