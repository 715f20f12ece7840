use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use rocket::http::Status;
use rocket::outcome::try_outcome;
use rocket::request::{self, FromRequest, Outcome};
use rocket::{Request, State};
use std::error::Error as StdError;
use std::fmt;
use std::ops::Deref;

use crate::article::query::{ArticlePage, ArticleQuery, Pagination};
use crate::article::{Article, NewArticle};
use crate::comment::{Comment, NewComment};
use crate::topic::Topic;
use crate::user::User;

pub mod memory;
pub mod pg;
pub mod schema;
mod seed;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

error_chain! {
    foreign_links {
        ParseInt(::std::num::ParseIntError);
        R2D2(r2d2::Error);
    }

    errors {
        UnknownBackend(name: String) {
            description("unknown store backend")
            display("unknown store backend: '{}'", name)
        }
        MissingDatabaseUrl {
            description("DATABASE_URL must be set for the postgres store")
            display("DATABASE_URL must be set for the postgres store")
        }
        InvalidSetting(key: String, value: String) {
            description("invalid setting")
            display("invalid value for {}: '{}'", key, value)
        }
    }
}

pub fn init_pool(database_url: &str, max_size: u32) -> Result<Pool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(r2d2::Pool::builder().max_size(max_size).build(manager)?)
}

/// Classification of a store failure, mirroring the SQLSTATE the error
/// pipeline cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    InvalidTextRepresentation,
    ForeignKeyViolation,
    NotNullViolation,
    Other,
}

impl StoreErrorKind {
    pub fn code(&self) -> Option<&'static str> {
        match *self {
            StoreErrorKind::InvalidTextRepresentation => Some("22P02"),
            StoreErrorKind::ForeignKeyViolation => Some("23503"),
            StoreErrorKind::NotNullViolation => Some("23502"),
            StoreErrorKind::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreError {
    kind: StoreErrorKind,
    detail: String,
}

impl StoreError {
    pub fn new<D: Into<String>>(kind: StoreErrorKind, detail: D) -> Self {
        StoreError {
            kind,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind.code() {
            Some(code) => write!(f, "store error {}: {}", code, self.detail),
            None => write!(f, "store error: {}", self.detail),
        }
    }
}

impl StdError for StoreError {}

pub type StoreResult<T> = ::std::result::Result<T, StoreError>;

/// The capability the request handlers run their queries through.
///
/// Implementations own the rows; callers never hold on to them across
/// requests. `increment_votes` must apply the delta in one atomic step and
/// return `None` when the article is absent or the result would go below
/// zero, leaving the stored value untouched.
pub trait Store: Send + Sync {
    fn topics(&self) -> StoreResult<Vec<Topic>>;

    fn users(&self) -> StoreResult<Vec<User>>;

    fn article(&self, article_id: i32) -> StoreResult<Option<Article>>;

    fn articles(&self, query: &ArticleQuery) -> StoreResult<ArticlePage>;

    fn comment_count(&self, article_id: i32) -> StoreResult<i64>;

    fn comments(&self, article_id: i32, page: Pagination) -> StoreResult<Vec<Comment>>;

    fn increment_votes(&self, article_id: i32, delta: i32) -> StoreResult<Option<Article>>;

    fn insert_article(&self, article: &NewArticle) -> StoreResult<Article>;

    fn insert_comment(&self, article_id: i32, comment: &NewComment) -> StoreResult<Comment>;

    /// Removes the article and its comments together. Returns whether an
    /// article was removed.
    fn delete_article(&self, article_id: i32) -> StoreResult<bool>;
}

pub struct Db<'r>(&'r dyn Store);

/// Borrows the managed store for the duration of the request. If no store is
/// managed, fails with an `InternalServerError` status.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Db<'r> {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, ()> {
        let store = try_outcome!(request
            .guard::<&State<Box<dyn Store>>>()
            .await
            .map_error(|_| (Status::InternalServerError, ())));
        Outcome::Success(Db(&**store.inner()))
    }
}

// For the convenience of using a &Db as a &dyn Store.
impl<'r> Deref for Db<'r> {
    type Target = dyn Store + 'r;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}
