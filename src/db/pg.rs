use diesel::dsl::count;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Nullable, Text};

use crate::article::query::{ArticlePage, ArticleQuery, Pagination};
use crate::article::{Article, ArticleSummary, NewArticle};
use crate::comment::{Comment, NewComment};
use crate::topic::Topic;
use crate::user::User;

use super::schema::{articles, comments, topics, users};
use super::{Pool, Store, StoreError, StoreErrorKind, StoreResult};

// $1 topic filter, $2 author filter; both optional.
static ARTICLE_FILTER: &str = "($1::varchar IS NULL OR articles.topic = $1)
   AND ($2::varchar IS NULL OR articles.author = $2)";

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> StoreError {
        match err {
            DieselError::DatabaseError(kind, info) => {
                let kind = match kind {
                    DatabaseErrorKind::ForeignKeyViolation => StoreErrorKind::ForeignKeyViolation,
                    DatabaseErrorKind::NotNullViolation => StoreErrorKind::NotNullViolation,
                    _ if info.message().starts_with("invalid input syntax") => {
                        StoreErrorKind::InvalidTextRepresentation
                    }
                    _ => StoreErrorKind::Other,
                };
                StoreError::new(kind, info.message())
            }
            other => StoreError::new(StoreErrorKind::Other, other.to_string()),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> StoreError {
        StoreError::new(StoreErrorKind::Other, err.to_string())
    }
}

#[derive(QueryableByName)]
struct Total {
    #[diesel(sql_type = BigInt)]
    total_count: i64,
}

pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        PgStore { pool }
    }

    fn connection(&self) -> StoreResult<PooledConnection<ConnectionManager<PgConnection>>> {
        Ok(self.pool.get()?)
    }
}

impl Store for PgStore {
    fn topics(&self) -> StoreResult<Vec<Topic>> {
        let mut conn = self.connection()?;
        Ok(topics::table
            .select(Topic::as_select())
            .order(topics::slug.asc())
            .load(&mut conn)?)
    }

    fn users(&self) -> StoreResult<Vec<User>> {
        let mut conn = self.connection()?;
        Ok(users::table
            .select(User::as_select())
            .order(users::username.asc())
            .load(&mut conn)?)
    }

    fn article(&self, article_id: i32) -> StoreResult<Option<Article>> {
        let mut conn = self.connection()?;
        Ok(articles::table
            .find(article_id)
            .select(Article::as_select())
            .first(&mut conn)
            .optional()?)
    }

    fn articles(&self, query: &ArticleQuery) -> StoreResult<ArticlePage> {
        let mut conn = self.connection()?;
        // The sort column comes from the allow-list, never from the request.
        let listing = format!(
            "SELECT articles.article_id, articles.title, articles.topic, articles.author,
                    articles.created_at, articles.votes, articles.article_img_url,
                    COUNT(comments.comment_id) AS comment_count
               FROM articles
               LEFT JOIN comments ON comments.article_id = articles.article_id
              WHERE {filter}
              GROUP BY articles.article_id
              ORDER BY {column} {direction}, articles.article_id ASC
              LIMIT $3 OFFSET $4",
            filter = ARTICLE_FILTER,
            column = query.sort_by.column(),
            direction = query.order.keyword(),
        );
        let articles = sql_query(listing)
            .bind::<Nullable<Text>, _>(query.topic.as_deref())
            .bind::<Nullable<Text>, _>(query.author.as_deref())
            .bind::<BigInt, _>(query.page.limit())
            .bind::<BigInt, _>(query.page.offset())
            .load::<ArticleSummary>(&mut conn)?;

        let total = sql_query(format!(
            "SELECT COUNT(*) AS total_count FROM articles WHERE {}",
            ARTICLE_FILTER
        ))
        .bind::<Nullable<Text>, _>(query.topic.as_deref())
        .bind::<Nullable<Text>, _>(query.author.as_deref())
        .get_result::<Total>(&mut conn)?;

        Ok(ArticlePage {
            articles,
            total_count: total.total_count,
        })
    }

    fn comment_count(&self, article_id: i32) -> StoreResult<i64> {
        let mut conn = self.connection()?;
        Ok(comments::table
            .filter(comments::article_id.eq(article_id))
            .select(count(comments::comment_id))
            .get_result(&mut conn)?)
    }

    fn comments(&self, article_id: i32, page: Pagination) -> StoreResult<Vec<Comment>> {
        let mut conn = self.connection()?;
        Ok(comments::table
            .filter(comments::article_id.eq(article_id))
            .order((comments::created_at.desc(), comments::comment_id.desc()))
            .limit(page.limit())
            .offset(page.offset())
            .select(Comment::as_select())
            .load(&mut conn)?)
    }

    fn increment_votes(&self, article_id: i32, delta: i32) -> StoreResult<Option<Article>> {
        let mut conn = self.connection()?;
        let target = articles::table
            .find(article_id)
            .filter((articles::votes + delta).ge(0));
        Ok(diesel::update(target)
            .set(articles::votes.eq(articles::votes + delta))
            .returning(Article::as_returning())
            .get_result(&mut conn)
            .optional()?)
    }

    fn insert_article(&self, new: &NewArticle) -> StoreResult<Article> {
        let mut conn = self.connection()?;
        Ok(diesel::insert_into(articles::table)
            .values(new)
            .returning(Article::as_returning())
            .get_result(&mut conn)?)
    }

    fn insert_comment(&self, article_id: i32, new: &NewComment) -> StoreResult<Comment> {
        let mut conn = self.connection()?;
        Ok(diesel::insert_into(comments::table)
            .values((comments::article_id.eq(article_id), new))
            .returning(Comment::as_returning())
            .get_result(&mut conn)?)
    }

    fn delete_article(&self, article_id: i32) -> StoreResult<bool> {
        let mut conn = self.connection()?;
        let deleted = conn.transaction::<_, DieselError, _>(|conn| {
            diesel::delete(comments::table.filter(comments::article_id.eq(article_id))).execute(conn)?;
            diesel::delete(articles::table.find(article_id)).execute(conn)
        })?;
        Ok(deleted > 0)
    }
}
