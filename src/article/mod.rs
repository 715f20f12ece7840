use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{debug, info};

use crate::config::Config;
use crate::db::{Db, Store};
use crate::types::{ApiError, ApiResult, Created, Resource, Validate};
use crate::utils::parse_id;

pub mod models;
pub mod query;

pub use self::models::*;
use self::query::{ArticlePage, ArticleParams, ArticleQuery};

impl Article {
    pub fn load(article_id: i32, store: &dyn Store) -> Result<Article, ApiError> {
        store
            .article(article_id)?
            .ok_or(ApiError::NotFound(Resource::Article))
    }

    /// Adds `delta` to the article's votes. The store applies the change as a
    /// single conditional update, so a result below zero leaves the row as it
    /// was. A refused update is only a floor violation if the article is
    /// still there afterwards.
    pub fn apply_vote_delta(article_id: i32, delta: i32, store: &dyn Store) -> Result<Article, ApiError> {
        if let Some(article) = store.increment_votes(article_id, delta)? {
            return Ok(article);
        }
        let current = Article::load(article_id, store)?;
        debug!(
            article_id,
            votes = current.votes,
            delta,
            "vote delta would drop below zero"
        );
        Err(ApiError::VoteFloorViolation { article_id, delta })
    }

    pub fn delete(article_id: i32, store: &dyn Store) -> Result<(), ApiError> {
        if store.delete_article(article_id)? {
            info!(article_id, "deleted article and its comments");
            Ok(())
        } else {
            Err(ApiError::NotFound(Resource::Article))
        }
    }
}

impl ArticleDetail {
    pub fn load(article_id: i32, store: &dyn Store) -> Result<ArticleDetail, ApiError> {
        let article = Article::load(article_id, store)?;
        let comment_count = store.comment_count(article_id)?;
        Ok(ArticleDetail {
            article,
            comment_count,
        })
    }
}

impl NewArticle {
    pub fn insert(&self, store: &dyn Store) -> Result<ArticleDetail, ApiError> {
        let article = store.insert_article(self)?;
        info!(article_id = article.article_id, author = %article.author, "created article");
        Ok(ArticleDetail {
            article,
            comment_count: 0,
        })
    }
}

impl ArticleQuery {
    pub fn load(&self, store: &dyn Store) -> Result<ArticlePage, ApiError> {
        store.articles(self).map_err(|e| e.into())
    }
}

#[get("/api/articles?<params..>")]
pub fn list(db: Db<'_>, config: &State<Config>, params: ArticleParams) -> ApiResult<ArticlePage> {
    let query = params.resolve(config.default_limit, &*db)?;
    let page = query.load(&*db)?;
    Ok(Json(page))
}

#[post("/api/articles", data = "<details>")]
pub fn create(db: Db<'_>, details: Json<ArticleDetails>) -> Created<ArticleResponse<ArticleDetail>> {
    let new_article = details.into_inner().validate()?;
    let article = new_article.insert(&*db)?;
    Ok(Custom(Status::Created, Json(ArticleResponse { article })))
}

#[get("/api/articles/<article_id>")]
pub fn get(db: Db<'_>, article_id: &str) -> ApiResult<ArticleResponse<ArticleDetail>> {
    let article_id = parse_id(article_id)?;
    let article = ArticleDetail::load(article_id, &*db)?;
    Ok(Json(ArticleResponse { article }))
}

#[patch("/api/articles/<article_id>", data = "<update>")]
pub fn vote(db: Db<'_>, article_id: &str, update: Json<VoteUpdate>) -> ApiResult<ArticleResponse<Article>> {
    let article_id = parse_id(article_id)?;
    let delta = update.inc_votes.ok_or(ApiError::MissingField("inc_votes"))?;
    let article = Article::apply_vote_delta(article_id, delta, &*db)?;
    Ok(Json(ArticleResponse { article }))
}

#[delete("/api/articles/<article_id>")]
pub fn delete(db: Db<'_>, article_id: &str) -> Result<Status, ApiError> {
    let article_id = parse_id(article_id)?;
    Article::delete(article_id, &*db)?;
    Ok(Status::NoContent)
}

#[cfg(test)]
mod tests {
    use super::query::{Order, Pagination, SortBy};
    use super::*;
    use crate::comment::{Comment, NewComment};
    use crate::db::memory::MemoryStore;
    use crate::db::StoreResult;
    use crate::topic::Topic;
    use crate::user::User;

    fn first_page() -> ArticleQuery {
        ArticleQuery::new(Pagination::new(100, 1).unwrap())
    }

    #[test]
    fn load_reports_missing_article() {
        let store = MemoryStore::seeded();
        assert_eq!(Article::load(1, &store).unwrap().author, "butter_bridge");
        match Article::load(999_999, &store) {
            Err(ApiError::NotFound(Resource::Article)) => {}
            other => panic!("expected article not found, got {:?}", other),
        }
    }

    #[test]
    fn detail_counts_comments() {
        let store = MemoryStore::seeded();
        assert_eq!(ArticleDetail::load(1, &store).unwrap().comment_count, 11);
        assert_eq!(ArticleDetail::load(7, &store).unwrap().comment_count, 0);
    }

    #[test]
    fn votes_compound() {
        let store = MemoryStore::seeded();
        assert_eq!(Article::apply_vote_delta(1, 1, &store).unwrap().votes, 101);
        assert_eq!(Article::apply_vote_delta(1, 1, &store).unwrap().votes, 102);
        assert_eq!(Article::apply_vote_delta(1, -102, &store).unwrap().votes, 0);
    }

    #[test]
    fn votes_never_drop_below_zero() {
        let store = MemoryStore::seeded();
        match Article::apply_vote_delta(1, -101, &store) {
            Err(ApiError::VoteFloorViolation { article_id, delta }) => {
                assert_eq!((article_id, delta), (1, -101));
            }
            other => panic!("expected vote floor violation, got {:?}", other),
        }
        assert_eq!(Article::load(1, &store).unwrap().votes, 100);
    }

    #[test]
    fn voting_on_missing_article_is_not_found() {
        let store = MemoryStore::seeded();
        match Article::apply_vote_delta(123, 1, &store) {
            Err(ApiError::NotFound(Resource::Article)) => {}
            other => panic!("expected article not found, got {:?}", other),
        }
    }

    /// Deletes the article just before the vote lands.
    struct DeletedMidVote(MemoryStore);

    impl Store for DeletedMidVote {
        fn topics(&self) -> StoreResult<Vec<Topic>> {
            self.0.topics()
        }

        fn users(&self) -> StoreResult<Vec<User>> {
            self.0.users()
        }

        fn article(&self, article_id: i32) -> StoreResult<Option<Article>> {
            self.0.article(article_id)
        }

        fn articles(&self, query: &ArticleQuery) -> StoreResult<ArticlePage> {
            self.0.articles(query)
        }

        fn comment_count(&self, article_id: i32) -> StoreResult<i64> {
            self.0.comment_count(article_id)
        }

        fn comments(&self, article_id: i32, page: Pagination) -> StoreResult<Vec<Comment>> {
            self.0.comments(article_id, page)
        }

        fn increment_votes(&self, article_id: i32, delta: i32) -> StoreResult<Option<Article>> {
            self.0.delete_article(article_id)?;
            self.0.increment_votes(article_id, delta)
        }

        fn insert_article(&self, article: &NewArticle) -> StoreResult<Article> {
            self.0.insert_article(article)
        }

        fn insert_comment(&self, article_id: i32, comment: &NewComment) -> StoreResult<Comment> {
            self.0.insert_comment(article_id, comment)
        }

        fn delete_article(&self, article_id: i32) -> StoreResult<bool> {
            self.0.delete_article(article_id)
        }
    }

    #[test]
    fn vote_on_article_deleted_mid_request_is_not_found() {
        let store = DeletedMidVote(MemoryStore::seeded());
        match Article::apply_vote_delta(1, -1000, &store) {
            Err(ApiError::NotFound(Resource::Article)) => {}
            other => panic!("expected article not found, got {:?}", other),
        }
    }

    #[test]
    fn listing_is_sorted_with_stable_ties() {
        let store = MemoryStore::seeded();
        let page = first_page().load(&store).unwrap();
        assert_eq!(page.total_count, 13);
        let ids: Vec<i32> = page.articles.iter().map(|a| a.article_id).collect();
        assert_eq!(ids, vec![3, 6, 2, 12, 13, 5, 1, 9, 10, 4, 8, 11, 7]);
    }

    #[test]
    fn listing_sorts_by_any_allowed_column() {
        let store = MemoryStore::seeded();
        for sort_by in SortBy::ALL.iter() {
            for order in &[Order::Asc, Order::Desc] {
                let mut query = first_page();
                query.sort_by = *sort_by;
                query.order = *order;
                let page = query.load(&store).unwrap();
                for pair in page.articles.windows(2) {
                    assert_ne!(
                        query.compare(&pair[0], &pair[1]),
                        std::cmp::Ordering::Greater,
                        "{:?} {:?}",
                        sort_by,
                        order
                    );
                }
            }
        }
    }

    #[test]
    fn listing_filters_and_paginates() {
        let store = MemoryStore::seeded();
        let mut query = ArticleQuery::new(Pagination::new(2, 2).unwrap());
        query.author = Some("butter_bridge".into());
        let page = query.load(&store).unwrap();
        assert_eq!(page.total_count, 4);
        let ids: Vec<i32> = page.articles.iter().map(|a| a.article_id).collect();
        assert_eq!(ids, vec![1, 9]);

        let mut query = first_page();
        query.topic = Some("paper".into());
        let page = query.load(&store).unwrap();
        assert_eq!(page.total_count, 0);
        assert!(page.articles.is_empty());
    }

    #[test]
    fn created_articles_start_without_votes() {
        let store = MemoryStore::seeded();
        let details = ArticleDetails {
            author: Some("lurker".into()),
            title: Some("Finally posting".into()),
            body: Some("Long time reader.".into()),
            topic: Some("paper".into()),
            article_img_url: None,
        };
        let created = details.validate().unwrap().insert(&store).unwrap();
        assert_eq!(created.article.article_id, 14);
        assert_eq!(created.article.votes, 0);
        assert_eq!(created.comment_count, 0);
        assert_eq!(created.article.article_img_url, DEFAULT_ARTICLE_IMG_URL);
    }

    #[test]
    fn article_creation_requires_fields() {
        let details = ArticleDetails {
            author: Some("lurker".into()),
            title: None,
            ..ArticleDetails::default()
        };
        match details.validate() {
            Err(ApiError::MissingField("title")) => {}
            other => panic!("expected missing title, got {:?}", other),
        }
    }

    #[test]
    fn delete_removes_comments_too() {
        let store = MemoryStore::seeded();
        Article::delete(1, &store).unwrap();
        assert!(store.article(1).unwrap().is_none());
        match Comment::list_for(1, Pagination::new(100, 1).unwrap(), &store) {
            Err(ApiError::NotFound(Resource::Comments)) => {}
            other => panic!("expected comments not found, got {:?}", other),
        }
        assert_eq!(first_page().load(&store).unwrap().total_count, 12);

        match Article::delete(1, &store) {
            Err(ApiError::NotFound(Resource::Article)) => {}
            other => panic!("expected article not found, got {:?}", other),
        }
    }
}
