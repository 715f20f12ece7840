//! The route registration table and the responses that are derived from it:
//! the `/api` directory, `405 Method Not Allowed` with its `Allow` header, and
//! the JSON catchers.

use rocket::http::{Method, Status};
use rocket::response::{self, Responder};
use rocket::route::{self, Handler, Route};
use rocket::serde::json::Json;
use rocket::{Data, Request};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

use crate::utils::try_respond;

pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
    pub description: &'static str,
    pub queries: &'static [&'static str],
    pub example_request: Option<&'static str>,
}

pub static ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        method: Method::Get,
        path: "/api",
        description: "serves a json representation of all the available endpoints of the api",
        queries: &[],
        example_request: None,
    },
    Endpoint {
        method: Method::Get,
        path: "/api/topics",
        description: "serves an array of all topics",
        queries: &[],
        example_request: None,
    },
    Endpoint {
        method: Method::Get,
        path: "/api/users",
        description: "serves an array of all users",
        queries: &[],
        example_request: None,
    },
    Endpoint {
        method: Method::Get,
        path: "/api/articles",
        description: "serves a page of articles with their comment counts and the total number of matches",
        queries: &["sort_by", "order", "topic", "author", "limit", "p"],
        example_request: None,
    },
    Endpoint {
        method: Method::Post,
        path: "/api/articles",
        description: "creates an article and serves it back",
        queries: &[],
        example_request: Some(r#"{"author":"butter_bridge","title":"...","body":"...","topic":"mitch","article_img_url":"..."}"#),
    },
    Endpoint {
        method: Method::Get,
        path: "/api/articles/<article_id>",
        description: "serves a single article with its comment count",
        queries: &[],
        example_request: None,
    },
    Endpoint {
        method: Method::Patch,
        path: "/api/articles/<article_id>",
        description: "adds inc_votes to the article's votes and serves the updated article",
        queries: &[],
        example_request: Some(r#"{"inc_votes":1}"#),
    },
    Endpoint {
        method: Method::Delete,
        path: "/api/articles/<article_id>",
        description: "deletes an article together with its comments",
        queries: &[],
        example_request: None,
    },
    Endpoint {
        method: Method::Get,
        path: "/api/articles/<article_id>/comments",
        description: "serves a page of an article's comments, newest first",
        queries: &["limit", "p"],
        example_request: None,
    },
    Endpoint {
        method: Method::Post,
        path: "/api/articles/<article_id>/comments",
        description: "adds a comment to an article and serves it back",
        queries: &[],
        example_request: Some(r#"{"username":"butter_bridge","body":"..."}"#),
    },
];

// HEAD is answered by Rocket from the GET route.
const METHODS: [Method; 6] = [
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Patch,
    Method::Delete,
    Method::Options,
];

/// Lower priority than every real route.
pub const METHOD_NOT_ALLOWED_RANK: isize = 100;

impl Endpoint {
    /// The path as clients write it, e.g. `/api/articles/:article_id`.
    pub fn display_path(&self) -> String {
        self.path.replace('<', ":").replace('>', "")
    }

    fn describe(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("description".into(), json!(self.description));
        if !self.queries.is_empty() {
            entry.insert("queries".into(), json!(self.queries));
        }
        if let Some(body) = self.example_request {
            let example = serde_json::from_str::<Value>(body).unwrap_or_else(|_| json!(body));
            entry.insert("exampleRequest".into(), example);
        }
        Value::Object(entry)
    }
}

pub fn allowed_methods(path: &str) -> Vec<Method> {
    ENDPOINTS
        .iter()
        .filter(|endpoint| endpoint.path == path)
        .map(|endpoint| endpoint.method)
        .collect()
}

lazy_static! {
    static ref DIRECTORY: Value = {
        let mut endpoints = Map::new();
        for endpoint in ENDPOINTS {
            let key = format!("{} {}", endpoint.method, endpoint.display_path());
            endpoints.insert(key, endpoint.describe());
        }
        json!({ "endpoints": endpoints })
    };
}

#[get("/api")]
pub fn directory() -> Json<&'static Value> {
    Json(&*DIRECTORY)
}

#[derive(Clone)]
struct MethodNotAllowed {
    allow: String,
}

impl<'r> Responder<'r, 'static> for MethodNotAllowed {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let body = json!({ "msg": "Method Not Allowed" });
        let mut response = try_respond(req, &body, Status::MethodNotAllowed)?;
        response.set_raw_header("Allow", self.allow);
        Ok(response)
    }
}

#[rocket::async_trait]
impl Handler for MethodNotAllowed {
    async fn handle<'r>(&self, req: &'r Request<'_>, _data: Data<'r>) -> route::Outcome<'r> {
        route::Outcome::from(req, self.clone())
    }
}

/// One low-ranked route per registered path and unsupported verb, answering
/// 405 with the verbs the path does support.
pub fn method_not_allowed_routes() -> Vec<Route> {
    let paths: BTreeSet<&str> = ENDPOINTS.iter().map(|endpoint| endpoint.path).collect();
    let mut routes = Vec::new();
    for path in paths {
        let allowed = allowed_methods(path);
        let allow = allowed
            .iter()
            .map(|method| method.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        for method in METHODS.iter().filter(|method| !allowed.contains(method)) {
            let handler = MethodNotAllowed {
                allow: allow.clone(),
            };
            routes.push(Route::ranked(METHOD_NOT_ALLOWED_RANK, *method, path, handler));
        }
    }
    routes
}

#[catch(400)]
pub fn bad_request() -> Json<Value> {
    Json(json!({ "msg": "Bad request" }))
}

// Well-formed JSON of the wrong shape is still just a bad request.
#[catch(422)]
pub fn unprocessable() -> (Status, Json<Value>) {
    (Status::BadRequest, Json(json!({ "msg": "Bad request" })))
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<Value> {
    Json(json!({ "msg": format!("Cannot {} {}", req.method(), req.uri().path()) }))
}

#[catch(500)]
pub fn internal_error() -> Json<Value> {
    Json(json!({ "msg": "Internal server error" }))
}
