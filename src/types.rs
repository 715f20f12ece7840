use rocket::http::Status;
use rocket::request::Request;
use rocket::response::status::Custom;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use serde_json::json;
use tracing::{debug, error};

use crate::db::{StoreError, StoreErrorKind};
use crate::utils::try_respond;

pub trait Validate
where
    Self: Sized,
{
    type Validated;
    fn validate(self) -> Result<Self::Validated, ApiError>;
}

/// The kind of resource a not-found failure refers to. The message is part of
/// the public contract: a comment posted by an unknown user still reports
/// "Article not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Article,
    Comments,
}

impl Resource {
    pub fn not_found_message(self) -> &'static str {
        match self {
            Resource::Article => "Article not found",
            Resource::Comments => "Comments not found",
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    MalformedIdentifier(String),
    MissingField(&'static str),
    InvalidFilter(String),
    NotFound(Resource),
    VoteFloorViolation { article_id: i32, delta: i32 },
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> ApiError {
        ApiError::Store(err)
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub type Created<T> = Result<Custom<Json<T>>, ApiError>;

/// The externally visible outcome of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub status: Status,
    pub msg: &'static str,
}

const BAD_REQUEST: Translation = Translation {
    status: Status::BadRequest,
    msg: "Bad request",
};

type Classifier = fn(&ApiError) -> Option<Translation>;

// Evaluated in order; the first classifier that matches decides the outcome.
const PIPELINE: [Classifier; 4] = [
    classify_bad_request,
    classify_not_found,
    classify_referential,
    classify_not_acceptable,
];

fn classify_bad_request(err: &ApiError) -> Option<Translation> {
    match err {
        ApiError::MalformedIdentifier(_) | ApiError::MissingField(_) | ApiError::InvalidFilter(_) => {
            Some(BAD_REQUEST)
        }
        ApiError::Store(e) if e.kind() == StoreErrorKind::InvalidTextRepresentation => {
            Some(BAD_REQUEST)
        }
        _ => None,
    }
}

fn classify_not_found(err: &ApiError) -> Option<Translation> {
    match err {
        ApiError::NotFound(resource) => Some(Translation {
            status: Status::NotFound,
            msg: resource.not_found_message(),
        }),
        _ => None,
    }
}

fn classify_referential(err: &ApiError) -> Option<Translation> {
    match err {
        ApiError::Store(e) => match e.kind() {
            StoreErrorKind::ForeignKeyViolation => Some(Translation {
                status: Status::NotFound,
                msg: Resource::Article.not_found_message(),
            }),
            StoreErrorKind::NotNullViolation => Some(BAD_REQUEST),
            _ => None,
        },
        _ => None,
    }
}

fn classify_not_acceptable(err: &ApiError) -> Option<Translation> {
    match err {
        ApiError::VoteFloorViolation { .. } => Some(Translation {
            status: Status::NotAcceptable,
            msg: "Not Acceptable",
        }),
        _ => None,
    }
}

/// Maps a failure onto its response. `None` means no classifier claimed it
/// and the request ends as an internal error.
pub fn translate(err: &ApiError) -> Option<Translation> {
    PIPELINE.iter().find_map(|classify| classify(err))
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match translate(&self) {
            Some(translation) => {
                debug!(
                    error = ?self,
                    status = translation.status.code,
                    uri = %req.uri(),
                    "request rejected"
                );
                let body = json!({ "msg": translation.msg });
                try_respond(req, &body, translation.status)
            }
            None => {
                error!(error = ?self, uri = %req.uri(), "unclassified failure");
                Err(Status::InternalServerError)
            }
        }
    }
}
