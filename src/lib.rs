#[macro_use]
extern crate rocket;

#[macro_use]
extern crate diesel;

#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_derive;

pub mod api;
pub mod article;
pub mod comment;
pub mod config;
pub mod db;
pub mod topic;
pub mod types;
pub mod user;
mod utils;

use rocket::{Build, Rocket};

use config::Config;
use db::Store;

/// Assembles the server around an already opened store.
pub fn rocket(config: Config, store: Box<dyn Store>) -> Rocket<Build> {
    rocket::build()
        .manage(config)
        .manage(store)
        .mount(
            "/",
            routes![
                api::directory,
                topic::all,
                user::all,
                article::list,
                article::create,
                article::get,
                article::vote,
                article::delete,
                comment::list,
                comment::add,
            ],
        )
        .mount("/", api::method_not_allowed_routes())
        .register(
            "/",
            catchers![
                api::bad_request,
                api::not_found,
                api::unprocessable,
                api::internal_error
            ],
        )
}
