#![allow(dead_code)]

use news_api::config::{Backend, Config};
use news_api::db::memory::MemoryStore;
use rocket::local::blocking::{Client, LocalResponse};
use serde_json::Value;

/// A client over a freshly seeded in-memory store.
pub fn client() -> Client {
    let config = Config {
        backend: Backend::Memory,
        ..Config::default()
    };
    let rocket = news_api::rocket(config, Box::new(MemoryStore::seeded()));
    Client::tracked(rocket).expect("valid rocket instance")
}

pub fn body(response: LocalResponse) -> Value {
    response.into_json::<Value>().expect("json response body")
}

pub fn ids(values: &Value, key: &str) -> Vec<i64> {
    values
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v[key].as_i64().expect("integer id"))
        .collect()
}
