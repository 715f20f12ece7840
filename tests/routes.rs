mod common;

use common::{body, client};
use rocket::http::Status;
use serde_json::json;

#[test]
fn serves_the_endpoint_directory() {
    let client = client();
    let response = client.get("/api").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let directory = body(response);
    let endpoints = directory["endpoints"].as_object().unwrap();
    assert!(endpoints["GET /api"]["description"].is_string());
    assert!(endpoints.contains_key("GET /api/topics"));
    assert!(endpoints.contains_key("DELETE /api/articles/:article_id"));
    assert_eq!(
        endpoints["POST /api/articles/:article_id/comments"]["exampleRequest"]["username"],
        "butter_bridge"
    );
}

#[test]
fn serves_topics() {
    let client = client();
    let response = client.get("/api/topics").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let topics = body(response)["topics"].clone();
    let topics = topics.as_array().unwrap();
    assert_eq!(topics.len(), 3);
    for topic in topics {
        assert!(topic["slug"].is_string());
        assert!(topic["description"].is_string());
    }
}

#[test]
fn serves_users() {
    let client = client();
    let response = client.get("/api/users").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let users = body(response)["users"].clone();
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 4);
    for user in users {
        assert!(user["username"].is_string());
        assert!(user["name"].is_string());
        assert!(user["avatar_url"].is_string());
    }
}

#[test]
fn unknown_paths_name_the_request() {
    let client = client();
    let response = client.get("/not-a-route").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "Cannot GET /not-a-route" }));

    let response = client.delete("/api/nope").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response), json!({ "msg": "Cannot DELETE /api/nope" }));
}

#[test]
fn unsupported_verbs_are_not_allowed() {
    let client = client();
    let response = client.post("/api/topics").dispatch();
    assert_eq!(response.status(), Status::MethodNotAllowed);
    assert_eq!(response.headers().get_one("Allow"), Some("GET"));
    assert_eq!(body(response), json!({ "msg": "Method Not Allowed" }));

    for response in vec![
        client.patch("/api/topics").dispatch(),
        client.delete("/api/topics").dispatch(),
        client.put("/api/users").dispatch(),
        client.options("/api/topics").dispatch(),
    ] {
        assert_eq!(response.status(), Status::MethodNotAllowed);
        assert_eq!(response.headers().get_one("Allow"), Some("GET"));
    }

    let response = client.put("/api/articles/1").dispatch();
    assert_eq!(response.status(), Status::MethodNotAllowed);
    assert_eq!(response.headers().get_one("Allow"), Some("GET, PATCH, DELETE"));

    let response = client.delete("/api/articles").dispatch();
    assert_eq!(response.status(), Status::MethodNotAllowed);
    assert_eq!(response.headers().get_one("Allow"), Some("GET, POST"));

    let response = client.patch("/api/articles/1/comments").dispatch();
    assert_eq!(response.status(), Status::MethodNotAllowed);
    assert_eq!(response.headers().get_one("Allow"), Some("GET, POST"));

    let response = client.options("/api/articles/1").dispatch();
    assert_eq!(response.status(), Status::MethodNotAllowed);
    assert_eq!(response.headers().get_one("Allow"), Some("GET, PATCH, DELETE"));
    assert_eq!(body(response), json!({ "msg": "Method Not Allowed" }));
}

#[test]
fn unclassified_failures_hide_their_detail() {
    let client = client();
    let response = client
        .patch("/api/articles/1")
        .json(&json!({ "inc_votes": i32::MAX }))
        .dispatch();
    assert_eq!(response.status(), Status::InternalServerError);
    assert_eq!(body(response), json!({ "msg": "Internal server error" }));

    let article = body(client.get("/api/articles/1").dispatch());
    assert_eq!(article["article"]["votes"], 100);
}
