mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;
use devcamp_api::types::Role;

#[tokio::test]
async fn users_are_admin_only() -> Result<()> {
    let server = TestServer::spawn().await?;

    for role in [Role::User, Role::Publisher] {
        let actor = server.actor(role);
        let res = server.client.get(server.url("/users")).bearer_auth(&actor.token).send().await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = res.json().await?;
        assert_eq!(body["error"], format!("User role {} is not authorized to access this route", role));
    }

    let res = server.client.get(server.url("/users")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_manages_users() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.actor(Role::Admin);

    let res = server
        .client
        .post(server.url("/users"))
        .bearer_auth(&admin.token)
        .json(&json!({ "name": "Mary Williams", "email": "mary@gmail.com", "role": "publisher", "password": "123456" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    assert_eq!(created["data"]["role"], "publisher");
    assert!(created["data"].get("password").is_none());
    assert!(created["data"].get("passwordHash").is_none());
    let path = format!("/users/{}", created["data"]["id"].as_str().unwrap());

    let res = server
        .client
        .post(server.url("/users"))
        .bearer_auth(&admin.token)
        .json(&json!({ "name": "Copy", "email": "mary@gmail.com", "password": "123456" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&admin.token)
        .json(&json!({ "name": "Mary W." }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["name"], "Mary W.");

    let body: Value = server.client.get(server.url("/users")).bearer_auth(&admin.token).send().await?.json().await?;
    assert_eq!(body["count"], 1);

    let res = server.client.delete(server.url(&path)).bearer_auth(&admin.token).send().await?;
    assert_eq!(res.json::<Value>().await?, json!({ "success": true, "data": {} }));

    let res = server.client.get(server.url(&path)).bearer_auth(&admin.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&admin.token)
        .json(&json!({ "name": "Gone" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn short_passwords_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.actor(Role::Admin);

    let res = server
        .client
        .post(server.url("/users"))
        .bearer_auth(&admin.token)
        .json(&json!({ "name": "Short", "email": "short@gmail.com", "password": "123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}
