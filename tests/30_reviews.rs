mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{Actor, TestServer, DOWNTOWN_LA};
use devcamp_api::types::Role;

async fn post_review(server: &TestServer, actor: &Actor, bootcamp: &str, rating: i32) -> Result<reqwest::Response> {
    Ok(server
        .client
        .post(server.url(&format!("/bootcamps/{}/reviews", bootcamp)))
        .bearer_auth(&actor.token)
        .json(&json!({ "title": "Great program", "text": "Learned a ton", "rating": rating }))
        .send()
        .await?)
}

#[tokio::test]
async fn review_lifecycle_updates_average_rating() -> Result<()> {
    let server = TestServer::spawn().await?;
    let camp = server.create_bootcamp(&server.actor(Role::Publisher), "Rated Camp", DOWNTOWN_LA).await?;
    let camp_id = camp["id"].as_str().unwrap().to_string();

    let author = server.actor(Role::User);
    let res = post_review(&server, &author, &camp_id, 8).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let review: Value = res.json().await?;
    assert_eq!(review["data"]["bootcamp"], camp_id.as_str());
    assert_eq!(review["data"]["user"], json!(author.id));

    let res = post_review(&server, &server.actor(Role::User), &camp_id, 4).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = server.client.get(server.url(&format!("/bootcamps/{}", camp_id))).send().await?.json().await?;
    assert_eq!(body["data"]["averageRating"], 6.0);

    let body: Value = server
        .client
        .get(server.url(&format!("/bootcamps/{}/reviews", camp_id)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["count"], 2);

    let review_id = review["data"]["id"].as_str().unwrap();
    let body: Value = server.client.get(server.url(&format!("/reviews/{}", review_id))).send().await?.json().await?;
    assert_eq!(body["data"]["bootcamp"]["name"], "Rated Camp");
    assert!(body["data"]["bootcamp"]["description"].is_string());

    let res = server
        .client
        .delete(server.url(&format!("/reviews/{}", review_id)))
        .bearer_auth(&author.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"], json!({}));

    let body: Value = server.client.get(server.url(&format!("/bootcamps/{}", camp_id))).send().await?.json().await?;
    assert_eq!(body["data"]["averageRating"], 4.0);
    Ok(())
}

#[tokio::test]
async fn reviews_require_an_existing_bootcamp_and_are_unique() -> Result<()> {
    let server = TestServer::spawn().await?;
    let author = server.actor(Role::User);

    let res = post_review(&server, &author, &uuid::Uuid::new_v4().to_string(), 5).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let camp = server.create_bootcamp(&server.actor(Role::Publisher), "Unique Camp", DOWNTOWN_LA).await?;
    let camp_id = camp["id"].as_str().unwrap();
    assert_eq!(post_review(&server, &author, camp_id, 5).await?.status(), StatusCode::CREATED);
    assert_eq!(post_review(&server, &author, camp_id, 6).await?.status(), StatusCode::BAD_REQUEST);

    let publisher = server.actor(Role::Publisher);
    assert_eq!(post_review(&server, &publisher, camp_id, 6).await?.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn only_author_or_admin_may_change_a_review() -> Result<()> {
    let server = TestServer::spawn().await?;
    let camp = server.create_bootcamp(&server.actor(Role::Publisher), "Guarded Camp", DOWNTOWN_LA).await?;
    let author = server.actor(Role::User);
    let review: Value = post_review(&server, &author, camp["id"].as_str().unwrap(), 7).await?.json().await?;
    let path = format!("/reviews/{}", review["data"]["id"].as_str().unwrap());

    let stranger = server.actor(Role::User);
    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&stranger.token)
        .json(&json!({ "rating": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = server.client.get(server.url(&path)).send().await?.json().await?;
    assert_eq!(body["data"]["rating"], 7);

    let admin = server.actor(Role::Admin);
    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&admin.token)
        .json(&json!({ "rating": 2 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["rating"], 2);

    let missing = format!("/reviews/{}", uuid::Uuid::new_v4());
    let res = server
        .client
        .put(server.url(&missing))
        .bearer_auth(&admin.token)
        .json(&json!({ "rating": 4 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.delete(server.url(&missing)).bearer_auth(&admin.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn review_list_filters_by_rating() -> Result<()> {
    let server = TestServer::spawn().await?;
    let camp = server.create_bootcamp(&server.actor(Role::Publisher), "Filter Camp", DOWNTOWN_LA).await?;
    let camp_id = camp["id"].as_str().unwrap();
    for rating in [3, 7, 9] {
        post_review(&server, &server.actor(Role::User), camp_id, rating).await?;
    }

    let body: Value = server.client.get(server.url("/reviews?rating[gte]=7&sort=rating")).send().await?.json().await?;
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["rating"], 7);
    assert_eq!(body["data"][1]["rating"], 9);
    Ok(())
}
