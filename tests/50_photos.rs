mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

use common::{TestServer, DOWNTOWN_LA};
use devcamp_api::types::Role;

fn image(size: usize, name: &str, mime: &str) -> Result<Form> {
    let part = Part::bytes(vec![0xffu8; size]).file_name(name.to_string()).mime_str(mime)?;
    Ok(Form::new().part("file", part))
}

fn uploaded_files(server: &TestServer) -> usize {
    std::fs::read_dir(server.upload_dir.path()).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn valid_jpeg_is_renamed_and_recorded() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.actor(Role::Publisher);
    let camp = server.create_bootcamp(&owner, "Photo Camp", DOWNTOWN_LA).await?;
    let id = camp["id"].as_str().unwrap();

    let res = server
        .client
        .put(server.url(&format!("/bootcamps/{}/photo", id)))
        .bearer_auth(&owner.token)
        .multipart(image(500 * 1024, "campus.jpg", "image/jpeg")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let expected = format!("photo_{}.jpg", id);
    assert_eq!(res.json::<Value>().await?["data"], expected.as_str());
    assert!(server.upload_dir.path().join(&expected).exists());

    let body: Value = server.client.get(server.url(&format!("/bootcamps/{}", id))).send().await?.json().await?;
    assert_eq!(body["data"]["photo"], expected.as_str());
    Ok(())
}

#[tokio::test]
async fn oversized_file_is_rejected_before_writing() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.actor(Role::Publisher);
    let camp = server.create_bootcamp(&owner, "Big Photo Camp", DOWNTOWN_LA).await?;

    let res = server
        .client
        .put(server.url(&format!("/bootcamps/{}/photo", camp["id"].as_str().unwrap())))
        .bearer_auth(&owner.token)
        .multipart(image(2 * 1024 * 1024, "huge.jpg", "image/jpeg")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Please upload an image less than 1000000 bytes");
    assert_eq!(uploaded_files(&server), 0);
    Ok(())
}

#[tokio::test]
async fn uploads_over_the_request_limit_keep_check_order() -> Result<()> {
    let server = TestServer::spawn_with(|config| {
        config.api.max_request_size_bytes = 2 * 1024 * 1024;
        config.upload.max_file_upload = 1_000_000;
    })
    .await?;
    let owner = server.actor(Role::Publisher);
    let camp = server.create_bootcamp(&owner, "Limit Camp", DOWNTOWN_LA).await?;
    let url = server.url(&format!("/bootcamps/{}/photo", camp["id"].as_str().unwrap()));

    let res = server
        .client
        .put(server.url(&format!("/bootcamps/{}/photo", uuid::Uuid::new_v4())))
        .bearer_auth(&owner.token)
        .multipart(image(3 * 1024 * 1024, "huge.jpg", "image/jpeg")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let stranger = server.actor(Role::Publisher);
    let res = server
        .client
        .put(&url)
        .bearer_auth(&stranger.token)
        .multipart(image(3 * 1024 * 1024, "huge.jpg", "image/jpeg")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .put(&url)
        .bearer_auth(&owner.token)
        .multipart(image(2 * 1024 * 1024, "huge.jpg", "image/jpeg")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Please upload an image less than 1000000 bytes");

    assert_eq!(uploaded_files(&server), 0);
    Ok(())
}

#[tokio::test]
async fn non_images_and_missing_files_are_bad_requests() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.actor(Role::Publisher);
    let camp = server.create_bootcamp(&owner, "Text Camp", DOWNTOWN_LA).await?;
    let url = server.url(&format!("/bootcamps/{}/photo", camp["id"].as_str().unwrap()));

    let res = server
        .client
        .put(&url)
        .bearer_auth(&owner.token)
        .multipart(image(100, "notes.txt", "text/plain")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Please upload an image file");

    let res = server.client.put(&url).bearer_auth(&owner.token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Please upload a file");

    assert_eq!(uploaded_files(&server), 0);
    Ok(())
}

#[tokio::test]
async fn stranger_and_missing_bootcamp_fail_first() -> Result<()> {
    let server = TestServer::spawn().await?;
    let owner = server.actor(Role::Publisher);
    let camp = server.create_bootcamp(&owner, "Guarded Photo Camp", DOWNTOWN_LA).await?;

    let stranger = server.actor(Role::Publisher);
    let res = server
        .client
        .put(server.url(&format!("/bootcamps/{}/photo", camp["id"].as_str().unwrap())))
        .bearer_auth(&stranger.token)
        .multipart(image(100, "campus.jpg", "image/jpeg")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .put(server.url(&format!("/bootcamps/{}/photo", uuid::Uuid::new_v4())))
        .bearer_auth(&owner.token)
        .multipart(image(100, "campus.jpg", "image/jpeg")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(uploaded_files(&server), 0);
    Ok(())
}

#[tokio::test]
async fn storage_failure_is_internal_error() -> Result<()> {
    let server = TestServer::spawn_with(|config| {
        config.upload.file_upload_path = std::env::temp_dir().join(format!("devcamp-missing-{}", uuid::Uuid::new_v4()));
    })
    .await?;
    let owner = server.actor(Role::Publisher);
    let camp = server.create_bootcamp(&owner, "Broken Disk Camp", DOWNTOWN_LA).await?;

    let res = server
        .client
        .put(server.url(&format!("/bootcamps/{}/photo", camp["id"].as_str().unwrap())))
        .bearer_auth(&owner.token)
        .multipart(image(100, "campus.jpg", "image/jpeg")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<Value>().await?["error"], "Problem with file upload");
    Ok(())
}
