use std::path::Path;

use tracing::{error, info};
use uuid::Uuid;

use super::bootcamps::{fetch, PUBLISHER_ROLES};
use crate::auth::{ensure_can_mutate, ensure_role};
use crate::database::models::Bootcamp;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// A file pulled out of the multipart body.
///
/// `size` counts every byte the client sent for the field. When it goes over
/// the upload limit the reader stops keeping `bytes`, so the two can differ.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub size: u64,
}

impl PhotoUpload {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self { file_name: file_name.into(), content_type, bytes, size }
    }
}

/// `photo_<id><ext>`, keeping the extension of the uploaded name
pub fn photo_file_name(bootcamp: Uuid, original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!("photo_{}{}", bootcamp, ext)
}

/// Role, existence and ownership checks. Runs before the body is read.
pub async fn authorize_upload(state: &AppState, actor: &AuthUser, id: Uuid) -> Result<Bootcamp, ApiError> {
    ensure_role(actor, PUBLISHER_ROLES)?;

    let bootcamp = fetch(state, id).await?;
    ensure_can_mutate(actor, bootcamp.user, "bootcamp")?;
    Ok(bootcamp)
}

/// File checks for an authorized bootcamp, then the write. Returns the stored name.
pub async fn store_photo(
    state: &AppState,
    bootcamp: &Bootcamp,
    upload: Option<PhotoUpload>,
) -> Result<String, ApiError> {
    let upload = upload.ok_or_else(|| ApiError::bad_request("Please upload a file"))?;

    if !upload.content_type.as_deref().is_some_and(|ct| ct.starts_with("image")) {
        return Err(ApiError::bad_request("Please upload an image file"));
    }

    let max = state.config.upload.max_file_upload;
    if upload.size > max {
        return Err(ApiError::bad_request(format!("Please upload an image less than {} bytes", max)));
    }

    let name = photo_file_name(bootcamp.id, &upload.file_name);
    let target = state.config.upload.file_upload_path.join(&name);

    tokio::fs::write(&target, &upload.bytes).await.map_err(|e| {
        error!("Failed to write {}: {}", target.display(), e);
        ApiError::internal_server_error("Problem with file upload")
    })?;

    state.bootcamps.set_photo(bootcamp.id, &name).await?;
    info!("Stored photo {} ({} bytes) for bootcamp {}", name, upload.size, bootcamp.id);
    Ok(name)
}

/// Store a bootcamp photo and point the record at it. Returns the stored name.
///
/// Checks run in a fixed order and nothing touches the filesystem until all
/// of them pass.
pub async fn upload_photo(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
    upload: Option<PhotoUpload>,
) -> Result<String, ApiError> {
    let bootcamp = authorize_upload(state, actor, id).await?;
    store_photo(state, &bootcamp, upload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::{Bootcamp, BootcampInput};
    use crate::geo::StaticGeocoder;
    use crate::types::Role;
    use std::sync::Arc;

    async fn setup(upload_dir: &Path) -> (AppState, AuthUser, Uuid) {
        let mut config = AppConfig::development();
        config.upload.file_upload_path = upload_dir.to_path_buf();
        config.upload.max_file_upload = 1_000_000;
        let state = AppState::in_memory(config, Arc::new(StaticGeocoder::default()));

        let owner = AuthUser { id: Uuid::new_v4(), role: Role::Publisher };
        let camp = Bootcamp::new(owner.id, BootcampInput { name: Some("Photo Camp".into()), ..Default::default() });
        state.bootcamps.insert(&camp).await.unwrap();
        (state, owner, camp.id)
    }

    fn jpeg(size: usize) -> PhotoUpload {
        PhotoUpload::new("campus.jpg", Some("image/jpeg".into()), vec![0xff; size])
    }

    #[test]
    fn names_keep_the_extension() {
        let id = Uuid::new_v4();
        assert_eq!(photo_file_name(id, "me.jpeg"), format!("photo_{}.jpeg", id));
        assert_eq!(photo_file_name(id, "noext"), format!("photo_{}", id));
    }

    #[tokio::test]
    async fn stores_renamed_file() {
        let dir = tempfile::tempdir().unwrap();
        let (state, owner, id) = setup(dir.path()).await;

        let name = upload_photo(&state, &owner, id, Some(jpeg(500_000))).await.unwrap();
        assert_eq!(name, format!("photo_{}.jpg", id));
        assert!(dir.path().join(&name).exists());
        assert_eq!(state.bootcamps.find_by_id(id).await.unwrap().unwrap().photo, name);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let (state, owner, id) = setup(dir.path()).await;

        let err = upload_photo(&state, &owner, id, Some(jpeg(2_000_000))).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn checks_run_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (state, owner, id) = setup(dir.path()).await;

        let missing = upload_photo(&state, &owner, Uuid::new_v4(), None).await.unwrap_err();
        assert_eq!(missing.status_code(), 404);

        let stranger = AuthUser { id: Uuid::new_v4(), role: Role::Publisher };
        assert_eq!(upload_photo(&state, &stranger, id, None).await.unwrap_err().status_code(), 401);

        let no_file = upload_photo(&state, &owner, id, None).await.unwrap_err();
        assert_eq!(no_file.message(), "Please upload a file");

        let text = PhotoUpload::new("notes.txt", Some("text/plain".into()), vec![b'a'; 10]);
        assert_eq!(upload_photo(&state, &owner, id, Some(text)).await.unwrap_err().message(), "Please upload an image file");
    }

    #[tokio::test]
    async fn write_failure_is_internal() {
        let dir = tempfile::tempdir().unwrap();
        let (state, owner, id) = setup(&dir.path().join("missing")).await;

        let err = upload_photo(&state, &owner, id, Some(jpeg(100))).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(state.bootcamps.find_by_id(id).await.unwrap().unwrap().photo, "no-photo.jpg");
    }

    #[tokio::test]
    async fn declared_size_wins_over_kept_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let (state, owner, id) = setup(dir.path()).await;

        // The reader drops bytes past the limit and keeps counting
        let upload = PhotoUpload { size: 3_000_000, ..jpeg(0) };
        let err = upload_photo(&state, &owner, id, Some(upload)).await.unwrap_err();
        assert_eq!(err.message(), "Please upload an image less than 1000000 bytes");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
