//! Upload intake: validate an incoming file and persist it into staging.

use std::sync::Arc;

use chrono::Utc;
use webpify_core::models::{SourceAsset, StorageRole};
use webpify_storage::keys;
use webpify_storage::local::{DiskStore, StorageError};

use crate::validator::{UploadValidator, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One file received from a request, not yet staged.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: String,
    pub data: bytes::Bytes,
}

/// Validates incoming files and stages them under a collision-free name.
///
/// The staged bytes are fully persisted (written and synced) before `stage`
/// returns, so the conversion worker never reads a partially-written file.
#[derive(Debug, Clone)]
pub struct UploadIntake {
    store: Arc<DiskStore>,
    validator: UploadValidator,
}

impl UploadIntake {
    pub fn new(store: Arc<DiskStore>, validator: UploadValidator) -> Self {
        Self { store, validator }
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    /// Validate and stage one file, producing a `SourceAsset` owned by the
    /// conversion that will consume it.
    pub async fn stage(&self, file: &IncomingFile) -> Result<SourceAsset, IntakeError> {
        self.validator
            .validate_file(&file.original_name, &file.content_type, file.data.len())?;

        let key = keys::staged_upload_key(&file.original_name);
        let path = self.store.persist(StorageRole::Staging, &key, &file.data).await?;

        tracing::debug!(
            original = %file.original_name,
            staged = %key,
            size_bytes = file.data.len(),
            "Staged upload"
        );

        Ok(SourceAsset {
            original_name: file.original_name.clone(),
            content_type: file.content_type.clone(),
            size_bytes: file.data.len() as u64,
            path,
            created_at: Utc::now(),
        })
    }
}
