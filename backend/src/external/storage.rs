//! File storage client
//!
//! Forwards permit documents and listing photos to an object storage service
//! and returns the public reference the service assigns.

use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;
use shared::{FileKind, FileReference};

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};

/// Object storage API client
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    api_key: String,
    upload_endpoint: String,
    bucket: String,
    max_upload_bytes: usize,
}

/// File accepted from a client, ready to be forwarded
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Storage service upload response
#[derive(Debug, Deserialize)]
struct UploadResponse {
    file_url: String,
}

impl StorageClient {
    /// Create a new StorageClient from configuration
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            upload_endpoint: config.upload_endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Check size and type before anything leaves the server
    pub fn check(&self, file: &UploadedFile) -> AppResult<FileKind> {
        if file.bytes.is_empty() {
            return Err(AppError::Validation {
                field: "file".to_string(),
                message: "Uploaded file is empty".to_string(),
                message_es: "El archivo está vacío".to_string(),
            });
        }

        if file.bytes.len() > self.max_upload_bytes {
            return Err(AppError::Validation {
                field: "file".to_string(),
                message: format!("File exceeds {} bytes", self.max_upload_bytes),
                message_es: format!("El archivo supera {} bytes", self.max_upload_bytes),
            });
        }

        FileKind::from_content_type(&file.content_type).ok_or_else(|| AppError::Validation {
            field: "file".to_string(),
            message: format!("Unsupported file type: {}", file.content_type),
            message_es: "Solo se aceptan imágenes o PDF".to_string(),
        })
    }

    /// Upload a file and return its storage reference
    pub async fn upload(&self, file: UploadedFile) -> AppResult<FileReference> {
        self.check(&file)?;

        let url = format!("{}/{}", self.upload_endpoint, self.bucket);
        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, file.content_type.as_str());

        if let Some(filename) = &file.filename {
            request = request.query(&[("filename", filename.as_str())]);
        }

        let response = request
            .body(file.bytes)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StorageError(format!("{} - {}", status, body)));
        }

        let data: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::StorageError(format!("failed to parse upload response: {}", e)))?;

        Ok(FileReference {
            file_url: data.file_url,
            original_filename: file.filename,
        })
    }
}
