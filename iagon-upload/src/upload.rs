#![doc = "HTTP implementation of the core StorageClient trait for the IAGON storage gateway."]
//
//! # Storage client (CLI <-> gateway)
//!
//! [`IagonClient`] wires the [`StorageClient`] trait from
//! `iagon-upload-core` to the two gateway endpoints:
//!
//! - `POST {base}/storage/directory`: JSON body, returns the new id at
//!   `data._id`.
//! - `POST {base}/storage/upload`: multipart form with the file streamed
//!   from disk as the `file` part.
//!
//! Every request carries the API key in the `x-api-key` header.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::Deserialize;

pub use iagon_upload_core::contract::{
    FileUpload, NewDirectory, RemoteDirectory, StorageClient, StorageError,
};

use crate::load_config::ClientSettings;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Deserialize)]
struct CreateDirectoryResponse {
    data: CreatedDirectory,
}

#[derive(Deserialize)]
struct CreatedDirectory {
    #[serde(rename = "_id")]
    id: String,
}

pub struct IagonClient {
    http: Client,
    base_url: String,
}

impl IagonClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let mut key = HeaderValue::from_str(&settings.api_token)
            .context("API token is not a valid HTTP header value")?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = settings.base_url.trim_end_matches('/').to_string();
        tracing::info!(base_url = %base_url, "Initialized IagonClient");
        Ok(IagonClient { http, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn transport(e: reqwest::Error) -> StorageError {
    StorageError::Transport(e.to_string())
}

/// Reads the body and turns non-2xx answers into [`StorageError::Rejected`].
async fn success_body(res: Response) -> Result<String, StorageError> {
    let status = res.status();
    let body = res.text().await.map_err(transport)?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(StorageError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl StorageClient for IagonClient {
    async fn create_directory(&self, req: NewDirectory) -> Result<RemoteDirectory, StorageError> {
        tracing::info!(
            name = %req.directory_name,
            parent = req.parent_directory_id.as_deref().unwrap_or("<root>"),
            "Creating directory"
        );

        let res = self
            .http
            .post(self.endpoint("storage/directory"))
            .json(&req)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, name = %req.directory_name, "Directory request failed");
                transport(e)
            })?;

        let body = success_body(res).await.map_err(|e| {
            tracing::error!(error = %e, name = %req.directory_name, "API error creating directory");
            e
        })?;

        let parsed: CreateDirectoryResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %body, "Directory response has no data._id");
            StorageError::MalformedResponse(format!("{e}: {body}"))
        })?;

        tracing::info!(id = %parsed.data.id, "Successfully created directory");
        Ok(RemoteDirectory { id: parsed.data.id })
    }

    async fn upload_file(&self, req: FileUpload) -> Result<(), StorageError> {
        let local_read = |source| StorageError::LocalRead {
            path: req.path.clone(),
            source,
        };

        let file = tokio::fs::File::open(&req.path).await.map_err(local_read)?;
        let length = file.metadata().await.map_err(local_read)?.len();

        let part = Part::stream_with_length(Body::from(file), length)
            .file_name(req.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(transport)?;

        let mut form = Form::new()
            .text("filename", req.file_name.clone())
            .text("visibility", req.visibility.as_str())
            .text("index_listing", if req.index_listing { "true" } else { "false" });
        if let Some(directory_id) = &req.directory_id {
            form = form.text("directoryId", directory_id.clone());
        }
        if let Some(password) = &req.password {
            form = form.text("password", password.clone());
        }
        let form = form.part("file", part);

        tracing::info!(
            path = %req.path.display(),
            size = length,
            directory_id = req.directory_id.as_deref().unwrap_or("<root>"),
            "Uploading file"
        );

        let res = self
            .http
            .post(self.endpoint("storage/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, path = %req.path.display(), "Upload request failed");
                transport(e)
            })?;

        match success_body(res).await {
            Ok(_) => {
                tracing::info!(path = %req.path.display(), "Successfully uploaded file");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, path = %req.path.display(), "API error uploading file");
                Err(e)
            }
        }
    }
}
