//! Edge Storage API client
//!
//! Provides a typed HTTP client for a Bunny-style Edge Storage API.
//! Handles the `AccessKey` authentication header, JSON deserialization of
//! directory listings, and endpoint construction.
//!
//! ## Wire format
//!
//! - `GET {endpoint}/{zone}/{dir}` → JSON array of listing objects
//! - `PUT {endpoint}/{zone}/{path}` with the raw bytes → `201 Created`
//! - `DELETE {endpoint}/{zone}/{path}` → `200 OK`
//!
//! Listing objects report `Path` as an absolute path including the zone
//! name (e.g. `/myzone/nd1/`); [`StorageClient::list`] strips that prefix
//! so the rest of the system only ever sees paths relative to the zone
//! root.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use zonesync_core::domain::RemoteEntry;
use zonesync_core::ports::StorageBackend;

/// Fixed timeout applied to every storage request.
///
/// Nested inside the run-scoped cancellation signal: the engine may abandon
/// a call earlier, but no call outlives this duration.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One row of a directory listing as the API serializes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListObject {
    /// Name of the object within its directory
    object_name: String,
    /// Absolute directory path including the zone name, e.g. `/myzone/nd1/`
    path: String,
    /// Whether the object is a directory
    is_directory: bool,
    /// Uppercase-hex SHA-256 of the content; absent for directories
    #[serde(default)]
    checksum: Option<String>,
}

/// HTTP client for the Edge Storage API
///
/// Wraps `reqwest::Client` with the authentication header, per-request
/// timeout, and URL construction for one storage zone.
#[derive(Debug, Clone)]
pub struct StorageClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL of the storage endpoint, without a trailing slash
    endpoint: String,
    /// Name of the storage zone all requests address
    zone: String,
    /// API key sent as the `AccessKey` header
    access_key: String,
}

impl StorageClient {
    /// Creates a new client for one storage zone.
    ///
    /// # Arguments
    /// * `endpoint` - Base URL of the storage API (e.g. `https://storage.bunnycdn.com`)
    /// * `zone` - Storage zone name
    /// * `access_key` - API key for the zone
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        zone: impl Into<String>,
        access_key: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            zone: zone.into(),
            access_key: access_key.into(),
        }
    }

    /// Builds the full request URL for a normalized zone-relative path.
    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            self.zone,
            path.trim_start_matches('/')
        )
    }

    /// Re-expresses a listing row as a zone-relative [`RemoteEntry`].
    fn normalize(&self, object: &ListObject) -> RemoteEntry {
        let prefix = format!("/{}/", self.zone);
        let full = format!("{}{}", object.path, object.object_name);
        let relative = full.strip_prefix(&prefix).unwrap_or(&full);

        if object.is_directory {
            RemoteEntry::directory(relative)
        } else {
            RemoteEntry::file(relative, object.checksum.clone().unwrap_or_default())
        }
    }
}

#[async_trait]
impl StorageBackend for StorageClient {
    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        let url = self.url_for(path);
        debug!(%url, "listing remote directory");

        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("AccessKey", &self.access_key)
            .header("Accept", "application/json")
            .send()
            .await
            .context("list request failed")?;

        if response.status() != StatusCode::OK {
            bail!("unexpected status code: {}", response.status().as_u16());
        }

        let objects: Vec<ListObject> = response
            .json()
            .await
            .context("failed to decode listing response")?;

        Ok(objects
            .iter()
            .map(|object| self.normalize(object))
            .collect())
    }

    async fn upload(&self, path: &str, data: &[u8]) -> Result<()> {
        let url = self.url_for(path);
        debug!(%url, bytes = data.len(), "uploading object");

        let response = self
            .client
            .put(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("AccessKey", &self.access_key)
            .header("Content-Type", "application/octet-stream")
            .header("Accept", "application/json")
            .body(data.to_vec())
            .send()
            .await
            .context("upload request failed")?;

        if response.status() != StatusCode::CREATED {
            bail!("unexpected status code: {}", response.status().as_u16());
        }

        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url_for(path);
        debug!(%url, "deleting object");

        let response = self
            .client
            .delete(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("AccessKey", &self.access_key)
            .header("Accept", "application/json")
            .send()
            .await
            .context("delete request failed")?;

        if response.status() != StatusCode::OK {
            bail!("unexpected status code: {}", response.status().as_u16());
        }

        Ok(())
    }
}
