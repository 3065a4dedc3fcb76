//! Object-store upload for generated text assets.
//!
//! The pipeline is write-only against the store: every asset is uploaded as a
//! flat text blob keyed by path, and nothing is ever read back. A trait seam
//! mirrors the API module's design so tests can record writes in memory:
//! - [`BlobStore`]: the write-text-blob interface
//! - [`GcsStore`]: Google Cloud Storage implementation

use google_cloud_storage::client::google_cloud_auth::credentials::CredentialsFile;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::object_access_controls::PredefinedObjectAcl;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use std::error::Error;
use tracing::{info, instrument};

/// Write-only blob interface keyed by path string.
pub trait BlobStore {
    /// Upload `content` as a text blob at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Object name within the bucket, e.g. `podcast_contents/outro.txt`
    /// * `content` - The text to store
    /// * `content_type` - MIME type recorded on the object
    /// * `public` - Whether the object is marked publicly readable
    async fn upload_text(
        &self,
        path: &str,
        content: &str,
        content_type: &str,
        public: bool,
    ) -> Result<(), Box<dyn Error>>;
}

/// Google Cloud Storage implementation of [`BlobStore`].
pub struct GcsStore {
    client: Client,
    bucket: String,
}

impl GcsStore {
    /// Connect to GCS and bind to a bucket.
    ///
    /// Authenticates from the service-account JSON at `credentials_path` when
    /// given, otherwise from application default credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials file cannot be read or no usable
    /// credentials are found.
    #[instrument(level = "info", skip_all, fields(bucket = %bucket))]
    pub async fn connect(
        bucket: &str,
        credentials_path: Option<&str>,
    ) -> Result<Self, Box<dyn Error>> {
        let config = match credentials_path {
            Some(path) => {
                let credentials = CredentialsFile::new_from_file(path.to_string()).await?;
                ClientConfig::default().with_credentials(credentials).await?
            }
            None => ClientConfig::default().with_auth().await?,
        };
        info!("Connected to Cloud Storage");
        Ok(Self {
            client: Client::new(config),
            bucket: bucket.to_string(),
        })
    }
}

impl BlobStore for GcsStore {
    #[instrument(level = "info", skip_all, fields(bucket = %self.bucket, path = %path, public))]
    async fn upload_text(
        &self,
        path: &str,
        content: &str,
        content_type: &str,
        public: bool,
    ) -> Result<(), Box<dyn Error>> {
        let media = Media {
            name: path.to_string().into(),
            content_type: content_type.to_string().into(),
            content_length: None,
        };
        let request = UploadObjectRequest {
            bucket: self.bucket.clone(),
            predefined_acl: if public {
                Some(PredefinedObjectAcl::PublicRead)
            } else {
                None
            },
            ..Default::default()
        };

        self.client
            .upload_object(
                &request,
                content.as_bytes().to_vec(),
                &UploadType::Simple(media),
            )
            .await?;

        info!(bytes = content.len(), "Uploaded text blob");
        Ok(())
    }
}
