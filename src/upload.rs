//! Batch image uploads into the portfolio collection.
//!
//! Files are gated by content type, extension and size before anything is
//! written. Accepted files are stored one at a time; a failure on one file
//! is recorded in the report and the rest of the batch continues.

use bytes::Bytes;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::collection::{CollectionManager, ItemId};
use crate::db::models::PortfolioImage;
use crate::store::ObjectStore;

pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg", "image/webp"];
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    pub allowed_types: Vec<String>,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES)
    }
}

impl UploadPolicy {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            allowed_types: ALLOWED_TYPES.iter().map(|s| s.to_string()).collect(),
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Returns the lowercased extension the stored object will carry.
    pub fn check(&self, file: &CandidateFile) -> Result<String, RejectReason> {
        if file.data.is_empty() {
            return Err(RejectReason::Empty);
        }
        if file.data.len() > self.max_bytes {
            return Err(RejectReason::TooLarge {
                size: file.data.len(),
                max: self.max_bytes,
            });
        }

        let content_type = file.effective_content_type();
        if !content_type
            .as_deref()
            .is_some_and(|ct| self.allowed_types.iter().any(|allowed| allowed == ct))
        {
            return Err(RejectReason::UnsupportedType(
                content_type.unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        match file.extension() {
            Some(ext) if self.allowed_extensions.contains(&ext) => Ok(ext),
            other => Err(RejectReason::UnsupportedExtension(other.unwrap_or_default())),
        }
    }

    /// Split a batch into `(accepted with extension, rejected)`, keeping
    /// the input order on both sides.
    pub fn partition(
        &self,
        files: Vec<CandidateFile>,
    ) -> (Vec<(CandidateFile, String)>, Vec<RejectedFile>) {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for file in files {
            match self.check(&file) {
                Ok(ext) => accepted.push((file, ext)),
                Err(reason) => {
                    tracing::info!(file = %file.name, %reason, "Rejected upload");
                    rejected.push(RejectedFile {
                        file_name: file.name,
                        reason,
                    });
                }
            }
        }
        (accepted, rejected)
    }
}

/// One file as received from the client.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type,
            data: data.into(),
        }
    }

    /// Declared type, or a guess from the file name when none was sent.
    pub fn effective_content_type(&self) -> Option<String> {
        self.content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .map(|ct| ct.to_ascii_lowercase())
            .or_else(|| {
                mime_guess::from_path(&self.name)
                    .first_raw()
                    .map(str::to_string)
            })
    }

    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RejectReason {
    Empty,
    TooLarge { size: usize, max: usize },
    UnsupportedType(String),
    UnsupportedExtension(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "file is empty"),
            Self::TooLarge { size, max } => {
                write!(f, "file is {} bytes, the limit is {} bytes", size, max)
            }
            Self::UnsupportedType(ct) => write!(f, "unsupported content type {}", ct),
            Self::UnsupportedExtension(ext) if ext.is_empty() => write!(f, "missing file extension"),
            Self::UnsupportedExtension(ext) => write!(f, "unsupported extension .{}", ext),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedFile {
    pub file_name: String,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub file_name: String,
    pub id: ItemId,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<UploadedFile>,
    pub failed: Vec<FailedFile>,
    pub rejected: Vec<RejectedFile>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No valid images to upload")]
    NothingAccepted { rejected: Vec<RejectedFile> },
}

/// `<unix-millis>_<6 base36 chars>.<ext>`
pub fn object_name(ext: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}.{}", chrono::Utc::now().timestamp_millis(), suffix, ext)
}

pub struct UploadPipeline {
    policy: UploadPolicy,
    objects: Arc<dyn ObjectStore>,
    bucket: String,
}

impl UploadPipeline {
    pub fn new(policy: UploadPolicy, objects: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            policy,
            objects,
            bucket: bucket.into(),
        }
    }

    pub async fn run(
        &self,
        portfolio: &mut CollectionManager<PortfolioImage>,
        files: Vec<CandidateFile>,
    ) -> Result<UploadReport, UploadError> {
        let (accepted, rejected) = self.policy.partition(files);
        if accepted.is_empty() {
            return Err(UploadError::NothingAccepted { rejected });
        }

        let mut report = UploadReport {
            rejected,
            ..Default::default()
        };

        for (file, ext) in accepted {
            match self.store_one(portfolio, &file, &ext).await {
                Ok(uploaded) => report.uploaded.push(uploaded),
                Err(error) => {
                    tracing::error!(file = %file.name, "Upload failed: {}", error);
                    report.failed.push(FailedFile {
                        file_name: file.name,
                        error,
                    });
                }
            }
        }

        if let Err(e) = portfolio.load().await {
            tracing::warn!("Could not reload portfolio after upload: {}", e);
        }

        tracing::info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            rejected = report.rejected.len(),
            "Upload batch finished"
        );
        Ok(report)
    }

    async fn store_one(
        &self,
        portfolio: &mut CollectionManager<PortfolioImage>,
        file: &CandidateFile,
        ext: &str,
    ) -> Result<UploadedFile, String> {
        let name = object_name(ext);
        self.objects
            .upload(&self.bucket, &name, file.data.clone())
            .await
            .map_err(|e| e.to_string())?;

        let image_url = self.objects.public_url(&self.bucket, &name);
        match portfolio
            .insert(PortfolioImage {
                image_url: image_url.clone(),
            })
            .await
        {
            Ok(item) => Ok(UploadedFile {
                file_name: file.name.clone(),
                id: item.id,
                image_url,
            }),
            Err(e) => {
                // Row never landed, so the object has nothing pointing at it.
                if let Err(cleanup) = self.objects.remove(&self.bucket, &name).await {
                    tracing::warn!("Could not remove orphaned object {}: {}", name, cleanup);
                }
                Err(e.to_string())
            }
        }
    }
}
