//! HTTP DTOs for media endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::media::UploadedBatch;
use crate::domain::foundation::PhotoId;
use crate::domain::media::{Photo, PhotoStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub id: i64,
    pub url: String,
    pub filename: String,
    pub mimetype: String,
    pub status: PhotoStatus,
    pub created_at: String,
}

impl From<&Photo> for PhotoResponse {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id.value(),
            url: photo.url.clone(),
            filename: photo.filename.clone(),
            mimetype: photo.mimetype.clone(),
            status: photo.status,
            created_at: photo.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Result of a session upload. `failed` names files that could not be stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBatchResponse {
    pub photos: Vec<PhotoResponse>,
    pub failed: Vec<String>,
}

impl From<UploadedBatch> for UploadBatchResponse {
    fn from(batch: UploadedBatch) -> Self {
        Self {
            photos: batch.photos.iter().map(PhotoResponse::from).collect(),
            failed: batch.failed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequestedResponse {
    pub session_id: String,
    pub photo_ids: Vec<i64>,
}

/// `?photoIds=1,2,3`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoIdsParams {
    pub photo_ids: Option<String>,
}

impl PhotoIdsParams {
    /// Parses the comma-separated list, skipping empty segments.
    pub fn parse(&self) -> Result<Vec<PhotoId>, String> {
        self.photo_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                segment
                    .parse::<PhotoId>()
                    .map_err(|_| format!("Invalid photo id '{}'", segment))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(raw: &str) -> PhotoIdsParams {
        PhotoIdsParams {
            photo_ids: Some(raw.to_string()),
        }
    }

    #[test]
    fn photo_ids_parse_comma_list() {
        let ids = params("1, 2,,3").parse().unwrap();
        assert_eq!(ids, vec![PhotoId::new(1), PhotoId::new(2), PhotoId::new(3)]);
    }

    #[test]
    fn photo_ids_reject_garbage() {
        assert!(params("1,abc").parse().is_err());
    }

    #[test]
    fn missing_photo_ids_parse_to_empty() {
        assert!(PhotoIdsParams::default().parse().unwrap().is_empty());
    }
}
