use actix_multipart::Multipart;
use actix_web::{HttpResponse, Result, web};
use futures_util::StreamExt;

use upload_services::types::{UploadByLinkRequest, UploadResponse};
use upload_services::{UploadError, UploadService, UploadedFile};

/// Multipart field carrying the photos.
pub const PHOTOS_FIELD: &str = "photos";

/// Stores the image found at a remote URL
pub async fn upload_by_link(
    upload_service: web::Data<UploadService>,
    request: web::Json<UploadByLinkRequest>,
) -> Result<HttpResponse, UploadError> {
    let urls = upload_service.upload_by_link(&request.link).await?;
    Ok(HttpResponse::Ok().json(UploadResponse { urls }))
}

/// Stores the files sent as `photos` in a multipart body.
///
/// Each file is checked against the size ceiling while it streams in, so an
/// oversize file is rejected without buffering it whole.
pub async fn upload_photos(
    upload_service: web::Data<UploadService>,
    mut payload: Multipart,
) -> Result<HttpResponse, UploadError> {
    let mut files = Vec::new();

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| UploadError::Multipart(e.to_string()))?;

        if field.name() != Some(PHOTOS_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
            }
            continue;
        }

        upload_service.check_file_count(files.len() + 1)?;

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
            upload_service.check_file_size(bytes.len() + chunk.len())?;
            bytes.extend_from_slice(&chunk);
        }

        files.push(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    let urls = upload_service.upload_files(files).await?;
    Ok(HttpResponse::Ok().json(UploadResponse { urls }))
}
