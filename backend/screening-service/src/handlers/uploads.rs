/// Upload handlers - HTTP endpoint for video uploads
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use bytes::Bytes;
use futures::StreamExt;
use std::io;
use tracing::{error, info};

use crate::error::{AppError, Result, UploadTooLarge};
use crate::models::UploadResponse;
use crate::services::storage::{video_key, ByteStream};
use crate::AppState;

/// Forward multipart chunks, failing the stream once `limit` bytes are exceeded.
fn limited_stream(field: Field, limit: usize) -> ByteStream {
    let mut total: usize = 0;
    field
        .map(move |chunk| -> io::Result<Bytes> {
            let bytes = chunk.map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            total += bytes.len();
            if total > limit {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    UploadTooLarge { limit },
                ));
            }
            Ok(bytes)
        })
        .boxed_local()
}

/// Store the first file part of the multipart body as `{invite_id}.webm`
/// and point the invite's record at it.
///
/// The record is only written after the object has been fully stored.
pub async fn upload_video(
    state: web::Data<AppState>,
    invite_id: web::Path<String>,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let invite_id = invite_id.into_inner();

    let field = match payload.next().await {
        Some(Ok(field)) => field,
        Some(Err(e)) => {
            return Err(AppError::BadRequest(format!("Invalid multipart body: {}", e)));
        }
        None => return Err(AppError::BadRequest("file part required".to_string())),
    };

    let key = video_key(&invite_id);
    let content_type = field.content_type().map(|mime| mime.to_string());
    let body = limited_stream(field, state.max_upload_bytes);

    let video_url = state
        .storage
        .save(&key, body, content_type.as_deref())
        .await
        .map_err(|err| {
            error!(invite_id = %invite_id, key = %key, error = %err, "Upload save failed");
            AppError::from(err)
        })?;

    state.repo.set_video_url(&invite_id, &video_url).await?;

    info!(invite_id = %invite_id, video_url = %video_url, "Video uploaded");
    Ok(HttpResponse::Ok().json(UploadResponse::uploaded(video_url)))
}
