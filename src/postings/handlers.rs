use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    state::AppState,
};

use super::dto::{
    total_pages, CreatePostingRequest, ListMeta, ListQuery, ListResponse, UpdatePostingRequest,
    MAX_KEYWORDS,
};
use super::repo::{self, JobPosting};

const MAX_LOGO_BYTES: usize = 5 * 1024 * 1024;

pub fn posting_routes() -> Router<AppState> {
    Router::new()
        .route("/postings", post(create_posting).get(list_postings))
        .route(
            "/postings/:id",
            get(get_posting).patch(update_posting).delete(remove_posting),
        )
        .route(
            "/postings/:id/logo-upload",
            post(upload_logo).layer(DefaultBodyLimit::max(MAX_LOGO_BYTES)),
        )
}

fn not_found() -> AppError {
    AppError::NotFound("Posting not found.".into())
}

#[instrument(skip(state, payload))]
pub async fn create_posting(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreatePostingRequest>,
) -> Result<(StatusCode, Json<JobPosting>), AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required.".into()));
    }
    let posting = repo::create(&state.db, user_id, payload.title.trim()).await?;
    info!(posting_id = %posting.id, "posting created");
    Ok((StatusCode::CREATED, Json(posting)))
}

#[instrument(skip(state))]
pub async fn list_postings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    if q.page < 1 || q.limit < 1 {
        return Err(AppError::Validation(
            "page and limit must be positive.".into(),
        ));
    }

    let (data, total_items) = repo::list_page(
        &state.db,
        user_id,
        q.page,
        q.limit,
        q.sort_by.as_deref(),
        q.order.as_deref(),
    )
    .await?;

    Ok(Json(ListResponse {
        data,
        meta: ListMeta {
            total_items,
            current_page: q.page,
            total_pages: total_pages(total_items, q.limit),
        },
    }))
}

#[instrument(skip(state))]
pub async fn get_posting(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    let posting = repo::find_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(posting))
}

#[instrument(skip(state, payload))]
pub async fn update_posting(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostingRequest>,
) -> Result<Json<JobPosting>, AppError> {
    if let Some(keywords) = &payload.keywords {
        if keywords.len() > MAX_KEYWORDS {
            return Err(AppError::Validation(format!(
                "At most {MAX_KEYWORDS} keywords are allowed."
            )));
        }
    }
    if let Some(title) = &payload.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title cannot be empty.".into()));
        }
    }

    let posting = repo::update(&state.db, id, user_id, &payload)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(posting))
}

#[instrument(skip(state))]
pub async fn remove_posting(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = repo::delete(&state.db, id, user_id).await?;
    if deleted == 0 {
        return Err(not_found());
    }
    info!(posting_id = %id, "posting deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Pulls the `file` field out of the multipart stream. Stream errors (body
/// over the size limit, truncated or malformed payloads) surface as
/// validation errors instead of being swallowed.
async fn read_logo_upload(mut mp: Multipart) -> Result<(bytes::Bytes, String), AppError> {
    loop {
        let field = match mp.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(AppError::Validation(format!("Invalid upload: {e}"))),
        };
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;
        return Ok((data, content_type));
    }

    warn!("logo upload without file field");
    Err(AppError::Validation("File is required.".into()))
}

/// POST /postings/:id/logo-upload (multipart, field `file`)
#[instrument(skip(state, mp))]
pub async fn upload_logo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<JobPosting>, AppError> {
    repo::find_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(not_found)?;

    let (data, content_type) = read_logo_upload(mp).await?;

    let ext = ext_from_mime(&content_type)
        .ok_or_else(|| AppError::Validation("Invalid file type.".into()))?;

    let timestamp = OffsetDateTime::now_utc().unix_timestamp();
    let key = format!("logos/{id}-{timestamp}.{ext}");
    state
        .storage
        .put_object(&key, data, &content_type)
        .await
        .map_err(AppError::Internal)?;

    let url = state.storage.public_url(&key);
    let posting = repo::set_logo_url(&state.db, id, &url).await?;
    info!(posting_id = %id, "logo uploaded");
    Ok(Json(posting))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};

    #[test]
    fn ext_from_mime_accepts_images_only() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/gif"), Some("gif"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/pdf"), None);
        assert_eq!(ext_from_mime("text/html"), None);
    }

    async fn multipart_from(body: &'static str) -> Multipart {
        let request = Request::builder()
            .header("content-type", "multipart/form-data; boundary=XYZ")
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn read_logo_upload_finds_the_file_field() {
        let mp = multipart_from(
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"note\"\r\n\r\n\
             ignored\r\n\
             --XYZ\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             png-bytes\r\n\
             --XYZ--\r\n",
        )
        .await;

        let (data, content_type) = read_logo_upload(mp).await.unwrap();
        assert_eq!(&data[..], &b"png-bytes"[..]);
        assert_eq!(content_type, "image/png");
    }

    #[tokio::test]
    async fn read_logo_upload_requires_the_file_field() {
        let mp = multipart_from(
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"note\"\r\n\r\n\
             no file here\r\n\
             --XYZ--\r\n",
        )
        .await;

        let err = read_logo_upload(mp).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.as_str() == "File is required."));
    }

    #[tokio::test]
    async fn read_logo_upload_reports_stream_errors() {
        // Declared boundary never appears; the stream error must surface as a
        // validation message, not as a missing file.
        let mp = multipart_from("--WRONG\r\nnot a real multipart body").await;

        let err = read_logo_upload(mp).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.starts_with("Invalid upload:")));
    }
}
