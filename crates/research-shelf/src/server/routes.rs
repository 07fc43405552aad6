//! Route table and handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::AppState;
use crate::config::{api, storage};
use crate::error::{ApiError, ApiResult};
use crate::formatters::{CitationStyle, ExportFormat};
use crate::models::{NewPaper, NewTag, Note, NoteBody, Paper, SearchRequest, SearchResult, Tag};
use crate::storage::PdfStorage;

const PDF_CONTENT_TYPE: &str = "application/pdf";

type SharedState = State<Arc<AppState>>;

/// Build the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/search/openalex", post(search_openalex))
        .route("/cite/{style}", post(cite))
        // Library
        .route("/api/papers", get(list_papers).post(create_paper))
        .route("/api/papers/{id}", delete(delete_paper))
        .route("/api/tags", get(list_tags).post(create_tag))
        .route("/api/tags/{id}", delete(delete_tag))
        .route("/api/papers/{paper_id}/tags/{tag_id}", post(tag_paper).delete(untag_paper))
        .route("/api/notes/{paper_id}", get(get_note).post(save_note).delete(delete_note))
        // PDFs
        .route(
            "/api/papers/{id}/upload-pdf",
            post(upload_pdf).layer(DefaultBodyLimit::max(storage::MAX_PDF_BYTES)),
        )
        .route("/api/pdfs/{id}", get(download_pdf).delete(delete_pdf))
        .route("/api/export/{format}", get(export_library))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "research-shelf" }))
}

// ============================================================================
// Search and citations
// ============================================================================

async fn search_openalex(
    State(state): SharedState,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    if request.query.trim().is_empty() {
        return Err(ApiError::validation("query", "cannot be empty"));
    }
    if !(1..=api::MAX_PER_PAGE).contains(&request.limit) {
        return Err(ApiError::validation(
            "limit",
            format!("must be between 1 and {}", api::MAX_PER_PAGE),
        ));
    }

    let results = state.client.search_works(&request.query, request.limit).await?;
    Ok(Json(results))
}

async fn cite(Path(style): Path<String>, Json(paper): Json<Value>) -> ApiResult<Json<String>> {
    let style: CitationStyle =
        style.parse().map_err(|_| ApiError::not_found(format!("Unknown citation style: {style}")))?;
    Ok(Json(style.cite(&paper)?))
}

// ============================================================================
// Papers
// ============================================================================

async fn list_papers(State(state): SharedState) -> ApiResult<Json<Vec<Paper>>> {
    let library = state.library.lock().await;
    Ok(Json(library.list_papers()?))
}

async fn create_paper(
    State(state): SharedState,
    Json(paper): Json<NewPaper>,
) -> ApiResult<Json<Paper>> {
    if paper.id.trim().is_empty() {
        return Err(ApiError::validation("id", "cannot be empty"));
    }
    if paper.title.trim().is_empty() {
        return Err(ApiError::validation("title", "cannot be empty"));
    }

    let library = state.library.lock().await;
    Ok(Json(library.create_paper(&paper)?))
}

async fn delete_paper(State(state): SharedState, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.library.lock().await.delete_paper(&id)?;
    if let Err(e) = state.storage.delete(&id).await {
        tracing::warn!(paper_id = %id, error = %e, "Paper deleted but its PDF could not be removed");
    }
    Ok(Json(json!({ "status": "deleted", "id": id })))
}

// ============================================================================
// Tags
// ============================================================================

async fn list_tags(State(state): SharedState) -> ApiResult<Json<Vec<Tag>>> {
    let library = state.library.lock().await;
    Ok(Json(library.list_tags()?))
}

async fn create_tag(State(state): SharedState, Json(tag): Json<NewTag>) -> ApiResult<Json<Tag>> {
    if tag.name.trim().is_empty() {
        return Err(ApiError::validation("name", "cannot be empty"));
    }
    let library = state.library.lock().await;
    Ok(Json(library.create_tag(&tag)?))
}

async fn delete_tag(State(state): SharedState, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.library.lock().await.delete_tag(&id)?;
    Ok(Json(json!({ "status": "deleted", "id": id })))
}

async fn tag_paper(
    State(state): SharedState,
    Path((paper_id, tag_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state.library.lock().await.tag_paper(&paper_id, &tag_id)?;
    Ok(Json(json!({ "status": "tagged", "paper_id": paper_id, "tag_id": tag_id })))
}

async fn untag_paper(
    State(state): SharedState,
    Path((paper_id, tag_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state.library.lock().await.untag_paper(&paper_id, &tag_id)?;
    Ok(Json(json!({ "status": "untagged", "paper_id": paper_id, "tag_id": tag_id })))
}

// ============================================================================
// Notes
// ============================================================================

async fn get_note(State(state): SharedState, Path(paper_id): Path<String>) -> ApiResult<Json<Note>> {
    let library = state.library.lock().await;
    Ok(Json(library.get_note(&paper_id)?))
}

async fn save_note(
    State(state): SharedState,
    Path(paper_id): Path<String>,
    Json(body): Json<NoteBody>,
) -> ApiResult<Json<Note>> {
    let library = state.library.lock().await;
    Ok(Json(library.save_note(&paper_id, &body.content)?))
}

async fn delete_note(
    State(state): SharedState,
    Path(paper_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.library.lock().await.delete_note(&paper_id)?;
    Ok(Json(json!({ "status": "deleted", "paper_id": paper_id })))
}

// ============================================================================
// PDFs
// ============================================================================

async fn upload_pdf(
    State(state): SharedState,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if field.content_type() != Some(PDF_CONTENT_TYPE) {
            return Err(ApiError::bad_request("File must be a PDF"));
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;
        upload = Some((filename, bytes));
        break;
    }
    let (filename, bytes) = upload.ok_or_else(|| ApiError::bad_request("Missing 'file' field"))?;

    // The guard stays held until the path is recorded, so the paper cannot be
    // deleted between the existence check and the update.
    let library = state.library.lock().await;
    if !library.paper_exists(&id)? {
        return Err(ApiError::not_found("Paper not found"));
    }

    let pdf_path = state.storage.save(&id, &bytes).await?;
    if !library.set_pdf_path(&id, Some(&pdf_path))? {
        state.storage.delete(&id).await?;
        return Err(ApiError::not_found("Paper not found"));
    }
    drop(library);

    Ok(Json(json!({
        "status": "uploaded",
        "paper_id": id,
        "pdf_url": pdf_path,
        "filename": filename,
    })))
}

async fn download_pdf(
    State(state): SharedState,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bytes = state.storage.read(&id).await?.ok_or_else(|| ApiError::not_found("PDF not found"))?;
    let disposition = format!("inline; filename=\"{}.pdf\"", PdfStorage::safe_filename(&id));

    Ok((
        [(header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()), (header::CONTENT_DISPOSITION, disposition)],
        bytes,
    ))
}

async fn delete_pdf(State(state): SharedState, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.library.lock().await.set_pdf_path(&id, None)?;

    if state.storage.delete(&id).await? {
        Ok(Json(json!({ "status": "deleted", "paper_id": id })))
    } else {
        Err(ApiError::not_found("PDF not found"))
    }
}

// ============================================================================
// Export
// ============================================================================

async fn export_library(
    State(state): SharedState,
    Path(format): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let format: ExportFormat = format.parse()?;
    let papers = state.library.lock().await.list_papers()?;
    tracing::debug!(%format, papers = papers.len(), "Exporting library");

    let disposition = format!("attachment; filename=\"{}\"", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        format.render(&papers),
    ))
}
