use crate::{
    config::Config,
    error::ApiError,
    model::document::{Document, DocumentType},
    store::Store,
    utils::id::generate_id,
};
use actix_multipart::{Multipart, MultipartError};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use futures::TryStreamExt;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};

/// OpenAPI shape of the upload form; the handler reads the parts directly.
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentForm {
    /// Owning vendor
    pub vendor_id: String,
    /// joining_letter, agreement or id_proof
    #[serde(rename = "type")]
    pub kind: String,
    /// The document; its filename becomes the document name
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFilter {
    /// Only documents owned by this vendor
    pub vendor_id: Option<String>,
}

#[derive(Default)]
struct UploadParts {
    vendor_id: Option<String>,
    kind: Option<String>,
    file: Option<(Option<String>, Vec<u8>)>,
}

fn bad_form(e: MultipartError) -> ApiError {
    ApiError::bad_request(format!("Invalid multipart form: {e}"))
}

fn text_part(name: &str, data: Vec<u8>) -> Result<String, ApiError> {
    String::from_utf8(data)
        .map(|v| v.trim().to_string())
        .map_err(|_| ApiError::bad_request(format!("{name} must be UTF-8 text")))
}

/// Drains the form, failing as soon as the parts together exceed `limit` bytes.
async fn read_parts(mut payload: Multipart, limit: usize) -> Result<UploadParts, ApiError> {
    let mut parts = UploadParts::default();
    let mut total = 0usize;

    while let Some(mut field) = payload.try_next().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_form)? {
            total += chunk.len();
            if total > limit {
                warn!(limit, "Document upload over size limit");
                return Err(ApiError::payload_too_large(format!(
                    "File exceeds the {limit} byte upload limit"
                )));
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "vendorId" => parts.vendor_id = Some(text_part("vendorId", data)?),
            "type" => parts.kind = Some(text_part("type", data)?),
            "file" => parts.file = Some((file_name, data)),
            other => warn!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(parts)
}

/// Last path component only, so a client name cannot escape the upload dir.
fn clean_file_name(name: &str) -> Option<String> {
    Path::new(name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// `{vendorId}_{random}{.ext}` inside the upload directory.
fn storage_path(upload_dir: &str, vendor_id: &str, file_name: &str) -> PathBuf {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    Path::new(upload_dir).join(format!("{vendor_id}_{}{ext}", generate_id()))
}

async fn blocking<T, F>(op: F) -> Result<io::Result<T>, ApiError>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(op)
        .await
        .map_err(|e| ApiError::internal(format!("blocking task failed: {e}")))
}

/// Removes a stored file whose record could not be saved; failures are only logged.
async fn discard_upload(path: PathBuf) {
    let target = path.clone();
    match blocking(move || fs::remove_file(target)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, path = %path.display(), "Failed to remove orphaned upload"),
        Err(e) => warn!(error = %e, path = %path.display(), "Failed to remove orphaned upload"),
    }
}

/// Upload a vendor Document (multipart form)
#[utoipa::path(
    post,
    path = "/api/admin/documents",
    request_body(content = UploadDocumentForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = Document),
        (status = 400, description = "Malformed form, missing file or unknown type", body = Object, example = json!({
            "error": "File upload failed"
        })),
        (status = 404, description = "Vendor not found"),
        (status = 413, description = "File larger than MAX_UPLOAD_BYTES")
    ),
    tag = "Document",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_document(
    store: web::Data<Store>,
    config: web::Data<Config>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let parts = read_parts(payload, config.max_upload_bytes).await?;

    let vendor_id = parts.vendor_id.unwrap_or_default();
    if !store.vendor_exists(&vendor_id) {
        return Err(ApiError::not_found("Vendor not found"));
    }

    let kind = DocumentType::from_str(parts.kind.as_deref().unwrap_or_default()).map_err(|_| {
        ApiError::bad_request("Invalid document type, expected joining_letter, agreement or id_proof")
    })?;

    let (file_name, body) = match parts.file {
        Some((Some(file_name), body)) if !body.is_empty() => (file_name, body),
        _ => return Err(ApiError::bad_request("File upload failed")),
    };
    let name = clean_file_name(&file_name)
        .ok_or_else(|| ApiError::bad_request("Invalid file name"))?;

    let path = storage_path(&config.upload_dir, &vendor_id, &name);
    let upload_dir = config.upload_dir.clone();
    let target = path.clone();
    blocking(move || {
        fs::create_dir_all(&upload_dir)?;
        fs::write(&target, &body)
    })
    .await?
    .map_err(|e| {
        error!(error = %e, path = %path.display(), "Failed to save file");
        ApiError::internal("Failed to save file")
    })?;

    let doc = Document {
        id: generate_id(),
        vendor_id,
        name,
        kind,
        file_path: path.to_string_lossy().into_owned(),
        uploaded_at: Utc::now(),
    };

    let doc = match store.insert_document(doc) {
        Ok(doc) => doc,
        Err(e) => {
            discard_upload(path).await;
            return Err(e);
        }
    };

    info!(document_id = %doc.id, vendor_id = %doc.vendor_id, kind = %doc.kind, "Document uploaded");
    Ok(HttpResponse::Created().json(doc))
}

/// List Documents, optionally for one vendor
#[utoipa::path(
    get,
    path = "/api/admin/documents",
    params(DocumentFilter),
    responses(
        (status = 200, description = "Documents", body = [Document]),
        (status = 404, description = "Vendor not found")
    ),
    tag = "Document",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_documents(
    store: web::Data<Store>,
    query: web::Query<DocumentFilter>,
) -> Result<HttpResponse, ApiError> {
    match query.vendor_id.as_deref().filter(|v| !v.is_empty()) {
        Some(vendor_id) => {
            let vendor = store
                .get_vendor(vendor_id)
                .ok_or_else(|| ApiError::not_found("Vendor not found"))?;
            Ok(HttpResponse::Ok().json(vendor.documents))
        }
        None => Ok(HttpResponse::Ok().json(store.list_documents())),
    }
}

/// Download a Document file
#[utoipa::path(
    get,
    path = "/api/admin/documents/{document_id}",
    params(
        ("document_id", Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "File contents", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Document or file not found")
    ),
    tag = "Document",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_document(
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let doc = store
        .get_document(&path)
        .ok_or_else(|| ApiError::not_found("Document not found"))?;

    let file_path = doc.file_path.clone();
    let bytes = match blocking(move || fs::read(file_path)).await? {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(document_id = %doc.id, path = %doc.file_path, "Document file missing");
            return Err(ApiError::not_found("File not found"));
        }
        Err(e) => {
            error!(error = %e, document_id = %doc.id, "Failed to read document");
            return Err(ApiError::internal("Failed to read file"));
        }
    };

    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", doc.name.replace('"', "")),
        ))
        .body(bytes))
}

/// Delete a Document and its file
#[utoipa::path(
    delete,
    path = "/api/admin/documents/{document_id}",
    params(
        ("document_id", Path, description = "Document ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Document not found"),
        (status = 500, description = "File could not be removed")
    ),
    tag = "Document",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_document(
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let document_id = path.into_inner();
    let doc = store
        .get_document(&document_id)
        .ok_or_else(|| ApiError::not_found("Document not found"))?;

    // file first: a failed removal leaves the record in place
    let file_path = doc.file_path.clone();
    match blocking(move || fs::remove_file(file_path)).await? {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            error!(error = %e, document_id = %doc.id, "Failed to delete file");
            return Err(ApiError::internal("Failed to delete file"));
        }
    }

    store.remove_document(&document_id)?;
    info!(document_id = %document_id, "Document deleted");

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_reduced_to_their_last_component() {
        assert_eq!(clean_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(clean_file_name(" contract.pdf ").as_deref(), Some("contract.pdf"));
        assert_eq!(clean_file_name(""), None);
        assert_eq!(clean_file_name(".."), None);
    }

    #[test]
    fn storage_path_keeps_extension_and_vendor_prefix() {
        let path = storage_path("uploads", "v1", "contract.pdf");
        let file = path.file_name().unwrap().to_str().unwrap();

        assert!(path.starts_with("uploads"));
        assert!(file.starts_with("v1_"));
        assert!(file.ends_with(".pdf"));
    }

    #[actix_web::test]
    async fn discarding_an_upload_tolerates_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v1_orphan.pdf");
        fs::write(&path, b"data").unwrap();

        discard_upload(path.clone()).await;
        assert!(!path.exists());

        // second removal only logs
        discard_upload(path.clone()).await;
        assert!(!path.exists());
    }
}
