//! HTTP handlers for the `/file` tree.
//! Resolve the request path once, then hand the address to
//! `FileRepository`. Directory addresses list, file addresses read or write.

use crate::{
    errors::AppError,
    models::file::FileRecord,
    services::file_repository::{FileRepository, NewFile},
    vfs::{
        ValidationError,
        address::{self, Address, RecordAddress},
        listing::{ListingQuery, Ordering},
    },
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, OriginalUri, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Multipart field carrying the uploaded bytes.
const UPLOAD_FIELD: &str = "file";

/// Query params accepted by directory listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub filter_by_name: Option<String>,
    pub order_by: Option<String>,
    pub order_direction: Option<String>,
}

/// Body returned for a directory address.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListing {
    pub is_directory: bool,
    pub files: Vec<String>,
}

/// `GET /file`: list the root directory.
pub async fn get_root(
    State(repo): State<FileRepository>,
    Query(params): Query<ListingParams>,
) -> Result<Response, AppError> {
    read_path(&repo, "", params).await
}

/// `GET /file/{*path}`: file bytes, or a listing when the path has no extension.
pub async fn get_file(
    State(repo): State<FileRepository>,
    Path(path): Path<String>,
    Query(params): Query<ListingParams>,
) -> Result<Response, AppError> {
    read_path(&repo, &path, params).await
}

/// `POST /file/{*path}`: create a file from the `file` multipart field.
pub async fn create_file(
    State(repo): State<FileRepository>,
    OriginalUri(uri): OriginalUri,
    Path(path): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let address = require_file(&path, uri.path())?;
    let content = read_upload(multipart).await?;

    repo.create(NewFile { address, content }).await?;
    Ok(Json(json!({})))
}

/// `PATCH /file/{*path}`: replace the content of an existing file.
pub async fn update_file(
    State(repo): State<FileRepository>,
    OriginalUri(uri): OriginalUri,
    Path(path): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let address = require_file(&path, uri.path())?;
    let content = read_upload(multipart).await?;

    let mut record = repo.get_by_file_path(&address).await?;
    record.replace_content(content);
    repo.update(&record).await?;
    Ok(Json(json!({})))
}

/// `DELETE /file/{*path}`: archive a file.
pub async fn delete_file(
    State(repo): State<FileRepository>,
    OriginalUri(uri): OriginalUri,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let address = require_file(&path, uri.path())?;

    repo.mark_as_archived(&address).await?;
    Ok(Json(json!({})))
}

async fn read_path(
    repo: &FileRepository,
    path: &str,
    params: ListingParams,
) -> Result<Response, AppError> {
    match address::resolve(path)? {
        Address::Directory(dir) => {
            let query = ListingQuery::new(
                dir,
                params.filter_by_name.as_deref(),
                params.order_by.as_deref(),
                params.order_direction.as_deref(),
            )?;
            let records = repo.get_by_dir(&query).await?;
            if records.is_empty() && !repo.directory_exists(&query.dir).await? {
                return Err(AppError::not_found("no files matching file path"));
            }

            let listing = DirectoryListing {
                is_directory: true,
                files: records.into_iter().map(|r| r.file_name).collect(),
            };
            Ok(Json(listing).into_response())
        }
        Address::File(address) => {
            // a stray ordering pair is still rejected on file reads
            Ordering::parse(
                params.order_by.as_deref(),
                params.order_direction.as_deref(),
            )?;
            let record = repo.get_by_file_path(&address).await?;
            Ok(file_response(record))
        }
    }
}

/// Writes and deletes only make sense on file addresses.
fn require_file(path: &str, request_path: &str) -> Result<RecordAddress, AppError> {
    match address::resolve(path)? {
        Address::File(address) => Ok(address),
        Address::Directory(_) => Err(ValidationError::NotAFile(request_path.to_string()).into()),
    }
}

/// Pull the upload field out of the form, buffering it whole.
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            let data: Bytes = field.bytes().await?;
            return Ok(Vec::from(data));
        }
    }
    Err(ValidationError::MissingUpload(UPLOAD_FIELD).into())
}

fn file_response(record: FileRecord) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    let last_modified = record
        .last_modified
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();
    if let Ok(value) = HeaderValue::from_str(&last_modified) {
        headers.insert(header::LAST_MODIFIED, value);
    }

    let mut response = Response::new(Body::from(record.content));
    *response.status_mut() = StatusCode::OK;
    *response.headers_mut() = headers;
    response
}
