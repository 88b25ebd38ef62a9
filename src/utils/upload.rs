use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::AppError;

/// Strip any path components and reject empty or oversized filenames.
pub fn sanitize_filename(name: &str) -> Result<String, AppError> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim()
        .to_string();
    if base.is_empty() || base == "." || base == ".." {
        return Err(AppError::Validation("Invalid filename".into()));
    }
    if base.chars().count() > 255 {
        return Err(AppError::Validation("Filename too long".into()));
    }
    Ok(base)
}

/// A file persisted to the uploads directory.
pub struct StoredFile {
    /// Original (sanitized) filename as supplied by the client.
    pub file_name: String,
    /// Path on disk, relative to nothing in particular; stored verbatim.
    pub path: PathBuf,
    pub size: i64,
}

/// Stream a multipart field to a uniquely named file under `dir`.
///
/// Enforces `max_size` while streaming so oversized uploads are cut off
/// without buffering the whole body. The partial file is removed on failure.
pub async fn store_field(
    mut field: Field<'_>,
    dir: &Path,
    subdir: &str,
    max_size: usize,
) -> Result<StoredFile, AppError> {
    let file_name = field
        .file_name()
        .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?
        .to_string();
    let file_name = sanitize_filename(&file_name)?;

    let target_dir = dir.join(subdir);
    tokio::fs::create_dir_all(&target_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create uploads dir: {e}")))?;

    let path = target_dir.join(format!("{}_{}", Uuid::now_v7(), file_name));
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload file: {e}")))?;

    let mut size: usize = 0;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(AppError::Validation(format!("Multipart error: {e}")));
            }
        };

        size += chunk.len();
        if size > max_size {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(AppError::Validation(format!(
                "File exceeds maximum size of {max_size} bytes"
            )));
        }

        if let Err(e) = file.write_all(&chunk).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(AppError::Internal(format!("Failed to write upload: {e}")));
        }
    }

    if let Err(e) = file.flush().await {
        let _ = tokio::fs::remove_file(&path).await;
        return Err(AppError::Internal(format!("Failed to flush upload: {e}")));
    }

    Ok(StoredFile {
        file_name,
        path,
        size: size as i64,
    })
}
