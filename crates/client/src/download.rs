use std::path::{Path, PathBuf};

use crate::api::Blob;
use crate::error::ClientResult;

/// Write `blob` into `dir`, creating the directory if needed.
///
/// The name comes from the blob's `Content-Disposition`, else `fallback`.
/// Path components are stripped so the file always lands inside `dir`.
pub async fn save_blob(dir: &Path, blob: &Blob, fallback: &str) -> ClientResult<PathBuf> {
    let name = blob
        .file_name
        .as_deref()
        .and_then(sanitize_file_name)
        .or_else(|| sanitize_file_name(fallback))
        .unwrap_or_else(|| "descarga.bin".to_string());

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(name);
    tokio::fs::write(&path, &blob.bytes).await?;
    tracing::info!(path = %path.display(), bytes = blob.bytes.len(), "File downloaded");
    Ok(path)
}

fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}
