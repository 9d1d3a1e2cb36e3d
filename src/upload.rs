use std::path::{Path, PathBuf};

use axum::http::HeaderMap;
use bytes::Bytes;
use uuid::Uuid;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "gif"];

/// Room for the multipart envelope around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Longest client file name kept in the stored name, so the returned path fits a `headPic`.
const MAX_BASE_NAME: usize = 40;

/// Largest request body accepted for an upload of at most `max_file_size` bytes.
pub fn body_limit(max_file_size: usize) -> usize {
    max_file_size + MULTIPART_OVERHEAD
}

pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

/// Pull the named file field out of a multipart body.
pub async fn read_file_field(
    headers: &HeaderMap,
    body: Bytes,
    field_name: &str,
) -> Result<UploadedFile, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| format!("Field '{field_name}' is not a file"))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| format!("Field read error: {e}"))?;
        return Ok(UploadedFile { file_name, data });
    }

    Err(format!("Missing file field '{field_name}'"))
}

/// Only small png/jpg/gif images are accepted.
pub fn check_image(file: &UploadedFile, max_size: usize) -> Result<(), String> {
    let extension = Path::new(&file.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    if !extension.is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str())) {
        return Err("Only images can be uploaded".to_string());
    }
    if file.data.len() > max_size {
        return Err(format!("File is larger than {max_size} bytes"));
    }
    Ok(())
}

/// `<uuid v7>-<base name>`; the v7 prefix keeps names unique and time-ordered.
fn stored_name(original: &str) -> String {
    format!("{}-{}", Uuid::now_v7().simple(), short_base_name(original))
}

/// Client file name without directories, with long stems cut down to
/// [`MAX_BASE_NAME`] characters while keeping the extension.
fn short_base_name(original: &str) -> String {
    let path = Path::new(original);
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    if base.chars().count() <= MAX_BASE_NAME {
        return base.to_string();
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let keep = MAX_BASE_NAME.saturating_sub(ext.chars().count() + 1);
            let stem: String = base.chars().take(keep).collect();
            format!("{stem}.{ext}")
        }
        None => base.chars().take(MAX_BASE_NAME).collect(),
    }
}

/// Write the file under `dir` and return its path.
pub async fn store(dir: &Path, file: &UploadedFile) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(stored_name(&file.file_name));
    tokio::fs::write(&path, &file.data).await?;
    Ok(path)
}
