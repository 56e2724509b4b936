use std::path::Path;

use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::{dto::UploadedFile, errors::ApiError};

/// Directory under the media root that post images go to.
pub const POST_IMAGES_DIR: &str = "posts";

/// Reduces a client-supplied filename to a safe basename.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() { "upload".to_string() } else { cleaned }
}

/// Inserts a short random tag before the extension: `cat.gif` -> `cat_1a2b3c4.gif`.
fn alternative_name(name: &str) -> String {
    let tag: String = Uuid::new_v4().simple().to_string().chars().take(7).collect();
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{tag}.{ext}"),
        _ => format!("{name}_{tag}"),
    }
}

/// Writes an uploaded image under `<media_root>/posts/` keyed by its filename
/// and returns the stored name relative to the media root. A taken name gets
/// a random suffix instead of being overwritten.
pub async fn save_post_image(media_root: &Path, file: &UploadedFile) -> Result<String, ApiError> {
    let dir = media_root.join(POST_IMAGES_DIR);
    fs::create_dir_all(&dir).await?;

    let mut name = sanitize_file_name(&file.file_name);
    while fs::try_exists(dir.join(&name)).await? {
        name = alternative_name(&sanitize_file_name(&file.file_name));
    }

    fs::write(dir.join(&name), &file.bytes).await?;
    info!("Stored upload {} ({} bytes)", name, file.bytes.len());

    Ok(format!("{POST_IMAGES_DIR}/{name}"))
}
