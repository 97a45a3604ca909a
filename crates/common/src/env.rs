//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::info;

/// Create the upload directory if needed and confirm it is writable.
pub async fn ensure_env(images_dir: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(images_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {images_dir}: {e}"))?;
    let meta = tokio::fs::metadata(images_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot stat {images_dir}: {e}"))?;
    if meta.permissions().readonly() {
        return Err(anyhow::anyhow!("{images_dir} is read-only"));
    }
    info!(%images_dir, "images directory ready");
    Ok(())
}
