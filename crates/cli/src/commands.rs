//! One-shot commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use roomshift_core::media::{artifact_file_name, video_file_name};
use roomshift_core::{Artifact, CredentialGate, DesignStyle, SourceImage, VideoRef};

use crate::state::AppState;

pub fn list_styles() {
    for style in DesignStyle::ALL {
        let slug = serde_json::to_value(style)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        println!("{:<20} {}", slug, style.display_name());
    }
}

pub async fn load_sources(paths: &[PathBuf]) -> Result<Vec<SourceImage>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let source = SourceImage::from_path(path)
            .await
            .with_context(|| format!("Failed to load {:?}", path))?;
        sources.push(source);
    }
    Ok(sources)
}

pub async fn redesign(
    state: &AppState,
    style: DesignStyle,
    images: &[PathBuf],
    out: &Path,
) -> Result<()> {
    let sources = load_sources(images).await?;
    let artifacts = state.redesigner().run_redesign(&sources, style, &[]).await?;

    let written = write_artifacts(out, style, artifacts.iter().enumerate()).await?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

pub async fn tour(state: &AppState, images: &[PathBuf], out: &Path) -> Result<()> {
    let references: Vec<_> = load_sources(images)
        .await?
        .into_iter()
        .map(|s| s.payload)
        .collect();

    let mut gate = CredentialGate::new(state.key_selector().has_selected_key().await);
    let orchestrator = state
        .video_tour()
        .with_phase_callback(Arc::new(|phase| eprintln!("... {}", phase)));

    let video = orchestrator.run_video_tour(&references, &mut gate).await?;
    write_video(out, &video).await?;
    println!("{}", out.display());
    Ok(())
}

/// Write artifacts into `dir`, named after their index and `style`.
pub async fn write_artifacts<'a>(
    dir: &Path,
    style: DesignStyle,
    artifacts: impl Iterator<Item = (usize, &'a Artifact)>,
) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {:?}", dir))?;

    let mut written = Vec::new();
    for (index, artifact) in artifacts {
        let path = dir.join(artifact_file_name(index, style, &artifact.image.mime_type));
        tokio::fs::write(&path, &artifact.image.bytes)
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;
        written.push(path);
    }

    info!(count = written.len(), dir = %dir.display(), "Wrote artifacts");
    Ok(written)
}

pub async fn write_video(path: &Path, video: &VideoRef) -> Result<()> {
    if video.bytes.is_empty() {
        bail!("video {} has no content", video.id);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &video.bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;
    info!(path = %path.display(), bytes = video.bytes.len(), "Wrote video tour");
    Ok(())
}

/// Default file name for a video inside an export directory.
pub fn video_path(dir: &Path, video: &VideoRef) -> PathBuf {
    dir.join(video_file_name(&video.mime_type))
}
