//! Model download and installation.
//!
//! Fetches the Vosk model archive, unpacks it next to the configured model
//! path, and renames the extracted folder to match. Skipped entirely when
//! the model directory already exists.

use crate::defaults;
use crate::error::{EchoError, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Ensure the model directory at `target` exists, downloading and unpacking
/// the default archive if it does not. Returns the model path.
pub async fn ensure_model(target: &Path, progress: bool) -> Result<PathBuf> {
    if target.exists() {
        if progress {
            eprintln!("Model already installed at {}", target.display());
        }
        return Ok(target.to_path_buf());
    }

    let parent = target.parent().filter(|p| !p.as_os_str().is_empty());
    let dest_dir = parent.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dest_dir)
        .map_err(|e| EchoError::Other(format!("failed to create model directory: {e}")))?;

    let zip_path = dest_dir.join("model-download.zip");
    download_to_path(defaults::MODEL_DOWNLOAD_URL, &zip_path, progress).await?;

    if progress {
        eprintln!("Unpacking...");
    }
    let extracted = unpack_archive(&zip_path, dest_dir)?;
    if let Err(e) = fs::remove_file(&zip_path) {
        eprintln!("echovision: failed to remove downloaded archive: {e}");
    }

    // The archive root folder carries the upstream model name; line it up
    // with whatever path the config asks for.
    if extracted != target {
        fs::rename(&extracted, target).map_err(|e| {
            EchoError::Other(format!(
                "failed to move {} to {}: {e}",
                extracted.display(),
                target.display()
            ))
        })?;
    }

    if progress {
        eprintln!("Model installed to: {}", target.display());
    }
    Ok(target.to_path_buf())
}

/// Core download: fetch url and stream it to `output_path`.
async fn download_to_path(url: &str, output_path: &Path, progress: bool) -> Result<()> {
    if progress {
        eprintln!("Downloading model (approx 40 MB)...");
    }

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| EchoError::Other(format!("failed to start download: {e}")))?;

    if !response.status().is_success() {
        return Err(EchoError::Other(format!(
            "download failed with status: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = if progress {
        let pb = ProgressBar::new(total_size);
        pb.set_style(
            // SAFETY: hardcoded template string — always valid
            #[allow(clippy::expect_used)]
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .expect("hardcoded progress bar template")
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut stream = response.bytes_stream();
    let mut file = fs::File::create(output_path)
        .map_err(|e| EchoError::Other(format!("failed to create output file: {e}")))?;

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| EchoError::Other(format!("failed to read download chunk: {e}")))?;

        file.write_all(&chunk)
            .map_err(|e| EchoError::Other(format!("failed to write to file: {e}")))?;

        if let Some(ref pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Downloaded");
    }

    Ok(())
}

/// Extract the archive into `dest_dir` and return the path of its root
/// folder.
fn unpack_archive(zip_path: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file = fs::File::open(zip_path)
        .map_err(|e| EchoError::Other(format!("failed to open archive: {e}")))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| EchoError::Other(format!("failed to read archive: {e}")))?;

    let root = archive_root(&mut archive)?;
    archive
        .extract(dest_dir)
        .map_err(|e| EchoError::Other(format!("failed to unpack archive: {e}")))?;

    Ok(dest_dir.join(root))
}

/// First path component shared by every archive entry.
fn archive_root(archive: &mut zip::ZipArchive<fs::File>) -> Result<String> {
    let first = archive
        .name_for_index(0)
        .ok_or_else(|| EchoError::Other("archive is empty".to_string()))?;
    let root = first
        .split('/')
        .next()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| EchoError::Other(format!("unexpected archive entry: {first}")))?;
    Ok(root.to_string())
}
