//! Image fixture uploader.
//!
//! Walks the local pics directory, matches entity folders like `user-7` or
//! `post_12`, and uploads each contained file to a deterministic remote
//! path: a lone file lands at `.../image`, several files at `.../image-1`,
//! `.../image-2`, ... in lexicographic filename order.

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::backend::ObjectStore;
use crate::config::{self, UploadSet};
use crate::error::Result;

/// One resolved upload: a local file and the remote path it goes to.
#[derive(Debug)]
pub struct PlannedUpload {
    pub local_path: PathBuf,
    pub remote_path: String,
}

/// Per-set scan counters, logged at the end of the procedure.
#[derive(Debug, Default)]
pub struct ScanStats {
    pub folders_matched: usize,
    pub folders_skipped: usize,
}

/// Scan one upload set's directory and derive the uploads it implies.
///
/// Pure planning over the directory listing: nothing is uploaded here.
/// Folders whose names don't carry a `<prefix>[-_]<digits>` ID are counted
/// and skipped; matched folders with no regular files inside yield nothing.
pub fn plan_uploads(
    dir_path: &Path,
    remote_prefix: &str,
    id_prefix: &str,
) -> Result<(Vec<PlannedUpload>, ScanStats)> {
    let pattern = Regex::new(&format!(r"{}[-_](\d+)", regex::escape(id_prefix)))
        .expect("escaped prefix always forms a valid pattern");

    let mut entity_dirs = Vec::new();
    for entry in std::fs::read_dir(dir_path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            entity_dirs.push(entry.path());
        }
    }
    // Directory listing order is platform-dependent; sort for stable output.
    entity_dirs.sort();

    let mut plan = Vec::new();
    let mut stats = ScanStats::default();

    for entity_dir in entity_dirs {
        let name = entity_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(captures) = pattern.captures(&name) else {
            stats.folders_skipped += 1;
            continue;
        };
        let entity_id = &captures[1];

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&entity_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
            }
        }
        if files.is_empty() {
            continue;
        }
        // Sort filenames so ordinals are deterministic across runs.
        files.sort_by(|a, b| a.0.cmp(&b.0));

        stats.folders_matched += 1;
        let entity_key = format!("{}-{}", id_prefix, entity_id);

        if let [(_, local_path)] = files.as_slice() {
            plan.push(PlannedUpload {
                local_path: local_path.clone(),
                remote_path: format!("{}/{}/image", remote_prefix, entity_key),
            });
        } else {
            for (index, (_, local_path)) in files.into_iter().enumerate() {
                plan.push(PlannedUpload {
                    local_path,
                    remote_path: format!("{}/{}/image-{}", remote_prefix, entity_key, index + 1),
                });
            }
        }
    }

    Ok((plan, stats))
}

/// Run one upload set against the object store.
async fn upload_set(base_dir: &Path, set: &UploadSet, store: &dyn ObjectStore) -> Result<usize> {
    let dir_path = base_dir.join(set.local_dir);
    if !dir_path.exists() {
        tracing::info!("Sub-directory not found: {}", dir_path.display());
        return Ok(0);
    }

    tracing::info!("Scanning {}...", set.local_dir);
    let (plan, stats) = plan_uploads(&dir_path, set.remote_prefix, set.id_prefix)?;

    let mut uploaded = 0;
    for upload in &plan {
        store
            .put_from_file(&upload.remote_path, &upload.local_path)
            .await?;
        tracing::info!("Uploaded: {}", upload.remote_path);
        uploaded += 1;
    }

    tracing::info!(
        "{}: {} folders matched, {} skipped, {} files uploaded",
        set.local_dir,
        stats.folders_matched,
        stats.folders_skipped,
        uploaded
    );
    Ok(uploaded)
}

/// Upload all image fixtures under `base_dir`.
///
/// A missing base directory (or sub-directory) is logged and skipped; an
/// upload failure propagates and ends the procedure.
pub async fn upload_images(base_dir: &Path, store: &dyn ObjectStore) -> Result<()> {
    if !base_dir.exists() {
        tracing::info!("Directory not found: {}", base_dir.display());
        return Ok(());
    }

    let mut total = 0;
    for set in &config::UPLOAD_SETS {
        total += upload_set(base_dir, set, store).await?;
    }

    tracing::info!("Image upload complete ({} files).", total);
    Ok(())
}
