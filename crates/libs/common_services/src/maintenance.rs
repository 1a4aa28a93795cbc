//! Reconciliation of the images root with the `customer_faces` table.
//!
//! An enrollment writes its image files before its transaction commits. An abort deletes them
//! again, but a failed deletion or an unknown commit outcome leaves files that no row
//! references. This sweep finds and removes them.

use crate::database::customer_store::CustomerStore;
use crate::image_codec::is_capture_file_name;
use color_eyre::Result;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{info, instrument, warn};

/// A capture file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    pub modified: SystemTime,
}

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub scanned: usize,
    pub referenced: usize,
    /// Unreferenced but younger than the grace period.
    pub too_recent: usize,
    pub orphans: Vec<String>,
    pub removed: usize,
    pub dry_run: bool,
}

/// Unreferenced files older than `grace`, sorted by name.
///
/// A file with a modification time in the future counts as fresh.
#[must_use]
pub fn find_orphans(
    files: &[StoredImage],
    referenced: &HashSet<String>,
    now: SystemTime,
    grace: Duration,
) -> Vec<String> {
    let mut orphans: Vec<String> = files
        .iter()
        .filter(|file| !referenced.contains(&file.file_name))
        .filter(|file| {
            now.duration_since(file.modified)
                .is_ok_and(|age| age >= grace)
        })
        .map(|file| file.file_name.clone())
        .collect();
    orphans.sort();
    orphans
}

/// Lists capture files directly under `images_dir`. Other files are ignored.
async fn list_capture_files(images_dir: &Path) -> Result<Vec<StoredImage>> {
    let mut files = Vec::new();
    let mut entries = fs::read_dir(images_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !is_capture_file_name(&file_name) {
            continue;
        }
        files.push(StoredImage {
            file_name,
            modified: metadata.modified()?,
        });
    }
    Ok(files)
}

/// Compares the images root against the given referenced names and removes orphans, unless
/// `dry_run` is set.
#[instrument(skip(referenced))]
pub async fn sweep_directory(
    images_dir: &Path,
    referenced: &HashSet<String>,
    grace: Duration,
    dry_run: bool,
) -> Result<SweepReport> {
    let files = list_capture_files(images_dir).await?;
    let orphans = find_orphans(&files, referenced, SystemTime::now(), grace);
    let unreferenced = files
        .iter()
        .filter(|f| !referenced.contains(&f.file_name))
        .count();

    let mut report = SweepReport {
        scanned: files.len(),
        referenced: files.len() - unreferenced,
        too_recent: unreferenced - orphans.len(),
        orphans: Vec::new(),
        removed: 0,
        dry_run,
    };

    for file_name in orphans {
        if dry_run {
            info!("Would remove orphaned image {}", file_name);
        } else {
            let path: PathBuf = images_dir.join(&file_name);
            match fs::remove_file(&path).await {
                Ok(()) => {
                    info!("Removed orphaned image {}", file_name);
                    report.removed += 1;
                }
                Err(e) => warn!("Could not remove orphaned image {:?}: {}", path, e),
            }
        }
        report.orphans.push(file_name);
    }

    Ok(report)
}

/// Removes image files that no `customer_faces` row references.
pub async fn sweep_orphaned_images(
    pool: &PgPool,
    images_dir: &Path,
    grace: Duration,
    dry_run: bool,
) -> Result<SweepReport> {
    let referenced: HashSet<String> = CustomerStore::all_image_paths(pool)
        .await?
        .into_iter()
        .collect();
    let report = sweep_directory(images_dir, &referenced, grace, dry_run).await?;
    info!(
        scanned = report.scanned,
        orphans = report.orphans.len(),
        removed = report.removed,
        dry_run,
        "Orphaned image sweep finished"
    );
    Ok(report)
}
