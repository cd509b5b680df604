//! Local filesystem storage for report photos
//!
//! Layout: `<root>/<report_number>/<NN>_<sanitized name>`. The database only
//! records when photos were uploaded; the directory is the source of truth
//! for what exists.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::core::error::{AppError, Result};
use crate::shared::constants::PHOTO_EXTENSIONS;
use crate::shared::validation::{REPORT_NUMBER_REGEX, UNSAFE_FILENAME_CHARS};

/// One uploaded photo, as received from the multipart form
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload root if missing
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Directory of one report. Rejects anything that is not a report
    /// number so user input can never escape the upload root.
    pub fn report_dir(&self, report_number: &str) -> Result<PathBuf> {
        if !REPORT_NUMBER_REGEX.is_match(report_number) {
            return Err(AppError::BadRequest(format!(
                "Invalid report number: {}",
                report_number
            )));
        }
        Ok(self.root.join(report_number))
    }

    /// Public URL a photo is served under
    pub fn photo_url(report_number: &str, file_name: &str) -> String {
        format!("/uploads/{}/{}", report_number, file_name)
    }

    /// Whether a file name has one of the accepted image extensions
    pub fn is_photo_file(file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                PHOTO_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
    }

    /// Reduce a client-supplied file name to a safe ASCII basename.
    ///
    /// An accepted image extension is kept, lowercased, even when nothing
    /// of the stem survives (`写真.jpg` becomes `photo.jpg`).
    pub fn sanitize_filename(file_name: &str) -> String {
        let base = file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();

        let (stem, extension) = match base.rsplit_once('.') {
            Some((stem, ext))
                if PHOTO_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed)) =>
            {
                (stem, Some(ext.to_ascii_lowercase()))
            }
            _ => (base, None),
        };

        let cleaned = UNSAFE_FILENAME_CHARS.replace_all(stem, "_");
        let trimmed = cleaned.trim_start_matches(['.', '_']);
        let stem = if trimmed.is_empty() { "photo" } else { trimmed };

        match extension {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem.to_string(),
        }
    }

    /// Write photos for a report, numbering them from 01 in upload order.
    ///
    /// Returns the stored file names.
    pub async fn save_photos(
        &self,
        report_number: &str,
        photos: &[PhotoUpload],
    ) -> Result<Vec<String>> {
        let dir = self.report_dir(report_number)?;
        fs::create_dir_all(&dir).await?;

        let mut stored = Vec::with_capacity(photos.len());
        for (index, photo) in photos.iter().enumerate() {
            let name = format!(
                "{:02}_{}",
                index + 1,
                Self::sanitize_filename(&photo.file_name)
            );
            fs::write(dir.join(&name), &photo.data).await?;
            debug!("Stored photo {}/{}", report_number, name);
            stored.push(name);
        }

        info!(
            "Stored {} photo(s) for report {}",
            stored.len(),
            report_number
        );
        Ok(stored)
    }

    /// Image files of a report, sorted by name. Missing directory → empty.
    pub async fn list_photos(&self, report_number: &str) -> Result<Vec<String>> {
        let dir = self.report_dir(report_number)?;
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if Self::is_photo_file(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub async fn count_photos(&self, report_number: &str) -> Result<usize> {
        Ok(self.list_photos(report_number).await?.len())
    }

    /// Delete a report's photo directory.
    ///
    /// Returns the bytes freed, or `None` when there was no directory.
    pub async fn remove_report_dir(&self, report_number: &str) -> Result<Option<u64>> {
        let dir = self.report_dir(report_number)?;
        if !fs::try_exists(&dir).await? {
            return Ok(None);
        }

        let size = dir_size(&dir).await?;
        fs::remove_dir_all(&dir).await?;
        info!(
            "Removed photo directory for report {} ({} bytes)",
            report_number, size
        );
        Ok(Some(size))
    }

    /// Bytes used by everything under the upload root
    pub async fn total_size(&self) -> Result<u64> {
        if !fs::try_exists(&self.root).await? {
            return Ok(0);
        }
        dir_size(&self.root).await
    }
}

/// Recursive size of all regular files below `path`
async fn dir_size(path: &Path) -> Result<u64> {
    let mut total = 0u64;
    let mut pending = vec![path.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                total += entry.metadata().await?.len();
            }
        }
    }

    Ok(total)
}
