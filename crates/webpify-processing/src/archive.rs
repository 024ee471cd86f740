//! Archive builder: packages converted outputs into one zip file on disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use webpify_core::models::Archive;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Failed to create archive {path}: {message}")]
    Create { path: String, message: String },

    #[error("Failed to add archive member {name}: {message}")]
    Member { name: String, message: String },

    #[error("Failed to finalize archive: {0}")]
    Finalize(String),

    #[error("Archive build task failed: {0}")]
    Task(String),
}

/// Sanitize a filename for an archive entry: only the base name is used,
/// never any path components.
fn archive_member_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| s.to_string())
}

/// Stream `members` into a single zip at `dest`, Deflate at maximum
/// compression. Only one member's bytes are held in memory at a time. The
/// archive is complete only once finalization succeeds; on any failure the
/// partial file is removed before the error is returned.
pub async fn build_archive(members: Vec<PathBuf>, dest: PathBuf) -> Result<Archive, ArchiveError> {
    let filename = archive_member_name(&dest).ok_or_else(|| ArchiveError::Create {
        path: dest.display().to_string(),
        message: "destination has no filename".to_string(),
    })?;

    let member_count = members.len();
    let build_dest = dest.clone();
    let result = tokio::task::spawn_blocking(move || write_zip(&members, &build_dest))
        .await
        .map_err(|e| ArchiveError::Task(e.to_string()))?;

    match result {
        Ok(size_bytes) => {
            tracing::info!(
                archive = %filename,
                members = member_count,
                size_bytes,
                "Archive created"
            );
            Ok(Archive {
                filename,
                size_bytes,
                path: dest,
            })
        }
        Err(e) => {
            // Never leave a partial archive behind
            if let Err(cleanup_err) = std::fs::remove_file(&dest) {
                if cleanup_err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        error = %cleanup_err,
                        path = %dest.display(),
                        "Failed to remove partial archive"
                    );
                }
            }
            Err(e)
        }
    }
}

fn write_zip(members: &[PathBuf], dest: &Path) -> Result<u64, ArchiveError> {
    use zip::write::FileOptions;
    use zip::CompressionMethod;

    let file = std::fs::File::create(dest).map_err(|e| ArchiveError::Create {
        path: dest.display().to_string(),
        message: e.to_string(),
    })?;

    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9))
        .unix_permissions(0o644);

    for member in members {
        let name = archive_member_name(member).ok_or_else(|| ArchiveError::Member {
            name: member.display().to_string(),
            message: "member has no filename".to_string(),
        })?;

        // One member in memory at a time
        let data = std::fs::read(member).map_err(|e| ArchiveError::Member {
            name: name.clone(),
            message: e.to_string(),
        })?;

        zip.start_file(name.as_str(), options).map_err(|e| ArchiveError::Member {
            name: name.clone(),
            message: e.to_string(),
        })?;
        zip.write_all(&data).map_err(|e| ArchiveError::Member {
            name,
            message: e.to_string(),
        })?;
    }

    let file = zip
        .finish()
        .map_err(|e| ArchiveError::Finalize(e.to_string()))?;
    file.sync_all()
        .map_err(|e| ArchiveError::Finalize(e.to_string()))?;

    let size = file
        .metadata()
        .map_err(|e| ArchiveError::Finalize(e.to_string()))?
        .len();
    Ok(size)
}
