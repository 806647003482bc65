use std::fs::{self, File, Metadata};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{DeployError, PackagingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Files and directories written, including nested ones.
    pub entries: usize,
    pub compressed_bytes: u64,
}

/// Replaces whatever is at `archive_path` with a fresh zip of `artifacts`.
/// Entry names are relative to `workdir`.
pub fn package_archive(
    archive_path: &Path,
    workdir: &Path,
    artifacts: &[PathBuf],
) -> Result<ArchiveSummary> {
    let summary =
        write_archive(archive_path, workdir, artifacts).map_err(|source| {
            DeployError::Packaging {
                archive: archive_path.to_path_buf(),
                source,
            }
        })?;

    info!(
        archive = %archive_path.display(),
        entries = summary.entries,
        compressed_bytes = summary.compressed_bytes,
        "packaged archive"
    );
    Ok(summary)
}

fn write_archive(
    archive_path: &Path,
    workdir: &Path,
    artifacts: &[PathBuf],
) -> std::result::Result<ArchiveSummary, PackagingError> {
    ensure_disjoint_from_artifacts(archive_path, artifacts)?;
    remove_stale_archive(archive_path)?;

    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    let mut entries = 0usize;

    for artifact in artifacts {
        for entry in WalkDir::new(artifact).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            let metadata = entry.metadata()?;
            let name = entry_name(workdir, path)?;
            let options = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(permission_bits(&metadata));

            if metadata.is_dir() {
                zip.add_directory(name, options)?;
            } else {
                zip.start_file(name, options)?;
                let mut source = File::open(path)?;
                io::copy(&mut source, &mut zip)?;
            }
            entries += 1;
        }
    }

    let file = zip.finish()?;
    Ok(ArchiveSummary {
        entries,
        compressed_bytes: file.metadata()?.len(),
    })
}

/// The archive must not be, or live inside, any artifact: removing the stale
/// archive would otherwise delete an input.
fn ensure_disjoint_from_artifacts(
    archive_path: &Path,
    artifacts: &[PathBuf],
) -> std::result::Result<(), PackagingError> {
    let resolved_archive = resolve_archive_path(archive_path)?;
    for artifact in artifacts {
        if resolved_archive.starts_with(artifact.canonicalize()?) {
            return Err(PackagingError::OverlapsArtifact {
                archive: archive_path.to_path_buf(),
                artifact: artifact.clone(),
            });
        }
    }
    Ok(())
}

/// Canonical parent joined with the file name. The file itself may not exist
/// yet, and an existing symlink at that path is replaced, not followed.
fn resolve_archive_path(archive_path: &Path) -> io::Result<PathBuf> {
    match (archive_path.parent(), archive_path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            Ok(parent.canonicalize()?.join(name))
        }
        _ => archive_path.canonicalize(),
    }
}

fn remove_stale_archive(archive_path: &Path) -> io::Result<()> {
    match fs::remove_file(archive_path) {
        Ok(()) => {
            debug!(archive = %archive_path.display(), "removed stale archive");
            Ok(())
        }
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    }
}

fn entry_name(workdir: &Path, path: &Path) -> std::result::Result<String, PackagingError> {
    let relative = path
        .strip_prefix(workdir)
        .map_err(|_| PackagingError::OutsideWorkdir(path.to_path_buf()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    if metadata.is_dir() {
        0o755
    } else {
        0o644
    }
}
