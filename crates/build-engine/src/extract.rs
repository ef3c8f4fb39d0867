//! Archive extraction
//!
//! Unpacks a downloaded archive into the shared source tree. The expected
//! top-level directory name comes from the recipe declaration; the archive
//! is never introspected to discover it, so a wrong declaration surfaces
//! downstream as a not-found error.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::BuildError;

/// Unpack `archive` under `parent`, returning `parent/base`.
///
/// With `lazy` set and `parent/base` already present as a directory, the
/// filesystem is left untouched. Otherwise any pre-existing directory at
/// that path is removed first and the archive is fully re-extracted.
pub async fn extract(
    archive: &Path,
    parent: &Path,
    base: &str,
    lazy: bool,
) -> Result<PathBuf, BuildError> {
    let dest = parent.join(base);

    if lazy && dest.is_dir() {
        debug!("Reusing extracted {:?}", dest);
        return Ok(dest);
    }

    match tokio::fs::remove_dir_all(&dest).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    tokio::fs::create_dir_all(parent).await?;

    info!("Extracting {:?}", archive);

    let archive = archive.to_path_buf();
    let parent_dir = parent.to_path_buf();
    tokio::task::spawn_blocking(move || unpack_archive(&archive, &parent_dir))
        .await
        .map_err(|e| BuildError::Archive(e.to_string()))??;

    Ok(dest)
}

/// Dispatch on the archive filename; the zip and tar crates are
/// synchronous, so this runs on the blocking pool
fn unpack_archive(archive: &Path, parent: &Path) -> Result<(), BuildError> {
    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let file = std::fs::File::open(archive)?;

    if name.ends_with(".zip") {
        let mut zip = zip::ZipArchive::new(file)
            .map_err(|e| BuildError::Archive(e.to_string()))?;
        zip.extract(parent)
            .map_err(|e| BuildError::Archive(e.to_string()))
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        unpack_tar(flate2::read::GzDecoder::new(file), parent)
    } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
        unpack_tar(bzip2::read::BzDecoder::new(file), parent)
    } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
        unpack_tar(xz2::read::XzDecoder::new(file), parent)
    } else if name.ends_with(".tar.lzma") {
        let stream = xz2::stream::Stream::new_lzma_decoder(u64::MAX)
            .map_err(|e| BuildError::Archive(e.to_string()))?;
        unpack_tar(xz2::read::XzDecoder::new_stream(file, stream), parent)
    } else {
        Err(BuildError::UnsupportedArchive(name))
    }
}

fn unpack_tar<R: Read>(reader: R, parent: &Path) -> Result<(), BuildError> {
    tar::Archive::new(reader)
        .unpack(parent)
        .map_err(|e| BuildError::Archive(e.to_string()))
}
