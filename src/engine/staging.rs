//! Staging files for atomic output commits

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::debug;

use crate::domain::errors::{BackendError, TrimError};

pub(crate) const STAGING_PREFIX: &str = ".vidpare-";

/// Create an empty staging file for `output`.
///
/// The file lives next to the output unless `staging_dir` is given, and keeps
/// the output's extension (falling back to the input's) so the container can
/// be inferred from the name. It is deleted when the returned path drops.
pub(crate) fn create(output: &Path, input: &Path, staging_dir: Option<&Path>) -> io::Result<TempPath> {
    let dir = match staging_dir {
        Some(dir) => dir.to_path_buf(),
        None => parent_dir(output),
    };

    let extension = output.extension().or_else(|| input.extension());
    let suffix = extension
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let file = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(&suffix)
        .tempfile_in(&dir)?;

    // Close our handle so the backend can reopen the path for writing
    Ok(file.into_temp_path())
}

/// Atomically move the staging file onto `output`.
///
/// Without `overwrite` an output that appeared in the meantime is left alone.
/// On failure the staging file is removed.
pub(crate) fn commit(staging: TempPath, output: &Path, overwrite: bool) -> Result<(), TrimError> {
    let result = if overwrite {
        staging.persist(output)
    } else {
        staging.persist_noclobber(output)
    };

    match result {
        Ok(()) => {
            debug!(output = %output.display(), "Committed staging file");
            Ok(())
        }
        Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => Err(TrimError::OutputConflict {
            path: output.to_path_buf(),
            reason: "file appeared while trimming".to_string(),
        }),
        Err(err) => Err(TrimError::ExtractionFailed {
            path: output.to_path_buf(),
            cause: BackendError::Io(err.error),
        }),
    }
}

/// Whether two files hold the same bytes
pub(crate) fn same_contents(a: &Path, b: &Path) -> io::Result<bool> {
    if a.metadata()?.len() != b.metadata()?.len() {
        return Ok(false);
    }

    let mut left = File::open(a)?;
    let mut right = File::open(b)?;
    let mut left_buf = vec![0u8; 64 * 1024];
    let mut right_buf = vec![0u8; 64 * 1024];
    loop {
        let n = read_full(&mut left, &mut left_buf)?;
        let m = read_full(&mut right, &mut right_buf)?;
        if n != m || left_buf[..n] != right_buf[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` unless the reader ends first
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
