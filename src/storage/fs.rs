//! Local filesystem storage

use super::{Storage, MAX_PROGRAM_FILES};
use crate::{K7Error, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Storage backed by the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

/// Open file plus the path it came from, for error messages
#[derive(Debug)]
pub struct FsHandle {
    file: File,
    path: String,
}

fn unavailable(path: &str, err: impl std::fmt::Display) -> K7Error {
    K7Error::StorageUnavailable {
        path: path.to_string(),
        reason: err.to_string(),
    }
}

impl Storage for FsStorage {
    type Handle = FsHandle;

    fn open(&mut self, path: &str) -> Result<FsHandle> {
        let file = File::open(path).map_err(|e| {
            debug!(path, "open failed: {e}");
            unavailable(path, e)
        })?;
        Ok(FsHandle {
            file,
            path: path.to_string(),
        })
    }

    fn read(&mut self, handle: &mut FsHandle, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match handle.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(unavailable(&handle.path, e)),
            }
        }
        Ok(filled)
    }

    fn close(&mut self, _handle: FsHandle) {}
}

/// List the `.P` files in `dir`, sorted by name
///
/// Subdirectories are skipped and the list stops at [`MAX_PROGRAM_FILES`].
pub fn find_program_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let dir_name = dir.display().to_string();
    let entries = std::fs::read_dir(dir).map_err(|e| unavailable(&dir_name, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| unavailable(&dir_name, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| unavailable(&entry.path().display().to_string(), e))?;
        if !file_type.is_file() {
            continue;
        }
        let path = entry.path();
        let is_program = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("p"));
        if is_program {
            files.push(path);
        }
    }
    files.sort();
    if files.len() > MAX_PROGRAM_FILES {
        warn!(
            found = files.len(),
            "too many program files, keeping the first {MAX_PROGRAM_FILES}"
        );
        files.truncate(MAX_PROGRAM_FILES);
    }
    debug!(count = files.len(), "found program files");
    Ok(files)
}
