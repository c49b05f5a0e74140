//! Program file access
//!
//! The player only needs open/read/close on a storage collaborator, plus a list
//! of `.P` files to offer in the menu. Any failure means the send is aborted.

pub mod fs;

pub use fs::{find_program_files, FsStorage};

use crate::tape_image::MAX_IMAGE_LEN;
use crate::Result;

/// Most program files offered in the menu
pub const MAX_PROGRAM_FILES: usize = 50;

/// Storage collaborator
pub trait Storage {
    /// Open file handle
    type Handle;

    /// Open a file for reading
    fn open(&mut self, path: &str) -> Result<Self::Handle>;

    /// Read up to `buf.len()` bytes, returning how many were read
    fn read(&mut self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<usize>;

    /// Release the handle
    fn close(&mut self, handle: Self::Handle);
}

/// Read a program file into a fresh buffer of at most [`MAX_IMAGE_LEN`] bytes
///
/// The handle is closed whether or not the read succeeds.
pub fn load_program<S: Storage>(storage: &mut S, path: &str) -> Result<Vec<u8>> {
    let mut handle = storage.open(path)?;
    let mut buf = vec![0u8; MAX_IMAGE_LEN];
    let result = storage.read(&mut handle, &mut buf);
    storage.close(handle);
    let len = result?;
    buf.truncate(len);
    Ok(buf)
}
