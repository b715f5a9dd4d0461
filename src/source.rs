//! Capability-scoped reads of small on-disk inputs.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};

/// Splits `path` into the directory to open and the file name inside it.
pub(crate) fn split_parent(path: &Utf8Path) -> io::Result<(&Utf8Path, &str)> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{path} is missing a file name"),
        )
    })?;
    Ok((parent, file_name))
}

/// Reads a whole UTF-8 file.
pub(crate) fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (parent, file_name) = split_parent(path)?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}
