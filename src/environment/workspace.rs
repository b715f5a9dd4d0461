//! Output directory reset backed by `cap-std`.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use tracing::debug;

use super::{EnvironmentError, WorkspaceResetter};
use crate::config::WorkspaceConfig;
use crate::source::split_parent;

/// Removes the output directory, if present, and creates it again empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirWorkspaceResetter;

impl WorkspaceResetter for DirWorkspaceResetter {
    fn reset(&self, workspace: &WorkspaceConfig) -> Result<(), EnvironmentError> {
        let path = workspace.output_dir.as_path();
        reset_dir(path).map_err(|err| EnvironmentError::Workspace {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

fn reset_dir(path: &Utf8Path) -> io::Result<()> {
    let (parent, name) = split_parent(path)?;
    Dir::create_ambient_dir_all(parent, ambient_authority())?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    if dir.try_exists(name)? {
        debug!(path = %path, "removing previous output directory");
        dir.remove_dir_all(name)?;
    }
    dir.create_dir(name)
}
