use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::graph::{Graph, ObjectId};
use crate::registry::ClassRegistry;

use super::error::SaveError;
use super::reader::deserialize;
use super::writer::serialize;
use super::TokenStream;

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serialize `roots` and write them to `path`.
///
/// The stream goes to `<path>.tmp` first and is renamed over `path`, so an
/// interrupted save never leaves a truncated file behind.
pub fn save_file(path: impl AsRef<Path>, graph: &Graph, roots: &[ObjectId]) -> Result<(), SaveError> {
    let path = path.as_ref();
    let stream = serialize(graph, roots)?;

    let tmp = temp_path(path);
    fs::write(&tmp, stream.as_str())?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    tracing::debug!(roots = roots.len(), bytes = stream.len(), "saved graph to {}", path.display());
    Ok(())
}

/// Read a stream written by [`save_file`] into `graph` and return its roots.
pub fn load_file(
    path: impl AsRef<Path>,
    registry: &ClassRegistry,
    graph: &mut Graph,
) -> Result<Vec<ObjectId>, SaveError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let roots = deserialize(registry, graph, &TokenStream::from(text))?;
    tracing::debug!(roots = roots.len(), "loaded graph from {}", path.display());
    Ok(roots)
}
