//! Saving snapshots of the shader files being edited.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Timestamp format used for dump folders and screenshot names.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y-%H-%M-%S";

/// Local time formatted with [`TIMESTAMP_FORMAT`].
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Copies every shader into `<dump_dir>/<timestamp>/`, keeping file names.
///
/// Returns the folder that was written.
pub fn save_shaders<'a>(
    dump_dir: &Path,
    shaders: impl IntoIterator<Item = &'a Path>,
) -> Result<PathBuf> {
    save_shaders_into(&dump_dir.join(timestamp()), shaders)
}

fn save_shaders_into<'a>(
    folder: &Path,
    shaders: impl IntoIterator<Item = &'a Path>,
) -> Result<PathBuf> {
    fs::create_dir_all(folder)
        .with_context(|| format!("failed to create dump folder {}", folder.display()))?;

    for path in shaders {
        let name = path
            .file_name()
            .with_context(|| format!("shader path {} has no file name", path.display()))?;
        let to = folder.join(name);
        fs::copy(path, &to)
            .with_context(|| format!("failed to copy {} to {}", path.display(), to.display()))?;
        log::info!("saved {}", to.display());
    }

    Ok(folder.to_path_buf())
}
