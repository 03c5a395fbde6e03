use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tempfile::Builder;

use crate::error::{FormError, FormResult};

/// Atomically write `contents` to `path`: readers see either nothing or the
/// whole file, never a partial write.
pub fn atomic_write(path: &Path, contents: &str) -> FormResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|err| FormError::io(parent, err))?;

    let mut tmp = Builder::new()
        .prefix(".pipsite")
        .tempfile_in(parent)
        .map_err(|err| FormError::io(parent, err))?;
    let tmp_path = tmp.path().to_path_buf();
    tmp.as_file_mut()
        .write_all(contents.as_bytes())
        .map_err(|err| FormError::io(&tmp_path, err))?;
    tmp.as_file_mut()
        .sync_all()
        .map_err(|err| FormError::io(&tmp_path, err))?;

    tmp.persist(path)
        .map(|_| ())
        .map_err(|err| FormError::io(path, err.error))
}

/// Append one line to `path`, creating the file and its parents on first use.
/// Callers serialise concurrent appends to the same file.
pub fn append_line(path: &Path, line: &str) -> FormResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| FormError::io(parent, err))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| FormError::io(path, err))?;
    let mut buffer = String::with_capacity(line.len() + 1);
    buffer.push_str(line);
    buffer.push('\n');
    file.write_all(buffer.as_bytes())
        .map_err(|err| FormError::io(path, err))
}
