//! Writing image buffers to disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use log::{info, warn};

use crate::buffer::ImageBuffer;
use crate::error::SaveError;

/// Save the buffer's bytes verbatim to `path`.
///
/// PNG and JPEG buffers require the path to end in `.png` / `.jpeg`
/// (case-sensitive). Raw RGB buffers accept any path. On a failed write the
/// partially written file is removed.
pub fn save<P: AsRef<Path>>(buffer: &ImageBuffer, path: P) -> Result<(), SaveError> {
    let path = path.as_ref();
    let result = write_buffer(buffer, path);
    match &result {
        Ok(()) => info!("saved {} bytes to {}", buffer.size(), path.display()),
        Err(err) => warn!("abort save: {err}"),
    }
    result
}

fn write_buffer(buffer: &ImageBuffer, path: &Path) -> Result<(), SaveError> {
    let data = buffer
        .data()
        .filter(|_| buffer.size() > 0)
        .ok_or(SaveError::NoData)?;
    check_extension(buffer, path)?;

    let io_err = |source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(io_err)?;
    let written = file.write_all(data).and_then(|()| file.flush());
    if let Err(err) = written {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(io_err(err));
    }
    Ok(())
}

/// Compare the text after the last `.` of the file name with the encoding's
/// extension.
fn check_extension(buffer: &ImageBuffer, path: &Path) -> Result<(), SaveError> {
    let Some(expected) = buffer.encoding().and_then(|encoding| encoding.file_extension()) else {
        return Ok(());
    };
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let found = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .ok_or_else(|| SaveError::MissingExtension(path.to_path_buf()))?;
    if found == expected {
        Ok(())
    } else {
        Err(SaveError::ExtensionMismatch {
            expected,
            found: found.to_owned(),
        })
    }
}
