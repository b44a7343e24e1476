// Primitives for reading the raw polling files.

use std::path::Path;

use crate::polls::*;
use snafu::ResultExt;

/// Reads the whole file before any parsing happens. The file is closed when
/// this returns.
pub fn read_poll_file(path: &Path) -> ReportResult<String> {
    let p = path.display().to_string();
    info!("Attempting to read poll file {:?}", p);
    let contents = fs::read_to_string(path).context(OpeningInputSnafu { path: p })?;
    debug!("read_poll_file: {} bytes", contents.len());
    Ok(contents)
}

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
