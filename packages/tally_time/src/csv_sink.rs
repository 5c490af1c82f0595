//! Append-only CSV log of timing records.
//!
//! The file has two columns, `name` and `time` (unrounded seconds). The header row is written
//! only when the file does not exist yet, so repeated appends produce a single header.
//!
//! Times use the shortest representation that parses back to the same `f64`: `1.5`, `0.0`,
//! and for very small values the exponent form without zero padding, e.g. `5e-5`.

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result};

const HEADER: &str = "name,time\n";

/// Appends one row per `(name, time)` pair to the CSV file at `path`.
///
/// Missing parent directories are created. Existing content is never rewritten.
pub(crate) fn append_rows<'a>(
    path: &Path,
    rows: impl IntoIterator<Item = (&'a str, Duration)>,
) -> Result<()> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let write_header = !path.exists();

    let mut contents = String::new();
    if write_header {
        contents.push_str(HEADER);
    }

    let mut row_count: usize = 0;
    for (name, time) in rows {
        push_field(&mut contents, name);
        writeln!(contents, ",{:?}", time.as_secs_f64())
            .expect("writing to a String cannot fail");
        row_count = row_count.saturating_add(1);
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)?;

    file.write_all(contents.as_bytes()).map_err(io_error)?;

    tracing::debug!(
        path = %path.display(),
        rows = row_count,
        header = write_header,
        "appended timing records"
    );

    Ok(())
}

/// Appends `field` to `line`, quoting it only if it contains a delimiter, quote or line break.
fn push_field(line: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        line.push('"');
        line.push_str(&field.replace('"', "\"\""));
        line.push('"');
    } else {
        line.push_str(field);
    }
}
