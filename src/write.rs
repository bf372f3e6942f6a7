use arrow::{csv::WriterBuilder, error::ArrowError, record_batch::RecordBatch};
use std::{
    fs,
    io::{self, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{EtlError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Write `batch` as CSV with a header row to `path`, creating parent dirs.
///
/// Goes through a temp file in the target directory and a rename, so a failed
/// write never leaves a truncated file at `path`.
#[tracing::instrument(level = "info", skip(batch, path), fields(path = %path.as_ref().display()))]
pub fn write_table<P: AsRef<Path>>(batch: &RecordBatch, path: P) -> Result<()> {
    let path = path.as_ref();
    let sink_err = |source: io::Error| EtlError::SinkWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(sink_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(sink_err)?;
    write_csv(batch, &mut tmp).map_err(|e| sink_err(into_io(e)))?;
    tmp.flush().map_err(sink_err)?;
    tmp.as_file().sync_all().map_err(sink_err)?;
    tmp.persist(path).map_err(|e| sink_err(e.error))?;

    info!(rows = batch.num_rows(), "wrote processed table");
    Ok(())
}

/// Serialize `batch` to any writer: header row, `YYYY-MM-DD` dates, nulls as empty fields.
pub fn write_csv<W: Write>(batch: &RecordBatch, out: W) -> std::result::Result<(), ArrowError> {
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .with_delimiter(b',')
        .with_date_format(DATE_FORMAT.to_string())
        .build(out);
    writer.write(batch)
}

fn into_io(e: ArrowError) -> io::Error {
    match e {
        ArrowError::IoError(_, source) => source,
        other => io::Error::other(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };
    use std::sync::Arc;
    use tempfile::tempdir;

    fn sample() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("Transaction ID", DataType::Utf8, true),
            Field::new("Date", DataType::Date32, false),
            Field::new("Age Band", DataType::Utf8, true),
            Field::new("Quantity", DataType::Int64, false),
            Field::new("Total Amount", DataType::Float64, true),
        ]);
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("1"), Some("2")])),
            // 2024-01-15 and 2024-02-01
            Arc::new(Date32Array::from(vec![19737, 19754])),
            Arc::new(StringArray::from(vec![Some("18-24"), None])),
            Arc::new(Int64Array::from(vec![3, 0])),
            Arc::new(Float64Array::from(vec![Some(37.5), Some(0.0)])),
        ];
        RecordBatch::try_new(Arc::new(schema), columns).unwrap()
    }

    #[test]
    fn csv_layout() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Transaction ID,Date,Age Band,Quantity,Total Amount");
        assert_eq!(lines[1], "1,2024-01-15,18-24,3,37.5");
        assert_eq!(lines[2], "2,2024-02-01,,0,0.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn creates_missing_directories() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("data").join("processed").join("clean.csv");
        write_table(&sample(), &out).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Transaction ID,Date"));
    }

    #[test]
    fn rewrite_replaces_previous_output() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("clean.csv");
        fs::write(&out, "stale").unwrap();
        write_table(&sample(), &out).unwrap();
        assert!(!fs::read_to_string(&out).unwrap().contains("stale"));
        // only the target remains; the temp file was renamed away
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn unwritable_target_is_sink_error_and_leaves_nothing() {
        let tmp = tempdir().unwrap();
        // parent "directory" is a regular file
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let out = blocker.join("clean.csv");

        let err = write_table(&sample(), &out).unwrap_err();
        assert!(matches!(err, EtlError::SinkWrite { .. }));
        assert!(!out.exists());
    }
}
