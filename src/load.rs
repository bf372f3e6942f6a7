use arrow::{
    compute::concat_batches,
    csv::ReaderBuilder,
    datatypes::{DataType, Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use std::{
    fs,
    io::{self, Cursor},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

use crate::error::{EtlError, Result};

/// The raw source as loaded: every column is nullable `Utf8`, headers as written in the file.
#[derive(Debug)]
pub struct RawTable {
    pub path: PathBuf,
    pub batch: RecordBatch,
}

impl RawTable {
    pub fn headers(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }
}

/// Read the delimited file at `path` into memory, headers from the first line.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_raw_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(EtlError::SourceNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(EtlError::SourceFormat {
                path: path.to_path_buf(),
                source: ArrowError::IoError(format!("reading {}", path.display()), e),
            })
        }
    };

    let batch = parse_csv_bytes(data).map_err(|source| EtlError::SourceFormat {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "loaded raw table"
    );

    Ok(RawTable {
        path: path.to_path_buf(),
        batch,
    })
}

/// Parse an in-memory CSV buffer into a single all-`Utf8` batch.
pub fn parse_csv_bytes(data: Vec<u8>) -> std::result::Result<RecordBatch, ArrowError> {
    let headers = read_headers(&data)?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ArrowError::CsvError("no header row".into()));
    }

    let fields: Vec<Field> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| Field::new(column_name(idx, name), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_quote(b'"')
        .with_delimiter(b',')
        .with_truncated_rows(true)
        .build(Cursor::new(data))?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    concat_batches(&schema, &batches)
}

/// Blank headers (e.g. from a trailing comma) get a positional `Unnamed: N` name.
fn column_name(idx: usize, raw: &str) -> String {
    if raw.trim().is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        raw.to_string()
    }
}

/// Header names from the first record; the csv reader drops a leading BOM.
fn read_headers(data: &[u8]) -> std::result::Result<Vec<String>, ArrowError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);
    let headers = rdr
        .headers()
        .map_err(|e| ArrowError::CsvError(e.to_string()))?;
    Ok(headers.iter().map(str::to_string).collect())
}
