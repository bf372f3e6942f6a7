use std::path::PathBuf;
use tracing::info;

use crate::{
    config::PipelineConfig,
    error::Result,
    load::load_raw_table,
    process::{transform, TransformStats},
    schema::validate_columns,
    write::write_table,
};

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows_read: usize,
    pub rows_written: usize,
    pub stats: TransformStats,
    pub output: PathBuf,
}

/// Load → validate → transform → write. Nothing is written unless every earlier stage succeeds.
#[tracing::instrument(level = "info", skip_all, fields(base = %cfg.base_dir.display()))]
pub fn run(cfg: &PipelineConfig) -> Result<RunSummary> {
    let raw_path = cfg.raw_path();
    let out_path = cfg.processed_path();
    info!(input = %raw_path.display(), "reading raw data");

    let raw = load_raw_table(&raw_path)?;
    validate_columns(&raw.headers())?;
    let rows_read = raw.num_rows();

    let transformed = transform(raw.batch)?;
    write_table(&transformed.batch, &out_path)?;

    info!(
        output = %out_path.display(),
        rows = transformed.batch.num_rows(),
        "processed dataset saved"
    );
    Ok(RunSummary {
        rows_read,
        rows_written: transformed.batch.num_rows(),
        stats: transformed.stats,
        output: out_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use crate::schema::CANONICAL_COLUMNS;
    use std::fs;
    use tempfile::tempdir;

    const RAW: &str = "\
Transaction ID, Date ,Customer ID,Gender,Age,Product Category,Quantity,Price per Unit,Total Amount
5,01/02/2024,CUST005,Male,30,Beauty,2,50,999
9,15/01/2024,CUST009,Female,17,Clothing, 3 ,\"12,5\",1
3,not-a-date,CUST003,Male,45,Electronics,1,300,300
4,15/01/2024,CUST004,Female,65,Beauty,abc,25,75
";

    fn setup(raw: &str) -> (tempfile::TempDir, PipelineConfig) {
        let tmp = tempdir().unwrap();
        let cfg = PipelineConfig::new(tmp.path());
        let raw_path = cfg.raw_path();
        fs::create_dir_all(raw_path.parent().unwrap()).unwrap();
        fs::write(&raw_path, raw).unwrap();
        (tmp, cfg)
    }

    #[test]
    fn end_to_end_default_layout() {
        let (_tmp, cfg) = setup(RAW);
        let summary = run(&cfg).unwrap();
        assert_eq!(summary.rows_read, 4);
        assert_eq!(summary.rows_written, 3);
        assert_eq!(summary.stats.dropped_invalid_date, 1);
        assert_eq!(summary.output, cfg.processed_path());

        let text = fs::read_to_string(cfg.processed_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CANONICAL_COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "4,2024-01-15,2024,1,January,CUST004,Female,65.0,65+,Beauty,0,25.0,0.0"
        );
        assert_eq!(
            lines[2],
            "9,2024-01-15,2024,1,January,CUST009,Female,17.0,<18,Clothing,3,12.5,37.5"
        );
        assert_eq!(
            lines[3],
            "5,2024-02-01,2024,2,February,CUST005,Male,30.0,25-34,Beauty,2,50.0,100.0"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn runs_are_byte_identical() {
        let (_tmp, cfg) = setup(RAW);
        run(&cfg).unwrap();
        let first = fs::read(cfg.processed_path()).unwrap();
        run(&cfg).unwrap();
        let second = fs::read(cfg.processed_path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn schema_failure_writes_nothing() {
        let (_tmp, cfg) = setup("Transaction ID,Date,Quantity\n1,01/01/2024,2\n");
        match run(&cfg) {
            Err(EtlError::Schema { missing }) => {
                assert!(missing.contains(&"Price per Unit".to_string()));
                assert!(missing.contains(&"Total Amount".to_string()));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
        assert!(!cfg.processed_path().exists());
        assert!(!cfg.processed_path().parent().unwrap().exists());
    }

    #[test]
    fn missing_source_writes_nothing() {
        let tmp = tempdir().unwrap();
        let cfg = PipelineConfig::new(tmp.path());
        assert!(matches!(run(&cfg), Err(EtlError::SourceNotFound { .. })));
        assert!(!cfg.processed_path().exists());
    }

    #[test]
    fn trailing_header_comma_becomes_named_passthrough() {
        let raw = "Transaction ID,Date,Customer ID,Gender,Age,Product Category,Quantity,Price per Unit,Total Amount,\n\
                   1,01/01/2024,CUST001,Male,30,Beauty,1,10,10,\n";
        let (_tmp, cfg) = setup(raw);
        run(&cfg).unwrap();

        let text = fs::read_to_string(cfg.processed_path()).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, format!("{},Unnamed: 9", CANONICAL_COLUMNS.join(",")));
    }

    #[test]
    fn explicit_paths_override_layout() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("in.csv"), RAW).unwrap();
        let cfg = PipelineConfig::new(tmp.path()).with_paths("in.csv", "out/clean.csv");
        let summary = run(&cfg).unwrap();
        assert_eq!(summary.output, tmp.path().join("out/clean.csv"));
        assert!(summary.output.exists());
    }
}
