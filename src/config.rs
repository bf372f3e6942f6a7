use std::path::{Path, PathBuf};

pub const RAW_FILE: &str = "data/raw/retail_sales_dataset.csv";
pub const PROCESSED_FILE: &str = "data/processed/retail_sales_clean.csv";

/// Where a run reads from and writes to. Relative paths resolve against `base_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub base_dir: PathBuf,
    pub raw_file: PathBuf,
    pub processed_file: PathBuf,
}

impl PipelineConfig {
    /// Default `data/raw` → `data/processed` layout under `base_dir`.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            raw_file: PathBuf::from(RAW_FILE),
            processed_file: PathBuf::from(PROCESSED_FILE),
        }
    }

    pub fn with_paths<R: AsRef<Path>, O: AsRef<Path>>(mut self, raw: R, processed: O) -> Self {
        self.raw_file = raw.as_ref().to_path_buf();
        self.processed_file = processed.as_ref().to_path_buf();
        self
    }

    pub fn raw_path(&self) -> PathBuf {
        self.base_dir.join(&self.raw_file)
    }

    pub fn processed_path(&self) -> PathBuf {
        self.base_dir.join(&self.processed_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_resolves_under_base_dir() {
        let cfg = PipelineConfig::new("/srv/sales");
        assert_eq!(
            cfg.raw_path(),
            PathBuf::from("/srv/sales/data/raw/retail_sales_dataset.csv")
        );
        assert_eq!(
            cfg.processed_path(),
            PathBuf::from("/srv/sales/data/processed/retail_sales_clean.csv")
        );
    }

    #[test]
    fn absolute_overrides_ignore_base_dir() {
        let cfg =
            PipelineConfig::new("/srv/sales").with_paths("/tmp/in.csv", "/tmp/out/clean.csv");
        assert_eq!(cfg.raw_path(), PathBuf::from("/tmp/in.csv"));
        assert_eq!(cfg.processed_path(), PathBuf::from("/tmp/out/clean.csv"));
    }
}
