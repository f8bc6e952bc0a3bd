//! Dataset registry
//!
//! Maps dataset keys to loaded, immutable [`Dataset`] snapshots. Sources are
//! resolved under a data directory: the default dataset is
//! `{data_dir}/{default_file}.{ext}`, a keyed one is
//! `{data_dir}/{file_prefix}{key}.{ext}`.

use super::loader::{load_file, LoadError, SOURCE_EXTENSIONS};
use super::record::{Dataset, DatasetKey, DatasetSummary};
use crate::config::DataConfig;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Where dataset source files live
#[derive(Debug, Clone)]
pub struct DatasetSource {
    data_dir: PathBuf,
    default_file: String,
    file_prefix: String,
}

impl DatasetSource {
    pub fn new(data_dir: impl Into<PathBuf>, default_file: impl Into<String>, file_prefix: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            default_file: default_file.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(&config.data_dir, &config.default_file, &config.file_prefix)
    }

    /// Locate the source file for a key, probing known extensions in order
    pub fn resolve(&self, key: &DatasetKey) -> Result<PathBuf, LoadError> {
        let stem = match key {
            DatasetKey::Default => self.default_file.clone(),
            DatasetKey::Year(k) => {
                if !is_valid_key(k) {
                    return Err(LoadError::Missing(k.clone()));
                }
                format!("{}{}", self.file_prefix, k)
            }
        };

        let known = SOURCE_EXTENSIONS
            .iter()
            .map(|ext| self.data_dir.join(format!("{}.{}", stem, ext)))
            .find(|path| path.is_file());

        // A source in a format we cannot read is a load failure, not a missing dataset
        known
            .or_else(|| self.any_source_named(&stem))
            .ok_or_else(|| LoadError::Missing(key.to_string()))
    }

    fn any_source_named(&self, stem: &str) -> Option<PathBuf> {
        let entries = std::fs::read_dir(&self.data_dir).ok()?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.file_stem().is_some_and(|s| s == stem))
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }
}

/// Keys end up in file names, so only a conservative alphabet is accepted
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Cache of loaded datasets
pub struct DatasetRegistry {
    source: DatasetSource,
    datasets: RwLock<HashMap<DatasetKey, Arc<Dataset>>>,
}

impl DatasetRegistry {
    pub fn new(source: DatasetSource) -> Self {
        Self {
            source,
            datasets: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached dataset for `key`, loading it on first use.
    ///
    /// Two callers racing on the same cold key may both parse the file; the
    /// first fully built dataset to be published wins and is returned to both.
    pub fn get(&self, key: &DatasetKey) -> Result<Arc<Dataset>, LoadError> {
        if let Some(dataset) = self.cached(key) {
            debug!("Dataset {} served from cache", key);
            return Ok(dataset);
        }

        let loaded = Arc::new(self.load(key)?);
        let mut datasets = self.datasets.write().unwrap_or_else(|e| e.into_inner());
        let published = datasets.entry(key.clone()).or_insert(loaded);
        Ok(Arc::clone(published))
    }

    /// Re-read the source for `key` and swap the cached snapshot.
    ///
    /// Readers holding the previous `Arc` keep it until they drop it.
    pub fn reload(&self, key: &DatasetKey) -> Result<Arc<Dataset>, LoadError> {
        let loaded = Arc::new(self.load(key)?);
        let mut datasets = self.datasets.write().unwrap_or_else(|e| e.into_inner());
        datasets.insert(key.clone(), Arc::clone(&loaded));
        info!("Reloaded dataset {}", key);
        Ok(loaded)
    }

    /// Eagerly load every given key. Missing or broken sources are logged
    /// and skipped; returns the number of datasets now cached.
    pub fn preload<'a>(&self, keys: impl IntoIterator<Item = &'a DatasetKey>) -> usize {
        for key in keys {
            if let Err(e) = self.get(key) {
                warn!("Skipping preload of dataset {}: {}", key, e);
            }
        }
        self.loaded().len()
    }

    /// Summaries of the cached datasets, sorted by key
    pub fn loaded(&self) -> Vec<DatasetSummary> {
        let datasets = self.datasets.read().unwrap_or_else(|e| e.into_inner());
        let mut summaries: Vec<DatasetSummary> = datasets.values().map(|d| d.summary()).collect();
        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        summaries
    }

    fn cached(&self, key: &DatasetKey) -> Option<Arc<Dataset>> {
        let datasets = self.datasets.read().unwrap_or_else(|e| e.into_inner());
        datasets.get(key).cloned()
    }

    fn load(&self, key: &DatasetKey) -> Result<Dataset, LoadError> {
        let path = self.source.resolve(key)?;
        match load_file(key.clone(), &path) {
            Ok(dataset) => {
                info!(
                    "Loaded dataset {} from {} ({} records)",
                    key,
                    path.display(),
                    dataset.len()
                );
                Ok(dataset)
            }
            Err(e) => {
                warn!("Failed to load dataset {} from {}: {}", key, path.display(), e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "Roll No.,Name of the student\n";

    fn registry(dir: &TempDir) -> DatasetRegistry {
        DatasetRegistry::new(DatasetSource::new(dir.path(), "seniors_data_cleaned", "seniors_data_"))
    }

    #[test]
    fn test_default_and_keyed_resolution() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("seniors_data_cleaned.csv"), format!("{HEADER}1,Ravi\n")).unwrap();
        fs::write(
            dir.path().join("seniors_data_2020-2023.json"),
            r#"[{"Roll No.": 2, "Name of the student": "Asha"}, {"Roll No.": 3}]"#,
        )
        .unwrap();

        let registry = registry(&dir);
        assert_eq!(registry.get(&DatasetKey::Default).unwrap().len(), 1);
        assert_eq!(
            registry.get(&DatasetKey::Year("2020-2023".into())).unwrap().len(),
            2
        );
        let keys: Vec<String> = registry.loaded().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["2020-2023", "default"]);
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        assert!(matches!(
            registry.get(&DatasetKey::Year("9999-9999".into())),
            Err(LoadError::Missing(k)) if k == "9999-9999"
        ));
    }

    #[test]
    fn test_path_like_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        assert!(matches!(
            registry.get(&DatasetKey::Year("../etc/passwd".into())),
            Err(LoadError::Missing(_))
        ));
    }

    #[test]
    fn test_empty_dataset_is_distinct_from_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("seniors_data_cleaned.csv"), HEADER).unwrap();
        let dataset = registry(&dir).get(&DatasetKey::Default).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_get_is_cached_until_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seniors_data_cleaned.csv");
        fs::write(&path, format!("{HEADER}1,Ravi\n")).unwrap();

        let registry = registry(&dir);
        let first = registry.get(&DatasetKey::Default).unwrap();

        fs::write(&path, format!("{HEADER}1,Ravi\n2,Asha\n")).unwrap();
        let second = registry.get(&DatasetKey::Default).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);

        let reloaded = registry.reload(&DatasetKey::Default).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(first.len(), 1);
        assert_eq!(registry.get(&DatasetKey::Default).unwrap().len(), 2);
    }

    #[test]
    fn test_spreadsheet_source_is_found() {
        let dir = TempDir::new().unwrap();
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Roll No.").unwrap();
        sheet.write_string(0, 1, "Name of the student").unwrap();
        sheet.write_number(1, 0, 20201101.0).unwrap();
        sheet.write_string(1, 1, "Ravi").unwrap();
        workbook.save(dir.path().join("seniors_data_cleaned.xlsx")).unwrap();

        let dataset = registry(&dir).get(&DatasetKey::Default).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.source, dir.path().join("seniors_data_cleaned.xlsx"));
    }

    #[test]
    fn test_unreadable_format_is_load_error_not_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("seniors_data_2020-2023.parquet"), "PAR1").unwrap();
        assert!(matches!(
            registry(&dir).get(&DatasetKey::Year("2020-2023".into())),
            Err(LoadError::Unsupported(ext)) if ext == "parquet"
        ));
    }

    #[test]
    fn test_concurrent_first_load_publishes_one_dataset() {
        let dir = TempDir::new().unwrap();
        let mut csv = String::from(HEADER);
        for i in 0..5_000 {
            csv.push_str(&format!("{},Student {}\n", i, i));
        }
        fs::write(dir.path().join("seniors_data_cleaned.csv"), csv).unwrap();

        let registry = Arc::new(registry(&dir));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.get(&DatasetKey::Default).unwrap())
            })
            .collect();
        let datasets: Vec<Arc<Dataset>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let first = &datasets[0];
        assert_eq!(first.len(), 5_000);
        assert!(datasets.iter().all(|d| Arc::ptr_eq(d, first)));
        assert!(Arc::ptr_eq(first, &registry.get(&DatasetKey::Default).unwrap()));
    }

    #[test]
    fn test_preload_skips_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("seniors_data_cleaned.csv"), format!("{HEADER}1,Ravi\n")).unwrap();
        let registry = registry(&dir);
        let keys = [DatasetKey::Default, DatasetKey::Year("2021-2024".into())];
        assert_eq!(registry.preload(keys.iter()), 1);
    }

    #[test]
    fn test_broken_source_is_load_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("seniors_data_cleaned.json"), "not json").unwrap();
        assert!(matches!(
            registry(&dir).get(&DatasetKey::Default),
            Err(LoadError::Json(_))
        ));
    }
}
