use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::elements::{parse_tle_text, RawElementRecord};

use super::error::SourceError;
use super::SourceAdapter;

/// Offline source: every `.tle`/`.txt` file in a directory.
pub struct TleDirectory {
    tle_dir: PathBuf,
    name: String,
}

impl TleDirectory {
    pub fn new(tle_dir: PathBuf) -> Self {
        let name = format!("tle-dir:{}", tle_dir.display());
        Self { tle_dir, name }
    }

    /// Load all element sets. Unreadable files and unparseable sets are
    /// logged and skipped.
    pub fn load_all(&self) -> Result<Vec<RawElementRecord>, SourceError> {
        load_dir(&self.tle_dir)
    }
}

fn load_dir(tle_dir: &Path) -> Result<Vec<RawElementRecord>, SourceError> {
    if !tle_dir.is_dir() {
        return Err(SourceError::DirectoryNotFound(tle_dir.display().to_string()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(tle_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_tle_file(path))
        .collect();
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(content) => {
                let (parsed, errors) = parse_tle_text(&content);
                for e in &errors {
                    log::warn!("{}: {}", path.display(), e);
                }
                records.extend(parsed);
            }
            Err(e) => {
                log::warn!("Failed to read TLE file {}: {}", path.display(), e);
            }
        }
    }

    Ok(records)
}

fn is_tle_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "tle" || ext == "txt")
        .unwrap_or(false)
}

#[async_trait]
impl SourceAdapter for TleDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_elements(&self) -> Result<Vec<RawElementRecord>, SourceError> {
        // Directory scans block; keep them off the async workers.
        let tle_dir = self.tle_dir.clone();
        tokio::task::spawn_blocking(move || load_dir(&tle_dir)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ISS_TLE;

    #[test]
    fn test_missing_directory() {
        let adapter = TleDirectory::new(PathBuf::from("/nonexistent/tle/dir"));
        assert!(matches!(
            adapter.load_all(),
            Err(SourceError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_loads_tle_and_txt_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stations.tle"), ISS_TLE).unwrap();
        fs::write(dir.path().join("more.txt"), ISS_TLE.replace("ISS (ZARYA)", "ISS COPY")).unwrap();
        fs::write(dir.path().join("notes.md"), ISS_TLE).unwrap();
        fs::write(dir.path().join("broken.tle"), "not a tle at all").unwrap();

        let records = TleDirectory::new(dir.path().to_path_buf()).load_all().unwrap();
        let mut names: Vec<_> = records
            .iter()
            .filter_map(|r| r.object_name.clone())
            .collect();
        names.sort();
        assert_eq!(names, vec!["ISS (ZARYA)", "ISS COPY"]);
    }

    #[tokio::test]
    async fn test_adapter_fetch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("iss.tle"), ISS_TLE).unwrap();
        let adapter = TleDirectory::new(dir.path().to_path_buf());
        assert_eq!(adapter.fetch_elements().await.unwrap().len(), 1);
        assert_eq!(adapter.fetch_official_predictions(7).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_fetch_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = TleDirectory::new(dir.path().join("gone"));
        assert!(matches!(
            adapter.fetch_elements().await,
            Err(SourceError::DirectoryNotFound(_))
        ));
    }
}
