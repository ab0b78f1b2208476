use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use crate::store::KeyValueStore;

const PREFS_FILE: &str = "prefs.json";

/// Key-value store backed by a single JSON object on disk. Every write
/// rewrites the whole file through a temp file and a rename.
pub struct JsonStore {
    base_dir: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizdr");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        let mut store = Self {
            base_dir,
            values: BTreeMap::new(),
        };
        store.values = store.load();
        Ok(store)
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(PREFS_FILE)
    }

    fn load(&self) -> BTreeMap<String, String> {
        let path = self.file_path();
        if !path.exists() {
            return BTreeMap::new();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable prefs file");
                BTreeMap::new()
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read prefs file");
                BTreeMap::new()
            }
        }
    }

    fn save(&self) -> Result<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(&self.values)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}
