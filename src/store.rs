//! Flat-file record store for `airq`.
//!
//! Each collection lives in its own JSON file (an array of flat objects) under
//! the configured data directory. Loads are total: a missing, unreadable or
//! corrupt file yields an empty collection and a warning, and such a file is
//! never overwritten by a later save. Saves replace the whole file through a
//! temp-file rename, writing untouched and undecodable elements back verbatim.

use std::{
    collections::HashMap,
    fs, io,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
};

use serde_json::Value;
use thiserror::Error;

use crate::models::Entity;

// ---

/// The five named collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Air,
    Citizens,
    Pollutants,
    Alerts,
    Guidelines,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Air,
        Collection::Citizens,
        Collection::Pollutants,
        Collection::Alerts,
        Collection::Guidelines,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Air => "air",
            Collection::Citizens => "citizens",
            Collection::Pollutants => "pollutants",
            Collection::Alerts => "alerts",
            Collection::Guidelines => "guidelines",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Air => "air_quality.json",
            Collection::Citizens => "citizens.json",
            Collection::Pollutants => "pollutants.json",
            Collection::Alerts => "alerts.json",
            Collection::Guidelines => "guidelines.json",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize collection '{collection}': {source}")]
    Serialize {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("refusing to overwrite {}: it could not be read as a JSON array", path.display())]
    Unreadable { path: PathBuf },
}

/// A loaded collection, remembering the file contents it came from.
///
/// Decoded entities are reachable through `Deref<Target = Vec<T>>`. When the
/// snapshot is saved, an entity left unchanged is written back in its original
/// form and elements that did not decode are written back where they were.
#[derive(Debug)]
pub struct Snapshot<T> {
    items: Vec<T>,
    /// Canonical encoding of a decoded element to its raw form(s) on disk.
    originals: HashMap<String, Vec<Value>>,
    /// Undecodable elements with their index in the file.
    skipped: Vec<(usize, Value)>,
    unreadable: bool,
}

impl<T> Snapshot<T> {
    // ---
    fn empty(unreadable: bool) -> Self {
        Self {
            items: Vec::new(),
            originals: HashMap::new(),
            skipped: Vec::new(),
            unreadable,
        }
    }

    /// `true` when the file existed but was not a readable JSON array.
    pub fn is_unreadable(&self) -> bool {
        self.unreadable
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.items
    }
}

impl<T> DerefMut for Snapshot<T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }
}

fn canonical<T: Entity>(entity: &T) -> Result<Value, StoreError> {
    // ---
    serde_json::to_value(entity).map_err(|source| StoreError::Serialize {
        collection: T::COLLECTION.as_str(),
        source,
    })
}

/// Handle to the data directory.
#[derive(Debug, Clone)]
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    // ---
    /// Open the store, creating the directory and empty collection files as
    /// needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        // ---
        let store = Self {
            data_dir: data_dir.into(),
        };
        store.ensure_data_dir()?;
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    /// Create the data directory and write `[]` for every missing collection.
    pub fn ensure_data_dir(&self) -> Result<(), StoreError> {
        // ---
        fs::create_dir_all(&self.data_dir).map_err(|source| StoreError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        for collection in Collection::ALL {
            let path = self.path(collection);
            if !path.exists() {
                tracing::debug!("Creating empty collection file {}", path.display());
                fs::write(&path, "[]").map_err(|source| StoreError::Io { path, source })?;
            }
        }
        Ok(())
    }

    /// Load every decodable element of `T`'s collection, in file order.
    ///
    /// Never fails: storage problems are logged and treated as an empty
    /// collection, and individual elements that do not decode are left out of
    /// the returned items but kept for the next [`save`](Self::save).
    pub fn load<T: Entity>(&self) -> Snapshot<T> {
        // ---
        let collection = T::COLLECTION;
        let path = self.path(collection);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{} does not exist, treating as empty", path.display());
                return Snapshot::empty(false);
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}, treating as empty", path.display(), e);
                return Snapshot::empty(true);
            }
        };

        let raw_items = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!("{} is not a JSON array, treating as empty", path.display());
                return Snapshot::empty(true);
            }
            Err(e) => {
                tracing::warn!("{} is corrupt ({}), treating as empty", path.display(), e);
                return Snapshot::empty(true);
            }
        };

        let mut snapshot = Snapshot::empty(false);
        for (i, raw) in raw_items.into_iter().enumerate() {
            let decoded = serde_json::from_value::<T>(raw.clone())
                .map_err(|e| e.to_string())
                .and_then(|entity| match canonical(&entity) {
                    Ok(value) => Ok((entity, value.to_string())),
                    Err(e) => Err(e.to_string()),
                });
            match decoded {
                Ok((entity, key)) => {
                    snapshot.originals.entry(key).or_default().push(raw);
                    snapshot.items.push(entity);
                }
                Err(e) => {
                    tracing::warn!(
                        "Element {} of '{}' does not decode, keeping it as-is: {}",
                        i,
                        collection.as_str(),
                        e
                    );
                    snapshot.skipped.push((i, raw));
                }
            }
        }

        tracing::debug!(
            "Loaded {} items from '{}'",
            snapshot.items.len(),
            collection.as_str()
        );
        snapshot
    }

    /// Write a loaded (and possibly modified) collection back to disk.
    ///
    /// Unchanged entities keep their original encoding, so `save(load(x))`
    /// leaves the file's contents unchanged.
    pub fn save<T: Entity>(&self, snapshot: &Snapshot<T>) -> Result<(), StoreError> {
        // ---
        if snapshot.unreadable {
            return Err(StoreError::Unreadable {
                path: self.path(T::COLLECTION),
            });
        }

        let mut used: HashMap<String, usize> = HashMap::new();
        let mut values = Vec::with_capacity(snapshot.items.len() + snapshot.skipped.len());
        for entity in snapshot.items.iter() {
            let value = canonical(entity)?;
            let key = value.to_string();
            let n = used.entry(key.clone()).or_insert(0);
            let original = snapshot.originals.get(&key).and_then(|raws| raws.get(*n));
            *n += 1;
            values.push(original.cloned().unwrap_or(value));
        }

        for (index, raw) in &snapshot.skipped {
            values.insert((*index).min(values.len()), raw.clone());
        }

        self.write_values::<T>(&values)
    }

    /// Replace `T`'s collection with `items`, discarding what is on disk.
    pub fn replace<T: Entity>(&self, items: &[T]) -> Result<(), StoreError> {
        // ---
        let values = items.iter().map(canonical).collect::<Result<Vec<_>, _>>()?;
        self.write_values::<T>(&values)
    }

    fn write_values<T: Entity>(&self, values: &[Value]) -> Result<(), StoreError> {
        // ---
        let collection = T::COLLECTION;
        let path = self.path(collection);

        let json = serde_json::to_string_pretty(values).map_err(|source| {
            StoreError::Serialize {
                collection: collection.as_str(),
                source,
            }
        })?;

        fs::create_dir_all(&self.data_dir).map_err(|source| StoreError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Saved {} items to '{}'", values.len(), collection.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::{AirQualityRecord, Citizen, Guideline, PollutantLevels};
    use serde_json::json;
    use tempfile::tempdir;

    fn record(id: &str, region: &str, date: &str, aqi: i64) -> AirQualityRecord {
        // ---
        AirQualityRecord {
            record_id: id.to_string(),
            region: region.to_string(),
            date: date.to_string(),
            aqi,
            pollutants: PollutantLevels::from([("PM10".to_string(), 44.0)]),
            health_risk: String::new(),
            extra: Default::default(),
        }
    }

    fn read_json(path: &Path) -> Value {
        // ---
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_open_creates_all_collection_files() {
        // ---
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("data")).unwrap();

        for collection in Collection::ALL {
            let text = fs::read_to_string(store.path(collection)).unwrap();
            assert_eq!(text, "[]");
        }
    }

    #[test]
    fn test_replace_then_load_preserves_order() {
        // ---
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        let records = vec![
            record("rec_b", "Delhi", "2025-01-02", 120),
            record("rec_a", "Pune", "2025-01-01", 80),
        ];

        store.replace(&records).unwrap();
        let loaded = store.load::<AirQualityRecord>().into_items();

        assert_eq!(loaded, records);
        assert!(!store.path(Collection::Air).with_extension("json.tmp").exists());
    }

    #[test]
    fn test_resaving_loaded_collection_is_a_no_op() {
        // ---
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        store
            .replace(&[record("rec_1", "Agra", "2025-01-03", 210)])
            .unwrap();
        let before = fs::read_to_string(store.path(Collection::Air)).unwrap();

        let loaded = store.load::<AirQualityRecord>();
        store.save(&loaded).unwrap();

        let after = fs::read_to_string(store.path(Collection::Air)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_resaving_hand_written_file_keeps_its_contents() {
        // ---
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        let original = json!([
            {"citizen_id": "cit_asha", "name": "Asha", "age": "thirty",
             "location": "Pune", "contact": null, "station": "S1"},
            {"citizen_id": "cit_ravi", "name": "Ravi", "age": 41, "location": "Agra"},
            "not a citizen",
            {"citizen_id": "cit_meera", "name": "Meera", "age": "", "location": "Delhi",
             "contact": "m@example.com"}
        ]);
        fs::write(store.path(Collection::Citizens), original.to_string()).unwrap();

        let loaded = store.load::<Citizen>();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].age, "thirty");
        assert_eq!(loaded[0].extra["station"], json!("S1"));
        store.save(&loaded).unwrap();

        assert_eq!(read_json(&store.path(Collection::Citizens)), original);
    }

    #[test]
    fn test_modified_entity_keeps_unknown_fields_and_skipped_elements() {
        // ---
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        fs::write(
            store.path(Collection::Air),
            r#"[17, {"record_id": "rec_1", "region": "Delhi", "AQI": "90", "station": "S1"},
                {"record_id": "rec_2", "region": "Pune", "AQI": 70}]"#,
        )
        .unwrap();

        let mut loaded = store.load::<AirQualityRecord>();
        loaded[0].aqi = 95;
        loaded.retain(|r| r.record_id != "rec_2");
        store.save(&loaded).unwrap();

        let saved = read_json(&store.path(Collection::Air));
        assert_eq!(saved[0], json!(17));
        assert_eq!(saved[1]["AQI"], json!(95));
        assert_eq!(saved[1]["station"], json!("S1"));
        assert_eq!(saved.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_corrupt_file_loads_empty_and_is_not_overwritten() {
        // ---
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        fs::write(store.path(Collection::Guidelines), "{not json").unwrap();

        let mut loaded = store.load::<Guideline>();
        assert!(loaded.is_empty());
        assert!(loaded.is_unreadable());

        loaded.push(Guideline {
            guide_id: "g1".to_string(),
            aqi_range: "0-50".to_string(),
            precautions: "None".to_string(),
            extra: Default::default(),
        });
        assert!(matches!(
            store.save(&loaded),
            Err(StoreError::Unreadable { .. })
        ));
        let text = fs::read_to_string(store.path(Collection::Guidelines)).unwrap();
        assert_eq!(text, "{not json");

        fs::write(store.path(Collection::Guidelines), r#"{"guide_id": "g1"}"#).unwrap();
        let loaded = store.load::<Guideline>();
        assert!(loaded.is_empty());
        assert!(loaded.is_unreadable());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        // ---
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        fs::remove_file(store.path(Collection::Air)).unwrap();

        let loaded = store.load::<AirQualityRecord>();
        assert!(loaded.is_empty());
        assert!(!loaded.is_unreadable());
    }

    #[test]
    fn test_undecodable_elements_are_skipped() {
        // ---
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        fs::write(
            store.path(Collection::Air),
            r#"[{"record_id": "rec_1", "region": "Delhi", "AQI": 90}, 17, "oops"]"#,
        )
        .unwrap();

        let loaded = store.load::<AirQualityRecord>();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].aqi, 90);
    }
}
