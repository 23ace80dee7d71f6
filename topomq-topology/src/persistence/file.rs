// Copyright 2024 The TopoMQ Rust Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use cheetah_string::CheetahString;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use topomq_error::PersistenceError;
use topomq_error::PersistenceResult;
use tracing::info;

use crate::persistence::persister::StatePersister;
use crate::persistence::records::DehydratedState;

/// File-backed [`StatePersister`]: one JSON document per entity kind,
/// holding an id -> record map.
///
/// The whole document is rewritten on every save/remove; the previous
/// content survives as a `.bak` alongside. Suited to control-plane volumes
/// (topology mutations are rare compared to resolutions).
pub struct FileStatePersister<S> {
    path: PathBuf,
    records: DashMap<CheetahString, S>,
}

impl<S> FileStatePersister<S>
where
    S: DehydratedState + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    /// Opens the persister, loading any records previously written to
    /// `path`. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let path = path.into();
        let persister = FileStatePersister {
            path,
            records: DashMap::new(),
        };
        persister.load()?;
        Ok(persister)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    fn load(&self) -> PersistenceResult<()> {
        let path = self.path_str();
        let content = match topomq_common::FileUtils::file_to_string(&path) {
            Ok(content) => content,
            Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if content.is_empty() {
            return Ok(());
        }
        let decoded: HashMap<CheetahString, S> = serde_json::from_str(&content)?;
        let count = decoded.len();
        for (id, record) in decoded {
            self.records.insert(id, record);
        }
        info!("loaded {} {} record(s) from {}", count, S::KIND, path);
        Ok(())
    }

    fn persist(&self) -> PersistenceResult<()> {
        let snapshot: HashMap<CheetahString, S> = self
            .records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let content = serde_json::to_string_pretty(&snapshot)?;
        topomq_common::FileUtils::string_to_file(&content, &self.path_str())?;
        Ok(())
    }

    fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl<S> StatePersister for FileStatePersister<S>
where
    S: DehydratedState + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    type State = S;

    fn save(&self, state: &S) -> PersistenceResult<()> {
        self.records.insert(state.record_id().clone(), state.clone());
        self.persist()
    }

    fn get(&self, id: &str) -> PersistenceResult<S> {
        self.records
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PersistenceError::record_not_exist(S::KIND, id))
    }

    fn exists(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    fn remove(&self, id: &str) -> PersistenceResult<()> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::record_not_exist(S::KIND, id))?;
        self.persist()
    }

    fn record_ids(&self) -> Box<dyn Iterator<Item = CheetahString> + Send + '_> {
        let mut ids: Vec<CheetahString> = self.records.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        Box::new(ids.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use topomq_error::EntityKind;

    use super::*;
    use crate::persistence::records::TopicRecord;

    fn record(id: &str) -> TopicRecord {
        TopicRecord {
            topic_id: id.into(),
            description: "".into(),
            producer_group_ids: vec![],
            consumer_group_ids: vec![],
            connector_ids: vec![],
        }
    }

    #[test]
    fn records_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topics.json");

        {
            let persister = FileStatePersister::open(&path).unwrap();
            persister.save(&record("orders")).unwrap();
            persister.save(&record("invoices")).unwrap();
        }

        let reopened: FileStatePersister<TopicRecord> = FileStatePersister::open(&path).unwrap();
        assert_eq!(reopened.record_count(), 2);
        assert_eq!(reopened.get("orders").unwrap(), record("orders"));
    }

    #[test]
    fn remove_is_durable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topics.json");

        {
            let persister = FileStatePersister::open(&path).unwrap();
            persister.save(&record("orders")).unwrap();
            persister.remove("orders").unwrap();
        }

        let reopened: FileStatePersister<TopicRecord> = FileStatePersister::open(&path).unwrap();
        assert!(!reopened.exists("orders"));
        let err = reopened.get("orders").unwrap_err();
        assert!(matches!(err, PersistenceError::RecordNotExist { kind: EntityKind::Topic, .. }));
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let persister: FileStatePersister<TopicRecord> =
            FileStatePersister::open(dir.path().join("never-written.json")).unwrap();
        assert_eq!(persister.record_count(), 0);
        assert_eq!(persister.record_ids().count(), 0);
    }
}
