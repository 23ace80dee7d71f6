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

use cheetah_string::CheetahString;
use dashmap::DashMap;
use topomq_error::PersistenceError;
use topomq_error::PersistenceResult;

use crate::persistence::persister::StatePersister;
use crate::persistence::records::DehydratedState;

/// In-memory [`StatePersister`], the default for tests and ephemeral
/// deployments.
pub struct MemoryStatePersister<S> {
    records: DashMap<CheetahString, S>,
}

impl<S> MemoryStatePersister<S> {
    pub fn new() -> Self {
        MemoryStatePersister { records: DashMap::new() }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl<S> Default for MemoryStatePersister<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StatePersister for MemoryStatePersister<S>
where
    S: DehydratedState + Clone + Send + Sync,
{
    type State = S;

    fn save(&self, state: &S) -> PersistenceResult<()> {
        self.records.insert(state.record_id().clone(), state.clone());
        Ok(())
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
            .ok_or_else(|| PersistenceError::record_not_exist(S::KIND, id))
    }

    fn record_ids(&self) -> Box<dyn Iterator<Item = CheetahString> + Send + '_> {
        let mut ids: Vec<CheetahString> = self.records.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        Box::new(ids.into_iter())
    }
}
