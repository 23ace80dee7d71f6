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

use std::path::Path;
use std::sync::Arc;

use topomq_error::PersistenceResult;

use crate::persistence::file::FileStatePersister;
use crate::persistence::memory::MemoryStatePersister;
use crate::persistence::persister::StatePersister;
use crate::persistence::records::ConnectorRecord;
use crate::persistence::records::GroupRecord;
use crate::persistence::records::PartitionRecord;
use crate::persistence::records::TopicRecord;

/// The four per-kind persisters, bundled for explicit hand-off.
///
/// Constructed once at startup and passed to the registry machinery; tests
/// build isolated in-memory contexts.
#[derive(Clone)]
pub struct PersistenceContext {
    topics: Arc<dyn StatePersister<State = TopicRecord>>,
    groups: Arc<dyn StatePersister<State = GroupRecord>>,
    partitions: Arc<dyn StatePersister<State = PartitionRecord>>,
    connectors: Arc<dyn StatePersister<State = ConnectorRecord>>,
}

impl PersistenceContext {
    pub fn new(
        topics: Arc<dyn StatePersister<State = TopicRecord>>,
        groups: Arc<dyn StatePersister<State = GroupRecord>>,
        partitions: Arc<dyn StatePersister<State = PartitionRecord>>,
        connectors: Arc<dyn StatePersister<State = ConnectorRecord>>,
    ) -> Self {
        PersistenceContext {
            topics,
            groups,
            partitions,
            connectors,
        }
    }

    /// A context backed by in-memory persisters.
    pub fn in_memory() -> Self {
        PersistenceContext::new(
            Arc::new(MemoryStatePersister::new()),
            Arc::new(MemoryStatePersister::new()),
            Arc::new(MemoryStatePersister::new()),
            Arc::new(MemoryStatePersister::new()),
        )
    }

    /// A context backed by one JSON document per entity kind inside
    /// `storage_dir`.
    pub fn file_backed(storage_dir: impl AsRef<Path>) -> PersistenceResult<Self> {
        let dir = storage_dir.as_ref();
        Ok(PersistenceContext::new(
            Arc::new(FileStatePersister::open(dir.join("topics.json"))?),
            Arc::new(FileStatePersister::open(dir.join("groups.json"))?),
            Arc::new(FileStatePersister::open(dir.join("partitions.json"))?),
            Arc::new(FileStatePersister::open(dir.join("connectors.json"))?),
        ))
    }

    pub fn topics(&self) -> &dyn StatePersister<State = TopicRecord> {
        self.topics.as_ref()
    }

    pub fn groups(&self) -> &dyn StatePersister<State = GroupRecord> {
        self.groups.as_ref()
    }

    pub fn partitions(&self) -> &dyn StatePersister<State = PartitionRecord> {
        self.partitions.as_ref()
    }

    pub fn connectors(&self) -> &dyn StatePersister<State = ConnectorRecord> {
        self.connectors.as_ref()
    }
}

impl std::fmt::Debug for PersistenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceContext").finish_non_exhaustive()
    }
}
