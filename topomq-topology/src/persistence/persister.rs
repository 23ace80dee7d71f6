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
use topomq_error::PersistenceResult;

use crate::persistence::records::DehydratedState;

/// Durable storage for dehydrated state of one entity kind.
///
/// The backing store is a pluggable collaborator: an embedded KV engine, a
/// document database, a JSON file. Registries use this contract to survive
/// process restarts: every known id is iterated and rehydrated before a
/// registry accepts requests.
pub trait StatePersister: Send + Sync {
    type State: DehydratedState;

    /// Saves the state; an existing record with the same id is replaced
    /// (idempotent upsert).
    fn save(&self, state: &Self::State) -> PersistenceResult<()>;

    /// Returns the state for `id`, failing with the kind-specific
    /// `RecordNotExist` on a miss.
    fn get(&self, id: &str) -> PersistenceResult<Self::State>;

    /// Does a record with this id exist?
    fn exists(&self, id: &str) -> bool;

    /// Removes the record for `id`, failing with the kind-specific
    /// `RecordNotExist` if absent.
    fn remove(&self, id: &str) -> PersistenceResult<()>;

    /// All known record ids: finite, lazily consumed, and not restartable;
    /// call again for a fresh pass.
    fn record_ids(&self) -> Box<dyn Iterator<Item = CheetahString> + Send + '_>;
}
