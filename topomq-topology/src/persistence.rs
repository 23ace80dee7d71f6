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

//! Dehydration, persistence and rehydration of the topology tree.
//!
//! Every entity kind dehydrates into a serde record carrying its id and
//! enough fields to reconstruct it. A [`StatePersister`] stores records of
//! one kind; the [`PersistenceContext`] bundles the four persisters and is
//! passed explicitly to whatever needs them (no process-wide singleton), so
//! tests can build isolated contexts.

pub use self::context::PersistenceContext;
pub use self::file::FileStatePersister;
pub use self::hydrater::Hydrater;
pub use self::memory::MemoryStatePersister;
pub use self::persistent_registry::PersistentTopicRegistry;
pub use self::persister::StatePersister;
pub use self::records::ConnectorRecord;
pub use self::records::DehydratedState;
pub use self::records::GroupRecord;
pub use self::records::PartitionRecord;
pub use self::records::TopicRecord;

mod context;
mod file;
mod hydrater;
mod memory;
mod persistent_registry;
mod persister;
pub(crate) mod records;
