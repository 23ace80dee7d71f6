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

use std::sync::Arc;

use cheetah_string::CheetahString;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use strum::EnumString;
use topomq_error::TopologyError;
use topomq_error::TopologyResult;
use tracing::info;
use tracing::warn;

use crate::filtering::RouteRequirements;
use crate::model::partition::Partition;
use crate::model::partition::PartitionState;
use crate::persistence::records::GroupRecord;

/// The role a group serves for its topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum GroupRole {
    Producer,
    Consumer,
}

/// A named collection of partitions serving one role (producer or consumer)
/// for a topic.
///
/// A group never contains two partitions with the same id.
pub struct TopologyGroup {
    topic_id: CheetahString,
    group_id: CheetahString,
    description: RwLock<CheetahString>,
    role: GroupRole,
    partitions: DashMap<CheetahString, Arc<Partition>>,
}

impl TopologyGroup {
    pub fn new(topic_id: impl Into<CheetahString>, group_id: impl Into<CheetahString>, role: GroupRole) -> Self {
        TopologyGroup {
            topic_id: topic_id.into(),
            group_id: group_id.into(),
            description: RwLock::new(CheetahString::empty()),
            role,
            partitions: DashMap::new(),
        }
    }

    /// A group with a generated unique id.
    pub fn with_generated_id(topic_id: impl Into<CheetahString>, role: GroupRole) -> Self {
        let group_id = uuid::Uuid::new_v4().to_string();
        TopologyGroup::new(topic_id, group_id, role)
    }

    pub fn topic_id(&self) -> &CheetahString {
        &self.topic_id
    }

    pub fn group_id(&self) -> &CheetahString {
        &self.group_id
    }

    pub fn role(&self) -> GroupRole {
        self.role
    }

    pub fn description(&self) -> CheetahString {
        self.description.read().clone()
    }

    pub fn set_description(&self, description: impl Into<CheetahString>) {
        *self.description.write() = description.into();
    }

    /// Adds a partition and provisions it. If provisioning fails the
    /// partition is not kept.
    pub fn add_partition(&self, partition: Arc<Partition>) -> TopologyResult<()> {
        let partition_id = partition.partition_id().clone();
        match self.partitions.entry(partition_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(TopologyError::PartitionAlreadyExists {
                    group_id: self.group_id.clone(),
                    partition_id,
                });
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&partition));
            }
        }
        if let Err(e) = partition.setup() {
            self.partitions.remove(&partition_id);
            return Err(e);
        }
        info!("partition {} added to group {}", partition_id, self.group_id);
        Ok(())
    }

    /// Removes a partition and cleans it up.
    pub fn remove_partition(&self, partition_id: &str) -> TopologyResult<()> {
        let (_, partition) = self
            .partitions
            .remove(partition_id)
            .ok_or_else(|| TopologyError::PartitionNotExist {
                group_id: self.group_id.clone(),
                partition_id: CheetahString::from(partition_id),
            })?;
        partition.cleanup()?;
        info!("partition {} removed from group {}", partition_id, self.group_id);
        Ok(())
    }

    pub fn get_partition(&self, partition_id: &str) -> TopologyResult<Arc<Partition>> {
        self.partitions
            .get(partition_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TopologyError::PartitionNotExist {
                group_id: self.group_id.clone(),
                partition_id: CheetahString::from(partition_id),
            })
    }

    pub fn contains_partition(&self, partition_id: &str) -> bool {
        self.partitions.contains_key(partition_id)
    }

    /// The group's partitions, ordered by id.
    pub fn partitions(&self) -> Vec<Arc<Partition>> {
        let mut partitions: Vec<Arc<Partition>> =
            self.partitions.iter().map(|entry| Arc::clone(entry.value())).collect();
        partitions.sort_by(|a, b| a.partition_id().cmp(b.partition_id()));
        partitions
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// The partitions serving the client's requirements, ordered by id.
    pub fn filter(&self, requirements: &RouteRequirements) -> Vec<Arc<Partition>> {
        self.partitions()
            .into_iter()
            .filter(|partition| partition.matches(requirements))
            .collect()
    }

    /// Provisions every partition that is not yet active.
    pub fn setup(&self) -> TopologyResult<()> {
        for partition in self.partitions() {
            if partition.state() == PartitionState::Nonexistent {
                partition.setup()?;
            }
        }
        Ok(())
    }

    /// Cleans up every partition and empties the group. All partitions are
    /// attempted; the first failure is reported after the sweep.
    pub fn cleanup(&self) -> TopologyResult<()> {
        let mut first_error = None;
        for partition in self.partitions() {
            if let Err(e) = partition.cleanup() {
                warn!("cleanup of partition {} failed: {}", partition.partition_id(), e);
                first_error.get_or_insert(e);
            }
        }
        self.partitions.clear();
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Reattaches a rehydrated partition without provisioning it.
    pub(crate) fn restore_partition(&self, partition: Arc<Partition>) {
        self.partitions.insert(partition.partition_id().clone(), partition);
    }

    pub fn dehydrate(&self) -> GroupRecord {
        GroupRecord {
            topic_id: self.topic_id.clone(),
            group_id: self.group_id.clone(),
            description: self.description(),
            role: self.role,
            partition_ids: self.partitions().iter().map(|p| p.partition_id().clone()).collect(),
        }
    }

    /// Rebuilds an empty group from its record; partitions are reattached
    /// separately by the hydrater.
    pub fn restore(record: GroupRecord) -> Self {
        let group = TopologyGroup::new(record.topic_id, record.group_id, record.role);
        group.set_description(record.description);
        group
    }
}

impl std::fmt::Debug for TopologyGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopologyGroup")
            .field("topic_id", &self.topic_id)
            .field("group_id", &self.group_id)
            .field("role", &self.role)
            .field("partitions", &self.partition_count())
            .finish()
    }
}
