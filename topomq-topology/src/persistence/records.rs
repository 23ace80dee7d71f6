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

//! Dehydrated state records, one per persisted entity kind.

use cheetah_string::CheetahString;
use serde::Deserialize;
use serde::Serialize;
use topomq_error::EntityKind;
use topomq_management::ExchangeDescriptor;

use crate::model::GroupRole;

/// A serializable snapshot of an entity, keyed by the entity's id.
pub trait DehydratedState {
    const KIND: EntityKind;

    fn record_id(&self) -> &CheetahString;
}

/// The persisted shape of a topic: its id and the ids of everything it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRecord {
    pub topic_id: CheetahString,
    pub description: CheetahString,
    pub producer_group_ids: Vec<CheetahString>,
    pub consumer_group_ids: Vec<CheetahString>,
    pub connector_ids: Vec<CheetahString>,
}

impl DehydratedState for TopicRecord {
    const KIND: EntityKind = EntityKind::Topic;

    fn record_id(&self) -> &CheetahString {
        &self.topic_id
    }
}

/// The persisted shape of a topology group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub topic_id: CheetahString,
    pub group_id: CheetahString,
    pub description: CheetahString,
    pub role: GroupRole,
    pub partition_ids: Vec<CheetahString>,
}

impl DehydratedState for GroupRecord {
    const KIND: EntityKind = EntityKind::Group;

    fn record_id(&self) -> &CheetahString {
        &self.group_id
    }
}

/// The persisted shape of a partition. The cluster is referenced by id and
/// resolved through the cluster registry at rehydration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionRecord {
    pub group_id: CheetahString,
    pub partition_id: CheetahString,
    pub cluster_id: CheetahString,
    pub exchange: ExchangeDescriptor,
    pub routing_keys: Vec<CheetahString>,
    pub protocols: Vec<CheetahString>,
    pub active: bool,
}

impl DehydratedState for PartitionRecord {
    const KIND: EntityKind = EntityKind::Partition;

    fn record_id(&self) -> &CheetahString {
        &self.partition_id
    }
}

/// The persisted shape of a connector: group and cluster references by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorRecord {
    pub topic_id: CheetahString,
    pub connector_id: CheetahString,
    pub description: CheetahString,
    pub producer_group_id: CheetahString,
    pub consumer_group_id: CheetahString,
    pub cluster_id: CheetahString,
    pub routing_keys: Vec<CheetahString>,
}

impl DehydratedState for ConnectorRecord {
    const KIND: EntityKind = EntityKind::Connector;

    fn record_id(&self) -> &CheetahString {
        &self.connector_id
    }
}
