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

//! Errors raised by the topology domain model and the route resolution engine.

use cheetah_string::CheetahString;
use thiserror::Error;

use crate::management_error::ManagementError;
use crate::persistence_error::PersistenceError;

pub type TopologyResult<T> = std::result::Result<T, TopologyError>;

/// Typed failures of the topology tree.
///
/// Not-found and already-exists variants always carry the offending id(s) so
/// callers can fail fast with actionable context. Invariant violations
/// (`ExchangeDoesNotExist`, `GroupHasNoPartitions`, `PartitionOnForeignCluster`)
/// are configuration errors requiring operator intervention and are never
/// retried automatically.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("topic '{topic_id}' does not exist")]
    TopicNotExist { topic_id: CheetahString },

    #[error("topic '{topic_id}' is already registered")]
    TopicAlreadyExists { topic_id: CheetahString },

    #[error("topic '{topic_id}' has no group '{group_id}'")]
    GroupNotExist {
        topic_id: CheetahString,
        group_id: CheetahString,
    },

    #[error("topic '{topic_id}' already has a group '{group_id}'")]
    GroupAlreadyExists {
        topic_id: CheetahString,
        group_id: CheetahString,
    },

    #[error("group '{group_id}' has no partition '{partition_id}'")]
    PartitionNotExist {
        group_id: CheetahString,
        partition_id: CheetahString,
    },

    #[error("group '{group_id}' already has a partition '{partition_id}'")]
    PartitionAlreadyExists {
        group_id: CheetahString,
        partition_id: CheetahString,
    },

    #[error("topic '{topic_id}' has no connector '{connector_id}'")]
    ConnectorNotExist {
        topic_id: CheetahString,
        connector_id: CheetahString,
    },

    #[error("topic '{topic_id}' already has a connector '{connector_id}'")]
    ConnectorAlreadyExists {
        topic_id: CheetahString,
        connector_id: CheetahString,
    },

    #[error("partition '{partition_id}' is already active; cleanup before provisioning again")]
    PartitionAlreadyActive { partition_id: CheetahString },

    #[error("partition '{partition_id}' believes exchange '{exchange}' exists, but the cluster no longer reports it")]
    ExchangeDoesNotExist {
        partition_id: CheetahString,
        exchange: CheetahString,
    },

    #[error("connector '{connector_id}' references group '{group_id}' which has no partitions")]
    GroupHasNoPartitions {
        connector_id: CheetahString,
        group_id: CheetahString,
    },

    #[error(
        "connector '{connector_id}' can only bridge groups on cluster '{connector_cluster}'; partition \
         '{partition_id}' exists on cluster '{partition_cluster}'"
    )]
    PartitionOnForeignCluster {
        connector_id: CheetahString,
        partition_id: CheetahString,
        partition_cluster: CheetahString,
        connector_cluster: CheetahString,
    },

    #[error("management plane failure: {0}")]
    Management(#[from] ManagementError),

    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}
