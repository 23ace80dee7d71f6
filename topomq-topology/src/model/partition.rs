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
use dashmap::DashSet;
use parking_lot::Mutex;
use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use topomq_access::AccessControlList;
use topomq_error::TopologyError;
use topomq_error::TopologyResult;
use topomq_management::Cluster;
use topomq_management::ExchangeDescriptor;
use topomq_management::ManagementClient;
use tracing::info;

use crate::filtering::RouteRequirements;
use crate::persistence::records::PartitionRecord;

/// Partition lifecycle: `Nonexistent` until provisioned, `Active` once the
/// exchange exists on the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum PartitionState {
    Nonexistent,
    Active,
}

/// A unit of producer/consumer connectivity: one exchange on one cluster,
/// plus the routing keys used against it.
///
/// Lifecycle operations (`setup`, `cleanup`, `verify`) are serialized
/// per-partition; the state lock is held across the management-plane call.
/// Operations on distinct partitions proceed in parallel.
pub struct Partition {
    group_id: CheetahString,
    partition_id: CheetahString,
    cluster: Arc<Cluster>,
    exchange: ExchangeDescriptor,
    routing_keys: DashSet<CheetahString>,
    protocols: DashSet<CheetahString>,
    access_controls: AccessControlList,
    state: Mutex<PartitionState>,
}

impl Partition {
    pub fn new(
        group_id: impl Into<CheetahString>,
        partition_id: impl Into<CheetahString>,
        cluster: Arc<Cluster>,
        exchange: ExchangeDescriptor,
    ) -> Self {
        Partition {
            group_id: group_id.into(),
            partition_id: partition_id.into(),
            cluster,
            exchange,
            routing_keys: DashSet::new(),
            protocols: DashSet::new(),
            access_controls: AccessControlList::new(),
            state: Mutex::new(PartitionState::Nonexistent),
        }
    }

    pub fn with_routing_keys<I, S>(self, routing_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CheetahString>,
    {
        for key in routing_keys {
            self.routing_keys.insert(key.into());
        }
        self
    }

    /// Declares the wire protocols this partition serves (e.g. "AMQP"). A
    /// partition with no declared protocol accepts any.
    pub fn with_protocols<I, S>(self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CheetahString>,
    {
        for protocol in protocols {
            self.protocols.insert(protocol.into());
        }
        self
    }

    pub fn partition_id(&self) -> &CheetahString {
        &self.partition_id
    }

    pub fn group_id(&self) -> &CheetahString {
        &self.group_id
    }

    pub fn cluster(&self) -> &Arc<Cluster> {
        &self.cluster
    }

    pub fn exchange(&self) -> &ExchangeDescriptor {
        &self.exchange
    }

    pub fn state(&self) -> PartitionState {
        *self.state.lock()
    }

    pub fn access_controls(&self) -> &AccessControlList {
        &self.access_controls
    }

    pub fn routing_keys(&self) -> Vec<CheetahString> {
        let mut keys: Vec<CheetahString> = self.routing_keys.iter().map(|k| k.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn add_routing_key(&self, routing_key: impl Into<CheetahString>) {
        self.routing_keys.insert(routing_key.into());
    }

    pub fn remove_routing_key(&self, routing_key: &str) -> bool {
        self.routing_keys.remove(routing_key).is_some()
    }

    pub fn has_routing_key(&self, routing_key: &str) -> bool {
        self.routing_keys.contains(routing_key)
    }

    /// Swaps the whole key set, used when a connector resynchronizes its
    /// groups.
    pub(crate) fn replace_routing_keys(&self, routing_keys: &[CheetahString]) {
        self.routing_keys.clear();
        for key in routing_keys {
            self.routing_keys.insert(key.clone());
        }
    }

    pub fn protocols(&self) -> Vec<CheetahString> {
        let mut protocols: Vec<CheetahString> = self.protocols.iter().map(|p| p.key().clone()).collect();
        protocols.sort();
        protocols
    }

    pub fn supports_protocol(&self, protocol: &str) -> bool {
        self.protocols.is_empty() || self.protocols.contains(protocol)
    }

    /// Whether this partition serves the client's requirements: protocol
    /// compatibility plus the access-control rule for the direction's
    /// operation.
    pub fn matches(&self, requirements: &RouteRequirements) -> bool {
        self.supports_protocol(requirements.protocol().as_str())
            && self
                .access_controls
                .is_allowed(requirements.direction().operation(), requirements.actor())
    }

    /// Provisions the exchange on the cluster and transitions to `Active`.
    ///
    /// Only legal from `Nonexistent`; calling it while `Active` fails with
    /// `PartitionAlreadyActive` instead of double-provisioning.
    pub fn setup(&self) -> TopologyResult<()> {
        let mut state = self.state.lock();
        if *state == PartitionState::Active {
            return Err(TopologyError::PartitionAlreadyActive {
                partition_id: self.partition_id.clone(),
            });
        }
        let virtual_host = self.cluster.virtual_host().clone();
        let exchange = self.exchange.clone();
        self.cluster
            .execute_management_task(&|client: &dyn ManagementClient| {
                client.declare_exchange(virtual_host.as_str(), &exchange)
            })?;
        *state = PartitionState::Active;
        info!(
            "partition {} activated: exchange {} created on cluster {}",
            self.partition_id,
            self.exchange.name(),
            self.cluster.cluster_id()
        );
        Ok(())
    }

    /// Removes the exchange from the cluster and transitions to
    /// `Nonexistent`. The remote delete is idempotent, so cleaning up an
    /// already-nonexistent partition is harmless.
    pub fn cleanup(&self) -> TopologyResult<()> {
        let mut state = self.state.lock();
        let virtual_host = self.cluster.virtual_host().clone();
        let exchange_name = self.exchange.name().clone();
        self.cluster
            .execute_management_task(&|client: &dyn ManagementClient| {
                client.delete_exchange(virtual_host.as_str(), exchange_name.as_str())
            })?;
        *state = PartitionState::Nonexistent;
        info!(
            "partition {} deactivated: exchange {} removed from cluster {}",
            self.partition_id,
            exchange_name,
            self.cluster.cluster_id()
        );
        Ok(())
    }

    /// Checks that the broker still reports the exchange, without changing
    /// state. Fails with `ExchangeDoesNotExist` if the exchange is absent
    /// while the partition believes itself `Active`.
    pub fn verify(&self) -> TopologyResult<()> {
        let state = self.state.lock();
        let virtual_host = self.cluster.virtual_host().clone();
        let exchange_name = self.exchange.name().clone();
        let has_exchange = self
            .cluster
            .execute_management_task(&|client: &dyn ManagementClient| {
                client.exchange_exists(virtual_host.as_str(), exchange_name.as_str())
            })?;
        if !has_exchange && *state == PartitionState::Active {
            return Err(TopologyError::ExchangeDoesNotExist {
                partition_id: self.partition_id.clone(),
                exchange: exchange_name,
            });
        }
        Ok(())
    }

    pub fn dehydrate(&self) -> PartitionRecord {
        PartitionRecord {
            group_id: self.group_id.clone(),
            partition_id: self.partition_id.clone(),
            cluster_id: self.cluster.cluster_id(),
            exchange: self.exchange.clone(),
            routing_keys: self.routing_keys(),
            protocols: self.protocols(),
            active: self.state() == PartitionState::Active,
        }
    }

    /// Rebuilds a partition from its dehydrated record against a resolved
    /// cluster. The recorded state is restored without touching the broker;
    /// divergence is detected by `verify`, not at load time.
    pub fn restore(record: PartitionRecord, cluster: Arc<Cluster>) -> Self {
        let state = if record.active {
            PartitionState::Active
        } else {
            PartitionState::Nonexistent
        };
        let partition = Partition::new(record.group_id, record.partition_id, cluster, record.exchange)
            .with_routing_keys(record.routing_keys)
            .with_protocols(record.protocols);
        *partition.state.lock() = state;
        partition
    }
}

impl std::fmt::Debug for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partition")
            .field("partition_id", &self.partition_id)
            .field("group_id", &self.group_id)
            .field("cluster", &self.cluster.cluster_id())
            .field("exchange", &self.exchange.name())
            .field("state", &self.state())
            .finish()
    }
}
