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
use parking_lot::RwLock;
use topomq_error::TopologyError;
use topomq_error::TopologyResult;
use topomq_management::Cluster;
use tracing::info;

use crate::model::group::TopologyGroup;
use crate::persistence::records::ConnectorRecord;

/// A named bridge moving messages from a producer group to a consumer
/// group through a target cluster, with explicit routing keys.
///
/// The connector does not own its groups (the topic does); it keeps the
/// routing keys of both sides synchronized and validates that every bridged
/// partition sits on the connector's target cluster.
pub struct Connector {
    topic_id: CheetahString,
    connector_id: CheetahString,
    description: RwLock<CheetahString>,
    producer_group: Arc<TopologyGroup>,
    consumer_group: Arc<TopologyGroup>,
    cluster: Arc<Cluster>,
    routing_keys: DashSet<CheetahString>,
}

impl Connector {
    pub fn new(
        topic_id: impl Into<CheetahString>,
        connector_id: impl Into<CheetahString>,
        producer_group: Arc<TopologyGroup>,
        consumer_group: Arc<TopologyGroup>,
        cluster: Arc<Cluster>,
    ) -> Self {
        Connector {
            topic_id: topic_id.into(),
            connector_id: connector_id.into(),
            description: RwLock::new(CheetahString::empty()),
            producer_group,
            consumer_group,
            cluster,
            routing_keys: DashSet::new(),
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

    pub fn topic_id(&self) -> &CheetahString {
        &self.topic_id
    }

    pub fn connector_id(&self) -> &CheetahString {
        &self.connector_id
    }

    pub fn description(&self) -> CheetahString {
        self.description.read().clone()
    }

    pub fn set_description(&self, description: impl Into<CheetahString>) {
        *self.description.write() = description.into();
    }

    pub fn producer_group(&self) -> &Arc<TopologyGroup> {
        &self.producer_group
    }

    pub fn consumer_group(&self) -> &Arc<TopologyGroup> {
        &self.consumer_group
    }

    pub fn cluster(&self) -> &Arc<Cluster> {
        &self.cluster
    }

    pub fn routing_keys(&self) -> Vec<CheetahString> {
        let mut keys: Vec<CheetahString> = self.routing_keys.iter().map(|k| k.clone()).collect();
        keys.sort();
        keys
    }

    /// Validates both bridged groups: each must have partitions, every
    /// partition must sit on the connector's target cluster, and a partition
    /// whose key set has drifted away from the connector's keys is
    /// resynchronized to them.
    pub fn verify(&self) -> TopologyResult<()> {
        self.validate_group(&self.producer_group)?;
        self.validate_group(&self.consumer_group)?;
        Ok(())
    }

    /// Adds a routing alias between the producing and consuming groups and
    /// re-verifies the bridge.
    pub fn add_alias(&self, routing_alias: impl Into<CheetahString>) -> TopologyResult<()> {
        self.routing_keys.insert(routing_alias.into());
        self.verify()
    }

    /// Removes a routing alias and re-verifies the bridge.
    pub fn remove_alias(&self, routing_alias: &str) -> TopologyResult<()> {
        self.routing_keys.remove(routing_alias);
        self.verify()
    }

    pub fn setup(&self) -> TopologyResult<()> {
        self.verify()
    }

    /// The bridged groups own their partitions; tearing down the connector
    /// removes nothing remotely.
    pub fn cleanup(&self) -> TopologyResult<()> {
        info!("connector {} of topic {} removed", self.connector_id, self.topic_id);
        Ok(())
    }

    fn validate_group(&self, group: &TopologyGroup) -> TopologyResult<()> {
        let partitions = group.partitions();
        if partitions.is_empty() {
            return Err(TopologyError::GroupHasNoPartitions {
                connector_id: self.connector_id.clone(),
                group_id: group.group_id().clone(),
            });
        }
        let connector_cluster = self.cluster.cluster_id();
        let keys = self.routing_keys();
        for partition in partitions {
            let partition_cluster = partition.cluster().cluster_id();
            if partition_cluster != connector_cluster {
                return Err(TopologyError::PartitionOnForeignCluster {
                    connector_id: self.connector_id.clone(),
                    partition_id: partition.partition_id().clone(),
                    partition_cluster,
                    connector_cluster,
                });
            }
            let drifted = !keys.iter().any(|key| partition.has_routing_key(key.as_str()));
            if drifted {
                partition.replace_routing_keys(&keys);
            }
        }
        Ok(())
    }

    pub fn dehydrate(&self) -> ConnectorRecord {
        ConnectorRecord {
            topic_id: self.topic_id.clone(),
            connector_id: self.connector_id.clone(),
            description: self.description(),
            producer_group_id: self.producer_group.group_id().clone(),
            consumer_group_id: self.consumer_group.group_id().clone(),
            cluster_id: self.cluster.cluster_id(),
            routing_keys: self.routing_keys(),
        }
    }

    /// Rebuilds a connector from its record against resolved groups and
    /// cluster.
    pub fn restore(
        record: ConnectorRecord,
        producer_group: Arc<TopologyGroup>,
        consumer_group: Arc<TopologyGroup>,
        cluster: Arc<Cluster>,
    ) -> Self {
        let connector = Connector::new(
            record.topic_id,
            record.connector_id,
            producer_group,
            consumer_group,
            cluster,
        )
        .with_routing_keys(record.routing_keys);
        connector.set_description(record.description);
        connector
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("topic_id", &self.topic_id)
            .field("connector_id", &self.connector_id)
            .field("producer_group", self.producer_group.group_id())
            .field("consumer_group", self.consumer_group.group_id())
            .field("cluster", &self.cluster.cluster_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use topomq_management::ExchangeDescriptor;
    use topomq_management::ExchangeKind;
    use topomq_management::ManagementEndpoint;
    use topomq_management::MemoryManagementClient;

    use super::*;
    use crate::model::group::GroupRole;
    use crate::model::partition::Partition;

    fn cluster(name: &str) -> Arc<Cluster> {
        let cluster = Cluster::new(name);
        cluster
            .add_management_endpoint(ManagementEndpoint::new(
                format!("{name}-mgmt"),
                15672,
                Arc::new(MemoryManagementClient::new()),
            ))
            .unwrap();
        Arc::new(cluster)
    }

    fn group_with_partition(cluster: &Arc<Cluster>, group_id: &str, partition_id: &str, role: GroupRole) -> Arc<TopologyGroup> {
        let group = TopologyGroup::new("orders", group_id, role);
        group
            .add_partition(Arc::new(
                Partition::new(
                    group_id,
                    partition_id,
                    Arc::clone(cluster),
                    ExchangeDescriptor::new(format!("{partition_id}.exchange"), ExchangeKind::Topic),
                )
                .with_routing_keys(["orders.#"]),
            ))
            .unwrap();
        Arc::new(group)
    }

    fn bridge(cluster: &Arc<Cluster>, producers: Arc<TopologyGroup>, consumers: Arc<TopologyGroup>) -> Connector {
        Connector::new("orders", "bridge-1", producers, consumers, Arc::clone(cluster))
            .with_routing_keys(["orders.#"])
    }

    #[test]
    fn verify_passes_for_well_formed_bridge() {
        let cluster = cluster("east");
        let producers = group_with_partition(&cluster, "orders.producers", "p1", GroupRole::Producer);
        let consumers = group_with_partition(&cluster, "orders.consumers", "c1", GroupRole::Consumer);

        bridge(&cluster, producers, consumers).verify().unwrap();
    }

    #[test]
    fn verify_rejects_empty_group() {
        let cluster = cluster("east");
        let producers = Arc::new(TopologyGroup::new("orders", "orders.producers", GroupRole::Producer));
        let consumers = group_with_partition(&cluster, "orders.consumers", "c1", GroupRole::Consumer);

        let err = bridge(&cluster, producers, consumers).verify().unwrap_err();
        assert!(matches!(
            err,
            TopologyError::GroupHasNoPartitions { group_id, .. } if group_id.as_str() == "orders.producers"
        ));
    }

    #[test]
    fn verify_rejects_partition_on_foreign_cluster() {
        let east = cluster("east");
        let west = cluster("west");
        let producers = group_with_partition(&east, "orders.producers", "p1", GroupRole::Producer);
        let consumers = group_with_partition(&west, "orders.consumers", "c1", GroupRole::Consumer);

        let err = bridge(&east, producers, consumers).verify().unwrap_err();
        match err {
            TopologyError::PartitionOnForeignCluster {
                partition_id,
                partition_cluster,
                connector_cluster,
                ..
            } => {
                assert_eq!(partition_id.as_str(), "c1");
                assert_eq!(partition_cluster.as_str(), "west+/");
                assert_eq!(connector_cluster.as_str(), "east+/");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn verify_resynchronizes_drifted_routing_keys() {
        let cluster = cluster("east");
        let producers = group_with_partition(&cluster, "orders.producers", "p1", GroupRole::Producer);
        let consumers = group_with_partition(&cluster, "orders.consumers", "c1", GroupRole::Consumer);
        let drifted = producers.get_partition("p1").unwrap();
        drifted.replace_routing_keys(&[CheetahString::from("stale.key")]);

        let connector = bridge(&cluster, producers, consumers);
        connector.verify().unwrap();

        assert_eq!(drifted.routing_keys(), vec![CheetahString::from("orders.#")]);
    }

    #[test]
    fn alias_mutations_reverify() {
        let cluster = cluster("east");
        let producers = group_with_partition(&cluster, "orders.producers", "p1", GroupRole::Producer);
        let consumers = group_with_partition(&cluster, "orders.consumers", "c1", GroupRole::Consumer);
        let connector = bridge(&cluster, producers, consumers);

        connector.add_alias("orders.eu.#").unwrap();
        assert!(connector.routing_keys().contains(&CheetahString::from("orders.eu.#")));

        connector.remove_alias("orders.eu.#").unwrap();
        assert!(!connector.routing_keys().contains(&CheetahString::from("orders.eu.#")));
    }

    #[test]
    fn dehydrate_references_groups_by_id() {
        let cluster = cluster("east");
        let producers = group_with_partition(&cluster, "orders.producers", "p1", GroupRole::Producer);
        let consumers = group_with_partition(&cluster, "orders.consumers", "c1", GroupRole::Consumer);
        let connector = bridge(&cluster, Arc::clone(&producers), Arc::clone(&consumers));

        let record = connector.dehydrate();
        assert_eq!(record.producer_group_id.as_str(), "orders.producers");
        assert_eq!(record.consumer_group_id.as_str(), "orders.consumers");
        assert_eq!(record.cluster_id.as_str(), "east+/");

        let restored = Connector::restore(record, producers, consumers, cluster);
        assert_eq!(restored.connector_id().as_str(), "bridge-1");
        assert_eq!(restored.routing_keys(), vec![CheetahString::from("orders.#")]);
    }
}
