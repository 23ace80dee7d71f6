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

//! Rehydration of the topology tree from persisted records.

use std::sync::Arc;

use cheetah_string::CheetahString;
use topomq_error::TopicChangeRollup;
use topomq_error::TopoMQResult;
use topomq_management::ClusterRegistry;
use tracing::info;
use tracing::warn;

use crate::model::Connector;
use crate::model::Partition;
use crate::model::Topic;
use crate::model::TopologyGroup;
use crate::persistence::context::PersistenceContext;
use crate::registry::TopicRegistry;

/// Rebuilds live topology objects from dehydrated records.
///
/// Runs before the registry serves requests. Partitions restore their
/// recorded state without touching the broker (divergence is a `verify`
/// concern), and cluster references are resolved through the cluster
/// registry, so every referenced cluster must be registered first.
pub struct Hydrater<'a> {
    context: &'a PersistenceContext,
    clusters: &'a ClusterRegistry,
}

impl<'a> Hydrater<'a> {
    pub fn new(context: &'a PersistenceContext, clusters: &'a ClusterRegistry) -> Self {
        Hydrater { context, clusters }
    }

    /// Restores every persisted topic into a fresh registry.
    ///
    /// The whole record set is attempted; topics that fail to restore land
    /// in the rollup (with their cause) and are skipped, not fatal to the
    /// batch.
    pub fn restore(&self) -> (TopicRegistry, TopicChangeRollup) {
        let registry = TopicRegistry::new();
        let mut rollup = TopicChangeRollup::new();

        let topic_ids: Vec<CheetahString> = self.context.topics().record_ids().collect();
        for topic_id in topic_ids {
            match self.restore_topic(topic_id.as_str()) {
                Ok(topic) => registry.restore_topic(topic),
                Err(e) => {
                    warn!("failed to rehydrate topic {}: {}", topic_id, e);
                    rollup.register_failure(topic_id, e);
                }
            }
        }
        info!("rehydrated {} topic(s)", registry.topic_count());
        (registry, rollup)
    }

    fn restore_topic(&self, topic_id: &str) -> TopoMQResult<Arc<Topic>> {
        let record = self.context.topics().get(topic_id)?;
        let group_ids = record
            .producer_group_ids
            .iter()
            .chain(record.consumer_group_ids.iter())
            .cloned()
            .collect::<Vec<_>>();
        let connector_ids = record.connector_ids.clone();
        let topic = Arc::new(Topic::restore(record));

        for group_id in group_ids {
            topic.restore_group(self.restore_group(group_id.as_str())?);
        }
        for connector_id in connector_ids {
            topic.restore_connector(self.restore_connector(&topic, connector_id.as_str())?);
        }
        Ok(topic)
    }

    fn restore_group(&self, group_id: &str) -> TopoMQResult<Arc<TopologyGroup>> {
        let record = self.context.groups().get(group_id)?;
        let partition_ids = record.partition_ids.clone();
        let group = TopologyGroup::restore(record);

        for partition_id in partition_ids {
            let partition_record = self.context.partitions().get(partition_id.as_str())?;
            let cluster = self.clusters.get(partition_record.cluster_id.as_str())?;
            group.restore_partition(Arc::new(Partition::restore(partition_record, cluster)));
        }
        Ok(Arc::new(group))
    }

    fn restore_connector(&self, topic: &Topic, connector_id: &str) -> TopoMQResult<Arc<Connector>> {
        let record = self.context.connectors().get(connector_id)?;
        let producer_group = topic.get_group(record.producer_group_id.as_str())?;
        let consumer_group = topic.get_group(record.consumer_group_id.as_str())?;
        let cluster = self.clusters.get(record.cluster_id.as_str())?;
        Ok(Arc::new(Connector::restore(record, producer_group, consumer_group, cluster)))
    }
}

#[cfg(test)]
mod tests {
    use topomq_management::Cluster;
    use topomq_management::ExchangeDescriptor;
    use topomq_management::ExchangeKind;
    use topomq_management::ManagementEndpoint;
    use topomq_management::MemoryManagementClient;

    use super::*;
    use crate::model::GroupRole;
    use crate::model::PartitionState;
    use crate::persistence::persistent_registry::save_topic_graph;

    fn cluster_registry() -> ClusterRegistry {
        let clusters = ClusterRegistry::new();
        let cluster = Cluster::new("east");
        cluster
            .add_management_endpoint(ManagementEndpoint::new("rabbit1", 15672, Arc::new(MemoryManagementClient::new())))
            .unwrap();
        clusters.add(Arc::new(cluster));
        clusters
    }

    fn seeded_context(clusters: &ClusterRegistry) -> PersistenceContext {
        let context = PersistenceContext::in_memory();
        let cluster = clusters.get("east+/").unwrap();

        let topic = Topic::with_description("orders", "order events");
        let producers = TopologyGroup::new("orders", "orders.producers", GroupRole::Producer);
        producers
            .add_partition(Arc::new(
                Partition::new(
                    "orders.producers",
                    "p1",
                    Arc::clone(&cluster),
                    ExchangeDescriptor::new("orders.outbound", ExchangeKind::Topic),
                )
                .with_routing_keys(["orders.#"])
                .with_protocols(["AMQP"]),
            ))
            .unwrap();
        let producers = Arc::new(producers);
        let consumers = TopologyGroup::new("orders", "orders.consumers", GroupRole::Consumer);
        consumers
            .add_partition(Arc::new(Partition::new(
                "orders.consumers",
                "c1",
                Arc::clone(&cluster),
                ExchangeDescriptor::new("orders.inbound", ExchangeKind::Topic),
            )))
            .unwrap();
        let consumers = Arc::new(consumers);
        topic.add_group(Arc::clone(&producers)).unwrap();
        topic.add_group(Arc::clone(&consumers)).unwrap();
        topic
            .add_connector(Arc::new(
                Connector::new("orders", "bridge-1", producers, consumers, cluster).with_routing_keys(["orders.#"]),
            ))
            .unwrap();

        save_topic_graph(&context, &topic).unwrap();
        context
    }

    #[test]
    fn restores_the_full_tree() {
        let clusters = cluster_registry();
        let context = seeded_context(&clusters);

        let (registry, rollup) = Hydrater::new(&context, &clusters).restore();
        assert!(!rollup.has_errors());
        assert_eq!(registry.topic_count(), 1);

        let topic = registry.get("orders").unwrap();
        assert_eq!(topic.description().as_str(), "order events");

        let producers = topic.get_producer_group("orders.producers").unwrap();
        let p1 = producers.get_partition("p1").unwrap();
        // active state restored without re-provisioning
        assert_eq!(p1.state(), PartitionState::Active);
        assert_eq!(p1.cluster().cluster_id().as_str(), "east+/");
        assert!(p1.supports_protocol("AMQP"));

        let connector = topic.get_connector("bridge-1").unwrap();
        assert_eq!(connector.producer_group().group_id().as_str(), "orders.producers");
        connector.verify().unwrap();
    }

    #[test]
    fn unknown_cluster_reference_lands_in_the_rollup() {
        let seeded_clusters = cluster_registry();
        let context = seeded_context(&seeded_clusters);

        // rehydrate against a registry that lacks the referenced cluster
        let empty_clusters = ClusterRegistry::new();
        let (registry, rollup) = Hydrater::new(&context, &empty_clusters).restore();
        assert_eq!(registry.topic_count(), 0);
        assert!(rollup.has_errors());
        assert_eq!(rollup.entries()[0].topic_id().as_str(), "orders");
    }
}
