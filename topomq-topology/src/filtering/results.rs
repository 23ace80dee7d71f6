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

use crate::model::Partition;

/// The partitions a client may legitimately use, split by role.
///
/// An empty result is a valid outcome; "no route" means access was denied
/// or the topic has no eligible partitions; it is never an error. Partitions
/// are ordered by id, so a given input always yields the same output order.
#[derive(Debug, Clone, Default)]
pub struct RouteFilterResults {
    producer_partitions: Vec<Arc<Partition>>,
    consumer_partitions: Vec<Arc<Partition>>,
}

impl RouteFilterResults {
    pub fn builder() -> RouteFilterResultsBuilder {
        RouteFilterResultsBuilder::default()
    }

    /// A result with no eligible partitions.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn producer_partitions(&self) -> &[Arc<Partition>] {
        &self.producer_partitions
    }

    pub fn consumer_partitions(&self) -> &[Arc<Partition>] {
        &self.consumer_partitions
    }

    pub fn is_empty(&self) -> bool {
        self.producer_partitions.is_empty() && self.consumer_partitions.is_empty()
    }
}

/// Accumulates accepted partitions group by group, then freezes them into
/// [`RouteFilterResults`].
#[derive(Debug, Default)]
pub struct RouteFilterResultsBuilder {
    producer_partitions: Vec<Arc<Partition>>,
    consumer_partitions: Vec<Arc<Partition>>,
}

impl RouteFilterResultsBuilder {
    pub fn produce_on(&mut self, partitions: impl IntoIterator<Item = Arc<Partition>>) -> &mut Self {
        self.producer_partitions.extend(partitions);
        self
    }

    pub fn consume_on(&mut self, partitions: impl IntoIterator<Item = Arc<Partition>>) -> &mut Self {
        self.consumer_partitions.extend(partitions);
        self
    }

    pub fn build(mut self) -> RouteFilterResults {
        self.producer_partitions.sort_by(|a, b| a.partition_id().cmp(b.partition_id()));
        self.consumer_partitions.sort_by(|a, b| a.partition_id().cmp(b.partition_id()));
        RouteFilterResults {
            producer_partitions: self.producer_partitions,
            consumer_partitions: self.consumer_partitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use topomq_management::Cluster;
    use topomq_management::ExchangeDescriptor;
    use topomq_management::ExchangeKind;

    use super::*;

    fn partition(id: &str) -> Arc<Partition> {
        let cluster = Arc::new(Cluster::new("east"));
        Arc::new(Partition::new(
            "g1",
            id,
            cluster,
            ExchangeDescriptor::new(format!("{id}.exchange"), ExchangeKind::Topic),
        ))
    }

    #[test]
    fn empty_results_are_empty() {
        assert!(RouteFilterResults::empty().is_empty());
    }

    #[test]
    fn builder_orders_partitions_by_id() {
        let mut builder = RouteFilterResults::builder();
        builder.produce_on([partition("p3"), partition("p1")]);
        builder.produce_on([partition("p2")]);
        let results = builder.build();

        let ids: Vec<&str> = results
            .producer_partitions()
            .iter()
            .map(|p| p.partition_id().as_str())
            .collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        assert!(results.consumer_partitions().is_empty());
        assert!(!results.is_empty());
    }
}
