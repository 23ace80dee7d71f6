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

use topomq_error::PersistenceResult;
use topomq_error::TopicChangeRollup;
use topomq_error::TopoMQResult;
use topomq_error::TopologyResult;
use topomq_management::ClusterRegistry;

use crate::filtering::RouteFilterResults;
use crate::filtering::RouteRequirements;
use crate::model::Topic;
use crate::persistence::context::PersistenceContext;
use crate::persistence::hydrater::Hydrater;
use crate::registry::TopicRegistry;

/// Writes a topic's whole dehydrated graph (topic, groups, partitions,
/// connectors) into the context.
pub(crate) fn save_topic_graph(context: &PersistenceContext, topic: &Topic) -> PersistenceResult<()> {
    for group in topic.producer_groups().into_iter().chain(topic.consumer_groups()) {
        for partition in group.partitions() {
            context.partitions().save(&partition.dehydrate())?;
        }
        context.groups().save(&group.dehydrate())?;
    }
    for connector in topic.connectors() {
        context.connectors().save(&connector.dehydrate())?;
    }
    context.topics().save(&topic.dehydrate())
}

/// A [`TopicRegistry`] whose mutations are written through to a
/// [`PersistenceContext`], surviving process restarts.
pub struct PersistentTopicRegistry {
    inner: TopicRegistry,
    context: PersistenceContext,
}

impl PersistentTopicRegistry {
    /// An empty persistent registry over the given context.
    pub fn new(context: PersistenceContext) -> Self {
        PersistentTopicRegistry {
            inner: TopicRegistry::new(),
            context,
        }
    }

    /// Rehydrates every persisted topic before the registry accepts
    /// requests. Topics that fail to restore are reported in the rollup and
    /// skipped.
    pub fn restore(context: PersistenceContext, clusters: &ClusterRegistry) -> (Self, TopicChangeRollup) {
        let (inner, rollup) = Hydrater::new(&context, clusters).restore();
        (PersistentTopicRegistry { inner, context }, rollup)
    }

    /// Registers a topic and persists its dehydrated graph.
    pub fn register(&self, topic: Arc<Topic>) -> TopoMQResult<()> {
        self.inner.register(Arc::clone(&topic))?;
        save_topic_graph(&self.context, &topic)?;
        Ok(())
    }

    /// Unregisters a topic, tears it down and removes its records.
    pub fn unregister(&self, topic_id: &str) -> TopoMQResult<()> {
        let topic = self.inner.get(topic_id)?;
        let record = topic.dehydrate();
        let partition_ids: Vec<_> = topic
            .producer_groups()
            .into_iter()
            .chain(topic.consumer_groups())
            .flat_map(|group| group.partitions())
            .map(|partition| partition.partition_id().clone())
            .collect();

        self.inner.unregister(topic_id)?;

        for partition_id in partition_ids {
            remove_if_present(|| self.context.partitions().remove(partition_id.as_str()))?;
        }
        for group_id in record.producer_group_ids.iter().chain(record.consumer_group_ids.iter()) {
            remove_if_present(|| self.context.groups().remove(group_id.as_str()))?;
        }
        for connector_id in &record.connector_ids {
            remove_if_present(|| self.context.connectors().remove(connector_id.as_str()))?;
        }
        remove_if_present(|| self.context.topics().remove(topic_id))?;
        Ok(())
    }

    /// Re-persists a registered topic's graph after in-place mutations
    /// (group/partition/connector changes).
    pub fn save(&self, topic_id: &str) -> TopoMQResult<()> {
        let topic = self.inner.get(topic_id)?;
        save_topic_graph(&self.context, &topic)?;
        Ok(())
    }

    pub fn get(&self, topic_id: &str) -> TopologyResult<Arc<Topic>> {
        self.inner.get(topic_id)
    }

    pub fn exists(&self, topic_id: &str) -> bool {
        self.inner.exists(topic_id)
    }

    pub fn entries(&self) -> Vec<Arc<Topic>> {
        self.inner.entries()
    }

    pub fn topic_count(&self) -> usize {
        self.inner.topic_count()
    }

    pub fn last_modified(&self) -> u64 {
        self.inner.last_modified()
    }

    pub fn resolve(&self, requirements: &RouteRequirements) -> TopologyResult<RouteFilterResults> {
        self.inner.resolve(requirements)
    }

    pub fn context(&self) -> &PersistenceContext {
        &self.context
    }
}

fn remove_if_present(remove: impl FnOnce() -> PersistenceResult<()>) -> PersistenceResult<()> {
    match remove() {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_exist() => Ok(()),
        Err(e) => Err(e),
    }
}

impl std::fmt::Debug for PersistentTopicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentTopicRegistry")
            .field("topics", &self.inner.topic_count())
            .finish()
    }
}
