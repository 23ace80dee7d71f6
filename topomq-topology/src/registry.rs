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

//! Process-wide directory of topics.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use cheetah_string::CheetahString;
use dashmap::DashMap;
use topomq_common::TimeUtils;
use topomq_error::TopicChangeRollup;
use topomq_error::TopologyError;
use topomq_error::TopologyResult;
use tracing::info;

use crate::filtering::RouteFilterResults;
use crate::filtering::RouteRequirements;
use crate::model::Topic;

/// Stores and provides access to the topology tree, by topic id.
///
/// Reads never block other readers; registration and unregistration are the
/// only mutations. Unregistering a topic tears down everything it owns.
#[derive(Debug, Default)]
pub struct TopicRegistry {
    topics: DashMap<CheetahString, Arc<Topic>>,
    last_modified: AtomicU64,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, topic_id: &str) -> TopologyResult<Arc<Topic>> {
        self.topics
            .get(topic_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TopologyError::TopicNotExist {
                topic_id: CheetahString::from(topic_id),
            })
    }

    pub fn exists(&self, topic_id: &str) -> bool {
        self.topics.contains_key(topic_id)
    }

    /// Registers a topic and runs `setup` on it; a setup failure rolls the
    /// registration back.
    pub fn register(&self, topic: Arc<Topic>) -> TopologyResult<()> {
        let topic_id = topic.topic_id().clone();
        match self.topics.entry(topic_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(TopologyError::TopicAlreadyExists { topic_id });
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&topic));
            }
        }
        if let Err(e) = topic.setup() {
            self.topics.remove(&topic_id);
            return Err(e);
        }
        self.touch();
        info!("topic {} registered", topic_id);
        Ok(())
    }

    /// Unregisters a topic, cleaning up all of its groups and connectors.
    pub fn unregister(&self, topic_id: &str) -> TopologyResult<()> {
        let (_, topic) = self
            .topics
            .remove(topic_id)
            .ok_or_else(|| TopologyError::TopicNotExist {
                topic_id: CheetahString::from(topic_id),
            })?;
        topic.cleanup()?;
        self.touch();
        info!("topic {} unregistered", topic_id);
        Ok(())
    }

    /// Registered topics, ordered by id.
    pub fn entries(&self) -> Vec<Arc<Topic>> {
        let mut topics: Vec<Arc<Topic>> = self.topics.iter().map(|e| Arc::clone(e.value())).collect();
        topics.sort_by(|a, b| a.topic_id().cmp(b.topic_id()));
        topics
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Millis timestamp of the last successful mutation, 0 before any.
    pub fn last_modified(&self) -> u64 {
        self.last_modified.load(Ordering::Acquire)
    }

    /// Resolves a client's route requirements against the registered
    /// topology.
    ///
    /// The only failure is an unknown topic; an eligible topic with no
    /// matching partitions resolves to an empty (valid) result.
    pub fn resolve(&self, requirements: &RouteRequirements) -> TopologyResult<RouteFilterResults> {
        let topic = self.get(requirements.topic().as_str())?;
        Ok(topic.filter(requirements))
    }

    /// Registers a whole batch, attempting every topic before reporting.
    /// Per-topic failures are collected into the rollup rather than aborting
    /// the batch.
    pub fn register_all(&self, topics: Vec<Arc<Topic>>) -> std::result::Result<(), TopicChangeRollup> {
        let mut rollup = TopicChangeRollup::new();
        for topic in topics {
            let topic_id = topic.topic_id().clone();
            if let Err(e) = self.register(topic) {
                rollup.register_failure(topic_id, e);
            }
        }
        rollup.into_result()
    }

    /// Unregisters a whole batch, attempting every topic before reporting.
    pub fn unregister_all<I, S>(&self, topic_ids: I) -> std::result::Result<(), TopicChangeRollup>
    where
        I: IntoIterator<Item = S>,
        S: Into<CheetahString>,
    {
        let mut rollup = TopicChangeRollup::new();
        for topic_id in topic_ids {
            let topic_id = topic_id.into();
            if let Err(e) = self.unregister(topic_id.as_str()) {
                rollup.register_failure(topic_id, e);
            }
        }
        rollup.into_result()
    }

    /// Reattaches a rehydrated topic without running `setup`.
    pub(crate) fn restore_topic(&self, topic: Arc<Topic>) {
        self.topics.insert(topic.topic_id().clone(), topic);
        self.touch();
    }

    fn touch(&self) {
        self.last_modified.store(TimeUtils::current_millis(), Ordering::Release);
    }
}
