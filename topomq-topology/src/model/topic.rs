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

//! Container for the routes associated with a particular topology.

use std::sync::Arc;

use cheetah_string::CheetahString;
use dashmap::DashMap;
use parking_lot::RwLock;
use topomq_access::AccessControlList;
use topomq_error::TopologyError;
use topomq_error::TopologyResult;
use tracing::info;
use tracing::warn;

use crate::filtering::RouteDirection;
use crate::filtering::RouteFilterResults;
use crate::filtering::RouteRequirements;
use crate::model::connector::Connector;
use crate::model::group::GroupRole;
use crate::model::group::TopologyGroup;
use crate::persistence::records::TopicRecord;

/// Whether (and how) a group id exists on a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupExistence {
    AsProducer,
    AsConsumer,
    Absent,
}

/// A topic: the producer groups, consumer groups and connectors serving one
/// id in the topic space.
///
/// The topic manages the life cycle of its groups and connectors: adding
/// runs `setup`, removing runs `cleanup`, and unregistration tears the whole
/// tree down.
pub struct Topic {
    topic_id: CheetahString,
    description: RwLock<CheetahString>,
    producer_groups: DashMap<CheetahString, Arc<TopologyGroup>>,
    consumer_groups: DashMap<CheetahString, Arc<TopologyGroup>>,
    connectors: DashMap<CheetahString, Arc<Connector>>,
    access_controls: AccessControlList,
}

impl Topic {
    /// `topic_id` is globally unique in the topic space, typically the
    /// canonical name of an event, or a broader category like
    /// "user-queues".
    pub fn new(topic_id: impl Into<CheetahString>) -> Self {
        Topic {
            topic_id: topic_id.into(),
            description: RwLock::new(CheetahString::empty()),
            producer_groups: DashMap::new(),
            consumer_groups: DashMap::new(),
            connectors: DashMap::new(),
            access_controls: AccessControlList::new(),
        }
    }

    pub fn with_description(topic_id: impl Into<CheetahString>, description: impl Into<CheetahString>) -> Self {
        let topic = Topic::new(topic_id);
        topic.set_description(description);
        topic
    }

    pub fn topic_id(&self) -> &CheetahString {
        &self.topic_id
    }

    pub fn description(&self) -> CheetahString {
        self.description.read().clone()
    }

    pub fn set_description(&self, description: impl Into<CheetahString>) {
        *self.description.write() = description.into();
    }

    /// Topic-level access controls, consulted before any group is walked.
    pub fn access_controls(&self) -> &AccessControlList {
        &self.access_controls
    }

    ///// Query + filtering ///////////////////////////////////////////////

    /// Resolves the partitions applicable to the client's requirements.
    ///
    /// Publishing walks the producer groups, consuming walks the consumer
    /// groups; each partition is admitted by protocol compatibility and
    /// access control. A topic-level denial short-circuits to an empty
    /// result; "no route" is an outcome, not an error.
    pub fn filter(&self, requirements: &RouteRequirements) -> RouteFilterResults {
        if !self
            .access_controls
            .is_allowed(requirements.direction().operation(), requirements.actor())
        {
            return RouteFilterResults::empty();
        }
        let mut builder = RouteFilterResults::builder();
        match requirements.direction() {
            RouteDirection::Publish => {
                for group in self.producer_groups() {
                    builder.produce_on(group.filter(requirements));
                }
            }
            RouteDirection::Consume => {
                for group in self.consumer_groups() {
                    builder.consume_on(group.filter(requirements));
                }
            }
        }
        builder.build()
    }

    ///// Life cycle //////////////////////////////////////////////////////

    pub fn setup(&self) -> TopologyResult<()> {
        Ok(())
    }

    /// Tears down everything owned by the topic: producers first (stop the
    /// inflow), then connectors, then consumers. Every element is attempted;
    /// the first failure is reported after the sweep.
    pub fn cleanup(&self) -> TopologyResult<()> {
        let mut first_error = None;

        for group in self.producer_groups() {
            if let Err(e) = group.cleanup() {
                warn!("cleanup of producer group {} failed: {}", group.group_id(), e);
                first_error.get_or_insert(e);
            }
        }
        self.producer_groups.clear();

        for connector in self.connectors() {
            if let Err(e) = connector.cleanup() {
                warn!("cleanup of connector {} failed: {}", connector.connector_id(), e);
                first_error.get_or_insert(e);
            }
        }
        self.connectors.clear();

        for group in self.consumer_groups() {
            if let Err(e) = group.cleanup() {
                warn!("cleanup of consumer group {} failed: {}", group.group_id(), e);
                first_error.get_or_insert(e);
            }
        }
        self.consumer_groups.clear();

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    ///// Group CRUD //////////////////////////////////////////////////////

    /// Adds a group under its role and runs `setup` on it; a setup failure
    /// rolls the addition back. The group id must be unique across both
    /// roles.
    pub fn add_group(&self, group: Arc<TopologyGroup>) -> TopologyResult<()> {
        let group_id = group.group_id().clone();
        if self.group_existence(group_id.as_str()) != GroupExistence::Absent {
            return Err(TopologyError::GroupAlreadyExists {
                topic_id: self.topic_id.clone(),
                group_id,
            });
        }
        let groups = match group.role() {
            GroupRole::Producer => &self.producer_groups,
            GroupRole::Consumer => &self.consumer_groups,
        };
        groups.insert(group_id.clone(), Arc::clone(&group));
        if let Err(e) = group.setup() {
            groups.remove(&group_id);
            return Err(e);
        }
        info!("{} group {} added to topic {}", group.role(), group_id, self.topic_id);
        Ok(())
    }

    /// Removes a group by id (producer or consumer) and cleans it up.
    pub fn remove_group(&self, group_id: &str) -> TopologyResult<()> {
        let removed = match self.group_existence(group_id) {
            GroupExistence::AsProducer => self.producer_groups.remove(group_id),
            GroupExistence::AsConsumer => self.consumer_groups.remove(group_id),
            GroupExistence::Absent => None,
        };
        let (_, group) = removed.ok_or_else(|| TopologyError::GroupNotExist {
            topic_id: self.topic_id.clone(),
            group_id: CheetahString::from(group_id),
        })?;
        group.cleanup()?;
        info!("group {} removed from topic {}", group_id, self.topic_id);
        Ok(())
    }

    /// Looks a group up by id, producer or consumer.
    pub fn get_group(&self, group_id: &str) -> TopologyResult<Arc<TopologyGroup>> {
        self.producer_groups
            .get(group_id)
            .or_else(|| self.consumer_groups.get(group_id))
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TopologyError::GroupNotExist {
                topic_id: self.topic_id.clone(),
                group_id: CheetahString::from(group_id),
            })
    }

    pub fn get_producer_group(&self, group_id: &str) -> TopologyResult<Arc<TopologyGroup>> {
        self.producer_groups
            .get(group_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TopologyError::GroupNotExist {
                topic_id: self.topic_id.clone(),
                group_id: CheetahString::from(group_id),
            })
    }

    pub fn get_consumer_group(&self, group_id: &str) -> TopologyResult<Arc<TopologyGroup>> {
        self.consumer_groups
            .get(group_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TopologyError::GroupNotExist {
                topic_id: self.topic_id.clone(),
                group_id: CheetahString::from(group_id),
            })
    }

    pub fn group_exists(&self, group_id: &str) -> bool {
        self.group_existence(group_id) != GroupExistence::Absent
    }

    pub fn group_existence(&self, group_id: &str) -> GroupExistence {
        if self.producer_groups.contains_key(group_id) {
            GroupExistence::AsProducer
        } else if self.consumer_groups.contains_key(group_id) {
            GroupExistence::AsConsumer
        } else {
            GroupExistence::Absent
        }
    }

    /// Producer groups, ordered by id.
    pub fn producer_groups(&self) -> Vec<Arc<TopologyGroup>> {
        Self::sorted_groups(&self.producer_groups)
    }

    /// Consumer groups, ordered by id.
    pub fn consumer_groups(&self) -> Vec<Arc<TopologyGroup>> {
        Self::sorted_groups(&self.consumer_groups)
    }

    ///// Connector CRUD //////////////////////////////////////////////////

    /// Adds a connector and runs `setup` (a verification pass) on it; a
    /// failure rolls the addition back.
    pub fn add_connector(&self, connector: Arc<Connector>) -> TopologyResult<()> {
        let connector_id = connector.connector_id().clone();
        match self.connectors.entry(connector_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(TopologyError::ConnectorAlreadyExists {
                    topic_id: self.topic_id.clone(),
                    connector_id,
                });
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&connector));
            }
        }
        if let Err(e) = connector.setup() {
            self.connectors.remove(&connector_id);
            return Err(e);
        }
        info!("connector {} added to topic {}", connector_id, self.topic_id);
        Ok(())
    }

    pub fn remove_connector(&self, connector_id: &str) -> TopologyResult<()> {
        let (_, connector) = self
            .connectors
            .remove(connector_id)
            .ok_or_else(|| TopologyError::ConnectorNotExist {
                topic_id: self.topic_id.clone(),
                connector_id: CheetahString::from(connector_id),
            })?;
        connector.cleanup()?;
        Ok(())
    }

    pub fn get_connector(&self, connector_id: &str) -> TopologyResult<Arc<Connector>> {
        self.connectors
            .get(connector_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TopologyError::ConnectorNotExist {
                topic_id: self.topic_id.clone(),
                connector_id: CheetahString::from(connector_id),
            })
    }

    /// Connectors, ordered by id.
    pub fn connectors(&self) -> Vec<Arc<Connector>> {
        let mut connectors: Vec<Arc<Connector>> = self.connectors.iter().map(|e| Arc::clone(e.value())).collect();
        connectors.sort_by(|a, b| a.connector_id().cmp(b.connector_id()));
        connectors
    }

    ///// Hydration ///////////////////////////////////////////////////////

    /// Reattaches a rehydrated group without running `setup`.
    pub(crate) fn restore_group(&self, group: Arc<TopologyGroup>) {
        let groups = match group.role() {
            GroupRole::Producer => &self.producer_groups,
            GroupRole::Consumer => &self.consumer_groups,
        };
        groups.insert(group.group_id().clone(), group);
    }

    /// Reattaches a rehydrated connector without running `setup`.
    pub(crate) fn restore_connector(&self, connector: Arc<Connector>) {
        self.connectors.insert(connector.connector_id().clone(), connector);
    }

    pub fn dehydrate(&self) -> TopicRecord {
        TopicRecord {
            topic_id: self.topic_id.clone(),
            description: self.description(),
            producer_group_ids: self.producer_groups().iter().map(|g| g.group_id().clone()).collect(),
            consumer_group_ids: self.consumer_groups().iter().map(|g| g.group_id().clone()).collect(),
            connector_ids: self.connectors().iter().map(|c| c.connector_id().clone()).collect(),
        }
    }

    /// Rebuilds an empty topic from its record; groups and connectors are
    /// reattached separately by the hydrater.
    pub fn restore(record: TopicRecord) -> Self {
        Topic::with_description(record.topic_id, record.description)
    }

    fn sorted_groups(groups: &DashMap<CheetahString, Arc<TopologyGroup>>) -> Vec<Arc<TopologyGroup>> {
        let mut sorted: Vec<Arc<TopologyGroup>> = groups.iter().map(|e| Arc::clone(e.value())).collect();
        sorted.sort_by(|a, b| a.group_id().cmp(b.group_id()));
        sorted
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("topic_id", &self.topic_id)
            .field("producer_groups", &self.producer_groups.len())
            .field("consumer_groups", &self.consumer_groups.len())
            .field("connectors", &self.connectors.len())
            .finish()
    }
}
