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

//! Topology domain model and route resolution engine.
//!
//! A [`Topic`](model::Topic) owns producer groups, consumer groups and
//! connectors; each [`TopologyGroup`](model::TopologyGroup) owns
//! [`Partition`](model::Partition)s bound to a broker cluster. Given a
//! client's [`RouteRequirements`](filtering::RouteRequirements), the engine
//! filters the topology down to the partitions that client may use
//! ([`RouteFilterResults`](filtering::RouteFilterResults)), applying
//! protocol compatibility and access control deterministically.
//!
//! The [`persistence`] module dehydrates the topology tree into serde
//! records and rehydrates it on startup, so the registry survives process
//! restarts.

pub use crate::registry::TopicRegistry;

pub mod filtering;
pub mod model;
pub mod persistence;
mod registry;
