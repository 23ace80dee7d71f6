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

//! Broker cluster management plane.
//!
//! A [`Cluster`] is a named group of data brokers sharing a virtual host,
//! administered through one or more [`ManagementEndpoint`]s. Management
//! tasks execute with failover: the task is tried on each endpoint in turn
//! and succeeds as soon as any endpoint succeeds.

pub use crate::broker::Broker;
pub use crate::client::ManagementClient;
pub use crate::client::MemoryManagementClient;
pub use crate::cluster::Cluster;
pub use crate::cluster::ClusterListener;
pub use crate::cluster_registry::ClusterRegistry;
pub use crate::endpoint::ManagementEndpoint;
pub use crate::exchange::ExchangeDescriptor;
pub use crate::exchange::ExchangeKind;
pub use crate::task::ManagementTask;

mod broker;
mod client;
mod cluster;
mod cluster_registry;
mod endpoint;
mod exchange;
mod task;
