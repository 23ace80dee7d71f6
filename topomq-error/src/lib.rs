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

//! # TopoMQ Error Handling System
//!
//! Unified, semantic error types for the TopoMQ control plane.
//!
//! Every identifier-based operation fails fast with a typed, id-carrying
//! error. Resolution misses ("no eligible partitions") are *not* errors;
//! error types are reserved for not-found lookups, duplicate registrations,
//! topology invariant violations, management-plane exhaustion, persistence
//! faults and data-plane connection faults.

pub mod connection_error;
pub mod management_error;
pub mod persistence_error;
pub mod rollup;
pub mod topology_error;

use thiserror::Error;

pub use connection_error::ConnectionError;
pub use connection_error::ConnectionResult;
pub use management_error::EndpointFailure;
pub use management_error::EndpointFailures;
pub use management_error::ManagementError;
pub use management_error::ManagementResult;
pub use persistence_error::EntityKind;
pub use persistence_error::PersistenceError;
pub use persistence_error::PersistenceResult;
pub use rollup::TopicChangeFailure;
pub use rollup::TopicChangeRollup;
pub use topology_error::TopologyError;
pub use topology_error::TopologyResult;

/// Result alias used across the workspace.
pub type TopoMQResult<T> = std::result::Result<T, TopoMQError>;

/// Umbrella error aggregating every domain error in the workspace.
#[derive(Debug, Error)]
pub enum TopoMQError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Management(#[from] ManagementError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("configuration error: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn umbrella_error_preserves_domain_message() {
        let err: TopoMQError = TopologyError::TopicNotExist {
            topic_id: "orders".into(),
        }
        .into();
        assert_eq!(err.to_string(), "topic 'orders' does not exist");
    }

    #[test]
    fn management_error_converts_through_topology_layer() {
        let management = ManagementError::ClusterNotExist {
            cluster_id: "east+/".into(),
        };
        let topology: TopologyError = management.into();
        let umbrella: TopoMQError = topology.into();
        assert!(umbrella.to_string().contains("east+/"));
    }
}
