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

//! Errors raised by the broker management plane (clusters, endpoints, tasks).

use std::fmt;

use cheetah_string::CheetahString;
use thiserror::Error;

pub type ManagementResult<T> = std::result::Result<T, ManagementError>;

/// A single endpoint's failure while executing a management task.
#[derive(Debug)]
pub struct EndpointFailure {
    pub endpoint_id: CheetahString,
    pub cause: ManagementError,
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.endpoint_id, self.cause)
    }
}

/// The per-endpoint failures collected during a failed cluster-wide task.
#[derive(Debug, Default)]
pub struct EndpointFailures(pub Vec<EndpointFailure>);

impl EndpointFailures {
    pub fn push(&mut self, endpoint_id: CheetahString, cause: ManagementError) {
        self.0.push(EndpointFailure { endpoint_id, cause });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EndpointFailure> {
        self.0.iter()
    }
}

impl fmt::Display for EndpointFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for failure in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{failure}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ManagementError {
    #[error("cluster '{cluster_id}' already has a management endpoint '{endpoint_id}'")]
    EndpointAlreadyExists {
        cluster_id: CheetahString,
        endpoint_id: CheetahString,
    },

    #[error("cluster '{cluster_id}' has no management endpoint '{endpoint_id}'")]
    EndpointNotExist {
        cluster_id: CheetahString,
        endpoint_id: CheetahString,
    },

    #[error("management task failed on every endpoint of cluster '{cluster_id}': [{failures}]")]
    TaskFailedOnAllEndpoints {
        cluster_id: CheetahString,
        failures: EndpointFailures,
    },

    #[error(
        "broker '{broker_id}' belongs to virtual host '{broker_virtual_host}', cluster '{cluster_id}' requires \
         '{cluster_virtual_host}'"
    )]
    VirtualHostMismatch {
        cluster_id: CheetahString,
        broker_id: CheetahString,
        broker_virtual_host: CheetahString,
        cluster_virtual_host: CheetahString,
    },

    #[error("cluster '{cluster_id}' is not registered")]
    ClusterNotExist { cluster_id: CheetahString },

    #[error("management client error: {0}")]
    Client(String),
}

impl ManagementError {
    /// Convenience constructor for administrative-client failures.
    pub fn client(message: impl Into<String>) -> Self {
        ManagementError::Client(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_endpoints_failure_lists_every_cause() {
        let mut failures = EndpointFailures::default();
        failures.push("rabbit1:15672".into(), ManagementError::client("connection refused"));
        failures.push("rabbit2:15672".into(), ManagementError::client("timeout"));
        let err = ManagementError::TaskFailedOnAllEndpoints {
            cluster_id: "east+/".into(),
            failures,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("rabbit1:15672: management client error: connection refused"));
        assert!(rendered.contains("rabbit2:15672: management client error: timeout"));
    }

    #[test]
    fn endpoint_failures_roundtrip_accessors() {
        let mut failures = EndpointFailures::default();
        assert!(failures.is_empty());
        failures.push("rabbit1:15672".into(), ManagementError::client("boom"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures.iter().next().unwrap().endpoint_id.as_str(), "rabbit1:15672");
    }
}
