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

//! Errors raised by the state persistence layer.

use std::fmt;

use cheetah_string::CheetahString;
use thiserror::Error;

pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;

/// The persisted entity kinds. `RecordNotExist` carries the kind so every
/// persister surfaces its own kind-specific not-found error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Topic,
    Group,
    Partition,
    Connector,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Topic => "topic",
            EntityKind::Group => "group",
            EntityKind::Partition => "partition",
            EntityKind::Connector => "connector",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no {kind} record exists for id '{id}'")]
    RecordNotExist { kind: EntityKind, id: CheetahString },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PersistenceError {
    pub fn record_not_exist(kind: EntityKind, id: impl Into<CheetahString>) -> Self {
        PersistenceError::RecordNotExist { kind, id: id.into() }
    }

    /// Whether this error is the kind-specific not-found miss (as opposed to
    /// an io/serialization fault of the backing store).
    pub fn is_not_exist(&self) -> bool {
        matches!(self, PersistenceError::RecordNotExist { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_exist_names_kind_and_id() {
        let err = PersistenceError::record_not_exist(EntityKind::Partition, "p1");
        assert_eq!(err.to_string(), "no partition record exists for id 'p1'");
        assert!(err.is_not_exist());
    }

    #[test]
    fn io_errors_are_not_not_exist() {
        let err: PersistenceError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(!err.is_not_exist());
    }
}
