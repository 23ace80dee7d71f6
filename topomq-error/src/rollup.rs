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

//! Bulk-operation failure rollup.
//!
//! Applying a batch of topology changes never aborts on the first failure:
//! per-item failures are collected here and the rollup is raised only after
//! the whole batch has been attempted. `has_errors` lets callers check the
//! outcome before treating the rollup as fatal.

use std::error::Error;
use std::fmt;

use cheetah_string::CheetahString;

use crate::TopoMQError;

/// One failed topic change with its cause.
#[derive(Debug)]
pub struct TopicChangeFailure {
    topic_id: CheetahString,
    cause: TopoMQError,
}

impl TopicChangeFailure {
    pub fn topic_id(&self) -> &CheetahString {
        &self.topic_id
    }

    pub fn cause(&self) -> &TopoMQError {
        &self.cause
    }
}

impl fmt::Display for TopicChangeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "topic '{}' could not be modified: {}", self.topic_id, self.cause)
    }
}

/// Aggregator of failures encountered while applying a batch of topology
/// changes. Multiple failures may be registered for the same topic.
#[derive(Debug, Default)]
pub struct TopicChangeRollup {
    entries: Vec<TopicChangeFailure>,
}

impl TopicChangeRollup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure that occurred for a topic.
    pub fn register_failure(&mut self, topic_id: impl Into<CheetahString>, cause: impl Into<TopoMQError>) {
        self.entries.push(TopicChangeFailure {
            topic_id: topic_id.into(),
            cause: cause.into(),
        });
    }

    /// Has at least one failure been registered?
    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TopicChangeFailure] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the rollup, returning `Ok(())` when no failures were
    /// registered and `Err(self)` otherwise.
    pub fn into_result(self) -> std::result::Result<(), TopicChangeRollup> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for TopicChangeRollup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} topology change(s) failed:", self.entries.len())?;
        for entry in &self.entries {
            writeln!(f, "\t{entry}")?;
        }
        Ok(())
    }
}

impl Error for TopicChangeRollup {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TopologyError;

    #[test]
    fn empty_rollup_has_no_errors() {
        let rollup = TopicChangeRollup::new();
        assert!(!rollup.has_errors());
        assert!(rollup.into_result().is_ok());
    }

    #[test]
    fn registered_failures_are_reported_per_topic() {
        let mut rollup = TopicChangeRollup::new();
        rollup.register_failure(
            "orders",
            TopologyError::TopicAlreadyExists {
                topic_id: "orders".into(),
            },
        );
        rollup.register_failure(
            "invoices",
            TopologyError::TopicNotExist {
                topic_id: "invoices".into(),
            },
        );
        assert!(rollup.has_errors());
        assert_eq!(rollup.len(), 2);
        let rendered = rollup.to_string();
        assert!(rendered.contains("orders"));
        assert!(rendered.contains("invoices"));
        assert!(rollup.into_result().is_err());
    }
}
