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

use cheetah_string::CheetahString;
use dashmap::DashMap;

use crate::actor::Actor;

/// An evaluation of whether an actor should be allowed to do something.
pub trait AccessControl: Send + Sync {
    fn is_allowed(&self, actor: &Actor) -> bool;
}

/// Operation-name -> access-control rule map, mutable at runtime.
///
/// Access control is opt-in per operation: an operation with no registered
/// rule is permitted.
#[derive(Default)]
pub struct AccessControlList {
    rules: DashMap<CheetahString, Arc<dyn AccessControl>>,
}

impl AccessControlList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the rule for an operation.
    pub fn add_access_control(&self, operation: impl Into<CheetahString>, access_control: Arc<dyn AccessControl>) {
        self.rules.insert(operation.into(), access_control);
    }

    /// Removes the rule for an operation, returning whether one was present.
    pub fn remove_access_control(&self, operation: &str) -> bool {
        self.rules.remove(operation).is_some()
    }

    pub fn get_access_control(&self, operation: &str) -> Option<Arc<dyn AccessControl>> {
        self.rules.get(operation).map(|entry| Arc::clone(entry.value()))
    }

    /// Evaluates the rule registered for `operation`; permits when no rule is
    /// registered.
    pub fn is_allowed(&self, operation: &str, actor: &Actor) -> bool {
        match self.rules.get(operation) {
            Some(rule) => rule.is_allowed(actor),
            None => true,
        }
    }

    pub fn operation_count(&self) -> usize {
        self.rules.len()
    }
}

impl std::fmt::Debug for AccessControlList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operations: Vec<CheetahString> = self.rules.iter().map(|e| e.key().clone()).collect();
        f.debug_struct("AccessControlList").field("operations", &operations).finish()
    }
}
