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

use cheetah_string::CheetahString;
use serde::Deserialize;
use serde::Serialize;

/// The secure identity of a client: its id plus the flattened ids of every
/// group it belongs to.
///
/// Membership flattening (resolving nested groups into a flat id set) is the
/// authenticator's job; the control plane only consults the flat view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    actor_id: CheetahString,
    membership_ids: Vec<CheetahString>,
}

impl Actor {
    /// An actor with no group memberships.
    pub fn new(actor_id: impl Into<CheetahString>) -> Self {
        Actor {
            actor_id: actor_id.into(),
            membership_ids: Vec::new(),
        }
    }

    /// An actor with flattened group memberships.
    pub fn with_memberships<I, S>(actor_id: impl Into<CheetahString>, membership_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CheetahString>,
    {
        Actor {
            actor_id: actor_id.into(),
            membership_ids: membership_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn actor_id(&self) -> &CheetahString {
        &self.actor_id
    }

    pub fn membership_ids(&self) -> &[CheetahString] {
        &self.membership_ids
    }

    pub fn is_member_of(&self, group_id: &str) -> bool {
        self.membership_ids.iter().any(|id| id.as_str() == group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_lookup() {
        let actor = Actor::with_memberships("alice", ["ops", "dev"]);
        assert_eq!(actor.actor_id().as_str(), "alice");
        assert!(actor.is_member_of("ops"));
        assert!(!actor.is_member_of("finance"));
    }

    #[test]
    fn plain_actor_has_no_memberships() {
        let actor = Actor::new("bob");
        assert!(actor.membership_ids().is_empty());
    }
}
