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
use dashmap::DashSet;
use parking_lot::RwLock;
use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use strum::EnumString;

use crate::access_control::AccessControl;
use crate::actor::Actor;

/// How the allow/deny sets combine when no explicit entry matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum DefaultPrivilege {
    /// No default privilege: if you are not allowed, you're denied.
    /// Behaves the same as `DenyAllImplicitAllow`.
    #[default]
    None,
    /// Allow anyone, but deny actors on the denied-actors list or belonging
    /// to a denied group.
    AllowAllImplicitDeny,
    /// Allow anyone, but deny only actors on the denied-actors list.
    AllowAllExplicitDeny,
    /// Deny everyone unless on the allowed-actors or allowed-groups list.
    DenyAllImplicitAllow,
    /// Deny everyone unless on the allowed-actors list.
    DenyAllExplicitAllow,
}

/// An access-control entry: whether an actor or group is allowed to perform
/// an operation.
///
/// The allow and deny sets are mutually exclusive: allowing an id removes it
/// from the corresponding deny set and vice versa.
#[derive(Debug, Default)]
pub struct AllowDenyList {
    default_privilege: RwLock<DefaultPrivilege>,
    allowed_actors: DashSet<CheetahString>,
    allowed_groups: DashSet<CheetahString>,
    denied_actors: DashSet<CheetahString>,
    denied_groups: DashSet<CheetahString>,
}

impl AllowDenyList {
    pub fn new(default_privilege: DefaultPrivilege) -> Self {
        AllowDenyList {
            default_privilege: RwLock::new(default_privilege),
            ..Default::default()
        }
    }

    /// Initialize with pre-populated sets. Empty collections are valid for
    /// any of the four lists.
    pub fn with_entries<A, G, DA, DG>(
        default_privilege: DefaultPrivilege,
        allowed_actors: A,
        allowed_groups: G,
        denied_actors: DA,
        denied_groups: DG,
    ) -> Self
    where
        A: IntoIterator<Item = CheetahString>,
        G: IntoIterator<Item = CheetahString>,
        DA: IntoIterator<Item = CheetahString>,
        DG: IntoIterator<Item = CheetahString>,
    {
        let list = AllowDenyList::new(default_privilege);
        for id in allowed_actors {
            list.allowed_actors.insert(id);
        }
        for id in allowed_groups {
            list.allowed_groups.insert(id);
        }
        for id in denied_actors {
            list.denied_actors.insert(id);
        }
        for id in denied_groups {
            list.denied_groups.insert(id);
        }
        list
    }

    pub fn default_privilege(&self) -> DefaultPrivilege {
        *self.default_privilege.read()
    }

    pub fn set_default_privilege(&self, default_privilege: DefaultPrivilege) {
        *self.default_privilege.write() = default_privilege;
    }

    pub fn allow_actor(&self, actor_id: impl Into<CheetahString>) {
        Self::synchronize_sets(&self.allowed_actors, &self.denied_actors, actor_id.into());
    }

    pub fn allow_group(&self, group_id: impl Into<CheetahString>) {
        Self::synchronize_sets(&self.allowed_groups, &self.denied_groups, group_id.into());
    }

    pub fn deny_actor(&self, actor_id: impl Into<CheetahString>) {
        Self::synchronize_sets(&self.denied_actors, &self.allowed_actors, actor_id.into());
    }

    pub fn deny_group(&self, group_id: impl Into<CheetahString>) {
        Self::synchronize_sets(&self.denied_groups, &self.allowed_groups, group_id.into());
    }

    pub fn allowed_actors(&self) -> Vec<CheetahString> {
        self.allowed_actors.iter().map(|id| id.key().clone()).collect()
    }

    pub fn allowed_groups(&self) -> Vec<CheetahString> {
        self.allowed_groups.iter().map(|id| id.key().clone()).collect()
    }

    pub fn denied_actors(&self) -> Vec<CheetahString> {
        self.denied_actors.iter().map(|id| id.key().clone()).collect()
    }

    pub fn denied_groups(&self) -> Vec<CheetahString> {
        self.denied_groups.iter().map(|id| id.key().clone()).collect()
    }

    /// Moves `id` into `target`, removing it from `opposite` first so an id
    /// is never on both sides of the ledger.
    fn synchronize_sets(target: &DashSet<CheetahString>, opposite: &DashSet<CheetahString>, id: CheetahString) {
        opposite.remove(&id);
        target.insert(id);
    }

    fn disjoint(set: &DashSet<CheetahString>, memberships: &[CheetahString]) -> bool {
        !memberships.iter().any(|id| set.contains(id))
    }
}

impl AccessControl for AllowDenyList {
    fn is_allowed(&self, actor: &Actor) -> bool {
        match self.default_privilege() {
            // permit unless the actor is on the denied-actors list or belongs
            // to a denied group
            DefaultPrivilege::AllowAllImplicitDeny => {
                !self.denied_actors.contains(actor.actor_id())
                    && Self::disjoint(&self.denied_groups, actor.membership_ids())
            }
            // permit unless the actor is on the denied-actors list
            DefaultPrivilege::AllowAllExplicitDeny => !self.denied_actors.contains(actor.actor_id()),
            // permit only if the actor is on the allowed-actors list
            DefaultPrivilege::DenyAllExplicitAllow => self.allowed_actors.contains(actor.actor_id()),
            // permit if the actor is on the allowed-actors list or belongs to
            // an allowed group; `None` behaves the same way
            DefaultPrivilege::DenyAllImplicitAllow | DefaultPrivilege::None => {
                self.allowed_actors.contains(actor.actor_id())
                    || !Self::disjoint(&self.allowed_groups, actor.membership_ids())
            }
        }
    }
}
