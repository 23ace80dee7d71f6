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

//! Actor identity and access-control evaluation.
//!
//! An [`Actor`] is an authenticated identity plus its flattened group
//! memberships. [`AccessControl`] rules decide whether an actor may perform
//! an operation; [`AllowDenyList`] is the standard rule implementation and
//! [`AccessControlList`] maps operation names to rules.

pub use crate::access_control::AccessControl;
pub use crate::access_control::AccessControlList;
pub use crate::actor::Actor;
pub use crate::allow_deny_list::AllowDenyList;
pub use crate::allow_deny_list::DefaultPrivilege;

mod access_control;
mod actor;
mod allow_deny_list;
