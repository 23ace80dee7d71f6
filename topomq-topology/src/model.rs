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

//! The topology domain model.

pub use self::connector::Connector;
pub use self::group::GroupRole;
pub use self::group::TopologyGroup;
pub use self::partition::Partition;
pub use self::partition::PartitionState;
pub use self::topic::GroupExistence;
pub use self::topic::Topic;

mod connector;
mod group;
mod partition;
mod topic;
