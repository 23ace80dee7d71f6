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

//! Well-known names shared across the control plane.

/// Access-control operation evaluated for publishing clients.
pub const OPERATION_PUBLISH: &str = "publish";

/// Access-control operation evaluated for consuming clients.
pub const OPERATION_CONSUME: &str = "consume";

pub const PROTOCOL_AMQP: &str = "AMQP";
pub const PROTOCOL_WEBSTOMP: &str = "WebStomp";

pub const PATTERN_PUBSUB: &str = "PubSub";
pub const PATTERN_RPC: &str = "RPC";
pub const PATTERN_SCATTER_GATHER: &str = "ScatterGather";

/// Virtual host used by clusters that do not name one explicitly.
pub const DEFAULT_VIRTUAL_HOST: &str = "/";
