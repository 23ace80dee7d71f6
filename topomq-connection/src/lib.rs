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

//! Data-plane broker connection resilience.
//!
//! [`ConnectionManager`] wraps one live broker connection, serializes
//! channel creation against in-flight reconnection, and retries a lost
//! connection on a background task until the retry window closes.

pub use crate::connection::BrokerConnection;
pub use crate::connection::Channel;
pub use crate::connection::ConnectionFactory;
pub use crate::listener::ConnectionEventListener;
pub use crate::manager::ConnectionManager;
pub use crate::manager::ConnectionManagerConfig;

mod connection;
mod listener;
mod manager;
