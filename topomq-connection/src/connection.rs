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

use topomq_error::ConnectionResult;

/// An opaque handle to a broker channel, multiplexed over one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channel {
    channel_id: u64,
}

impl Channel {
    pub fn new(channel_id: u64) -> Self {
        Channel { channel_id }
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }
}

/// One live connection to a data broker.
///
/// Implemented by the wire-protocol layer; the control plane only opens
/// channels and closes the connection through this seam.
pub trait BrokerConnection: Send + Sync {
    fn create_channel(&self) -> ConnectionResult<Channel>;

    fn is_open(&self) -> bool;

    /// Application-initiated close. Never triggers reconnection.
    fn close(&self);
}

/// Produces fresh broker connections, both for initial connect and for
/// every reconnect attempt.
#[trait_variant::make(ConnectionFactory: Send)]
pub trait LocalConnectionFactory {
    type Connection: BrokerConnection;

    async fn new_connection(&self) -> ConnectionResult<Self::Connection>;
}
