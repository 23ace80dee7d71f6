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

//! Errors raised by the data-plane connection manager.

use thiserror::Error;

pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to connect to broker: {0}")]
    ConnectFailed(String),

    #[error("connection is closed")]
    NotConnected,

    #[error("reconnect window exhausted; connection manager is permanently disconnected")]
    PermanentlyDisconnected,

    #[error("channel creation failed: {0}")]
    ChannelCreationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_error_is_self_describing() {
        assert!(ConnectionError::PermanentlyDisconnected
            .to_string()
            .contains("permanently disconnected"));
    }
}
