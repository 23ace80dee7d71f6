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

/// Observes data-plane connectivity changes.
///
/// Callbacks run on the manager's task; keep them short.
pub trait ConnectionEventListener: Send + Sync {
    /// The connection closed. `should_reconnect` is false for
    /// application-initiated shutdown, true for unexpected loss (the
    /// manager is about to start reconnecting).
    fn on_connection_closed(&self, should_reconnect: bool);

    /// A reconnect attempt succeeded; the connection is live again.
    fn on_connection_reconnected(&self);
}
