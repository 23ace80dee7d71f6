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

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use cheetah_string::CheetahString;
use dashmap::DashMap;
use dashmap::DashSet;
use topomq_error::ManagementError;
use topomq_error::ManagementResult;

use crate::exchange::ExchangeDescriptor;

/// Administrative client to one broker node's management API.
///
/// Concrete transports (the broker's management HTTP API, typically) live
/// outside this crate; the control plane only depends on this seam.
pub trait ManagementClient: Send + Sync {
    /// Declares (creates or asserts) an exchange on a virtual host.
    fn declare_exchange(&self, virtual_host: &str, exchange: &ExchangeDescriptor) -> ManagementResult<()>;

    /// Deletes an exchange from a virtual host. Deleting an absent exchange
    /// is not an error.
    fn delete_exchange(&self, virtual_host: &str, exchange_name: &str) -> ManagementResult<()>;

    /// Whether the broker currently reports the exchange.
    fn exchange_exists(&self, virtual_host: &str, exchange_name: &str) -> ManagementResult<bool>;
}

/// In-memory [`ManagementClient`]: a per-virtual-host set of declared
/// exchanges.
///
/// Used for tests and embedded scenarios. `set_reachable(false)` makes every
/// call fail, simulating an unreachable management endpoint.
#[derive(Debug)]
pub struct MemoryManagementClient {
    exchanges: DashMap<CheetahString, DashSet<CheetahString>>,
    reachable: AtomicBool,
}

impl Default for MemoryManagementClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryManagementClient {
    pub fn new() -> Self {
        MemoryManagementClient {
            exchanges: DashMap::new(),
            reachable: AtomicBool::new(true),
        }
    }

    /// A client whose every call fails with a connection error.
    pub fn unreachable() -> Self {
        let client = MemoryManagementClient::new();
        client.set_reachable(false);
        client
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Drops an exchange behind the control plane's back, simulating broker
    /// state diverging from what a partition believes.
    pub fn drop_exchange(&self, virtual_host: &str, exchange_name: &str) {
        if let Some(exchanges) = self.exchanges.get(virtual_host) {
            exchanges.remove(exchange_name);
        }
    }

    pub fn declared_exchange_count(&self, virtual_host: &str) -> usize {
        self.exchanges.get(virtual_host).map(|set| set.len()).unwrap_or(0)
    }

    fn check_reachable(&self) -> ManagementResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ManagementError::client("management endpoint unreachable"))
        }
    }
}

impl ManagementClient for MemoryManagementClient {
    fn declare_exchange(&self, virtual_host: &str, exchange: &ExchangeDescriptor) -> ManagementResult<()> {
        self.check_reachable()?;
        self.exchanges
            .entry(CheetahString::from(virtual_host))
            .or_default()
            .insert(exchange.name().clone());
        Ok(())
    }

    fn delete_exchange(&self, virtual_host: &str, exchange_name: &str) -> ManagementResult<()> {
        self.check_reachable()?;
        if let Some(exchanges) = self.exchanges.get(virtual_host) {
            exchanges.remove(exchange_name);
        }
        Ok(())
    }

    fn exchange_exists(&self, virtual_host: &str, exchange_name: &str) -> ManagementResult<bool> {
        self.check_reachable()?;
        Ok(self
            .exchanges
            .get(virtual_host)
            .map(|exchanges| exchanges.contains(exchange_name))
            .unwrap_or(false))
    }
}
