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
use topomq_common::constants::DEFAULT_VIRTUAL_HOST;

/// A data broker node: the host/port a client connects to for message
/// traffic, scoped to one cluster and virtual host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Broker {
    cluster_name: CheetahString,
    virtual_host: CheetahString,
    host: CheetahString,
    port: u16,
    use_ssl: bool,
}

impl Broker {
    pub fn new(
        cluster_name: impl Into<CheetahString>,
        virtual_host: impl Into<CheetahString>,
        host: impl Into<CheetahString>,
        port: u16,
    ) -> Self {
        Broker {
            cluster_name: cluster_name.into(),
            virtual_host: virtual_host.into(),
            host: host.into(),
            port,
            use_ssl: false,
        }
    }

    /// A broker on the default virtual host.
    pub fn on_default_virtual_host(cluster_name: impl Into<CheetahString>, host: impl Into<CheetahString>, port: u16) -> Self {
        Broker::new(cluster_name, DEFAULT_VIRTUAL_HOST, host, port)
    }

    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    /// `host:port`, the broker's identity within a cluster.
    pub fn broker_id(&self) -> CheetahString {
        CheetahString::from(format!("{}:{}", self.host, self.port))
    }

    pub fn cluster_name(&self) -> &CheetahString {
        &self.cluster_name
    }

    pub fn virtual_host(&self) -> &CheetahString {
        &self.virtual_host
    }

    pub fn host(&self) -> &CheetahString {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn use_ssl(&self) -> bool {
        self.use_ssl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_id_is_host_and_port() {
        let broker = Broker::new("east", "/", "rabbit1.internal", 5672);
        assert_eq!(broker.broker_id().as_str(), "rabbit1.internal:5672");
        assert!(!broker.use_ssl());
    }

    #[test]
    fn default_virtual_host_constructor() {
        let broker = Broker::on_default_virtual_host("east", "rabbit1", 5671).with_ssl(true);
        assert_eq!(broker.virtual_host().as_str(), "/");
        assert!(broker.use_ssl());
    }
}
