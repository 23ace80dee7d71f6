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

use std::fmt;
use std::sync::Arc;

use cheetah_string::CheetahString;

use crate::client::ManagementClient;

/// An administrative connection to one broker node's management API.
#[derive(Clone)]
pub struct ManagementEndpoint {
    hostname: CheetahString,
    port: u16,
    use_ssl: bool,
    client: Arc<dyn ManagementClient>,
}

impl ManagementEndpoint {
    pub fn new(hostname: impl Into<CheetahString>, port: u16, client: Arc<dyn ManagementClient>) -> Self {
        ManagementEndpoint {
            hostname: hostname.into(),
            port,
            use_ssl: false,
            client,
        }
    }

    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    /// `hostname:port`, the endpoint's identity within a cluster.
    pub fn endpoint_id(&self) -> CheetahString {
        CheetahString::from(format!("{}:{}", self.hostname, self.port))
    }

    pub fn hostname(&self) -> &CheetahString {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn use_ssl(&self) -> bool {
        self.use_ssl
    }

    pub fn client(&self) -> &dyn ManagementClient {
        self.client.as_ref()
    }
}

impl fmt::Debug for ManagementEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagementEndpoint")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryManagementClient;

    #[test]
    fn endpoint_id_is_hostname_and_port() {
        let endpoint = ManagementEndpoint::new("rabbit1.internal", 15672, Arc::new(MemoryManagementClient::new()));
        assert_eq!(endpoint.endpoint_id().as_str(), "rabbit1.internal:15672");
        assert!(!endpoint.use_ssl());
    }
}
