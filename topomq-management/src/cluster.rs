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

//! A group of clustered brokers on the same virtual host.

use std::sync::Arc;

use cheetah_string::CheetahString;
use parking_lot::RwLock;
use topomq_error::EndpointFailures;
use topomq_error::ManagementError;
use topomq_error::ManagementResult;
use tracing::info;
use tracing::warn;

use crate::broker::Broker;
use crate::endpoint::ManagementEndpoint;
use crate::task::ManagementTask;

/// Hooks into the cluster lifecycle. Callbacks fire synchronously after the
/// mutation completes successfully, against a snapshot of the listener set.
pub trait ClusterListener: Send + Sync {
    fn on_broker_added(&self, cluster: &Cluster, broker: &Broker);
    fn on_broker_removed(&self, cluster: &Cluster, broker: &Broker);
    fn on_management_endpoint_added(&self, cluster: &Cluster, endpoint: &ManagementEndpoint);
    fn on_management_endpoint_removed(&self, cluster: &Cluster, endpoint: &ManagementEndpoint);
}

/// A named group of data brokers sharing a virtual host, administered
/// through a set of management endpoints.
///
/// Endpoints are kept in insertion order; task failover walks them in that
/// order, so the attempt sequence is deterministic for a given call.
pub struct Cluster {
    cluster_name: CheetahString,
    virtual_host: CheetahString,
    brokers: RwLock<Vec<Broker>>,
    endpoints: RwLock<Vec<ManagementEndpoint>>,
    listeners: RwLock<Vec<Arc<dyn ClusterListener>>>,
}

impl Cluster {
    /// A cluster on the default virtual host ("/").
    pub fn new(cluster_name: impl Into<CheetahString>) -> Self {
        Cluster::with_virtual_host(cluster_name, topomq_common::constants::DEFAULT_VIRTUAL_HOST)
    }

    pub fn with_virtual_host(cluster_name: impl Into<CheetahString>, virtual_host: impl Into<CheetahString>) -> Self {
        Cluster {
            cluster_name: cluster_name.into(),
            virtual_host: virtual_host.into(),
            brokers: RwLock::new(Vec::new()),
            endpoints: RwLock::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// `name+virtualHost`, the cluster's identity.
    pub fn cluster_id(&self) -> CheetahString {
        CheetahString::from(format!("{}+{}", self.cluster_name, self.virtual_host))
    }

    pub fn cluster_name(&self) -> &CheetahString {
        &self.cluster_name
    }

    pub fn virtual_host(&self) -> &CheetahString {
        &self.virtual_host
    }

    /// Rejects a broker whose virtual host differs from the cluster's.
    pub fn validate(&self, broker: &Broker) -> ManagementResult<()> {
        if broker.virtual_host() != &self.virtual_host {
            return Err(ManagementError::VirtualHostMismatch {
                cluster_id: self.cluster_id(),
                broker_id: broker.broker_id(),
                broker_virtual_host: broker.virtual_host().clone(),
                cluster_virtual_host: self.virtual_host.clone(),
            });
        }
        Ok(())
    }

    /// Adds a broker, returning whether it was newly added. Listeners fire
    /// only for an actual addition.
    pub fn add_broker(&self, broker: Broker) -> ManagementResult<bool> {
        self.validate(&broker)?;
        {
            let mut brokers = self.brokers.write();
            if brokers.contains(&broker) {
                return Ok(false);
            }
            brokers.push(broker.clone());
        }
        info!("broker {} added to cluster {}", broker.broker_id(), self.cluster_id());
        for listener in self.listener_snapshot() {
            listener.on_broker_added(self, &broker);
        }
        Ok(true)
    }

    /// Removes a broker, returning whether it was present.
    pub fn remove_broker(&self, broker: &Broker) -> bool {
        let removed = {
            let mut brokers = self.brokers.write();
            let before = brokers.len();
            brokers.retain(|b| b != broker);
            brokers.len() != before
        };
        if removed {
            info!("broker {} removed from cluster {}", broker.broker_id(), self.cluster_id());
            for listener in self.listener_snapshot() {
                listener.on_broker_removed(self, broker);
            }
        }
        removed
    }

    pub fn brokers(&self) -> Vec<Broker> {
        self.brokers.read().clone()
    }

    pub fn broker_count(&self) -> usize {
        self.brokers.read().len()
    }

    /// Adds a management endpoint; fails if one with the same id is present.
    pub fn add_management_endpoint(&self, endpoint: ManagementEndpoint) -> ManagementResult<()> {
        let endpoint_id = endpoint.endpoint_id();
        {
            let mut endpoints = self.endpoints.write();
            if endpoints.iter().any(|e| e.endpoint_id() == endpoint_id) {
                return Err(ManagementError::EndpointAlreadyExists {
                    cluster_id: self.cluster_id(),
                    endpoint_id,
                });
            }
            endpoints.push(endpoint.clone());
        }
        info!("management endpoint {} added to cluster {}", endpoint_id, self.cluster_id());
        for listener in self.listener_snapshot() {
            listener.on_management_endpoint_added(self, &endpoint);
        }
        Ok(())
    }

    /// Removes a management endpoint by id; fails (leaving the set
    /// untouched) if no endpoint has that id.
    pub fn remove_management_endpoint(&self, endpoint_id: &str) -> ManagementResult<()> {
        let removed = {
            let mut endpoints = self.endpoints.write();
            match endpoints.iter().position(|e| e.endpoint_id().as_str() == endpoint_id) {
                Some(index) => endpoints.remove(index),
                None => {
                    return Err(ManagementError::EndpointNotExist {
                        cluster_id: self.cluster_id(),
                        endpoint_id: CheetahString::from(endpoint_id),
                    })
                }
            }
        };
        info!(
            "management endpoint {} removed from cluster {}",
            removed.endpoint_id(),
            self.cluster_id()
        );
        for listener in self.listener_snapshot() {
            listener.on_management_endpoint_removed(self, &removed);
        }
        Ok(())
    }

    pub fn management_endpoints(&self) -> Vec<ManagementEndpoint> {
        self.endpoints.read().clone()
    }

    pub fn management_endpoint_count(&self) -> usize {
        self.endpoints.read().len()
    }

    /// Executes a management task against the cluster's endpoints, failing
    /// only if no endpoint succeeds.
    ///
    /// Endpoints belong to a single broker cluster, so a change made through
    /// any one endpoint affects the whole cluster; the first success is
    /// returned and the remaining endpoints are not consulted. Per-endpoint
    /// failures are logged and aggregated into
    /// [`ManagementError::TaskFailedOnAllEndpoints`] if every endpoint fails.
    pub fn execute_management_task<T: ManagementTask>(&self, task: &T) -> ManagementResult<T::Output> {
        let endpoints = self.management_endpoints();
        let mut failures = EndpointFailures::default();
        for endpoint in &endpoints {
            match task.execute(endpoint.client()) {
                Ok(output) => return Ok(output),
                Err(cause) => {
                    warn!(
                        "management task failed on endpoint {} of cluster {}: {}",
                        endpoint.endpoint_id(),
                        self.cluster_id(),
                        cause
                    );
                    failures.push(endpoint.endpoint_id(), cause);
                }
            }
        }
        Err(ManagementError::TaskFailedOnAllEndpoints {
            cluster_id: self.cluster_id(),
            failures,
        })
    }

    pub fn add_listener(&self, listener: Arc<dyn ClusterListener>) {
        self.listeners.write().push(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ClusterListener>) {
        self.listeners.write().retain(|l| !Arc::ptr_eq(l, listener));
    }

    fn listener_snapshot(&self) -> Vec<Arc<dyn ClusterListener>> {
        self.listeners.read().clone()
    }
}

impl std::fmt::Debug for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cluster")
            .field("cluster_id", &self.cluster_id())
            .field("brokers", &self.broker_count())
            .field("management_endpoints", &self.management_endpoint_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::client::ManagementClient;
    use crate::client::MemoryManagementClient;
    use crate::exchange::ExchangeDescriptor;
    use crate::exchange::ExchangeKind;

    fn endpoint(host: &str, client: Arc<MemoryManagementClient>) -> ManagementEndpoint {
        ManagementEndpoint::new(host, 15672, client)
    }

    mockall::mock! {
        Client {}

        impl ManagementClient for Client {
            fn declare_exchange(&self, virtual_host: &str, exchange: &ExchangeDescriptor) -> ManagementResult<()>;
            fn delete_exchange(&self, virtual_host: &str, exchange_name: &str) -> ManagementResult<()>;
            fn exchange_exists(&self, virtual_host: &str, exchange_name: &str) -> ManagementResult<bool>;
        }
    }

    #[derive(Default)]
    struct CountingListener {
        brokers_added: AtomicUsize,
        brokers_removed: AtomicUsize,
        endpoints_added: AtomicUsize,
        endpoints_removed: AtomicUsize,
    }

    impl ClusterListener for CountingListener {
        fn on_broker_added(&self, _cluster: &Cluster, _broker: &Broker) {
            self.brokers_added.fetch_add(1, Ordering::SeqCst);
        }
        fn on_broker_removed(&self, _cluster: &Cluster, _broker: &Broker) {
            self.brokers_removed.fetch_add(1, Ordering::SeqCst);
        }
        fn on_management_endpoint_added(&self, _cluster: &Cluster, _endpoint: &ManagementEndpoint) {
            self.endpoints_added.fetch_add(1, Ordering::SeqCst);
        }
        fn on_management_endpoint_removed(&self, _cluster: &Cluster, _endpoint: &ManagementEndpoint) {
            self.endpoints_removed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn cluster_id_combines_name_and_virtual_host() {
        let cluster = Cluster::with_virtual_host("east", "/prod");
        assert_eq!(cluster.cluster_id().as_str(), "east+/prod");
    }

    #[test]
    fn validate_rejects_foreign_virtual_host() {
        let cluster = Cluster::with_virtual_host("east", "/prod");
        let foreign = Broker::new("east", "/staging", "rabbit1", 5672);
        let err = cluster.add_broker(foreign).unwrap_err();
        assert!(matches!(err, ManagementError::VirtualHostMismatch { .. }));
        assert_eq!(cluster.broker_count(), 0);
    }

    #[test]
    fn duplicate_broker_is_not_re_added() {
        let cluster = Cluster::new("east");
        let broker = Broker::on_default_virtual_host("east", "rabbit1", 5672);
        assert!(cluster.add_broker(broker.clone()).unwrap());
        assert!(!cluster.add_broker(broker).unwrap());
        assert_eq!(cluster.broker_count(), 1);
    }

    #[test]
    fn listeners_fire_after_successful_mutations_only() {
        let cluster = Cluster::new("east");
        let listener = Arc::new(CountingListener::default());
        cluster.add_listener(listener.clone());

        let broker = Broker::on_default_virtual_host("east", "rabbit1", 5672);
        cluster.add_broker(broker.clone()).unwrap();
        cluster.add_broker(broker.clone()).unwrap(); // duplicate, no event
        cluster.remove_broker(&broker);
        cluster.remove_broker(&broker); // absent, no event

        cluster
            .add_management_endpoint(endpoint("rabbit1", Arc::new(MemoryManagementClient::new())))
            .unwrap();
        cluster.remove_management_endpoint("rabbit1:15672").unwrap();
        assert!(cluster.remove_management_endpoint("rabbit1:15672").is_err());

        assert_eq!(listener.brokers_added.load(Ordering::SeqCst), 1);
        assert_eq!(listener.brokers_removed.load(Ordering::SeqCst), 1);
        assert_eq!(listener.endpoints_added.load(Ordering::SeqCst), 1);
        assert_eq!(listener.endpoints_removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duplicate_endpoint_id_is_rejected() {
        let cluster = Cluster::new("east");
        cluster
            .add_management_endpoint(endpoint("rabbit1", Arc::new(MemoryManagementClient::new())))
            .unwrap();
        let err = cluster
            .add_management_endpoint(endpoint("rabbit1", Arc::new(MemoryManagementClient::new())))
            .unwrap_err();
        assert!(matches!(err, ManagementError::EndpointAlreadyExists { .. }));
        assert_eq!(cluster.management_endpoint_count(), 1);
    }

    #[test]
    fn removing_unknown_endpoint_leaves_set_untouched() {
        let cluster = Cluster::new("east");
        cluster
            .add_management_endpoint(endpoint("rabbit1", Arc::new(MemoryManagementClient::new())))
            .unwrap();
        let err = cluster.remove_management_endpoint("rabbit9:15672").unwrap_err();
        assert!(matches!(err, ManagementError::EndpointNotExist { .. }));
        assert_eq!(cluster.management_endpoint_count(), 1);
    }

    #[test]
    fn task_succeeds_on_first_healthy_endpoint() {
        let cluster = Cluster::new("east");
        let healthy = Arc::new(MemoryManagementClient::new());
        cluster
            .add_management_endpoint(endpoint("rabbit1", Arc::new(MemoryManagementClient::unreachable())))
            .unwrap();
        cluster
            .add_management_endpoint(endpoint("rabbit2", Arc::new(MemoryManagementClient::unreachable())))
            .unwrap();
        cluster.add_management_endpoint(endpoint("rabbit3", healthy.clone())).unwrap();

        let exchange = ExchangeDescriptor::new("orders.outbound", ExchangeKind::Topic);
        let task = |client: &dyn ManagementClient| client.declare_exchange("/", &exchange);
        cluster.execute_management_task(&task).unwrap();

        assert!(healthy.exchange_exists("/", "orders.outbound").unwrap());
    }

    #[test]
    fn task_failing_everywhere_aggregates_all_causes() {
        let cluster = Cluster::new("east");
        cluster
            .add_management_endpoint(endpoint("rabbit1", Arc::new(MemoryManagementClient::unreachable())))
            .unwrap();
        cluster
            .add_management_endpoint(endpoint("rabbit2", Arc::new(MemoryManagementClient::unreachable())))
            .unwrap();

        let task = |client: &dyn ManagementClient| client.exchange_exists("/", "orders.outbound");
        let err = cluster.execute_management_task(&task).unwrap_err();
        match err {
            ManagementError::TaskFailedOnAllEndpoints { cluster_id, failures } => {
                assert_eq!(cluster_id.as_str(), "east+/");
                assert_eq!(failures.len(), 2);
                assert_eq!(failures.iter().next().unwrap().endpoint_id.as_str(), "rabbit1:15672");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn first_success_short_circuits_remaining_endpoints() {
        let cluster = Cluster::new("east");
        let mut first = MockClient::new();
        first.expect_exchange_exists().times(1).returning(|_, _| Ok(true));
        let mut second = MockClient::new();
        second.expect_exchange_exists().never();
        cluster
            .add_management_endpoint(ManagementEndpoint::new("rabbit1", 15672, Arc::new(first)))
            .unwrap();
        cluster
            .add_management_endpoint(ManagementEndpoint::new("rabbit2", 15672, Arc::new(second)))
            .unwrap();

        let task = |client: &dyn ManagementClient| client.exchange_exists("/", "orders.outbound");
        assert!(cluster.execute_management_task(&task).unwrap());
    }

    #[test]
    fn endpointless_cluster_fails_with_empty_aggregate() {
        let cluster = Cluster::new("east");
        let task = |client: &dyn ManagementClient| client.exchange_exists("/", "orders.outbound");
        let err = cluster.execute_management_task(&task).unwrap_err();
        assert!(matches!(
            err,
            ManagementError::TaskFailedOnAllEndpoints { ref failures, .. } if failures.is_empty()
        ));
    }
}
