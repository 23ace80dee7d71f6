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

use std::sync::Arc;

use cheetah_string::CheetahString;
use dashmap::DashMap;
use topomq_error::ManagementError;
use topomq_error::ManagementResult;

use crate::cluster::Cluster;

/// Process-wide directory of clusters, keyed by cluster id
/// (`name+virtualHost`).
///
/// Partitions reference clusters by id; rehydration resolves those ids
/// through this registry, so a cluster must outlive every partition that
/// names it.
#[derive(Debug, Default)]
pub struct ClusterRegistry {
    clusters: DashMap<CheetahString, Arc<Cluster>>,
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cluster under its id, replacing any previous registration
    /// with the same id.
    pub fn add(&self, cluster: Arc<Cluster>) {
        self.clusters.insert(cluster.cluster_id(), cluster);
    }

    pub fn get(&self, cluster_id: &str) -> ManagementResult<Arc<Cluster>> {
        self.clusters
            .get(cluster_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ManagementError::ClusterNotExist {
                cluster_id: CheetahString::from(cluster_id),
            })
    }

    pub fn contains(&self, cluster_id: &str) -> bool {
        self.clusters.contains_key(cluster_id)
    }

    pub fn remove(&self, cluster_id: &str) -> ManagementResult<Arc<Cluster>> {
        self.clusters
            .remove(cluster_id)
            .map(|(_, cluster)| cluster)
            .ok_or_else(|| ManagementError::ClusterNotExist {
                cluster_id: CheetahString::from(cluster_id),
            })
    }

    pub fn cluster_ids(&self) -> Vec<CheetahString> {
        let mut ids: Vec<CheetahString> = self.clusters.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_miss_carries_cluster_id() {
        let registry = ClusterRegistry::new();
        let err = registry.get("east+/").unwrap_err();
        assert!(matches!(err, ManagementError::ClusterNotExist { cluster_id } if cluster_id.as_str() == "east+/"));
    }

    #[test]
    fn add_get_remove_roundtrip() {
        let registry = ClusterRegistry::new();
        registry.add(Arc::new(Cluster::new("east")));
        assert!(registry.contains("east+/"));
        assert_eq!(registry.get("east+/").unwrap().cluster_name().as_str(), "east");

        registry.remove("east+/").unwrap();
        assert!(!registry.contains("east+/"));
        assert!(registry.remove("east+/").is_err());
    }

    #[test]
    fn cluster_ids_are_sorted() {
        let registry = ClusterRegistry::new();
        registry.add(Arc::new(Cluster::new("west")));
        registry.add(Arc::new(Cluster::new("east")));
        let ids = registry.cluster_ids();
        assert_eq!(ids[0].as_str(), "east+/");
        assert_eq!(ids[1].as_str(), "west+/");
    }
}
