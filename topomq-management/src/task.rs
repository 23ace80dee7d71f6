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

use topomq_error::ManagementResult;

use crate::client::ManagementClient;

/// A unit of work executed against one broker's administrative client.
///
/// Consumed by [`Cluster::execute_management_task`](crate::Cluster::execute_management_task),
/// which retries the task across the cluster's endpoints. Any
/// `Fn(&dyn ManagementClient) -> ManagementResult<R>` closure is a task:
///
/// ```
/// use topomq_management::ManagementClient;
/// use topomq_management::ManagementTask;
/// # use topomq_error::ManagementResult;
///
/// let task = |client: &dyn ManagementClient| client.exchange_exists("/", "orders.outbound");
/// ```
pub trait ManagementTask {
    type Output;

    fn execute(&self, client: &dyn ManagementClient) -> ManagementResult<Self::Output>;
}

impl<F, R> ManagementTask for F
where
    F: Fn(&dyn ManagementClient) -> ManagementResult<R>,
{
    type Output = R;

    fn execute(&self, client: &dyn ManagementClient) -> ManagementResult<R> {
        self(client)
    }
}
