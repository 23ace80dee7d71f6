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
use strum::Display;
use strum::EnumString;

/// Routing behavior of a broker-side exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    Direct,
    Fanout,
    #[default]
    Topic,
    Headers,
}

/// The declarative shape of a broker-side exchange, as provisioned through
/// the management plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeDescriptor {
    name: CheetahString,
    kind: ExchangeKind,
    durable: bool,
    auto_delete: bool,
}

impl ExchangeDescriptor {
    /// A durable, non-auto-delete exchange.
    pub fn new(name: impl Into<CheetahString>, kind: ExchangeKind) -> Self {
        ExchangeDescriptor {
            name: name.into(),
            kind,
            durable: true,
            auto_delete: false,
        }
    }

    pub fn durable(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    pub fn auto_delete(mut self, auto_delete: bool) -> Self {
        self.auto_delete = auto_delete;
        self
    }

    pub fn name(&self) -> &CheetahString {
        &self.name
    }

    pub fn kind(&self) -> ExchangeKind {
        self.kind
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn is_auto_delete(&self) -> bool {
        self.auto_delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_durable_non_auto_delete() {
        let exchange = ExchangeDescriptor::new("orders.outbound", ExchangeKind::Topic);
        assert!(exchange.is_durable());
        assert!(!exchange.is_auto_delete());
        assert_eq!(exchange.kind().to_string(), "topic");
    }

    #[test]
    fn kind_parses_from_lowercase() {
        let kind: ExchangeKind = "fanout".parse().unwrap();
        assert_eq!(kind, ExchangeKind::Fanout);
    }
}
