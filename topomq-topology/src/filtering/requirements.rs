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

use std::collections::HashMap;

use cheetah_string::CheetahString;
use strum::Display;
use strum::EnumString;
use topomq_access::Actor;
use topomq_common::constants::OPERATION_CONSUME;
use topomq_common::constants::OPERATION_PUBLISH;

/// Is the client publishing or consuming?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum RouteDirection {
    Publish,
    Consume,
}

impl RouteDirection {
    /// The access-control operation evaluated for this direction.
    pub fn operation(&self) -> &'static str {
        match self {
            RouteDirection::Publish => OPERATION_PUBLISH,
            RouteDirection::Consume => OPERATION_CONSUME,
        }
    }
}

/// What a client wants to do: topic, protocol, messaging pattern, direction
/// and the requesting identity.
///
/// Read-only once built. Additional requirement properties travel in the
/// attribute view, preserving whatever the transport-level adaptor decoded
/// without the engine having to understand it.
#[derive(Debug, Clone)]
pub struct RouteRequirements {
    topic: CheetahString,
    protocol: CheetahString,
    message_pattern: CheetahString,
    direction: RouteDirection,
    actor: Actor,
    attributes: HashMap<CheetahString, CheetahString>,
}

impl RouteRequirements {
    pub fn new(
        topic: impl Into<CheetahString>,
        protocol: impl Into<CheetahString>,
        message_pattern: impl Into<CheetahString>,
        direction: RouteDirection,
        actor: Actor,
    ) -> Self {
        RouteRequirements {
            topic: topic.into(),
            protocol: protocol.into(),
            message_pattern: message_pattern.into(),
            direction,
            actor,
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<CheetahString>, value: impl Into<CheetahString>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn topic(&self) -> &CheetahString {
        &self.topic
    }

    pub fn protocol(&self) -> &CheetahString {
        &self.protocol
    }

    pub fn message_pattern(&self) -> &CheetahString {
        &self.message_pattern
    }

    pub fn direction(&self) -> RouteDirection {
        self.direction
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn attribute(&self, key: &str) -> Option<&CheetahString> {
        self.attributes.get(key)
    }
}

#[cfg(test)]
mod tests {
    use topomq_common::constants::PATTERN_PUBSUB;
    use topomq_common::constants::PROTOCOL_AMQP;

    use super::*;

    #[test]
    fn direction_maps_to_operation() {
        assert_eq!(RouteDirection::Publish.operation(), "publish");
        assert_eq!(RouteDirection::Consume.operation(), "consume");
    }

    #[test]
    fn attributes_round_trip() {
        let requirements = RouteRequirements::new(
            "orders",
            PROTOCOL_AMQP,
            PATTERN_PUBSUB,
            RouteDirection::Publish,
            Actor::new("svcA"),
        )
        .with_attribute("client-version", "3.3.0");

        assert_eq!(requirements.topic().as_str(), "orders");
        assert_eq!(requirements.attribute("client-version").unwrap().as_str(), "3.3.0");
        assert!(requirements.attribute("missing").is_none());
    }
}
