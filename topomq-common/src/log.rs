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

use std::str::FromStr;

/// Initializes the logger.
///
/// Sets up `tracing_subscriber` fmt output. The log level is read from the
/// `RUST_LOG` environment variable, defaulting to "INFO" if not set. Thread
/// names, levels and line numbers are included in the output.
pub fn init_logger() {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| String::from("INFO"));
    init_logger_with_level(tracing::Level::from_str(level.as_str()).unwrap_or(tracing::Level::INFO));
}

/// Initializes the logger at an explicit level, ignoring `RUST_LOG`.
pub fn init_logger_with_level(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_level(true)
        .with_line_number(true)
        .with_max_level(level)
        .init();
}
