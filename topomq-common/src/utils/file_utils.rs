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

use std::io;
use std::path::Path;

use parking_lot::Mutex;
use tracing::warn;

static LOCK: Mutex<()> = Mutex::new(());

/// Reads a whole file into a string, failing with `NotFound` (and a warning
/// log) when the file does not exist.
pub fn file_to_string(file_name: &str) -> Result<String, io::Error> {
    let path = Path::new(file_name);
    if !path.exists() {
        warn!("file not exist: {}", file_name);
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("File not found: {}", file_name),
        ));
    }
    std::fs::read_to_string(path)
}

/// Writes `str_content` to `file_name`, keeping a `.bak` copy of the previous
/// content. Parent directories are created as needed. Writers are serialized
/// process-wide.
pub fn string_to_file(str_content: &str, file_name: &str) -> io::Result<()> {
    let _lock = LOCK.lock();

    let file_path = Path::new(file_name);
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if file_path.exists() {
        std::fs::copy(file_name, format!("{file_name}.bak"))?;
    }

    std::fs::write(file_path, str_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let path_str = path.to_str().unwrap();

        string_to_file("{\"a\":1}", path_str).unwrap();
        assert_eq!(file_to_string(path_str).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn rewrite_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let path_str = path.to_str().unwrap();

        string_to_file("one", path_str).unwrap();
        string_to_file("two", path_str).unwrap();

        assert_eq!(file_to_string(path_str).unwrap(), "two");
        assert_eq!(file_to_string(&format!("{path_str}.bak")).unwrap(), "one");
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = file_to_string("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
