// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SmartDefault)]
#[serde(default)]
pub struct ConsumeQueueConfig {
    /// Log every probe of the physical offset search at `warn`.
    pub enable_search_log: bool,
    /// Most keys one range read asks the store for. Longer requests are
    /// clamped and still answer with a contiguous prefix.
    #[default = 1024]
    pub max_range_count:   usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConsumeQueueConfig::default();
        assert!(!config.enable_search_log);
        assert_eq!(config.max_range_count, 1024);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ConsumeQueueConfig =
            serde_json::from_str(r#"{"enable_search_log":true}"#).unwrap();
        assert!(config.enable_search_log);
        assert_eq!(config.max_range_count, 1024);
    }
}
