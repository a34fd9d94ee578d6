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

//! Hand-off from the commit log dispatcher.

use crate::{
    key,
    unit::{CQ_UNIT_SIZE, ConsumeQueueUnit},
};

/// A message decoded from the commit log, ready to be indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub topic:                String,
    pub queue_id:             i32,
    pub consume_queue_offset: u64,
    pub commit_log_offset:    u64,
    pub msg_size:             u32,
    pub tags_code:            i64,
    pub store_timestamp:      i64,
}

impl From<&DispatchRequest> for ConsumeQueueUnit {
    fn from(request: &DispatchRequest) -> Self {
        Self {
            physical_offset: request.commit_log_offset,
            message_size:    request.msg_size,
            tags_code:       request.tags_code,
            store_timestamp: request.store_timestamp,
            queue_offset:    request.consume_queue_offset,
        }
    }
}

/// Reusable key/value buffers for the write path.
///
/// A dispatcher keeps one per thread and passes it to every append, so
/// encoding a unit allocates only when a topic is longer than any seen
/// before.
#[derive(Debug, Clone)]
pub struct UnitScratch {
    pub(crate) key:   Vec<u8>,
    pub(crate) value: [u8; CQ_UNIT_SIZE],
}

impl UnitScratch {
    pub fn new() -> Self { Self::with_topic_capacity(0) }

    /// Pre-sizes the key buffer for topics of up to `topic_len` bytes.
    pub fn with_topic_capacity(topic_len: usize) -> Self {
        Self {
            key:   Vec::with_capacity(key::unit_key_size(topic_len)),
            value: [0; CQ_UNIT_SIZE],
        }
    }

    /// Capacity of the key buffer, in bytes.
    pub fn key_capacity(&self) -> usize { self.key.capacity() }
}

impl Default for UnitScratch {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::UNIT_KEY_FIXED_SIZE;

    #[test]
    fn test_unit_from_request() {
        let request = DispatchRequest {
            topic:                "T".to_string(),
            queue_id:             1,
            consume_queue_offset: 7,
            commit_log_offset:    4096,
            msg_size:             128,
            tags_code:            99,
            store_timestamp:      1_000,
        };

        let unit = ConsumeQueueUnit::from(&request);
        assert_eq!(unit.physical_offset, 4096);
        assert_eq!(unit.message_size, 128);
        assert_eq!(unit.tags_code, 99);
        assert_eq!(unit.store_timestamp, 1_000);
        assert_eq!(unit.queue_offset, 7);
    }

    #[test]
    fn test_scratch_capacity() {
        let scratch = UnitScratch::with_topic_capacity(16);
        assert!(scratch.key_capacity() >= UNIT_KEY_FIXED_SIZE + 16);
    }
}
