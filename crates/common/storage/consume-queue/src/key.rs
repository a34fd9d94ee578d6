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

//! Ordered key layout for consume queue units.
//!
//! ## Unit Key
//!
//! ```text
//! ┌────────────────┬────────┬───────────────┬────────┬─────────────┬────────┬──────────────────┐
//! │ Topic Len (4B) │ CTRL_1 │ Topic (n B)   │ CTRL_1 │ QueueId (4B)│ CTRL_1 │ Queue Offset (8B)│
//! └────────────────┴────────┴───────────────┴────────┴─────────────┴────────┴──────────────────┘
//! ```
//!
//! All integers are big-endian, so for one `(topic, queue_id)` the byte order
//! of keys is the numeric order of their queue offsets.
//!
//! ## Partition Bound Key
//!
//! ```text
//! ┌────────────────┬────────┬───────────────┬────────┬─────────────┬─────────────────┐
//! │ Topic Len (4B) │ CTRL_1 │ Topic (n B)   │ CTRL_1 │ QueueId (4B)│ CTRL_0 / CTRL_2 │
//! └────────────────┴────────┴───────────────┴────────┴─────────────┴─────────────────┘
//! ```
//!
//! The trailing sentinel replaces `CTRL_1 + offset`. `CTRL_0 < CTRL_1 <
//! CTRL_2`, so the start bound sorts before every unit key of the partition
//! and the end bound after all of them, whatever the offset.

use bytes::{Buf, BufMut, Bytes};
use snafu::{OptionExt, ensure};

use crate::error::{InvalidKeySnafu, Result, TopicTooLongSnafu};

/// Sentinel of the partition start bound.
pub const CTRL_0: u8 = 0;
/// Separator between key fields.
pub const CTRL_1: u8 = 1;
/// Sentinel of the partition end bound.
pub const CTRL_2: u8 = 2;

/// Fixed part of a unit key: len(4) + sep(1) + sep(1) + queue id(4) + sep(1)
/// + offset(8).
pub const UNIT_KEY_FIXED_SIZE: usize = 19;

/// Fixed part of a bound key: len(4) + sep(1) + sep(1) + queue id(4) +
/// sentinel(1).
pub const BOUND_KEY_FIXED_SIZE: usize = 11;

#[inline]
pub const fn unit_key_size(topic_len: usize) -> usize { UNIT_KEY_FIXED_SIZE + topic_len }

#[inline]
pub const fn bound_key_size(topic_len: usize) -> usize { BOUND_KEY_FIXED_SIZE + topic_len }

/// Which end of a partition a bound key brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionBound {
    Start,
    End,
}

impl PartitionBound {
    const fn sentinel(self) -> u8 {
        match self {
            Self::Start => CTRL_0,
            Self::End => CTRL_2,
        }
    }
}

/// A decoded unit key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    pub topic:        Bytes,
    pub queue_id:     i32,
    pub queue_offset: u64,
}

fn topic_len_prefix(topic: &[u8]) -> Result<u32> {
    u32::try_from(topic.len())
        .ok()
        .context(TopicTooLongSnafu { len: topic.len() })
}

fn put_partition_prefix<B: BufMut>(buf: &mut B, topic_len: u32, topic: &[u8], queue_id: i32) {
    buf.put_u32(topic_len);
    buf.put_u8(CTRL_1);
    buf.put_slice(topic);
    buf.put_u8(CTRL_1);
    buf.put_i32(queue_id);
}

/// Encodes a unit key into a caller-owned scratch buffer.
///
/// The buffer is cleared first; the returned slice is the whole key. Reusing
/// one buffer across calls avoids an allocation per write.
pub fn encode_key_into<'a>(
    buf: &'a mut Vec<u8>,
    topic: &[u8],
    queue_id: i32,
    queue_offset: u64,
) -> Result<&'a [u8]> {
    let topic_len = topic_len_prefix(topic)?;
    buf.clear();
    buf.reserve(unit_key_size(topic.len()));
    put_partition_prefix(buf, topic_len, topic, queue_id);
    buf.put_u8(CTRL_1);
    buf.put_u64(queue_offset);
    Ok(buf.as_slice())
}

/// Encodes a unit key into a fresh buffer.
pub fn encode_key(topic: &[u8], queue_id: i32, queue_offset: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(unit_key_size(topic.len()));
    encode_key_into(&mut buf, topic, queue_id, queue_offset)?;
    Ok(buf)
}

/// Encodes one of the two keys bracketing every unit key of a partition.
pub fn encode_partition_bound(topic: &[u8], queue_id: i32, bound: PartitionBound) -> Result<Vec<u8>> {
    let topic_len = topic_len_prefix(topic)?;
    let mut buf = Vec::with_capacity(bound_key_size(topic.len()));
    put_partition_prefix(&mut buf, topic_len, topic, queue_id);
    buf.put_u8(bound.sentinel());
    Ok(buf)
}

/// Decodes a unit key. Bound keys are rejected.
pub fn decode_key(key: &[u8]) -> Result<IndexKey> {
    ensure!(
        key.len() >= UNIT_KEY_FIXED_SIZE,
        InvalidKeySnafu {
            reason: format!("key of {} bytes is shorter than {UNIT_KEY_FIXED_SIZE}", key.len()),
        }
    );

    let mut buf = key;
    let topic_len = buf.get_u32() as usize;
    ensure!(
        key.len() == unit_key_size(topic_len),
        InvalidKeySnafu {
            reason: format!(
                "key of {} bytes does not match topic length {topic_len}",
                key.len()
            ),
        }
    );

    expect_separator(&mut buf, "topic")?;
    let topic = Bytes::copy_from_slice(&buf[..topic_len]);
    buf.advance(topic_len);
    expect_separator(&mut buf, "queue id")?;
    let queue_id = buf.get_i32();
    expect_separator(&mut buf, "queue offset")?;
    let queue_offset = buf.get_u64();

    Ok(IndexKey {
        topic,
        queue_id,
        queue_offset,
    })
}

fn expect_separator(buf: &mut &[u8], before: &str) -> Result<()> {
    let byte = buf.get_u8();
    ensure!(
        byte == CTRL_1,
        InvalidKeySnafu {
            reason: format!("expected separator before {before}, found {byte:#04x}"),
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_unit_key_layout() {
        let key = encode_key(b"T", 3, 0x0102).unwrap();

        assert_eq!(key.len(), unit_key_size(1));
        assert_eq!(
            key,
            [
                0, 0, 0, 1, CTRL_1, b'T', CTRL_1, 0, 0, 0, 3, CTRL_1, 0, 0, 0, 0, 0, 0, 1, 2
            ]
        );
    }

    #[test]
    fn test_bound_key_layout() {
        let start = encode_partition_bound(b"T", 3, PartitionBound::Start).unwrap();
        let end = encode_partition_bound(b"T", 3, PartitionBound::End).unwrap();

        assert_eq!(start.len(), bound_key_size(1));
        assert_eq!(start, [0, 0, 0, 1, CTRL_1, b'T', CTRL_1, 0, 0, 0, 3, CTRL_0]);
        assert_eq!(end, [0, 0, 0, 1, CTRL_1, b'T', CTRL_1, 0, 0, 0, 3, CTRL_2]);
    }

    #[test]
    fn test_encode_into_reuses_buffer() {
        let mut buf = Vec::new();
        let long = encode_key_into(&mut buf, b"a-much-longer-topic", 1, 9)
            .unwrap()
            .to_vec();
        let short = encode_key_into(&mut buf, b"T", 0, 7).unwrap().to_vec();

        assert_eq!(long, encode_key(b"a-much-longer-topic", 1, 9).unwrap());
        assert_eq!(short, encode_key(b"T", 0, 7).unwrap());
        assert_eq!(buf.len(), unit_key_size(1));
    }

    #[test]
    fn test_decode_key() {
        let key = encode_key("主题".as_bytes(), -4, u64::MAX).unwrap();
        let decoded = decode_key(&key).unwrap();

        assert_eq!(decoded.topic, Bytes::from("主题"));
        assert_eq!(decoded.queue_id, -4);
        assert_eq!(decoded.queue_offset, u64::MAX);
    }

    #[test_case(&[0, 0, 0] ; "too short")]
    #[test_case(&[0, 0, 0, 2, 1, b'T', 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0] ; "length mismatch")]
    #[test_case(&[0, 0, 0, 1, 9, b'T', 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0] ; "bad separator")]
    #[test_case(&[0, 0, 0, 1, 1, b'T', 1, 0, 0, 0, 0, 0] ; "bound key")]
    fn test_decode_rejects(key: &[u8]) {
        let err = decode_key(key).unwrap_err();
        assert!(matches!(err, crate::ConsumeQueueError::InvalidKey { .. }));
    }

    #[test]
    fn test_partition_bounds_exclude_neighbours() {
        let start = encode_partition_bound(b"TA", 1, PartitionBound::Start).unwrap();
        let end = encode_partition_bound(b"TA", 1, PartitionBound::End).unwrap();

        let neighbours: [(&[u8], i32); 5] =
            [(b"TA", 0), (b"TA", 2), (b"TB", 1), (b"T", 1), (b"TAA", 1)];
        for (topic, queue_id) in neighbours {
            for offset in [0, 1, u64::MAX] {
                let key = encode_key(topic, queue_id, offset).unwrap();
                assert!(
                    key < start || key > end,
                    "{topic:?}-{queue_id}@{offset} falls inside TA-1"
                );
            }
        }
    }

    proptest! {
        #[test]
        fn prop_key_order_follows_offset(
            topic in proptest::collection::vec(any::<u8>(), 0..32),
            queue_id in any::<i32>(),
            a in any::<u64>(),
            b in any::<u64>(),
        ) {
            let ka = encode_key(&topic, queue_id, a).unwrap();
            let kb = encode_key(&topic, queue_id, b).unwrap();
            prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
        }

        #[test]
        fn prop_bounds_bracket_partition(
            topic in proptest::collection::vec(any::<u8>(), 0..32),
            queue_id in any::<i32>(),
            offset in any::<u64>(),
        ) {
            let key = encode_key(&topic, queue_id, offset).unwrap();
            let start = encode_partition_bound(&topic, queue_id, PartitionBound::Start).unwrap();
            let end = encode_partition_bound(&topic, queue_id, PartitionBound::End).unwrap();
            prop_assert!(start < key);
            prop_assert!(key < end);
        }

        #[test]
        fn prop_key_decodes(
            topic in proptest::collection::vec(any::<u8>(), 0..32),
            queue_id in any::<i32>(),
            offset in any::<u64>(),
        ) {
            let decoded = decode_key(&encode_key(&topic, queue_id, offset).unwrap()).unwrap();
            prop_assert_eq!(&decoded.topic[..], &topic[..]);
            prop_assert_eq!(decoded.queue_id, queue_id);
            prop_assert_eq!(decoded.queue_offset, offset);
        }
    }
}
