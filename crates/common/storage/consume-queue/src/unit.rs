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

//! Fixed-size value stored under every unit key.
//!
//! ```text
//! ┌──────────────────────┬───────────────┬───────────────┬─────────────────┬───────────────────┐
//! │ Physical Offset (8B) │ Msg Size (4B) │ Tags Code (8B)│ Store Time (8B) │ Queue Offset (8B) │
//! └──────────────────────┴───────────────┴───────────────┴─────────────────┴───────────────────┘
//!   0                      8               12              20                28               36
//! ```
//!
//! Big-endian throughout. Readers that need one field (the boundary search
//! only looks at the physical offset) use [`read_field`] instead of decoding
//! the whole unit.

use bytes::{Buf, BufMut};
use snafu::ensure;

use crate::error::{InvalidUnitSnafu, Result};

/// Encoded size of a [`ConsumeQueueUnit`].
pub const CQ_UNIT_SIZE: usize = 36;

/// A field of the encoded unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitField {
    PhysicalOffset,
    MessageSize,
    TagsCode,
    StoreTimestamp,
    QueueOffset,
}

impl UnitField {
    /// Byte position of the field inside the unit.
    pub const fn offset(self) -> usize {
        match self {
            Self::PhysicalOffset => 0,
            Self::MessageSize => 8,
            Self::TagsCode => 12,
            Self::StoreTimestamp => 20,
            Self::QueueOffset => 28,
        }
    }

    pub const fn width(self) -> usize {
        match self {
            Self::MessageSize => 4,
            _ => 8,
        }
    }
}

/// Index metadata of one message in the commit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumeQueueUnit {
    /// Byte offset of the message in the commit log.
    pub physical_offset: u64,
    /// Byte length of the message.
    pub message_size:    u32,
    /// Tag hash or bit-filter reference; opaque here.
    pub tags_code:       i64,
    /// Store time in milliseconds.
    pub store_timestamp: i64,
    /// Logical offset in the queue. Must match the offset in the key.
    pub queue_offset:    u64,
}

impl ConsumeQueueUnit {
    /// Packs the unit into a caller-owned buffer.
    pub fn encode_into(&self, buf: &mut [u8; CQ_UNIT_SIZE]) {
        let mut out = &mut buf[..];
        out.put_u64(self.physical_offset);
        out.put_u32(self.message_size);
        out.put_i64(self.tags_code);
        out.put_i64(self.store_timestamp);
        out.put_u64(self.queue_offset);
    }

    pub fn encode(&self) -> [u8; CQ_UNIT_SIZE] {
        let mut buf = [0u8; CQ_UNIT_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        check_size(bytes)?;
        let mut buf = bytes;
        Ok(Self {
            physical_offset: buf.get_u64(),
            message_size:    buf.get_u32(),
            tags_code:       buf.get_i64(),
            store_timestamp: buf.get_i64(),
            queue_offset:    buf.get_u64(),
        })
    }
}

fn check_size(bytes: &[u8]) -> Result<()> {
    ensure!(bytes.len() == CQ_UNIT_SIZE, InvalidUnitSnafu { len: bytes.len() });
    Ok(())
}

/// Reads one field of an encoded unit.
///
/// The raw big-endian bits are returned widened to `u64`; signed fields must
/// be reinterpreted by the caller (`as i64`).
pub fn read_field(bytes: &[u8], field: UnitField) -> Result<u64> {
    check_size(bytes)?;
    let mut buf = &bytes[field.offset()..];
    Ok(match field.width() {
        4 => u64::from(buf.get_u32()),
        _ => buf.get_u64(),
    })
}

#[inline]
pub fn physical_offset(bytes: &[u8]) -> Result<u64> { read_field(bytes, UnitField::PhysicalOffset) }

#[inline]
pub fn queue_offset(bytes: &[u8]) -> Result<u64> { read_field(bytes, UnitField::QueueOffset) }
