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

//! Consume queue units stored in an ordered key-value store.
//!
//! One unit per `(topic, queue_id, queue_offset)`, keyed as described in
//! [`crate::key`]. Writes are staged into a caller-owned [`WriteBatch`] so a
//! dispatcher can group many units, across partitions, into one atomic
//! commit. Reads go straight to the store.
//!
//! Appends to one partition are serialized by the caller. Partitions never
//! share keys, so they can be written concurrently, and readers run
//! alongside writers without any locking here.

use std::sync::Arc;

use snafu::ensure;
use tracing::{debug, error, info, warn};

use crate::{
    ConsumeQueueConfig,
    dispatch::{DispatchRequest, UnitScratch},
    error::{ContractViolationSnafu, CorruptedIndexSnafu, Result},
    key::{self, PartitionBound},
    search::{self, PhyAndCqOffset, SeekBias},
    store::{KvStore, WriteBatch},
    unit::{self, ConsumeQueueUnit},
};

pub struct ConsumeQueueTable<S> {
    store:  Arc<S>,
    config: ConsumeQueueConfig,
}

impl<S: KvStore> ConsumeQueueTable<S> {
    pub const fn new(store: Arc<S>, config: ConsumeQueueConfig) -> Self { Self { store, config } }

    pub const fn store(&self) -> &Arc<S> { &self.store }

    pub const fn config(&self) -> &ConsumeQueueConfig { &self.config }

    /// Stages `unit` into `batch`. Nothing is visible until the batch is
    /// committed.
    pub fn append_to_batch(
        &self,
        topic: &[u8],
        queue_id: i32,
        unit: &ConsumeQueueUnit,
        batch: &mut S::Batch,
    ) -> Result<()> {
        let key = key::encode_key(topic, queue_id, unit.queue_offset)?;
        batch.put(&key, &unit.encode())
    }

    /// Same as [`Self::append_to_batch`], encoding through reusable buffers.
    pub fn append_with_scratch(
        &self,
        scratch: &mut UnitScratch,
        topic: &[u8],
        queue_id: i32,
        unit: &ConsumeQueueUnit,
        batch: &mut S::Batch,
    ) -> Result<()> {
        let key = key::encode_key_into(&mut scratch.key, topic, queue_id, unit.queue_offset)?;
        unit.encode_into(&mut scratch.value);
        batch.put(key, &scratch.value)
    }

    /// Stages the unit described by a dispatched message.
    pub fn append_dispatch(
        &self,
        scratch: &mut UnitScratch,
        request: &DispatchRequest,
        batch: &mut S::Batch,
    ) -> Result<()> {
        self.append_with_scratch(
            scratch,
            request.topic.as_bytes(),
            request.queue_id,
            &ConsumeQueueUnit::from(request),
            batch,
        )
    }

    /// Reads the unit at one queue offset. `None` if it was never written or
    /// its partition was deleted.
    pub fn point_get(
        &self,
        topic: &str,
        queue_id: i32,
        queue_offset: u64,
    ) -> Result<Option<ConsumeQueueUnit>> {
        let key = key::encode_key(topic.as_bytes(), queue_id, queue_offset)?;
        self.store
            .get(&key)?
            .map(|value| ConsumeQueueUnit::decode(&value))
            .transpose()
    }

    /// Reads up to `count` units starting at `start_offset`.
    ///
    /// The result is the contiguous prefix of the range that exists: the
    /// first missing offset ends it. A present unit whose embedded queue
    /// offset is not the one its slot was asked for fails the whole call
    /// with [`CorruptedIndex`](crate::ConsumeQueueError::CorruptedIndex).
    pub fn range_get(
        &self,
        topic: &str,
        queue_id: i32,
        start_offset: u64,
        count: usize,
    ) -> Result<Vec<ConsumeQueueUnit>> {
        let topic_bytes = topic.as_bytes();
        let count = count.min(self.config.max_range_count) as u64;
        let keys = (0..count)
            .map_while(|i| start_offset.checked_add(i))
            .map(|offset| key::encode_key(topic_bytes, queue_id, offset))
            .collect::<Result<Vec<_>>>()?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values = self.store.multi_get(&keys)?;
        ensure!(
            values.len() == keys.len(),
            ContractViolationSnafu {
                reason: format!(
                    "multi_get returned {} values for {} keys",
                    values.len(),
                    keys.len()
                ),
            }
        );

        let mut units = Vec::with_capacity(values.len());
        for (i, value) in values.into_iter().enumerate() {
            let expected = start_offset + i as u64;
            let Some(value) = value else {
                debug!(
                    topic,
                    queue_id, start_offset, expected, "Range read reached end of consume queue"
                );
                break;
            };

            let unit = ConsumeQueueUnit::decode(&value)?;
            if unit.queue_offset != expected {
                error!(
                    topic,
                    queue_id,
                    expected,
                    found = unit.queue_offset,
                    "Consume queue data damaged"
                );
                return CorruptedIndexSnafu {
                    topic,
                    queue_id,
                    expected,
                    found: unit.queue_offset,
                }
                .fail();
            }
            units.push(unit);
        }
        Ok(units)
    }

    /// Stages removal of every unit of `(topic, queue_id)`, whatever their
    /// offsets.
    pub fn delete_partition(&self, topic: &str, queue_id: i32, batch: &mut S::Batch) -> Result<()> {
        let topic_bytes = topic.as_bytes();
        let start = key::encode_partition_bound(topic_bytes, queue_id, PartitionBound::Start)?;
        let end = key::encode_partition_bound(topic_bytes, queue_id, PartitionBound::End)?;
        batch.delete_range(&start, &end)?;

        info!(topic, queue_id, "Staged consume queue partition delete");
        Ok(())
    }

    /// Finds the queue offset in `[low, high]` holding `target_phy_offset`.
    ///
    /// With `prefer_leftmost` the smallest matching queue offset is returned,
    /// otherwise the largest. `None` when no unit in range has exactly that
    /// physical offset. Holes are skipped upwards (see [`crate::search`]).
    pub fn find_boundary_by_physical_offset(
        &self,
        topic: &str,
        queue_id: i32,
        low: u64,
        high: u64,
        target_phy_offset: u64,
        prefer_leftmost: bool,
    ) -> Result<Option<PhyAndCqOffset>> {
        let mut key_buf = Vec::new();
        search::search_exact(low, high, target_phy_offset, prefer_leftmost, |offset| {
            self.probe_physical_offset(&mut key_buf, topic, queue_id, offset)
        })
    }

    /// Nearest queue offset in `[low, high]` whose physical offset is on the
    /// `bias` side of `target_phy_offset`.
    pub fn seek_by_physical_offset(
        &self,
        topic: &str,
        queue_id: i32,
        low: u64,
        high: u64,
        target_phy_offset: u64,
        bias: SeekBias,
    ) -> Result<Option<PhyAndCqOffset>> {
        let mut key_buf = Vec::new();
        search::search_bound(low, high, target_phy_offset, bias, |offset| {
            self.probe_physical_offset(&mut key_buf, topic, queue_id, offset)
        })
    }

    fn probe_physical_offset(
        &self,
        key_buf: &mut Vec<u8>,
        topic: &str,
        queue_id: i32,
        queue_offset: u64,
    ) -> Result<Option<u64>> {
        let key = key::encode_key_into(key_buf, topic.as_bytes(), queue_id, queue_offset)?;
        let value = self.store.get(key)?;
        if self.config.enable_search_log {
            warn!(
                topic,
                queue_id,
                queue_offset,
                present = value.is_some(),
                "Probing consume queue by physical offset"
            );
        }
        value.map(|v| unit::physical_offset(&v)).transpose()
    }
}
