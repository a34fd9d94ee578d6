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

//! Consume queue index.
//!
//! Maps `(topic, queue_id, queue_offset)` to the commit log position and
//! metadata of one message, stored as fixed-size units in an ordered
//! key-value store:
//!
//! - [`key`]: ordered key layout and partition bound keys
//! - [`unit`]: the 36-byte value layout
//! - [`ConsumeQueueTable`]: append, point read, range read, partition delete
//!   and physical offset search
//! - [`store`]: the store contract plus in-memory and (feature `rocksdb`)
//!   RocksDB backends

pub mod builder;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod key;
pub mod search;
pub mod store;
pub mod table;
pub mod unit;

pub use builder::ConsumeQueueTableBuilder;
pub use config::ConsumeQueueConfig;
pub use dispatch::{DispatchRequest, UnitScratch};
pub use error::{ConsumeQueueError, Result, StoreResultExt};
pub use key::{IndexKey, PartitionBound};
pub use search::{PhyAndCqOffset, SeekBias};
pub use store::{KvStore, MemStore, WriteBatch};
pub use table::ConsumeQueueTable;
pub use unit::{CQ_UNIT_SIZE, ConsumeQueueUnit, UnitField};
