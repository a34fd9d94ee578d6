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

use snafu::{ResultExt, Snafu};

/// Error type produced by store backends.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Consume queue index errors.
#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum ConsumeQueueError {
    /// The underlying store call failed. Never retried here.
    #[snafu(display("Store operation `{op}` failed"))]
    StoreUnavailable {
        op:     &'static str,
        source: BoxedError,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },

    /// The store answered with a result that breaks its own contract.
    #[snafu(display("Store contract violated: {reason}"))]
    ContractViolation {
        reason: String,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },

    /// Two records that must be consecutive are not.
    #[snafu(display(
        "Consume queue {topic}-{queue_id} damaged: expected offset {expected}, found {found}"
    ))]
    CorruptedIndex {
        topic:    String,
        queue_id: i32,
        expected: u64,
        found:    u64,
        #[snafu(implicit)]
        loc:      snafu::Location,
    },

    /// A stored value is not a well-formed unit.
    #[snafu(display("Invalid consume queue unit: expected 36 bytes, got {len}"))]
    InvalidUnit {
        len: usize,
        #[snafu(implicit)]
        loc: snafu::Location,
    },

    #[snafu(display("Invalid consume queue key: {reason}"))]
    InvalidKey {
        reason: String,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },

    /// Topic length does not fit the 4-byte length prefix of a key.
    #[snafu(display("Topic of {len} bytes is too long to encode"))]
    TopicTooLong {
        len: usize,
        #[snafu(implicit)]
        loc: snafu::Location,
    },
}

impl ConsumeQueueError {
    /// Whether the error reports damaged on-disk data rather than a failed
    /// call.
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::CorruptedIndex { .. } | Self::InvalidUnit { .. })
    }
}

/// Result type for consume queue operations.
pub type Result<T> = std::result::Result<T, ConsumeQueueError>;

/// Wraps a backend error as [`ConsumeQueueError::StoreUnavailable`].
pub trait StoreResultExt<T> {
    fn store_context(self, op: &'static str) -> Result<T>;
}

impl<T, E> StoreResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[track_caller]
    fn store_context(self, op: &'static str) -> Result<T> {
        self.map_err(|e| Box::new(e) as BoxedError)
            .context(StoreUnavailableSnafu { op })
    }
}
