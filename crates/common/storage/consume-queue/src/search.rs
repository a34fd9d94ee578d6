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

//! Binary search over queue offsets keyed by physical offset.
//!
//! Physical offsets never decrease as queue offsets grow, so a bisection over
//! `[low, high]` can locate a physical offset. The store only answers exact
//! point lookups, so every step probes one queue offset.
//!
//! A probe that finds no record (a hole) moves the search up, `low = mid + 1`.
//! This is right when holes sit below the target, e.g. the head of a queue
//! that has been cleaned. A hole above the target can hide a match; see
//! `test_hole_above_target_hides_match`.

/// A physical offset and the queue offset it was found at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhyAndCqOffset {
    pub physical_offset: u64,
    pub queue_offset:    u64,
}

/// Non-exact variant of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekBias {
    /// Smallest queue offset whose physical offset is `>= target`.
    Ceiling,
    /// Largest queue offset whose physical offset is `<= target`.
    Floor,
}

struct Step {
    record:  bool,
    descend: bool,
}

/// Finds a queue offset whose physical offset equals `target`.
///
/// With `prefer_leftmost` the smallest such queue offset wins, otherwise the
/// largest. `probe` returns the physical offset stored at a queue offset, or
/// `None` for a hole.
pub fn search_exact<F, E>(
    low: u64,
    high: u64,
    target: u64,
    prefer_leftmost: bool,
    probe: F,
) -> Result<Option<PhyAndCqOffset>, E>
where
    F: FnMut(u64) -> Result<Option<u64>, E>,
{
    bisect(low, high, probe, |phy| Step {
        record:  phy == target,
        descend: if prefer_leftmost {
            phy >= target
        } else {
            phy > target
        },
    })
}

/// Finds the nearest queue offset on the `bias` side of `target`.
pub fn search_bound<F, E>(
    low: u64,
    high: u64,
    target: u64,
    bias: SeekBias,
    probe: F,
) -> Result<Option<PhyAndCqOffset>, E>
where
    F: FnMut(u64) -> Result<Option<u64>, E>,
{
    bisect(low, high, probe, |phy| match bias {
        SeekBias::Ceiling => Step {
            record:  phy >= target,
            descend: phy >= target,
        },
        SeekBias::Floor => Step {
            record:  phy <= target,
            descend: phy > target,
        },
    })
}

fn bisect<F, E>(
    mut low: u64,
    mut high: u64,
    mut probe: F,
    classify: impl Fn(u64) -> Step,
) -> Result<Option<PhyAndCqOffset>, E>
where
    F: FnMut(u64) -> Result<Option<u64>, E>,
{
    let mut found = None;
    while low <= high {
        let mid = low + (high - low) / 2;

        let Some(phy) = probe(mid)? else {
            match mid.checked_add(1) {
                Some(next) => low = next,
                None => break,
            }
            continue;
        };

        let step = classify(phy);
        if step.record {
            found = Some(PhyAndCqOffset {
                physical_offset: phy,
                queue_offset:    mid,
            });
        }

        let next = if step.descend {
            mid.checked_sub(1)
        } else {
            mid.checked_add(1)
        };
        match next {
            Some(n) if step.descend => high = n,
            Some(n) => low = n,
            None => break,
        }
    }
    Ok(found)
}
