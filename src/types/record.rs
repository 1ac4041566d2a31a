// Copyright 2025 Fernando Borretti
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

use serde::Deserialize;
use serde::Serialize;

use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// The persisted scheduling state of a single card.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRecord {
    /// Minutes between the last rating and `due`. Zero for a card that has
    /// never been rated.
    pub interval: u64,
    /// When the card next becomes due.
    pub due: Timestamp,
    /// The last rating the card received.
    pub rating: Rating,
    /// Consecutive ratings other than `Again`.
    pub streak: u32,
}

impl CardRecord {
    /// The record of a card that just entered scope: never rated, due
    /// immediately.
    pub fn unseen(now: Timestamp) -> Self {
        Self {
            interval: 0,
            due: now,
            rating: Rating::Again,
            streak: 0,
        }
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.due <= now
    }
}
