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

use std::collections::HashSet;

use serde::Serialize;

use crate::store::RecordMap;
use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::record::CardRecord;
use crate::types::timestamp::Timestamp;

/// The in-scope cards, ordered by due time and split at `now`.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ReviewQueue {
    due: Vec<CardId>,
    upcoming: Vec<(CardId, Timestamp)>,
}

impl ReviewQueue {
    /// Build the queue for `scope`. Cards without a record get a fresh one,
    /// due immediately; the returned flag is true if any were added, in which
    /// case the caller should persist `records`.
    pub fn build(scope: &[CardId], records: &mut RecordMap, now: Timestamp) -> (Self, bool) {
        let mut seen: HashSet<&CardId> = HashSet::new();
        let mut backfilled = false;
        let mut entries: Vec<(CardId, CardRecord)> = Vec::with_capacity(scope.len());
        for id in scope {
            if !seen.insert(id) {
                continue;
            }
            let record = records.entry(id.clone()).or_insert_with(|| {
                backfilled = true;
                CardRecord::unseen(now)
            });
            entries.push((id.clone(), *record));
        }
        // Stable, so cards due at the same time keep their scope order.
        entries.sort_by_key(|(_, record)| record.due);
        let split = entries.partition_point(|(_, record)| record.is_due(now));
        let upcoming = entries
            .split_off(split)
            .into_iter()
            .map(|(id, record)| (id, record.due))
            .collect();
        let due = entries.into_iter().map(|(id, _)| id).collect();
        (Self { due, upcoming }, backfilled)
    }

    /// Cards ready for review, earliest first.
    pub fn due(&self) -> &[CardId] {
        &self.due
    }

    /// Cards scheduled for the future, earliest first.
    pub fn upcoming(&self) -> impl Iterator<Item = &CardId> {
        self.upcoming.iter().map(|(id, _)| id)
    }

    pub fn due_count(&self) -> usize {
        self.due.len()
    }

    pub fn upcoming_count(&self) -> usize {
        self.upcoming.len()
    }

    pub fn current_card(&self) -> Option<&CardId> {
        self.due.first()
    }

    /// When the next upcoming card becomes due.
    pub fn next_due_at(&self) -> Option<Timestamp> {
        self.upcoming.first().map(|(_, due)| *due)
    }

    pub fn is_empty(&self) -> bool {
        self.due.is_empty() && self.upcoming.is_empty()
    }
}

/// How many tracked cards last received each rating.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub struct RatingStats {
    pub again: usize,
    pub hard: usize,
    pub good: usize,
    pub easy: usize,
}

impl RatingStats {
    pub fn from_records(records: &RecordMap) -> Self {
        let mut stats = Self::default();
        for record in records.values() {
            *stats.slot(record.rating) += 1;
        }
        stats
    }

    pub fn get(&self, rating: Rating) -> usize {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }

    fn slot(&mut self, rating: Rating) -> &mut usize {
        match rating {
            Rating::Again => &mut self.again,
            Rating::Hard => &mut self.hard,
            Rating::Good => &mut self.good,
            Rating::Easy => &mut self.easy,
        }
    }
}

/// Group the cards in `scope` by their last rating, keeping scope order.
/// Cards without a record count as `Again`.
pub fn group_by_rating(scope: &[CardId], records: &RecordMap) -> Vec<(Rating, Vec<CardId>)> {
    let mut groups: Vec<(Rating, Vec<CardId>)> =
        Rating::ALL.iter().map(|rating| (*rating, Vec::new())).collect();
    let mut seen: HashSet<&CardId> = HashSet::new();
    for id in scope {
        if !seen.insert(id) {
            continue;
        }
        let rating = records.get(id).map(|r| r.rating).unwrap_or_default();
        if let Some((_, ids)) = groups.iter_mut().find(|(r, _)| *r == rating) {
            ids.push(id.clone());
        }
    }
    groups
}
