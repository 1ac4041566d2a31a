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

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::catalog::ContentCatalog;
use crate::catalog::ListManager;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::queue::RatingStats;
use crate::queue::ReviewQueue;
use crate::queue::group_by_rating;
use crate::session::resolve_scope;
use crate::store::RecordMap;
use crate::store::RecordStore;
use crate::store::prune;
use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::scope::Scope;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(
    directory: Option<String>,
    list: Option<String>,
    format: StatsFormat,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let mut stats = compute_stats(
        &coll.deck,
        &coll.deck,
        coll.store.load(),
        Scope::from_list(list),
        Timestamp::now(),
    );
    stats.saved_at = coll.store.saved_at()?;
    match format {
        StatsFormat::Text => {
            println!("{}", stats.to_text());
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{stats_json}");
        }
    }
    Ok(())
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    scope: String,
    card_count: usize,
    due_count: usize,
    upcoming_count: usize,
    next_due_at: Option<Timestamp>,
    ratings: RatingStats,
    /// The cards in scope, grouped by their last rating.
    cards_by_rating: BTreeMap<Rating, Vec<CardId>>,
    /// When review progress was last written, if ever.
    saved_at: Option<Timestamp>,
}

/// Compute statistics for `scope` without touching the store: pruning and
/// backfilling happen on a copy.
pub fn compute_stats(
    catalog: &dyn ContentCatalog,
    lists: &dyn ListManager,
    records: RecordMap,
    scope: Scope,
    now: Timestamp,
) -> Stats {
    let (scope, members) = resolve_scope(scope, catalog, lists);
    let allowed: HashSet<CardId> = members.iter().cloned().collect();
    let mut records = prune(&records, &allowed);
    let (queue, _) = ReviewQueue::build(&members, &mut records, now);
    Stats {
        scope: scope.to_string(),
        card_count: allowed.len(),
        due_count: queue.due_count(),
        upcoming_count: queue.upcoming_count(),
        next_due_at: queue.next_due_at(),
        ratings: RatingStats::from_records(&records),
        cards_by_rating: group_by_rating(&members, &records).into_iter().collect(),
        saved_at: None,
    }
}

impl Stats {
    fn to_text(&self) -> String {
        let mut lines = vec![
            format!("Scope: {}", self.scope),
            format!("Cards: {}", self.card_count),
            format!("Due: {}", self.due_count),
            format!("Upcoming: {}", self.upcoming_count),
        ];
        if let Some(next) = self.next_due_at {
            lines.push(format!("Next due: {}", next.local_display()));
        }
        if let Some(saved_at) = self.saved_at {
            lines.push(format!("Last saved: {}", saved_at.local_display()));
        }
        for rating in Rating::ALL {
            let mut line = format!("Last rated {rating}: {}", self.ratings.get(rating));
            if let Some(cards) = self.cards_by_rating.get(&rating) {
                if !cards.is_empty() {
                    let cards: Vec<&str> = cards.iter().map(CardId::as_str).collect();
                    line.push_str(&format!(" ({})", cards.join(", ")));
                }
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}
