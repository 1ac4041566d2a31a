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

use crate::types::rating::Rating;
use crate::types::record::CardRecord;
use crate::types::timestamp::Timestamp;

/// Base interval for `Again`, in minutes.
pub const AGAIN_MINUTES: u64 = 1;

/// Base interval for `Hard`, in minutes.
pub const HARD_MINUTES: u64 = 10;

/// Base interval for `Good`: twelve hours.
pub const GOOD_MINUTES: u64 = 12 * 60;

/// Base interval for `Easy`: three days.
pub const EASY_MINUTES: u64 = 3 * 24 * 60;

/// Factor applied to the current interval on `Hard`.
const HARD_FACTOR: f64 = 0.6;

/// Factor applied to the current interval on `Good`.
const GOOD_FACTOR: f64 = 1.7;

/// Factor applied to the current interval on `Easy`, before the streak bonus.
const EASY_FACTOR: f64 = 2.5;

/// Added to the `Easy` factor per point of streak.
const EASY_STREAK_BONUS: f64 = 0.1;

/// The floor interval for a rating.
pub fn base_interval(rating: Rating) -> u64 {
    match rating {
        Rating::Again => AGAIN_MINUTES,
        Rating::Hard => HARD_MINUTES,
        Rating::Good => GOOD_MINUTES,
        Rating::Easy => EASY_MINUTES,
    }
}

/// The number of minutes until a card rated `rating` is due again.
pub fn next_interval(current: u64, rating: Rating, streak: u32) -> u64 {
    match rating {
        Rating::Again => AGAIN_MINUTES,
        Rating::Hard => {
            if current > 0 {
                scale(current, HARD_FACTOR).max(HARD_MINUTES)
            } else {
                HARD_MINUTES
            }
        }
        Rating::Good | Rating::Easy => {
            let base = base_interval(rating);
            let factor = match rating {
                Rating::Good => GOOD_FACTOR,
                _ => EASY_FACTOR + f64::from(streak) * EASY_STREAK_BONUS,
            };
            let value = if current > 0 { current } else { base };
            scale(value, factor).max(base)
        }
    }
}

/// The streak after a card is rated `rating`.
pub fn next_streak(streak: u32, rating: Rating) -> u32 {
    match rating {
        Rating::Again => 0,
        Rating::Hard => streak.saturating_sub(1),
        Rating::Good | Rating::Easy => streak.saturating_add(1),
    }
}

/// Compute a card's record after it is rated at `now`. A card with no
/// previous record is treated as never reviewed.
pub fn schedule(previous: Option<&CardRecord>, rating: Rating, now: Timestamp) -> CardRecord {
    let previous = previous.copied().unwrap_or_else(|| CardRecord::unseen(now));
    let interval = next_interval(previous.interval, rating, previous.streak);
    CardRecord {
        interval,
        due: now.plus_minutes(interval),
        rating,
        streak: next_streak(previous.streak, rating),
    }
}

/// Multiply and round half away from zero. The float-to-int cast saturates.
fn scale(minutes: u64, factor: f64) -> u64 {
    (minutes as f64 * factor).round() as u64
}
