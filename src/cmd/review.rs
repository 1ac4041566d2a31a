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

use std::io::BufRead;
use std::io::Write;

use crate::catalog::ContentCatalog;
use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::collection::Collection;
use crate::config::Language;
use crate::error::Fallible;
use crate::session::RateOutcome;
use crate::session::Session;
use crate::store::RecordStore;
use crate::types::rating::Rating;
use crate::types::scope::Scope;

pub fn review(directory: Option<String>, list: Option<String>) -> Fallible<()> {
    let Collection {
        directory,
        config,
        deck,
        store,
    } = Collection::new(directory)?;
    log::debug!("Reviewing in {}", directory.display());
    let mut session = Session::open(store, SystemClock, &deck, &deck, Scope::from_list(list));
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_review(
        &mut session,
        &deck,
        config.language,
        &mut stdin.lock(),
        &mut stdout.lock(),
    )?;
    Ok(())
}

/// Drive a terminal review until nothing is due or the learner quits.
/// Returns the number of cards rated.
pub fn run_review<S: RecordStore, C: Clock>(
    session: &mut Session<S, C>,
    catalog: &dyn ContentCatalog,
    language: Language,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<usize> {
    let mut reviewed = 0;
    'cards: loop {
        let Some(id) = session.present_current().cloned() else {
            let queue = session.queue();
            match queue.upcoming().next().zip(queue.next_due_at()) {
                Some((card, next)) => {
                    let name = match catalog.resolve(card) {
                        Some(entry) => entry.hanzi,
                        None => card.to_string(),
                    };
                    writeln!(
                        output,
                        "No cards due. Next review at {} ({name}).",
                        next.local_display()
                    )?
                }
                None => writeln!(output, "No cards due.")?,
            }
            break;
        };
        writeln!(
            output,
            "[due: {} | upcoming: {}]",
            session.due_count(),
            session.upcoming_count()
        )?;
        let entry = catalog.resolve(&id);
        match &entry {
            Some(entry) => writeln!(output, "{}  {}", entry.hanzi, entry.pinyin)?,
            None => writeln!(output, "{id}")?,
        }
        writeln!(output, "[press enter to reveal, q to quit]")?;
        match read_line(input)? {
            Some(line) if line != "q" => {}
            _ => break,
        }
        if let Some(entry) = &entry {
            writeln!(output, "{}", language.translation(entry))?;
        }
        let rating = loop {
            writeln!(output, "Rating: (1 = Again, 2 = Hard, 3 = Good, 4 = Easy, q = quit)")?;
            let Some(line) = read_line(input)? else {
                break 'cards;
            };
            if line == "q" {
                break 'cards;
            }
            match Rating::from_key(&line) {
                Ok(rating) => break rating,
                Err(_) => writeln!(
                    output,
                    "Invalid input. Please enter a number between 1 and 4."
                )?,
            }
        };
        if let RateOutcome::Applied(record) = session.rate_card(&id, rating) {
            writeln!(output, "Next review in {}.", format_interval(record.interval))?;
            reviewed += 1;
        }
    }
    writeln!(output, "Reviewed {reviewed} cards.")?;
    Ok(reviewed)
}

/// Read a trimmed line. `None` at end of input.
fn read_line(input: &mut impl BufRead) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Describe an interval in minutes the way the rating buttons do.
fn format_interval(minutes: u64) -> String {
    const HOUR: u64 = 60;
    const DAY: u64 = 24 * HOUR;
    if minutes < HOUR {
        format!("{minutes} min")
    } else if minutes < DAY {
        format!("{} h", (minutes + HOUR / 2) / HOUR)
    } else {
        format!("{} d", (minutes + DAY / 2) / DAY)
    }
}
