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

use crate::clock::SystemClock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::session::Session;
use crate::types::scope::Scope;

/// Forget all review progress. Every learned card is left unseen and due.
pub fn reset_progress(directory: Option<String>) -> Fallible<()> {
    let Collection { deck, store, .. } = Collection::new(directory)?;
    let mut session = Session::open(store, SystemClock, &deck, &deck, Scope::All);
    session.reset_progress();
    log::debug!("{} cards are due after reset.", session.due_count());
    println!("Review progress cleared.");
    Ok(())
}
