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

use crate::catalog::ContentCatalog;
use crate::catalog::ListManager;
use crate::clock::Clock;
use crate::queue::ReviewQueue;
use crate::scheduler::schedule;
use crate::store::RecordMap;
use crate::store::RecordStore;
use crate::store::prune;
use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::record::CardRecord;
use crate::types::scope::ListId;
use crate::types::scope::Scope;

/// The result of rating a card.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RateOutcome {
    /// The card was rescheduled.
    Applied(CardRecord),
    /// The card was not the one being presented. Nothing changed.
    Stale,
}

pub struct Session<S: RecordStore, C: Clock> {
    store: S,
    clock: C,
    /// The in-memory copy of the store. Authoritative for the lifetime of
    /// the session, even if writes fail.
    records: RecordMap,
    scope: Scope,
    /// The resolved members of `scope`.
    members: Vec<CardId>,
    queue: ReviewQueue,
}

impl<S: RecordStore, C: Clock> Session<S, C> {
    /// Load the store and start reviewing `scope`.
    pub fn open(
        store: S,
        clock: C,
        catalog: &dyn ContentCatalog,
        lists: &dyn ListManager,
        scope: Scope,
    ) -> Self {
        let records = store.load();
        log::debug!("Loaded {} card records.", records.len());
        let mut session = Self {
            store,
            clock,
            records,
            scope: Scope::All,
            members: Vec::new(),
            queue: ReviewQueue::default(),
        };
        session.set_scope(scope, catalog, lists);
        session
    }

    /// Switch to `scope`. Records for cards outside the new scope are pruned,
    /// and any in-flight card is dropped. A list that does not exist falls
    /// back to all learned cards.
    pub fn set_scope(&mut self, scope: Scope, catalog: &dyn ContentCatalog, lists: &dyn ListManager) {
        let (scope, members) = resolve_scope(scope, catalog, lists);
        let allowed: HashSet<CardId> = members.iter().cloned().collect();
        let pruned = prune(&self.records, &allowed);
        let removed = self.records.len() - pruned.len();
        if removed > 0 {
            log::debug!("Pruned {removed} records outside {scope}.");
        }
        log::debug!("Reviewing {scope}: {} cards.", members.len());
        self.scope = scope;
        self.members = members;
        self.records = pruned;
        self.refresh_queue();
        self.persist();
    }

    /// Re-resolve the active scope if `list` is the active list.
    pub fn on_list_changed(
        &mut self,
        list: &ListId,
        catalog: &dyn ContentCatalog,
        lists: &dyn ListManager,
    ) {
        if self.is_active_list(list) {
            self.set_scope(self.scope.clone(), catalog, lists);
        }
    }

    /// Fall back to all learned cards if `list` is the active list.
    pub fn on_list_deleted(
        &mut self,
        list: &ListId,
        catalog: &dyn ContentCatalog,
        lists: &dyn ListManager,
    ) {
        if self.is_active_list(list) {
            self.set_scope(Scope::All, catalog, lists);
        }
    }

    /// The card to review now, if any is due.
    pub fn present_current(&self) -> Option<&CardId> {
        self.queue.current_card()
    }

    /// Rate the card currently presented.
    pub fn rate(&mut self, rating: Rating) -> Option<CardRecord> {
        let current = self.present_current()?.clone();
        match self.rate_card(&current, rating) {
            RateOutcome::Applied(record) => Some(record),
            RateOutcome::Stale => None,
        }
    }

    /// Rate `id`, which must be the card currently presented. Ratings for any
    /// other card are ignored.
    pub fn rate_card(&mut self, id: &CardId, rating: Rating) -> RateOutcome {
        if self.present_current() != Some(id) {
            log::warn!("Ignoring {rating} rating for card {id}: it is not the current card.");
            return RateOutcome::Stale;
        }
        let now = self.clock.now();
        let record = schedule(self.records.get(id), rating, now);
        log::debug!(
            "Rated {id} {rating}: interval {} min, streak {}.",
            record.interval,
            record.streak
        );
        self.records.insert(id.clone(), record);
        self.persist();
        self.rebuild_queue();
        RateOutcome::Applied(record)
    }

    /// Recompute the queue from the current scope and records.
    pub fn rebuild_queue(&mut self) {
        if self.refresh_queue() {
            self.persist();
        }
    }

    /// Forget all review progress. Every card in scope becomes unseen.
    pub fn reset_progress(&mut self) {
        if let Err(e) = self.store.clear() {
            log::error!("Failed to clear review state: {e}");
        }
        self.records.clear();
        self.rebuild_queue();
    }

    pub fn due_count(&self) -> usize {
        self.queue.due_count()
    }

    pub fn upcoming_count(&self) -> usize {
        self.queue.upcoming_count()
    }

    pub fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    pub fn records(&self) -> &RecordMap {
        &self.records
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn members(&self) -> &[CardId] {
        &self.members
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn is_active_list(&self, list: &ListId) -> bool {
        matches!(&self.scope, Scope::List(active) if active == list)
    }

    /// Rebuild the queue without persisting. Returns true if records were
    /// added for cards that had none.
    fn refresh_queue(&mut self) -> bool {
        let now = self.clock.now();
        let (queue, backfilled) = ReviewQueue::build(&self.members, &mut self.records, now);
        self.queue = queue;
        backfilled
    }

    /// Write the records through to the store. Failures are logged and
    /// retried once; the session carries on from memory either way.
    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.records) {
            log::error!("Failed to save review state, retrying: {e}");
            if let Err(e) = self.store.save(&self.records) {
                log::error!("Failed to save review state, continuing in memory: {e}");
            }
        }
    }
}

/// Resolve `scope` to its member cards. A list that does not exist resolves
/// to all learned cards.
pub fn resolve_scope(
    scope: Scope,
    catalog: &dyn ContentCatalog,
    lists: &dyn ListManager,
) -> (Scope, Vec<CardId>) {
    match scope {
        Scope::All => (Scope::All, catalog.learned_cards()),
        Scope::List(id) => match lists.list_card_ids(&id) {
            Some(members) => (Scope::List(id), members),
            None => {
                log::warn!("List {id} does not exist, reviewing all learned cards.");
                (Scope::All, catalog.learned_cards())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::catalog::VocabEntry;
    use crate::clock::FixedClock;
    use crate::store::memory::MemoryStore;
    use crate::types::timestamp::Timestamp;

    const START: i64 = 1_700_000_000_000;

    #[derive(Default)]
    struct Fixture {
        learned: Vec<CardId>,
        lists: HashMap<ListId, Vec<CardId>>,
    }

    impl Fixture {
        fn new(learned: &[&str]) -> Self {
            Self {
                learned: ids(learned),
                lists: HashMap::new(),
            }
        }

        fn with_list(mut self, list: &str, members: &[&str]) -> Self {
            self.lists.insert(ListId::from(list), ids(members));
            self
        }
    }

    impl ContentCatalog for Fixture {
        fn learned_cards(&self) -> Vec<CardId> {
            self.learned.clone()
        }

        fn resolve(&self, id: &CardId) -> Option<VocabEntry> {
            self.learned.contains(id).then(|| VocabEntry {
                hanzi: id.to_string(),
                pinyin: String::new(),
                translation: String::new(),
                translation_fr: String::new(),
                audio: None,
                level: "hsk1".to_string(),
            })
        }
    }

    impl ListManager for Fixture {
        fn list_card_ids(&self, list: &ListId) -> Option<Vec<CardId>> {
            self.lists.get(list).cloned()
        }
    }

    fn ids(names: &[&str]) -> Vec<CardId> {
        names.iter().map(|name| CardId::from(*name)).collect()
    }

    fn start() -> Timestamp {
        Timestamp::from_millis(START)
    }

    fn open<'a>(
        store: MemoryStore,
        clock: &'a FixedClock,
        fixture: &Fixture,
        scope: Scope,
    ) -> Session<MemoryStore, &'a FixedClock> {
        Session::open(store, clock, fixture, fixture, scope)
    }

    #[test]
    fn test_unseen_card_is_due_immediately() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a"]);
        let session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        assert_eq!(session.present_current(), Some(&CardId::from("a")));
        assert_eq!(session.due_count(), 1);
        assert_eq!(session.upcoming_count(), 0);
        let stored = session.store().load();
        assert_eq!(stored.get("a"), Some(&CardRecord::unseen(start())));
    }

    #[test]
    fn test_first_good_rating() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        let record = session.rate(Rating::Good);
        let expected = CardRecord {
            interval: 1224,
            due: start().plus_minutes(1224),
            rating: Rating::Good,
            streak: 1,
        };
        assert_eq!(record, Some(expected));
        assert_eq!(session.present_current(), None);
        assert_eq!(session.due_count(), 0);
        assert_eq!(session.upcoming_count(), 1);
        assert_eq!(session.queue().next_due_at(), Some(start().plus_minutes(1224)));
    }

    #[test]
    fn test_rating_is_visible_to_fresh_load() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a", "b"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        for rating in [Rating::Hard, Rating::Easy] {
            let current = session.present_current().cloned().unwrap();
            assert!(matches!(
                session.rate_card(&current, rating),
                RateOutcome::Applied(_)
            ));
            let stored = session.store().load();
            assert_eq!(stored[&current].rating, rating);
        }
    }

    #[test]
    fn test_easy_after_good_hits_floor() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        session.rate(Rating::Good);
        clock.advance_minutes(1224);
        session.rebuild_queue();
        assert_eq!(session.present_current(), Some(&CardId::from("a")));
        let record = session.rate(Rating::Easy).unwrap();
        assert_eq!(record.interval, 4320);
        assert_eq!(record.streak, 2);
    }

    #[test]
    fn test_hard_shrinks_existing_interval() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a"]);
        let payload = format!(
            r#"{{"version": 1, "records": {{"a": {{"interval": 500, "due": {}, "rating": "good", "streak": 3}}}}}}"#,
            START - 1
        );
        let mut session = open(MemoryStore::with_payload(payload), &clock, &fixture, Scope::All);
        let record = session.rate(Rating::Hard).unwrap();
        assert_eq!(record.interval, 300);
        assert_eq!(record.streak, 2);
        assert_eq!(record.due, start().plus_minutes(300));
    }

    #[test]
    fn test_again_comes_back_after_a_minute() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a", "b"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        assert_eq!(session.rate(Rating::Again).unwrap().interval, 1);
        assert_eq!(session.present_current(), Some(&CardId::from("b")));
        session.rate(Rating::Good);
        assert_eq!(session.present_current(), None);
        clock.advance_minutes(1);
        session.rebuild_queue();
        assert_eq!(session.present_current(), Some(&CardId::from("a")));
    }

    #[test]
    fn test_stale_rating_is_ignored() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a", "b"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        let writes = session.store().writes();
        let before = session.records().clone();
        let outcome = session.rate_card(&CardId::from("b"), Rating::Easy);
        assert_eq!(outcome, RateOutcome::Stale);
        assert_eq!(session.records(), &before);
        assert_eq!(session.store().writes(), writes);
        assert_eq!(session.present_current(), Some(&CardId::from("a")));
    }

    #[test]
    fn test_nothing_due() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&[]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        assert_eq!(session.present_current(), None);
        assert_eq!(session.rate(Rating::Good), None);
        assert_eq!(
            session.rate_card(&CardId::from("a"), Rating::Good),
            RateOutcome::Stale
        );
        assert!(session.records().is_empty());
    }

    #[test]
    fn test_switching_scope_prunes_records() {
        let clock = FixedClock::new(start());
        let learned: Vec<String> = (0..50).map(|i| format!("c{i}")).collect();
        let learned: Vec<&str> = learned.iter().map(String::as_str).collect();
        let fixture = Fixture::new(&learned).with_list("L", &["c0", "c1", "c2", "x1", "x2"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        assert_eq!(session.store().load().len(), 50);

        session.set_scope(Scope::List(ListId::from("L")), &fixture, &fixture);
        let stored = session.store().load();
        let keys: Vec<&str> = stored.keys().map(CardId::as_str).collect();
        assert_eq!(keys, vec!["c0", "c1", "c2", "x1", "x2"]);
        assert_eq!(session.scope(), &Scope::List(ListId::from("L")));
        assert_eq!(session.due_count(), 5);
    }

    #[test]
    fn test_scope_switch_keeps_surviving_progress() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a", "b", "c"]).with_list("L", &["b"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        session.rate(Rating::Good);
        let current = session.present_current().cloned().unwrap();
        assert_eq!(current, CardId::from("b"));
        session.rate(Rating::Easy);
        session.set_scope(Scope::List(ListId::from("L")), &fixture, &fixture);
        assert_eq!(session.records()["b"].rating, Rating::Easy);
        assert_eq!(session.present_current(), None);
        assert_eq!(session.upcoming_count(), 1);
    }

    #[test]
    fn test_scope_switch_drops_current_card() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a", "b"]).with_list("L", &["b"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        assert_eq!(session.present_current(), Some(&CardId::from("a")));
        session.set_scope(Scope::List(ListId::from("L")), &fixture, &fixture);
        assert_eq!(
            session.rate_card(&CardId::from("a"), Rating::Good),
            RateOutcome::Stale
        );
        assert_eq!(session.present_current(), Some(&CardId::from("b")));
    }

    #[test]
    fn test_missing_list_falls_back_to_all() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a", "b"]);
        let session = open(
            MemoryStore::new(),
            &clock,
            &fixture,
            Scope::List(ListId::from("gone")),
        );
        assert_eq!(session.scope(), &Scope::All);
        assert_eq!(session.members(), ids(&["a", "b"]).as_slice());
    }

    #[test]
    fn test_list_events() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a", "b", "c"]).with_list("L", &["a"]);
        let mut session = open(
            MemoryStore::new(),
            &clock,
            &fixture,
            Scope::List(ListId::from("L")),
        );
        assert_eq!(session.due_count(), 1);

        let grown = Fixture::new(&["a", "b", "c"]).with_list("L", &["a", "c"]);
        session.on_list_changed(&ListId::from("other"), &grown, &grown);
        assert_eq!(session.due_count(), 1);
        session.on_list_changed(&ListId::from("L"), &grown, &grown);
        assert_eq!(session.due_count(), 2);

        let without = Fixture::new(&["a", "b", "c"]);
        session.on_list_deleted(&ListId::from("L"), &without, &without);
        assert_eq!(session.scope(), &Scope::All);
        assert_eq!(session.due_count(), 3);
    }

    #[test]
    fn test_write_failure_keeps_session_alive() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a", "b"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        session.store.fail_next_writes(2);
        let record = session.rate(Rating::Good).unwrap();
        assert_eq!(session.records()["a"], record);
        assert_eq!(session.present_current(), Some(&CardId::from("b")));
        assert_eq!(session.store().load()["a"].rating, Rating::Again);

        session.rate(Rating::Good);
        let stored = session.store().load();
        assert_eq!(stored["a"], record);
        assert_eq!(stored["b"].rating, Rating::Good);
    }

    #[test]
    fn test_single_write_failure_is_retried() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        session.store.fail_next_writes(1);
        session.rate(Rating::Easy);
        assert_eq!(session.store().load()["a"].rating, Rating::Easy);
    }

    #[test]
    fn test_malformed_store_starts_fresh() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a"]);
        let session = open(MemoryStore::with_payload("}{"), &clock, &fixture, Scope::All);
        assert_eq!(session.present_current(), Some(&CardId::from("a")));
        assert_eq!(session.store().load().len(), 1);
    }

    #[test]
    fn test_reset_progress() {
        let clock = FixedClock::new(start());
        let fixture = Fixture::new(&["a", "b"]);
        let mut session = open(MemoryStore::new(), &clock, &fixture, Scope::All);
        session.rate(Rating::Easy);
        session.rate(Rating::Easy);
        assert_eq!(session.due_count(), 0);
        session.reset_progress();
        assert_eq!(session.due_count(), 2);
        for record in session.store().load().values() {
            assert_eq!(*record, CardRecord::unseen(start()));
        }
    }

    #[test]
    fn test_catalog_resolves_display_data() {
        let fixture = Fixture::new(&["a"]);
        assert_eq!(fixture.resolve(&CardId::from("a")).unwrap().hanzi, "a");
        assert!(fixture.resolve(&CardId::from("z")).is_none());
    }
}
