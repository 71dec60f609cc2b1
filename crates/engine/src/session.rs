//! The swipe session: everything a presentation layer talks to.
//!
//! A session owns the candidate list, the active filters, the deck cursor,
//! the gesture machine and the decision committer. Nothing here returns an
//! error: I/O failures degrade to empty lists or are logged by the committer.

use crate::committer::DecisionCommitter;
use crate::config::EngineConfig;
use crate::context::load_session_context;
use crate::deck::{DeckCursor, DeckStatus};
use crate::gesture::{GestureEvent, GestureMachine, GesturePhase, GesturePosition, Transition};
use crate::stats::SwipeStats;
use pipeline::{FilterEngine, FilterSet};
use records::{LatLng, LikedEntry, LikedSet, RestaurantRecord, SeenSet, SwipeDirection, UserId};
use sources::{fetch_candidates, resolve_location, try_fetch_candidates, CandidateSource, LocationProvider};
use std::sync::Arc;
use store::PersistencePort;
use tracing::{debug, info, instrument, warn};

pub struct SwipeSession<S: CandidateSource> {
    config: EngineConfig,
    source: S,
    engine: FilterEngine,
    user: UserId,
    location: LatLng,
    radius_meters: u32,
    candidates: Vec<RestaurantRecord>,
    filters: FilterSet,
    include_seen: bool,
    cursor: DeckCursor,
    gesture: GestureMachine,
    committer: DecisionCommitter,
    rebuild_pending: bool,
}

impl<S: CandidateSource> SwipeSession<S> {
    /// Resolve the location, preload the user's state and fetch candidates.
    ///
    /// ## Algorithm
    /// 1. Ask `locator` for the device location, falling back to the configured default
    /// 2. Concurrently load seen/liked/stats and fetch nearby candidates (both time-bounded)
    /// 3. Spawn the committer from the loaded state
    /// 4. Build the first deck
    #[instrument(skip_all, fields(user = %user))]
    pub async fn start<P, L>(
        config: EngineConfig,
        source: S,
        store: Arc<P>,
        locator: &L,
        user: &str,
    ) -> Self
    where
        P: PersistencePort + 'static,
        L: LocationProvider,
    {
        let user: UserId = user.to_string();
        let fallback = config.search.default_location;
        let location = match tokio::time::timeout(
            config.timeouts.fetch(),
            resolve_location(locator, fallback),
        )
        .await
        {
            Ok(location) => location,
            Err(_) => {
                warn!("Location lookup timed out, using default location");
                fallback
            }
        };

        let radius_meters = config.search.radius_meters;
        let (context, candidates) = tokio::join!(
            load_session_context(store.as_ref(), &user, config.timeouts.load()),
            fetch_candidates(&source, location, radius_meters, config.timeouts.fetch()),
        );

        let committer = DecisionCommitter::spawn(store, user.clone(), context, config.stats.flush_every);

        let mut session = Self {
            gesture: GestureMachine::new(config.gesture.clone()),
            include_seen: config.deck.include_seen,
            config,
            source,
            engine: FilterEngine::with_default_catalog(),
            user,
            location,
            radius_meters,
            candidates,
            filters: FilterSet::new(),
            cursor: DeckCursor::new(),
            committer,
            rebuild_pending: false,
        };
        session.rebuild_deck();

        info!(
            "Session started at {:.4},{:.4}: {} candidates, {} in deck",
            location.lat,
            location.lng,
            session.candidates.len(),
            session.cursor.len()
        );
        session
    }

    /// Replace the predicate registry (the default catalog is used otherwise).
    pub fn with_filter_engine(mut self, engine: FilterEngine) -> Self {
        self.engine = engine;
        self.rebuild_deck();
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn location(&self) -> LatLng {
        self.location
    }

    pub fn radius_meters(&self) -> u32 {
        self.radius_meters
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn filter_engine(&self) -> &FilterEngine {
        &self.engine
    }

    // ---- deck ----

    pub fn current_card(&self) -> Option<&RestaurantRecord> {
        self.cursor.current()
    }

    pub fn preview_cards(&self, n: usize) -> &[RestaurantRecord] {
        self.cursor.peek(n)
    }

    /// Preview using the configured stack depth.
    pub fn preview(&self) -> &[RestaurantRecord] {
        self.cursor.peek(self.config.deck.preview_count)
    }

    pub fn remaining_count(&self) -> usize {
        self.cursor.remaining()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.status() == DeckStatus::Exhausted
    }

    pub fn deck_status(&self) -> DeckStatus {
        self.cursor.status()
    }

    // ---- gestures ----

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    pub fn active_gesture_position(&self) -> GesturePosition {
        self.gesture.position()
    }

    pub fn drag_start(&mut self) -> Transition {
        self.handle(GestureEvent::DragStart)
    }

    pub fn drag_move(&mut self, dx: f32, dy: f32) -> Transition {
        self.handle(GestureEvent::DragMove { dx, dy })
    }

    pub fn release(&mut self) -> Transition {
        self.handle(GestureEvent::Release)
    }

    pub fn animation_complete(&mut self) -> Transition {
        self.handle(GestureEvent::AnimationComplete)
    }

    /// Start a commit without a drag (like/pass buttons).
    pub fn trigger_commit(&mut self, direction: SwipeDirection) -> Transition {
        self.handle(GestureEvent::Trigger(direction))
    }

    /// Trigger and immediately finish a commit, for hosts without animations.
    /// Returns the committed record.
    pub fn swipe(&mut self, direction: SwipeDirection) -> Option<RestaurantRecord> {
        let record = self.cursor.current().cloned()?;
        if self.trigger_commit(direction) == Transition::Ignored {
            return None;
        }
        match self.animation_complete() {
            Transition::Commit(_) => Some(record),
            _ => None,
        }
    }

    /// Detach the session from its host.
    ///
    /// A commit whose exit animation was already running still fires; every
    /// later gesture event is ignored.
    pub fn teardown(&mut self) {
        if let Some(direction) = self.gesture.teardown() {
            debug!("Completing in-flight {} commit on teardown", direction.action());
            self.complete_commit(direction);
        }
    }

    fn handle(&mut self, event: GestureEvent) -> Transition {
        let has_card = self.cursor.remaining() > 0;
        let outcome = self.gesture.handle(event, has_card);

        if let Transition::Commit(direction) = outcome {
            self.complete_commit(direction);
        }
        if self.rebuild_pending && self.gesture.is_idle() {
            self.rebuild_deck();
        }
        outcome
    }

    /// Commit the current card, then advance. The order matters: advancing
    /// first would record the wrong card.
    fn complete_commit(&mut self, direction: SwipeDirection) {
        let Some(record) = self.cursor.current().cloned() else {
            warn!("Commit completed with no active card");
            return;
        };
        self.committer.commit(&record, direction);
        self.cursor.advance();
        debug!("{} remaining in deck", self.cursor.remaining());
    }

    // ---- filters and search ----

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
        self.rebuild_deck();
    }

    /// Flip one filter key. Returns its new state.
    pub fn toggle_filter(&mut self, key: &str) -> bool {
        let enabled = self.filters.toggle(key);
        self.rebuild_deck();
        enabled
    }

    pub fn include_previously_seen(&self) -> bool {
        self.include_seen
    }

    pub fn set_include_previously_seen(&mut self, include: bool) {
        if self.include_seen == include {
            return;
        }
        self.include_seen = include;
        self.rebuild_deck();
    }

    /// Forget every seen record and rebuild the deck from all candidates.
    pub fn reset_progress(&mut self) -> usize {
        let forgotten = self.committer.reset_progress();
        self.rebuild_deck();
        forgotten
    }

    /// Grow the search radius (capped) and fetch again. Returns the new radius.
    #[instrument(skip(self))]
    pub async fn expand_search_radius(&mut self, delta_meters: u32) -> u32 {
        let max = self.config.search.max_radius_meters;
        let radius = self.radius_meters.saturating_add(delta_meters).min(max);
        if radius == self.radius_meters {
            debug!("Search radius already at {}m", radius);
            return radius;
        }
        self.radius_meters = radius;
        self.refresh_candidates().await;
        radius
    }

    /// Fetch candidates again at the current location and radius.
    ///
    /// A failed or timed-out refetch keeps the current candidates and deck.
    /// Returns whether the candidate list was replaced.
    pub async fn refresh_candidates(&mut self) -> bool {
        let fetched = try_fetch_candidates(
            &self.source,
            self.location,
            self.radius_meters,
            self.config.timeouts.fetch(),
        )
        .await;
        match fetched {
            Some(candidates) => {
                self.candidates = candidates;
                self.rebuild_deck();
                true
            }
            None => {
                warn!(
                    "Refetch at {}m failed, keeping {} current candidates",
                    self.radius_meters,
                    self.candidates.len()
                );
                false
            }
        }
    }

    fn rebuild_deck(&mut self) {
        if !self.gesture.is_idle() {
            debug!("Gesture in progress, deferring deck rebuild");
            self.rebuild_pending = true;
            return;
        }
        let deck = self.engine.apply(
            &self.candidates,
            &self.filters,
            self.committer.seen(),
            self.include_seen,
        );
        self.cursor.reset(deck);
        self.rebuild_pending = false;
        debug!(
            "Deck rebuilt: {} of {} candidates",
            self.cursor.len(),
            self.candidates.len()
        );
    }

    // ---- decisions ----

    /// Remove a favorite. Returns false if it was not liked.
    pub fn unlike(&mut self, id: &str) -> bool {
        self.committer.unlike(id).is_some()
    }

    /// Favorites, most recently saved first.
    pub fn liked(&self) -> Vec<&LikedEntry> {
        self.committer.liked().by_most_recent()
    }

    pub fn liked_set(&self) -> &LikedSet {
        self.committer.liked()
    }

    pub fn seen(&self) -> &SeenSet {
        self.committer.seen()
    }

    pub fn stats(&self) -> SwipeStats {
        self.committer.stats()
    }

    /// Wait for every queued remote write to be attempted.
    pub async fn flush(&mut self) {
        self.committer.flush().await;
    }

    /// Tear down and drain remote writes.
    pub async fn close(mut self) {
        self.teardown();
        self.committer.close().await;
        info!(
            "Session closed: {} seen, {} liked",
            self.committer.seen().len(),
            self.committer.liked().len()
        );
    }
}
