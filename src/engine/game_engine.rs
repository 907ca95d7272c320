//! The aggregate root.

use chrono::Utc;
use rustc_hash::FxHashSet;
use tracing::{debug, info, instrument, warn};

use crate::core::{EngineConfig, Game, GameId, GameState, IdGenerator, NewPlayer, Player, PlayerId};
use crate::error::BowlingError;
use crate::rules::{self, turn};
use crate::storage::{StorageError, StorageGateway, StorageSchema};
use crate::undo::UndoManager;

use super::publisher::{StatePublisher, SubscriptionId};
use super::view::GameView;

/// Result of an operation that changed engine state.
///
/// The change is always applied in memory. If writing it to the store
/// failed, the failure is carried here instead of failing the operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Committed<T = Game> {
    /// The operation's result.
    pub value: T,
    /// Save failure, if the store rejected the write.
    pub storage_warning: Option<StorageError>,
}

impl<T> Committed<T> {
    /// Whether the change reached the store.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.storage_warning.is_none()
    }

    /// Drop the warning and keep the value.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Owns the game collection and applies every operation on it.
///
/// Operations validate first and return `Err` without touching anything.
/// On success the new game value replaces the old one in memory, is handed
/// to the store, and is published to subscribers, in that order.
pub struct GameEngine<S: StorageGateway> {
    schema: StorageSchema,
    store: S,
    publisher: StatePublisher,
    ids: IdGenerator,
    undo: UndoManager,
    startup_warning: Option<StorageError>,
}

impl<S: StorageGateway> GameEngine<S> {
    /// Load the stored collection and resume the active game, if any.
    ///
    /// A failed load starts from an empty collection; the failure is kept
    /// in [`startup_warning`](Self::startup_warning).
    pub fn new(store: S, config: &EngineConfig) -> Self {
        let (schema, startup_warning) = match store.load() {
            Ok(schema) => (schema, None),
            Err(err) => {
                warn!(error = %err, "could not load stored games, starting empty");
                (StorageSchema::default(), Some(err))
            }
        };

        info!(
            games = schema.games.len(),
            active = ?schema.active_game_id,
            "engine ready"
        );

        let mut publisher = StatePublisher::new();
        publisher.publish(schema.active_game().cloned());

        Self {
            schema,
            store,
            publisher,
            ids: IdGenerator::from_seed(config.id_seed),
            undo: UndoManager::with_max_depth(config.max_undo_depth),
            startup_warning,
        }
    }

    /// Load failure from construction, if any.
    #[must_use]
    pub fn startup_warning(&self) -> Option<&StorageError> {
        self.startup_warning.as_ref()
    }

    fn active(&self) -> Result<&Game, BowlingError> {
        self.schema.active_game().ok_or(BowlingError::NoActiveGame)
    }

    fn fresh_game_id(&mut self) -> GameId {
        loop {
            let id = self.ids.game_id();
            if self.schema.game(&id).is_none() {
                return id;
            }
        }
    }

    fn fresh_player_id(&mut self, taken: impl Fn(&PlayerId) -> bool) -> PlayerId {
        loop {
            let id = self.ids.player_id();
            if !taken(&id) {
                return id;
            }
        }
    }

    fn persist(&mut self) -> Option<StorageError> {
        match self.store.save(&self.schema) {
            Ok(()) => None,
            Err(err) => {
                warn!(error = %err, "save failed, in-memory state kept");
                Some(err)
            }
        }
    }

    fn publish(&mut self) {
        self.publisher.publish(self.schema.active_game().cloned());
    }

    /// Store `game` as the active game, save, publish.
    fn commit(&mut self, game: Game) -> Committed {
        self.schema.active_game_id = Some(game.id().clone());
        self.schema.upsert(game.clone());
        let storage_warning = self.persist();
        self.publish();
        Committed {
            value: game,
            storage_warning,
        }
    }

    /// Start a game with `players` in turn order and make it active.
    ///
    /// Players without an id get a generated one; blank names become
    /// `Player N`. Fails with `InvalidPlayerList` on an empty list or
    /// duplicate ids.
    #[instrument(skip(self, players), fields(players = players.len()))]
    pub fn start_new_game(&mut self, players: Vec<NewPlayer>) -> Result<Committed, BowlingError> {
        if players.is_empty() {
            return Err(BowlingError::player_list("at least one player is required"));
        }

        let mut seen: FxHashSet<PlayerId> = FxHashSet::default();
        for id in players.iter().filter_map(|p| p.id.as_ref()) {
            if !seen.insert(id.clone()) {
                return Err(BowlingError::player_list(format!("duplicate player id {id}")));
            }
        }

        let now = Utc::now();
        let mut roster = im::Vector::new();
        for (position, new) in players.iter().enumerate() {
            let id = match &new.id {
                Some(id) => id.clone(),
                None => self.fresh_player_id(|id| seen.contains(id)),
            };
            seen.insert(id.clone());
            roster.push_back(Player::new(id, new.display_name(position), now));
        }

        let id = self.fresh_game_id();
        let game = Game::new(GameState::new(id, roster, now));
        info!(game = %game.id(), players = game.players().len(), "game started");
        Ok(self.commit(game))
    }

    /// Add a player to the active game, or start a game with just them.
    ///
    /// A player whose id is already on the roster is replaced in place and
    /// keeps their frames.
    #[instrument(skip(self), fields(name = %player.name))]
    pub fn add_player(&mut self, player: NewPlayer) -> Result<Committed, BowlingError> {
        let Some(game) = self.schema.active_game().cloned() else {
            return self.start_new_game(vec![player]);
        };

        let id = match &player.id {
            Some(id) => id.clone(),
            None => self.fresh_player_id(|id| game.state.player_index(id).is_some()),
        };
        let position = game
            .state
            .player_index(&id)
            .unwrap_or(game.state.player_count());

        let now = Utc::now();
        let added = Player::new(id, player.display_name(position), now);
        debug!(player = %added.id, position, "adding player");

        let state = turn::add_player(&game.state, added, now);
        let next = self.undo.commit(&game, state, now);
        Ok(self.commit(next))
    }

    /// Remove a player and their frames from the active game.
    #[instrument(skip(self))]
    pub fn remove_player(&mut self, id: &PlayerId) -> Result<Committed, BowlingError> {
        let game = self.active()?;
        let now = Utc::now();
        let state = turn::remove_player(&game.state, id, now)?;
        let next = self.undo.commit(game, state, now);
        if next.state.is_finished() && !game.state.is_finished() {
            info!(game = %next.id(), "game finished");
        }
        Ok(self.commit(next))
    }

    /// Roll for whoever's turn it is.
    ///
    /// Fails with `NoActiveGame`, `NoActivePlayer`, `GameFinished`, or
    /// `InvalidRoll`, leaving everything unchanged.
    #[instrument(skip(self))]
    pub fn roll(&mut self, pins: u8) -> Result<Committed, BowlingError> {
        let game = self.active()?;
        let now = Utc::now();
        let state = turn::apply_roll(&game.state, pins, now)?;
        let next = self.undo.commit(game, state, now);

        debug!(totals = ?rules::totals(&next.state), "totals");
        if next.state.is_finished() {
            info!(game = %next.id(), "game finished");
        }
        Ok(self.commit(next))
    }

    /// Step the active game back one mutation. `None` if there is no active
    /// game or nothing to undo.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> Option<Committed> {
        let restored = self.undo.undo(self.schema.active_game()?)?;
        debug!(game = %restored.id(), depth = restored.undo_depth(), "undone");
        Some(self.commit(restored))
    }

    /// The active game.
    #[must_use]
    pub fn current_game(&self) -> Option<&Game> {
        self.schema.active_game()
    }

    /// Totals for the active game in turn order, empty without one.
    #[must_use]
    pub fn totals(&self) -> Vec<(PlayerId, u32)> {
        self.current_game()
            .map(|g| rules::totals(&g.state))
            .unwrap_or_default()
    }

    /// Scoreboard for the active game.
    #[must_use]
    pub fn view(&self) -> Option<GameView> {
        self.current_game().map(GameView::of)
    }

    /// Every stored game.
    #[must_use]
    pub fn games(&self) -> &[Game] {
        &self.schema.games
    }

    /// Make a stored game active.
    #[instrument(skip(self))]
    pub fn load_game(&mut self, id: &GameId) -> Result<Committed, BowlingError> {
        let game = self
            .schema
            .game(id)
            .cloned()
            .ok_or_else(|| BowlingError::UnknownGame { id: id.clone() })?;
        info!(game = %id, "game loaded");
        Ok(self.commit(game))
    }

    /// Delete a stored game, clearing the active game if it was this one.
    #[instrument(skip(self))]
    pub fn delete_game(&mut self, id: &GameId) -> Result<Committed, BowlingError> {
        let removed = self
            .schema
            .remove(id)
            .ok_or_else(|| BowlingError::UnknownGame { id: id.clone() })?;
        info!(game = %id, "game deleted");

        let storage_warning = self.persist();
        self.publish();
        Ok(Committed {
            value: removed,
            storage_warning,
        })
    }

    /// Put the active game aside. It stays stored and can be loaded again;
    /// the next `add_player` starts a fresh game.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> Committed<Option<GameId>> {
        let previous = self.schema.active_game_id.take();
        info!(previous = ?previous, "active game cleared");

        let storage_warning = self.persist();
        self.publish();
        Committed {
            value: previous,
            storage_warning,
        }
    }

    /// Watch the active game. The callback runs once now and after every
    /// committed change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(Option<&Game>) + 'static,
    {
        self.publisher.subscribe(callback)
    }

    /// Stop watching.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.publisher.unsubscribe(id)
    }

    /// Last published game.
    #[must_use]
    pub fn published(&self) -> Option<&Game> {
        self.publisher.latest()
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The backing store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the engine, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: StorageGateway> std::fmt::Debug for GameEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("games", &self.schema.games.len())
            .field("active", &self.schema.active_game_id)
            .field("undo", &self.undo)
            .field("publisher", &self.publisher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Turn;
    use crate::storage::MemoryStore;

    fn engine() -> GameEngine<MemoryStore> {
        GameEngine::new(MemoryStore::new(), &EngineConfig::default().with_id_seed(7))
    }

    fn started(names: &[&str]) -> GameEngine<MemoryStore> {
        let mut engine = engine();
        let players = names.iter().map(|n| NewPlayer::new(*n, *n)).collect();
        engine.start_new_game(players).unwrap();
        engine
    }

    #[test]
    fn test_start_rejects_empty_roster() {
        let err = engine().start_new_game(Vec::new()).unwrap_err();
        assert!(matches!(err, BowlingError::InvalidPlayerList { .. }));
    }

    #[test]
    fn test_start_rejects_duplicate_ids() {
        let err = engine()
            .start_new_game(vec![NewPlayer::new("a", "Ann"), NewPlayer::new("a", "Al")])
            .unwrap_err();
        assert!(matches!(err, BowlingError::InvalidPlayerList { .. }));
    }

    #[test]
    fn test_start_generates_ids_and_names() {
        let mut engine = engine();
        let game = engine
            .start_new_game(vec![NewPlayer::named("Ann"), NewPlayer::named("  ")])
            .unwrap()
            .into_value();

        assert_eq!(game.players().len(), 2);
        assert_ne!(game.players()[0].id, game.players()[1].id);
        assert_eq!(game.players()[1].name, "Player 2");
        assert_eq!(game.undo_depth(), 0);
        assert_eq!(engine.store().save_count(), 1);
    }

    #[test]
    fn test_add_player_without_game_starts_one() {
        let mut engine = engine();
        let game = engine.add_player(NewPlayer::named("Solo")).unwrap().into_value();
        assert_eq!(game.players().len(), 1);
        assert_eq!(game.undo_depth(), 0);
        assert_eq!(engine.current_game(), Some(&game));
    }

    #[test]
    fn test_roll_without_game() {
        assert_eq!(engine().roll(3).unwrap_err(), BowlingError::NoActiveGame);
    }

    #[test]
    fn test_roll_pushes_one_snapshot() {
        let mut engine = started(&["a"]);
        engine.roll(3).unwrap();
        engine.roll(4).unwrap();
        assert_eq!(engine.current_game().unwrap().undo_depth(), 2);
        assert_eq!(engine.totals(), vec![(PlayerId::new("a"), 7)]);
    }

    #[test]
    fn test_rejected_roll_changes_nothing() {
        let mut engine = started(&["a"]);
        engine.roll(8).unwrap();
        let before = engine.current_game().cloned();
        let saves = engine.store().save_count();

        assert!(engine.roll(5).unwrap_err().is_invalid_roll());
        assert_eq!(engine.current_game().cloned(), before);
        assert_eq!(engine.store().save_count(), saves);
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut engine = started(&["a"]);
        let saves = engine.store().save_count();
        assert!(engine.undo().is_none());
        assert_eq!(engine.store().save_count(), saves);
    }

    #[test]
    fn test_save_failure_keeps_state() {
        let mut engine = started(&["a"]);
        engine.store_mut().fail_saves(true);

        let committed = engine.roll(10).unwrap();
        assert!(!committed.is_durable());
        assert_eq!(engine.current_game(), Some(&committed.value));
        assert_eq!(
            engine.current_game().unwrap().turn(),
            &Turn::AwaitingRoll {
                player: PlayerId::new("a"),
                frame: 2
            }
        );
    }

    #[test]
    fn test_load_failure_starts_empty() {
        let mut store = MemoryStore::new();
        store.fail_loads(true);
        let engine = GameEngine::new(store, &EngineConfig::default());
        assert!(engine.startup_warning().is_some());
        assert!(engine.current_game().is_none());
    }

    #[test]
    fn test_reset_then_load() {
        let mut engine = started(&["a"]);
        let id = engine.current_game().unwrap().id().clone();

        assert_eq!(engine.reset().value, Some(id.clone()));
        assert!(engine.current_game().is_none());
        assert_eq!(engine.games().len(), 1);

        engine.load_game(&id).unwrap();
        assert_eq!(engine.current_game().unwrap().id(), &id);
    }

    #[test]
    fn test_unknown_game() {
        let mut engine = engine();
        let id = GameId::new("nope");
        assert_eq!(
            engine.load_game(&id).unwrap_err(),
            BowlingError::UnknownGame { id: id.clone() }
        );
        assert_eq!(
            engine.delete_game(&id).unwrap_err(),
            BowlingError::UnknownGame { id }
        );
    }

    #[test]
    fn test_seeded_ids_repeat() {
        let first = engine().add_player(NewPlayer::named("x")).unwrap().into_value();
        let second = engine().add_player(NewPlayer::named("x")).unwrap().into_value();
        assert_eq!(first.id(), second.id());
        assert_eq!(first.players()[0].id, second.players()[0].id);
    }
}
