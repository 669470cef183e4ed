use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::{
    Coordinate, EntityId, InventoryItem, PlayerColor,
    agent::{Action, Agent, AgentError, BoardView, RoundSetup},
    board::{Board, GeneratorError, TileKind, generate},
    economy::Economy,
};

/// Parameters of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub board_size: usize,
    pub max_inventory_size: usize,
    pub winning_score: u32,
    /// The round ends without a winner after this many turns.
    pub max_turns: u32,
    pub seed: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board_size: 20,
            max_inventory_size: 5,
            winning_score: 5000,
            max_turns: 1000,
            seed: 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("Max inventory size must be at least 1")]
    EmptyInventory,
}

/// Represents the outcome of processing one player's action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Success,
    Failure(String),
}

/// What a turn left the round in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    Winner(PlayerColor),
    /// Turn limit reached with nobody at the winning score.
    OutOfTurns,
}

/// Final tally of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub red_score: u32,
    pub blue_score: u32,
    pub winner: Option<PlayerColor>,
    pub turns: u32,
}

/// Holds the state the match tracks for each player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub color: PlayerColor,
    pub location: Coordinate,
    pub inventory: Vec<InventoryItem>,
    pub score: u32,
    /// Consecutive `Mine` actions spent on the current tile.
    pub mining_progress: u32,
}

/// The per-turn view handed to one player.
#[derive(Debug)]
pub struct PlayerView<'a> {
    pub board: &'a Board,
    pub items_on_ground: &'a HashMap<InventoryItem, Coordinate>,
    pub location: Coordinate,
    pub other_location: Coordinate,
}

impl BoardView for PlayerView<'_> {
    fn tile_at(&self, location: Coordinate) -> Option<TileKind> {
        self.board.tile_at(location)
    }

    fn items_on_ground(&self) -> &HashMap<InventoryItem, Coordinate> {
        self.items_on_ground
    }

    fn my_location(&self) -> Coordinate {
        self.location
    }

    fn other_player_location(&self) -> Coordinate {
        self.other_location
    }
}

#[inline]
fn slot(color: PlayerColor) -> usize {
    match color {
        PlayerColor::Red => 0,
        PlayerColor::Blue => 1,
    }
}

/// Runs one round of Mineopoly between two strategies.
pub struct Environment {
    board: Board,
    items_on_ground: HashMap<InventoryItem, Coordinate>,
    players: [PlayerState; 2],
    strategies: [Box<dyn Agent>; 2],
    economy: Economy,
    config: MatchConfig,
    turn: u32,
    next_item_id: EntityId,
    outcome: Option<TurnOutcome>,
}

impl Environment {
    /// Generates the board from `config.seed` and initializes both strategies.
    pub fn new(
        config: MatchConfig,
        red: Box<dyn Agent>,
        blue: Box<dyn Agent>,
    ) -> Result<Self, MatchError> {
        let board = generate(config.seed, config.board_size)?;
        Self::with_board(board, config, red, blue)
    }

    /// Starts a round on an already built board.
    pub fn with_board(
        board: Board,
        config: MatchConfig,
        red: Box<dyn Agent>,
        blue: Box<dyn Agent>,
    ) -> Result<Self, MatchError> {
        if config.max_inventory_size == 0 {
            return Err(MatchError::EmptyInventory);
        }

        let player = |color| PlayerState {
            color,
            location: board.start_location(color),
            inventory: Vec::with_capacity(config.max_inventory_size),
            score: 0,
            mining_progress: 0,
        };
        let players = [player(PlayerColor::Red), player(PlayerColor::Blue)];
        let mut strategies = [red, blue];

        for (index, strategy) in strategies.iter_mut().enumerate() {
            strategy.initialize(RoundSetup {
                board_size: board.size(),
                max_inventory_size: config.max_inventory_size,
                winning_score: config.winning_score,
                start_location: players[index].location,
                color: players[index].color,
                seed: config.seed.wrapping_add(index as u64 + 1),
            })?;
        }

        Ok(Environment {
            board,
            items_on_ground: HashMap::new(),
            players,
            strategies,
            economy: Economy::default(),
            config,
            turn: 0,
            next_item_id: 0,
            outcome: None,
        })
    }

    pub fn with_economy(mut self, economy: Economy) -> Self {
        self.economy = economy;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn items_on_ground(&self) -> &HashMap<InventoryItem, Coordinate> {
        &self.items_on_ground
    }

    pub fn player(&self, color: PlayerColor) -> &PlayerState {
        &self.players[slot(color)]
    }

    pub fn strategy_name(&self, color: PlayerColor) -> &str {
        self.strategies[slot(color)].name()
    }

    /// Asks both players for an action and applies them.
    ///
    /// When both players move onto the same tile, only the player holding
    /// turn priority moves. Priority alternates, red first.
    pub fn process_turn(&mut self) -> Result<TurnOutcome, MatchError> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }
        if self.turn >= self.config.max_turns {
            self.outcome = Some(TurnOutcome::OutOfTurns);
            return Ok(TurnOutcome::OutOfTurns);
        }

        let is_red_turn = self.turn % 2 == 0;
        let mut actions = [Action::Idle; 2];
        for (index, strategy) in self.strategies.iter_mut().enumerate() {
            let view = PlayerView {
                board: &self.board,
                items_on_ground: &self.items_on_ground,
                location: self.players[index].location,
                other_location: self.players[1 - index].location,
            };
            actions[index] = strategy.get_action(&view, &self.economy, is_red_turn)?;
        }

        let targets = [0, 1].map(|index| {
            actions[index]
                .delta()
                .map(|(dx, dy)| self.players[index].location.offset(dx, dy))
        });
        if let [Some(red_target), Some(blue_target)] = targets {
            if red_target == blue_target {
                let loser = if is_red_turn { 1 } else { 0 };
                debug!(turn = self.turn, target = %red_target, "contested move, priority decides");
                actions[loser] = Action::Idle;
            }
        }

        for index in 0..2 {
            let color = self.players[index].color;
            if let ActionResult::Failure(reason) = self.process_action(index, actions[index]) {
                trace!(?color, action = ?actions[index], %reason, "action had no effect");
            }
            self.sell_if_on_market(index);
        }
        self.turn += 1;

        let outcome = self.check_outcome(is_red_turn);
        if outcome != TurnOutcome::Continue {
            self.outcome = Some(outcome);
        }
        Ok(outcome)
    }

    /// Plays turns until the round is decided, then notifies both strategies.
    pub fn run(&mut self) -> Result<RoundResult, MatchError> {
        let outcome = loop {
            match self.process_turn()? {
                TurnOutcome::Continue => continue,
                decided => break decided,
            }
        };

        let red_score = self.players[0].score;
        let blue_score = self.players[1].score;
        self.strategies[0].on_round_end(red_score, blue_score);
        self.strategies[1].on_round_end(blue_score, red_score);

        let winner = match outcome {
            TurnOutcome::Winner(color) => Some(color),
            _ => None,
        };
        info!(red_score, blue_score, ?winner, turns = self.turn, "round finished");
        Ok(RoundResult {
            red_score,
            blue_score,
            winner,
            turns: self.turn,
        })
    }

    /// Processes a single action for the player in `index`.
    fn process_action(&mut self, index: usize, action: Action) -> ActionResult {
        let location = self.players[index].location;

        match action {
            Action::Idle => ActionResult::Success,
            Action::MoveUp | Action::MoveDown | Action::MoveLeft | Action::MoveRight => {
                let Some((dx, dy)) = action.delta() else {
                    return ActionResult::Failure("Not a movement.".to_string());
                };
                let target = location.offset(dx, dy);
                if self.board.tile_at(target).is_none() {
                    return ActionResult::Failure(format!("Target {target} is out of bounds."));
                }
                let player = &mut self.players[index];
                player.location = target;
                player.mining_progress = 0;
                ActionResult::Success
            }
            Action::Mine => {
                let Some(TileKind::Resource { kind }) = self.board.tile_at(location) else {
                    return ActionResult::Failure(format!("Nothing to mine at {location}."));
                };
                let player = &mut self.players[index];
                player.mining_progress += 1;
                if player.mining_progress < kind.turns_to_mine() {
                    return ActionResult::Success;
                }

                player.mining_progress = 0;
                if let Err(err) = self.board.set_tile(location, TileKind::Empty) {
                    return ActionResult::Failure(err.to_string());
                }
                let item = InventoryItem {
                    id: self.next_item_id,
                    kind,
                };
                self.next_item_id += 1;
                self.items_on_ground.insert(item, location);
                debug!(?kind, %location, "deposit mined out");
                ActionResult::Success
            }
            Action::PickUp => {
                if self.players[index].inventory.len() >= self.config.max_inventory_size {
                    return ActionResult::Failure("Inventory is full.".to_string());
                }
                // Lowest id first so the outcome never depends on map order
                let Some(item) = self
                    .items_on_ground
                    .iter()
                    .filter(|(_, at)| **at == location)
                    .map(|(item, _)| *item)
                    .min_by_key(|item| item.id)
                else {
                    return ActionResult::Failure(format!("No item at {location}."));
                };
                self.items_on_ground.remove(&item);
                self.players[index].inventory.push(item);
                self.strategies[index].on_item_received(item);
                ActionResult::Success
            }
        }
    }

    fn sell_if_on_market(&mut self, index: usize) {
        let player = &mut self.players[index];
        let on_own_market = self.board.tile_at(player.location)
            == Some(TileKind::Market {
                owner: player.color,
            });
        if !on_own_market || player.inventory.is_empty() {
            return;
        }

        let total = self.economy.inventory_value(&player.inventory);
        player.score = player.score.saturating_add(total);
        player.inventory.clear();
        debug!(color = ?player.color, total, score = player.score, "inventory sold");
        self.strategies[index].on_inventory_sold(total);
    }

    fn check_outcome(&self, is_red_turn: bool) -> TurnOutcome {
        let winning = self.config.winning_score;
        let [red, blue] = [self.players[0].score, self.players[1].score];
        match (red >= winning, blue >= winning) {
            (true, false) => TurnOutcome::Winner(PlayerColor::Red),
            (false, true) => TurnOutcome::Winner(PlayerColor::Blue),
            (true, true) => {
                let color = if red > blue || (red == blue && is_red_turn) {
                    PlayerColor::Red
                } else {
                    PlayerColor::Blue
                };
                TurnOutcome::Winner(color)
            }
            (false, false) if self.turn >= self.config.max_turns => TurnOutcome::OutOfTurns,
            (false, false) => TurnOutcome::Continue,
        }
    }
}
