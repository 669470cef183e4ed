use std::collections::{HashMap, VecDeque};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::{
    Coordinate, InventoryItem, PlayerColor,
    board::{MarketLayout, TileKind, half_board_size},
    economy::Economy,
    navigation::{
        NavigationError, adjacent_points, can_pick_up_here, is_minable_tile, nearest_market_in,
        path_to, unavailable_adjacent_tile,
    },
};

/// Represents actions a player can take on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Mine,
    PickUp,
    Idle,
}

impl Action {
    /// Every action a player may propose.
    pub const ALL: [Action; 7] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Mine,
        Action::PickUp,
        Action::Idle,
    ];

    /// The `(dx, dy)` step of a movement, or `None` for stationary actions.
    pub fn delta(self) -> Option<(i32, i32)> {
        match self {
            Action::MoveUp => Some((0, 1)),
            Action::MoveDown => Some((0, -1)),
            Action::MoveLeft => Some((-1, 0)),
            Action::MoveRight => Some((1, 0)),
            Action::Mine | Action::PickUp | Action::Idle => None,
        }
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Action::MoveUp | Action::MoveDown)
    }
}

/// Read-only projection of the board a player may inspect on its turn.
pub trait BoardView {
    /// Tile at `location`, or `None` when it is off the board.
    fn tile_at(&self, location: Coordinate) -> Option<TileKind>;

    /// Every mined item currently lying on the ground, with its location.
    fn items_on_ground(&self) -> &HashMap<InventoryItem, Coordinate>;

    fn my_location(&self) -> Coordinate;

    fn other_player_location(&self) -> Coordinate;
}

/// Errors an agent can report instead of an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error("Agent '{0}' was asked for an action before the round was initialized")]
    NotInitialized(String),
    #[error("Board size {0} is not one a round can be played on")]
    InvalidBoardSize(usize),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Everything a player is told when a round begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSetup {
    pub board_size: usize,
    pub max_inventory_size: usize,
    pub winning_score: u32,
    pub start_location: Coordinate,
    pub color: PlayerColor,
    pub seed: u64,
}

/// Trait defining the behavior of a Mineopoly player.
pub trait Agent {
    /// Display name of this strategy.
    fn name(&self) -> &str;

    /// Called once at the start of every round.
    fn initialize(&mut self, setup: RoundSetup) -> Result<(), AgentError>;

    /// Picks this turn's action.
    ///
    /// `is_red_turn` tells which player wins a contested move this turn; the
    /// match arbitrates, so strategies may ignore it.
    fn get_action(
        &mut self,
        view: &dyn BoardView,
        economy: &Economy,
        is_red_turn: bool,
    ) -> Result<Action, AgentError>;

    /// Called after a successful pick-up.
    fn on_item_received(&mut self, item: InventoryItem);

    /// Called after the whole inventory was sold at a market.
    fn on_inventory_sold(&mut self, total_price: u32);

    /// Called when the round is over.
    fn on_round_end(&mut self, my_score: u32, opponent_score: u32);
}

/// Whether a [`MinerAgent`]'s score survives into the next round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScorePolicy {
    #[default]
    ResetEachRound,
    PersistAcrossRounds,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub score_policy: ScorePolicy,
}

/// Coarse description of what a [`MinerAgent`] is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinerState {
    Idle,
    Gathering,
    EnRouteToMarket,
}

#[derive(Debug)]
struct RoundState {
    setup: RoundSetup,
    markets: MarketLayout,
    rng: StdRng,
}

/// A greedy miner: sells when full, otherwise picks up, mines, or wanders.
#[derive(Debug)]
pub struct MinerAgent {
    name: String,
    config: AgentConfig,
    round: Option<RoundState>,
    inventory: Vec<InventoryItem>,
    score: u32,
    going_to_market: bool,
    path_to_market: VecDeque<Action>,
}

impl MinerAgent {
    pub fn new(name: impl Into<String>, config: AgentConfig) -> Self {
        Self {
            name: name.into(),
            config,
            round: None,
            inventory: Vec::new(),
            score: 0,
            going_to_market: false,
            path_to_market: VecDeque::new(),
        }
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_en_route(&self) -> bool {
        self.going_to_market
    }

    /// Moves still queued on the current market journey.
    pub fn queued_path(&self) -> impl Iterator<Item = &Action> {
        self.path_to_market.iter()
    }

    pub fn state(&self) -> MinerState {
        if self.going_to_market {
            MinerState::EnRouteToMarket
        } else if self.inventory.is_empty() {
            MinerState::Idle
        } else {
            MinerState::Gathering
        }
    }

    fn clear_round_progress(&mut self) {
        self.inventory.clear();
        self.going_to_market = false;
        self.path_to_market.clear();
    }
}

impl Agent for MinerAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, setup: RoundSetup) -> Result<(), AgentError> {
        self.clear_round_progress();
        if self.config.score_policy == ScorePolicy::ResetEachRound {
            self.score = 0;
        }
        self.round = None;
        let half_size = half_board_size(setup.board_size)
            .ok_or(AgentError::InvalidBoardSize(setup.board_size))?;
        self.round = Some(RoundState {
            setup,
            markets: MarketLayout::new(half_size),
            rng: StdRng::seed_from_u64(setup.seed),
        });
        Ok(())
    }

    fn get_action(
        &mut self,
        view: &dyn BoardView,
        economy: &Economy,
        is_red_turn: bool,
    ) -> Result<Action, AgentError> {
        let round = self
            .round
            .as_mut()
            .ok_or_else(|| AgentError::NotInitialized(self.name.clone()))?;

        let location = view.my_location();
        let neighbors = adjacent_points(location)?;
        if let Some(blocked) = unavailable_adjacent_tile(&neighbors, view.other_player_location())
        {
            trace!(agent = %self.name, %blocked, is_red_turn, "opponent is adjacent");
        }

        // 1. Full inventory: plan a fresh journey to the nearest market
        if self.inventory.len() >= round.setup.max_inventory_size && !self.going_to_market {
            let market = nearest_market_in(&round.markets, location, round.setup.color);
            self.path_to_market = path_to(location, market)?.into();
            self.going_to_market = true;
            debug!(
                agent = %self.name,
                %location,
                %market,
                steps = self.path_to_market.len(),
                value = economy.inventory_value(&self.inventory),
                "heading to market"
            );
            if self.path_to_market.is_empty() {
                // Already standing on the market, wait for the sale
                self.going_to_market = false;
                return Ok(Action::Idle);
            }
        }

        // 2. Follow the journey
        if self.going_to_market {
            if let Some(action) = self.path_to_market.pop_front() {
                trace!(agent = %self.name, %location, ?action, "following market path");
                return Ok(action);
            }
            // Arrived without selling, replan once full again
            self.going_to_market = false;
        }

        // 3. Pick up what lies underfoot
        if can_pick_up_here(location, view.items_on_ground()) {
            trace!(agent = %self.name, %location, "picking up");
            return Ok(Action::PickUp);
        }

        // 4. Mine the current deposit
        if view.tile_at(location).is_some_and(is_minable_tile) {
            trace!(agent = %self.name, %location, "mining");
            return Ok(Action::Mine);
        }

        // 5. Nothing better to do
        let action = Action::ALL[round.rng.random_range(0..Action::ALL.len())];
        trace!(agent = %self.name, %location, ?action, "wandering");
        Ok(action)
    }

    fn on_item_received(&mut self, item: InventoryItem) {
        self.inventory.push(item);
    }

    fn on_inventory_sold(&mut self, total_price: u32) {
        self.inventory.clear();
        self.going_to_market = false;
        self.path_to_market.clear();
        self.score = self.score.saturating_add(total_price);
    }

    fn on_round_end(&mut self, my_score: u32, opponent_score: u32) {
        info!(
            agent = %self.name,
            my_score,
            opponent_score,
            tracked_score = self.score,
            "round over"
        );
        self.clear_round_progress();
        if self.config.score_policy == ScorePolicy::ResetEachRound {
            self.score = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ResourceKind, board::MAX_BOARD_SIZE};

    struct TestView {
        tiles: HashMap<Coordinate, TileKind>,
        items: HashMap<InventoryItem, Coordinate>,
        me: Coordinate,
        other: Coordinate,
    }

    impl TestView {
        fn at(me: Coordinate) -> Self {
            Self {
                tiles: HashMap::new(),
                items: HashMap::new(),
                me,
                other: Coordinate::new(19, 19),
            }
        }

        fn with_deposit(mut self, location: Coordinate) -> Self {
            self.tiles.insert(
                location,
                TileKind::Resource {
                    kind: ResourceKind::Emerald,
                },
            );
            self
        }

        fn with_item(mut self, location: Coordinate) -> Self {
            let id = self.items.len() + 100;
            self.items.insert(
                InventoryItem {
                    id,
                    kind: ResourceKind::Ruby,
                },
                location,
            );
            self
        }
    }

    impl BoardView for TestView {
        fn tile_at(&self, location: Coordinate) -> Option<TileKind> {
            let on_board = (0..20).contains(&location.x) && (0..20).contains(&location.y);
            on_board.then(|| self.tiles.get(&location).copied().unwrap_or_default())
        }

        fn items_on_ground(&self) -> &HashMap<InventoryItem, Coordinate> {
            &self.items
        }

        fn my_location(&self) -> Coordinate {
            self.me
        }

        fn other_player_location(&self) -> Coordinate {
            self.other
        }
    }

    fn setup(color: PlayerColor, seed: u64) -> RoundSetup {
        RoundSetup {
            board_size: 20,
            max_inventory_size: 2,
            winning_score: 1000,
            start_location: Coordinate::new(9, 9),
            color,
            seed,
        }
    }

    fn red_miner() -> MinerAgent {
        let mut agent = MinerAgent::new("miner", AgentConfig::default());
        agent.initialize(setup(PlayerColor::Red, 7)).unwrap();
        agent
    }

    fn fill(agent: &mut MinerAgent) {
        for id in 0..2 {
            agent.on_item_received(InventoryItem {
                id,
                kind: ResourceKind::Ruby,
            });
        }
    }

    #[test]
    fn refuses_to_act_before_initialize() {
        let mut agent = MinerAgent::new("early", AgentConfig::default());
        let view = TestView::at(Coordinate::new(0, 0));
        assert_eq!(
            agent.get_action(&view, &Economy::default(), true),
            Err(AgentError::NotInitialized("early".to_string()))
        );
    }

    #[test]
    fn market_path_beats_pick_up_and_mine() {
        let mut agent = red_miner();
        fill(&mut agent);
        let economy = Economy::default();

        let here = Coordinate::new(2, 2);
        let view = TestView::at(here).with_deposit(here).with_item(here);
        assert_eq!(agent.get_action(&view, &economy, true), Ok(Action::MoveRight));
        assert_eq!(agent.state(), MinerState::EnRouteToMarket);
        // Lower red market (9, 9): 6 more steps right, then 7 up
        assert_eq!(agent.queued_path().count(), 13);

        let next = Coordinate::new(3, 2);
        let view = TestView::at(next).with_deposit(next).with_item(next);
        assert_eq!(agent.get_action(&view, &economy, false), Ok(Action::MoveRight));
        assert_eq!(agent.queued_path().count(), 12);
    }

    #[test]
    fn selling_clears_inventory_and_journey() {
        let mut agent = red_miner();
        fill(&mut agent);
        let view = TestView::at(Coordinate::new(15, 15));
        agent.get_action(&view, &Economy::default(), true).unwrap();
        assert!(agent.is_en_route());

        agent.on_inventory_sold(100);
        assert!(agent.inventory().is_empty());
        assert!(!agent.is_en_route());
        assert_eq!(agent.queued_path().count(), 0);
        assert_eq!(agent.score(), 100);
        assert_eq!(agent.state(), MinerState::Idle);
    }

    #[test]
    fn selling_while_not_en_route_still_settles() {
        let mut agent = red_miner();
        agent.on_item_received(InventoryItem {
            id: 4,
            kind: ResourceKind::Emerald,
        });
        assert!(!agent.is_en_route());

        agent.on_inventory_sold(100);
        assert!(agent.inventory().is_empty());
        assert!(!agent.is_en_route());
        assert_eq!(agent.queued_path().count(), 0);
        assert_eq!(agent.score(), 100);
    }

    #[test]
    fn score_saturates_instead_of_overflowing() {
        let mut agent = red_miner();
        agent.on_inventory_sold(u32::MAX);
        agent.on_inventory_sold(u32::MAX);
        assert_eq!(agent.score(), u32::MAX);
    }

    #[test]
    fn initialize_rejects_unplayable_board_sizes() {
        for board_size in [0, 9, 21, MAX_BOARD_SIZE + 2, 1usize << 33, usize::MAX] {
            let mut agent = red_miner();
            let result = agent.initialize(RoundSetup {
                board_size,
                ..setup(PlayerColor::Red, 1)
            });
            assert_eq!(result, Err(AgentError::InvalidBoardSize(board_size)));

            // A failed setup leaves no round behind
            let view = TestView::at(Coordinate::new(0, 0));
            assert_eq!(
                agent.get_action(&view, &Economy::default(), true),
                Err(AgentError::NotInitialized("miner".to_string()))
            );
        }
    }

    #[test]
    fn off_range_locations_are_reported() {
        let mut agent = red_miner();
        let view = TestView::at(Coordinate::new(i32::MAX, 0));
        assert_eq!(
            agent.get_action(&view, &Economy::default(), true),
            Err(AgentError::Navigation(NavigationError::OutOfRange(
                Coordinate::new(i32::MAX, 0)
            )))
        );
    }

    #[test]
    fn each_journey_is_planned_from_scratch() {
        let mut agent = red_miner();
        let economy = Economy::default();

        fill(&mut agent);
        agent
            .get_action(&TestView::at(Coordinate::new(0, 0)), &economy, true)
            .unwrap();
        agent.on_inventory_sold(200);

        fill(&mut agent);
        // Upper red market (10, 10) from (12, 13): 2 left, 3 down
        let action = agent
            .get_action(&TestView::at(Coordinate::new(12, 13)), &economy, true)
            .unwrap();
        assert_eq!(action, Action::MoveLeft);
        let rest: Vec<Action> = agent.queued_path().copied().collect();
        assert_eq!(
            rest,
            vec![Action::MoveLeft, Action::MoveDown, Action::MoveDown, Action::MoveDown]
        );
    }

    #[test]
    fn waits_when_full_on_its_own_market() {
        let mut agent = red_miner();
        fill(&mut agent);
        let view = TestView::at(Coordinate::new(9, 9));
        assert_eq!(
            agent.get_action(&view, &Economy::default(), true),
            Ok(Action::Idle)
        );
        assert!(!agent.is_en_route());
    }

    #[test]
    fn exhausted_journey_is_replanned() {
        let mut agent = red_miner();
        fill(&mut agent);
        let economy = Economy::default();

        // One step from the lower market
        let first = agent
            .get_action(&TestView::at(Coordinate::new(8, 9)), &economy, true)
            .unwrap();
        assert_eq!(first, Action::MoveRight);

        // The move was discarded; the queue is empty, so the journey is dropped...
        let stuck = TestView::at(Coordinate::new(8, 9)).with_item(Coordinate::new(8, 9));
        assert_eq!(agent.get_action(&stuck, &economy, true), Ok(Action::PickUp));
        assert!(!agent.is_en_route());

        // ...and planned again on the following turn
        let again = agent
            .get_action(&TestView::at(Coordinate::new(8, 9)), &economy, true)
            .unwrap();
        assert_eq!(again, Action::MoveRight);
        assert!(agent.is_en_route());
    }

    #[test]
    fn picks_up_before_mining() {
        let mut agent = red_miner();
        let here = Coordinate::new(4, 4);
        let view = TestView::at(here).with_deposit(here).with_item(here);
        assert_eq!(
            agent.get_action(&view, &Economy::default(), true),
            Ok(Action::PickUp)
        );
    }

    #[test]
    fn mines_a_deposit_underfoot() {
        let mut agent = red_miner();
        let here = Coordinate::new(4, 4);
        let view = TestView::at(here)
            .with_deposit(here)
            .with_item(Coordinate::new(4, 5));
        assert_eq!(
            agent.get_action(&view, &Economy::default(), true),
            Ok(Action::Mine)
        );
        assert_eq!(agent.state(), MinerState::Idle);
    }

    #[test]
    fn wanders_reproducibly_when_nothing_applies() {
        let economy = Economy::default();
        let view = TestView::at(Coordinate::new(4, 4));

        let mut first = red_miner();
        let mut second = red_miner();
        for _ in 0..50 {
            let a = first.get_action(&view, &economy, true).unwrap();
            let b = second.get_action(&view, &economy, true).unwrap();
            assert_eq!(a, b);
            assert!(Action::ALL.contains(&a));
        }
    }

    #[test]
    fn score_policy_decides_what_survives_a_round() {
        let mut resetting = red_miner();
        resetting.on_inventory_sold(300);
        resetting.on_round_end(300, 100);
        assert_eq!(resetting.score(), 0);

        let mut persisting = MinerAgent::new(
            "keeper",
            AgentConfig {
                score_policy: ScorePolicy::PersistAcrossRounds,
            },
        );
        persisting.initialize(setup(PlayerColor::Blue, 1)).unwrap();
        fill(&mut persisting);
        persisting.on_inventory_sold(300);
        persisting.on_item_received(InventoryItem {
            id: 9,
            kind: ResourceKind::Diamond,
        });
        persisting.on_round_end(300, 100);
        assert!(persisting.inventory().is_empty());
        persisting.initialize(setup(PlayerColor::Blue, 2)).unwrap();
        assert_eq!(persisting.score(), 300);
    }

    #[test]
    fn blue_heads_to_its_own_market() {
        let mut agent = MinerAgent::new("blue", AgentConfig::default());
        agent.initialize(setup(PlayerColor::Blue, 3)).unwrap();
        fill(&mut agent);
        // Upper-left of blue upper (9, 10): go there
        let action = agent
            .get_action(&TestView::at(Coordinate::new(9, 12)), &Economy::default(), false)
            .unwrap();
        assert_eq!(action, Action::MoveDown);
        assert_eq!(agent.queued_path().count(), 1);
    }
}
