use mineopoly_core::{
    PlayerColor,
    agent::{AgentConfig, MinerAgent},
    environment::{Environment, MatchConfig, RoundResult},
};

fn play(config: MatchConfig) -> RoundResult {
    let red = MinerAgent::new("red", AgentConfig::default());
    let blue = MinerAgent::new("blue", AgentConfig::default());
    let mut env = Environment::new(config, Box::new(red), Box::new(blue)).unwrap();
    assert_eq!(env.strategy_name(PlayerColor::Red), "red");
    env.run().unwrap()
}

#[test]
fn identical_seeds_replay_identically() {
    let config = MatchConfig {
        seed: 1234,
        max_turns: 600,
        ..MatchConfig::default()
    };
    assert_eq!(play(config), play(config));
}

#[test]
fn rounds_respect_turn_limit_and_winning_score() {
    for seed in 0..5 {
        let config = MatchConfig {
            board_size: 14,
            max_inventory_size: 1,
            winning_score: 300,
            max_turns: 400,
            seed,
        };
        let result = play(config);
        assert!(result.turns <= config.max_turns);
        match result.winner {
            Some(PlayerColor::Red) => assert!(result.red_score >= config.winning_score),
            Some(PlayerColor::Blue) => assert!(result.blue_score >= config.winning_score),
            None => {
                assert_eq!(result.turns, config.max_turns);
                assert!(result.red_score < config.winning_score);
                assert!(result.blue_score < config.winning_score);
            }
        }
    }
}

#[test]
fn miners_stay_on_the_board() {
    let config = MatchConfig {
        board_size: 10,
        max_turns: 300,
        seed: 77,
        ..MatchConfig::default()
    };
    let red = MinerAgent::new("red", AgentConfig::default());
    let blue = MinerAgent::new("blue", AgentConfig::default());
    let mut env = Environment::new(config, Box::new(red), Box::new(blue)).unwrap();
    for _ in 0..config.max_turns {
        env.process_turn().unwrap();
        for color in [PlayerColor::Red, PlayerColor::Blue] {
            let player = env.player(color);
            assert!(env.board().tile_at(player.location).is_some());
            assert!(player.inventory.len() <= config.max_inventory_size);
        }
    }
}
