//! Turn protocol scenarios with scripted oracles and a recording host.

mod common;

use common::{GatedOracle, HostEvent, RecordingBridge, ScriptedOracle, ScriptedRandom, controller};
use parley_games::{
    Board, Cell, ControllerError, Coord, Dice, GameStatus, Phase, Symbol, SymbolChoice, Winner,
    legal_moves,
};

fn at(row: usize, col: usize) -> Coord {
    Coord::new(row, col).unwrap()
}

#[tokio::test]
async fn player_x_wins_the_top_row() {
    let oracle = ScriptedOracle::new(&["(1, 0)", "I'll take 1,1"]);
    let bridge = RecordingBridge::new();
    let game = controller(oracle.clone(), bridge.clone(), Dice::seeded(1));

    assert_eq!(game.start(SymbolChoice::X).await.unwrap(), Symbol::X);
    for (row, col) in [(0, 0), (0, 1), (0, 2)] {
        assert!(game.submit_player_move(row, col).await);
        game.settle().await;
    }

    let state = game.snapshot().unwrap();
    assert_eq!(state.status(), GameStatus::Won);
    assert_eq!(state.winner(), Some(Winner::Symbol(Symbol::X)));
    assert_eq!(state.history().len(), 5);
    assert_eq!(state.board().get(at(1, 0)), Cell::Marked(Symbol::O));
    assert_eq!(oracle.calls(), 2);
    assert_eq!(game.phase(), Phase::Won);

    assert_eq!(
        bridge.finals(),
        vec!["[Alex (X) played Tic-Tac-Toe against Sera (O). Outcome: Alex wins]".to_string()]
    );
    assert_eq!(
        bridge.last_status(),
        Some(("Alex (X) vs Sera (O)".to_string(), "Game over: Alex wins".to_string()))
    );

    let injected = bridge.injected();
    assert_eq!(injected.len(), 1);
    let (key, text) = &injected[0];
    let id = game.instance_id().unwrap();
    assert_eq!(key, &id.commentary_key());
    assert!(text.starts_with("[Alex (X) just finished a game of Tic-Tac-Toe against Sera (O)."));
    assert!(text.contains("Outcome: Alex wins."));
    assert_eq!(bridge.retracted(), vec![key.clone()]);
}

#[tokio::test]
async fn useless_oracle_still_finishes_the_game() {
    let oracle = ScriptedOracle::always("I pass");
    let bridge = RecordingBridge::new();
    let game = controller(oracle.clone(), bridge.clone(), Dice::seeded(42));
    game.start(SymbolChoice::X).await.unwrap();

    let mut player_moves = 0;
    while game.phase() == Phase::InProgress {
        let state = game.snapshot().unwrap();
        assert!(state.is_player_turn());
        let next = legal_moves(state.board())[0];
        assert!(game.submit_player_move(next.row(), next.col()).await);
        game.settle().await;
        player_moves += 1;
        assert!(player_moves <= 5);
    }

    let state = game.snapshot().unwrap();
    assert!(state.status().is_terminal());
    assert!(state.history().len() <= 9);
    assert_eq!(state.history().len(), state.board().marked_count());
    let oracle_moves = state.history().len() - player_moves;
    assert_eq!(oracle.calls(), 3 * oracle_moves);
    assert_eq!(bridge.finals().len(), 1);
}

#[tokio::test]
async fn undo_restores_the_empty_board() {
    let oracle = ScriptedOracle::new(&["(0, 0)"]);
    let bridge = RecordingBridge::new();
    let game = controller(oracle, bridge.clone(), Dice::seeded(1));
    game.start(SymbolChoice::X).await.unwrap();

    assert!(game.submit_player_move(1, 1).await);
    game.settle().await;
    assert_eq!(game.snapshot().unwrap().history().len(), 2);

    assert!(game.undo_last_two_moves());
    let state = game.snapshot().unwrap();
    assert_eq!(state.board(), &Board::new());
    assert_eq!(state.current_turn(), Symbol::X);
    assert_eq!(state.status(), GameStatus::InProgress);
    assert_eq!(state.winner(), None);
    assert!(!game.undo_last_two_moves());

    assert!(matches!(
        bridge.events().last(),
        Some(HostEvent::Status { bottom, .. }) if bottom == "Your turn"
    ));
}

#[tokio::test]
async fn input_is_rejected_while_the_oracle_thinks() {
    let oracle = GatedOracle::new("(2, 2)");
    let game = controller(oracle.clone(), RecordingBridge::new(), Dice::seeded(1));
    game.start(SymbolChoice::X).await.unwrap();

    assert!(game.submit_player_move(1, 1).await);
    oracle.entered.notified().await;
    assert!(game.is_resolving());
    assert!(!game.submit_player_move(0, 0).await);
    assert!(!game.undo_last_two_moves());

    oracle.release.notify_one();
    game.settle().await;

    let state = game.snapshot().unwrap();
    assert!(!game.is_resolving());
    assert_eq!(state.history().len(), 2);
    assert_eq!(state.board().get(at(2, 2)), Cell::Marked(Symbol::O));
    assert!(state.board().is_empty(at(0, 0)));
}

#[tokio::test]
async fn abort_discards_an_in_flight_oracle_move() {
    let oracle = GatedOracle::new("(2, 2)");
    let bridge = RecordingBridge::new();
    let game = controller(oracle.clone(), bridge.clone(), Dice::seeded(1));
    game.start(SymbolChoice::X).await.unwrap();

    assert!(game.submit_player_move(1, 1).await);
    oracle.entered.notified().await;
    assert!(game.abort().await);

    oracle.release.notify_one();
    game.settle().await;

    let state = game.snapshot().unwrap();
    assert_eq!(state.status(), GameStatus::Aborted);
    assert_eq!(state.history().len(), 1);
    assert!(state.board().is_empty(at(2, 2)));
    assert!(!game.is_resolving());

    assert_eq!(
        bridge.finals(),
        vec![
            "[Alex (X) played Tic-Tac-Toe against Sera (O). Outcome: the game was inconclusive]"
                .to_string()
        ]
    );
    assert!(bridge.injected().is_empty());
    assert!(!game.abort().await);
    assert_eq!(bridge.finals().len(), 1);
}

#[tokio::test]
async fn bind_failure_leaves_the_controller_unstarted() {
    let oracle = ScriptedOracle::always("(0, 0)");
    let game = controller(oracle.clone(), RecordingBridge::refusing_bind(), Dice::seeded(1));

    let err = game.start(SymbolChoice::O).await.unwrap_err();
    assert!(matches!(err, ControllerError::HostBind(_)));
    assert!(err.to_string().contains("no chat is open"));
    assert_eq!(game.phase(), Phase::NotStarted);
    assert!(game.snapshot().is_none());
    assert_eq!(oracle.calls(), 0);
    assert!(!game.submit_player_move(0, 0).await);
}

#[tokio::test]
async fn second_start_is_refused() {
    let bridge = RecordingBridge::new();
    let game = controller(ScriptedOracle::always("(0, 0)"), bridge.clone(), Dice::seeded(1));
    game.start(SymbolChoice::X).await.unwrap();

    assert!(matches!(
        game.start(SymbolChoice::X).await,
        Err(ControllerError::AlreadyStarted)
    ));
    let binds = bridge
        .events()
        .into_iter()
        .filter(|e| matches!(e, HostEvent::Bound(_)))
        .count();
    assert_eq!(binds, 1);
}

#[tokio::test]
async fn oracle_opens_when_it_holds_x() {
    let oracle = ScriptedOracle::new(&["(1, 1)"]);
    let bridge = RecordingBridge::new();
    let game = controller(oracle.clone(), bridge.clone(), Dice::seeded(1));

    assert_eq!(game.start(SymbolChoice::O).await.unwrap(), Symbol::O);
    game.settle().await;

    let state = game.snapshot().unwrap();
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.board().get(at(1, 1)), Cell::Marked(Symbol::X));
    assert!(state.is_player_turn());
    assert_eq!(oracle.calls(), 1);
    assert_eq!(
        bridge.last_status(),
        Some(("Alex (O) vs Sera (X)".to_string(), "Your turn".to_string()))
    );
}

#[tokio::test]
async fn random_choice_uses_the_dice() {
    let game = controller(
        ScriptedOracle::always("(0, 0)"),
        RecordingBridge::new(),
        ScriptedRandom::dice(&[0]),
    );
    assert_eq!(game.start(SymbolChoice::Random).await.unwrap(), Symbol::X);
}

#[tokio::test]
async fn out_of_turn_and_off_board_clicks_are_ignored() {
    let game = controller(
        ScriptedOracle::new(&["(0, 0)"]),
        RecordingBridge::new(),
        Dice::seeded(1),
    );
    assert!(!game.submit_player_move(0, 0).await);

    game.start(SymbolChoice::X).await.unwrap();
    assert!(!game.submit_player_move(3, 0).await);
    assert!(game.submit_player_move(1, 1).await);
    game.settle().await;
    assert!(!game.submit_player_move(1, 1).await);
    assert!(!game.submit_player_move(0, 0).await);
    assert_eq!(game.snapshot().unwrap().history().len(), 2);
}

#[tokio::test]
async fn finished_game_ignores_further_actions() {
    let oracle = ScriptedOracle::new(&["(1, 0)", "(1, 1)"]);
    let bridge = RecordingBridge::new();
    let game = controller(oracle, bridge.clone(), Dice::seeded(1));
    game.start(SymbolChoice::X).await.unwrap();
    for (row, col) in [(0, 0), (0, 1), (0, 2)] {
        game.submit_player_move(row, col).await;
        game.settle().await;
    }

    assert!(!game.submit_player_move(2, 2).await);
    assert!(!game.undo_last_two_moves());
    assert!(!game.abort().await);
    assert_eq!(game.snapshot().unwrap().history().len(), 5);
    assert_eq!(bridge.finals().len(), 1);
    assert_eq!(bridge.injected().len(), 1);
}

#[tokio::test]
async fn draw_is_reported_with_commentary() {
    // X: (0,0) (0,2) (1,0) (2,1) (2,2); O replies (0,1) (1,1) (1,2) (2,0).
    let oracle = ScriptedOracle::new(&["(0, 1)", "(1, 1)", "(1, 2)", "(2, 0)"]);
    let bridge = RecordingBridge::new();
    let game = controller(oracle, bridge.clone(), Dice::seeded(1));
    game.start(SymbolChoice::X).await.unwrap();
    for (row, col) in [(0, 0), (0, 2), (1, 0), (2, 1), (2, 2)] {
        assert!(game.submit_player_move(row, col).await);
        game.settle().await;
    }

    let state = game.snapshot().unwrap();
    assert_eq!(state.status(), GameStatus::Draw);
    assert_eq!(state.winner(), Some(Winner::Draw));
    assert_eq!(
        bridge.last_status().map(|(_, bottom)| bottom),
        Some("Game over: the game is a draw".to_string())
    );
    assert!(bridge.injected()[0].1.contains("Outcome: the game is a draw."));
}

#[tokio::test]
async fn failed_commentary_is_still_retracted() {
    let oracle = ScriptedOracle::new(&["(1, 0)", "(1, 1)"]);
    let bridge = RecordingBridge::refusing_inject();
    let game = controller(oracle, bridge.clone(), Dice::seeded(1));
    game.start(SymbolChoice::X).await.unwrap();
    for (row, col) in [(0, 0), (0, 1), (0, 2)] {
        game.submit_player_move(row, col).await;
        game.settle().await;
    }

    assert_eq!(game.phase(), Phase::Won);
    assert_eq!(bridge.injected().len(), 1);
    assert_eq!(bridge.retracted().len(), 1);
}

fn last_render(bridge: &RecordingBridge) -> Option<bool> {
    bridge.events().into_iter().rev().find_map(|e| match e {
        HostEvent::Rendered {
            accepting_input, ..
        } => Some(accepting_input),
        _ => None,
    })
}

#[tokio::test]
async fn board_accepts_input_only_on_player_turn() {
    let oracle = GatedOracle::new("(0, 0)");
    let bridge = RecordingBridge::new();
    let game = controller(oracle.clone(), bridge.clone(), Dice::seeded(1));
    game.start(SymbolChoice::X).await.unwrap();

    assert_eq!(last_render(&bridge), Some(true));

    game.submit_player_move(1, 1).await;
    oracle.entered.notified().await;
    assert_eq!(last_render(&bridge), Some(false));
    assert_eq!(
        bridge.last_status().map(|(_, bottom)| bottom),
        Some("Sera is thinking...".to_string())
    );

    oracle.release.notify_one();
    game.settle().await;
    assert_eq!(last_render(&bridge), Some(true));
}
