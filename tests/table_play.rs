use std::sync::Arc;
use std::thread;

use checkers_duel::net::hub::{Hub, Outgoing};
use checkers_duel::net::protocol::{Op, Seat, ServerEvent, parse_event};
use checkers_duel::{
    Board, GameRecord, GameStore, InvalidMove, MemoryStore, Piece, Player, Players, Position,
    StoreError,
};

fn events_for(out: &[Outgoing], client: &str) -> Vec<ServerEvent> {
    out.iter()
        .filter(|o| o.to == client)
        .filter_map(|o| parse_event(&o.line))
        .collect()
}

fn last_state(out: &[Outgoing], client: &str) -> Option<GameRecord> {
    events_for(out, client).into_iter().rev().find_map(|event| match event {
        ServerEvent::State(record) => Some(*record),
        _ => None,
    })
}

fn error_code(out: &[Outgoing], client: &str) -> Option<String> {
    events_for(out, client).into_iter().find_map(|event| match event {
        ServerEvent::Error { code, .. } => Some(code),
        _ => None,
    })
}

fn mv(fr: usize, fc: usize, tr: usize, tc: usize) -> Op {
    Op::Move {
        from: Position::new(fr, fc),
        to: Position::new(tr, tc),
    }
}

fn seated_table() -> (Hub, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let mut hub = Hub::new(store.clone());
    hub.hello("red", "Ada");
    hub.hello("black", "Bo");
    hub.hello("watcher", "Cy");
    hub.handle("red", Op::Join { table: "t1".into() });
    hub.handle("black", Op::Join { table: "t1".into() });
    hub.handle("watcher", Op::Join { table: "t1".into() });
    (hub, store)
}

#[test]
fn opening_exchange_enforces_the_capture_rule() {
    let (mut hub, store) = seated_table();
    assert_eq!(hub.seat_of("red"), Some(Seat::Player(Player::Red)));
    assert_eq!(hub.seat_of("black"), Some(Seat::Player(Player::Black)));
    assert_eq!(hub.seat_of("watcher"), Some(Seat::Spectator));

    let out = hub.handle("red", mv(5, 2, 4, 3));
    let seen = last_state(&out, "watcher").expect("spectator sees the move");
    assert_eq!(seen.turn, Player::Black);
    assert_eq!(seen.move_seq, 1);

    hub.handle("black", mv(2, 5, 3, 4));

    let out = hub.handle("red", mv(5, 0, 4, 1));
    assert_eq!(error_code(&out, "red").as_deref(), Some("CAPTURE_REQUIRED"));
    assert!(events_for(&out, "black").is_empty());

    let out = hub.handle("red", mv(4, 3, 2, 5));
    let record = last_state(&out, "black").expect("black sees the capture");
    assert_eq!(record.piece_at(Position::new(3, 4)), None);
    assert_eq!(record.board.count(Player::Black), 11);
    assert_eq!(record.turn, Player::Black);
    assert_eq!(record.continuation_from, None);

    let stored = store.load(&record.id).unwrap();
    assert_eq!(stored, record);

    let options = stored.legal_moves();
    assert!(!options.is_empty());
    assert!(options.iter().all(|m| m.is_capture()));
}

#[test]
fn out_of_turn_and_spectator_moves_change_nothing() {
    let (mut hub, store) = seated_table();

    let out = hub.handle("black", mv(2, 1, 3, 0));
    assert_eq!(error_code(&out, "black").as_deref(), Some("NOT_YOUR_TURN"));

    let out = hub.handle("watcher", mv(5, 0, 4, 1));
    assert_eq!(error_code(&out, "watcher").as_deref(), Some("NOT_A_PLAYER"));

    let record = store.load("t1-1").unwrap();
    assert_eq!(record.move_seq, 0);
    assert_eq!(record.board, Board::initial());
}

#[test]
fn forfeit_ends_the_game_for_everyone() {
    let (mut hub, _store) = seated_table();
    let out = hub.handle("black", Op::Forfeit);
    for client in ["red", "black", "watcher"] {
        let record = last_state(&out, client).expect("everyone sees the result");
        assert!(record.game_over);
        assert_eq!(record.winner, Some(Player::Red));
    }

    let out = hub.handle("red", mv(5, 0, 4, 1));
    assert_eq!(error_code(&out, "red").as_deref(), Some("GAME_OVER"));
}

#[test]
fn capturing_the_last_piece_wins() {
    let mut board = Board::empty();
    board.set(Position::new(4, 3), Some(Piece::king(Player::Red)));
    board.set(Position::new(3, 4), Some(Piece::man(Player::Black)));
    let mut record = GameRecord::new(
        "endgame",
        Players {
            red: "a".into(),
            black: "b".into(),
        },
    );
    record.board = board;

    let done = record
        .apply_move(Position::new(4, 3), Position::new(2, 5), "a")
        .unwrap();
    assert!(done.game_over);
    assert_eq!(done.winner, Some(Player::Red));
    assert_eq!(
        done.apply_move(Position::new(2, 5), Position::new(3, 4), "a"),
        Err(InvalidMove::GameOver)
    );
}

#[test]
fn a_side_left_without_moves_loses() {
    let mut board = Board::empty();
    board.set(Position::new(0, 7), Some(Piece::man(Player::Black)));
    board.set(Position::new(1, 6), Some(Piece::man(Player::Red)));
    board.set(Position::new(2, 5), Some(Piece::man(Player::Red)));
    board.set(Position::new(5, 0), Some(Piece::man(Player::Red)));
    let mut record = GameRecord::new(
        "blocked",
        Players {
            red: "a".into(),
            black: "b".into(),
        },
    );
    record.board = board;

    let done = record
        .apply_move(Position::new(5, 0), Position::new(4, 1), "a")
        .unwrap();
    assert!(done.game_over);
    assert_eq!(done.winner, Some(Player::Red));
}

#[test]
fn only_one_of_two_racing_saves_lands() {
    let store = Arc::new(MemoryStore::new());
    let record = GameRecord::new(
        "race",
        Players {
            red: "a".into(),
            black: "b".into(),
        },
    );
    store.create(&record).unwrap();

    let handles = [(5, 0, 4, 1), (5, 2, 4, 3)]
        .into_iter()
        .map(|(fr, fc, tr, tc)| {
            let store = store.clone();
            let base = record.clone();
            thread::spawn(move || {
                let next = base
                    .apply_move(Position::new(fr, fc), Position::new(tr, tc), "a")
                    .unwrap();
                store.save(&next, base.move_seq)
            })
        })
        .collect::<Vec<_>>();
    let results = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect::<Vec<_>>();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(StoreError::Conflict { .. })))
    );
    assert_eq!(store.load("race").unwrap().move_seq, 1);
}
