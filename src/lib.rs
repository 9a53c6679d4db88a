pub mod game;
pub mod i18n;
pub mod logging;
pub mod net;
pub mod store;
pub mod ui;

pub use game::{
    Board, GamePhase, GameRecord, InvalidMove, LastMove, Move, Piece, Player, PlayerId, Players,
    Position, Rank, apply_move, forfeit, initialize_board, legal_moves, list_moves,
};
pub use store::{GameStore, MemoryStore, StoreError};
