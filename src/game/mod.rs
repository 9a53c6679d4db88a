mod board;
mod rules;
mod state;
mod types;

pub use board::{Board, initialize_board};
pub use rules::{has_any_move, has_mandatory_capture, legal_moves, list_moves};
pub use state::{GameRecord, apply_move, forfeit};
pub use types::{
    GamePhase, InvalidMove, LastMove, Move, Piece, Player, PlayerId, Players, Position, Rank,
};
