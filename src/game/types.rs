use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type PlayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Red,
    Black,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::Red => Player::Black,
            Player::Black => Player::Red,
        }
    }

    pub fn forward(self) -> isize {
        match self {
            Player::Red => -1,
            Player::Black => 1,
        }
    }

    pub fn promotion_row(self) -> usize {
        match self {
            Player::Red => 0,
            Player::Black => 7,
        }
    }

    pub fn start_rows(self) -> std::ops::RangeInclusive<usize> {
        match self {
            Player::Red => 5..=7,
            Player::Black => 0..=2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Player::Red => "red",
            Player::Black => "black",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Man,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub owner: Player,
    pub rank: Rank,
}

impl Piece {
    pub fn man(owner: Player) -> Self {
        Self {
            owner,
            rank: Rank::Man,
        }
    }

    pub fn king(owner: Player) -> Self {
        Self {
            owner,
            rank: Rank::King,
        }
    }

    pub fn is_king(self) -> bool {
        self.rank == Rank::King
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        self.row < 8 && self.col < 8
    }

    pub fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    pub fn offset(self, (dr, dc): (isize, isize), distance: isize) -> Option<Position> {
        let row = self.row.checked_add_signed(dr * distance)?;
        let col = self.col.checked_add_signed(dc * distance)?;
        let pos = Position::new(row, col);
        pos.in_bounds().then_some(pos)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub captured: Option<Position>,
}

impl Move {
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub from: Position,
    pub to: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub red: PlayerId,
    pub black: PlayerId,
}

impl Players {
    pub fn id(&self, player: Player) -> &str {
        match player {
            Player::Red => &self.red,
            Player::Black => &self.black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Active {
        turn: Player,
        continuation: Option<Position>,
    },
    Finished {
        winner: Player,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidMove {
    #[error("the game is already over")]
    GameOver,
    #[error("you are not a player in this game")]
    NotAPlayer,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("square is off the board")]
    OutOfBounds,
    #[error("there is no piece on that square")]
    NoPiece,
    #[error("that piece is not yours")]
    NotYourPiece,
    #[error("you must keep jumping with the piece on {0}")]
    MustContinueJump(Position),
    #[error("that piece cannot move there")]
    IllegalMove,
    #[error("you must make a jump move")]
    CaptureRequired,
}

impl InvalidMove {
    pub fn code(self) -> &'static str {
        match self {
            InvalidMove::GameOver => "GAME_OVER",
            InvalidMove::NotAPlayer => "NOT_A_PLAYER",
            InvalidMove::NotYourTurn => "NOT_YOUR_TURN",
            InvalidMove::OutOfBounds => "OUT_OF_BOUNDS",
            InvalidMove::NoPiece => "NO_PIECE",
            InvalidMove::NotYourPiece => "NOT_YOUR_PIECE",
            InvalidMove::MustContinueJump(_) => "MUST_CONTINUE_JUMP",
            InvalidMove::IllegalMove => "ILLEGAL_MOVE",
            InvalidMove::CaptureRequired => "CAPTURE_REQUIRED",
        }
    }
}
