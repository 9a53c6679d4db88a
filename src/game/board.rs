use serde::{Deserialize, Serialize};

use crate::game::types::{Piece, Player, Position, Rank};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    pub cells: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[None; 8]; 8],
        }
    }

    pub fn initial() -> Self {
        let mut board = Self::empty();
        for player in [Player::Black, Player::Red] {
            for row in player.start_rows() {
                for col in 0..8 {
                    let pos = Position::new(row, col);
                    if pos.is_dark() {
                        board.set(pos, Some(Piece::man(player)));
                    }
                }
            }
        }
        board
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        if !pos.in_bounds() {
            return None;
        }
        self.cells[pos.row][pos.col]
    }

    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        self.cells[pos.row][pos.col] = piece;
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    pub fn has_opponent_piece(&self, pos: Position, player: Player) -> bool {
        self.get(pos).is_some_and(|piece| piece.owner == player.opponent())
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        (0..8).flat_map(move |row| {
            (0..8).filter_map(move |col| {
                self.cells[row][col].map(|piece| (Position::new(row, col), piece))
            })
        })
    }

    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.owner == player)
    }

    pub fn count(&self, player: Player) -> usize {
        self.pieces_of(player).count()
    }

    pub fn census(&self, player: Player) -> (usize, usize) {
        self.pieces_of(player)
            .fold((0, 0), |(men, kings), (_, piece)| match piece.rank {
                Rank::Man => (men + 1, kings),
                Rank::King => (men, kings + 1),
            })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

pub fn initialize_board() -> Board {
    Board::initial()
}
