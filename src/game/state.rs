use serde::{Deserialize, Serialize};

use crate::game::board::Board;
use crate::game::rules::{has_any_move, has_mandatory_capture, legal_moves, list_moves};
use crate::game::types::{
    GamePhase, InvalidMove, LastMove, Move, Piece, Player, Players, Position, Rank,
};

/// The persisted unit of a game. Engine calls take a record by reference and
/// hand back a new one; the input is never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: String,
    pub board: Board,
    pub players: Players,
    pub turn: Player,
    pub last_move: Option<LastMove>,
    pub winner: Option<Player>,
    pub game_over: bool,
    #[serde(default)]
    pub continuation_from: Option<Position>,
    #[serde(default)]
    pub move_seq: u64,
}

impl GameRecord {
    pub fn new(id: impl Into<String>, players: Players) -> Self {
        Self {
            id: id.into(),
            board: Board::initial(),
            players,
            turn: Player::Red,
            last_move: None,
            winner: None,
            game_over: false,
            continuation_from: None,
            move_seq: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        match (self.game_over, self.winner) {
            (true, Some(winner)) => GamePhase::Finished { winner },
            _ => GamePhase::Active {
                turn: self.turn,
                continuation: self.continuation_from,
            },
        }
    }

    pub fn seat_of(&self, player_id: &str) -> Option<Player> {
        if self.players.red == player_id {
            Some(Player::Red)
        } else if self.players.black == player_id {
            Some(Player::Black)
        } else {
            None
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        if self.game_over {
            return Vec::new();
        }
        legal_moves(&self.board, self.turn, self.continuation_from)
    }

    fn validate(
        &self,
        from: Position,
        to: Position,
        player_id: &str,
    ) -> Result<(Player, Move), InvalidMove> {
        if self.game_over {
            return Err(InvalidMove::GameOver);
        }
        let mover = self.seat_of(player_id).ok_or(InvalidMove::NotAPlayer)?;
        if mover != self.turn {
            return Err(InvalidMove::NotYourTurn);
        }
        if !from.in_bounds() || !to.in_bounds() {
            return Err(InvalidMove::OutOfBounds);
        }

        let piece = self.board.get(from).ok_or(InvalidMove::NoPiece)?;
        if piece.owner != mover {
            return Err(InvalidMove::NotYourPiece);
        }
        if let Some(pending) = self.continuation_from {
            if pending != from {
                return Err(InvalidMove::MustContinueJump(pending));
            }
        }

        let mv = list_moves(&self.board, from.row, from.col)
            .into_iter()
            .find(|mv| mv.to == to)
            .ok_or(InvalidMove::IllegalMove)?;
        if !mv.is_capture() && has_mandatory_capture(&self.board, mover) {
            return Err(InvalidMove::CaptureRequired);
        }
        Ok((mover, mv))
    }

    pub fn apply_move(
        &self,
        from: Position,
        to: Position,
        player_id: &str,
    ) -> Result<GameRecord, InvalidMove> {
        let (mover, mv) = self.validate(from, to, player_id)?;

        let mut next = self.clone();
        let Some(mut piece) = next.board.get(from) else {
            return Err(InvalidMove::NoPiece);
        };
        next.board.set(from, None);
        if let Some(captured) = mv.captured {
            next.board.set(captured, None);
        }
        if to.row == mover.promotion_row() {
            piece.rank = Rank::King;
        }
        next.board.set(to, Some(piece));
        next.last_move = Some(LastMove { from, to });
        next.move_seq += 1;

        if mv.is_capture() && can_keep_jumping(&next.board, to) {
            next.continuation_from = Some(to);
            return Ok(next);
        }

        next.continuation_from = None;
        let opponent = mover.opponent();
        if next.board.count(opponent) == 0 || !has_any_move(&next.board, opponent) {
            next.winner = Some(mover);
            next.game_over = true;
        } else {
            next.turn = opponent;
        }
        Ok(next)
    }

    pub fn forfeit(&self, player_id: &str) -> Result<GameRecord, InvalidMove> {
        if self.game_over {
            return Err(InvalidMove::GameOver);
        }
        let quitter = self.seat_of(player_id).ok_or(InvalidMove::NotAPlayer)?;

        let mut next = self.clone();
        next.game_over = true;
        next.winner = Some(quitter.opponent());
        next.continuation_from = None;
        next.move_seq += 1;
        Ok(next)
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.board.get(pos)
    }
}

fn can_keep_jumping(board: &Board, pos: Position) -> bool {
    list_moves(board, pos.row, pos.col)
        .iter()
        .any(Move::is_capture)
}

pub fn apply_move(
    record: &GameRecord,
    from: Position,
    to: Position,
    player_id: &str,
) -> Result<GameRecord, InvalidMove> {
    record.apply_move(from, to, player_id)
}

pub fn forfeit(record: &GameRecord, player_id: &str) -> Result<GameRecord, InvalidMove> {
    record.forfeit(player_id)
}
