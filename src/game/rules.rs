use crate::game::board::Board;
use crate::game::types::{Move, Player, Position};

const DIAGONALS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

fn directions(player: Player, king: bool) -> impl Iterator<Item = (isize, isize)> {
    DIAGONALS
        .into_iter()
        .filter(move |(dr, _)| king || *dr == player.forward())
}

/// Moves available to the piece on `(row, col)`, ignoring what other pieces
/// of the same side could do. Captures suppress plain steps.
pub fn list_moves(board: &Board, row: usize, col: usize) -> Vec<Move> {
    let from = Position::new(row, col);
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };

    let mut steps = Vec::new();
    let mut captures = Vec::new();
    for dir in directions(piece.owner, piece.is_king()) {
        if let Some(to) = from.offset(dir, 1) {
            if board.is_empty_at(to) {
                steps.push(Move {
                    from,
                    to,
                    captured: None,
                });
            }
        }

        let (Some(over), Some(to)) = (from.offset(dir, 1), from.offset(dir, 2)) else {
            continue;
        };
        if board.has_opponent_piece(over, piece.owner) && board.is_empty_at(to) {
            captures.push(Move {
                from,
                to,
                captured: Some(over),
            });
        }
    }

    if captures.is_empty() { steps } else { captures }
}

pub fn has_mandatory_capture(board: &Board, player: Player) -> bool {
    board.pieces_of(player).any(|(pos, _)| {
        list_moves(board, pos.row, pos.col)
            .iter()
            .any(Move::is_capture)
    })
}

pub fn has_any_move(board: &Board, player: Player) -> bool {
    board
        .pieces_of(player)
        .any(|(pos, _)| !list_moves(board, pos.row, pos.col).is_empty())
}

/// Moves `player` may actually submit: the board-wide capture rule applied
/// on top of [`list_moves`], restricted to `continuation` when a multi-jump
/// is in progress.
pub fn legal_moves(board: &Board, player: Player, continuation: Option<Position>) -> Vec<Move> {
    if let Some(pos) = continuation {
        return list_moves(board, pos.row, pos.col)
            .into_iter()
            .filter(Move::is_capture)
            .collect();
    }

    let must_capture = has_mandatory_capture(board, player);
    board
        .pieces_of(player)
        .flat_map(|(pos, _)| list_moves(board, pos.row, pos.col))
        .filter(|mv| !must_capture || mv.is_capture())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::initialize_board;
    use crate::game::types::Piece;

    fn board_with(pieces: &[(usize, usize, Piece)]) -> Board {
        let mut board = Board::empty();
        for &(row, col, piece) in pieces {
            board.set(Position::new(row, col), Some(piece));
        }
        board
    }

    fn destinations(moves: &[Move]) -> Vec<(usize, usize)> {
        let mut out = moves
            .iter()
            .map(|mv| (mv.to.row, mv.to.col))
            .collect::<Vec<_>>();
        out.sort();
        out
    }

    #[test]
    fn lone_capture_suppresses_plain_steps() {
        let board = board_with(&[
            (3, 4, Piece::man(Player::Red)),
            (2, 3, Piece::man(Player::Black)),
        ]);
        let moves = list_moves(&board, 3, 4);
        assert_eq!(
            moves,
            vec![Move {
                from: Position::new(3, 4),
                to: Position::new(1, 2),
                captured: Some(Position::new(2, 3)),
            }]
        );
    }

    #[test]
    fn men_only_move_forward() {
        let board = board_with(&[
            (4, 3, Piece::man(Player::Red)),
            (2, 3, Piece::man(Player::Black)),
        ]);
        assert_eq!(destinations(&list_moves(&board, 4, 3)), vec![(3, 2), (3, 4)]);
        assert_eq!(destinations(&list_moves(&board, 2, 3)), vec![(3, 2), (3, 4)]);
    }

    #[test]
    fn kings_move_in_all_four_directions() {
        let board = board_with(&[(4, 3, Piece::king(Player::Red))]);
        assert_eq!(
            destinations(&list_moves(&board, 4, 3)),
            vec![(3, 2), (3, 4), (5, 2), (5, 4)]
        );
    }

    #[test]
    fn men_do_not_capture_backwards() {
        let board = board_with(&[
            (3, 2, Piece::man(Player::Red)),
            (4, 3, Piece::man(Player::Black)),
        ]);
        assert!(list_moves(&board, 3, 2).iter().all(|mv| !mv.is_capture()));
    }

    #[test]
    fn own_pieces_are_never_jumped() {
        let board = board_with(&[
            (5, 2, Piece::man(Player::Red)),
            (4, 3, Piece::man(Player::Red)),
        ]);
        assert_eq!(destinations(&list_moves(&board, 5, 2)), vec![(4, 1)]);
    }

    #[test]
    fn edge_pieces_stay_on_the_board() {
        let board = board_with(&[
            (0, 1, Piece::king(Player::Black)),
            (1, 0, Piece::man(Player::Red)),
        ]);
        for mv in list_moves(&board, 0, 1).iter().chain(&list_moves(&board, 1, 0)) {
            assert!(mv.to.in_bounds());
            assert!(board.is_empty_at(mv.to));
        }
        assert_eq!(destinations(&list_moves(&board, 1, 0)), vec![]);
    }

    #[test]
    fn empty_square_has_no_moves() {
        let board = initialize_board();
        assert!(list_moves(&board, 4, 3).is_empty());
        assert!(list_moves(&board, 9, 9).is_empty());
    }

    #[test]
    fn opening_position_has_no_mandatory_capture() {
        let board = initialize_board();
        assert!(!has_mandatory_capture(&board, Player::Red));
        assert!(!has_mandatory_capture(&board, Player::Black));
        assert_eq!(legal_moves(&board, Player::Red, None).len(), 7);
    }

    #[test]
    fn capture_anywhere_restricts_every_piece() {
        let board = board_with(&[
            (5, 0, Piece::man(Player::Red)),
            (5, 6, Piece::man(Player::Red)),
            (4, 5, Piece::man(Player::Black)),
        ]);
        assert!(has_mandatory_capture(&board, Player::Red));
        let moves = legal_moves(&board, Player::Red, None);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].from, Position::new(5, 6));
        assert_eq!(moves[0].to, Position::new(3, 4));
    }

    #[test]
    fn continuation_limits_moves_to_one_piece() {
        let board = board_with(&[
            (5, 0, Piece::man(Player::Red)),
            (3, 2, Piece::man(Player::Red)),
            (2, 3, Piece::man(Player::Black)),
        ]);
        let moves = legal_moves(&board, Player::Red, Some(Position::new(3, 2)));
        assert_eq!(destinations(&moves), vec![(1, 4)]);
    }

    #[test]
    fn blocked_side_has_no_move() {
        let board = board_with(&[
            (7, 0, Piece::man(Player::Black)),
            (5, 0, Piece::man(Player::Red)),
            (6, 1, Piece::man(Player::Red)),
        ]);
        assert!(!has_any_move(&board, Player::Black));
        assert!(has_any_move(&board, Player::Red));
    }
}
