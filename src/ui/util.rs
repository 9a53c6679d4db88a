use crate::game::{GamePhase, GameRecord, Move, Player, Position};
use crate::i18n::I18n;
use crate::net::protocol::Seat;
use crate::ui::state::{UiMode, UiState};

pub fn handle_cursor_keys(key: crossterm::event::KeyEvent, cursor: &mut Position) {
    use crossterm::event::KeyCode;
    match key.code {
        KeyCode::Up => cursor.row = cursor.row.saturating_sub(1),
        KeyCode::Down => cursor.row = (cursor.row + 1).min(7),
        KeyCode::Left => cursor.col = cursor.col.saturating_sub(1),
        KeyCode::Right => cursor.col = (cursor.col + 1).min(7),
        KeyCode::Char('k') if key.modifiers.is_empty() => cursor.row = cursor.row.saturating_sub(1),
        KeyCode::Char('j') if key.modifiers.is_empty() => cursor.row = (cursor.row + 1).min(7),
        KeyCode::Char('h') if key.modifiers.is_empty() => cursor.col = cursor.col.saturating_sub(1),
        KeyCode::Char('l') if key.modifiers.is_empty() => cursor.col = (cursor.col + 1).min(7),
        _ => {}
    }
}

pub fn my_color(ui: &UiState) -> Option<Player> {
    match ui.seat {
        Seat::Player(player) => Some(player),
        _ => None,
    }
}

pub fn is_my_turn(game: &GameRecord, ui: &UiState) -> bool {
    matches!(game.phase(), GamePhase::Active { turn, .. } if Some(turn) == my_color(ui))
}

pub fn my_moves(game: &GameRecord, ui: &UiState) -> Vec<Move> {
    if is_my_turn(game, ui) {
        game.legal_moves()
    } else {
        Vec::new()
    }
}

pub fn moves_from(game: &GameRecord, ui: &UiState, from: Position) -> Vec<Move> {
    my_moves(game, ui)
        .into_iter()
        .filter(|mv| mv.from == from)
        .collect()
}

pub fn sync_mode(game: Option<&GameRecord>, ui: &mut UiState) {
    let Some(game) = game else {
        ui.mode = UiMode::Waiting;
        ui.message = ui
            .i18n
            .text_with("status-waiting-opponent", &[("table", ui.table.clone())]);
        return;
    };

    match game.phase() {
        GamePhase::Finished { winner } => {
            ui.mode = UiMode::GameOver;
            ui.message = ui.i18n.text_with(
                "status-game-over",
                &[("player", player_label(&ui.i18n, winner, &ui.player_names))],
            );
        }
        GamePhase::Active { turn, continuation } => {
            if ui.seat == Seat::Spectator {
                ui.mode = UiMode::Waiting;
                ui.message = ui.i18n.text("status-spectator");
            } else if !is_my_turn(game, ui) {
                ui.mode = UiMode::Waiting;
                ui.message = ui.i18n.text_with(
                    "status-their-turn",
                    &[("player", player_label(&ui.i18n, turn, &ui.player_names))],
                );
            } else if let Some(from) = continuation {
                ui.mode = UiMode::PickDest { from };
                ui.cursor = from;
                ui.message = ui.i18n.text("status-continue-jump");
            } else {
                let keep = match ui.mode {
                    UiMode::PickDest { from } => !moves_from(game, ui, from).is_empty(),
                    _ => false,
                };
                if !keep {
                    ui.mode = UiMode::PickPiece;
                }
                ui.message = ui.i18n.text("status-your-turn");
            }
        }
    }
}

pub fn accepts_record(current: Option<&GameRecord>, incoming: &GameRecord) -> bool {
    current.is_none_or(|current| current.id != incoming.id || current.move_seq <= incoming.move_seq)
}

pub fn player_label(i18n: &I18n, player: Player, names: &[String; 2]) -> String {
    let (color, name) = match player {
        Player::Red => (i18n.text("seat-red"), &names[0]),
        Player::Black => (i18n.text("seat-black"), &names[1]),
    };
    if name.is_empty() {
        return color;
    }
    i18n.text_with("player-label", &[("color", color), ("name", name.clone())])
}

pub fn seat_label(i18n: &I18n, seat: Seat) -> String {
    match seat {
        Seat::Player(Player::Red) => i18n.text("seat-red"),
        Seat::Player(Player::Black) => i18n.text("seat-black"),
        Seat::Spectator => i18n.text("seat-spectator"),
        Seat::Lobby => i18n.text("seat-lobby"),
    }
}

pub fn help_text(ui: &UiState) -> String {
    match ui.mode {
        UiMode::PickPiece => ui.i18n.text("help-pick"),
        UiMode::PickDest { .. } => ui.i18n.text("help-dest"),
        UiMode::ConfirmForfeit => ui.i18n.text("status-confirm-forfeit"),
        UiMode::GameOver => ui.i18n.text("help-over"),
        UiMode::Waiting if ui.seat == Seat::Spectator => ui.i18n.text("help-spectator"),
        UiMode::Waiting => ui.i18n.text("help-wait"),
    }
}
