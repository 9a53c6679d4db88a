use std::io;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::game::{GameRecord, Position};
use crate::net::protocol::{Op, Seat};
use crate::ui::layout::{compute_layout, square_at};
use crate::ui::state::{UiMode, UiState};
use crate::ui::util::{
    handle_cursor_keys, help_text, is_my_turn, moves_from, my_moves, sync_mode,
};

/// Returns `Ok(true)` when the client should exit.
pub fn handle_key(key: KeyEvent, game: Option<&GameRecord>, ui: &mut UiState) -> io::Result<bool> {
    if ui.mode == UiMode::ConfirmForfeit {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                ui.send(Op::Forfeit);
                ui.mode = UiMode::Waiting;
                ui.message = ui.i18n.text("status-move-sent");
            }
            _ => {
                ui.mode = UiMode::Waiting;
                sync_mode(game, ui);
            }
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        KeyCode::Char('?') => {
            ui.message = help_text(ui);
            return Ok(false);
        }
        KeyCode::Char('f') | KeyCode::Char('F') => {
            let seated = matches!(ui.seat, Seat::Player(_));
            if seated && game.is_some_and(|g| !g.game_over) {
                ui.mode = UiMode::ConfirmForfeit;
                ui.message = ui.i18n.text("status-confirm-forfeit");
            }
            return Ok(false);
        }
        KeyCode::Esc => {
            if let (UiMode::PickDest { .. }, Some(game)) = (ui.mode, game) {
                if game.continuation_from.is_none() {
                    ui.mode = UiMode::PickPiece;
                    ui.message = ui.i18n.text("status-your-turn");
                }
            }
            return Ok(false);
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(game) = game {
                let cursor = ui.cursor;
                activate(game, ui, cursor);
            }
            return Ok(false);
        }
        _ => {}
    }

    handle_cursor_keys(key, &mut ui.cursor);
    Ok(false)
}

pub fn handle_mouse(
    mouse: MouseEvent,
    area: ratatui::layout::Rect,
    game: Option<&GameRecord>,
    ui: &mut UiState,
) -> io::Result<bool> {
    if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
        return Ok(false);
    }
    let layout = compute_layout(area);
    let Some(pos) = square_at(layout.board_inner, mouse.column, mouse.row) else {
        return Ok(false);
    };
    ui.cursor = pos;
    if let Some(game) = game {
        activate(game, ui, pos);
    }
    Ok(false)
}

fn activate(game: &GameRecord, ui: &mut UiState, pos: Position) {
    if !is_my_turn(game, ui) {
        return;
    }
    match ui.mode {
        UiMode::PickDest { from } => {
            if let Some(mv) = moves_from(game, ui, from).into_iter().find(|mv| mv.to == pos) {
                ui.send(Op::Move {
                    from: mv.from,
                    to: mv.to,
                });
                ui.mode = UiMode::Waiting;
                ui.message = ui.i18n.text("status-move-sent");
            } else if game.continuation_from.is_some() {
                ui.message = ui.i18n.text("status-continue-jump");
            } else if pos != from {
                ui.mode = UiMode::PickPiece;
                select(game, ui, pos);
            } else {
                ui.mode = UiMode::PickPiece;
                ui.message = ui.i18n.text("status-your-turn");
            }
        }
        UiMode::PickPiece => select(game, ui, pos),
        _ => {}
    }
}

fn select(game: &GameRecord, ui: &mut UiState, pos: Position) {
    let owned = game
        .piece_at(pos)
        .is_some_and(|piece| Some(piece.owner) == game.seat_of(&ui.client_id));
    if !owned {
        ui.message = ui.i18n.text("status-not-your-piece");
        return;
    }
    if !moves_from(game, ui, pos).is_empty() {
        ui.mode = UiMode::PickDest { from: pos };
        ui.message = ui.i18n.text("status-pick-dest");
        return;
    }
    let capture_elsewhere = my_moves(game, ui).iter().any(|mv| mv.is_capture());
    ui.message = if capture_elsewhere {
        ui.i18n.text("status-must-capture")
    } else {
        ui.i18n.text("status-no-moves-here")
    };
}
