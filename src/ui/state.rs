use std::sync::mpsc::Sender;

use crate::game::Position;
use crate::i18n::I18n;
use crate::net::protocol::{Op, Seat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Waiting,
    PickPiece,
    PickDest { from: Position },
    ConfirmForfeit,
    GameOver,
}

pub struct UiState {
    pub cursor: Position,
    pub mode: UiMode,
    pub message: String,
    pub log: Vec<String>,
    pub player_names: [String; 2],
    pub seat: Seat,
    pub op_sender: Option<Sender<Op>>,
    pub client_id: String,
    pub table: String,
    pub i18n: I18n,
}

impl UiState {
    pub fn new(client_id: String, table: String, op_sender: Option<Sender<Op>>, i18n: I18n) -> Self {
        Self {
            cursor: Position::new(5, 0),
            mode: UiMode::Waiting,
            message: i18n.text("status-waiting-server"),
            log: Vec::new(),
            player_names: [String::new(), String::new()],
            seat: Seat::Lobby,
            op_sender,
            client_id,
            table,
            i18n,
        }
    }

    pub fn send(&self, op: Op) {
        if let Some(sender) = &self.op_sender {
            let _ = sender.send(op);
        }
    }
}
