use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, warn};

use crate::game::{GameRecord, Player, Players};
use crate::net::protocol::{Op, Seat, ServerEvent, encode_event};
use crate::store::{GameStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub to: String,
    pub line: String,
}

#[derive(Debug, Clone)]
struct ClientHandle {
    name: String,
    table: Option<String>,
    seat: Seat,
}

#[derive(Debug, Clone, Default)]
struct Table {
    seats: HashMap<Player, String>,
    spectators: HashSet<String>,
    game_id: Option<String>,
    games_played: u32,
}

impl Table {
    fn members(&self) -> impl Iterator<Item = &String> {
        self.seats.values().chain(self.spectators.iter())
    }
}

pub struct Hub {
    store: Arc<dyn GameStore>,
    clients: HashMap<String, ClientHandle>,
    tables: HashMap<String, Table>,
}

impl Hub {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self {
            store,
            clients: HashMap::new(),
            tables: HashMap::new(),
        }
    }

    pub fn hello(&mut self, client_id: &str, name: &str) -> Vec<Outgoing> {
        let handle = self
            .clients
            .entry(client_id.to_string())
            .or_insert_with(|| ClientHandle {
                name: String::new(),
                table: None,
                seat: Seat::Lobby,
            });
        if !name.is_empty() {
            handle.name = name.to_string();
        }
        info!("hello {} -> {}", handle.name, client_id);

        let mut out = vec![Outgoing {
            to: client_id.to_string(),
            line: format!("YOU LOBBY {}", client_id),
        }];
        if let Some(table_id) = handle.table.clone() {
            let seat = handle.seat;
            out.push(line_to(client_id, &ServerEvent::You(seat)));
            out.extend(self.table_snapshot(&table_id, Some(client_id)));
        }
        out
    }

    pub fn handle(&mut self, client_id: &str, op: Op) -> Vec<Outgoing> {
        if !self.clients.contains_key(client_id) {
            return Vec::new();
        }
        info!("op {:?} by {}", op, client_id);
        match op {
            Op::Join { table } => self.join(client_id, &table),
            Op::Leave => {
                self.leave(client_id);
                vec![line_to(client_id, &ServerEvent::You(Seat::Lobby))]
            }
            Op::Move { from, to } => {
                self.mutate(client_id, |record, id| record.apply_move(from, to, id))
            }
            Op::Forfeit => self.mutate(client_id, |record, id| record.forfeit(id)),
        }
    }

    pub fn seat_of(&self, client_id: &str) -> Option<Seat> {
        self.clients.get(client_id).map(|client| client.seat)
    }

    fn join(&mut self, client_id: &str, table_id: &str) -> Vec<Outgoing> {
        let already_here = self
            .clients
            .get(client_id)
            .and_then(|client| client.table.as_deref())
            == Some(table_id);
        if !already_here {
            self.leave(client_id);
        }

        let table = self.tables.entry(table_id.to_string()).or_default();
        let seat = if already_here {
            self.clients
                .get(client_id)
                .map(|client| client.seat)
                .unwrap_or(Seat::Spectator)
        } else if let Some(game_id) = &table.game_id {
            match self.store.load(game_id) {
                Ok(record) => record
                    .seat_of(client_id)
                    .map(Seat::Player)
                    .unwrap_or(Seat::Spectator),
                Err(err) => {
                    warn!("table {} lost game {}: {}", table_id, game_id, err);
                    Seat::Spectator
                }
            }
        } else if !table.seats.contains_key(&Player::Red) {
            Seat::Player(Player::Red)
        } else if !table.seats.contains_key(&Player::Black) {
            Seat::Player(Player::Black)
        } else {
            Seat::Spectator
        };

        match seat {
            Seat::Player(player) => {
                table.seats.insert(player, client_id.to_string());
            }
            _ => {
                table.spectators.insert(client_id.to_string());
            }
        }
        if let Some(client) = self.clients.get_mut(client_id) {
            client.table = Some(table_id.to_string());
            client.seat = seat;
        }

        let mut out = vec![line_to(client_id, &ServerEvent::You(seat))];
        if let Err(err) = self.start_if_ready(table_id) {
            warn!("table {} failed to start: {}", table_id, err);
            out.push(error_to(client_id, err.code(), &err.to_string()));
            return out;
        }
        out.extend(self.table_snapshot(table_id, None));
        out
    }

    fn start_if_ready(&mut self, table_id: &str) -> Result<(), StoreError> {
        let Some(table) = self.tables.get_mut(table_id) else {
            return Ok(());
        };
        if table.game_id.is_some() {
            return Ok(());
        }
        let (Some(red), Some(black)) = (
            table.seats.get(&Player::Red),
            table.seats.get(&Player::Black),
        ) else {
            return Ok(());
        };

        let game_id = format!("{}-{}", table_id, table.games_played + 1);
        let record = GameRecord::new(
            game_id.clone(),
            Players {
                red: red.clone(),
                black: black.clone(),
            },
        );
        self.store.create(&record)?;
        table.games_played += 1;
        table.game_id = Some(game_id.clone());
        info!("game {} started: red={} black={}", game_id, red, black);
        Ok(())
    }

    fn leave(&mut self, client_id: &str) {
        let Some(client) = self.clients.get_mut(client_id) else {
            return;
        };
        let Some(table_id) = client.table.take() else {
            return;
        };
        client.seat = Seat::Lobby;

        let store = &self.store;
        if let Some(table) = self.tables.get_mut(&table_id) {
            table.seats.retain(|_, id| id.as_str() != client_id);
            table.spectators.remove(client_id);
            // An active game waits for its players; a finished one frees the
            // table for a new pair.
            if table.seats.is_empty() {
                let finished = table
                    .game_id
                    .as_ref()
                    .is_none_or(|game_id| store.load(game_id).map_or(true, |r| r.game_over));
                if finished {
                    table.game_id = None;
                }
            }
        }
        info!("{} left table {}", client_id, table_id);
    }

    fn mutate<F>(&mut self, client_id: &str, step: F) -> Vec<Outgoing>
    where
        F: FnOnce(&GameRecord, &str) -> Result<GameRecord, crate::game::InvalidMove>,
    {
        let Some(table_id) = self
            .clients
            .get(client_id)
            .and_then(|client| client.table.clone())
        else {
            return vec![error_to(client_id, "NOT_AT_TABLE", "join a table first")];
        };
        let Some(game_id) = self
            .tables
            .get(&table_id)
            .and_then(|table| table.game_id.clone())
        else {
            return vec![error_to(
                client_id,
                "TABLE_NOT_READY",
                "waiting for a second player",
            )];
        };

        let current = match self.store.load(&game_id) {
            Ok(record) => record,
            Err(err) => return vec![error_to(client_id, err.code(), &err.to_string())],
        };
        let next = match step(&current, client_id) {
            Ok(next) => next,
            Err(err) => {
                warn!("rejected {} in {}: {}", client_id, game_id, err);
                return vec![error_to(client_id, err.code(), &err.to_string())];
            }
        };
        if let Err(err) = self.store.save(&next, current.move_seq) {
            warn!("save of {} failed: {}", game_id, err);
            return vec![error_to(client_id, err.code(), &err.to_string())];
        }
        if let Some(winner) = next.winner {
            info!("game {} over, winner {}", game_id, winner.as_str());
        }

        let state = ServerEvent::State(Box::new(next));
        self.table_members(&table_id)
            .into_iter()
            .map(|id| line_to(&id, &state))
            .collect()
    }

    fn table_snapshot(&self, table_id: &str, only: Option<&str>) -> Vec<Outgoing> {
        let Some(table) = self.tables.get(table_id) else {
            return Vec::new();
        };
        let names = ServerEvent::Names([
            self.seat_name(table, Player::Red),
            self.seat_name(table, Player::Black),
        ]);
        let state = table
            .game_id
            .as_ref()
            .and_then(|game_id| self.store.load(game_id).ok())
            .map(|record| ServerEvent::State(Box::new(record)));

        let recipients = match only {
            Some(id) => vec![id.to_string()],
            None => self.table_members(table_id),
        };
        let mut out = Vec::new();
        for id in recipients {
            out.push(line_to(&id, &names));
            if let Some(state) = &state {
                out.push(line_to(&id, state));
            }
        }
        out
    }

    fn table_members(&self, table_id: &str) -> Vec<String> {
        let mut members = self
            .tables
            .get(table_id)
            .map(|table| table.members().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        members.sort();
        members
    }

    fn seat_name(&self, table: &Table, player: Player) -> String {
        table
            .seats
            .get(&player)
            .map(|id| {
                self.clients
                    .get(id)
                    .map(|client| client.name.clone())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| id.clone())
            })
            .unwrap_or_default()
    }
}

fn line_to(client_id: &str, event: &ServerEvent) -> Outgoing {
    Outgoing {
        to: client_id.to_string(),
        line: encode_event(event),
    }
}

fn error_to(client_id: &str, code: &str, reason: &str) -> Outgoing {
    line_to(
        client_id,
        &ServerEvent::Error {
            code: code.to_string(),
            reason: reason.to_string(),
        },
    )
}
