use crate::game::{GameRecord, Player, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Join { table: String },
    Leave,
    Move { from: Position, to: Position },
    Forfeit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Lobby,
    Player(Player),
    Spectator,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    You(Seat),
    Names([String; 2]),
    State(Box<GameRecord>),
    Error { code: String, reason: String },
}

pub fn parse_hello(line: &str) -> Option<(String, String)> {
    let payload = line.strip_prefix("HELLO ")?.trim();
    let mut parts = payload.splitn(2, ' ');
    let client_key = parts.next().unwrap_or("").to_string();
    if client_key.is_empty() {
        return None;
    }
    let name = parts.next().unwrap_or("").trim().to_string();
    Some((client_key, name))
}

pub fn encode_hello(client_id: &str, name: &str) -> String {
    format!("HELLO {} {}", client_id, name)
}

pub fn parse_op(line: &str) -> Option<Op> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "OP" {
        return None;
    }
    match parts.next()? {
        "JOIN" => Some(Op::Join {
            table: parts.next()?.to_string(),
        }),
        "LEAVE" => Some(Op::Leave),
        "MOVE" => {
            let from = parse_pos(&mut parts)?;
            let to = parse_pos(&mut parts)?;
            Some(Op::Move { from, to })
        }
        "FORFEIT" => Some(Op::Forfeit),
        _ => None,
    }
}

pub fn encode_op(op: &Op) -> String {
    match op {
        Op::Join { table } => format!("OP JOIN {}", table),
        Op::Leave => "OP LEAVE".to_string(),
        Op::Move { from, to } => {
            format!("OP MOVE {} {} {} {}", from.row, from.col, to.row, to.col)
        }
        Op::Forfeit => "OP FORFEIT".to_string(),
    }
}

pub fn encode_event(event: &ServerEvent) -> String {
    match event {
        ServerEvent::You(seat) => format!("YOU {}", seat_token(*seat)),
        ServerEvent::Names([red, black]) => format!("NAMES {} {}", name_token(red), name_token(black)),
        ServerEvent::State(record) => match serde_json::to_string(record) {
            Ok(json) => format!("STATE {}", json),
            Err(err) => format!("ERR STORE_FAILURE {}", err),
        },
        ServerEvent::Error { code, reason } => format!("ERR {} {}", code, reason),
    }
}

pub fn parse_event(line: &str) -> Option<ServerEvent> {
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    match head {
        "YOU" => parse_seat(rest.split_whitespace().next()?).map(ServerEvent::You),
        "NAMES" => {
            let mut parts = rest.split_whitespace();
            let red = parts.next()?.to_string();
            let black = parts.next()?.to_string();
            Some(ServerEvent::Names([red, black]))
        }
        "STATE" => serde_json::from_str(rest)
            .ok()
            .map(|record| ServerEvent::State(Box::new(record))),
        "ERR" => {
            let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));
            if code.is_empty() {
                return None;
            }
            Some(ServerEvent::Error {
                code: code.to_string(),
                reason: reason.to_string(),
            })
        }
        _ => None,
    }
}

fn parse_pos(parts: &mut std::str::SplitWhitespace<'_>) -> Option<Position> {
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    Some(Position::new(row, col))
}

fn seat_token(seat: Seat) -> &'static str {
    match seat {
        Seat::Lobby => "LOBBY",
        Seat::Player(Player::Red) => "RED",
        Seat::Player(Player::Black) => "BLACK",
        Seat::Spectator => "SPEC",
    }
}

fn parse_seat(token: &str) -> Option<Seat> {
    match token {
        "LOBBY" => Some(Seat::Lobby),
        "RED" => Some(Seat::Player(Player::Red)),
        "BLACK" => Some(Seat::Player(Player::Black)),
        "SPEC" => Some(Seat::Spectator),
        _ => None,
    }
}

/// Names travel space-separated, so blanks become `_` and empty names `-`.
fn name_token(name: &str) -> String {
    if name.trim().is_empty() {
        return "-".to_string();
    }
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Players;

    #[test]
    fn parses_ops() {
        assert_eq!(
            parse_op("OP JOIN lounge"),
            Some(Op::Join {
                table: "lounge".to_string()
            })
        );
        assert_eq!(
            parse_op("OP MOVE 5 0 4 1"),
            Some(Op::Move {
                from: Position::new(5, 0),
                to: Position::new(4, 1),
            })
        );
        assert_eq!(parse_op("  OP FORFEIT "), Some(Op::Forfeit));
        assert_eq!(parse_op("OP LEAVE"), Some(Op::Leave));
    }

    #[test]
    fn rejects_malformed_ops() {
        assert_eq!(parse_op("OP MOVE 5 0 4"), None);
        assert_eq!(parse_op("OP MOVE a b c d"), None);
        assert_eq!(parse_op("OP JOIN"), None);
        assert_eq!(parse_op("MOVE 5 0 4 1"), None);
        assert_eq!(parse_op("OP DANCE"), None);
    }

    #[test]
    fn encoded_ops_parse_back() {
        let op = Op::Move {
            from: Position::new(2, 1),
            to: Position::new(4, 3),
        };
        assert_eq!(parse_op(&encode_op(&op)), Some(op));
    }

    #[test]
    fn hello_splits_id_and_name() {
        assert_eq!(
            parse_hello("HELLO c-1 Ada Lovelace"),
            Some(("c-1".to_string(), "Ada Lovelace".to_string()))
        );
        assert_eq!(
            parse_hello("HELLO c-2"),
            Some(("c-2".to_string(), String::new()))
        );
        assert_eq!(parse_hello("HELLO "), None);
        assert_eq!(parse_hello("HI c-1"), None);
    }

    #[test]
    fn state_line_carries_the_record_as_json() {
        let record = GameRecord::new(
            "lounge",
            Players {
                red: "a".to_string(),
                black: "b".to_string(),
            },
        );
        let line = encode_event(&ServerEvent::State(Box::new(record.clone())));
        assert!(line.starts_with("STATE {"));
        assert!(!line.contains('\n'));
        assert_eq!(parse_event(&line), Some(ServerEvent::State(Box::new(record))));
    }

    #[test]
    fn seats_names_and_errors() {
        assert_eq!(
            parse_event("YOU BLACK"),
            Some(ServerEvent::You(Seat::Player(Player::Black)))
        );
        assert_eq!(parse_event("YOU LOBBY c-9"), Some(ServerEvent::You(Seat::Lobby)));
        assert_eq!(
            encode_event(&ServerEvent::Names(["Ada L".to_string(), String::new()])),
            "NAMES Ada_L -"
        );
        assert_eq!(
            parse_event("ERR CAPTURE_REQUIRED you must make a jump move"),
            Some(ServerEvent::Error {
                code: "CAPTURE_REQUIRED".to_string(),
                reason: "you must make a jump move".to_string(),
            })
        );
        assert_eq!(parse_event("NOPE"), None);
    }
}
