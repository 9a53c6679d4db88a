use std::io;
use std::sync::mpsc::{self, Receiver, Sender};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::net::{TcpStream, UnixStream};
use tokio::task::JoinHandle;

use crate::game::GameRecord;
use crate::net::protocol::{Op, Seat, ServerEvent, encode_hello, encode_op, parse_event};

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub tcp_addr: Option<String>,
    pub unix_path: Option<String>,
    pub name: String,
    pub client_id: String,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Assigned(Seat),
    Names([String; 2]),
    State(Box<GameRecord>),
    Error { code: String, reason: String },
    Disconnected,
}

impl From<ServerEvent> for ClientEvent {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::You(seat) => ClientEvent::Assigned(seat),
            ServerEvent::Names(names) => ClientEvent::Names(names),
            ServerEvent::State(record) => ClientEvent::State(record),
            ServerEvent::Error { code, reason } => ClientEvent::Error { code, reason },
        }
    }
}

/// Connects, says hello and joins the configured table. The returned handle
/// finishes once every op sender is dropped and the queued lines are written.
pub async fn connect_client(
    config: ClientConfig,
) -> io::Result<(Receiver<ClientEvent>, Sender<Op>, JoinHandle<()>)> {
    if let Some(addr) = &config.tcp_addr {
        let stream = TcpStream::connect(addr).await.map_err(|err| {
            io::Error::new(err.kind(), format!("Failed to connect to {}: {}", addr, err))
        })?;
        let (reader, writer) = tokio::io::split(stream);
        return connect_stream(reader, writer, &config).await;
    }

    if let Some(path) = &config.unix_path {
        let stream = UnixStream::connect(path).await.map_err(|err| {
            io::Error::new(err.kind(), format!("Failed to connect to {}: {}", path, err))
        })?;
        let (reader, writer) = tokio::io::split(stream);
        return connect_stream(reader, writer, &config).await;
    }

    Err(io::Error::new(io::ErrorKind::InvalidInput, "no address"))
}

async fn connect_stream<T>(
    reader: ReadHalf<T>,
    mut writer: WriteHalf<T>,
    config: &ClientConfig,
) -> io::Result<(Receiver<ClientEvent>, Sender<Op>, JoinHandle<()>)>
where
    T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let greeting = format!(
        "{}\n{}\n",
        encode_hello(&config.client_id, &config.name),
        encode_op(&Op::Join {
            table: config.table.clone(),
        })
    );
    writer.write_all(greeting.as_bytes()).await?;
    writer.flush().await?;

    let (event_tx, event_rx) = mpsc::channel();
    let (op_tx, op_rx) = mpsc::channel::<Op>();

    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(event) = parse_event(&line) {
                if event_tx.send(ClientEvent::from(event)).is_err() {
                    return;
                }
            }
        }
        let _ = event_tx.send(ClientEvent::Disconnected);
    });

    // The UI thread sends on a std channel, so the blocking recv lives on a
    // blocking-pool thread rather than stalling a runtime worker.
    let (line_tx, mut line_rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    tokio::task::spawn_blocking(move || {
        while let Ok(op) = op_rx.recv() {
            if line_tx.send(encode_op(&op)).is_err() {
                break;
            }
        }
    });
    let writer_task = tokio::spawn(async move {
        while let Some(line) = line_rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
        }
    });

    Ok((event_rx, op_tx, writer_task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Player;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn last_op_is_written_before_the_writer_finishes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (_events, ops, writer) = connect_client(ClientConfig {
            tcp_addr: Some(addr),
            unix_path: None,
            name: "Ada".into(),
            client_id: "a".into(),
            table: "t1".into(),
        })
        .await
        .unwrap();
        let (stream, _) = listener.accept().await.unwrap();

        ops.send(Op::Leave).unwrap();
        drop(ops);
        writer.await.unwrap();

        let mut lines = BufReader::new(stream).lines();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(lines.next_line().await.unwrap().unwrap());
        }
        assert_eq!(seen, vec!["HELLO a Ada", "OP JOIN t1", "OP LEAVE"]);
    }

    #[test]
    fn server_events_map_onto_client_events() {
        assert_eq!(
            ClientEvent::from(ServerEvent::You(Seat::Player(Player::Red))),
            ClientEvent::Assigned(Seat::Player(Player::Red))
        );
        assert_eq!(
            ClientEvent::from(ServerEvent::Error {
                code: "CONFLICT".into(),
                reason: "retry".into(),
            }),
            ClientEvent::Error {
                code: "CONFLICT".into(),
                reason: "retry".into(),
            }
        );
    }
}
