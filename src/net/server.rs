use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream, UnixListener, UnixStream};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::net::hub::{Hub, Outgoing};
use crate::net::protocol::{parse_hello, parse_op};
use crate::store::GameStore;

#[derive(Clone, Copy, Debug)]
pub enum ListenMode {
    TcpOnly,
    UnixOnly,
    Both,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub tcp_addr: String,
    pub unix_path: String,
    pub listen_mode: ListenMode,
}

type SharedWriter = Arc<Mutex<Box<dyn AsyncWrite + Unpin + Send + 'static>>>;

struct ServerState {
    hub: Hub,
    writers: HashMap<String, SharedWriter>,
}

pub async fn run_server(config: ServerConfig, store: Arc<dyn GameStore>) -> io::Result<()> {
    let state = Arc::new(Mutex::new(ServerState {
        hub: Hub::new(store),
        writers: HashMap::new(),
    }));

    let tcp_listener = match config.listen_mode {
        ListenMode::TcpOnly | ListenMode::Both => {
            let listener = TcpListener::bind(&config.tcp_addr).await.map_err(|err| {
                io::Error::new(
                    err.kind(),
                    format!("Failed to bind TCP listener at {}: {}", config.tcp_addr, err),
                )
            })?;
            Some(listener)
        }
        ListenMode::UnixOnly => None,
    };

    let unix_listener = match config.listen_mode {
        ListenMode::UnixOnly | ListenMode::Both => {
            if Path::new(&config.unix_path).exists() {
                let _ = std::fs::remove_file(&config.unix_path);
            }
            let listener = UnixListener::bind(&config.unix_path).map_err(|err| {
                io::Error::new(
                    err.kind(),
                    format!("Failed to bind Unix socket at {}: {}", config.unix_path, err),
                )
            })?;
            Some(listener)
        }
        ListenMode::TcpOnly => None,
    };

    let mode_str = match config.listen_mode {
        ListenMode::TcpOnly => format!("tcp={}", config.tcp_addr),
        ListenMode::UnixOnly => format!("unix={}", config.unix_path),
        ListenMode::Both => format!("tcp={} unix={}", config.tcp_addr, config.unix_path),
    };
    info!("server_listen {}", mode_str);

    match (tcp_listener, unix_listener) {
        (Some(tcp), Some(unix)) => {
            tokio::try_join!(accept_tcp(tcp, state.clone()), accept_unix(unix, state))?;
            Ok(())
        }
        (Some(tcp), None) => accept_tcp(tcp, state).await,
        (None, Some(unix)) => accept_unix(unix, state).await,
        (None, None) => Ok(()),
    }
}

async fn accept_tcp(listener: TcpListener, state: Arc<Mutex<ServerState>>) -> io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        info!("accept tcp {}", addr);
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_tcp_client(stream, state).await {
                warn!("tcp client {} dropped: {}", addr, err);
            }
        });
    }
}

async fn accept_unix(listener: UnixListener, state: Arc<Mutex<ServerState>>) -> io::Result<()> {
    loop {
        let (stream, _) = listener.accept().await?;
        info!("accept unix");
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_unix_client(stream, state).await {
                warn!("unix client dropped: {}", err);
            }
        });
    }
}

async fn handle_tcp_client(stream: TcpStream, state: Arc<Mutex<ServerState>>) -> io::Result<()> {
    let (reader, writer) = tokio::io::split(stream);
    handle_client(reader, writer, state).await
}

async fn handle_unix_client(stream: UnixStream, state: Arc<Mutex<ServerState>>) -> io::Result<()> {
    let (reader, writer) = tokio::io::split(stream);
    handle_client(reader, writer, state).await
}

async fn handle_client<T>(
    reader: ReadHalf<T>,
    writer: WriteHalf<T>,
    state: Arc<Mutex<ServerState>>,
) -> io::Result<()>
where
    T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let mut inbound = BufReader::new(reader).lines();
    let writer: SharedWriter = Arc::new(Mutex::new(Box::new(writer)));

    let mut client_id: Option<String> = None;
    while let Some(line) = inbound.next_line().await? {
        if let Some((key, name)) = parse_hello(&line) {
            let outgoing = {
                let mut server = state.lock().await;
                server.writers.insert(key.clone(), writer.clone());
                server.hub.hello(&key, &name)
            };
            client_id = Some(key);
            deliver(&state, outgoing).await;
            continue;
        }

        let Some(id) = &client_id else {
            debug!("line before HELLO ignored: {}", line);
            continue;
        };
        match parse_op(&line) {
            Some(op) => {
                let outgoing = state.lock().await.hub.handle(id, op);
                deliver(&state, outgoing).await;
            }
            None => debug!("unparsed line from {}: {}", id, line),
        }
    }

    if let Some(id) = client_id {
        let mut server = state.lock().await;
        let current = server.writers.get(&id).is_some_and(|w| Arc::ptr_eq(w, &writer));
        if current {
            server.writers.remove(&id);
        }
        info!("disconnect {}", id);
    }
    Ok(())
}

async fn deliver(state: &Arc<Mutex<ServerState>>, outgoing: Vec<Outgoing>) {
    let targets = {
        let server = state.lock().await;
        outgoing
            .into_iter()
            .filter_map(|out| {
                server
                    .writers
                    .get(&out.to)
                    .map(|writer| (out.to, writer.clone(), out.line))
            })
            .collect::<Vec<_>>()
    };
    for (to, writer, line) in targets {
        if let Err(err) = write_line(&writer, &line).await {
            warn!("write to {} failed: {}", to, err);
        }
    }
}

async fn write_line(writer: &SharedWriter, line: &str) -> io::Result<()> {
    let mut writer_guard = writer.lock().await;
    writer_guard.write_all(line.as_bytes()).await?;
    writer_guard.write_all(b"\n").await?;
    writer_guard.flush().await
}
