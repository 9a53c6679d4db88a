use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use checkers_duel::i18n::I18n;
use checkers_duel::net::client::{ClientConfig, ClientEvent, connect_client};
use checkers_duel::net::protocol::{Op, Seat};
use checkers_duel::net::server::{ListenMode, ServerConfig, run_server};
use checkers_duel::ui::{
    UiState, accepts_record, draw, handle_key, handle_mouse, player_label, sync_mode,
};
use checkers_duel::{GameRecord, MemoryStore, logging};

const LEAVE_FLUSH_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Server {
        #[arg(long, default_value = "0.0.0.0:2321")]
        tcp: String,
        #[arg(long, default_value = "/tmp/checkers.sock")]
        unix: String,
        #[arg(long)]
        log: Option<String>,
        #[arg(long, value_enum, default_value = "both")]
        mode: ListenModeArg,
    },
    Client {
        #[arg(long)]
        tcp: Option<String>,
        #[arg(long)]
        unix: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value = "lobby")]
        table: String,
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        log: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Debug)]
enum ListenModeArg {
    #[value(name = "tcp")]
    Tcp,
    #[value(name = "unix")]
    Unix,
    #[value(name = "both")]
    Both,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Server {
            tcp,
            unix,
            log,
            mode,
        } => {
            logging::init(log.as_deref());
            let listen_mode = match mode {
                ListenModeArg::Tcp => ListenMode::TcpOnly,
                ListenModeArg::Unix => ListenMode::UnixOnly,
                ListenModeArg::Both => ListenMode::Both,
            };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_server(
                ServerConfig {
                    tcp_addr: tcp,
                    unix_path: unix,
                    listen_mode,
                },
                Arc::new(MemoryStore::new()),
            ))
        }
        Command::Client {
            tcp,
            unix,
            name,
            id,
            table,
            lang,
            log,
        } => {
            // Stdout belongs to the board, so the client only logs to a file.
            if log.is_some() {
                logging::init(log.as_deref());
            }
            run_client(tcp, unix, name, id, table, lang)
        }
    }
}

fn run_client(
    tcp: Option<String>,
    unix: Option<String>,
    name: String,
    id: Option<String>,
    table: String,
    lang: Option<String>,
) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let client_id = id.unwrap_or_else(generate_random_client_id);
    let tcp_addr = match (&tcp, &unix) {
        (None, None) => Some("127.0.0.1:2321".to_string()),
        _ => tcp,
    };
    let (event_rx, op_tx, writer) = runtime.block_on(connect_client(ClientConfig {
        tcp_addr,
        unix_path: unix,
        name,
        client_id: client_id.clone(),
        table: table.clone(),
    }))?;
    info!("client {} joined table {}", client_id, table);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let i18n = I18n::load(lang.as_deref());
    let ui = UiState::new(client_id, table, Some(op_tx.clone()), i18n);
    let result = run_app(&mut terminal, event_rx, ui);

    if let Err(err) = op_tx.send(Op::Leave) {
        warn!("leave not sent: {}", err);
    }
    drop(op_tx);
    let flushed = runtime.block_on(tokio::time::timeout(LEAVE_FLUSH_TIMEOUT, writer));
    if flushed.is_err() {
        warn!("leave not flushed within {:?}", LEAVE_FLUSH_TIMEOUT);
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    event_rx: std::sync::mpsc::Receiver<ClientEvent>,
    mut ui: UiState,
) -> io::Result<()> {
    let mut game: Option<GameRecord> = None;

    loop {
        while let Ok(event) = event_rx.try_recv() {
            match event {
                ClientEvent::Assigned(seat) => {
                    ui.seat = seat;
                    if seat == Seat::Lobby {
                        game = None;
                    } else if game.is_none() {
                        sync_mode(None, &mut ui);
                    }
                }
                ClientEvent::Names(names) => {
                    ui.player_names = names.map(|name| display_name(&name));
                }
                ClientEvent::State(record) => {
                    if !accepts_record(game.as_ref(), &record) {
                        continue;
                    }
                    if let Some(line) = describe_change(game.as_ref(), &record, &ui) {
                        ui.log.push(line);
                    }
                    game = Some(*record);
                    sync_mode(game.as_ref(), &mut ui);
                }
                ClientEvent::Error { code, reason } => {
                    warn!("server rejected: {} {}", code, reason);
                    sync_mode(game.as_ref(), &mut ui);
                    ui.message = ui.i18n.error_text(&code, &reason);
                }
                ClientEvent::Disconnected => {
                    ui.message = ui.i18n.text("status-disconnected");
                }
            }
        }

        terminal.draw(|frame| draw(frame, game.as_ref(), &ui))?;

        if event::poll(Duration::from_millis(80))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(key, game.as_ref(), &mut ui)? {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    let area = terminal.size()?.into();
                    if handle_mouse(mouse, area, game.as_ref(), &mut ui)? {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }
}

fn describe_change(previous: Option<&GameRecord>, next: &GameRecord, ui: &UiState) -> Option<String> {
    let previous = previous.filter(|p| p.id == next.id && p.move_seq < next.move_seq)?;
    match (next.last_move, next.winner) {
        (_, Some(winner)) if next.last_move == previous.last_move => {
            let loser = winner.opponent();
            Some(ui.i18n.text_with(
                "log-forfeit",
                &[("player", player_label(&ui.i18n, loser, &ui.player_names))],
            ))
        }
        (Some(last), _) => {
            let mover = next.piece_at(last.to).map(|piece| piece.owner)?;
            Some(ui.i18n.text_with(
                "log-move",
                &[
                    ("player", player_label(&ui.i18n, mover, &ui.player_names)),
                    ("from", last.from.to_string()),
                    ("to", last.to.to_string()),
                ],
            ))
        }
        _ => None,
    }
}

fn display_name(token: &str) -> String {
    if token == "-" {
        String::new()
    } else {
        token.replace('_', " ")
    }
}

fn generate_random_client_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("client-{}", nanos)
}
