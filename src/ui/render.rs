use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::game::{GamePhase, GameRecord, Move, Player, Position};
use crate::ui::layout::{CELL_WIDTH, LABEL_WIDTH, compute_layout};
use crate::ui::state::{UiMode, UiState};
use crate::ui::util::{help_text, moves_from, my_moves, player_label, seat_label};

pub fn draw(frame: &mut ratatui::Frame, game: Option<&GameRecord>, ui: &UiState) {
    let layout = compute_layout(frame.area());

    let turn = match game.map(GameRecord::phase) {
        Some(GamePhase::Active { turn, .. }) => player_label(&ui.i18n, turn, &ui.player_names),
        _ => "-".to_string(),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            ui.i18n.text("header-title"),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::raw(
            ui.i18n
                .text_with("header-table", &[("table", ui.table.clone())]),
        ),
        Span::raw(" | "),
        Span::styled(
            ui.i18n.text_with("header-turn", &[("player", turn)]),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" | "),
        Span::raw(
            ui.i18n
                .text_with("header-seat", &[("seat", seat_label(&ui.i18n, ui.seat))]),
        ),
        Span::raw(" | "),
        Span::raw(ui.i18n.text("header-help")),
    ]));
    frame.render_widget(header, layout.header);

    frame.render_widget(player_panel(game, ui, Player::Red), layout.left_panel);
    frame.render_widget(player_panel(game, ui, Player::Black), layout.right_panel);
    frame.render_widget(board_panel(game, ui), layout.board);

    let status = Paragraph::new(vec![Line::from(ui.message.clone())])
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, layout.status);

    let log_text = ui
        .log
        .iter()
        .rev()
        .take(3)
        .rev()
        .cloned()
        .collect::<Vec<_>>()
        .join(" | ");
    let log = Paragraph::new(log_text).block(Block::default().borders(Borders::TOP));
    frame.render_widget(log, layout.log);
}

fn player_panel(game: Option<&GameRecord>, ui: &UiState, player: Player) -> Paragraph<'static> {
    let mut lines = vec![Line::from(Span::styled(
        player_label(&ui.i18n, player, &ui.player_names),
        Style::default()
            .fg(piece_color(player))
            .add_modifier(Modifier::BOLD),
    ))];

    if let Some(game) = game {
        let (men, kings) = game.board.census(player);
        lines.push(Line::from(
            ui.i18n
                .text_with("panel-men", &[("count", men.to_string())]),
        ));
        lines.push(Line::from(
            ui.i18n
                .text_with("panel-kings", &[("count", kings.to_string())]),
        ));
        lines.push(Line::from(""));
        match game.phase() {
            GamePhase::Active { turn, continuation } if turn == player => {
                lines.push(Line::from(ui.i18n.text("panel-to-move")));
                if continuation.is_some() {
                    lines.push(Line::from(ui.i18n.text("panel-jumping")));
                }
            }
            GamePhase::Finished { winner } if winner == player => {
                lines.push(Line::from(Span::styled(
                    ui.i18n.text("panel-winner"),
                    Style::default().fg(Color::Yellow),
                )));
            }
            _ => {}
        }
    }

    Paragraph::new(lines).block(Block::default().borders(Borders::ALL))
}

fn board_panel(game: Option<&GameRecord>, ui: &UiState) -> Paragraph<'static> {
    let (selected, targets) = highlights(game, ui);
    let movable = movable_pieces(game, ui);
    let last = game.and_then(|g| g.last_move);

    let mut header = " ".repeat(LABEL_WIDTH as usize);
    for col in 0..8 {
        header.push_str(&format!("{:^width$}", col, width = CELL_WIDTH as usize));
    }
    let mut lines = vec![Line::from(Span::styled(
        header,
        Style::default().fg(Color::DarkGray),
    ))];

    for row in 0..8 {
        let mut spans = vec![Span::styled(
            format!("{:>2} ", row),
            Style::default().fg(Color::DarkGray),
        )];
        for col in 0..8 {
            let pos = Position::new(row, col);
            let piece = game.and_then(|g| g.piece_at(pos));
            let glyph = match piece {
                Some(piece) => {
                    let ch = match (piece.owner, piece.is_king()) {
                        (Player::Red, false) => 'r',
                        (Player::Red, true) => 'R',
                        (Player::Black, false) => 'b',
                        (Player::Black, true) => 'B',
                    };
                    format!(" {} ", ch)
                }
                None if pos.is_dark() => " . ".to_string(),
                None => "   ".to_string(),
            };

            let mut style = Style::default();
            if let Some(piece) = piece {
                style = style.fg(piece_color(piece.owner)).add_modifier(Modifier::BOLD);
                if piece.is_king() {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
            } else if pos.is_dark() {
                style = style.fg(Color::DarkGray);
            }
            if last.is_some_and(|m| m.from == pos || m.to == pos) {
                style = style.bg(Color::Rgb(40, 40, 70));
            }
            if movable.contains(&pos) {
                style = style.bg(Color::Rgb(70, 70, 20));
            }
            if targets.iter().any(|mv| mv.to == pos) {
                style = style.bg(Color::Green).fg(Color::Black);
            }
            if selected == Some(pos) {
                style = style.bg(Color::Yellow).fg(Color::Black);
            }
            if ui.cursor == pos {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(glyph, style));
        }
        lines.push(Line::from(spans));
    }

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(ui.i18n.text("board-title"))
            .title_bottom(help_text(ui)),
    )
}

fn highlights(game: Option<&GameRecord>, ui: &UiState) -> (Option<Position>, Vec<Move>) {
    let Some(game) = game else {
        return (None, Vec::new());
    };
    match ui.mode {
        UiMode::PickDest { from } => (Some(from), moves_from(game, ui, from)),
        UiMode::PickPiece => (None, moves_from(game, ui, ui.cursor)),
        _ => (None, Vec::new()),
    }
}

fn movable_pieces(game: Option<&GameRecord>, ui: &UiState) -> Vec<Position> {
    match (game, ui.mode) {
        (Some(game), UiMode::PickPiece) => my_moves(game, ui).iter().map(|mv| mv.from).collect(),
        _ => Vec::new(),
    }
}

fn piece_color(player: Player) -> Color {
    match player {
        Player::Red => Color::Red,
        Player::Black => Color::Blue,
    }
}
