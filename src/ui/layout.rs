use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const CELL_WIDTH: u16 = 3;
pub const LABEL_WIDTH: u16 = 3;

#[derive(Debug, Clone, Copy)]
pub struct LayoutInfo {
    pub header: Rect,
    pub left_panel: Rect,
    pub board: Rect,
    pub right_panel: Rect,
    pub status: Rect,
    pub log: Rect,
    pub board_inner: Rect,
}

pub fn compute_layout(area: Rect) -> LayoutInfo {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(11),
            Constraint::Length(2),
            Constraint::Length(2),
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22),
            Constraint::Min(LABEL_WIDTH + CELL_WIDTH * 8 + 2),
            Constraint::Length(22),
        ])
        .split(rows[1]);

    LayoutInfo {
        header: rows[0],
        left_panel: body[0],
        board: body[1],
        right_panel: body[2],
        status: rows[2],
        log: rows[3],
        board_inner: inner_rect(body[1]),
    }
}

/// Board square under a terminal cell, if any. Row 0 of the inner area is
/// the column header.
pub fn square_at(board_inner: Rect, column: u16, row: u16) -> Option<crate::game::Position> {
    let x = column.checked_sub(board_inner.x + LABEL_WIDTH)?;
    let y = row.checked_sub(board_inner.y + 1)?;
    let (col, row) = ((x / CELL_WIDTH) as usize, y as usize);
    let pos = crate::game::Position::new(row, col);
    pos.in_bounds().then_some(pos)
}

fn inner_rect(rect: Rect) -> Rect {
    let width = rect.width.saturating_sub(2);
    let height = rect.height.saturating_sub(2);
    Rect::new(rect.x + 1, rect.y + 1, width, height)
}
