//! GameView: maps a [`SessionSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! The board is drawn with y = 0 on the bottom row. The HUD sits to the right
//! of the board and the turn feed below it.

use std::fmt::Write as _;

use crate::engine::{BoosterKind, HintSuggestion, RunState, SessionSnapshot};
use crate::core::{CellState, ShapeDefinition};
use crate::fb::{CellStyle, FrameBuffer, Glyph, Rgb};
use crate::types::{BombKind, Cell, TurnResult};

const PANEL_GAP: u16 = 2;
const PANEL_W: u16 = 30;
const FEED_ROWS: u16 = 4;
const POWER_SEGMENTS: u32 = 10;

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const ZONE_BG: Rgb = Rgb::new(38, 38, 52);
const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);

const LABEL: CellStyle = CellStyle::new(Rgb::new(220, 220, 220), SCREEN_BG).bold();
const VALUE: CellStyle = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);
const MUTED: CellStyle = CellStyle::new(Rgb::new(120, 120, 130), SCREEN_BG).dim();
const WARN: CellStyle = CellStyle::new(Rgb::new(240, 120, 100), SCREEN_BG).bold();

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Front-end state drawn on top of the session snapshot.
#[derive(Debug, Clone, Default)]
pub struct ViewOverlay {
    pub cursor: Cell,
    pub selected_slot: Option<usize>,
    pub hint: Option<HintSuggestion>,
    /// Recent feed lines, oldest first.
    pub feed: Vec<String>,
    /// Last rejection or notice.
    pub message: Option<String>,
}

/// Screen rectangle of the board frame (border included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
    n: u16,
}

pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self::new(2, 1)
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    fn frame(&self, board_size: i32, viewport: Viewport) -> Frame {
        let n = board_size.clamp(0, u16::MAX as i32) as u16;
        let w = n.saturating_mul(self.cell_w).saturating_add(2);
        let h = n.saturating_mul(self.cell_h).saturating_add(2);
        let total_w = w.saturating_add(PANEL_GAP + PANEL_W);
        let total_h = h.saturating_add(1 + FEED_ROWS);
        let x = viewport.width.saturating_sub(total_w) / 2;
        let y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(total_h) / 2,
            AnchorY::Top => 0,
        };
        Frame { x, y, w, h, n }
    }

    /// Top-left terminal position of a grid cell.
    fn cell_origin(&self, frame: Frame, cell: Cell) -> Option<(u16, u16)> {
        if cell.x < 0 || cell.y < 0 || cell.x >= frame.n as i32 || cell.y >= frame.n as i32 {
            return None;
        }
        let col = cell.x as u16;
        let row = frame.n - 1 - cell.y as u16;
        Some((
            frame.x + 1 + col * self.cell_w,
            frame.y + 1 + row * self.cell_h,
        ))
    }

    /// Grid cell under a terminal position, if it lies on the board.
    pub fn cell_at(&self, board_size: i32, viewport: Viewport, column: u16, row: u16) -> Option<Cell> {
        let frame = self.frame(board_size, viewport);
        if column <= frame.x || row <= frame.y {
            return None;
        }
        let col = (column - frame.x - 1) / self.cell_w;
        let screen_row = (row - frame.y - 1) / self.cell_h;
        if col >= frame.n || screen_row >= frame.n {
            return None;
        }
        Some(Cell::new(col as i32, (frame.n - 1 - screen_row) as i32))
    }

    /// Render a frame into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(
        &self,
        snap: &SessionSnapshot,
        overlay: &ViewOverlay,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Glyph::default());

        let frame = self.frame(snap.board.size, viewport);
        let border = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);
        self.draw_border(fb, frame.x, frame.y, frame.w, frame.h, border);
        self.draw_board(fb, frame, snap);

        let playing = snap.run_state == RunState::Playing;
        if playing {
            if let Some(hint) = &overlay.hint {
                let style = CellStyle::new(Rgb::new(240, 210, 90), BOARD_BG);
                for cell in hint.cells() {
                    self.fill_cell(fb, frame, cell, '▒', style);
                }
            }
            if let Some(shape) = selected_shape(snap, overlay) {
                self.draw_ghost(fb, frame, snap, shape, overlay.cursor);
            }
            self.highlight_cursor(fb, frame, overlay.cursor);
        }

        self.draw_side_panel(fb, snap, overlay, viewport, frame);
        self.draw_feed(fb, overlay, frame);

        match snap.run_state {
            RunState::Playing => {}
            RunState::Won => {
                self.draw_overlay_text(fb, frame, 0, "LEVEL CLEAR");
                self.draw_overlay_text(fb, frame, 1, "n: next level");
            }
            RunState::Lost(_) => {
                self.draw_overlay_text(fb, frame, 0, "NO MOVES");
                let keys = if snap.second_chance_available {
                    "c: second chance  n/r: retry"
                } else {
                    "n/r: retry"
                };
                self.draw_overlay_text(fb, frame, 1, keys);
            }
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &SessionSnapshot, overlay: &ViewOverlay, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, overlay, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_board(&self, fb: &mut FrameBuffer, frame: Frame, snap: &SessionSnapshot) {
        let zone = snap.zone_size.max(1);
        for y in 0..snap.board.size {
            for x in 0..snap.board.size {
                let cell = Cell::new(x, y);
                // Alternate zone tiles so 3x3 groups read at a glance.
                let bg = if (x / zone + y / zone) % 2 == 0 {
                    BOARD_BG
                } else {
                    ZONE_BG
                };
                let (ch, style) = match snap.board.get(cell).unwrap_or_default() {
                    CellState::Empty => ('·', CellStyle::new(Rgb::new(90, 90, 100), bg).dim()),
                    CellState::Filled => ('█', CellStyle::new(Rgb::new(80, 190, 220), bg).bold()),
                    CellState::Blocker => ('▓', CellStyle::new(Rgb::new(200, 70, 70), bg)),
                    CellState::BlockerOnFigure => {
                        ('▓', CellStyle::new(Rgb::new(230, 90, 60), Rgb::new(40, 90, 110)).bold())
                    }
                };
                self.fill_cell(fb, frame, cell, ch, style);
            }
        }
    }

    fn draw_ghost(
        &self,
        fb: &mut FrameBuffer,
        frame: Frame,
        snap: &SessionSnapshot,
        shape: &ShapeDefinition,
        origin: Cell,
    ) {
        let fg = if snap.board.can_place(shape.cells(), origin) {
            Rgb::new(120, 220, 120)
        } else {
            Rgb::new(220, 90, 90)
        };
        let style = CellStyle::new(fg, BOARD_BG);
        for &offset in shape.cells() {
            self.fill_cell(fb, frame, origin + offset, '░', style);
        }
    }

    fn highlight_cursor(&self, fb: &mut FrameBuffer, frame: Frame, cursor: Cell) {
        let Some((px, py)) = self.cell_origin(frame, cursor) else {
            return;
        };
        for dy in 0..self.cell_h {
            for dx in 0..self.cell_w {
                if let Some(g) = fb.get(px + dx, py + dy) {
                    let style = CellStyle {
                        bg: Rgb::new(90, 90, 130),
                        bold: true,
                        dim: false,
                        ..g.style
                    };
                    fb.put_char(px + dx, py + dy, g.ch, style);
                }
            }
        }
    }

    fn fill_cell(&self, fb: &mut FrameBuffer, frame: Frame, cell: Cell, ch: char, style: CellStyle) {
        if let Some((px, py)) = self.cell_origin(frame, cell) {
            fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &SessionSnapshot,
        overlay: &ViewOverlay,
        viewport: Viewport,
        frame: Frame,
    ) {
        let panel_x = frame.x.saturating_add(frame.w).saturating_add(PANEL_GAP);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let mut y = frame.y;
        let x = fb.put_str(panel_x, y, "SCORE ", LABEL);
        fb.put_u32(x, y, snap.score, VALUE);
        y += 1;
        fb.put_str(panel_x, y, &snap.goal_label, VALUE);
        y += 1;
        let x = fb.put_str(panel_x, y, &snap.level_label, VALUE);
        fb.put_str(x + 2, y, &snap.variety_label, MUTED);
        y += 2;

        let x = fb.put_str(panel_x, y, "POWER ", LABEL);
        let filled = if snap.power_max == 0 {
            0
        } else {
            (snap.power_charge.min(snap.power_max) * POWER_SEGMENTS) / snap.power_max
        };
        let mut bar = String::with_capacity(POWER_SEGMENTS as usize + 2);
        bar.push('[');
        for i in 0..POWER_SEGMENTS {
            bar.push(if i < filled { '#' } else { '.' });
        }
        bar.push(']');
        let x = fb.put_str(x, y, &bar, VALUE);
        let x = fb.put_u32(x + 1, y, snap.power_charge, VALUE);
        let x = fb.put_str(x, y, "/", MUTED);
        fb.put_u32(x, y, snap.power_max, MUTED);
        y += 2;

        for status in snap.boosters.iter() {
            let style = if status.ready { VALUE } else { MUTED };
            let key = match status.kind {
                BoosterKind::Swap => "S",
                BoosterKind::Bomb(BombKind::Horizontal) => "x",
                BoosterKind::Bomb(BombKind::Vertical) => "v",
                BoosterKind::Bomb(BombKind::Area3x3) => "b",
            };
            fb.put_str(panel_x, y, key, LABEL);
            fb.put_str(panel_x + 2, y, status.kind.label(), style);
            let x = fb.put_str(panel_x + 13, y, "x", style);
            let x = fb.put_u32(x, y, status.charges, style);
            let x = fb.put_str(x + 2, y, "cost ", style);
            fb.put_u32(x, y, status.cost, style);
            y += 1;
        }
        y += 1;

        let x = fb.put_str(panel_x, y, "BLOCKERS move in ", LABEL);
        fb.put_u32(x, y, snap.turns_until_blocker_move, VALUE);
        y += 2;

        fb.put_str(panel_x, y, "TRAY", LABEL);
        y += 1;
        for (i, slot) in snap.tray.iter().enumerate() {
            let sx = panel_x + (i as u16) * 9;
            if sx >= viewport.width {
                break;
            }
            let selected = overlay.selected_slot == Some(i);
            let label_style = if selected { WARN } else { LABEL };
            if selected {
                fb.put_char(sx, y, '>', label_style);
            }
            fb.put_u32(sx + 1, y, i as u32 + 1, label_style);
            if let Some(shape) = slot {
                self.draw_mini_shape(fb, sx, y + 1, shape, selected);
            } else {
                fb.put_char(sx + 1, y + 1, '-', MUTED);
            }
        }
        y += 5;

        if let Some(hint) = &overlay.hint {
            let mut text = String::new();
            let _ = write!(
                text,
                "Hint: slot {} at ({}, {})",
                hint.slot + 1,
                hint.origin.x,
                hint.origin.y
            );
            fb.put_str(panel_x, y, &text, CellStyle::new(Rgb::new(240, 210, 90), SCREEN_BG));
        }
    }

    /// Draw a tray shape, top row first, in 2-column cells.
    fn draw_mini_shape(&self, fb: &mut FrameBuffer, x: u16, y: u16, shape: &ShapeDefinition, selected: bool) {
        let (w, h) = shape.extent();
        let fg = if selected {
            Rgb::new(120, 220, 120)
        } else {
            Rgb::new(80, 190, 220)
        };
        let style = CellStyle::new(fg, SCREEN_BG);
        for &c in shape.cells() {
            if c.x < 0 || c.y < 0 || c.x >= w || c.y >= h {
                continue;
            }
            let px = x + (c.x as u16) * 2;
            let py = y + (h - 1 - c.y) as u16;
            fb.fill_rect(px, py, 2, 1, '█', style);
        }
    }

    fn draw_feed(&self, fb: &mut FrameBuffer, overlay: &ViewOverlay, frame: Frame) {
        let y = frame.y.saturating_add(frame.h);
        if let Some(message) = &overlay.message {
            fb.put_str(frame.x, y, message, WARN);
        }
        let skip = overlay.feed.len().saturating_sub(FEED_ROWS as usize);
        for (i, line) in overlay.feed.iter().skip(skip).enumerate() {
            let style = if skip + i + 1 == overlay.feed.len() {
                VALUE
            } else {
                MUTED
            };
            fb.put_str(frame.x, y + 1 + i as u16, line, style);
        }
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, frame: Frame, line: u16, text: &str) {
        let mid_y = frame.y.saturating_add(frame.h / 2).saturating_add(line);
        let text_w = text.chars().count() as u16;
        let x = frame.x.saturating_add(frame.w.saturating_sub(text_w) / 2);
        let style = CellStyle::new(Rgb::new(255, 255, 255), SCREEN_BG).bold();
        fb.put_str(x, mid_y, text, style);
    }
}

fn selected_shape<'a>(snap: &'a SessionSnapshot, overlay: &ViewOverlay) -> Option<&'a ShapeDefinition> {
    let slot = overlay.selected_slot?;
    snap.tray.get(slot)?.as_deref()
}

/// One score-feed line for a resolved turn. `None` for turns that placed nothing.
pub fn feed_line(result: &TurnResult) -> Option<String> {
    if !result.placement_succeeded {
        return None;
    }
    let mut line = String::with_capacity(64);
    let _ = write!(
        line,
        "+{}  Cells:+{}  Blockers:+{}  Lines:+{}  Zones:+{}",
        result.score_gained,
        result.score_from_cells,
        result.score_from_blockers,
        result.score_from_lines,
        result.score_from_zones
    );
    if result.combo_bonus > 0 {
        let _ = write!(line, "  Combo:+{}", result.combo_bonus);
    }
    Some(line)
}
