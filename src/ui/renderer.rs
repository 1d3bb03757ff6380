/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the game snapshot; the one piece of state it
/// owns is the event banner.

use std::io::{self, BufWriter, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Difficulty, Direction, Ghost, GhostMode, Position, Rgb};
use crate::domain::rules;
use crate::domain::tile::Tile;
use crate::sim::event::GameEvent;
use crate::sim::world::{GameState, Status};

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 10, g: 10, b: 20 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const WALL_FG: Color = Color::Rgb { r: 60, g: 90, b: 230 };
const WALL_BG: Color = Color::Rgb { r: 25, g: 35, b: 110 };
const HOUSE_BG: Color = Color::Rgb { r: 30, g: 20, b: 40 };
const PELLET_FG: Color = Color::Rgb { r: 250, g: 220, b: 180 };
const MUNCHER_FG: Color = Color::Rgb { r: 250, g: 204, b: 21 };
const FRIGHTENED_FG: Color = Color::Rgb { r: 37, g: 99, b: 235 };
const BLINK_FG: Color = Color::Rgb { r: 240, g: 240, b: 255 };
const EYES_FG: Color = Color::Rgb { r: 220, g: 220, b: 220 };
const OVERLAY_BG: Color = Color::Rgb { r: 30, g: 30, b: 45 };
const BANNER_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any
    /// real cell, so every position gets repainted.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Clipped at the right edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Glyphs ──

/// Each maze cell is two terminal columns wide.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 1;

const BANNER_TIME: Duration = Duration::from_millis(1500);

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

/// (left, right, fg, bg) for a bare tile.
fn tile_glyph(tile: Tile) -> (char, char, Color, Color) {
    match tile {
        Tile::Wall        => ('█', '█', WALL_FG, WALL_BG),
        Tile::Pellet      => ('·', ' ', PELLET_FG, BASE_BG),
        Tile::PowerPellet => ('●', ' ', PELLET_FG, BASE_BG),
        Tile::GhostHouse  => (' ', ' ', Color::White, HOUSE_BG),
        Tile::Path | Tile::Empty => (' ', ' ', Color::White, BASE_BG),
    }
}

/// Open mouth faces the heading; closed is a plain disc.
fn muncher_glyph(dir: Direction, mouth_open: bool) -> char {
    if !mouth_open { return '●'; }
    match dir {
        Direction::Right | Direction::None => 'ᗧ',
        Direction::Left => 'ᗤ',
        Direction::Up => 'ᗢ',
        Direction::Down => 'ᗣ',
    }
}

/// (left, right, fg) for a ghost given the frightened countdown.
fn ghost_glyph(ghost: &Ghost, frightened_ticks_left: u32) -> (char, char, Color) {
    match ghost.mode {
        GhostMode::Chase => ('ᗝ', ' ', rgb(ghost.color)),
        GhostMode::Frightened if rules::is_blinking(frightened_ticks_left) => ('ᗝ', ' ', BLINK_FG),
        GhostMode::Frightened => ('ᗝ', ' ', FRIGHTENED_FG),
        GhostMode::Eaten => ('°', '°', EYES_FG),
    }
}

fn banner_text(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::Started => Some("GO!".into()),
        GameEvent::Restarted => Some("New game".into()),
        GameEvent::DifficultyChanged(d) => Some(format!("Difficulty: {}", d.label())),
        GameEvent::PowerPelletEaten { .. } => Some("POWER UP!".into()),
        GameEvent::GhostEaten { .. } => Some(format!("+{}", rules::GHOST_SCORE)),
        GameEvent::LifeLost { lives_left } if *lives_left > 0 => {
            Some(format!("Caught! {} {} left", lives_left, if *lives_left == 1 { "life" } else { "lives" }))
        }
        GameEvent::FrightenedEnded => Some("Ghosts recovered".into()),
        _ => None,
    }
}

/// Transient message shown under the maze.
struct Banner {
    text: String,
    expires: Instant,
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_status: Option<Status>,
    banner: Option<Banner>,
    /// Frames drawn so far; drives overlay blinking.
    frame: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_status: None,
            banner: None,
            frame: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.invalidate();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Pick up banner-worthy events. The last one wins.
    pub fn notify(&mut self, events: &[GameEvent], now: Instant) {
        if let Some(text) = events.iter().filter_map(banner_text).last() {
            self.banner = Some(Banner { text, expires: now + BANNER_TIME });
        }
    }

    pub fn render(&mut self, state: &GameState) -> io::Result<()> {
        let now = Instant::now();
        self.frame = self.frame.wrapping_add(1);

        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        // Status change → clear for a clean transition
        if self.last_status != Some(state.status) {
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
            self.last_status = Some(state.status);
        }

        if self.banner.as_ref().map_or(false, |b| now >= b.expires) {
            self.banner = None;
        }

        self.front.clear();
        self.compose_hud(state);
        self.compose_maze(state);
        self.compose_footer(state);
        match state.status {
            Status::Ready => self.compose_ready(state),
            Status::GameOver => self.compose_end(state, "G A M E   O V E R", Color::Rgb { r: 255, g: 60, b: 60 }),
            Status::Won => self.compose_end(state, "M A Z E   C L E A R !", Color::Rgb { r: 80, g: 255, b: 80 }),
            Status::Playing => {}
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, s: &GameState) {
        let lives: String = std::iter::repeat('ᗧ').take(s.lives as usize).collect();
        let mut hud = format!(
            " SCORE {:<6}  LIVES {:<3}  {:<6}  PELLETS {:<3}",
            s.score, lives, s.difficulty.label(), s.remaining_pellets,
        );
        if s.frightened_ticks_left > 0 {
            hud.push_str(&format!("  POWER {:>2}", s.frightened_ticks_left));
        }
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_maze(&mut self, s: &GameState) {
        for (gy, row) in s.board.rows().enumerate() {
            for (gx, &tile) in row.iter().enumerate() {
                let (c0, c1, fg, bg) = tile_glyph(tile);
                self.put_cell(gx, gy, c0, c1, fg, bg);
            }
        }

        // Ghosts in roster order: later ones draw over earlier ones.
        for g in &s.ghosts {
            let (c0, c1, fg) = ghost_glyph(g, s.frightened_ticks_left);
            let bg = self.board_bg(s, g.position.x, g.position.y);
            self.put_cell(g.position.x as usize, g.position.y as usize, c0, c1, fg, bg);
        }

        let p = &s.player;
        let bg = self.board_bg(s, p.position.x, p.position.y);
        let glyph = muncher_glyph(p.direction, p.mouth_open);
        self.put_cell(p.position.x as usize, p.position.y as usize, glyph, ' ', MUNCHER_FG, bg);
    }

    fn board_bg(&self, s: &GameState, x: i32, y: i32) -> Color {
        let tile = s.board.tile_at(Position::new(x, y)).unwrap_or_default();
        tile_glyph(tile).3
    }

    fn put_cell(&mut self, gx: usize, gy: usize, c0: char, c1: char, fg: Color, bg: Color) {
        let col = MAP_COL + gx * CELL_W;
        let row = MAP_ROW + gy;
        self.front.set(col, row, Cell::new(c0, fg, bg));
        self.front.set(col + 1, row, Cell::new(c1, fg, bg));
    }

    fn compose_footer(&mut self, s: &GameState) {
        let banner_row = MAP_ROW + s.board.height() + 1;
        if let Some(banner) = &self.banner {
            let msg = format!(" ◈ {} ", banner.text);
            self.front.put_str(MAP_COL, banner_row, &msg, Color::Black, BANNER_BG);
        }

        let help_row = banner_row + 2;
        let help = " ←↑↓→/WASD: Move   R: Restart   1/2/3: Difficulty   Q/Esc: Quit";
        self.front.put_str(0, help_row, help, Color::DarkGrey, BASE_BG);
    }

    /// Centered box over the maze. Returns (x, y) of its top-left corner.
    fn overlay_box(&mut self, s: &GameState, w: usize, h: usize) -> (usize, usize) {
        let map_w = s.board.width() * CELL_W;
        let map_h = s.board.height();
        let x = MAP_COL + map_w.saturating_sub(w) / 2;
        let y = MAP_ROW + map_h.saturating_sub(h) / 2;
        for yy in y..y + h {
            for xx in x..x + w {
                self.front.set(xx, yy, Cell::new(' ', Color::White, OVERLAY_BG));
            }
        }
        (x, y)
    }

    fn put_centered(&mut self, x: usize, w: usize, y: usize, text: &str, fg: Color) {
        let len = text.chars().count();
        let cx = x + w.saturating_sub(len) / 2;
        self.front.put_str(cx, y, text, fg, OVERLAY_BG);
    }

    fn compose_ready(&mut self, s: &GameState) {
        let (w, h) = (30, 9);
        let (x, y) = self.overlay_box(s, w, h);
        let title = Color::Rgb { r: 255, g: 220, b: 50 };
        self.put_centered(x, w, y + 1, "M U N C H E R", title);

        // Difficulty selector
        let mut col = x + 3;
        for (i, d) in Difficulty::ALL.into_iter().enumerate() {
            let label = format!("{}:{}", i + 1, d.label());
            let (fg, bg) = if d == s.difficulty {
                (Color::Black, title)
            } else {
                (Color::Grey, OVERLAY_BG)
            };
            self.front.put_str(col, y + 4, &label, fg, bg);
            col += label.chars().count() + 2;
        }

        let blink = (self.frame / 30) % 2 == 0;
        if blink {
            self.put_centered(x, w, y + 7, "Press any key to start", Color::White);
        }
    }

    fn compose_end(&mut self, s: &GameState, headline: &str, color: Color) {
        let (w, h) = (30, 7);
        let (x, y) = self.overlay_box(s, w, h);
        self.put_centered(x, w, y + 1, headline, color);
        let score = format!("Final score: {}", s.score);
        self.put_centered(x, w, y + 3, &score, Color::White);
        self.put_centered(x, w, y + 5, "R: play again", Color::Grey);
    }
}
