/// Rendering layer.  All terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// world coordinates into terminal cells through a camera that follows the
/// tank.
use std::f32::consts::{FRAC_PI_4, PI};
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use tank_boy::compute::hud;
use tank_boy::entities::{GameState, GameStatus, Projectile, WeaponKind};
use tank_boy::terrain::{Block, Surface};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_GROUND: Color = Color::DarkYellow;
const C_GRASS: Color = Color::Green;
const C_TANK: Color = Color::White;
const C_GROUND_ENEMY: Color = Color::Red;
const C_FLYING_ENEMY: Color = Color::Magenta;
const C_BULLET_MG: Color = Color::Cyan;
const C_BULLET_CANNON: Color = Color::Yellow;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_HUD: Color = Color::Yellow;
const C_HUD_HP: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

/// World pixels covered by one terminal cell.
const CELL_W: f32 = 8.0;
const CELL_H: f32 = 16.0;

// ── Camera ────────────────────────────────────────────────────────────────────

/// Maps world pixels to the play area (every row except the HUD and hint rows).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub cols: u16,
    pub rows: u16,
}

impl Camera {
    /// Centre on the tank, clamped so the view never leaves the world.
    pub fn follow(state: &GameState, cols: u16, rows: u16) -> Camera {
        let rows = rows.saturating_sub(2);
        let view_w = cols as f32 * CELL_W;
        let view_h = rows as f32 * CELL_H;
        let (cx, cy) = state.tank.center();

        let max_x = (state.terrain.width() - view_w).max(0.0);
        let max_y = (state.terrain.height() - view_h).max(0.0);
        Camera {
            x: (cx - view_w * 0.5).clamp(0.0, max_x),
            y: (cy - view_h * 0.5).clamp(0.0, max_y),
            cols,
            rows,
        }
    }

    fn view_size(&self) -> (f32, f32) {
        (self.cols as f32 * CELL_W, self.rows as f32 * CELL_H)
    }

    /// Terminal cell for a world point, or `None` when it is off screen.
    fn to_screen(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let col = ((x - self.x) / CELL_W).floor();
        let row = ((y - self.y) / CELL_H).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        // +1 skips the HUD row.
        Some((col as u16, row as u16 + 1))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let camera = Camera::follow(state, cols, rows);

    draw_terrain(out, state, &camera)?;
    draw_enemies(out, state, &camera)?;
    for p in state.projectiles.alive() {
        draw_projectile(out, p, &camera)?;
    }
    draw_tank(out, state, &camera)?;

    draw_hud(out, state, cols)?;
    draw_controls_hint(out, rows)?;

    if state.status == GameStatus::GameOver {
        draw_game_over(out, state, cols, rows)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Terrain ───────────────────────────────────────────────────────────────────

fn draw_terrain<W: Write>(out: &mut W, state: &GameState, camera: &Camera) -> std::io::Result<()> {
    let (view_w, view_h) = camera.view_size();
    let visible = state.terrain.query_region(
        camera.x + view_w * 0.5,
        camera.y + view_h * 0.5,
        view_w,
        view_h,
    );
    if visible.is_empty() {
        return Ok(());
    }

    for row in 0..camera.rows {
        let wy = camera.y + (row as f32 + 0.5) * CELL_H;
        let mut line = String::with_capacity(camera.cols as usize);
        let mut colour: Option<Color> = None;
        let mut start_col = 0u16;

        for col in 0..camera.cols {
            let wx = camera.x + (col as f32 + 0.5) * CELL_W;
            let cell = surface_at(&visible, wx, wy).map(|s| match s {
                Surface::Grass => ('▀', C_GRASS),
                Surface::Ground => ('▓', C_GROUND),
            });

            let cell_colour = cell.map(|(_, c)| c);
            if cell_colour != colour {
                flush_run(out, &line, colour, start_col, row + 1)?;
                line.clear();
                colour = cell_colour;
                start_col = col;
            }
            line.push(cell.map(|(ch, _)| ch).unwrap_or(' '));
        }
        flush_run(out, &line, colour, start_col, row + 1)?;
    }
    Ok(())
}

fn surface_at(blocks: &[Block], x: f32, y: f32) -> Option<Surface> {
    blocks
        .iter()
        .find(|b| x >= b.x && x < b.x + b.width && y >= b.y && y < b.y + b.height)
        .map(|b| b.surface)
}

/// Print a run of same-coloured cells; blank runs are skipped.
fn flush_run<W: Write>(
    out: &mut W,
    run: &str,
    colour: Option<Color>,
    col: u16,
    row: u16,
) -> std::io::Result<()> {
    let Some(colour) = colour else {
        return Ok(());
    };
    if run.is_empty() {
        return Ok(());
    }
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(colour))?;
    out.queue(Print(run))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_tank<W: Write>(out: &mut W, state: &GameState, camera: &Camera) -> std::io::Result<()> {
    // Blink while invincible.
    if state.tank.invincibility() > 0.0 && state.frame % 8 < 4 {
        return Ok(());
    }

    let (x, y) = state.tank.position();
    let (_, h) = state.tank.size();
    out.queue(style::SetForegroundColor(C_TANK))?;
    if let Some((col, row)) = camera.to_screen(x, y + h * 0.5) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("▐██▌"))?;
    }

    let angle = state.tank.aim_angle();
    let (mx, my) = state.tank.muzzle();
    let (bx, by) = (mx + angle.cos() * CELL_H, my + angle.sin() * CELL_H);
    if let Some((col, row)) = camera.to_screen(bx, by) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print(barrel_glyph(angle)))?;
    }
    Ok(())
}

/// Pick a line-drawing glyph matching the barrel direction.
fn barrel_glyph(angle: f32) -> char {
    let a = angle.rem_euclid(PI);
    if a < FRAC_PI_4 * 0.5 || a >= PI - FRAC_PI_4 * 0.5 {
        '─'
    } else if a < FRAC_PI_4 * 1.5 {
        '\\'
    } else if a < FRAC_PI_4 * 2.5 {
        '│'
    } else {
        '/'
    }
}

fn draw_enemies<W: Write>(out: &mut W, state: &GameState, camera: &Camera) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_GROUND_ENEMY))?;
    for e in state.ground_enemies.iter().filter(|e| e.alive) {
        if let Some((col, row)) = camera.to_screen(e.x, e.y + e.height * 0.5) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print(match e.weapon {
                WeaponKind::MachineGun => "<▓▓>",
                WeaponKind::Cannon => "<■■>",
            }))?;
        }
    }

    out.queue(style::SetForegroundColor(C_FLYING_ENEMY))?;
    for fe in state.flying_enemies.iter().filter(|e| e.alive) {
        if let Some((col, row)) = camera.to_screen(fe.x, fe.y + fe.height * 0.5) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("=◆="))?;
        }
    }
    Ok(())
}

fn draw_projectile<W: Write>(out: &mut W, p: &Projectile, camera: &Camera) -> std::io::Result<()> {
    let Some((col, row)) = camera.to_screen(p.x, p.y) else {
        return Ok(());
    };
    let (glyph, colour) = match (p.from_enemy, p.kind) {
        (true, _) => ("•", C_BULLET_ENEMY),
        (false, WeaponKind::MachineGun) => ("·", C_BULLET_MG),
        (false, WeaponKind::Cannon) => ("●", C_BULLET_CANNON),
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(colour))?;
    out.queue(Print(glyph))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn meter(ratio: f32, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn draw_hud<W: Write>(out: &mut W, state: &GameState, cols: u16) -> std::io::Result<()> {
    let h = hud(state);

    // Health, left
    let hp_ratio = if h.max_hp > 0 {
        h.hp as f32 / h.max_hp as f32
    } else {
        0.0
    };
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HP))?;
    out.queue(Print(format!("HP {} {:>3}", meter(hp_ratio, 10), h.hp)))?;

    // Weapon, centre
    let weapon = match h.weapon {
        WeaponKind::MachineGun if h.reload_ratio > 0.0 => {
            format!("[ MG  reload {} ]", meter(h.reload_ratio, 6))
        }
        WeaponKind::MachineGun => "[ MG ]".to_string(),
        WeaponKind::Cannon => format!("[ CANNON {} ]", meter(h.charge_ratio, 6)),
    };
    let wx = (cols / 2).saturating_sub(weapon.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(wx, 0))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(&weapon))?;

    // Score, round and enemy counts on the right
    let right = format!(
        "Round {}  Enemies {}+{}  Score {:>7}",
        h.round, h.ground_alive, h.flying_alive, h.score
    );
    let rx = cols.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(&right))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "A D : Move   W : Jump   ↑ ↓ : Aim   SPACE : Fire   R : Weapon   Q : Quit",
    ))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
    ];
    let score_line = format!("Score {:>7}   Round {}", state.score, state.round);
    let hint = "R - Play Again  Q - Quit";

    let cx = cols / 2;
    let total_rows = lines.len() + 2;
    let start_row = (rows / 2).saturating_sub(total_rows as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    let score_row = start_row + lines.len() as u16;
    let col = cx.saturating_sub(score_line.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, score_row))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(&score_line))?;

    let col = cx.saturating_sub(hint.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, score_row + 1))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(hint))?;

    Ok(())
}
