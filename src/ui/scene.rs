/// Scene composition: everything the player sees, drawn through a
/// `DrawContext` in canvas pixels.
///
/// Draw order for a playing frame:
///   1. Terrain (two wrap rows above the board, then the board)
///   2. Footer HUD
///   3. Instructions strip
///   4. Enemies, gems, key, player
///   5. "Loading Next Level" while the terrain scrolls

use crate::config::GridConfig;
use crate::domain::entity::{Entity, Player};
use crate::domain::tile::Sprite;
use crate::sim::clock::format_play_time;
use crate::sim::world::WorldState;
use super::canvas::{DrawContext, TextAlign};
use super::resources::ResourceProvider;

const ORANGE: &str = "#F67841";
const BROWN: &str = "#67200A";

/// Sprites are drawn this far above their row's top edge.
const SPRITE_LIFT: f32 = 25.0;
/// Extra width and height for a player who is down.
const DEAD_GROW: f32 = 20.0;

/// Per-frame values that do not live in the world.
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneView {
    /// Milliseconds played, shown in the footer.
    pub play_ms: u64,
    /// Wall-clock milliseconds, drives the loading text blink.
    pub blink_ms: u64,
    /// The key was taken this frame; the player is not drawn.
    pub hide_player: bool,
}

// ══════════════════════════════════════════════════════════════
// Entities
// ══════════════════════════════════════════════════════════════

pub fn draw_entity(
    ctx: &mut dyn DrawContext,
    res: &dyn ResourceProvider,
    grid: &GridConfig,
    e: &Entity,
) {
    if !e.visible { return; }
    let img = res.get(e.sprite.asset_id());
    ctx.draw_image(img, e.x * grid.offset_x, e.y * grid.offset_y - SPRITE_LIFT);
}

/// The player follows the terrain scroll and is drawn enlarged while down.
pub fn draw_player(
    ctx: &mut dyn DrawContext,
    res: &dyn ResourceProvider,
    grid: &GridConfig,
    player: &Player,
    row: f32,
    scroll: f32,
) {
    let img = res.get(Sprite::CharBoy.asset_id());
    let grow = if player.is_dead() { DEAD_GROW } else { 0.0 };
    ctx.draw_image_scaled(
        img,
        player.body.x * grid.offset_x - grow / 2.0,
        scroll + row * grid.offset_y - SPRITE_LIFT,
        img.width + grow,
        img.height + grow,
    );
}

fn draw_entities(
    ctx: &mut dyn DrawContext,
    res: &dyn ResourceProvider,
    world: &WorldState,
    hide_player: bool,
) {
    let grid = &world.grid;
    for enemy in &world.enemies {
        draw_entity(ctx, res, grid, &enemy.body);
    }
    for gem in &world.gems {
        draw_entity(ctx, res, grid, gem);
    }
    draw_entity(ctx, res, grid, &world.key);
    if !hide_player {
        let row = world.player_draw_row();
        draw_player(ctx, res, grid, &world.player, row, world.level.scroll_offset);
    }
}

// ══════════════════════════════════════════════════════════════
// Terrain
// ══════════════════════════════════════════════════════════════

fn draw_terrain(ctx: &mut dyn DrawContext, res: &dyn ResourceProvider, world: &WorldState) {
    let grid = &world.grid;
    let rows = &world.level.row_terrain;
    let scroll = world.level.scroll_offset;
    let n = rows.len();

    // The bottom rows repeat above the board so the scroll looks endless.
    if n >= 2 {
        let above = [
            (rows[n - 2], scroll - 2.0 * grid.offset_y),
            (rows[n - 1], scroll - grid.offset_y),
        ];
        for (terrain, y) in above {
            let img = res.get(terrain.block_asset());
            for col in 0..grid.num_cols {
                ctx.draw_image(img, col as f32 * grid.tile_width, y);
            }
        }
    }

    for (r, terrain) in rows.iter().enumerate() {
        let img = res.get(terrain.block_asset());
        let y = scroll + r as f32 * grid.offset_y;
        for col in 0..grid.num_cols {
            ctx.draw_image(img, col as f32 * grid.tile_width, y);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Footer / instructions / overlays
// ══════════════════════════════════════════════════════════════

fn hud_text_style(ctx: &mut dyn DrawContext) {
    ctx.set_font("50px Georgia");
    ctx.set_fill_style(ORANGE);
    ctx.set_stroke_style(BROWN);
    ctx.set_line_width(2.0);
}

fn outlined_text(ctx: &mut dyn DrawContext, text: &str, x: f32, y: f32) {
    ctx.fill_text(text, x, y);
    ctx.stroke_text(text, x, y);
}

fn draw_footer(
    ctx: &mut dyn DrawContext,
    res: &dyn ResourceProvider,
    world: &WorldState,
    play_ms: u64,
) {
    let grid = &world.grid;
    let (w, h) = ctx.size();
    let (tw, ox) = (grid.tile_width, grid.offset_x);
    let rows = grid.num_rows as f32;
    let top = h - 231.0;

    // ── Boxes ──
    ctx.set_fill_style("white");
    ctx.set_stroke_style("green");
    ctx.set_text_align(TextAlign::Left);
    ctx.set_line_width(4.0);
    ctx.fill_rect(0.0, top, w, 130.0);
    let lw = ctx.line_width();
    ctx.stroke_rect(lw / 2.0, top, 2.0 * tw - lw, 130.0);
    ctx.stroke_rect(2.0 * tw + lw / 2.0, top, 2.0 * tw - lw, 130.0);
    ctx.stroke_rect(4.0 * tw + lw / 2.0, top, 4.0 * tw - lw, 65.0);
    ctx.stroke_rect(4.0 * tw + lw / 2.0, h - 166.0, 4.0 * tw - lw, 65.0);

    // ── Lives ──
    ctx.draw_image(res.get(Sprite::Heart.asset_id()), 0.0, (rows - 1.0) * grid.offset_y + 35.0);
    hud_text_style(ctx);
    outlined_text(ctx, &format!("x {}", world.player.lives), 111.0, rows * grid.offset_y + 50.0);

    // ── Gems ──
    ctx.draw_image(res.get(Sprite::GemBlue.asset_id()), ox * 2.0 + 6.0, (rows - 1.0) * grid.offset_y + 15.0);
    outlined_text(ctx, &format!("x {}", world.player.gems), ox * 3.0 + 10.0, rows * grid.offset_y + 50.0);

    // ── Level ──
    let level_y = rows * grid.offset_y + 30.0;
    outlined_text(ctx, "Level", ox * 4.0 + 10.0, level_y);
    ctx.set_text_align(TextAlign::Right);
    outlined_text(ctx, &world.level.current.to_string(), ox * 6.0, level_y);

    // ── Time ──
    let time_y = rows * grid.offset_y + 85.0;
    ctx.set_text_align(TextAlign::Left);
    outlined_text(ctx, "Time", ox * 4.0 + 10.0, time_y);
    ctx.set_text_align(TextAlign::Right);
    outlined_text(ctx, &format_play_time(play_ms), w - 20.0, time_y);
}

pub const INSTRUCTIONS: [&str; 3] = [
    "1) Use arrows to move.",
    "2) Collect all 3 gems to make the key appear.",
    "3) Collect the key to advance to next level.",
];

fn draw_instructions(ctx: &mut dyn DrawContext, grid: &GridConfig) {
    let (w, _) = ctx.size();
    ctx.set_fill_style(ORANGE);
    ctx.fill_rect(0.0, 6.0 * grid.tile_width + 2.0, w, grid.tile_width);
    ctx.set_fill_style("white");
    ctx.set_stroke_style(BROWN);
    ctx.set_text_align(TextAlign::Left);
    ctx.set_font("30px Georgia");
    for (i, line) in INSTRUCTIONS.iter().enumerate() {
        ctx.fill_text(line, 10.0, (6.3 + 0.3 * i as f32) * grid.tile_height);
    }
}

/// Fill and stroke colors trade places every 500 ms.
pub fn loading_colors(blink_ms: u64) -> (&'static str, &'static str) {
    if (blink_ms - blink_ms % 500) % 1000 == 0 {
        (ORANGE, BROWN)
    } else {
        (BROWN, ORANGE)
    }
}

fn draw_loading(ctx: &mut dyn DrawContext, blink_ms: u64) {
    let (w, _) = ctx.size();
    let (fill, stroke) = loading_colors(blink_ms);
    ctx.set_text_align(TextAlign::Center);
    ctx.set_font("80px Georgia");
    ctx.set_fill_style(fill);
    ctx.set_stroke_style(stroke);
    ctx.set_line_width(2.0);
    outlined_text(ctx, "Loading Next Level", w / 2.0, 120.0);
}

// ══════════════════════════════════════════════════════════════
// Frames
// ══════════════════════════════════════════════════════════════

pub fn draw_scene(
    ctx: &mut dyn DrawContext,
    res: &dyn ResourceProvider,
    world: &WorldState,
    view: &SceneView,
) {
    draw_terrain(ctx, res, world);
    draw_footer(ctx, res, world, view.play_ms);
    draw_instructions(ctx, &world.grid);
    draw_entities(ctx, res, world, view.hide_player);
    if world.is_transitioning() {
        draw_loading(ctx, view.blink_ms);
    }
}

pub fn draw_game_over(
    ctx: &mut dyn DrawContext,
    grid: &GridConfig,
    level: u32,
    gems: u32,
    play_ms: u64,
) {
    let (w, h) = ctx.size();
    ctx.set_fill_style(ORANGE);
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.set_fill_style("white");
    ctx.set_stroke_style(BROWN);
    ctx.set_text_align(TextAlign::Center);
    ctx.set_font("50px Georgia");

    let lines = [
        "Game Over".to_string(),
        format!("You reached level {}", level),
        format!("You collected {} gems", gems),
        format!("Total time {}", format_play_time(play_ms)),
        "Press any key to restart".to_string(),
    ];
    for (i, line) in lines.iter().enumerate() {
        ctx.fill_text(line, w / 2.0, (i + 1) as f32 * grid.tile_height);
    }
}
