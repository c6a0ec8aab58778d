//! Small playable scene.
//!
//! - WASD moves the player (pass an image path to use it as the player sprite)
//! - arrow keys pan the view
//! - left click a coin to collect it, right click to drop a new one
//! - Escape quits

use std::path::PathBuf;

use reworld_engine::coords::{Rgb, Vec2};
use reworld_engine::device::GpuInit;
use reworld_engine::input::{Action, Key, MouseButton};
use reworld_engine::logging::{init_logging, LoggingConfig};
use reworld_engine::window::Runtime;
use reworld_engine::{AppControl, Behavior, EngineConfig, Game, Stage, TextureHandle, Thing, ThingDesc};

const TILE: u32 = 16;
const SPRITE: f32 = 48.0;
const GROUND_Y: f32 = 456.0;
const PAN_SPEED: f32 = 4.0;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let player_image = std::env::args_os().nth(1).map(PathBuf::from);
    let config = EngineConfig::default().with_background(Rgb::from_u8(30, 32, 48));

    Runtime::run(config, GpuInit::default(), Demo::new(player_image))
}

struct Demo {
    player_image: Option<PathBuf>,
    coin: TextureHandle,
}

impl Demo {
    fn new(player_image: Option<PathBuf>) -> Self {
        Self {
            player_image,
            coin: TextureHandle::default(),
        }
    }

    fn drop_coin(&self, stage: &mut Stage, at: Vec2) -> reworld_engine::Result<()> {
        let half = SPRITE / 4.0;
        let desc = ThingDesc::new(at.x - half, at.y - half, half * 2.0, half * 2.0).with_texture(self.coin);
        let id = stage.spawn(desc, Coin { spin: 0.05 })?;
        stage.update_thing(id, |t| t.origin = Vec2::new(half, half))
    }
}

impl Game for Demo {
    fn create(&mut self, stage: &mut Stage) -> reworld_engine::Result<()> {
        let sheet = stage.load_texture("sheet", |s| {
            s.create_texture_with_pixels(TILE * 2, TILE * 2, &sheet_pixels())
        })?;
        let tiles = sheet.split(2, 2)?;
        self.coin = tiles[1];

        let columns = (stage.viewport().width / SPRITE).ceil() as u32 + 4;
        for col in 0..columns {
            for row in 0..3 {
                let (x, y) = (col as f32 * SPRITE - 2.0 * SPRITE, GROUND_Y + row as f32 * SPRITE);
                let texture = if row == 0 { tiles[2] } else { tiles[3] };
                stage.spawn_static(ThingDesc::new(x, y, SPRITE, SPRITE).with_texture(texture))?;
            }
        }

        for i in 0..5 {
            self.drop_coin(stage, Vec2::new(160.0 + i as f32 * 110.0, 300.0))?;
        }

        let player = match &self.player_image {
            Some(path) => stage.load_texture_file(path)?,
            None => tiles[0],
        };
        stage.spawn(
            ThingDesc::new(80.0, GROUND_Y - SPRITE, SPRITE, SPRITE).with_texture(player),
            Player::new(player),
        )?;

        Ok(())
    }

    fn update(&mut self, stage: &mut Stage) -> AppControl {
        if stage.is_key_down(Key::Escape) {
            return AppControl::Exit;
        }

        let mut pan = Vec2::ZERO;
        if stage.is_key_down(Key::ArrowLeft) {
            pan.x += PAN_SPEED;
        }
        if stage.is_key_down(Key::ArrowRight) {
            pan.x -= PAN_SPEED;
        }
        if stage.is_key_down(Key::ArrowUp) {
            pan.y += PAN_SPEED;
        }
        if stage.is_key_down(Key::ArrowDown) {
            pan.y -= PAN_SPEED;
        }
        if pan != Vec2::ZERO {
            stage.set_view_offset(stage.view_offset() + pan);
        }

        AppControl::Continue
    }

    fn click(&mut self, stage: &mut Stage, button: MouseButton, action: Action) {
        if button != MouseButton::Right || action != Action::Pressed {
            return;
        }
        let at = stage.cursor_position();
        if let Err(err) = self.drop_coin(stage, at) {
            log::warn!("no coin dropped: {err}");
        }
    }
}

struct Player {
    texture: TextureHandle,
    facing_left: bool,
}

impl Player {
    const SPEED: f32 = 3.0;

    fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            facing_left: false,
        }
    }
}

impl Behavior for Player {
    fn update(&mut self, thing: &mut Thing, stage: &mut Stage) {
        let axis = |neg: Key, pos: Key| {
            (stage.is_key_down(pos) as i32 - stage.is_key_down(neg) as i32) as f32
        };
        let step = Vec2::new(axis(Key::A, Key::D), axis(Key::W, Key::S));
        if step == Vec2::ZERO {
            return;
        }

        if step.x != 0.0 {
            self.facing_left = step.x < 0.0;
        }
        thing.position += Vec2::new(step.x * Self::SPEED, step.y * Self::SPEED);
        thing.texture = if self.facing_left {
            self.texture.flip_horizontally()
        } else {
            self.texture
        };
        thing.save(stage);
    }
}

struct Coin {
    spin: f32,
}

impl Behavior for Coin {
    fn update(&mut self, thing: &mut Thing, stage: &mut Stage) {
        thing.rotation += self.spin;
        thing.save(stage);
    }

    fn click(&mut self, thing: &mut Thing, stage: &mut Stage, button: MouseButton, action: Action) {
        if button != MouseButton::Left || action != Action::Pressed {
            return;
        }
        if thing.contains(stage.cursor_position()) {
            if let Err(err) = stage.remove(thing.id()) {
                log::warn!("coin already gone: {err}");
            }
        }
    }
}

/// 2×2 sheet of 16px tiles: player, coin, grass, dirt.
fn sheet_pixels() -> Vec<u8> {
    let size = TILE * 2;
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let (tx, ty) = (x % TILE, y % TILE);
            let rgba = match (x / TILE, y / TILE) {
                (0, 0) => player_texel(tx, ty),
                (1, 0) => coin_texel(tx, ty),
                (0, 1) => grass_texel(tx, ty),
                _ => dirt_texel(tx, ty),
            };
            pixels.extend_from_slice(&rgba);
        }
    }
    pixels
}

fn player_texel(x: u32, y: u32) -> [u8; 4] {
    // Eye on the right so horizontal flips are visible.
    match (x, y) {
        (10..=11, 4..=5) => [20, 20, 20, 255],
        (3..=12, 2..=13) => [230, 120, 40, 255],
        _ => [0, 0, 0, 0],
    }
}

fn coin_texel(x: u32, y: u32) -> [u8; 4] {
    let (dx, dy) = (x as i32 * 2 - 15, y as i32 * 2 - 15);
    match dx * dx + dy * dy {
        d if d <= 100 => [250, 210, 60, 255],
        d if d <= 196 => [200, 150, 30, 255],
        _ => [0, 0, 0, 0],
    }
}

fn grass_texel(x: u32, y: u32) -> [u8; 4] {
    if y < 4 || (y < 6 && x % 3 == 0) {
        [70, 170, 70, 255]
    } else {
        dirt_texel(x, y)
    }
}

fn dirt_texel(x: u32, y: u32) -> [u8; 4] {
    if (x * 7 + y * 13) % 11 == 0 {
        [90, 60, 35, 255]
    } else {
        [120, 84, 50, 255]
    }
}
