//! One draw pass over a world snapshot, for either layout.

use alloc::format;

use super::color::Color;
use super::raster::Framebuffer;
use super::text::TextFrame;
use crate::constants::{PIXEL_BULLET_HEIGHT, SCORE_DIGITS, SCORE_DISPLAY_MODULUS};
use crate::rules::{Hitbox, Layout, Rules};
use crate::sim::{AsteroidSnapshot, GameMode, MenuKind, WorldSnapshot};

const TITLE: &str = "ASTEROIDS";
const SHIP_SPRITE: &str = "/-^-\\";
const BULLET_SPRITE: &str = "|";

const ASTEROID_SPRITES: [&[&str]; 4] = [
    &[" ######", "########", "########", " ######"],
    &[" ####", "######", " ####"],
    &["###", "###"],
    &["##"],
];

const EXPLOSION_SPRITES: [&[&str]; 4] = [
    &[" \\\\|//", "\\\\\\\\////", "////\\\\\\\\", " //|\\\\"],
    &[" \\\\//", ">>><<<", " //\\\\"],
    &["\\|/", "/|\\"],
    &["><"],
];

/// Draws `snapshot` for a terminal of `cols x rows`. The console layout
/// always yields its own fixed grid; the pixel layout is scaled to fit.
pub fn render_frame(snapshot: &WorldSnapshot, rules: &Rules, cols: usize, rows: usize) -> TextFrame {
    match rules.layout {
        Layout::Console => console_frame(snapshot, rules),
        Layout::Pixel => pixel_frame(snapshot, rules, cols, rows),
    }
}

/// The round in play stays visible behind the pause menu; the other menus
/// show on an empty screen.
fn field_visible(mode: GameMode) -> bool {
    matches!(mode, GameMode::Playing | GameMode::Menu(MenuKind::Paused))
}

pub fn console_frame(snapshot: &WorldSnapshot, rules: &Rules) -> TextFrame {
    let mut frame = TextFrame::new(rules.width as usize, rules.height as usize);

    // Ship, bullet, then asteroids: a rock overlapping the ship row covers it.
    if field_visible(snapshot.mode) {
        frame.put_str(snapshot.ship.x, snapshot.ship.y, SHIP_SPRITE, Color::White);
        if snapshot.bullet.active {
            frame.put_str(
                snapshot.bullet.x,
                snapshot.bullet.y,
                BULLET_SPRITE,
                Color::Yellow,
            );
        }
        for asteroid in snapshot.active_asteroids() {
            draw_block_asteroid(&mut frame, asteroid);
        }
        draw_hud(&mut frame, snapshot);
    }

    draw_menu(&mut frame, snapshot);
    frame
}

fn draw_block_asteroid(frame: &mut TextFrame, asteroid: &AsteroidSnapshot) {
    let (lines, color) = if asteroid.exploding {
        (EXPLOSION_SPRITES[asteroid.phase.index()], Color::Red)
    } else {
        (ASTEROID_SPRITES[asteroid.phase.index()], Color::LightGray)
    };

    for (dy, line) in lines.iter().enumerate() {
        frame.put_str(asteroid.x, asteroid.y + dy as i32, line, color);
    }
}

pub fn pixel_frame(snapshot: &WorldSnapshot, rules: &Rules, cols: usize, rows: usize) -> TextFrame {
    let mut fb = Framebuffer::new(rules.width as usize, rules.height as usize);

    if field_visible(snapshot.mode) {
        draw_pixel_field(&mut fb, snapshot, rules);
    }

    let mut frame = fb.to_half_blocks(cols, rows);
    if field_visible(snapshot.mode) {
        draw_hud(&mut frame, snapshot);
    }
    draw_menu(&mut frame, snapshot);
    frame
}

pub fn draw_pixel_field(fb: &mut Framebuffer, snapshot: &WorldSnapshot, rules: &Rules) {
    draw_pixel_ship(fb, snapshot.ship.x, snapshot.ship.y);

    if snapshot.bullet.active {
        fb.fill_rect(
            snapshot.bullet.x,
            snapshot.bullet.y,
            rules.bullet_width,
            PIXEL_BULLET_HEIGHT,
            Color::Yellow,
        );
    }

    for asteroid in snapshot.active_asteroids() {
        if let Hitbox::Disc { cx, cy, r } = asteroid.hitbox {
            let color = if asteroid.exploding {
                Color::Red
            } else {
                Color::LightGray
            };
            fb.fill_circle(cx, cy, r, color);
        }
    }
}

/// Wings, body, nose and running light, anchored at the ship's top-left.
fn draw_pixel_ship(fb: &mut Framebuffer, x: i32, y: i32) {
    fb.fill_rect(x + 20, y + 15, 30, 5, Color::DarkGray);
    fb.fill_triangle((x, y + 30), (x + 20, y + 25), (x + 30, y + 2), Color::White);
    fb.fill_triangle(
        (x + 71, y + 30),
        (x + 51, y + 25),
        (x + 41, y + 2),
        Color::White,
    );
    fb.fill_triangle(
        (x + 30, y + 15),
        (x + 36, y),
        (x + 41, y + 15),
        Color::LightRed,
    );
    fb.fill_circle(x + 35, y + 2, 2, Color::Yellow);
}

fn score_digits(score: u32) -> alloc::string::String {
    format!(
        "{:0width$}",
        score % SCORE_DISPLAY_MODULUS,
        width = SCORE_DIGITS
    )
}

fn lives_glyph(lives: u8) -> char {
    char::from(b'0' + lives.min(9))
}

fn draw_hud(frame: &mut TextFrame, snapshot: &WorldSnapshot) {
    let cols = frame.cols() as i32;
    let mut life = [0u8; 4];
    let life = lives_glyph(snapshot.lives).encode_utf8(&mut life);

    frame.put_str(0, 0, "Life:", Color::LightGreen);
    frame.put_str(5, 0, life, Color::White);
    frame.put_str(cols - 9, 0, "Score:", Color::LightCyan);
    frame.put_str(
        cols - SCORE_DIGITS as i32,
        0,
        &score_digits(snapshot.score),
        Color::White,
    );
}

fn draw_menu(frame: &mut TextFrame, snapshot: &WorldSnapshot) {
    let Some(menu) = snapshot.mode.menu() else {
        return;
    };

    let cols = frame.cols() as i32;
    let mid = frame.rows() as i32 / 2;

    if menu != MenuKind::Paused {
        frame.put_str(
            (cols - TITLE.len() as i32) / 2,
            1,
            TITLE,
            Color::DarkGray,
        );
    }

    match menu {
        MenuKind::Start => {
            frame.put_str((cols - 11) / 2, mid, "Start Game", Color::LightGray);
        }
        MenuKind::Restart | MenuKind::GameOver => {
            let score_x = (cols - 9) / 2;
            frame.put_str(score_x, mid - 1, "Score:", Color::LightCyan);
            frame.put_str(
                score_x + 6,
                mid - 1,
                &score_digits(snapshot.score),
                Color::White,
            );
            let (label, x) = if menu == MenuKind::Restart {
                ("Restart Game", (cols - 13) / 2)
            } else {
                ("Game Over", (cols - 10) / 2)
            };
            frame.put_str(x, mid, label, Color::LightGray);
        }
        MenuKind::Paused => {
            frame.put_str((cols - 14) / 2, mid, "Continue Game", Color::LightGray);
        }
    }

    frame.put_str((cols - 14) / 2, mid + 1, "Press [Enter]", Color::DarkGray);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BulletSnapshot, Phase, ShipSnapshot};
    use alloc::vec::Vec;

    fn snapshot(rules: &Rules, mode: GameMode) -> WorldSnapshot {
        WorldSnapshot {
            frame_count: 10,
            mode,
            score: 0,
            lives: rules.starting_lives,
            round_step: 5,
            rng_state: 0,
            ship: ShipSnapshot {
                x: rules.ship_x,
                y: rules.ship_y,
            },
            bullet: BulletSnapshot {
                active: false,
                x: 0,
                y: 0,
            },
            asteroids: Vec::new(),
        }
    }

    fn asteroid(rules: &Rules, x: i32, y: i32, phase: Phase, exploding: bool) -> AsteroidSnapshot {
        AsteroidSnapshot {
            slot: 0,
            active: true,
            x,
            y,
            phase,
            exploding,
            hitbox: rules.hitbox(x, y, phase),
        }
    }

    fn find_row(frame: &TextFrame, needle: &str) -> Option<(usize, usize)> {
        (0..frame.rows()).find_map(|y| frame.row_text(y).find(needle).map(|x| (x, y)))
    }

    #[test]
    fn console_playing_frame_shows_ship_and_hud() {
        let rules = Rules::console();
        let mut world = snapshot(&rules, GameMode::Playing);
        world.score = 1_234;
        world.lives = 2;

        let frame = console_frame(&world, &rules);

        assert_eq!(frame.cols(), 80);
        assert_eq!(frame.rows(), 25);
        assert_eq!(&frame.row_text(23)[37..42], "/-^-\\");
        let top = frame.row_text(0);
        assert!(top.starts_with("Life:2"));
        assert!(top.ends_with("Score:234"));
        assert_eq!(frame.get(0, 0).map(|c| c.fg), Some(Color::LightGreen));
        assert_eq!(frame.get(71, 0).map(|c| c.fg), Some(Color::LightCyan));
        assert_eq!(frame.get(77, 0).map(|c| c.fg), Some(Color::White));
    }

    #[test]
    fn console_asteroid_sprite_tracks_phase_and_explosion() {
        let rules = Rules::console();
        let mut world = snapshot(&rules, GameMode::Playing);
        world.asteroids = vec![
            asteroid(&rules, 10, 5, Phase::Large, false),
            asteroid(&rules, 40, 5, Phase::Small, true),
        ];

        let frame = console_frame(&world, &rules);

        assert_eq!(&frame.row_text(5)[10..18], " ###### ");
        assert_eq!(&frame.row_text(6)[10..18], "########");
        assert_eq!(&frame.row_text(8)[10..18], " ###### ");
        assert_eq!(frame.get(11, 5).map(|c| c.fg), Some(Color::LightGray));
        assert_eq!(&frame.row_text(5)[40..43], "\\|/");
        assert_eq!(&frame.row_text(6)[40..43], "/|\\");
        assert_eq!(frame.get(40, 5).map(|c| c.fg), Some(Color::Red));
    }

    #[test]
    fn console_bullet_is_yellow_bar() {
        let rules = Rules::console();
        let mut world = snapshot(&rules, GameMode::Playing);
        world.bullet = BulletSnapshot {
            active: true,
            x: 39,
            y: 12,
        };

        let frame = console_frame(&world, &rules);
        let cell = frame.get(39, 12).expect("cell in range");
        assert_eq!(cell.ch, '|');
        assert_eq!(cell.fg, Color::Yellow);
    }

    #[test]
    fn asteroid_on_the_ship_row_paints_over_the_ship() {
        let rules = Rules::console();
        let mut world = snapshot(&rules, GameMode::Playing);
        world.asteroids = vec![asteroid(&rules, 38, 20, Phase::Large, false)];

        let frame = console_frame(&world, &rules);

        // The sprite's leading space is opaque too.
        assert_eq!(&frame.row_text(23)[37..45], "/ ######");
        let cell = frame.get(38, 23).expect("cell in range");
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.fg, Color::LightGray);
    }

    #[test]
    fn start_menu_is_drawn_on_empty_screen() {
        let rules = Rules::console();
        let world = snapshot(&rules, GameMode::Menu(MenuKind::Start));

        let frame = console_frame(&world, &rules);

        assert_eq!(find_row(&frame, "Start Game"), Some((34, 12)));
        assert_eq!(find_row(&frame, "Press [Enter]"), Some((33, 13)));
        assert_eq!(find_row(&frame, TITLE), Some((35, 1)));
        assert_eq!(find_row(&frame, "/-^-\\"), None);
        assert_eq!(find_row(&frame, "Life:"), None);
    }

    #[test]
    fn game_over_menu_reports_score() {
        let rules = Rules::console();
        let mut world = snapshot(&rules, GameMode::Menu(MenuKind::GameOver));
        world.score = 7;
        world.lives = 0;

        let frame = console_frame(&world, &rules);

        assert_eq!(find_row(&frame, "Score:007"), Some((35, 11)));
        assert_eq!(find_row(&frame, "Game Over"), Some((35, 12)));
    }

    #[test]
    fn restart_menu_reports_score() {
        let rules = Rules::console();
        let mut world = snapshot(&rules, GameMode::Menu(MenuKind::Restart));
        world.score = 12;

        let frame = console_frame(&world, &rules);

        assert_eq!(find_row(&frame, "Score:012"), Some((35, 11)));
        assert_eq!(find_row(&frame, "Restart Game"), Some((33, 12)));
    }

    #[test]
    fn pause_menu_keeps_field_visible() {
        let rules = Rules::console();
        let world = snapshot(&rules, GameMode::Menu(MenuKind::Paused));

        let frame = console_frame(&world, &rules);

        assert_eq!(find_row(&frame, "Continue Game"), Some((33, 12)));
        assert_eq!(find_row(&frame, "/-^-\\"), Some((37, 23)));
        assert_eq!(find_row(&frame, TITLE), None);
    }

    #[test]
    fn pixel_frame_fits_requested_grid() {
        let rules = Rules::pixel();
        let mut world = snapshot(&rules, GameMode::Playing);
        world.asteroids = vec![asteroid(&rules, 300, 200, Phase::Large, false)];

        let frame = render_frame(&world, &rules, 128, 48);

        assert_eq!(frame.cols(), 128);
        assert_eq!(frame.rows(), 48);
        assert!(frame.row_text(0).starts_with("Life:3"));
        let gray = (0..48).any(|row| {
            (0..128).any(|col| {
                frame
                    .get(col, row)
                    .map(|c| c.fg == Color::LightGray || c.bg == Color::LightGray)
                    .unwrap_or(false)
            })
        });
        assert!(gray, "asteroid should survive the downsample");
    }

    #[test]
    fn pixel_ship_draws_wings_nose_and_light() {
        let rules = Rules::pixel();
        let world = snapshot(&rules, GameMode::Playing);
        let mut fb = Framebuffer::new(rules.width as usize, rules.height as usize);

        draw_pixel_field(&mut fb, &world, &rules);

        let (x, y) = (rules.ship_x as usize, rules.ship_y as usize);
        assert_eq!(fb.get(x + 3, y + 29), Color::White);
        assert_eq!(fb.get(x + 69, y + 29), Color::White);
        assert_eq!(fb.get(x + 35, y + 10), Color::LightRed);
        assert_eq!(fb.get(x + 35, y + 2), Color::Yellow);
        assert_eq!(fb.get(x + 35, y + 17), Color::DarkGray);
    }

    #[test]
    fn hud_lives_glyph_is_single_digit() {
        assert_eq!(lives_glyph(3), '3');
        assert_eq!(lives_glyph(0), '0');
        assert_eq!(lives_glyph(12), '9');
        assert_eq!(score_digits(5), "005");
        assert_eq!(score_digits(1_000), "000");
    }

    #[test]
    fn block_sprites_match_hitbox_rows() {
        let rules = Rules::console();
        for phase in Phase::ALL {
            let hitbox = rules.hitbox(0, 0, phase);
            let rows = ASTEROID_SPRITES[phase.index()].len() as i32;
            assert_eq!(rows, hitbox.bottom() + 1);
            assert_eq!(EXPLOSION_SPRITES[phase.index()].len() as i32, rows);
        }
    }
}
