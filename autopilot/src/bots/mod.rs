use asteroids_core::rules::Hitbox;
use asteroids_core::sim::AsteroidSnapshot;
use asteroids_core::{FrameInput, GameMode, MenuKind, Rules, WorldSnapshot};

mod roster;

pub use roster::{bot_ids, create_bot, describe_bots};

pub trait AutopilotBot: Send {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    fn next_input(&mut self, world: &WorldSnapshot, rules: &Rules) -> FrameInput;
}

const CONFIRM: FrameInput = FrameInput {
    left: false,
    right: false,
    fire: false,
    pause: false,
    restart: false,
    confirm: true,
};

/// Shared menu handling: every menu but game over is dismissed straight
/// away. Returns `None` while a round is in play.
pub(crate) fn menu_input(world: &WorldSnapshot) -> Option<FrameInput> {
    match world.mode {
        GameMode::Playing => None,
        GameMode::Menu(MenuKind::GameOver) => Some(FrameInput::NONE),
        GameMode::Menu(_) => Some(CONFIRM),
    }
}

/// Leftmost column of the bullet a shot fired now would produce.
pub(crate) fn bullet_column(world: &WorldSnapshot, rules: &Rules) -> i32 {
    rules.bullet_spawn(world.ship.x).0
}

/// Columns where a rising bullet is sure to meet the hitbox. Discs are
/// narrowed so the chord stays taller than one bullet step.
pub(crate) fn firing_span(hitbox: &Hitbox) -> (i32, i32) {
    match *hitbox {
        Hitbox::Rect { x0, x1, .. } => (x0, x1),
        Hitbox::Disc { cx, r, .. } => (cx - r / 2, cx + r / 2),
    }
}

pub(crate) fn in_line(column: i32, rules: &Rules, asteroid: &AsteroidSnapshot) -> bool {
    let (lo, hi) = firing_span(&asteroid.hitbox);
    (column..column + rules.bullet_width).any(|x| x >= lo && x <= hi)
}

pub(crate) fn steer_towards(
    world: &WorldSnapshot,
    rules: &Rules,
    target_column: i32,
) -> FrameInput {
    let column = bullet_column(world, rules);
    let slack = rules.ship_step / 2;
    FrameInput {
        left: column - slack > target_column && world.ship.x > rules.ship_left_guard,
        right: column + slack < target_column && world.ship.x < rules.ship_right_guard,
        ..FrameInput::NONE
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use asteroids_core::sim::AsteroidSnapshot;
    use asteroids_core::{GameMode, LiveGame, Phase, Rules, WorldSnapshot};

    pub fn playing_world(rules: &Rules) -> WorldSnapshot {
        let mut world = LiveGame::new(1, *rules).snapshot();
        world.mode = GameMode::Playing;
        world
    }

    pub fn place(world: &mut WorldSnapshot, rules: &Rules, slot: usize, x: i32, y: i32) {
        world.asteroids[slot] = AsteroidSnapshot {
            slot,
            active: true,
            x,
            y,
            phase: Phase::Large,
            exploding: false,
            hitbox: rules.hitbox(x, y, Phase::Large),
        };
    }
}
