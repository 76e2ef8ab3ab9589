use super::*;

struct BotEntry {
    id: &'static str,
    description: &'static str,
    build: fn() -> Box<dyn AutopilotBot>,
}

const ROSTER: &[BotEntry] = &[
    BotEntry {
        id: "idle",
        description: "Starts the round and never touches the controls.",
        build: || Box::new(IdleBot),
    },
    BotEntry {
        id: "sweeper",
        description: "Sweeps wall to wall with the trigger held.",
        build: || Box::new(SweeperBot::default()),
    },
    BotEntry {
        id: "tracker",
        description: "Lines up under the lowest live asteroid and fires when in line.",
        build: || Box::new(TrackerBot),
    },
];

pub fn bot_ids() -> Vec<&'static str> {
    ROSTER.iter().map(|entry| entry.id).collect()
}

pub fn describe_bots() -> Vec<(&'static str, &'static str)> {
    ROSTER
        .iter()
        .map(|entry| (entry.id, entry.description))
        .collect()
}

pub fn create_bot(id: &str) -> Option<Box<dyn AutopilotBot>> {
    ROSTER
        .iter()
        .find(|entry| entry.id == id)
        .map(|entry| (entry.build)())
}

fn description_of(id: &str) -> &'static str {
    ROSTER
        .iter()
        .find(|entry| entry.id == id)
        .map_or("", |entry| entry.description)
}

struct IdleBot;

impl AutopilotBot for IdleBot {
    fn id(&self) -> &'static str {
        "idle"
    }

    fn description(&self) -> &'static str {
        description_of(self.id())
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, world: &WorldSnapshot, _rules: &Rules) -> FrameInput {
        menu_input(world).unwrap_or(FrameInput::NONE)
    }
}

#[derive(Default)]
struct SweeperBot {
    heading_left: bool,
}

impl AutopilotBot for SweeperBot {
    fn id(&self) -> &'static str {
        "sweeper"
    }

    fn description(&self) -> &'static str {
        description_of(self.id())
    }

    fn reset(&mut self, seed: u32) {
        self.heading_left = seed & 1 == 1;
    }

    fn next_input(&mut self, world: &WorldSnapshot, rules: &Rules) -> FrameInput {
        if let Some(input) = menu_input(world) {
            return input;
        }

        if world.ship.x <= rules.ship_left_guard {
            self.heading_left = false;
        } else if world.ship.x >= rules.ship_right_guard {
            self.heading_left = true;
        }

        FrameInput {
            left: self.heading_left,
            right: !self.heading_left,
            fire: true,
            ..FrameInput::NONE
        }
    }
}

struct TrackerBot;

impl TrackerBot {
    /// The live asteroid whose hitbox reaches lowest, preferring ones not
    /// already breaking up. Ties go to the lower slot.
    fn target<'a>(world: &'a WorldSnapshot) -> Option<&'a AsteroidSnapshot> {
        world.active_asteroids().fold(None, |best, asteroid| match best {
            None => Some(asteroid),
            Some(current) => {
                let key = (!asteroid.exploding, asteroid.hitbox.bottom());
                let best_key = (!current.exploding, current.hitbox.bottom());
                if key > best_key {
                    Some(asteroid)
                } else {
                    Some(current)
                }
            }
        })
    }
}

impl AutopilotBot for TrackerBot {
    fn id(&self) -> &'static str {
        "tracker"
    }

    fn description(&self) -> &'static str {
        description_of(self.id())
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, world: &WorldSnapshot, rules: &Rules) -> FrameInput {
        if let Some(input) = menu_input(world) {
            return input;
        }

        let column = bullet_column(world, rules);
        let fire = !world.bullet.active
            && world
                .active_asteroids()
                .any(|asteroid| in_line(column, rules, asteroid));

        let target_column = match Self::target(world) {
            Some(asteroid) => {
                let (lo, hi) = firing_span(&asteroid.hitbox);
                (lo + hi) / 2 - (rules.bullet_width - 1) / 2
            }
            None => rules.bullet_spawn(rules.ship_x).0,
        };

        FrameInput {
            fire,
            ..steer_towards(world, rules, target_column)
        }
    }
}
