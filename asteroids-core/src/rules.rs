//! Layout presets: every number the update loop needs lives here so one
//! simulation serves both the text-grid and the pixel field.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ASTEROID_SLOTS_DEFAULT, ASTEROID_SLOTS_MAX, CONSOLE_FRAME_MS, CONSOLE_HEIGHT,
    CONSOLE_SHIP_WIDTH, CONSOLE_WIDTH, PIXEL_FRAME_MS, PIXEL_GROUND_MARGIN, PIXEL_HEIGHT,
    PIXEL_SHIP_HEIGHT, PIXEL_SHIP_WIDTH, PIXEL_WIDTH, RULES_TAG_CONSOLE, RULES_TAG_PIXEL,
    STARTING_LIVES_DEFAULT, STARTING_LIVES_MAX,
};
use crate::error::VerifyError;
use crate::sim::Phase;

pub const PHASE_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Console,
    Pixel,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Pixel => "pixel",
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::Console => RULES_TAG_CONSOLE,
            Self::Pixel => RULES_TAG_PIXEL,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            RULES_TAG_CONSOLE => Some(Self::Console),
            RULES_TAG_PIXEL => Some(Self::Pixel),
            _ => None,
        }
    }
}

impl core::fmt::Display for Layout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsteroidShape {
    /// Block sprites anchored at their top-left cell. `(w, h)` per phase
    /// extends the inclusive hitbox to `[x, x + w] x [y, y + h]`.
    Blocks { extents: [(i32, i32); PHASE_COUNT] },
    /// Discs centred on the asteroid position.
    Discs { radii: [i32; PHASE_COUNT] },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundRule {
    /// The asteroid is lost once the hitbox it had before the move, where
    /// it was last drawn, reaches below `limit`.
    HitboxBottom { limit: i32 },
    /// The asteroid is lost once its centre passes `line`, or passes
    /// `ship_line` while strictly inside the ship's columns.
    CentreLine { line: i32, ship_line: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hitbox {
    Rect { x0: i32, y0: i32, x1: i32, y1: i32 },
    Disc { cx: i32, cy: i32, r: i32 },
}

impl Hitbox {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        match *self {
            Self::Rect { x0, y0, x1, y1 } => x >= x0 && x <= x1 && y >= y0 && y <= y1,
            Self::Disc { cx, cy, r } => {
                let dx = x - cx;
                let dy = y - cy;
                dx * dx + dy * dy <= r * r
            }
        }
    }

    pub fn centre(&self) -> (i32, i32) {
        match *self {
            Self::Rect { x0, y0, x1, y1 } => ((x0 + x1) / 2, (y0 + y1) / 2),
            Self::Disc { cx, cy, .. } => (cx, cy),
        }
    }

    pub fn bottom(&self) -> i32 {
        match *self {
            Self::Rect { y1, .. } => y1,
            Self::Disc { cy, r, .. } => cy + r,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rules {
    pub layout: Layout,
    pub width: i32,
    pub height: i32,
    pub starting_lives: u8,
    pub asteroid_slots: usize,
    pub frame_ms: u64,
    pub ship_x: i32,
    pub ship_y: i32,
    pub ship_width: i32,
    pub ship_step: i32,
    pub ship_left_guard: i32,
    pub ship_right_guard: i32,
    pub bullet_offset: (i32, i32),
    pub bullet_width: i32,
    pub bullet_speed: i32,
    pub bullet_ceiling: i32,
    pub bullet_min_hit_y: i32,
    pub spawn_every: u32,
    pub move_every: u32,
    pub fall_step: i32,
    pub spawn_x: (i32, i32),
    pub spawn_y: i32,
    pub shrink_shift: i32,
    pub shape: AsteroidShape,
    pub ground: GroundRule,
}

impl Rules {
    /// 80x25 character grid.
    pub fn console() -> Self {
        Self {
            layout: Layout::Console,
            width: CONSOLE_WIDTH,
            height: CONSOLE_HEIGHT,
            starting_lives: STARTING_LIVES_DEFAULT,
            asteroid_slots: ASTEROID_SLOTS_DEFAULT,
            frame_ms: CONSOLE_FRAME_MS,
            ship_x: (CONSOLE_WIDTH - CONSOLE_SHIP_WIDTH) / 2,
            ship_y: CONSOLE_HEIGHT - 2,
            ship_width: CONSOLE_SHIP_WIDTH,
            ship_step: 1,
            ship_left_guard: 1,
            ship_right_guard: CONSOLE_WIDTH - 6,
            bullet_offset: (2, 0),
            bullet_width: 1,
            bullet_speed: 1,
            bullet_ceiling: 1,
            bullet_min_hit_y: 0,
            spawn_every: 90,
            move_every: 15,
            fall_step: 1,
            spawn_x: (1, CONSOLE_WIDTH - 9),
            spawn_y: 1,
            shrink_shift: 1,
            shape: AsteroidShape::Blocks {
                extents: [(7, 3), (5, 2), (2, 1), (1, 0)],
            },
            ground: GroundRule::HitboxBottom {
                limit: CONSOLE_HEIGHT - 3,
            },
        }
    }

    /// 1024x768 pixel field.
    pub fn pixel() -> Self {
        let ship_y = PIXEL_HEIGHT - PIXEL_SHIP_HEIGHT;
        Self {
            layout: Layout::Pixel,
            width: PIXEL_WIDTH,
            height: PIXEL_HEIGHT,
            starting_lives: STARTING_LIVES_DEFAULT,
            asteroid_slots: ASTEROID_SLOTS_DEFAULT,
            frame_ms: PIXEL_FRAME_MS,
            ship_x: (PIXEL_WIDTH - PIXEL_SHIP_WIDTH) / 2,
            ship_y,
            ship_width: PIXEL_SHIP_WIDTH,
            ship_step: 5,
            ship_left_guard: 5,
            ship_right_guard: PIXEL_WIDTH - 75,
            bullet_offset: (34, 10),
            bullet_width: 3,
            bullet_speed: 20,
            bullet_ceiling: 10,
            bullet_min_hit_y: 16,
            spawn_every: 120,
            move_every: 10,
            fall_step: 10,
            spawn_x: (100, PIXEL_WIDTH - 130),
            spawn_y: 70,
            shrink_shift: 0,
            shape: AsteroidShape::Discs {
                radii: [55, 40, 25, 15],
            },
            ground: GroundRule::CentreLine {
                line: PIXEL_HEIGHT - PIXEL_GROUND_MARGIN,
                ship_line: ship_y - PIXEL_GROUND_MARGIN,
            },
        }
    }

    pub fn for_layout(layout: Layout) -> Self {
        match layout {
            Layout::Console => Self::console(),
            Layout::Pixel => Self::pixel(),
        }
    }

    /// Preset for `layout` with the two tunables that tapes carry.
    pub fn customized(
        layout: Layout,
        starting_lives: u8,
        asteroid_slots: u8,
    ) -> Result<Self, VerifyError> {
        if starting_lives == 0 || starting_lives > STARTING_LIVES_MAX {
            return Err(VerifyError::InvalidStartingLives {
                found: starting_lives,
            });
        }
        if asteroid_slots == 0 || asteroid_slots as usize > ASTEROID_SLOTS_MAX {
            return Err(VerifyError::InvalidAsteroidSlots {
                found: asteroid_slots,
            });
        }

        Ok(Self {
            starting_lives,
            asteroid_slots: asteroid_slots as usize,
            ..Self::for_layout(layout)
        })
    }

    #[inline]
    pub fn tag(&self) -> u8 {
        self.layout.tag()
    }

    pub fn hitbox(&self, x: i32, y: i32, phase: Phase) -> Hitbox {
        match self.shape {
            AsteroidShape::Blocks { extents } => {
                let (w, h) = extents[phase.index()];
                Hitbox::Rect {
                    x0: x,
                    y0: y,
                    x1: x + w,
                    y1: y + h,
                }
            }
            AsteroidShape::Discs { radii } => Hitbox::Disc {
                cx: x,
                cy: y,
                r: radii[phase.index()],
            },
        }
    }

    /// Columns the ship can reach given its guards and step size.
    pub fn ship_x_band(&self) -> (i32, i32) {
        (
            self.ship_left_guard - self.ship_step + 1,
            self.ship_right_guard + self.ship_step - 1,
        )
    }

    pub fn bullet_spawn(&self, ship_x: i32) -> (i32, i32) {
        (ship_x + self.bullet_offset.0, self.ship_y + self.bullet_offset.1)
    }

    /// Whether an asteroid that moved from `before` to `after`, each an
    /// `(x, y, phase)` triple, has reached the ground given where the ship
    /// currently stands.
    pub fn reached_ground(
        &self,
        before: (i32, i32, Phase),
        after: (i32, i32, Phase),
        ship_x: i32,
    ) -> bool {
        match self.ground {
            GroundRule::HitboxBottom { limit } => {
                let (x, y, phase) = before;
                self.hitbox(x, y, phase).bottom() > limit
            }
            GroundRule::CentreLine { line, ship_line } => {
                let (x, y, _) = after;
                let over_ship = x > ship_x && x < ship_x + self.ship_width && y > ship_line;
                over_ship || y > line
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_preset_matches_grid() {
        let rules = Rules::console();
        assert_eq!(rules.ship_x, 37);
        assert_eq!(rules.ship_y, 23);
        assert_eq!(rules.ship_x_band(), (1, 74));
        assert_eq!(rules.spawn_x, (1, 71));
        assert_eq!(rules.bullet_spawn(37), (39, 23));
    }

    #[test]
    fn pixel_preset_matches_field() {
        let rules = Rules::pixel();
        assert_eq!(rules.ship_x, 476);
        assert_eq!(rules.ship_y, 738);
        assert_eq!(rules.ship_x_band(), (1, 953));
        assert_eq!(rules.bullet_spawn(476), (510, 748));
        assert_eq!(
            rules.ground,
            GroundRule::CentreLine {
                line: 713,
                ship_line: 683
            }
        );
    }

    #[test]
    fn layout_tags_roundtrip() {
        for layout in [Layout::Console, Layout::Pixel] {
            assert_eq!(Layout::from_tag(layout.tag()), Some(layout));
        }
        assert_eq!(Layout::from_tag(0), None);
        assert_eq!(Layout::from_tag(3), None);
    }

    #[test]
    fn customized_rejects_out_of_range_overrides() {
        assert_eq!(
            Rules::customized(Layout::Console, 0, 3),
            Err(VerifyError::InvalidStartingLives { found: 0 })
        );
        assert_eq!(
            Rules::customized(Layout::Console, 10, 3),
            Err(VerifyError::InvalidStartingLives { found: 10 })
        );
        assert_eq!(
            Rules::customized(Layout::Pixel, 3, 9),
            Err(VerifyError::InvalidAsteroidSlots { found: 9 })
        );

        let rules = Rules::customized(Layout::Console, 3, 4).unwrap();
        assert_eq!(rules.starting_lives, 3);
        assert_eq!(rules.asteroid_slots, 4);
        assert_eq!(rules.ship_x, Rules::console().ship_x);
        // Timing stays with the layout preset; tapes carry only lives and slots.
        assert_eq!(rules.spawn_every, Rules::console().spawn_every);
        assert_eq!(rules.move_every, Rules::console().move_every);
    }

    #[test]
    fn block_hitbox_is_inclusive() {
        let rules = Rules::console();
        let hitbox = rules.hitbox(10, 1, Phase::Large);
        assert!(hitbox.contains(10, 1));
        assert!(hitbox.contains(17, 4));
        assert!(!hitbox.contains(18, 4));
        assert!(!hitbox.contains(17, 5));
        assert_eq!(hitbox.bottom(), 4);

        let tiny = rules.hitbox(10, 1, Phase::Tiny);
        assert!(tiny.contains(11, 1));
        assert!(!tiny.contains(11, 2));
    }

    #[test]
    fn disc_hitbox_uses_phase_radius() {
        let rules = Rules::pixel();
        let large = rules.hitbox(500, 300, Phase::Large);
        assert!(large.contains(555, 300));
        assert!(!large.contains(556, 300));
        let tiny = rules.hitbox(500, 300, Phase::Tiny);
        assert!(tiny.contains(500, 315));
        assert!(!tiny.contains(511, 311));
    }

    #[test]
    fn console_ground_uses_hitbox_bottom_before_the_move() {
        let rules = Rules::console();
        let fell = |x: i32, y: i32, phase: Phase| {
            rules.reached_ground((x, y - 1, phase), (x, y, phase), 37)
        };
        // Large spans four rows: bottom = y + 3.
        assert!(!fell(10, 20, Phase::Large));
        assert!(fell(10, 21, Phase::Large));
        assert!(!fell(10, 23, Phase::Tiny));
        assert!(fell(10, 24, Phase::Tiny));
        // A shrink during the move keeps the old, taller hitbox for the check.
        assert!(rules.reached_ground((10, 20, Phase::Large), (11, 21, Phase::Medium), 37));
    }

    #[test]
    fn pixel_ground_checks_ship_column_first() {
        let rules = Rules::pixel();
        let fell = |x: i32, y: i32| {
            rules.reached_ground((x, y - 10, Phase::Large), (x, y, Phase::Large), 476)
        };
        assert!(!fell(300, 690));
        assert!(fell(500, 690));
        assert!(fell(300, 714));
        // The ship's left edge column does not count.
        assert!(!fell(476, 690));
    }
}
