use super::*;

#[derive(Clone)]
pub(super) struct Game {
    rules: Rules,
    mode: GameMode,
    score: u32,
    lives: u8,
    ship: Ship,
    bullet: Bullet,
    asteroids: [Asteroid; ASTEROID_SLOTS_MAX],
    round_step: u32,
    frame_count: u32,
    rng: SeededRng,
}

impl Game {
    pub(super) fn new(seed: u32, rules: Rules) -> Self {
        let mut game = Self {
            rules,
            mode: GameMode::Menu(MenuKind::Start),
            score: 0,
            lives: rules.starting_lives,
            ship: Ship {
                x: rules.ship_x,
                y: rules.ship_y,
            },
            bullet: Bullet {
                active: false,
                x: 0,
                y: 0,
            },
            asteroids: [EMPTY_ASTEROID; ASTEROID_SLOTS_MAX],
            round_step: 0,
            frame_count: 0,
            rng: SeededRng::new(seed),
        };

        game.start_round();
        game
    }

    pub(super) fn step(&mut self, input_byte: u8) -> StepEvents {
        self.step_decoded(decode_input_byte(input_byte))
    }

    pub(super) fn step_decoded(&mut self, input: FrameInput) -> StepEvents {
        self.frame_count = self.frame_count.saturating_add(1);
        let mut events = StepEvents::default();

        match self.mode {
            GameMode::Menu(menu) => self.step_menu(menu, input, &mut events),
            GameMode::Playing => self.step_playing(input, &mut events),
        }

        events
    }

    pub(super) fn result(&self) -> ReplayResult {
        ReplayResult {
            final_score: self.score,
            final_rng_state: self.rng.state(),
            frame_count: self.frame_count,
        }
    }

    pub(super) fn checkpoint(&self) -> ReplayCheckpoint {
        ReplayCheckpoint {
            frame_count: self.frame_count,
            rng_state: self.rng.state(),
            score: self.score,
            lives: self.lives,
            mode: self.mode,
            round_step: self.round_step,
            ship_x: self.ship.x,
            bullet_active: self.bullet.active,
            bullet_x: self.bullet.x,
            bullet_y: self.bullet.y,
            active_asteroids: self.slots().iter().filter(|a| a.active).count(),
        }
    }

    pub(super) fn world_snapshot(&self) -> WorldSnapshot {
        let asteroids = self
            .slots()
            .iter()
            .enumerate()
            .map(|(slot, asteroid)| AsteroidSnapshot {
                slot,
                active: asteroid.active,
                x: asteroid.x,
                y: asteroid.y,
                phase: asteroid.phase,
                exploding: asteroid.exploding,
                hitbox: self.rules.hitbox(asteroid.x, asteroid.y, asteroid.phase),
            })
            .collect();

        WorldSnapshot {
            frame_count: self.frame_count,
            mode: self.mode,
            score: self.score,
            lives: self.lives,
            round_step: self.round_step,
            rng_state: self.rng.state(),
            ship: ShipSnapshot {
                x: self.ship.x,
                y: self.ship.y,
            },
            bullet: BulletSnapshot {
                active: self.bullet.active,
                x: self.bullet.x,
                y: self.bullet.y,
            },
            asteroids,
        }
    }

    pub(super) fn transition_state(&self) -> TransitionState {
        TransitionState {
            mode: self.mode,
            score: self.score,
            ship_x: self.ship.x,
            round_step: self.round_step,
        }
    }

    pub(super) fn validate_invariants(&self) -> Result<(), RuleCode> {
        let rules = &self.rules;

        if self.lives > rules.starting_lives {
            return Err(RuleCode::LivesRange);
        }
        match self.mode {
            GameMode::Playing | GameMode::Menu(MenuKind::Paused) if self.lives == 0 => {
                return Err(RuleCode::ModeLivesConsistency);
            }
            GameMode::Menu(MenuKind::GameOver) if self.lives != 0 => {
                return Err(RuleCode::ModeLivesConsistency);
            }
            _ => {}
        }

        let (band_lo, band_hi) = rules.ship_x_band();
        if self.ship.x < band_lo || self.ship.x > band_hi || self.ship.y != rules.ship_y {
            return Err(RuleCode::ShipBounds);
        }

        if self.bullet.active {
            let x_lo = band_lo + rules.bullet_offset.0;
            let x_hi = band_hi + rules.bullet_offset.0;
            let y_lo = rules.bullet_ceiling - rules.bullet_speed + 1;
            let y_hi = rules.ship_y + rules.bullet_offset.1;
            if self.bullet.x < x_lo
                || self.bullet.x > x_hi
                || self.bullet.y < y_lo
                || self.bullet.y > y_hi
            {
                return Err(RuleCode::BulletState);
            }
        }

        let (spawn_lo, spawn_hi) = rules.spawn_x;
        let x_hi = spawn_hi - 1 + rules.shrink_shift * 3;
        for asteroid in self.slots().iter().filter(|a| a.active) {
            if asteroid.x < spawn_lo
                || asteroid.x > x_hi
                || asteroid.y < rules.spawn_y
                || asteroid.y > rules.height
            {
                return Err(RuleCode::AsteroidState);
            }
        }
        if self.asteroids[rules.asteroid_slots..]
            .iter()
            .any(|asteroid| asteroid.active)
        {
            return Err(RuleCode::AsteroidState);
        }

        Ok(())
    }

    #[inline]
    pub(super) fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub(super) fn mode(&self) -> GameMode {
        self.mode
    }

    #[inline]
    pub(super) fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub(super) fn lives(&self) -> u8 {
        self.lives
    }

    #[inline]
    pub(super) fn frame_count(&self) -> u32 {
        self.frame_count
    }

    #[inline]
    pub(super) fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    #[inline]
    fn slots(&self) -> &[Asteroid] {
        &self.asteroids[..self.rules.asteroid_slots]
    }

    fn set_mode(&mut self, mode: GameMode, events: &mut StepEvents) {
        if self.mode != mode {
            self.mode = mode;
            events.mode_change = Some(mode);
        }
    }

    fn start_round(&mut self) {
        self.score = 0;
        self.lives = self.rules.starting_lives;
        self.round_step = 0;
        self.ship = Ship {
            x: self.rules.ship_x,
            y: self.rules.ship_y,
        };
        self.bullet.active = false;
        self.asteroids = [EMPTY_ASTEROID; ASTEROID_SLOTS_MAX];
    }

    fn step_menu(&mut self, menu: MenuKind, input: FrameInput, events: &mut StepEvents) {
        if !input.confirm {
            return;
        }

        // Paused resumes the round as it was; every other menu starts over.
        if menu != MenuKind::Paused {
            self.start_round();
            events.new_round = true;
        }
        self.set_mode(GameMode::Playing, events);
    }

    /// Pause and restart only take effect once the frame has run in full.
    fn step_playing(&mut self, input: FrameInput, events: &mut StepEvents) {
        self.update_ship(input, events);
        self.update_bullet();

        if self.round_step % self.rules.spawn_every == 0 {
            events.spawned = self.spawn_asteroid();
        }
        self.round_step = self.round_step.wrapping_add(1);
        if self.round_step % self.rules.move_every == 0 {
            self.update_asteroids(events);
        }

        self.handle_collision(events);

        if self.lives == 0 {
            self.set_mode(GameMode::Menu(MenuKind::GameOver), events);
        } else if input.restart {
            self.set_mode(GameMode::Menu(MenuKind::Restart), events);
        } else if input.pause {
            self.set_mode(GameMode::Menu(MenuKind::Paused), events);
        }
    }

    fn update_ship(&mut self, input: FrameInput, events: &mut StepEvents) {
        let rules = &self.rules;

        if input.left && self.ship.x > rules.ship_left_guard {
            self.ship.x -= rules.ship_step;
        }
        if input.right && self.ship.x < rules.ship_right_guard {
            self.ship.x += rules.ship_step;
        }

        if input.fire && !self.bullet.active {
            let (x, y) = rules.bullet_spawn(self.ship.x);
            self.bullet = Bullet { active: true, x, y };
            events.fired = true;
        }
    }

    fn update_bullet(&mut self) {
        if !self.bullet.active {
            return;
        }

        if self.bullet.y > self.rules.bullet_ceiling {
            self.bullet.y -= self.rules.bullet_speed;
        } else {
            self.bullet.active = false;
        }
    }

    /// Fills the first free slot. A full field skips the spawn without
    /// drawing from the rng.
    fn spawn_asteroid(&mut self) -> Option<usize> {
        let slots = self.rules.asteroid_slots;
        let slot = self.asteroids[..slots].iter().position(|a| !a.active)?;
        let (lo, hi) = self.rules.spawn_x;

        self.asteroids[slot] = Asteroid {
            active: true,
            x: self.rng.next_range(lo, hi),
            y: self.rules.spawn_y,
            phase: Phase::Large,
            exploding: false,
        };

        Some(slot)
    }

    fn update_asteroids(&mut self, events: &mut StepEvents) {
        let rules = self.rules;
        let ship_x = self.ship.x;

        for asteroid in self.asteroids[..rules.asteroid_slots].iter_mut() {
            if !asteroid.active {
                continue;
            }

            let before = (asteroid.x, asteroid.y, asteroid.phase);
            asteroid.y += rules.fall_step;

            if asteroid.exploding {
                asteroid.exploding = false;
                match asteroid.phase.shrink() {
                    Some(next) => {
                        asteroid.phase = next;
                        asteroid.x += rules.shrink_shift;
                    }
                    None => {
                        asteroid.active = false;
                        events.destroyed += 1;
                        continue;
                    }
                }
            }

            let after = (asteroid.x, asteroid.y, asteroid.phase);
            if rules.reached_ground(before, after, ship_x) {
                asteroid.active = false;
                self.lives = self.lives.saturating_sub(1);
                events.lives_lost += 1;
            }
        }
    }

    /// The bullet's leading row is tested against every live hitbox; when
    /// several overlap it, the one whose centre is closest takes the hit.
    fn handle_collision(&mut self, events: &mut StepEvents) {
        let bullet = self.bullet;
        if !bullet.active || bullet.y <= self.rules.bullet_min_hit_y {
            return;
        }

        let mut nearest: Option<(usize, i64)> = None;
        for (slot, asteroid) in self.slots().iter().enumerate() {
            if !asteroid.active {
                continue;
            }

            let hitbox = self.rules.hitbox(asteroid.x, asteroid.y, asteroid.phase);
            let touched =
                (0..self.rules.bullet_width).any(|dx| hitbox.contains(bullet.x + dx, bullet.y));
            if !touched {
                continue;
            }

            let (cx, cy) = hitbox.centre();
            let dx = (cx - bullet.x) as i64;
            let dy = (cy - bullet.y) as i64;
            let distance = dx * dx + dy * dy;
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((slot, distance));
            }
        }

        if let Some((slot, _)) = nearest {
            self.bullet.active = false;
            self.asteroids[slot].exploding = true;
            self.score = self.score.saturating_add(1);
            events.hit = Some(slot);
        }
    }
}
