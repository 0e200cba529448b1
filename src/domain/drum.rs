// Drum bounce simulation for the in-use animation
use rand::Rng;
use serde::Serialize;

/// Radius of the drum disk the marker is confined to.
pub const DRUM_RADIUS: f64 = 28.0;

/// Drum center in card-local coordinates (the door center of the washer art).
pub const DRUM_CENTER: Vec2 = Vec2 { x: 70.0, y: 100.0 };

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, k: f64) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }
}

/// Marker state inside the drum. Advanced by [`DrumState::step`] once per
/// frame; deterministic given the initial conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrumState {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl DrumState {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// Random start: a point inside the inner half of the drum, moving in a
    /// random direction at 0.8-1.0 units per tick.
    pub fn spawn<R: Rng>(rng: &mut R) -> Self {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let dist = rng.gen_range(0.0..DRUM_RADIUS * 0.5);
        let position = DRUM_CENTER.add(Vec2::new(angle.cos(), angle.sin()).scale(dist));

        let heading = rng.gen_range(0.0..std::f64::consts::TAU);
        let speed = rng.gen_range(0.8..=1.0);
        let velocity = Vec2::new(heading.cos(), heading.sin()).scale(speed);

        Self { position, velocity }
    }

    /// One tick: move by the velocity; on hitting the boundary, reflect the
    /// velocity about the outward normal and clamp the position just inside.
    pub fn step(self) -> Self {
        let next = self.position.add(self.velocity);
        let offset = next.sub(DRUM_CENTER);
        let dist = offset.length();

        if dist < DRUM_RADIUS {
            return Self::new(next, self.velocity);
        }

        // dist >= R > 0, so the normal is well defined.
        let normal = offset.scale(1.0 / dist);
        let reflected = self.velocity.sub(normal.scale(2.0 * self.velocity.dot(normal)));
        let clamped = DRUM_CENTER.add(normal.scale(DRUM_RADIUS - 1.0));

        Self::new(clamped, reflected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_free_flight_is_plain_translation() {
        let state = DrumState::new(DRUM_CENTER, Vec2::new(0.9, -0.3));
        let next = state.step();
        assert_eq!(next.position, Vec2::new(70.9, 99.7));
        assert_eq!(next.velocity, state.velocity);
    }

    #[test]
    fn test_reflection_preserves_speed() {
        // Start just inside the boundary heading straight out.
        let position = DRUM_CENTER.add(Vec2::new(DRUM_RADIUS - 0.5, 0.0));
        let state = DrumState::new(position, Vec2::new(0.95, 0.31));
        let next = state.step();
        assert!((next.velocity.length() - state.velocity.length()).abs() < 1e-9);
        // Outward component flips sign.
        assert!(next.velocity.x < 0.0);
    }

    #[test]
    fn test_head_on_bounce_reverses_velocity() {
        let position = DRUM_CENTER.add(Vec2::new(DRUM_RADIUS - 0.5, 0.0));
        let state = DrumState::new(position, Vec2::new(1.0, 0.0));
        let next = state.step();
        assert!((next.velocity.x + 1.0).abs() < 1e-9);
        assert!(next.velocity.y.abs() < 1e-9);
        let dist = next.position.sub(DRUM_CENTER).length();
        assert!((dist - (DRUM_RADIUS - 1.0)).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_marker_stays_inside_drum(
            start_angle in 0.0..std::f64::consts::TAU,
            start_dist in 0.0..DRUM_RADIUS,
            heading in 0.0..std::f64::consts::TAU,
            speed in 0.8f64..=1.0,
        ) {
            let position = DRUM_CENTER.add(
                Vec2::new(start_angle.cos(), start_angle.sin()).scale(start_dist),
            );
            let velocity = Vec2::new(heading.cos(), heading.sin()).scale(speed);
            let mut state = DrumState::new(position, velocity);

            for _ in 0..10_000 {
                state = state.step();
                let dist = state.position.sub(DRUM_CENTER).length();
                prop_assert!(dist <= DRUM_RADIUS + 1e-9);
            }
        }

        #[test]
        fn prop_speed_is_conserved(
            heading in 0.0..std::f64::consts::TAU,
            speed in 0.8f64..=1.0,
        ) {
            let velocity = Vec2::new(heading.cos(), heading.sin()).scale(speed);
            let mut state = DrumState::new(DRUM_CENTER, velocity);
            for _ in 0..1_000 {
                state = state.step();
                prop_assert!((state.velocity.length() - speed).abs() < 1e-6);
            }
        }
    }
}
