use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The antagonist. Swims towards the player at a fixed speed while active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nessie {
    /// Metres from the start line.
    distance: f64,
    /// Metres per second.
    velocity: f64,
    swimming: bool,
}

impl Nessie {
    pub fn new(velocity: f64) -> Self {
        Self {
            distance: 0.0,
            velocity: sanitize(velocity),
            swimming: false,
        }
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_swimming(&self) -> bool {
        self.swimming
    }

    pub fn is_sleeping(&self) -> bool {
        !self.swimming
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = sanitize(velocity);
    }

    pub fn start_swimming(&mut self) {
        self.swimming = true;
    }

    pub fn stop_swimming(&mut self) {
        self.swimming = false;
    }

    /// Where Nessie would be after `elapsed`, or `None` while sleeping.
    pub fn position_after(&self, elapsed: Duration) -> Option<f64> {
        self.swimming
            .then(|| self.distance + self.velocity * elapsed.as_secs_f64())
    }

    pub(crate) fn set_distance(&mut self, distance: f64) {
        self.distance = sanitize(distance);
    }

    /// Back to the start line, asleep. Velocity is kept.
    pub fn reset(&mut self) {
        self.distance = 0.0;
        self.swimming = false;
    }
}

impl Default for Nessie {
    fn default() -> Self {
        Self::new(crate::storage::DEFAULT_NESSIE_VELOCITY)
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_asleep_at_origin() {
        let nessie = Nessie::new(1.0);
        assert_eq!(nessie.distance(), 0.0);
        assert!(nessie.is_sleeping());
    }

    #[test]
    fn only_moves_while_swimming() {
        let mut nessie = Nessie::new(2.0);
        assert_eq!(nessie.position_after(Duration::from_secs(1)), None);

        nessie.start_swimming();
        assert_eq!(nessie.position_after(Duration::from_millis(500)), Some(1.0));
    }

    #[test]
    fn reset_keeps_velocity() {
        let mut nessie = Nessie::new(1.5);
        nessie.start_swimming();
        nessie.set_distance(30.0);

        nessie.reset();

        assert_eq!(nessie.distance(), 0.0);
        assert!(nessie.is_sleeping());
        assert_eq!(nessie.velocity(), 1.5);
    }

    #[test]
    fn rejects_negative_and_nan() {
        let mut nessie = Nessie::new(-3.0);
        assert_eq!(nessie.velocity(), 0.0);
        nessie.set_distance(f64::NAN);
        assert_eq!(nessie.distance(), 0.0);
    }
}
