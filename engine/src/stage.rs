use rand::Rng;

/// Playfield dimensions in character cells. The y axis increases downward;
/// `ground_row` is the row entities stand on.
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub max_x: f32,
    pub max_y: f32,
    pub ground_row: f32,
}

impl Stage {
    pub fn new(max_x: f32, max_y: f32) -> Self {
        Self {
            max_x,
            max_y,
            // Leave room for the HUD below the arena floor.
            ground_row: max_y - 6.0,
        }
    }

    /// Y coordinate entities rest at when standing on the ground.
    pub fn standing_y(&self) -> f32 {
        self.ground_row - 0.5
    }

    /// Random spawn position just above the ground, away from the walls.
    pub fn random_spawn<R: Rng>(&self, rng: &mut R) -> (f32, f32) {
        let x = rng.gen_range(4..(self.max_x as i32 - 5)) as f32;
        (x, self.ground_row - 1.0)
    }

    /// Random drop position for a power-up pickup.
    pub fn random_pickup_spot<R: Rng>(&self, rng: &mut R) -> (f32, f32) {
        let x = rng.gen_range(5..(self.max_x as i32 - 5)) as f32;
        (x, self.ground_row - 2.0)
    }

    /// Evenly spaced spawn slot `index` out of `count`, used so that every
    /// networked peer computes identical initial positions from the same
    /// ordered roster.
    pub fn spawn_slot(&self, index: usize, count: usize) -> (f32, f32) {
        let count = count.max(1);
        let x = self.max_x * (index as f32 + 1.0) / (count as f32 + 1.0);
        (x, self.ground_row - 1.0)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(80.0, 24.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_slots_are_deterministic_and_spread() {
        let stage = Stage::new(80.0, 24.0);
        let a = stage.spawn_slot(0, 3);
        let b = stage.spawn_slot(1, 3);
        let c = stage.spawn_slot(2, 3);
        assert_eq!(a, stage.spawn_slot(0, 3));
        assert!(a.0 < b.0 && b.0 < c.0);
        assert_eq!(b.0, 40.0);
    }
}
