use bevy::math::{Rect, Vec2};

/// Scroll offset that keeps a target centred without showing anything past
/// the world edges. Adding the offset to a world position yields its screen
/// position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldCamera {
    pub world_size: Vec2,
    pub screen_size: Vec2,
    offset: Vec2,
}

impl WorldCamera {
    pub fn new(world_size: Vec2, screen_size: Vec2) -> Self {
        Self {
            world_size,
            screen_size,
            offset: Vec2::ZERO,
        }
    }

    pub fn follow(&mut self, target: Vec2) {
        self.offset = camera_offset(target, self.screen_size, self.world_size);
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn apply(&self, world: Vec2) -> Vec2 {
        world + self.offset
    }

    pub fn apply_rect(&self, rect: Rect) -> Rect {
        Rect::from_corners(rect.min + self.offset, rect.max + self.offset)
    }
}

/// `-target + screen / 2` per axis, kept within `[-(world - screen), 0]`.
/// When the world is smaller than the screen the upper bound wins and the
/// offset stays at zero.
pub fn camera_offset(target: Vec2, screen_size: Vec2, world_size: Vec2) -> Vec2 {
    let centred = -target + (screen_size / 2.0).floor();
    let lowest = -(world_size - screen_size);
    centred.max(lowest).min(Vec2::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Vec2 = Vec2::new(1280.0, 720.0);
    const WORLD: Vec2 = Vec2::new(1600.0, 1200.0);

    #[test]
    fn top_left_corner_clamps_to_zero() {
        assert_eq!(camera_offset(Vec2::ZERO, SCREEN, WORLD), Vec2::ZERO);
    }

    #[test]
    fn far_bottom_right_clamps_to_world_edge() {
        let offset = camera_offset(Vec2::new(5000.0, 5000.0), SCREEN, WORLD);
        assert_eq!(offset, Vec2::new(-320.0, -480.0));
    }

    #[test]
    fn interior_target_is_centred() {
        let offset = camera_offset(Vec2::new(800.0, 600.0), SCREEN, WORLD);
        assert_eq!(offset, Vec2::new(-160.0, -240.0));
    }

    #[test]
    fn apply_shifts_into_screen_space() {
        let mut camera = WorldCamera::new(WORLD, SCREEN);
        camera.follow(Vec2::new(800.0, 600.0));
        assert_eq!(camera.apply(Vec2::new(800.0, 600.0)), Vec2::new(640.0, 360.0));
    }
}
