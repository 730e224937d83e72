//! Axis-separated rectangle movement against static obstacles.

use bevy::math::{Rect, Vec2};

/// True when the interiors intersect. Rectangles that only share an edge do
/// not overlap.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

pub fn translate(rect: &mut Rect, offset: Vec2) {
    rect.min += offset;
    rect.max += offset;
}

pub fn with_center(rect: Rect, center: Vec2) -> Rect {
    Rect::from_center_size(center, rect.size())
}

/// Grows (or shrinks, for negative values) a rectangle around its centre.
pub fn inflate(rect: Rect, amount: Vec2) -> Rect {
    Rect::from_center_size(rect.center(), (rect.size() + amount).max(Vec2::ZERO))
}

/// Moves `rect` fully inside `bounds`. A rectangle larger than the bounds on
/// an axis is centred on that axis instead.
pub fn clamp_inside(rect: &mut Rect, bounds: &Rect) {
    let size = rect.size();
    let mut min = rect.min;
    for axis in 0..2 {
        if size[axis] > bounds.size()[axis] {
            min[axis] = bounds.center()[axis] - size[axis] / 2.0;
        } else {
            min[axis] = min[axis].clamp(bounds.min[axis], bounds.max[axis] - size[axis]);
        }
    }
    *rect = Rect::from_corners(min, min + size);
}

/// Applies `velocity` to `hitbox`: X first, snapping the leading edge flush
/// against every obstacle it now overlaps, then Y the same way, then clamps
/// the result inside `bounds`. Resolving X before Y is what makes diagonal
/// motion slide along walls.
pub fn resolve_movement<'a>(
    hitbox: &mut Rect,
    velocity: Vec2,
    obstacles: impl IntoIterator<Item = &'a Rect> + Clone,
    bounds: &Rect,
) {
    translate(hitbox, Vec2::new(velocity.x, 0.0));
    for wall in obstacles.clone() {
        if !overlaps(hitbox, wall) {
            continue;
        }
        if velocity.x > 0.0 {
            translate(hitbox, Vec2::new(wall.min.x - hitbox.max.x, 0.0));
        }
        if velocity.x < 0.0 {
            translate(hitbox, Vec2::new(wall.max.x - hitbox.min.x, 0.0));
        }
    }

    translate(hitbox, Vec2::new(0.0, velocity.y));
    for wall in obstacles {
        if !overlaps(hitbox, wall) {
            continue;
        }
        if velocity.y > 0.0 {
            translate(hitbox, Vec2::new(0.0, wall.min.y - hitbox.max.y));
        }
        if velocity.y < 0.0 {
            translate(hitbox, Vec2::new(0.0, wall.max.y - hitbox.min.y));
        }
    }

    clamp_inside(hitbox, bounds);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> Rect {
        Rect::new(0.0, 0.0, 1600.0, 1200.0)
    }

    #[test]
    fn moving_right_stops_flush_against_wall() {
        let wall = Rect::new(110.0, 90.0, 150.0, 130.0);
        let mut hitbox = Rect::new(60.0, 100.0, 104.0, 134.0);
        resolve_movement(&mut hitbox, Vec2::new(8.0, 0.0), [&wall], &map());
        assert_eq!(hitbox.max.x, wall.min.x);
        assert_eq!(hitbox.min.y, 100.0);
        assert!(!overlaps(&hitbox, &wall));
    }

    #[test]
    fn moving_left_stops_flush_against_wall() {
        let wall = Rect::new(10.0, 100.0, 50.0, 140.0);
        let mut hitbox = Rect::new(52.0, 100.0, 96.0, 134.0);
        resolve_movement(&mut hitbox, Vec2::new(-4.0, 0.0), [&wall], &map());
        assert_eq!(hitbox.min.x, wall.max.x);
    }

    #[test]
    fn diagonal_into_wall_slides_vertically() {
        // Wall directly to the right; the vertical component still applies.
        let wall = Rect::new(100.0, 0.0, 140.0, 400.0);
        let mut hitbox = Rect::new(58.0, 200.0, 98.0, 240.0);
        resolve_movement(&mut hitbox, Vec2::new(3.0, 3.0), [&wall], &map());
        assert_eq!(hitbox.max.x, 100.0);
        assert_eq!(hitbox.min.y, 203.0);
    }

    #[test]
    fn moving_down_onto_wall_snaps_to_top() {
        let wall = Rect::new(0.0, 300.0, 400.0, 340.0);
        let mut hitbox = Rect::new(100.0, 262.0, 144.0, 296.0);
        resolve_movement(&mut hitbox, Vec2::new(0.0, 8.0), [&wall], &map());
        assert_eq!(hitbox.max.y, 300.0);
        assert_eq!(hitbox.min.x, 100.0);
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn clamps_into_map_bounds() {
        let mut hitbox = Rect::new(1590.0, -5.0, 1634.0, 29.0);
        resolve_movement(&mut hitbox, Vec2::new(4.0, -4.0), std::iter::empty(), &map());
        assert_eq!(hitbox.max.x, 1600.0);
        assert_eq!(hitbox.min.y, 0.0);
        assert_eq!(hitbox.size(), Vec2::new(44.0, 34.0));
    }

    #[test]
    fn inflate_shrinks_around_center() {
        let sprite = Rect::new(400.0, 300.0, 464.0, 364.0);
        let hitbox = inflate(sprite, Vec2::new(-20.0, -30.0));
        assert_eq!(hitbox, Rect::new(410.0, 315.0, 454.0, 349.0));
    }
}
