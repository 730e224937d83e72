//! Draw-surface abstraction every screen renders onto.
//!
//! Screens only describe a frame: sprite blits, filled rectangles and text in
//! screen space (origin top-left, y down). Whoever owns the surface decides
//! how to present it. A sprite whose image is unavailable is replaced by a
//! solid placeholder rectangle instead of failing the frame.

use bevy::color::{Alpha, Color};
use bevy::math::{Rect, Vec2};
use bevy::utils::HashSet;
use thiserror::Error;
use tracing::debug;

pub mod palette {
    use bevy::color::Color;

    pub const BLACK: Color = Color::srgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::srgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::srgb(0.784, 0.196, 0.196);
    pub const GREEN: Color = Color::srgb(0.196, 0.784, 0.196);
    pub const GOLD: Color = Color::srgb(1.0, 0.843, 0.0);
    pub const TEXT: Color = Color::srgb(0.784, 0.784, 0.784);
    pub const TEXT_DIM: Color = Color::srgb(0.588, 0.588, 0.588);
    pub const TEXT_CORRUPTED: Color = Color::srgb(0.784, 0.392, 0.784);
    pub const BAR_BACK: Color = Color::srgb(0.078, 0.078, 0.078);
    pub const BAR_FRAME: Color = Color::srgb(0.392, 0.392, 0.392);
    pub const PLACEHOLDER: Color = RED;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    CombatBackground,
    ForestTile,
    Egg,
    Hatchling,
    HatchlingAttack,
    HatchlingHit,
    Wolf,
    WolfAttack,
    WolfHit,
    Tree,
    Rock,
}

impl SpriteKey {
    pub const ALL: [SpriteKey; 11] = [
        SpriteKey::CombatBackground,
        SpriteKey::ForestTile,
        SpriteKey::Egg,
        SpriteKey::Hatchling,
        SpriteKey::HatchlingAttack,
        SpriteKey::HatchlingHit,
        SpriteKey::Wolf,
        SpriteKey::WolfAttack,
        SpriteKey::WolfHit,
        SpriteKey::Tree,
        SpriteKey::Rock,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SpriteKey::CombatBackground => "bg_combat_forest.png",
            SpriteKey::ForestTile => "bg_forest.png",
            SpriteKey::Egg => "spr_egg.png",
            SpriteKey::Hatchling => "spr_hatchling.png",
            SpriteKey::HatchlingAttack => "spr_hatchling_attack.png",
            SpriteKey::HatchlingHit => "spr_hatchling_hit.png",
            SpriteKey::Wolf => "spr_wolf.png",
            SpriteKey::WolfAttack => "spr_wolf_attack.png",
            SpriteKey::WolfHit => "spr_wolf_hit.png",
            SpriteKey::Tree => "spr_tree.png",
            SpriteKey::Rock => "spr_rock.png",
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    #[error("sprite {0:?} is unavailable")]
    AssetUnavailable(SpriteKey),
}

/// One image placed at `position` (top-left corner), stretched to `size`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blit {
    pub sprite: SpriteKey,
    pub position: Vec2,
    pub size: Vec2,
    pub flip_x: bool,
}

impl Blit {
    pub fn new(sprite: SpriteKey, position: Vec2, size: Vec2) -> Self {
        Self {
            sprite,
            position,
            size,
            flip_x: false,
        }
    }

    pub fn flipped(mut self, flip_x: bool) -> Self {
        self.flip_x = flip_x;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_corners(self.position, self.position + self.size)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    /// `position.x` is the horizontal centre of the line.
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub color: Color,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn new(font_size: f32, color: Color) -> Self {
        Self {
            font_size,
            color,
            align: TextAlign::Left,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }
}

pub trait DrawSurface {
    fn size(&self) -> Vec2;

    fn blit(&mut self, blit: Blit) -> Result<(), RenderError>;

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn text(&mut self, content: &str, position: Vec2, style: TextStyle);

    /// Rectangle outline drawn inside `rect`.
    fn stroke_rect(&mut self, rect: Rect, color: Color, thickness: f32) {
        let t = thickness.min(rect.width() / 2.0).min(rect.height() / 2.0);
        let (min, max) = (rect.min, rect.max);
        self.fill_rect(Rect::new(min.x, min.y, max.x, min.y + t), color);
        self.fill_rect(Rect::new(min.x, max.y - t, max.x, max.y), color);
        self.fill_rect(Rect::new(min.x, min.y + t, min.x + t, max.y - t), color);
        self.fill_rect(Rect::new(max.x - t, min.y + t, max.x, max.y - t), color);
    }

    fn fill_screen(&mut self, color: Color) {
        let size = self.size();
        self.fill_rect(Rect::from_corners(Vec2::ZERO, size), color);
    }
}

/// Blits the sprite, or a placeholder rectangle of the same bounds when the
/// surface reports the image as unavailable.
pub fn blit_or_placeholder(surface: &mut dyn DrawSurface, blit: Blit) {
    if let Err(err) = surface.blit(blit) {
        debug!(target: "core_game.render", %err, "drawing placeholder");
        surface.fill_rect(blit.bounds(), palette::PLACEHOLDER);
    }
}

/// Horizontal meter: dark backing, coloured fill proportional to
/// `value / max`, grey frame and an optional label above it.
pub fn draw_bar(
    surface: &mut dyn DrawSurface,
    rect: Rect,
    value: f32,
    max: f32,
    color: Color,
    label: Option<&str>,
) {
    surface.fill_rect(rect, palette::BAR_BACK);
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    if ratio > 0.0 {
        let fill = Rect::new(
            rect.min.x,
            rect.min.y,
            rect.min.x + rect.width() * ratio,
            rect.max.y,
        );
        surface.fill_rect(fill, color);
    }
    surface.stroke_rect(rect, palette::BAR_FRAME, 2.0);
    if let Some(label) = label.filter(|l| !l.is_empty()) {
        surface.text(
            label,
            Vec2::new(rect.min.x, rect.min.y - 25.0),
            TextStyle::new(24.0, palette::TEXT),
        );
    }
}

pub fn with_alpha(color: Color, alpha: u8) -> Color {
    color.with_alpha(alpha as f32 / 255.0)
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Sprite(Blit),
    Rect {
        rect: Rect,
        color: Color,
    },
    Text {
        content: String,
        position: Vec2,
        style: TextStyle,
    },
}

/// Records a frame as an ordered command list, back to front.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    size: Vec2,
    unavailable: HashSet<SpriteKey>,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            unavailable: HashSet::default(),
            commands: Vec::new(),
        }
    }

    pub fn with_unavailable(mut self, sprites: impl IntoIterator<Item = SpriteKey>) -> Self {
        self.unavailable.extend(sprites);
        self
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn sprites(&self) -> impl Iterator<Item = &Blit> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Sprite(blit) => Some(blit),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

impl DrawSurface for DrawList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn blit(&mut self, blit: Blit) -> Result<(), RenderError> {
        if self.unavailable.contains(&blit.sprite) {
            return Err(RenderError::AssetUnavailable(blit.sprite));
        }
        self.commands.push(DrawCommand::Sprite(blit));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn text(&mut self, content: &str, position: Vec2, style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            content: content.to_owned(),
            position,
            style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_sprite_becomes_placeholder() {
        let mut list = DrawList::new(Vec2::new(100.0, 100.0)).with_unavailable([SpriteKey::Wolf]);
        let blit = Blit::new(SpriteKey::Wolf, Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0));
        blit_or_placeholder(&mut list, blit);
        assert_eq!(list.sprites().count(), 0);
        assert_eq!(
            list.commands(),
            &[DrawCommand::Rect {
                rect: Rect::new(10.0, 20.0, 40.0, 60.0),
                color: palette::PLACEHOLDER,
            }]
        );
    }

    #[test]
    fn available_sprite_is_recorded() {
        let mut list = DrawList::new(Vec2::splat(64.0));
        let blit = Blit::new(SpriteKey::Rock, Vec2::ZERO, Vec2::splat(64.0)).flipped(true);
        blit_or_placeholder(&mut list, blit);
        assert_eq!(list.sprites().copied().collect::<Vec<_>>(), vec![blit]);
    }

    #[test]
    fn empty_bar_skips_fill() {
        let mut list = DrawList::new(Vec2::splat(400.0));
        draw_bar(
            &mut list,
            Rect::new(0.0, 50.0, 250.0, 70.0),
            0.0,
            100.0,
            palette::GREEN,
            Some("HP"),
        );
        let rects = list
            .commands()
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Rect { color, .. } if *color == palette::GREEN))
            .count();
        assert_eq!(rects, 0);
        assert_eq!(list.texts().collect::<Vec<_>>(), vec!["HP"]);
    }
}
