use bevy::math::{IVec2, Vec2};

const SHAKE_DECAY: f32 = 0.8;
const SHAKE_SNAP: i32 = 2;
const FLASH_DECAY: u8 = 10;

/// Screen shake and white flash left behind by combat hits. Decays every
/// tick whatever the combat state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisualFx {
    pub shake_offset: IVec2,
    pub flash_alpha: u8,
}

impl VisualFx {
    pub fn trigger(&mut self, shake: IVec2, flash: u8) {
        self.shake_offset = shake;
        self.flash_alpha = flash;
    }

    pub fn decay(&mut self) {
        if self.shake_offset != IVec2::ZERO {
            // Truncation toward zero keeps the shake on whole pixels.
            let scaled = self.shake_offset.as_vec2() * SHAKE_DECAY;
            self.shake_offset = scaled.as_ivec2();
            if self.shake_offset.x.abs() < SHAKE_SNAP {
                self.shake_offset = IVec2::ZERO;
            }
        }
        self.flash_alpha = self.flash_alpha.saturating_sub(FLASH_DECAY);
    }

    pub fn offset(&self) -> Vec2 {
        self.shake_offset.as_vec2()
    }

    pub fn is_idle(&self) -> bool {
        self.shake_offset == IVec2::ZERO && self.flash_alpha == 0
    }
}
