//! Output surface model: where the video screen sits, how large it is and
//! whether it currently shows video.
//!
//! The host renders the screen; this module only tracks the parameters.
//! Screens are not free-scaled: width follows from height and the source
//! aspect ratio, depth is constant.

use tracing::error;

use crate::core::{Override, Vec3};

/// Depth of the screen, independent of its size
pub const SCREEN_DEPTH: f32 = 0.1;
/// Aspect ratio used until a source resolution is known
pub const DEFAULT_ASPECT_RATIO: f32 = 16.0 / 9.0;
/// Multiplier applied to the "on" color so the screen doesn't glare
pub const SCREEN_BRIGHTNESS: f32 = 0.92;

/// Position, rotation and height of the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    pub height: f32,
}

impl Placement {
    /// Screen behind the menu
    pub const MENU: Placement = Placement {
        position: Vec3::new(0.0, 12.4, 56.0),
        rotation: Vec3::new(352.0, 0.0, 0.0),
        height: 25.0,
    };

    /// Screen behind the track while a level is played
    pub const GAMEPLAY: Placement = Placement {
        position: Vec3::new(0.0, 12.4, 68.0),
        rotation: Vec3::new(352.0, 0.0, 0.0),
        height: 25.0,
    };

    /// Fill every inherited component from `defaults`
    pub fn resolve(
        position: Override<Vec3>,
        rotation: Override<Vec3>,
        height: Override<f32>,
        defaults: &Placement,
    ) -> Placement {
        Placement {
            position: position.resolve(defaults.position),
            rotation: rotation.resolve(defaults.rotation),
            height: height.resolve(defaults.height),
        }
    }
}

/// Color state of the screen material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenTint {
    /// Black/transparent, shown while no video frame is available
    Cleared,
    /// Video texture visible
    On,
}

impl ScreenTint {
    /// RGBA material color
    pub fn color(self) -> [f32; 4] {
        match self {
            ScreenTint::Cleared => [0.0, 0.0, 0.0, 0.0],
            ScreenTint::On => [SCREEN_BRIGHTNESS, SCREEN_BRIGHTNESS, SCREEN_BRIGHTNESS, 0.0],
        }
    }
}

/// Transform handed to the host renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// Opaque handle to a material provided by the host's asset loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialHandle(pub u64);

/// Material the screen renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenMaterial {
    Custom(MaterialHandle),
    /// Plain blit material used when the custom one could not be loaded
    Fallback,
}

/// Host asset loader for the screen material
pub trait MaterialSource {
    fn load_screen_material(&self) -> Option<MaterialHandle>;
}

/// The video output surface
#[derive(Debug, Clone)]
pub struct Screen {
    placement: Placement,
    aspect_ratio: f32,
    visible: bool,
    tint: ScreenTint,
    material: ScreenMaterial,
}

impl Screen {
    /// Create a visible, cleared screen at the menu placement
    pub fn new(materials: &dyn MaterialSource) -> Self {
        let material = match materials.load_screen_material() {
            Some(handle) => ScreenMaterial::Custom(handle),
            None => {
                error!("Screen material could not be loaded, using fallback");
                ScreenMaterial::Fallback
            }
        };

        Self {
            placement: Placement::MENU,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            visible: true,
            tint: ScreenTint::Cleared,
            material,
        }
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Non-positive or non-finite ratios are ignored
    pub fn set_aspect_ratio(&mut self, ratio: f32) {
        if ratio.is_finite() && ratio > 0.0 {
            self.aspect_ratio = ratio;
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn width(&self) -> f32 {
        self.placement.height * self.aspect_ratio
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.placement.position,
            rotation: self.placement.rotation,
            scale: Vec3::new(self.width(), self.placement.height, SCREEN_DEPTH),
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_tint(&mut self, tint: ScreenTint) {
        self.tint = tint;
    }

    pub fn tint(&self) -> ScreenTint {
        self.tint
    }

    pub fn material(&self) -> ScreenMaterial {
        self.material
    }
}
