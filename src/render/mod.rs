pub mod screen;

pub use screen::{
    MaterialHandle, MaterialSource, Placement, Screen, ScreenMaterial, ScreenTint, Transform,
};
