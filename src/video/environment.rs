//! Per-level tweaks to named objects of the host's scene environment.

use serde::{Deserialize, Serialize};

use crate::core::{Override, Vec3};

/// One modification to a named scene object. Unset fields leave the object's
/// current value alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentModification {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Override::is_inherit")]
    pub position: Override<Vec3>,
    #[serde(default, skip_serializing_if = "Override::is_inherit")]
    pub rotation: Override<Vec3>,
    #[serde(default, skip_serializing_if = "Override::is_inherit")]
    pub scale: Override<Vec3>,
}

impl EnvironmentModification {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: None,
            position: Override::Inherit,
            rotation: Override::Inherit,
            scale: Override::Inherit,
        }
    }
}

/// Host collaborator that owns the scene objects.
/// The playback controller only hands it data.
pub trait EnvironmentApplier {
    /// Apply modifications in order. `keep_big_mirror` asks the host not to
    /// disable its mirror effect for this level.
    fn apply(&mut self, modifications: &[EnvironmentModification], keep_big_mirror: bool);

    /// Restore every object touched by `apply`
    fn reset(&mut self);
}
