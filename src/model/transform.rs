use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position + orientation of anything in the scene.
///
/// Axis convention: +Z is forward, +X is right, +Y is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self { position, rotation: Quat::IDENTITY }
    }

    pub fn forward(&self) -> Vec3 { self.rotation * Vec3::Z }

    pub fn right(&self) -> Vec3 { self.rotation * Vec3::X }

    /// Compose a child's local transform onto this one
    pub fn mul_transform(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * local.position,
            rotation: self.rotation * local.rotation,
        }
    }
}

impl Default for Transform {
    fn default() -> Self { Self::IDENTITY }
}

/// Identity of a physical object known to the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub u64);

/// Set of collidable layers a ray may hit (bit `n` = layer `n`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    pub fn from_layers(layers: &[u8]) -> Self {
        Self(layers.iter().fold(0u32, |acc, &l| acc | (1u32 << (l & 31))))
    }

    pub fn contains_layer(&self, layer: u8) -> bool {
        layer < 32 && self.0 & (1u32 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self { Self::ALL }
}

bitflags::bitflags! {
    /// What a collidable may be used for. Pickup eligibility is a capability check,
    /// never a name or display-tag comparison.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const CARRYABLE = 1 << 0;
        const AIM_TARGET = 1 << 1;
    }
}

/// What a trigger-enter notification carries about the other collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collidable {
    pub handle: Handle,
    pub capabilities: Capabilities,
}

impl Collidable {
    pub fn new(handle: Handle, capabilities: Capabilities) -> Self {
        Self { handle, capabilities }
    }

    pub fn is_carryable(&self) -> bool {
        self.capabilities.contains(Capabilities::CARRYABLE)
    }
}
