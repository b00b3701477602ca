/// Why locomotion is currently suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyReason {
    PickingUp,
    Throwing,
}

/// Exclusive gate that keeps locomotion from touching animation/physics
/// while a scripted sequence runs. Written only by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyGate {
    #[default]
    Free,
    Suspended(BusyReason),
}

impl BusyGate {
    pub fn is_busy(&self) -> bool { matches!(self, BusyGate::Suspended(_)) }
}

/// Which locomotion clip the character is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocomotionState {
    #[default]
    Idle,
    WalkForward,
    WalkBackward,
    Strafe,
    Run,
    Jump,
}

/// Vertical motion of the actor. Position and orientation live with the
/// character motor; only what the controller integrates is kept here.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActorMotion {
    pub vertical_velocity: f32,
    pub grounded: bool,
}
