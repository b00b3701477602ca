use tracing::{error, trace};

use crate::world::Animator;

/// Wraps the (optional) animator bound to the character model.
///
/// Tracks the clip last faded to so repeated requests for the same clip
/// don't restart the blend every tick.
pub struct AnimationDriver {
    animator: Option<Box<dyn Animator>>,
    current: Option<String>,
}

impl AnimationDriver {
    pub fn new(animator: Option<Box<dyn Animator>>, owner: &'static str) -> Self {
        if animator.is_none() {
            error!(owner, "no animation target bound; continuing without animation playback");
        }
        Self { animator, current: None }
    }

    pub fn is_bound(&self) -> bool { self.animator.is_some() }

    pub fn current(&self) -> Option<&str> { self.current.as_deref() }

    /// Cross-fade to `clip`. Returns false if nothing was issued.
    pub fn play(&mut self, clip: &str, blend: f32) -> bool {
        let Some(animator) = self.animator.as_mut() else { return false };
        if self.current.as_deref() == Some(clip) {
            return false;
        }
        trace!(clip, blend, "cross-fade");
        animator.cross_fade(clip, blend);
        self.current = Some(clip.to_string());
        true
    }

    /// Hard stop; the next `play` always issues.
    pub fn stop(&mut self) {
        if let Some(animator) = self.animator.as_mut() {
            animator.stop();
        }
        self.current = None;
    }

    pub fn clip_length(&self, clip: &str) -> Option<f32> {
        self.animator.as_ref().and_then(|a| a.clip_length(clip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::sandbox::{AnimationCall, RecordingAnimator};

    #[test]
    fn test_same_clip_is_not_restarted() {
        let animator = RecordingAnimator::new([("Idle", 1.0), ("Walking", 1.0)]);
        let log = animator.log();
        let mut driver = AnimationDriver::new(Some(Box::new(animator)), "test");

        assert!(driver.play("Idle", 0.3));
        assert!(!driver.play("Idle", 0.3));
        assert!(driver.play("Walking", 0.3));
        driver.stop();
        assert!(driver.play("Walking", 0.3));

        assert_eq!(log.borrow().len(), 4);
        assert_eq!(log.borrow()[2], AnimationCall::Stop);
    }

    #[test]
    fn test_unbound_driver_is_inert() {
        let mut driver = AnimationDriver::new(None, "test");
        assert!(!driver.is_bound());
        assert!(!driver.play("Idle", 0.3));
        assert_eq!(driver.clip_length("Idle"), None);
        driver.stop();
    }
}
