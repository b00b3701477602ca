/// Named-clip animation playback on the character model.
pub trait Animator {
    fn cross_fade(&mut self, clip: &str, blend: f32);
    fn stop(&mut self);
    /// Natural length of `clip` in seconds, `None` if the clip doesn't exist.
    fn clip_length(&self, clip: &str) -> Option<f32>;
}
