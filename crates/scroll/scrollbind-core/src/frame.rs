//! Progress to frame mapping.

/// Index of the last renderable frame. A zero-frame source is treated as a
/// single frame so the clamp range is never inverted.
#[inline]
pub fn last_frame(total_frames: u32) -> f64 {
    f64::from(total_frames.saturating_sub(1))
}

/// Map scroll progress to the frame to render.
///
/// `progress * (total_frames - 1) * speed_factor`, clamped to
/// `[0, total_frames - 1]`. Progress outside `[0, 1]` (scroll overshoot) is
/// absorbed by the clamp. A non-finite product maps to frame 0.
pub fn frame_for_progress(progress: f64, total_frames: u32, speed_factor: f64) -> f64 {
    let last = last_frame(total_frames);
    let raw = progress * last;
    let accelerated = raw * speed_factor;
    if accelerated.is_nan() {
        return 0.0;
    }
    accelerated.clamp(0.0, last)
}
