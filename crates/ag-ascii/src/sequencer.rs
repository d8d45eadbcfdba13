use std::time::Duration;

use ag_core::config::RenderConfig;
use ag_core::error::RenderError;
use ag_core::frame::{AnimationSource, RenderedSequence};
use rayon::prelude::*;

use crate::compositor::Compositor;
use crate::mask::BackgroundMask;

/// Display duration of one frame at `fps` frames per second.
///
/// # Errors
/// [`RenderError::InvalidDimension`] if `fps` is not finite and positive.
///
/// # Example
/// ```
/// use ag_ascii::sequencer::frame_duration;
/// use std::time::Duration;
/// assert_eq!(frame_duration(5.0).unwrap(), Duration::from_millis(200));
/// assert!(frame_duration(0.0).is_err());
/// ```
pub fn frame_duration(fps: f32) -> Result<Duration, RenderError> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(RenderError::InvalidDimension(format!("fps invalide : {fps}")));
    }
    Ok(Duration::from_nanos((1e9 / f64::from(fps)).round() as u64))
}

/// Render every frame of an animation.
///
/// Frames are rendered in parallel and reassembled in source order. With
/// `remove_background`, one mask is computed from frame `mask_seed_frame`
/// and shared by all frames. `target_fps` replaces every duration with
/// `1 / fps`; the frame count never changes.
///
/// # Errors
/// - [`RenderError::InvalidImage`] for an empty source.
/// - [`RenderError::InvalidDimension`] for a seed index out of range.
/// - Configuration errors from [`Compositor::new`].
/// - [`RenderError::Frame`] wrapping the first failing frame, in source order.
///
/// # Example
/// ```
/// use ag_ascii::sequencer::render_sequence;
/// use ag_core::config::RenderConfig;
/// use ag_core::frame::{AnimationSource, Image};
/// use std::time::Duration;
///
/// let frame = Image::filled(4, 4, [255; 4]).unwrap();
/// let source = AnimationSource {
///     frames: vec![(frame.clone(), Duration::from_millis(50)); 3],
/// };
/// let seq = render_sequence(&source, &RenderConfig::default()).unwrap();
/// assert_eq!(seq.len(), 3);
/// assert_eq!(seq.total_duration(), Duration::from_millis(150));
/// ```
pub fn render_sequence(
    source: &AnimationSource,
    config: &RenderConfig,
) -> Result<RenderedSequence, RenderError> {
    if source.is_empty() {
        return Err(RenderError::InvalidImage("animation sans frame".into()));
    }
    let compositor = Compositor::new(config)?;
    let fixed = config.target_fps.map(frame_duration).transpose()?;

    let mask = if config.remove_background {
        let seed = config.mask_seed_frame;
        let Some((seed_frame, _)) = source.frames.get(seed) else {
            return Err(RenderError::InvalidDimension(format!(
                "frame de référence {seed} hors limites ({} frames)",
                source.len()
            )));
        };
        BackgroundMask::compute(seed_frame, config.bg_tolerance)
    } else {
        None
    };

    log::debug!(
        "Séquence : {} frames, masque {}",
        source.len(),
        if mask.is_some() { "partagé" } else { "absent" }
    );

    let results: Vec<_> = source
        .frames
        .par_iter()
        .map(|(image, duration)| {
            compositor
                .render_with_mask(image, mask.as_ref())
                .map(|grid| (grid, fixed.unwrap_or(*duration)))
        })
        .collect();

    let mut frames = Vec::with_capacity(results.len());
    for (index, result) in results.into_iter().enumerate() {
        frames.push(result.map_err(|e| e.at_frame(index))?);
    }
    Ok(RenderedSequence { frames })
}
