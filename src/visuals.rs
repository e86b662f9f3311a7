//! Visual state the interaction layer and the GUI both steer.
//!
//! These are plain data values: the renderer reads them every frame, party
//! mode pulses the bloom strength, and the egui panel (when enabled) edits
//! them directly.

/// Bloom post-process settings.
///
/// Defaults match the viewer's tuned look. The GUI sliders cover strength
/// 0..3, radius 0..1 and threshold 0..1; party mode walks the strength
/// through `(strength + 3) % 4`, which transiently exceeds the slider
/// maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// How strongly the blurred highlights are added back.
    pub strength: f32,
    /// Blur spread as a fraction of the screen.
    pub radius: f32,
    /// Luminance below which a pixel contributes no bloom.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 0.5,
            radius: 0.4,
            threshold: 0.85,
        }
    }
}

/// Which backdrop the scene shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkyVariant {
    /// Warm dusk backdrop, the starting sky.
    #[default]
    Sunset,

    /// Deep night backdrop, switched to on celebration.
    Night,
}

impl SkyVariant {
    /// Display label for the GUI selector.
    pub fn label(&self) -> &'static str {
        match self {
            SkyVariant::Sunset => "sunset",
            SkyVariant::Night => "night",
        }
    }
}

/// Which material the glass dome renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomeMaterial {
    /// The resting clear-glass look.
    #[default]
    Glass,

    /// Animated noise shown while the pointer hovers the dome.
    Shimmer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_defaults() {
        let bloom = BloomSettings::default();
        assert_eq!(bloom.strength, 0.5);
        assert_eq!(bloom.radius, 0.4);
        assert_eq!(bloom.threshold, 0.85);
    }

    #[test]
    fn test_initial_visual_state() {
        assert_eq!(SkyVariant::default(), SkyVariant::Sunset);
        assert_eq!(DomeMaterial::default(), DomeMaterial::Glass);
        assert_eq!(SkyVariant::Night.label(), "night");
    }
}
