//! Hover and celebration interaction state.
//!
//! Pointer events land here after hit testing: hovering the dome swaps its
//! material, and a click on the character (with a celebration clip ready)
//! fires the full celebration while toggling the party-mode bloom pulse.
//! The pulse is a plain [`Interval`] owned in an `Option`; holding at most
//! one live handle is what makes the toggle well behaved.

use std::time::{Duration, Instant};

use crate::time::Interval;
use crate::visuals::{BloomSettings, DomeMaterial};

/// Period of the party-mode bloom pulse.
pub const PARTY_TICK: Duration = Duration::from_millis(100);
/// Added to the bloom strength on every party tick.
const PARTY_STRENGTH_STEP: f32 = 3.0;
/// Modulus wrapping the pulsed strength.
const PARTY_STRENGTH_WRAP: f32 = 4.0;

/// Coarse interaction phase.
///
/// `Celebrating` is sticky: once the character has been clicked the viewer
/// stays in that phase, and later clicks only toggle the party pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Pointer away from the dome, nothing clicked yet.
    #[default]
    Idle,

    /// Pointer over the glass dome.
    Hovering,

    /// The character has been clicked at least once.
    Celebrating,
}

/// Interaction state machine fed by the pointer and polled by the frame
/// loop.
#[derive(Debug, Default)]
pub struct Interaction {
    phase: Phase,
    hovering: bool,
    /// Live party pulse; `None` while party mode is off.
    party: Option<Interval>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current coarse phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the pointer was over the dome at the last move.
    #[inline]
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Whether the party pulse is currently running.
    #[inline]
    pub fn party_active(&self) -> bool {
        self.party.is_some()
    }

    /// Material the dome should render with this frame.
    #[inline]
    pub fn dome_material(&self) -> DomeMaterial {
        if self.hovering {
            DomeMaterial::Shimmer
        } else {
            DomeMaterial::Glass
        }
    }

    /// Record the dome hit-test result for a pointer move.
    ///
    /// Reassigned on every move; the material swap is idempotent. Hovering
    /// still works while celebrating, but never leaves that phase.
    pub fn update_hover(&mut self, over_dome: bool) {
        self.hovering = over_dome;
        if self.phase != Phase::Celebrating {
            self.phase = if over_dome {
                Phase::Hovering
            } else {
                Phase::Idle
            };
        }
    }

    /// Record a character click-test result.
    ///
    /// Returns true when the click celebrates: the character was hit and a
    /// celebration clip is ready. The caller then plays the clip and audio
    /// cue, recolors the snow and switches to the night sky; all of those
    /// re-fire on every qualifying click. The party pulse alone toggles,
    /// so a second click stops the pulsing while the rest replays.
    pub fn register_click(&mut self, on_character: bool, clip_ready: bool, now: Instant) -> bool {
        if !(on_character && clip_ready) {
            return false;
        }
        self.phase = Phase::Celebrating;
        self.toggle_party(now);
        true
    }

    /// Start the pulse when no timer is live, stop it otherwise.
    fn toggle_party(&mut self, now: Instant) {
        if self.party.is_some() {
            self.party = None;
        } else {
            self.party = Some(Interval::new(PARTY_TICK, now));
        }
    }

    /// Advance the party pulse, stepping the bloom strength once per due
    /// tick: `strength = (strength + 3) % 4`. Returns the tick count, which
    /// is zero while party mode is off.
    pub fn poll_party(&mut self, now: Instant, bloom: &mut BloomSettings) -> u32 {
        let Some(party) = &mut self.party else {
            return 0;
        };
        let ticks = party.poll(now);
        for _ in 0..ticks {
            bloom.strength = (bloom.strength + PARTY_STRENGTH_STEP) % PARTY_STRENGTH_WRAP;
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let interaction = Interaction::new();
        assert_eq!(interaction.phase(), Phase::Idle);
        assert!(!interaction.is_hovering());
        assert!(!interaction.party_active());
        assert_eq!(interaction.dome_material(), DomeMaterial::Glass);
    }

    #[test]
    fn test_hover_swaps_material_both_ways() {
        let mut interaction = Interaction::new();

        interaction.update_hover(true);
        assert_eq!(interaction.phase(), Phase::Hovering);
        assert_eq!(interaction.dome_material(), DomeMaterial::Shimmer);

        interaction.update_hover(false);
        assert_eq!(interaction.phase(), Phase::Idle);
        assert_eq!(interaction.dome_material(), DomeMaterial::Glass);
    }

    #[test]
    fn test_click_needs_hit_and_clip() {
        let mut interaction = Interaction::new();
        let now = Instant::now();

        assert!(!interaction.register_click(false, true, now));
        assert!(!interaction.register_click(true, false, now));
        assert_eq!(interaction.phase(), Phase::Idle);
        assert!(!interaction.party_active());
    }

    #[test]
    fn test_click_celebrates_and_toggles_party() {
        let mut interaction = Interaction::new();
        let now = Instant::now();

        assert!(interaction.register_click(true, true, now));
        assert_eq!(interaction.phase(), Phase::Celebrating);
        assert!(interaction.party_active());

        // The second qualifying click re-fires the celebration but stops
        // the pulse.
        assert!(interaction.register_click(true, true, now));
        assert_eq!(interaction.phase(), Phase::Celebrating);
        assert!(!interaction.party_active());

        // And a third starts it again.
        assert!(interaction.register_click(true, true, now));
        assert!(interaction.party_active());
    }

    #[test]
    fn test_celebrating_phase_is_sticky() {
        let mut interaction = Interaction::new();
        interaction.register_click(true, true, Instant::now());

        interaction.update_hover(true);
        assert_eq!(interaction.phase(), Phase::Celebrating);
        assert_eq!(interaction.dome_material(), DomeMaterial::Shimmer);

        interaction.update_hover(false);
        assert_eq!(interaction.phase(), Phase::Celebrating);
        assert_eq!(interaction.dome_material(), DomeMaterial::Glass);
    }

    #[test]
    fn test_party_pulse_sequence_from_default() {
        let mut interaction = Interaction::new();
        let mut bloom = BloomSettings::default();
        let start = Instant::now();
        interaction.register_click(true, true, start);

        let mut observed = Vec::new();
        for tick in 1..=7 {
            let ticks = interaction.poll_party(start + PARTY_TICK * tick, &mut bloom);
            assert_eq!(ticks, 1);
            observed.push(bloom.strength);
        }
        assert_eq!(observed, vec![3.5, 2.5, 1.5, 0.5, 3.5, 2.5, 1.5]);
    }

    #[test]
    fn test_party_pulse_catches_up_after_stall() {
        let mut interaction = Interaction::new();
        let mut bloom = BloomSettings::default();
        let start = Instant::now();
        interaction.register_click(true, true, start);

        // A long stalled frame delivers every missed step at once.
        let ticks = interaction.poll_party(start + PARTY_TICK * 4, &mut bloom);
        assert_eq!(ticks, 4);
        assert_eq!(bloom.strength, 0.5);
    }

    #[test]
    fn test_poll_without_party_leaves_bloom_alone() {
        let mut interaction = Interaction::new();
        let mut bloom = BloomSettings::default();

        assert_eq!(interaction.poll_party(Instant::now(), &mut bloom), 0);
        assert_eq!(bloom, BloomSettings::default());
    }

    #[test]
    fn test_stopping_party_freezes_strength() {
        let mut interaction = Interaction::new();
        let mut bloom = BloomSettings::default();
        let start = Instant::now();

        interaction.register_click(true, true, start);
        interaction.poll_party(start + PARTY_TICK, &mut bloom);
        assert_eq!(bloom.strength, 3.5);

        // Toggle off; later polls step nothing.
        interaction.register_click(true, true, start + PARTY_TICK);
        assert_eq!(interaction.poll_party(start + PARTY_TICK * 10, &mut bloom), 0);
        assert_eq!(bloom.strength, 3.5);
    }
}
