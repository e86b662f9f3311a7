//! Keyframed transform animation.
//!
//! Clips are absolute local-pose tracks bound to scene nodes by name. The
//! [`Mixer`] owns one action per clip and is stepped by a fixed amount
//! every rendered frame, so playback speed rides the frame rate just like
//! the rest of the viewer's motion.

use glam::{Quat, Vec3};

use crate::scene::Transform;

/// Fixed timeline step applied per rendered frame.
pub const MIXER_STEP: f32 = 0.01;

/// Name of the snowman's celebration clip.
pub const CELEBRATION_CLIP: &str = "celebrate";
/// Name of the ambient tree-star spin clip.
pub const STAR_SPIN_CLIP: &str = "star_spin";

/// One sampled pose on a clip's timeline.
#[derive(Debug, Clone, Copy)]
pub struct Keyframe {
    /// Seconds from clip start.
    pub time: f32,
    pub transform: Transform,
}

/// A named transform track bound to a scene node.
#[derive(Debug, Clone)]
pub struct Clip {
    pub name: String,
    /// Node the sampled pose applies to.
    pub target: String,
    /// Timeline length, taken from the last keyframe.
    pub duration: f32,
    /// Keyframes in ascending time order.
    pub keyframes: Vec<Keyframe>,
    pub looping: bool,
}

impl Clip {
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        keyframes: Vec<Keyframe>,
        looping: bool,
    ) -> Self {
        let duration = keyframes.last().map(|key| key.time).unwrap_or(0.0);
        Self {
            name: name.into(),
            target: target.into(),
            duration,
            keyframes,
            looping,
        }
    }

    /// Sample the pose at `time`. One-shot clips clamp to their ends,
    /// looping clips wrap.
    pub fn sample(&self, time: f32) -> Transform {
        let Some(first) = self.keyframes.first() else {
            return Transform::IDENTITY;
        };

        let t = if self.looping && self.duration > 0.0 {
            time.rem_euclid(self.duration)
        } else {
            time.clamp(0.0, self.duration)
        };

        if t <= first.time {
            return first.transform;
        }
        for pair in self.keyframes.windows(2) {
            if t <= pair[1].time {
                let span = pair[1].time - pair[0].time;
                let alpha = if span > 0.0 { (t - pair[0].time) / span } else { 1.0 };
                return blend(pair[0].transform, pair[1].transform, alpha);
            }
        }
        self.keyframes[self.keyframes.len() - 1].transform
    }
}

fn blend(a: Transform, b: Transform, alpha: f32) -> Transform {
    Transform {
        translation: a.translation.lerp(b.translation, alpha),
        rotation: a.rotation.slerp(b.rotation, alpha),
        scale: a.scale.lerp(b.scale, alpha),
    }
}

/// Playback state for one clip.
#[derive(Debug, Clone)]
struct ClipAction {
    clip: Clip,
    time: f32,
    playing: bool,
}

/// Owns every clip action and advances the playing ones.
#[derive(Debug, Default)]
pub struct Mixer {
    actions: Vec<ClipAction>,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip, initially stopped.
    pub fn add(&mut self, clip: Clip) {
        self.actions.push(ClipAction {
            clip,
            time: 0.0,
            playing: false,
        });
    }

    /// Whether a clip with this name is registered.
    pub fn has_clip(&self, name: &str) -> bool {
        self.actions.iter().any(|action| action.clip.name == name)
    }

    /// Whether the named clip is currently playing.
    pub fn is_playing(&self, name: &str) -> bool {
        self.actions
            .iter()
            .any(|action| action.clip.name == name && action.playing)
    }

    /// (Re)start the named clip from the top. Returns false when no such
    /// clip is registered.
    pub fn play(&mut self, name: &str) -> bool {
        match self.actions.iter_mut().find(|a| a.clip.name == name) {
            Some(action) => {
                action.time = 0.0;
                action.playing = true;
                true
            }
            None => false,
        }
    }

    /// Halt the named clip where it stands.
    pub fn stop(&mut self, name: &str) {
        if let Some(action) = self.actions.iter_mut().find(|a| a.clip.name == name) {
            action.playing = false;
        }
    }

    /// Advance every playing action by `dt` and hand each sampled pose to
    /// `apply` along with its target node name. One-shot actions deliver
    /// their final pose, then stop.
    pub fn advance<F: FnMut(&str, Transform)>(&mut self, dt: f32, mut apply: F) {
        for action in &mut self.actions {
            if !action.playing {
                continue;
            }
            action.time += dt;
            if !action.clip.looping && action.time >= action.clip.duration {
                action.time = action.clip.duration;
                action.playing = false;
            }
            apply(&action.clip.target, action.clip.sample(action.time));
        }
    }
}

fn pose(base: Transform, lift: f32, yaw: f32) -> Transform {
    Transform {
        translation: base.translation + Vec3::Y * lift,
        rotation: base.rotation * Quat::from_rotation_y(yaw),
        scale: base.scale,
    }
}

/// The snowman's celebration: two hops with a full spin, settling back to
/// the rest pose the clip started from.
pub fn celebration_clip(target: impl Into<String>, base: Transform) -> Clip {
    use std::f32::consts::{PI, TAU};

    let keys = [
        (0.0, 0.0, 0.0),
        (0.3, 1.6, PI * 0.5),
        (0.6, 0.0, PI),
        (0.9, 1.6, PI * 1.5),
        (1.2, 0.0, TAU),
        (1.6, 0.5, TAU),
        (2.0, 0.0, TAU),
    ];
    let keyframes = keys
        .into_iter()
        .map(|(time, lift, yaw)| Keyframe {
            time,
            transform: pose(base, lift, yaw),
        })
        .collect();

    Clip::new(CELEBRATION_CLIP, target, keyframes, false)
}

/// Ambient looping spin for the tree-top star.
pub fn star_spin_clip(target: impl Into<String>, base: Transform) -> Clip {
    use std::f32::consts::TAU;

    let keyframes = (0..=3)
        .map(|step| Keyframe {
            time: step as f32 * (4.0 / 3.0),
            transform: pose(base, 0.0, step as f32 * (TAU / 3.0)),
        })
        .collect();

    Clip::new(STAR_SPIN_CLIP, target, keyframes, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_clip(looping: bool) -> Clip {
        // Straight-line translation from x=0 to x=10 over one second.
        let keyframes = vec![
            Keyframe {
                time: 0.0,
                transform: Transform::from_translation(Vec3::ZERO),
            },
            Keyframe {
                time: 1.0,
                transform: Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)),
            },
        ];
        Clip::new("slide", "node", keyframes, looping)
    }

    #[test]
    fn test_sample_interpolates_and_clamps() {
        let clip = slide_clip(false);
        assert_eq!(clip.sample(-1.0).translation.x, 0.0);
        assert!((clip.sample(0.5).translation.x - 5.0).abs() < 1e-4);
        assert_eq!(clip.sample(5.0).translation.x, 10.0);
    }

    #[test]
    fn test_looping_sample_wraps() {
        let clip = slide_clip(true);
        let wrapped = clip.sample(1.25).translation.x;
        let direct = clip.sample(0.25).translation.x;
        assert!((wrapped - direct).abs() < 1e-4);
    }

    #[test]
    fn test_one_shot_action_finishes() {
        let mut mixer = Mixer::new();
        mixer.add(slide_clip(false));
        assert!(mixer.play("slide"));

        let mut applied = 0u32;
        let mut last_x = f32::NAN;
        for _ in 0..200 {
            mixer.advance(MIXER_STEP, |_, pose| {
                applied += 1;
                last_x = pose.translation.x;
            });
        }
        // 1.0s of clip at 0.01 per frame: accumulated float steps may land
        // one frame short of the duration, so the clamped final pose can
        // arrive on frame 101. After it, silence.
        assert!((100..=101).contains(&applied));
        assert_eq!(last_x, 10.0);
        assert!(!mixer.is_playing("slide"));
    }

    #[test]
    fn test_final_pose_is_clip_end() {
        let mut mixer = Mixer::new();
        mixer.add(slide_clip(false));
        mixer.play("slide");

        let mut last_x = f32::NAN;
        for _ in 0..150 {
            mixer.advance(MIXER_STEP, |_, pose| last_x = pose.translation.x);
        }
        assert_eq!(last_x, 10.0);
    }

    #[test]
    fn test_play_restarts_from_top() {
        let mut mixer = Mixer::new();
        mixer.add(slide_clip(false));
        mixer.play("slide");

        for _ in 0..50 {
            mixer.advance(MIXER_STEP, |_, _| {});
        }
        mixer.play("slide");

        let mut x = f32::NAN;
        mixer.advance(MIXER_STEP, |_, pose| x = pose.translation.x);
        // First frame after the restart sits near the clip start.
        assert!(x < 0.2);
    }

    #[test]
    fn test_unknown_clip_is_refused() {
        let mut mixer = Mixer::new();
        assert!(!mixer.has_clip("missing"));
        assert!(!mixer.play("missing"));
        assert!(!mixer.is_playing("missing"));
    }

    #[test]
    fn test_poses_carry_target_names() {
        let mut mixer = Mixer::new();
        mixer.add(slide_clip(true));
        mixer.add(star_spin_clip("star", Transform::IDENTITY));
        mixer.play("slide");
        mixer.play(STAR_SPIN_CLIP);

        let mut targets = Vec::new();
        mixer.advance(MIXER_STEP, |target, _| targets.push(target.to_string()));
        assert_eq!(targets, vec!["node".to_string(), "star".to_string()]);
    }

    #[test]
    fn test_celebration_returns_to_rest() {
        let base = Transform::from_translation(Vec3::new(0.0, 4.0, 0.0));
        let clip = celebration_clip("body", base);
        let end = clip.sample(clip.duration);

        assert!((end.translation - base.translation).length() < 1e-4);
        // Full-turn rotations compare equal as matrices even when the
        // quaternions sit on opposite covers.
        let end_m = end.matrix().to_cols_array();
        let base_m = base.matrix().to_cols_array();
        for (a, b) in end_m.iter().zip(base_m.iter()) {
            assert!((a - b).abs() < 1e-4);
        }
    }
}
