//! Sky backdrop pixel sources.
//!
//! The viewer swaps between a warm sunset and a deep night sky. Each
//! variant resolves to a block of RGBA pixels for the background texture,
//! decoded from an image on disk when one is configured and readable,
//! otherwise generated as a vertical gradient so the scene never renders
//! against an empty backdrop.

use std::path::Path;

use crate::error::TextureError;
use crate::visuals::SkyVariant;

const GRADIENT_WIDTH: u32 = 4;
const GRADIENT_HEIGHT: u32 = 256;

/// RGBA pixel source for the sky backdrop.
#[derive(Debug, Clone)]
pub struct SkyBackdrop {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl SkyBackdrop {
    /// Wrap raw RGBA data.
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height * 4) as usize,
            "RGBA data size mismatch"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Decode an image file into RGBA pixels. PNG and JPEG are supported.
    ///
    /// Read failures surface as [`TextureError::Io`], decode failures as
    /// [`TextureError::ImageLoad`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path.as_ref())?;
        let img = image::load_from_memory(&bytes)?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            pixels: img.into_raw(),
            width,
            height,
        })
    }

    /// Procedural vertical gradient in the variant's palette, top row
    /// first.
    pub fn gradient(variant: SkyVariant) -> Self {
        let (top, bottom) = match variant {
            // Dusk violet down to ember orange.
            SkyVariant::Sunset => ([46u8, 39, 86, 255], [236u8, 120, 68, 255]),
            // Near-black zenith down to a faint horizon glow.
            SkyVariant::Night => ([2u8, 4, 18, 255], [24u8, 34, 68, 255]),
        };

        let mut pixels = Vec::with_capacity((GRADIENT_WIDTH * GRADIENT_HEIGHT * 4) as usize);
        for y in 0..GRADIENT_HEIGHT {
            let t = y as f32 / (GRADIENT_HEIGHT - 1) as f32;
            let texel = [
                lerp_u8(top[0], bottom[0], t),
                lerp_u8(top[1], bottom[1], t),
                lerp_u8(top[2], bottom[2], t),
                255,
            ];
            for _ in 0..GRADIENT_WIDTH {
                pixels.extend_from_slice(&texel);
            }
        }
        Self {
            pixels,
            width: GRADIENT_WIDTH,
            height: GRADIENT_HEIGHT,
        }
    }

    /// Resolve the backdrop for `variant`: decode `path` when one is
    /// configured, falling back to the gradient (with a diagnostic on
    /// stderr) when it is missing or unreadable.
    pub fn load_or_fallback(variant: SkyVariant, path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::gradient(variant);
        };
        match Self::from_file(path) {
            Ok(backdrop) => backdrop,
            Err(e) => {
                eprintln!(
                    "Sky texture error for '{}': {} (using {} gradient)",
                    path.display(),
                    e,
                    variant.label()
                );
                Self::gradient(variant)
            }
        }
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round() as u8
}
