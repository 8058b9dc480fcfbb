//! Deterministic name to color mapping.

use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Returns a `#rrggbb` color derived from `name`.
///
/// The same name always yields the same color across runs and platforms.
pub fn for_name(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    digest[..3]
        .iter()
        .fold(String::from("#"), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Parses a `#rrggbb` color into float channels in `0.0..=1.0`.
pub fn parse_rgb(color: &str) -> Option<(f64, f64, f64)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .ok()
            .map(|value| f64::from(value) / 255.0)
    };
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
