//! Weighted random token colors.
//!
//! Warm, saturated colors carry the most weight; metallic tones are rare
//! so they still feel special when they come up. The selector never hands
//! out the same color twice in a row unless the palette leaves no choice.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A palette color and its relative draw weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub color: &'static str,
    pub weight: u32,
}

const fn entry(color: &'static str, weight: u32) -> PaletteEntry {
    PaletteEntry { color, weight }
}

/// The default token palette.
pub const WEIGHTED_PALETTE: [PaletteEntry; 14] = [
    entry("#FF6B00", 30),
    entry("#FFD400", 30),
    entry("#FF3B3B", 30),
    entry("#FF69B4", 25),
    entry("#8A2BE2", 25),
    entry("#06B6D4", 25),
    entry("#1E3A8A", 20),
    entry("#A8E6A3", 17),
    entry("#006400", 17),
    entry("#00A3FF", 17),
    entry("#FFB6C1", 17),
    entry("#9BAE9E", 17),
    entry("#C0C0C0", 5),
    entry("#D4AF37", 4),
];

/// Draws token colors from a weighted palette, remembering only the last pick.
#[derive(Debug, Clone)]
pub struct ColorSelector {
    palette: Vec<PaletteEntry>,
    last: Option<String>,
    rng: StdRng,
}

impl Default for ColorSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSelector {
    /// Selector over the default palette, seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            palette: WEIGHTED_PALETTE.to_vec(),
            last: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic selector for tests and reproducible demos.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    /// Use a custom palette. Returns None for an empty palette.
    pub fn with_palette(mut self, palette: Vec<PaletteEntry>) -> Option<Self> {
        if palette.is_empty() {
            return None;
        }
        self.palette = palette;
        Some(self)
    }

    /// Pretend `color` was the previous pick.
    pub fn with_last(mut self, color: impl Into<String>) -> Self {
        self.last = Some(color.into());
        self
    }

    pub fn palette(&self) -> &[PaletteEntry] {
        &self.palette
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Pick the next color.
    pub fn next(&mut self) -> &'static str {
        let last = self.last.as_deref();
        let mut candidates: Vec<PaletteEntry> = self
            .palette
            .iter()
            .copied()
            .filter(|e| Some(e.color) != last)
            .collect();
        if candidates.is_empty() {
            // Single-color palette: repeating is the only option
            candidates = self.palette.clone();
        }

        let total: u64 = candidates.iter().map(|e| e.weight as u64).sum();
        let picked = if total == 0 {
            candidates[self.rng.gen_range(0..candidates.len())].color
        } else {
            let mut r = self.rng.gen_range(0..total);
            let mut chosen = candidates[candidates.len() - 1].color;
            for candidate in &candidates {
                let weight = candidate.weight as u64;
                if r < weight {
                    chosen = candidate.color;
                    break;
                }
                r -= weight;
            }
            chosen
        };

        self.last = Some(picked.to_string());
        picked
    }
}
