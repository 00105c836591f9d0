use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::StoreId;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Store → Color32
// ---------------------------------------------------------------------------

/// Fixed colour per store so the same store looks the same in every chart,
/// whatever the current filter hides.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<StoreId, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from every store in the loaded dataset.
    pub fn new(stores: &BTreeSet<StoreId>) -> Self {
        let palette = generate_palette(stores.len());
        let mapping = stores.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a store.
    pub fn color_for(&self, store: &StoreId) -> Color32 {
        self.mapping
            .get(store)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        let distinct: BTreeSet<[u8; 4]> = p.iter().map(|c| c.to_array()).collect();
        assert_eq!(distinct.len(), 5);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_store_gets_default_colour() {
        let stores: BTreeSet<StoreId> = [StoreId::Number(1), StoreId::Number(2)].into_iter().collect();
        let map = ColorMap::new(&stores);
        assert_ne!(map.color_for(&StoreId::Number(1)), map.color_for(&StoreId::Number(2)));
        assert_eq!(map.color_for(&StoreId::Number(9)), Color32::GRAY);
    }
}
