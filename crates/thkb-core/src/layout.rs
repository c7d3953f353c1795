use thkb_common::util::BoundedIndex;

use crate::keycode::Keycode;
use crate::layer::{LayerState, MAX_LAYERS};

#[derive(Clone, Copy, Debug)]
#[repr(transparent)]
pub struct LayerRow<C, const COLS: usize> {
    keys: [Keycode<C>; COLS],
}

impl<C, const COLS: usize> LayerRow<C, COLS> {
    pub const fn new(keys: [Keycode<C>; COLS]) -> Self {
        Self { keys }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutLayer<C, const ROWS: usize, const COLS: usize> {
    rows: [LayerRow<C, COLS>; ROWS],
}

impl<C, const ROWS: usize, const COLS: usize> LayoutLayer<C, ROWS, COLS> {
    pub const fn new(rows: [LayerRow<C, COLS>; ROWS]) -> Self {
        Self { rows }
    }
}

impl<C: Copy, const ROWS: usize, const COLS: usize> LayoutLayer<C, ROWS, COLS> {
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> Option<Keycode<C>> {
        self.rows.get(row)?.keys.get(col).copied()
    }
}

/// Every layer of a keyboard, all of them with the same dimensions.
pub struct Layout<C, const LAYERS: usize, const ROWS: usize, const COLS: usize> {
    layers: [LayoutLayer<C, ROWS, COLS>; LAYERS],
}

impl<C, const LAYERS: usize, const ROWS: usize, const COLS: usize> Layout<C, LAYERS, ROWS, COLS> {
    const fn assert_config_ok() {
        assert!(LAYERS > 0, "There must be at least 1 layer in the layout!");
        assert!(
            LAYERS <= MAX_LAYERS as usize,
            "Layouts cannot have more than 32 layers"
        );
    }

    pub const fn new(layers: [LayoutLayer<C, ROWS, COLS>; LAYERS]) -> Self {
        const { Self::assert_config_ok() };
        Self { layers }
    }

    pub const fn layers(&self) -> usize {
        LAYERS
    }

    pub const fn rows(&self) -> usize {
        ROWS
    }

    pub const fn cols(&self) -> usize {
        COLS
    }
}

impl<C: Copy, const LAYERS: usize, const ROWS: usize, const COLS: usize>
    Layout<C, LAYERS, ROWS, COLS>
{
    /// Keycode stored at the given position, without resolving
    /// transparent keys.
    pub fn key(&self, layer: u8, row: u8, col: u8) -> Option<Keycode<C>> {
        self.layers.get(layer as usize)?.get(row as usize, col as usize)
    }

    #[inline(always)]
    pub fn key_at(&self, layer: BoundedIndex<LAYERS>, row: u8, col: u8) -> Option<Keycode<C>> {
        self.layers[layer].get(row as usize, col as usize)
    }

    /// Looks up the key at `(row, col)` through every active layer, from
    /// the highest to the lowest, skipping transparent keys. Returns the
    /// layer the key was found on alongside it.
    pub fn resolve(&self, state: &LayerState, row: u8, col: u8) -> Option<(u8, Keycode<C>)> {
        if row as usize >= ROWS || col as usize >= COLS {
            return None;
        }

        let active = state.active_mask();
        for layer in (0..LAYERS as u8).rev() {
            if active & (1 << layer) == 0 {
                continue;
            }
            match self.key(layer, row, col) {
                Some(key) if !key.is_transparent() => return Some((layer, key)),
                _ => {}
            }
        }

        let fallback = state.default_layer();
        self.key(fallback, row, col).map(|key| (fallback, key))
    }

    /// Walks every cell of every layer, as `(layer, row, col, key)`.
    pub fn iter_keys(&self) -> impl Iterator<Item = (u8, u8, u8, Keycode<C>)> + '_ {
        self.layers.iter().enumerate().flat_map(|(l, layer)| {
            layer.rows.iter().enumerate().flat_map(move |(r, row)| {
                row.keys
                    .iter()
                    .enumerate()
                    .map(move |(c, key)| (l as u8, r as u8, c as u8, *key))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::KeyboardUsage;
    use crate::keycode::tests::TestKey;

    type K = Keycode<TestKey>;

    const A: K = Keycode::Basic(KeyboardUsage::KeyboardAa);
    const B: K = Keycode::Basic(KeyboardUsage::KeyboardBb);
    const C: K = Keycode::Basic(KeyboardUsage::KeyboardCc);
    const T: K = Keycode::Transparent;
    const X: K = Keycode::NoOp;

    const LAYOUT: Layout<TestKey, 3, 1, 3> = Layout::new([
        LayoutLayer::new([LayerRow::new([A, A, A])]),
        LayoutLayer::new([LayerRow::new([B, T, T])]),
        LayoutLayer::new([LayerRow::new([C, X, T])]),
    ]);

    #[test]
    fn test_dimensions() {
        assert_eq!(LAYOUT.layers(), 3);
        assert_eq!(LAYOUT.rows(), 1);
        assert_eq!(LAYOUT.cols(), 3);
        assert_eq!(LAYOUT.iter_keys().count(), 9);
    }

    #[test]
    fn test_key_out_of_bounds() {
        assert_eq!(LAYOUT.key(0, 0, 2), Some(A));
        assert_eq!(LAYOUT.key(3, 0, 0), None);
        assert_eq!(LAYOUT.key(0, 1, 0), None);
        assert_eq!(LAYOUT.key(0, 0, 3), None);
        assert_eq!(LAYOUT.resolve(&LayerState::new(), 0, 3), None);
    }

    #[test]
    fn test_resolve_base_layer() {
        let state = LayerState::new();
        assert_eq!(LAYOUT.resolve(&state, 0, 0), Some((0, A)));
        assert_eq!(LAYOUT.resolve(&state, 0, 1), Some((0, A)));
    }

    #[test]
    fn test_resolve_falls_through_transparent_keys() {
        let mut state = LayerState::new();
        state.on(1);
        state.on(2);
        assert_eq!(LAYOUT.resolve(&state, 0, 0), Some((2, C)));
        // No-op stops the lookup
        assert_eq!(LAYOUT.resolve(&state, 0, 1), Some((2, X)));
        assert_eq!(LAYOUT.resolve(&state, 0, 2), Some((0, A)));
    }

    #[test]
    fn test_resolve_uses_default_layer() {
        let mut state = LayerState::new();
        state.default_layer_set(1 << 1);
        assert_eq!(LAYOUT.resolve(&state, 0, 0), Some((1, B)));
        // Layer 0 isn't active anymore, only transparent keys remain
        assert_eq!(LAYOUT.resolve(&state, 0, 1), Some((1, T)));
    }
}
