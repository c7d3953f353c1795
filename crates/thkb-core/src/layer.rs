use thkb_common::{dev_trace, dev_warn};

/// Maximum number of layers a layout can hold. Layer activation is tracked
/// as a bitmask, one bit per layer.
pub const MAX_LAYERS: u8 = 32;

/// Activation state of the layout layers.
///
/// There are two independent masks: the momentary layers, toggled by keys
/// while they are held, and the default layers, which are usually set once
/// and persisted. A key is looked up in both at the same time, with higher
/// layers taking precedence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerState {
    layers: u32,
    default_layers: u32,
}

#[inline(always)]
fn layer_bit(layer: u8) -> Option<u32> {
    if layer < MAX_LAYERS {
        Some(1 << layer)
    } else {
        dev_warn!("Ignoring out of range layer {}", layer);
        None
    }
}

#[inline(always)]
fn highest_in(mask: u32) -> u8 {
    if mask == 0 {
        0
    } else {
        (31 - mask.leading_zeros()) as u8
    }
}

impl LayerState {
    pub const fn new() -> Self {
        Self {
            layers: 0,
            default_layers: 1,
        }
    }

    pub fn on(&mut self, layer: u8) {
        if let Some(bit) = layer_bit(layer) {
            self.set(self.layers | bit);
        }
    }

    pub fn off(&mut self, layer: u8) {
        if let Some(bit) = layer_bit(layer) {
            self.set(self.layers & !bit);
        }
    }

    pub fn invert(&mut self, layer: u8) {
        if let Some(bit) = layer_bit(layer) {
            self.set(self.layers ^ bit);
        }
    }

    /// Turns off every momentary layer.
    pub fn clear(&mut self) {
        self.set(0);
    }

    pub fn set(&mut self, mask: u32) {
        if mask != self.layers {
            dev_trace!("Layer state {:#010x} -> {:#010x}", self.layers, mask);
            self.layers = mask;
        }
    }

    pub fn is_on(&self, layer: u8) -> bool {
        layer < MAX_LAYERS && self.layers & (1 << layer) != 0
    }

    /// Highest momentary layer turned on, or 0 when there's none.
    pub fn highest(&self) -> u8 {
        highest_in(self.layers)
    }

    pub fn mask(&self) -> u32 {
        self.layers
    }

    pub fn default_mask(&self) -> u32 {
        self.default_layers
    }

    /// Union of momentary and default layers, used for key lookup.
    pub fn active_mask(&self) -> u32 {
        self.layers | self.default_layers
    }

    pub fn default_layer_set(&mut self, mask: u32) {
        dev_trace!("Default layer state {:#010x} -> {:#010x}", self.default_layers, mask);
        self.default_layers = mask;
    }

    /// Highest default layer turned on, or 0 when there's none.
    pub fn default_layer(&self) -> u8 {
        highest_in(self.default_layers)
    }

    /// Turns `l3` on while both `l1` and `l2` are on, and off otherwise.
    pub fn update_tri_layer(&mut self, l1: u8, l2: u8, l3: u8) {
        if self.is_on(l1) && self.is_on(l2) {
            self.on(l3);
        } else {
            self.off(l3);
        }
    }
}
