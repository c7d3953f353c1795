use thkb_common::dev_warn;
use thkb_core::{
    do_on_key_state,
    keyboard::{KeyRecord, KeyboardOps, ProcessRecord},
    keycode::{KeyboardUsage, Keycode},
};

use crate::config::{CustomKey, Layer};

#[derive(Debug, Default, Clone, Copy)]
pub struct PreonicKeymap;

impl PreonicKeymap {
    pub const fn new() -> Self {
        Self
    }

    fn tri_layer_key(layer: Layer, record: &KeyRecord, kb: &mut dyn KeyboardOps) {
        do_on_key_state!(record.event.state, { kb.layer_on(layer.index()) }, {
            kb.layer_off(layer.index())
        });
        kb.update_tri_layer(
            Layer::Lower.index(),
            Layer::Raise.index(),
            Layer::Adjust.index(),
        );
    }

    fn default_layer_key(layer: Layer, record: &KeyRecord, kb: &mut dyn KeyboardOps) {
        if record.event.pressed() {
            kb.set_single_persistent_default_layer(layer.index());
        }
    }
}

impl ProcessRecord for PreonicKeymap {
    type Custom = CustomKey;

    fn process_record_user(
        &mut self,
        keycode: Keycode<CustomKey>,
        record: &KeyRecord,
        kb: &mut dyn KeyboardOps,
    ) -> bool {
        let Keycode::Custom(key) = keycode else {
            return true;
        };
        let state = record.event.state;

        match key {
            CustomKey::Qwerty => Self::default_layer_key(Layer::Qwerty, record, kb),
            CustomKey::Colemak => Self::default_layer_key(Layer::Colemak, record, kb),
            CustomKey::Dvorak => Self::default_layer_key(Layer::Dvorak, record, kb),
            CustomKey::Lower => Self::tri_layer_key(Layer::Lower, record, kb),
            CustomKey::Raise => Self::tri_layer_key(Layer::Raise, record, kb),
            CustomKey::Function => {
                do_on_key_state!(state, { kb.layer_on(Layer::Function.index()) }, {
                    kb.layer_off(Layer::Function.index())
                })
            }
            CustomKey::Backlit => do_on_key_state!(
                state,
                {
                    if let Err(e) = kb.register_code(KeyboardUsage::KeyboardRightShift) {
                        dev_warn!("Couldn't press right shift: {}", e);
                    }
                    #[cfg(feature = "backlight")]
                    kb.backlight_step();
                },
                {
                    if let Err(e) = kb.unregister_code(KeyboardUsage::KeyboardRightShift) {
                        dev_warn!("Couldn't release right shift: {}", e);
                    }
                }
            ),
        }

        false
    }
}
