use thkb_common::{dev_error, dev_info, dev_warn};
#[cfg(feature = "audio")]
use thkb_core::audio::songs;
use thkb_core::{
    do_on_key_state,
    eeconfig::KeymapConfig,
    keyboard::{KeyRecord, KeyboardOps, ProcessRecord},
    keycode::{KeyboardUsage, Keycode},
};

use crate::config::{CustomKey, Layer};

/// Callback of the Planck keymap. Handles every [`CustomKey`] and lets
/// anything else through to the default processing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanckKeymap;

impl PlanckKeymap {
    pub const fn new() -> Self {
        Self
    }

    /// Lower and Raise turn Adjust on while both are held.
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

    fn backlit_key(record: &KeyRecord, kb: &mut dyn KeyboardOps) {
        do_on_key_state!(
            record.event.state,
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
        );
    }

    fn enter_plover(kb: &mut dyn KeyboardOps) {
        #[cfg(feature = "audio")]
        {
            kb.stop_all_notes();
            kb.play_song(songs::PLOVER);
        }

        for layer in [Layer::Raise, Layer::Lower, Layer::Function, Layer::Adjust] {
            kb.layer_off(layer.index());
        }
        kb.layer_on(Layer::Plover.index());

        if !kb.eeconfig_is_enabled() {
            if let Err(e) = kb.eeconfig_init() {
                dev_error!("Couldn't initialize persistent config: {}", e);
            }
        }

        // Steno chords need every key of the chord in the same report.
        match kb.eeconfig_read_keymap() {
            Ok(mut keymap) => {
                keymap.insert(KeymapConfig::NKRO);
                if let Err(e) = kb.eeconfig_update_keymap(keymap) {
                    dev_error!("Couldn't enable NKRO: {}", e);
                }
            }
            Err(e) => dev_error!("Couldn't read keymap config: {}", e),
        }

        dev_info!("Plover on");
    }

    fn exit_plover(kb: &mut dyn KeyboardOps) {
        #[cfg(feature = "audio")]
        kb.play_song(songs::PLOVER_GOODBYE);

        kb.layer_off(Layer::Plover.index());
        dev_info!("Plover off");
    }
}

impl ProcessRecord for PlanckKeymap {
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
        let pressed = record.event.pressed();

        match key {
            CustomKey::Qwerty if pressed => {
                kb.set_single_persistent_default_layer(Layer::Qwerty.index())
            }
            CustomKey::Colemak if pressed => {
                kb.set_single_persistent_default_layer(Layer::Colemak.index())
            }
            CustomKey::Dvorak if pressed => {
                kb.set_single_persistent_default_layer(Layer::Dvorak.index())
            }
            CustomKey::Lower => Self::tri_layer_key(Layer::Lower, record, kb),
            CustomKey::Raise => Self::tri_layer_key(Layer::Raise, record, kb),
            CustomKey::Function => {
                do_on_key_state!(record.event.state, { kb.layer_on(Layer::Function.index()) }, {
                    kb.layer_off(Layer::Function.index())
                })
            }
            CustomKey::Backlit => Self::backlit_key(record, kb),
            CustomKey::Plover if pressed => Self::enter_plover(kb),
            CustomKey::ExtPlv if pressed => Self::exit_plover(kb),
            CustomKey::Qwerty
            | CustomKey::Colemak
            | CustomKey::Dvorak
            | CustomKey::Plover
            | CustomKey::ExtPlv => {}
        }

        false
    }
}
