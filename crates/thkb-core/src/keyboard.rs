use core::fmt::Debug;

use thkb_common::{
    KeyState, dev_debug, dev_error, dev_info, dev_trace, dev_warn,
    time::Instant,
    util::{BitMatrix, BoundedIndex},
};

use crate::{
    audio::{Audio, Song},
    backlight::{Backlight, DEFAULT_BACKLIGHT_LEVELS},
    eeconfig::{AudioConfig, Eeconfig, EeconfigError, EeconfigRecord, Eeprom, KeymapConfig},
    hid::{HidReport, KeyChangeError},
    keycode::{CustomKeycode, Keycode, KeyboardUsage, Mods},
    layer::{LayerState, MAX_LAYERS},
    layout::Layout,
};

pub const DEFAULT_TAPPING_TERM_MS: u16 = 200;

/// A single key transition reported by the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub row: u8,
    pub col: u8,
    pub state: KeyState,
    pub time: Instant,
}

impl KeyEvent {
    pub const fn press(row: u8, col: u8, time: Instant) -> Self {
        Self {
            row,
            col,
            state: KeyState::Pressed,
            time,
        }
    }

    pub const fn release(row: u8, col: u8, time: Instant) -> Self {
        Self {
            row,
            col,
            state: KeyState::Released,
            time,
        }
    }

    pub const fn pressed(&self) -> bool {
        self.state.is_pressed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRecord {
    pub event: KeyEvent,
}

/// Runtime tunables.
#[derive(Debug, Clone, Copy)]
pub struct KeyboardSettings {
    /// How long a mod-tap key has to be held to act as a modifier.
    pub tapping_term_ms: u16,
    pub backlight_levels: u8,
    /// Song played when a layer becomes the persistent default, indexed by
    /// layer.
    pub default_layer_songs: &'static [Option<&'static Song>],
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            tapping_term_ms: DEFAULT_TAPPING_TERM_MS,
            backlight_levels: DEFAULT_BACKLIGHT_LEVELS,
            default_layer_songs: &[],
        }
    }
}

/// Operations a keymap can perform on the keyboard from its callback.
pub trait KeyboardOps {
    fn layer_on(&mut self, layer: u8);
    fn layer_off(&mut self, layer: u8);
    fn is_layer_on(&self, layer: u8) -> bool;
    fn layer_state(&self) -> LayerState;
    fn update_tri_layer(&mut self, l1: u8, l2: u8, l3: u8);

    /// Makes `layer` the only default layer and persists it.
    fn set_single_persistent_default_layer(&mut self, layer: u8);

    fn register_code(&mut self, key: KeyboardUsage) -> Result<(), KeyChangeError>;
    fn unregister_code(&mut self, key: KeyboardUsage) -> Result<(), KeyChangeError>;

    fn backlight_step(&mut self);

    fn stop_all_notes(&mut self);
    fn play_song(&mut self, song: &'static Song);

    fn eeconfig_is_enabled(&self) -> bool;
    fn eeconfig_init(&mut self) -> Result<(), EeconfigError>;
    fn eeconfig_read_keymap(&self) -> Result<KeymapConfig, EeconfigError>;
    fn eeconfig_update_keymap(&mut self, keymap: KeymapConfig) -> Result<(), EeconfigError>;
}

/// Keymap callback, invoked on every key transition before the default
/// processing. Returning `false` marks the event as fully handled.
pub trait ProcessRecord {
    type Custom: CustomKeycode + Debug;

    fn process_record_user(
        &mut self,
        keycode: Keycode<Self::Custom>,
        record: &KeyRecord,
        kb: &mut dyn KeyboardOps,
    ) -> bool;
}

/// Mod-tap key pressed but not yet decided between tap and hold.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingModTap {
    pub(crate) row: u8,
    pub(crate) col: u8,
    pub(crate) mods: Mods,
    pub(crate) since: Instant,
}

/// Everything but the layout and the keymap callback. Implements
/// [`KeyboardOps`] so the callback can borrow it while the runtime still
/// holds the rest.
pub struct KeyboardHost<E: Eeprom> {
    pub(crate) settings: KeyboardSettings,
    pub(crate) layers: LayerState,
    pub(crate) report: HidReport,
    pub(crate) backlight: Backlight,
    pub(crate) audio: Audio,
    pub(crate) eeconfig: Eeconfig<E>,
    pub(crate) keymap_config: KeymapConfig,
    /// Mask of the layers the layout has.
    pub(crate) available_layers: u32,
    pub(crate) pending_mod_tap: Option<PendingModTap>,
    /// Key sent by a tapped mod-tap, released on the next event or tick.
    pub(crate) tap_release: Option<KeyboardUsage>,
    pub(crate) reset_requested: bool,
}

impl<E: Eeprom> KeyboardHost<E> {
    fn new(eeprom: E, settings: KeyboardSettings, layer_count: usize) -> Self {
        let mut eeconfig = Eeconfig::new(eeprom);
        let record = match eeconfig.read() {
            Ok(record) => record,
            Err(e) => {
                dev_warn!("Persistent config not valid ({}). Initializing", e);
                if let Err(e) = eeconfig.init() {
                    dev_error!("Couldn't initialize persistent config: {}", e);
                }
                EeconfigRecord::default()
            }
        };

        let available = if layer_count >= MAX_LAYERS as usize {
            u32::MAX
        } else {
            (1u32 << layer_count) - 1
        };
        let mut default_layers = record.default_layer & available;
        if default_layers == 0 {
            dev_warn!(
                "Persisted default layers {:#x} not available. Using base layer",
                record.default_layer
            );
            default_layers = 1;
        }

        let mut layers = LayerState::new();
        layers.default_layer_set(default_layers);

        Self {
            backlight: Backlight::from_config(settings.backlight_levels, record.backlight),
            audio: Audio::new(record.audio.enable),
            keymap_config: record.keymap(),
            available_layers: available,
            settings,
            layers,
            report: HidReport::new(),
            eeconfig,
            pending_mod_tap: None,
            tap_release: None,
            reset_requested: false,
        }
    }

    pub(crate) fn persist_keymap_config(&mut self) {
        if let Err(e) = self.eeconfig.update_keymap(self.keymap_config) {
            dev_error!("Couldn't persist keymap config: {}", e);
        }
    }

    pub(crate) fn set_audio_enabled(&mut self, enable: bool) {
        self.audio.set_enabled(enable);
        if let Err(e) = self.eeconfig.update_audio(AudioConfig { enable }) {
            dev_error!("Couldn't persist audio config: {}", e);
        }
    }

    /// Releases the key sent by the last tapped mod-tap, if any.
    fn flush_tap_release(&mut self) {
        if let Some(key) = self.tap_release.take() {
            if let Err(e) = self.report.unregister_code(key) {
                dev_warn!("Couldn't release tapped key {:?}: {}", key, e);
            }
        }
    }

    /// Turns the pending mod-tap, if any, into a held modifier.
    fn resolve_mod_tap_as_hold(&mut self) {
        if let Some(pending) = self.pending_mod_tap.take() {
            dev_trace!("Mod-tap at ({}, {}) held", pending.row, pending.col);
            self.report.add_mods(pending.mods);
        }
    }
}

impl<E: Eeprom> KeyboardOps for KeyboardHost<E> {
    fn layer_on(&mut self, layer: u8) {
        self.layers.on(layer);
    }

    fn layer_off(&mut self, layer: u8) {
        self.layers.off(layer);
    }

    fn is_layer_on(&self, layer: u8) -> bool {
        self.layers.is_on(layer)
    }

    fn layer_state(&self) -> LayerState {
        self.layers
    }

    fn update_tri_layer(&mut self, l1: u8, l2: u8, l3: u8) {
        self.layers.update_tri_layer(l1, l2, l3);
    }

    fn set_single_persistent_default_layer(&mut self, layer: u8) {
        if layer >= MAX_LAYERS || self.available_layers & (1 << layer) == 0 {
            dev_warn!("Can't set layer {} as default, it's not in the layout", layer);
            return;
        }

        if let Some(Some(song)) = self.settings.default_layer_songs.get(layer as usize) {
            self.audio.play_song(song);
        }

        let mask = 1u32 << layer;
        if let Err(e) = self.eeconfig.update_default_layer(mask) {
            dev_error!("Couldn't persist default layer: {}", e);
        }
        self.layers.default_layer_set(mask);
        dev_info!("Default layer set to {}", layer);
    }

    fn register_code(&mut self, key: KeyboardUsage) -> Result<(), KeyChangeError> {
        self.report.register_code(key)
    }

    fn unregister_code(&mut self, key: KeyboardUsage) -> Result<(), KeyChangeError> {
        self.report.unregister_code(key)
    }

    fn backlight_step(&mut self) {
        self.backlight.step();
        if let Err(e) = self.eeconfig.update_backlight(self.backlight.config()) {
            dev_error!("Couldn't persist backlight config: {}", e);
        }
    }

    fn stop_all_notes(&mut self) {
        self.audio.stop_all_notes();
    }

    fn play_song(&mut self, song: &'static Song) {
        self.audio.play_song(song);
    }

    fn eeconfig_is_enabled(&self) -> bool {
        self.eeconfig.is_enabled()
    }

    fn eeconfig_init(&mut self) -> Result<(), EeconfigError> {
        self.eeconfig.init()
    }

    fn eeconfig_read_keymap(&self) -> Result<KeymapConfig, EeconfigError> {
        self.eeconfig.read_keymap()
    }

    fn eeconfig_update_keymap(&mut self, keymap: KeymapConfig) -> Result<(), EeconfigError> {
        self.eeconfig.update_keymap(keymap)?;
        self.keymap_config = keymap;
        Ok(())
    }
}

/// Turns key events into HID report changes, going through the layout and
/// the keymap callback.
pub struct Keyboard<H, E, const LAYERS: usize, const ROWS: usize, const COLS: usize>
where
    H: ProcessRecord,
    E: Eeprom,
    H::Custom: 'static,
{
    layout: &'static Layout<H::Custom, LAYERS, ROWS, COLS>,
    handler: H,
    host: KeyboardHost<E>,
    key_states: BitMatrix<ROWS, COLS>,
    /// Layer each held key was resolved on when pressed, so the release
    /// goes to the same keycode even if the layers changed meanwhile.
    press_layers: [[Option<BoundedIndex<LAYERS>>; COLS]; ROWS],
}

impl<H, E, const LAYERS: usize, const ROWS: usize, const COLS: usize>
    Keyboard<H, E, LAYERS, ROWS, COLS>
where
    H: ProcessRecord,
    E: Eeprom,
    H::Custom: 'static,
{
    /// Loads the persistent config from `eeprom`, initializing it when
    /// it's not valid, and applies it.
    pub fn new(
        layout: &'static Layout<H::Custom, LAYERS, ROWS, COLS>,
        handler: H,
        eeprom: E,
        settings: KeyboardSettings,
    ) -> Self {
        Self {
            layout,
            handler,
            host: KeyboardHost::new(eeprom, settings, LAYERS),
            key_states: BitMatrix::new(),
            press_layers: [[None; COLS]; ROWS],
        }
    }

    /// Processes a key transition. Returns whether it changed the state of
    /// the key.
    pub fn process_event(&mut self, event: KeyEvent) -> bool {
        let (row, col) = (event.row as usize, event.col as usize);
        if row >= ROWS || col >= COLS {
            dev_warn!("Ignoring event out of the matrix: ({}, {})", event.row, event.col);
            return false;
        }

        if !self.key_states.set_value(row, col, event.pressed()) {
            dev_debug!("Key ({}, {}) already {:?}", event.row, event.col, event.state);
            return false;
        }

        self.host.flush_tap_release();

        let keycode = if event.pressed() {
            if self
                .host
                .pending_mod_tap
                .is_some_and(|p| (p.row, p.col) != (event.row, event.col))
            {
                self.host.resolve_mod_tap_as_hold();
            }

            match self.layout.resolve(&self.host.layers, event.row, event.col) {
                Some((layer, keycode)) => {
                    self.press_layers[row][col] = BoundedIndex::from_value(layer as usize);
                    keycode
                }
                None => {
                    self.press_layers[row][col] = None;
                    Keycode::NoOp
                }
            }
        } else {
            self.press_layers[row][col]
                .take()
                .and_then(|layer| self.layout.key_at(layer, event.row, event.col))
                .unwrap_or(Keycode::NoOp)
        };

        dev_trace!("Key ({}, {}) {:?}: {:?}", event.row, event.col, event.state, keycode);

        let record = KeyRecord { event };
        if self
            .handler
            .process_record_user(keycode, &record, &mut self.host)
        {
            self.host.process_action(keycode, &record);
        }

        true
    }

    /// Advances time-based state. Must be called periodically, even when
    /// there are no key events.
    pub fn tick(&mut self, now: Instant) {
        self.host.flush_tap_release();

        if let Some(pending) = self.host.pending_mod_tap {
            if now.duration_since(pending.since) >= self.host.settings.tapping_term_ms {
                self.host.resolve_mod_tap_as_hold();
            }
        }
    }

    pub fn host(&self) -> &KeyboardHost<E> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut KeyboardHost<E> {
        &mut self.host
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn is_key_pressed(&self, row: u8, col: u8) -> bool {
        (row as usize) < ROWS && (col as usize) < COLS
            && self.key_states.get_value(row as usize, col as usize)
    }

    pub fn pressed_keys(&self) -> u32 {
        self.key_states.count_ones()
    }
}

impl<E: Eeprom> KeyboardHost<E> {
    pub fn report(&self) -> &HidReport {
        &self.report
    }

    pub fn backlight(&self) -> &Backlight {
        &self.backlight
    }

    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    pub fn eeconfig(&self) -> &Eeconfig<E> {
        &self.eeconfig
    }

    pub fn keymap_config(&self) -> KeymapConfig {
        self.keymap_config
    }

    pub fn settings(&self) -> &KeyboardSettings {
        &self.settings
    }

    /// Whether the host should be sent every pressed key instead of the
    /// six key boot report.
    pub fn nkro(&self) -> bool {
        self.keymap_config.contains(KeymapConfig::NKRO)
    }

    /// Whether a reset key asked to jump to the bootloader. Cleared when
    /// read.
    pub fn take_reset_request(&mut self) -> bool {
        core::mem::replace(&mut self.reset_requested, false)
    }
}

#[macro_export]
macro_rules! do_on_key_state {
    ($st:expr, $on_pressed:block, $on_released:block) => {
        match $st {
            $crate::KeyState::Pressed => $on_pressed,
            $crate::KeyState::Released => $on_released,
        }
    };
}
