//! Persistent keyboard configuration.
//!
//! A single record is kept at the start of the EEPROM:
//!
//! ```text
//! +---------+---------+------------------------------+
//! | CRC lo  | CRC hi  | ssmarshal encoded record ... |
//! +---------+---------+------------------------------+
//! ```
//!
//! The CRC ([CRC-16/IBM-SDLC](https://reveng.sourceforge.io/crc-catalogue/all.htm#crc.cat.crc-16-ibm-sdlc))
//! covers the encoded bytes only. A record is valid when it decodes, its
//! CRC matches and it carries [`EECONFIG_MAGIC`].

use core::fmt::Display;

use bitflags::bitflags;
use crc::Table;
use serde::{Deserialize, Serialize};
use thkb_common::{dev_debug, dev_info, dev_trace, dev_warn};

pub const EECONFIG_MAGIC: u16 = 0xFEED;

/// Bytes reserved for the record, CRC included.
pub const EECONFIG_SIZE: usize = 32;

const EECONFIG_CRC: crc::Crc<u16, Table<1>> = crc::Crc::<u16, Table<1>>::new(&crc::CRC_16_IBM_SDLC);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EepromError {
    OutOfRange { offset: usize, len: usize },
}

impl Display for EepromError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EepromError::OutOfRange { offset, len } => {
                write!(f, "EEPROM access out of range: {} bytes at {}", len, offset)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EeconfigError {
    Eeprom(EepromError),
    Encode,
    Decode,
    Checksum,
    BadMagic,
}

impl From<EepromError> for EeconfigError {
    fn from(value: EepromError) -> Self {
        Self::Eeprom(value)
    }
}

impl Display for EeconfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EeconfigError::Eeprom(e) => write!(f, "{}", e),
            EeconfigError::Encode => write!(f, "Couldn't encode config record"),
            EeconfigError::Decode => write!(f, "Couldn't decode config record"),
            EeconfigError::Checksum => write!(f, "Config record CRC mismatch"),
            EeconfigError::BadMagic => write!(f, "Config record not initialized"),
        }
    }
}

/// Byte addressable non-volatile storage.
pub trait Eeprom {
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), EepromError>;
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError>;
}

impl<E: Eeprom + ?Sized> Eeprom for &mut E {
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), EepromError> {
        (**self).read(offset, buf)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        (**self).write(offset, data)
    }
}

/// RAM backed storage, starting erased (all bits set).
pub struct MemoryEeprom<const N: usize> {
    data: [u8; N],
    writes: usize,
}

impl<const N: usize> MemoryEeprom<N> {
    pub const fn new() -> Self {
        Self {
            data: [0xFF; N],
            writes: 0,
        }
    }

    /// Number of write operations performed so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn range(offset: usize, len: usize) -> Result<core::ops::Range<usize>, EepromError> {
        match offset.checked_add(len) {
            Some(end) if end <= N => Ok(offset..end),
            _ => Err(EepromError::OutOfRange { offset, len }),
        }
    }
}

impl<const N: usize> Default for MemoryEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Eeprom for MemoryEeprom<N> {
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), EepromError> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        let range = Self::range(offset, data.len())?;
        self.data[range].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct KeymapConfig: u16 {
        const SWAP_CONTROL_CAPSLOCK = 1 << 0;
        const CAPSLOCK_TO_CONTROL = 1 << 1;
        const SWAP_LALT_LGUI = 1 << 2;
        const SWAP_RALT_RGUI = 1 << 3;
        const NO_GUI = 1 << 4;
        const SWAP_GRAVE_ESC = 1 << 5;
        const SWAP_BACKSLASH_BACKSPACE = 1 << 6;
        const NKRO = 1 << 7;
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BacklightConfig {
    pub enable: bool,
    pub level: u8,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioConfig {
    pub enable: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { enable: true }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EeconfigRecord {
    magic: u16,
    pub default_layer: u32,
    keymap: u16,
    pub backlight: BacklightConfig,
    pub audio: AudioConfig,
}

impl EeconfigRecord {
    pub fn keymap(&self) -> KeymapConfig {
        KeymapConfig::from_bits_truncate(self.keymap)
    }

    pub fn set_keymap(&mut self, keymap: KeymapConfig) {
        self.keymap = keymap.bits();
    }
}

impl Default for EeconfigRecord {
    fn default() -> Self {
        Self {
            magic: EECONFIG_MAGIC,
            default_layer: 1,
            keymap: KeymapConfig::empty().bits(),
            backlight: BacklightConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

/// Accessor for the configuration record stored in an [`Eeprom`].
pub struct Eeconfig<E: Eeprom> {
    eeprom: E,
}

impl<E: Eeprom> Eeconfig<E> {
    pub const fn new(eeprom: E) -> Self {
        Self { eeprom }
    }

    pub fn eeprom(&self) -> &E {
        &self.eeprom
    }

    fn crc16(buf: &[u8]) -> u16 {
        let crc = EECONFIG_CRC.checksum(buf);
        dev_trace!("CRC for {:x?} = {:x}", buf, crc);
        crc
    }

    pub fn is_enabled(&self) -> bool {
        self.read().is_ok()
    }

    /// Writes the default record.
    pub fn init(&mut self) -> Result<(), EeconfigError> {
        dev_info!("Initializing persistent config");
        self.write(&EeconfigRecord::default())
    }

    /// Invalidates the stored record, so the next boot starts from the
    /// defaults.
    pub fn disable(&mut self) -> Result<(), EeconfigError> {
        self.eeprom.write(0, &[0u8; EECONFIG_SIZE])?;
        Ok(())
    }

    pub fn read(&self) -> Result<EeconfigRecord, EeconfigError> {
        let mut buf = [0u8; EECONFIG_SIZE];
        self.eeprom.read(0, &mut buf)?;

        let crc = u16::from_le_bytes([buf[0], buf[1]]);
        let record_bytes = &buf[2..];
        let (record, read_bytes) = ssmarshal::deserialize::<EeconfigRecord>(record_bytes)
            .map_err(|_| EeconfigError::Decode)?;

        if crc != Self::crc16(&record_bytes[0..read_bytes]) {
            dev_debug!("Config record CRC mismatch");
            return Err(EeconfigError::Checksum);
        }

        if record.magic != EECONFIG_MAGIC {
            return Err(EeconfigError::BadMagic);
        }

        Ok(record)
    }

    pub fn write(&mut self, record: &EeconfigRecord) -> Result<(), EeconfigError> {
        let mut buf = [0u8; EECONFIG_SIZE];
        let encoded_len =
            ssmarshal::serialize(&mut buf[2..], record).map_err(|_| EeconfigError::Encode)?;
        let crc = Self::crc16(&buf[2..2 + encoded_len]);
        buf[0..2].copy_from_slice(&crc.to_le_bytes());
        self.eeprom.write(0, &buf[0..2 + encoded_len])?;
        Ok(())
    }

    fn update(&mut self, f: impl FnOnce(&mut EeconfigRecord)) -> Result<(), EeconfigError> {
        let mut record = match self.read() {
            Ok(r) => r,
            Err(e) => {
                dev_warn!("Persistent config unreadable ({}). Starting from defaults", e);
                EeconfigRecord::default()
            }
        };
        f(&mut record);
        self.write(&record)
    }

    pub fn read_keymap(&self) -> Result<KeymapConfig, EeconfigError> {
        self.read().map(|r| r.keymap())
    }

    pub fn update_keymap(&mut self, keymap: KeymapConfig) -> Result<(), EeconfigError> {
        self.update(|r| r.set_keymap(keymap))
    }

    pub fn update_default_layer(&mut self, mask: u32) -> Result<(), EeconfigError> {
        self.update(|r| r.default_layer = mask)
    }

    pub fn update_backlight(&mut self, backlight: BacklightConfig) -> Result<(), EeconfigError> {
        self.update(|r| r.backlight = backlight)
    }

    pub fn update_audio(&mut self, audio: AudioConfig) -> Result<(), EeconfigError> {
        self.update(|r| r.audio = audio)
    }
}
