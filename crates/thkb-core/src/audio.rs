//! Audio cues. Only the state machine lives here, generating the actual
//! waveform is up to the board.

use thkb_common::{dev_debug, dev_info};

/// Number of selectable voices (timbres).
pub const VOICES: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Frequency in Hz. Zero is a rest.
    pub freq: f32,
    /// Length in 64ths of a whole note.
    pub duration: u8,
}

pub type Song = [Note];

pub mod notes {
    pub const REST: f32 = 0.0;
    pub const E6: f32 = 1318.51;
    pub const GS6: f32 = 1661.22;
    pub const A6: f32 = 1760.00;
    pub const E7: f32 = 2637.02;
    pub const FS7: f32 = 2959.96;
    pub const GS7: f32 = 3322.44;
}

const fn s(freq: f32) -> Note {
    Note { freq, duration: 4 }
}

const fn e(freq: f32) -> Note {
    Note { freq, duration: 8 }
}

const fn ed(freq: f32) -> Note {
    Note { freq, duration: 12 }
}

const fn q(freq: f32) -> Note {
    Note { freq, duration: 16 }
}

pub mod songs {
    use super::notes::*;
    use super::{Note, e, ed, q, s};

    pub const PLOVER: &[Note] = &[e(GS6), e(A6), s(REST), ed(E7), s(REST), ed(E7)];
    pub const PLOVER_GOODBYE: &[Note] = &[e(GS6), e(A6), s(REST), ed(E6), s(REST), ed(E6)];
    pub const QWERTY: &[Note] = &[e(GS6), e(A6), s(REST), q(E7)];
    pub const COLEMAK: &[Note] = &[e(GS6), e(A6), s(REST), ed(E7), s(REST), ed(GS7)];
    pub const DVORAK: &[Note] = &[
        e(GS6),
        e(A6),
        s(REST),
        e(E7),
        s(REST),
        e(FS7),
        s(REST),
        e(E7),
    ];
}

/// Note mapping used by music mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MusicMap {
    #[default]
    Chromatic,
    Guitar,
    Violin,
    Major,
}

impl MusicMap {
    pub const fn next(self) -> Self {
        match self {
            MusicMap::Chromatic => MusicMap::Guitar,
            MusicMap::Guitar => MusicMap::Violin,
            MusicMap::Violin => MusicMap::Major,
            MusicMap::Major => MusicMap::Chromatic,
        }
    }
}

#[derive(Debug)]
pub struct Audio {
    enabled: bool,
    current: Option<&'static Song>,
    music: bool,
    music_map: MusicMap,
    midi: bool,
    voice: u8,
}

impl Audio {
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            current: None,
            music: false,
            music_map: MusicMap::Chromatic,
            midi: false,
            voice: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.stop_all_notes();
        }
        self.enabled = enabled;
        dev_info!("Audio {}", if enabled { "on" } else { "off" });
    }

    /// Starts playing a song, replacing the current one. Ignored while
    /// audio is off.
    pub fn play_song(&mut self, song: &'static Song) {
        if !self.enabled {
            dev_debug!("Audio disabled, not playing song");
            return;
        }
        dev_debug!("Playing song of {} notes", song.len());
        self.current = Some(song);
    }

    pub fn stop_all_notes(&mut self) {
        self.current = None;
    }

    pub fn current_song(&self) -> Option<&'static Song> {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    pub fn set_music(&mut self, on: bool) {
        self.music = on;
    }

    pub fn music(&self) -> bool {
        self.music
    }

    pub fn next_music_map(&mut self) -> MusicMap {
        self.music_map = self.music_map.next();
        self.music_map
    }

    pub fn music_map(&self) -> MusicMap {
        self.music_map
    }

    pub fn set_midi(&mut self, on: bool) {
        self.midi = on;
    }

    pub fn midi(&self) -> bool {
        self.midi
    }

    pub fn voice_increase(&mut self) -> u8 {
        self.voice = (self.voice + 1) % VOICES;
        self.voice
    }

    pub fn voice_decrease(&mut self) -> u8 {
        self.voice = (self.voice + VOICES - 1) % VOICES;
        self.voice
    }

    pub fn voice(&self) -> u8 {
        self.voice
    }
}
