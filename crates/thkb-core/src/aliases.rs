/// Resolves the prefixed key aliases understood by every layout:
///
/// - `c:` media keys, sent through the consumer page.
/// - `m:` mouse buttons and movement.
/// - `f:` keys handled by the firmware itself.
///
/// Boards usually define their own resolver for `u:` aliases and forward
/// anything else here.
#[macro_export]
macro_rules! default_key_from_alias {
    (c:Ply) => { $crate::keycode::Keycode::Consumer($crate::keycode::ConsumerKey::PlayPause) };
    (c:Rwd) => { $crate::keycode::Keycode::Consumer($crate::keycode::ConsumerKey::Rewind) };
    (c:Ffd) => { $crate::keycode::Keycode::Consumer($crate::keycode::ConsumerKey::FastForward) };
    (c:Nxt) => { $crate::keycode::Keycode::Consumer($crate::keycode::ConsumerKey::NextTrack) };
    (c:Prv) => { $crate::keycode::Keycode::Consumer($crate::keycode::ConsumerKey::PrevTrack) };
    (c:Stp) => { $crate::keycode::Keycode::Consumer($crate::keycode::ConsumerKey::Stop) };
    (c:Mute) => { $crate::keycode::Keycode::Consumer($crate::keycode::ConsumerKey::Mute) };
    (c:VUp) => { $crate::keycode::Keycode::Consumer($crate::keycode::ConsumerKey::VolumeUp) };
    (c:VDn) => { $crate::keycode::Keycode::Consumer($crate::keycode::ConsumerKey::VolumeDown) };

    (m:Btn1) => { $crate::keycode::Keycode::Mouse($crate::keycode::MouseKey::Button1) };
    (m:Btn2) => { $crate::keycode::Keycode::Mouse($crate::keycode::MouseKey::Button2) };
    (m:Btn3) => { $crate::keycode::Keycode::Mouse($crate::keycode::MouseKey::Button3) };
    (m:Up) => { $crate::keycode::Keycode::Mouse($crate::keycode::MouseKey::Up) };
    (m:Down) => { $crate::keycode::Keycode::Mouse($crate::keycode::MouseKey::Down) };
    (m:Left) => { $crate::keycode::Keycode::Mouse($crate::keycode::MouseKey::Left) };
    (m:Right) => { $crate::keycode::Keycode::Mouse($crate::keycode::MouseKey::Right) };
    (m:WhUp) => { $crate::keycode::Keycode::Mouse($crate::keycode::MouseKey::WheelUp) };
    (m:WhDn) => { $crate::keycode::Keycode::Mouse($crate::keycode::MouseKey::WheelDown) };

    (f:Reset) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::Reset) };
    (f:AuOn) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::AudioOn) };
    (f:AuOff) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::AudioOff) };
    (f:MuOn) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::MusicOn) };
    (f:MuOff) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::MusicOff) };
    (f:MuMod) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::MusicMode) };
    (f:MiOn) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::MidiOn) };
    (f:MiOff) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::MidiOff) };
    (f:MuvIn) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::VoiceIncrease) };
    (f:MuvDe) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::VoiceDecrease) };
    (f:CcNorm) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::CtrlCapsNormal) };
    (f:CcSwap) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::CtrlCapsSwap) };
    (f:AgNorm) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::AltGuiNormal) };
    (f:AgSwap) => { $crate::keycode::Keycode::Firmware($crate::keycode::FirmwareKey::AltGuiSwap) };
}

#[cfg(test)]
mod tests {
    use crate::keycode::tests::TestKey;
    use crate::keycode::{ConsumerKey, FirmwareKey, Keycode, MouseKey};

    #[test]
    fn test_resolves_each_family() {
        let k: Keycode<TestKey> = default_key_from_alias!(c:VDn);
        assert_eq!(k, Keycode::Consumer(ConsumerKey::VolumeDown));
        let k: Keycode<TestKey> = default_key_from_alias!(m:Btn2);
        assert_eq!(k, Keycode::Mouse(MouseKey::Button2));
        let k: Keycode<TestKey> = default_key_from_alias!(f:MuvDe);
        assert_eq!(k, Keycode::Firmware(FirmwareKey::VoiceDecrease));
    }
}
