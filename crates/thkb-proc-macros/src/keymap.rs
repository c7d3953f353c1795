use std::collections::HashMap;

use proc_macro2::{Ident, Span, TokenStream};
use quote::{ToTokens, quote};

use crate::{KeyRef, thkb_core_symbol};

/// A HID keyboard usage, plus whether it has to be sent along with shift to
/// produce the intended symbol.
#[derive(Debug, Clone, Copy)]
struct StdKey {
    usage: &'static str,
    shifted: bool,
}

const fn plain(usage: &'static str) -> StdKey {
    StdKey {
        usage,
        shifted: false,
    }
}

const fn shifted(usage: &'static str) -> StdKey {
    StdKey {
        usage,
        shifted: true,
    }
}

#[allow(non_snake_case)]
fn build_usb_keyboard_usage_ref<A: ToTokens>(key: A) -> TokenStream {
    let KeyboardUsage = thkb_core_symbol("keycode", "KeyboardUsage");

    quote! {
        #KeyboardUsage::#key
    }
}

const LETTERS: &[(&str, &str)] = &[
    ("A", "KeyboardAa"),
    ("B", "KeyboardBb"),
    ("C", "KeyboardCc"),
    ("D", "KeyboardDd"),
    ("E", "KeyboardEe"),
    ("F", "KeyboardFf"),
    ("G", "KeyboardGg"),
    ("H", "KeyboardHh"),
    ("I", "KeyboardIi"),
    ("J", "KeyboardJj"),
    ("K", "KeyboardKk"),
    ("L", "KeyboardLl"),
    ("M", "KeyboardMm"),
    ("N", "KeyboardNn"),
    ("O", "KeyboardOo"),
    ("P", "KeyboardPp"),
    ("Q", "KeyboardQq"),
    ("R", "KeyboardRr"),
    ("S", "KeyboardSs"),
    ("T", "KeyboardTt"),
    ("U", "KeyboardUu"),
    ("V", "KeyboardVv"),
    ("W", "KeyboardWw"),
    ("X", "KeyboardXx"),
    ("Y", "KeyboardYy"),
    ("Z", "KeyboardZz"),
];

// Digits, with the symbol each one produces when shifted.
const DIGITS: &[(u32, char, &str)] = &[
    (1, '!', "Keyboard1Exclamation"),
    (2, '@', "Keyboard2At"),
    (3, '#', "Keyboard3Hash"),
    (4, '$', "Keyboard4Dollar"),
    (5, '%', "Keyboard5Percent"),
    (6, '^', "Keyboard6Caret"),
    (7, '&', "Keyboard7Ampersand"),
    (8, '*', "Keyboard8Asterisk"),
    (9, '(', "Keyboard9OpenParens"),
    (0, ')', "Keyboard0CloseParens"),
];

// Punctuation keys of a US layout, unshifted and shifted symbol.
const SYMBOLS: &[(char, char, &str)] = &[
    ('-', '_', "KeyboardDashUnderscore"),
    ('=', '+', "KeyboardEqualPlus"),
    ('[', '{', "KeyboardOpenBracketBrace"),
    (']', '}', "KeyboardCloseBracketBrace"),
    ('\\', '|', "KeyboardBackslashBar"),
    (';', ':', "KeyboardSemiColon"),
    ('\'', '"', "KeyboardSingleDoubleQuote"),
    ('`', '~', "KeyboardBacktickTilde"),
    (',', '<', "KeyboardCommaLess"),
    ('.', '>', "KeyboardPeriodGreater"),
    ('/', '?', "KeyboardSlashQuestion"),
];

const NAMED: &[(&str, &str)] = &[
    ("Esc", "KeyboardEscape"),
    ("Tab", "KeyboardTab"),
    ("Bksp", "KeyboardBackspace"),
    ("Enter", "KeyboardEnter"),
    ("Spc", "KeyboardSpacebar"),
    ("Caps", "KeyboardCapsLock"),
    ("Del", "KeyboardDelete"),
    ("Insrt", "KeyboardInsert"),
    ("PrScr", "KeyboardPrintScreen"),
    ("Home", "KeyboardHome"),
    ("End", "KeyboardEnd"),
    ("PgUp", "KeyboardPageUp"),
    ("PgDn", "KeyboardPageDown"),
    ("Up", "KeyboardUpArrow"),
    ("Down", "KeyboardDownArrow"),
    ("Left", "KeyboardLeftArrow"),
    ("Right", "KeyboardRightArrow"),
    ("Pwr", "KeyboardPower"),
    ("Nuhs", "KeyboardNonUSHash"),
    ("Nubs", "KeyboardNonUSSlash"),
    ("LCtl", "KeyboardLeftControl"),
    ("LSft", "KeyboardLeftShift"),
    ("LAlt", "KeyboardLeftAlt"),
    ("LGui", "KeyboardLeftGUI"),
    ("RCtl", "KeyboardRightControl"),
    ("RSft", "KeyboardRightShift"),
    ("RAlt", "KeyboardRightAlt"),
    ("RGui", "KeyboardRightGUI"),
    ("F1", "KeyboardF1"),
    ("F2", "KeyboardF2"),
    ("F3", "KeyboardF3"),
    ("F4", "KeyboardF4"),
    ("F5", "KeyboardF5"),
    ("F6", "KeyboardF6"),
    ("F7", "KeyboardF7"),
    ("F8", "KeyboardF8"),
    ("F9", "KeyboardF9"),
    ("F10", "KeyboardF10"),
    ("F11", "KeyboardF11"),
    ("F12", "KeyboardF12"),
    ("P0", "Keypad0Insert"),
    ("P1", "Keypad1End"),
    ("P2", "Keypad2DownArrow"),
    ("P3", "Keypad3PageDown"),
    ("P4", "Keypad4LeftArrow"),
    ("P5", "Keypad5"),
    ("P6", "Keypad6RightArrow"),
    ("P7", "Keypad7Home"),
    ("P8", "Keypad8UpArrow"),
    ("P9", "Keypad9PageUp"),
    ("PDot", "KeypadPeriodDelete"),
    ("PSls", "KeypadDivide"),
    ("PAst", "KeypadMultiply"),
    ("PMns", "KeypadMinus"),
    ("PPls", "KeypadPlus"),
    ("PEnt", "KeypadEnter"),
    ("PEql", "KeypadEqual"),
    ("PCmm", "KeypadComma"),
];

// Built on first lookup, once per thread.
thread_local! {
    static KNOWN_STANDARD_KEY_ALIASES: HashMap<KeyRef, StdKey> = {
        let mut aliases = HashMap::new();

        for &(name, usage) in LETTERS.iter().chain(NAMED.iter()) {
            aliases.insert(KeyRef::ident(name), plain(usage));
        }

        for &(n, shifted_chr, usage) in DIGITS {
            aliases.insert(KeyRef::litnum(n), plain(usage));
            aliases.insert(KeyRef::litchr(char::from_digit(n, 10).unwrap_or('0')), plain(usage));
            aliases.insert(KeyRef::litchr(shifted_chr), shifted(usage));
        }

        for &(chr, shifted_chr, usage) in SYMBOLS {
            aliases.insert(KeyRef::litchr(chr), plain(usage));
            aliases.insert(KeyRef::litchr(shifted_chr), shifted(usage));
        }

        aliases
    };
}

/// The tokens of the [`KeyboardUsage`] a key reference stands for, and
/// whether shift is needed to type it. Identifiers with no known alias are
/// taken as the name of a usage without its `Keyboard` prefix.
pub fn translate_standard_key_ref_into_hid_key(key: &KeyRef) -> (TokenStream, bool) {
    let known = KNOWN_STANDARD_KEY_ALIASES.with(|map| map.get(key).copied());

    match known {
        Some(std_key) => (
            build_usb_keyboard_usage_ref(Ident::new(std_key.usage, Span::call_site())),
            std_key.shifted,
        ),
        None => (
            build_usb_keyboard_usage_ref(Ident::new(
                &format!("Keyboard{}", &key.to_string()),
                Span::call_site(),
            )),
            false,
        ),
    }
}

/// Whether a key reference can be translated without falling back to a
/// raw usage name. Literals must always be known.
pub fn is_known_key_ref(key: &KeyRef) -> bool {
    KNOWN_STANDARD_KEY_ALIASES.with(|map| map.contains_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(key: &KeyRef) -> (String, bool) {
        let (tokens, shifted) = translate_standard_key_ref_into_hid_key(key);
        (tokens.to_string().replace(' ', ""), shifted)
    }

    #[test]
    fn test_letters_and_digits() {
        assert_eq!(
            usage(&KeyRef::ident("Q")),
            ("::thkb_core::keycode::KeyboardUsage::KeyboardQq".to_string(), false)
        );
        assert_eq!(
            usage(&KeyRef::litnum(0)),
            ("::thkb_core::keycode::KeyboardUsage::Keyboard0CloseParens".to_string(), false)
        );
    }

    #[test]
    fn test_shifted_symbols() {
        assert_eq!(
            usage(&KeyRef::litchr('(')),
            ("::thkb_core::keycode::KeyboardUsage::Keyboard9OpenParens".to_string(), true)
        );
        assert_eq!(
            usage(&KeyRef::litchr('{')),
            ("::thkb_core::keycode::KeyboardUsage::KeyboardOpenBracketBrace".to_string(), true)
        );
        assert_eq!(
            usage(&KeyRef::litchr('[')),
            ("::thkb_core::keycode::KeyboardUsage::KeyboardOpenBracketBrace".to_string(), false)
        );
    }

    #[test]
    fn test_unknown_ident_falls_back_to_usage_name() {
        assert!(!is_known_key_ref(&KeyRef::ident("Application")));
        assert_eq!(
            usage(&KeyRef::ident("Application")),
            ("::thkb_core::keycode::KeyboardUsage::KeyboardApplication".to_string(), false)
        );
    }

    #[test]
    fn test_keypad_aliases() {
        assert_eq!(
            usage(&KeyRef::ident("PEnt")).0,
            "::thkb_core::keycode::KeyboardUsage::KeypadEnter"
        );
        assert_eq!(
            usage(&KeyRef::ident("P7")).0,
            "::thkb_core::keycode::KeyboardUsage::Keypad7Home"
        );
    }
}
