// File: src/core/hieroglyph.rs

/// A cosmetic, reversible re-encoding of generated text.
pub trait Stylizer: Send + Sync {
    fn apply(&self, text: &str) -> String;
    fn revert(&self, text: &str) -> String;
}

/// Glyphs for 'a'..='z', roughly following the uniliteral sign list.
const LOWER: [char; 26] = [
    '\u{1313F}', // a  vulture
    '\u{130C0}', // b  foot
    '\u{1337F}', // c  tethering rope
    '\u{130A7}', // d  hand
    '\u{131CB}', // e  reed
    '\u{13191}', // f  horned viper
    '\u{133BC}', // g  jar stand
    '\u{13254}', // h  shelter
    '\u{131CC}', // i  double reed
    '\u{13193}', // j  cobra
    '\u{133A1}', // k  basket
    '\u{130ED}', // l  lion
    '\u{13153}', // m  owl
    '\u{13216}', // n  water
    '\u{1336F}', // o  lasso
    '\u{132AA}', // p  stool
    '\u{1320E}', // q  hill slope
    '\u{1308B}', // r  mouth
    '\u{132F4}', // s  folded cloth
    '\u{133CF}', // t  bread
    '\u{13171}', // u  quail chick
    '\u{131AF}', // v
    '\u{13143}', // w  falcon
    '\u{1340D}', // x  placenta
    '\u{133ED}', // y  two strokes
    '\u{132C3}', // z  door bolt
];

/// 'A'..='Z' map onto the seated-figure signs at the start of the block,
/// which the lowercase table never uses.
const UPPER_BASE: u32 = 0x13000;

/// Transliterates ASCII letters to Egyptian hieroglyphs and back.
/// Everything that is not an ASCII letter passes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hieroglyphs;

impl Hieroglyphs {
    pub fn new() -> Self {
        Self
    }

    fn encode(c: char) -> char {
        match c {
            'a'..='z' => LOWER[(c as u8 - b'a') as usize],
            'A'..='Z' => char::from_u32(UPPER_BASE + (c as u8 - b'A') as u32).unwrap_or(c),
            _ => c,
        }
    }

    fn decode(c: char) -> char {
        if let Some(i) = LOWER.iter().position(|&g| g == c) {
            return (b'a' + i as u8) as char;
        }
        let code = c as u32;
        if (UPPER_BASE..UPPER_BASE + 26).contains(&code) {
            return (b'A' + (code - UPPER_BASE) as u8) as char;
        }
        c
    }
}

impl Stylizer for Hieroglyphs {
    fn apply(&self, text: &str) -> String {
        text.chars().map(Self::encode).collect()
    }

    fn revert(&self, text: &str) -> String {
        text.chars().map(Self::decode).collect()
    }
}

/// Shorthand for `Hieroglyphs.apply`.
pub fn to_hieroglyphs(text: &str) -> String {
    Hieroglyphs.apply(text)
}

/// Shorthand for `Hieroglyphs.revert`.
pub fn back_to_alphabet(text: &str) -> String {
    Hieroglyphs.revert(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn glyph_tables_do_not_collide() {
        let mut seen: HashSet<char> = LOWER.iter().copied().collect();
        assert_eq!(seen.len(), 26);
        for i in 0..26 {
            assert!(seen.insert(char::from_u32(UPPER_BASE + i).unwrap()));
        }
    }

    #[test]
    fn round_trips_mixed_text() {
        let text = "Hello World, 42 cats & a Zebra!";
        let encoded = to_hieroglyphs(text);
        assert!(!encoded.chars().any(|c| c.is_ascii_alphabetic()));
        assert!(encoded.contains(", 42 "));
        assert_eq!(back_to_alphabet(&encoded), text);
    }

    #[test]
    fn leaves_non_letters_alone() {
        assert_eq!(to_hieroglyphs("123 ?!"), "123 ?!");
        assert_eq!(back_to_alphabet("plain"), "plain");
    }
}
