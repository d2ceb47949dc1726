//! WinKeyer ASCII to morse pattern table
//!
//! Covers 0x20 (space) through 0x5D (`]`). Prosigns follow the K1EL WK3
//! datasheet; an empty pattern means the character is not sent.

/// First byte interpreted as morse text
pub const TEXT_MIN: u8 = 0x20;
/// Last byte interpreted as morse text
pub const TEXT_MAX: u8 = 0x5D;

/// Word space: seven silent units before the inter-character gap
pub const WORD_SPACE: &str = "       ";

static MORSE_TABLE: [&str; (TEXT_MAX - TEXT_MIN + 1) as usize] = [
    WORD_SPACE, // SPC
    "",         // !
    ".-..-.",   // "  RR
    "",         // #
    "...-..-",  // $  SX
    "",         // %
    "",         // &
    ".----.",   // '  WG
    "-.--.",    // (  KN
    "-.--.-",   // )  KK
    "",         // *
    ".-.-.",    // +  AR
    "--..--",   // ,
    "-....-",   // -
    ".-.-.-",   // .
    ".--.-",    // /
    "-----",    // 0
    ".----",    // 1
    "..---",    // 2
    "...--",    // 3
    "....-",    // 4
    ".....",    // 5
    "-....",    // 6
    "--...",    // 7
    "---..",    // 8
    "----.",    // 9
    "-.--.",    // :  KN
    ".-.-",     // ;  AA
    ".-.-.",    // <  AR
    "-...-",    // =  BT
    "...-.-",   // >  SK
    "..--..",   // ?
    ".--.-.",   // @  AC
    ".-",       // A
    "-...",     // B
    "-.-.",     // C
    "-..",      // D
    ".",        // E
    "..-.",     // F
    "--.",      // G
    "....",     // H
    "..",       // I
    ".---",     // J
    "-.-",      // K
    ".-..",     // L
    "--",       // M
    "-.",       // N
    "---",      // O
    ".--.",     // P
    "--.-",     // Q
    ".-.",      // R
    "...",      // S
    "-",        // T
    "..-",      // U
    "...-",     // V
    ".--",      // W
    "-..-",     // X
    "-.--",     // Y
    "--..",     // Z
    ".-...",    // [  AS
    "-..-.",    // \  DN
    "-.--.",    // ]  KN
];

/// Returns true for bytes in the text range
pub const fn is_text(byte: u8) -> bool {
    byte >= TEXT_MIN && byte <= TEXT_MAX
}

/// Pattern for an already upper-cased byte, `None` outside the text range
pub fn pattern_for(byte: u8) -> Option<&'static str> {
    if is_text(byte) {
        Some(MORSE_TABLE[(byte - TEXT_MIN) as usize])
    } else {
        None
    }
}
