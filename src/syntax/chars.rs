//! Character classification shared by the lexers
//!
//! All predicates take a decoded code point. Anything outside ASCII is
//! treated as "other" so multi-byte characters never start or continue a
//! token by accident.

/// Convert a code point to an ASCII byte if it is one
#[inline]
pub fn ascii(ch: u32) -> Option<u8> {
    u8::try_from(ch).ok().filter(u8::is_ascii)
}

#[inline]
pub fn is_digit(ch: u32) -> bool {
    ascii(ch).is_some_and(|b| b.is_ascii_digit())
}

/// Digit valid in `base` (2..=36)
pub fn is_digit_in_base(ch: u32, base: u32) -> bool {
    char::from_u32(ch)
        .filter(char::is_ascii)
        .is_some_and(|c| c.is_digit(base))
}

#[inline]
pub fn is_hex_digit(ch: u32) -> bool {
    ascii(ch).is_some_and(|b| b.is_ascii_hexdigit())
}

#[inline]
pub fn is_upper(ch: u32) -> bool {
    ascii(ch).is_some_and(|b| b.is_ascii_uppercase())
}

#[inline]
pub fn is_lower(ch: u32) -> bool {
    ascii(ch).is_some_and(|b| b.is_ascii_lowercase())
}

#[inline]
pub fn is_alphanumeric(ch: u32) -> bool {
    ascii(ch).is_some_and(|b| b.is_ascii_alphanumeric())
}

/// Space, tab or line terminator
#[inline]
pub fn is_space(ch: u32) -> bool {
    matches!(ch, 0x20 | 0x09..=0x0D)
}

/// Whether `ch` is one of the ASCII bytes in `set`
#[inline]
pub fn any_of(ch: u32, set: &[u8]) -> bool {
    ascii(ch).is_some_and(|b| set.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits() {
        assert!(is_digit('7' as u32));
        assert!(!is_digit('a' as u32));
        assert!(is_digit_in_base('f' as u32, 16));
        assert!(!is_digit_in_base('8' as u32, 8));
        assert!(is_hex_digit('F' as u32));
        assert!(!is_digit_in_base('٣' as u32, 10));
    }

    #[test]
    fn test_non_ascii_is_other() {
        assert!(!is_upper('É' as u32));
        assert!(!is_alphanumeric('é' as u32));
        assert!(!any_of(0x1F600, b"(){}"));
        assert!(any_of('{' as u32, b"(){}"));
    }

    #[test]
    fn test_space() {
        assert!(is_space(' ' as u32));
        assert!(is_space('\r' as u32));
        assert!(!is_space('x' as u32));
    }
}
