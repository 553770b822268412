//! Per-line lexer state
//!
//! Each line persists one integer so lexing can resume at any line start.
//! The lexers work with the typed forms below and convert at the
//! boundary; the packed layouts match what editors already store.

/// Declaration context of the Haskell lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HaskellMode {
    #[default]
    Default,
    /// After `import`, expecting `qualified`/`safe` or a module name
    Import1,
    /// After the imported module name, expecting `as` or `hiding`
    Import2,
    /// After `as`, expecting the alias
    Import3,
    /// After `module`
    Module,
    /// Inside a `foreign` declaration
    Ffi,
    /// After `type` or `data`
    Type,
}

impl HaskellMode {
    fn bits(self) -> i32 {
        match self {
            HaskellMode::Default => 0,
            HaskellMode::Import1 => 1,
            HaskellMode::Import2 => 2,
            HaskellMode::Import3 => 3,
            HaskellMode::Module => 4,
            HaskellMode::Ffi => 5,
            HaskellMode::Type => 6,
        }
    }

    fn from_bits(bits: i32) -> Self {
        match bits {
            1 => HaskellMode::Import1,
            2 => HaskellMode::Import2,
            3 => HaskellMode::Import3,
            4 => HaskellMode::Module,
            5 => HaskellMode::Ffi,
            6 => HaskellMode::Type,
            _ => HaskellMode::Default,
        }
    }
}

/// Haskell line state: mode plus block comment depth
///
/// Packed as `(nest_depth << 3) | mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HaskellLineState {
    pub mode: HaskellMode,
    pub nest_depth: u32,
}

impl HaskellLineState {
    pub fn from_raw(raw: i32) -> Self {
        Self {
            mode: HaskellMode::from_bits(raw & 0x7),
            nest_depth: u32::try_from(raw >> 3).unwrap_or(0),
        }
    }

    pub fn to_raw(self) -> i32 {
        let depth = i32::try_from(self.nest_depth).unwrap_or(i32::MAX >> 3);
        (depth << 3) | self.mode.bits()
    }
}

/// Closing delimiter of an open R raw string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDelimiter {
    /// Closing bracket: `)`, `]` or `}`
    pub close: u8,
    /// Dashes between the bracket and the quote
    pub dashes: u32,
}

/// R line state: the raw string delimiter still open at line end
///
/// Packed as `close | dashes << 8`, zero when no raw string is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RLineState {
    pub raw: Option<RawDelimiter>,
}

impl RLineState {
    pub fn from_raw(raw: i32) -> Self {
        let close = (raw & 0xFF) as u8;
        if close == 0 {
            return Self::default();
        }
        Self {
            raw: Some(RawDelimiter {
                close,
                dashes: u32::try_from(raw >> 8).unwrap_or(0),
            }),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self.raw {
            None => 0,
            Some(delim) => {
                let dashes = i32::try_from(delim.dashes).unwrap_or(0);
                i32::from(delim.close) | (dashes << 8)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haskell_layout() {
        let state = HaskellLineState {
            mode: HaskellMode::Import2,
            nest_depth: 3,
        };
        assert_eq!(state.to_raw(), (3 << 3) | 2);
        assert_eq!(HaskellLineState::from_raw(state.to_raw()), state);
        assert_eq!(HaskellLineState::from_raw(0), HaskellLineState::default());
    }

    #[test]
    fn test_haskell_unknown_mode_is_default() {
        let state = HaskellLineState::from_raw(7 | (1 << 3));
        assert_eq!(state.mode, HaskellMode::Default);
        assert_eq!(state.nest_depth, 1);
    }

    #[test]
    fn test_r_layout() {
        let state = RLineState {
            raw: Some(RawDelimiter {
                close: b')',
                dashes: 3,
            }),
        };
        assert_eq!(state.to_raw(), i32::from(b')') | (3 << 8));
        assert_eq!(RLineState::from_raw(state.to_raw()), state);
        assert_eq!(RLineState::from_raw(0).raw, None);
        assert_eq!(RLineState::default().to_raw(), 0);
    }
}
