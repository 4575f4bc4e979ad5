//! The binary alphabet used on every channel of the system.
//!
//! All observations, rewards, and actions are communicated as sequences of
//! [`Symbol`]s; the wire format is one ASCII `'0'`/`'1'` character per symbol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single bit on the agent/environment channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Off,
    On,
}

impl Symbol {
    /// Index into per-symbol count tables (`Off` = 0, `On` = 1).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Symbol::Off => 0,
            Symbol::On => 1,
        }
    }

    /// The opposite symbol.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Symbol::Off => Symbol::On,
            Symbol::On => Symbol::Off,
        }
    }

    /// Build a symbol from a boolean bit value.
    #[inline]
    pub fn from_bit(set: bool) -> Self {
        if set {
            Symbol::On
        } else {
            Symbol::Off
        }
    }

    /// Parse one wire character. Only `'0'` and `'1'` are valid.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Symbol::Off),
            '1' => Some(Symbol::On),
            _ => None,
        }
    }

    /// The wire character for this symbol.
    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Symbol::Off => '0',
            Symbol::On => '1',
        }
    }

    #[inline]
    pub fn is_on(self) -> bool {
        self == Symbol::On
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Render a symbol block in wire format, MSB first.
pub fn symbols_to_string(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.as_char()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_flip() {
        assert_eq!(Symbol::Off.index(), 0);
        assert_eq!(Symbol::On.index(), 1);
        assert_eq!(Symbol::Off.flip(), Symbol::On);
        assert_eq!(Symbol::On.flip(), Symbol::Off);
    }

    #[test]
    fn wire_round_trip() {
        assert_eq!(Symbol::from_char('0'), Some(Symbol::Off));
        assert_eq!(Symbol::from_char('1'), Some(Symbol::On));
        assert_eq!(Symbol::from_char('x'), None);
        assert_eq!(Symbol::On.as_char(), '1');
    }

    #[test]
    fn block_formatting() {
        let block = [Symbol::On, Symbol::Off, Symbol::On];
        assert_eq!(symbols_to_string(&block), "101");
        assert_eq!(symbols_to_string(&[]), "");
    }

    #[test]
    fn from_bit() {
        assert_eq!(Symbol::from_bit(true), Symbol::On);
        assert_eq!(Symbol::from_bit(false), Symbol::Off);
    }
}
