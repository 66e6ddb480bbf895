//! User adjustable password parameters.

use crate::config::{DEFAULT_COMPLEXITY, DEFAULT_PASSWORD_LEN, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};

/// Character set the host should build the password from
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Complexity {
    Numbers = 0,
    Lowercase = 1,
    Uppercase = 2,
    Letters = 3,
    Alphanumeric = 4,
    AllSymbols = 5,
}

impl Complexity {
    pub const ALL: [Complexity; 6] = [
        Complexity::Numbers,
        Complexity::Lowercase,
        Complexity::Uppercase,
        Complexity::Letters,
        Complexity::Alphanumeric,
        Complexity::AllSymbols,
    ];

    /// Wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// `None` for anything outside `0..=5`.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    /// Position in `ALL`.
    pub fn index(self) -> usize {
        usize::from(self.as_u8())
    }

    /// Wraps past either end.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn prev(self) -> Self {
        Self::from_index(self.index() + Self::ALL.len() - 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            Complexity::Numbers => "Numbers",
            Complexity::Lowercase => "Lowercase",
            Complexity::Uppercase => "Uppercase",
            Complexity::Letters => "Letters",
            Complexity::Alphanumeric => "Alphanumeric",
            Complexity::AllSymbols => "All symbols",
        }
    }

    /// Character set in a form that fits one panel row.
    pub fn summary(self) -> &'static str {
        match self {
            Complexity::Numbers => "0-9",
            Complexity::Lowercase => "a-z",
            Complexity::Uppercase => "A-Z",
            Complexity::Letters => "A-Z a-z",
            Complexity::Alphanumeric => "A-Z a-z 0-9",
            Complexity::AllSymbols => "A-Z a-z 0-9 !@#",
        }
    }

    pub fn alphabet(self) -> &'static str {
        const DIGITS: &str = "0123456789";
        const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
        const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        const LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
        const ALNUM: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const ALL: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789\
                           !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ ";

        match self {
            Complexity::Numbers => DIGITS,
            Complexity::Lowercase => LOWER,
            Complexity::Uppercase => UPPER,
            Complexity::Letters => LETTERS,
            Complexity::Alphanumeric => ALNUM,
            Complexity::AllSymbols => ALL,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Settings {
    password_len: u8,
    pub complexity: Complexity,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            password_len: DEFAULT_PASSWORD_LEN,
            complexity: DEFAULT_COMPLEXITY,
        }
    }
}

impl Settings {
    /// Out of range lengths are clamped.
    pub fn new(password_len: u8, complexity: Complexity) -> Self {
        Settings {
            password_len: password_len.clamp(MIN_PASSWORD_LEN, MAX_PASSWORD_LEN),
            complexity,
        }
    }

    pub fn password_len(&self) -> u8 {
        self.password_len
    }

    pub fn increment_len(&mut self) {
        self.password_len = (self.password_len + 1).min(MAX_PASSWORD_LEN);
    }

    pub fn decrement_len(&mut self) {
        self.password_len = (self.password_len - 1).max(MIN_PASSWORD_LEN);
    }
}
