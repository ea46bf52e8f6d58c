//! Fixed symbol alphabet and its index codec.
//!
//! The agent reads and emits single characters. Every character the harness
//! may send or expect back belongs to an [`Alphabet`], which assigns it a
//! dense index in `[0, V)`. The policy network only ever sees those indices.

use std::collections::HashMap;
use std::fmt;

/// Letters, digits, space and the punctuation set `,.!;?-`.
pub const DEFAULT_SYMBOLS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 ,.!;?-";

/// Returned by [`Alphabet::encode`] for a character outside the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownSymbolError {
    /// The rejected character.
    pub symbol: char,
}

impl fmt::Display for UnknownSymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "symbol {:?} is not part of the alphabet", self.symbol)
    }
}

impl std::error::Error for UnknownSymbolError {}

/// Errors raised while building an alphabet or decoding an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlphabetError {
    /// An alphabet needs at least one symbol.
    Empty,
    /// Each symbol may appear only once.
    DuplicateSymbol { symbol: char },
    /// Decoded index is not in `[0, len)`.
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for AlphabetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlphabetError::Empty => write!(f, "alphabet must contain at least one symbol"),
            AlphabetError::DuplicateSymbol { symbol } => {
                write!(f, "symbol {:?} appears more than once in the alphabet", symbol)
            }
            AlphabetError::IndexOutOfRange { index, len } => {
                write!(f, "index {} is out of range for an alphabet of {} symbols", index, len)
            }
        }
    }
}

impl std::error::Error for AlphabetError {}

/// Immutable bidirectional mapping between symbols and indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Alphabet {
    symbols: Vec<char>,
    indices: HashMap<char, usize>,
}

impl Alphabet {
    /// Build an alphabet from an ordered symbol string.
    ///
    /// Symbol order defines the index assignment.
    pub fn new(symbols: &str) -> Result<Self, AlphabetError> {
        let symbols: Vec<char> = symbols.chars().collect();
        if symbols.is_empty() {
            return Err(AlphabetError::Empty);
        }

        let mut indices = HashMap::with_capacity(symbols.len());
        for (i, &symbol) in symbols.iter().enumerate() {
            if indices.insert(symbol, i).is_some() {
                return Err(AlphabetError::DuplicateSymbol { symbol });
            }
        }

        Ok(Self { symbols, indices })
    }

    /// Number of symbols (the vocabulary size V).
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a constructed alphabet; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Whether `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.indices.contains_key(&symbol)
    }

    /// Map a symbol to its index.
    pub fn encode(&self, symbol: char) -> Result<usize, UnknownSymbolError> {
        self.indices
            .get(&symbol)
            .copied()
            .ok_or(UnknownSymbolError { symbol })
    }

    /// Map an index back to its symbol.
    pub fn decode(&self, index: usize) -> Result<char, AlphabetError> {
        self.symbols
            .get(index)
            .copied()
            .ok_or(AlphabetError::IndexOutOfRange {
                index,
                len: self.symbols.len(),
            })
    }

    /// Symbol at `index`, wrapping around the alphabet length.
    pub fn cycle(&self, index: usize) -> char {
        self.symbols[index % self.symbols.len()]
    }

    /// Symbols in index order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        let symbols: Vec<char> = DEFAULT_SYMBOLS.chars().collect();
        let indices = symbols.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        Self { symbols, indices }
    }
}
