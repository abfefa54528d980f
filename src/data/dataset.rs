//! Sequence encoding
//!
//! Raw sequences are mapped onto integer symbols in `[0, symbol_size)` once,
//! before any kernel is computed. The resulting [`Dataset`] is immutable and
//! shared by every per-length kernel engine.
//!
//! Example:
//! ```rust
//! use rssk::data::Dataset;
//!
//! let mut dataset = Dataset::new(10, 255);
//! dataset.load_strings(&["cat", "car"]).unwrap();
//! assert_eq!(dataset.len(), 2);
//! assert_eq!(dataset.get(0).symbols(), &[99, 97, 116]);
//! ```

use crate::core::{KernelError, Result, SymbolEncoding};
use std::collections::HashMap;

/// Index of a symbol in the alphabet
pub type Symbol = u32;

/// A sequence after encoding, never longer than the dataset's `max_length`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence {
    symbols: Box<[Symbol]>,
}

impl EncodedSequence {
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Character to symbol assignment for [`SymbolEncoding::Compact`]
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<char, Symbol>,
}

impl SymbolTable {
    /// Symbol of `c`, assigning the next free index on first sight
    fn intern(&mut self, c: char, symbol_size: usize) -> Option<Symbol> {
        if let Some(&symbol) = self.symbols.get(&c) {
            return Some(symbol);
        }
        let next = self.symbols.len();
        if next >= symbol_size {
            return None;
        }
        self.symbols.insert(c, next as Symbol);
        Some(next as Symbol)
    }

    /// Symbol assigned to `c`, if seen
    pub fn get(&self, c: char) -> Option<Symbol> {
        self.symbols.get(&c).copied()
    }

    /// Number of distinct characters seen
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Ordered collection of encoded sequences sharing one alphabet
#[derive(Debug, Clone)]
pub struct Dataset {
    max_length: usize,
    symbol_size: usize,
    encoding: SymbolEncoding,
    sequences: Vec<EncodedSequence>,
    table: SymbolTable,
    /// Loaded from caller-supplied tokens rather than text
    tokenized: bool,
}

impl Dataset {
    /// Empty dataset using byte encoding
    pub fn new(max_length: usize, symbol_size: usize) -> Self {
        Self::with_encoding(max_length, symbol_size, SymbolEncoding::Bytes)
    }

    /// Empty dataset with an explicit text encoding
    pub fn with_encoding(max_length: usize, symbol_size: usize, encoding: SymbolEncoding) -> Self {
        Self {
            max_length,
            symbol_size,
            encoding,
            sequences: Vec::new(),
            table: SymbolTable::default(),
            tokenized: false,
        }
    }

    /// Encode `strings`, replacing any previous content
    ///
    /// Nothing is kept if any sequence fails to encode.
    pub fn load_strings<S: AsRef<str>>(&mut self, strings: &[S]) -> Result<()> {
        if strings.is_empty() {
            return Err(KernelError::EmptyDataset);
        }
        let mut table = SymbolTable::default();
        let sequences = strings
            .iter()
            .enumerate()
            .map(|(index, s)| self.encode_one(index, s.as_ref(), &mut table))
            .collect::<Result<Vec<_>>>()?;

        self.sequences = sequences;
        self.table = table;
        self.tokenized = false;
        Ok(())
    }

    /// Load already tokenized sequences, replacing any previous content
    pub fn load_tokens(&mut self, tokens: &[Vec<Symbol>]) -> Result<()> {
        if tokens.is_empty() {
            return Err(KernelError::EmptyDataset);
        }
        let sequences = tokens
            .iter()
            .enumerate()
            .map(|(index, t)| self.check_tokens(index, t))
            .collect::<Result<Vec<_>>>()?;

        self.sequences = sequences;
        self.table = SymbolTable::default();
        self.tokenized = true;
        Ok(())
    }

    /// Encode further sequences under the same bounds without storing them
    ///
    /// With compact encoding, characters already in the dataset keep their
    /// symbols and unseen ones get fresh indices.
    ///
    /// A tokenized dataset has no text mapping, so text queries are rejected;
    /// use [`encode_tokens`](Self::encode_tokens) instead.
    pub fn encode<S: AsRef<str>>(&self, strings: &[S]) -> Result<Vec<EncodedSequence>> {
        if strings.is_empty() {
            return Err(KernelError::EmptyDataset);
        }
        if self.tokenized {
            return Err(KernelError::InvalidParameter(
                "dataset was loaded from tokens, text queries have no symbol mapping".to_string(),
            ));
        }
        let mut table = self.table.clone();
        strings
            .iter()
            .enumerate()
            .map(|(index, s)| self.encode_one(index, s.as_ref(), &mut table))
            .collect()
    }

    /// Check further tokenized sequences against the same bounds
    pub fn encode_tokens(&self, tokens: &[Vec<Symbol>]) -> Result<Vec<EncodedSequence>> {
        if tokens.is_empty() {
            return Err(KernelError::EmptyDataset);
        }
        tokens
            .iter()
            .enumerate()
            .map(|(index, t)| self.check_tokens(index, t))
            .collect()
    }

    fn encode_one(
        &self,
        index: usize,
        text: &str,
        table: &mut SymbolTable,
    ) -> Result<EncodedSequence> {
        let symbols: Vec<Symbol> = match self.encoding {
            SymbolEncoding::Bytes => {
                self.check_length(index, text.len())?;
                text.bytes().map(Symbol::from).collect()
            }
            SymbolEncoding::Compact => {
                self.check_length(index, text.chars().count())?;
                text.chars()
                    .map(|c| {
                        table
                            .intern(c, self.symbol_size)
                            .ok_or(KernelError::AlphabetExhausted {
                                index,
                                symbol_size: self.symbol_size,
                            })
                    })
                    .collect::<Result<_>>()?
            }
        };
        self.check_tokens(index, &symbols)
    }

    fn check_length(&self, index: usize, length: usize) -> Result<()> {
        if length > self.max_length {
            return Err(KernelError::SequenceTooLong {
                index,
                length,
                max_length: self.max_length,
            });
        }
        Ok(())
    }

    fn check_tokens(&self, index: usize, symbols: &[Symbol]) -> Result<EncodedSequence> {
        self.check_length(index, symbols.len())?;
        if let Some((position, &symbol)) = symbols
            .iter()
            .enumerate()
            .find(|&(_, &s)| s as usize >= self.symbol_size)
        {
            return Err(KernelError::SymbolOutOfRange {
                index,
                position,
                symbol,
                symbol_size: self.symbol_size,
            });
        }
        Ok(EncodedSequence {
            symbols: symbols.into(),
        })
    }

    /// Number of sequences
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Sequence at `i`
    ///
    /// # Panics
    /// Panics if i >= len()
    pub fn get(&self, i: usize) -> &EncodedSequence {
        &self.sequences[i]
    }

    pub fn sequences(&self) -> &[EncodedSequence] {
        &self.sequences
    }

    pub fn iter(&self) -> impl Iterator<Item = &EncodedSequence> {
        self.sequences.iter()
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    pub fn encoding(&self) -> SymbolEncoding {
        self.encoding
    }

    /// Whether the sequences came from [`load_tokens`](Self::load_tokens)
    pub fn is_tokenized(&self) -> bool {
        self.tokenized
    }

    /// Compact-encoding symbol table (empty for byte encoding)
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }
}
