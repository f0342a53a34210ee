use crate::error::{MotifError, Result};
use crate::types::{Sequence, Token};
use std::collections::HashSet;
use std::path::Path;

/// Tokenized training corpus
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    pub sequences: Vec<Sequence>,
    /// Distinct tokens in order of first appearance
    pub alphabet: Vec<Token>,
}

impl Corpus {
    /// Build from already tokenized sequences.
    pub fn from_sequences(sequences: Vec<Sequence>) -> Result<Self> {
        let alphabet: Vec<Token> = {
            let mut seen: HashSet<&str> = HashSet::new();
            sequences
                .iter()
                .flatten()
                .filter(|t| seen.insert(t.as_str()))
                .cloned()
                .collect()
        };

        if alphabet.is_empty() {
            return Err(MotifError::EmptyAlphabet);
        }
        Ok(Self { sequences, alphabet })
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

pub struct CorpusLoader;

impl CorpusLoader {
    /// One sequence per non-empty line. An empty separator splits a line into
    /// characters; otherwise tokens are split on the separator and empty
    /// tokens dropped.
    pub fn read_from_file<P: AsRef<Path>>(path: P, separator: &str) -> Result<Corpus> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MotifError::Corpus(format!("Failed to read corpus {}: {}", path.display(), e))
        })?;

        let corpus = Self::parse(&contents, separator)?;
        log::info!(
            "Loaded corpus {}: {} sequences, alphabet of {} tokens",
            path.display(),
            corpus.len(),
            corpus.alphabet.len()
        );
        Ok(corpus)
    }

    pub fn parse(contents: &str, separator: &str) -> Result<Corpus> {
        let sequences: Vec<Sequence> = contents
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(|line| tokenize(line, separator))
            .filter(|seq| !seq.is_empty())
            .collect();

        Corpus::from_sequences(sequences)
    }
}

fn tokenize(line: &str, separator: &str) -> Sequence {
    if separator.is_empty() {
        line.chars().map(|c| c.to_string()).collect()
    } else {
        line.split(separator)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}
