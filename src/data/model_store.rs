//! On-disk corpus models.
//!
//! A model directory holds `model/alphabet.json` (token list), `model/tf.json`
//! (order -> table; order 0 maps token -> p, higher orders map
//! context -> token -> p) and `model/tf_seqs.json` (order -> per-sequence
//! transition traces, `"-"` where a position has no full context).

use super::corpus::Corpus;
use crate::engines::markov::{Distribution, OrderTable, TraceStep, TransitionTable};
use crate::error::{MotifError, Result};
use crate::types::Token;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub const MODEL_SUBDIR: &str = "model";
pub const ALPHABET_FILE: &str = "alphabet.json";
pub const TABLE_FILE: &str = "tf.json";
pub const TRACES_FILE: &str = "tf_seqs.json";

/// Allowed distance of a stored distribution's total from 1
const SUM_TOLERANCE: f64 = 1e-6;

/// Transition table of a corpus with its alphabet and traces
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusModel {
    pub table: TransitionTable,
    pub alphabet: Vec<Token>,
    pub traces: Vec<Vec<Vec<TraceStep>>>,
}

impl CorpusModel {
    pub fn build(corpus: &Corpus, order_limit: usize) -> Result<Self> {
        let table = TransitionTable::build(&corpus.sequences, order_limit)?;
        let traces = table.transition_traces(&corpus.sequences);
        Ok(Self {
            table,
            alphabet: corpus.alphabet.clone(),
            traces,
        })
    }
}

pub struct ModelStore;

impl ModelStore {
    pub fn model_dir<P: AsRef<Path>>(dir: P) -> PathBuf {
        dir.as_ref().join(MODEL_SUBDIR)
    }

    pub fn exists<P: AsRef<Path>>(dir: P) -> bool {
        let model_dir = Self::model_dir(dir);
        model_dir.join(ALPHABET_FILE).is_file() && model_dir.join(TABLE_FILE).is_file()
    }

    pub fn save<P: AsRef<Path>>(dir: P, model: &CorpusModel) -> Result<()> {
        let model_dir = Self::model_dir(&dir);
        std::fs::create_dir_all(&model_dir)?;

        write_json(model_dir.join(ALPHABET_FILE), &model.alphabet)?;

        let mut orders: BTreeMap<usize, serde_json::Value> = BTreeMap::new();
        orders.insert(0, serde_json::to_value(model.table.marginal())?);
        for (i, order) in model.table.conditional_orders().iter().enumerate() {
            orders.insert(i + 1, serde_json::to_value(order)?);
        }
        write_json(model_dir.join(TABLE_FILE), &orders)?;

        let traces: BTreeMap<usize, &Vec<Vec<TraceStep>>> = model.traces.iter().enumerate().collect();
        write_json(model_dir.join(TRACES_FILE), &traces)?;

        log::info!("Saved model ({} orders) to {}", model.table.order_limit(), model_dir.display());
        Ok(())
    }

    /// Load the table and alphabet of a saved model.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<(TransitionTable, Vec<Token>)> {
        let model_dir = Self::model_dir(&dir);
        let alphabet: Vec<Token> = read_json(model_dir.join(ALPHABET_FILE))?;
        let orders: BTreeMap<usize, serde_json::Value> = read_json(model_dir.join(TABLE_FILE))?;
        let table = table_from_orders(orders)?;

        log::debug!("Loaded model from {} ({} orders)", model_dir.display(), table.order_limit());
        Ok((table, alphabet))
    }

    pub fn load_traces<P: AsRef<Path>>(dir: P) -> Result<Vec<Vec<Vec<TraceStep>>>> {
        let traces: BTreeMap<usize, Vec<Vec<TraceStep>>> = read_json(Self::model_dir(dir).join(TRACES_FILE))?;
        Ok(traces.into_values().collect())
    }
}

fn table_from_orders(mut orders: BTreeMap<usize, serde_json::Value>) -> Result<TransitionTable> {
    let marginal: Distribution = orders
        .remove(&0)
        .ok_or_else(|| MotifError::InvalidModel("missing order 0".to_string()))
        .and_then(|v| {
            serde_json::from_value(v).map_err(|e| MotifError::InvalidModel(format!("order 0: {}", e)))
        })?;

    let mut conditional: Vec<OrderTable> = Vec::with_capacity(orders.len());
    for (expected, (order, value)) in (1..).zip(orders) {
        if order != expected {
            return Err(MotifError::InvalidModel(format!(
                "orders are not contiguous: found {} where {} was expected",
                order, expected
            )));
        }
        let table: OrderTable = serde_json::from_value(value)
            .map_err(|e| MotifError::InvalidModel(format!("order {}: {}", order, e)))?;
        conditional.push(table);
    }

    check_distribution(0, "", &marginal)?;
    for (i, order) in conditional.iter().enumerate() {
        for (context, distribution) in order {
            check_distribution(i + 1, context, distribution)?;
        }
    }

    Ok(TransitionTable::from_parts(marginal, conditional))
}

/// Every stored probability must be in (0, 1] and each non-empty
/// distribution must sum to 1, otherwise scoring could reach ln(0).
fn check_distribution(order: usize, context: &str, distribution: &Distribution) -> Result<()> {
    if let Some((token, p)) = distribution.iter().find(|&(_, &p)| !(p > 0.0 && p <= 1.0)) {
        return Err(MotifError::InvalidModel(format!(
            "order {} context {:?}: probability {} of {:?} out of range",
            order, context, p, token
        )));
    }
    let total: f64 = distribution.values().sum();
    if !distribution.is_empty() && (total - 1.0).abs() > SUM_TOLERANCE {
        return Err(MotifError::InvalidModel(format!(
            "order {} context {:?}: probabilities sum to {}",
            order, context, total
        )));
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: PathBuf, value: &T) -> Result<()> {
    let file = File::create(&path)?;
    serde_json::to_writer(BufWriter::new(file), value)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: PathBuf) -> Result<T> {
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MotifError::ModelNotFound { path });
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| MotifError::InvalidModel(format!("{}: {}", path.display(), e)))
}
