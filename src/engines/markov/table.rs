/// Multi-order Markov transition table built from a tokenized corpus.
///
/// Order 0 is the marginal token distribution. Order `k > 0` maps a context
/// (the `k` preceding tokens, joined with [`CONTEXT_SEPARATOR`]) to the
/// distribution of the token that followed it in the corpus. For each stored
/// context the probabilities sum to 1.

use crate::error::{MotifError, Result};
use crate::types::{Sequence, Token};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

pub const CONTEXT_SEPARATOR: &str = " ";

/// Next-token probabilities for one context
pub type Distribution = BTreeMap<Token, f64>;

/// Context key -> next-token distribution, for one order
pub type OrderTable = BTreeMap<String, Distribution>;

/// Serialize a context as a join key
pub fn context_key<T: AsRef<str>>(context: &[T]) -> String {
    context
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Split a join key back into its tokens. The empty key is the empty context.
pub fn split_context(key: &str) -> Vec<Token> {
    if key.is_empty() {
        return Vec::new();
    }
    key.split(CONTEXT_SEPARATOR).map(|t| t.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransitionTable {
    marginal: Distribution,
    conditional: Vec<OrderTable>, // index k-1 holds order k
}

impl TransitionTable {
    /// Build orders `0..order_limit` from the corpus.
    pub fn build(sequences: &[Sequence], order_limit: usize) -> Result<Self> {
        if order_limit == 0 {
            return Err(MotifError::Configuration(
                "Order limit must be at least 1".to_string()
            ));
        }

        let counts = transition_occurrences(sequences, order_limit);
        let mut orders = counts.into_iter().map(|order| {
            order
                .into_iter()
                .map(|(context, next)| (context, normalize(&next)))
                .collect::<OrderTable>()
        });

        let marginal = orders
            .next()
            .and_then(|mut order0| order0.remove(""))
            .unwrap_or_default();
        let conditional: Vec<OrderTable> = orders.collect();

        log::debug!(
            "Built transition table: {} tokens, {} orders, {} contexts",
            marginal.len(),
            conditional.len() + 1,
            conditional.iter().map(|o| o.len()).sum::<usize>()
        );

        Ok(Self { marginal, conditional })
    }

    /// Assemble a table from already-normalized parts (e.g. a loaded model).
    pub fn from_parts(marginal: Distribution, conditional: Vec<OrderTable>) -> Self {
        Self { marginal, conditional }
    }

    /// Number of orders held, order 0 included
    pub fn order_limit(&self) -> usize {
        self.conditional.len() + 1
    }

    /// Highest order held. Orders the corpus never reached are present but empty.
    pub fn max_order(&self) -> usize {
        self.conditional.len()
    }

    pub fn marginal(&self) -> &Distribution {
        &self.marginal
    }

    /// Contexts of `order`, or `None` when the order is beyond the table.
    pub fn order(&self, order: usize) -> Option<&OrderTable> {
        if order == 0 {
            return None;
        }
        self.conditional.get(order - 1)
    }

    pub fn conditional_orders(&self) -> &[OrderTable] {
        &self.conditional
    }

    /// Distribution following `context` at `order`; order 0 ignores the context.
    pub fn distribution<T: AsRef<str>>(&self, order: usize, context: &[T]) -> Option<&Distribution> {
        if order == 0 {
            return Some(&self.marginal);
        }
        self.order(order)?.get(&context_key(context))
    }

    /// Probability of `token` after `context` at `order`, `None` when either the
    /// context or the transition was never observed.
    pub fn probability<T: AsRef<str>>(&self, order: usize, context: &[T], token: &str) -> Option<f64> {
        self.distribution(order, context)?.get(token).copied()
    }

    pub fn contexts(&self, order: usize) -> impl Iterator<Item = &String> {
        self.order(order).into_iter().flat_map(|o| o.keys())
    }

    /// Tokens known to the marginal distribution
    pub fn alphabet(&self) -> Vec<Token> {
        self.marginal.keys().cloned().collect()
    }

    /// Rewrite each sequence, per order, as the probability the table assigns to
    /// every token given its real history. The first `order` positions carry
    /// [`TraceStep::NoContext`]; sequences not longer than the order yield an
    /// empty trace. Transitions unknown to the table trace as probability 0.
    pub fn transition_traces(&self, sequences: &[Sequence]) -> Vec<Vec<Vec<TraceStep>>> {
        (0..self.order_limit())
            .map(|order| {
                sequences
                    .iter()
                    .map(|seq| {
                        if seq.len() <= order {
                            return Vec::new();
                        }
                        let mut trace = vec![TraceStep::NoContext; order];
                        for window in seq.windows(order + 1) {
                            let (context, next) = window.split_at(order);
                            let p = self.probability(order, context, &next[0]).unwrap_or(0.0);
                            trace.push(TraceStep::Probability(p));
                        }
                        trace
                    })
                    .collect()
            })
            .collect()
    }
}

/// One position of a transition-probability trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceStep {
    NoContext,
    Probability(f64),
}

pub const NO_CONTEXT_MARKER: &str = "-";

impl Serialize for TraceStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TraceStep::NoContext => serializer.serialize_str(NO_CONTEXT_MARKER),
            TraceStep::Probability(p) => serializer.serialize_f64(*p),
        }
    }
}

impl<'de> Deserialize<'de> for TraceStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawStep {
            Probability(f64),
            Marker(String),
        }

        match RawStep::deserialize(deserializer)? {
            RawStep::Probability(p) => Ok(TraceStep::Probability(p)),
            RawStep::Marker(m) if m == NO_CONTEXT_MARKER => Ok(TraceStep::NoContext),
            RawStep::Marker(m) => Err(serde::de::Error::custom(format!(
                "unexpected trace marker {:?}",
                m
            ))),
        }
    }
}

/// Counts of every n-gram (n = order + 1) per order, keyed by the joined n-gram.
pub fn ngram_occurrences(sequences: &[Sequence], order_limit: usize) -> Vec<BTreeMap<String, usize>> {
    (0..order_limit)
        .map(|order| {
            let mut counts = BTreeMap::new();
            for seq in sequences {
                for window in seq.windows(order + 1) {
                    *counts.entry(context_key(window)).or_insert(0) += 1;
                }
            }
            counts
        })
        .collect()
}

/// N-grams of one order sorted by count (descending), ties by key.
pub fn most_frequent(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut sorted: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
}

/// Per order: context -> next token -> count. Order 0 uses the empty context.
pub fn transition_occurrences(
    sequences: &[Sequence],
    order_limit: usize,
) -> Vec<BTreeMap<String, BTreeMap<Token, usize>>> {
    (0..order_limit)
        .map(|order| {
            let mut counts: BTreeMap<String, BTreeMap<Token, usize>> = BTreeMap::new();
            for seq in sequences {
                for window in seq.windows(order + 1) {
                    let (context, next) = window.split_at(order);
                    *counts
                        .entry(context_key(context))
                        .or_default()
                        .entry(next[0].clone())
                        .or_insert(0) += 1;
                }
            }
            counts
        })
        .collect()
}

fn normalize(counts: &BTreeMap<Token, usize>) -> Distribution {
    let total: usize = counts.values().sum();
    counts
        .iter()
        .map(|(token, &count)| (token.clone(), count as f64 / total as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sequence_of;

    fn corpus() -> Vec<Sequence> {
        vec![sequence_of(&["a", "b", "a", "b"]), sequence_of(&["a", "b", "c"])]
    }

    #[test]
    fn test_marginal_distribution() {
        let table = TransitionTable::build(&corpus(), 2).unwrap();
        let marginal = table.marginal();
        assert!((marginal["a"] - 3.0 / 7.0).abs() < 1e-12);
        assert!((marginal["b"] - 3.0 / 7.0).abs() < 1e-12);
        assert!((marginal["c"] - 1.0 / 7.0).abs() < 1e-12);
        assert_eq!(table.max_order(), 1);
    }

    #[test]
    fn test_first_order_transitions() {
        let table = TransitionTable::build(&corpus(), 2).unwrap();
        let after_a = table.distribution(1, &["a"]).unwrap();
        assert_eq!(after_a.len(), 1);
        assert_eq!(after_a["b"], 1.0);

        let after_b = table.distribution(1, &["b"]).unwrap();
        // The trailing "b" of the first sequence has no successor
        assert_eq!(after_b["a"], 0.5);
        assert_eq!(after_b["c"], 0.5);
        assert!(table.distribution(1, &["c"]).is_none());
    }

    #[test]
    fn test_orders_beyond_corpus_are_empty() {
        let table = TransitionTable::build(&corpus(), 6).unwrap();
        assert_eq!(table.max_order(), 5);
        assert_eq!(table.order(3).map(|o| o.len()), Some(1)); // "a b a" -> "b"
        assert_eq!(table.order(4).map(|o| o.len()), Some(0));
        assert!(table.order(6).is_none());
    }

    #[test]
    fn test_zero_order_limit_rejected() {
        assert!(TransitionTable::build(&corpus(), 0).is_err());
    }

    #[test]
    fn test_transition_traces() {
        let table = TransitionTable::build(&corpus(), 2).unwrap();
        let traces = table.transition_traces(&corpus());
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[1][0][0], TraceStep::NoContext);
        assert_eq!(traces[1][0][1], TraceStep::Probability(1.0));
        assert_eq!(traces[1][0].len(), 4);
        assert_eq!(traces[0][1].len(), 3);
    }

    #[test]
    fn test_short_sequence_traces_empty() {
        let table = TransitionTable::build(&corpus(), 3).unwrap();
        let traces = table.transition_traces(&[sequence_of(&["a", "b"])]);
        assert!(traces[2][0].is_empty());
    }

    #[test]
    fn test_ngram_counts_sorted() {
        let counts = ngram_occurrences(&corpus(), 2);
        let bigrams = most_frequent(&counts[1]);
        assert_eq!(bigrams[0], ("a b", 3));
        assert_eq!(counts[0]["c"], 1);
    }

    #[test]
    fn test_trace_step_json() {
        let steps = vec![TraceStep::NoContext, TraceStep::Probability(0.5)];
        let json = serde_json::to_string(&steps).unwrap();
        assert_eq!(json, r#"["-",0.5]"#);
        let back: Vec<TraceStep> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, steps);
    }

    #[test]
    fn test_context_key_round_trip() {
        let key = context_key(&["x", "y"]);
        assert_eq!(key, "x y");
        assert_eq!(split_context(&key), sequence_of(&["x", "y"]));
        assert!(split_context("").is_empty());
    }
}
