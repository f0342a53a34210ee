use super::table::{split_context, Distribution, TransitionTable};
use crate::types::{Sequence, Token};
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;

/// Inverse-CDF draw over non-negative weights. The weights need not sum to 1.
/// Returns `None` for an empty or all-zero weight list.
pub fn monte_carlo_choice<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if weights.is_empty() || total <= 0.0 {
        return None;
    }

    let target = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(i);
        if cumulative > target {
            return Some(i);
        }
    }
    // Rounding can leave the target just past the final cumulative sum
    last_positive
}

/// Draw a token from a distribution by inverse-CDF sampling
pub fn sample_distribution<'d, R: Rng>(distribution: &'d Distribution, rng: &mut R) -> Option<&'d Token> {
    let weights: Vec<f64> = distribution.values().copied().collect();
    let index = monte_carlo_choice(&weights, rng)?;
    distribution.keys().nth(index)
}

fn draw_marginal<R: Rng>(table: &TransitionTable, rng: &mut R) -> Option<Token> {
    sample_distribution(table.marginal(), rng).cloned()
}

/// How a generated sequence begins
#[derive(Debug, Clone, PartialEq)]
pub enum StartPolicy {
    /// One token drawn from the marginal distribution
    Marginal,
    /// One token chosen uniformly from a caller-supplied pool
    Pool(Vec<Token>),
    /// A whole context chosen uniformly from the given order
    Context(usize),
}

/// Lazy, finite generator of corpus-consistent sequences.
///
/// Each step picks a target order from `order_weights`, looks up the trailing
/// context at that order and backs off to shorter contexts until one is
/// known; with none left it draws from the marginal distribution. The stream
/// ends after `length` tokens and can be started again with [`restart`].
///
/// [`restart`]: SequenceSampler::restart
pub struct SequenceSampler<'a, R: Rng> {
    table: &'a TransitionTable,
    order_weights: Vec<f64>,
    length: usize,
    start: StartPolicy,
    rng: R,
    history: Sequence,
    emitted: usize,
}

impl<'a, R: Rng> SequenceSampler<'a, R> {
    /// Sampler with uniform weight on every order of the table
    pub fn new(table: &'a TransitionTable, length: usize, rng: R) -> Self {
        let order_weights = vec![1.0; table.order_limit()];
        Self::with_weights(table, order_weights, length, rng)
    }

    pub fn with_weights(table: &'a TransitionTable, order_weights: Vec<f64>, length: usize, rng: R) -> Self {
        Self {
            table,
            order_weights,
            length,
            start: StartPolicy::Marginal,
            rng,
            history: Vec::new(),
            emitted: 0,
        }
    }

    pub fn with_start(mut self, start: StartPolicy) -> Self {
        self.start = start;
        self
    }

    /// Forget the current sequence; the next call begins a new one.
    pub fn restart(&mut self) {
        self.history.clear();
        self.emitted = 0;
    }

    /// Generate `count` complete sequences
    pub fn generate(&mut self, count: usize) -> Vec<Sequence> {
        (0..count)
            .map(|_| {
                self.restart();
                self.by_ref().collect()
            })
            .collect()
    }

    fn seed_history(&mut self) {
        let table = self.table;
        let start = match &self.start {
            StartPolicy::Marginal => draw_marginal(table, &mut self.rng).into_iter().collect(),
            StartPolicy::Pool(pool) => match pool.choose(&mut self.rng) {
                Some(token) => vec![token.clone()],
                None => draw_marginal(table, &mut self.rng).into_iter().collect(),
            },
            StartPolicy::Context(order) => match table.contexts(*order).choose(&mut self.rng) {
                Some(key) => split_context(key),
                None => draw_marginal(table, &mut self.rng).into_iter().collect(),
            },
        };
        self.history = start;
    }

    fn next_token(&mut self) -> Option<Token> {
        let target = monte_carlo_choice(&self.order_weights, &mut self.rng).unwrap_or(0);
        for order in (1..=target).rev() {
            if self.history.len() < order {
                continue;
            }
            let context = &self.history[self.history.len() - order..];
            if let Some(distribution) = self.table.distribution(order, context) {
                return sample_distribution(distribution, &mut self.rng).cloned();
            }
        }
        draw_marginal(self.table, &mut self.rng)
    }
}

impl<R: Rng> Iterator for SequenceSampler<'_, R> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted >= self.length {
            return None;
        }
        if self.history.is_empty() {
            self.seed_history();
        }
        if self.emitted >= self.history.len() {
            let token = self.next_token()?;
            self.history.push(token);
        }
        let token = self.history.get(self.emitted).cloned();
        self.emitted += 1;
        token
    }
}

/// For every order of the table, `count` sequences generated at that order
/// alone and started from one of its contexts.
pub fn generate_per_order<R: Rng>(
    table: &TransitionTable,
    count: usize,
    length: usize,
    rng: &mut R,
) -> Vec<Vec<Sequence>> {
    (0..table.order_limit())
        .map(|order| {
            let mut weights = vec![0.0; table.order_limit()];
            weights[order] = 1.0;
            let start = if order == 0 {
                StartPolicy::Marginal
            } else {
                StartPolicy::Context(order)
            };
            SequenceSampler::with_weights(table, weights, length, &mut *rng)
                .with_start(start)
                .generate(count)
        })
        .collect()
}
