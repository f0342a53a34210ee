use super::table::TransitionTable;
use crate::types::Token;

/// Probability substituted for an unseen context or transition
pub const FLOOR_PROBABILITY: f64 = 0.0001;

/// Scores sequences against a transition table.
///
/// Position 0 always uses the marginal distribution. Position `i > 0` uses
/// exactly order `min(i, max_order)`; a missing context or transition at that
/// order scores the floor probability. There is no back-off to shorter orders
/// here, unlike [`super::SequenceSampler`].
#[derive(Debug, Clone, Copy)]
pub struct LikelihoodScorer<'a> {
    table: &'a TransitionTable,
    floor: f64,
}

impl<'a> LikelihoodScorer<'a> {
    pub fn new(table: &'a TransitionTable) -> Self {
        Self::with_floor(table, FLOOR_PROBABILITY)
    }

    pub fn with_floor(table: &'a TransitionTable, floor: f64) -> Self {
        Self { table, floor }
    }

    pub fn table(&self) -> &'a TransitionTable {
        self.table
    }

    /// Order used for position `index`
    pub fn order_at(&self, index: usize) -> usize {
        index.min(self.table.max_order())
    }

    /// P(sequence[index] | preceding min(index, K) tokens), floored
    pub fn position_probability(&self, sequence: &[Token], index: usize) -> f64 {
        let order = self.order_at(index);
        let context = &sequence[index - order..index];
        self.table
            .probability(order, context, &sequence[index])
            .unwrap_or(self.floor)
    }

    /// Summed negative log-probability. Unnormalized: grows with length.
    pub fn cost(&self, sequence: &[Token]) -> f64 {
        (0..sequence.len())
            .map(|i| -self.position_probability(sequence, i).ln())
            .sum()
    }

    /// Product of the position probabilities
    pub fn support(&self, sequence: &[Token]) -> f64 {
        (0..sequence.len())
            .map(|i| self.position_probability(sequence, i))
            .product()
    }

    /// Sum of -p ln p over positions, divided by ln(len) when len > 1.
    pub fn entropy_support(&self, sequence: &[Token]) -> f64 {
        let total: f64 = (0..sequence.len())
            .map(|i| {
                let p = self.position_probability(sequence, i);
                -p.ln() * p
            })
            .sum();
        if sequence.len() > 1 {
            total / (sequence.len() as f64).ln()
        } else {
            total
        }
    }

    /// Support measured separately at each fixed order. Every position with a
    /// full context at that order contributes `weight[order] * p`, or the bare
    /// floor on a miss. Missing weights count as 1.
    pub fn per_order_support(&self, sequence: &[Token], weights: &[f64]) -> Vec<f64> {
        (0..=self.table.max_order())
            .map(|order| {
                let weight = weights.get(order).copied().unwrap_or(1.0);
                (order..sequence.len())
                    .map(|i| {
                        self.table
                            .probability(order, &sequence[i - order..i], &sequence[i])
                            .map(|p| weight * p)
                            .unwrap_or(self.floor)
                    })
                    .product()
            })
            .collect()
    }
}
