use super::{is_valid_weighted, strategy_score, sum_balance, valid_votes, weighted, VotingType};
use crate::{Proposal, Strategy, Vote};

/// Squares the per choice sums of `sqrt(share * power)` and rescales them so
/// that they add up to the total power.
fn quadratic_results(votes: &[Vote], n_choices: usize, power: impl Fn(&Vote) -> f64) -> Vec<f64> {
    let roots = votes.iter().fold(vec![0.0; n_choices], |mut acc, vote| {
        let vote_power = power(vote);
        for (result, share) in acc.iter_mut().zip(weighted::shares(vote, n_choices)) {
            *result += (share * vote_power).sqrt();
        }
        acc
    });
    let squares = roots.into_iter().map(|r| r * r).collect::<Vec<_>>();
    let total_squares = squares.iter().sum::<f64>();
    let total_power = votes.iter().map(|vote| power(vote)).sum::<f64>();
    if total_squares > 0.0 {
        squares
            .into_iter()
            .map(|square| square / total_squares * total_power)
            .collect()
    } else {
        vec![0.0; n_choices]
    }
}

/// Quadratic voting over weighted choices: many small supporters weigh more
/// than a single large one.
pub struct Quadratic {
    n_choices: usize,
    n_strategies: usize,
    votes: Vec<Vote>,
}

impl Quadratic {
    pub fn new(proposal: &Proposal, votes: &[Vote], strategies: &[Strategy]) -> Self {
        let n_choices = proposal.choices.len();
        Self {
            n_choices,
            n_strategies: strategies.len(),
            votes: valid_votes("quadratic", votes, |choice| {
                is_valid_weighted(choice, n_choices)
            }),
        }
    }

    pub fn boxed(
        proposal: &Proposal,
        votes: &[Vote],
        strategies: &[Strategy],
    ) -> Box<dyn VotingType> {
        Box::new(Self::new(proposal, votes, strategies))
    }
}

impl VotingType for Quadratic {
    fn results_by_vote_balance(&self) -> Vec<f64> {
        quadratic_results(&self.votes, self.n_choices, |vote| vote.balance.max(0.0))
    }

    fn results_by_strategy_score(&self) -> Vec<Vec<f64>> {
        let by_strategy = (0..self.n_strategies)
            .map(|i| {
                quadratic_results(&self.votes, self.n_choices, |vote| {
                    strategy_score(vote, i).max(0.0)
                })
            })
            .collect::<Vec<_>>();
        (0..self.n_choices)
            .map(|choice| by_strategy.iter().map(|results| results[choice]).collect())
            .collect()
    }

    fn sum_of_results_balance(&self) -> f64 {
        sum_balance(&self.votes)
    }
}
