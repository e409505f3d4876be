use super::{single_choice::SingleChoice, VotingType};
use crate::{Proposal, Strategy, Vote};

/// For, Against and Abstain.
pub const BASIC_CHOICES: usize = 3;

/// Single choice over the fixed [`BASIC_CHOICES`], whatever the proposal lists.
pub struct Basic(SingleChoice);

impl Basic {
    pub fn new(_proposal: &Proposal, votes: &[Vote], strategies: &[Strategy]) -> Self {
        Self(SingleChoice::with_choices(
            "basic",
            BASIC_CHOICES,
            votes,
            strategies,
        ))
    }

    pub fn boxed(
        proposal: &Proposal,
        votes: &[Vote],
        strategies: &[Strategy],
    ) -> Box<dyn VotingType> {
        Box::new(Self::new(proposal, votes, strategies))
    }
}

impl VotingType for Basic {
    fn results_by_vote_balance(&self) -> Vec<f64> {
        self.0.results_by_vote_balance()
    }

    fn results_by_strategy_score(&self) -> Vec<Vec<f64>> {
        self.0.results_by_strategy_score()
    }

    fn sum_of_results_balance(&self) -> f64 {
        self.0.sum_of_results_balance()
    }
}
