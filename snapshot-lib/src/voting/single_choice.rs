use super::{strategy_score, sum_balance, valid_votes, VotingType};
use crate::{Choice, Proposal, Strategy, Vote};

pub(crate) fn is_valid(choice: &Choice, n_choices: usize) -> bool {
    matches!(choice, Choice::Single(i) if *i >= 1 && (*i as usize) <= n_choices)
}

/// Each vote assigns its whole balance to one choice.
pub struct SingleChoice {
    n_choices: usize,
    n_strategies: usize,
    votes: Vec<Vote>,
}

impl SingleChoice {
    pub fn new(proposal: &Proposal, votes: &[Vote], strategies: &[Strategy]) -> Self {
        Self::with_choices("single-choice", proposal.choices.len(), votes, strategies)
    }

    pub(crate) fn with_choices(
        voting_type: &str,
        n_choices: usize,
        votes: &[Vote],
        strategies: &[Strategy],
    ) -> Self {
        Self {
            n_choices,
            n_strategies: strategies.len(),
            votes: valid_votes(voting_type, votes, |choice| is_valid(choice, n_choices)),
        }
    }

    pub fn boxed(
        proposal: &Proposal,
        votes: &[Vote],
        strategies: &[Strategy],
    ) -> Box<dyn VotingType> {
        Box::new(Self::new(proposal, votes, strategies))
    }

    fn votes_for(&self, choice: usize) -> impl Iterator<Item = &Vote> {
        self.votes
            .iter()
            .filter(move |vote| matches!(vote.choice, Choice::Single(i) if i as usize == choice + 1))
    }
}

impl VotingType for SingleChoice {
    fn results_by_vote_balance(&self) -> Vec<f64> {
        (0..self.n_choices)
            .map(|choice| self.votes_for(choice).map(|vote| vote.balance).sum())
            .collect()
    }

    fn results_by_strategy_score(&self) -> Vec<Vec<f64>> {
        (0..self.n_choices)
            .map(|choice| {
                (0..self.n_strategies)
                    .map(|i| {
                        self.votes_for(choice)
                            .map(|vote| strategy_score(vote, i))
                            .sum()
                    })
                    .collect()
            })
            .collect()
    }

    fn sum_of_results_balance(&self) -> f64 {
        sum_balance(&self.votes)
    }
}
