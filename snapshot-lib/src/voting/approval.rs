use super::{strategy_score, sum_balance, valid_votes, VotingType};
use crate::{Choice, Proposal, Strategy, Vote};
use itertools::Itertools;

fn is_valid(choice: &Choice, n_choices: usize) -> bool {
    match choice {
        Choice::Multiple(approved) => {
            !approved.is_empty()
                && approved.iter().all_unique()
                && approved
                    .iter()
                    .all(|i| *i >= 1 && (*i as usize) <= n_choices)
        }
        _ => false,
    }
}

/// Each vote assigns its whole balance to every approved choice.
pub struct Approval {
    n_choices: usize,
    n_strategies: usize,
    votes: Vec<Vote>,
}

impl Approval {
    pub fn new(proposal: &Proposal, votes: &[Vote], strategies: &[Strategy]) -> Self {
        let n_choices = proposal.choices.len();
        Self {
            n_choices,
            n_strategies: strategies.len(),
            votes: valid_votes("approval", votes, |choice| is_valid(choice, n_choices)),
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
        let choice = (choice + 1) as u32;
        self.votes.iter().filter(move |vote| match &vote.choice {
            Choice::Multiple(approved) => approved.contains(&choice),
            _ => false,
        })
    }
}

impl VotingType for Approval {
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
