use super::{strategy_score, sum_balance, valid_votes, VotingType};
use crate::{Choice, Proposal, Strategy, Vote};
use itertools::Itertools;
use std::collections::BTreeSet;

/// A full ranking of the proposal choices, each listed exactly once.
fn is_valid(choice: &Choice, n_choices: usize) -> bool {
    match choice {
        Choice::Multiple(ranking) => {
            ranking.len() == n_choices
                && ranking.iter().all_unique()
                && ranking
                    .iter()
                    .all(|i| *i >= 1 && (*i as usize) <= n_choices)
        }
        _ => false,
    }
}

/// The highest ranked choice of `vote` still in the running, 0-based.
fn preferred(vote: &Vote, eliminated: &BTreeSet<usize>) -> Option<usize> {
    match &vote.choice {
        Choice::Multiple(ranking) => ranking
            .iter()
            .map(|i| *i as usize - 1)
            .find(|i| !eliminated.contains(i)),
        _ => None,
    }
}

/// Instant runoff: the weakest choice is eliminated and its votes transferred
/// to their next preference until one choice holds a strict majority.
pub struct RankedChoice {
    n_choices: usize,
    n_strategies: usize,
    votes: Vec<Vote>,
    /// Choices eliminated before the final round.
    eliminated: BTreeSet<usize>,
}

impl RankedChoice {
    pub fn new(proposal: &Proposal, votes: &[Vote], strategies: &[Strategy]) -> Self {
        let n_choices = proposal.choices.len();
        let mut voting = Self {
            n_choices,
            n_strategies: strategies.len(),
            votes: valid_votes("ranked-choice", votes, |choice| is_valid(choice, n_choices)),
            eliminated: BTreeSet::new(),
        };
        voting.run_rounds();
        voting
    }

    pub fn boxed(
        proposal: &Proposal,
        votes: &[Vote],
        strategies: &[Strategy],
    ) -> Box<dyn VotingType> {
        Box::new(Self::new(proposal, votes, strategies))
    }

    fn round(&self, power: impl Fn(&Vote) -> f64) -> Vec<f64> {
        self.votes
            .iter()
            .fold(vec![0.0; self.n_choices], |mut acc, vote| {
                if let Some(choice) = preferred(vote, &self.eliminated) {
                    acc[choice] += power(vote);
                }
                acc
            })
    }

    fn run_rounds(&mut self) {
        loop {
            let tally = self.round(|vote| vote.balance);
            let total = tally.iter().sum::<f64>();
            let running = (0..self.n_choices)
                .filter(|i| !self.eliminated.contains(i))
                .collect::<Vec<_>>();
            if running.len() <= 1 || total <= 0.0 {
                return;
            }
            if running.iter().any(|i| tally[*i] > total / 2.0) {
                return;
            }
            // on ties the later choice goes first
            let weakest = running
                .iter()
                .copied()
                .rev()
                .min_by(|a, b| tally[*a].total_cmp(&tally[*b]));
            match weakest {
                Some(weakest) => {
                    self.eliminated.insert(weakest);
                }
                None => return,
            }
        }
    }
}

impl VotingType for RankedChoice {
    fn results_by_vote_balance(&self) -> Vec<f64> {
        self.round(|vote| vote.balance)
    }

    fn results_by_strategy_score(&self) -> Vec<Vec<f64>> {
        let by_strategy = (0..self.n_strategies)
            .map(|i| self.round(|vote| strategy_score(vote, i)))
            .collect::<Vec<_>>();
        (0..self.n_choices)
            .map(|choice| by_strategy.iter().map(|round| round[choice]).collect())
            .collect()
    }

    fn sum_of_results_balance(&self) -> f64 {
        sum_balance(&self.votes)
    }
}
