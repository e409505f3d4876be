use super::{is_valid_weighted, strategy_score, sum_balance, valid_votes, VotingType};
use crate::{Proposal, Strategy, Vote};

/// Share of the vote assigned to each choice, proportional to its weight.
pub(crate) fn shares(vote: &Vote, n_choices: usize) -> Vec<f64> {
    let mut shares = vec![0.0; n_choices];
    let weights = vote.choice.weights().unwrap_or_default();
    let total = weights.iter().map(|(_, w)| w).sum::<f64>();
    if total > 0.0 {
        for (i, w) in weights {
            if let Some(share) = shares.get_mut(i) {
                *share += w / total;
            }
        }
    }
    shares
}

/// Each vote splits its balance among choices proportionally to the weights.
pub struct Weighted {
    n_choices: usize,
    n_strategies: usize,
    votes: Vec<Vote>,
}

impl Weighted {
    pub fn new(proposal: &Proposal, votes: &[Vote], strategies: &[Strategy]) -> Self {
        let n_choices = proposal.choices.len();
        Self {
            n_choices,
            n_strategies: strategies.len(),
            votes: valid_votes("weighted", votes, |choice| {
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

impl VotingType for Weighted {
    fn results_by_vote_balance(&self) -> Vec<f64> {
        self.votes
            .iter()
            .fold(vec![0.0; self.n_choices], |mut acc, vote| {
                for (result, share) in acc.iter_mut().zip(shares(vote, self.n_choices)) {
                    *result += share * vote.balance;
                }
                acc
            })
    }

    fn results_by_strategy_score(&self) -> Vec<Vec<f64>> {
        self.votes.iter().fold(
            vec![vec![0.0; self.n_strategies]; self.n_choices],
            |mut acc, vote| {
                for (by_strategy, share) in acc.iter_mut().zip(shares(vote, self.n_choices)) {
                    for (i, result) in by_strategy.iter_mut().enumerate() {
                        *result += share * strategy_score(vote, i);
                    }
                }
                acc
            },
        )
    }

    fn sum_of_results_balance(&self) -> f64 {
        sum_balance(&self.votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voting::tests::{assert_are_close, proposal, strategies, vote};
    use crate::Choice;
    use proptest::prelude::*;
    use test_strategy::proptest;

    fn weighted(weights: &[(&str, f64)]) -> Choice {
        Choice::Weighted(weights.iter().map(|(k, w)| (k.to_string(), *w)).collect())
    }

    #[test]
    fn balance_is_split_by_weight() {
        let votes = vec![
            vote("0xa", weighted(&[("1", 3.0), ("2", 1.0)]), &[8.0, 4.0]),
            vote("0xb", weighted(&[("2", 1.0)]), &[2.0, 0.0]),
            vote("0xc", weighted(&[("4", 1.0)]), &[50.0, 0.0]),
            vote("0xd", weighted(&[("1", 0.0)]), &[50.0, 0.0]),
        ];
        let voting = Weighted::new(
            &proposal("weighted", &["A", "B", "C"]),
            &votes,
            &strategies(2),
        );
        let results = voting.results_by_vote_balance();
        assert_are_close(results[0], 9.0);
        assert_are_close(results[1], 5.0);
        assert_are_close(results[2], 0.0);

        let by_strategy = voting.results_by_strategy_score();
        assert_are_close(by_strategy[0][0], 6.0);
        assert_are_close(by_strategy[0][1], 3.0);
        assert_are_close(by_strategy[1][0], 4.0);
        assert_are_close(by_strategy[1][1], 1.0);
        assert_are_close(voting.sum_of_results_balance(), 14.0);
    }

    #[proptest]
    fn results_add_up_to_counted_balance(votes: Vec<Vote>) {
        let voting = Weighted::new(
            &proposal("weighted", &["A", "B", "C", "D", "E", "F"]),
            &votes,
            &strategies(2),
        );
        let total = voting.results_by_vote_balance().iter().sum::<f64>();
        prop_assert!((total - voting.sum_of_results_balance()).abs() < 1e-6);
    }
}
