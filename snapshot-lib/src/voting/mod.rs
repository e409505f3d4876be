//! Tally of the votes cast on a proposal.
//!
//! Each voting type interprets the [`Choice`] of a vote differently, but they
//! all expose the same results: the total balance per choice, the total score
//! per choice and strategy, and the balance of all the votes counted.

mod approval;
mod basic;
mod quadratic;
mod ranked_choice;
mod single_choice;
mod weighted;

pub use approval::Approval;
pub use basic::Basic;
pub use quadratic::Quadratic;
pub use ranked_choice::RankedChoice;
pub use single_choice::SingleChoice;
pub use weighted::Weighted;

use crate::{Choice, Proposal, Strategy, Vote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("voting type {0:?} is not supported")]
    UnsupportedVotingType(String),
}

pub trait VotingType {
    /// Sum of the balances assigned to each choice.
    fn results_by_vote_balance(&self) -> Vec<f64>;

    /// Per choice, the sum of the scores assigned by each strategy.
    fn results_by_strategy_score(&self) -> Vec<Vec<f64>>;

    fn sum_of_results_balance(&self) -> f64;
}

pub type Constructor = fn(&Proposal, &[Vote], &[Strategy]) -> Box<dyn VotingType>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    pub results_by_vote_balance: Vec<f64>,
    pub results_by_strategy_score: Vec<Vec<f64>>,
    pub sum_of_results_balance: f64,
}

impl Results {
    pub fn from_voting(voting: &dyn VotingType) -> Self {
        Self {
            results_by_vote_balance: voting.results_by_vote_balance(),
            results_by_strategy_score: voting.results_by_strategy_score(),
            sum_of_results_balance: voting.sum_of_results_balance(),
        }
    }
}

/// Voting types available to tally proposals, keyed by the proposal `type`.
#[derive(Clone)]
pub struct VotingRegistry {
    types: BTreeMap<String, Constructor>,
}

impl VotingRegistry {
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, constructor: Constructor) -> &mut Self {
        self.types.insert(name.into(), constructor);
        self
    }

    pub fn supports(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn voting(
        &self,
        proposal: &Proposal,
        votes: &[Vote],
        strategies: &[Strategy],
    ) -> Result<Box<dyn VotingType>, Error> {
        let constructor = self
            .types
            .get(&proposal.voting_type)
            .ok_or_else(|| Error::UnsupportedVotingType(proposal.voting_type.clone()))?;
        Ok(constructor(proposal, votes, strategies))
    }

    pub fn tally(
        &self,
        proposal: &Proposal,
        votes: &[Vote],
        strategies: &[Strategy],
    ) -> Result<Results, Error> {
        let voting = self.voting(proposal, votes, strategies)?;
        Ok(Results::from_voting(voting.as_ref()))
    }
}

impl Default for VotingRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("single-choice", SingleChoice::boxed)
            .register("approval", Approval::boxed)
            .register("quadratic", Quadratic::boxed)
            .register("ranked-choice", RankedChoice::boxed)
            .register("weighted", Weighted::boxed)
            .register("basic", Basic::boxed);
        registry
    }
}

impl std::fmt::Debug for VotingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.types.keys()).finish()
    }
}

/// Votes whose choice makes sense for the voting type, in their original order.
pub(crate) fn valid_votes(
    voting_type: &str,
    votes: &[Vote],
    is_valid: impl Fn(&Choice) -> bool,
) -> Vec<Vote> {
    let valid = votes
        .iter()
        .filter(|vote| is_valid(&vote.choice))
        .cloned()
        .collect::<Vec<_>>();
    if valid.len() != votes.len() {
        warn!(
            voting_type,
            ignored = votes.len() - valid.len(),
            "ignoring votes with an invalid choice"
        );
    }
    valid
}

/// Score of `vote` for strategy `i`, zero when the vote was not scored for it.
pub(crate) fn strategy_score(vote: &Vote, i: usize) -> f64 {
    vote.scores.get(i).copied().unwrap_or(0.0)
}

pub(crate) fn sum_balance(votes: &[Vote]) -> f64 {
    votes.iter().map(|vote| vote.balance).sum()
}

/// Valid weighted choice: at least one positive weight, every key a choice of
/// the proposal and no negative weight.
pub(crate) fn is_valid_weighted(choice: &Choice, n_choices: usize) -> bool {
    let weights = match choice.weights() {
        Some(weights) => weights,
        None => return false,
    };
    let keys = match choice {
        Choice::Weighted(map) => map.len(),
        _ => 0,
    };
    weights.len() == keys
        && weights.iter().all(|(i, w)| *i < n_choices && *w >= 0.0)
        && weights.iter().map(|(_, w)| w).sum::<f64>() > 0.0
}
