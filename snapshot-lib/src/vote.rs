use crate::utils::serde::deserialize_null_default;
use crate::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Voting power per address, one map per strategy, in the same order as the
/// strategies the scores were requested for.
pub type ScoreMatrix = Vec<HashMap<Address, f64>>;

/// The choice expressed by a vote. Indices are 1-based, as displayed to voters.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Choice {
    Single(u32),
    /// Approved choices, or a full ranking for ranked-choice proposals.
    Multiple(Vec<u32>),
    /// Weight per choice, keyed by the 1-based choice index.
    Weighted(BTreeMap<String, f64>),
    /// Anything else the hub returned; never valid for a voting type.
    Unknown(Value),
}

impl Choice {
    /// Weighted choices as `(0-based index, weight)`, skipping keys that are not
    /// positive integers.
    pub fn weights(&self) -> Option<Vec<(usize, f64)>> {
        match self {
            Choice::Weighted(weights) => Some(
                weights
                    .iter()
                    .filter_map(|(k, w)| match k.parse::<usize>() {
                        Ok(i) if i > 0 => Some((i - 1, *w)),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Vote {
    #[serde(default)]
    pub id: String,
    pub voter: Address,
    #[serde(default)]
    pub created: i64,
    pub choice: Choice,
    /// Voting power as reported by the hub.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub vp: f64,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub vp_by_strategy: Vec<f64>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub reason: String,
    /// Verifiable presentation attached by the voter, forwarded as is to the
    /// score API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vps: Option<Value>,
    /// Score per strategy, attached by [`score_votes`].
    #[serde(default)]
    pub scores: Vec<f64>,
    #[serde(default)]
    pub balance: f64,
}

pub fn score_of(scores: &ScoreMatrix, strategy: usize, address: &str) -> f64 {
    scores
        .get(strategy)
        .and_then(|by_address| by_address.get(address))
        .copied()
        .unwrap_or(0.0)
}

/// Attaches to every vote its score for each of the `n_strategies` strategies
/// and their sum as balance. The result is sorted by descending balance and
/// only contains votes with a positive balance.
pub fn score_votes(votes: Vec<Vote>, n_strategies: usize, scores: &ScoreMatrix) -> Vec<Vote> {
    let mut votes = votes
        .into_iter()
        .map(|mut vote| {
            vote.scores = (0..n_strategies)
                .map(|i| score_of(scores, i, &vote.voter))
                .collect();
            vote.balance = vote.scores.iter().sum();
            vote
        })
        .collect::<Vec<_>>();

    votes.sort_by(|a, b| b.balance.total_cmp(&a.balance));
    votes.retain(|vote| vote.balance > 0.0);
    votes
}

#[cfg(any(test, feature = "proptest"))]
mod arbitrary {
    use super::*;
    use proptest::prelude::*;

    impl Arbitrary for Choice {
        type Parameters = ();
        type Strategy = BoxedStrategy<Choice>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            prop_oneof![
                (0..6u32).prop_map(Choice::Single),
                proptest::collection::vec(0..6u32, 0..5).prop_map(Choice::Multiple),
                proptest::collection::btree_map(
                    (0..6u32).prop_map(|i| i.to_string()),
                    0.0..100.0f64,
                    0..5
                )
                .prop_map(Choice::Weighted),
            ]
            .boxed()
        }
    }

    impl Arbitrary for Vote {
        type Parameters = ();
        type Strategy = BoxedStrategy<Vote>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            (0..20u8, any::<Choice>(), 0.0..1_000.0f64, 0..2u8)
                .prop_map(|(voter, choice, balance, n_strategies)| {
                    let voter = format!("0x{:040x}", voter);
                    let scores = match n_strategies {
                        0 => vec![balance],
                        _ => vec![balance / 2.0, balance / 2.0],
                    };
                    Vote {
                        id: format!("vote-{}", voter),
                        voter,
                        created: 0,
                        choice,
                        vp: balance,
                        vp_by_strategy: scores.clone(),
                        reason: String::new(),
                        vps: None,
                        scores,
                        balance,
                    }
                })
                .boxed()
        }
    }
}
