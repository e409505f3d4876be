//! Queries to the hub, the GraphQL service indexing spaces, proposals and votes.

use crate::{ClientConfig, Error};
use graphql_client::{GraphQLQuery, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snapshot_lib::{Proposal, Space, Vote};
use std::time::Instant;
use tracing::{debug, instrument};

/// Custom scalar of the hub schema: arbitrary JSON.
type Any = serde_json::Value;

pub const DEFAULT_VOTES_PAGE: i64 = 30_000;

#[derive(GraphQLQuery)]
#[graphql(
    query_path = "resources/hub/proposal.graphql",
    schema_path = "resources/hub/schema.graphql",
    response_derives = "Debug, Serialize"
)]
pub struct ProposalQuery;

#[derive(GraphQLQuery)]
#[graphql(
    query_path = "resources/hub/votes.graphql",
    schema_path = "resources/hub/schema.graphql",
    response_derives = "Debug, Serialize"
)]
pub struct VotesQuery;

#[derive(GraphQLQuery)]
#[graphql(
    query_path = "resources/hub/space.graphql",
    schema_path = "resources/hub/schema.graphql",
    response_derives = "Debug, Serialize"
)]
pub struct SpaceQuery;

/// Page of votes to fetch for a proposal, ordered by descending voting power.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VotesPage {
    pub first: i64,
    pub skip: i64,
    /// Only votes cast by this address, when set.
    pub voter: Option<String>,
}

impl Default for VotesPage {
    fn default() -> Self {
        Self {
            first: DEFAULT_VOTES_PAGE,
            skip: 0,
            voter: None,
        }
    }
}

impl VotesPage {
    fn into_variables(self, id: &str) -> votes_query::Variables {
        votes_query::Variables {
            id: id.to_string(),
            first: Some(self.first),
            skip: Some(self.skip),
            voter: self.voter.filter(|voter| !voter.is_empty()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HubClient {
    client: reqwest::Client,
    url: String,
}

impl HubClient {
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        Ok(Self::with_client(config.http_client()?, &config.hub_url))
    }

    pub fn with_client(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    async fn query<Q: GraphQLQuery>(&self, variables: Q::Variables) -> Result<Q::ResponseData, Error> {
        let body = Q::build_query(variables);
        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        parse_response(status, &body)
    }

    #[instrument(skip(self))]
    pub async fn get_proposal(&self, id: &str) -> Result<Proposal, Error> {
        let started = Instant::now();
        let data = self
            .query::<ProposalQuery>(proposal_query::Variables { id: id.to_string() })
            .await?;
        debug!(elapsed = ?started.elapsed(), "fetched proposal");

        let proposal = data
            .proposal
            .ok_or_else(|| Error::ProposalNotFound(id.to_string()))?;
        let mut proposal: Proposal = reshape(proposal)?;
        proposal.plugins.rename_legacy();
        Ok(proposal)
    }

    #[instrument(skip(self))]
    pub async fn get_proposal_votes(&self, id: &str, page: VotesPage) -> Result<Vec<Vote>, Error> {
        let started = Instant::now();
        let data = self
            .query::<VotesQuery>(page.into_variables(id))
            .await?;
        debug!(elapsed = ?started.elapsed(), "fetched proposal votes");

        data.votes
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(reshape)
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn get_space(&self, id: &str) -> Result<Space, Error> {
        let started = Instant::now();
        let data = self
            .query::<SpaceQuery>(space_query::Variables { id: id.to_string() })
            .await?;
        debug!(elapsed = ?started.elapsed(), "fetched space");

        reshape(data.space.ok_or_else(|| Error::SpaceNotFound(id.to_string()))?)
    }
}

/// Errors reported in the body take precedence over the HTTP status, the hub
/// answers invalid queries with a 400 and an `errors` list.
fn parse_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, Error> {
    let response: Response<T> = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(_) if !status.is_success() => return Err(Error::UnexpectedStatus(status)),
        Err(e) => return Err(e.into()),
    };
    if !status.is_success() && !matches!(&response.errors, Some(errors) if !errors.is_empty()) {
        return Err(Error::UnexpectedStatus(status));
    }
    into_data(response)
}

fn into_data<T>(response: Response<T>) -> Result<T, Error> {
    match response.errors {
        Some(errors) if !errors.is_empty() => Err(Error::GraphQl(
            errors.into_iter().map(|e| e.message).collect(),
        )),
        _ => response
            .data
            .ok_or_else(|| Error::malformed("hub response without data")),
    }
}

/// Turns a record generated from the hub schema into its `snapshot-lib`
/// counterpart, which shares the same field names.
fn reshape<F: Serialize, T: DeserializeOwned>(from: F) -> Result<T, Error> {
    Ok(serde_json::from_value(serde_json::to_value(from)?)?)
}
