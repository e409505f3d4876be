//! Voting power computation, delegated to the score API.

use crate::error::RpcError;
use crate::{ClientConfig, Error};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snapshot_lib::vote::score_of;
use snapshot_lib::voting::{Results, VotingRegistry};
use snapshot_lib::{score_votes, Address, Proposal, ScoreMatrix, SnapshotBlock, Space, Strategy, Vote};
use std::time::Instant;
use tracing::{debug, info, instrument};

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ScoreParams {
    pub space: String,
    pub network: String,
    pub snapshot: SnapshotBlock,
    pub strategies: Vec<Strategy>,
    pub addresses: Vec<Address>,
    /// Verifiable presentation of each address, `null` when there is none.
    pub vps: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    params: &'a ScoreParams,
}

#[derive(Deserialize)]
struct ScoreResponse {
    result: Option<ScoreResult>,
    error: Option<ScoreApiError>,
}

#[derive(Deserialize)]
struct ScoreResult {
    scores: Option<ScoreMatrix>,
}

#[derive(Deserialize)]
struct ScoreApiError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Power {
    pub scores_by_strategy: Vec<f64>,
    pub total_score: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProposalResults {
    pub votes: Vec<Vote>,
    pub results: Results,
}

fn parse_scores(status: StatusCode, body: &[u8]) -> Result<ScoreMatrix, Error> {
    let response: ScoreResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(_) if !status.is_success() => return Err(Error::UnexpectedStatus(status)),
        Err(e) => return Err(e.into()),
    };
    if let Some(ScoreApiError { code, message }) = response.error {
        return Err(Error::ScoreApi(RpcError { code, message }));
    }
    if !status.is_success() {
        return Err(Error::UnexpectedStatus(status));
    }
    response
        .result
        .and_then(|result| result.scores)
        .ok_or_else(|| Error::malformed("score API response without result.scores"))
}

fn check_dimensions(scores: &ScoreMatrix, strategies: &[Strategy]) -> Result<(), Error> {
    if scores.len() < strategies.len() {
        return Err(Error::malformed(format!(
            "expected scores for {} strategies, got {}",
            strategies.len(),
            scores.len()
        )));
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct ScoreClient {
    client: reqwest::Client,
    url: String,
    issuer: Option<String>,
}

impl ScoreClient {
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        Ok(Self {
            client: config.http_client()?,
            url: config.scores_endpoint(),
            issuer: config.issuer.clone(),
        })
    }

    /// `url` is the full endpoint, including the `/api/scores` path.
    pub fn with_client(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            issuer: None,
        }
    }

    pub fn with_issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = issuer;
        self
    }

    pub async fn get_scores(&self, params: &ScoreParams) -> Result<ScoreMatrix, Error> {
        debug!(?params, "requesting scores");
        let response = self
            .client
            .post(&self.url)
            .json(&ScoreRequest { params })
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        parse_scores(status, &body)
    }

    fn params(
        &self,
        space: &Space,
        proposal: &Proposal,
        strategies: &[Strategy],
        addresses: Vec<Address>,
        vps: Vec<Value>,
    ) -> Result<ScoreParams, Error> {
        Ok(ScoreParams {
            space: space.id.clone(),
            network: proposal.network.clone(),
            snapshot: proposal.snapshot_block()?,
            strategies: strategies.to_vec(),
            addresses,
            vps,
            issuer: self.issuer.clone(),
        })
    }

    /// Voting power of `address` on `proposal`, per strategy and in total.
    #[instrument(skip(self, space, proposal, vp), fields(proposal = %proposal.id))]
    pub async fn get_power(
        &self,
        space: &Space,
        address: &str,
        proposal: &Proposal,
        vp: Option<Value>,
    ) -> Result<Power, Error> {
        let strategies = proposal.effective_strategies(space);
        let params = self.params(
            space,
            proposal,
            strategies,
            vec![address.to_string()],
            vec![vp.unwrap_or(Value::Null)],
        )?;
        let scores = self.get_scores(&params).await?;
        check_dimensions(&scores, strategies)?;

        let scores_by_strategy = (0..strategies.len())
            .map(|i| score_of(&scores, i, address))
            .collect::<Vec<_>>();
        let total_score = scores_by_strategy.iter().sum::<f64>();
        debug!(?scores_by_strategy, total_score, "got power");
        Ok(Power {
            scores_by_strategy,
            total_score,
        })
    }

    /// Scores the votes, unless the proposal is still pending, and tallies them
    /// with the voting type of the proposal.
    #[instrument(skip_all, fields(proposal = %proposal.id, votes = votes.len()))]
    pub async fn get_results(
        &self,
        space: &Space,
        proposal: &Proposal,
        votes: Vec<Vote>,
        registry: &VotingRegistry,
    ) -> Result<ProposalResults, Error> {
        let strategies = proposal.effective_strategies(space);
        let votes = if proposal.is_pending() {
            votes
        } else {
            let (voters, vps): (Vec<Address>, Vec<Value>) = votes
                .iter()
                .map(|vote| (vote.voter.clone(), vote.vps.clone().unwrap_or(Value::Null)))
                .unzip();
            let params = self.params(space, proposal, strategies, voters, vps)?;

            let started = Instant::now();
            let scores = self.get_scores(&params).await?;
            debug!(elapsed = ?started.elapsed(), "fetched proposal scores");
            check_dimensions(&scores, strategies)?;
            info!("got scores");

            score_votes(votes, strategies.len(), &scores)
        };

        let results = registry.tally(proposal, &votes, strategies)?;
        Ok(ProposalResults { votes, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubServer;
    use serde_json::json;
    use snapshot_lib::ProposalState;

    fn params() -> ScoreParams {
        ScoreParams {
            space: "gov.eth".to_string(),
            network: "1".to_string(),
            snapshot: SnapshotBlock::Number(14605788),
            strategies: vec![Strategy {
                name: "erc20-balance-of".to_string(),
                network: None,
                params: json!({ "symbol": "DAI" }),
            }],
            addresses: vec!["0xaa".to_string()],
            vps: vec![Value::Null],
            issuer: None,
        }
    }

    #[test]
    fn request_body() {
        let params = params();
        assert_eq!(
            serde_json::to_value(ScoreRequest { params: &params }).unwrap(),
            json!({
                "params": {
                    "space": "gov.eth",
                    "network": "1",
                    "snapshot": 14605788,
                    "strategies": [{ "name": "erc20-balance-of", "params": { "symbol": "DAI" } }],
                    "addresses": ["0xaa"],
                    "vps": [null]
                }
            })
        );

        let params = ScoreParams {
            snapshot: SnapshotBlock::Latest,
            issuer: Some("did:ethr:0x01".to_string()),
            ..params
        };
        let body = serde_json::to_value(ScoreRequest { params: &params }).unwrap();
        assert_eq!(body["params"]["snapshot"], json!("latest"));
        assert_eq!(body["params"]["issuer"], json!("did:ethr:0x01"));
    }

    #[test]
    fn scores_response() {
        let scores = parse_scores(
            StatusCode::OK,
            br#"{"jsonrpc": "2.0", "result": {"state": "final", "scores": [{"0xaa": 1.5}, {}]}}"#,
        )
        .unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(score_of(&scores, 0, "0xaa"), 1.5);
        assert_eq!(score_of(&scores, 1, "0xaa"), 0.0);
    }

    #[test]
    fn score_api_error() {
        let result = parse_scores(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"jsonrpc": "2.0", "error": {"code": 500, "message": "unauthorized", "data": null}}"#,
        );
        assert!(matches!(
            result,
            Err(Error::ScoreApi(RpcError { code: 500, ref message })) if message == "unauthorized"
        ));
    }

    #[test]
    fn malformed_responses() {
        assert!(matches!(
            parse_scores(StatusCode::OK, br#"{"result": {}}"#),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_scores(StatusCode::OK, b"<html></html>"),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            parse_scores(StatusCode::BAD_GATEWAY, b"<html></html>"),
            Err(Error::UnexpectedStatus(status)) if status == StatusCode::BAD_GATEWAY
        ));
    }

    #[test]
    fn missing_strategy_scores() {
        let params = params();
        let scores: ScoreMatrix = vec![];
        assert!(matches!(
            check_dimensions(&scores, &params.strategies),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn pending_proposals_are_not_scored() {
        // the endpoint is never contacted for pending proposals
        let client = ScoreClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9/api/scores");
        let space = Space {
            id: "gov.eth".to_string(),
            strategies: params().strategies,
            ..Default::default()
        };
        let proposal = Proposal {
            id: "0x01".to_string(),
            snapshot: "14605788".to_string(),
            state: ProposalState::Pending,
            voting_type: "single-choice".to_string(),
            choices: vec!["A".to_string(), "B".to_string()],
            ..Default::default()
        };
        let votes: Vec<Vote> = serde_json::from_value(json!([
            { "voter": "0xaa", "choice": 1 },
            { "voter": "0xbb", "choice": 2 }
        ]))
        .unwrap();

        let results = client
            .get_results(&space, &proposal, votes, &VotingRegistry::default())
            .await
            .unwrap();
        assert_eq!(results.votes.len(), 2);
        assert_eq!(results.results.results_by_vote_balance, vec![0.0, 0.0]);
        assert_eq!(results.results.results_by_strategy_score, vec![vec![0.0], vec![0.0]]);
    }

    #[tokio::test]
    async fn unsupported_voting_type() {
        let client = ScoreClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9/api/scores");
        let proposal = Proposal {
            state: ProposalState::Pending,
            voting_type: "futarchy".to_string(),
            ..Default::default()
        };
        let result = client
            .get_results(&Space::default(), &proposal, Vec::new(), &VotingRegistry::default())
            .await;
        assert!(matches!(result, Err(Error::Voting(_))));
    }

    fn space() -> Space {
        Space {
            id: "gov.eth".to_string(),
            strategies: params().strategies,
            ..Default::default()
        }
    }

    fn closed_proposal() -> Proposal {
        Proposal {
            id: "0x01".to_string(),
            snapshot: "14605788".to_string(),
            state: ProposalState::Closed,
            network: "1".to_string(),
            voting_type: "single-choice".to_string(),
            choices: vec!["A".to_string(), "B".to_string()],
            ..Default::default()
        }
    }

    async fn score_client(responses: Vec<(StatusCode, Value)>) -> (StubServer, ScoreClient) {
        let server = StubServer::start(responses).await;
        let url = format!("{}/api/scores", server.url);
        let client = ScoreClient::with_client(reqwest::Client::new(), &url);
        (server, client)
    }

    #[tokio::test]
    async fn power_by_strategy() {
        let (server, client) = score_client(vec![(
            StatusCode::OK,
            json!({ "result": { "scores": [{ "0xaa": 2.5 }, { "0xbb": 9.0 }, { "0xaa": 0.5 }] } }),
        )])
        .await;
        let mut proposal = closed_proposal();
        proposal.strategies = vec!["erc20-balance-of", "ticket", "delegation"]
            .into_iter()
            .map(|name| Strategy {
                name: name.to_string(),
                network: None,
                params: Value::Null,
            })
            .collect();

        let power = client
            .with_issuer(Some("did:ethr:0x01".to_string()))
            .get_power(&space(), "0xaa", &proposal, Some(json!({ "proof": "0xdead" })))
            .await
            .unwrap();
        assert_eq!(power.scores_by_strategy, vec![2.5, 0.0, 0.5]);
        assert_eq!(power.total_score, 3.0);

        let request = &server.requests()[0]["params"];
        assert_eq!(request["addresses"], json!(["0xaa"]));
        assert_eq!(request["vps"], json!([{ "proof": "0xdead" }]));
        assert_eq!(request["snapshot"], json!(14605788));
        assert_eq!(request["strategies"].as_array().map(Vec::len), Some(3));
        assert_eq!(request["issuer"], json!("did:ethr:0x01"));
    }

    #[tokio::test]
    async fn closed_proposals_are_scored_and_tallied() {
        let (server, client) = score_client(vec![(
            StatusCode::OK,
            json!({ "result": { "scores": [{ "0xaa": 1.0, "0xbb": 5.0 }] } }),
        )])
        .await;
        let votes: Vec<Vote> = serde_json::from_value(json!([
            { "voter": "0xaa", "choice": 1 },
            { "voter": "0xbb", "choice": 2, "vps": { "proof": "0xbeef" } },
            { "voter": "0xcc", "choice": 1 }
        ]))
        .unwrap();

        let results = client
            .get_results(&space(), &closed_proposal(), votes, &VotingRegistry::default())
            .await
            .unwrap();
        let scored = results
            .votes
            .iter()
            .map(|vote| (vote.voter.as_str(), vote.balance))
            .collect::<Vec<_>>();
        assert_eq!(scored, vec![("0xbb", 5.0), ("0xaa", 1.0)]);
        assert_eq!(results.results.results_by_vote_balance, vec![1.0, 5.0]);
        assert_eq!(results.results.results_by_strategy_score, vec![vec![1.0], vec![5.0]]);
        assert_eq!(results.results.sum_of_results_balance, 6.0);

        let request = &server.requests()[0]["params"];
        assert_eq!(request["addresses"], json!(["0xaa", "0xbb", "0xcc"]));
        assert_eq!(request["vps"], json!([null, { "proof": "0xbeef" }, null]));
    }

    #[tokio::test]
    async fn proposals_without_state_are_scored() {
        let (server, client) = score_client(vec![(
            StatusCode::OK,
            json!({ "result": { "scores": [{ "0xaa": 4.0 }] } }),
        )])
        .await;
        let proposal: Proposal = serde_json::from_value(json!({
            "id": "0x01",
            "snapshot": "14605788",
            "state": null,
            "type": "single-choice",
            "choices": ["A", "B"]
        }))
        .unwrap();
        let votes: Vec<Vote> = serde_json::from_value(json!([{ "voter": "0xaa", "choice": 2 }])).unwrap();

        let results = client
            .get_results(&space(), &proposal, votes, &VotingRegistry::default())
            .await
            .unwrap();
        assert_eq!(server.requests().len(), 1);
        assert_eq!(results.results.results_by_vote_balance, vec![0.0, 4.0]);
    }

    #[tokio::test]
    async fn short_score_matrix() {
        let (_server, client) = score_client(vec![(StatusCode::OK, json!({ "result": { "scores": [] } }))]).await;
        let votes: Vec<Vote> = serde_json::from_value(json!([{ "voter": "0xaa", "choice": 1 }])).unwrap();

        let result = client
            .get_results(&space(), &closed_proposal(), votes, &VotingRegistry::default())
            .await;
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn score_api_status() {
        let (_server, client) = score_client(vec![
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": { "code": 500, "message": "rate limited" } }),
            ),
            (StatusCode::SERVICE_UNAVAILABLE, json!("maintenance")),
        ])
        .await;

        let result = client.get_scores(&params()).await;
        assert!(matches!(result, Err(Error::ScoreApi(RpcError { code: 500, .. }))));
        let result = client.get_scores(&params()).await;
        assert!(matches!(
            result,
            Err(Error::UnexpectedStatus(status)) if status == StatusCode::SERVICE_UNAVAILABLE
        ));
    }
}
