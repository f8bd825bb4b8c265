use rocket::{http::Status, serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::ballot::{CountBallotRequest, CountBallotResponse},
    common::{ballot::BallotStatus, candidate::Candidate},
};
use crate::service::{Balloting, Registry};

pub fn routes() -> Vec<Route> {
    routes![count_ballot, get_all_candidates]
}

/// Count a ballot. `202 Accepted` if it was counted, `409 Conflict` with the
/// reason otherwise.
#[post("/api/count_ballot", data = "<request>", format = "json")]
fn count_ballot(
    request: Json<CountBallotRequest>,
    balloting: &State<Balloting>,
) -> Result<(Status, Json<CountBallotResponse>)> {
    let status = balloting.count_ballot(&request.ballot(), &request.voter_national_id)?;
    let code = match status {
        BallotStatus::BallotCounted => Status::Accepted,
        _ => Status::Conflict,
    };
    Ok((code, Json(status.into())))
}

#[get("/api/get_all_candidates")]
fn get_all_candidates(registry: &State<Registry>) -> Json<Vec<Candidate>> {
    Json(registry.get_all_candidates())
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::ContentType,
        local::asynchronous::{Client, LocalResponse},
        serde::json::{json, serde_json},
    };

    use super::*;
    use crate::model::common::{
        ballot::BallotNumber,
        voter::{Voter, VoterStatus},
    };

    async fn post_count<'c>(client: &'c Client, request: &CountBallotRequest) -> LocalResponse<'c> {
        client
            .post(uri!(count_ballot))
            .header(ContentType::JSON)
            .body(json!(request).to_string())
            .dispatch()
            .await
    }

    async fn status_of(response: LocalResponse<'_>) -> String {
        let raw_response = response.into_string().await.unwrap();
        serde_json::from_str::<CountBallotResponse>(&raw_response)
            .unwrap()
            .status
    }

    #[backend_test(populated)]
    async fn count_valid_ballot(client: Client, registry: Registry, balloting: Balloting) {
        let voters = Voter::examples();
        let voter = &voters[1];
        let candidate = registry.get_all_candidates().remove(1);
        let ballot_number = balloting
            .issue_ballot(&voter.national_id)
            .unwrap()
            .unwrap();
        let request = CountBallotRequest {
            chosen_candidate_id: Some(candidate.candidate_id),
            voter_comments: "Thanks, Thien".to_string(),
            ..CountBallotRequest::example(ballot_number, &voter.national_id)
        };

        let response = post_count(&client, &request).await;

        assert_eq!(Status::Accepted, response.status());
        assert_eq!(status_of(response).await, "ballot counted");
        assert_eq!(
            registry.get_voter_status(&voter.national_id),
            VoterStatus::BallotCounted
        );
        assert_eq!(balloting.compute_election_winner(), Some(candidate));
        assert!(balloting
            .get_all_ballot_comments()
            .contains("Thanks, [REDACTED NAME]"));
    }

    #[backend_test(populated)]
    async fn second_count_is_fraud(client: Client, balloting: Balloting) {
        let voters = Voter::examples();
        let voter = &voters[0];
        for _ in 0..2 {
            let ballot_number = balloting.issue_ballot(&voter.national_id).unwrap().unwrap();
            post_count(&client, &CountBallotRequest::example(ballot_number, &voter.national_id))
                .await;
        }

        let ballot_number = balloting.issue_ballot(&voter.national_id).unwrap().unwrap();
        let response = post_count(
            &client,
            &CountBallotRequest::example(ballot_number, &voter.national_id),
        )
        .await;
        assert_eq!(Status::Conflict, response.status());
        assert_eq!(
            status_of(response).await,
            BallotStatus::FraudCommitted.to_string()
        );
    }

    #[backend_test(populated)]
    async fn mismatch_is_reported_as_invalid(client: Client, balloting: Balloting) {
        let voters = Voter::examples();
        let ballot_number = balloting
            .issue_ballot(&voters[0].national_id)
            .unwrap()
            .unwrap();

        let response = post_count(
            &client,
            &CountBallotRequest::example(ballot_number, &voters[1].national_id),
        )
        .await;
        assert_eq!(Status::Conflict, response.status());
        assert_eq!(status_of(response).await, "the ballot given is invalid");
    }

    #[backend_test(populated)]
    async fn unknown_ballot_is_invalid(client: Client) {
        let voters = Voter::examples();
        let voter = &voters[0];
        let response = post_count(
            &client,
            &CountBallotRequest::example(BallotNumber::from("forged"), &voter.national_id),
        )
        .await;
        assert_eq!(Status::Conflict, response.status());
        // Not issued to this voter, so it is a mismatch, shown as invalid
        assert_eq!(status_of(response).await, "the ballot given is invalid");
    }

    #[backend_test(populated)]
    async fn unregistered_voter_is_rejected(client: Client, balloting: Balloting) {
        let voters = Voter::examples();
        let voter = &voters[0];
        let ballot_number = balloting.issue_ballot(&voter.national_id).unwrap().unwrap();
        let stranger = Voter::unregistered_example();

        let response = post_count(
            &client,
            &CountBallotRequest::example(ballot_number, &stranger.national_id),
        )
        .await;
        assert_eq!(Status::Conflict, response.status());
        assert_eq!(status_of(response).await, "voter not registered");
    }

    #[backend_test]
    async fn malformed_body_is_rejected(client: Client) {
        let response = client
            .post(uri!(count_ballot))
            .header(ContentType::JSON)
            .body(r#"{"voter_national_id": "111111111"}"#)
            .dispatch()
            .await;
        assert_eq!(Status::UnprocessableEntity, response.status());
    }

    #[backend_test(populated)]
    async fn get_all_candidates_lists_registration_order(client: Client, registry: Registry) {
        let response = client.get(uri!(get_all_candidates)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let candidates = serde_json::from_str::<Vec<Candidate>>(&raw_response).unwrap();
        assert_eq!(candidates, registry.get_all_candidates());
        assert_eq!(candidates.len(), 3);
    }

    #[backend_test]
    async fn no_candidates_by_default(client: Client) {
        let response = client.get(uri!(get_all_candidates)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(response.into_string().await.unwrap(), "[]");
    }
}
