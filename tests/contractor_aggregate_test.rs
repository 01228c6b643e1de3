mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use common::{decimal_field, response_json, TestApp};

async fn seed_contractor(app: &TestApp, name: &str) -> String {
    let contractor = response_json(
        app.request(
            Method::POST,
            "/api/v1/contractors",
            Some(json!({ "name": name, "tin": "123-456-789-000" })),
        )
        .await,
    )
    .await;
    contractor["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn new_contractor_has_zero_aggregates() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/contractors",
            Some(json!({ "name": "Highlands Construction" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let contractor = response_json(response).await;
    assert_eq!(contractor["status"], "Active");
    assert_eq!(contractor["total_contracts"], 0);
    assert_eq!(contractor["completed_contracts"], 0);
    assert_eq!(contractor["ongoing_contracts"], 0);
    assert_eq!(decimal_field(&contractor["total_contract_value"]), dec!(0));
    assert_eq!(decimal_field(&contractor["overall_rating"]), dec!(0));
}

#[tokio::test]
async fn history_mutations_keep_aggregates_in_step() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app, "Kalinga Roadworks").await;

    let first = response_json(
        app.request(
            Method::POST,
            "/api/v1/contract-histories",
            Some(json!({
                "contractor_id": contractor_id,
                "project_name": "River dike",
                "contract_amount": "400000",
                "status": "Completed"
            })),
        )
        .await,
    )
    .await;

    response_json(
        app.request(
            Method::POST,
            "/api/v1/contract-histories",
            Some(json!({
                "contractor_id": contractor_id,
                "project_name": "Access road",
                "contract_amount": "600000",
                "status": "Ongoing"
            })),
        )
        .await,
    )
    .await;

    let summary = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/contractors/{}/summary", contractor_id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(summary["total_contracts"], 2);
    assert_eq!(summary["completed_contracts"], 1);
    assert_eq!(summary["ongoing_contracts"], 1);
    assert_eq!(decimal_field(&summary["total_contract_value"]), dec!(1000000));

    // Flipping the ongoing contract to terminated drops it from both counters
    // but not from the total.
    let second_list = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/contract-histories?contractor_id={}", contractor_id),
            None,
        )
        .await,
    )
    .await;
    let second_id = second_list
        .as_array()
        .unwrap()
        .iter()
        .find(|h| h["project_name"] == "Access road")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/contract-histories/{}", second_id),
            Some(json!({ "status": "Terminated" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let summary = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/contractors/{}/summary", contractor_id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(summary["total_contracts"], 2);
    assert_eq!(summary["completed_contracts"], 1);
    assert_eq!(summary["ongoing_contracts"], 0);

    // Deleting the completed contract removes its amount from the total.
    let first_id = first["id"].as_str().unwrap();
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/contract-histories/{}", first_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let summary = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/contractors/{}/summary", contractor_id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(summary["total_contracts"], 1);
    assert_eq!(summary["completed_contracts"], 0);
    assert_eq!(decimal_field(&summary["total_contract_value"]), dec!(600000));
}

#[tokio::test]
async fn null_contract_amounts_count_as_zero() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app, "Benguet Aggregates").await;

    response_json(
        app.request(
            Method::POST,
            "/api/v1/contract-histories",
            Some(json!({
                "contractor_id": contractor_id,
                "project_name": "Negotiated repair, amount pending"
            })),
        )
        .await,
    )
    .await;

    let summary = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/contractors/{}/summary", contractor_id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(summary["total_contracts"], 1);
    assert_eq!(summary["ongoing_contracts"], 1);
    assert_eq!(decimal_field(&summary["total_contract_value"]), dec!(0));
}

#[tokio::test]
async fn history_for_unknown_contractor_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/contract-histories",
            Some(json!({
                "contractor_id": Uuid::new_v4(),
                "project_name": "Ghost project",
                "contract_amount": "1"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_list_filters_by_contractor() {
    let app = TestApp::new().await;
    let first = seed_contractor(&app, "Contractor A").await;
    let second = seed_contractor(&app, "Contractor B").await;

    for contractor_id in [&first, &first, &second] {
        response_json(
            app.request(
                Method::POST,
                "/api/v1/contract-histories",
                Some(json!({
                    "contractor_id": contractor_id,
                    "contract_amount": "1000"
                })),
            )
            .await,
        )
        .await;
    }

    let list = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/contract-histories?contractor_id={}", first),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(list.as_array().unwrap().len(), 2);

    let list = response_json(
        app.request(Method::GET, "/api/v1/contract-histories", None).await,
    )
    .await;
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn aggregates_are_not_patchable_through_the_registry() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app, "Immutable Aggregates Inc.").await;

    // Unknown fields in the patch body are ignored rather than applied.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/contractors/{}", contractor_id),
            Some(json!({ "name": "Renamed Inc.", "total_contracts": 99 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let contractor = response_json(response).await;
    assert_eq!(contractor["name"], "Renamed Inc.");
    assert_eq!(contractor["total_contracts"], 0);
}
