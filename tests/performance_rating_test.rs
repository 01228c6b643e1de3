mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use common::{decimal_field, response_json, TestApp};

async fn seed_contractor(app: &TestApp) -> String {
    let contractor = response_json(
        app.request(
            Method::POST,
            "/api/v1/contractors",
            Some(json!({ "name": "Rated Builders Corp." })),
        )
        .await,
    )
    .await;
    contractor["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn overall_rating_averages_the_sub_scores() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({
                "contractor_id": contractor_id,
                "quality_rating": "5",
                "timeliness_rating": "4",
                "safety_rating": "4",
                "resource_rating": "4",
                "communication_rating": "3",
                "evaluated_by": "District Engineer"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let rating = response_json(response).await;
    assert_eq!(decimal_field(&rating["overall_rating"]), dec!(4.00));
}

#[tokio::test]
async fn zero_and_missing_sub_scores_are_excluded() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app).await;

    // Only the two strictly-positive scores participate: (4 + 5) / 2.
    let rating = response_json(
        app.request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({
                "contractor_id": contractor_id,
                "quality_rating": "0",
                "timeliness_rating": "4",
                "resource_rating": "5"
            })),
        )
        .await,
    )
    .await;
    assert_eq!(decimal_field(&rating["overall_rating"]), dec!(4.50));
}

#[tokio::test]
async fn rating_with_no_usable_scores_is_zero() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app).await;

    let rating = response_json(
        app.request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({ "contractor_id": contractor_id })),
        )
        .await,
    )
    .await;
    assert_eq!(decimal_field(&rating["overall_rating"]), dec!(0));

    let rating = response_json(
        app.request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({
                "contractor_id": contractor_id,
                "quality_rating": "0",
                "timeliness_rating": "0"
            })),
        )
        .await,
    )
    .await;
    assert_eq!(decimal_field(&rating["overall_rating"]), dec!(0));
}

#[tokio::test]
async fn sub_scores_outside_the_scale_are_rejected() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({
                "contractor_id": contractor_id,
                "quality_rating": "5.5"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({
                "contractor_id": contractor_id,
                "safety_rating": "-1"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rating_propagates_to_the_linked_contract() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app).await;

    let history = response_json(
        app.request(
            Method::POST,
            "/api/v1/contract-histories",
            Some(json!({
                "contractor_id": contractor_id,
                "project_name": "Slope protection",
                "contract_amount": "800000",
                "status": "Completed"
            })),
        )
        .await,
    )
    .await;
    let history_id = history["id"].as_str().unwrap().to_string();

    response_json(
        app.request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({
                "contractor_id": contractor_id,
                "contract_history_id": history_id,
                "quality_rating": "4",
                "timeliness_rating": "4",
                "safety_rating": "4"
            })),
        )
        .await,
    )
    .await;

    let history = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/contract-histories/{}", history_id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(decimal_field(&history["performance_rating"]), dec!(4.00));
}

#[tokio::test]
async fn contractor_rating_is_the_average_of_all_evaluations() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app).await;

    for scores in [("4", "4"), ("5", "5"), ("3", "4")] {
        response_json(
            app.request(
                Method::POST,
                "/api/v1/performance-ratings",
                Some(json!({
                    "contractor_id": contractor_id,
                    "quality_rating": scores.0,
                    "timeliness_rating": scores.1
                })),
            )
            .await,
        )
        .await;
    }

    // Evaluations scored 4.00, 5.00 and 3.50: the contractor carries their mean.
    let summary = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/contractors/{}/summary", contractor_id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(decimal_field(&summary["overall_rating"]), dec!(4.17));
}

#[tokio::test]
async fn update_merges_with_stored_sub_scores() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app).await;

    let rating = response_json(
        app.request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({
                "contractor_id": contractor_id,
                "quality_rating": "4",
                "timeliness_rating": "2"
            })),
        )
        .await,
    )
    .await;
    let rating_id = rating["id"].as_str().unwrap().to_string();

    // Only timeliness changes; the stored quality score still counts.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/performance-ratings/{}", rating_id),
            Some(json!({ "timeliness_rating": "5" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let rating = response_json(response).await;
    assert_eq!(decimal_field(&rating["quality_rating"]), dec!(4));
    assert_eq!(decimal_field(&rating["timeliness_rating"]), dec!(5));
    assert_eq!(decimal_field(&rating["overall_rating"]), dec!(4.50));
}

#[tokio::test]
async fn deleting_a_rating_recomputes_the_contractor() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app).await;

    let keep = response_json(
        app.request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({ "contractor_id": contractor_id, "quality_rating": "3" })),
        )
        .await,
    )
    .await;
    let drop = response_json(
        app.request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({ "contractor_id": contractor_id, "quality_rating": "5" })),
        )
        .await,
    )
    .await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/performance-ratings/{}", drop["id"].as_str().unwrap()),
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
    assert_eq!(
        decimal_field(&summary["overall_rating"]),
        decimal_field(&keep["overall_rating"])
    );
}

#[tokio::test]
async fn history_edits_do_not_clobber_the_canonical_rating() {
    let app = TestApp::new().await;
    let contractor_id = seed_contractor(&app).await;

    let history = response_json(
        app.request(
            Method::POST,
            "/api/v1/contract-histories",
            Some(json!({
                "contractor_id": contractor_id,
                "contract_amount": "100000",
                "status": "Completed"
            })),
        )
        .await,
    )
    .await;

    response_json(
        app.request(
            Method::POST,
            "/api/v1/performance-ratings",
            Some(json!({
                "contractor_id": contractor_id,
                "contract_history_id": history["id"],
                "quality_rating": "4"
            })),
        )
        .await,
    )
    .await;

    // A later history edit recomputes contract aggregates only; the overall
    // rating still comes from the evaluation rows.
    app.request(
        Method::PUT,
        &format!("/api/v1/contract-histories/{}", history["id"].as_str().unwrap()),
        Some(json!({ "contract_amount": "150000" })),
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
    assert_eq!(decimal_field(&summary["overall_rating"]), dec!(4.00));
    assert_eq!(decimal_field(&summary["total_contract_value"]), dec!(150000));
}
