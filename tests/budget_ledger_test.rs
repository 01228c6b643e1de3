mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use common::{decimal_field, response_json, TestApp};

#[tokio::test]
async fn budget_starts_with_nothing_allocated() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/budgets",
            Some(json!({
                "fiscal_year": 2026,
                "total_budget": "1000000",
                "description": "General fund, infrastructure"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let budget = response_json(response).await;
    assert_eq!(budget["fiscal_year"], 2026);
    assert_eq!(budget["status"], "Draft");
    assert_eq!(decimal_field(&budget["total_budget"]), dec!(1000000));
    assert_eq!(decimal_field(&budget["allocated_amount"]), dec!(0));
    assert_eq!(decimal_field(&budget["remaining_amount"]), dec!(1000000));
}

#[tokio::test]
async fn pow_creation_debits_the_linked_budget() {
    let app = TestApp::new().await;

    let budget = response_json(
        app.request(
            Method::POST,
            "/api/v1/budgets",
            Some(json!({ "fiscal_year": 2026, "total_budget": "1000000" })),
        )
        .await,
    )
    .await;
    let budget_id = budget["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/program-of-works",
            Some(json!({
                "title": "Farm-to-market road, Phase 1",
                "estimated_cost": "300000",
                "fiscal_year": 2026,
                "budget_id": budget_id
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let pow = response_json(response).await;
    assert_eq!(pow["pow_number"], "POW-2026-001");
    assert_eq!(pow["status"], "Draft");
    assert_eq!(pow["budget_id"].as_str().unwrap(), budget_id);

    let budget = response_json(
        app.request(Method::GET, &format!("/api/v1/budgets/{}", budget_id), None)
            .await,
    )
    .await;
    assert_eq!(decimal_field(&budget["allocated_amount"]), dec!(300000));
    assert_eq!(decimal_field(&budget["remaining_amount"]), dec!(700000));
}

#[tokio::test]
async fn pow_deletion_credits_the_budget_back() {
    let app = TestApp::new().await;

    let budget = response_json(
        app.request(
            Method::POST,
            "/api/v1/budgets",
            Some(json!({ "fiscal_year": 2026, "total_budget": "1000000" })),
        )
        .await,
    )
    .await;
    let budget_id = budget["id"].as_str().unwrap().to_string();

    let pow = response_json(
        app.request(
            Method::POST,
            "/api/v1/program-of-works",
            Some(json!({
                "title": "Drainage improvement",
                "estimated_cost": "250000",
                "fiscal_year": 2026,
                "budget_id": budget_id
            })),
        )
        .await,
    )
    .await;
    let pow_id = pow["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/program-of-works/{}", pow_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let budget = response_json(
        app.request(Method::GET, &format!("/api/v1/budgets/{}", budget_id), None)
            .await,
    )
    .await;
    assert_eq!(decimal_field(&budget["allocated_amount"]), dec!(0));
    assert_eq!(decimal_field(&budget["remaining_amount"]), dec!(1000000));
}

#[tokio::test]
async fn pow_numbers_count_per_fiscal_year() {
    let app = TestApp::new().await;

    for i in 1..=5 {
        let pow = response_json(
            app.request(
                Method::POST,
                "/api/v1/program-of-works",
                Some(json!({
                    "title": format!("Project {}", i),
                    "estimated_cost": "10000",
                    "fiscal_year": 2026
                })),
            )
            .await,
        )
        .await;
        assert_eq!(
            pow["pow_number"].as_str().unwrap(),
            format!("POW-2026-{:03}", i)
        );
    }

    // A different fiscal year starts back at 001.
    let pow = response_json(
        app.request(
            Method::POST,
            "/api/v1/program-of-works",
            Some(json!({
                "title": "Next year carry-over",
                "estimated_cost": "10000",
                "fiscal_year": 2027
            })),
        )
        .await,
    )
    .await;
    assert_eq!(pow["pow_number"], "POW-2027-001");

    let listed = response_json(
        app.request(Method::GET, "/api/v1/program-of-works?fiscal_year=2026", None)
            .await,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 5);

    let listed = response_json(
        app.request(Method::GET, "/api/v1/program-of-works?fiscal_year=2027", None)
            .await,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn budget_list_filters_by_fiscal_year() {
    let app = TestApp::new().await;

    for (year, total) in [(2025, "800000"), (2026, "1000000")] {
        response_json(
            app.request(
                Method::POST,
                "/api/v1/budgets",
                Some(json!({ "fiscal_year": year, "total_budget": total })),
            )
            .await,
        )
        .await;
    }

    let listed = response_json(
        app.request(Method::GET, "/api/v1/budgets?fiscal_year=2025", None)
            .await,
    )
    .await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(decimal_field(&listed[0]["total_budget"]), dec!(800000));

    let listed = response_json(app.request(Method::GET, "/api/v1/budgets", None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn over_allocation_drives_remaining_negative() {
    let app = TestApp::new().await;

    let budget = response_json(
        app.request(
            Method::POST,
            "/api/v1/budgets",
            Some(json!({ "fiscal_year": 2026, "total_budget": "500000" })),
        )
        .await,
    )
    .await;
    let budget_id = budget["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/program-of-works",
            Some(json!({
                "title": "Multi-year bridge",
                "estimated_cost": "2000000",
                "fiscal_year": 2026,
                "budget_id": budget_id
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let budget = response_json(
        app.request(Method::GET, &format!("/api/v1/budgets/{}", budget_id), None)
            .await,
    )
    .await;
    assert_eq!(decimal_field(&budget["allocated_amount"]), dec!(2000000));
    assert_eq!(decimal_field(&budget["remaining_amount"]), dec!(-1500000));
}

#[tokio::test]
async fn pow_with_dangling_budget_still_creates() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/program-of-works",
            Some(json!({
                "title": "Orphaned reference",
                "estimated_cost": "100000",
                "fiscal_year": 2026,
                "budget_id": uuid::Uuid::new_v4()
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn budget_rejects_out_of_range_fiscal_year() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/budgets",
            Some(json!({ "fiscal_year": 1776, "total_budget": "1000" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
