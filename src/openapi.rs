use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the procurement API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Public Works Procurement API",
        version = "1.0.0",
        description = r#"
Procurement-lifecycle backend for a public-works operations portal.

## Features

- **Annual Budgets**: ledger of allocated and remaining amounts per fiscal year
- **Programs of Work**: planned projects moving from draft through bidding to award
- **Biddings**: the procurement process; awarding propagates to the owning program of work
- **Contractors**: registry with derived aggregate statistics (contract counts, total value, overall rating)
- **Contract Histories**: past and current contracts feeding the contractor aggregates
- **Performance Ratings**: five-sub-score evaluations rolled into a single overall rating

## Consistency rules

Budget allocations, program-of-work status, bidding status and contractor
aggregates are kept mutually consistent: each multi-entity operation runs
inside one database transaction, and aggregate fields are recomputed from
scratch on every mutation.

## Error Handling

Failing endpoints return a consistent error payload:

```json
{
  "error": "Bad Request",
  "message": "Validation failed",
  "timestamp": "2026-01-01T00:00:00Z"
}
```
"#,
        contact(name = "Public Works Engineering", email = "engineering@pubworks.example")
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::services::budgets::CreateBudgetRequest,
        crate::services::budgets::BudgetResponse,
        crate::services::program_of_works::CreatePowRequest,
        crate::services::program_of_works::UpdatePowRequest,
        crate::services::program_of_works::PowResponse,
        crate::services::biddings::CreateBiddingRequest,
        crate::services::biddings::UpdateBiddingRequest,
        crate::services::biddings::BiddingResponse,
        crate::services::contractors::CreateContractorRequest,
        crate::services::contractors::UpdateContractorRequest,
        crate::services::contractors::ContractorResponse,
        crate::services::contract_histories::CreateContractHistoryRequest,
        crate::services::contract_histories::UpdateContractHistoryRequest,
        crate::services::contract_histories::ContractHistoryResponse,
        crate::services::performance_ratings::CreatePerformanceRatingRequest,
        crate::services::performance_ratings::UpdatePerformanceRatingRequest,
        crate::services::performance_ratings::PerformanceRatingResponse,
    )),
    tags(
        (name = "budgets", description = "Annual budget ledger"),
        (name = "program-of-works", description = "Program-of-work lifecycle"),
        (name = "biddings", description = "Bidding lifecycle"),
        (name = "contractors", description = "Contractor registry and aggregates"),
        (name = "contract-histories", description = "Contract history records"),
        (name = "performance-ratings", description = "Performance evaluations")
    )
)]
pub struct ApiDoc;

/// Swagger UI router mounted at /swagger-ui.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
