pub mod biddings;
pub mod budgets;
pub mod common;
pub mod contract_histories;
pub mod contractors;
pub mod performance_ratings;
pub mod program_of_works;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub budgets: Arc<crate::services::budgets::BudgetService>,
    pub program_of_works: Arc<crate::services::program_of_works::ProgramOfWorkService>,
    pub biddings: Arc<crate::services::biddings::BiddingService>,
    pub contractors: Arc<crate::services::contractors::ContractorService>,
    pub contract_histories: Arc<crate::services::contract_histories::ContractHistoryService>,
    pub performance_ratings: Arc<crate::services::performance_ratings::PerformanceRatingService>,
}

impl AppServices {
    /// Build the service container shared by all HTTP handlers.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            budgets: Arc::new(crate::services::budgets::BudgetService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            program_of_works: Arc::new(
                crate::services::program_of_works::ProgramOfWorkService::new(
                    db_pool.clone(),
                    event_sender.clone(),
                ),
            ),
            biddings: Arc::new(crate::services::biddings::BiddingService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            contractors: Arc::new(crate::services::contractors::ContractorService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            contract_histories: Arc::new(
                crate::services::contract_histories::ContractHistoryService::new(
                    db_pool.clone(),
                    event_sender.clone(),
                ),
            ),
            performance_ratings: Arc::new(
                crate::services::performance_ratings::PerformanceRatingService::new(
                    db_pool,
                    event_sender,
                ),
            ),
        }
    }
}
