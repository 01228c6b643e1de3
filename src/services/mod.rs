pub mod biddings;
pub mod budgets;
pub mod contract_histories;
pub mod contractors;
pub mod performance_ratings;
pub mod program_of_works;
pub mod sequences;
