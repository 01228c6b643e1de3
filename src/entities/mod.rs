pub mod annual_budget;
pub mod bidding;
pub mod contract_history;
pub mod contractor;
pub mod document_sequence;
pub mod performance_rating;
pub mod program_of_work;
