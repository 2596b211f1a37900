pub mod error;
pub mod loan;
pub mod prompt;
pub mod report;
pub mod request;
