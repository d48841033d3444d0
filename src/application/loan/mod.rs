mod errors;
mod loan_service;

pub use errors::{LoanApplicationError, Result};
pub use loan_service::{get_loan, get_loan_details, list_loans, open_loan, return_loan};
