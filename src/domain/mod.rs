pub mod book;
pub mod commands;
pub mod errors;
pub mod loan;
pub mod patron;
pub mod value_objects;

pub use book::*;
pub use errors::*;
pub use loan::{Loan, LoanDetails, LoanStatus, NewLoan};
pub use patron::*;
pub use value_objects::*;
