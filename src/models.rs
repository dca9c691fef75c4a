pub mod goals;
pub mod ledger;
pub mod users;
