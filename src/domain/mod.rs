mod account;
mod ledger;
mod money;
mod statement;
mod transaction;

pub use account::*;
pub use ledger::*;
pub use money::*;
pub use statement::*;
pub use transaction::*;
