// Entity Models - the office hierarchy
//
// Office → Program → Plan → Record, with Beneficiary hanging off Program.
// Each module owns its row type and the SQL that reads and writes it.
// Parent-scoped lookups (`get_x_in_y`) are the only way the API reaches a
// child, which is what keeps nested URLs honest.

pub mod office;
pub mod program;
pub mod plan;
pub mod beneficiary;
pub mod record;
pub mod user;

pub use office::Office;
pub use program::Program;
pub use plan::Plan;
pub use beneficiary::Beneficiary;
pub use record::Record;
pub use user::User;
