pub mod common;
pub mod earnings;
pub mod pagination;
pub mod referral;
pub mod share;
pub mod user;
pub mod withdraw;

pub use common::*;
pub use earnings::*;
pub use pagination::*;
pub use referral::*;
pub use share::*;
pub use user::*;
pub use withdraw::*;
