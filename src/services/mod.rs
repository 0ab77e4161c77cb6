pub mod earnings_service;
pub mod referral_service;
pub mod share_service;
pub mod user_service;
pub mod withdraw_service;

pub use earnings_service::*;
pub use referral_service::*;
pub use share_service::*;
pub use user_service::*;
pub use withdraw_service::*;
