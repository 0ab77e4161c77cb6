pub mod email;
pub mod fingerprint;
pub mod referral_code;

pub use email::*;
pub use fingerprint::device_fingerprint;
pub use referral_code::generate_referral_code;
