pub mod store;

pub use store::{FileStore, RecordStore, connect};

/// 集合名称（文件模式下同时是 data_dir 下的文件名）
pub mod collections {
    pub const USERS: &str = "users";
    pub const REFERRALS: &str = "referrals";
    pub const SHARE_POSTS: &str = "share_posts";
    pub const SHARE_RECORDS: &str = "share_records";
    pub const SHARE_VISITORS: &str = "share_visitors";
    pub const WITHDRAW_REQUESTS: &str = "withdraw_requests";
}
