pub mod audit;
pub mod bias;
pub mod consent;
pub mod decision;
pub mod dispatch;
pub mod export;
pub mod init;
pub mod models;
pub mod prefs;
pub mod shared;
pub mod stats;
