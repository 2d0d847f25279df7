pub mod dispatch;
pub mod health;
pub mod stats;
