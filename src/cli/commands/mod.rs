pub mod db;
pub mod stats;
pub mod user;
