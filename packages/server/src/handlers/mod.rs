pub mod admin;
pub mod auth;
pub mod crazy;
pub mod league;
pub mod prediction;
pub mod result;
pub mod season;
