pub mod catalog;
pub mod config;
pub mod eligibility;
pub mod output;
pub mod profile;
pub mod recommend;
pub mod session;
