pub mod action;
pub mod catalog;
pub mod user;
