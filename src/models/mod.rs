pub mod action;
pub mod catalog;
pub mod password;
pub mod user;
