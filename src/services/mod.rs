pub mod closet_service;
pub use closet_service::{ActionPage, ClosetError, ClosetService};

pub mod closet_service_impl;
pub use closet_service_impl::SeaOrmClosetService;
