pub use super::actions::Entity as Actions;
pub use super::catalog::Entity as Catalog;
pub use super::users::Entity as Users;
