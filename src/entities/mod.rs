pub mod pickup_point;
pub mod product;
pub mod reception;
pub mod user;

pub use pickup_point::City;
pub use product::ProductType;
pub use reception::ReceptionStatus;
pub use user::Role;
