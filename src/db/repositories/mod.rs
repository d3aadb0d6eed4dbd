pub mod admin;
pub mod cart;
pub mod category;
pub mod ids;
pub mod location;
pub mod order;
pub mod product;
pub mod user;
