pub mod prelude;

pub mod admins;
pub mod cart_items;
pub mod categories;
pub mod cities;
pub mod countries;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod states;
pub mod users;
