pub use super::admins::Entity as Admins;
pub use super::cart_items::Entity as CartItems;
pub use super::categories::Entity as Categories;
pub use super::cities::Entity as Cities;
pub use super::countries::Entity as Countries;
pub use super::order_items::Entity as OrderItems;
pub use super::orders::Entity as Orders;
pub use super::products::Entity as Products;
pub use super::states::Entity as States;
pub use super::users::Entity as Users;
