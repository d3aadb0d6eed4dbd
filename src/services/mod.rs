pub mod coupon;
pub mod invoice;
pub mod password;
pub mod upload;

pub use coupon::discount_for_code;
pub use invoice::render_invoice;
pub use password::{hash_password, verify_password};
pub use upload::UploadService;
