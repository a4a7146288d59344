pub mod create;
pub mod delete;
pub mod fields;
pub mod labels;
pub mod list;
pub mod show;

pub use create::create;
pub use delete::delete;
pub use fields::fields;
pub use labels::modify;
pub use list::{list_by_class, list_by_user};
pub use show::show;
