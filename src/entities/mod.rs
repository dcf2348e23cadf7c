pub mod diary_entry;
pub mod user;

pub use diary_entry::Entity as DiaryEntry;
pub use user::Entity as User;

pub mod prelude;
