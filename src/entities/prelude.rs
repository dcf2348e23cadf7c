pub use super::diary_entry::Entity as DiaryEntry;
pub use super::user::Entity as User;
