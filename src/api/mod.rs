pub mod device;
pub mod diary;
pub mod response;

pub use response::ApiResponse;
