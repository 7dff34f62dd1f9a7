pub mod diary;
pub mod post;
pub mod user;
