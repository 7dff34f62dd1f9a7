// Community feed: ranked post listing, posts and their comments.

pub mod comments;
pub mod handlers;
pub mod posts;
pub mod ranking;
