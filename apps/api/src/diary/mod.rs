// Diary lifecycle: create / edit (re-analysis) / delete / one-time share,
// plus the writing template picked from the owner's average mood.

pub mod handlers;
pub mod lifecycle;
pub mod sharing;
pub mod template;
