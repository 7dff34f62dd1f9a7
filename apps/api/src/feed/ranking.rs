//! Viewer-affinity bias applied on top of the store's sort order.

use crate::models::post::{PostCategory, PostRow};
use crate::models::user::Affinity;

/// Moves every item matching `is_preferred` ahead of the rest.
///
/// Stable two-bucket partition: the relative order inside each bucket is the
/// order the items arrived in.
pub fn prioritize_by<T>(items: Vec<T>, is_preferred: impl Fn(&T) -> bool) -> Vec<T> {
    let (mut preferred, rest): (Vec<T>, Vec<T>) = items.into_iter().partition(|i| is_preferred(i));
    preferred.extend(rest);
    preferred
}

/// Reorders an already sorted page for the viewer.
///
/// The bias only applies when the viewer did not pick a category and their
/// affinity is known; otherwise the page is returned as sorted.
pub fn rank_page(
    page: Vec<PostRow>,
    viewer_affinity: Option<Affinity>,
    category_filter: Option<PostCategory>,
) -> Vec<PostRow> {
    match (viewer_affinity, category_filter) {
        (Some(affinity), None) => {
            let preferred = PostCategory::from(affinity);
            prioritize_by(page, |p| p.category == preferred)
        }
        _ => page,
    }
}
