use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{ProfileUpdate, UserRow, UserStats};
use crate::state::AppState;
use crate::store::{DiaryStore, UserStore};
use crate::trends::aggregator::{summarize, EmotionGraph, Period};

pub struct ProfileService {
    users: Arc<dyn UserStore>,
    diaries: Arc<dyn DiaryStore>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserStore>, diaries: Arc<dyn DiaryStore>) -> Self {
        Self { users, diaries }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.diaries.clone())
    }

    pub async fn profile(&self, user: Uuid) -> Result<UserRow, AppError> {
        self.users
            .find_user(user)
            .await?
            .ok_or_else(AppError::user_not_found)
    }

    pub async fn update_profile(
        &self,
        user: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserRow, AppError> {
        let updated = self
            .users
            .update_profile(user, update)
            .await?
            .ok_or_else(AppError::user_not_found)?;
        info!("Updated profile for user {user}");
        Ok(updated)
    }

    pub async fn stats(&self, user: Uuid) -> Result<UserStats, AppError> {
        self.profile(user).await?;
        self.users.stats(user).await
    }

    /// Trend statistics for the window ending at `now`.
    pub async fn emotion_graph(
        &self,
        user: Uuid,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<EmotionGraph, AppError> {
        self.profile(user).await?;

        let start = period.window_start(now);
        let current = self.diaries.emotion_points_since(user, start).await?;

        let previous = match (period.previous_start(now), start) {
            (Some(prev_start), Some(start)) => self
                .diaries
                .emotion_points_since(user, Some(prev_start))
                .await?
                .into_iter()
                .filter(|p| p.date < start)
                .collect(),
            _ => Vec::new(),
        };

        Ok(summarize(&current, &previous))
    }
}
