use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::analysis::EmotionAnalysis;
use crate::errors::AppError;
use crate::models::diary::{DiaryRow, EmotionDataPoint, NewDiary};
use crate::models::post::{CommentRow, NewComment, NewPost, PostQuery, PostRow, PostSort};
use crate::models::user::{ProfileUpdate, UserRow, UserStats};
use crate::pagination::offset;
use crate::store::{CommentStore, DiaryStore, PostStore, ShareOutcome, UserStore};

/// PostgreSQL implementation of every store port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Shared by plain post creation and the share transaction.
async fn insert_post_row<'e, E>(executor: E, post: &NewPost) -> Result<PostRow, AppError>
where
    E: PgExecutor<'e>,
{
    Ok(sqlx::query_as(
        r#"
        INSERT INTO posts
            (id, user_id, diary_id, category, title, content, is_anonymous,
             author_nickname, comment_count)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(post.user_id)
    .bind(post.diary_id)
    .bind(post.category)
    .bind(&post.title)
    .bind(&post.content)
    .bind(post.is_anonymous)
    .bind(&post.author_nickname)
    .fetch_one(executor)
    .await?)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRow>, AppError> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<UserRow>, AppError> {
        Ok(sqlx::query_as(
            r#"
            UPDATE users
            SET nickname = COALESCE($2, nickname),
                affinity = COALESCE($3, affinity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.nickname.as_deref())
        .bind(update.affinity)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn stats(&self, id: Uuid) -> Result<UserStats, AppError> {
        let count = |sql: &'static str| {
            sqlx::query_scalar::<_, i64>(sql)
                .bind(id)
                .fetch_one(&self.pool)
        };
        let (diary_count, post_count, comment_count) = tokio::try_join!(
            count("SELECT COUNT(*) FROM diaries WHERE user_id = $1"),
            count("SELECT COUNT(*) FROM posts WHERE user_id = $1"),
            count("SELECT COUNT(*) FROM comments WHERE user_id = $1"),
        )?;
        Ok(UserStats {
            diary_count,
            post_count,
            comment_count,
        })
    }
}

#[async_trait]
impl DiaryStore for PgStore {
    async fn find_diary(&self, owner: Uuid, id: Uuid) -> Result<Option<DiaryRow>, AppError> {
        Ok(
            sqlx::query_as("SELECT * FROM diaries WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_diaries(
        &self,
        owner: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<DiaryRow>, i64), AppError> {
        let items = sqlx::query_as(
            "SELECT * FROM diaries WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner)
        .bind(i64::from(limit))
        .bind(offset(page, limit))
        .fetch_all(&self.pool)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM diaries WHERE user_id = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok((items, total))
    }

    async fn insert_diary(&self, diary: NewDiary) -> Result<DiaryRow, AppError> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO diaries
                (id, user_id, content, emotion_score, emotion_keywords, comfort_message, is_shared)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(diary.user_id)
        .bind(&diary.content)
        .bind(diary.emotion_score)
        .bind(&diary.emotion_keywords)
        .bind(&diary.comfort_message)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_analysis(
        &self,
        owner: Uuid,
        id: Uuid,
        content: &str,
        analysis: &EmotionAnalysis,
    ) -> Result<Option<DiaryRow>, AppError> {
        Ok(sqlx::query_as(
            r#"
            UPDATE diaries
            SET content = $3, emotion_score = $4, emotion_keywords = $5,
                comfort_message = $6, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(content)
        .bind(analysis.emotion_score)
        .bind(&analysis.emotion_keywords)
        .bind(&analysis.comfort_message)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_diary(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM diaries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn share_diary(
        &self,
        owner: Uuid,
        id: Uuid,
        post: NewPost,
    ) -> Result<ShareOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // The claim takes the row lock, so a concurrent share or delete waits
        // for this transaction and then sees its outcome.
        let claimed = sqlx::query(
            r#"
            UPDATE diaries SET is_shared = TRUE, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND is_shared = FALSE
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() != 1 {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM diaries WHERE id = $1 AND user_id = $2)",
            )
            .bind(id)
            .bind(owner)
            .fetch_one(&mut *tx)
            .await?;
            tx.rollback().await?;
            return Ok(if exists {
                ShareOutcome::AlreadyShared
            } else {
                ShareOutcome::Missing
            });
        }

        let post = insert_post_row(&mut *tx, &post).await?;

        let linked: Option<DiaryRow> = sqlx::query_as(
            r#"
            UPDATE diaries SET post_id = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(post.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(diary) = linked else {
            tx.rollback().await?;
            return Ok(ShareOutcome::Missing);
        };

        tx.commit().await?;
        Ok(ShareOutcome::Shared { diary, post })
    }

    async fn average_score(&self, owner: Uuid) -> Result<f64, AppError> {
        let avg: Option<f64> =
            sqlx::query_scalar("SELECT AVG(emotion_score)::FLOAT8 FROM diaries WHERE user_id = $1")
                .bind(owner)
                .fetch_one(&self.pool)
                .await?;
        Ok(avg.unwrap_or(0.0))
    }

    async fn emotion_points_since(
        &self,
        owner: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<EmotionDataPoint>, AppError> {
        Ok(sqlx::query_as(
            r#"
            SELECT created_at AS date, emotion_score
            FROM diaries
            WHERE user_id = $1 AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner)
        .bind(since)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn find_post(&self, id: Uuid) -> Result<Option<PostRow>, AppError> {
        Ok(sqlx::query_as("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_posts(&self, query: PostQuery) -> Result<(Vec<PostRow>, i64), AppError> {
        let order_by = match query.sort {
            PostSort::Latest => "created_at DESC",
            PostSort::MostCommented => "comment_count DESC, created_at DESC",
        };
        let sql = format!(
            "SELECT * FROM posts \
             WHERE ($1::post_category IS NULL OR category = $1) \
             ORDER BY {order_by} LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as(&sql)
            .bind(query.category)
            .bind(i64::from(query.limit))
            .bind(offset(query.page, query.limit))
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE ($1::post_category IS NULL OR category = $1)",
        )
        .bind(query.category)
        .fetch_one(&self.pool)
        .await?;
        Ok((items, total))
    }

    async fn insert_post(&self, post: NewPost) -> Result<PostRow, AppError> {
        insert_post_row(&self.pool, &post).await
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment_comment_count(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE posts SET comment_count = comment_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn decrement_comment_count(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE posts SET comment_count = GREATEST(comment_count - 1, 0) WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn find_comment(&self, id: Uuid) -> Result<Option<CommentRow>, AppError> {
        Ok(sqlx::query_as("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentRow>, AppError> {
        Ok(
            sqlx::query_as("SELECT * FROM comments WHERE post_id = $1 ORDER BY created_at ASC")
                .bind(post_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRow, AppError> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO comments (id, post_id, user_id, content, is_anonymous, author_nickname)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .bind(comment.is_anonymous)
        .bind(&comment.author_nickname)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
