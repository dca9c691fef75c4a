use async_trait::async_trait;
use sqlx::PgPool;

use super::GoalsStore;
use crate::models::goals::Goals;

#[derive(Clone)]
pub struct GoalsRepository {
    conn: PgPool,
}

#[derive(sqlx::FromRow)]
struct GoalsRow {
    user_id: String,
    sales_goal: f64,
    cmv_target: f64,
}

impl GoalsRepository {
    pub fn new(conn: PgPool) -> Self {
        GoalsRepository { conn }
    }
}

#[async_trait]
impl GoalsStore for GoalsRepository {
    async fn get_goals(&self, user_id: &str) -> Result<Option<Goals>, anyhow::Error> {
        let row = sqlx::query_as::<_, GoalsRow>(
            "SELECT user_id, sales_goal, cmv_target FROM goals WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(row.map(|row| Goals {
            user_id: row.user_id,
            sales_goal: row.sales_goal,
            cmv_target: row.cmv_target,
        }))
    }

    async fn upsert_goals(&self, goals: Goals) -> Result<Goals, anyhow::Error> {
        sqlx::query(
            r#"
                INSERT INTO goals (user_id, sales_goal, cmv_target)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id)
                DO UPDATE SET sales_goal = EXCLUDED.sales_goal, cmv_target = EXCLUDED.cmv_target
            "#,
        )
        .bind(&goals.user_id)
        .bind(goals.sales_goal)
        .bind(goals.cmv_target)
        .execute(&self.conn)
        .await?;

        Ok(goals)
    }
}
