use anyhow::bail;
use async_trait::async_trait;
use sqlx::PgPool;

use super::UserStore;
use crate::models::users::{Role, User};

#[derive(Clone)]
pub struct UserRepository {
    conn: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    company: String,
    phone: String,
    role: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, anyhow::Error> {
        let role = match Role::parse(&self.role) {
            Some(role) => role,
            None => bail!("Unknown role stored for user {}: {}", self.id, self.role),
        };

        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            company: self.company,
            phone: self.phone,
            role,
        })
    }
}

impl UserRepository {
    pub fn new(conn: PgPool) -> Self {
        UserRepository { conn }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert_user(&self, user: User) -> Result<User, anyhow::Error> {
        sqlx::query(
            r#"
                INSERT INTO users (id, name, email, password_hash, company, phone, role)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.company)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .execute(&self.conn)
        .await?;

        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, anyhow::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, company, phone, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.conn)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, company, phone, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.conn)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, anyhow::Error> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, company, phone, role FROM users ORDER BY name",
        )
        .fetch_all(&self.conn)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }
}
