use uuid::Uuid;

use crate::{
    models::{CategoryMember, FriendshipCategory},
    PGPool,
};

pub async fn create(category: &FriendshipCategory, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO friendship_categories (id, owner_id, name) VALUES ($1, $2, $3)",
    )
    .bind(category.id)
    .bind(category.owner_id)
    .bind(&category.name)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<FriendshipCategory, sqlx::Error> {
    sqlx::query_as::<_, FriendshipCategory>("SELECT * FROM friendship_categories WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_by_ids(
    ids: &[Uuid],
    pool: &PGPool,
) -> Result<Vec<FriendshipCategory>, sqlx::Error> {
    sqlx::query_as::<_, FriendshipCategory>(
        "SELECT * FROM friendship_categories WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub async fn get_by_owner(
    owner_id: Uuid,
    pool: &PGPool,
) -> Result<Vec<FriendshipCategory>, sqlx::Error> {
    sqlx::query_as::<_, FriendshipCategory>(
        "SELECT * FROM friendship_categories WHERE owner_id = $1 ORDER BY name",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn delete(id: Uuid, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM friendship_categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn add_member(member: &CategoryMember, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO category_members (id, category_id, user_id) VALUES ($1, $2, $3)
        ON CONFLICT (category_id, user_id) DO NOTHING",
    )
    .bind(member.id)
    .bind(member.category_id)
    .bind(member.user_id)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

pub async fn remove_member(
    category_id: Uuid,
    user_id: Uuid,
    pool: &PGPool,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM category_members WHERE category_id = $1 AND user_id = $2")
        .bind(category_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn get_members(category_id: Uuid, pool: &PGPool) -> Result<Vec<CategoryMember>, sqlx::Error> {
    sqlx::query_as::<_, CategoryMember>("SELECT * FROM category_members WHERE category_id = $1")
        .bind(category_id)
        .fetch_all(pool)
        .await
}

/// Ids of every category (any owner) that lists `user_id` as a member. Used
/// by the hive filter to decide category-scoped visibility.
pub async fn membership_category_ids(user_id: Uuid, pool: &PGPool) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT category_id FROM category_members WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}
