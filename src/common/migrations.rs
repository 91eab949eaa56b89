// src/common/migrations.rs
//! Database schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Only drop tables if RESET_DB is set to "true" to avoid data loss on
    // ordinary restarts.
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - dropping all tables and recreating schema");
        drop_all_tables(pool).await?;
    }

    create_tables(pool).await?;
    create_indexes(pool).await?;
    seed_default_categories(pool).await?;

    info!("Database migration completed");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("DROP TABLE IF EXISTS expenses").execute(pool).await?;
    sqlx::query("DROP TABLE IF EXISTS cards").execute(pool).await?;
    sqlx::query("DROP TABLE IF EXISTS categories").execute(pool).await?;
    sqlx::query("DROP TABLE IF EXISTS users").execute(pool).await?;
    Ok(())
}

/// Create users, cards and expenses tables
pub async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            picture TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cards (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('credit', 'debit', 'prepaid')),
            credit_limit REAL,
            total_balance REAL,
            balance_left REAL,
            apple_slug TEXT,
            brand TEXT,
            last_four TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS expenses (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL CHECK (category IN ('investment', 'wants', 'need')),
            type TEXT NOT NULL CHECK (type IN ('investment', 'wants', 'need')),
            card_id TEXT NOT NULL REFERENCES cards(id),
            description TEXT,
            date TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE INDEX IF NOT EXISTS ix_expenses_user_category ON expenses(user_id, category)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS ix_expenses_card ON expenses(card_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS ix_cards_user ON cards(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS ix_users_email ON users(email)")
        .execute(pool)
        .await?;
    Ok(())
}

/// Default expense categories, keyed by slug.
const DEFAULT_CATEGORIES: [(&str, &str, &str); 12] = [
    ("Others", "others", "Miscellaneous expenses"),
    ("Gifts & Donations", "gifts-donations", "Presents, charity, and contributions"),
    ("Subscriptions", "subscriptions", "Streaming services, memberships, and recurring payments"),
    ("Personal Care", "personal-care", "Haircuts, cosmetics, and personal grooming"),
    ("Travel", "travel", "Flights, hotels, and vacation expenses"),
    ("Education", "education", "Tuition, books, courses, and learning materials"),
    ("Healthcare", "healthcare", "Medical expenses, pharmacy, and health insurance"),
    ("Bills & Utilities", "bills-utilities", "Rent, electricity, water, internet, and phone bills"),
    ("Entertainment", "entertainment", "Movies, games, hobbies, and leisure activities"),
    ("Shopping", "shopping", "Clothing, electronics, and general retail"),
    ("Transportation", "transportation", "Gas, public transit, ride-sharing, and vehicle maintenance"),
    ("Food & Dining", "food-dining", "Groceries, restaurants, and food delivery"),
];

/// Seed the default categories. Existing slugs get their name and
/// description refreshed rather than duplicated, so reruns are idempotent.
pub async fn seed_default_categories(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for (name, slug, description) in DEFAULT_CATEGORIES {
        let updated = sqlx::query("UPDATE categories SET name = ?, description = ? WHERE slug = ?")
            .bind(name)
            .bind(description)
            .bind(slug)
            .execute(pool)
            .await?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO categories (id, name, slug, description) VALUES (?, ?, ?, ?)",
            )
            .bind(crate::common::generate_category_id())
            .bind(name)
            .bind(slug)
            .bind(description)
            .execute(pool)
            .await?;
        }
    }
    Ok(())
}
