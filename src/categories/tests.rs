//! Tests for categories module
//!
//! These tests verify category functionality including:
//! - Slug derivation and payload validation
//! - Duplicate-slug rejection on create and rename
//! - Seeded defaults and search
//! - The referential delete guard against expenses

#[cfg(test)]
mod tests {
    use super::super::models::{CategoryListQuery, CreateCategoryRequest, UpdateCategoryRequest};
    use super::super::services::CategoriesService;
    use super::super::validators::slugify;
    use crate::common::{migrations, ApiError, Validator};
    use sqlx::SqlitePool;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        migrations::create_tables(&pool).await.unwrap();
        migrations::seed_default_categories(&pool).await.unwrap();
        pool
    }

    fn category_request(name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: Some(name.to_string()),
            description: None,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Food & Dining"), "food-dining");
        assert_eq!(slugify("  Personal_Care "), "personal-care");
        assert_eq!(slugify("Bills & Utilities"), "bills-utilities");
        assert_eq!(slugify("Travel"), "travel");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_name_required_and_sluggable() {
        let request = CreateCategoryRequest {
            name: None,
            description: None,
        };
        assert!(!request.validate(&request).is_valid);

        let request = category_request("   ");
        assert!(!request.validate(&request).is_valid);

        let request = category_request("&&&");
        assert!(!request.validate(&request).is_valid);

        let request = category_request("Pets");
        assert!(request.validate(&request).is_valid);
    }

    #[tokio::test]
    async fn test_create_and_get_category() {
        let pool = test_pool().await;
        let service = CategoriesService::new(pool);

        let mut request = category_request("Pet Supplies");
        request.description = Some("Food, toys, and vet visits".to_string());
        let category = service.create_category(request).await.unwrap();

        assert!(category.id.starts_with("CT_"));
        assert_eq!(category.name, "Pet Supplies");
        assert_eq!(category.slug, "pet-supplies");

        let fetched = service.get_category(&category.id).await.unwrap();
        assert_eq!(fetched.slug, "pet-supplies");
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let pool = test_pool().await;
        let service = CategoriesService::new(pool);

        // "Travel" is part of the seed set, so the slug is already taken
        let result = service.create_category(category_request("Travel")).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));

        // Different casing and punctuation still collide after slugging
        service
            .create_category(category_request("Pet Supplies"))
            .await
            .unwrap();
        let result = service
            .create_category(category_request("  pet_supplies "))
            .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_seed_defaults_present_and_idempotent() {
        let pool = test_pool().await;

        // Reseeding must not duplicate rows
        migrations::seed_default_categories(&pool).await.unwrap();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 12);

        let service = CategoriesService::new(pool);
        let query = CategoryListQuery {
            page: None,
            limit: Some(100),
            search: Some("food".to_string()),
            sort: None,
            order: None,
        };
        let params = CategoriesService::resolve_list_params(&query).unwrap();
        let page = service.list_categories(&params).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].slug, "food-dining");
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let pool = test_pool().await;
        let service = CategoriesService::new(pool);

        let query = CategoryListQuery {
            page: Some(1),
            limit: Some(5),
            search: None,
            sort: Some("name".to_string()),
            order: Some("asc".to_string()),
        };
        let params = CategoriesService::resolve_list_params(&query).unwrap();
        let page = service.list_categories(&params).await.unwrap();

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.pagination.total_items, 12);
        let names: Vec<_> = page.items.iter().map(|c| c.name.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_invalid_sort_and_order_rejected() {
        let query = CategoryListQuery {
            page: None,
            limit: None,
            search: None,
            sort: Some("popularity".to_string()),
            order: None,
        };
        assert!(matches!(
            CategoriesService::resolve_list_params(&query),
            Err(ApiError::Validation(_))
        ));

        let query = CategoryListQuery {
            page: None,
            limit: None,
            search: None,
            sort: None,
            order: Some("sideways".to_string()),
        };
        assert!(matches!(
            CategoriesService::resolve_list_params(&query),
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_reslugs_and_checks_collisions() {
        let pool = test_pool().await;
        let service = CategoriesService::new(pool);

        let category = service
            .create_category(category_request("Pet Supplies"))
            .await
            .unwrap();

        let update = UpdateCategoryRequest {
            name: Some("Pet Care".to_string()),
            description: None,
        };
        let updated = service.update_category(&category.id, update).await.unwrap();
        assert_eq!(updated.name, "Pet Care");
        assert_eq!(updated.slug, "pet-care");

        // Renaming onto a seeded category's slug must fail
        let update = UpdateCategoryRequest {
            name: Some("Travel".to_string()),
            description: None,
        };
        let result = service.update_category(&category.id, update).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));

        // Re-saving the category under its own name is not a collision
        let update = UpdateCategoryRequest {
            name: Some("Pet Care".to_string()),
            description: Some("Vet visits".to_string()),
        };
        let updated = service.update_category(&category.id, update).await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("Vet visits"));
    }

    #[tokio::test]
    async fn test_delete_guard_blocks_referenced_category() {
        let pool = test_pool().await;
        let service = CategoriesService::new(pool.clone());

        // "Need" slugs to the value expenses actually store in `category`
        let category = service
            .create_category(category_request("Need"))
            .await
            .unwrap();
        assert_eq!(category.slug, "need");

        sqlx::query("INSERT INTO users (id, email, name) VALUES ('U_TEST01', 'a@test.com', 'A')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO cards (id, user_id, name, type, credit_limit)
             VALUES ('C_TEST01', 'U_TEST01', 'Visa', 'credit', 5000.0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO expenses (id, user_id, title, amount, category, type, card_id)
             VALUES ('E_TEST01', 'U_TEST01', 'Lunch', 15.5, 'need', 'need', 'C_TEST01')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = service.delete_category(&category.id).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));

        sqlx::query("DELETE FROM expenses WHERE id = 'E_TEST01'")
            .execute(&pool)
            .await
            .unwrap();

        service.delete_category(&category.id).await.unwrap();
        let result = service.get_category(&category.id).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
