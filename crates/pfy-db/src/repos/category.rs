//! Category repository. Slugs are unique; collisions get `-1`, `-2`, ...

use pfy_core::entities::Category;
use pfy_core::ids::PREFIX_CATEGORY;
use pfy_core::slug::{slugify, with_suffix};

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_bool, now, parse_datetime};
use crate::service::PfyService;
use crate::updates::category::CategoryUpdate;

const SELECT_COLS: &str = "id, title, slug, creator_id, status, created_at, updated_at";

fn row_to_category(row: &libsql::Row) -> Result<Category, DatabaseError> {
    Ok(Category {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        creator_id: row.get(3)?,
        status: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl PfyService {
    pub async fn create_category(
        &self,
        creator_id: &str,
        title: &str,
    ) -> Result<Category, DatabaseError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DatabaseError::Validation("category title is required".into()));
        }
        let slug = self.unique_slug(title, None).await?;

        let now = now();
        let ts = format_datetime(&now);
        let id = self.db().generate_id(PREFIX_CATEGORY).await?;

        self.db()
            .execute_with(
                &format!("INSERT INTO categories ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)"),
                || libsql::params![id.as_str(), title, slug.as_str(), creator_id, ts.as_str()],
            )
            .await?;

        Ok(Category {
            id,
            title: title.to_string(),
            slug,
            creator_id: creator_id.to_string(),
            status: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_category(&self, id: &str) -> Result<Category, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM categories WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_category(&row)
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Category, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM categories WHERE slug = ?1"),
                || [slug],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_category(&row)
    }

    pub async fn update_category(
        &self,
        id: &str,
        update: CategoryUpdate,
    ) -> Result<Category, DatabaseError> {
        let current = self.get_category(id).await?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref title) = update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(DatabaseError::Validation("category title is required".into()));
            }
            if title != current.title {
                let slug = self.unique_slug(title, Some(id)).await?;
                sets.push(format!("title = ?{idx}"));
                params.push(title.into());
                idx += 1;
                sets.push(format!("slug = ?{idx}"));
                params.push(slug.into());
                idx += 1;
            }
        }
        if let Some(status) = update.status {
            sets.push(format!("status = ?{idx}"));
            params.push(i64::from(status).into());
            idx += 1;
        }

        if sets.is_empty() {
            return Ok(current);
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(format_datetime(&now()).into());
        idx += 1;
        params.push(id.into());

        let sql = format!("UPDATE categories SET {} WHERE id = ?{idx}", sets.join(", "));
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        self.get_category(id).await
    }

    /// Tasks in the category keep existing with `category_id` cleared.
    pub async fn delete_category(&self, id: &str) -> Result<Category, DatabaseError> {
        let current = self.get_category(id).await?;
        self.db()
            .execute_with("DELETE FROM categories WHERE id = ?1", || [id])
            .await?;
        Ok(current)
    }

    /// First free slug among `base`, `base-1`, `base-2`, ...
    ///
    /// `exclude_id` lets a category keep its own slug on rename.
    async fn unique_slug(&self, title: &str, exclude_id: Option<&str>) -> Result<String, DatabaseError> {
        let base = slugify(title);
        let exclude = exclude_id.unwrap_or("");
        let mut n = 0u32;
        loop {
            let candidate = with_suffix(&base, n);
            let mut rows = self
                .db()
                .query_with(
                    "SELECT 1 FROM categories WHERE slug = ?1 AND id != ?2",
                    || [candidate.as_str(), exclude],
                )
                .await?;
            if rows.next().await?.is_none() {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DatabaseError;
    use crate::test_support::helpers::{seed_user, test_service};
    use crate::updates::category::CategoryUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn slug_collisions_get_numeric_suffixes() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;

        let a = svc.create_category(&u.id, "Back End").await.unwrap();
        let b = svc.create_category(&u.id, "back-end").await.unwrap();
        let c = svc.create_category(&u.id, "Back  End!").await.unwrap();

        assert_eq!(a.slug, "back-end");
        assert_eq!(b.slug, "back-end-1");
        assert_eq!(c.slug, "back-end-2");
        assert_eq!(svc.get_category_by_slug("back-end-1").await.unwrap(), b);
    }

    #[tokio::test]
    async fn accented_titles_transliterate_and_collide() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;

        let a = svc.create_category(&u.id, "Café Menu").await.unwrap();
        let b = svc.create_category(&u.id, "Cafe menu").await.unwrap();

        assert_eq!(a.slug, "cafe-menu");
        assert_eq!(b.slug, "cafe-menu-1");
    }

    #[tokio::test]
    async fn rename_rederives_slug_but_keeps_own() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let cat = svc.create_category(&u.id, "Docs").await.unwrap();

        let same = svc
            .update_category(&cat.id, CategoryUpdateBuilder::new().title("Docs").build())
            .await
            .unwrap();
        assert_eq!(same.slug, "docs");

        let renamed = svc
            .update_category(&cat.id, CategoryUpdateBuilder::new().title("Design Docs").build())
            .await
            .unwrap();
        assert_eq!(renamed.slug, "design-docs");
        assert_eq!(renamed.title, "Design Docs");
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let cat = svc.create_category(&u.id, "Ops").await.unwrap();
        svc.delete_category(&cat.id).await.unwrap();
        assert!(matches!(
            svc.get_category(&cat.id).await,
            Err(DatabaseError::NoResult)
        ));
    }
}
