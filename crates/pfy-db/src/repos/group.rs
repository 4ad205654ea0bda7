//! Group repository. Members are an ordered, duplicate-free list stored in
//! `group_members.position` order.

use std::collections::HashSet;

use pfy_core::entities::Group;
use pfy_core::ids::PREFIX_GROUP;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_bool, get_opt_string, now, opt_value, parse_datetime,
};
use crate::service::PfyService;
use crate::updates::group::GroupUpdate;

const SELECT_COLS: &str =
    "id, title, description, image, creator_id, status, created_at, updated_at";

fn row_to_group(row: &libsql::Row, members: Vec<String>) -> Result<Group, DatabaseError> {
    Ok(Group {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        image: get_opt_string(row, 3)?,
        creator_id: row.get(4)?,
        members,
        status: get_bool(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Trim, drop blanks, keep first occurrence.
fn normalize_members(members: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    members
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty() && seen.insert(*m))
        .map(String::from)
        .collect()
}

impl PfyService {
    /// # Errors
    ///
    /// `Validation` on a blank title or a member id with no user row.
    pub async fn create_group(
        &self,
        creator_id: &str,
        title: &str,
        description: Option<&str>,
        image: Option<&str>,
        members: &[String],
    ) -> Result<Group, DatabaseError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DatabaseError::Validation("group title is required".into()));
        }
        let members = normalize_members(members);
        self.ensure_users_exist(&members).await?;

        let now = now();
        let ts = format_datetime(&now);
        let id = self.db().generate_id(PREFIX_GROUP).await?;

        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO user_groups ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)"
                ),
                || {
                    libsql::params_from_iter(vec![
                        libsql::Value::from(id.clone()),
                        title.into(),
                        opt_value(description),
                        opt_value(image),
                        creator_id.into(),
                        ts.clone().into(),
                    ])
                },
            )
            .await?;
        self.write_members(&id, &members).await?;

        Ok(Group {
            id,
            title: title.to_string(),
            description: description.map(String::from),
            image: image.map(String::from),
            creator_id: creator_id.to_string(),
            members,
            status: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_group(&self, id: &str) -> Result<Group, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM user_groups WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let members = self.group_members(id).await?;
        row_to_group(&row, members)
    }

    /// Member ids of a group in insertion order.
    pub async fn group_members(&self, group_id: &str) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT user_id FROM group_members WHERE group_id = ?1 ORDER BY position",
                || [group_id],
            )
            .await?;
        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(row.get::<String>(0)?);
        }
        Ok(members)
    }

    /// Groups that list `user_id` as a member, newest first.
    pub async fn list_groups_for_member(&self, user_id: &str) -> Result<Vec<Group>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT g.id, g.title, g.description, g.image, g.creator_id, g.status, \
                 g.created_at, g.updated_at \
                 FROM user_groups g JOIN group_members gm ON gm.group_id = g.id \
                 WHERE gm.user_id = ?1 ORDER BY g.created_at DESC, g.rowid",
                || [user_id],
            )
            .await?;

        let mut groups = Vec::new();
        while let Some(row) = rows.next().await? {
            let id: String = row.get(0)?;
            let members = self.group_members(&id).await?;
            groups.push(row_to_group(&row, members)?);
        }
        Ok(groups)
    }

    /// # Errors
    ///
    /// `NoResult` if the group is missing, `Forbidden` unless `actor_id`
    /// created it.
    pub async fn update_group(
        &self,
        actor_id: &str,
        group_id: &str,
        update: GroupUpdate,
    ) -> Result<Group, DatabaseError> {
        let current = self.get_group(group_id).await?;
        if current.creator_id != actor_id {
            return Err(DatabaseError::Forbidden(
                "only the group creator may modify it".into(),
            ));
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref title) = update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(DatabaseError::Validation("group title is required".into()));
            }
            sets.push(format!("title = ?{idx}"));
            params.push(title.into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(opt_value(description.as_deref()));
            idx += 1;
        }
        if let Some(ref image) = update.image {
            sets.push(format!("image = ?{idx}"));
            params.push(opt_value(image.as_deref()));
            idx += 1;
        }
        if let Some(status) = update.status {
            sets.push(format!("status = ?{idx}"));
            params.push(i64::from(status).into());
            idx += 1;
        }

        if let Some(ref members) = update.members {
            let members = normalize_members(members);
            self.ensure_users_exist(&members).await?;
            self.db()
                .execute_with("DELETE FROM group_members WHERE group_id = ?1", || [group_id])
                .await?;
            self.write_members(group_id, &members).await?;
        } else if sets.is_empty() {
            return Ok(current);
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(format_datetime(&now()).into());
        idx += 1;
        params.push(group_id.into());

        let sql = format!("UPDATE user_groups SET {} WHERE id = ?{idx}", sets.join(", "));
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        self.get_group(group_id).await
    }

    /// Deletes the group and its member rows. Tasks still pointing at it
    /// resolve to unassigned from then on.
    pub async fn delete_group(&self, actor_id: &str, group_id: &str) -> Result<Group, DatabaseError> {
        let current = self.get_group(group_id).await?;
        if current.creator_id != actor_id {
            return Err(DatabaseError::Forbidden(
                "only the group creator may delete it".into(),
            ));
        }
        self.db()
            .execute_with("DELETE FROM user_groups WHERE id = ?1", || [group_id])
            .await?;
        Ok(current)
    }

    async fn write_members(&self, group_id: &str, members: &[String]) -> Result<(), DatabaseError> {
        for (position, user_id) in (0_i64..).zip(members) {
            self.db()
                .execute_with(
                    "INSERT INTO group_members (group_id, user_id, position) VALUES (?1, ?2, ?3)",
                    || libsql::params![group_id, user_id.as_str(), position],
                )
                .await?;
        }
        Ok(())
    }

    async fn ensure_users_exist(&self, ids: &[String]) -> Result<(), DatabaseError> {
        for id in ids {
            if !self.user_exists(id).await? {
                return Err(DatabaseError::Validation(format!("unknown user '{id}'")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DatabaseError;
    use crate::test_support::helpers::{seed_user, test_service};
    use crate::updates::group::GroupUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn members_keep_order_and_drop_duplicates() {
        let svc = test_service().await;
        let a = seed_user(&svc, "Ann").await;
        let b = seed_user(&svc, "Bob").await;
        let c = seed_user(&svc, "Cy").await;

        let group = svc
            .create_group(
                &a.id,
                "Platform",
                Some("Infra"),
                None,
                &[c.id.clone(), b.id.clone(), c.id.clone(), " ".into()],
            )
            .await
            .unwrap();
        assert_eq!(group.members, vec![c.id.clone(), b.id.clone()]);

        let fetched = svc.get_group(&group.id).await.unwrap();
        assert_eq!(fetched, group);
    }

    #[tokio::test]
    async fn unknown_member_is_rejected() {
        let svc = test_service().await;
        let a = seed_user(&svc, "Ann").await;
        let err = svc
            .create_group(&a.id, "X", None, None, &["usr-nope".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn only_creator_may_update_or_delete() {
        let svc = test_service().await;
        let owner = seed_user(&svc, "Owner").await;
        let other = seed_user(&svc, "Other").await;
        let group = svc
            .create_group(&owner.id, "Team", None, None, &[other.id.clone()])
            .await
            .unwrap();

        let update = GroupUpdateBuilder::new().title("Renamed").build();
        let err = svc
            .update_group(&other.id, &group.id, update.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Forbidden(_)));
        assert!(matches!(
            svc.delete_group(&other.id, &group.id).await,
            Err(DatabaseError::Forbidden(_))
        ));

        let updated = svc.update_group(&owner.id, &group.id, update).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.members, vec![other.id.clone()]);
    }

    #[tokio::test]
    async fn update_replaces_member_list() {
        let svc = test_service().await;
        let owner = seed_user(&svc, "Owner").await;
        let m1 = seed_user(&svc, "M One").await;
        let m2 = seed_user(&svc, "M Two").await;
        let group = svc
            .create_group(&owner.id, "Team", None, None, &[m1.id.clone()])
            .await
            .unwrap();

        let update = GroupUpdateBuilder::new()
            .members(vec![m2.id.clone(), owner.id.clone()])
            .build();
        let updated = svc.update_group(&owner.id, &group.id, update).await.unwrap();
        assert_eq!(updated.members, vec![m2.id.clone(), owner.id.clone()]);
        assert!(updated.updated_at >= group.updated_at);

        let mine = svc.list_groups_for_member(&m1.id).await.unwrap();
        assert!(mine.is_empty());
        let mine = svc.list_groups_for_member(&m2.id).await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_group_and_members() {
        let svc = test_service().await;
        let owner = seed_user(&svc, "Owner").await;
        let group = svc
            .create_group(&owner.id, "Team", None, None, &[owner.id.clone()])
            .await
            .unwrap();
        svc.delete_group(&owner.id, &group.id).await.unwrap();
        assert!(svc.get_group(&group.id).await.unwrap_err().is_not_found());
        assert!(svc.group_members(&group.id).await.unwrap().is_empty());
    }
}
