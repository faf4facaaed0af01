use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set,
};
use std::fmt::Write;

use crate::entities::{actions, prelude::*};
use crate::models::action::{ActionFilter, NewAction, clamp_details};

pub type ActionRecord = actions::Model;

pub struct ActionRepository {
    conn: DatabaseConnection,
}

impl ActionRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Append one row to the audit log. There is no update path.
    pub async fn record(&self, action: NewAction) -> Result<ActionRecord> {
        let (target_type, target_id) = action
            .target
            .as_ref()
            .map_or((None, None), |t| (Some(t.kind().to_string()), t.id()));

        let active_model = actions::ActiveModel {
            action_type: Set(action.action_type.label().to_string()),
            user_id: Set(action.user_id),
            target_type: Set(target_type),
            target_id: Set(target_id),
            details: Set(action.details.as_deref().map(clamp_details)),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to record action")?;

        metrics::counter!("closet_actions_recorded_total", "action_type" => model.action_type.clone())
            .increment(1);

        Ok(model)
    }

    pub async fn get(&self, id: i32) -> Result<Option<ActionRecord>> {
        Actions::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query action")
    }

    fn filtered(filter: &ActionFilter) -> Select<Actions> {
        let mut query = Actions::find()
            .order_by_desc(actions::Column::Timestamp)
            .order_by_desc(actions::Column::Id);

        if let Some(action_type) = &filter.action_type {
            query = query.filter(actions::Column::ActionType.eq(action_type.as_str()));
        }

        if let Some(user_id) = filter.user_id {
            query = query.filter(actions::Column::UserId.eq(user_id));
        }

        if let Some(since) = filter.since {
            query = query.filter(actions::Column::Timestamp.gte(since));
        }

        if let Some(until) = filter.until {
            query = query.filter(actions::Column::Timestamp.lte(until));
        }

        query
    }

    /// Newest first. `page` is 1-based; pages past the end come back empty.
    pub async fn list(
        &self,
        page: u64,
        page_size: u64,
        filter: &ActionFilter,
    ) -> Result<(Vec<ActionRecord>, u64)> {
        let paginator = Self::filtered(filter).paginate(&self.conn, page_size.max(1));
        let total_pages = paginator.num_pages().await?;

        let page = page.max(1);
        if page > total_pages {
            return Ok((Vec::new(), total_pages));
        }

        let items = paginator
            .fetch_page(page - 1)
            .await
            .context("Failed to query actions")?;

        Ok((items, total_pages))
    }

    pub async fn list_all(&self, filter: &ActionFilter) -> Result<Vec<ActionRecord>> {
        Self::filtered(filter)
            .all(&self.conn)
            .await
            .context("Failed to query actions")
    }

    /// Delete every action recorded before `cutoff`.
    pub async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = Actions::delete_many()
            .filter(actions::Column::Timestamp.lt(cutoff))
            .exec(&self.conn)
            .await
            .context("Failed to prune actions")?;

        Ok(result.rows_affected)
    }

    pub async fn export_csv(&self, filter: &ActionFilter) -> Result<String> {
        let records = self.list_all(filter).await?;
        Ok(render_csv(&records))
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn render_csv(records: &[ActionRecord]) -> String {
    let mut csv = String::from("id,timestamp,action_type,user_id,target_type,target_id,details\n");
    for record in records {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{}",
            record.id,
            record.timestamp.to_rfc3339(),
            quote(&record.action_type),
            record.user_id.map(|id| id.to_string()).unwrap_or_default(),
            quote(record.target_type.as_deref().unwrap_or_default()),
            record.target_id.map(|id| id.to_string()).unwrap_or_default(),
            quote(record.details.as_deref().unwrap_or_default()),
        );
    }
    csv
}
