use crate::entities::task;
use async_trait::async_trait;
use sea_orm::*;

use super::{NewTask, StoreError, Task, TaskStore};

/// Task store backed by the `scheduler` table.
#[derive(Clone, Debug)]
pub struct SeaOrmTaskStore {
    db: DatabaseConnection,
}

impl SeaOrmTaskStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: u32) -> Result<task::Model, StoreError> {
        task::Entity::find_by_id(row_id(id)?)
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn fetch(
        &self,
        query: Select<task::Entity>,
        limit: u64,
    ) -> Result<Vec<Task>, StoreError> {
        let tasks = query
            .order_by_asc(task::Column::Date)
            .order_by_asc(task::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }
}

/// Converts a task ID to its column type; IDs past `i32::MAX` cannot exist.
fn row_id(id: u32) -> Result<i32, StoreError> {
    i32::try_from(id).map_err(|_| StoreError::NotFound(id))
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id as u32,
            model.date,
            model.title,
            model.comment,
            model.repeat,
        )
    }
}

#[async_trait]
impl TaskStore for SeaOrmTaskStore {
    #[tracing::instrument(skip(self))]
    async fn create(&self, task: NewTask) -> Result<u32, StoreError> {
        let active_model = task::ActiveModel {
            date: ActiveValue::Set(task.date),
            title: ActiveValue::Set(task.title),
            comment: ActiveValue::Set(task.comment),
            repeat: ActiveValue::Set(task.repeat),
            ..Default::default()
        };
        let created_model = active_model.insert(&self.db).await?;
        Ok(created_model.id as u32)
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: u32) -> Result<Task, StoreError> {
        Ok(Task::from(self.find_model(id).await?))
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, task: Task) -> Result<(), StoreError> {
        let mut active_model: task::ActiveModel = self.find_model(task.id()).await?.into();
        active_model.date = ActiveValue::Set(task.date);
        active_model.title = ActiveValue::Set(task.title);
        active_model.comment = ActiveValue::Set(task.comment);
        active_model.repeat = ActiveValue::Set(task.repeat);
        active_model.update(&self.db).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: u32) -> Result<(), StoreError> {
        let result = task::Entity::delete_by_id(row_id(id)?)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn update_date(&self, id: u32, date: &str) -> Result<(), StoreError> {
        let mut active_model: task::ActiveModel = self.find_model(id).await?.into();
        active_model.date = ActiveValue::Set(date.to_string());
        active_model.update(&self.db).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, limit: u64) -> Result<Vec<Task>, StoreError> {
        self.fetch(task::Entity::find(), limit).await
    }

    #[tracing::instrument(skip(self))]
    async fn search_by_text(&self, text: &str, limit: u64) -> Result<Vec<Task>, StoreError> {
        let query = task::Entity::find().filter(
            Condition::any()
                .add(task::Column::Title.contains(text))
                .add(task::Column::Comment.contains(text)),
        );
        self.fetch(query, limit).await
    }

    #[tracing::instrument(skip(self))]
    async fn search_by_date(&self, date: &str, limit: u64) -> Result<Vec<Task>, StoreError> {
        let query = task::Entity::find().filter(task::Column::Date.eq(date));
        self.fetch(query, limit).await
    }
}
