//! PostgreSQL post repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel, NotSet, PaginatorTrait,
    QueryOrder, QuerySelect, Set,
};

use posts_core::domain::{Post, PostId, Title};
use posts_core::error::RepoError;
use posts_core::ports::{Page, PageRequest, PostRepository};

use super::entity::post::{self, Entity as PostEntity};

/// PostgreSQL post repository. Ids come from the `BIGSERIAL` primary key.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn db_error(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err.to_string()),
        // The row vanished between lookup and update.
        DbErr::RecordNotUpdated => RepoError::NotFound,
        _ => RepoError::Query(err.to_string()),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, title: Title) -> Result<Post, RepoError> {
        let now = Utc::now();
        let active = post::ActiveModel {
            id: NotSet,
            title: Set(title.into_inner()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active.insert(&self.db).await.map_err(db_error)?;
        tracing::debug!(post_id = model.id, "Inserted post");

        Ok(model.into())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        tracing::debug!(post_id = id, "Finding post by id");

        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.map(Into::into))
    }

    async fn update(&self, id: PostId, title: Title) -> Result<Post, RepoError> {
        let existing = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(RepoError::NotFound)?;

        let mut post: Post = existing.clone().into();
        post.retitle(title, Utc::now());

        let mut active = existing.into_active_model();
        active.title = Set(post.title);
        active.updated_at = Set(post.updated_at.into());

        let model = active.update(&self.db).await.map_err(db_error)?;
        tracing::debug!(post_id = id, "Updated post");

        Ok(model.into())
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        tracing::debug!(post_id = id, "Deleted post");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn paginate(&self, request: PageRequest) -> Result<Page<Post>, RepoError> {
        let select = PostEntity::find().order_by_asc(post::Column::Id);

        let total = select.clone().count(&self.db).await.map_err(db_error)?;

        // Past the last page there is nothing to fetch; `offset` saturates so
        // an absurd page number cannot overflow.
        let offset = request.offset();
        let items = if offset >= total {
            Vec::new()
        } else {
            select
                .offset(offset)
                .limit(request.per_page)
                .all(&self.db)
                .await
                .map_err(db_error)?
        };

        Ok(Page {
            items: items.into_iter().map(Into::into).collect(),
            page: request.page,
            per_page: request.per_page,
            total,
        })
    }
}
