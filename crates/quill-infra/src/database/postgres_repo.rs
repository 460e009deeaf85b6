//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, Select,
};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostRepository, UserRepository};
use quill_core::query::{CommentQuery, Ordering, Page, PageRequest, PostQuery, SortField};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Columns an entity exposes for the shared sort fields.
trait SortColumns: EntityTrait {
    fn sort_column(field: SortField) -> Self::Column;
    fn id_column() -> Self::Column;
}

impl SortColumns for PostEntity {
    fn sort_column(field: SortField) -> post::Column {
        match field {
            SortField::Id => post::Column::Id,
            SortField::CreatedAt => post::Column::CreatedAt,
            SortField::UpdatedAt => post::Column::UpdatedAt,
        }
    }

    fn id_column() -> post::Column {
        post::Column::Id
    }
}

impl SortColumns for CommentEntity {
    fn sort_column(field: SortField) -> comment::Column {
        match field {
            SortField::Id => comment::Column::Id,
            SortField::CreatedAt => comment::Column::CreatedAt,
            SortField::UpdatedAt => comment::Column::UpdatedAt,
        }
    }

    fn id_column() -> comment::Column {
        comment::Column::Id
    }
}

/// Apply the requested ordering with ties broken by ascending id.
fn ordered<E: SortColumns>(select: Select<E>, ordering: Ordering) -> Select<E> {
    let direction = if ordering.descending {
        Order::Desc
    } else {
        Order::Asc
    };
    let select = select.order_by(E::sort_column(ordering.field), direction);

    match ordering.field {
        SortField::Id => select,
        _ => select.order_by(E::id_column(), Order::Asc),
    }
}

async fn fetch_page<E, T>(
    repo: &PostgresBaseRepository<E>,
    select: Select<E>,
    request: PageRequest,
) -> Result<Page<T>, RepoError>
where
    E: EntityTrait,
    E::Model: Sync + Send,
    T: From<E::Model>,
{
    let paginator = select.paginate(&repo.db, request.page_size);
    let total = paginator.num_items().await.map_err(map_db_err)?;

    // Past the last page there is nothing to fetch, and SeaORM would compute page * size.
    if request.page > total.div_ceil(request.page_size).max(1) {
        return Ok(Page::new(Vec::new(), total, request));
    }

    let models = paginator
        .fetch_page(request.page - 1)
        .await
        .map_err(map_db_err)?;

    Ok(Page::new(
        models.into_iter().map(Into::into).collect(),
        total,
        request,
    ))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %User::masked_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn mark_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let stamp: sea_orm::prelude::DateTimeWithTimeZone = at.into();
        let result = UserEntity::update_many()
            .col_expr(user::Column::LastLogin, Expr::value(stamp))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn update_names(
        &self,
        id: Uuid,
        first_name: Option<String>,
        last_name: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<User, RepoError> {
        let stamp: sea_orm::prelude::DateTimeWithTimeZone = at.into();
        let mut update = UserEntity::update_many()
            .col_expr(user::Column::UpdatedAt, Expr::value(stamp))
            .filter(user::Column::Id.eq(id));
        if let Some(first_name) = first_name {
            update = update.col_expr(user::Column::FirstName, Expr::value(first_name));
        }
        if let Some(last_name) = last_name {
            update = update.col_expr(user::Column::LastName, Expr::value(last_name));
        }

        let result = update.exec(&self.db).await.map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let stamp: sea_orm::prelude::DateTimeWithTimeZone = at.into();
        let result = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(stamp))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let mut select = PostEntity::find().filter(post::Column::UserId.eq(query.owner_id));

        if let Some(flag) = query.is_published {
            select = select.filter(post::Column::IsPublished.eq(flag));
        }
        if let Some(title) = &query.title {
            select = select.filter(post::Column::Title.eq(title.as_str()));
        }

        fetch_page(self, ordered(select, query.ordering), query.page).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list(&self, query: &CommentQuery) -> Result<Page<Comment>, RepoError> {
        let mut select = CommentEntity::find().filter(comment::Column::PostId.eq(query.post_id));

        if let Some(user_id) = query.user_id {
            select = select.filter(comment::Column::UserId.eq(user_id));
        }

        fetch_page(self, ordered(select, query.ordering), query.page).await
    }
}
