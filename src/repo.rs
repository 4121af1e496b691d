use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::{
    entities::{movie, user},
    error::{AppError, AppResult},
    models::NewMovie,
};

/// Sole mediator of persistent state. Every operation is a single statement,
/// so it either commits whole or not at all.
#[derive(Clone)]
pub struct MovieRepository {
    db: DatabaseConnection,
}

impl MovieRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, name: &str) -> AppResult<user::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("user name cannot be empty".to_string()));
        }
        if name.chars().count() > 100 {
            return Err(AppError::InvalidInput(
                "user name must be 100 characters or fewer".to_string(),
            ));
        }

        let existing =
            user::Entity::find().filter(user::Column::Name.eq(name)).one(&self.db).await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!("user '{name}' already exists")));
        }

        let model = user::ActiveModel { name: Set(name.to_string()), ..Default::default() };
        match model.insert(&self.db).await {
            Ok(created) => Ok(created),
            // A concurrent create with the same name loses the race against
            // the unique index rather than the pre-check above.
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AppError::Conflict(format!("user '{name}' already exists")))
            },
            Err(err) => Err(err.into()),
        }
    }

    /// All users, name-sorted (case-sensitive, the store's binary collation).
    pub async fn list_users(&self) -> AppResult<Vec<user::Model>> {
        Ok(user::Entity::find().order_by_asc(user::Column::Name).all(&self.db).await?)
    }

    pub async fn get_user(&self, user_id: i32) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    /// Deletes a user; the schema's ON DELETE CASCADE takes their movies
    /// with them. Not routed over HTTP at the moment.
    pub async fn delete_user(&self, user_id: i32) -> AppResult<()> {
        let Some(existing) = user::Entity::find_by_id(user_id).one(&self.db).await? else {
            return Err(AppError::NotFound(format!("user {user_id} does not exist")));
        };
        existing.delete(&self.db).await?;
        Ok(())
    }

    /// A user's movies, title-sorted. Does not check that the user exists.
    pub async fn list_movies(&self, user_id: i32) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .filter(movie::Column::UserId.eq(user_id))
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?)
    }

    pub async fn get_movie(&self, movie_id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(movie_id).one(&self.db).await?)
    }

    pub async fn add_movie(&self, candidate: NewMovie) -> AppResult<movie::Model> {
        if candidate.title.trim().is_empty() {
            return Err(AppError::InvalidInput("movie title cannot be empty".to_string()));
        }

        let model = movie::ActiveModel {
            title: Set(candidate.title),
            director: Set(candidate.director),
            year: Set(candidate.year),
            poster_url: Set(candidate.poster_url),
            rating: Set(candidate.rating),
            notes: Set(None),
            user_id: Set(candidate.user_id),
            ..Default::default()
        };
        match model.insert(&self.db).await {
            Ok(created) => Ok(created),
            // Owner row deleted between the handler's existence check and
            // this insert.
            Err(err) if matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) => {
                Err(AppError::NotFound("the owning user no longer exists".to_string()))
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Applies the user-editable fields. Raw form strings come straight in:
    /// a non-blank rating must parse as a number in [1, 10]; notes are
    /// trimmed, blank collapsing to NULL. Absent parameters leave the stored
    /// value untouched.
    pub async fn update_movie(
        &self,
        movie_id: i32,
        rating: Option<&str>,
        notes: Option<&str>,
    ) -> AppResult<movie::Model> {
        let Some(existing) = movie::Entity::find_by_id(movie_id).one(&self.db).await? else {
            return Err(AppError::NotFound(format!("movie {movie_id} does not exist")));
        };

        let mut active: movie::ActiveModel = existing.clone().into();

        if let Some(raw) = rating {
            let raw = raw.trim();
            if !raw.is_empty() {
                let value: f64 = raw.parse().map_err(|_| {
                    AppError::InvalidInput(format!("rating '{raw}' is not a number"))
                })?;
                if !(1.0..=10.0).contains(&value) {
                    return Err(AppError::InvalidInput(
                        "rating must be between 1 and 10".to_string(),
                    ));
                }
                active.rating = Set(value);
            }
        }

        if let Some(raw) = notes {
            let trimmed = raw.trim();
            active.notes = Set((!trimmed.is_empty()).then(|| trimmed.to_string()));
        }

        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_movie(&self, movie_id: i32) -> AppResult<()> {
        let Some(existing) = movie::Entity::find_by_id(movie_id).one(&self.db).await? else {
            return Err(AppError::NotFound(format!("movie {movie_id} does not exist")));
        };
        existing.delete(&self.db).await?;
        Ok(())
    }
}
