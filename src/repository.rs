use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, TransactionTrait, Unchanged,
    sea_query::{Expr, NullOrdering, Order},
};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{Movie, NewMovie},
};

/// Storage seam for movie records. Missing rows are reported as values
/// (`None`, `false`, [`AppError::NotFound`]) rather than panics.
#[async_trait]
pub trait MovieRepository: Send + Sync + 'static {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<Movie>>;

    /// All records in id order.
    async fn list(&self) -> AppResult<Vec<Movie>>;

    /// All records ordered by their cached ranking, best first. Records not
    /// ranked yet come last.
    async fn list_ranked(&self) -> AppResult<Vec<Movie>>;

    async fn insert(&self, movie: NewMovie) -> AppResult<Movie>;

    /// Overwrites every mutable column of an existing record.
    async fn save(&self, movie: Movie) -> AppResult<Movie>;

    /// Writes `(id, ranking)` pairs in one transaction.
    async fn update_rankings(&self, rankings: &[(i32, i32)]) -> AppResult<()>;

    async fn delete(&self, movie: Movie) -> AppResult<()>;

    /// Returns `false` when no record had this id.
    async fn delete_by_id(&self, id: i32) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct SeaOrmMovieRepository {
    db: DatabaseConnection,
}

impl SeaOrmMovieRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieRepository for SeaOrmMovieRepository {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<Movie>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list(&self) -> AppResult<Vec<Movie>> {
        Ok(movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?)
    }

    async fn list_ranked(&self) -> AppResult<Vec<Movie>> {
        Ok(movie::Entity::find()
            .order_by_with_nulls(movie::Column::Ranking, Order::Asc, NullOrdering::Last)
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn insert(&self, movie: NewMovie) -> AppResult<Movie> {
        let model = movie::ActiveModel {
            id: NotSet,
            title: Set(movie.title),
            year: Set(movie.year),
            description: Set(movie.description),
            rating: Set(0.0),
            ranking: Set(None),
            review: Set(None),
            img_url: Set(movie.img_url),
        };
        Ok(model.insert(&self.db).await?)
    }

    async fn save(&self, movie: Movie) -> AppResult<Movie> {
        let id = movie.id;
        let model = movie::ActiveModel {
            id: Unchanged(movie.id),
            title: Set(movie.title),
            year: Set(movie.year),
            description: Set(movie.description),
            rating: Set(movie.rating),
            ranking: Set(movie.ranking),
            review: Set(movie.review),
            img_url: Set(movie.img_url),
        };
        match model.update(&self.db).await {
            Ok(saved) => Ok(saved),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound(id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_rankings(&self, rankings: &[(i32, i32)]) -> AppResult<()> {
        let txn = self.db.begin().await?;

        for &(id, ranking) in rankings {
            movie::Entity::update_many()
                .col_expr(movie::Column::Ranking, Expr::value(ranking))
                .filter(movie::Column::Id.eq(id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn delete(&self, movie: Movie) -> AppResult<()> {
        if self.delete_by_id(movie.id).await? { Ok(()) } else { Err(AppError::NotFound(movie.id)) }
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<bool> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
