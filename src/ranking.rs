use tracing::debug;

use crate::{error::AppResult, models::Movie, repository::MovieRepository};

/// Ranks records by rating, highest first. Records sharing a rating keep
/// their input order relative to each other before the ranks are inverted.
pub fn assign_rankings(movies: &[Movie]) -> Vec<(i32, i32)> {
    let mut by_rating: Vec<&Movie> = movies.iter().collect();
    by_rating.sort_by(|a, b| a.rating.total_cmp(&b.rating));

    let count = by_rating.len() as i32;
    by_rating.iter().enumerate().map(|(index, movie)| (movie.id, count - index as i32)).collect()
}

/// Recomputes and stores every ranking, then returns the records best first.
pub async fn refresh(repo: &dyn MovieRepository) -> AppResult<Vec<Movie>> {
    let movies = repo.list().await?;
    let rankings = assign_rankings(&movies);
    debug!(count = rankings.len(), "recomputed rankings");

    repo.update_rankings(&rankings).await?;
    repo.list_ranked().await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{
        models::RatingEdit,
        repository::tests::{memory_repo, new_movie},
    };

    fn rated(id: i32, rating: f64) -> Movie {
        Movie {
            id,
            title: format!("Movie {id}"),
            year: None,
            description: "-".into(),
            rating,
            ranking: None,
            review: None,
            img_url: "https://image.example/x.jpg".into(),
        }
    }

    #[test]
    fn highest_rating_gets_rank_one() {
        let movies = [rated(1, 6.0), rated(2, 9.2), rated(3, 7.4)];
        let mut ranks = assign_rankings(&movies);
        ranks.sort();
        assert_eq!(ranks, vec![(1, 3), (2, 1), (3, 2)]);
    }

    #[test]
    fn rankings_are_a_permutation() {
        let movies: Vec<_> = (1..=25).map(|id| rated(id, ((id * 37) % 101) as f64 / 10.0)).collect();
        let ranks: BTreeSet<i32> = assign_rankings(&movies).into_iter().map(|(_, r)| r).collect();
        assert_eq!(ranks, (1..=25).collect());
    }

    #[test]
    fn ties_keep_input_order_before_inversion() {
        let movies = [rated(1, 5.0), rated(2, 5.0), rated(3, 1.0)];
        assert_eq!(assign_rankings(&movies), vec![(3, 3), (1, 2), (2, 1)]);
    }

    #[test]
    fn no_movies_no_rankings() {
        assert!(assign_rankings(&[]).is_empty());
    }

    #[tokio::test]
    async fn refresh_follows_rating_changes() {
        let repo = memory_repo().await;
        let a = repo.insert(new_movie("A")).await.unwrap();
        let b = repo.insert(new_movie("B")).await.unwrap();
        let a = repo.save(RatingEdit { rating: 9.0, review: "a".into() }.apply(a)).await.unwrap();
        let b = repo.save(RatingEdit { rating: 7.5, review: "b".into() }.apply(b)).await.unwrap();

        let listed = refresh(&repo).await.unwrap();
        let order: Vec<_> = listed.iter().map(|m| (m.id, m.ranking)).collect();
        assert_eq!(order, vec![(a.id, Some(1)), (b.id, Some(2))]);

        let b = repo.get_by_id(b.id).await.unwrap().unwrap();
        repo.save(RatingEdit { rating: 9.5, review: "b".into() }.apply(b.clone())).await.unwrap();

        let listed = refresh(&repo).await.unwrap();
        let order: Vec<_> = listed.iter().map(|m| (m.id, m.ranking)).collect();
        assert_eq!(order, vec![(b.id, Some(1)), (a.id, Some(2))]);
    }

    #[tokio::test]
    async fn refresh_is_idempotent() {
        let repo = memory_repo().await;
        for (title, rating) in [("X", 3.0), ("Y", 8.0), ("Z", 5.5)] {
            let movie = repo.insert(new_movie(title)).await.unwrap();
            repo.save(RatingEdit { rating, review: "ok".into() }.apply(movie)).await.unwrap();
        }

        let first: Vec<_> = refresh(&repo).await.unwrap().iter().map(|m| (m.id, m.ranking)).collect();
        let second: Vec<_> = refresh(&repo).await.unwrap().iter().map(|m| (m.id, m.ranking)).collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn refresh_of_empty_store_is_empty() {
        let repo = memory_repo().await;
        assert!(refresh(&repo).await.unwrap().is_empty());
    }
}
