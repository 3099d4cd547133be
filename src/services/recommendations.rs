use std::time::Instant;

use crate::{
    config::InterestMatching,
    db::CatalogSession,
    error::AppResult,
    models::RecommendedEvent,
    services::scoring,
};

/// Recommends up to two events for a user
///
/// Candidates are events in the user's categories of interest that the user
/// has not reserved yet. Each candidate is scored from everyone's
/// reservations and loved favorites; the response holds the best candidate
/// and the one halfway down the ranking.
///
/// Users without reservations, or whose interests match no event, get an
/// empty list.
pub async fn recommend_events(
    session: &mut dyn CatalogSession,
    user_id: i32,
    matching: InterestMatching,
) -> AppResult<Vec<RecommendedEvent>> {
    let start = Instant::now();

    // 1. Reserved names are always excluded from the candidates
    let reserved_names = session.reserved_event_names(user_id).await?;
    if reserved_names.is_empty() {
        tracing::info!(user_id, "No reservations, nothing to recommend");
        return Ok(Vec::new());
    }

    let interests = match matching {
        InterestMatching::Category => session.reserved_categories(user_id).await?,
        InterestMatching::Name => dedup(reserved_names.clone()),
    };

    // 2. Candidate events in those categories
    let candidates = session
        .events_by_category_excluding(&interests, &reserved_names)
        .await?;

    tracing::info!(
        user_id,
        matching = ?matching,
        interests = interests.len(),
        candidates = candidates.len(),
        "Candidate events selected"
    );

    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    // 3. Score, rank and pick
    let candidate_ids: Vec<i32> = candidates.iter().map(|e| e.id).collect();
    let mut scored = session
        .score_candidates(&candidate_ids, &reserved_names)
        .await?;
    scoring::rank(&mut scored);

    let selected: Vec<RecommendedEvent> = scoring::pick_first_and_middle(scored)
        .into_iter()
        .filter_map(|candidate| {
            candidate
                .score
                .map(|score| RecommendedEvent::new(&candidate.event, score))
        })
        .collect();

    tracing::info!(
        user_id,
        selected = selected.len(),
        processing_time_ms = start.elapsed().as_millis() as u64,
        "Recommendations computed"
    );

    Ok(selected)
}

fn dedup(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MockCatalogSession;
    use crate::error::AppError;
    use crate::models::{Event, ScoredEvent};
    use chrono::NaiveDate;

    fn event(id: i32, name: &str, category: &str) -> Event {
        let day = NaiveDate::from_ymd_opt(2024, 4, 12).unwrap();
        Event {
            id,
            nom_evenement: name.to_string(),
            date: day.and_hms_opt(0, 0, 0).unwrap(),
            nbr_place: 25,
            categorie: category.to_string(),
            objectif: "Wellbeing".to_string(),
            etat: Some(true),
            time: day.and_hms_opt(19, 0, 0).unwrap(),
            image: None,
            user_id: 1,
        }
    }

    fn names(recs: &[RecommendedEvent]) -> Vec<&str> {
        recs.iter().map(|r| r.nom_evenement.as_str()).collect()
    }

    #[tokio::test]
    async fn test_no_reservations_returns_empty() {
        let mut session = MockCatalogSession::new();
        session
            .expect_reserved_event_names()
            .returning(|_| Ok(vec![]));
        session.expect_events_by_category_excluding().never();
        session.expect_score_candidates().never();

        let recs = recommend_events(&mut session, 1, InterestMatching::Category)
            .await
            .unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_no_candidates_returns_empty() {
        let mut session = MockCatalogSession::new();
        session
            .expect_reserved_event_names()
            .returning(|_| Ok(vec!["Boxing Night".to_string()]));
        session
            .expect_events_by_category_excluding()
            .returning(|_, _| Ok(vec![]));
        session.expect_score_candidates().never();

        let recs = recommend_events(&mut session, 1, InterestMatching::Name)
            .await
            .unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_name_matching_example() {
        let mut session = MockCatalogSession::new();
        session
            .expect_reserved_event_names()
            .returning(|_| Ok(vec!["Yoga Night".to_string()]));
        session.expect_reserved_categories().never();
        session
            .expect_events_by_category_excluding()
            .returning(|categories, excluded| {
                assert_eq!(categories, ["Yoga Night".to_string()]);
                assert_eq!(excluded, ["Yoga Night".to_string()]);
                Ok(vec![
                    event(2, "Yoga Evening", "Yoga Night"),
                    event(3, "Yoga Morning", "Yoga Night"),
                ])
            });
        session
            .expect_score_candidates()
            .returning(|ids, _| {
                assert_eq!(ids, [2, 3]);
                Ok(vec![
                    ScoredEvent {
                        event: event(2, "Yoga Evening", "Yoga Night"),
                        score: Some(scoring::weighted_score(1, 0)),
                    },
                    ScoredEvent {
                        event: event(3, "Yoga Morning", "Yoga Night"),
                        score: Some(scoring::weighted_score(3, 2)),
                    },
                ])
            });

        let recs = recommend_events(&mut session, 1, InterestMatching::Name)
            .await
            .unwrap();
        assert_eq!(names(&recs), vec!["Yoga Morning", "Yoga Evening"]);
        assert!((recs[0].score - 2.6).abs() < 1e-9);
        assert!((recs[1].score - 0.6).abs() < 1e-9);
        assert_eq!(recs[0].date, "2024-04-12");
        assert_eq!(recs[0].time, "19:00:00");
    }

    #[tokio::test]
    async fn test_category_matching_uses_reserved_categories() {
        let mut session = MockCatalogSession::new();
        session
            .expect_reserved_event_names()
            .returning(|_| Ok(vec!["Spin Class".to_string()]));
        session
            .expect_reserved_categories()
            .times(1)
            .returning(|_| Ok(vec!["Cycling".to_string()]));
        session
            .expect_events_by_category_excluding()
            .returning(|categories, _| {
                assert_eq!(categories, ["Cycling".to_string()]);
                Ok(vec![event(5, "Hill Ride", "Cycling")])
            });
        session.expect_score_candidates().returning(|_, _| {
            Ok(vec![ScoredEvent {
                event: event(5, "Hill Ride", "Cycling"),
                score: Some(1.2),
            }])
        });

        let recs = recommend_events(&mut session, 4, InterestMatching::Category)
            .await
            .unwrap();
        assert_eq!(names(&recs), vec!["Hill Ride"]);
    }

    #[tokio::test]
    async fn test_unscored_candidates_are_dropped() {
        let mut session = MockCatalogSession::new();
        session
            .expect_reserved_event_names()
            .returning(|_| Ok(vec!["Spin Class".to_string()]));
        session
            .expect_reserved_categories()
            .returning(|_| Ok(vec!["Cycling".to_string()]));
        session.expect_events_by_category_excluding().returning(|_, _| {
            Ok(vec![
                event(5, "Hill Ride", "Cycling"),
                event(6, "Night Ride", "Cycling"),
            ])
        });
        session.expect_score_candidates().returning(|_, _| {
            Ok(vec![
                ScoredEvent {
                    event: event(6, "Night Ride", "Cycling"),
                    score: None,
                },
                ScoredEvent {
                    event: event(5, "Hill Ride", "Cycling"),
                    score: Some(0.4),
                },
            ])
        });

        let recs = recommend_events(&mut session, 4, InterestMatching::Category)
            .await
            .unwrap();
        assert_eq!(names(&recs), vec!["Hill Ride"]);
    }

    #[tokio::test]
    async fn test_at_most_two_results() {
        let mut session = MockCatalogSession::new();
        session
            .expect_reserved_event_names()
            .returning(|_| Ok(vec!["HIIT".to_string()]));
        session
            .expect_reserved_categories()
            .returning(|_| Ok(vec!["Cardio".to_string()]));
        session.expect_events_by_category_excluding().returning(|_, _| {
            Ok((10..16)
                .map(|id| event(id, &format!("Cardio {}", id), "Cardio"))
                .collect())
        });
        session.expect_score_candidates().returning(|ids, _| {
            Ok(ids
                .iter()
                .map(|&id| ScoredEvent {
                    event: event(id, &format!("Cardio {}", id), "Cardio"),
                    score: Some(f64::from(id)),
                })
                .collect())
        });

        let recs = recommend_events(&mut session, 2, InterestMatching::Category)
            .await
            .unwrap();
        // Ranked 15..10; index 0 and index 3
        assert_eq!(names(&recs), vec!["Cardio 15", "Cardio 12"]);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut session = MockCatalogSession::new();
        session
            .expect_reserved_event_names()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let result = recommend_events(&mut session, 1, InterestMatching::Category).await;
        assert!(matches!(
            result,
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        ));
    }

    #[test]
    fn test_dedup() {
        let values = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup(values), vec!["a".to_string(), "b".to_string()]);
    }
}
