use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tokio::sync::{OwnedRwLockReadGuard, RwLock};

use crate::{
    error::{AppError, AppResult},
    models::{Event, Favorite, Reservation, ScoredEvent, User},
    services::scoring,
};

use super::store::{CatalogSession, CatalogStore};

/// In-process catalog with the same integrity rules and query semantics as
/// the PostgreSQL schema, used to exercise the HTTP layer without a database.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<RwLock<CatalogData>>,
}

#[derive(Default)]
struct CatalogData {
    users: BTreeMap<i32, User>,
    events: BTreeMap<i32, Event>,
    reservations: Vec<Reservation>,
    favorites: Vec<Favorite>,
}

impl CatalogData {
    fn require_user(&self, user_id: i32) -> AppResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!("Unknown user {}", user_id)))
        }
    }

    fn require_event(&self, event_id: i32) -> AppResult<()> {
        if self.events.contains_key(&event_id) {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!("Unknown event {}", event_id)))
        }
    }

    fn name_taken(&self, name: &str, except_id: Option<i32>) -> bool {
        self.events
            .values()
            .any(|e| e.nom_evenement == name && Some(e.id) != except_id)
    }

    fn reserved_events(&self, user_id: i32) -> impl Iterator<Item = &Event> {
        self.reservations
            .iter()
            .filter(move |r| r.user_id == user_id)
            .filter_map(move |r| self.events.get(&r.evenement_id))
    }

    fn remove_event_rows(&mut self, event_ids: &HashSet<i32>) {
        self.events.retain(|id, _| !event_ids.contains(id));
        self.reservations
            .retain(|r| !event_ids.contains(&r.evenement_id));
        self.favorites
            .retain(|f| !event_ids.contains(&f.evenement_id));
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) -> AppResult<()> {
        let mut data = self.inner.write().await;
        if data.users.contains_key(&user.id) {
            return Err(AppError::InvalidInput(format!("Duplicate user id {}", user.id)));
        }
        if data.users.values().any(|u| u.email == user.email) {
            return Err(AppError::InvalidInput(format!(
                "Email already registered: {}",
                user.email
            )));
        }
        data.users.insert(user.id, user);
        Ok(())
    }

    pub async fn insert_event(&self, event: Event) -> AppResult<()> {
        let mut data = self.inner.write().await;
        data.require_user(event.user_id)?;
        if data.events.contains_key(&event.id) {
            return Err(AppError::InvalidInput(format!("Duplicate event id {}", event.id)));
        }
        if data.name_taken(&event.nom_evenement, None) {
            return Err(AppError::InvalidInput(format!(
                "Event name already used: {}",
                event.nom_evenement
            )));
        }
        data.events.insert(event.id, event);
        Ok(())
    }

    pub async fn insert_reservation(&self, reservation: Reservation) -> AppResult<()> {
        let mut data = self.inner.write().await;
        data.require_user(reservation.user_id)?;
        data.require_event(reservation.evenement_id)?;
        data.reservations.push(reservation);
        Ok(())
    }

    pub async fn insert_favorite(&self, favorite: Favorite) -> AppResult<()> {
        let mut data = self.inner.write().await;
        data.require_user(favorite.user_id)?;
        data.require_event(favorite.evenement_id)?;
        data.favorites.push(favorite);
        Ok(())
    }

    /// Renames an event; reservations follow it since they hold its id
    pub async fn rename_event(&self, event_id: i32, name: impl Into<String>) -> AppResult<()> {
        let name = name.into();
        let mut data = self.inner.write().await;
        data.require_event(event_id)?;
        if data.name_taken(&name, Some(event_id)) {
            return Err(AppError::InvalidInput(format!("Event name already used: {}", name)));
        }
        if let Some(event) = data.events.get_mut(&event_id) {
            event.nom_evenement = name;
        }
        Ok(())
    }

    /// Removes an event with its reservations and favorites
    pub async fn remove_event(&self, event_id: i32) -> bool {
        let mut data = self.inner.write().await;
        if !data.events.contains_key(&event_id) {
            return false;
        }
        data.remove_event_rows(&HashSet::from([event_id]));
        true
    }

    /// Removes a user together with everything they own
    pub async fn remove_user(&self, user_id: i32) -> bool {
        let mut data = self.inner.write().await;
        if data.users.remove(&user_id).is_none() {
            return false;
        }

        let owned_events: HashSet<i32> = data
            .events
            .values()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.id)
            .collect();
        data.remove_event_rows(&owned_events);
        data.reservations.retain(|r| r.user_id != user_id);
        data.favorites.retain(|f| f.user_id != user_id);
        true
    }

    pub async fn reservation_count(&self) -> usize {
        self.inner.read().await.reservations.len()
    }

    pub async fn favorite_count(&self) -> usize {
        self.inner.read().await.favorites.len()
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryCatalog {
    async fn session(&self) -> AppResult<Box<dyn CatalogSession>> {
        let data = self.inner.clone().read_owned().await;
        Ok(Box::new(MemorySession { data }))
    }
}

/// Read snapshot held for the lifetime of a request
struct MemorySession {
    data: OwnedRwLockReadGuard<CatalogData>,
}

#[async_trait::async_trait]
impl CatalogSession for MemorySession {
    async fn reserved_event_names(&mut self, user_id: i32) -> AppResult<Vec<String>> {
        Ok(self
            .data
            .reserved_events(user_id)
            .map(|e| e.nom_evenement.clone())
            .collect())
    }

    async fn reserved_categories(&mut self, user_id: i32) -> AppResult<Vec<String>> {
        let mut categories: Vec<String> = Vec::new();
        for event in self.data.reserved_events(user_id) {
            if !categories.contains(&event.categorie) {
                categories.push(event.categorie.clone());
            }
        }
        Ok(categories)
    }

    async fn events_by_category_excluding(
        &mut self,
        categories: &[String],
        excluded_names: &[String],
    ) -> AppResult<Vec<Event>> {
        Ok(self
            .data
            .events
            .values()
            .filter(|e| categories.contains(&e.categorie))
            .filter(|e| !excluded_names.contains(&e.nom_evenement))
            .cloned()
            .collect())
    }

    async fn score_candidates(
        &mut self,
        candidate_ids: &[i32],
        excluded_names: &[String],
    ) -> AppResult<Vec<ScoredEvent>> {
        let data = &*self.data;
        Ok(candidate_ids
            .iter()
            .filter_map(|id| data.events.get(id))
            .filter(|e| !excluded_names.contains(&e.nom_evenement))
            .map(|event| {
                let reservation_count = data
                    .reservations
                    .iter()
                    .filter(|r| r.evenement_id == event.id)
                    .count() as i64;
                let favorites: Vec<&Favorite> = data
                    .favorites
                    .iter()
                    .filter(|f| f.evenement_id == event.id)
                    .collect();
                let loved_count: i64 = favorites.iter().map(|f| f.loved_count()).sum();
                let has_activity = reservation_count > 0 || !favorites.is_empty();

                ScoredEvent {
                    event: event.clone(),
                    score: scoring::candidate_score(reservation_count, loved_count, has_activity),
                }
            })
            .collect())
    }

    async fn list_events(&mut self) -> AppResult<Vec<Event>> {
        Ok(self.data.events.values().cloned().collect())
    }
}
