//! Play sessions: the per-player context kept on the server between requests.
//!
//! State changes go through pure functions (`apply_session_action`, the
//! `*_in_session` transforms) and are committed to the shared store under a
//! single write lock, so each request's mutation is atomic.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::evaluation::EvaluationResult;
use crate::game::{Selection, ShuffleStates};

// ============================================================================
// DATA
// ============================================================================

#[derive(Debug, Clone)]
pub struct PlaySession {
    pub id: String,
    /// Masked access key that opened the session
    pub access_key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub current_game: Option<String>,
    pub shuffles: ShuffleStates,
    pub selection: Option<Selection>,
    pub last_output: Option<String>,
    pub last_evaluation: Option<EvaluationResult>,
}

impl PlaySession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whole minutes left, rounded up; 0 once expired
    pub fn remaining_minutes(&self, now: DateTime<Utc>) -> i64 {
        let remaining_ms = (self.expires_at - now).num_milliseconds();
        if remaining_ms <= 0 {
            return 0;
        }
        (remaining_ms + 59_999) / 60_000
    }
}

#[derive(Debug, Clone)]
pub enum SessionAction {
    Open { session: PlaySession },
    Update { session: PlaySession },
    Close { session_id: String },
}

#[derive(Debug, Clone, Default)]
pub struct SessionStoreState {
    pub sessions: HashMap<String, PlaySession>,
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<RwLock<SessionStoreState>>,
    duration: Duration,
}

// ============================================================================
// PURE FUNCTIONS
// ============================================================================

pub fn create_play_session(masked_key: &str, now: DateTime<Utc>, duration: Duration) -> PlaySession {
    PlaySession {
        id: Uuid::new_v4().to_string(),
        access_key: masked_key.to_string(),
        created_at: now,
        expires_at: now + duration,
        current_game: None,
        shuffles: ShuffleStates::default(),
        selection: None,
        last_output: None,
        last_evaluation: None,
    }
}

pub fn apply_session_action(mut state: SessionStoreState, action: SessionAction) -> SessionStoreState {
    match action {
        SessionAction::Open { session } | SessionAction::Update { session } => {
            state.sessions.insert(session.id.clone(), session);
        }
        SessionAction::Close { session_id } => {
            state.sessions.remove(&session_id);
        }
    }
    state
}

pub fn find_live_session<'a>(
    state: &'a SessionStoreState,
    session_id: &str,
    now: DateTime<Utc>,
) -> Option<&'a PlaySession> {
    state
        .sessions
        .get(session_id)
        .filter(|session| !session.is_expired(now))
}

pub fn expired_session_ids(state: &SessionStoreState, now: DateTime<Utc>) -> Vec<String> {
    state
        .sessions
        .values()
        .filter(|session| session.is_expired(now))
        .map(|session| session.id.clone())
        .collect()
}

/// Switching games drops the previous selection and outputs; shuffle orders are kept per game
pub fn select_game_in_session(mut session: PlaySession, game_id: &str) -> PlaySession {
    if session.current_game.as_deref() != Some(game_id) {
        session.current_game = Some(game_id.to_string());
        session.selection = None;
        session.last_output = None;
        session.last_evaluation = None;
    }
    session
}

pub fn extend_session(mut session: PlaySession, now: DateTime<Utc>, duration: Duration) -> PlaySession {
    session.expires_at = now + duration;
    session
}

// ============================================================================
// STORE OPERATIONS
// ============================================================================

impl SessionManager {
    pub fn new(duration: Duration) -> Self {
        Self {
            store: Arc::new(RwLock::new(SessionStoreState::default())),
            duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub async fn open(&self, masked_key: &str, now: DateTime<Utc>) -> PlaySession {
        let session = create_play_session(masked_key, now, self.duration);
        let mut state = self.store.write().await;
        let current = std::mem::take(&mut *state);
        *state = apply_session_action(
            current,
            SessionAction::Open {
                session: session.clone(),
            },
        );
        log::info!("Opened play session {} for {}", session.id, masked_key);
        session
    }

    /// Live session by id. An expired session is removed and reported as absent.
    pub async fn get(&self, session_id: &str, now: DateTime<Utc>) -> Option<PlaySession> {
        {
            let state = self.store.read().await;
            match state.sessions.get(session_id) {
                None => return None,
                Some(session) if !session.is_expired(now) => return Some(session.clone()),
                Some(_) => {}
            }
        }
        self.evict_expired(session_id, now).await
    }

    /// Write-locked second look after a read saw the session expired. A concurrent
    /// `extend` may have landed in between, in which case the session is kept.
    async fn evict_expired(&self, session_id: &str, now: DateTime<Utc>) -> Option<PlaySession> {
        let mut state = self.store.write().await;
        if let Some(session) = find_live_session(&state, session_id, now) {
            return Some(session.clone());
        }
        if state.sessions.contains_key(session_id) {
            let current = std::mem::take(&mut *state);
            *state = apply_session_action(
                current,
                SessionAction::Close {
                    session_id: session_id.to_string(),
                },
            );
            log::info!("Play session {} expired", session_id);
        }
        None
    }

    /// Apply `transformation` to a live session and commit the result under one write lock.
    /// Returns `Ok(None)` when the session does not exist or has expired.
    pub async fn transform<F, T, E>(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
        transformation: F,
    ) -> Result<Option<T>, E>
    where
        F: FnOnce(PlaySession) -> Result<(PlaySession, T), E>,
    {
        let mut state = self.store.write().await;

        let Some(session) = find_live_session(&state, session_id, now).cloned() else {
            if state.sessions.contains_key(session_id) {
                let current = std::mem::take(&mut *state);
                *state = apply_session_action(
                    current,
                    SessionAction::Close {
                        session_id: session_id.to_string(),
                    },
                );
            }
            return Ok(None);
        };

        let (updated, result) = transformation(session)?;
        let current = std::mem::take(&mut *state);
        *state = apply_session_action(current, SessionAction::Update { session: updated });
        Ok(Some(result))
    }

    pub async fn close(&self, session_id: &str) -> bool {
        let mut state = self.store.write().await;
        let existed = state.sessions.contains_key(session_id);
        let current = std::mem::take(&mut *state);
        *state = apply_session_action(
            current,
            SessionAction::Close {
                session_id: session_id.to_string(),
            },
        );
        existed
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.store.write().await;
        let expired = expired_session_ids(&state, now);
        for session_id in &expired {
            state.sessions.remove(session_id);
        }
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use futures::future::join_all;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_remaining_minutes_rounds_up() {
        let session = create_play_session("demo****", t0(), Duration::hours(8));
        assert_eq!(session.remaining_minutes(t0()), 480);
        assert_eq!(session.remaining_minutes(t0() + Duration::seconds(30)), 480);
        assert_eq!(session.remaining_minutes(t0() + Duration::minutes(479) + Duration::seconds(1)), 1);
        assert_eq!(session.remaining_minutes(t0() + Duration::hours(9)), 0);
    }

    #[test]
    fn test_select_game_resets_outputs_only_on_change() {
        let mut session = create_play_session("demo****", t0(), Duration::hours(8));
        session.last_output = Some("draft".to_string());
        let session = select_game_in_session(session, "city-dx");
        assert_eq!(session.last_output, None);

        let mut session = session;
        session.last_output = Some("draft".to_string());
        let session = select_game_in_session(session, "city-dx");
        assert_eq!(session.last_output.as_deref(), Some("draft"));
    }

    #[tokio::test]
    async fn test_open_get_close() {
        let manager = SessionManager::new(Duration::hours(8));
        let session = manager.open("demo****", t0()).await;
        assert!(manager.get(&session.id, t0()).await.is_some());
        assert!(manager.close(&session.id).await);
        assert!(manager.get(&session.id, t0()).await.is_none());
        assert!(!manager.close(&session.id).await);
    }

    #[tokio::test]
    async fn test_expired_session_is_removed_on_read() {
        let manager = SessionManager::new(Duration::hours(8));
        let session = manager.open("demo****", t0()).await;
        assert!(manager.get(&session.id, t0() + Duration::hours(8)).await.is_none());
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn test_transform_commits_result() {
        let manager = SessionManager::new(Duration::hours(8));
        let session = manager.open("demo****", t0()).await;

        let result: Result<Option<String>, String> = manager
            .transform(&session.id, t0(), |s| {
                let s = select_game_in_session(s, "city-dx");
                Ok((s, "selected".to_string()))
            })
            .await;
        assert_eq!(result, Ok(Some("selected".to_string())));

        let stored = manager.get(&session.id, t0()).await.unwrap();
        assert_eq!(stored.current_game.as_deref(), Some("city-dx"));
    }

    #[tokio::test]
    async fn test_failed_transform_leaves_session_untouched() {
        let manager = SessionManager::new(Duration::hours(8));
        let session = manager.open("demo****", t0()).await;

        let result: Result<Option<()>, &str> = manager
            .transform(&session.id, t0(), |_| Err("invalid"))
            .await;
        assert_eq!(result, Err("invalid"));
        assert!(manager.get(&session.id, t0()).await.unwrap().current_game.is_none());
    }

    #[tokio::test]
    async fn test_extend() {
        let manager = SessionManager::new(Duration::hours(8));
        let session = manager.open("demo****", t0()).await;
        let later = t0() + Duration::hours(7);
        let duration = manager.duration();
        manager
            .transform::<_, _, ()>(&session.id, later, |s| Ok((extend_session(s, later, duration), ())))
            .await
            .unwrap();
        let extended = manager.get(&session.id, t0() + Duration::hours(10)).await.unwrap();
        assert_eq!(extended.expires_at, later + Duration::hours(8));
    }

    #[tokio::test]
    async fn test_eviction_spares_a_session_extended_after_the_read() {
        let manager = SessionManager::new(Duration::hours(8));
        let session = manager.open("demo****", t0()).await;
        let read_at = t0() + Duration::hours(9);

        // the read saw the old expiry; an extend commits before the eviction runs
        let extended_at = t0() + Duration::hours(7);
        manager
            .transform::<_, _, ()>(&session.id, extended_at, |s| {
                Ok((extend_session(s, extended_at, Duration::hours(8)), ()))
            })
            .await
            .unwrap();

        let kept = manager.evict_expired(&session.id, read_at).await.unwrap();
        assert_eq!(kept.expires_at, extended_at + Duration::hours(8));
        assert_eq!(manager.len().await, 1);

        assert!(manager.evict_expired(&session.id, t0() + Duration::hours(16)).await.is_none());
        assert!(manager.is_empty().await);
    }

    #[test]
    fn test_purge_keeps_live_sessions() {
        let manager = SessionManager::new(Duration::hours(8));
        let early = tokio_test::block_on(manager.open("demo****", t0()));
        let late = tokio_test::block_on(manager.open("work****", t0() + Duration::hours(4)));

        let purged = tokio_test::block_on(manager.purge_expired(t0() + Duration::hours(9)));
        assert_eq!(purged, 1);
        let now = t0() + Duration::hours(9);
        assert!(tokio_test::block_on(manager.get(&early.id, now)).is_none());
        assert!(tokio_test::block_on(manager.get(&late.id, now)).is_some());
    }

    #[tokio::test]
    async fn test_concurrent_sessions() {
        let manager = SessionManager::new(Duration::hours(8));
        let sessions = join_all((0..20).map(|i| {
            let manager = manager.clone();
            async move { manager.open(&format!("key{}****", i), t0()).await }
        }))
        .await;
        assert_eq!(manager.len().await, 20);

        let purged = manager.purge_expired(t0() + Duration::hours(9)).await;
        assert_eq!(purged, 20);
        assert!(manager.get(&sessions[0].id, t0()).await.is_none());
    }
}
