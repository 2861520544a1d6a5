//! In-memory fakes shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::broadcast;

use crate::auth::{
    AuthError, AuthEvent, AuthProvider, AuthResult, AuthSession, AuthUser, SignUpOutcome,
};
use crate::error::{Error, Result};
use crate::models::{Note, NoteId, NotePatch};
use crate::store::NotesBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
struct BackendState {
    rows: Vec<(String, Note)>,
    failures: HashMap<BackendOp, String>,
    ops: Vec<BackendOp>,
    updates: Vec<(NoteId, NotePatch)>,
    seeded: i64,
}

/// Notes table double with one-shot failure injection.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    /// Insert a row directly; later seeds are newer.
    pub fn seed(&self, user_id: &str, title: &str) -> NoteId {
        let mut state = self.state();
        state.seeded += 1;
        let created_at = base_time() + Duration::seconds(state.seeded);
        let mut note = Note::new_empty();
        note.title = title.to_string();
        note.created_at = created_at;
        note.updated_at = created_at;
        let id = note.id.clone();
        state.rows.push((user_id.to_string(), note));
        id
    }

    pub fn fail_next(&self, op: BackendOp, message: &str) {
        self.state().failures.insert(op, message.to_string());
    }

    pub fn op_count(&self, op: BackendOp) -> usize {
        self.state().ops.iter().filter(|seen| **seen == op).count()
    }

    pub fn updates(&self) -> Vec<(NoteId, NotePatch)> {
        self.state().updates.clone()
    }

    fn begin(&self, op: BackendOp) -> Result<MutexGuard<'_, BackendState>> {
        let mut state = self.state();
        state.ops.push(op);
        match state.failures.remove(&op) {
            Some(message) => Err(Error::Api(message)),
            None => Ok(state),
        }
    }
}

impl NotesBackend for FakeBackend {
    async fn select_by_user(&self, user_id: &str) -> Result<Vec<Note>> {
        let state = self.begin(BackendOp::Select)?;
        let mut notes: Vec<Note> = state
            .rows
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, note)| note.clone())
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn insert(&self, user_id: &str) -> Result<Note> {
        let mut state = self.begin(BackendOp::Insert)?;
        let note = Note::new_empty();
        state.rows.push((user_id.to_string(), note.clone()));
        Ok(note)
    }

    async fn update_by_id(
        &self,
        id: &NoteId,
        patch: &NotePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.begin(BackendOp::Update)?;
        state.updates.push((id.clone(), patch.clone()));
        if let Some((_, note)) = state.rows.iter_mut().find(|(_, note)| &note.id == id) {
            note.apply(patch.clone(), updated_at);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &NoteId) -> Result<()> {
        let mut state = self.begin(BackendOp::Delete)?;
        state.rows.retain(|(_, note)| &note.id != id);
        Ok(())
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn session_for(email: &str, confirmed: bool) -> AuthSession {
    AuthSession {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: i64::MAX,
        user: AuthUser {
            id: format!("user-{email}"),
            email: Some(email.to_string()),
            email_confirmed_at: confirmed.then(base_time),
        },
    }
}

struct AuthState {
    queued: VecDeque<AuthResult<Option<AuthSession>>>,
    fallback: Option<AuthSession>,
    session_calls: usize,
    sign_up: Option<AuthResult<SignUpOutcome>>,
    sign_up_calls: usize,
    signed_out: bool,
}

/// Scripted auth provider. Queued `current_session` results are consumed in
/// order; once exhausted the fallback session is returned.
#[derive(Clone)]
pub struct FakeAuthProvider {
    state: Arc<Mutex<AuthState>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for FakeAuthProvider {
    fn default() -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            state: Arc::new(Mutex::new(AuthState {
                queued: VecDeque::new(),
                fallback: None,
                session_calls: 0,
                sign_up: None,
                sign_up_calls: 0,
                signed_out: false,
            })),
            events,
        }
    }
}

impl FakeAuthProvider {
    fn state(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap()
    }

    pub fn with_session(session: AuthSession) -> Self {
        let provider = Self::default();
        provider.set_session(Some(session));
        provider
    }

    pub fn set_session(&self, session: Option<AuthSession>) {
        self.state().fallback = session;
    }

    pub fn queue_session(&self, result: AuthResult<Option<AuthSession>>) {
        self.state().queued.push_back(result);
    }

    pub fn set_sign_up_result(&self, result: AuthResult<SignUpOutcome>) {
        self.state().sign_up = Some(result);
    }

    pub fn session_calls(&self) -> usize {
        self.state().session_calls
    }

    pub fn sign_up_calls(&self) -> usize {
        self.state().sign_up_calls
    }

    pub fn signed_out(&self) -> bool {
        self.state().signed_out
    }

    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }
}

impl AuthProvider for FakeAuthProvider {
    async fn sign_up(&self, email: &str, _password: &str) -> AuthResult<SignUpOutcome> {
        let mut state = self.state();
        state.sign_up_calls += 1;
        state
            .sign_up
            .take()
            .unwrap_or_else(|| Ok(SignUpOutcome::SignedIn(session_for(email, false))))
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        if password == "wrong" {
            return Err(AuthError::Api("Invalid login credentials (400)".to_string()));
        }
        let session = session_for(email, true);
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        {
            let mut state = self.state();
            state.fallback = None;
            state.signed_out = true;
        }
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> AuthResult<Option<AuthSession>> {
        let mut state = self.state();
        state.session_calls += 1;
        match state.queued.pop_front() {
            Some(result) => result,
            None => Ok(state.fallback.clone()),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
