//! # Session State
//!
//! Who is shopping and in which language.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use zari_core::{AuthUser, Language};

#[derive(Debug, Default)]
struct Session {
    user: Option<AuthUser>,
    language: Language,
    /// Phone number confirmed by a one-time code during this session.
    verified_phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<Mutex<Session>>,
}

impl SessionState {
    pub fn new(language: Language) -> Self {
        SessionState {
            inner: Arc::new(Mutex::new(Session {
                language,
                ..Session::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.lock().user.clone()
    }

    /// Switching users forgets any phone verified for the previous one.
    pub fn set_user(&self, user: Option<AuthUser>) {
        let mut session = self.lock();
        if session.user != user {
            session.verified_phone = None;
        }
        session.user = user;
    }

    pub fn language(&self) -> Language {
        self.lock().language
    }

    pub fn set_language(&self, language: Language) {
        self.lock().language = language;
    }

    pub fn verified_phone(&self) -> Option<String> {
        self.lock().verified_phone.clone()
    }

    pub fn mark_phone_verified(&self, phone: &str) {
        self.lock().verified_phone = Some(phone.to_string());
    }

    /// Signs out, keeping the language.
    pub fn reset(&self) {
        let mut session = self.lock();
        session.user = None;
        session.verified_phone = None;
    }
}
