//! Usage analytics beacon.
//!
//! Opens a session lazily on the first tracked event and closes it when the
//! showcase goes home or the window closes. Analytics never interrupt the
//! user: every failure is logged and dropped.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::{AnalyticsApi, SessionKey, TrackBody};
use crate::state::data::Section;

/// Something worth counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEvent {
    /// A section tab was selected
    Tab(Section),
    /// A color bubble was opened
    Bubble(i64),
    /// A carousel image was opened fullscreen
    Image(Option<i64>),
}

impl TrackEvent {
    fn action(self) -> &'static str {
        match self {
            TrackEvent::Tab(_) => "tab",
            TrackEvent::Bubble(_) => "bubble",
            TrackEvent::Image(_) => "image",
        }
    }

    fn color_id(self) -> Option<i64> {
        match self {
            TrackEvent::Tab(_) => None,
            TrackEvent::Bubble(id) => Some(id),
            TrackEvent::Image(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeaconSession {
    Idle,
    Active(SessionKey),
}

#[derive(Debug)]
struct BeaconState {
    session: BeaconSession,
    section: Section,
}

/// Cheap to clone; clones share one session
#[derive(Clone)]
pub struct Beacon {
    api: Arc<dyn AnalyticsApi>,
    client_id: String,
    state: Arc<Mutex<BeaconState>>,
}

impl Beacon {
    pub fn new(api: Arc<dyn AnalyticsApi>, client_id: String) -> Self {
        Self {
            api,
            client_id,
            state: Arc::new(Mutex::new(BeaconState {
                session: BeaconSession::Idle,
                section: Section::Facades,
            })),
        }
    }

    pub async fn session(&self) -> BeaconSession {
        self.state.lock().await.session.clone()
    }

    /// Start a session unless one is active. The lock is held across the
    /// request so concurrent events share a single session.
    async fn ensure_session(&self, state: &mut BeaconState) -> Option<SessionKey> {
        if let BeaconSession::Active(key) = &state.session {
            return Some(key.clone());
        }
        match self.api.session_start(&self.client_id).await {
            Ok(key) => {
                debug!(?key, "analytics session started");
                state.session = BeaconSession::Active(key.clone());
                Some(key)
            }
            Err(e) => {
                warn!("analytics session start failed: {e}");
                None
            }
        }
    }

    pub async fn track(&self, event: TrackEvent) {
        let mut state = self.state.lock().await;
        if let TrackEvent::Tab(section) = event {
            state.section = section;
        }
        let Some(session_id) = self.ensure_session(&mut state).await else {
            return;
        };
        let body = TrackBody {
            session_id,
            action: event.action(),
            section: state.section.slug(),
            color_id: event.color_id(),
        };
        if let Err(e) = self.api.track(&body).await {
            warn!(action = body.action, "analytics event dropped: {e}");
        }
    }

    /// Close the current session, if any
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        let BeaconSession::Active(key) = std::mem::replace(&mut state.session, BeaconSession::Idle)
        else {
            return;
        };
        match self.api.session_stop(&key).await {
            Ok(()) => debug!(?key, "analytics session stopped"),
            Err(e) => warn!("analytics session stop failed: {e}"),
        }
    }
}
