//! Optimistic star and fork actions.
//!
//! [`MutationCoordinator`] applies the expected effect of an action to its
//! local counters before the remote call, then keeps it (commit) or
//! reverses exactly what it applied (rollback). Counters are local to the
//! coordinator: they start at zero unless seeded and are not the server's
//! totals.
//!
//! Checks run in a fixed order: ownership, then authentication, then the
//! pending guard. Rejected actions never touch the network or the counters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::gist::{Gist, GistApi, GistError, short_error_message};

/// Which pending slot an action occupies. Star and unstar share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Star,
    Fork,
}

/// A user-initiated mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Star,
    Unstar,
    Fork,
}

impl Action {
    pub fn kind(self) -> ActionKind {
        match self {
            Self::Star | Self::Unstar => ActionKind::Star,
            Self::Fork => ActionKind::Fork,
        }
    }

    /// The verb used in user-facing messages.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Star => "star",
            Self::Unstar => "unstar",
            Self::Fork => "fork",
        }
    }
}

/// Why an action was refused up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    OwnGist,
    NotAuthenticated,
}

/// How an action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The remote call succeeded; the local change stays. Forks carry the
    /// new gist's id.
    Committed { navigate_to: Option<String> },
    /// The remote call failed; the local change was reversed.
    RolledBack { message: String },
    /// Refused before anything happened.
    Rejected {
        reason: RejectReason,
        message: String,
    },
    /// The same action on the same gist is already in flight.
    Ignored,
}

/// Lifecycle of one (gist, action kind) slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationPhase {
    #[default]
    Idle,
    Pending,
    Committed,
    RolledBack,
    Rejected,
}

/// Everything needed to render star/fork controls for one gist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GistCounters {
    pub stars: u64,
    pub forks: u64,
    pub starred: bool,
    pub star_pending: bool,
    pub fork_pending: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct MutationState {
    phase: MutationPhase,
    count: u64,
    /// Only meaningful for [`ActionKind::Star`].
    starred: bool,
}

/// What was applied optimistically, so it can be reversed.
#[derive(Debug, Clone, Copy)]
struct Applied {
    delta: u64,
    previous_starred: bool,
}

type StateMap = HashMap<(String, ActionKind), MutationState>;

/// Single owner of all optimistic star/fork state.
pub struct MutationCoordinator {
    api: Arc<dyn GistApi>,
    states: Mutex<StateMap>,
}

impl std::fmt::Debug for MutationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCoordinator")
            .field("tracked", &self.lock().len())
            .finish()
    }
}

impl MutationCoordinator {
    pub fn new(api: Arc<dyn GistApi>) -> Self {
        Self {
            api,
            states: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StateMap> {
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a gist's counters from known values. Slots with an action in
    /// flight are left alone.
    pub fn seed(&self, gist_id: &str, stars: u64, forks: u64, starred: bool) {
        let mut states = self.lock();

        let star = states
            .entry((gist_id.to_string(), ActionKind::Star))
            .or_default();
        if star.phase != MutationPhase::Pending {
            star.count = stars;
            star.starred = starred;
        }

        let fork = states
            .entry((gist_id.to_string(), ActionKind::Fork))
            .or_default();
        if fork.phase != MutationPhase::Pending {
            fork.count = forks;
        }
    }

    pub fn snapshot(&self, gist_id: &str) -> GistCounters {
        let states = self.lock();
        let star = states
            .get(&(gist_id.to_string(), ActionKind::Star))
            .copied()
            .unwrap_or_default();
        let fork = states
            .get(&(gist_id.to_string(), ActionKind::Fork))
            .copied()
            .unwrap_or_default();

        GistCounters {
            stars: star.count,
            forks: fork.count,
            starred: star.starred,
            star_pending: star.phase == MutationPhase::Pending,
            fork_pending: fork.phase == MutationPhase::Pending,
        }
    }

    pub fn phase(&self, gist_id: &str, kind: ActionKind) -> MutationPhase {
        self.lock()
            .get(&(gist_id.to_string(), kind))
            .map(|s| s.phase)
            .unwrap_or_default()
    }

    /// Seed the starred flag from `GET /gists/{id}/star`.
    ///
    /// Skipped when a star would be rejected anyway (own gist, no session)
    /// or while a star action is pending. Lookup failures leave the flag
    /// as it was.
    pub async fn load_star_state(&self, gist: &Gist) {
        if self.precheck(gist).is_some()
            || self.phase(&gist.id, ActionKind::Star) == MutationPhase::Pending
        {
            return;
        }
        match self.api.is_gist_starred(&gist.id).await {
            Ok(starred) => {
                let mut states = self.lock();
                let state = states
                    .entry((gist.id.clone(), ActionKind::Star))
                    .or_default();
                if state.phase != MutationPhase::Pending {
                    state.starred = starred;
                }
            }
            Err(e) => tracing::debug!(
                "Could not read star state of {}: {}",
                gist.id,
                short_error_message(&e)
            ),
        }
    }

    pub async fn star(&self, gist: &Gist) -> MutationOutcome {
        self.run(gist, Action::Star).await
    }

    pub async fn unstar(&self, gist: &Gist) -> MutationOutcome {
        self.run(gist, Action::Unstar).await
    }

    /// Star if not starred locally, otherwise unstar.
    pub async fn toggle_star(&self, gist: &Gist) -> MutationOutcome {
        if self.snapshot(&gist.id).starred {
            self.unstar(gist).await
        } else {
            self.star(gist).await
        }
    }

    pub async fn fork(&self, gist: &Gist) -> MutationOutcome {
        self.run(gist, Action::Fork).await
    }

    async fn run(&self, gist: &Gist, action: Action) -> MutationOutcome {
        if let Some(reason) = self.precheck(gist) {
            return self.reject(&gist.id, action, reason);
        }

        let Some(applied) = self.begin(&gist.id, action) else {
            tracing::debug!("{} of {} already in flight", action.verb(), gist.id);
            return MutationOutcome::Ignored;
        };

        let result = match action {
            Action::Star => self.api.star_gist(&gist.id).await.map(|_| None),
            Action::Unstar => self.api.unstar_gist(&gist.id).await.map(|_| None),
            Action::Fork => self.api.fork_gist(&gist.id).await.map(|g| Some(g.id)),
        };

        match result {
            Ok(navigate_to) => {
                self.finish(&gist.id, action.kind(), MutationPhase::Committed);
                tracing::info!("{} of gist {} committed", action.verb(), gist.id);
                MutationOutcome::Committed { navigate_to }
            }
            Err(e) => {
                self.rollback(&gist.id, action, applied);
                tracing::warn!(
                    "{} of gist {} rolled back: {}",
                    action.verb(),
                    gist.id,
                    short_error_message(&e)
                );
                MutationOutcome::RolledBack {
                    message: failure_message(action, &e),
                }
            }
        }
    }

    fn precheck(&self, gist: &Gist) -> Option<RejectReason> {
        let session = self.api.session();
        // An unknown login is treated as not the owner.
        if let Some(login) = session.current_login()
            && gist.is_owned_by(&login)
        {
            return Some(RejectReason::OwnGist);
        }
        if !session.is_authenticated() {
            return Some(RejectReason::NotAuthenticated);
        }
        None
    }

    fn reject(&self, gist_id: &str, action: Action, reason: RejectReason) -> MutationOutcome {
        let message = match reason {
            RejectReason::OwnGist => format!("You cannot {} your own gist", action.verb()),
            RejectReason::NotAuthenticated => format!("Please log in to {} gists", action.verb()),
        };

        let mut states = self.lock();
        let state = states
            .entry((gist_id.to_string(), action.kind()))
            .or_default();
        if state.phase != MutationPhase::Pending {
            state.phase = MutationPhase::Rejected;
        }

        MutationOutcome::Rejected { reason, message }
    }

    /// Apply the optimistic change and mark the slot pending, or `None` if
    /// it already is.
    fn begin(&self, gist_id: &str, action: Action) -> Option<Applied> {
        let mut states = self.lock();
        let state = states
            .entry((gist_id.to_string(), action.kind()))
            .or_default();
        if state.phase == MutationPhase::Pending {
            return None;
        }

        let previous_starred = state.starred;
        let delta = match action {
            Action::Star => {
                state.starred = true;
                state.count += 1;
                1
            }
            Action::Unstar => {
                state.starred = false;
                let delta = state.count.min(1);
                state.count -= delta;
                delta
            }
            Action::Fork => {
                state.count += 1;
                1
            }
        };
        state.phase = MutationPhase::Pending;

        Some(Applied {
            delta,
            previous_starred,
        })
    }

    fn finish(&self, gist_id: &str, kind: ActionKind, phase: MutationPhase) {
        if let Some(state) = self.lock().get_mut(&(gist_id.to_string(), kind)) {
            state.phase = phase;
        }
    }

    fn rollback(&self, gist_id: &str, action: Action, applied: Applied) {
        let mut states = self.lock();
        let Some(state) = states.get_mut(&(gist_id.to_string(), action.kind())) else {
            return;
        };

        match action {
            Action::Star | Action::Fork => {
                state.count = state.count.saturating_sub(applied.delta);
            }
            Action::Unstar => state.count += applied.delta,
        }
        if action.kind() == ActionKind::Star {
            state.starred = applied.previous_starred;
        }
        state.phase = MutationPhase::RolledBack;
    }
}

/// Why a remote call failed, as far as the user is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    Auth,
    OwnGist,
    Other,
}

impl FailureKind {
    /// GitHub refuses forks of your own gist with 422. Other own-gist
    /// refusals say so in the message.
    fn of(action: Action, err: &GistError) -> Self {
        match err {
            GistError::AuthRequired => Self::Auth,
            GistError::Api { status: 422, .. } if action == Action::Fork => Self::OwnGist,
            GistError::Api { message, .. } if message.to_ascii_lowercase().contains("own gist") => {
                Self::OwnGist
            }
            _ => Self::Other,
        }
    }
}

fn failure_message(action: Action, err: &GistError) -> String {
    match FailureKind::of(action, err) {
        FailureKind::Auth => err.to_string(),
        FailureKind::OwnGist => format!("You cannot {} your own gist", action.verb()),
        FailureKind::Other => format!("Failed to {} gist. Please try again.", action.verb()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gist::{AuthUser, GistClient};
    use crate::http::{
        HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockTransport,
    };
    use crate::session::Session;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    const HOST: &str = "https://api.test";

    fn response(status: u16, body: impl AsRef<[u8]>) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_ref().to_vec(),
        }
    }

    fn gist(id: &str, owner: &str) -> Gist {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "public": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "files": {},
            "owner": { "login": owner, "id": 1 }
        }))
        .unwrap()
    }

    fn user(login: &str) -> AuthUser {
        AuthUser {
            login: login.into(),
            id: 42,
            avatar_url: String::new(),
            name: None,
            email: None,
        }
    }

    fn coordinator(transport: Arc<dyn HttpTransport>, session: Session) -> MutationCoordinator {
        let client = GistClient::new_with_transport(HOST, session, None, transport);
        MutationCoordinator::new(Arc::new(client))
    }

    fn signed_in_as(login: &str) -> Session {
        Session::with_token("tok", Some(user(login)))
    }

    #[tokio::test]
    async fn test_starring_own_gist_is_rejected_without_network() {
        let transport = MockTransport::new();
        let coordinator = coordinator(Arc::new(transport.clone()), signed_in_as("me"));
        let mine = gist("g1", "Me");
        coordinator.seed("g1", 3, 1, false);

        let outcome = coordinator.star(&mine).await;

        assert_eq!(
            outcome,
            MutationOutcome::Rejected {
                reason: RejectReason::OwnGist,
                message: "You cannot star your own gist".into(),
            }
        );
        assert!(transport.requests().is_empty());
        assert_eq!(coordinator.snapshot("g1").stars, 3);
        assert_eq!(coordinator.phase("g1", ActionKind::Star), MutationPhase::Rejected);

        let outcome = coordinator.fork(&mine).await;
        assert!(matches!(
            outcome,
            MutationOutcome::Rejected { reason: RejectReason::OwnGist, ref message }
                if message == "You cannot fork your own gist"
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_star_state_is_not_read_for_own_gist() {
        let transport = MockTransport::new();
        let coordinator = coordinator(Arc::new(transport.clone()), signed_in_as("me"));
        let mine = gist("g1", "me");

        coordinator.load_star_state(&mine).await;
        let outcome = coordinator.star(&mine).await;

        assert!(matches!(
            outcome,
            MutationOutcome::Rejected { reason: RejectReason::OwnGist, .. }
        ));
        assert_eq!(transport.count_matching(HttpMethod::Get, "/star"), 0);
        assert_eq!(transport.count_matching(HttpMethod::Put, "/star"), 0);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_star_state_is_loaded_for_other_gists() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Get, format!("{HOST}/gists/g1/star"), response(204, ""));
        let coordinator = coordinator(Arc::new(transport.clone()), signed_in_as("me"));

        coordinator.load_star_state(&gist("g1", "octocat")).await;
        assert!(coordinator.snapshot("g1").starred);

        // No session: nothing is read.
        let anonymous = MutationCoordinator::new(Arc::new(GistClient::new_with_transport(
            HOST,
            Session::anonymous(),
            None,
            Arc::new(transport.clone()),
        )));
        anonymous.load_star_state(&gist("g1", "octocat")).await;
        assert_eq!(transport.count_matching(HttpMethod::Get, "/star"), 1);
    }

    #[tokio::test]
    async fn test_anonymous_user_is_asked_to_log_in() {
        let transport = MockTransport::new();
        let coordinator = coordinator(Arc::new(transport.clone()), Session::anonymous());

        let outcome = coordinator.star(&gist("g1", "octocat")).await;
        assert_eq!(
            outcome,
            MutationOutcome::Rejected {
                reason: RejectReason::NotAuthenticated,
                message: "Please log in to star gists".into(),
            }
        );
        assert!(transport.requests().is_empty());
        assert_eq!(coordinator.snapshot("g1"), GistCounters::default());
    }

    #[tokio::test]
    async fn test_unknown_login_is_not_treated_as_owner() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Put, format!("{HOST}/gists/g1/star"), response(204, ""));
        let coordinator = coordinator(Arc::new(transport.clone()), Session::with_token("tok", None));

        let outcome = coordinator.star(&gist("g1", "octocat")).await;
        assert_eq!(outcome, MutationOutcome::Committed { navigate_to: None });
    }

    #[tokio::test]
    async fn test_server_refusing_fork_of_own_gist_rolls_back_with_owner_message() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            format!("{HOST}/gists/g1/forks"),
            response(422, r#"{"message":"Validation Failed"}"#),
        );
        let coordinator = coordinator(Arc::new(transport.clone()), Session::with_token("tok", None));
        coordinator.seed("g1", 0, 2, false);

        let outcome = coordinator.fork(&gist("g1", "octocat")).await;

        assert_eq!(
            outcome,
            MutationOutcome::RolledBack {
                message: "You cannot fork your own gist".into(),
            }
        );
        assert_eq!(coordinator.snapshot("g1").forks, 2);
        assert_eq!(coordinator.phase("g1", ActionKind::Fork), MutationPhase::RolledBack);
    }

    #[test]
    fn test_failure_messages_by_error_kind() {
        assert_eq!(
            failure_message(Action::Star, &GistError::AuthRequired),
            GistError::AuthRequired.to_string()
        );
        let own = GistError::Api {
            status: 403,
            message: "You cannot star your own gist".into(),
        };
        assert_eq!(failure_message(Action::Star, &own), "You cannot star your own gist");
        let unprocessable = GistError::Api {
            status: 422,
            message: "Validation Failed".into(),
        };
        assert_eq!(
            failure_message(Action::Star, &unprocessable),
            "Failed to star gist. Please try again."
        );
        assert_eq!(
            failure_message(Action::Unstar, &GistError::Network("reset".into())),
            "Failed to unstar gist. Please try again."
        );
    }

    #[tokio::test]
    async fn test_fork_commits_and_exposes_new_gist_id() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            format!("{HOST}/gists/g1/forks"),
            response(
                201,
                serde_json::to_vec(&serde_json::json!({
                    "id": "xyz789",
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z",
                    "owner": { "login": "me", "id": 42 }
                }))
                .unwrap(),
            ),
        );
        let coordinator = coordinator(Arc::new(transport.clone()), signed_in_as("me"));

        let outcome = coordinator.fork(&gist("g1", "octocat")).await;

        assert_eq!(
            outcome,
            MutationOutcome::Committed {
                navigate_to: Some("xyz789".into())
            }
        );
        let counters = coordinator.snapshot("g1");
        assert_eq!(counters.forks, 1);
        assert!(!counters.fork_pending);
        assert_eq!(coordinator.phase("g1", ActionKind::Fork), MutationPhase::Committed);
    }

    #[tokio::test]
    async fn test_failed_star_restores_previous_counters_exactly() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            format!("{HOST}/gists/other/forks"),
            response(201, r#"{"id":"f1","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#),
        );
        transport.push_response(HttpMethod::Put, format!("{HOST}/gists/g1/star"), response(500, "boom"));
        let coordinator = coordinator(Arc::new(transport.clone()), signed_in_as("me"));
        coordinator.seed("g1", 5, 2, false);

        coordinator.fork(&gist("other", "octocat")).await;
        let outcome = coordinator.star(&gist("g1", "octocat")).await;

        assert_eq!(
            outcome,
            MutationOutcome::RolledBack {
                message: "Failed to star gist. Please try again.".into()
            }
        );
        assert_eq!(
            coordinator.snapshot("g1"),
            GistCounters {
                stars: 5,
                forks: 2,
                starred: false,
                star_pending: false,
                fork_pending: false,
            }
        );
        assert_eq!(coordinator.snapshot("other").forks, 1);
        assert_eq!(coordinator.phase("g1", ActionKind::Star), MutationPhase::RolledBack);
    }

    #[tokio::test]
    async fn test_unauthorized_rollback_asks_to_log_in() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Post,
            format!("{HOST}/gists/g1/forks"),
            response(401, r#"{"message":"Bad credentials"}"#),
        );
        let coordinator = coordinator(Arc::new(transport.clone()), signed_in_as("me"));

        let outcome = coordinator.fork(&gist("g1", "octocat")).await;
        assert_eq!(
            outcome,
            MutationOutcome::RolledBack {
                message: "Authentication required. Please log in with GitHub.".into()
            }
        );
        assert_eq!(coordinator.snapshot("g1").forks, 0);
    }

    #[tokio::test]
    async fn test_failed_unstar_at_zero_restores_flag_without_going_negative() {
        let transport = MockTransport::new();
        transport.push_failure(HttpMethod::Delete, format!("{HOST}/gists/g1/star"), "reset");
        let coordinator = coordinator(Arc::new(transport.clone()), signed_in_as("me"));
        coordinator.seed("g1", 0, 0, true);

        let outcome = coordinator.unstar(&gist("g1", "octocat")).await;
        assert!(matches!(outcome, MutationOutcome::RolledBack { .. }));

        let counters = coordinator.snapshot("g1");
        assert_eq!(counters.stars, 0);
        assert!(counters.starred);
    }

    #[tokio::test]
    async fn test_unstar_twice_keeps_flag_false() {
        let transport = MockTransport::new();
        let url = format!("{HOST}/gists/g1/star");
        transport.push_response(HttpMethod::Delete, url.clone(), response(204, ""));
        transport.push_response(HttpMethod::Delete, url.clone(), response(204, ""));
        transport.push_response(HttpMethod::Delete, url, response(204, ""));
        let coordinator = coordinator(Arc::new(transport.clone()), signed_in_as("me"));
        coordinator.seed("g1", 2, 0, true);
        let target = gist("g1", "octocat");

        coordinator.unstar(&target).await;
        assert_eq!(coordinator.snapshot("g1").stars, 1);
        assert!(!coordinator.snapshot("g1").starred);

        coordinator.unstar(&target).await;
        coordinator.unstar(&target).await;
        let counters = coordinator.snapshot("g1");
        assert_eq!(counters.stars, 0);
        assert!(!counters.starred);
    }

    #[tokio::test]
    async fn test_toggle_star_alternates() {
        let transport = MockTransport::new();
        let url = format!("{HOST}/gists/g1/star");
        transport.push_response(HttpMethod::Put, url.clone(), response(204, ""));
        transport.push_response(HttpMethod::Delete, url, response(204, ""));
        let coordinator = coordinator(Arc::new(transport.clone()), signed_in_as("me"));
        let target = gist("g1", "octocat");

        coordinator.toggle_star(&target).await;
        assert_eq!(coordinator.snapshot("g1").stars, 1);
        assert!(coordinator.snapshot("g1").starred);

        coordinator.toggle_star(&target).await;
        assert_eq!(coordinator.snapshot("g1"), GistCounters::default());
        assert_eq!(transport.count_matching(HttpMethod::Put, "/star"), 1);
        assert_eq!(transport.count_matching(HttpMethod::Delete, "/star"), 1);
    }

    /// Holds every request until released.
    struct GatedTransport {
        inner: MockTransport,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl HttpTransport for GatedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.gate.notified().await;
            self.inner.send(request).await
        }
    }

    #[tokio::test]
    async fn test_second_action_while_pending_is_ignored() {
        let mock = MockTransport::new();
        mock.push_response(HttpMethod::Put, format!("{HOST}/gists/g1/star"), response(204, ""));
        let gate = Arc::new(Notify::new());
        let transport = GatedTransport {
            inner: mock.clone(),
            gate: Arc::clone(&gate),
        };
        let coordinator = Arc::new(coordinator(Arc::new(transport), signed_in_as("me")));
        let target = gist("g1", "octocat");

        let first = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            let target = target.clone();
            async move { coordinator.star(&target).await }
        });

        while !coordinator.snapshot("g1").star_pending {
            tokio::task::yield_now().await;
        }
        let counters = coordinator.snapshot("g1");
        assert_eq!(counters.stars, 1);
        assert!(counters.starred);

        assert_eq!(coordinator.star(&target).await, MutationOutcome::Ignored);
        assert_eq!(coordinator.unstar(&target).await, MutationOutcome::Ignored);
        assert_eq!(coordinator.snapshot("g1").stars, 1);

        gate.notify_one();
        let outcome = first.await.expect("task");
        assert_eq!(outcome, MutationOutcome::Committed { navigate_to: None });
        assert_eq!(coordinator.snapshot("g1").stars, 1);
        assert_eq!(mock.requests().len(), 1);
    }
}
