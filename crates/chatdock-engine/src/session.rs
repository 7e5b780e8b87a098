//! Conversation session state machine.
//!
//! [`Session`] owns the transcript, the draft, and the pending flag. It never
//! performs I/O: every transition returns the [`Effect`]s the caller has to
//! carry out (send a request, move focus, scroll, close the widget). The
//! request outcome is fed back through [`Session::resolve`].
//!
//! ```text
//!            submit(text)                   resolve(outcome)
//!   Idle ─────────────────────▶ Pending ─────────────────────▶ Idle
//!    ▲  (appends USER message,    │      (appends ASSISTANT message,
//!    │   emits Send)              │       clears draft, emits FocusInput)
//!    └── submit while pending / blank text: no-op
//! ```

use crate::clock::Clock;
use crate::message::{Message, Origin};
use crate::protocol::{ChatError, ChatRequest, ChatResponse, DEFAULT_SESSION_ID};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Greeting seeded into every new session.
pub const DEFAULT_GREETING: &str = "Hi! Ask me anything about Insurellm.";

/// Shown when the server could not be reached.
pub const CONNECTIVITY_FALLBACK: &str =
    "Unable to connect to the server. Please check your internet connection.";

/// Shown when the server answered with an error or an unusable body.
pub const SERVICE_FALLBACK: &str =
    "The server is experiencing issues. Please try again in a moment.";

/// Shown when the request vanished without an outcome.
pub const GENERIC_FALLBACK: &str = "Sorry, there was an error. Please try again.";

/// Work a transition asks the caller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue exactly one outbound request and feed its outcome to `resolve`.
    Send(ChatRequest),
    /// Bring the newest message into view.
    ScrollToLatest,
    /// Give input focus back to the entry field.
    FocusInput,
    /// Ask the parent to hide the widget.
    Close,
}

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Identifier sent with every request.
    pub session_id: String,
    /// First assistant message.
    pub greeting: String,
    /// Append the underlying error to fallback messages.
    pub debug_errors: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            session_id: DEFAULT_SESSION_ID.into(),
            greeting: DEFAULT_GREETING.into(),
            debug_errors: false,
        }
    }
}

/// One conversation: transcript, draft input, and the in-flight flag.
pub struct Session {
    messages: Vec<Message>,
    draft: String,
    pending: bool,
    last_failure: Option<ChatError>,
    options: SessionOptions,
    clock: Arc<dyn Clock>,
}

impl Session {
    /// Create a session seeded with the greeting.
    pub fn new(options: SessionOptions, clock: Arc<dyn Clock>) -> Self {
        let greeting = Message::assistant(options.greeting.clone(), clock.now());
        info!(session_id = %options.session_id, "Conversation session started");
        Self {
            messages: vec![greeting],
            draft: String::new(),
            pending: false,
            last_failure: None,
            options,
            clock,
        }
    }

    /// The transcript, in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current contents of the entry field.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether a request is awaiting its outcome.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn session_id(&self) -> &str {
        &self.options.session_id
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The error behind the most recent fallback message, if the latest
    /// settled request failed.
    pub fn last_failure(&self) -> Option<&ChatError> {
        self.last_failure.as_ref()
    }

    /// Replace the draft. Always allowed.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Submit a question.
    ///
    /// Blank text, or any call while a request is pending, is a no-op and
    /// returns no effects. Otherwise the user message is appended, the session
    /// becomes pending, and a single [`Effect::Send`] carries the trimmed
    /// question.
    pub fn submit(&mut self, text: &str) -> Vec<Effect> {
        let question = text.trim();
        if question.is_empty() {
            return Vec::new();
        }
        if self.pending {
            debug!("Submit ignored: a request is already pending");
            return Vec::new();
        }

        self.messages.push(Message::user(text, self.clock.now()));
        self.pending = true;
        self.last_failure = None;

        vec![
            Effect::ScrollToLatest,
            Effect::Send(ChatRequest::new(question, self.options.session_id.clone())),
        ]
    }

    /// Settle the pending request with its outcome.
    ///
    /// Appends exactly one assistant message: the answer, or a fallback
    /// describing the failure. An outcome arriving with nothing pending is
    /// dropped so no question is ever answered twice.
    pub fn resolve(&mut self, outcome: Result<ChatResponse, ChatError>) -> Vec<Effect> {
        if !self.pending {
            warn!("Dropping request outcome: nothing is pending");
            return Vec::new();
        }

        let text = match outcome {
            Ok(response) => response.answer,
            Err(error) => {
                warn!(error = %error, "Question failed; showing fallback");
                let text = fallback_text(&error, self.options.debug_errors);
                self.last_failure = Some(error);
                text
            }
        };

        self.messages.push(Message::assistant(text, self.clock.now()));
        self.pending = false;
        self.draft.clear();

        vec![Effect::ScrollToLatest, Effect::FocusInput]
    }

    /// Ask the parent to hide the widget. The transcript is untouched.
    pub fn close(&self) -> Effect {
        Effect::Close
    }

    /// Count of messages with the given origin.
    pub fn count(&self, origin: Origin) -> usize {
        self.messages.iter().filter(|m| m.origin() == origin).count()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("messages", &self.messages)
            .field("draft", &self.draft)
            .field("pending", &self.pending)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// The user-facing text for a failed request.
pub fn fallback_text(error: &ChatError, debug_errors: bool) -> String {
    let base = match error {
        ChatError::Transport(_) => CONNECTIVITY_FALLBACK,
        ChatError::Server { .. } | ChatError::Malformed(_) => SERVICE_FALLBACK,
        ChatError::Aborted(_) => GENERIC_FALLBACK,
    };
    if debug_errors {
        format!("{base} (Debug: {error})")
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SteppingClock};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn session() -> Session {
        Session::new(
            SessionOptions::default(),
            Arc::new(SteppingClock::new(start(), Duration::minutes(1))),
        )
    }

    fn sent(effects: &[Effect]) -> Vec<&ChatRequest> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_session_seeds_greeting() {
        let session = session();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].origin(), Origin::Assistant);
        assert_eq!(session.messages()[0].text(), DEFAULT_GREETING);
        assert_eq!(session.messages()[0].created_at(), start());
        assert!(!session.is_pending());
        assert!(session.draft().is_empty());
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut session = session();
        assert!(session.submit("").is_empty());
        assert!(session.submit("   ").is_empty());
        assert!(session.submit("\n\t").is_empty());
        assert_eq!(session.messages().len(), 1);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_submit_appends_user_message_and_sends_trimmed_question() {
        let mut session = session();
        session.update_draft("  What plans do you offer?  ");
        let effects = session.submit("  What plans do you offer?  ");

        let requests = sent(&effects);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].question, "What plans do you offer?");
        assert_eq!(requests[0].session_id, "default");
        assert!(effects.contains(&Effect::ScrollToLatest));

        assert!(session.is_pending());
        assert_eq!(session.messages().len(), 2);
        let user = &session.messages()[1];
        assert_eq!(user.origin(), Origin::User);
        assert_eq!(user.text(), "  What plans do you offer?  ");
        assert_eq!(user.created_at(), start() + Duration::minutes(1));
    }

    #[test]
    fn test_draft_survives_until_settled() {
        let mut session = session();
        session.update_draft("Do you cover boats?");
        session.submit("Do you cover boats?");
        assert_eq!(session.draft(), "Do you cover boats?");

        session.resolve(Ok(ChatResponse::new("Yes.")));
        assert!(session.draft().is_empty());
    }

    #[test]
    fn test_submit_while_pending_is_noop() {
        let mut session = session();
        let first = session.submit("first");
        let second = session.submit("second");

        assert_eq!(sent(&first).len(), 1);
        assert!(second.is_empty());
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_scenario_successful_answer() {
        let mut session = session();
        session.submit("What plans do you offer?");
        let effects = session.resolve(Ok(ChatResponse::new(
            "We offer auto, home, and life insurance.",
        )));

        assert_eq!(effects, vec![Effect::ScrollToLatest, Effect::FocusInput]);
        let texts: Vec<(Origin, &str)> = session
            .messages()
            .iter()
            .map(|m| (m.origin(), m.text()))
            .collect();
        assert_eq!(
            texts,
            vec![
                (Origin::Assistant, DEFAULT_GREETING),
                (Origin::User, "What plans do you offer?"),
                (Origin::Assistant, "We offer auto, home, and life insurance."),
            ]
        );
        assert!(!session.is_pending());
        assert!(session.last_failure().is_none());
    }

    #[test]
    fn test_scenario_connectivity_failure() {
        let mut session = session();
        session.submit("hello?");
        session.resolve(Err(ChatError::Transport("connection refused".into())));

        assert_eq!(session.messages().len(), 3);
        let reply = &session.messages()[2];
        assert_eq!(reply.origin(), Origin::Assistant);
        assert_eq!(reply.text(), CONNECTIVITY_FALLBACK);
        assert!(!session.is_pending());
        assert!(matches!(
            session.last_failure(),
            Some(ChatError::Transport(_))
        ));
    }

    #[test]
    fn test_scenario_server_error_is_friendly() {
        let mut session = session();
        session.submit("hello?");
        session.resolve(Err(ChatError::Server {
            status: 500,
            body: "Traceback (most recent call last): ...".into(),
        }));

        let reply = session.messages().last().unwrap();
        assert_eq!(reply.text(), SERVICE_FALLBACK);
        assert!(!reply.text().contains("Traceback"));
        assert!(!reply.text().contains("500"));
    }

    #[test]
    fn test_malformed_response_matches_server_error() {
        let mut session = session();
        session.submit("hello?");
        session.resolve(Err(ChatError::Malformed("missing field `answer`".into())));
        assert_eq!(session.messages().last().unwrap().text(), SERVICE_FALLBACK);
    }

    #[test]
    fn test_scenario_rapid_double_submit() {
        let mut session = session();
        let mut requests = 0;
        requests += sent(&session.submit("first")).len();
        requests += sent(&session.submit("second")).len();
        assert_eq!(requests, 1);

        session.resolve(Ok(ChatResponse::new("answer")));
        assert_eq!(session.count(Origin::User), 1);
        assert_eq!(session.count(Origin::Assistant), 2);
    }

    #[test]
    fn test_stray_outcome_is_dropped() {
        let mut session = session();
        assert!(session.resolve(Ok(ChatResponse::new("unasked"))).is_empty());
        assert_eq!(session.messages().len(), 1);

        session.submit("q");
        session.resolve(Ok(ChatResponse::new("a")));
        assert!(session.resolve(Ok(ChatResponse::new("again"))).is_empty());
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn test_every_question_answered_once() {
        let mut session = session();
        let questions = ["one", "two", "three", "four", "five"];
        for (i, q) in questions.iter().enumerate() {
            session.submit(q);
            // Extra submits while pending must not add questions.
            session.submit("ignored");
            let outcome = if i % 2 == 0 {
                Ok(ChatResponse::new(format!("answer {i}")))
            } else {
                Err(ChatError::Transport("down".into()))
            };
            session.resolve(outcome);
            assert!(!session.is_pending());
            assert!(session.draft().is_empty());
        }

        assert_eq!(session.count(Origin::User), questions.len());
        // Greeting plus one reply per question.
        assert_eq!(session.count(Origin::Assistant), questions.len() + 1);

        // Each user message is immediately followed by its reply.
        for pair in session.messages()[1..].chunks(2) {
            assert_eq!(pair[0].origin(), Origin::User);
            assert_eq!(pair[1].origin(), Origin::Assistant);
        }
    }

    #[test]
    fn test_submit_accepted_again_after_failure() {
        let mut session = session();
        session.submit("first");
        session.resolve(Err(ChatError::Server {
            status: 502,
            body: String::new(),
        }));
        assert_eq!(sent(&session.submit("second")).len(), 1);
        assert!(session.last_failure().is_none());
    }

    #[test]
    fn test_close_keeps_transcript() {
        let mut session = session();
        session.submit("q");
        assert_eq!(session.close(), Effect::Close);
        assert_eq!(session.messages().len(), 2);
        assert!(session.is_pending());

        // A request started before closing still lands in the transcript.
        session.resolve(Ok(ChatResponse::new("a")));
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn test_identical_questions_not_deduplicated() {
        let mut session = session();
        for _ in 0..2 {
            assert_eq!(sent(&session.submit("same")).len(), 1);
            session.resolve(Ok(ChatResponse::new("same answer")));
        }
        assert_eq!(session.count(Origin::User), 2);
    }

    #[test]
    fn test_fallback_debug_suffix() {
        let err = ChatError::Server {
            status: 500,
            body: String::new(),
        };
        assert_eq!(fallback_text(&err, false), SERVICE_FALLBACK);
        assert_eq!(
            fallback_text(&err, true),
            format!("{SERVICE_FALLBACK} (Debug: Server error: 500)")
        );
        assert_eq!(
            fallback_text(&ChatError::Aborted("panicked".into()), false),
            GENERIC_FALLBACK
        );
    }

    #[test]
    fn test_fixed_clock_timestamps() {
        let clock = Arc::new(FixedClock(start()));
        let mut session = Session::new(SessionOptions::default(), clock);
        session.submit("q");
        session.resolve(Ok(ChatResponse::new("a")));
        assert!(session.messages().iter().all(|m| m.created_at() == start()));
    }
}
