//! The assessment flows behind each subcommand. Input is read line by line
//! so a script can drive a whole session.

use std::sync::Arc;

use intake_chat::{ChatIntent, ChatResponder, ChatSession, KeywordClassifier, ScriptedResponder};
use intake_core::keys::section;
use intake_core::models::form::{parse_severity, FormDraft};
use intake_core::models::message::ChatPhase;
use intake_core::models::onboarding::{ChildInfo, Coverage, ParentInfo};
use intake_core::models::session::OnboardingStep;
use intake_form::{AutoSaver, FieldValue, FormField, FormIntent, FormSession};
use intake_questions::default_bank;
use intake_questions::engine::{Answer, Key};
use intake_storage::{FileStore, KeyValueStore, Persisted, SessionStore};
use intake_sync::{plan, LocalRecords};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use uuid::Uuid;

use crate::config::IntakeConfig;
use crate::render;

pub struct App {
    pub config: IntakeConfig,
    pub store: SessionStore,
}

impl App {
    /// Bind the session store to files under the configured directory.
    pub fn new(config: IntakeConfig) -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.storage_dir.clone()));
        let store = SessionStore::with_settings(kv, config.session_settings());
        Self { config, store }
    }

    pub fn with_store(config: IntakeConfig, store: SessionStore) -> Self {
        Self { config, store }
    }
}

enum Exit {
    Quit,
    ToForm(FormDraft),
    ToChat(FormDraft),
}

/// Run an assessment until the user quits or submits, moving between the
/// chat and the form as asked.
pub async fn assess<R>(app: &App, session_id: Uuid, start_in_form: bool, input: R) -> eyre::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let session = app.store.open(session_id)?;
    tracing::info!(%session_id, status = ?session.status, "assessment opened");
    println!("Session {session_id}");

    let mut lines = input.lines();
    let mut exit = if start_in_form {
        form(app, session_id, None, &mut lines).await?
    } else {
        chat(app, session_id, None, &mut lines).await?
    };
    loop {
        exit = match exit {
            Exit::Quit => return Ok(()),
            Exit::ToForm(draft) => form(app, session_id, Some(draft), &mut lines).await?,
            Exit::ToChat(draft) => chat(app, session_id, Some(draft), &mut lines).await?,
        };
    }
}

fn child_name(store: &SessionStore, session_id: Uuid) -> Option<String> {
    store
        .load_section::<ChildInfo>(session_id, section::CHILD_INFO)
        .map(|child| child.first_name)
}

async fn chat<R>(
    app: &App,
    session_id: Uuid,
    carried: Option<FormDraft>,
    lines: &mut Lines<R>,
) -> eyre::Result<Exit>
where
    R: AsyncBufRead + Unpin,
{
    let bank = default_bank();
    let responder: Arc<dyn ChatResponder> = Arc::new(ScriptedResponder::default());
    let classifier = KeywordClassifier::with_extra(&app.config.crisis_keywords);
    let mut engine = intake_chat::resume_or_new(&app.store, session_id, bank.as_ref(), responder)
        .with_settings(app.config.chat_settings())
        .with_classifier(Arc::new(classifier));
    if let Some(name) = child_name(&app.store, session_id) {
        engine = engine.with_child_name(name);
    }
    if let Some(draft) = &carried {
        engine.carry_over(draft);
    }

    let session = ChatSession::new(engine, app.store.clone());
    let mut updates = session.subscribe();
    let mut snapshot = session.handle(ChatIntent::Start).await?;
    let mut shown = render::messages(&snapshot, 0);
    if snapshot.phase == ChatPhase::SummaryReady {
        if let Some(summary) = &snapshot.summary {
            render::summary(summary);
        }
    }
    println!("(/back, /form, /quit)");

    loop {
        if snapshot.phase == ChatPhase::StructuredQa {
            render::question_prompt(&snapshot);
        }
        let Some(line) = lines.next_line().await? else {
            return Ok(Exit::Quit);
        };
        let text = line.trim();

        let intents = match text {
            "" => continue,
            "/quit" => return Ok(Exit::Quit),
            "/back" => vec![ChatIntent::GoBack],
            "/form" => vec![ChatIntent::SwitchMode],
            "/cancel" if snapshot.draft.is_some() => vec![ChatIntent::Key { key: Key::Escape }],
            _ if snapshot.draft.is_some() => vec![
                ChatIntent::EditOther {
                    text: text.to_string(),
                },
                ChatIntent::Key {
                    key: Key::Enter { shift: false },
                },
            ],
            _ => match answer_intent(&snapshot, text) {
                Some(intent) => vec![intent],
                None => vec![ChatIntent::SendMessage {
                    text: text.to_string(),
                }],
            },
        };

        let before = snapshot.phase;
        for intent in intents {
            match session.handle(intent).await {
                Ok(next) => snapshot = next,
                Err(e) => {
                    println!("  ({e})");
                    break;
                }
            }
        }

        if let Some(handoff) = snapshot.handoff.take() {
            return Ok(Exit::ToForm(handoff));
        }

        // Let a recorded answer commit before showing the next question.
        while snapshot.questions.recording.is_some() {
            updates.changed().await?;
            snapshot = updates.borrow_and_update().clone();
        }

        shown = render::messages(&snapshot, shown);
        if snapshot.phase == ChatPhase::SummaryReady && before != ChatPhase::SummaryReady {
            if let Some(summary) = &snapshot.summary {
                render::summary(summary);
            }
        }
    }
}

/// A numbered option or `o` for the current structured question.
fn answer_intent(snapshot: &intake_chat::ChatSnapshot, text: &str) -> Option<ChatIntent> {
    if snapshot.phase != ChatPhase::StructuredQa {
        return None;
    }
    let question = snapshot.current_question.as_ref()?;
    if question.allow_other && text.eq_ignore_ascii_case("o") {
        return Some(ChatIntent::OpenOther);
    }
    let index = text.parse::<usize>().ok()?.checked_sub(1)?;
    let option = question.options.get(index)?;
    Some(ChatIntent::SubmitAnswer {
        question_id: question.id.clone(),
        answer: Answer::Option(option.clone()),
    })
}

async fn form<R>(
    app: &App,
    session_id: Uuid,
    prefill: Option<FormDraft>,
    lines: &mut Lines<R>,
) -> eyre::Result<Exit>
where
    R: AsyncBufRead + Unpin,
{
    let (autosaver, writer) = AutoSaver::spawn(app.store.clone(), app.config.autosave_settings());
    let mut engine = intake_form::resume_or_new(&app.store, session_id, default_bank());
    if let Some(name) = child_name(&app.store, session_id) {
        engine = engine.with_child_name(name);
    }
    if let Some(draft) = &prefill {
        engine.prefill(draft);
    }

    let mut session = FormSession::new(engine, app.store.clone(), autosaver);
    let mut snapshot = session.snapshot();

    let exit = loop {
        render::page(&snapshot);
        let Some(line) = lines.next_line().await? else {
            break Exit::Quit;
        };

        let intents = match line.trim() {
            "" => continue,
            "/quit" => break Exit::Quit,
            "/next" => vec![FormIntent::Next],
            "/back" => vec![FormIntent::Back],
            "/submit" => vec![FormIntent::Submit],
            "/chat" => vec![FormIntent::SwitchMode],
            edit => match parse_edit(edit) {
                Ok((field, value)) => vec![FormIntent::Edit { field, value }, FormIntent::SaveField { field }],
                Err(message) => {
                    println!("  ({message})");
                    continue;
                }
            },
        };

        for intent in intents {
            match session.handle(intent) {
                Ok(next) => snapshot = next,
                Err(e) => {
                    println!("  ({e})");
                    break;
                }
            }
        }

        if snapshot.handoff.is_some() {
            break Exit::ToChat(snapshot.draft.clone());
        }
        if let Some(summary) = &snapshot.summary {
            render::summary(summary);
            break Exit::Quit;
        }
    };

    // Closing the saver flushes any page save still inside the debounce window.
    drop(session);
    writer.await?;
    Ok(exit)
}

/// Parse `field = value`. A blank value clears the field; a number picks
/// the nth option of a choice field.
pub fn parse_edit(line: &str) -> Result<(FormField, FieldValue), String> {
    let (key, value) = line
        .split_once('=')
        .ok_or_else(|| "expected field = value".to_string())?;
    let key = key.trim();
    let value = value.trim();
    let field = FormField::from_key(key).ok_or_else(|| format!("unknown field '{key}'"))?;

    if value.is_empty() {
        return Ok((field, FieldValue::Clear));
    }

    let value = match field {
        FormField::ConcernSeverity => {
            let severity = parse_severity(value).ok_or_else(|| format!("'{value}' is not a severity from 1 to 5"))?;
            FieldValue::Severity(severity)
        }
        FormField::PrimaryConcerns | FormField::RecentEvents | FormField::TherapyGoals => {
            FieldValue::Text(value.to_string())
        }
        choice => {
            let picked = value
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| render::choices(choice)?.get(i).cloned());
            FieldValue::Choice(picked.unwrap_or_else(|| value.to_string()))
        }
    };
    Ok((field, value))
}

/// Onboarding records collected ahead of the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RecordKind {
    Parent,
    Child,
    Coverage,
}

/// Store an onboarding record given as JSON and mark its step complete.
pub fn record(app: &App, session_id: Uuid, kind: RecordKind, json: &str) -> eyre::Result<()> {
    let mut session = app.store.open(session_id)?;
    let persisted = match kind {
        RecordKind::Parent => {
            let parent: ParentInfo = serde_json::from_str(json)?;
            app.store
                .record_step(&mut session, OnboardingStep::ParentInfo, section::PARENT_INFO, &parent)
        }
        RecordKind::Child => {
            let child: ChildInfo = serde_json::from_str(json)?;
            app.store
                .record_step(&mut session, OnboardingStep::ChildInfo, section::CHILD_INFO, &child)
        }
        RecordKind::Coverage => {
            let coverage: Coverage = serde_json::from_str(json)?;
            app.store
                .record_step(&mut session, OnboardingStep::Coverage, section::COVERAGE, &coverage)
        }
    };
    match persisted {
        Persisted::Durable => println!("Recorded {kind:?} for session {session_id}"),
        Persisted::MemoryOnly => println!("Recorded {kind:?} for this run only (storage unavailable)"),
    }
    Ok(())
}

pub fn summary(app: &App, session_id: Uuid) -> eyre::Result<()> {
    match app.store.load_summary(session_id) {
        Some(stored) => render::summary(&stored.summary),
        None => println!("No summary for session {session_id}"),
    }
    Ok(())
}

pub fn reset(app: &App, session_id: Uuid) -> eyre::Result<()> {
    app.store.start_over(session_id);
    println!("Session {session_id} cleared");
    Ok(())
}

/// Local progress and what a sync would replay. Never creates a session.
pub fn status(app: &App, session_id: Uuid) -> eyre::Result<()> {
    let local = LocalRecords::load(&app.store, session_id);
    let Some(session) = &local.session else {
        println!("No session {session_id}");
        return Ok(());
    };

    println!("Session {session_id}");
    println!("  status:  {:?}", session.status);
    println!("  expires: {}", session.expires_at);
    for (step, done) in &session.progress {
        println!("  {step:?}: {}", if *done { "done" } else { "pending" });
    }
    if let Some(coverage) = &local.coverage {
        println!("  coverage: {}", render::coverage(coverage));
    }
    println!("  responses: {}", local.responses.len());

    if local.is_complete() {
        let steps = plan(&local);
        println!("  sync: {} items in replay order", steps.len());
        for step in steps {
            println!("    {step}");
        }
    } else {
        println!("  sync: not checked (assessment incomplete)");
    }
    Ok(())
}
