use intake_core::models::form::{
    severity_label, AppetiteChanges, Choice, ConcernDuration, FormAssessmentInput, FormDraft,
    SchoolPerformance, SleepPatterns, SocialRelationships,
};
use intake_core::models::question::QuestionCategory;
use intake_core::models::response::AssessmentResponse;
use intake_core::models::summary::AssessmentSummary;
use intake_questions::{score_answer, QuestionBank};
use intake_summary::bridge::{form_to_chat, ExtractedChatState};
use intake_summary::form_to_summary;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::autosave::PageSave;
use crate::error::FormError;
use crate::fields::{FieldErrors, FieldValue, FormField, FormPage};
use crate::pages::{page_snapshot, validate_page, Page1Fields, Page2Fields, Page3Fields};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum FormIntent {
    /// A keystroke-level change. Never validates.
    Edit { field: FormField, value: FieldValue },
    /// Field blur: validate that field and autosave its page.
    SaveField { field: FormField },
    Next,
    Back,
    Submit,
    SwitchMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FormSnapshot {
    pub session_id: Uuid,
    pub page: FormPage,
    pub draft: FormDraft,
    pub errors: FieldErrors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<AssessmentSummary>,
    /// Set when the user leaves the form for the chat, carrying what the
    /// form collected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff: Option<ExtractedChatState>,
}

/// A submitted form, handed to the caller once for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct FormCompleted {
    pub summary: AssessmentSummary,
    pub form_data: FormDraft,
    pub responses: Vec<AssessmentResponse>,
}

/// Three ordered pages over one [`FormDraft`].
///
/// Forward navigation and submit are gated on validation; back is always
/// allowed, and back from page one leaves the form for the chat.
pub struct FormEngine {
    session_id: Uuid,
    page: FormPage,
    draft: FormDraft,
    errors: FieldErrors,
    summary: Option<AssessmentSummary>,
    child_name: Option<String>,
    bank: Box<dyn QuestionBank>,
    pending_save: Option<PageSave>,
    completed: Option<FormCompleted>,
}

impl FormEngine {
    pub fn new(session_id: Uuid, bank: Box<dyn QuestionBank>) -> Self {
        Self {
            session_id,
            page: FormPage::One,
            draft: FormDraft::default(),
            errors: FieldErrors::new(),
            summary: None,
            child_name: None,
            bank,
            pending_save: None,
            completed: None,
        }
    }

    /// Rebuild from saved page sections. Missing pages stay empty.
    pub fn restore(
        session_id: Uuid,
        bank: Box<dyn QuestionBank>,
        page1: Option<Page1Fields>,
        page2: Option<Page2Fields>,
        page3: Option<Page3Fields>,
    ) -> Self {
        let mut engine = Self::new(session_id, bank);
        if let Some(page) = page1 {
            page.apply(&mut engine.draft);
        }
        if let Some(page) = page2 {
            page.apply(&mut engine.draft);
        }
        if let Some(page) = page3 {
            page.apply(&mut engine.draft);
        }
        engine
    }

    /// Start from values carried over from the chat. Fields the chat could
    /// not map stay empty.
    pub fn prefill(&mut self, handoff: &FormDraft) {
        macro_rules! fill {
            ($($field:ident),*) => {
                $(if self.draft.$field.is_none() {
                    self.draft.$field = handoff.$field.clone();
                })*
            };
        }
        fill!(
            primary_concerns,
            concern_duration,
            concern_severity,
            sleep_patterns,
            appetite_changes,
            school_performance,
            social_relationships,
            recent_events,
            therapy_goals
        );
    }

    pub fn with_child_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.child_name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn page(&self) -> FormPage {
        self.page
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn take_pending_save(&mut self) -> Option<PageSave> {
        self.pending_save.take()
    }

    pub fn take_completed(&mut self) -> Option<FormCompleted> {
        self.completed.take()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            session_id: self.session_id,
            page: self.page,
            draft: self.draft.clone(),
            errors: self.errors.clone(),
            summary: self.summary.clone(),
            handoff: None,
        }
    }

    pub fn handle(&mut self, intent: FormIntent) -> Result<FormSnapshot, FormError> {
        match intent {
            FormIntent::Edit { field, value } => {
                self.require_on_page(field)?;
                self.edit(field, value)?;
            }
            FormIntent::SaveField { field } => {
                self.require_on_page(field)?;
                let mut page_errors = validate_page(self.page, &self.draft);
                match page_errors.remove(&field) {
                    Some(message) => self.errors.insert(field, message),
                    None => self.errors.remove(&field),
                };
                self.queue_save(self.page);
            }
            FormIntent::Next => self.next(),
            FormIntent::Back => {
                self.queue_save(self.page);
                match self.page.previous() {
                    Some(previous) => self.page = previous,
                    None => return Ok(self.leave_for_chat()),
                }
            }
            FormIntent::Submit => self.submit()?,
            FormIntent::SwitchMode => {
                self.queue_save(self.page);
                return Ok(self.leave_for_chat());
            }
        }
        Ok(self.snapshot())
    }

    fn edit(&mut self, field: FormField, value: FieldValue) -> Result<(), FormError> {
        let draft = &mut self.draft;
        match (field, value) {
            (FormField::PrimaryConcerns, FieldValue::Text(text)) => draft.primary_concerns = Some(text),
            (FormField::RecentEvents, FieldValue::Text(text)) => draft.recent_events = Some(text),
            (FormField::TherapyGoals, FieldValue::Text(text)) => draft.therapy_goals = Some(text),
            (FormField::ConcernDuration, FieldValue::Choice(c)) => {
                draft.concern_duration = Some(ConcernDuration::parse(&c)?);
            }
            (FormField::SleepPatterns, FieldValue::Choice(c)) => {
                draft.sleep_patterns = Some(SleepPatterns::parse(&c)?);
            }
            (FormField::AppetiteChanges, FieldValue::Choice(c)) => {
                draft.appetite_changes = Some(AppetiteChanges::parse(&c)?);
            }
            (FormField::SchoolPerformance, FieldValue::Choice(c)) => {
                draft.school_performance = Some(SchoolPerformance::parse(&c)?);
            }
            (FormField::SocialRelationships, FieldValue::Choice(c)) => {
                draft.social_relationships = Some(SocialRelationships::parse(&c)?);
            }
            (FormField::ConcernSeverity, FieldValue::Severity(n)) => draft.concern_severity = Some(n),
            (field, FieldValue::Clear) => clear(draft, field),
            (field, value) => {
                return Err(FormError::WrongValueKind {
                    field,
                    kind: match value {
                        FieldValue::Text(_) => "text",
                        FieldValue::Choice(_) => "choice",
                        FieldValue::Severity(_) => "severity",
                        FieldValue::Clear => "clear",
                    },
                });
            }
        }
        Ok(())
    }

    fn next(&mut self) {
        let page_errors = validate_page(self.page, &self.draft);
        self.replace_page_errors(self.page, page_errors.clone());
        if !page_errors.is_empty() {
            tracing::debug!(session_id = %self.session_id, page = self.page.number(), "page does not validate");
            return;
        }
        self.queue_save(self.page);
        if let Some(next) = self.page.next() {
            self.page = next;
        }
    }

    fn submit(&mut self) -> Result<(), FormError> {
        if self.page != FormPage::Three {
            return Err(FormError::NotLastPage);
        }
        self.queue_save(self.page);

        let mut first_invalid = None;
        for page in FormPage::ALL {
            let page_errors = validate_page(page, &self.draft);
            if !page_errors.is_empty() && first_invalid.is_none() {
                first_invalid = Some(page);
            }
            self.replace_page_errors(page, page_errors);
        }
        if let Some(page) = first_invalid {
            tracing::debug!(session_id = %self.session_id, page = page.number(), "submit blocked by validation");
            self.page = page;
            return Ok(());
        }

        let pages = (
            Page1Fields::from_draft(&self.draft).to_page(),
            Page2Fields::from_draft(&self.draft).to_page(),
            Page3Fields::from_draft(&self.draft).to_page(),
        );
        let (Some(page1), page2, Some(page3)) = pages else {
            return Ok(());
        };
        let input = FormAssessmentInput::from_pages(page1, page2, page3);
        let summary = form_to_summary(&input, self.child_name.as_deref());
        let responses = responses_from_form(&input, self.bank.as_ref(), summary.generated_at);

        tracing::info!(session_id = %self.session_id, "form submitted");
        self.completed = Some(FormCompleted {
            summary: summary.clone(),
            form_data: FormDraft::from(&input),
            responses,
        });
        self.summary = Some(summary);
        Ok(())
    }

    fn leave_for_chat(&mut self) -> FormSnapshot {
        tracing::info!(session_id = %self.session_id, "switching to chat");
        let mut snapshot = self.snapshot();
        snapshot.handoff = Some(form_to_chat(&self.draft));
        snapshot
    }

    fn queue_save(&mut self, page: FormPage) {
        match page_snapshot(page, &self.draft) {
            Ok(data) => {
                self.pending_save = Some(PageSave {
                    session_id: self.session_id,
                    section: page.section(),
                    data,
                });
            }
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "failed to snapshot page");
            }
        }
    }

    fn replace_page_errors(&mut self, page: FormPage, page_errors: FieldErrors) {
        self.errors.retain(|field, _| field.page() != page);
        self.errors.extend(page_errors);
    }

    fn require_on_page(&self, field: FormField) -> Result<(), FormError> {
        if field.page() == self.page {
            Ok(())
        } else {
            Err(FormError::FieldNotOnPage {
                field,
                page: self.page,
            })
        }
    }
}

fn clear(draft: &mut FormDraft, field: FormField) {
    match field {
        FormField::PrimaryConcerns => draft.primary_concerns = None,
        FormField::ConcernDuration => draft.concern_duration = None,
        FormField::ConcernSeverity => draft.concern_severity = None,
        FormField::SleepPatterns => draft.sleep_patterns = None,
        FormField::AppetiteChanges => draft.appetite_changes = None,
        FormField::SchoolPerformance => draft.school_performance = None,
        FormField::SocialRelationships => draft.social_relationships = None,
        FormField::RecentEvents => draft.recent_events = None,
        FormField::TherapyGoals => draft.therapy_goals = None,
    }
}

/// Express a form submission as structured-question responses so both
/// modes sync the same records.
pub fn responses_from_form(
    input: &FormAssessmentInput,
    bank: &dyn QuestionBank,
    timestamp: jiff::Timestamp,
) -> Vec<AssessmentResponse> {
    let severity = severity_label(input.concern_severity);
    let answers: [(QuestionCategory, Option<&str>); 7] = [
        (QuestionCategory::ConcernDuration, Some(input.concern_duration.label())),
        (QuestionCategory::ConcernSeverity, severity),
        (QuestionCategory::SleepPatterns, input.sleep_patterns.map(|v| v.label())),
        (QuestionCategory::AppetiteChanges, input.appetite_changes.map(|v| v.label())),
        (QuestionCategory::SchoolPerformance, input.school_performance.map(|v| v.label())),
        (QuestionCategory::SocialRelationships, input.social_relationships.map(|v| v.label())),
        (QuestionCategory::TherapyGoals, Some(input.therapy_goals.trim())),
    ];

    answers
        .into_iter()
        .filter_map(|(category, text)| {
            let question = bank.for_category(category)?;
            let text = text?;
            Some(AssessmentResponse {
                question_id: question.id.clone(),
                response_text: text.to_string(),
                response_value: score_answer(question, text),
                timestamp,
            })
        })
        .collect()
}
