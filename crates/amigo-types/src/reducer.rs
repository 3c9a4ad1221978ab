//! Client-side fold over a turn's event stream.
//!
//! The reducer receives the whole sequence seen so far on every update and
//! applies only the suffix it has not consumed yet, so re-delivering a
//! prefix never applies an event twice.

use std::time::{Duration, Instant};

use crate::domain::{DocumentKind, RoadmapEvent, SuggestionPayload};
use crate::events::{DataPart, SequencedEvent, StreamEvent};

pub const ROADMAP_TITLE: &str = "AI Generated Roadmap";
pub const COURSE_REDIRECT: &str = "/course";
pub const NAVIGATION_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactStatus {
    #[default]
    Idle,
    Streaming,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArtifactPanel {
    pub document_id: Option<String>,
    pub title: String,
    pub kind: DocumentKind,
    pub content: String,
    pub is_visible: bool,
    pub status: ArtifactStatus,
}

impl ArtifactPanel {
    fn apply(&mut self, part: &DataPart) {
        let was_streaming = self.status == ArtifactStatus::Streaming;
        let previous_len = self.content.chars().count();

        match part {
            DataPart::Id(id) => self.document_id = Some(id.clone()),
            DataPart::Title(title) => self.title = title.clone(),
            DataPart::Kind(kind) => self.kind = *kind,
            DataPart::TextDelta(delta) => {
                self.content.push_str(delta);
                if was_streaming && previous_len > 400 && previous_len < 450 {
                    self.is_visible = true;
                }
            }
            DataPart::CodeDelta(code) => {
                self.content = code.clone();
                if was_streaming && previous_len > 300 && previous_len < 310 {
                    self.is_visible = true;
                }
            }
            DataPart::ImageDelta(image) => {
                self.content = image.clone();
                self.is_visible = true;
            }
            DataPart::Clear(_) => self.content.clear(),
            DataPart::Finish => {
                self.status = ArtifactStatus::Idle;
                return;
            }
            _ => return,
        }
        self.status = ArtifactStatus::Streaming;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoadmapView {
    pub title: String,
    pub events: Vec<RoadmapEvent>,
    /// Once set, never cleared for the life of the reducer
    pub has_roadmap: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct PendingNavigation {
    target: String,
    ready_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct StreamReducer {
    last_index: Option<u64>,
    pub artifact: ArtifactPanel,
    pub roadmap: RoadmapView,
    /// Optimistic suggestion list shown next to the document
    pub suggestions: Vec<SuggestionPayload>,
    deferred_suggestions: Vec<SuggestionPayload>,
    navigation: Option<PendingNavigation>,
    pub user_message_id: Option<String>,
    pub assistant_message_ids: Vec<String>,
    pub assistant_text: String,
    pub last_error: Option<String>,
}

impl StreamReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_index(&self) -> Option<u64> {
        self.last_index
    }

    /// Folds every event past the last consumed index and returns how many
    /// were applied. Suggestions received earlier are flushed first.
    pub fn apply_suffix(&mut self, events: &[SequencedEvent], now: Instant) -> usize {
        self.tick();

        let mut applied = 0;
        for sequenced in events {
            if self.last_index.is_some_and(|last| sequenced.index <= last) {
                continue;
            }
            self.apply_event(&sequenced.event, now);
            self.last_index = Some(sequenced.index);
            applied += 1;
        }
        applied
    }

    /// Moves deferred suggestions into the optimistic list
    pub fn tick(&mut self) {
        self.suggestions.append(&mut self.deferred_suggestions);
    }

    /// Returns the navigation target once its delay has elapsed; one-shot
    pub fn take_navigation(&mut self, now: Instant) -> Option<String> {
        match &self.navigation {
            Some(pending) if pending.ready_at <= now => {
                self.navigation.take().map(|p| p.target)
            }
            _ => None,
        }
    }

    pub fn has_pending_navigation(&self) -> bool {
        self.navigation.is_some()
    }

    fn apply_event(&mut self, event: &StreamEvent, now: Instant) {
        match event {
            StreamEvent::Text { content } => self.assistant_text.push_str(content),
            StreamEvent::MessageAnnotation { message_id_from_server } => {
                self.assistant_message_ids.push(message_id_from_server.clone());
            }
            StreamEvent::Error { message } => self.last_error = Some(message.clone()),
            StreamEvent::Data { data } => self.apply_data(data, now),
            _ => {}
        }
    }

    fn apply_data(&mut self, part: &DataPart, now: Instant) {
        match part {
            DataPart::UserMessageId(id) => self.user_message_id = Some(id.clone()),
            DataPart::RoadmapCreation(events) => {
                self.roadmap.title = ROADMAP_TITLE.to_string();
                self.roadmap.events = events.clone();
                self.roadmap.has_roadmap = true;
            }
            DataPart::CoursePlanSave(_) => {
                self.navigation = Some(PendingNavigation {
                    target: COURSE_REDIRECT.to_string(),
                    ready_at: now + NAVIGATION_DELAY,
                });
            }
            DataPart::Suggestion(suggestion) => self.deferred_suggestions.push(suggestion.clone()),
            other => self.artifact.apply(other),
        }
    }
}
