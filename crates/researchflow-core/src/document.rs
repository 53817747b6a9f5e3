//! Document-grounded chat surface

use crate::error::{Error, Result};
use crate::ports::{DocumentBackend, DocumentSource, ExtractedDocument};
use crate::sequencer::{Completion, RequestKind, RequestSequencer, SurfaceStatus, Ticket};
use crate::session::{SessionState, SessionStore, Surface};
use crate::transcript::Transcript;
use crate::types::{ChatMessage, ChatRole, Turn};
use crate::validate;
use researchflow_storage::KeyValueStore;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMode {
    /// Waiting for a URL or file
    Setup,
    Extracting,
    Chat,
    /// Extraction failed; shown as a dedicated error screen
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    Open,
    Extracted,
    ExtractionFailed(String),
    Reset,
    Switch,
    Send,
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMode::Setup => f.write_str("setup"),
            ChatMode::Extracting => f.write_str("extracting"),
            ChatMode::Chat => f.write_str("chat"),
            ChatMode::Failed(_) => f.write_str("failed"),
        }
    }
}

impl fmt::Display for ChatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChatAction::Open => "open a document",
            ChatAction::Extracted => "finish extraction",
            ChatAction::ExtractionFailed(_) => "fail extraction",
            ChatAction::Reset => "reset",
            ChatAction::Switch => "switch documents",
            ChatAction::Send => "send a message",
        };
        f.write_str(name)
    }
}

impl ChatMode {
    /// Next mode for `action`, or `InvalidTransition`
    pub fn apply(&self, action: &ChatAction) -> Result<ChatMode> {
        let next = match (self, action) {
            (ChatMode::Setup, ChatAction::Open) => ChatMode::Extracting,
            (ChatMode::Extracting, ChatAction::Extracted) => ChatMode::Chat,
            (ChatMode::Extracting, ChatAction::ExtractionFailed(msg)) => ChatMode::Failed(msg.clone()),
            (ChatMode::Failed(_), ChatAction::Reset) => ChatMode::Setup,
            (ChatMode::Chat, ChatAction::Switch) => ChatMode::Setup,
            (ChatMode::Chat, ChatAction::Send) => ChatMode::Chat,
            (from, action) => {
                return Err(Error::InvalidTransition {
                    from: from.to_string(),
                    action: action.to_string(),
                })
            }
        };
        Ok(next)
    }
}

/// The extracted document a conversation is grounded on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContext {
    pub text: String,
    pub title: String,
}

#[derive(Debug)]
pub struct PendingExtraction {
    ticket: Ticket,
    pub source: DocumentSource,
}

#[derive(Debug)]
pub struct PendingChat {
    ticket: Ticket,
    pub context: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug)]
pub struct DocumentChatSurface {
    mode: ChatMode,
    context: Option<DocumentContext>,
    transcript: Transcript,
    sequencer: RequestSequencer,
    session: SessionStore,
}

impl DocumentChatSurface {
    /// Build the surface; a stored context goes straight to `Chat`
    pub fn mount(store: Arc<dyn KeyValueStore>) -> Self {
        let session = SessionStore::new(store, Surface::DocumentChat);
        let mut surface = Self {
            mode: ChatMode::Setup,
            context: None,
            transcript: Transcript::new(),
            sequencer: RequestSequencer::new(),
            session,
        };

        if let Some(state) = surface.session.load() {
            match state.context_text {
                Some(text) if !text.trim().is_empty() => {
                    let title = state
                        .context_title
                        .unwrap_or_else(|| "your document".to_string());
                    surface.context = Some(DocumentContext { text, title });
                    surface.transcript = state.transcript;
                    surface.mode = ChatMode::Chat;
                    tracing::info!(turns = surface.transcript.len(), "document chat restored");
                }
                _ => tracing::warn!("stored document chat has no context, starting over"),
            }
        }
        surface
    }

    pub fn mode(&self) -> &ChatMode {
        &self.mode
    }

    pub fn context(&self) -> Option<&DocumentContext> {
        self.context.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn status(&self) -> SurfaceStatus {
        self.sequencer.status()
    }

    pub fn is_loading(&self) -> bool {
        self.sequencer.is_loading()
    }

    /// Opening line shown above the conversation
    pub fn greeting(&self) -> Option<String> {
        match (&self.mode, &self.context) {
            (ChatMode::Chat, Some(ctx)) => Some(format!(
                "I've read \"{}\". What would you like to know about it?",
                ctx.title
            )),
            _ => None,
        }
    }

    /// User and assistant turns in order, as sent to the chat backend
    pub fn dialogue(&self) -> Vec<ChatMessage> {
        self.transcript
            .iter()
            .filter_map(|turn| match turn {
                Turn::UserQuery { text } => Some(ChatMessage {
                    role: ChatRole::User,
                    content: text.clone(),
                }),
                Turn::AssistantMessage { text } => Some(ChatMessage {
                    role: ChatRole::Assistant,
                    content: text.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn begin_open(&mut self, source: DocumentSource) -> Result<PendingExtraction> {
        validate::document_source(&source)?;
        let next = self.mode.apply(&ChatAction::Open)?;
        let ticket = self.sequencer.begin(RequestKind::Extract)?;
        self.mode = next;
        tracing::debug!(source = source.label(), "extraction issued");
        Ok(PendingExtraction { ticket, source })
    }

    pub fn complete_open(
        &mut self,
        pending: PendingExtraction,
        result: Result<ExtractedDocument>,
    ) -> Completion {
        if !self.sequencer.finish(pending.ticket) {
            return Completion::Stale;
        }
        let result = result.and_then(|doc| {
            if doc.text.trim().is_empty() {
                Err(Error::Backend(
                    "no text could be extracted from this document".to_string(),
                ))
            } else {
                Ok(doc)
            }
        });
        match result {
            Ok(doc) => {
                self.mode = ChatMode::Chat;
                let title = doc
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| pending.source.label().to_string());
                tracing::info!(%title, chars = doc.text.len(), "document ready");
                self.context = Some(DocumentContext {
                    text: doc.text,
                    title,
                });
                self.transcript.reset();
                self.persist();
                Completion::Committed
            }
            Err(err) => {
                self.mode = ChatMode::Failed(err.user_message());
                tracing::debug!(error = %err, "extraction failed");
                Completion::Failed(err)
            }
        }
    }

    pub fn begin_send(&mut self, message: &str) -> Result<PendingChat> {
        let text = validate::non_empty(message, "message")?;
        self.mode.apply(&ChatAction::Send)?;
        let context = match &self.context {
            Some(ctx) => ctx.text.clone(),
            None => {
                return Err(Error::InvalidTransition {
                    from: self.mode.to_string(),
                    action: ChatAction::Send.to_string(),
                })
            }
        };
        let ticket = self.sequencer.begin(RequestKind::Chat)?;
        self.transcript.append(Turn::user(text));
        tracing::debug!(turns = self.transcript.len(), "chat message issued");
        Ok(PendingChat {
            ticket,
            context,
            messages: self.dialogue(),
        })
    }

    pub fn complete_send(&mut self, pending: PendingChat, result: Result<String>) -> Completion {
        if !self.sequencer.finish(pending.ticket) {
            return Completion::Stale;
        }
        let completion = match result {
            Ok(answer) => {
                self.transcript.append(Turn::assistant(answer));
                Completion::Committed
            }
            Err(err) => {
                tracing::debug!(error = %err, "chat failed");
                self.transcript.append(Turn::error(err.user_message()));
                Completion::Failed(err)
            }
        };
        self.persist();
        completion
    }

    pub async fn open<B>(&mut self, backend: &B, source: DocumentSource) -> Result<Completion>
    where
        B: DocumentBackend + ?Sized,
    {
        let pending = self.begin_open(source)?;
        let result = backend.extract(&pending.source).await;
        Ok(self.complete_open(pending, result))
    }

    pub async fn ask<B>(&mut self, backend: &B, message: &str) -> Result<Completion>
    where
        B: DocumentBackend + ?Sized,
    {
        let pending = self.begin_send(message)?;
        let result = backend.chat(&pending.context, &pending.messages).await;
        Ok(self.complete_send(pending, result))
    }

    /// Leave the error screen for a fresh setup
    pub fn reset(&mut self) -> Result<()> {
        self.mode = self.mode.apply(&ChatAction::Reset)?;
        Ok(())
    }

    /// Abandon the current document and its conversation
    pub fn switch_document(&mut self) -> Result<()> {
        let action = match self.mode {
            ChatMode::Failed(_) => ChatAction::Reset,
            _ => ChatAction::Switch,
        };
        let next = self.mode.apply(&action)?;
        self.session.clear()?;
        self.mode = next;
        self.sequencer.invalidate();
        self.context = None;
        self.transcript.reset();
        tracing::info!("document context abandoned");
        Ok(())
    }

    /// Orphan any outstanding request so its completion is dropped
    pub fn teardown(&mut self) {
        self.sequencer.invalidate();
    }

    fn persist(&self) {
        let state = SessionState {
            transcript: self.transcript.clone(),
            context_text: self.context.as_ref().map(|c| c.text.clone()),
            context_title: self.context.as_ref().map(|c| c.title.clone()),
            filters: None,
        };
        if let Err(err) = self.session.save(&state) {
            tracing::warn!(error = %err, "failed to persist document chat");
        }
    }
}
