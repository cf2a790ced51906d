//! Scripted generators for tests

use super::{GenerationRequest, Generator};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

enum Behavior {
    Reply(String),
    Fail(String),
    Sleep(Duration),
    SlowOn {
        needle: String,
        delay: Duration,
        reply: String,
    },
    Script(Mutex<Vec<Result<String>>>),
}

/// Generator with a fixed behavior that records every prompt it receives
pub struct ScriptedGenerator {
    behavior: Behavior,
    calls: AtomicUsize,
    prompts: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    fn with(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::with(Behavior::Reply(text.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with(Behavior::Fail(message.into()))
    }

    pub fn sleeping(delay: Duration) -> Self {
        Self::with(Behavior::Sleep(delay))
    }

    /// Sleeps on prompts containing `needle`, replies immediately otherwise
    pub fn slow_on(needle: impl Into<String>, delay: Duration, reply: impl Into<String>) -> Self {
        Self::with(Behavior::SlowOn {
            needle: needle.into(),
            delay,
            reply: reply.into(),
        })
    }

    /// Replies popped in order; errors once exhausted
    pub fn scripted(mut replies: Vec<Result<String>>) -> Self {
        replies.reverse();
        Self::with(Behavior::Script(Mutex::new(replies)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.clone());

        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(message) => Err(AppError::GenerationError {
                message: message.clone(),
            }),
            Behavior::Sleep(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("too late".to_string())
            }
            Behavior::SlowOn { needle, delay, reply } => {
                if request.prompt.contains(needle.as_str()) {
                    tokio::time::sleep(*delay).await;
                }
                Ok(reply.clone())
            }
            Behavior::Script(replies) => replies.lock().unwrap().pop().unwrap_or_else(|| {
                Err(AppError::GenerationError {
                    message: "script exhausted".to_string(),
                })
            }),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
