use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::base::{LlmMetadata, LlmProvider, LlmProviderError, StructuredRequest};

pub(crate) enum Scripted {
    Reply(Value),
    Fail(LlmProviderError),
}


/// Test provider that replays queued replies and counts calls.
/// Once the queue is drained it repeats `exhausted`, or fails permanently.
pub(crate) struct ScriptedProvider {
    script: Mutex<VecDeque<Scripted>>,
    exhausted: Option<Box<dyn Fn() -> Scripted + Send + Sync>>,
    calls: AtomicUsize,
    payloads: Mutex<Vec<String>>,
    generation: Mutex<Vec<(f64, u32)>>,
}

impl ScriptedProvider {
    pub(crate) fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            exhausted: None,
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
            generation: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn replying(value: Value) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            exhausted: Some(Box::new(move || Scripted::Reply(value.clone()))),
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
            generation: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn always_failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            exhausted: Some(Box::new(move || {
                Scripted::Fail(LlmProviderError::Status {
                    status,
                    message: "scripted failure".to_string(),
                })
            })),
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
            generation: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_payload(&self) -> Option<String> {
        self.payloads.lock().last().cloned()
    }

    /// Temperature and output token cap of the most recent request.
    pub(crate) fn last_generation(&self) -> Option<(f64, u32)> {
        self.generation.lock().last().copied()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<(Value, LlmMetadata), LlmProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().push(request.payload.clone());
        self.generation
            .lock()
            .push((request.temperature, request.max_output_tokens));

        let next = self.script.lock().pop_front();
        let step = match next {
            Some(step) => step,
            None => match &self.exhausted {
                Some(make) => make(),
                None => Scripted::Fail(LlmProviderError::Internal("script exhausted".to_string())),
            },
        };

        match step {
            Scripted::Reply(value) => Ok((
                value,
                LlmMetadata {
                    provider: "scripted".to_string(),
                    model: "scripted".to_string(),
                    ..Default::default()
                },
            )),
            Scripted::Fail(err) => Err(err),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
