//! Code-writing role agent
//!
//! Every role runs the same loop: the model answers with a fenced Python
//! block (preceded by a thought in chat mode), the block runs in a sandbox session, and the
//! observation goes back to the model until the code calls `final_answer`
//! or the step budget runs out.

use crate::ports::code_sandbox::{CodeSandbox, SandboxError, SandboxSession};
use crate::ports::model_invoker::ModelInvoker;
use crate::ports::role_agent::{AgentRunError, RoleAgent};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use triad_domain::core::string::{fenced_block, truncate};
use triad_domain::{AgentMode, AgentRole, ExecutionCapabilities, Message, RolePromptTemplate};

const CODE_TAGS: &[&str] = &["py", "python"];

/// Observations longer than this are cut before going back to the model
const MAX_OBSERVATION_LEN: usize = 20_000;

/// Role agent backed by a model and a code sandbox
pub struct CodeAgent {
    invoker: Arc<dyn ModelInvoker>,
    sandbox: Arc<dyn CodeSandbox>,
    capabilities: ExecutionCapabilities,
    mode: AgentMode,
    corpus_path: String,
    max_steps: usize,
    max_tokens: Option<u32>,
}

impl CodeAgent {
    pub fn new(
        invoker: Arc<dyn ModelInvoker>,
        sandbox: Arc<dyn CodeSandbox>,
        corpus_path: impl Into<String>,
    ) -> Self {
        Self {
            invoker,
            sandbox,
            capabilities: ExecutionCapabilities::default(),
            mode: AgentMode::default(),
            corpus_path: corpus_path.into(),
            max_steps: 10,
            max_tokens: Some(3000),
        }
    }

    pub fn with_capabilities(mut self, capabilities: ExecutionCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_mode(mut self, mode: AgentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn recover(&self, session: &mut Box<dyn SandboxSession>) -> Result<(), SandboxError> {
        session.reset().await?;
        session.register_capabilities(&self.capabilities).await
    }
}

#[async_trait]
impl RoleAgent for CodeAgent {
    async fn run(&self, role: AgentRole, request: &str) -> Result<String, AgentRunError> {
        let mut session = self.sandbox.start().await?;
        session.register_capabilities(&self.capabilities).await?;

        let mut messages = vec![
            Message::system(role.system_prompt(&self.corpus_path, &self.capabilities, self.mode)),
            Message::user(request),
        ];
        let mut last_reply = String::new();

        for step in 1..=self.max_steps {
            let reply = self.invoker.invoke(&messages, self.max_tokens).await?;
            messages.push(Message::assistant(reply.clone()));

            let Some(code) = fenced_block(&reply, CODE_TAGS) else {
                debug!("{} step {}: no code block in reply", role, step);
                messages.push(Message::user(RolePromptTemplate::missing_code(self.mode)));
                last_reply = reply;
                continue;
            };

            let feedback = match session.execute(code).await {
                Ok(outcome) => {
                    if let Some(answer) = outcome.final_answer {
                        debug!("{} finished after {} steps", role, step);
                        return Ok(answer);
                    }
                    outcome.observation()
                }
                Err(e) if e.is_recoverable() => {
                    warn!("{} sandbox failed at step {}: {}; resetting", role, step, e);
                    self.recover(&mut session).await?;
                    format!("Error:\n{e}\nThe interpreter was reset; earlier variables are gone.")
                }
                Err(e) => return Err(e.into()),
            };
            messages.push(Message::user(RolePromptTemplate::observation(&truncate(
                &feedback,
                MAX_OBSERVATION_LEN,
            ))));
            last_reply = reply;
        }

        warn!(
            "{} reached the step limit ({}) without a final answer",
            role, self.max_steps
        );
        Ok(last_reply)
    }
}
