//! [`CodeSandbox`] adapter backed by a Python subprocess.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};
use triad_application::{CodeOutcome, CodeSandbox, SandboxError, SandboxSession};
use triad_domain::ExecutionCapabilities;

/// Driver program run with `python -c`
const DRIVER: &str = include_str!("driver.py");

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum DriverRequest<'a> {
    Register {
        capabilities: &'a ExecutionCapabilities,
    },
    Execute {
        code: &'a str,
    },
}

#[derive(Debug, Deserialize)]
struct DriverResponse {
    ok: bool,
    #[serde(default)]
    output: String,
    error: Option<String>,
    final_answer: Option<String>,
    permission_denied: Option<String>,
}

#[derive(Debug)]
struct SandboxSettings {
    python: PathBuf,
    timeout: Duration,
    working_dir: Option<PathBuf>,
}

/// Factory for Python interpreter sessions
#[derive(Debug, Clone)]
pub struct PythonSandbox {
    settings: Arc<SandboxSettings>,
}

impl PythonSandbox {
    pub fn new(python: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            settings: Arc::new(SandboxSettings {
                python: python.into(),
                timeout,
                working_dir: None,
            }),
        }
    }

    /// Resolve the interpreter on PATH: `explicit` if given, else `python3`
    /// then `python`.
    pub fn discover(explicit: Option<&str>, timeout: Duration) -> Result<Self, SandboxError> {
        let found = match explicit {
            Some(name) => which::which(name),
            None => which::which("python3").or_else(|_| which::which("python")),
        };
        let python = found
            .map_err(|e| SandboxError::Unavailable(format!("Python interpreter not found: {e}")))?;
        debug!("Using Python interpreter {}", python.display());
        Ok(Self::new(python, timeout))
    }

    /// Run agent code with `dir` as the working directory
    pub fn with_working_dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            settings: Arc::new(SandboxSettings {
                python: self.settings.python.clone(),
                timeout: self.settings.timeout,
                working_dir: Some(dir.into()),
            }),
        }
    }
}

#[async_trait]
impl CodeSandbox for PythonSandbox {
    async fn start(&self) -> Result<Box<dyn SandboxSession>, SandboxError> {
        let interpreter = Interpreter::spawn(&self.settings)?;
        Ok(Box::new(PythonSession {
            settings: Arc::clone(&self.settings),
            interpreter: Some(interpreter),
            registered: false,
        }))
    }
}

/// A running driver process
struct Interpreter {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Interpreter {
    fn spawn(settings: &SandboxSettings) -> Result<Self, SandboxError> {
        let mut command = Command::new(&settings.python);
        command
            .arg("-u")
            .arg("-c")
            .arg(DRIVER)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &settings.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            SandboxError::Unavailable(format!(
                "Failed to start {}: {e}",
                settings.python.display()
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SandboxError::Unavailable("interpreter stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SandboxError::Unavailable("interpreter stdout not captured".into()))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    async fn request(
        &mut self,
        request: &DriverRequest<'_>,
        timeout: Duration,
    ) -> Result<DriverResponse, SandboxError> {
        let mut line =
            serde_json::to_string(request).map_err(|e| SandboxError::Protocol(e.to_string()))?;
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SandboxError::Crashed(e.to_string()))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| SandboxError::Crashed(e.to_string()))?;

        let mut reply = String::new();
        match tokio::time::timeout(timeout, self.stdout.read_line(&mut reply)).await {
            Err(_) => Err(SandboxError::Timeout(timeout)),
            Ok(Err(e)) => Err(SandboxError::Crashed(e.to_string())),
            Ok(Ok(0)) => Err(SandboxError::Crashed("interpreter exited".into())),
            Ok(Ok(_)) => {
                let response: DriverResponse = serde_json::from_str(&reply)
                    .map_err(|e| SandboxError::Protocol(format!("{e}: {}", reply.trim())))?;
                if response.ok {
                    Ok(response)
                } else {
                    Err(SandboxError::Protocol(response.error.unwrap_or_default()))
                }
            }
        }
    }

    async fn kill(mut self) {
        if let Err(e) = self.child.kill().await {
            debug!("Interpreter already gone: {}", e);
        }
    }
}

/// One stateful interpreter session
pub struct PythonSession {
    settings: Arc<SandboxSettings>,
    interpreter: Option<Interpreter>,
    registered: bool,
}

impl PythonSession {
    async fn send(&mut self, request: DriverRequest<'_>) -> Result<DriverResponse, SandboxError> {
        let Some(interpreter) = self.interpreter.as_mut() else {
            return Err(SandboxError::Crashed(
                "interpreter is not running; reset the session".into(),
            ));
        };

        let result = interpreter.request(&request, self.settings.timeout).await;
        if let Err(e) = &result
            && e.is_recoverable()
        {
            warn!("Python interpreter lost: {}", e);
            self.registered = false;
            if let Some(interpreter) = self.interpreter.take() {
                interpreter.kill().await;
            }
        }
        result
    }
}

#[async_trait]
impl SandboxSession for PythonSession {
    async fn register_capabilities(
        &mut self,
        capabilities: &ExecutionCapabilities,
    ) -> Result<(), SandboxError> {
        self.send(DriverRequest::Register { capabilities }).await?;
        self.registered = true;
        Ok(())
    }

    async fn reset(&mut self) -> Result<(), SandboxError> {
        if let Some(interpreter) = self.interpreter.take() {
            interpreter.kill().await;
        }
        self.registered = false;
        self.interpreter = Some(Interpreter::spawn(&self.settings)?);
        debug!("Python interpreter restarted");
        Ok(())
    }

    async fn execute(&mut self, code: &str) -> Result<CodeOutcome, SandboxError> {
        if !self.registered {
            return Err(SandboxError::Protocol(
                "capabilities must be registered before executing code".into(),
            ));
        }

        let response = self.send(DriverRequest::Execute { code }).await?;
        if let Some(message) = response.permission_denied {
            return Err(SandboxError::PermissionDenied(message));
        }
        Ok(CodeOutcome {
            output: response.output,
            error: response.error,
            final_answer: response.final_answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Start a registered session, or `None` when no interpreter is installed
    async fn session(timeout: Duration) -> Option<Box<dyn SandboxSession>> {
        let Ok(sandbox) = PythonSandbox::discover(None, timeout) else {
            eprintln!("python3 not found; skipping");
            return None;
        };
        let mut session = sandbox.start().await.unwrap();
        session
            .register_capabilities(&ExecutionCapabilities::read_only())
            .await
            .unwrap();
        Some(session)
    }

    #[tokio::test]
    async fn test_state_persists_between_blocks() {
        let Some(mut session) = session(Duration::from_secs(30)).await else {
            return;
        };

        let first = session.execute("total = 40\nprint('set')").await.unwrap();
        assert_eq!(first.output, "set\n");

        let second = session.execute("final_answer(total + 2)").await.unwrap();
        assert_eq!(second.final_answer.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_write_mode_is_permission_denied() {
        let Some(mut session) = session(Duration::from_secs(30)).await else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.csv");

        let err = session
            .execute(&format!("open({:?}, 'a')", target.display().to_string()))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SandboxError::PermissionDenied(
                "Only read mode ('r', 'rb', 'rt') is allowed, got 'a'".into()
            )
        );
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_read_mode_is_allowed() {
        let Some(mut session) = session(Duration::from_secs(30)).await else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fees.md");
        std::fs::write(&file, "fee = 0.25").unwrap();

        let outcome = session
            .execute(&format!(
                "with open({:?}, 'rb') as f:\n    print(f.read().decode())",
                file.display().to_string()
            ))
            .await
            .unwrap();

        assert_eq!(outcome.output, "fee = 0.25\n");
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_swallowed_violation_is_still_reported() {
        let Some(mut session) = session(Duration::from_secs(30)).await else {
            return;
        };

        let err = session
            .execute("try:\n    eval('1 + 1')\nexcept BaseException:\n    pass")
            .await
            .unwrap_err();

        assert!(err.is_permission_denied());
        assert!(err.to_string().contains("'eval' is not allowed"));
    }

    #[tokio::test]
    async fn test_runtime_error_is_an_outcome() {
        let Some(mut session) = session(Duration::from_secs(30)).await else {
            return;
        };

        let outcome = session.execute("print('before')\n1 / 0").await.unwrap();
        assert_eq!(outcome.output, "before\n");
        assert_eq!(
            outcome.error.as_deref(),
            Some("ZeroDivisionError: division by zero")
        );

        let outcome = session.execute("import subprocess").await.unwrap();
        assert!(outcome.error.unwrap().contains("not allowed"));
    }

    #[tokio::test]
    async fn test_timeout_then_reset_recovers() {
        let Some(mut session) = session(Duration::from_secs(1)).await else {
            return;
        };
        session.execute("kept = 1").await.unwrap();

        let err = session.execute("while True:\n    pass").await.unwrap_err();
        assert_eq!(err, SandboxError::Timeout(Duration::from_secs(1)));

        // dead until reset, then capabilities must be registered again
        assert!(matches!(
            session.execute("print(1)").await,
            Err(SandboxError::Protocol(_))
        ));
        session.reset().await.unwrap();
        session
            .register_capabilities(&ExecutionCapabilities::read_only())
            .await
            .unwrap();

        let outcome = session.execute("print('kept' in globals())").await.unwrap();
        assert_eq!(outcome.output, "False\n");
    }

    #[tokio::test]
    async fn test_open_modes_match_capability_checks() {
        let Some(mut session) = session(Duration::from_secs(30)).await else {
            return;
        };
        let caps = ExecutionCapabilities::read_only();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("payments.csv");
        std::fs::write(&file, "id,amount\n").unwrap();
        let path = file.display().to_string();

        for mode in ["r", "rb", "rt", "", "b", "w", "wb", "a", "x", "r+", "rb+"] {
            let result = session
                .execute(&format!("open({path:?}, {mode:?}).close()"))
                .await;
            match caps.check_open_mode(mode) {
                Ok(()) => assert!(result.unwrap().error.is_none(), "{mode}"),
                Err(violation) => assert_eq!(
                    result.unwrap_err(),
                    SandboxError::PermissionDenied(violation.to_string()),
                    "{mode}"
                ),
            }
        }
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "id,amount\n");
    }

    #[tokio::test]
    async fn test_operations_and_imports_match_capability_checks() {
        let Some(mut session) = session(Duration::from_secs(30)).await else {
            return;
        };
        let caps = ExecutionCapabilities::read_only();

        for op in ["exec", "eval", "compile", "print"] {
            let result = session.execute(&format!("{op}('1')")).await;
            match caps.check_operation(op) {
                Ok(()) => assert!(result.unwrap().error.is_none(), "{op}"),
                Err(violation) => assert_eq!(
                    result.unwrap_err(),
                    SandboxError::PermissionDenied(violation.to_string()),
                    "{op}"
                ),
            }
        }

        for module in ["math", "collections.abc", "json", "os.path", "subprocess", "socket"] {
            let outcome = session.execute(&format!("import {module}")).await.unwrap();
            let refused = outcome
                .error
                .is_some_and(|e| e.contains(&format!("Import of '{module}' is not allowed")));
            assert_eq!(refused, !caps.is_import_authorized(module), "{module}");
        }
    }

    #[tokio::test]
    async fn test_execute_requires_registration() {
        let Ok(sandbox) = PythonSandbox::discover(None, Duration::from_secs(5)) else {
            return;
        };
        let mut session = sandbox.start().await.unwrap();

        let err = session.execute("print(1)").await.unwrap_err();
        assert!(matches!(err, SandboxError::Protocol(_)));
    }

    #[test]
    fn test_discover_unknown_interpreter() {
        let err =
            PythonSandbox::discover(Some("definitely-not-a-python-xyz"), Duration::from_secs(1))
                .unwrap_err();
        assert!(matches!(err, SandboxError::Unavailable(_)));
    }
}
