// ABOUTME: Test support utilities.
// ABOUTME: In-memory fake of the remote host plus a recording lock manager.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use skiff::deploy::{LockInfo, LockManager, Orchestrator, RemoteLock};
use skiff::project::{Layout, Project, ProjectName};
use skiff::remote::{RemoteError, RemoteExecutor, RemoteFileSystem};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Once};
use tokio::io::{AsyncWrite, AsyncWriteExt};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("skiff=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn demo() -> ProjectName {
    ProjectName::new("demo").unwrap()
}

pub fn demo_project() -> Project {
    Layout::default().project(&demo())
}

#[derive(Default)]
struct State {
    paths: BTreeSet<String>,
    listings: HashMap<String, Vec<String>>,
    lock_contents: HashMap<String, String>,
    stale: BTreeSet<String>,
    commands: Vec<String>,
    mkdirs: Vec<String>,
    failures: Vec<String>,
    responses: Vec<(String, String)>,
    broken_paths: BTreeSet<String>,
    uid: Option<String>,
}

/// A remote host held in memory.
///
/// Filesystem probes read a set of existing paths. Commands are recorded
/// and answered from canned responses; the lock protocol (`set -C`, `find`,
/// `rm -f`, `cat`) is interpreted so `RemoteLock` works against it.
#[derive(Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<State>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a path as existing.
    pub fn with_path(self, path: impl Into<String>) -> Self {
        self.state.lock().paths.insert(path.into());
        self
    }

    /// Mark a file inside the demo project's deploy directory as existing.
    pub fn with_deploy_file(self, file: &str) -> Self {
        let path = demo_project().deploy_path(file);
        self.with_path(path)
    }

    /// The demo project's deploy directory exists.
    pub fn with_demo(self) -> Self {
        self.with_path(demo_project().deploy_dir)
    }

    pub fn with_listing(self, dir: impl Into<String>, entries: &[&str]) -> Self {
        self.state.lock().listings.insert(
            dir.into(),
            entries.iter().map(|e| e.to_string()).collect(),
        );
        self
    }

    /// Lock file at `path` reports as older than any threshold.
    pub fn with_stale(self, path: impl Into<String>) -> Self {
        let path = path.into();
        {
            let mut state = self.state.lock();
            state.paths.insert(path.clone());
            state.stale.insert(path);
        }
        self
    }

    /// Any command containing `needle` exits with status 1.
    pub fn fail_on(self, needle: impl Into<String>) -> Self {
        self.state.lock().failures.push(needle.into());
        self
    }

    /// Any command containing `needle` prints `output`.
    pub fn respond(self, needle: impl Into<String>, output: impl Into<String>) -> Self {
        self.state
            .lock()
            .responses
            .push((needle.into(), output.into()));
        self
    }

    /// Filesystem probes on `path` fail.
    pub fn break_path(self, path: impl Into<String>) -> Self {
        self.state.lock().broken_paths.insert(path.into());
        self
    }

    pub fn uid(self, uid: &str) -> Self {
        self.state.lock().uid = Some(uid.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().commands.clone()
    }

    /// How many recorded commands contain `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.state
            .lock()
            .commands
            .iter()
            .filter(|c| c.contains(needle))
            .count()
    }

    pub fn mkdirs(&self) -> Vec<String> {
        self.state.lock().mkdirs.clone()
    }

    pub fn exists_now(&self, path: &str) -> bool {
        self.state.lock().paths.contains(path)
    }

    pub fn lock_contents(&self, path: &str) -> Option<String> {
        self.state.lock().lock_contents.get(path).cloned()
    }

    fn probe_error(path: &str) -> RemoteError {
        RemoteError::CommandFailed {
            command: format!("test -e {path}"),
            exit_code: 255,
            output: "connection reset".to_string(),
        }
    }

    fn respond_to(&self, command: &str) -> Result<String, RemoteError> {
        let mut state = self.state.lock();
        state.commands.push(command.to_string());

        if state.failures.iter().any(|n| command.contains(n.as_str())) {
            return Err(RemoteError::CommandFailed {
                command: command.to_string(),
                exit_code: 1,
                output: "simulated failure".to_string(),
            });
        }

        let quoted = quoted_words(command);
        if command.contains("set -C") {
            let (Some(path), Some(json)) = (quoted.last(), quoted.iter().rev().nth(1)) else {
                return Ok("busy\n".to_string());
            };
            if state.paths.contains(path) {
                return Ok("busy\n".to_string());
            }
            state.paths.insert(path.clone());
            state.lock_contents.insert(path.clone(), json.clone());
            return Ok("acquired\n".to_string());
        }
        if command.starts_with("find ") {
            let path = quoted.first().cloned().unwrap_or_default();
            return Ok(if state.stale.contains(&path) {
                format!("{path}\n")
            } else {
                String::new()
            });
        }
        if command.starts_with("rm -f ") {
            if let Some(path) = quoted.first() {
                state.paths.remove(path);
                state.stale.remove(path);
                state.lock_contents.remove(path);
            }
            return Ok(String::new());
        }
        if command.starts_with("cat ")
            && let Some(contents) = quoted.first().and_then(|p| state.lock_contents.get(p))
        {
            return Ok(format!("{contents}\n"));
        }
        if command == "id -u" {
            return Ok(format!("{}\n", state.uid.as_deref().unwrap_or("1000")));
        }

        Ok(state
            .responses
            .iter()
            .find(|(needle, _)| command.contains(needle.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }
}

/// Single-quoted words of a command, in order. Values in these tests never
/// contain quotes themselves.
fn quoted_words(command: &str) -> Vec<String> {
    command
        .split('\'')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl RemoteExecutor for FakeRemote {
    async fn run(&self, command: &str) -> Result<String, RemoteError> {
        self.respond_to(command)
    }

    async fn run_stream(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), RemoteError> {
        let out = self.respond_to(command)?;
        sink.write_all(out.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteFileSystem for FakeRemote {
    async fn exists(&self, path: &str) -> Result<bool, RemoteError> {
        let state = self.state.lock();
        if state.broken_paths.contains(path) {
            return Err(Self::probe_error(path));
        }
        Ok(state.paths.contains(path) || state.listings.contains_key(path))
    }

    async fn mkdir(&self, path: &str, _recursive: bool) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        if state.broken_paths.contains(path) {
            return Err(RemoteError::CommandFailed {
                command: format!("mkdir -p {path}"),
                exit_code: 1,
                output: "Permission denied".to_string(),
            });
        }
        state.mkdirs.push(path.to_string());
        state.paths.insert(path.to_string());
        Ok(())
    }

    async fn list(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        let state = self.state.lock();
        if state.broken_paths.contains(path) {
            return Err(Self::probe_error(path));
        }
        Ok(state.listings.get(path).cloned().unwrap_or_default())
    }
}

pub type FakeOrchestrator = Orchestrator<FakeRemote, FakeRemote, RemoteLock<FakeRemote>>;

/// Orchestrator whose executor, filesystem, and lock all use `fake`.
pub fn orchestrator(fake: &FakeRemote) -> FakeOrchestrator {
    Orchestrator::new(fake.clone(), fake.clone(), RemoteLock::new(fake.clone()))
}

/// Lock manager that counts calls instead of touching the remote host.
#[derive(Clone, Default)]
pub struct RecordingLock {
    inner: Arc<Mutex<LockCalls>>,
}

#[derive(Default)]
struct LockCalls {
    acquires: usize,
    releases: usize,
    busy: bool,
    fail_release: bool,
}

impl RecordingLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every acquire reports the lock as held elsewhere.
    pub fn busy(self) -> Self {
        self.inner.lock().busy = true;
        self
    }

    pub fn failing_release(self) -> Self {
        self.inner.lock().fail_release = true;
        self
    }

    pub fn acquires(&self) -> usize {
        self.inner.lock().acquires
    }

    pub fn releases(&self) -> usize {
        self.inner.lock().releases
    }
}

#[async_trait]
impl LockManager for RecordingLock {
    async fn acquire(&self, _project: &Project) -> Result<bool, RemoteError> {
        let mut calls = self.inner.lock();
        calls.acquires += 1;
        Ok(!calls.busy)
    }

    async fn release(&self, project: &Project) -> Result<(), RemoteError> {
        let mut calls = self.inner.lock();
        calls.releases += 1;
        if calls.fail_release {
            return Err(RemoteError::CommandFailed {
                command: format!("rm -f {}", project.lock_file),
                exit_code: 1,
                output: "Read-only file system".to_string(),
            });
        }
        Ok(())
    }

    async fn holder(&self, _project: &Project) -> Result<Option<LockInfo>, RemoteError> {
        Ok(None)
    }
}

/// Orchestrator over `fake` with a recording lock.
pub fn recording_orchestrator(
    fake: &FakeRemote,
    lock: &RecordingLock,
) -> Orchestrator<FakeRemote, FakeRemote, RecordingLock> {
    Orchestrator::new(fake.clone(), fake.clone(), lock.clone())
}
