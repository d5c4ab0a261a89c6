use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use cng::errors::{CngError, Result};
use cng::exec::{ProcessHandle, ProcessSupervisor};

/// A lifecycle call observed by [`RecordingSupervisor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorCall {
    Spawn { pgid: u32, command: Vec<String> },
    Kill { pgid: u32 },
}

/// A supervisor that:
/// - records spawns and kills in order
/// - hands out simulated handles with increasing pgids (starting at 1000)
/// - can be told to fail the next spawn
pub struct RecordingSupervisor {
    calls: Arc<Mutex<Vec<SupervisorCall>>>,
    next_pgid: u32,
    fail_next_spawn: bool,
}

impl RecordingSupervisor {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            next_pgid: 1000,
            fail_next_spawn: false,
        }
    }

    pub fn failing_first_spawn(mut self) -> Self {
        self.fail_next_spawn = true;
        self
    }

    /// Shared handle on the call log; stays valid after the supervisor is moved.
    pub fn calls(&self) -> Arc<Mutex<Vec<SupervisorCall>>> {
        Arc::clone(&self.calls)
    }
}

impl Default for RecordingSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSupervisor for RecordingSupervisor {
    fn spawn(&mut self, command: &[String]) -> Result<ProcessHandle> {
        if self.fail_next_spawn {
            self.fail_next_spawn = false;
            return Err(CngError::Spawn(format!("fake spawn failure: {command:?}")));
        }

        let pgid = self.next_pgid;
        self.next_pgid += 1;
        self.calls.lock().unwrap().push(SupervisorCall::Spawn {
            pgid,
            command: command.to_vec(),
        });
        Ok(ProcessHandle::simulated(pgid))
    }

    fn kill(
        &mut self,
        handle: ProcessHandle,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let calls = Arc::clone(&self.calls);
        Box::pin(async move {
            calls
                .lock()
                .unwrap()
                .push(SupervisorCall::Kill { pgid: handle.pgid() });
            Ok(())
        })
    }
}

/// Number of spawns recorded so far.
pub fn spawn_count(calls: &Arc<Mutex<Vec<SupervisorCall>>>) -> usize {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| matches!(c, SupervisorCall::Spawn { .. }))
        .count()
}
