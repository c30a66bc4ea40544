//! Sync service - runs each correspondence query on its own thread

use std::collections::HashSet;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use flume::{Receiver, RecvTimeoutError, Sender};
use log::{debug, error};

use super::adapter::SyncTex;
use super::request::{RequestId, SyncRequest, SyncResponse};
use super::worker::run_request;

/// Runs forward/reverse queries off the caller's thread.
///
/// Every query gets its own thread and tool process, so a hung tool never
/// delays any other query.
pub struct SyncTexService {
    synctex: SyncTex,
    response_tx: Sender<SyncResponse>,
    response_rx: Receiver<SyncResponse>,
    next_request_id: u64,
    pending: HashSet<RequestId>,
}

impl SyncTexService {
    #[must_use]
    pub fn new(synctex: SyncTex) -> Self {
        let (response_tx, response_rx) = flume::unbounded();
        Self {
            synctex,
            response_tx,
            response_rx,
            next_request_id: 1,
            pending: HashSet::new(),
        }
    }

    /// Queue a forward query (1-based line and column)
    pub fn forward(
        &mut self,
        source: PathBuf,
        line: u32,
        column: u32,
        pdf: PathBuf,
    ) -> RequestId {
        let id = self.next_id();
        debug!("Queue forward sync {id:?}: {source:?}:{line}:{column}");
        self.submit(SyncRequest::Forward {
            id,
            source,
            line,
            column,
            pdf,
        })
    }

    /// Queue a reverse query
    pub fn reverse(&mut self, pdf: PathBuf, page: u32, x: f64, y: f64) -> RequestId {
        let id = self.next_id();
        debug!("Queue reverse sync {id:?}: {pdf:?} page {page} ({x}, {y})");
        self.submit(SyncRequest::Reverse { id, pdf, page, x, y })
    }

    /// Collect every response that has already arrived
    pub fn poll_responses(&mut self) -> Vec<SyncResponse> {
        let mut responses = vec![];
        while let Ok(response) = self.response_rx.try_recv() {
            self.pending.remove(&response.id());
            responses.push(response);
        }
        responses
    }

    /// Block until one response arrives or `timeout` elapses
    pub fn wait_response(&mut self, timeout: Duration) -> Option<SyncResponse> {
        match self.response_rx.recv_timeout(timeout) {
            Ok(response) => {
                self.pending.remove(&response.id());
                Some(response)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    #[must_use]
    pub fn is_pending(&self, id: RequestId) -> bool {
        self.pending.contains(&id)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn submit(&mut self, request: SyncRequest) -> RequestId {
        let id = request.id();
        let synctex = self.synctex.clone();
        let tx = self.response_tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("synctex-{}", id.0))
            .spawn(move || {
                // The service may be gone by the time the tool answers
                let _ = tx.send(run_request(&synctex, request));
            });

        match spawned {
            Ok(_) => {
                self.pending.insert(id);
            }
            Err(e) => error!("Failed to spawn sync thread for {id:?}: {e}"),
        }
        id
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synctex::runner::{CommandRunner, MockCommandRunner, ToolOutput};
    use crate::synctex::types::RenderPosition;
    use std::sync::Arc;

    const WAIT: Duration = Duration::from_secs(5);

    fn service(runner: &Arc<MockCommandRunner>) -> SyncTexService {
        SyncTexService::new(SyncTex::with_runner("synctex", runner.clone()))
    }

    /// Holds every call whose source path is `stuck.tex` until released
    struct StuckRunner {
        release: Receiver<()>,
    }

    impl CommandRunner for StuckRunner {
        fn run(&self, _program: &str, args: &[String]) -> std::io::Result<ToolOutput> {
            if args.iter().any(|a| a.ends_with("stuck.tex")) {
                let _ = self.release.recv();
            }
            Ok(ToolOutput::success("Page:1\nx:1.0\ny:1.0\n"))
        }
    }

    #[test]
    fn forward_request_round_trips_through_worker() {
        let runner = Arc::new(MockCommandRunner::new());
        runner.push_output(ToolOutput::success("Page:2\nx:100.0\ny:200.0\n"));
        let mut service = service(&runner);

        let id = service.forward("doc.tex".into(), 10, 5, "doc.pdf".into());
        assert!(service.is_pending(id));

        match service.wait_response(WAIT) {
            Some(SyncResponse::Forward {
                id: got,
                position: Some(position),
            }) => {
                assert_eq!(got, id);
                assert_eq!(position, RenderPosition::new(2, 100.0, 200.0));
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert_eq!(service.pending_count(), 0);
    }

    #[test]
    fn launch_error_comes_back_as_failed() {
        let runner = Arc::new(MockCommandRunner::new());
        runner.push_launch_error(std::io::ErrorKind::NotFound);
        let mut service = service(&runner);

        let id = service.reverse("doc.pdf".into(), 1, 0.0, 0.0);
        match service.wait_response(WAIT) {
            Some(SyncResponse::Failed { id: got, .. }) => assert_eq!(got, id),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn concurrent_requests_get_distinct_ids() {
        let runner = Arc::new(MockCommandRunner::new());
        let mut service = service(&runner);

        let a = service.forward("a.tex".into(), 1, 1, "a.pdf".into());
        let b = service.forward("b.tex".into(), 1, 1, "b.pdf".into());
        assert_ne!(a, b);
        assert_eq!(service.pending_count(), 2);

        let mut seen = vec![];
        while seen.len() < 2 {
            let response = service.wait_response(WAIT).expect("worker response");
            seen.push(response.id());
        }
        assert!(seen.contains(&a) && seen.contains(&b));
        assert_eq!(runner.invocations().len(), 2);
    }

    #[test]
    fn hung_tool_does_not_delay_other_requests() {
        let (release_tx, release_rx) = flume::unbounded();
        let runner = Arc::new(StuckRunner {
            release: release_rx,
        });
        let mut service = SyncTexService::new(SyncTex::with_runner("synctex", runner));

        let stuck: Vec<_> = (0..4)
            .map(|_| service.forward("stuck.tex".into(), 1, 1, "doc.pdf".into()))
            .collect();
        let free = service.forward("free.tex".into(), 1, 1, "doc.pdf".into());

        let response = service.wait_response(WAIT).expect("free request answered");
        assert_eq!(response.id(), free);
        assert_eq!(service.pending_count(), 4);

        for _ in &stuck {
            release_tx.send(()).unwrap();
        }
        let mut rest: Vec<_> = (0..4)
            .map(|_| service.wait_response(WAIT).expect("released").id())
            .collect();
        rest.sort_by_key(|id| id.0);
        assert_eq!(rest, stuck);
    }
}
