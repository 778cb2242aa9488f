//! Resize worker client
//!
//! The worker is an opaque pair of channels: requests go out on one,
//! responses come back on the other in any order. A dispatcher task matches
//! each response to its waiting caller by `id`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot, watch};

use super::messages::{ImageFormat, ResizeRequest, WorkerMessage};
use crate::error::WorkerError;
use crate::logger;

/// Encoded image returned by the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedImage {
    pub buffer: Vec<u8>,
    pub format: ImageFormat,
}

/// Lifecycle of the worker as seen from the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerStatus {
    Starting,
    Ready,
    Failed(String),
    Disconnected,
}

type Reply = oneshot::Sender<Result<ResizedImage, WorkerError>>;

struct Inner {
    pending: HashMap<u64, Reply>,
    status: WorkerStatus,
}

struct Shared {
    inner: Mutex<Inner>,
    status_tx: watch::Sender<WorkerStatus>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to a terminal status and fail everything still waiting
    fn terminate(&self, status: WorkerStatus, err: &WorkerError) {
        let pending = {
            let mut inner = self.lock();
            inner.status = status.clone();
            self.status_tx.send_replace(status);
            std::mem::take(&mut inner.pending)
        };
        for (_, reply) in pending {
            let _ = reply.send(Err(err.clone()));
        }
    }
}

/// Handle for submitting resize jobs to the worker
pub struct ResizeClient {
    requests: mpsc::Sender<ResizeRequest>,
    shared: Arc<Shared>,
    next_id: AtomicU64,
}

impl ResizeClient {
    /// Wrap a worker's request and response channels.
    ///
    /// Spawns the response dispatcher, so it must be called inside a Tokio
    /// runtime.
    pub fn new(
        requests: mpsc::Sender<ResizeRequest>,
        responses: mpsc::Receiver<WorkerMessage>,
    ) -> Self {
        let (status_tx, _) = watch::channel(WorkerStatus::Starting);
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                pending: HashMap::new(),
                status: WorkerStatus::Starting,
            }),
            status_tx,
        });

        tokio::spawn(dispatch(responses, Arc::clone(&shared)));

        Self {
            requests,
            shared,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn status(&self) -> WorkerStatus {
        self.shared.lock().status.clone()
    }

    /// Wait until the worker reports `ready`
    pub async fn ready(&self) -> Result<(), WorkerError> {
        let mut rx = self.shared.status_tx.subscribe();
        let status = rx
            .wait_for(|s| *s != WorkerStatus::Starting)
            .await
            .map_err(|_| WorkerError::Disconnected)?
            .clone();

        match status {
            WorkerStatus::Ready => Ok(()),
            WorkerStatus::Failed(error) => Err(WorkerError::Init(error)),
            WorkerStatus::Starting | WorkerStatus::Disconnected => Err(WorkerError::Disconnected),
        }
    }

    /// Resize `input` to exactly `width`x`height` and encode it as `format`.
    ///
    /// Requests sent before the worker is ready are queued by the worker
    /// itself.
    pub async fn resize(
        &self,
        input: Vec<u8>,
        width: u32,
        height: u32,
        format: ImageFormat,
        quality: u8,
    ) -> Result<ResizedImage, WorkerError> {
        if width == 0 || height == 0 {
            return Err(WorkerError::InvalidDimensions { width, height });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        {
            let mut inner = self.shared.lock();
            match &inner.status {
                WorkerStatus::Failed(error) => return Err(WorkerError::Init(error.clone())),
                WorkerStatus::Disconnected => return Err(WorkerError::Disconnected),
                WorkerStatus::Starting | WorkerStatus::Ready => {}
            }
            inner.pending.insert(id, reply_tx);
        }

        let request = ResizeRequest {
            id,
            input_buffer: input,
            width,
            height,
            format,
            quality: quality.clamp(1, 100),
        };
        if self.requests.send(request).await.is_err() {
            self.shared.lock().pending.remove(&id);
            return Err(WorkerError::Disconnected);
        }

        reply_rx.await.unwrap_or(Err(WorkerError::Disconnected))
    }
}

/// Route worker messages to their callers until the worker goes away
async fn dispatch(mut responses: mpsc::Receiver<WorkerMessage>, shared: Arc<Shared>) {
    while let Some(message) = responses.recv().await {
        match message {
            WorkerMessage::Ready => {
                let mut inner = shared.lock();
                if inner.status == WorkerStatus::Starting {
                    inner.status = WorkerStatus::Ready;
                    shared.status_tx.send_replace(WorkerStatus::Ready);
                }
            }
            WorkerMessage::Result { id, buffer, format } => {
                complete(&shared, id, Ok(ResizedImage { buffer, format }));
            }
            WorkerMessage::Error { id, error } => {
                complete(&shared, id, Err(WorkerError::Resize(error)));
            }
            WorkerMessage::ErrorInit { error } => {
                logger::log_error(&format!("Resize worker failed to initialize: {error}"));
                shared.terminate(
                    WorkerStatus::Failed(error.clone()),
                    &WorkerError::Init(error),
                );
            }
        }
    }

    // An init failure stays the reported status after the worker goes away
    let failed = matches!(shared.lock().status, WorkerStatus::Failed(_));
    if !failed {
        shared.terminate(WorkerStatus::Disconnected, &WorkerError::Disconnected);
    }
}

fn complete(shared: &Shared, id: u64, result: Result<ResizedImage, WorkerError>) {
    let reply = shared.lock().pending.remove(&id);
    match reply {
        Some(reply) => {
            let _ = reply.send(result);
        }
        None => logger::log_warning(&format!("Resize worker answered unknown request {id}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type WorkerEnds = (mpsc::Receiver<ResizeRequest>, mpsc::Sender<WorkerMessage>);

    fn client() -> (ResizeClient, WorkerEnds) {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, resp_rx) = mpsc::channel(8);
        (ResizeClient::new(req_tx, resp_rx), (req_rx, resp_tx))
    }

    #[tokio::test]
    async fn test_ready() {
        let (client, (_req_rx, resp_tx)) = client();
        assert_eq!(client.status(), WorkerStatus::Starting);
        resp_tx.send(WorkerMessage::Ready).await.unwrap();
        client.ready().await.unwrap();
        assert_eq!(client.status(), WorkerStatus::Ready);
    }

    #[tokio::test]
    async fn test_out_of_order_results() {
        let (client, (mut req_rx, resp_tx)) = client();
        let client = Arc::new(client);

        // Echo worker that answers the second request first
        tokio::spawn(async move {
            let first = req_rx.recv().await.unwrap();
            let second = req_rx.recv().await.unwrap();
            for req in [second, first] {
                resp_tx
                    .send(WorkerMessage::Result {
                        id: req.id,
                        buffer: req.input_buffer,
                        format: req.format,
                    })
                    .await
                    .unwrap();
            }
        });

        let (a, b) = tokio::join!(
            client.resize(vec![1], 10, 10, ImageFormat::Png, 90),
            client.resize(vec![2], 20, 20, ImageFormat::Webp, 90),
        );
        assert_eq!(
            a.unwrap(),
            ResizedImage {
                buffer: vec![1],
                format: ImageFormat::Png
            }
        );
        assert_eq!(
            b.unwrap(),
            ResizedImage {
                buffer: vec![2],
                format: ImageFormat::Webp
            }
        );
    }

    #[tokio::test]
    async fn test_request_fields() {
        let (client, (mut req_rx, resp_tx)) = client();
        let worker = tokio::spawn(async move {
            let req = req_rx.recv().await.unwrap();
            resp_tx
                .send(WorkerMessage::Error {
                    id: req.id,
                    error: "unsupported image".to_string(),
                })
                .await
                .unwrap();
            req
        });

        let err = client
            .resize(vec![0xff], 300, 200, ImageFormat::Jpeg, 0)
            .await
            .unwrap_err();
        assert_eq!(err, WorkerError::Resize("unsupported image".to_string()));

        let req = worker.await.unwrap();
        assert_eq!((req.width, req.height), (300, 200));
        assert_eq!(req.quality, 1);
        assert_eq!(req.format, ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_init_failure_fails_pending_and_future() {
        let (client, (mut req_rx, resp_tx)) = client();
        let worker = tokio::spawn(async move {
            let _req = req_rx.recv().await.unwrap();
            resp_tx
                .send(WorkerMessage::ErrorInit {
                    error: "wasm fetch failed".to_string(),
                })
                .await
                .unwrap();
            // Keep the response channel open
            resp_tx
        });

        let expected = WorkerError::Init("wasm fetch failed".to_string());
        let pending = client.resize(vec![1], 1, 1, ImageFormat::Png, 50).await;
        assert_eq!(pending.unwrap_err(), expected);
        assert_eq!(client.ready().await.unwrap_err(), expected);
        assert_eq!(
            client
                .resize(vec![1], 1, 1, ImageFormat::Png, 50)
                .await
                .unwrap_err(),
            expected
        );
        drop(worker.await.unwrap());
    }

    #[tokio::test]
    async fn test_disconnect() {
        let (client, (req_rx, resp_tx)) = client();
        drop(resp_tx);
        drop(req_rx);
        assert_eq!(client.ready().await.unwrap_err(), WorkerError::Disconnected);
        assert_eq!(
            client
                .resize(vec![1], 1, 1, ImageFormat::Png, 50)
                .await
                .unwrap_err(),
            WorkerError::Disconnected
        );
    }

    #[tokio::test]
    async fn test_invalid_dimensions() {
        let (client, _worker) = client();
        assert_eq!(
            client
                .resize(vec![1], 0, 10, ImageFormat::Png, 50)
                .await
                .unwrap_err(),
            WorkerError::InvalidDimensions {
                width: 0,
                height: 10
            }
        );
    }
}
