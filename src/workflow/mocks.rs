// Scripted client implementations for testing - no side effects

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::clients::errors::ClientError;
use crate::clients::naming::NamingService;
use crate::clients::store::{CollectionRecord, CollectionStore, CreateOutcome, OwnerId};
use crate::workflow::name::NormalizedName;

enum Script<T> {
    Ready(T),
    Gated(oneshot::Receiver<T>),
}

impl<T> Script<T> {
    async fn resolve(self) -> T {
        match self {
            Script::Ready(value) => value,
            Script::Gated(rx) => rx.await.expect("test dropped the gate sender"),
        }
    }
}

/// Naming service that replays queued responses in call order. Gated
/// responses let a test decide when (and in what order) calls resolve.
pub struct ScriptedNamingService {
    responses: Mutex<VecDeque<Script<Result<String, ClientError>>>>,
    calls: AtomicUsize,
}

impl ScriptedNamingService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push_ok(&self, name: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Script::Ready(Ok(name.to_string())));
    }

    pub fn push_err(&self, err: ClientError) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Script::Ready(Err(err)));
    }

    pub fn push_gated(&self) -> oneshot::Sender<Result<String, ClientError>> {
        let (tx, rx) = oneshot::channel();
        self.responses
            .lock()
            .unwrap()
            .push_back(Script::Gated(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I> NamingService<I> for ScriptedNamingService
where
    I: Send + Sync,
{
    async fn suggest_name(&self, _items: &[I]) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected suggest_name call");
        script.resolve().await
    }
}

/// Collection store that replays queued responses and records call order.
pub struct ScriptedStore {
    exists_responses: Mutex<VecDeque<Result<bool, ClientError>>>,
    create_responses: Mutex<VecDeque<Script<Result<CreateOutcome, ClientError>>>>,
    call_log: Mutex<Vec<&'static str>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            exists_responses: Mutex::new(VecDeque::new()),
            create_responses: Mutex::new(VecDeque::new()),
            call_log: Mutex::new(Vec::new()),
        }
    }

    pub fn push_exists(&self, response: Result<bool, ClientError>) {
        self.exists_responses.lock().unwrap().push_back(response);
    }

    pub fn push_create(&self, response: Result<CreateOutcome, ClientError>) {
        self.create_responses
            .lock()
            .unwrap()
            .push_back(Script::Ready(response));
    }

    pub fn push_create_gated(&self) -> oneshot::Sender<Result<CreateOutcome, ClientError>> {
        let (tx, rx) = oneshot::channel();
        self.create_responses
            .lock()
            .unwrap()
            .push_back(Script::Gated(rx));
        tx
    }

    pub fn call_log(&self) -> Vec<&'static str> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn exists_calls(&self) -> usize {
        self.call_log().iter().filter(|c| **c == "exists").count()
    }

    pub fn create_calls(&self) -> usize {
        self.call_log().iter().filter(|c| **c == "create").count()
    }
}

#[async_trait]
impl<I> CollectionStore<I> for ScriptedStore
where
    I: Send + Sync + 'static,
{
    async fn exists(&self, _owner: &OwnerId, _name: &NormalizedName) -> Result<bool, ClientError> {
        self.call_log.lock().unwrap().push("exists");
        self.exists_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected exists call")
    }

    async fn create_collection(
        &self,
        _owner: &OwnerId,
        _name: &NormalizedName,
        _items: &[I],
    ) -> Result<CreateOutcome, ClientError> {
        self.call_log.lock().unwrap().push("create");
        let script = self
            .create_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected create_collection call");
        script.resolve().await
    }

    async fn list_collections(
        &self,
        _owner: &OwnerId,
    ) -> Result<Vec<CollectionRecord<I>>, ClientError> {
        Ok(Vec::new())
    }
}
