use super::{Action, Session, SessionError, Snapshot};
use crate::catalog::SongId;
use crate::playback::{LookupError, VideoLookup};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

type Query = Box<dyn FnOnce(&Session) + Send>;

enum Command {
    Dispatch {
        action: Action,
        reply: oneshot::Sender<Result<Snapshot, SessionError>>,
    },
    Query(Query),
}

/// Cloneable handle to a [`Session`] running on its own task.
///
/// Commands are processed one at a time in arrival order, so every reply
/// reflects a fully re-derived state.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    /// Move `session` onto a tokio task. Must be called inside a runtime.
    pub fn spawn(session: Session, lookup: Arc<dyn VideoLookup>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run(session, lookup, receiver));
        Self { sender }
    }

    pub async fn dispatch(&self, action: Action) -> Result<Snapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Command::Dispatch { action, reply })
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)?
    }

    /// Run `f` against the session on its task and return the result
    pub async fn query<R, F>(&self, f: F) -> Result<R, SessionError>
    where
        R: Send + 'static,
        F: FnOnce(&Session) -> R + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let query: Query = Box::new(move |session| {
            let _ = reply.send(f(session));
        });
        self.sender
            .send(Command::Query(query))
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    pub async fn snapshot(&self) -> Result<Snapshot, SessionError> {
        self.query(Session::snapshot).await
    }
}

async fn run(
    mut session: Session,
    lookup: Arc<dyn VideoLookup>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let (results_tx, mut results) = mpsc::unbounded_channel::<(SongId, Result<String, LookupError>)>();
    start_lookup(&mut session, &lookup, &results_tx);

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                match command {
                    Command::Dispatch { action, reply } => {
                        let outcome = session.dispatch(action).map(|()| session.snapshot());
                        let _ = reply.send(outcome);
                    }
                    Command::Query(query) => query(&session),
                }
            }
            Some((song_id, result)) = results.recv() => {
                // stale ids are filtered by the tracker
                let _ = session.dispatch(Action::LookupResolved { song_id, result });
            }
        }
        start_lookup(&mut session, &lookup, &results_tx);
    }

    info!("Session task stopped");
}

fn start_lookup(
    session: &mut Session,
    lookup: &Arc<dyn VideoLookup>,
    results: &mpsc::UnboundedSender<(SongId, Result<String, LookupError>)>,
) {
    let Some(request) = session.take_lookup_request() else {
        return;
    };
    debug!("Searching video for \"{}\"", request.query);
    let song_id = request.song_id;
    let search = lookup.search(request);
    let results = results.clone();
    tokio::spawn(async move {
        let result = search.await;
        let _ = results.send((song_id, result));
    });
}
