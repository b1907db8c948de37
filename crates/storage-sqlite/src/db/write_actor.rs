use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use log::error;
use std::any::Any;
use tokio::sync::{mpsc, oneshot};
use vaultfolio_core::errors::{Error, Result};

// A write job runs against the actor's connection and reports a core Result.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type BoxedAny = Box<dyn Any + Send + 'static>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job<BoxedAny>, oneshot::Sender<Result<BoxedAny>>)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an `IMMEDIATE` transaction. Returning an error from
    /// the job rolls the whole transaction back and hands the error to the
    /// caller unchanged.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as BoxedAny)),
                ret_tx,
            ))
            .await
            .map_err(|_| unavailable("the writer actor has stopped"))?;

        let boxed = ret_rx
            .await
            .map_err(|_| unavailable("the writer actor dropped the reply"))??;
        boxed
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| Error::Unexpected("writer actor returned an unexpected type".to_string()))
    }
}

fn unavailable(reason: &str) -> Error {
    StorageError::WriterUnavailable(reason.to_string()).into()
}

/// Spawns a background Tokio task that acts as the single writer to the database.
/// The actor owns one pooled connection and processes write jobs serially, so
/// every read-modify-write performed inside a job is serialized against all
/// other writes.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(Job<BoxedAny>, oneshot::Sender<Result<BoxedAny>>)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Writer actor could not acquire a connection: {}", e);
                // Dropping the receiver makes every pending and future exec fail.
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<BoxedAny> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Error::from);

            // The requester may have gone away; nothing to do then.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
