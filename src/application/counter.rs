// SPDX-License-Identifier: MPL-2.0
//! Single-owner counter service.
//!
//! The [`Counter`] implementation is moved into one task; every other party
//! talks to it through a cloneable [`CounterHandle`]. Increments coming from
//! concurrent capture tasks are therefore applied one at a time and none is
//! lost. The current value is published on a watch channel.

use crate::application::port::Counter;
use crate::error::CaptureError;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Capacity of the command queue.
const COMMAND_QUEUE: usize = 32;

type Reply<T> = oneshot::Sender<Result<T, CaptureError>>;

#[derive(Debug)]
enum CounterCommand {
    Increment(Reply<u64>),
    Reset(Reply<()>),
}

/// Task owning the counter.
pub struct CounterService {
    counter: Box<dyn Counter>,
    commands: mpsc::Receiver<CounterCommand>,
    value_tx: watch::Sender<u64>,
}

impl CounterService {
    /// Moves `counter` into a task on `runtime` and returns a handle to it.
    ///
    /// The task ends when every handle has been dropped.
    pub fn spawn(counter: Box<dyn Counter>, runtime: &Handle) -> (CounterHandle, JoinHandle<()>) {
        let (tx, commands) = mpsc::channel(COMMAND_QUEUE);
        let (value_tx, value_rx) = watch::channel(counter.value());
        let service = Self {
            counter,
            commands,
            value_tx,
        };
        let task = runtime.spawn(service.run());
        (CounterHandle { tx, value_rx }, task)
    }

    async fn run(self) {
        let Self {
            mut counter,
            mut commands,
            value_tx,
        } = self;
        while let Some(command) = commands.recv().await {
            // `apply` gives the counter back unless its storage call panicked.
            match command {
                CounterCommand::Increment(reply) => {
                    let Some((recovered, result)) =
                        apply(counter, "increment", |c| c.increment()).await
                    else {
                        return;
                    };
                    counter = recovered;
                    value_tx.send_replace(counter.value());
                    let _ = reply.send(result);
                }
                CounterCommand::Reset(reply) => {
                    let Some((recovered, result)) = apply(counter, "reset", |c| c.reset()).await
                    else {
                        return;
                    };
                    counter = recovered;
                    value_tx.send_replace(counter.value());
                    let _ = reply.send(result);
                }
            }
        }
        tracing::debug!(value = counter.value(), "counter service stopped");
    }
}

/// Runs one storage operation on the blocking pool and hands the counter back.
async fn apply<T, F>(
    mut counter: Box<dyn Counter>,
    action: &'static str,
    op: F,
) -> Option<(Box<dyn Counter>, Result<T, CaptureError>)>
where
    T: Send + 'static,
    F: FnOnce(&mut dyn Counter) -> Result<T, CaptureError> + Send + 'static,
{
    let joined = tokio::task::spawn_blocking(move || {
        let result = op(counter.as_mut());
        (counter, result)
    })
    .await;
    match joined {
        Ok((counter, result)) => {
            if let Err(e) = &result {
                tracing::error!(error = %e, action, "counter update failed");
            }
            Some((counter, result))
        }
        Err(e) => {
            tracing::error!(error = %e, action, "counter task failed, service stopped");
            None
        }
    }
}

/// Cloneable access to a running [`CounterService`].
#[derive(Debug, Clone)]
pub struct CounterHandle {
    tx: mpsc::Sender<CounterCommand>,
    value_rx: watch::Receiver<u64>,
}

impl CounterHandle {
    /// Adds one capture and returns the new total.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Counter`] if the value could not be stored or the
    /// service has stopped.
    pub async fn increment(&self) -> Result<u64, CaptureError> {
        let (reply, rx) = oneshot::channel();
        self.send(CounterCommand::Increment(reply)).await?;
        rx.await.map_err(|_| stopped())?
    }

    /// Sets the total back to zero.
    ///
    /// # Errors
    ///
    /// Same as [`increment`](Self::increment).
    pub async fn reset(&self) -> Result<(), CaptureError> {
        let (reply, rx) = oneshot::channel();
        self.send(CounterCommand::Reset(reply)).await?;
        rx.await.map_err(|_| stopped())?
    }

    /// Last published total.
    #[must_use]
    pub fn value(&self) -> u64 {
        *self.value_rx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.value_rx.clone()
    }

    async fn send(&self, command: CounterCommand) -> Result<(), CaptureError> {
        self.tx.send(command).await.map_err(|_| stopped())
    }
}

fn stopped() -> CaptureError {
    CaptureError::Counter("counter service stopped".to_string())
}
