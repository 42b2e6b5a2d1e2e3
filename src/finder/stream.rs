//! Result stream handed back to glob callers.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, TryStreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::{FsError, FsResult};

/// Unordered stream of matched absolute paths.
///
/// Many traversal tasks feed one unbounded channel; this is its single
/// consumer. The first error ends the stream, and a traversal that dies
/// without reporting one (a panic) ends it with `TaskFailed`. Dropping the
/// stream aborts the root traversal task, and with it every nested
/// directory task.
#[derive(Debug)]
pub struct GlobStream {
    receiver: mpsc::UnboundedReceiver<FsResult<PathBuf>>,
    task: JoinHandle<()>,
    finished: bool,
}

impl GlobStream {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<FsResult<PathBuf>>, task: JoinHandle<()>) -> Self {
        Self {
            receiver,
            task,
            finished: false,
        }
    }

    /// Stop the traversal; no further results are yielded.
    pub fn cancel(&mut self) {
        self.task.abort();
        self.finished = true;
        self.receiver.close();
    }

    /// Drain the stream and sort, for callers that need a stable order.
    pub async fn collect_sorted(self) -> FsResult<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = self.try_collect().await?;
        paths.sort();
        Ok(paths)
    }
}

impl Stream for GlobStream {
    type Item = FsResult<PathBuf>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(Err(err))) => {
                self.finished = true;
                self.task.abort();
                Poll::Ready(Some(Err(err)))
            }
            // every sender is gone; the root task decides how it ended
            Poll::Ready(None) => match Pin::new(&mut self.task).poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(joined) => {
                    self.finished = true;
                    match joined {
                        Err(join_err) if !join_err.is_cancelled() => {
                            Poll::Ready(Some(Err(FsError::TaskFailed(join_err.to_string()))))
                        }
                        _ => Poll::Ready(None),
                    }
                }
            },
            other => other,
        }
    }
}

impl Drop for GlobStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}
