//! Many-producer, single-consumer report channel

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::debug;

use crate::command::outcome::Report;

/// Create a connected sink/stream pair
pub fn channel() -> (ResultSink, ResultStream) {
    let (tx, rx) = mpsc::channel();
    let sink = ResultSink { tx: tx.clone() };
    let stream = ResultStream {
        rx,
        _keepalive: tx,
    };
    (sink, stream)
}

/// Producer side, cloned into every worker
#[derive(Clone, Debug)]
pub struct ResultSink {
    tx: Sender<Report>,
}

impl ResultSink {
    /// Append a report; never blocks
    pub fn push(&self, report: Report) {
        if self.tx.send(report).is_err() {
            debug!("Result stream dropped, discarding report");
        }
    }

    /// Push a `Notice` report
    pub fn notify(&self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Report::Notice {
            title: title.into(),
            message: message.into(),
        });
    }
}

/// Consumer side: reports in push order, never ends
///
/// The stream holds a sender of its own, so the channel stays open even when
/// every producer is gone and `recv` simply keeps waiting.
pub struct ResultStream {
    rx: Receiver<Report>,
    _keepalive: Sender<Report>,
}

impl ResultStream {
    /// Block until the next report arrives
    pub fn recv(&self) -> Report {
        match self.rx.recv() {
            Ok(report) => report,
            Err(_) => unreachable!("result stream owns a sender"),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Report> {
        match self.rx.recv_timeout(timeout) {
            Ok(report) => Some(report),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_recv(&self) -> Option<Report> {
        self.rx.try_recv().ok()
    }
}

impl Iterator for ResultStream {
    type Item = Report;

    fn next(&mut self) -> Option<Report> {
        Some(self.recv())
    }
}
