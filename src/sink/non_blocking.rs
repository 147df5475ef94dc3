// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::RecvError;
use crossbeam_channel::SendTimeoutError;
use crossbeam_channel::Sender;
use crossbeam_channel::TryRecvError;
use crossbeam_channel::TrySendError;
use crossbeam_channel::bounded;
use crossbeam_channel::unbounded;

use crate::SinkError;
use crate::sink::Sink;

#[derive(Debug)]
enum Message {
    Line(String),
    Shutdown,
}

/// A sink wrapper that offloads writes to a dedicated worker thread.
///
/// Intended for slow sinks, principally [`WebhookSink`](crate::sink::WebhookSink),
/// so that a dispatch is not blocked on network latency. Enqueueing counts as
/// write success; a failure inside the worker is reported through the `log`
/// facade. Ordering across concurrent dispatches to the same sink is not
/// guaranteed beyond queue order.
#[derive(Debug, Clone)]
pub struct NonBlocking {
    sender: Sender<Message>,
}

impl Sink for NonBlocking {
    fn write(&self, formatted: &str) -> Result<(), SinkError> {
        match self.sender.try_send(Message::Line(formatted.to_string())) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                log::warn!("dropping log line: worker queue is full");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(SinkError::Io(io::Error::other(
                "logging worker has shut down",
            ))),
        }
    }
}

/// A guard that flushes lines buffered by a [`NonBlocking`] sink on drop.
///
/// Assign the guard in the entrypoint of the program so that it is dropped
/// during unwinding or when `main` exits, ensuring buffered lines reach the
/// inner sink.
#[derive(Debug)]
pub struct WorkerGuard {
    _guard: Option<JoinHandle<()>>,
    sender: Sender<Message>,
    shutdown: Sender<()>,
    shutdown_timeout: Duration,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        let shutdown_timeout = self.shutdown_timeout;
        match self
            .sender
            .send_timeout(Message::Shutdown, shutdown_timeout)
        {
            Ok(()) => {
                // Wait for the worker to drain and flush. The worker ends by
                // calling `recv()` on this zero-capacity channel, so the send
                // acts as a rendezvous. Bounded so that drop cannot hang.
                let _ = self.shutdown.send_timeout((), shutdown_timeout);
            }
            Err(SendTimeoutError::Disconnected(_)) => (),
            Err(SendTimeoutError::Timeout(_)) => {
                log::warn!("failed to send shutdown signal to logging worker");
            }
        }
    }
}

/// A builder for configuring a [`NonBlocking`] sink wrapper.
#[derive(Debug)]
pub struct NonBlockingBuilder {
    thread_name: String,
    buffered_lines_limit: Option<usize>,
    shutdown_timeout: Duration,
    sink: Box<dyn Sink>,
}

impl NonBlockingBuilder {
    pub fn new(thread_name: impl Into<String>, sink: impl Sink) -> NonBlockingBuilder {
        NonBlockingBuilder {
            thread_name: thread_name.into(),
            buffered_lines_limit: None,
            shutdown_timeout: Duration::from_millis(100),
            sink: Box::new(sink),
        }
    }

    /// Sets the buffer size of pending lines. Unbounded by default; when
    /// bounded and full, new lines are dropped rather than blocking.
    pub fn buffered_lines_limit(mut self, buffered_lines_limit: Option<usize>) -> Self {
        self.buffered_lines_limit = buffered_lines_limit;
        self
    }

    /// Sets how long dropping the guard waits for the worker to drain.
    pub fn shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    /// Completes the builder, returning the sink wrapper and its guard.
    pub fn build(self) -> (NonBlocking, WorkerGuard) {
        let (sender, receiver) = match self.buffered_lines_limit {
            Some(cap) => bounded(cap),
            None => unbounded(),
        };
        let (shutdown_sender, shutdown_receiver) = bounded(0);

        let worker = Worker {
            sink: self.sink,
            receiver,
            shutdown: shutdown_receiver,
        };
        let guard = WorkerGuard {
            _guard: Some(worker.make_thread(self.thread_name)),
            sender: sender.clone(),
            shutdown: shutdown_sender,
            shutdown_timeout: self.shutdown_timeout,
        };
        (NonBlocking { sender }, guard)
    }
}

struct Worker {
    sink: Box<dyn Sink>,
    receiver: Receiver<Message>,
    shutdown: Receiver<()>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum WorkerState {
    Empty,
    Disconnected,
    Continue,
    Shutdown,
}

impl Worker {
    fn handle(&self, line: &str) {
        if let Err(err) = self.sink.write(line) {
            log::warn!("failed to write log line from worker: {err}");
        }
    }

    fn recv(&self) -> WorkerState {
        match self.receiver.recv() {
            Ok(Message::Line(line)) => {
                self.handle(&line);
                WorkerState::Continue
            }
            Ok(Message::Shutdown) => WorkerState::Shutdown,
            Err(RecvError) => WorkerState::Disconnected,
        }
    }

    fn try_recv(&self) -> WorkerState {
        match self.receiver.try_recv() {
            Ok(Message::Line(line)) => {
                self.handle(&line);
                WorkerState::Continue
            }
            Ok(Message::Shutdown) => WorkerState::Shutdown,
            Err(TryRecvError::Empty) => WorkerState::Empty,
            Err(TryRecvError::Disconnected) => WorkerState::Disconnected,
        }
    }

    fn work(&self) -> WorkerState {
        let mut worker_state = self.recv();
        while worker_state == WorkerState::Continue {
            worker_state = self.try_recv();
        }
        self.sink.flush();
        worker_state
    }

    fn make_thread(self, name: String) -> JoinHandle<()> {
        std::thread::Builder::new()
            .name(name)
            .spawn(move || {
                loop {
                    match self.work() {
                        WorkerState::Continue | WorkerState::Empty => {}
                        WorkerState::Shutdown | WorkerState::Disconnected => {
                            let _ = self.shutdown.recv();
                            break;
                        }
                    }
                }
                self.sink.flush();
            })
            .expect("failed to spawn the non-blocking sink worker thread")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, Default)]
    struct MemorySink {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl Sink for MemorySink {
        fn write(&self, formatted: &str) -> Result<(), SinkError> {
            self.lines.lock().unwrap().push(formatted.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_lines_reach_inner_sink_before_guard_drops() {
        let inner = MemorySink::default();
        let lines = inner.lines.clone();
        let (sink, guard) = NonBlockingBuilder::new("test-worker", inner)
            .shutdown_timeout(Duration::from_secs(1))
            .build();

        sink.write("one").unwrap();
        sink.write("two").unwrap();
        drop(guard);

        assert_eq!(lines.lock().unwrap().as_slice(), ["one", "two"]);
    }
}
