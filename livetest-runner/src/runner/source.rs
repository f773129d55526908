// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::DriverError,
    event::{DecodedLine, TestEvent, decode_line},
    time::{Timestamp, duration_between, replay_delay},
};
use camino::Utf8PathBuf;
use std::fmt;
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter},
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::debug;

/// Where to read events from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSpec {
    /// Standard input.
    Stdin,

    /// A file, typically a recording of an earlier `go test -json` invocation.
    File(Utf8PathBuf),
}

impl fmt::Display for InputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "standard input"),
            Self::File(path) => write!(f, "`{path}`"),
        }
    }
}

/// Counters reported once an [`EventSource`] has read all of its input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// The number of events decoded and handed off.
    pub events: usize,

    /// The number of non-blank lines that weren't events.
    pub raw_lines: usize,
}

/// Options for an [`EventSource`].
#[derive(Clone, Debug)]
pub struct EventSourceBuilder {
    /// If set, lines that aren't events are written to this file.
    pub raw_output: Option<Utf8PathBuf>,

    /// If set, events are paced to reproduce the original delay between them, multiplied by this
    /// rate.
    pub replay_rate: Option<f64>,

    /// The number of decoded events that may be queued before reading pauses.
    pub channel_capacity: usize,
}

impl EventSourceBuilder {
    /// Opens `input` and starts reading from it on a new task.
    pub async fn spawn(self, input: InputSpec) -> Result<EventSource, DriverError> {
        match &input {
            InputSpec::Stdin => {
                let reader = BufReader::new(tokio::io::stdin());
                self.spawn_reader(reader, input.to_string()).await
            }
            InputSpec::File(path) => {
                let file = File::open(path)
                    .await
                    .map_err(|error| DriverError::InputOpen {
                        path: path.clone(),
                        error,
                    })?;
                self.spawn_reader(BufReader::new(file), input.to_string())
                    .await
            }
        }
    }

    /// Starts reading from `reader` on a new task.
    ///
    /// `source_name` is used in error messages.
    pub async fn spawn_reader<R>(
        self,
        reader: R,
        source_name: String,
    ) -> Result<EventSource, DriverError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let raw_output = match self.raw_output {
            Some(path) => {
                let file = File::create(&path)
                    .await
                    .map_err(|error| DriverError::RawOutputCreate {
                        path: path.clone(),
                        error,
                    })?;
                Some(RawOutput {
                    path,
                    writer: BufWriter::new(file),
                })
            }
            None => None,
        };

        let (sender, receiver) = mpsc::channel(self.channel_capacity.max(1));
        let (cancel_sender, cancel_receiver) = oneshot::channel();
        let reader_task = ReaderTask {
            reader,
            source_name,
            sender,
            raw_output,
            replay_rate: self.replay_rate,
        };
        let handle = tokio::spawn(reader_task.run(cancel_receiver));

        Ok(EventSource {
            receiver,
            handle,
            cancel: Some(cancel_sender),
        })
    }
}

/// Decoded events, read on a background task.
///
/// Events are delivered in input order through a bounded channel. When the channel is full,
/// reading pauses until the consumer catches up.
#[derive(Debug)]
pub struct EventSource {
    receiver: mpsc::Receiver<TestEvent>,
    handle: JoinHandle<Result<SourceStats, DriverError>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl EventSource {
    /// Waits for the next event. Returns `None` once the input is exhausted or reading failed.
    pub async fn recv(&mut self) -> Option<TestEvent> {
        self.receiver.recv().await
    }

    /// Returns the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<TestEvent> {
        self.receiver.try_recv().ok()
    }

    /// Stops reading. Events already queued are discarded.
    ///
    /// Lines already written to the raw output file are flushed before the reader task ends.
    pub fn close(&mut self) {
        self.receiver.close();
        if let Some(cancel) = self.cancel.take() {
            // An error means the reader task is already done.
            let _ = cancel.send(());
        }
    }

    /// Waits for the reader task to finish, returning its counters or the error that stopped it.
    ///
    /// A source that was [closed](Self::close) reports the counters up to the point it stopped.
    pub async fn join(self) -> Result<SourceStats, DriverError> {
        drop(self.receiver);
        // Dropping the cancel sender doesn't stop the reader; only `close` does.
        let _cancel = self.cancel;
        match self.handle.await {
            Ok(result) => result,
            Err(error) if error.is_cancelled() => Ok(SourceStats::default()),
            Err(error) => std::panic::resume_unwind(error.into_panic()),
        }
    }
}

struct RawOutput {
    path: Utf8PathBuf,
    writer: BufWriter<File>,
}

impl RawOutput {
    async fn write_line(&mut self, line: &str) -> Result<(), DriverError> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|error| self.write_error(error))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|error| self.write_error(error))
    }

    async fn flush(&mut self) -> Result<(), DriverError> {
        self.writer
            .flush()
            .await
            .map_err(|error| self.write_error(error))
    }

    fn write_error(&self, error: std::io::Error) -> DriverError {
        DriverError::RawOutputWrite {
            path: self.path.clone(),
            error,
        }
    }
}

struct ReaderTask<R> {
    reader: R,
    source_name: String,
    sender: mpsc::Sender<TestEvent>,
    raw_output: Option<RawOutput>,
    replay_rate: Option<f64>,
}

impl<R: AsyncBufRead + Unpin> ReaderTask<R> {
    async fn run(
        mut self,
        mut cancel: oneshot::Receiver<()>,
    ) -> Result<SourceStats, DriverError> {
        let mut stats = SourceStats::default();

        let read_result = tokio::select! {
            result = self.read_events(&mut stats) => result,
            Ok(()) = &mut cancel => {
                debug!(source = %self.source_name, "input closed early");
                Ok(())
            }
        };

        // Flush even if reading failed or was cut short, so raw lines read so far aren't lost.
        if let Some(raw_output) = &mut self.raw_output {
            raw_output.flush().await?;
        }
        read_result?;

        debug!(
            source = %self.source_name,
            events = stats.events,
            raw_lines = stats.raw_lines,
            "finished reading input",
        );
        Ok(stats)
    }

    async fn read_events(&mut self, stats: &mut SourceStats) -> Result<(), DriverError> {
        let mut previous_time: Option<Timestamp> = None;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|error| DriverError::InputRead {
                    source_name: self.source_name.clone(),
                    error,
                })?;
            if read == 0 {
                break;
            }

            // Test output can contain arbitrary bytes; decode lossily rather than failing.
            let line = String::from_utf8_lossy(&buf);
            let event = match decode_line(&line) {
                DecodedLine::Event(event) => event,
                DecodedLine::Raw(raw) => {
                    self.handle_raw(raw, stats).await?;
                    continue;
                }
            };

            if let (Some(rate), Some(previous)) = (self.replay_rate, previous_time) {
                let delay = replay_delay(duration_between(previous, event.time), rate);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            previous_time = Some(event.time);

            stats.events += 1;
            if self.sender.send(event).await.is_err() {
                debug!("event receiver closed, stopping input");
                break;
            }
        }
        Ok(())
    }

    async fn handle_raw(&mut self, raw: String, stats: &mut SourceStats) -> Result<(), DriverError> {
        if raw.trim().is_empty() {
            return Ok(());
        }
        stats.raw_lines += 1;
        match &mut self.raw_output {
            Some(raw_output) => raw_output.write_line(&raw).await,
            None => {
                debug!(line = %raw, "skipping line that isn't an event");
                Ok(())
            }
        }
    }
}
