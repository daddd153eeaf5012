//! Scripted stand-in for the simulator's adaptation interface.
//!
//! The fake listens on an ephemeral TCP port and answers each request line
//! with the next scripted [`Reply`]. It keeps accepting connections until the
//! script is exhausted so reconnect behaviour can be observed.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};

const ACCEPT_DEADLINE: Duration = Duration::from_secs(2);
const IDLE_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// What the fake does with the next request it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    /// Writes the text followed by a newline.
    Line(String),
    /// Closes the connection without answering.
    Hangup,
    /// Never answers; waits for the client to give up.
    Silence,
}

impl Reply {
    pub(crate) fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }
}

#[derive(Default)]
struct Recording {
    requests: Vec<String>,
    connections: usize,
}

/// A fake simulator running on a background thread.
pub(crate) struct FakeSimulator {
    port: u16,
    recording: Arc<Mutex<Recording>>,
    result: Arc<Mutex<Option<Result<()>>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeSimulator {
    /// Spawns a fake that replays `script` in order across connections.
    pub(crate) fn spawn(script: Vec<Reply>) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake simulator")?;
        listener
            .set_nonblocking(true)
            .context("fake simulator nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let recording = Arc::new(Mutex::new(Recording::default()));
        let result: Arc<Mutex<Option<Result<()>>>> = Arc::new(Mutex::new(None));
        let recording_clone = Arc::clone(&recording);
        let result_clone = Arc::clone(&result);
        let handle = thread::spawn(move || {
            let outcome = serve(&listener, script.into(), &recording_clone);
            if let Ok(mut guard) = result_clone.lock() {
                *guard = Some(outcome);
            }
        });
        Ok(Self {
            port,
            recording,
            result,
            handle: Some(handle),
        })
    }

    pub(crate) const fn port(&self) -> u16 {
        self.port
    }

    /// Request lines received so far, without their terminators.
    pub(crate) fn requests(&self) -> Result<Vec<String>> {
        let guard = self
            .recording
            .lock()
            .map_err(|error| anyhow!("lock recording: {error}"))?;
        Ok(guard.requests.clone())
    }

    /// Number of connections accepted so far.
    pub(crate) fn connections(&self) -> Result<usize> {
        let guard = self
            .recording
            .lock()
            .map_err(|error| anyhow!("lock recording: {error}"))?;
        Ok(guard.connections)
    }

    /// Waits for the script to finish and reports any server-side failure.
    ///
    /// The client must have been dropped or closed first, otherwise the fake
    /// waits for its next request.
    pub(crate) fn finish(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake simulator thread panicked"))?;
        }
        let outcome = self
            .result
            .lock()
            .map_err(|error| anyhow!("lock fake simulator result: {error}"))?
            .take();
        match outcome {
            Some(result) => result.context("fake simulator failed"),
            None => Ok(()),
        }
    }
}

impl Drop for FakeSimulator {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(
    listener: &TcpListener,
    mut script: VecDeque<Reply>,
    recording: &Mutex<Recording>,
) -> Result<()> {
    while !script.is_empty() {
        let Some(stream) = accept_before_deadline(listener)? else {
            return Ok(());
        };
        recording
            .lock()
            .map_err(|error| anyhow!("lock recording: {error}"))?
            .connections += 1;
        serve_connection(stream, &mut script, recording)?;
    }
    Ok(())
}

fn accept_before_deadline(listener: &TcpListener) -> Result<Option<TcpStream>> {
    let deadline = Instant::now() + ACCEPT_DEADLINE;
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream
                    .set_nonblocking(false)
                    .context("accepted stream blocking")?;
                stream
                    .set_read_timeout(Some(IDLE_READ_TIMEOUT))
                    .context("accepted stream read timeout")?;
                return Ok(Some(stream));
            }
            Err(ref error)
                if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline =>
            {
                thread::sleep(Duration::from_millis(10));
            }
            // Nobody connected; the test did not need the rest of the script.
            Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(error) => return Err(error).context("accept connection"),
        }
    }
}

fn serve_connection(
    stream: TcpStream,
    script: &mut VecDeque<Reply>,
    recording: &Mutex<Recording>,
) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone().context("clone stream")?);
    let mut writer = stream;
    loop {
        let Some(request) = read_request(&mut reader)? else {
            return Ok(());
        };
        recording
            .lock()
            .map_err(|error| anyhow!("lock recording: {error}"))?
            .requests
            .push(request);
        match script.pop_front() {
            Some(Reply::Line(text)) => {
                writer.write_all(text.as_bytes()).context("write reply")?;
                writer.write_all(b"\n").context("write newline")?;
                writer.flush().context("flush reply")?;
            }
            Some(Reply::Silence) => {
                drain(&mut reader);
                return Ok(());
            }
            Some(Reply::Hangup) | None => return Ok(()),
        }
    }
}

/// Reads one request line; `None` once the client has gone away.
fn read_request(reader: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned())),
        Err(error) if is_disconnect(&error) => Ok(None),
        Err(error) => Err(error).context("read request"),
    }
}

/// Consumes input until the client closes its end or the idle timeout fires.
fn drain(reader: &mut impl BufRead) {
    let mut sink = String::new();
    while matches!(reader.read_line(&mut sink), Ok(count) if count > 0) {
        sink.clear();
    }
}

fn is_disconnect(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut
            | io::ErrorKind::WouldBlock
    )
}
