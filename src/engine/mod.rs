//! Dashboard engine: tab registry, command queue and worker threads.
//!
//! A `Dashboard` is a cheap cloneable handle. The first registered tab
//! starts two threads, a render thread that owns the screen and executes
//! queued commands, and an input thread that polls the keyboard. A third
//! thread, the log writer, starts lazily with the first log entry.

pub mod command;
mod input;
pub(crate) mod render;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use std::{fmt, thread};

use tracing::{debug, warn};

use crate::log::fs::RealFs;
use crate::log::writer::{LogRecord, LogWriter};
use crate::tab::Tab;
use crate::term::console::{Console, ConsoleKeys};
use crate::term::{KeySource, Surface};

use command::Command;

/// Tunables for a dashboard engine.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Pause between frames once the queue has been drained.
    pub frame_interval: Duration,
    /// Directory receiving log files and startup archives.
    pub logs_dir: PathBuf,
    /// Smallest window height accepted before the engine grows it.
    pub min_height: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(100),
            logs_dir: PathBuf::from("Logs"),
            min_height: 10,
        }
    }
}

impl DashboardConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Errors from tab registration and switching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabError {
    EmptyName,
    DuplicateName(String),
    UnknownTab(String),
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::EmptyName => write!(f, "tab name must not be empty"),
            TabError::DuplicateName(name) => write!(f, "tab name already in use: {}", name),
            TabError::UnknownTab(name) => write!(f, "no tab named: {}", name),
        }
    }
}

impl std::error::Error for TabError {}

/// Receiving ends and thread handles, consumed as the engine starts.
pub(crate) struct Runtime {
    pub(crate) started: bool,
    pub(crate) rx: Option<Receiver<Command>>,
    pub(crate) surface: Option<Box<dyn Surface>>,
    pub(crate) keys: Option<Box<dyn KeySource>>,
    pub(crate) render: Option<JoinHandle<()>>,
    pub(crate) input: Option<JoinHandle<()>>,
    pub(crate) writer: Option<JoinHandle<()>>,
}

/// State shared by every handle clone and the worker threads.
pub(crate) struct Shared {
    pub(crate) config: DashboardConfig,
    pub(crate) tabs: Mutex<BTreeMap<String, Arc<dyn Tab>>>,
    pub(crate) tabs_ready: Condvar,
    pub(crate) active: Mutex<Option<String>>,
    stop: AtomicBool,
    stopping: Mutex<()>,
    log_sink: Mutex<Option<Sender<LogRecord>>>,
    detached: bool,
    pub(crate) runtime: Mutex<Runtime>,
}

impl Shared {
    pub(crate) fn active_tab(&self) -> Option<String> {
        self.active.lock().unwrap().clone()
    }

    pub(crate) fn set_active(&self, name: String) {
        *self.active.lock().unwrap() = Some(name);
    }

    pub(crate) fn tab(&self, name: &str) -> Option<Arc<dyn Tab>> {
        self.tabs.lock().unwrap().get(name).cloned()
    }

    pub(crate) fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        // Wake a render thread still parked on the first registration.
        self.tabs_ready.notify_all();
    }

    /// Hands a record to the writer thread, starting that thread on first
    /// use. Dashboards that never log never touch the disk.
    pub(crate) fn forward_record(&self, record: LogRecord) {
        self.start_writer_if_needed();
        if let Some(sink) = self.log_sink.lock().unwrap().as_ref() {
            let _ = sink.send(record);
        }
    }

    fn start_writer_if_needed(&self) {
        if self.detached {
            return;
        }
        let mut sink = self.log_sink.lock().unwrap();
        if sink.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let writer = LogWriter::new(RealFs::new(), self.config.logs_dir.clone());
        let handle = thread::spawn(move || writer.run(rx));
        *sink = Some(tx);
        self.runtime.lock().unwrap().writer = Some(handle);
        debug!("log writer thread started");
    }
}

/// Handle to a dashboard engine.
///
/// Clones share one engine. Any clone may register tabs, submit commands
/// or stop the engine; log and monitor tabs keep working from any thread.
#[derive(Clone)]
pub struct Dashboard {
    pub(crate) shared: Arc<Shared>,
    tx: Sender<Command>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// Engine drawing to the real terminal with default settings.
    pub fn new() -> Self {
        Self::with_config(DashboardConfig::default())
    }

    /// Engine drawing to the real terminal.
    pub fn with_config(config: DashboardConfig) -> Self {
        Self::build(
            config,
            Some((
                Box::new(Console::default()) as Box<dyn Surface>,
                Box::new(ConsoleKeys::new()) as Box<dyn KeySource>,
            )),
            false,
        )
    }

    /// Engine drawing to a caller-supplied surface and key source.
    pub fn with_backend(
        surface: Box<dyn Surface>,
        keys: Box<dyn KeySource>,
        config: DashboardConfig,
    ) -> Self {
        Self::build(config, Some((surface, keys)), false)
    }

    /// Engine that spawns no threads and never draws. Submitted commands
    /// stay in the queue until the caller drains them, which makes state
    /// changes step-by-step testable.
    pub fn detached() -> Self {
        Self::build(DashboardConfig::default(), None, true)
    }

    fn build(
        config: DashboardConfig,
        backend: Option<(Box<dyn Surface>, Box<dyn KeySource>)>,
        detached: bool,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let (surface, keys) = match backend {
            Some((surface, keys)) => (Some(surface), Some(keys)),
            None => (None, None),
        };
        let shared = Arc::new(Shared {
            config,
            tabs: Mutex::new(BTreeMap::new()),
            tabs_ready: Condvar::new(),
            active: Mutex::new(None),
            stop: AtomicBool::new(false),
            stopping: Mutex::new(()),
            log_sink: Mutex::new(None),
            detached,
            runtime: Mutex::new(Runtime {
                started: false,
                rx: Some(rx),
                surface,
                keys,
                render: None,
                input: None,
                writer: None,
            }),
        });
        Self { shared, tx }
    }

    /// Adds a tab to the registry. The first successful registration
    /// starts the engine threads and makes that tab active.
    ///
    /// Names must be non-empty and unique; a failed registration leaves
    /// the registry untouched.
    pub fn register(&self, tab: Arc<dyn Tab>) -> Result<(), TabError> {
        if tab.name().is_empty() {
            return Err(TabError::EmptyName);
        }
        {
            let mut tabs = self.shared.tabs.lock().unwrap();
            if tabs.contains_key(tab.name()) {
                return Err(TabError::DuplicateName(tab.name().to_string()));
            }
            tabs.insert(tab.name().to_string(), tab);
            self.shared.tabs_ready.notify_all();
        }
        self.start_threads();
        Ok(())
    }

    fn start_threads(&self) {
        if self.shared.detached {
            return;
        }
        let mut runtime = self.shared.runtime.lock().unwrap();
        if runtime.started {
            return;
        }
        runtime.started = true;

        let (Some(rx), Some(surface), Some(keys)) = (
            runtime.rx.take(),
            runtime.surface.take(),
            runtime.keys.take(),
        ) else {
            return;
        };

        let shared = Arc::clone(&self.shared);
        runtime.render = Some(thread::spawn(move || render::run(shared, rx, surface)));

        let shared = Arc::clone(&self.shared);
        let tx = self.tx.clone();
        runtime.input = Some(thread::spawn(move || input::run(shared, keys, tx)));
        debug!("engine threads started");
    }

    /// Queues a command for the render thread.
    ///
    /// Commands submitted from one thread execute in submission order.
    /// After `stop` the command is dropped.
    pub fn submit(&self, command: Command) {
        let _ = self.tx.send(command);
    }

    /// Queues a switch to the named tab. Unknown names are rejected here
    /// and nothing is queued.
    pub fn switch_to(&self, name: &str) -> Result<(), TabError> {
        if !self.shared.tabs.lock().unwrap().contains_key(name) {
            return Err(TabError::UnknownTab(name.to_string()));
        }
        self.submit(Command::Switch {
            target: name.to_string(),
        });
        Ok(())
    }

    /// False once stopping has begun.
    pub fn is_running(&self) -> bool {
        !self.shared.stopped()
    }

    /// Stops the engine and blocks until its threads have shut down. The
    /// render thread executes any commands still queued before it exits,
    /// and the writer flushes every queued log entry to disk. Safe to
    /// call twice.
    pub fn stop(&self) {
        // One stop at a time; a later caller blocks here and then finds
        // nothing left to join.
        let _stopping = self.shared.stopping.lock().unwrap();
        self.shared.request_stop();
        let render = self.shared.runtime.lock().unwrap().render.take();
        if let Some(handle) = render {
            if handle.join().is_err() {
                warn!("engine thread panicked");
            }
        }

        // The render thread is gone, so no further records can be queued;
        // dropping the sink lets the writer finish its queue and exit.
        *self.shared.log_sink.lock().unwrap() = None;

        // Taken after the render join: the final queue drain may have
        // started the writer.
        let (input, writer) = {
            let mut runtime = self.shared.runtime.lock().unwrap();
            (runtime.input.take(), runtime.writer.take())
        };
        for handle in [input, writer].into_iter().flatten() {
            if handle.join().is_err() {
                warn!("engine thread panicked");
            }
        }
    }
}
