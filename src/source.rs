use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::company::Company;
use crate::domain::DirError;

/// A read-only provider of the full company list.
pub trait RecordSource: Send {
    fn fetch(&self) -> Result<Vec<Company>, DirError>;
    fn describe(&self) -> String;
}

#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: &str) -> Self {
        let expanded = shellexpand::tilde(path).into_owned();
        Self {
            path: PathBuf::from(expanded),
        }
    }
}

impl RecordSource for FileSource {
    fn fetch(&self) -> Result<Vec<Company>, DirError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                DirError::LoadFailure(format!("{} not found", self.path.display()))
            }
            ErrorKind::PermissionDenied => {
                DirError::LoadFailure(format!("{} not readable", self.path.display()))
            }
            _ => DirError::LoadFailure(e.to_string()),
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug)]
pub struct HttpSource {
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl RecordSource for HttpSource {
    fn fetch(&self) -> Result<Vec<Company>, DirError> {
        let response = reqwest::blocking::get(&self.url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirError::LoadFailure(format!(
                "{} answered with {status}",
                self.url
            )));
        }
        Ok(response.json::<Vec<Company>>()?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub fn source_for(location: &str) -> Box<dyn RecordSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        Box::new(FileSource::new(location))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Pending,
    Loaded(Vec<Company>),
    Failed(String),
}

/// Runs one retrieval on a background thread. There is no retry and no way to
/// cancel it; the result is picked up with `poll`.
pub struct Loader {
    receiver: Option<Receiver<Result<Vec<Company>, DirError>>>,
}

impl Loader {
    pub fn spawn(source: Box<dyn RecordSource>) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let start_time = Instant::now();
            let name = source.describe();
            let result = source.fetch();
            match &result {
                Ok(companies) => info!(
                    "Loaded {} companies from {name} in {}ms",
                    companies.len(),
                    start_time.elapsed().as_millis()
                ),
                Err(e) => error!("Loading {name} failed: {e}"),
            }
            // The receiver is gone when the ui quit before loading finished
            let _ = sender.send(result);
        });
        Self {
            receiver: Some(receiver),
        }
    }

    /// Returns the terminal state once, `None` while still loading or after
    /// the result was handed out.
    pub fn poll(&mut self) -> Option<LoadState> {
        let receiver = self.receiver.as_ref()?;
        let state = match receiver.try_recv() {
            Ok(Ok(companies)) => {
                warn_duplicate_ids(&companies);
                LoadState::Loaded(companies)
            }
            Ok(Err(e)) => {
                debug!("Load failure: {e}");
                LoadState::Failed(e.to_string())
            }
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                LoadState::Failed("loader stopped without a result".to_string())
            }
        };
        self.receiver = None;
        Some(state)
    }
}

fn warn_duplicate_ids(companies: &[Company]) {
    let mut seen = HashSet::with_capacity(companies.len());
    for company in companies {
        if !seen.insert(&company.id) {
            warn!("Duplicate company id {}", company.id);
        }
    }
}
