//! Stub capabilities for unit tests.
//!
//! Each stub records the calls it receives so tests can assert on what the
//! component under test asked for.

use crate::audio::MediaDownloader;
use crate::error::{Result, VidsumError};
use crate::source::{PlatformEntry, PlatformSearch, VideoReference};
use crate::summarize::{GenerationRequest, TextGenerator};
use crate::transcription::SpeechToText;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Text generator returning a canned or echoed response.
pub struct StubGenerator {
    prefix: String,
    echo: bool,
    fail_on: Option<usize>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl StubGenerator {
    /// Respond with `prefix` followed by the user prompt.
    pub fn echo_with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            echo: true,
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always respond with `text`.
    pub fn fixed(text: &str) -> Self {
        Self {
            echo: false,
            ..Self::echo_with_prefix(text)
        }
    }

    /// Fail the `n`th call (1-based). The failing call is still recorded.
    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let call_no = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };

        if self.fail_on == Some(call_no) {
            return Err(VidsumError::OpenAI(format!("stub failure on call {call_no}")));
        }
        if self.echo {
            Ok(format!("{}{}", self.prefix, request.user_prompt))
        } else {
            Ok(self.prefix.clone())
        }
    }
}

/// Downloader writing a small fake file named `<id>.mp3`.
pub struct StubDownloader {
    delay: Option<Duration>,
    write_file: bool,
    fail: bool,
    calls: AtomicUsize,
}

impl StubDownloader {
    pub fn new() -> Self {
        Self {
            delay: None,
            write_file: true,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before "downloading", to hold concurrent callers in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report success without writing anything.
    pub fn writing_nothing(mut self) -> Self {
        self.write_file = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaDownloader for StubDownloader {
    async fn fetch_best_audio(&self, url: &str, destination_dir: &Path) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(VidsumError::ToolFailed("stub download failure".to_string()));
        }

        let reference = VideoReference::parse(url)?;
        let path = destination_dir.join(format!("{}.mp3", reference.id()));
        if self.write_file {
            std::fs::write(&path, b"stub audio")?;
        }
        Ok(path)
    }
}

/// Speech-to-text returning a fixed transcript.
pub struct StubSpeechToText {
    text: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(PathBuf, String, String)>>,
}

impl StubSpeechToText {
    pub fn returning(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// `(path, model, language)` per call.
    pub fn calls(&self) -> Vec<(PathBuf, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechToText for StubSpeechToText {
    async fn transcribe(&self, audio_path: &Path, model: &str, language: &str) -> Result<String> {
        self.calls.lock().unwrap().push((
            audio_path.to_path_buf(),
            model.to_string(),
            language.to_string(),
        ));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.text
            .clone()
            .ok_or_else(|| VidsumError::OpenAI("stub transcription failure".to_string()))
    }
}

/// A call received by [`StubSearch`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchCall {
    Search { query: String, limit: usize },
    Listing { url: String, limit: usize },
}

/// Platform search answering from scripted queues.
///
/// Searches and listings each pop their own queue; an exhausted queue
/// answers with no entries.
pub struct StubSearch {
    searches: Mutex<VecDeque<Result<Vec<PlatformEntry>>>>,
    listings: Mutex<VecDeque<Result<Vec<PlatformEntry>>>>,
    calls: Mutex<Vec<SearchCall>>,
}

impl StubSearch {
    pub fn new() -> Self {
        Self {
            searches: Mutex::new(VecDeque::new()),
            listings: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_search(self, result: Result<Vec<PlatformEntry>>) -> Self {
        self.searches.lock().unwrap().push_back(result);
        self
    }

    pub fn with_listing(self, result: Result<Vec<PlatformEntry>>) -> Self {
        self.listings.lock().unwrap().push_back(result);
        self
    }

    pub fn transport_error() -> VidsumError {
        VidsumError::ToolFailed("stub transport failure".to_string())
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformSearch for StubSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PlatformEntry>> {
        self.calls.lock().unwrap().push(SearchCall::Search {
            query: query.to_string(),
            limit,
        });
        self.searches.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }

    async fn list_channel_videos(&self, listing_url: &str, limit: usize) -> Result<Vec<PlatformEntry>> {
        self.calls.lock().unwrap().push(SearchCall::Listing {
            url: listing_url.to_string(),
            limit,
        });
        self.listings.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }
}
