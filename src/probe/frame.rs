// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Embedding contexts
//!
//! An embedding context is where the probe loads the target: a frame inside
//! a page of some other origin. The probe can only ask it one question after
//! the settle delay, "did anything render?", and the answer is either a
//! render signal or the reason none is available.
//!
//! `Sandbox` is the built-in embedder. Each of its frames navigates with the
//! crate's HTTP client, applies the framing rules a browser would, and parses
//! the HTML body with html5ever.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use super::config::SandboxConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, Response};
use crate::security::{same_origin, FramingDecision, FramingPolicy, HeaderSet, RefusalReason};

/// What a successful inspection saw
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSignal {
    /// Meaningful child nodes of the body (elements, comments, non-blank text)
    pub nodes: usize,
    /// Characters of visible text
    pub text_len: usize,
    /// Document title, if any
    pub title: Option<String>,
}

impl RenderSignal {
    /// Equivalent of a non-blank `body.innerHTML`
    pub fn has_content(&self) -> bool {
        self.nodes > 0
    }
}

/// Why no render signal could be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The context refused to expose its content
    Denied(String),
    /// Nothing rendered (yet)
    Empty,
}

/// Result of inspecting an embedding context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    Rendered(RenderSignal),
    Unavailable(Unavailable),
}

/// An isolated place to load a URL into and later inspect
#[async_trait]
pub trait EmbeddingContext: Send + Sync {
    /// Assign `url` to the context. Returns immediately; loading continues
    /// in the background.
    fn load(&self, url: &str);

    /// Best-effort load-complete signal. May never resolve.
    async fn load_event(&self);

    /// Read back what the context rendered. Never fails.
    fn inspect(&self) -> Inspection;
}

/// Something that hands out fresh embedding contexts, one per check
pub trait Embedder: Send + Sync {
    fn open_frame(&self) -> Box<dyn EmbeddingContext>;
}

/// Sandboxed embedder that renders frames without a browser
pub struct Sandbox {
    config: SandboxConfig,
    client: HttpClient,
    embedder: Url,
    frame_counter: AtomicU64,
}

impl Sandbox {
    /// Create a new sandbox
    pub fn new(config: SandboxConfig) -> Result<Self> {
        let embedder = config.embedder_url()?;
        let client = HttpClient::with_config(config.http_config())?;

        Ok(Self {
            config,
            client,
            embedder,
            frame_counter: AtomicU64::new(0),
        })
    }

    /// Create sandbox with default config
    pub fn launch() -> Result<Self> {
        Self::new(SandboxConfig::default())
    }

    /// Open a concrete sandbox frame
    pub fn new_frame(&self) -> SandboxFrame {
        let id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        SandboxFrame::new(
            format!("frame_{}", id),
            self.client.clone(),
            self.embedder.clone(),
        )
    }

    /// Get sandbox config
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Origin frames are embedded from
    pub fn embedder(&self) -> &Url {
        &self.embedder
    }
}

impl Embedder for Sandbox {
    fn open_frame(&self) -> Box<dyn EmbeddingContext> {
        Box::new(self.new_frame())
    }
}

/// Frame lifecycle as seen from the embedding page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameState {
    Blank,
    Loading { url: String },
    Loaded { url: Url, signal: RenderSignal },
    Refused { url: Url, reason: RefusalReason },
    Failed { url: String, error: String },
}

/// One frame of the sandbox
///
/// Dropping the frame aborts an in-flight navigation.
pub struct SandboxFrame {
    id: String,
    client: HttpClient,
    embedder: Url,
    state: Arc<RwLock<FrameState>>,
    loaded: Arc<watch::Sender<bool>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SandboxFrame {
    fn new(id: String, client: HttpClient, embedder: Url) -> Self {
        let (loaded, _) = watch::channel(false);
        Self {
            id,
            client,
            embedder,
            state: Arc::new(RwLock::new(FrameState::Blank)),
            loaded: Arc::new(loaded),
            task: Mutex::new(None),
        }
    }

    /// Get frame ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current frame state
    pub fn state(&self) -> FrameState {
        self.state.read().clone()
    }

    fn abort_navigation(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

#[async_trait]
impl EmbeddingContext for SandboxFrame {
    fn load(&self, url: &str) {
        self.abort_navigation();
        self.loaded.send_replace(false);
        *self.state.write() = FrameState::Loading {
            url: url.to_string(),
        };

        if let Ok(target) = Url::parse(url) {
            if same_origin(&target, &self.embedder) {
                warn!(
                    frame = %self.id,
                    url,
                    "Target is same-origin with the embedder; rendering does not prove cross-origin framing"
                );
            }
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(h) => h,
            Err(_) => {
                *self.state.write() = FrameState::Failed {
                    url: url.to_string(),
                    error: "no async runtime to navigate in".to_string(),
                };
                self.loaded.send_replace(true);
                return;
            }
        };

        let client = self.client.clone();
        let embedder = self.embedder.clone();
        let state = self.state.clone();
        let loaded = self.loaded.clone();
        let frame_id = self.id.clone();
        let url = url.to_string();

        let task = handle.spawn(async move {
            let result = navigate(&client, &embedder, &url).await;
            debug!(frame = %frame_id, state = ?result, "Frame navigation finished");
            *state.write() = result;
            loaded.send_replace(true);
        });
        *self.task.lock() = Some(task);
    }

    async fn load_event(&self) {
        let mut rx = self.loaded.subscribe();
        loop {
            let done = *rx.borrow_and_update();
            if done || rx.changed().await.is_err() {
                return;
            }
        }
    }

    fn inspect(&self) -> Inspection {
        match &*self.state.read() {
            FrameState::Loaded { signal, .. } if signal.has_content() => {
                Inspection::Rendered(signal.clone())
            }
            FrameState::Loaded { .. } | FrameState::Loading { .. } | FrameState::Blank => {
                Inspection::Unavailable(Unavailable::Empty)
            }
            FrameState::Refused { reason, .. } => {
                Inspection::Unavailable(Unavailable::Denied(reason.description()))
            }
            FrameState::Failed { error, .. } => {
                Inspection::Unavailable(Unavailable::Denied(error.clone()))
            }
        }
    }
}

impl Drop for SandboxFrame {
    fn drop(&mut self) {
        self.abort_navigation();
    }
}

/// Navigate a frame and decide what it ends up showing
async fn navigate(client: &HttpClient, embedder: &Url, url: &str) -> FrameState {
    let response = match client.get(url).await {
        Ok(r) => r,
        Err(e) => {
            debug!(url, timed_out = e.is_timeout(), error = %e, "Frame navigation failed");
            return FrameState::Failed {
                url: url.to_string(),
                error: e.to_string(),
            };
        }
    };
    debug!(
        url = %response.url,
        status = response.status_code(),
        redirected = response.redirected,
        elapsed_ms = response.response_time_ms,
        "Frame response"
    );

    let headers = HeaderSet::from_response(&response);
    if let FramingDecision::Refused(reason) =
        FramingPolicy::from_headers(&headers).decide(&response.url, embedder)
    {
        return FrameState::Refused {
            url: response.url,
            reason,
        };
    }

    match render(&response) {
        Ok(signal) => FrameState::Loaded {
            url: response.url,
            signal,
        },
        Err(e) => FrameState::Failed {
            url: response.url.to_string(),
            error: e.to_string(),
        },
    }
}

/// Build the render signal for a framed response
fn render(response: &Response) -> Result<RenderSignal> {
    let html = match response.content_type() {
        Some(_) => response.is_html(),
        None => sniffs_as_html(&response.body),
    };
    if html {
        return render_html(&response.text_lossy());
    }

    // Non-HTML documents are wrapped in a synthetic body by browsers
    let text_len = response
        .body
        .iter()
        .filter(|b| !b.is_ascii_whitespace())
        .count();
    Ok(RenderSignal {
        nodes: usize::from(text_len > 0),
        text_len,
        title: None,
    })
}

/// Untyped bodies are HTML when they open with a tag, comment or doctype
fn sniffs_as_html(body: &[u8]) -> bool {
    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    let mut rest = body.iter().skip_while(|b| b.is_ascii_whitespace());
    match (rest.next(), rest.next()) {
        (Some(&b'<'), Some(&next)) => next.is_ascii_alphabetic() || next == b'!',
        _ => false,
    }
}

/// Parse an HTML document and measure its body
pub fn render_html(html: &str) -> Result<RenderSignal> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| Error::frame(format!("HTML parsing failed: {}", e)))?;

    let mut signal = RenderSignal {
        title: find_element(&dom.document, "title")
            .map(|t| collect_text(&t).trim().to_string())
            .filter(|t| !t.is_empty()),
        ..Default::default()
    };

    // document.body is the body element, or the frameset in frameset documents
    let body = find_element(&dom.document, "body")
        .or_else(|| find_element(&dom.document, "frameset"));
    if let Some(body) = body {
        for child in body.children.borrow().iter() {
            match child.data {
                NodeData::Text { ref contents } => {
                    // innerHTML keeps non-ASCII spaces such as &nbsp;
                    if !is_ascii_blank(&contents.borrow()) {
                        signal.nodes += 1;
                    }
                }
                NodeData::Element { .. } | NodeData::Comment { .. } => signal.nodes += 1,
                _ => {}
            }
        }
        signal.text_len = collect_text(&body)
            .trim_matches(|c: char| c.is_ascii_whitespace())
            .chars()
            .count();
    }

    Ok(signal)
}

fn is_ascii_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_whitespace())
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if let NodeData::Element { ref name, .. } = child.data {
            if &*name.local == tag {
                return Some(child.clone());
            }
        }
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

fn collect_text(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text_into(handle, &mut out);
    out
}

fn collect_text_into(handle: &Handle, out: &mut String) {
    for child in handle.children.borrow().iter() {
        match child.data {
            NodeData::Text { ref contents } => out.push_str(&contents.borrow()),
            NodeData::Element { ref name, .. }
                if matches!(&*name.local, "script" | "style") => {}
            _ => collect_text_into(child, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html_page(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("Content-Type", "text/html; charset=utf-8")
            .set_body_string(body.to_string())
    }

    async fn loaded_frame(sandbox: &Sandbox, url: &str) -> SandboxFrame {
        let frame = sandbox.new_frame();
        frame.load(url);
        tokio::time::timeout(Duration::from_secs(10), frame.load_event())
            .await
            .expect("frame never finished loading");
        frame
    }

    #[test]
    fn test_render_html_body() {
        let signal = render_html(
            "<html><head><title> Bank </title></head><body><h1>Welcome</h1>\n<p>hi</p></body></html>",
        )
        .unwrap();

        assert!(signal.has_content());
        assert_eq!(signal.nodes, 2);
        assert_eq!(signal.title.as_deref(), Some("Bank"));
        assert!(signal.text_len >= "Welcomehi".len());
    }

    #[test]
    fn test_render_blank_body() {
        let signal =
            render_html("<html><head><title>x</title></head><body>   \n </body></html>").unwrap();
        assert!(!signal.has_content());
        assert_eq!(signal.text_len, 0);
    }

    #[test]
    fn test_render_script_only_body_counts() {
        let signal = render_html("<body><script>var a = 1;</script></body>").unwrap();
        assert!(signal.has_content());
        assert_eq!(signal.text_len, 0);
    }

    #[test]
    fn test_render_frameset() {
        let signal =
            render_html("<html><frameset><frame src=\"/a\"></frameset></html>").unwrap();
        assert!(signal.has_content());
    }

    #[test]
    fn test_render_nbsp_body_counts() {
        let signal = render_html("<html><body>&nbsp;</body></html>").unwrap();
        assert_eq!(signal.nodes, 1);
        assert!(signal.has_content());
    }

    #[test]
    fn test_sniffs_untyped_html() {
        assert!(sniffs_as_html(b"<!DOCTYPE html><html></html>"));
        assert!(sniffs_as_html(b"\n  <html><body></body></html>"));
        assert!(sniffs_as_html(b"\xEF\xBB\xBF<body>x</body>"));
        assert!(sniffs_as_html(b"<div>fragment</div>"));
        assert!(!sniffs_as_html(b"{\"ok\": true}"));
        assert!(!sniffs_as_html(b"plain words"));
        assert!(!sniffs_as_html(b"< not a tag"));
        assert!(!sniffs_as_html(b""));
    }

    #[tokio::test]
    async fn test_unloaded_frame_is_empty() {
        let sandbox = Sandbox::launch().unwrap();
        let frame = sandbox.new_frame();
        assert_eq!(frame.inspect(), Inspection::Unavailable(Unavailable::Empty));
        assert_eq!(frame.state(), FrameState::Blank);
    }

    #[tokio::test]
    async fn test_frame_renders_unprotected_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_page("<html><body><button>Transfer</button></body></html>"))
            .mount(&server)
            .await;

        let sandbox = Sandbox::launch().unwrap();
        let frame = loaded_frame(&sandbox, &server.uri()).await;

        match frame.inspect() {
            Inspection::Rendered(signal) => assert_eq!(signal.nodes, 1),
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_frame_refused_by_xfo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                html_page("<html><body>secret</body></html>")
                    .insert_header("X-Frame-Options", "DENY"),
            )
            .mount(&server)
            .await;

        let sandbox = Sandbox::launch().unwrap();
        let frame = loaded_frame(&sandbox, &server.uri()).await;

        assert!(matches!(
            frame.inspect(),
            Inspection::Unavailable(Unavailable::Denied(_))
        ));
        assert!(matches!(
            frame.state(),
            FrameState::Refused {
                reason: RefusalReason::XfoDeny,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_frame_ancestors_allows_embedder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                html_page("<html><body>partner widget</body></html>").insert_header(
                    "Content-Security-Policy",
                    "frame-ancestors https://kehys.invalid",
                ),
            )
            .mount(&server)
            .await;

        let sandbox = Sandbox::launch().unwrap();
        let frame = loaded_frame(&sandbox, &server.uri()).await;

        assert!(matches!(frame.inspect(), Inspection::Rendered(_)));
    }

    #[tokio::test]
    async fn test_empty_html_body_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(html_page("<html><body></body></html>"))
            .mount(&server)
            .await;

        let sandbox = Sandbox::launch().unwrap();
        let frame = loaded_frame(&sandbox, &server.uri()).await;

        assert_eq!(frame.inspect(), Inspection::Unavailable(Unavailable::Empty));
    }

    #[tokio::test]
    async fn test_untyped_blank_html_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(b"<html><body>   </body></html>".to_vec()),
            )
            .mount(&server)
            .await;

        let sandbox = Sandbox::launch().unwrap();
        let frame = loaded_frame(&sandbox, &server.uri()).await;

        assert_eq!(frame.inspect(), Inspection::Unavailable(Unavailable::Empty));
        assert!(matches!(frame.state(), FrameState::Loaded { .. }));
    }

    #[tokio::test]
    async fn test_untyped_text_renders() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"status: ok".to_vec()))
            .mount(&server)
            .await;

        let sandbox = Sandbox::launch().unwrap();
        let frame = loaded_frame(&sandbox, &server.uri()).await;

        assert!(matches!(frame.inspect(), Inspection::Rendered(_)));
    }

    #[tokio::test]
    async fn test_inspect_while_still_loading_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                html_page("<html><body>late</body></html>").set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let sandbox = Sandbox::launch().unwrap();
        let frame = sandbox.new_frame();
        frame.load(&server.uri());
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(frame.inspect(), Inspection::Unavailable(Unavailable::Empty));
        assert!(matches!(frame.state(), FrameState::Loading { .. }));
    }

    #[tokio::test]
    async fn test_navigation_error_is_denied() {
        let sandbox = Sandbox::launch().unwrap();
        let frame = loaded_frame(&sandbox, "not a url").await;

        assert!(matches!(
            frame.inspect(),
            Inspection::Unavailable(Unavailable::Denied(_))
        ));
        assert!(matches!(frame.state(), FrameState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_frames_are_independent() {
        let sandbox = Sandbox::launch().unwrap();
        let a = sandbox.open_frame();
        let b = sandbox.new_frame();
        a.load("not a url");
        assert_eq!(b.state(), FrameState::Blank);
        assert_ne!(b.id(), "frame_0");
    }
}
