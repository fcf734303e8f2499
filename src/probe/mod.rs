// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Framing probe
//!
//! Loads the target into a fresh embedding context, waits for it to settle
//! and turns what it sees into a verdict.

mod config;
mod frame;
mod render;
mod verdict;

pub use config::{
    ProbeConfig, SandboxConfig, DEFAULT_EMBEDDER_ORIGIN, DEFAULT_MIN_SETTLE, DEFAULT_SETTLE_DELAY,
};
pub use frame::{
    render_html, Embedder, EmbeddingContext, FrameState, Inspection, RenderSignal, Sandbox,
    SandboxFrame, Unavailable,
};
pub use render::{classify, ProbeState, RenderProbe};
pub use verdict::{
    ProbeOutcome, Verdict, NO_MISSING_PROTECTIONS, REASON_REFUSED, REASON_RENDERED_PROTECTED,
    REASON_VULNERABLE,
};
