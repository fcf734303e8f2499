// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Anti-framing header analysis
//!
//! - `headers`: the immutable header set a check works on
//! - `evaluator`: which protective headers are missing
//! - `framing`: how a browser enforces those headers on a frame load

mod evaluator;
mod framing;
mod headers;

pub use evaluator::{
    evaluate, HeaderEvaluation, ProtectionFinding, CSP_FRAME_ANCESTORS_LABEL, XFO_LABEL,
};
pub use framing::{same_origin, FrameAncestors, FramingDecision, FramingPolicy, RefusalReason};
pub use headers::HeaderSet;
