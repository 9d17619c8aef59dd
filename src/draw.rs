//! Immediate-mode drawing seam.
//!
//! Hosts implement [`DrawContext`] over whatever surface they own (a
//! terminal canvas, a raster buffer, a recorder for tests). Coordinates
//! passed to `stroke_line` are world units; the context owns the
//! world-to-device transform.

use crate::error::{GridError, Result};
use glam::DVec2;
use serde::Deserialize;
use std::ops::{Deref, DerefMut};

/// Stroke state and line primitive required by the grid renderer
pub trait DrawContext {
    fn set_line_width(&mut self, width: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    fn global_alpha(&self) -> f64;
    fn set_stroke_style(&mut self, style: &str);
    fn stroke_line(&mut self, from: DVec2, to: DVec2) -> Result<()>;
}

/// Style overrides for an immediate-mode draw
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DrawOptions {
    pub stroke_style: String,
    /// Base opacity multiplied into every level's alpha
    pub opacity: f64,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            stroke_style: "blue".to_string(),
            opacity: 0.1,
        }
    }
}

/// Restores the context's global alpha to 1.0 when dropped
pub struct AlphaGuard<'a, C: DrawContext + ?Sized> {
    context: &'a mut C,
}

impl<'a, C: DrawContext + ?Sized> AlphaGuard<'a, C> {
    pub fn new(context: &'a mut C) -> Self {
        Self { context }
    }
}

impl<C: DrawContext + ?Sized> Deref for AlphaGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.context
    }
}

impl<C: DrawContext + ?Sized> DerefMut for AlphaGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.context
    }
}

impl<C: DrawContext + ?Sized> Drop for AlphaGuard<'_, C> {
    fn drop(&mut self) {
        self.context.set_global_alpha(1.0);
    }
}

/// A single recorded context operation
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    LineWidth(f64),
    GlobalAlpha(f64),
    StrokeStyle(String),
    Line { from: DVec2, to: DVec2, alpha: f64 },
}

/// Context that records every call, for tests and benchmarks.
/// With `fail_after` set, the stroke after that many lines returns an error.
#[derive(Debug)]
pub struct RecordingContext {
    pub calls: Vec<DrawCall>,
    pub fail_after: Option<usize>,
    alpha: f64,
    lines: usize,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            fail_after: None,
            alpha: 1.0,
            lines: 0,
        }
    }
}

impl RecordingContext {
    pub fn failing_after(lines: usize) -> Self {
        Self {
            fail_after: Some(lines),
            ..Self::default()
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Distinct alpha values lines were stroked with, in order of first use
    pub fn stroke_alphas(&self) -> Vec<f64> {
        let mut alphas: Vec<f64> = Vec::new();
        for call in &self.calls {
            if let DrawCall::Line { alpha, .. } = call {
                if alphas.last() != Some(alpha) {
                    alphas.push(*alpha);
                }
            }
        }
        alphas
    }
}

impl DrawContext for RecordingContext {
    fn set_line_width(&mut self, width: f64) {
        self.calls.push(DrawCall::LineWidth(width));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.calls.push(DrawCall::GlobalAlpha(alpha));
    }

    fn global_alpha(&self) -> f64 {
        self.alpha
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.calls.push(DrawCall::StrokeStyle(style.to_string()));
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2) -> Result<()> {
        if self.fail_after == Some(self.lines) {
            return Err(GridError::Draw(format!("stroke {} rejected", self.lines)));
        }
        self.lines += 1;
        self.calls.push(DrawCall::Line {
            from,
            to,
            alpha: self.alpha,
        });
        Ok(())
    }
}
