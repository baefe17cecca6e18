use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, warn};

use crate::utils::to_fixed::to_fixed;

pub const BADGE_OVERFLOW: &str = "999+";

pub const LOW_COLOR: &str = "#4CAF50";
pub const MID_COLOR: &str = "#FF9800";
pub const HIGH_COLOR: &str = "#F44336";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeState {
    pub text: String,
    pub color: &'static str,
}

pub fn badge_text(rate: f64) -> String {
    if rate < 1.0 {
        to_fixed(rate, 2)
    } else if rate < 10.0 {
        // Whole rates render without the ".0".
        let text = to_fixed(rate, 1);
        match text.strip_suffix(".0") {
            Some(whole) => whole.to_string(),
            None => text,
        }
    } else if rate > 999.0 {
        BADGE_OVERFLOW.to_string()
    } else {
        format!("{}", rate.round() as i64)
    }
}

pub fn badge_color(rate: f64) -> &'static str {
    if rate < 1.0 {
        LOW_COLOR
    } else if rate < 5.0 {
        MID_COLOR
    } else {
        HIGH_COLOR
    }
}

/// The visible badge surface. Cloning shares the same badge.
#[derive(Debug, Clone, Default)]
pub struct Badge {
    state: Arc<RwLock<Option<BadgeState>>>,
}

impl Badge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets text and color from a fee rate. Never fails observably.
    pub fn render(&self, rate: f64) {
        let next = BadgeState {
            text: badge_text(rate),
            color: badge_color(rate),
        };

        match self.state.write() {
            Ok(mut state) => {
                debug!(text = %next.text, color = next.color, "Badge updated");
                *state = Some(next);
            }
            Err(_) => warn!("Badge state poisoned, skipping update"),
        }
    }

    pub fn current(&self) -> Option<BadgeState> {
        self.state.read().ok().and_then(|state| state.clone())
    }
}
