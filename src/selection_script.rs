use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::extraction::SelectionMessage;
use crate::core::models::Point;
use crate::global_constants::LOG_TAG_APP;

const ELLIPSE_POINTS: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionScript {
    pub view_width: u32,
    pub view_height: u32,
    pub points: Vec<Point>,
}

impl SelectionScript {
    pub fn load_from(script_path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(script_path)
            .with_context(|| format!("Unable to read selection from {:?}", script_path))?;
        let script: SelectionScript = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid selection file {:?}", script_path))?;

        log::info!(
            "{} loaded {} selection points for a {}x{} view",
            LOG_TAG_APP,
            script.points.len(),
            script.view_width,
            script.view_height
        );
        Ok(script)
    }

    pub fn centred_ellipse(view_width: u32, view_height: u32) -> Self {
        let centre_x = view_width as f32 / 2.0;
        let centre_y = view_height as f32 / 2.0;
        let radius_x = view_width as f32 / 4.0;
        let radius_y = view_height as f32 / 4.0;

        let points = (0..ELLIPSE_POINTS)
            .map(|index| {
                let angle = index as f32 / ELLIPSE_POINTS as f32 * std::f32::consts::TAU;
                Point::new(centre_x + radius_x * angle.cos(), centre_y + radius_y * angle.sin())
            })
            .collect();

        Self {
            view_width,
            view_height,
            points,
        }
    }

    pub fn messages(&self) -> Vec<SelectionMessage> {
        let Some((first, rest)) = self.points.split_first() else {
            return vec![SelectionMessage::CancelRequested];
        };

        let mut messages = Vec::with_capacity(self.points.len() + 2);
        messages.push(SelectionMessage::PointerPressed(*first));
        messages.extend(rest.iter().copied().map(SelectionMessage::PointerMoved));
        messages.push(SelectionMessage::PointerReleased);
        messages.push(SelectionMessage::ConfirmSelection);
        messages
    }
}
