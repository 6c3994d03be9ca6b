use std::collections::HashMap;

use egui::{Id, Pos2, Vec2};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{drag::clamp_to_viewport, error::StorageError};

pub const BUTTON_POSITION_KEY: &str = "elacityResearchButtonPosition";
pub const PANEL_POSITION_KEY: &str = "elacityResultsPanelPosition";

/// Key/value storage holding one JSON value per draggable control.
pub trait PositionStore {
    fn load_raw(&self, key: &str) -> Option<String>;

    /// Fire-and-forget, last write wins.
    fn save_raw(&mut self, key: &str, value: String);
}

/// In-memory store, for tests and hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }
}

impl PositionStore for MemoryStore {
    fn load_raw(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save_raw(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Stores values in egui's persisted memory, saved by the app backend
/// together with the rest of the egui state.
#[derive(Clone)]
pub struct EguiStore {
    ctx: egui::Context,
}

impl EguiStore {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl PositionStore for EguiStore {
    fn load_raw(&self, key: &str) -> Option<String> {
        self.ctx
            .data_mut(|data| data.get_persisted::<String>(Id::new(key)))
    }

    fn save_raw(&mut self, key: &str, value: String) {
        self.ctx
            .data_mut(|data| data.insert_persisted(Id::new(key), value));
    }
}

/// Accepted stored forms. The CSS form is what older builds wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum SavedPlacement {
    Point {
        x: f32,
        y: f32,
    },
    Css {
        #[serde(default)]
        left: Option<String>,
        #[serde(default)]
        top: Option<String>,
        #[serde(default)]
        right: Option<String>,
        #[serde(default)]
        bottom: Option<String>,
    },
}

fn css_px(v: Option<&str>) -> Result<Option<f32>, StorageError> {
    let Some(v) = v.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    v.strip_suffix("px")
        .unwrap_or(v)
        .trim()
        .parse::<f32>()
        .map(Some)
        .map_err(|_| StorageError::CssLength(v.to_string()))
}

impl SavedPlacement {
    fn resolve(&self, viewport: Vec2, size: Vec2) -> Result<Pos2, StorageError> {
        match self {
            SavedPlacement::Point { x, y } => Ok(Pos2::new(*x, *y)),
            SavedPlacement::Css {
                left,
                top,
                right,
                bottom,
            } => {
                let x = match (css_px(left.as_deref())?, css_px(right.as_deref())?) {
                    (Some(left), _) => left,
                    (None, Some(right)) => viewport.x - size.x - right,
                    (None, None) => return Err(StorageError::NoAnchor),
                };
                let y = match (css_px(top.as_deref())?, css_px(bottom.as_deref())?) {
                    (Some(top), _) => top,
                    (None, Some(bottom)) => viewport.y - size.y - bottom,
                    (None, None) => return Err(StorageError::NoAnchor),
                };
                Ok(Pos2::new(x, y))
            }
        }
    }
}

/// Decodes a stored position and clamps it into the viewport.
///
/// # Errors
///
/// Fails on malformed JSON, unparsable CSS lengths, or a CSS placement
/// missing an anchor on either axis.
pub fn decode_position(raw: &str, viewport: Vec2, size: Vec2) -> Result<Pos2, StorageError> {
    let placement: SavedPlacement = serde_json::from_str(raw)?;
    let pos = placement.resolve(viewport, size)?;
    Ok(clamp_to_viewport(pos, size, viewport))
}

/// # Errors
///
/// Fails only if the position cannot be serialized.
pub fn encode_position(pos: Pos2) -> Result<String, StorageError> {
    Ok(serde_json::to_string(&SavedPlacement::Point { x: pos.x, y: pos.y })?)
}

/// Loads the position stored under `key`. Missing or unreadable values yield
/// `None`; the latter are logged.
pub fn load_position(
    store: &dyn PositionStore,
    key: &str,
    viewport: Vec2,
    size: Vec2,
) -> Option<Pos2> {
    let raw = store.load_raw(key)?;
    match decode_position(&raw, viewport, size) {
        Ok(pos) => Some(pos),
        Err(err) => {
            warn!(key, %err, "ignoring stored position");
            None
        }
    }
}

/// Persists `pos` under `key`, logging instead of failing.
pub fn save_position(store: &mut dyn PositionStore, key: &str, pos: Pos2) {
    match encode_position(pos) {
        Ok(value) => store.save_raw(key, value),
        Err(err) => warn!(key, %err, "position not saved"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(1000., 800.);
    const SIZE: Vec2 = Vec2::new(150., 40.);

    #[test]
    fn test_point_form() {
        let pos = decode_position(r#"{"x":120.0,"y":40.5}"#, VIEWPORT, SIZE).unwrap();
        assert_eq!(pos, Pos2::new(120., 40.5));
    }

    #[test]
    fn test_point_form_is_clamped() {
        let pos = decode_position(r#"{"x":5000,"y":-3}"#, VIEWPORT, SIZE).unwrap();
        assert_eq!(pos, Pos2::new(850., 0.));
    }

    #[test]
    fn test_css_left_top() {
        let raw = r#"{"left":"120px","top":"40px","right":"","bottom":""}"#;
        assert_eq!(
            decode_position(raw, VIEWPORT, SIZE).unwrap(),
            Pos2::new(120., 40.)
        );
    }

    #[test]
    fn test_css_right_bottom() {
        let raw = r#"{"left":"","top":"","right":"20px","bottom":"20px"}"#;
        assert_eq!(
            decode_position(raw, VIEWPORT, SIZE).unwrap(),
            Pos2::new(830., 740.)
        );
    }

    #[test]
    fn test_css_errors() {
        assert!(matches!(
            decode_position(r#"{"left":"","top":""}"#, VIEWPORT, SIZE),
            Err(StorageError::NoAnchor)
        ));
        assert!(matches!(
            decode_position(r#"{"left":"1em","top":"2px"}"#, VIEWPORT, SIZE),
            Err(StorageError::CssLength(_))
        ));
        assert!(matches!(
            decode_position("true", VIEWPORT, SIZE),
            Err(StorageError::Json(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        save_position(&mut store, BUTTON_POSITION_KEY, Pos2::new(33., 44.));
        assert_eq!(
            store.load_raw(BUTTON_POSITION_KEY).as_deref(),
            Some(r#"{"x":33.0,"y":44.0}"#)
        );
        assert_eq!(
            load_position(&store, BUTTON_POSITION_KEY, VIEWPORT, SIZE),
            Some(Pos2::new(33., 44.))
        );
    }

    #[test]
    fn test_unreadable_value_is_ignored() {
        let store = MemoryStore::new().with_value(PANEL_POSITION_KEY, "{oops");
        assert_eq!(load_position(&store, PANEL_POSITION_KEY, VIEWPORT, SIZE), None);
        assert_eq!(load_position(&store, "missing", VIEWPORT, SIZE), None);
    }

    #[test]
    fn test_egui_store() {
        let ctx = egui::Context::default();
        let mut store = EguiStore::new(ctx.clone());
        save_position(&mut store, PANEL_POSITION_KEY, Pos2::new(1., 2.));
        let other = EguiStore::new(ctx);
        assert_eq!(
            load_position(&other, PANEL_POSITION_KEY, VIEWPORT, SIZE),
            Some(Pos2::new(1., 2.))
        );
    }
}
