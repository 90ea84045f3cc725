//! Rolling-file event journal.
//!
//! The journal mirrors the observer event stream into a bounded set of log
//! files, one JSON object per line. It is best-effort diagnostics: I/O
//! failures are logged and swallowed, they never reach the observer or the
//! caller of a camera API.

use std::fs;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::MapError;
use crate::observer::{
    CameraChangeMode, GlyphRange, OverscaledTileId, RenderFrameStatus, RenderMode, ShaderInfo,
    SpriteInfo, TileOperation,
};
use crate::options::ClientOptions;

const JOURNAL_DIRECTORY: &str = "action_journal";
const JOURNAL_FILE_PREFIX: &str = "action_journal";

/// Configuration of the action journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionJournalOptions {
    /// Whether the map creates a journal at all.
    pub enabled: bool,
    /// Directory the `action_journal/` subdirectory is created in. Must be
    /// distinct per map instance.
    pub path: PathBuf,
    /// Rotation threshold: the newest file rotates out once its size in
    /// bytes reaches this value.
    pub log_file_size: u64,
    /// Number of files kept on disk.
    pub log_file_count: usize,
}

impl Default for ActionJournalOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("."),
            log_file_size: 1024 * 1024,
            log_file_count: 5,
        }
    }
}

impl ActionJournalOptions {
    /// Creates the default (disabled) options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the journal.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the base directory.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the rotation threshold in bytes.
    pub fn with_log_file_size(mut self, size: u64) -> Self {
        self.log_file_size = size;
        self
    }

    /// Sets the number of files kept.
    pub fn with_log_file_count(mut self, count: usize) -> Self {
        self.log_file_count = count;
        self
    }
}

#[derive(Serialize)]
struct JournalLine<'a> {
    name: &'a str,
    time: String,
    #[serde(rename = "styleName", skip_serializing_if = "Option::is_none")]
    style_name: Option<&'a str>,
    #[serde(rename = "styleURL", skip_serializing_if = "Option::is_none")]
    style_url: Option<&'a str>,
    #[serde(rename = "clientName", skip_serializing_if = "Option::is_none")]
    client_name: Option<&'a str>,
    #[serde(rename = "clientVersion", skip_serializing_if = "Option::is_none")]
    client_version: Option<&'a str>,
    #[serde(skip_serializing_if = "event_is_empty")]
    event: &'a Value,
}

fn event_is_empty(event: &&Value) -> bool {
    match event {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Bounded rolling-file log of observer events.
///
/// Files live in `<path>/action_journal/` and are named
/// `action_journal.<index>.log` with index 0 the newest. When the newest
/// file reaches the configured size it rotates: the oldest file is deleted,
/// the rest shift up by one index and a fresh file 0 starts.
pub struct ActionJournal {
    directory: PathBuf,
    log_file_size: u64,
    log_file_count: usize,
    client_options: ClientOptions,
    style_name: Option<String>,
    style_url: Option<String>,
    file: Option<File>,
    current_size: u64,
}

impl ActionJournal {
    /// Creates a journal writing under `options.path`.
    ///
    /// The directory is created lazily on the first append, so construction
    /// itself cannot fail.
    pub fn new(options: &ActionJournalOptions, client_options: ClientOptions) -> Self {
        let directory = options.path.join(JOURNAL_DIRECTORY);
        let current_size = fs::metadata(file_path(&directory, 0))
            .map(|meta| meta.len())
            .unwrap_or(0);
        Self {
            directory,
            log_file_size: options.log_file_size.max(1),
            log_file_count: options.log_file_count.max(1),
            client_options,
            style_name: None,
            style_url: None,
            file: None,
            current_size,
        }
    }

    /// Updates the style metadata recorded with every subsequent event.
    pub fn set_style_metadata(&mut self, name: Option<String>, url: Option<String>) {
        self.style_name = name;
        self.style_url = url;
    }

    /// Paths of the journal files currently on disk, newest first.
    pub fn log_files(&self) -> Vec<PathBuf> {
        (0..self.log_file_count)
            .map(|index| file_path(&self.directory, index))
            .filter(|path| path.exists())
            .collect()
    }

    /// The camera is about to change.
    pub fn on_camera_will_change(&mut self, mode: CameraChangeMode) {
        self.log("onCameraWillChange", json!({ "cameraMode": mode }));
    }

    /// The camera finished changing.
    pub fn on_camera_did_change(&mut self, mode: CameraChangeMode) {
        self.log("onCameraDidChange", json!({ "cameraMode": mode }));
    }

    /// A new style started loading.
    pub fn on_will_start_loading_map(&mut self) {
        self.log("onWillStartLoadingMap", Value::Null);
    }

    /// The style and its resources finished loading.
    pub fn on_did_finish_loading_map(&mut self) {
        self.log("onDidFinishLoadingMap", Value::Null);
    }

    /// The style failed to load.
    pub fn on_did_fail_loading_map(&mut self, error: &MapError) {
        self.log("onDidFailLoadingMap", json!({ "error": error.to_string() }));
    }

    /// The renderer finished drawing a frame.
    pub fn on_did_finish_rendering_frame(&mut self, status: &RenderFrameStatus) {
        self.log(
            "onDidFinishRenderingFrame",
            json!({
                "renderMode": status.mode,
                "needsRepaint": status.needs_repaint,
                "placementChanged": status.placement_changed,
                "frameEncodingTime": status.frame_encoding_time,
                "frameRenderingTime": status.frame_rendering_time,
            }),
        );
    }

    /// The renderer started drawing the map after a style change.
    pub fn on_will_start_rendering_map(&mut self) {
        self.log("onWillStartRenderingMap", Value::Null);
    }

    /// The renderer finished drawing the complete map.
    pub fn on_did_finish_rendering_map(&mut self, mode: RenderMode) {
        self.log("onDidFinishRenderingMap", json!({ "renderMode": mode }));
    }

    /// The map became idle.
    pub fn on_did_become_idle(&mut self) {
        self.log("onDidBecomeIdle", Value::Null);
    }

    /// The style document finished loading.
    pub fn on_did_finish_loading_style(&mut self) {
        self.log("onDidFinishLoadingStyle", Value::Null);
    }

    /// A style source changed its content.
    pub fn on_source_changed(&mut self, source_id: &str) {
        self.log("onSourceChanged", json!({ "sourceID": source_id }));
    }

    /// The style references a missing image.
    pub fn on_style_image_missing(&mut self, image_id: &str) {
        self.log("onStyleImageMissing", json!({ "imageID": image_id }));
    }

    /// A sprite sheet finished loading.
    pub fn on_sprite_loaded(&mut self, sprite: Option<&SpriteInfo>) {
        self.log("onSpriteLoaded", sprite_payload(sprite, None));
    }

    /// A sprite sheet failed to load.
    pub fn on_sprite_error(&mut self, sprite: Option<&SpriteInfo>, error: &MapError) {
        self.log("onSpriteError", sprite_payload(sprite, Some(error)));
    }

    /// A sprite sheet was requested.
    pub fn on_sprite_requested(&mut self, sprite: Option<&SpriteInfo>) {
        self.log("onSpriteRequested", sprite_payload(sprite, None));
    }

    /// A glyph range finished loading.
    pub fn on_glyphs_loaded(&mut self, font_stack: &[String], range: GlyphRange) {
        self.log("onGlyphsLoaded", glyph_payload(font_stack, range, None));
    }

    /// A glyph range failed to load.
    pub fn on_glyphs_error(&mut self, font_stack: &[String], range: GlyphRange, error: &MapError) {
        self.log("onGlyphsError", glyph_payload(font_stack, range, Some(error)));
    }

    /// A glyph range was requested.
    pub fn on_glyphs_requested(&mut self, font_stack: &[String], range: GlyphRange) {
        self.log("onGlyphsRequested", glyph_payload(font_stack, range, None));
    }

    /// A shader program is about to be compiled.
    pub fn on_pre_compile_shader(&mut self, shader: &ShaderInfo) {
        self.log("onPreCompileShader", shader_payload(shader));
    }

    /// A shader program was compiled.
    pub fn on_post_compile_shader(&mut self, shader: &ShaderInfo) {
        self.log("onPostCompileShader", shader_payload(shader));
    }

    /// A shader program failed to compile.
    pub fn on_shader_compile_failed(&mut self, shader: &ShaderInfo) {
        self.log("onShaderCompileFailed", shader_payload(shader));
    }

    /// A tile moved through a step of the loading pipeline.
    pub fn on_tile_action(&mut self, op: TileOperation, tile: &OverscaledTileId, source_id: &str) {
        self.log(
            "onTileAction",
            json!({
                "action": op,
                "tileX": tile.x,
                "tileY": tile.y,
                "tileZ": tile.z,
                "overscaledZ": tile.overscaled_z,
                "sourceID": source_id,
            }),
        );
    }

    fn log(&mut self, name: &str, event: Value) {
        let line = JournalLine {
            name,
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            style_name: self.style_name.as_deref(),
            style_url: self.style_url.as_deref(),
            client_name: self.client_options.name.as_deref(),
            client_version: self.client_options.version.as_deref(),
            event: &event,
        };
        let line = match serde_json::to_string(&line) {
            Ok(line) => line,
            Err(error) => {
                log::warn!("failed to serialize journal event {name}: {error}");
                return;
            }
        };
        if let Err(error) = self.append(&line) {
            log::warn!("failed to write journal event {name}: {error}");
        }
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        if self.current_size >= self.log_file_size {
            self.rotate()?;
        }
        if self.file.is_none() {
            fs::create_dir_all(&self.directory)?;
            self.file = Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(file_path(&self.directory, 0))?,
            );
        }
        if let Some(file) = &mut self.file {
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        self.current_size += line.len() as u64 + 1;
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file = None;
        self.current_size = 0;

        let oldest = file_path(&self.directory, self.log_file_count - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (0..self.log_file_count - 1).rev() {
            let from = file_path(&self.directory, index);
            if from.exists() {
                fs::rename(&from, file_path(&self.directory, index + 1))?;
            }
        }
        Ok(())
    }
}

fn file_path(directory: &Path, index: usize) -> PathBuf {
    directory.join(format!("{JOURNAL_FILE_PREFIX}.{index}.log"))
}

fn sprite_payload(sprite: Option<&SpriteInfo>, error: Option<&MapError>) -> Value {
    let mut payload = match sprite {
        Some(sprite) => json!({ "id": sprite.id, "url": sprite.url }),
        None => json!({}),
    };
    if let (Some(error), Value::Object(map)) = (error, &mut payload) {
        map.insert("error".into(), Value::String(error.to_string()));
    }
    payload
}

fn glyph_payload(font_stack: &[String], range: GlyphRange, error: Option<&MapError>) -> Value {
    let mut payload = json!({
        "fontStack": font_stack,
        "rangeStart": range.start,
        "rangeEnd": range.end,
    });
    if let (Some(error), Value::Object(map)) = (error, &mut payload) {
        map.insert("error".into(), Value::String(error.to_string()));
    }
    payload
}

fn shader_payload(shader: &ShaderInfo) -> Value {
    json!({
        "shader": shader.shader,
        "backend": shader.backend,
        "defines": shader.defines,
    })
}
