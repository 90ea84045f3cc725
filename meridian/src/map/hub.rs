//! Single dispatch point for transform, style and renderer events.

use crate::error::MapError;
use crate::events::{RendererEvent, StyleEvent, TransformEvent};
use crate::journal::ActionJournal;
use crate::observer::MapObserver;
use crate::renderer::RendererFrontend;
use crate::style::Style;
use crate::transform::Transform;

/// Callback of a still-image request, invoked exactly once.
pub type StillImageCallback = Box<dyn FnOnce(Result<(), MapError>)>;

/// Correlates events from the transform, the style subsystem and the
/// renderer, rebroadcasts them to the observer and the journal, and derives
/// the coarse map lifecycle flags from them.
///
/// Fan-out order is fixed: the public observer first, the journal second, so
/// journal entries always record the state the observer has already seen.
pub(super) struct MapHub {
    pub transform: Transform,
    pub observer: Box<dyn MapObserver>,
    pub frontend: Box<dyn RendererFrontend>,
    pub style: Option<Box<dyn Style>>,
    pub journal: Option<ActionJournal>,
    pub still_image_request: Option<StillImageCallback>,
    /// Whether any camera API was invoked since the style began loading.
    /// Decides whether the style's default camera applies on load.
    pub camera_mutated: bool,
    /// Whether the current style is still waiting for its resources.
    pub loading: bool,
    pub renderer_fully_loaded: bool,
    /// Latches the idle notification so it fires once per idle transition.
    idled: bool,
}

impl MapHub {
    pub fn new(
        observer: Box<dyn MapObserver>,
        frontend: Box<dyn RendererFrontend>,
        transform: Transform,
        journal: Option<ActionJournal>,
    ) -> Self {
        Self {
            transform,
            observer,
            frontend,
            style: None,
            journal,
            still_image_request: None,
            camera_mutated: false,
            loading: false,
            renderer_fully_loaded: false,
            idled: false,
        }
    }

    /// Whether the style and all rendered resources are loaded.
    pub fn is_fully_loaded(&self) -> bool {
        self.style.as_ref().is_some_and(|style| style.is_loaded()) && self.renderer_fully_loaded
    }

    /// Marks the map dirty and asks the frontend for a repaint.
    pub fn on_update(&mut self) {
        self.idled = false;
        self.frontend.invalidate();
    }

    /// Forwards camera notifications and schedules a repaint if the camera
    /// moved.
    pub fn dispatch_transform_events(&mut self, events: Vec<TransformEvent>) {
        let moved = !events.is_empty();
        for event in events {
            match event {
                TransformEvent::CameraWillChange(mode) => {
                    self.observer.on_camera_will_change(mode);
                    if let Some(journal) = &mut self.journal {
                        journal.on_camera_will_change(mode);
                    }
                }
                TransformEvent::CameraIsChanging => {
                    self.observer.on_camera_is_changing();
                }
                TransformEvent::CameraDidChange(mode) => {
                    self.observer.on_camera_did_change(mode);
                    if let Some(journal) = &mut self.journal {
                        journal.on_camera_did_change(mode);
                    }
                }
            }
        }
        if moved {
            self.on_update();
        }
    }

    /// Begins loading a new style.
    pub fn set_style(&mut self, style: Box<dyn Style>) {
        let events = self.transform.cancel_transitions();
        self.dispatch_transform_events(events);

        self.loading = true;
        self.camera_mutated = false;
        self.renderer_fully_loaded = false;
        if let Some(journal) = &mut self.journal {
            journal.set_style_metadata(style.name(), style.url());
        }
        self.style = Some(style);

        self.observer.on_will_start_loading_map();
        if let Some(journal) = &mut self.journal {
            journal.on_will_start_loading_map();
        }
        self.on_update();
    }

    pub fn dispatch_style_event(&mut self, event: StyleEvent) {
        match event {
            StyleEvent::Loaded => {
                let (default_camera, name, url) = match &self.style {
                    Some(style) => (style.default_camera(), style.name(), style.url()),
                    None => (None, None, None),
                };
                if let Some(journal) = &mut self.journal {
                    journal.set_style_metadata(name, url);
                }
                if !self.camera_mutated {
                    if let Some(camera) = default_camera {
                        let events = self.transform.jump_to(&camera);
                        self.dispatch_transform_events(events);
                    }
                }
                self.observer.on_did_finish_loading_style();
                if let Some(journal) = &mut self.journal {
                    journal.on_did_finish_loading_style();
                }
                self.on_update();
            }
            StyleEvent::Error(error) => {
                self.complete_still_image_request(Err(error.clone()));
                self.observer.on_did_fail_loading_map(&error);
                if let Some(journal) = &mut self.journal {
                    journal.on_did_fail_loading_map(&error);
                }
            }
            StyleEvent::Update => {
                self.on_update();
            }
            StyleEvent::SourceChanged { source_id } => {
                self.observer.on_source_changed(&source_id);
                if let Some(journal) = &mut self.journal {
                    journal.on_source_changed(&source_id);
                }
                self.on_update();
            }
            StyleEvent::SpriteLoaded { sprite } => {
                self.observer.on_sprite_loaded(sprite.as_ref());
                if let Some(journal) = &mut self.journal {
                    journal.on_sprite_loaded(sprite.as_ref());
                }
            }
            StyleEvent::SpriteError { sprite, error } => {
                self.observer.on_sprite_error(sprite.as_ref(), &error);
                if let Some(journal) = &mut self.journal {
                    journal.on_sprite_error(sprite.as_ref(), &error);
                }
            }
            StyleEvent::SpriteRequested { sprite } => {
                self.observer.on_sprite_requested(sprite.as_ref());
                if let Some(journal) = &mut self.journal {
                    journal.on_sprite_requested(sprite.as_ref());
                }
            }
        }
    }

    pub fn dispatch_renderer_event(&mut self, event: RendererEvent) {
        match event {
            RendererEvent::Invalidate => {
                self.on_update();
            }
            RendererEvent::ResourceError(error) => {
                self.renderer_fully_loaded = false;
                self.complete_still_image_request(Err(error));
            }
            RendererEvent::WillStartRenderingFrame => {
                self.observer.on_will_start_rendering_frame();
            }
            RendererEvent::DidFinishRenderingFrame(status) => {
                self.renderer_fully_loaded = !status.needs_repaint;
                self.observer.on_did_finish_rendering_frame(&status);
                if let Some(journal) = &mut self.journal {
                    journal.on_did_finish_rendering_frame(&status);
                }

                let style_loaded = self.style.as_ref().is_some_and(|style| style.is_loaded());
                if self.loading && style_loaded && self.renderer_fully_loaded {
                    self.loading = false;
                    self.observer.on_did_finish_loading_map();
                    if let Some(journal) = &mut self.journal {
                        journal.on_did_finish_loading_map();
                    }
                }
                if style_loaded && self.renderer_fully_loaded {
                    self.complete_still_image_request(Ok(()));
                }

                if status.needs_repaint {
                    self.on_update();
                } else if style_loaded && !self.transform.in_transition() && !self.idled {
                    self.idled = true;
                    self.observer.on_did_become_idle();
                    if let Some(journal) = &mut self.journal {
                        journal.on_did_become_idle();
                    }
                }
            }
            RendererEvent::WillStartRenderingMap => {
                self.observer.on_will_start_rendering_map();
                if let Some(journal) = &mut self.journal {
                    journal.on_will_start_rendering_map();
                }
            }
            RendererEvent::DidFinishRenderingMap(mode) => {
                self.observer.on_did_finish_rendering_map(mode);
                if let Some(journal) = &mut self.journal {
                    journal.on_did_finish_rendering_map(mode);
                }
            }
            RendererEvent::StyleImageMissing { image_id } => {
                self.observer.on_style_image_missing(&image_id);
                if let Some(journal) = &mut self.journal {
                    journal.on_style_image_missing(&image_id);
                }
            }
            RendererEvent::RemoveUnusedStyleImages { image_ids } => {
                self.observer.on_remove_unused_style_images(&image_ids);
            }
            RendererEvent::GlyphsLoaded { font_stack, range } => {
                self.observer.on_glyphs_loaded(&font_stack, range);
                if let Some(journal) = &mut self.journal {
                    journal.on_glyphs_loaded(&font_stack, range);
                }
            }
            RendererEvent::GlyphsError {
                font_stack,
                range,
                error,
            } => {
                self.observer.on_glyphs_error(&font_stack, range, &error);
                if let Some(journal) = &mut self.journal {
                    journal.on_glyphs_error(&font_stack, range, &error);
                }
            }
            RendererEvent::GlyphsRequested { font_stack, range } => {
                self.observer.on_glyphs_requested(&font_stack, range);
                if let Some(journal) = &mut self.journal {
                    journal.on_glyphs_requested(&font_stack, range);
                }
            }
            RendererEvent::PreCompileShader(shader) => {
                self.observer.on_pre_compile_shader(&shader);
                if let Some(journal) = &mut self.journal {
                    journal.on_pre_compile_shader(&shader);
                }
            }
            RendererEvent::PostCompileShader(shader) => {
                self.observer.on_post_compile_shader(&shader);
                if let Some(journal) = &mut self.journal {
                    journal.on_post_compile_shader(&shader);
                }
            }
            RendererEvent::ShaderCompileFailed(shader) => {
                self.observer.on_shader_compile_failed(&shader);
                if let Some(journal) = &mut self.journal {
                    journal.on_shader_compile_failed(&shader);
                }
            }
            RendererEvent::TileAction {
                op,
                tile,
                source_id,
            } => {
                self.observer.on_tile_action(op, &tile, &source_id);
                if let Some(journal) = &mut self.journal {
                    journal.on_tile_action(op, &tile, &source_id);
                }
            }
        }
    }

    /// Resolves the pending still-image request, if any.
    pub fn complete_still_image_request(&mut self, result: Result<(), MapError>) {
        if let Some(callback) = self.still_image_request.take() {
            callback(result);
        }
    }

    /// Abandons the active transition and reports its forced completion.
    pub fn cancel_transitions(&mut self) {
        let events = self.transform.cancel_transitions();
        self.dispatch_transform_events(events);
    }
}
