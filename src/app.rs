//! The annotation window.
//!
//! A winit [`ApplicationHandler`] that shows the current image through
//! `pointmark_gpu` and forwards input to the [`Annotator`]:
//!
//! - left button drag: pan
//! - mouse wheel: zoom at the cursor
//! - right click: mark the pixel under the cursor with the pending label
//! - typing: edit the pending label (Backspace deletes, Escape clears)
//! - Enter: save the annotated image and move to the next one
//!
//! Every event is handled to completion before the next one. An error other
//! than a rejected label stops the event loop and is returned from [`run`].

use std::sync::Arc;

use image::RgbaImage;
use pointmark_gpu::{GpuConfig, GpuContext, ImagePipeline, Texture, ViewUniform};
use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::annotator::{Advance, Annotator};
use crate::constants::{APP_NAME, MAX_INITIAL_WINDOW, PIXELS_PER_WHEEL_NOTCH};
use crate::error::{Error, Result};
use crate::label_input::LabelInput;
use crate::navigator::{ZoomDirection, ZoomOutcome};
use crate::transform::Transform;

/// Run the annotation window until it is closed or the last image is done.
pub fn run(annotator: Annotator, labels: LabelInput) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = AnnotationApp::new(annotator, labels);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// GPU resources for the displayed image.
struct ViewState {
    gpu_ctx: GpuContext,
    pipeline: ImagePipeline,
    texture: Texture,
    texture_bind_group: wgpu::BindGroup,
}

impl ViewState {
    async fn new(window: Arc<Window>, image: &RgbaImage, config: GpuConfig) -> Result<Self> {
        let gpu_ctx = GpuContext::new(window, config).await?;
        let pipeline = ImagePipeline::new(&gpu_ctx);
        let texture = Texture::from_rgba8(&gpu_ctx, image.as_raw(), image.width(), image.height())?;
        let texture_bind_group = pipeline.create_texture_bind_group(&gpu_ctx, &texture);

        Ok(Self {
            gpu_ctx,
            pipeline,
            texture,
            texture_bind_group,
        })
    }

    /// Push image pixels to the GPU, recreating the texture if the size changed.
    fn upload(&mut self, image: &RgbaImage) -> Result<()> {
        if (self.texture.width, self.texture.height) == image.dimensions() {
            self.texture.write(&self.gpu_ctx, image.as_raw())?;
            return Ok(());
        }

        self.texture =
            Texture::from_rgba8(&self.gpu_ctx, image.as_raw(), image.width(), image.height())?;
        self.texture_bind_group = self
            .pipeline
            .create_texture_bind_group(&self.gpu_ctx, &self.texture);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu_ctx.resize(width, height);
    }

    fn render(&mut self, transform: Transform) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.gpu_ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniform = ViewUniform::new(
            (transform.pan_x as f32, transform.pan_y as f32),
            transform.zoom as f32,
            (self.gpu_ctx.width() as f32, self.gpu_ctx.height() as f32),
            (self.texture.width as f32, self.texture.height as f32),
        );
        self.pipeline.update_view(&self.gpu_ctx, uniform);

        let mut encoder = self
            .gpu_ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.pipeline.render(
            &mut encoder,
            &view,
            &self.texture_bind_group,
            self.gpu_ctx.config.clear_color,
        );

        self.gpu_ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

struct AnnotationApp {
    annotator: Annotator,
    labels: LabelInput,
    window: Option<Arc<Window>>,
    view: Option<ViewState>,
    cursor: (f64, f64),
    error: Option<Error>,
}

impl AnnotationApp {
    fn new(annotator: Annotator, labels: LabelInput) -> Self {
        Self {
            annotator,
            labels,
            window: None,
            view: None,
            cursor: (0.0, 0.0),
            error: None,
        }
    }

    fn create_view(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let image = self.annotator.current_image()?;
        let (width, height) = initial_window_size(image.dimensions());

        let attrs = WindowAttributes::default()
            .with_title(self.title())
            .with_inner_size(PhysicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let view = pollster::block_on(ViewState::new(
            Arc::clone(&window),
            image,
            GpuConfig::default(),
        ))?;

        let size = window.inner_size();
        self.annotator
            .navigator_mut()
            .set_viewport(f64::from(size.width), f64::from(size.height));

        self.view = Some(view);
        self.window = Some(window);
        Ok(())
    }

    fn title(&self) -> String {
        window_title(
            self.annotator.current_name(),
            self.annotator.current_index(),
            self.annotator.images().len(),
            self.annotator.navigator().zoom_level(),
            self.labels.as_str(),
        )
    }

    fn refresh(&self) {
        if let Some(window) = &self.window {
            window.set_title(&self.title());
            window.request_redraw();
        }
    }

    fn upload_current(&mut self) -> Result<()> {
        let image = self.annotator.current_image()?;
        if let Some(view) = &mut self.view {
            view.upload(image)?;
        }
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        log::error!("{}", err);
        self.error = Some(err);
        event_loop.exit();
    }

    fn handle_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) -> Result<()> {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(view) = &mut self.view {
                    view.resize(size.width, size.height);
                }
                self.annotator
                    .navigator_mut()
                    .set_viewport(f64::from(size.width), f64::from(size.height));
                self.refresh();
            }
            WindowEvent::RedrawRequested => self.redraw()?,
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                if self.annotator.navigator_mut().motion(position.x, position.y) {
                    self.refresh();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => self.mouse_input(state, button)?,
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(direction) = wheel_direction(delta) {
                    let outcome =
                        self.annotator
                            .navigator_mut()
                            .zoom(direction, self.cursor, Instant::now());
                    if let ZoomOutcome::Applied(_) = outcome {
                        self.refresh();
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        logical_key,
                        text,
                        repeat,
                        ..
                    },
                ..
            } => match key_action(&logical_key, text.as_deref(), repeat) {
                Some(KeyAction::Advance) => self.advance(event_loop)?,
                Some(KeyAction::Backspace) => {
                    if self.labels.backspace() {
                        self.refresh();
                    }
                }
                Some(KeyAction::ClearLabel) => {
                    self.labels.clear();
                    self.refresh();
                }
                Some(KeyAction::Type(typed)) => {
                    if self.labels.push_str(typed) {
                        self.refresh();
                    }
                }
                None => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn mouse_input(&mut self, state: ElementState, button: MouseButton) -> Result<()> {
        let (x, y) = self.cursor;
        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => self.annotator.navigator_mut().press(x, y),
            (MouseButton::Left, ElementState::Released) => {
                self.annotator.navigator_mut().release(x, y);
                self.refresh();
            }
            (MouseButton::Right, ElementState::Pressed) => {
                let label = self.labels.as_str().to_string();
                match self.annotator.annotate(x, y, &label) {
                    Ok(_) => {
                        self.labels.after_mark();
                        self.upload_current()?;
                        self.refresh();
                    }
                    Err(err) if err.is_recoverable() => {
                        log::warn!("{} (type a label before marking)", err);
                    }
                    Err(err) => return Err(err),
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn advance(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        match self.annotator.advance()? {
            Advance::Loaded(_) => {
                self.upload_current()?;
                self.refresh();
            }
            Advance::Finished => event_loop.exit(),
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let transform = self.annotator.navigator().transform();
        let Some(view) = &mut self.view else {
            return Ok(());
        };

        match view.render(transform) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                view.gpu_ctx.reconfigure();
                self.refresh();
                Ok(())
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out waiting for the next frame");
                Ok(())
            }
            Err(e) => Err(pointmark_gpu::GpuError::from(e).into()),
        }
    }
}

impl ApplicationHandler for AnnotationApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_view(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.handle_event(event_loop, event) {
            self.fail(event_loop, err);
        }
    }
}

/// What a key press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction<'a> {
    Advance,
    Backspace,
    ClearLabel,
    Type(&'a str),
}

/// Map a pressed key to its action. Auto-repeat never advances, so holding
/// Enter moves on by one image only.
fn key_action<'a>(key: &Key, text: Option<&'a str>, repeat: bool) -> Option<KeyAction<'a>> {
    match key {
        Key::Named(NamedKey::Enter) if repeat => None,
        Key::Named(NamedKey::Enter) => Some(KeyAction::Advance),
        Key::Named(NamedKey::Backspace) => Some(KeyAction::Backspace),
        Key::Named(NamedKey::Escape) => Some(KeyAction::ClearLabel),
        _ => text.map(KeyAction::Type),
    }
}

/// Window size for an image, shrunk to fit [`MAX_INITIAL_WINDOW`].
fn initial_window_size((width, height): (u32, u32)) -> (u32, u32) {
    let (max_w, max_h) = MAX_INITIAL_WINDOW;
    let scale = (f64::from(max_w) / f64::from(width.max(1)))
        .min(f64::from(max_h) / f64::from(height.max(1)))
        .min(1.0);
    (
        ((f64::from(width) * scale) as u32).max(1),
        ((f64::from(height) * scale) as u32).max(1),
    )
}

/// Zoom direction of one wheel event; `None` for horizontal-only scrolling.
fn wheel_direction(delta: MouseScrollDelta) -> Option<ZoomDirection> {
    let notches = match delta {
        MouseScrollDelta::LineDelta(_, y) => f64::from(y),
        MouseScrollDelta::PixelDelta(pos) => pos.y / PIXELS_PER_WHEEL_NOTCH,
    };
    if notches > 0.0 {
        Some(ZoomDirection::In)
    } else if notches < 0.0 {
        Some(ZoomDirection::Out)
    } else {
        None
    }
}

fn window_title(name: &str, index: usize, len: usize, zoom: f64, label: &str) -> String {
    let label = if label.is_empty() { "<type a label>" } else { label };
    format!(
        "{} - {} [{}/{}] - zoom {:.1}x - label: {}",
        APP_NAME,
        name,
        index + 1,
        len,
        zoom,
        label
    )
}
