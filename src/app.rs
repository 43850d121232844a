//! The viewer application and its event loop.
//!
//! The event loop follows this pattern:
//! 1. On `resumed`, create the window and GPU context and load every model once
//! 2. Feed keyboard input and right-drag mouse motion to the camera controller
//! 3. On each redraw, advance the camera and render every model in one pass
//! 4. Present the frame, reconfiguring the surface when it was lost

use std::{iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    camera::{Camera, CameraController},
    config::ViewerConfig,
    context::{Context, ModelPass},
    data_structures::model::Model,
};

/// Mouse deltas are scaled by this before they reach the controller.
const MOUSE_SPEED_FACTOR: f64 = 5.0;

/// GPU context plus everything that is drawn with it.
pub struct ViewerState {
    ctx: Context,
    camera: Camera,
    controller: CameraController,
    models: Vec<Model<Context>>,
    is_surface_configured: bool,
    right_mouse_pressed: bool,
}

impl ViewerState {
    async fn new(window: Arc<Window>, config: &ViewerConfig) -> anyhow::Result<Self> {
        let [r, g, b, a] = config.window.clear_colour;
        let mut ctx = Context::new(window, wgpu::Color { r, g, b, a }).await?;

        let camera = Camera::from_config(&config.camera, ctx.config.width, ctx.config.height);
        let controller = CameraController::new(config.camera.speed, config.camera.sensitivity);

        let models = config
            .models
            .iter()
            .map(|desc| Model::new(&mut ctx, desc, &config.lighting, &config.textures))
            .collect::<anyhow::Result<Vec<_>>>()?;
        log::info!("{} models loaded", models.len());

        Ok(Self {
            ctx,
            camera,
            controller,
            models,
            is_surface_configured: false,
            right_mouse_pressed: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.camera.projection.resize(width, height);
            self.is_surface_configured = true;
        }
    }

    fn render(&mut self) -> Result<(), wgpu::CurrentSurfaceTexture> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(t)
            | wgpu::CurrentSurfaceTexture::Suboptimal(t) => t,
            e => return Err(e),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let mut pass = ModelPass {
                pass: &mut render_pass,
                queue: &self.ctx.queue,
                fallback: &self.ctx.fallback.bind_group,
            };
            for model in &self.models {
                model.render(&self.camera, &mut pass);
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    config: ViewerConfig,
    state: Option<ViewerState>,
    last_time: Instant,
}

impl App {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            state: None,
            last_time: Instant::now(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create the main window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(ViewerState::new(window, &self.config)) {
            Ok(mut state) => {
                let size = state.ctx.window().inner_size();
                state.resize(size.width, size.height);
                state.ctx.window().request_redraw();
                self.last_time = Instant::now();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Viewer initialization failed: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if state.right_mouse_pressed {
                state
                    .controller
                    .handle_mouse(dx * MOUSE_SPEED_FACTOR, dy * MOUSE_SPEED_FACTOR);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Right,
                ..
            } => state.right_mouse_pressed = button_state.is_pressed(),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.controller.update(&mut state.camera, dt);

                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(
                        wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated,
                    ) => {
                        let size = state.ctx.window().inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {:?}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Opens the viewer window and blocks until it is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
