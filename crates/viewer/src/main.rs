use std::{sync::Arc, time::Instant};

use clap::Parser;
use imgui::MouseCursor;
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::WinitPlatform;
use pollster::FutureExt;
use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use vpl::{scene::test_scenes::{self, TestSceneDescriptor}, Frame, FrameOrchestrator, SimulationSettings};

use backend::SceneRenderer;
use cli::CommandLineArguments;
use gui::SimulationView;
use input::InputTracker;

mod backend;
mod cli;
mod gui;
mod input;

struct Application {
    window: Option<Arc<Window>>,
    width: u32,
    height: u32,

    wgpu_handles: Option<WgpuHandles<'static>>,
    imgui_state: Option<ImguiInternalState>,
    scene_renderer: Option<SceneRenderer>,

    // the scene needs mesh handles, so it is built once the renderer exists
    scene_descriptor: &'static TestSceneDescriptor,
    initial_settings: SimulationSettings,
    simulation: Option<SimulationView>,

    input: InputTracker,
    last_update: Instant,
}

struct WgpuHandles<'window> {
    surface: wgpu::Surface<'window>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    blitter: wgpu::util::TextureBlitter,
    draw_texture: wgpu::Texture,
}

struct ImguiInternalState {
    context: imgui::Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_cursor: Option<MouseCursor>,
    last_frame: Instant,
}

trait RenderGui {
    fn render_imgui(&mut self, ui: &mut imgui::Ui);
}

impl Application {
    fn new(args: &CommandLineArguments, scene_descriptor: &'static TestSceneDescriptor) -> Self {
        Self {
            window: None,
            width: args.width,
            height: args.height,

            wgpu_handles: None,
            imgui_state: None,
            scene_renderer: None,

            scene_descriptor,
            initial_settings: args.settings(),
            simulation: None,

            input: InputTracker::default(),
            last_update: Instant::now(),
        }
    }

    fn init_wgpu(&self) -> WgpuHandles<'static> {
        let instance_descriptor = wgpu::InstanceDescriptor::from_env_or_default();
        let instance = wgpu::Instance::new(&instance_descriptor);

        let window_clone = Arc::clone(self.window.as_ref().expect("window not created yet"));
        let surface = instance.create_surface(window_clone)
            .expect("Unable to create surface");

        let request_adapter_options = wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface)
        };

        let adapter = instance.request_adapter(&request_adapter_options)
            .block_on()
            .expect("Unable to create adapter (physical device)");

        // object and light indices are pushed per draw
        let required_features = wgpu::Features::PUSH_CONSTANTS;

        let limits = wgpu::Limits {
            max_push_constant_size: 128,
            ..wgpu::Limits::default()
        };

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("Main Device"),
            required_features,
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::default(),
        };

        let (device, queue) = adapter.request_device(&device_descriptor, None)
            .block_on()
            .expect("Unable to get device (logical device)");

        // arbitrarily choose 1st "allowed" swapchain format
        let swapchain_capabilities = surface.get_capabilities(&adapter);
        let swapchain_format = swapchain_capabilities.formats[0];
        info!("Using swapchain format {swapchain_format:?}");

        let config = surface
            .get_default_config(&adapter, self.width, self.height)
            .expect("Unable to get surface configuration");

        surface.configure(&device, &config);

        // don't use swapchain directly, draw to texture then blit to swapchain
        let blitter = wgpu::util::TextureBlitter::new(&device, swapchain_format);
        let draw_texture = Self::make_draw_texture(self.width, self.height, &device);

        WgpuHandles {
            surface,
            adapter,
            device,
            queue,
            blitter,
            draw_texture,
        }
    }

    fn make_draw_texture(
        width: u32,
        height: u32,
        device: &wgpu::Device,
    ) -> wgpu::Texture {
        let texture_desc = wgpu::TextureDescriptor {
            label: Some("Draw Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            // need TEXTURE_BINDING for blitting to swapchain
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[wgpu::TextureFormat::Rgba8Unorm],
        };
        device.create_texture(&texture_desc)
    }

    fn init_imgui(&self) -> ImguiInternalState {
        let mut context = imgui::Context::create();
        let mut platform = imgui_winit_support::WinitPlatform::new(&mut context);
        let window = self.window.as_ref().expect("window not created yet");
        let handles = self.wgpu_handles.as_ref().expect("wgpu not initialized");
        platform.attach_window(
            context.io_mut(),
            window,
            // ensure mouse coordinates are in physical pixels
            imgui_winit_support::HiDpiMode::Locked(1.0)
        );

        context.set_ini_filename(None);

        let renderer_config = RendererConfig {
            texture_format: handles.draw_texture.format(),
            ..Default::default()
        };

        let renderer = Renderer::new(&mut context, &handles.device, &handles.queue, renderer_config);

        ImguiInternalState {
            context,
            platform,
            renderer,
            last_cursor: None,
            last_frame: Instant::now(),
        }
    }

    fn init_simulation(&mut self) -> Result<(), vpl::SceneError> {
        let handles = self.wgpu_handles.as_ref().expect("wgpu not initialized");
        let size = (self.width, self.height);
        let mut scene_renderer = SceneRenderer::new(&handles.device, handles.draw_texture.format(), size);
        let meshes = scene_renderer.add_builtin_meshes(&handles.device);
        self.scene_renderer = Some(scene_renderer);

        let scene = (self.scene_descriptor.scene_func)(meshes)?;
        info!("Loaded scene {} ({} objects)", self.scene_descriptor.name, scene.objects().len());

        let orchestrator = FrameOrchestrator::new(scene, self.initial_settings.clone());
        self.simulation = Some(SimulationView::new(orchestrator));
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let wgpu_handles = self.wgpu_handles.as_mut().expect("wgpu not initialized");
        let config = wgpu_handles.surface.get_default_config(&wgpu_handles.adapter, width, height).expect("surface not supported");

        // surface width / height must be nonzero
        if height != 0 && width != 0 {
            wgpu_handles.surface.configure(&wgpu_handles.device, &config);
        }

        wgpu_handles.draw_texture = Self::make_draw_texture(width, height, &wgpu_handles.device);
        if let Some(scene_renderer) = self.scene_renderer.as_mut() {
            scene_renderer.resize(&wgpu_handles.device, (width, height));
        }
    }

    // prevent segfault by tearing down wgpu first, then closing window
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.scene_renderer = None;
        self.imgui_state = None;
        self.wgpu_handles = None;
        event_loop.exit();
    }

    /// Runs one simulation step. None on a fatal simulation error, which has
    /// already been logged.
    fn step_simulation(&mut self) -> Option<Frame> {
        let simulation = self.simulation.as_mut()?;

        let now = Instant::now();
        self.input.state.delta_time = (now - self.last_update).as_secs_f32();
        self.last_update = now;

        let result = simulation.orchestrator.update(&self.input.state);
        self.input.end_frame();
        simulation.simulation_time = now.elapsed();

        match result {
            Ok(frame) => {
                simulation.stats = frame.stats;
                Some(frame)
            }
            Err(err) => {
                error!("Simulation failed, no frame rendered: {err}");
                None
            }
        }
    }

    fn render_imgui(
        imgui_state: &mut ImguiInternalState,
        render_gui: &mut dyn RenderGui,
        wgpu_handles: &WgpuHandles,
        render_target: &wgpu::Texture,
        window: &Window
    ) {
        let now = Instant::now();
        imgui_state
            .context
            .io_mut()
            .update_delta_time(now - imgui_state.last_frame);
        imgui_state.last_frame = now;

        imgui_state
            .platform
            .prepare_frame(imgui_state.context.io_mut(), window)
            .expect("Failed to prepare frame");

        let ui = imgui_state.context.new_frame();
        render_gui.render_imgui(ui);

        let WgpuHandles {
            device, queue, ..
        } = wgpu_handles;

        let mut encoder: wgpu::CommandEncoder = device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Imgui Encoder") });

        if imgui_state.last_cursor != ui.mouse_cursor() {
            imgui_state.last_cursor = ui.mouse_cursor();
            imgui_state.platform.prepare_render(ui, window);
        }

        let view = render_target
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Imgui Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        imgui_state.renderer
            .render(
                imgui_state.context.render(),
                queue,
                device,
                &mut rpass,
            )
            .expect("Rendering failed");

        drop(rpass);

        queue.submit(Some(encoder.finish()));
    }

    fn draw(&mut self, frame: &Frame) {
        let (Some(wgpu_handles), Some(imgui_state), Some(scene_renderer), Some(simulation), Some(window)) = (
            self.wgpu_handles.as_ref(),
            self.imgui_state.as_mut(),
            self.scene_renderer.as_mut(),
            self.simulation.as_mut(),
            self.window.as_ref(),
        ) else {
            return;
        };

        let surface_texture = wgpu_handles.surface.get_current_texture()
            .expect("Unable to get next swapchain image");
        let draw_view = wgpu_handles.draw_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let aspect_ratio = self.width as f32 / self.height.max(1) as f32;
        let mut backend = scene_renderer.frame(&wgpu_handles.device, &wgpu_handles.queue, &draw_view);
        simulation.orchestrator.submit(frame, &mut backend, aspect_ratio);

        Self::render_imgui(
            imgui_state,
            simulation,
            wgpu_handles,
            &wgpu_handles.draw_texture,
            window
        );

        // blit the rendered output to the swapchain image
        let mut blit_encoder = wgpu_handles.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor { label: Some("Blit Encoder") }
        );
        let dest_view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        wgpu_handles.blitter.copy(
            &wgpu_handles.device,
            &mut blit_encoder,
            &draw_view,
            &dest_view
        );
        wgpu_handles.queue.submit(Some(blit_encoder.finish()));

        surface_texture.present();

        // request redraw for the next frame
        window.request_redraw();
    }
}

impl ApplicationHandler for Application {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title("VPL")
                .with_inner_size(PhysicalSize::new(self.width, self.height));
            let window = event_loop.create_window(window_attributes).expect("Unable to create window");
            self.window = Some(Arc::new(window));

            self.wgpu_handles = Some(self.init_wgpu());
            self.imgui_state = Some(self.init_imgui());

            if let Err(err) = self.init_simulation() {
                error!("Unable to build scene {}: {err}", self.scene_descriptor.name);
                self.shutdown(event_loop);
                return;
            }

            self.last_update = Instant::now();
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        if let Some(imgui_state) = self.imgui_state.as_ref() {
            let io = imgui_state.context.io();
            self.input.handle_window_event(&event, io.want_capture_mouse, io.want_capture_keyboard);
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Window close requested");
                self.shutdown(event_loop);
                return;
            }

            WindowEvent::RedrawRequested if !event_loop.exiting() => {
                let Some(frame) = self.step_simulation() else {
                    self.shutdown(event_loop);
                    return;
                };
                self.draw(&frame);
            }

            WindowEvent::Resized(new_size) => {
                info!("Window resized to: {new_size:?}");
                self.width = new_size.width;
                self.height = new_size.height;
                self.resize(self.width, self.height);
            }

            _ => ()
        }

        let (Some(imgui_state), Some(window)) = (self.imgui_state.as_mut(), self.window.as_ref()) else {
            return;
        };

        imgui_state.platform.handle_event::<()>(
            imgui_state.context.io_mut(),
            window,
            &Event::WindowEvent { window_id, event },
        );
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli_args = CommandLineArguments::parse();

    if cli_args.list_scenes {
        for descriptor in test_scenes::all_test_scenes() {
            println!("{}", descriptor.name);
        }
        return Ok(());
    }

    let scene_descriptor = cli_args
        .scene()
        .ok_or_else(|| anyhow::anyhow!("unknown scene `{}` (try --list-scenes)", cli_args.scene_name))?;

    let event_loop = EventLoop::new()?;
    let mut app = Application::new(&cli_args, scene_descriptor);

    event_loop.run_app(&mut app)?;
    Ok(())
}
