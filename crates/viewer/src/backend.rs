//! wgpu implementation of the simulation's `RenderBackend`. Objects and lights
//! live in storage buffers and are selected per draw with push constants; each
//! lighting pass redraws every object with a single light.

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use tracing::{trace, warn};
use wgpu::util::DeviceExt;

use vpl::{
    geometry::Vec3,
    render::{
        BlendMode, DepthTest, LightConstants, LightType, LightingPass, LineVertex, ObjectConstants,
        RenderBackend, SceneConstants,
    },
    scene::{test_scenes::SceneMeshes, MeshId},
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SceneData {
    // column major
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    eye: [f32; 3],
    particle_count: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectData {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    albedo: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct LightData {
    position: [f32; 3],
    intensity: f32,
    color: [f32; 3],
    radius: f32,
    normal: [f32; 3],
    light_type: u32,
}

impl From<&LightConstants> for LightData {
    fn from(light: &LightConstants) -> Self {
        LightData {
            position: light.world_position.into(),
            intensity: light.intensity,
            color: light.color.into(),
            radius: light.radius,
            normal: light.normal.into(),
            light_type: match light.light_type {
                LightType::Point => 0,
                LightType::SignCosineWeighted => 1,
                LightType::CosineWeighted => 2,
            },
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct PushConstants {
    object_index: u32,
    light_index: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct LineVertexData {
    position: [f32; 3],
    color: [f32; 3],
}

// both vertex types are two vec3s
const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

/// Buffer that is reallocated (never shrunk) when a write doesn't fit
struct GrowableBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: wgpu::Buffer,
}

impl GrowableBuffer {
    fn new(device: &wgpu::Device, label: &'static str, usage: wgpu::BufferUsages, size: u64) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        });
        GrowableBuffer { label, usage, buffer }
    }

    /// Returns true if the buffer had to be reallocated
    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8]) -> bool {
        let mut reallocated = false;
        if data.len() as u64 > self.buffer.size() {
            let size = (data.len() as u64).next_power_of_two();
            trace!("growing {} to {size} bytes", self.label);
            *self = GrowableBuffer::new(device, self.label, self.usage, size);
            reallocated = true;
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, data);
        }
        reallocated
    }
}

pub(crate) struct SceneRenderer {
    meshes: Vec<GpuMesh>,

    scene_buffer: wgpu::Buffer,
    object_buffer: GrowableBuffer,
    light_buffer: GrowableBuffer,
    line_buffer: GrowableBuffer,

    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,

    lighting_pipelines: Vec<((BlendMode, DepthTest), wgpu::RenderPipeline)>,
    line_pipeline: wgpu::RenderPipeline,

    depth_view: wgpu::TextureView,
}

// the first pass lays down depth, every later pass adds onto it
const LIGHTING_PIPELINES: [(BlendMode, DepthTest); 2] = [
    (BlendMode::Replace, DepthTest::Less),
    (BlendMode::Additive, DepthTest::Equal),
];

impl SceneRenderer {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat, size: (u32, u32)) -> Self {
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Data"),
            size: size_of::<SceneData>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_buffer = GrowableBuffer::new(
            device,
            "Object Data",
            wgpu::BufferUsages::STORAGE,
            16 * size_of::<ObjectData>() as u64,
        );
        let light_buffer = GrowableBuffer::new(
            device,
            "Light Data",
            wgpu::BufferUsages::STORAGE,
            256 * size_of::<LightData>() as u64,
        );
        let line_buffer = GrowableBuffer::new(
            device,
            "Debug Lines",
            wgpu::BufferUsages::VERTEX,
            1024 * size_of::<LineVertexData>() as u64,
        );

        let storage_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout_desc = wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(1),
                storage_entry(2),
            ],
        };
        let bind_group_layout = device.create_bind_group_layout(&bind_group_layout_desc);
        let bind_group = Self::make_bind_group(device, &bind_group_layout, &scene_buffer, &object_buffer, &light_buffer);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::VERTEX_FRAGMENT,
                range: 0..size_of::<PushConstants>() as u32,
            }],
        });

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/scene.wgsl"))),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/lines.wgsl"))),
        });

        let lighting_pipelines = LIGHTING_PIPELINES
            .into_iter()
            .map(|(blend, depth_test)| {
                let pipeline = Self::make_lighting_pipeline(device, &pipeline_layout, &scene_shader, target_format, blend, depth_test);
                ((blend, depth_test), pipeline)
            })
            .collect();

        let line_pipeline = Self::make_line_pipeline(device, &pipeline_layout, &line_shader, target_format);
        let depth_view = Self::make_depth_view(device, size);

        SceneRenderer {
            meshes: Vec::new(),
            scene_buffer,
            object_buffer,
            light_buffer,
            line_buffer,
            bind_group_layout,
            bind_group,
            lighting_pipelines,
            line_pipeline,
            depth_view,
        }
    }

    fn make_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        scene_buffer: &wgpu::Buffer,
        object_buffer: &GrowableBuffer,
        light_buffer: &GrowableBuffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: scene_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: object_buffer.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: light_buffer.buffer.as_entire_binding() },
            ],
        })
    }

    fn make_lighting_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        target_format: wgpu::TextureFormat,
        blend: BlendMode,
        depth_test: DepthTest,
    ) -> wgpu::RenderPipeline {
        let blend = match blend {
            BlendMode::Replace => wgpu::BlendState::REPLACE,
            BlendMode::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::REPLACE,
            },
        };
        // only the pass that establishes depth writes it
        let (depth_compare, depth_write_enabled) = match depth_test {
            DepthTest::Less => (wgpu::CompareFunction::Less, true),
            DepthTest::Equal => (wgpu::CompareFunction::Equal, false),
        };

        let targets = [Some(wgpu::ColorTargetState {
            format: target_format,
            blend: Some(blend),
            write_mask: wgpu::ColorWrites::ALL,
        })];
        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        }];

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Lighting Pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &vertex_buffers,
            },
            // quads are visible from both sides
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            multiview: None,
            cache: None,
        })
    }

    fn make_line_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        target_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let targets = [Some(target_format.into())];
        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: size_of::<LineVertexData>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        }];

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &vertex_buffers,
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            multiview: None,
            cache: None,
        })
    }

    fn make_depth_view(device: &wgpu::Device, (width, height): (u32, u32)) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        self.depth_view = Self::make_depth_view(device, size);
    }

    pub fn add_mesh(&mut self, device: &wgpu::Device, vertices: &[MeshVertex], indices: &[u16]) -> MeshId {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Indices"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(GpuMesh {
            vertices: vertex_buffer,
            indices: index_buffer,
            index_count: indices.len() as u32,
        });
        id
    }

    /// Uploads the unit quad and unit cube every built-in scene is made of
    pub fn add_builtin_meshes(&mut self, device: &wgpu::Device) -> SceneMeshes {
        let (quad_vertices, quad_indices) = unit_quad();
        let (cube_vertices, cube_indices) = unit_cube();
        SceneMeshes {
            quad: self.add_mesh(device, &quad_vertices, &quad_indices),
            cube: self.add_mesh(device, &cube_vertices, &cube_indices),
        }
    }

    pub fn frame<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        target: &'a wgpu::TextureView,
    ) -> RenderFrame<'a> {
        RenderFrame {
            renderer: self,
            device,
            queue,
            target,
            draws: Vec::new(),
            passes: Vec::new(),
            line_vertex_count: 0,
        }
    }

    fn lighting_pipeline(&self, blend: BlendMode, depth_test: DepthTest) -> Option<&wgpu::RenderPipeline> {
        self.lighting_pipelines
            .iter()
            .find(|(key, _)| *key == (blend, depth_test))
            .map(|(_, pipeline)| pipeline)
    }
}

// face of the unit cube, centered on `normal * 0.5`
fn cube_face(normal: Vec3, u: Vec3, v: Vec3) -> [MeshVertex; 4] {
    let center = normal * 0.5;
    [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)].map(|(a, b)| MeshVertex {
        position: (center + u * a + v * b).into(),
        normal: normal.into(),
    })
}

fn unit_quad() -> (Vec<MeshVertex>, Vec<u16>) {
    let mut vertices = cube_face(Vec3(0.0, 0.0, 1.0), Vec3(1.0, 0.0, 0.0), Vec3(0.0, 1.0, 0.0));
    // the quad lies on z = 0
    for vertex in &mut vertices {
        vertex.position[2] = 0.0;
    }
    (vertices.to_vec(), vec![0, 1, 2, 2, 3, 0])
}

fn unit_cube() -> (Vec<MeshVertex>, Vec<u16>) {
    let x = Vec3(1.0, 0.0, 0.0);
    let y = Vec3(0.0, 1.0, 0.0);
    let z = Vec3(0.0, 0.0, 1.0);
    let faces = [(x, y, z), (-x, z, y), (y, z, x), (-y, x, z), (z, x, y), (-z, y, x)];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u16;
        vertices.extend(cube_face(normal, u, v));
        indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
    }
    (vertices, indices)
}

/// One frame's worth of backend calls. GPU work is encoded and submitted in
/// `end_frame`, once every lighting pass is known.
pub(crate) struct RenderFrame<'a> {
    renderer: &'a mut SceneRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    target: &'a wgpu::TextureView,

    draws: Vec<MeshId>,
    passes: Vec<LightingPass>,
    line_vertex_count: u32,
}

impl RenderBackend for RenderFrame<'_> {
    fn begin_frame(&mut self, scene: &SceneConstants, objects: &[ObjectConstants]) {
        let scene_data = SceneData {
            view: scene.view.to_cols_array_2d(),
            projection: scene.projection.to_cols_array_2d(),
            eye: scene.world_eye.into(),
            particle_count: scene.particle_count,
        };
        self.queue.write_buffer(&self.renderer.scene_buffer, 0, bytemuck::bytes_of(&scene_data));

        let object_data: Vec<ObjectData> = objects
            .iter()
            .map(|object| ObjectData {
                model: object.model.to_cols_array_2d(),
                normal: object.normal.to_cols_array_2d(),
                albedo: object.albedo.extend(1.0),
            })
            .collect();
        if self.renderer.object_buffer.write(self.device, self.queue, bytemuck::cast_slice(&object_data)) {
            self.rebuild_bind_group();
        }

        self.draws = objects.iter().map(|object| object.mesh).collect();
    }

    fn shadow_pass(&mut self, light: &LightConstants) {
        // lighting passes are drawn unshadowed; no shadow map is rendered yet
        trace!("shadow pass skipped for light at {}", light.world_position);
    }

    fn lighting_pass(&mut self, pass: &LightingPass) {
        self.passes.push(*pass);
    }

    fn debug_lines(&mut self, vertices: &[LineVertex]) {
        let data: Vec<LineVertexData> = vertices
            .iter()
            .map(|vertex| LineVertexData {
                position: vertex.position.into(),
                color: vertex.color.into(),
            })
            .collect();
        self.renderer.line_buffer.write(self.device, self.queue, bytemuck::cast_slice(&data));
        self.line_vertex_count = data.len() as u32;
    }

    fn end_frame(&mut self) {
        // passes address lights by their slot in this buffer, not their frame index
        let light_data: Vec<LightData> = self.passes.iter().map(|pass| LightData::from(&pass.light)).collect();
        if self.renderer.light_buffer.write(self.device, self.queue, bytemuck::cast_slice(&light_data)) {
            self.rebuild_bind_group();
        }

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Scene Encoder"),
        });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.renderer.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.renderer.bind_group, &[]);

            for (slot, pass) in self.passes.iter().enumerate() {
                let Some(pipeline) = self.renderer.lighting_pipeline(pass.blend, pass.depth_test) else {
                    continue;
                };
                rpass.set_pipeline(pipeline);

                for (object_index, mesh) in self.draws.iter().enumerate() {
                    let Some(mesh) = self.renderer.meshes.get(mesh.0 as usize) else {
                        warn!("object {object_index} refers to unknown mesh {mesh:?}");
                        continue;
                    };
                    let push_constants = PushConstants {
                        object_index: object_index as u32,
                        light_index: slot as u32,
                    };
                    rpass.set_push_constants(
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                        0,
                        bytemuck::bytes_of(&push_constants),
                    );
                    rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                    rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint16);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }

            if self.line_vertex_count > 0 {
                rpass.set_pipeline(&self.renderer.line_pipeline);
                rpass.set_vertex_buffer(0, self.renderer.line_buffer.buffer.slice(..));
                rpass.draw(0..self.line_vertex_count, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
    }
}

impl RenderFrame<'_> {
    fn rebuild_bind_group(&mut self) {
        let renderer = &mut *self.renderer;
        renderer.bind_group = SceneRenderer::make_bind_group(
            self.device,
            &renderer.bind_group_layout,
            &renderer.scene_buffer,
            &renderer.object_buffer,
            &renderer.light_buffer,
        );
    }
}
