use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use quarry_render::{RenderBackend, RenderFrame};
use wgpu::util::DeviceExt;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Reversed Z: the far plane is 0.
const DEPTH_CLEAR: f32 = 0.0;
const MAX_INSTANCES: u32 = 10_000;

const SKY: wgpu::Color = wgpu::Color {
    r: 0.45,
    g: 0.58,
    b: 0.75,
    a: 1.0,
};
const VOID: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.03,
    a: 1.0,
};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    sun_dir: [f32; 4],
    sun_color: [f32; 4],
    ambient: [f32; 4],
    grid: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4]) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GridVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Unit cube, 24 vertices so every face has its own normal.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Grid lines on the y = 0 plane; the shader lifts them to ground height.
fn grid_mesh(half_extent: i32, spacing: f32) -> Vec<GridVertex> {
    let mut verts = Vec::new();
    let color = [0.35, 0.33, 0.3, 1.0];
    let extent = half_extent as f32 * spacing;

    for i in -half_extent..=half_extent {
        let offset = i as f32 * spacing;
        verts.push(GridVertex {
            position: [-extent, 0.0, offset],
            color,
        });
        verts.push(GridVertex {
            position: [extent, 0.0, offset],
            color,
        });
        verts.push(GridVertex {
            position: [offset, 0.0, -extent],
            color,
        });
        verts.push(GridVertex {
            position: [offset, 0.0, extent],
            color,
        });
    }
    verts
}

fn frame_uniforms(frame: &RenderFrame<'_>) -> Uniforms {
    let sun = &frame.scene.sun;
    let dir = sun.direction_normalized();
    let color = sun.color * sun.intensity;
    let ambient = frame.scene.ambient_light;
    Uniforms {
        view_proj: frame.camera.view_projection().to_cols_array_2d(),
        sun_dir: [dir.x, dir.y, dir.z, 0.0],
        sun_color: [color.x, color.y, color.z, 1.0],
        ambient: [ambient.x, ambient.y, ambient.z, 1.0],
        grid: [0.0, frame.snapshot.ground_height, 0.0, 0.0],
    }
}

/// One instance per body, then the sun helper when helpers are shown.
fn frame_instances(frame: &RenderFrame<'_>) -> Vec<InstanceData> {
    let mut instances: Vec<InstanceData> = frame
        .snapshot
        .bodies
        .iter()
        .take(MAX_INSTANCES as usize - 1)
        .map(|body| {
            let color = if body.is_static {
                [0.6, 0.58, 0.55, 1.0]
            } else {
                [0.2, 0.6, 1.0, 1.0]
            };
            InstanceData::new(body.model, color)
        })
        .collect();

    if frame.settings.helpers {
        let sun = frame.scene.sun.direction_normalized();
        let at = Vec3::new(0.0, frame.snapshot.ground_height, 0.0) - sun * 40.0;
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::IDENTITY,
            at,
        );
        instances.push(InstanceData::new(model, [1.0, 0.85, 0.2, 1.0]));
    }
    instances
}

struct BodyPipelines {
    depth: wgpu::RenderPipeline,
    color: wgpu::RenderPipeline,
}

struct Pipelines {
    body_fill: BodyPipelines,
    /// Present only when the device supports line polygon mode.
    body_line: Option<BodyPipelines>,
    grid_depth: wgpu::RenderPipeline,
    grid_color: wgpu::RenderPipeline,
}

fn depth_state(write: bool, compare: wgpu::CompareFunction) -> Option<wgpu::DepthStencilState> {
    Some(wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: Default::default(),
        bias: Default::default(),
    })
}

fn build_pipelines(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    line_mode: bool,
) -> Pipelines {
    let body_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("body_shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::body_shader().into()),
    });
    let grid_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("grid_shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::grid_shader().into()),
    });

    let body_buffers = [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
            ],
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![
                2 => Float32x4,
                3 => Float32x4,
                4 => Float32x4,
                5 => Float32x4,
                6 => Float32x4,
            ],
        },
    ];
    let grid_buffers = [wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<GridVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x4,
        ],
    }];
    let color_targets = [Some(wgpu::ColorTargetState {
        format: surface_format,
        blend: Some(wgpu::BlendState::REPLACE),
        write_mask: wgpu::ColorWrites::ALL,
    })];

    // Depth-only when `fragment` is None. Both passes share the vertex entry
    // point so `Equal` sees bit-identical depth.
    let pipeline = |label: &str,
                    module: &wgpu::ShaderModule,
                    vs: &str,
                    fs: Option<&str>,
                    buffers: &[wgpu::VertexBufferLayout<'_>],
                    primitive: wgpu::PrimitiveState| {
        let depth_only = fs.is_none();
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some(vs),
                compilation_options: Default::default(),
                buffers,
            },
            fragment: fs.map(|fs| wgpu::FragmentState {
                module,
                entry_point: Some(fs),
                compilation_options: Default::default(),
                targets: &color_targets,
            }),
            primitive,
            depth_stencil: if depth_only {
                depth_state(true, wgpu::CompareFunction::Greater)
            } else {
                depth_state(false, wgpu::CompareFunction::Equal)
            },
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    };

    let triangles = |mode: wgpu::PolygonMode| wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        cull_mode: Some(wgpu::Face::Back),
        polygon_mode: mode,
        ..Default::default()
    };
    let lines = wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::LineList,
        ..Default::default()
    };

    let body_set = |mode: wgpu::PolygonMode, tag: &str| BodyPipelines {
        depth: pipeline(
            &format!("body_depth_{tag}"),
            &body_shader,
            "vs_main",
            None,
            &body_buffers,
            triangles(mode),
        ),
        color: pipeline(
            &format!("body_color_{tag}"),
            &body_shader,
            "vs_main",
            Some("fs_main"),
            &body_buffers,
            triangles(mode),
        ),
    };

    Pipelines {
        body_fill: body_set(wgpu::PolygonMode::Fill, "fill"),
        body_line: line_mode.then(|| body_set(wgpu::PolygonMode::Line, "line")),
        grid_depth: pipeline("grid_depth", &grid_shader, "vs_grid", None, &grid_buffers, lines),
        grid_color: pipeline(
            "grid_color",
            &grid_shader,
            "vs_grid",
            Some("fs_grid"),
            &grid_buffers,
            lines,
        ),
    }
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
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
    texture.create_view(&Default::default())
}

/// GPU resources that live across frames.
pub struct WgpuRenderer {
    layout: wgpu::PipelineLayout,
    pipelines: Pipelines,
    line_mode: bool,
    warned_no_wireframe: bool,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    grid_vertex_buffer: wgpu::Buffer,
    grid_vertex_count: u32,
    instance_buffer: wgpu::Buffer,
    depth_view: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let line_mode = device.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        let pipelines = build_pipelines(device, &layout, surface_format, line_mode);

        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let grid_verts = grid_mesh(100, 2.0);
        let grid_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_vertex_buffer"),
            contents: bytemuck::cast_slice(&grid_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: u64::from(MAX_INSTANCES) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        tracing::info!(?surface_format, line_mode, "wgpu renderer ready");
        Self {
            layout,
            pipelines,
            line_mode,
            warned_no_wireframe: false,
            uniform_buffer,
            uniform_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count: cube_indices.len() as u32,
            grid_vertex_buffer,
            grid_vertex_count: grid_verts.len() as u32,
            instance_buffer,
            depth_view: create_depth_texture(device, width, height),
            surface_format,
        }
    }

    /// Features the renderer can use if the adapter offers them.
    pub fn optional_features() -> wgpu::Features {
        wgpu::Features::POLYGON_MODE_LINE
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Start recording a frame into `target`. The returned frame implements
    /// [`RenderBackend`]; its `composite` stage submits the work.
    pub fn begin_frame<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        target: &'a wgpu::TextureView,
    ) -> WgpuFrame<'a> {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        WgpuFrame {
            renderer: self,
            device,
            queue,
            target,
            encoder: Some(encoder),
            instance_count: 0,
        }
    }

    fn check_wireframe(&mut self, wireframe: bool) {
        if wireframe && self.pipelines.body_line.is_none() && !self.warned_no_wireframe {
            tracing::warn!("wireframe unsupported on this device, drawing filled");
            self.warned_no_wireframe = true;
        }
    }

    fn body_pipelines(&self, wireframe: bool) -> &BodyPipelines {
        match (&self.pipelines.body_line, wireframe) {
            (Some(line), true) => line,
            _ => &self.pipelines.body_fill,
        }
    }
}

/// One frame being recorded.
pub struct WgpuFrame<'a> {
    renderer: &'a mut WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    target: &'a wgpu::TextureView,
    encoder: Option<wgpu::CommandEncoder>,
    instance_count: u32,
}

impl WgpuFrame<'_> {
    /// Submit whatever has been recorded. Idempotent.
    pub fn submit(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
    }
}

impl RenderBackend for WgpuFrame<'_> {
    fn reload_shaders(&mut self) {
        let r = &mut *self.renderer;
        r.pipelines = build_pipelines(self.device, &r.layout, r.surface_format, r.line_mode);
        tracing::info!("shaders rebuilt");
    }

    fn ui_2d(&mut self, _frame: &RenderFrame<'_>) {}

    fn shadow_maps(&mut self, _frame: &RenderFrame<'_>) {}

    fn depth_prepass(&mut self, frame: &RenderFrame<'_>) {
        let Some(encoder) = self.encoder.as_mut() else {
            return;
        };
        self.renderer.check_wireframe(frame.settings.wireframe);
        let r = &*self.renderer;

        self.queue
            .write_buffer(&r.uniform_buffer, 0, bytemuck::bytes_of(&frame_uniforms(frame)));
        let instances = frame_instances(frame);
        if !instances.is_empty() {
            self.queue
                .write_buffer(&r.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.instance_count = instances.len() as u32;

        let body = r.body_pipelines(frame.settings.wireframe);
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("depth_prepass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &r.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(DEPTH_CLEAR),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        pass.set_bind_group(0, &r.uniform_bind_group, &[]);

        pass.set_pipeline(&r.pipelines.grid_depth);
        pass.set_vertex_buffer(0, r.grid_vertex_buffer.slice(..));
        pass.draw(0..r.grid_vertex_count, 0..1);

        if self.instance_count > 0 {
            pass.set_pipeline(&body.depth);
            pass.set_vertex_buffer(0, r.cube_vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, r.instance_buffer.slice(..));
            pass.set_index_buffer(r.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..r.cube_index_count, 0, 0..self.instance_count);
        }
    }

    fn forward(&mut self, frame: &RenderFrame<'_>) {
        let Some(encoder) = self.encoder.as_mut() else {
            return;
        };
        let r = &*self.renderer;
        // The skybox is hidden in wireframe.
        let clear = if frame.settings.wireframe { VOID } else { SKY };

        let body = r.body_pipelines(frame.settings.wireframe);
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("forward"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &r.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        pass.set_bind_group(0, &r.uniform_bind_group, &[]);

        pass.set_pipeline(&r.pipelines.grid_color);
        pass.set_vertex_buffer(0, r.grid_vertex_buffer.slice(..));
        pass.draw(0..r.grid_vertex_count, 0..1);

        if self.instance_count > 0 {
            pass.set_pipeline(&body.color);
            pass.set_vertex_buffer(0, r.cube_vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, r.instance_buffer.slice(..));
            pass.set_index_buffer(r.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..r.cube_index_count, 0, 0..self.instance_count);
        }
    }

    fn ssao(&mut self, _frame: &RenderFrame<'_>) {}

    fn bloom(&mut self, _frame: &RenderFrame<'_>) {}

    fn composite(&mut self, _frame: &RenderFrame<'_>) {
        self.submit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use quarry_common::BodyId;
    use quarry_render::{BodyInstance, FlyCamera, FrameSnapshot, RenderSettings};
    use quarry_scene::SceneDescription;

    fn snapshot() -> FrameSnapshot {
        FrameSnapshot {
            tick: 3,
            sim_time: 0.1,
            ground_height: 30.0,
            bodies: vec![
                BodyInstance {
                    id: BodyId::new(),
                    model: Mat4::from_translation(Vec3::new(1.0, 31.0, 0.0)),
                    is_static: false,
                },
                BodyInstance {
                    id: BodyId::new(),
                    model: Mat4::from_translation(Vec3::new(0.0, 32.0, 0.0)),
                    is_static: true,
                },
            ],
        }
    }

    #[test]
    fn meshes() {
        let (verts, indices) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < verts.len()));
        assert_eq!(grid_mesh(2, 1.0).len(), 5 * 4);
    }

    #[test]
    fn uniform_layout_matches_shader() {
        // mat4 + four vec4
        assert_eq!(std::mem::size_of::<Uniforms>(), 64 + 4 * 16);
    }

    fn frame<'a>(
        camera: &'a FlyCamera,
        scene: &'a SceneDescription,
        snapshot: &'a FrameSnapshot,
        settings: &'a RenderSettings,
    ) -> RenderFrame<'a> {
        RenderFrame {
            camera,
            scene,
            snapshot,
            settings,
            overlay: &[],
        }
    }

    #[test]
    fn instances_follow_helpers_toggle() {
        let camera = FlyCamera::default();
        let scene = SceneDescription::default();
        let snap = snapshot();
        let mut settings = RenderSettings::default();

        let with_helper = frame_instances(&frame(&camera, &scene, &snap, &settings));
        assert_eq!(with_helper.len(), 3);
        assert_eq!(with_helper[0].model_3, [1.0, 31.0, 0.0, 1.0]);
        assert_ne!(with_helper[0].color, with_helper[1].color);

        settings.toggle_helpers();
        assert_eq!(
            frame_instances(&frame(&camera, &scene, &snap, &settings)).len(),
            2
        );
    }

    #[test]
    fn uniforms_carry_sun_and_ground() {
        let camera = FlyCamera::default();
        let scene = SceneDescription::default();
        let snap = snapshot();
        let settings = RenderSettings::default();
        let u = frame_uniforms(&frame(&camera, &scene, &snap, &settings));
        assert_eq!(u.grid[1], 30.0);
        let dir = Vec3::new(u.sun_dir[0], u.sun_dir[1], u.sun_dir[2]);
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!((u.ambient[0] - 0.1).abs() < 1e-6);
    }
}
