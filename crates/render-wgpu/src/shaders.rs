/// Uniform block shared by both shaders. Must match `gpu::Uniforms`.
const UNIFORMS: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    // xyz: direction the light travels
    sun_dir: vec4<f32>,
    // rgb: colour times intensity
    sun_color: vec4<f32>,
    ambient: vec4<f32>,
    // y: ground height
    grid: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
"#;

const BODY_SRC: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let to_sun = -normalize(uniforms.sun_dir.xyz);
    let diffuse = max(dot(in.world_normal, to_sun), 0.0);
    let light = uniforms.ambient.rgb + uniforms.sun_color.rgb * diffuse;
    return vec4<f32>(in.color.rgb * light, in.color.a);
}
"#;

const GRID_SRC: &str = r#"
struct GridVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct GridOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_grid(vertex: GridVertex) -> GridOutput {
    var out: GridOutput;
    let pos = vertex.position + vec3<f32>(0.0, uniforms.grid.y, 0.0);
    out.clip_position = uniforms.view_proj * vec4<f32>(pos, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_grid(in: GridOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Lit instanced boxes. `vs_main` alone serves the depth pre-pass.
pub fn body_shader() -> String {
    format!("{UNIFORMS}{BODY_SRC}")
}

/// Ground grid lines. `vs_grid` alone serves the depth pre-pass.
pub fn grid_shader() -> String {
    format!("{UNIFORMS}{GRID_SRC}")
}
