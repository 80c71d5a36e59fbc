//! WGSL for the 2D renderer.
//!
//! Positions arrive in logical surface pixels (origin top-left, y down) and
//! are mapped to clip space with the viewport size from the uniforms.

pub const SHADER_SOURCE: &str = r#"
struct Uniforms {
    viewport: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

fn to_clip(p: vec2<f32>) -> vec4<f32> {
    let ndc = p / uniforms.viewport * 2.0 - vec2<f32>(1.0, 1.0);
    return vec4<f32>(ndc.x, -ndc.y, 0.0, 1.0);
}

struct CircleOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) local: vec2<f32>,
    @location(2) radius: f32,
};

@vertex
fn vs_circle(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) center: vec2<f32>,
    @location(1) radius: f32,
    @location(2) color: vec4<f32>,
) -> CircleOut {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    // One extra pixel around the disc for the anti-aliased rim.
    let local = quad_vertices[vertex_index] * (radius + 1.0);

    var out: CircleOut;
    out.clip_position = to_clip(center + local);
    out.color = color;
    out.local = local;
    out.radius = radius;
    return out;
}

@fragment
fn fs_circle(in: CircleOut) -> @location(0) vec4<f32> {
    let coverage = clamp(in.radius + 0.5 - length(in.local), 0.0, 1.0);
    if coverage <= 0.0 {
        discard;
    }
    return vec4<f32>(in.color.rgb, in.color.a * coverage);
}

struct MeshOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_mesh(
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
) -> MeshOut {
    var out: MeshOut;
    out.clip_position = to_clip(position);
    out.color = color;
    return out;
}

@fragment
fn fs_mesh(in: MeshOut) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(module)
    }

    #[test]
    fn test_shader_validates() {
        let module = validate_wgsl(SHADER_SOURCE).unwrap();
        let entry_points: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        for name in ["vs_circle", "fs_circle", "vs_mesh", "fs_mesh"] {
            assert!(entry_points.contains(&name), "missing entry point {}", name);
        }
    }
}
