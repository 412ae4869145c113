use super::{CanonicalField, ProgramDesc};

/// Full-screen fog gradient.  No vertex buffer: the vertex stage derives a
/// single clip-space triangle from the vertex index alone; its intersection
/// with the viewport covers the whole screen.  The output alpha is the fog
/// color's own alpha.
pub static BACKGROUND: ProgramDesc = ProgramDesc {
    name: "background",
    imports: &["Fog"],
    locals: &[],
    vertex_provides: &[CanonicalField::ScreenT],
    fragment_requires: &[CanonicalField::ScreenT],
    vertex_source: VERTEX,
    fragment_source: FRAGMENT,
};

/// Clip-space corners of the full-screen triangle, indexed by vertex index.
/// Mirrors the lookup table in the vertex stage.
pub const FULLSCREEN_TRIANGLE: [[f32; 2]; 3] = [[-1.0, -1.0], [3.0, -1.0], [-1.0, 3.0]];

/// Depth at which the background samples the fog function; far enough that
/// the gradient color passes through at full strength.
pub const BACKGROUND_DEPTH: f32 = 10000.0;

const VERTEX: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) screen_t: f32,
}

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    let corner = corners[index];

    var output: VertexOutput;
    output.clip_position = vec4<f32>(corner, 0.0, 1.0);
    output.screen_t = corner.y * 0.5 + 0.5;
    return output;
}
"#;

const FRAGMENT: &str = r#"
@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let fog = fog_sample(input.screen_t, 10000.0, u_fog);
    return fog.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
        (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
    }

    #[test]
    fn triangle_covers_the_full_viewport() {
        let [a, b, c] = FULLSCREEN_TRIANGLE;
        for corner in [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]] {
            assert!(edge(a, b, corner) >= 0.0);
            assert!(edge(b, c, corner) >= 0.0);
            assert!(edge(c, a, corner) >= 0.0);
        }
    }

    #[test]
    fn screen_t_spans_the_viewport_vertically() {
        // t is linear in clip y; the viewport edges y = -1 and y = 1 map to
        // the gradient endpoints
        let t = |y: f32| y * 0.5 + 0.5;
        assert_eq!(t(-1.0), 0.0);
        assert_eq!(t(1.0), 1.0);
        // lookup-table corners reproduce the same line
        assert_eq!(t(FULLSCREEN_TRIANGLE[0][1]), 0.0);
        assert_eq!(t(FULLSCREEN_TRIANGLE[2][1]), 2.0);
    }

    #[test]
    fn background_imports_only_fog() {
        assert_eq!(BACKGROUND.imports, ["Fog"]);
        assert!(BACKGROUND.locals.is_empty());
        // the stage source samples at the advertised depth
        assert!(BACKGROUND
            .fragment_source
            .contains(&format!("{BACKGROUND_DEPTH:.1}")));
    }
}
