use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::error::RenderError;
use crate::types::ShaderCompiler;

/// Compiles the built-in vertex stage that spans the rectangle (-1,-1)..(1,1).
pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
    compiler: ShaderCompiler,
) -> Result<wgpu::ShaderModule, RenderError> {
    create_module(
        device,
        "fullscreen rect vertex",
        Cow::Borrowed(VERTEX_SHADER_GLSL),
        ShaderStage::Vertex,
        compiler,
    )
}

/// Wraps the legacy fragment payload and compiles it with `compiler`.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    source: &str,
    compiler: ShaderCompiler,
) -> Result<wgpu::ShaderModule, RenderError> {
    let wrapped = wrap_legacy_fragment(source);
    tracing::trace!(bytes = wrapped.len(), %compiler, "compiling wrapped fragment shader");
    create_module(
        device,
        "raytunnel fragment",
        Cow::Owned(wrapped),
        ShaderStage::Fragment,
        compiler,
    )
}

fn create_module(
    device: &wgpu::Device,
    label: &str,
    glsl: Cow<'_, str>,
    stage: ShaderStage,
    compiler: ShaderCompiler,
) -> Result<wgpu::ShaderModule, RenderError> {
    let source = match compiler {
        ShaderCompiler::NagaGlsl => wgpu::ShaderSource::Glsl {
            shader: glsl,
            stage,
            defines: &[],
        },
        ShaderCompiler::Shaderc => {
            wgpu::ShaderSource::SpirV(Cow::Owned(spirv_from_glsl(&glsl, stage, label)?))
        }
    };
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source,
    }))
}

#[cfg(feature = "shaderc")]
fn spirv_from_glsl(glsl: &str, stage: ShaderStage, label: &str) -> Result<Vec<u32>, RenderError> {
    let kind = match stage {
        ShaderStage::Vertex => shaderc::ShaderKind::Vertex,
        ShaderStage::Fragment => shaderc::ShaderKind::Fragment,
        other => {
            return Err(RenderError::ShaderCompile(format!(
                "unsupported shader stage {other:?}"
            )))
        }
    };
    let compiler = shaderc::Compiler::new().map_err(shaderc_init_error)?;
    let artifact = compiler
        .compile_into_spirv(glsl, kind, label, "main", None)
        .map_err(|err| RenderError::ShaderCompile(err.to_string()))?;
    if artifact.get_num_warnings() > 0 {
        tracing::debug!(
            warnings = %artifact.get_warning_messages(),
            "shaderc reported warnings"
        );
    }
    Ok(artifact.as_binary().to_vec())
}

#[cfg(feature = "shaderc")]
fn shaderc_init_error(err: shaderc::Error) -> RenderError {
    RenderError::ShaderCompile(format!("failed to initialise shaderc: {err}"))
}

#[cfg(not(feature = "shaderc"))]
fn spirv_from_glsl(
    _glsl: &str,
    _stage: ShaderStage,
    _label: &str,
) -> Result<Vec<u32>, RenderError> {
    Err(RenderError::MissingCapability("shaderc".into()))
}

/// Produces a self-contained GLSL 450 fragment shader from the legacy payload.
///
/// The payload is inserted byte for byte between [`HEADER`] and [`FOOTER`]:
///
/// 1. `HEADER` declares the uniform block and output, and aliases
///    `gl_Color`, `gl_FragColor`, `gl_FragCoord` and `main` with macros.
/// 2. `FOOTER` drops the aliases, rebuilds a bottom-left `gl_FragCoord`, and
///    calls the payload's renamed `main`.
pub(crate) fn wrap_legacy_fragment(source: &str) -> String {
    format!("{HEADER}#line 1\n{source}\n{FOOTER}")
}

/// Block layout must match [`FrameUniforms`](crate::gpu::uniforms::FrameUniforms).
const HEADER: &str = r"#version 450
layout(location = 0) out vec4 raytunnel_frag_color;

layout(std140, set = 0, binding = 0) uniform FrameParams {
    vec4 _color;
    vec4 _surface;
} raytunnel_frame;

#define gl_Color raytunnel_frame._color
#define gl_FragColor raytunnel_frag_color

vec4 raytunnel_frag_coord;
#define gl_FragCoord raytunnel_frag_coord
#define main raytunnel_payload_main
";

const FOOTER: &str = r"#undef main
#undef gl_FragCoord
void main() {
    // Flip to the bottom-left origin the payload was written against.
    raytunnel_frag_coord = vec4(
        gl_FragCoord.x,
        raytunnel_frame._surface.y - gl_FragCoord.y,
        gl_FragCoord.z,
        gl_FragCoord.w
    );
    raytunnel_payload_main();
}
";

/// Four corners of the normalized device range, drawn as a triangle strip.
const VERTEX_SHADER_GLSL: &str = r"#version 450

const vec2 corners[4] = vec2[4](
    vec2(-1.0, -1.0),
    vec2(1.0, -1.0),
    vec2(-1.0, 1.0),
    vec2(1.0, 1.0)
);

void main() {
    gl_Position = vec4(corners[gl_VertexIndex], 0.0, 1.0);
}
";
