use std::fmt;
use std::num::NonZeroU32;

use crate::error::RenderError;

/// Milliseconds granted per configured runtime second before the loop times out.
///
/// Deliberately 64 000 rather than 60 000: it keeps `elapsed / runtime_seconds`
/// inside the 16-bit color channel for the whole run.
pub const TIMEOUT_MILLIS_PER_SECOND: u64 = 64_000;

/// Runtime used by the shipped intro.
pub const DEFAULT_RUNTIME_SECONDS: u32 = 3;

/// Viewport the embedded shader hardcodes. The host never rescales to it.
pub const SHADER_VIEWPORT: (u32, u32) = (1366, 768);

/// Virtual key code polled by the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const ESCAPE: KeyCode = KeyCode(27);
}

/// Stage token understood by the compile/link service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderStage(pub u32);

impl ShaderStage {
    /// Fragment stage (`GL_FRAGMENT_SHADER`).
    pub const FRAGMENT: ShaderStage = ShaderStage(0x8B30);
}

/// Pixel-format flag bits carried in the second word of a [`FormatDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatFlags(u32);

impl FormatFlags {
    pub const DOUBLE_BUFFER: FormatFlags = FormatFlags(0x01);
    pub const DRAW_TO_WINDOW: FormatFlags = FormatFlags(0x04);
    pub const SUPPORT_ACCELERATION: FormatFlags = FormatFlags(0x20);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: FormatFlags) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: FormatFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for FormatFlags {
    type Output = FormatFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Desired surface attributes, kept as the two-word record the intro has
/// always used: a header word and the flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub header: u32,
    pub flags: FormatFlags,
}

impl FormatDescriptor {
    /// Draw-to-window, accelerated, double-buffered (`{0, 37}`).
    pub const INTRO: FormatDescriptor = FormatDescriptor {
        header: 0,
        flags: FormatFlags::DRAW_TO_WINDOW
            .union(FormatFlags::SUPPORT_ACCELERATION)
            .union(FormatFlags::DOUBLE_BUFFER),
    };

    pub fn double_buffered(&self) -> bool {
        self.flags.contains(FormatFlags::DOUBLE_BUFFER)
    }

    pub fn draws_to_window(&self) -> bool {
        self.flags.contains(FormatFlags::DRAW_TO_WINDOW)
    }
}

impl Default for FormatDescriptor {
    fn default() -> Self {
        Self::INTRO
    }
}

/// Surface format chosen during negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatId(pub u32);

/// Rendering context created by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextId(pub u32);

/// Linked shader program. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramId(NonZeroU32);

impl ProgramId {
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Shader compilation backend requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderCompiler {
    /// Compile the wrapped GLSL through shaderc into SPIR-V.
    Shaderc,
    /// Hand GLSL to naga's built-in frontend.
    NagaGlsl,
}

impl ShaderCompiler {
    /// Whether this build links the compiler in.
    pub fn available(self) -> bool {
        match self {
            ShaderCompiler::Shaderc => cfg!(feature = "shaderc"),
            ShaderCompiler::NagaGlsl => true,
        }
    }
}

impl Default for ShaderCompiler {
    fn default() -> Self {
        if cfg!(feature = "shaderc") && !cfg!(feature = "naga-glsl") {
            ShaderCompiler::Shaderc
        } else {
            ShaderCompiler::NagaGlsl
        }
    }
}

impl fmt::Display for ShaderCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderCompiler::Shaderc => f.write_str("shaderc"),
            ShaderCompiler::NagaGlsl => f.write_str("naga"),
        }
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// There are no flags or config files; the binary always runs
/// `DemoConfig::default()`. Tests build their own values.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Nominal runtime. The loop times out after `runtime_seconds * 64000` ms.
    pub runtime_seconds: u32,
    /// Key that ends the run early.
    pub exit_key: KeyCode,
    /// Where the pointer is parked before the first frame.
    pub cursor_origin: (i32, i32),
    /// Attributes requested from the surface.
    pub format: FormatDescriptor,
    /// Title given to the fullscreen window (visible in task switchers only).
    pub window_title: String,
    /// Shader compiler used for the embedded fragment program.
    pub shader_compiler: ShaderCompiler,
}

impl DemoConfig {
    /// Rejects values the render loop cannot evaluate.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.runtime_seconds == 0 {
            return Err(RenderError::InvalidConfig(
                "runtime_seconds must be at least 1".into(),
            ));
        }
        // Green and blue carry the runtime as unsigned 16-bit channels.
        if self.runtime_seconds > u32::from(u16::MAX) {
            return Err(RenderError::InvalidConfig(format!(
                "runtime_seconds must not exceed {}",
                u16::MAX
            )));
        }
        Ok(())
    }

    /// Elapsed milliseconds after which the loop stops.
    pub fn timeout_millis(&self) -> u64 {
        u64::from(self.runtime_seconds) * TIMEOUT_MILLIS_PER_SECOND
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            runtime_seconds: DEFAULT_RUNTIME_SECONDS,
            exit_key: KeyCode::ESCAPE,
            cursor_origin: (0, 0),
            format: FormatDescriptor::INTRO,
            window_title: "raytunnel".to_string(),
            shader_compiler: ShaderCompiler::default(),
        }
    }
}
