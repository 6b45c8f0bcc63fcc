//! The system preamble (§4.C.1): a curated, not exhaustive, slice of the
//! GLSL standard library expressed as GLSL source text and compiled through
//! the exact same front end as user code. Real conformance (every overload
//! of every builtin, every extension) is out of scope — this covers the
//! constructors and functions shader authors reach for constantly, plus the
//! per-stage built-in variables gated by `languageConfig.stage`.

/// Mirrors `languageConfig.stage` (§6's configuration table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    Compute,
    TessControl,
    TessEvaluation,
    RayGen,
    Intersect,
    AnyHit,
    ClosestHit,
    Miss,
    Callable,
    Task,
    Mesh,
}

impl ShaderStage {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "vertex" => Self::Vertex,
            "fragment" => Self::Fragment,
            "geometry" => Self::Geometry,
            "compute" => Self::Compute,
            "tessControl" => Self::TessControl,
            "tessEvaluation" => Self::TessEvaluation,
            "rayGen" => Self::RayGen,
            "intersect" => Self::Intersect,
            "anyHit" => Self::AnyHit,
            "closestHit" => Self::ClosestHit,
            "miss" => Self::Miss,
            "callable" => Self::Callable,
            "task" => Self::Task,
            "mesh" => Self::Mesh,
        })
    }
}

/// Scalar/vector/matrix constructors and the most commonly used builtin
/// functions, declared (not defined — bodies are irrelevant to a language
/// server) so overload resolution and hover text have something real to
/// resolve against.
const COMMON_BUILTINS: &str = r#"
float length(float x);
float length(vec2 x);
float length(vec3 x);
float length(vec4 x);

float distance(vec2 a, vec2 b);
float distance(vec3 a, vec3 b);
float distance(vec4 a, vec4 b);

float dot(float a, float b);
float dot(vec2 a, vec2 b);
float dot(vec3 a, vec3 b);
float dot(vec4 a, vec4 b);

vec3 cross(vec3 a, vec3 b);

float normalize(float x);
vec2 normalize(vec2 x);
vec3 normalize(vec3 x);
vec4 normalize(vec4 x);

vec2 reflect(vec2 i, vec2 n);
vec3 reflect(vec3 i, vec3 n);
vec4 reflect(vec4 i, vec4 n);

vec2 refract(vec2 i, vec2 n, float eta);
vec3 refract(vec3 i, vec3 n, float eta);
vec4 refract(vec4 i, vec4 n, float eta);

float pow(float x, float y);
vec2 pow(vec2 x, vec2 y);
vec3 pow(vec3 x, vec3 y);
vec4 pow(vec4 x, vec4 y);

float exp(float x);
float log(float x);
float exp2(float x);
float log2(float x);
float sqrt(float x);
float inversesqrt(float x);

float abs(float x);
int abs(int x);
vec2 abs(vec2 x);
vec3 abs(vec3 x);
vec4 abs(vec4 x);

float sign(float x);
int sign(int x);

float floor(float x);
float ceil(float x);
float fract(float x);
float round(float x);
float trunc(float x);

float mod(float x, float y);
vec2 mod(vec2 x, float y);
vec3 mod(vec3 x, float y);
vec4 mod(vec4 x, float y);

float min(float x, float y);
int min(int x, int y);
uint min(uint x, uint y);
vec2 min(vec2 x, vec2 y);
vec3 min(vec3 x, vec3 y);
vec4 min(vec4 x, vec4 y);

float max(float x, float y);
int max(int x, int y);
uint max(uint x, uint y);
vec2 max(vec2 x, vec2 y);
vec3 max(vec3 x, vec3 y);
vec4 max(vec4 x, vec4 y);

float clamp(float x, float lo, float hi);
vec2 clamp(vec2 x, vec2 lo, vec2 hi);
vec3 clamp(vec3 x, vec3 lo, vec3 hi);
vec4 clamp(vec4 x, vec4 lo, vec4 hi);

float mix(float x, float y, float a);
vec2 mix(vec2 x, vec2 y, float a);
vec3 mix(vec3 x, vec3 y, float a);
vec4 mix(vec4 x, vec4 y, float a);

float step(float edge, float x);
vec2 step(vec2 edge, vec2 x);
vec3 step(vec3 edge, vec3 x);
vec4 step(vec4 edge, vec4 x);

float smoothstep(float lo, float hi, float x);
vec2 smoothstep(vec2 lo, vec2 hi, vec2 x);
vec3 smoothstep(vec3 lo, vec3 hi, vec3 x);
vec4 smoothstep(vec4 lo, vec4 hi, vec4 x);

vec4 texture(sampler2D s, vec2 coord);
vec4 texture(sampler3D s, vec3 coord);
vec4 texture(samplerCube s, vec3 coord);

vec4 textureLod(sampler2D s, vec2 coord, float lod);
vec4 textureLod(samplerCube s, vec3 coord, float lod);

vec4 texelFetch(sampler2D s, ivec2 coord, int lod);
"#;

/// Per-stage built-in variables. Only the handful every shader of that
/// stage actually reaches for; the rest is a non-goal (this is not a
/// conformance suite, §4.C.1).
fn stage_builtins(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => {
            r#"
vec4 gl_Position;
float gl_PointSize;
int gl_VertexIndex;
int gl_InstanceIndex;
"#
        }
        ShaderStage::Fragment => {
            r#"
vec4 gl_FragColor;
vec4 gl_FragCoord;
bool gl_FrontFacing;
float gl_FragDepth;
"#
        }
        ShaderStage::Geometry => {
            r#"
vec4 gl_Position;
int gl_PrimitiveIDIn;
int gl_InvocationID;
"#
        }
        ShaderStage::Compute => {
            r#"
uvec3 gl_GlobalInvocationID;
uvec3 gl_LocalInvocationID;
uvec3 gl_WorkGroupID;
uvec3 gl_WorkGroupSize;
uvec3 gl_NumWorkGroups;
"#
        }
        ShaderStage::TessControl | ShaderStage::TessEvaluation => {
            r#"
vec4 gl_Position;
int gl_InvocationID;
int gl_PatchVerticesIn;
float gl_TessLevelOuter[4];
float gl_TessLevelInner[2];
"#
        }
        ShaderStage::RayGen
        | ShaderStage::Intersect
        | ShaderStage::AnyHit
        | ShaderStage::ClosestHit
        | ShaderStage::Miss
        | ShaderStage::Callable => {
            r#"
uvec3 gl_LaunchIDEXT;
uvec3 gl_LaunchSizeEXT;
"#
        }
        ShaderStage::Task | ShaderStage::Mesh => {
            r#"
uvec3 gl_GlobalInvocationID;
uvec3 gl_WorkGroupID;
"#
        }
    }
}

/// Builds the full preamble source for a given stage: the common builtins
/// plus that stage's built-in variables. `stage: None` compiles only the
/// common builtins, used when the client hasn't told us a stage yet.
pub fn source(stage: Option<ShaderStage>) -> String {
    let mut out = String::with_capacity(COMMON_BUILTINS.len() + 256);
    out.push_str(COMMON_BUILTINS);
    if let Some(stage) = stage {
        out.push_str(stage_builtins(stage));
    }
    out
}
