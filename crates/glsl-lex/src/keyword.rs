//! Table-driven keyword classification for tokenized identifiers.

/// GLSL reserved words the tokenizer recognizes. Not an exhaustive list of
/// every sampler/image permutation in the spec — broad enough to parse and
/// type-check real shaders without claiming glslangValidator conformance
/// (explicitly a non-goal, see spec.md §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Statement keywords.
    If,
    Else,
    Switch,
    Case,
    Default,
    While,
    Do,
    For,
    Continue,
    Break,
    Return,
    Discard,
    Struct,
    True,
    False,

    // Storage / parameter qualifiers.
    Const,
    In,
    Out,
    Inout,
    Uniform,
    Buffer,
    Shared,
    Attribute,
    Varying,

    // Auxiliary / interpolation / memory qualifiers.
    Centroid,
    Sample,
    Patch,
    Flat,
    Smooth,
    Noperspective,
    Invariant,
    Precise,
    Coherent,
    Volatile,
    Restrict,
    Readonly,
    Writeonly,

    // Precision qualifiers.
    Highp,
    Mediump,
    Lowp,
    Precision,
    Layout,
    Subroutine,

    // Scalar types.
    Void,
    Bool,
    Int,
    Uint,
    Float,
    Double,

    // Vector types.
    Vec2,
    Vec3,
    Vec4,
    Ivec2,
    Ivec3,
    Ivec4,
    Uvec2,
    Uvec3,
    Uvec4,
    Bvec2,
    Bvec3,
    Bvec4,
    Dvec2,
    Dvec3,
    Dvec4,

    // Matrix types.
    Mat2,
    Mat3,
    Mat4,
    Mat2x3,
    Mat2x4,
    Mat3x2,
    Mat3x4,
    Mat4x2,
    Mat4x3,
    Dmat2,
    Dmat3,
    Dmat4,

    // Sampler / image / texture / subpass types.
    Sampler1D,
    Sampler2D,
    Sampler3D,
    SamplerCube,
    Sampler2DArray,
    SamplerCubeArray,
    Sampler2DShadow,
    SamplerCubeShadow,
    Isampler2D,
    Usampler2D,
    Sampler2DMS,
    Image1D,
    Image2D,
    Image3D,
    ImageCube,
    Image2DArray,
    SubpassInput,
    SubpassInputMS,
}

impl Keyword {
    /// True for scalar/vector/matrix/sampler/image type keywords, i.e. the
    /// set that can start a type specifier or a constructor-call expression.
    pub fn is_type_name(self) -> bool {
        use Keyword::*;
        matches!(
            self,
            Void | Bool
                | Int
                | Uint
                | Float
                | Double
                | Vec2
                | Vec3
                | Vec4
                | Ivec2
                | Ivec3
                | Ivec4
                | Uvec2
                | Uvec3
                | Uvec4
                | Bvec2
                | Bvec3
                | Bvec4
                | Dvec2
                | Dvec3
                | Dvec4
                | Mat2
                | Mat3
                | Mat4
                | Mat2x3
                | Mat2x4
                | Mat3x2
                | Mat3x4
                | Mat4x2
                | Mat4x3
                | Dmat2
                | Dmat3
                | Dmat4
                | Sampler1D
                | Sampler2D
                | Sampler3D
                | SamplerCube
                | Sampler2DArray
                | SamplerCubeArray
                | Sampler2DShadow
                | SamplerCubeShadow
                | Isampler2D
                | Usampler2D
                | Sampler2DMS
                | Image1D
                | Image2D
                | Image3D
                | ImageCube
                | Image2DArray
                | SubpassInput
                | SubpassInputMS
        )
    }

    pub fn is_qualifier(self) -> bool {
        use Keyword::*;
        matches!(
            self,
            Const
                | In
                | Out
                | Inout
                | Uniform
                | Buffer
                | Shared
                | Attribute
                | Varying
                | Centroid
                | Sample
                | Patch
                | Flat
                | Smooth
                | Noperspective
                | Invariant
                | Precise
                | Coherent
                | Volatile
                | Restrict
                | Readonly
                | Writeonly
                | Highp
                | Mediump
                | Lowp
                | Precision
                | Layout
                | Subroutine
        )
    }

    pub fn text(self) -> &'static str {
        use Keyword::*;
        match self {
            If => "if",
            Else => "else",
            Switch => "switch",
            Case => "case",
            Default => "default",
            While => "while",
            Do => "do",
            For => "for",
            Continue => "continue",
            Break => "break",
            Return => "return",
            Discard => "discard",
            Struct => "struct",
            True => "true",
            False => "false",
            Const => "const",
            In => "in",
            Out => "out",
            Inout => "inout",
            Uniform => "uniform",
            Buffer => "buffer",
            Shared => "shared",
            Attribute => "attribute",
            Varying => "varying",
            Centroid => "centroid",
            Sample => "sample",
            Patch => "patch",
            Flat => "flat",
            Smooth => "smooth",
            Noperspective => "noperspective",
            Invariant => "invariant",
            Precise => "precise",
            Coherent => "coherent",
            Volatile => "volatile",
            Restrict => "restrict",
            Readonly => "readonly",
            Writeonly => "writeonly",
            Highp => "highp",
            Mediump => "mediump",
            Lowp => "lowp",
            Precision => "precision",
            Layout => "layout",
            Subroutine => "subroutine",
            Void => "void",
            Bool => "bool",
            Int => "int",
            Uint => "uint",
            Float => "float",
            Double => "double",
            Vec2 => "vec2",
            Vec3 => "vec3",
            Vec4 => "vec4",
            Ivec2 => "ivec2",
            Ivec3 => "ivec3",
            Ivec4 => "ivec4",
            Uvec2 => "uvec2",
            Uvec3 => "uvec3",
            Uvec4 => "uvec4",
            Bvec2 => "bvec2",
            Bvec3 => "bvec3",
            Bvec4 => "bvec4",
            Dvec2 => "dvec2",
            Dvec3 => "dvec3",
            Dvec4 => "dvec4",
            Mat2 => "mat2",
            Mat3 => "mat3",
            Mat4 => "mat4",
            Mat2x3 => "mat2x3",
            Mat2x4 => "mat2x4",
            Mat3x2 => "mat3x2",
            Mat3x4 => "mat3x4",
            Mat4x2 => "mat4x2",
            Mat4x3 => "mat4x3",
            Dmat2 => "dmat2",
            Dmat3 => "dmat3",
            Dmat4 => "dmat4",
            Sampler1D => "sampler1D",
            Sampler2D => "sampler2D",
            Sampler3D => "sampler3D",
            SamplerCube => "samplerCube",
            Sampler2DArray => "sampler2DArray",
            SamplerCubeArray => "samplerCubeArray",
            Sampler2DShadow => "sampler2DShadow",
            SamplerCubeShadow => "samplerCubeShadow",
            Isampler2D => "isampler2D",
            Usampler2D => "usampler2D",
            Sampler2DMS => "sampler2DMS",
            Image1D => "image1D",
            Image2D => "image2D",
            Image3D => "image3D",
            ImageCube => "imageCube",
            Image2DArray => "image2DArray",
            SubpassInput => "subpassInput",
            SubpassInputMS => "subpassInputMS",
        }
    }
}

/// Every reserved word, in declaration order above — completion's
/// "emit all GLSL keywords" item source (§4.I) walks this instead of
/// re-deriving it from `lookup`'s string table.
pub const ALL: &[Keyword] = &[
    Keyword::If,
    Keyword::Else,
    Keyword::Switch,
    Keyword::Case,
    Keyword::Default,
    Keyword::While,
    Keyword::Do,
    Keyword::For,
    Keyword::Continue,
    Keyword::Break,
    Keyword::Return,
    Keyword::Discard,
    Keyword::Struct,
    Keyword::True,
    Keyword::False,
    Keyword::Const,
    Keyword::In,
    Keyword::Out,
    Keyword::Inout,
    Keyword::Uniform,
    Keyword::Buffer,
    Keyword::Shared,
    Keyword::Attribute,
    Keyword::Varying,
    Keyword::Centroid,
    Keyword::Sample,
    Keyword::Patch,
    Keyword::Flat,
    Keyword::Smooth,
    Keyword::Noperspective,
    Keyword::Invariant,
    Keyword::Precise,
    Keyword::Coherent,
    Keyword::Volatile,
    Keyword::Restrict,
    Keyword::Readonly,
    Keyword::Writeonly,
    Keyword::Highp,
    Keyword::Mediump,
    Keyword::Lowp,
    Keyword::Precision,
    Keyword::Layout,
    Keyword::Subroutine,
    Keyword::Void,
    Keyword::Bool,
    Keyword::Int,
    Keyword::Uint,
    Keyword::Float,
    Keyword::Double,
    Keyword::Vec2,
    Keyword::Vec3,
    Keyword::Vec4,
    Keyword::Ivec2,
    Keyword::Ivec3,
    Keyword::Ivec4,
    Keyword::Uvec2,
    Keyword::Uvec3,
    Keyword::Uvec4,
    Keyword::Bvec2,
    Keyword::Bvec3,
    Keyword::Bvec4,
    Keyword::Dvec2,
    Keyword::Dvec3,
    Keyword::Dvec4,
    Keyword::Mat2,
    Keyword::Mat3,
    Keyword::Mat4,
    Keyword::Mat2x3,
    Keyword::Mat2x4,
    Keyword::Mat3x2,
    Keyword::Mat3x4,
    Keyword::Mat4x2,
    Keyword::Mat4x3,
    Keyword::Dmat2,
    Keyword::Dmat3,
    Keyword::Dmat4,
    Keyword::Sampler1D,
    Keyword::Sampler2D,
    Keyword::Sampler3D,
    Keyword::SamplerCube,
    Keyword::Sampler2DArray,
    Keyword::SamplerCubeArray,
    Keyword::Sampler2DShadow,
    Keyword::SamplerCubeShadow,
    Keyword::Isampler2D,
    Keyword::Usampler2D,
    Keyword::Sampler2DMS,
    Keyword::Image1D,
    Keyword::Image2D,
    Keyword::Image3D,
    Keyword::ImageCube,
    Keyword::Image2DArray,
    Keyword::SubpassInput,
    Keyword::SubpassInputMS,
];

/// Table-driven lookup: classify an already-tokenized identifier as a
/// keyword, or report it is an ordinary identifier.
pub fn lookup(ident: &str) -> Option<Keyword> {
    use Keyword::*;
    Some(match ident {
        "if" => If,
        "else" => Else,
        "switch" => Switch,
        "case" => Case,
        "default" => Default,
        "while" => While,
        "do" => Do,
        "for" => For,
        "continue" => Continue,
        "break" => Break,
        "return" => Return,
        "discard" => Discard,
        "struct" => Struct,
        "true" => True,
        "false" => False,
        "const" => Const,
        "in" => In,
        "out" => Out,
        "inout" => Inout,
        "uniform" => Uniform,
        "buffer" => Buffer,
        "shared" => Shared,
        "attribute" => Attribute,
        "varying" => Varying,
        "centroid" => Centroid,
        "sample" => Sample,
        "patch" => Patch,
        "flat" => Flat,
        "smooth" => Smooth,
        "noperspective" => Noperspective,
        "invariant" => Invariant,
        "precise" => Precise,
        "coherent" => Coherent,
        "volatile" => Volatile,
        "restrict" => Restrict,
        "readonly" => Readonly,
        "writeonly" => Writeonly,
        "highp" => Highp,
        "mediump" => Mediump,
        "lowp" => Lowp,
        "precision" => Precision,
        "layout" => Layout,
        "subroutine" => Subroutine,
        "void" => Void,
        "bool" => Bool,
        "int" => Int,
        "uint" => Uint,
        "float" => Float,
        "double" => Double,
        "vec2" => Vec2,
        "vec3" => Vec3,
        "vec4" => Vec4,
        "ivec2" => Ivec2,
        "ivec3" => Ivec3,
        "ivec4" => Ivec4,
        "uvec2" => Uvec2,
        "uvec3" => Uvec3,
        "uvec4" => Uvec4,
        "bvec2" => Bvec2,
        "bvec3" => Bvec3,
        "bvec4" => Bvec4,
        "dvec2" => Dvec2,
        "dvec3" => Dvec3,
        "dvec4" => Dvec4,
        "mat2" => Mat2,
        "mat3" => Mat3,
        "mat4" => Mat4,
        "mat2x3" => Mat2x3,
        "mat2x4" => Mat2x4,
        "mat3x2" => Mat3x2,
        "mat3x4" => Mat3x4,
        "mat4x2" => Mat4x2,
        "mat4x3" => Mat4x3,
        "dmat2" => Dmat2,
        "dmat3" => Dmat3,
        "dmat4" => Dmat4,
        "sampler1D" => Sampler1D,
        "sampler2D" => Sampler2D,
        "sampler3D" => Sampler3D,
        "samplerCube" => SamplerCube,
        "sampler2DArray" => Sampler2DArray,
        "samplerCubeArray" => SamplerCubeArray,
        "sampler2DShadow" => Sampler2DShadow,
        "samplerCubeShadow" => SamplerCubeShadow,
        "isampler2D" => Isampler2D,
        "usampler2D" => Usampler2D,
        "sampler2DMS" => Sampler2DMS,
        "image1D" => Image1D,
        "image2D" => Image2D,
        "image3D" => Image3D,
        "imageCube" => ImageCube,
        "image2DArray" => Image2DArray,
        "subpassInput" => SubpassInput,
        "subpassInputMS" => SubpassInputMS,
        _ => return None,
    })
}
