//! The language's own functions and variables.
//!
//! Built-ins are declared as GLSL source, grouped by the stages and
//! versions that have them, and parsed with this crate's own parser on
//! first use. Generic signatures use the placeholder type names of the
//! GLSL reference pages (`genType`, `gvec4`, `gsampler2D`).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::{Availability, Definition, DefinitionKind, Scope};
use crate::settings::{Profile, Settings, ShaderType};

struct Group {
    stages: ShaderType,
    core: u32,
    es: Option<u32>,
    source: &'static str,
}

const ALL: ShaderType = ShaderType::all();

const GROUPS: &[Group] = &[
    Group {
        stages: ALL,
        core: 110,
        es: Some(100),
        source: "
// Converts degrees to radians.
genType radians(genType degrees);
// Converts radians to degrees.
genType degrees(genType radians);
genType sin(genType angle);
genType cos(genType angle);
genType tan(genType angle);
genType asin(genType x);
genType acos(genType x);
genType atan(genType y, genType x);
genType atan(genType y_over_x);
genType pow(genType x, genType y);
genType exp(genType x);
genType log(genType x);
genType exp2(genType x);
genType log2(genType x);
genType sqrt(genType x);
genType inversesqrt(genType x);
genType abs(genType x);
genType sign(genType x);
genType floor(genType x);
genType ceil(genType x);
// Returns x - floor(x).
genType fract(genType x);
genType mod(genType x, float y);
genType min(genType x, genType y);
genType max(genType x, genType y);
genType clamp(genType x, genType minVal, genType maxVal);
// Linear blend of x and y, x * (1 - a) + y * a.
genType mix(genType x, genType y, genType a);
genType step(genType edge, genType x);
// Hermite interpolation between 0 and 1 as x goes from edge0 to edge1.
genType smoothstep(genType edge0, genType edge1, genType x);
float length(genType x);
float distance(genType p0, genType p1);
float dot(genType x, genType y);
vec3 cross(vec3 x, vec3 y);
genType normalize(genType x);
genType faceforward(genType N, genType I, genType Nref);
genType reflect(genType I, genType N);
genType refract(genType I, genType N, float eta);
mat matrixCompMult(mat x, mat y);
bvec lessThan(vec x, vec y);
bvec lessThanEqual(vec x, vec y);
bvec greaterThan(vec x, vec y);
bvec greaterThanEqual(vec x, vec y);
bvec equal(vec x, vec y);
bvec notEqual(vec x, vec y);
bool any(bvec x);
bool all(bvec x);
bvec not(bvec x);
const int gl_MaxVertexAttribs;
const int gl_MaxVertexUniformVectors;
const int gl_MaxVaryingVectors;
const int gl_MaxVertexTextureImageUnits;
const int gl_MaxCombinedTextureImageUnits;
const int gl_MaxTextureImageUnits;
const int gl_MaxFragmentUniformVectors;
const int gl_MaxDrawBuffers;
",
    },
    Group {
        stages: ALL,
        core: 110,
        es: None,
        source: "
vec4 texture2D(sampler2D sampler, vec2 coord);
vec4 texture2DProj(sampler2D sampler, vec3 coord);
vec4 textureCube(samplerCube sampler, vec3 coord);
vec4 texture3D(sampler3D sampler, vec3 coord);
",
    },
    Group {
        stages: ALL,
        core: 120,
        es: Some(300),
        source: "
mat outerProduct(vec c, vec r);
mat transpose(mat m);
",
    },
    Group {
        stages: ALL,
        core: 130,
        es: Some(300),
        source: "
genType sinh(genType x);
genType cosh(genType x);
genType tanh(genType x);
genType asinh(genType x);
genType acosh(genType x);
genType atanh(genType x);
genType trunc(genType x);
genType round(genType x);
genType roundEven(genType x);
genType modf(genType x, out genType i);
genBType isnan(genType x);
genBType isinf(genType x);
// Samples a texture at coordinate P.
gvec4 texture(gsampler2D sampler, vec2 P);
gvec4 texture(gsampler2D sampler, vec2 P, float bias);
gvec4 textureProj(gsampler2D sampler, vec3 P);
gvec4 textureLod(gsampler2D sampler, vec2 P, float lod);
gvec4 textureOffset(gsampler2D sampler, vec2 P, ivec2 offset);
gvec4 textureGrad(gsampler2D sampler, vec2 P, vec2 dPdx, vec2 dPdy);
// Fetches a single texel without filtering.
gvec4 texelFetch(gsampler2D sampler, ivec2 P, int lod);
ivec2 textureSize(gsampler2D sampler, int lod);
",
    },
    Group {
        stages: ALL,
        core: 150,
        es: Some(300),
        source: "
float determinant(mat m);
mat inverse(mat m);
",
    },
    Group {
        stages: ALL,
        core: 330,
        es: Some(300),
        source: "
genIType floatBitsToInt(genType value);
genUType floatBitsToUint(genType value);
genType intBitsToFloat(genIType value);
genType uintBitsToFloat(genUType value);
uint packUnorm2x16(vec2 v);
vec2 unpackUnorm2x16(uint p);
uint packHalf2x16(vec2 v);
vec2 unpackHalf2x16(uint v);
",
    },
    Group {
        stages: ALL,
        core: 400,
        es: Some(310),
        source: "
genType fma(genType a, genType b, genType c);
genType frexp(genType x, out genIType exp);
genType ldexp(genType x, genIType exp);
genIType bitfieldExtract(genIType value, int offset, int bits);
genIType bitCount(genIType value);
genIType findLSB(genIType value);
genIType findMSB(genIType value);
gvec4 textureGather(gsampler2D sampler, vec2 P);
",
    },
    Group {
        stages: ALL,
        core: 420,
        es: Some(310),
        source: "
gvec4 imageLoad(gimage2D image, ivec2 P);
void imageStore(gimage2D image, ivec2 P, gvec4 data);
ivec2 imageSize(gimage2D image);
uint atomicCounterIncrement(atomic_uint c);
uint atomicCounterDecrement(atomic_uint c);
uint atomicCounter(atomic_uint c);
void memoryBarrier();
",
    },
    Group {
        stages: ALL,
        core: 430,
        es: Some(310),
        source: "
uint atomicAdd(inout uint mem, uint data);
uint atomicMin(inout uint mem, uint data);
uint atomicMax(inout uint mem, uint data);
uint atomicAnd(inout uint mem, uint data);
uint atomicOr(inout uint mem, uint data);
uint atomicXor(inout uint mem, uint data);
uint atomicExchange(inout uint mem, uint data);
uint atomicCompSwap(inout uint mem, uint compare, uint data);
void memoryBarrierBuffer();
void memoryBarrierImage();
",
    },
    Group {
        stages: ShaderType::VERTEX,
        core: 110,
        es: Some(100),
        source: "
// Clip-space output position of the vertex.
out vec4 gl_Position;
out float gl_PointSize;
",
    },
    Group {
        stages: ShaderType::VERTEX,
        core: 130,
        es: Some(300),
        source: "
in int gl_VertexID;
in int gl_InstanceID;
",
    },
    Group {
        stages: ShaderType::FRAGMENT,
        core: 110,
        es: Some(100),
        source: "
// Window-relative coordinates of the fragment.
in vec4 gl_FragCoord;
in bool gl_FrontFacing;
in vec2 gl_PointCoord;
vec4 gl_FragColor;
vec4 gl_FragData[gl_MaxDrawBuffers];
",
    },
    Group {
        stages: ShaderType::FRAGMENT,
        core: 110,
        es: Some(300),
        source: "
out float gl_FragDepth;
genType dFdx(genType p);
genType dFdy(genType p);
genType fwidth(genType p);
",
    },
    Group {
        stages: ShaderType::FRAGMENT,
        core: 400,
        es: Some(320),
        source: "
in int gl_SampleID;
in vec2 gl_SamplePosition;
float interpolateAtCentroid(float interpolant);
float interpolateAtSample(float interpolant, int sampleIndex);
",
    },
    Group {
        stages: ShaderType::GEOMETRY,
        core: 150,
        es: Some(320),
        source: "
// Emits the current output values as a vertex.
void EmitVertex();
// Completes the current output primitive.
void EndPrimitive();
in int gl_PrimitiveIDIn;
out int gl_PrimitiveID;
out int gl_Layer;
",
    },
    Group {
        stages: ShaderType::TESSELLATION_CONTROL,
        core: 400,
        es: Some(320),
        source: "
in int gl_PatchVerticesIn;
in int gl_InvocationID;
patch out float gl_TessLevelOuter[4];
patch out float gl_TessLevelInner[2];
",
    },
    Group {
        stages: ShaderType::TESSELLATION_EVALUATION,
        core: 400,
        es: Some(320),
        source: "
in vec3 gl_TessCoord;
in int gl_PatchVerticesIn;
patch in float gl_TessLevelOuter[4];
patch in float gl_TessLevelInner[2];
",
    },
    Group {
        stages: ShaderType::TESSELLATION_CONTROL.union(ShaderType::COMPUTE),
        core: 400,
        es: Some(310),
        source: "
// Waits until every invocation of the work group or patch reaches this call.
void barrier();
",
    },
    Group {
        stages: ShaderType::COMPUTE,
        core: 430,
        es: Some(310),
        source: "
in uvec3 gl_NumWorkGroups;
const uvec3 gl_WorkGroupSize;
in uvec3 gl_WorkGroupID;
in uvec3 gl_LocalInvocationID;
// gl_WorkGroupID * gl_WorkGroupSize + gl_LocalInvocationID.
in uvec3 gl_GlobalInvocationID;
in uint gl_LocalInvocationIndex;
void memoryBarrierShared();
void groupMemoryBarrier();
",
    },
];

static REGISTRY: OnceLock<Arc<BuiltinRegistry>> = OnceLock::new();

/// Built-in definitions, looked up by name.
#[derive(Debug, Default)]
pub struct BuiltinRegistry {
    definitions: Vec<Definition>,
    by_name: HashMap<String, Vec<usize>>,
}

impl BuiltinRegistry {
    /// The process-wide registry, built on first call.
    pub fn global() -> Arc<BuiltinRegistry> {
        REGISTRY.get_or_init(|| Arc::new(Self::load())).clone()
    }

    fn load() -> Self {
        let settings = Settings::default().with_builtins(false);
        let mut registry = Self::default();
        for group in GROUPS {
            let availability = Availability {
                stages: group.stages,
                core: group.core,
                es: group.es,
            };
            let mut tree = crate::parse_with(group.source, &settings);
            if !tree.errors().is_empty() {
                log::warn!("built-in declarations have errors: {:?}", tree.errors());
            }
            let parsed = std::mem::take(&mut tree.semantics).into_definitions();
            for definition in parsed {
                if !matches!(
                    definition.kind,
                    DefinitionKind::Function | DefinitionKind::GlobalVariable
                ) {
                    continue;
                }
                registry.insert(Definition {
                    scope: Scope::BuiltIn,
                    span: None,
                    name_node: None,
                    declaration: None,
                    availability: Some(availability),
                    offset: 0,
                    ..definition
                });
            }
        }
        log::debug!("loaded {} built-in definitions", registry.len());
        registry
    }

    fn insert(&mut self, definition: Definition) {
        let index = self.definitions.len();
        self.by_name
            .entry(definition.name.clone())
            .or_default()
            .push(index);
        self.definitions.push(definition);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Definition> {
        self.definitions.get(index)
    }

    /// Every overload or variant of `name`, whatever its availability.
    pub fn overloads<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Definition> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.definitions.get(index))
    }

    /// Index of the first variant of `name` visible to `stages` under
    /// `profile`.
    pub fn lookup(&self, name: &str, stages: ShaderType, profile: Profile) -> Option<usize> {
        self.by_name.get(name)?.iter().copied().find(|&index| {
            self.definitions[index]
                .availability
                .is_some_and(|a| a.is_visible(stages, profile))
        })
    }

    /// Every definition visible to `stages` under `profile`.
    pub fn visible(
        &self,
        stages: ShaderType,
        profile: Profile,
    ) -> impl Iterator<Item = &Definition> + '_ {
        self.definitions.iter().filter(move |d| {
            d.availability
                .is_some_and(|a| a.is_visible(stages, profile))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProfileKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn declarations_parse_cleanly() {
        let settings = Settings::default().with_builtins(false);
        for group in GROUPS {
            let tree = crate::parse_with(group.source, &settings);
            assert!(tree.errors().is_empty(), "{:?}", tree.errors());
        }
    }

    #[test]
    fn lookup_respects_stage_and_version() {
        let registry = BuiltinRegistry::global();
        let core = Profile::new(450, ProfileKind::Core);
        assert!(registry.lookup("gl_Position", ShaderType::VERTEX, core).is_some());
        assert!(registry.lookup("gl_Position", ShaderType::FRAGMENT, core).is_none());
        assert!(registry
            .lookup("texture", ShaderType::FRAGMENT, Profile::new(120, ProfileKind::Core))
            .is_none());
        assert!(registry
            .lookup("texture2D", ShaderType::FRAGMENT, Profile::new(300, ProfileKind::Es))
            .is_none());
        assert!(registry.lookup("barrier", ShaderType::COMPUTE, core).is_some());
    }

    #[test]
    fn builtins_carry_signature_and_docs() {
        let registry = BuiltinRegistry::global();
        let mix = registry.overloads("mix").next().unwrap();
        assert!(mix.is_builtin());
        assert_eq!(mix.signature(), "genType mix(genType x, genType y, genType a)");
        assert_eq!(
            mix.documentation.as_deref(),
            Some("Linear blend of x and y, x * (1 - a) + y * a.")
        );
        assert_eq!(registry.overloads("atan").count(), 2);
        let position = registry.overloads("gl_Position").next().unwrap();
        assert_eq!(position.kind, DefinitionKind::GlobalVariable);
        assert_eq!(position.signature(), "out vec4 gl_Position");
    }
}
