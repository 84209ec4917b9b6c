//! SyntaxKind enum for all tokens and nodes in the GLSL syntax tree.
//!
//! Tokens and nodes share a single enum. Each token category (punctuation,
//! keywords, numeric constants, preprocessor directives) occupies one
//! contiguous block of discriminants, and the category predicates are plain
//! range checks over those blocks. Adding a kind to a category means adding
//! it inside that category's block.

macro_rules! syntax_kinds {
    (
        tokens { $($tok:ident),* $(,)? }
        punct { $($punct:ident => $punct_text:literal),* $(,)? }
        qualifiers { $($qual:ident => $qual_text:literal),* $(,)? }
        statements { $($stmt:ident => $stmt_text:literal),* $(,)? }
        types { $($ty:ident => $ty_text:literal),* $(,)? }
        reserved { $($res:ident => $res_text:literal),* $(,)? }
        numbers { $($num:ident),* $(,)? }
        directives { $($dir:ident => $dir_text:literal),* $(,)? }
        nodes { $($node:ident),* $(,)? }
    ) => {
        /// All syntax kinds of the GLSL tree.
        ///
        /// SCREAMING_CASE follows the rust-analyzer convention.
        #[repr(u16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[allow(non_camel_case_types)]
        pub enum SyntaxKind {
            $($tok,)*
            $($punct,)*
            $($qual,)*
            $($stmt,)*
            $($ty,)*
            $($res,)*
            $($num,)*
            $($dir,)*
            $($node,)*
        }

        impl SyntaxKind {
            /// The operator and punctuation table, in declaration order.
            pub const PUNCTUATION: &'static [(SyntaxKind, &'static str)] =
                &[$((SyntaxKind::$punct, $punct_text)),*];

            /// Every keyword spelling with its dedicated kind.
            pub const KEYWORDS: &'static [(SyntaxKind, &'static str)] = &[
                $((SyntaxKind::$qual, $qual_text),)*
                $((SyntaxKind::$stmt, $stmt_text),)*
                $((SyntaxKind::$ty, $ty_text),)*
                $((SyntaxKind::$res, $res_text),)*
            ];

            /// Preprocessor directive words (without the `#`).
            pub const DIRECTIVES: &'static [(SyntaxKind, &'static str)] =
                &[$((SyntaxKind::$dir, $dir_text)),*];

            const QUALIFIERS: &'static [SyntaxKind] = &[$(SyntaxKind::$qual),*];
            const TYPES: &'static [SyntaxKind] = &[$(SyntaxKind::$ty),*];
            const RESERVED: &'static [SyntaxKind] = &[$(SyntaxKind::$res),*];
            const NUMBERS: &'static [SyntaxKind] = &[$(SyntaxKind::$num),*];
            const NODES: &'static [SyntaxKind] = &[$(SyntaxKind::$node),*];

            /// Exact, case-sensitive keyword lookup.
            pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
                match text {
                    $($qual_text => Some(SyntaxKind::$qual),)*
                    $($stmt_text => Some(SyntaxKind::$stmt),)*
                    $($ty_text => Some(SyntaxKind::$ty),)*
                    $($res_text => Some(SyntaxKind::$res),)*
                    _ => None,
                }
            }

            /// Directive lookup for the word following a `#`.
            pub fn from_directive(word: &str) -> Option<SyntaxKind> {
                match word {
                    $($dir_text => Some(SyntaxKind::$dir),)*
                    _ => None,
                }
            }

            /// Punctuation lookup by exact spelling.
            pub fn from_punctuation(text: &str) -> Option<SyntaxKind> {
                match text {
                    $($punct_text => Some(SyntaxKind::$punct),)*
                    _ => None,
                }
            }

            /// The fixed spelling of punctuation and keyword kinds.
            pub fn fixed_text(self) -> Option<&'static str> {
                match self {
                    $(SyntaxKind::$punct => Some($punct_text),)*
                    $(SyntaxKind::$qual => Some($qual_text),)*
                    $(SyntaxKind::$stmt => Some($stmt_text),)*
                    $(SyntaxKind::$ty => Some($ty_text),)*
                    $(SyntaxKind::$res => Some($res_text),)*
                    _ => None,
                }
            }

            /// The directive word of a directive kind.
            pub fn directive_word(self) -> Option<&'static str> {
                match self {
                    $(SyntaxKind::$dir => Some($dir_text),)*
                    _ => None,
                }
            }
        }
    };
}

syntax_kinds! {
    tokens {
        EOF,
        IDENT,
        HASH,
        PREPROCESSOR_TEXT,
        INVALID_TOKEN,
    }
    punct {
        L_PAREN => "(",
        R_PAREN => ")",
        L_BRACK => "[",
        R_BRACK => "]",
        L_CURLY => "{",
        R_CURLY => "}",
        DOT => ".",
        COMMA => ",",
        SEMICOLON => ";",
        COLON => ":",
        QUESTION => "?",
        PLUS => "+",
        MINUS => "-",
        STAR => "*",
        SLASH => "/",
        PERCENT => "%",
        INC => "++",
        DEC => "--",
        SHL => "<<",
        SHR => ">>",
        LT => "<",
        GT => ">",
        LT_EQ => "<=",
        GT_EQ => ">=",
        EQ_EQ => "==",
        NOT_EQ => "!=",
        AMP => "&",
        CARET => "^",
        PIPE => "|",
        AMP_AMP => "&&",
        CARET_CARET => "^^",
        PIPE_PIPE => "||",
        BANG => "!",
        TILDE => "~",
        EQ => "=",
        PLUS_EQ => "+=",
        MINUS_EQ => "-=",
        STAR_EQ => "*=",
        SLASH_EQ => "/=",
        PERCENT_EQ => "%=",
        SHL_EQ => "<<=",
        SHR_EQ => ">>=",
        AMP_EQ => "&=",
        CARET_EQ => "^=",
        PIPE_EQ => "|=",
    }
    qualifiers {
        CONST_KW => "const",
        UNIFORM_KW => "uniform",
        BUFFER_KW => "buffer",
        SHARED_KW => "shared",
        ATTRIBUTE_KW => "attribute",
        VARYING_KW => "varying",
        COHERENT_KW => "coherent",
        VOLATILE_KW => "volatile",
        RESTRICT_KW => "restrict",
        READONLY_KW => "readonly",
        WRITEONLY_KW => "writeonly",
        LAYOUT_KW => "layout",
        CENTROID_KW => "centroid",
        FLAT_KW => "flat",
        SMOOTH_KW => "smooth",
        NOPERSPECTIVE_KW => "noperspective",
        PATCH_KW => "patch",
        SAMPLE_KW => "sample",
        INVARIANT_KW => "invariant",
        PRECISE_KW => "precise",
        IN_KW => "in",
        OUT_KW => "out",
        INOUT_KW => "inout",
        LOWP_KW => "lowp",
        MEDIUMP_KW => "mediump",
        HIGHP_KW => "highp",
        SUBROUTINE_KW => "subroutine",
    }
    statements {
        BREAK_KW => "break",
        CONTINUE_KW => "continue",
        DO_KW => "do",
        FOR_KW => "for",
        WHILE_KW => "while",
        SWITCH_KW => "switch",
        CASE_KW => "case",
        DEFAULT_KW => "default",
        IF_KW => "if",
        ELSE_KW => "else",
        DISCARD_KW => "discard",
        RETURN_KW => "return",
        STRUCT_KW => "struct",
        PRECISION_KW => "precision",
        TRUE_KW => "true",
        FALSE_KW => "false",
    }
    types {
        VOID_KW => "void",
        BOOL_KW => "bool",
        INT_KW => "int",
        UINT_KW => "uint",
        FLOAT_KW => "float",
        DOUBLE_KW => "double",
        ATOMIC_UINT_KW => "atomic_uint",
        VEC2_KW => "vec2",
        VEC3_KW => "vec3",
        VEC4_KW => "vec4",
        IVEC2_KW => "ivec2",
        IVEC3_KW => "ivec3",
        IVEC4_KW => "ivec4",
        BVEC2_KW => "bvec2",
        BVEC3_KW => "bvec3",
        BVEC4_KW => "bvec4",
        UVEC2_KW => "uvec2",
        UVEC3_KW => "uvec3",
        UVEC4_KW => "uvec4",
        DVEC2_KW => "dvec2",
        DVEC3_KW => "dvec3",
        DVEC4_KW => "dvec4",
        MAT2_KW => "mat2",
        MAT3_KW => "mat3",
        MAT4_KW => "mat4",
        MAT2X2_KW => "mat2x2",
        MAT2X3_KW => "mat2x3",
        MAT2X4_KW => "mat2x4",
        MAT3X2_KW => "mat3x2",
        MAT3X3_KW => "mat3x3",
        MAT3X4_KW => "mat3x4",
        MAT4X2_KW => "mat4x2",
        MAT4X3_KW => "mat4x3",
        MAT4X4_KW => "mat4x4",
        DMAT2_KW => "dmat2",
        DMAT3_KW => "dmat3",
        DMAT4_KW => "dmat4",
        DMAT2X2_KW => "dmat2x2",
        DMAT2X3_KW => "dmat2x3",
        DMAT2X4_KW => "dmat2x4",
        DMAT3X2_KW => "dmat3x2",
        DMAT3X3_KW => "dmat3x3",
        DMAT3X4_KW => "dmat3x4",
        DMAT4X2_KW => "dmat4x2",
        DMAT4X3_KW => "dmat4x3",
        DMAT4X4_KW => "dmat4x4",
        SAMPLER1D_KW => "sampler1D",
        SAMPLER1DSHADOW_KW => "sampler1DShadow",
        SAMPLER1DARRAY_KW => "sampler1DArray",
        SAMPLER1DARRAYSHADOW_KW => "sampler1DArrayShadow",
        ISAMPLER1D_KW => "isampler1D",
        ISAMPLER1DARRAY_KW => "isampler1DArray",
        USAMPLER1D_KW => "usampler1D",
        USAMPLER1DARRAY_KW => "usampler1DArray",
        SAMPLER2D_KW => "sampler2D",
        SAMPLER2DSHADOW_KW => "sampler2DShadow",
        SAMPLER2DARRAY_KW => "sampler2DArray",
        SAMPLER2DARRAYSHADOW_KW => "sampler2DArrayShadow",
        ISAMPLER2D_KW => "isampler2D",
        ISAMPLER2DARRAY_KW => "isampler2DArray",
        USAMPLER2D_KW => "usampler2D",
        USAMPLER2DARRAY_KW => "usampler2DArray",
        SAMPLER2DRECT_KW => "sampler2DRect",
        SAMPLER2DRECTSHADOW_KW => "sampler2DRectShadow",
        ISAMPLER2DRECT_KW => "isampler2DRect",
        USAMPLER2DRECT_KW => "usampler2DRect",
        SAMPLER2DMS_KW => "sampler2DMS",
        ISAMPLER2DMS_KW => "isampler2DMS",
        USAMPLER2DMS_KW => "usampler2DMS",
        SAMPLER2DMSARRAY_KW => "sampler2DMSArray",
        ISAMPLER2DMSARRAY_KW => "isampler2DMSArray",
        USAMPLER2DMSARRAY_KW => "usampler2DMSArray",
        SAMPLER3D_KW => "sampler3D",
        ISAMPLER3D_KW => "isampler3D",
        USAMPLER3D_KW => "usampler3D",
        SAMPLERCUBE_KW => "samplerCube",
        SAMPLERCUBESHADOW_KW => "samplerCubeShadow",
        ISAMPLERCUBE_KW => "isamplerCube",
        USAMPLERCUBE_KW => "usamplerCube",
        SAMPLERCUBEARRAY_KW => "samplerCubeArray",
        SAMPLERCUBEARRAYSHADOW_KW => "samplerCubeArrayShadow",
        ISAMPLERCUBEARRAY_KW => "isamplerCubeArray",
        USAMPLERCUBEARRAY_KW => "usamplerCubeArray",
        SAMPLERBUFFER_KW => "samplerBuffer",
        ISAMPLERBUFFER_KW => "isamplerBuffer",
        USAMPLERBUFFER_KW => "usamplerBuffer",
        IMAGE1D_KW => "image1D",
        IIMAGE1D_KW => "iimage1D",
        UIMAGE1D_KW => "uimage1D",
        IMAGE1DARRAY_KW => "image1DArray",
        IIMAGE1DARRAY_KW => "iimage1DArray",
        UIMAGE1DARRAY_KW => "uimage1DArray",
        IMAGE2D_KW => "image2D",
        IIMAGE2D_KW => "iimage2D",
        UIMAGE2D_KW => "uimage2D",
        IMAGE2DARRAY_KW => "image2DArray",
        IIMAGE2DARRAY_KW => "iimage2DArray",
        UIMAGE2DARRAY_KW => "uimage2DArray",
        IMAGE2DRECT_KW => "image2DRect",
        IIMAGE2DRECT_KW => "iimage2DRect",
        UIMAGE2DRECT_KW => "uimage2DRect",
        IMAGE2DMS_KW => "image2DMS",
        IIMAGE2DMS_KW => "iimage2DMS",
        UIMAGE2DMS_KW => "uimage2DMS",
        IMAGE2DMSARRAY_KW => "image2DMSArray",
        IIMAGE2DMSARRAY_KW => "iimage2DMSArray",
        UIMAGE2DMSARRAY_KW => "uimage2DMSArray",
        IMAGE3D_KW => "image3D",
        IIMAGE3D_KW => "iimage3D",
        UIMAGE3D_KW => "uimage3D",
        IMAGECUBE_KW => "imageCube",
        IIMAGECUBE_KW => "iimageCube",
        UIMAGECUBE_KW => "uimageCube",
        IMAGECUBEARRAY_KW => "imageCubeArray",
        IIMAGECUBEARRAY_KW => "iimageCubeArray",
        UIMAGECUBEARRAY_KW => "uimageCubeArray",
        IMAGEBUFFER_KW => "imageBuffer",
        IIMAGEBUFFER_KW => "iimageBuffer",
        UIMAGEBUFFER_KW => "uimageBuffer",
    }
    reserved {
        COMMON_KW => "common",
        PARTITION_KW => "partition",
        ACTIVE_KW => "active",
        ASM_KW => "asm",
        CLASS_KW => "class",
        UNION_KW => "union",
        ENUM_KW => "enum",
        TYPEDEF_KW => "typedef",
        TEMPLATE_KW => "template",
        THIS_KW => "this",
        RESOURCE_KW => "resource",
        GOTO_KW => "goto",
        INLINE_KW => "inline",
        NOINLINE_KW => "noinline",
        PUBLIC_KW => "public",
        STATIC_KW => "static",
        EXTERN_KW => "extern",
        EXTERNAL_KW => "external",
        INTERFACE_KW => "interface",
        LONG_KW => "long",
        SHORT_KW => "short",
        HALF_KW => "half",
        FIXED_KW => "fixed",
        UNSIGNED_KW => "unsigned",
        SUPERP_KW => "superp",
        INPUT_KW => "input",
        OUTPUT_KW => "output",
        HVEC2_KW => "hvec2",
        HVEC3_KW => "hvec3",
        HVEC4_KW => "hvec4",
        FVEC2_KW => "fvec2",
        FVEC3_KW => "fvec3",
        FVEC4_KW => "fvec4",
        FILTER_KW => "filter",
        SIZEOF_KW => "sizeof",
        CAST_KW => "cast",
        NAMESPACE_KW => "namespace",
        USING_KW => "using",
        SAMPLER3DRECT_KW => "sampler3DRect",
    }
    numbers {
        INT_CONST,
        UINT_CONST,
        FLOAT_CONST,
        DOUBLE_CONST,
    }
    directives {
        PP_DEFINE => "define",
        PP_UNDEF => "undef",
        PP_IF => "if",
        PP_IFDEF => "ifdef",
        PP_IFNDEF => "ifndef",
        PP_ELSE => "else",
        PP_ELIF => "elif",
        PP_ENDIF => "endif",
        PP_ERROR => "error",
        PP_PRAGMA => "pragma",
        PP_EXTENSION => "extension",
        PP_VERSION => "version",
        PP_LINE => "line",
    }
    nodes {
        SOURCE_FILE,
        ERROR,
        // Preprocessor
        DEFINE_DIRECTIVE,
        UNDEF_DIRECTIVE,
        CONDITIONAL_DIRECTIVE,
        VERSION_DIRECTIVE,
        EXTENSION_DIRECTIVE,
        PRAGMA_DIRECTIVE,
        ERROR_DIRECTIVE,
        LINE_DIRECTIVE,
        NULL_DIRECTIVE,
        INVALID_DIRECTIVE,
        MACRO_PARAM_LIST,
        MACRO_BODY,
        DIRECTIVE_CONDITION,
        EXCLUDED_CODE,
        EXCLUDED_BLOCK,
        // Declarations
        FUNCTION_DEFINITION,
        FUNCTION_PROTOTYPE,
        PARAMETER_LIST,
        PARAMETER,
        VARIABLE_DECLARATION,
        DECLARATOR,
        PRECISION_DECLARATION,
        INTERFACE_BLOCK,
        FIELD_LIST,
        FIELD_DECLARATION,
        STRUCT_SPECIFIER,
        STRUCT_DECLARATION,
        QUALIFIER_DECLARATION,
        // Types
        TYPE_QUALIFIERS,
        LAYOUT_QUALIFIER,
        LAYOUT_QUALIFIER_ID,
        TYPE_SPECIFIER,
        ARRAY_SPECIFIER,
        // Names
        NAME,
        NAME_REF,
        // Statements
        COMPOUND_STATEMENT,
        EXPRESSION_STATEMENT,
        EMPTY_STATEMENT,
        IF_STATEMENT,
        ELSE_CLAUSE,
        SWITCH_STATEMENT,
        CASE_LABEL,
        WHILE_STATEMENT,
        DO_WHILE_STATEMENT,
        FOR_STATEMENT,
        CONDITION,
        BREAK_STATEMENT,
        CONTINUE_STATEMENT,
        RETURN_STATEMENT,
        DISCARD_STATEMENT,
        // Expressions
        ASSIGNMENT_EXPR,
        CONDITIONAL_EXPR,
        BINARY_EXPR,
        PREFIX_EXPR,
        POSTFIX_EXPR,
        CALL_EXPR,
        ARG_LIST,
        INDEX_EXPR,
        FIELD_EXPR,
        PAREN_EXPR,
        LITERAL,
        SEQUENCE_EXPR,
        INITIALIZER_LIST,
    }
}

/// First and last member of a contiguous block.
fn in_block(kind: SyntaxKind, first: SyntaxKind, last: SyntaxKind) -> bool {
    first <= kind && kind <= last
}

fn block_bounds(kinds: &[SyntaxKind]) -> (SyntaxKind, SyntaxKind) {
    (kinds[0], kinds[kinds.len() - 1])
}

impl SyntaxKind {
    /// True for every lexer-produced kind.
    pub fn is_token(self) -> bool {
        self < Self::NODES[0]
    }

    /// True for composite node kinds.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    pub fn is_punctuation(self) -> bool {
        let first = Self::PUNCTUATION[0].0;
        let last = Self::PUNCTUATION[Self::PUNCTUATION.len() - 1].0;
        in_block(self, first, last)
    }

    pub fn is_keyword(self) -> bool {
        let first = Self::KEYWORDS[0].0;
        let last = Self::KEYWORDS[Self::KEYWORDS.len() - 1].0;
        in_block(self, first, last)
    }

    pub fn is_number(self) -> bool {
        let (first, last) = block_bounds(Self::NUMBERS);
        in_block(self, first, last)
    }

    /// True for the directive tokens (`#define`, `#if`, ...).
    pub fn is_preprocessor(self) -> bool {
        let first = Self::DIRECTIVES[0].0;
        let last = Self::DIRECTIVES[Self::DIRECTIVES.len() - 1].0;
        in_block(self, first, last)
    }

    /// Storage, layout, interpolation, precision and memory qualifiers.
    pub fn is_qualifier_keyword(self) -> bool {
        let (first, last) = block_bounds(Self::QUALIFIERS);
        in_block(self, first, last)
    }

    /// Built-in scalar, vector, matrix, sampler and image type names.
    pub fn is_type_keyword(self) -> bool {
        let (first, last) = block_bounds(Self::TYPES);
        in_block(self, first, last)
    }

    /// Keywords reserved for future use; never valid in a program.
    pub fn is_reserved_keyword(self) -> bool {
        let (first, last) = block_bounds(Self::RESERVED);
        in_block(self, first, last)
    }

    pub fn is_precision_qualifier(self) -> bool {
        matches!(self, Self::LOWP_KW | Self::MEDIUMP_KW | Self::HIGHP_KW)
    }

    /// Assignment operators, `=` included.
    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            Self::EQ
                | Self::PLUS_EQ
                | Self::MINUS_EQ
                | Self::STAR_EQ
                | Self::SLASH_EQ
                | Self::PERCENT_EQ
                | Self::SHL_EQ
                | Self::SHR_EQ
                | Self::AMP_EQ
                | Self::CARET_EQ
                | Self::PIPE_EQ
        )
    }

    /// Conditional directives that open, continue or close an `#if` chain.
    pub fn is_conditional_directive(self) -> bool {
        matches!(
            self,
            Self::PP_IF
                | Self::PP_IFDEF
                | Self::PP_IFNDEF
                | Self::PP_ELIF
                | Self::PP_ELSE
                | Self::PP_ENDIF
        )
    }

    /// Numeric literals and `true`/`false`.
    pub fn is_literal(self) -> bool {
        self.is_number() || matches!(self, Self::TRUE_KW | Self::FALSE_KW)
    }
}
