// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_shader(functions: usize) -> String {
    let mut out = String::from("#version 450 core\n\nuniform vec3 lightDir;\nin vec3 vNormal;\nout vec4 color;\n\n");
    for i in 0..functions {
        out.push_str(&format!(
            "// Helper {i}.\nfloat helper{i}(vec3 n, float k)\n{{\n    float d = max(dot(n, lightDir), 0.0);\n#ifdef SHARP\n    d = step(0.5, d);\n#endif\n    for (int j = 0; j < 4; ++j) {{\n        d *= k;\n    }}\n    return d;\n}}\n\n"
        ));
    }
    out.push_str("void main()\n{\n    color = vec4(vec3(helper0(normalize(vNormal), 0.9)), 1.0);\n}\n");
    out
}
