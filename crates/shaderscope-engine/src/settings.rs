//! Parse settings from user configuration.

use std::path::Path;

use shaderscope_config::Config;
use shaderscope_syntax::{Profile, Settings, ShaderType};

/// Builds parse settings from `config`. Values the config cannot supply
/// fall back to the defaults with a warning.
pub fn settings_from_config(config: &Config) -> Settings {
    let shader_type = config.shader.shader_type().unwrap_or_else(|err| {
        log::warn!("{err}; using every shader stage");
        ShaderType::all()
    });
    with_stages(config, shader_type)
}

/// Like [`settings_from_config`], with the stage taken from the file
/// extension of `path` when it has a known one.
pub fn settings_for_path(config: &Config, path: &Path) -> Settings {
    match config.shader_type_for_path(path) {
        Ok(shader_type) => with_stages(config, shader_type),
        Err(err) => {
            log::warn!("{err}; using the configured stages for {}", path.display());
            settings_from_config(config)
        }
    }
}

fn with_stages(config: &Config, shader_type: ShaderType) -> Settings {
    let profile = config.shader.profile().unwrap_or_else(|err| {
        log::warn!("{err}; using {}", Profile::default());
        Profile::default()
    });
    Settings::new(shader_type, profile).with_macros(config.shader.predefined_macros.iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shaderscope_syntax::ProfileKind;

    #[test]
    fn config_values_carry_over() {
        let mut config = Config::default();
        config.shader.stages = vec!["vertex".to_string()];
        config.shader.profile = "310 es".to_string();
        config.shader.predefined_macros = vec!["SHADOWS".to_string()];

        let settings = settings_from_config(&config);

        assert_eq!(settings.shader_type, ShaderType::VERTEX);
        assert_eq!(settings.profile, Profile::new(310, ProfileKind::Es));
        assert_eq!(settings.predefined_macros, vec!["SHADOWS".to_string()]);
        assert!(settings.resolve_builtins);
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let mut config = Config::default();
        config.shader.stages = vec!["sideways".to_string()];
        config.shader.profile = "modern".to_string();

        let settings = settings_from_config(&config);

        assert_eq!(settings.shader_type, ShaderType::all());
        assert_eq!(settings.profile, Profile::default());
    }

    #[test]
    fn extension_picks_the_stage() {
        let settings = settings_for_path(&Config::default(), Path::new("shaders/sky.frag"));
        assert_eq!(settings.shader_type, ShaderType::FRAGMENT);
        let settings = settings_for_path(&Config::default(), Path::new("shaders/common.glsl"));
        assert_eq!(settings.shader_type, ShaderType::all());
    }
}
