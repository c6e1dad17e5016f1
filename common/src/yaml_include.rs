use std::fs;
use std::path::Path;
use yaml_rust2::{Yaml, YamlEmitter, YamlLoader};

use crate::config::ConfigError;

/// Loads a YAML document, resolving `!include <relative path>` lines first.
///
/// Included documents are merged in the order they appear, and the including
/// file's own keys override anything brought in by an include.
pub fn load_yaml_with_includes(path: &Path) -> Result<Yaml, ConfigError> {
    let merged = process_includes_recursive(path, 0)?;
    tracing::debug!(path = %path.display(), "Resolved config includes");
    Ok(merged)
}

/// Serializes a resolved document back to text so serde can take over.
pub fn emit_yaml(yaml: &Yaml) -> Result<String, ConfigError> {
    let mut out = String::new();
    {
        let mut emitter = YamlEmitter::new(&mut out);
        emitter.dump(yaml)?;
    }
    Ok(out)
}

const MAX_INCLUDE_DEPTH: usize = 16;

fn process_includes_recursive(path: &Path, depth: usize) -> Result<Yaml, ConfigError> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(ConfigError::IncludeDepth(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let base_path = path.parent().unwrap_or(Path::new(""));

    let (includes, rest): (Vec<&str>, Vec<&str>) = contents
        .lines()
        .partition(|&line| line.trim().starts_with("!include"));

    let mut merged_includes: Option<Yaml> = None;
    for line in includes {
        let include_path = line.trim().trim_start_matches("!include").trim();
        let included = process_includes_recursive(&base_path.join(include_path), depth + 1)?;
        merged_includes = Some(match merged_includes {
            Some(acc) => merge_yaml(&acc, &included),
            None => included,
        });
    }

    let rest_yamls = YamlLoader::load_from_str(&rest.join("\n"))?;
    let merged_rest = rest_yamls
        .into_iter()
        .reduce(|acc, doc| merge_yaml(&acc, &doc))
        .unwrap_or(Yaml::Null);

    Ok(match merged_includes {
        Some(base) => merge_yaml(&base, &merged_rest),
        None => merged_rest,
    })
}

fn merge_yaml(base: &Yaml, override_yaml: &Yaml) -> Yaml {
    match (base, override_yaml) {
        (Yaml::Hash(base_hash), Yaml::Hash(override_hash)) => {
            let mut result = base_hash.clone();
            for (key, value) in override_hash {
                match base_hash.get(key) {
                    Some(base_value) => {
                        result.insert(key.clone(), merge_yaml(base_value, value));
                    }
                    None => {
                        result.insert(key.clone(), value.clone());
                    }
                }
            }
            Yaml::Hash(result)
        }
        (base, Yaml::Null) => base.clone(),
        (_, override_value) => override_value.clone(),
    }
}
