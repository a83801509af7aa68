//! `package.json` patch for react-app-rewired builds

use crate::error::{ReactforceError, Result};
use crate::templates::materialize::Outcome;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Script that builds the app and pushes it into the static resource
pub const PUSH_SCRIPT: &str = "pushToManagedPackage";
pub const REWIRED_PACKAGE: &str = "react-app-rewired";
pub const REWIRED_VERSION: &str = "^2.2.1";

/// Replace `scripts` and add `react-app-rewired` to `devDependencies`.
///
/// Returns [`Outcome::Skipped`] when the push script is already defined, so
/// scripts a user adjusted afterwards are left alone.
pub async fn patch_package_json(path: &Path) -> Result<Outcome> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ReactforceError::io("read", path, e))?;
    let mut manifest: Value = serde_json::from_str(&content).map_err(|source| ReactforceError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if !apply_patch(&mut manifest).map_err(ReactforceError::Manifest)? {
        tracing::debug!(path = %path.display(), "package.json already patched");
        return Ok(Outcome::Skipped);
    }

    let json = serde_json::to_string_pretty(&manifest).map_err(|source| ReactforceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| ReactforceError::io("write", path, e))?;
    Ok(Outcome::Written)
}

/// Returns whether anything changed
fn apply_patch(manifest: &mut Value) -> Result<bool, String> {
    let Some(root) = manifest.as_object_mut() else {
        return Err("package.json is not a JSON object".to_string());
    };

    let already = root
        .get("scripts")
        .and_then(Value::as_object)
        .is_some_and(|scripts| scripts.contains_key(PUSH_SCRIPT));
    if already {
        return Ok(false);
    }

    root.insert(
        "scripts".to_string(),
        json!({
            "start": "react-app-rewired start",
            "build": "react-app-rewired build",
            "test": "react-app-rewired test --env=jsdom",
            "eject": "react-scripts eject",
            "pushToManagedPackage": "npm run build && node scripts/managedPackage.js"
        }),
    );

    let dev = root
        .entry("devDependencies")
        .or_insert_with(|| Value::Object(Map::new()));
    match dev.as_object_mut() {
        Some(dev) => {
            dev.insert(
                REWIRED_PACKAGE.to_string(),
                Value::String(REWIRED_VERSION.to_string()),
            );
        }
        None => return Err("devDependencies is not a JSON object".to_string()),
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CRA_PACKAGE: &str = r#"{
  "name": "acme",
  "version": "0.1.0",
  "dependencies": { "react": "^18.2.0" },
  "scripts": { "start": "react-scripts start" },
  "devDependencies": { "prettier": "^3.0.0" }
}"#;

    #[tokio::test]
    async fn test_patch_rewrites_scripts_and_keeps_dev_dependencies() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, CRA_PACKAGE).unwrap();

        assert_eq!(patch_package_json(&path).await.unwrap(), Outcome::Written);

        let patched: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(patched["scripts"]["start"], "react-app-rewired start");
        assert_eq!(
            patched["scripts"][PUSH_SCRIPT],
            "npm run build && node scripts/managedPackage.js"
        );
        assert_eq!(patched["devDependencies"]["prettier"], "^3.0.0");
        assert_eq!(patched["devDependencies"][REWIRED_PACKAGE], REWIRED_VERSION);
        assert_eq!(patched["dependencies"]["react"], "^18.2.0");
    }

    #[tokio::test]
    async fn test_patch_preserves_key_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, CRA_PACKAGE).unwrap();
        patch_package_json(&path).await.unwrap();

        let patched = std::fs::read_to_string(&path).unwrap();
        let name = patched.find("\"name\"").unwrap();
        let deps = patched.find("\"dependencies\"").unwrap();
        let scripts = patched.find("\"scripts\"").unwrap();
        assert!(name < deps && deps < scripts);
    }

    #[tokio::test]
    async fn test_patch_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, CRA_PACKAGE).unwrap();
        patch_package_json(&path).await.unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        assert_eq!(patch_package_json(&path).await.unwrap(), Outcome::Skipped);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_missing_dev_dependencies_are_created() {
        let mut manifest = json!({ "name": "acme" });
        assert!(apply_patch(&mut manifest).unwrap());
        assert_eq!(manifest["devDependencies"][REWIRED_PACKAGE], REWIRED_VERSION);
    }

    #[test]
    fn test_non_object_manifest_is_rejected() {
        assert!(apply_patch(&mut json!([1, 2])).is_err());
        assert!(apply_patch(&mut json!({ "devDependencies": "nope" })).is_err());
    }
}
