//! Template topology: which template file becomes which destination file
//!
//! The Salesforce side is a versioned table of artifact families. `v1` is the
//! original layout (Apex controllers, Visualforce page, static resource);
//! `v2` adds the Aura bundle and the flexipage.

use super::substitution::TokenMap;
use crate::names::AppName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Salesforce metadata directory, relative to the project root
pub const SALESFORCE_PACKAGE_DIR: &str = "force-app/main/default";

/// Prototype identifiers embedded in template files
pub const PROTOTYPE_CONTROLLER: &str = "rfPrototypeCtrl";
pub const PROTOTYPE_LTG_CONTROLLER: &str = "rfPrototypeLtgCtrl";
pub const PROTOTYPE_PAGE: &str = "rfPrototypeVf";
pub const PROTOTYPE_COMPONENT: &str = "rfPrototypeLtg";
pub const PROTOTYPE_RESOURCE: &str = "CustomerPortal";
pub const PROTOTYPE_ASSETS_RESOURCE: &str = "ReactforceAssets";

/// One file to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub tokens: TokenMap,
    /// False for verbatim copies (descriptors copied as-is, icons)
    pub substitute: bool,
}

impl ManifestEntry {
    fn render(source: PathBuf, dest: PathBuf, tokens: TokenMap) -> Self {
        Self {
            source,
            dest,
            tokens,
            substitute: true,
        }
    }

    fn copy(source: PathBuf, dest: PathBuf) -> Self {
        Self {
            source,
            dest,
            tokens: TokenMap::new(),
            substitute: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactFamily {
    ApexController,
    ApexLightningController,
    VisualforcePage,
    AuraBundle,
    StaticResource,
    Flexipage,
}

impl ArtifactFamily {
    pub fn display_name(&self) -> &'static str {
        match self {
            ArtifactFamily::ApexController => "Apex controller",
            ArtifactFamily::ApexLightningController => "Apex Lightning controller",
            ArtifactFamily::VisualforcePage => "Visualforce page",
            ArtifactFamily::AuraBundle => "Aura component bundle",
            ArtifactFamily::StaticResource => "Static resource",
            ArtifactFamily::Flexipage => "Flexipage",
        }
    }
}

/// Version of the Salesforce manifest table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestVersion {
    V1,
    #[default]
    V2,
}

impl ManifestVersion {
    pub fn families(self) -> &'static [ArtifactFamily] {
        use ArtifactFamily::*;
        match self {
            ManifestVersion::V1 => &[
                ApexController,
                ApexLightningController,
                VisualforcePage,
                StaticResource,
            ],
            ManifestVersion::V2 => &[
                ApexController,
                ApexLightningController,
                VisualforcePage,
                AuraBundle,
                StaticResource,
                Flexipage,
            ],
        }
    }
}

impl FromStr for ManifestVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(ManifestVersion::V1),
            "v2" | "2" => Ok(ManifestVersion::V2),
            other => Err(format!("unknown manifest version '{other}' (expected v1 or v2)")),
        }
    }
}

impl fmt::Display for ManifestVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestVersion::V1 => f.write_str("v1"),
            ManifestVersion::V2 => f.write_str("v2"),
        }
    }
}

/// Directories and files for one artifact family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyPlan {
    pub family: ArtifactFamily,
    /// Created before any entry is materialized
    pub dirs: Vec<PathBuf>,
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesforceManifest {
    pub version: ManifestVersion,
    pub families: Vec<FamilyPlan>,
}

impl SalesforceManifest {
    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.families.iter().flat_map(|f| f.entries.iter())
    }

    pub fn destinations(&self) -> Vec<&Path> {
        self.entries().map(|e| e.dest.as_path()).collect()
    }
}

/// Locations inside a cloned template repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLayout {
    root: PathBuf,
    template: String,
}

impl TemplateLayout {
    pub fn new(root: impl Into<PathBuf>, template: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            template: template.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn template_dir(&self) -> PathBuf {
        self.root.join("templates").join(&self.template)
    }

    pub fn salesforce_root(&self) -> PathBuf {
        self.template_dir().join("sf")
    }

    pub fn react_root(&self) -> PathBuf {
        self.template_dir().join("react")
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.template_dir().join("template.yaml")
    }
}

/// Compute the Salesforce entries for `app`.
///
/// `sf_root` is the template's `sf/` directory; destinations land under
/// `<project_root>/force-app/main/default`.
pub fn build_salesforce_manifest(
    version: ManifestVersion,
    app: &AppName,
    sf_root: &Path,
    project_root: &Path,
) -> SalesforceManifest {
    let package = project_root.join(SALESFORCE_PACKAGE_DIR);
    let families = version
        .families()
        .iter()
        .map(|family| plan_family(*family, app, sf_root, &package))
        .collect();

    SalesforceManifest { version, families }
}

fn plan_family(family: ArtifactFamily, app: &AppName, src: &Path, package: &Path) -> FamilyPlan {
    match family {
        ArtifactFamily::ApexController => apex_class(
            family,
            src,
            package,
            PROTOTYPE_CONTROLLER,
            &app.controller(),
        ),
        ArtifactFamily::ApexLightningController => apex_class(
            family,
            src,
            package,
            PROTOTYPE_LTG_CONTROLLER,
            &app.lightning_controller(),
        ),
        ArtifactFamily::VisualforcePage => {
            let src_dir = src.join("pages");
            let dest_dir = package.join("pages");
            let page = app.visualforce_page();
            let tokens = TokenMap::new()
                .with(PROTOTYPE_CONTROLLER, app.controller())
                .with(PROTOTYPE_RESOURCE, app.static_resource());
            FamilyPlan {
                family,
                dirs: vec![dest_dir.clone()],
                entries: vec![
                    ManifestEntry::render(
                        src_dir.join(format!("{PROTOTYPE_PAGE}.page")),
                        dest_dir.join(format!("{page}.page")),
                        tokens,
                    ),
                    ManifestEntry::copy(
                        src_dir.join(format!("{PROTOTYPE_PAGE}.page-meta.xml")),
                        dest_dir.join(format!("{page}.page-meta.xml")),
                    ),
                ],
            }
        }
        ArtifactFamily::AuraBundle => aura_bundle(app, src, package),
        ArtifactFamily::StaticResource => {
            let src_dir = src.join("staticresources");
            let dest_dir = package.join("staticresources");
            let resource = app.static_resource();
            FamilyPlan {
                family,
                dirs: vec![dest_dir.clone(), dest_dir.join(&resource)],
                entries: vec![ManifestEntry::render(
                    src_dir.join(format!("{PROTOTYPE_RESOURCE}.resource-meta.xml")),
                    dest_dir.join(format!("{resource}.resource-meta.xml")),
                    TokenMap::new().with(PROTOTYPE_RESOURCE, resource.clone()),
                )],
            }
        }
        ArtifactFamily::Flexipage => {
            let dest_dir = package.join("flexipages");
            let component = app.lightning_component();
            FamilyPlan {
                family,
                dirs: vec![dest_dir.clone()],
                entries: vec![ManifestEntry::render(
                    src.join("flexipages")
                        .join(format!("{PROTOTYPE_COMPONENT}.flexipage-meta.xml")),
                    dest_dir.join(format!("{component}.flexipage-meta.xml")),
                    TokenMap::new().with(PROTOTYPE_COMPONENT, component.clone()),
                )],
            }
        }
    }
}

fn apex_class(
    family: ArtifactFamily,
    src: &Path,
    package: &Path,
    prototype: &str,
    class: &str,
) -> FamilyPlan {
    let src_dir = src.join("classes");
    let dest_dir = package.join("classes");
    FamilyPlan {
        family,
        dirs: vec![dest_dir.clone()],
        entries: vec![
            ManifestEntry::render(
                src_dir.join(format!("{prototype}.cls")),
                dest_dir.join(format!("{class}.cls")),
                TokenMap::new().with(prototype, class),
            ),
            ManifestEntry::copy(
                src_dir.join(format!("{prototype}.cls-meta.xml")),
                dest_dir.join(format!("{class}.cls-meta.xml")),
            ),
        ],
    }
}

/// Suffixes of the sibling files in an Aura bundle, and whether each is rendered
const AURA_BUNDLE_FILES: &[(&str, bool)] = &[
    (".cmp", true),
    (".auradoc", true),
    ("Controller.js", true),
    ("Helper.js", true),
    ("Renderer.js", true),
    (".css", true),
    (".design", true),
    (".svg", false),
    (".cmp-meta.xml", true),
];

fn aura_bundle(app: &AppName, src: &Path, package: &Path) -> FamilyPlan {
    let component = app.lightning_component();
    let src_dir = src.join("aura").join(PROTOTYPE_COMPONENT);
    let dest_dir = package.join("aura").join(&component);
    let rename = TokenMap::new().with(PROTOTYPE_COMPONENT, component.clone());

    let entries = AURA_BUNDLE_FILES
        .iter()
        .map(|(suffix, rendered)| {
            let source = src_dir.join(format!("{PROTOTYPE_COMPONENT}{suffix}"));
            let dest = dest_dir.join(format!("{component}{suffix}"));
            if !rendered {
                return ManifestEntry::copy(source, dest);
            }
            let mut tokens = rename.clone();
            if *suffix == ".cmp" {
                // The markup also names its Apex controller and loads the static resource.
                tokens.push(PROTOTYPE_LTG_CONTROLLER, app.lightning_controller());
                tokens.push(PROTOTYPE_RESOURCE, app.static_resource());
            }
            ManifestEntry::render(source, dest, tokens)
        })
        .collect();

    FamilyPlan {
        family: ArtifactFamily::AuraBundle,
        dirs: vec![dest_dir],
        entries,
    }
}

/// React-side files patched into a vanilla create-react-app project
pub fn build_react_manifest(app: &AppName, react_root: &Path, app_dir: &Path) -> Vec<ManifestEntry> {
    let copies = [
        "config/salesforce.js",
        "scripts/managedPackage.js",
        "config-overrides.js",
        "public/app.main.js",
        "public/assets/js/app.main.js",
    ];

    let mut entries = vec![ManifestEntry::render(
        react_root.join(".env"),
        app_dir.join(".env"),
        TokenMap::new().with(PROTOTYPE_RESOURCE, app.static_resource()),
    )];
    entries.extend(
        copies
            .iter()
            .map(|rel| ManifestEntry::copy(react_root.join(rel), app_dir.join(rel))),
    );
    entries
}

/// The static-resource bundle copied by `init`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetsPlan {
    pub tree_source: PathBuf,
    pub tree_dest: PathBuf,
    pub descriptor: ManifestEntry,
}

/// `assets_root` is the cloned assets repository, `static_dir` the absolute
/// static resources directory of the Salesforce package.
pub fn build_assets_plan(assets_root: &Path, static_dir: &Path, resource_name: &str) -> AssetsPlan {
    let src_dir = TemplateLayout::new(assets_root, "default")
        .salesforce_root()
        .join("staticresources");

    AssetsPlan {
        tree_source: src_dir.join(PROTOTYPE_ASSETS_RESOURCE),
        tree_dest: static_dir.join(resource_name),
        descriptor: ManifestEntry::render(
            src_dir.join(format!("{PROTOTYPE_ASSETS_RESOURCE}.resource-meta.xml")),
            static_dir.join(format!("{resource_name}.resource-meta.xml")),
            TokenMap::new().with(PROTOTYPE_ASSETS_RESOURCE, resource_name),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn acme() -> AppName {
        AppName::parse("Acme").unwrap()
    }

    fn relative_dests(manifest: &SalesforceManifest, root: &Path) -> BTreeSet<String> {
        manifest
            .destinations()
            .iter()
            .map(|d| d.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_v2_covers_all_six_families() {
        let root = Path::new("/proj");
        let manifest =
            build_salesforce_manifest(ManifestVersion::V2, &acme(), Path::new("/tpl/sf"), root);

        let families: Vec<_> = manifest.families.iter().map(|f| f.family).collect();
        assert_eq!(families, ManifestVersion::V2.families());
        assert_eq!(families.len(), 6);

        let p = SALESFORCE_PACKAGE_DIR;
        let mut expected: BTreeSet<String> = [
            "classes/AcmeCtrl.cls",
            "classes/AcmeCtrl.cls-meta.xml",
            "classes/AcmeLtgCtrl.cls",
            "classes/AcmeLtgCtrl.cls-meta.xml",
            "pages/AcmeVf.page",
            "pages/AcmeVf.page-meta.xml",
            "staticresources/Acme.resource-meta.xml",
            "flexipages/AcmeLtg.flexipage-meta.xml",
        ]
        .iter()
        .map(|rel| format!("{p}/{rel}"))
        .collect();
        for (suffix, _) in AURA_BUNDLE_FILES {
            expected.insert(format!("{p}/aura/AcmeLtg/AcmeLtg{suffix}"));
        }

        assert_eq!(relative_dests(&manifest, root), expected);
    }

    #[test]
    fn test_v1_matches_original_layout() {
        let manifest = build_salesforce_manifest(
            ManifestVersion::V1,
            &acme(),
            Path::new("/tpl/sf"),
            Path::new("/proj"),
        );
        let families: Vec<_> = manifest.families.iter().map(|f| f.family).collect();
        assert!(!families.contains(&ArtifactFamily::AuraBundle));
        assert!(!families.contains(&ArtifactFamily::Flexipage));
        assert_eq!(manifest.entries().count(), 7);
    }

    #[test]
    fn test_token_resolution_for_acme() {
        let manifest = build_salesforce_manifest(
            ManifestVersion::V2,
            &acme(),
            Path::new("/tpl/sf"),
            Path::new("/proj"),
        );
        let tokens_for = |family| {
            manifest
                .families
                .iter()
                .find(|f| f.family == family)
                .unwrap()
                .entries[0]
                .tokens
                .clone()
        };

        assert_eq!(
            tokens_for(ArtifactFamily::ApexController).get(PROTOTYPE_CONTROLLER),
            Some("AcmeCtrl")
        );
        assert_eq!(
            tokens_for(ArtifactFamily::ApexLightningController).get(PROTOTYPE_LTG_CONTROLLER),
            Some("AcmeLtgCtrl")
        );
        let page = tokens_for(ArtifactFamily::VisualforcePage);
        assert_eq!(page.get(PROTOTYPE_CONTROLLER), Some("AcmeCtrl"));
        assert_eq!(page.get(PROTOTYPE_RESOURCE), Some("Acme"));

        let cmp = tokens_for(ArtifactFamily::AuraBundle);
        assert_eq!(cmp.get(PROTOTYPE_COMPONENT), Some("AcmeLtg"));
        assert_eq!(cmp.get(PROTOTYPE_RESOURCE), Some("Acme"));
        assert_eq!(
            tokens_for(ArtifactFamily::Flexipage).get(PROTOTYPE_COMPONENT),
            Some("AcmeLtg")
        );
    }

    #[test]
    fn test_only_markup_carries_resource_token() {
        let manifest = build_salesforce_manifest(
            ManifestVersion::V2,
            &acme(),
            Path::new("/tpl/sf"),
            Path::new("/proj"),
        );
        let aura = manifest
            .families
            .iter()
            .find(|f| f.family == ArtifactFamily::AuraBundle)
            .unwrap();
        assert_eq!(aura.entries.len(), 9);
        let with_resource: Vec<_> = aura
            .entries
            .iter()
            .filter(|e| e.tokens.get(PROTOTYPE_RESOURCE).is_some())
            .collect();
        assert_eq!(with_resource.len(), 1);
        assert!(with_resource[0].dest.ends_with("AcmeLtg.cmp"));
        assert!(aura.entries.iter().any(|e| !e.substitute));
    }

    #[test]
    fn test_static_resource_creates_bundle_dir() {
        let root = Path::new("/proj");
        let manifest =
            build_salesforce_manifest(ManifestVersion::V1, &acme(), Path::new("/tpl/sf"), root);
        let plan = manifest
            .families
            .iter()
            .find(|f| f.family == ArtifactFamily::StaticResource)
            .unwrap();
        assert!(plan
            .dirs
            .contains(&root.join(SALESFORCE_PACKAGE_DIR).join("staticresources/Acme")));
    }

    #[test]
    fn test_react_manifest() {
        let entries = build_react_manifest(&acme(), Path::new("/tpl/react"), Path::new("/app"));
        assert_eq!(entries.len(), 6);
        let env = &entries[0];
        assert_eq!(env.dest, Path::new("/app/.env"));
        assert_eq!(env.tokens.get(PROTOTYPE_RESOURCE), Some("Acme"));
        assert!(entries[1..].iter().all(|e| !e.substitute));
        assert!(entries
            .iter()
            .any(|e| e.dest == Path::new("/app/public/assets/js/app.main.js")));
    }

    #[test]
    fn test_assets_plan_renames_bundle() {
        let plan = build_assets_plan(
            Path::new("/clone"),
            Path::new("/proj/force-app/main/default/staticresources"),
            "PortalAssets",
        );
        assert_eq!(
            plan.tree_source,
            Path::new("/clone/templates/default/sf/staticresources/ReactforceAssets")
        );
        assert!(plan.tree_dest.ends_with("staticresources/PortalAssets"));
        assert!(plan.descriptor.dest.ends_with("PortalAssets.resource-meta.xml"));
        assert_eq!(
            plan.descriptor.tokens.get(PROTOTYPE_ASSETS_RESOURCE),
            Some("PortalAssets")
        );
    }

    #[test]
    fn test_manifest_version_parsing() {
        assert_eq!("v1".parse::<ManifestVersion>().unwrap(), ManifestVersion::V1);
        assert_eq!("V2".parse::<ManifestVersion>().unwrap(), ManifestVersion::V2);
        assert!("v3".parse::<ManifestVersion>().is_err());
        assert_eq!(ManifestVersion::default(), ManifestVersion::V2);
    }
}
