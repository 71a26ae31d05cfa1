use super::{Model, ModelPopulator};
use crate::error::Result;
use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::LazyLock;

static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

/// Sections whose children would shadow the project's own coordinates.
const NESTED_SECTIONS: &[&str] = &[
    "parent",
    "dependencyManagement",
    "dependencies",
    "build",
    "profiles",
    "modules",
    "reporting",
    "repositories",
    "pluginRepositories",
    "distributionManagement",
    "developers",
    "contributors",
    "licenses",
    "mailingLists",
    "issueManagement",
    "ciManagement",
    "prerequisites",
    "scm",
    "organization",
];

/// One pattern per section so that each open tag only ends at its own
/// close tag.
static NESTED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NESTED_SECTIONS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?s)<{tag}\b[^>]*/>|<{tag}\b[^>]*>.*?</{tag}>"))
                .expect("section pattern is valid")
        })
        .collect()
});

static PARENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<parent\b[^>]*>(.*?)</parent>").expect("parent pattern is valid")
});

static PROPERTIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<properties\b[^>]*>(.*?)</properties>").expect("properties pattern is valid")
});

static PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<([A-Za-z0-9_.\-]+)>([^<]*)</([A-Za-z0-9_.\-]+)>")
        .expect("property pattern is valid")
});

/// Top-level coordinates of a `pom.xml`.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Pom {
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub properties: Vec<(String, String)>,
}

impl Pom {
    pub(crate) fn parse(xml: &str) -> Self {
        let xml = COMMENTS.replace_all(xml, "");
        let parent_version = PARENT
            .captures(&xml)
            .and_then(|c| c.get(1))
            .and_then(|parent| element(parent.as_str(), "version"));

        let properties = PROPERTIES
            .captures(&xml)
            .and_then(|c| c.get(1))
            .map(|block| {
                PROPERTY
                    .captures_iter(block.as_str())
                    .filter(|c| c[1] == c[3])
                    .map(|c| (c[1].to_string(), c[2].trim().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let mut project = xml.into_owned();
        for section in NESTED.iter() {
            project = section.replace_all(&project, "").into_owned();
        }
        let project = PROPERTIES.replace_all(&project, "");
        Self {
            artifact_id: element(&project, "artifactId"),
            version: element(&project, "version").or(parent_version),
            packaging: element(&project, "packaging"),
            name: element(&project, "name"),
            description: element(&project, "description"),
            properties,
        }
    }
}

fn element(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    Some(xml[start..end].trim().to_string())
}

/// `1.8` style versions become `8`; anything else is kept as written.
fn java_version(raw: &str) -> Value {
    let version = raw.strip_prefix("1.").unwrap_or(raw);
    match version.parse::<i64>() {
        Ok(number) => Value::from(number),
        Err(_) => Value::String(raw.to_string()),
    }
}

/// Contributes the Maven coordinates of `<root>/pom.xml`, when present.
pub struct MavenModelPopulator;

impl ModelPopulator for MavenModelPopulator {
    fn name(&self) -> &'static str {
        "maven"
    }

    fn contribute_to_model(&self, root: &Path, model: &mut Model) -> Result<()> {
        let pom_file = root.join("pom.xml");
        if !pom_file.is_file() {
            return Ok(());
        }
        let pom = Pom::parse(&std::fs::read_to_string(&pom_file)?);

        if let Some(artifact_id) = &pom.artifact_id {
            model.set_if_absent("artifact-id", Value::String(artifact_id.clone()));
        }
        if let Some(version) = &pom.version {
            model.set_if_absent("artifact-version", Value::String(version.clone()));
        }
        if let (Some(artifact_id), Some(version)) = (&pom.artifact_id, &pom.version) {
            let packaging = pom.packaging.as_deref().unwrap_or("jar");
            let base = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
            let artifact = base
                .join("target")
                .join(format!("{artifact_id}-{version}.{packaging}"));
            model.set_if_absent(
                "artifact-path",
                Value::String(artifact.to_string_lossy().into_owned()),
            );
        }

        let properties: Map<String, Value> = pom
            .properties
            .iter()
            .map(|(key, value)| (key.replace('.', "-"), Value::String(value.clone())))
            .collect();
        if let Some(Value::String(raw)) = properties.get("java-version") {
            model.set_if_absent("java-version", java_version(raw));
        }
        model.set_if_absent("maven-properties", Value::Object(properties));

        if let Some(name) = pom.name {
            model.set_if_absent("project-name", Value::String(name));
        }
        if let Some(description) = pom.description {
            model.set_if_absent("project-description", Value::String(description));
        }
        Ok(())
    }
}
