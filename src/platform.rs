use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MalformedResponse;

/// Release platforms an update can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// SpigotMC resource API; the identifier is the numeric resource id.
    Spigot,
    /// Modrinth project versions; the identifier is the project id or slug.
    Modrinth,
    /// GitHub latest release; the identifier is `owner/repo`.
    GitHub,
}

/// A version field, which some APIs send as a bare JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VersionField {
    Text(String),
    Number(serde_json::Number),
}

impl From<VersionField> for String {
    fn from(field: VersionField) -> Self {
        match field {
            VersionField::Text(text) => text,
            VersionField::Number(number) => number.to_string(),
        }
    }
}

/// Spigot answers with a single resource object.
#[derive(Debug, Deserialize)]
struct SpigotResource {
    current_version: VersionField,
}

/// Modrinth answers with an array of versions, newest first.
#[derive(Debug, Deserialize)]
struct ModrinthVersion {
    version_number: VersionField,
}

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: Option<VersionField>,
}

impl Platform {
    /// URL template with a single `%s` slot for the project identifier.
    pub fn url_template(&self) -> &'static str {
        match self {
            Platform::Spigot => {
                "https://api.spigotmc.org/simple/0.1/index.php?action=getResource&id=%s"
            }
            Platform::Modrinth => "https://api.modrinth.com/v2/project/%s/version",
            Platform::GitHub => "https://api.github.com/repos/%s/releases/latest",
        }
    }

    /// Builds the request URL for the given project identifier.
    pub fn request_url(&self, id: &str) -> String {
        self.url_template().replacen("%s", id, 1)
    }

    /// Human-readable platform name, used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Spigot => "SpigotMC",
            Platform::Modrinth => "Modrinth",
            Platform::GitHub => "GitHub",
        }
    }

    /// Extracts the latest version string from a parsed API response.
    ///
    /// Every shape violation (wrong top-level type, missing or null field,
    /// empty version list) is reported as the same [`MalformedResponse`].
    pub fn extract_latest(&self, root: &Value) -> Result<String, MalformedResponse> {
        match self {
            Platform::Spigot => {
                expect_object(root)?;
                let resource: SpigotResource = decode(root)?;
                Ok(resource.current_version.into())
            }
            Platform::Modrinth => {
                let Value::Array(versions) = root else {
                    return Err(MalformedResponse("expected a JSON array".to_string()));
                };
                let first = versions
                    .first()
                    .ok_or_else(|| MalformedResponse("version list is empty".to_string()))?;
                let version: ModrinthVersion = decode(first)?;
                Ok(version.version_number.into())
            }
            Platform::GitHub => {
                expect_object(root)?;
                let release: GitHubRelease = decode(root)?;
                release
                    .tag_name
                    .map(String::from)
                    .ok_or_else(|| MalformedResponse("tag_name is missing or null".to_string()))
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn expect_object(root: &Value) -> Result<(), MalformedResponse> {
    if root.is_object() {
        Ok(())
    } else {
        Err(MalformedResponse("expected a JSON object".to_string()))
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, MalformedResponse> {
    T::deserialize(value).map_err(|e| MalformedResponse(e.to_string()))
}
