//! Parsing utilities for requirement specifiers (`name[extra]>=1.0; marker`)

use serde::Deserializer;

/// A requirement specifier that can be deserialized
///
/// Only the distribution name is interpreted, the rest of the
/// specifier is kept verbatim and handed to the installer as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// The distribution name as written in the specifier
    pub name: String,
    /// The complete specifier
    pub spec: String,
}

impl Requirement {
    /// Parses a requirement specifier, extracting the leading distribution name
    /// # Arguments
    /// * `spec` - The specifier to parse
    /// # Returns
    /// `None` if the specifier does not start with a valid name
    pub fn parse(spec: &str) -> Option<Self> {
        let trimmed = spec.trim();
        let name: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            .collect();

        if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return None;
        }

        Some(Self {
            name,
            spec: trimmed.to_owned(),
        })
    }

    /// Returns the normalized distribution name, see [normalize_name()]
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Normalizes a distribution name for comparison:
/// lowercase, with runs of `-`, `_` and `.` collapsed to a single `-`
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }

    out
}

impl<'de> serde::Deserialize<'de> for Requirement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RequirementVisitor;

        impl<'de> serde::de::Visitor<'de> for RequirementVisitor {
            type Value = Requirement;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a requirement specifier like 'name>=1.0'")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Requirement::parse(value).ok_or_else(|| {
                    E::invalid_value(
                        serde::de::Unexpected::Str(value),
                        &"a specifier starting with a distribution name",
                    )
                })
            }
        }

        deserializer.deserialize_str(RequirementVisitor)
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.spec)
    }
}
