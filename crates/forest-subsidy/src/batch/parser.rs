use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::ProjectImportError;
use crate::eligibility::domain::Project;

const LIST_SEPARATOR: char = ';';

pub(crate) fn parse_projects<R: Read>(reader: R) -> Result<Vec<Project>, ProjectImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut projects = Vec::new();

    for (index, record) in csv_reader.deserialize::<ProjectRow>().enumerate() {
        let row = record?;
        // Header is line 1.
        projects.push(row.into_project(index + 2)?);
    }

    Ok(projects)
}

#[derive(Debug, Deserialize)]
struct ProjectRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "empty_string_as_none")]
    project_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    region: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    area_ha: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    owner_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    species: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    planting_density: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    slope: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    protected_areas: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    priority_zones: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    has_management_document: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    maintenance_commitment_years: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    certifications: Option<String>,
}

impl ProjectRow {
    fn into_project(self, line: usize) -> Result<Project, ProjectImportError> {
        Ok(Project {
            area_ha: parse_number(line, "area_ha", self.area_ha.as_deref())?,
            planting_density: parse_number(
                line,
                "planting_density",
                self.planting_density.as_deref(),
            )?,
            slope: parse_number(line, "slope", self.slope.as_deref())?,
            has_management_document: parse_flag(
                line,
                "has_management_document",
                self.has_management_document.as_deref(),
            )?,
            maintenance_commitment_years: self
                .maintenance_commitment_years
                .as_deref()
                .map(|raw| {
                    raw.parse::<u32>()
                        .map_err(|_| invalid(line, "maintenance_commitment_years", raw))
                })
                .transpose()?,
            species: self.species.as_deref().map(split_list),
            protected_areas: self.protected_areas.as_deref().map(split_list),
            priority_zones: self.priority_zones.as_deref().map(split_list),
            certifications: self.certifications.as_deref().map(split_list),
            name: self.name,
            project_type: self.project_type,
            region: self.region,
            owner_type: self.owner_type,
            islands: None,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number(
    line: usize,
    column: &'static str,
    raw: Option<&str>,
) -> Result<Option<f64>, ProjectImportError> {
    raw.map(|value| {
        value
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .ok_or_else(|| invalid(line, column, value))
    })
    .transpose()
}

fn parse_flag(
    line: usize,
    column: &'static str,
    raw: Option<&str>,
) -> Result<Option<bool>, ProjectImportError> {
    raw.map(|value| match value.to_lowercase().as_str() {
        "true" | "yes" | "oui" | "1" => Ok(true),
        "false" | "no" | "non" | "0" => Ok(false),
        _ => Err(invalid(line, column, value)),
    })
    .transpose()
}

fn invalid(line: usize, column: &'static str, value: &str) -> ProjectImportError {
    ProjectImportError::InvalidField {
        line,
        column,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_lists_and_drops_blank_entries() {
        assert_eq!(split_list("PEFC; FSC;;"), ["PEFC", "FSC"]);
        assert!(split_list(" ; ").is_empty());
    }

    #[test]
    fn numbers_accept_decimal_comma() {
        assert_eq!(parse_number(2, "area_ha", Some("5,2")).unwrap(), Some(5.2));
        assert_eq!(parse_number(2, "area_ha", None).unwrap(), None);
        assert!(parse_number(2, "area_ha", Some("NaN")).is_err());
    }

    #[test]
    fn flags_accept_french_answers() {
        assert_eq!(parse_flag(2, "flag", Some("Oui")).unwrap(), Some(true));
        assert_eq!(parse_flag(2, "flag", Some("non")).unwrap(), Some(false));
        assert!(parse_flag(2, "flag", Some("peut-être")).is_err());
    }
}
