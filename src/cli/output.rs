//! Output formatting for detected projects
//!
//! JSON and YAML serialize the project records as they are. The human format
//! is a compact tree per project.

use anyhow::{Context, Result};

use crate::detect::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_projects(&self, projects: &[Project]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(projects)
                .context("Failed to serialize projects to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(projects).context("Failed to serialize projects to YAML")
            }
            OutputFormat::Human => Ok(self.format_human(projects)),
        }
    }

    fn format_human(&self, projects: &[Project]) -> String {
        if projects.is_empty() {
            return "No Java projects detected\n".to_string();
        }

        let mut output = format!("\u{2713} {} Java project(s) detected\n", projects.len());
        output.push_str(&"\u{2501}".repeat(42));
        output.push('\n');

        for project in projects {
            output.push('\n');
            output.push_str(&format!("{} ({})\n", project.name(), project.coordinate));
            output.push_str(&format!("\u{251C}\u{2500} Path:        {}\n", project.path.display()));
            if let Some(aggregator) = &project.parent_aggregator {
                output.push_str(&format!("\u{251C}\u{2500} Aggregator:  {}\n", aggregator.display()));
            }
            if let Some(version) = &project.metadata.spring_boot_version {
                output.push_str(&format!("\u{251C}\u{2500} Spring Boot: {}\n", version));
            }
            for (kind, name) in &project.metadata.database_names {
                output.push_str(&format!("\u{251C}\u{2500} Database:    {} ({})\n", name, kind));
            }
            if !project.metadata.flags.is_empty() {
                let flags: Vec<&str> = project.metadata.flags.iter().map(|f| f.display_name()).collect();
                output.push_str(&format!("\u{251C}\u{2500} Metadata:    {}\n", flags.join(", ")));
            }
            output.push_str(&format!(
                "\u{251C}\u{2500} Dependencies: {} resolved, {} unpinned\n",
                project.dependencies.iter().filter(|d| d.is_versioned()).count(),
                project.dependencies.iter().filter(|d| !d.is_versioned()).count(),
            ));

            if project.requirements.is_empty() {
                output.push_str("\u{2514}\u{2500} Resources:   (none)\n");
            } else {
                output.push_str("\u{2514}\u{2500} Resources:\n");
                for (i, requirement) in project.requirements.iter().enumerate() {
                    let connector = if i == project.requirements.len() - 1 {
                        "\u{2514}"
                    } else {
                        "\u{251C}"
                    };
                    output.push_str(&format!("   {}\u{2500} {}\n", connector, requirement));
                }
            }
        }

        output
    }
}
