use std::fs;
use std::path::Path;

use crate::error::ReportError;
use crate::scoring::Report;
use crate::timer::format_minutes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Yaml,
    Json,
}

impl ReportFormat {
    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(ReportFormat::Yaml),
            Some("json") => Ok(ReportFormat::Json),
            _ => Err(ReportError::UnknownFormat(path.display().to_string())),
        }
    }
}

pub fn render(report: &Report, format: ReportFormat) -> Result<String, ReportError> {
    Ok(match format {
        ReportFormat::Yaml => serde_yaml::to_string(report)?,
        ReportFormat::Json => serde_json::to_string_pretty(report)?,
    })
}

/// Format is picked from the extension. Written to a temp file, then renamed.
pub fn export(report: &Report, path: &Path) -> Result<(), ReportError> {
    let content = render(report, ReportFormat::from_path(path)?)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Short plain-text summary printed once the terminal is released.
pub fn format_summary(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", report.title));
    out.push_str(&format!(
        "Score: {} / {} Marks ({}%)\n",
        report.score, report.question_count, report.accuracy_percent
    ));
    out.push_str(&format!(
        "Total time: {}   Avg speed: {}s/q\n",
        format_minutes(report.total_time_seconds),
        report.average_time_seconds
    ));
    let c = &report.status_counts;
    out.push_str(&format!(
        "Answered: {}, Not answered: {}, Marked: {}, Not visited: {}\n",
        c.answered, c.not_answered, c.marked, c.not_visited
    ));
    if report.attempt.forced {
        out.push_str("Submitted automatically when time ran out.\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ReportFormat::from_path(&PathBuf::from("r.yaml")).unwrap(),
            ReportFormat::Yaml
        );
        assert_eq!(
            ReportFormat::from_path(&PathBuf::from("r.yml")).unwrap(),
            ReportFormat::Yaml
        );
        assert_eq!(
            ReportFormat::from_path(&PathBuf::from("out/r.json")).unwrap(),
            ReportFormat::Json
        );
        assert!(matches!(
            ReportFormat::from_path(&PathBuf::from("r.pdf")).unwrap_err(),
            ReportError::UnknownFormat(_)
        ));
    }
}
