/// Error types.
///
/// `ValidationError` carries the exact messages players see when a stage
/// map is rejected. `GameError` is everything that can end the program.

use std::fmt;
use std::io;

use thiserror::Error;

/// One structural defect of a stage map. Line numbers are 1-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructuralIssue {
    Columns,
    Lines,
    NonUniform(Vec<usize>),
    Boundary(Vec<usize>),
    NoPlayer,
    ManyPlayers,
    NoEnemies,
    NoTargets,
}

fn join_lines(lines: &[usize]) -> String {
    lines.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(",")
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralIssue::Columns => write!(f, "Make the stage map 20 to 50 columns"),
            StructuralIssue::Lines => write!(f, "Make the stage map 10 to 20 lines"),
            StructuralIssue::NonUniform(lines) => {
                write!(f, "Make the width of the stage map uniform (line {})", join_lines(lines))
            }
            StructuralIssue::Boundary(lines) => {
                write!(f, "Create a boundary for the stage map with '+' (line {})", join_lines(lines))
            }
            StructuralIssue::NoPlayer => write!(f, "Please set one P"),
            StructuralIssue::ManyPlayers => write!(f, "Please set only one P"),
            StructuralIssue::NoEnemies => write!(f, "Please set one or more enemies"),
            StructuralIssue::NoTargets => write!(f, "Please set one or more targets"),
        }
    }
}

fn bullets(path: &str, issues: &[StructuralIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!(" -  {path}; {issue};"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("MIME Type Validation Error: {path}; Invalid mime type: {mime};")]
    ContentType { path: String, mime: String },

    #[error("File Size Validation Error: {path}; File size exceeded: {size} (Max file size is {max});")]
    FileSize { path: String, size: u64, max: u64 },

    #[error("Stage Map Validation Error: {path}; {issue};")]
    Structure { path: String, issue: StructuralIssue },

    #[error("Stage Map Validation Error: the following errors occurred:\n{}", bullets(.path, .issues))]
    Aggregate { path: String, issues: Vec<StructuralIssue> },

    #[error("Stage Map Read Error: {path}; {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("could not place {ghosts} ghosts on {stage} within {attempts} attempts")]
    Placement { stage: String, ghosts: usize, attempts: usize },

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("stage task failed: {0}")]
    Task(String),

    #[error("no stages to play")]
    NoStages,

    #[error("terminal too small: need {need_w}x{need_h}, have {have_w}x{have_h}")]
    TerminalTooSmall { need_w: u16, need_h: u16, have_w: u16, have_h: u16 },
}

impl From<tokio::task::JoinError> for GameError {
    fn from(e: tokio::task::JoinError) -> Self {
        GameError::Task(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_issue_message() {
        let e = ValidationError::Structure {
            path: "map03.txt".into(),
            issue: StructuralIssue::Columns,
        };
        assert_eq!(e.to_string(), "Stage Map Validation Error: map03.txt; Make the stage map 20 to 50 columns;");
    }

    #[test]
    fn aggregate_message_has_no_trailing_newline() {
        let e = ValidationError::Aggregate {
            path: "m.txt".into(),
            issues: vec![StructuralIssue::NonUniform(vec![6, 8, 10]), StructuralIssue::Boundary(vec![1, 15])],
        };
        assert_eq!(
            e.to_string(),
            "Stage Map Validation Error: the following errors occurred:\n\
             \x20-  m.txt; Make the width of the stage map uniform (line 6,8,10);\n\
             \x20-  m.txt; Create a boundary for the stage map with '+' (line 1,15);"
        );
    }

    #[test]
    fn validation_error_passes_through_game_error() {
        let e: GameError = ValidationError::FileSize { path: "big.txt".into(), size: 1049, max: 1024 }.into();
        assert_eq!(
            e.to_string(),
            "File Size Validation Error: big.txt; File size exceeded: 1049 (Max file size is 1024);"
        );
    }
}
