use std::fs;
use std::path::Path;

use rust_embed::Embed;
use tracing::{debug, warn};

use crate::quiz::model::Quiz;

#[derive(Embed)]
#[folder = "assets/quizzes/"]
struct BundledQuizzes;

/// Every quiz offered on the selection screen, bundled ones first.
#[derive(Clone, Debug, Default)]
pub struct QuizLibrary {
    pub quizzes: Vec<Quiz>,
}

impl QuizLibrary {
    /// Bundled quizzes plus any `*.json` in `user_dir`. Files that fail to
    /// parse are logged and skipped.
    pub fn load(user_dir: &Path) -> Self {
        let mut quizzes = Self::load_bundled();
        quizzes.extend(Self::load_dir(user_dir));
        debug!(count = quizzes.len(), "quiz library loaded");
        Self { quizzes }
    }

    pub fn load_bundled() -> Vec<Quiz> {
        let mut names: Vec<String> = BundledQuizzes::iter()
            .filter(|f| f.ends_with(".json"))
            .map(|f| f.to_string())
            .collect();
        names.sort();

        names
            .iter()
            .filter_map(|name| {
                let file = BundledQuizzes::get(name)?;
                let content = std::str::from_utf8(file.data.as_ref()).ok()?;
                parse_logged(name, content)
            })
            .collect()
    }

    pub fn load_dir(dir: &Path) -> Vec<Quiz> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("json"))
            .collect();
        paths.sort();

        paths
            .iter()
            .filter_map(|path| {
                let name = path.display().to_string();
                match fs::read_to_string(path) {
                    Ok(content) => parse_logged(&name, &content),
                    Err(e) => {
                        warn!(file = %name, error = %e, "could not read quiz file");
                        None
                    }
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Quiz> {
        self.quizzes.get(index)
    }
}

fn parse_logged(name: &str, content: &str) -> Option<Quiz> {
    match Quiz::from_json(content) {
        Ok(quiz) => Some(quiz),
        Err(e) => {
            warn!(file = %name, error = %e, "skipping quiz file that failed to parse");
            None
        }
    }
}
