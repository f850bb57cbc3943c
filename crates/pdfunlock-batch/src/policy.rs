//! Password assignment
//!
//! Every file gets exactly one password, and all of them are resolved before
//! the first request goes out.

use async_trait::async_trait;
use tracing::debug;

use crate::source::SourceFile;

/// Asks the user for the password of one file
#[async_trait]
pub trait PasswordPrompt: Send + Sync {
    /// `None` when the user cancels
    async fn ask(&self, file_name: &str) -> Option<String>;
}

pub enum PasswordPolicy {
    /// Same password for every file
    Uniform(String),
    /// Ask once per file, in input order
    PerFile(Box<dyn PasswordPrompt>),
}

impl std::fmt::Debug for PasswordPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordPolicy::Uniform(_) => f.write_str("Uniform(<redacted>)"),
            PasswordPolicy::PerFile(_) => f.write_str("PerFile"),
        }
    }
}

/// A file paired with the password it will be sent with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub source: SourceFile,
    pub password: String,
}

impl PasswordPolicy {
    /// Pair each file with its password
    ///
    /// A cancelled prompt gives an empty password. The file is still sent and
    /// the endpoint reports the password as missing.
    pub async fn resolve(&self, files: Vec<SourceFile>) -> Vec<FileTask> {
        let mut tasks = Vec::with_capacity(files.len());
        for source in files {
            let password = match self {
                PasswordPolicy::Uniform(password) => password.clone(),
                PasswordPolicy::PerFile(prompt) => {
                    let answer = prompt.ask(source.name()).await;
                    if answer.is_none() {
                        debug!(file = source.name(), "password prompt cancelled");
                    }
                    answer.unwrap_or_default()
                }
            };
            tasks.push(FileTask { source, password });
        }
        tasks
    }
}
