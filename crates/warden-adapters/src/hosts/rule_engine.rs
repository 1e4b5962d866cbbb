use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use warden_core::{EngineRule, RuleEngine, RuleEngineError, RuleId};

const BLOCK_BEGIN: &str = "# >>> warden blocklist - managed, do not edit";
const BLOCK_END: &str = "# <<< warden blocklist";
const REDIRECT_TARGET: &str = "127.0.0.1";

/// Blocking engine over a hosts-format file.
///
/// Rules live in a marker-delimited block so hand-written entries elsewhere
/// in the file are never touched. Each rule line redirects the domain (and
/// its `www.` alias) to the loopback address where the local blocked page
/// answers, and records the engine id and url filter in a trailing
/// annotation. Rewrites go through a temp file and an atomic rename.
pub struct HostsRuleEngine {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HostsRuleEngine {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn system_default() -> Self {
        Self::new(Path::new("/etc/hosts"))
    }

    async fn read_content(&self) -> Result<String, RuleEngineError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(error) => Err(storage_error(error)),
        }
    }

    async fn write_content(&self, content: &str) -> Result<(), RuleEngineError> {
        let temp_path = self.path.with_extension("warden-tmp");

        tokio::fs::write(&temp_path, content)
            .await
            .map_err(storage_error)?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(storage_error)
    }
}

#[async_trait]
impl RuleEngine for HostsRuleEngine {
    async fn list_rules(&self) -> Result<Vec<EngineRule>, RuleEngineError> {
        let content = self.read_content().await?;
        Ok(parse_rules(&content))
    }

    async fn apply(
        &self,
        add: Vec<EngineRule>,
        remove: Vec<RuleId>,
    ) -> Result<(), RuleEngineError> {
        let _guard = self.write_lock.lock().await;

        let content = self.read_content().await?;
        let mut rules: Vec<EngineRule> = parse_rules(&content)
            .into_iter()
            .filter(|rule| !remove.contains(&rule.id))
            .collect();

        for rule in add {
            if rules.iter().any(|existing| existing.id == rule.id) {
                return Err(RuleEngineError::DuplicateId { id: rule.id });
            }
            rules.push(rule);
        }

        let updated = splice_block(&content, &rules);
        self.write_content(&updated).await?;

        debug!(path = %self.path.display(), count = rules.len(), "blocklist rewritten");
        Ok(())
    }
}

fn storage_error(error: impl ToString) -> RuleEngineError {
    RuleEngineError::Storage {
        message: error.to_string(),
    }
}

fn parse_rules(content: &str) -> Vec<EngineRule> {
    let mut rules = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        if line.trim() == BLOCK_BEGIN {
            in_block = true;
            continue;
        }
        if line.trim() == BLOCK_END {
            in_block = false;
            continue;
        }
        if in_block {
            if let Some(rule) = parse_block_line(line) {
                rules.push(rule);
            }
        }
    }

    rules
}

fn parse_block_line(line: &str) -> Option<EngineRule> {
    let (_, annotation) = line.split_once("# warden ")?;

    let mut id: Option<RuleId> = None;
    let mut url_filter: Option<String> = None;
    for token in annotation.split_whitespace() {
        if let Some(value) = token.strip_prefix("id=") {
            id = value.parse().ok();
        } else if let Some(value) = token.strip_prefix("filter=") {
            url_filter = Some(value.to_string());
        }
    }

    Some(EngineRule {
        id: id?,
        priority: 1,
        url_filter: url_filter?,
    })
}

fn render_rule(rule: &EngineRule) -> String {
    let domain = rule.domain();
    format!(
        "{} {} www.{} # warden id={} filter={}",
        REDIRECT_TARGET, domain, domain, rule.id, rule.url_filter
    )
}

/// Replace the managed block with `rules`, leaving every other line alone.
/// An empty rule set removes the block entirely.
fn splice_block(content: &str, rules: &[EngineRule]) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        if line.trim() == BLOCK_BEGIN {
            in_block = true;
            continue;
        }
        if line.trim() == BLOCK_END {
            in_block = false;
            continue;
        }
        if !in_block {
            kept.push(line);
        }
    }

    let mut output: Vec<String> = kept.iter().map(|line| line.to_string()).collect();
    while output.last().is_some_and(|line| line.is_empty()) {
        output.pop();
    }

    if !rules.is_empty() {
        if !output.is_empty() {
            output.push(String::new());
        }
        output.push(BLOCK_BEGIN.to_string());
        for rule in rules {
            output.push(render_rule(rule));
        }
        output.push(BLOCK_END.to_string());
    }

    let mut text = output.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
